//! Composable scalar generators.
//!
//! A [`NumberGenerator`] produces one `f64` per call. Generators are either
//! random distributions ([`UniformRandom`], [`NormalRandom`], ...), functions
//! of a shared simulation [`Time`] ([`TimeFactor`], [`BoxCar`], ...), or
//! arithmetic over other generators built as an [`Expr`] tree.
//!
//! ```rust
//! use dataviews::numbergen::{Expr, NumberGenerator, Time, TimeFactor};
//!
//! let time = Time::new();
//! let mut speed = (Expr::generator(TimeFactor::new(2.0, &time)) + 1.0).abs();
//! time.set(3.0);
//! assert_eq!(speed.next_value(), 7.0);
//! ```

pub mod random;
pub mod time;

pub use random::{
    Choice, NormalRandom, RandomConfig, UniformRandom, UniformRandomInt, UniformRandomOffset,
    VonMisesRandom,
};
pub use time::{BoxCar, ExponentialDecay, SquareWave, Time, TimeFactor};

use std::fmt;
use std::ops;

use crate::{DataViewError, DataViewResult};

/// Anything that yields a number when asked.
pub trait NumberGenerator: fmt::Debug {
    fn next_value(&mut self) -> f64;
}

impl NumberGenerator for f64 {
    fn next_value(&mut self) -> f64 {
        *self
    }
}

impl<G: NumberGenerator + ?Sized> NumberGenerator for Box<G> {
    fn next_value(&mut self) -> f64 {
        (**self).next_value()
    }
}

/// Binary operators available in an [`Expr`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    /// Floored modulo: the result takes the sign of the divisor.
    Mod,
    Pow,
    Div,
    /// Division rounded towards negative infinity.
    FloorDiv,
}

impl BinaryOp {
    pub fn apply(self, lhs: f64, rhs: f64) -> f64 {
        match self {
            BinaryOp::Add => lhs + rhs,
            BinaryOp::Sub => lhs - rhs,
            BinaryOp::Mul => lhs * rhs,
            BinaryOp::Mod => lhs - rhs * (lhs / rhs).floor(),
            BinaryOp::Pow => lhs.powf(rhs),
            BinaryOp::Div => lhs / rhs,
            BinaryOp::FloorDiv => (lhs / rhs).floor(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Neg,
    Pos,
    Abs,
}

impl UnaryOp {
    pub fn apply(self, value: f64) -> f64 {
        match self {
            UnaryOp::Neg => -value,
            UnaryOp::Pos => value,
            UnaryOp::Abs => value.abs(),
        }
    }
}

/// Arithmetic over generators and constants.
///
/// Operands are evaluated only when the expression itself is asked for a
/// value, left operand first.
#[derive(Debug)]
pub enum Expr {
    Constant(f64),
    Generator(Box<dyn NumberGenerator>),
    Binary {
        op: BinaryOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },
}

impl Expr {
    pub fn constant(value: f64) -> Self {
        Expr::Constant(value)
    }

    pub fn generator(generator: impl NumberGenerator + 'static) -> Self {
        Expr::Generator(Box::new(generator))
    }

    pub fn binary(op: BinaryOp, lhs: impl Into<Expr>, rhs: impl Into<Expr>) -> Self {
        Expr::Binary {
            op,
            lhs: Box::new(lhs.into()),
            rhs: Box::new(rhs.into()),
        }
    }

    pub fn unary(op: UnaryOp, operand: impl Into<Expr>) -> Self {
        Expr::Unary {
            op,
            operand: Box::new(operand.into()),
        }
    }

    pub fn pow(self, exponent: impl Into<Expr>) -> Self {
        Self::binary(BinaryOp::Pow, self, exponent)
    }

    pub fn floor_div(self, divisor: impl Into<Expr>) -> Self {
        Self::binary(BinaryOp::FloorDiv, self, divisor)
    }

    pub fn abs(self) -> Self {
        Self::unary(UnaryOp::Abs, self)
    }

    pub fn pos(self) -> Self {
        Self::unary(UnaryOp::Pos, self)
    }

    /// Evaluate the tree once.
    pub fn eval(&mut self) -> f64 {
        match self {
            Expr::Constant(value) => *value,
            Expr::Generator(generator) => generator.next_value(),
            Expr::Binary { op, lhs, rhs } => {
                let lhs = lhs.eval();
                let rhs = rhs.eval();
                op.apply(lhs, rhs)
            }
            Expr::Unary { op, operand } => op.apply(operand.eval()),
        }
    }
}

impl NumberGenerator for Expr {
    fn next_value(&mut self) -> f64 {
        self.eval()
    }
}

impl From<f64> for Expr {
    fn from(value: f64) -> Self {
        Expr::Constant(value)
    }
}

impl From<Box<dyn NumberGenerator>> for Expr {
    fn from(generator: Box<dyn NumberGenerator>) -> Self {
        Expr::Generator(generator)
    }
}

macro_rules! impl_expr_op {
    ($($trait:ident :: $method:ident => $op:ident),* $(,)?) => {
        $(
            impl<R: Into<Expr>> ops::$trait<R> for Expr {
                type Output = Expr;

                fn $method(self, rhs: R) -> Expr {
                    Expr::binary(BinaryOp::$op, self, rhs)
                }
            }
        )*
    };
}

impl_expr_op!(
    Add::add => Add,
    Sub::sub => Sub,
    Mul::mul => Mul,
    Div::div => Div,
    Rem::rem => Mod,
);

impl ops::Neg for Expr {
    type Output = Expr;

    fn neg(self) -> Expr {
        Expr::unary(UnaryOp::Neg, self)
    }
}

/// Clamps another generator's output to `[min, max]`; either side may be
/// open.
#[derive(Debug)]
pub struct BoundedNumber<G: NumberGenerator> {
    generator: G,
    bounds: (Option<f64>, Option<f64>),
}

impl<G: NumberGenerator> BoundedNumber<G> {
    pub fn new(generator: G, min: Option<f64>, max: Option<f64>) -> DataViewResult<Self> {
        if let (Some(lo), Some(hi)) = (min, max) {
            if lo > hi {
                return Err(DataViewError::invalid_parameter(
                    "bounds",
                    format!("lower bound {lo} is above upper bound {hi}"),
                ));
            }
        }
        Ok(Self {
            generator,
            bounds: (min, max),
        })
    }

    pub const fn bounds(&self) -> (Option<f64>, Option<f64>) {
        self.bounds
    }

    pub fn into_inner(self) -> G {
        self.generator
    }
}

impl<G: NumberGenerator> NumberGenerator for BoundedNumber<G> {
    fn next_value(&mut self) -> f64 {
        let value = self.generator.next_value();
        match self.bounds {
            (Some(min), _) if value < min => min,
            (_, Some(max)) if value > max => max,
            _ => value,
        }
    }
}
