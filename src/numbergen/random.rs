//! Random distributions with optional time-dependent seeding.

use std::collections::hash_map::DefaultHasher;
use std::f64::consts::{PI, TAU};
use std::hash::{Hash, Hasher};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Normal};
use serde::{Deserialize, Serialize};

use super::{NumberGenerator, Time};
use crate::{DataViewError, DataViewResult};

/// Seeding behaviour shared by every random distribution.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RandomConfig {
    /// Fixed initial RNG state; a fresh entropy-seeded state if unset.
    pub seed: Option<u64>,
    /// Reseed from `(name, time, global seed)` before every draw, making the
    /// output a function of time.
    pub time_dependent: bool,
    pub name: Option<String>,
}

impl RandomConfig {
    pub fn seeded(seed: u64) -> Self {
        Self {
            seed: Some(seed),
            ..Self::default()
        }
    }

    pub fn time_dependent(name: impl Into<String>) -> Self {
        Self {
            time_dependent: true,
            name: Some(name.into()),
            ..Self::default()
        }
    }
}

/// RNG plus the configuration that governs its reseeding.
#[derive(Debug, Clone)]
struct RandomState {
    rng: StdRng,
    config: RandomConfig,
    time: Time,
}

impl RandomState {
    fn new(config: RandomConfig, time: &Time, generator: &'static str) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_rng(&mut rand::rng()),
        };
        if config.time_dependent && config.name.is_none() {
            tracing::warn!(
                generator,
                "time-dependent generator has no name; its values depend only on time and the global seed"
            );
        }
        let mut state = Self {
            rng,
            config,
            time: time.clone(),
        };
        state.reseed();
        state
    }

    fn reseed(&mut self) {
        if !self.config.time_dependent {
            return;
        }
        let mut hasher = DefaultHasher::new();
        self.config.name.hash(&mut hasher);
        self.time.now().to_bits().hash(&mut hasher);
        self.time.seed().hash(&mut hasher);
        self.rng = StdRng::seed_from_u64(hasher.finish());
    }

    /// RNG ready for the next draw.
    fn rng(&mut self) -> &mut StdRng {
        self.reseed();
        &mut self.rng
    }
}

/// Uniform value in `[lbound, ubound)`.
#[derive(Debug, Clone)]
pub struct UniformRandom {
    pub lbound: f64,
    pub ubound: f64,
    state: RandomState,
}

impl UniformRandom {
    pub fn new(lbound: f64, ubound: f64, config: RandomConfig, time: &Time) -> Self {
        Self {
            lbound,
            ubound,
            state: RandomState::new(config, time, "UniformRandom"),
        }
    }
}

impl NumberGenerator for UniformRandom {
    fn next_value(&mut self) -> f64 {
        let u: f64 = self.state.rng().random();
        self.lbound + (self.ubound - self.lbound) * u
    }
}

/// Uniform value in `[mean - range / 2, mean + range / 2)`.
#[derive(Debug, Clone)]
pub struct UniformRandomOffset {
    pub mean: f64,
    pub range: f64,
    state: RandomState,
}

impl UniformRandomOffset {
    pub fn new(mean: f64, range: f64, config: RandomConfig, time: &Time) -> Self {
        Self {
            mean,
            range,
            state: RandomState::new(config, time, "UniformRandomOffset"),
        }
    }
}

impl NumberGenerator for UniformRandomOffset {
    fn next_value(&mut self) -> f64 {
        let u: f64 = self.state.rng().random();
        self.mean - self.range / 2.0 + self.range * u
    }
}

/// Uniform integer in the inclusive range `[lbound, ubound]`.
#[derive(Debug, Clone)]
pub struct UniformRandomInt {
    lbound: i64,
    ubound: i64,
    state: RandomState,
}

impl UniformRandomInt {
    pub fn new(lbound: i64, ubound: i64, config: RandomConfig, time: &Time) -> DataViewResult<Self> {
        if lbound > ubound {
            return Err(DataViewError::invalid_parameter(
                "lbound",
                format!("{lbound} is above the upper bound {ubound}"),
            ));
        }
        Ok(Self {
            lbound,
            ubound,
            state: RandomState::new(config, time, "UniformRandomInt"),
        })
    }

    pub fn next_int(&mut self) -> i64 {
        let (lbound, ubound) = (self.lbound, self.ubound);
        self.state.rng().random_range(lbound..=ubound)
    }
}

impl NumberGenerator for UniformRandomInt {
    fn next_value(&mut self) -> f64 {
        self.next_int() as f64
    }
}

/// A random element of `choices`.
#[derive(Debug, Clone)]
pub struct Choice {
    choices: Vec<f64>,
    state: RandomState,
}

impl Choice {
    pub fn new(choices: Vec<f64>, config: RandomConfig, time: &Time) -> DataViewResult<Self> {
        if choices.is_empty() {
            return Err(DataViewError::invalid_parameter(
                "choices",
                "need at least one value to choose from",
            ));
        }
        Ok(Self {
            choices,
            state: RandomState::new(config, time, "Choice"),
        })
    }

    pub fn choices(&self) -> &[f64] {
        &self.choices
    }
}

impl NumberGenerator for Choice {
    fn next_value(&mut self) -> f64 {
        let len = self.choices.len();
        let index = self.state.rng().random_range(0..len);
        self.choices[index]
    }
}

/// Gaussian value with mean `mu` and standard deviation `sigma`.
#[derive(Debug, Clone)]
pub struct NormalRandom {
    distribution: Normal<f64>,
    state: RandomState,
}

impl NormalRandom {
    /// Fails when `sigma` is negative or not finite.
    pub fn new(mu: f64, sigma: f64, config: RandomConfig, time: &Time) -> DataViewResult<Self> {
        let distribution = Normal::new(mu, sigma)
            .map_err(|e| DataViewError::invalid_parameter("sigma", format!("{sigma}: {e}")))?;
        Ok(Self {
            distribution,
            state: RandomState::new(config, time, "NormalRandom"),
        })
    }

    pub fn mu(&self) -> f64 {
        self.distribution.mean()
    }

    pub fn sigma(&self) -> f64 {
        self.distribution.std_dev()
    }
}

impl NumberGenerator for NormalRandom {
    fn next_value(&mut self) -> f64 {
        self.distribution.sample(self.state.rng())
    }
}

/// Circular normal angle in `[0, 2π)` around `mu` with concentration
/// `kappa`. A vanishing `kappa` gives a uniform angle.
#[derive(Debug, Clone)]
pub struct VonMisesRandom {
    pub mu: f64,
    pub kappa: f64,
    state: RandomState,
}

impl VonMisesRandom {
    pub fn new(mu: f64, kappa: f64, config: RandomConfig, time: &Time) -> DataViewResult<Self> {
        if kappa < 0.0 {
            return Err(DataViewError::invalid_parameter(
                "kappa",
                format!("concentration must be non-negative, got {kappa}"),
            ));
        }
        Ok(Self {
            mu,
            kappa,
            state: RandomState::new(config, time, "VonMisesRandom"),
        })
    }
}

impl NumberGenerator for VonMisesRandom {
    fn next_value(&mut self) -> f64 {
        let (mu, kappa) = (self.mu, self.kappa);
        let rng = self.state.rng();
        if kappa <= 1e-6 {
            return TAU * rng.random::<f64>();
        }

        // Best & Fisher rejection sampler.
        let s = 0.5 / kappa;
        let r = s + (1.0 + s * s).sqrt();
        let z = loop {
            let u1: f64 = rng.random();
            let z = (PI * u1).cos();
            let d = z / (r + z);
            let u2: f64 = rng.random();
            if u2 < 1.0 - d * d || u2 <= (1.0 - d) * d.exp() {
                break z;
            }
        };
        let q = 1.0 / r;
        let f = ((q + z) / (1.0 + q * z)).clamp(-1.0, 1.0);
        let theta = if rng.random::<f64>() > 0.5 {
            mu + f.acos()
        } else {
            mu - f.acos()
        };
        theta.rem_euclid(TAU)
    }
}
