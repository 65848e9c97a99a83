//! A shared simulation clock and the generators driven by it.

use std::cell::Cell;
use std::rc::Rc;

use super::NumberGenerator;
use crate::{DataViewError, DataViewResult};

#[derive(Debug, Default)]
struct Clock {
    now: Cell<f64>,
    seed: Cell<u64>,
}

/// Cloneable handle to a shared clock.
///
/// Every clone observes the same time, so advancing one handle advances the
/// time seen by every generator built from it. The clock also carries the
/// global seed mixed into time-dependent random generators.
#[derive(Debug, Clone, Default)]
pub struct Time {
    clock: Rc<Clock>,
}

impl Time {
    pub fn new() -> Self {
        Self::default()
    }

    /// A clock starting at `now`.
    pub fn at(now: f64) -> Self {
        let time = Self::new();
        time.set(now);
        time
    }

    pub fn now(&self) -> f64 {
        self.clock.now.get()
    }

    pub fn set(&self, now: f64) {
        self.clock.now.set(now);
    }

    /// Move the clock forward by `dt` and return the new time.
    pub fn advance(&self, dt: f64) -> f64 {
        let now = self.now() + dt;
        self.set(now);
        now
    }

    /// Global seed for time-dependent random generators.
    pub fn seed(&self) -> u64 {
        self.clock.seed.get()
    }

    pub fn set_seed(&self, seed: u64) {
        self.clock.seed.set(seed);
    }

    /// True if both handles share one clock.
    pub fn same_clock(&self, other: &Time) -> bool {
        Rc::ptr_eq(&self.clock, &other.clock)
    }
}

/// The current time scaled by `factor`.
#[derive(Debug, Clone)]
pub struct TimeFactor {
    pub factor: f64,
    time: Time,
}

impl TimeFactor {
    pub fn new(factor: f64, time: &Time) -> Self {
        Self {
            factor,
            time: time.clone(),
        }
    }
}

impl NumberGenerator for TimeFactor {
    fn next_value(&mut self) -> f64 {
        self.time.now() * self.factor
    }
}

/// 1.0 strictly after `onset` and up to and including `onset + duration`,
/// 0.0 otherwise. Without a duration this is a step at `onset`.
#[derive(Debug, Clone)]
pub struct BoxCar {
    pub onset: f64,
    pub duration: Option<f64>,
    time: Time,
}

impl BoxCar {
    pub fn new(onset: f64, duration: Option<f64>, time: &Time) -> Self {
        Self {
            onset,
            duration,
            time: time.clone(),
        }
    }
}

impl NumberGenerator for BoxCar {
    fn next_value(&mut self) -> f64 {
        let now = self.time.now();
        if now <= self.onset {
            return 0.0;
        }
        match self.duration {
            Some(duration) if now > self.onset + duration => 0.0,
            _ => 1.0,
        }
    }
}

/// Alternating 1.0 ("on") and 0.0 ("off") periods starting at `onset`.
#[derive(Debug, Clone)]
pub struct SquareWave {
    onset: f64,
    duration: f64,
    off_duration: f64,
    time: Time,
}

impl SquareWave {
    /// `off_duration` defaults to `duration`. Fails if `onset` exceeds the
    /// off duration or the period is not positive.
    pub fn new(onset: f64, duration: f64, off_duration: Option<f64>, time: &Time) -> DataViewResult<Self> {
        let off_duration = off_duration.unwrap_or(duration);
        if onset > off_duration {
            return Err(DataViewError::invalid_parameter(
                "onset",
                format!("must not exceed the off duration {off_duration}, got {onset}"),
            ));
        }
        if duration < 0.0 || off_duration < 0.0 || duration + off_duration <= 0.0 {
            return Err(DataViewError::invalid_parameter(
                "duration",
                "on and off durations must be non-negative with a positive period",
            ));
        }
        Ok(Self {
            onset,
            duration,
            off_duration,
            time: time.clone(),
        })
    }

    pub const fn period(&self) -> f64 {
        self.duration + self.off_duration
    }
}

impl NumberGenerator for SquareWave {
    fn next_value(&mut self) -> f64 {
        let phase = (self.time.now() - self.onset).rem_euclid(self.period());
        if phase < self.duration { 1.0 } else { 0.0 }
    }
}

/// `ending_value + (starting_value - ending_value) * base^(-t / time_constant)`.
#[derive(Debug, Clone)]
pub struct ExponentialDecay {
    pub starting_value: f64,
    pub ending_value: f64,
    pub time_constant: f64,
    pub base: f64,
    time: Time,
}

impl ExponentialDecay {
    pub fn new(time: &Time) -> Self {
        Self {
            starting_value: 1.0,
            ending_value: 0.0,
            time_constant: 10000.0,
            base: std::f64::consts::E,
            time: time.clone(),
        }
    }

    pub fn with_values(mut self, starting_value: f64, ending_value: f64) -> Self {
        self.starting_value = starting_value;
        self.ending_value = ending_value;
        self
    }

    pub fn with_time_constant(mut self, time_constant: f64) -> Self {
        self.time_constant = time_constant;
        self
    }

    /// Base 2 makes the time constant a half-life.
    pub fn with_base(mut self, base: f64) -> Self {
        self.base = base;
        self
    }
}

impl NumberGenerator for ExponentialDecay {
    fn next_value(&mut self) -> f64 {
        let exponent = -self.time.now() / self.time_constant;
        self.ending_value + (self.starting_value - self.ending_value) * self.base.powf(exponent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx_eq::assert_approx_eq;

    #[test]
    fn test_clones_share_clock() {
        let time = Time::new();
        let other = time.clone();
        time.advance(2.5);
        assert_eq!(other.now(), 2.5);
        assert!(time.same_clock(&other));
        assert!(!time.same_clock(&Time::new()));
    }

    #[test]
    fn test_time_factor() {
        let time = Time::at(3.0);
        let mut scaled = TimeFactor::new(2.0, &time);
        assert_eq!(scaled.next_value(), 6.0);
    }

    #[test]
    fn test_boxcar_bounds() {
        let time = Time::new();
        let mut boxcar = BoxCar::new(1.0, Some(2.0), &time);
        let samples: Vec<f64> = [1.0, 1.5, 3.0, 3.5]
            .iter()
            .map(|t| {
                time.set(*t);
                boxcar.next_value()
            })
            .collect();
        assert_eq!(samples, vec![0.0, 1.0, 1.0, 0.0]);

        let mut step = BoxCar::new(0.0, None, &time);
        time.set(1e9);
        assert_eq!(step.next_value(), 1.0);
    }

    #[test]
    fn test_square_wave() {
        let time = Time::new();
        let mut wave = SquareWave::new(0.0, 1.0, Some(3.0), &time).expect("valid");
        let samples: Vec<f64> = [0.0, 0.5, 1.0, 3.9, 4.0, -0.5]
            .iter()
            .map(|t| {
                time.set(*t);
                wave.next_value()
            })
            .collect();
        assert_eq!(samples, vec![1.0, 1.0, 0.0, 0.0, 1.0, 0.0]);
        assert!(SquareWave::new(2.0, 1.0, None, &time).is_err());
    }

    #[test]
    fn test_exponential_decay() {
        let time = Time::new();
        let mut decay = ExponentialDecay::new(&time)
            .with_values(10.0, 2.0)
            .with_time_constant(5.0)
            .with_base(2.0);
        assert_approx_eq!(decay.next_value(), 10.0, 1e-12);
        time.set(5.0);
        assert_approx_eq!(decay.next_value(), 6.0, 1e-12);
    }
}
