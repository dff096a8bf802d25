//! Scheduling the importance-sampling exponent.
use serde::{Deserialize, Serialize};

/// Linear annealing of the importance-sampling exponent beta.
///
/// The memory itself takes beta per sample call; this helper lets a training
/// loop ramp beta from `beta_0` towards `beta_final` over `n_final`
/// optimization steps, the usual schedule for prioritized replay.
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
pub struct BetaSchedule {
    /// Initial value of beta.
    pub beta_0: f64,

    /// Final value of beta.
    pub beta_final: f64,

    /// Optimization steps after which beta stays at its final value.
    pub n_final: usize,

    /// Optimization steps taken so far.
    pub n: usize,
}

impl BetaSchedule {
    /// Creates a schedule.
    pub fn new(beta_0: f64, beta_final: f64, n_final: usize) -> Self {
        Self {
            beta_0,
            beta_final,
            n_final,
            n: 0,
        }
    }

    /// Current value of beta.
    pub fn beta(&self) -> f64 {
        if self.n >= self.n_final {
            self.beta_final
        } else {
            let d = self.beta_final - self.beta_0;
            self.beta_0 + d * (self.n as f64 / self.n_final as f64)
        }
    }

    /// Advances the schedule by one optimization step.
    pub fn step(&mut self) {
        self.n += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::BetaSchedule;

    #[test]
    fn test_linear_ramp() {
        let mut s = BetaSchedule::new(0.4, 1.0, 4);
        assert!((s.beta() - 0.4).abs() < 1e-12);
        s.step();
        s.step();
        assert!((s.beta() - 0.7).abs() < 1e-12);
        for _ in 0..10 {
            s.step();
        }
        assert!((s.beta() - 1.0).abs() < 1e-12);
    }
}
