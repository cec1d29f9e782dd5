//! When the simulated opponent concedes.
//!
//! The concession chance grows with the number of rounds and with the time
//! spent debating, but the opponent never concedes before `min_rounds`.

use std::time::Duration;

use rand::Rng;
use serde::Serialize;
use tracing::debug;

use crate::config::SurrenderConfig;

/// Result of one surrender evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SurrenderDecision {
    pub eligible: bool,
    pub probability: f64,
    pub draw: f64,
    pub surrender: bool,
}

#[derive(Debug, Clone)]
pub struct SurrenderPolicy {
    config: SurrenderConfig,
}

impl Default for SurrenderPolicy {
    fn default() -> Self {
        Self::new(SurrenderConfig::default())
    }
}

impl SurrenderPolicy {
    pub fn new(config: SurrenderConfig) -> Self {
        Self { config }
    }

    pub fn round_factor(&self, round_count: u32) -> f64 {
        (self.config.round_weight * f64::from(round_count)).min(self.config.round_cap)
    }

    pub fn time_factor(&self, elapsed: Duration) -> f64 {
        let secs = elapsed.as_secs_f64();
        if secs > self.config.late_after_secs as f64 {
            self.config.late_factor
        } else if secs >= self.config.mid_after_secs as f64 {
            self.config.mid_factor
        } else {
            0.0
        }
    }

    /// Chance of conceding, clamped to [0, 1].
    pub fn probability(&self, round_count: u32, elapsed: Duration) -> f64 {
        (self.round_factor(round_count) + self.time_factor(elapsed)).clamp(0.0, 1.0)
    }

    pub fn is_eligible(&self, round_count: u32) -> bool {
        round_count >= self.config.min_rounds
    }

    /// Draw once and decide. Call after the round counter has been bumped
    /// for the current turn.
    pub fn decide<R: Rng + ?Sized>(
        &self,
        round_count: u32,
        elapsed: Duration,
        rng: &mut R,
    ) -> SurrenderDecision {
        let eligible = self.is_eligible(round_count);
        let probability = self.probability(round_count, elapsed);
        let draw: f64 = rng.random();
        let surrender = eligible && draw < probability;

        debug!(
            round_count,
            elapsed_secs = elapsed.as_secs(),
            eligible,
            probability,
            surrender,
            "surrender evaluated"
        );

        SurrenderDecision {
            eligible,
            probability,
            draw,
            surrender,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn minutes(m: u64) -> Duration {
        Duration::from_secs(m * 60)
    }

    #[test]
    fn test_probability_components() {
        let policy = SurrenderPolicy::default();
        assert!((policy.probability(8, minutes(16)) - 0.9).abs() < 1e-9);
        assert!((policy.probability(3, minutes(5)) - 0.3).abs() < 1e-9);
        assert!((policy.probability(7, minutes(12)) - 0.7).abs() < 1e-9);
        assert_eq!(policy.time_factor(minutes(10)), 0.2);
        assert_eq!(policy.time_factor(minutes(15)), 0.2);
        assert_eq!(policy.time_factor(minutes(15) + Duration::from_secs(1)), 0.4);
        assert_eq!(policy.time_factor(Duration::from_secs(599)), 0.0);
    }

    #[test]
    fn test_never_surrenders_before_min_rounds() {
        let policy = SurrenderPolicy::default();
        let mut rng = StdRng::seed_from_u64(11);
        for round_count in 0..7 {
            for elapsed in [minutes(0), minutes(11), minutes(60)] {
                for _ in 0..200 {
                    assert!(!policy.decide(round_count, elapsed, &mut rng).surrender);
                }
            }
        }
    }

    #[test]
    fn test_probability_is_monotonic() {
        let policy = SurrenderPolicy::default();
        let times: Vec<Duration> = (0..40).map(|m| minutes(m) / 2).collect();
        for round_count in 0..20 {
            for pair in times.windows(2) {
                assert!(
                    policy.probability(round_count, pair[0]) <= policy.probability(round_count, pair[1])
                );
            }
            for &elapsed in &times {
                assert!(
                    policy.probability(round_count, elapsed)
                        <= policy.probability(round_count + 1, elapsed)
                );
            }
        }
    }

    #[test]
    fn test_late_long_debate_surrenders_about_ninety_percent() {
        let policy = SurrenderPolicy::default();
        let mut rng = StdRng::seed_from_u64(2024);
        let trials = 10_000;
        let surrendered = (0..trials)
            .filter(|_| policy.decide(8, minutes(16), &mut rng).surrender)
            .count();
        let rate = surrendered as f64 / trials as f64;
        assert!((0.88..0.92).contains(&rate), "rate = {rate}");
    }

    #[test]
    fn test_probability_is_clamped() {
        let policy = SurrenderPolicy::new(SurrenderConfig {
            round_cap: 0.9,
            late_factor: 0.8,
            ..SurrenderConfig::default()
        });
        assert_eq!(policy.probability(20, minutes(30)), 1.0);

        let mut rng = StdRng::seed_from_u64(5);
        assert!(policy.decide(20, minutes(30), &mut rng).surrender);
    }
}
