use crate::crypto::hash::Digest;
use serde::{Deserialize, Serialize};

/// Proof-of-work target: a count of leading `'0'` hex characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DifficultyTarget {
    pub zeros: usize,
}

impl DifficultyTarget {
    pub fn new(zeros: usize) -> Self {
        Self { zeros }
    }

    pub fn prefix(&self) -> String {
        "0".repeat(self.zeros)
    }

    pub fn is_met_by(&self, digest: &Digest) -> bool {
        digest.meets_difficulty(self.zeros)
    }

    /// Mean number of attempts to hit the target with a uniform hex digest.
    pub fn expected_attempts(&self) -> f64 {
        16f64.powi(self.zeros as i32)
    }

    /// Rough wall-clock estimate at a measured hash rate.
    pub fn estimate_seconds(&self, hashrate: f64) -> Option<f64> {
        if hashrate <= 0.0 {
            return None;
        }
        Some(self.expected_attempts() / hashrate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_target_accepts_anything() {
        let target = DifficultyTarget::new(0);
        assert_eq!(target.prefix(), "");
        assert!(target.is_met_by(&Digest::from_hex("ffffffffffffffff")));
        assert_eq!(target.expected_attempts(), 1.0);
    }

    #[test]
    fn test_prefix_check() {
        let target = DifficultyTarget::new(2);
        assert_eq!(target.prefix(), "00");
        assert!(target.is_met_by(&Digest::from_hex("00f0000000000000")));
        assert!(!target.is_met_by(&Digest::from_hex("0f00000000000000")));
    }

    #[test]
    fn test_estimate_requires_positive_rate() {
        let target = DifficultyTarget::new(1);
        assert_eq!(target.estimate_seconds(0.0), None);
        assert_eq!(target.estimate_seconds(16.0), Some(1.0));
    }
}
