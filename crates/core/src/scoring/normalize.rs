use crate::errors::DomainError;

pub const DEFAULT_MAX_SCORE_THRESHOLD: f64 = 100.0;

/// Maps an unbounded raw score onto `[0, 100)` with a saturating curve.
///
/// `normalize(raw) = max(raw, 0) / (max(raw, 0) + K) * 100`, rounded to two
/// decimals. A raw score equal to `K` lands on exactly 50.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScoreNormalizer {
    max_score_threshold: f64,
}

impl Default for ScoreNormalizer {
    fn default() -> Self {
        Self { max_score_threshold: DEFAULT_MAX_SCORE_THRESHOLD }
    }
}

impl ScoreNormalizer {
    pub fn new(max_score_threshold: f64) -> Result<Self, DomainError> {
        if !max_score_threshold.is_finite() || max_score_threshold <= 0.0 {
            return Err(DomainError::InvalidThreshold(format!(
                "max score threshold must be a positive finite number (got {max_score_threshold})"
            )));
        }
        Ok(Self { max_score_threshold })
    }

    pub fn threshold(&self) -> f64 {
        self.max_score_threshold
    }

    pub fn normalize(&self, raw_score: i64) -> f64 {
        let clamped = raw_score.max(0) as f64;
        let normalized = clamped / (clamped + self.max_score_threshold) * 100.0;
        round_to_cents(normalized)
    }
}

fn round_to_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::ScoreNormalizer;

    #[test]
    fn zero_and_negative_scores_normalize_to_zero() {
        let normalizer = ScoreNormalizer::default();

        assert_eq!(normalizer.normalize(0), 0.0);
        assert_eq!(normalizer.normalize(-25), 0.0);
    }

    #[test]
    fn threshold_maps_to_fifty() {
        assert_eq!(ScoreNormalizer::default().normalize(100), 50.0);

        let custom = ScoreNormalizer::new(40.0).expect("valid threshold");
        assert_eq!(custom.normalize(40), 50.0);
    }

    #[test]
    fn curve_is_strictly_increasing_over_realistic_scores() {
        let normalizer = ScoreNormalizer::default();
        let mut previous = normalizer.normalize(0);

        for raw in 1..=800 {
            let next = normalizer.normalize(raw);
            assert!(next > previous, "normalize({raw}) = {next} should exceed {previous}");
            previous = next;
        }
    }

    #[test]
    fn curve_never_reaches_one_hundred() {
        let normalizer = ScoreNormalizer::default();

        assert!(normalizer.normalize(1_000_000) < 100.0);
    }

    #[test]
    fn rounds_to_two_decimals() {
        assert_eq!(ScoreNormalizer::default().normalize(19), 15.97);
    }

    #[test]
    fn non_positive_thresholds_are_rejected() {
        assert!(ScoreNormalizer::new(0.0).is_err());
        assert!(ScoreNormalizer::new(-1.0).is_err());
        assert!(ScoreNormalizer::new(f64::NAN).is_err());
    }
}
