//! Plain-language verdicts for a sample size and p-value.

use serde::{Deserialize, Serialize};

/// Sample size bucket, by number of regression observations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SampleBucket {
    /// Fewer than 50.
    Small,
    /// 50 to 99.
    Moderate,
    /// 100 to 299.
    Adequate,
    /// 300 or more.
    Large,
}

impl SampleBucket {
    pub fn of(n: usize) -> Self {
        match n {
            0..=49 => SampleBucket::Small,
            50..=99 => SampleBucket::Moderate,
            100..=299 => SampleBucket::Adequate,
            _ => SampleBucket::Large,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Significance {
    /// p >= 0.10, or p undefined.
    Insignificant,
    /// 0.05 <= p < 0.10.
    Marginal,
    /// p < 0.05.
    Significant,
}

impl Significance {
    pub fn of(p_value: f64) -> Self {
        if p_value < 0.05 {
            Significance::Significant
        } else if p_value < 0.10 {
            Significance::Marginal
        } else {
            // NaN compares false above and lands here.
            Significance::Insignificant
        }
    }
}

/// Advisory sentence for one bucket combination.
pub fn verdict(sample: SampleBucket, significance: Significance) -> &'static str {
    use SampleBucket::*;
    use Significance::*;

    match (sample, significance) {
        (Small, Insignificant) => {
            "Sample size too small to draw reliable conclusions. More data is needed."
        }
        (Small, Marginal) => {
            "Results are marginally significant, but the small sample size limits reliability. Collect more data."
        }
        (Small, Significant) => {
            "Statistical significance reached, but the small sample size limits confidence. Validation with more data is recommended."
        }
        (Moderate, Insignificant) => {
            "Results are not significant. A larger sample size may help detect subtle effects."
        }
        (Moderate, Marginal) => {
            "Results are marginally significant. Consider increasing sample size for validation."
        }
        (Moderate, Significant) => {
            "Results are statistically significant, but a larger sample size would strengthen confidence."
        }
        (Adequate, Insignificant) => {
            "Results are not significant. More participants may improve statistical power."
        }
        (Adequate, Marginal) => {
            "Results are marginally significant. Consider more data to confirm findings."
        }
        (Adequate, Significant) => {
            "Results are statistically significant, supported by an adequate sample size."
        }
        (Large, Insignificant) => {
            "Results are not significant, even with a large sample size. Effect may be too small or non-existent."
        }
        (Large, Marginal) => {
            "Results are marginally significant, suggesting a possible effect. Further analysis recommended."
        }
        (Large, Significant) => {
            "Results are statistically significant and supported by a large sample size, providing robust evidence."
        }
    }
}

/// Verdict for `n` observations and a two-tailed p-value.
pub fn evaluate_experiment(n: usize, p_value: f64) -> &'static str {
    verdict(SampleBucket::of(n), Significance::of(p_value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn small_sample() {
        assert_eq!(
            evaluate_experiment(30, 0.15),
            "Sample size too small to draw reliable conclusions. More data is needed."
        );
        assert_eq!(
            evaluate_experiment(30, 0.07),
            "Results are marginally significant, but the small sample size limits reliability. Collect more data."
        );
        assert_eq!(
            evaluate_experiment(30, 0.03),
            "Statistical significance reached, but the small sample size limits confidence. Validation with more data is recommended."
        );
    }

    #[test]
    fn moderate_sample() {
        assert_eq!(
            evaluate_experiment(70, 0.15),
            "Results are not significant. A larger sample size may help detect subtle effects."
        );
        assert_eq!(
            evaluate_experiment(70, 0.07),
            "Results are marginally significant. Consider increasing sample size for validation."
        );
        assert_eq!(
            evaluate_experiment(70, 0.03),
            "Results are statistically significant, but a larger sample size would strengthen confidence."
        );
    }

    #[test]
    fn adequate_sample() {
        assert_eq!(
            evaluate_experiment(150, 0.15),
            "Results are not significant. More participants may improve statistical power."
        );
        assert_eq!(
            evaluate_experiment(150, 0.07),
            "Results are marginally significant. Consider more data to confirm findings."
        );
        assert_eq!(
            evaluate_experiment(150, 0.03),
            "Results are statistically significant, supported by an adequate sample size."
        );
    }

    #[test]
    fn large_sample() {
        assert_eq!(
            evaluate_experiment(350, 0.15),
            "Results are not significant, even with a large sample size. Effect may be too small or non-existent."
        );
        assert_eq!(
            evaluate_experiment(350, 0.07),
            "Results are marginally significant, suggesting a possible effect. Further analysis recommended."
        );
        assert_eq!(
            evaluate_experiment(350, 0.03),
            "Results are statistically significant and supported by a large sample size, providing robust evidence."
        );
    }

    #[test]
    fn bucket_boundaries() {
        assert_eq!(SampleBucket::of(0), SampleBucket::Small);
        assert_eq!(SampleBucket::of(49), SampleBucket::Small);
        assert_eq!(SampleBucket::of(50), SampleBucket::Moderate);
        assert_eq!(SampleBucket::of(99), SampleBucket::Moderate);
        assert_eq!(SampleBucket::of(100), SampleBucket::Adequate);
        assert_eq!(SampleBucket::of(299), SampleBucket::Adequate);
        assert_eq!(SampleBucket::of(300), SampleBucket::Large);

        assert_eq!(Significance::of(0.10), Significance::Insignificant);
        assert_eq!(Significance::of(0.0999), Significance::Marginal);
        assert_eq!(Significance::of(0.05), Significance::Marginal);
        assert_eq!(Significance::of(0.0499), Significance::Significant);
        assert_eq!(Significance::of(0.0), Significance::Significant);
        assert_eq!(Significance::of(1.0), Significance::Insignificant);
    }

    #[test]
    fn undefined_p_is_not_significant() {
        assert_eq!(Significance::of(f64::NAN), Significance::Insignificant);
    }

    #[test]
    fn every_combination_is_distinct() {
        let samples = [
            SampleBucket::Small,
            SampleBucket::Moderate,
            SampleBucket::Adequate,
            SampleBucket::Large,
        ];
        let levels = [
            Significance::Insignificant,
            Significance::Marginal,
            Significance::Significant,
        ];
        let messages: HashSet<&str> = samples
            .iter()
            .flat_map(|s| levels.iter().map(move |l| verdict(*s, *l)))
            .collect();
        assert_eq!(messages.len(), 12);
    }
}
