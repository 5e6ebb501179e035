//! Learning gains and the regression-based significance test.
//!
//! Gains of both cohorts are regressed on a 0/1 intervention dummy with
//! ordinary least squares. The slope is the difference of mean gains, and
//! its two-tailed p-value comes from the Student's t distribution with
//! `n - 2` degrees of freedom.

use serde::{Deserialize, Serialize};
use statrs::distribution::{ContinuousCDF, StudentsT};

use crate::comparison::StatsRow;

/// Intervention indicator of control observations.
pub const CONTROL: f64 = 0.0;
/// Intervention indicator of intervention observations.
pub const INTERVENTION: f64 = 1.0;

/// Post minus pre for both cohorts of every row, interleaved control then
/// intervention, with the matching indicator for each gain.
pub fn learning_gains(rows: &[StatsRow]) -> (Vec<f64>, Vec<f64>) {
    let mut gains = Vec::with_capacity(rows.len() * 2);
    let mut interventions = Vec::with_capacity(rows.len() * 2);
    for row in rows {
        gains.push(row.post_control - row.pre_control);
        gains.push(row.post_intervention - row.pre_intervention);
        interventions.push(CONTROL);
        interventions.push(INTERVENTION);
    }
    (gains, interventions)
}

/// Fitted line `gain = beta0 + beta1 * intervention`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Regression {
    /// Intercept: mean gain of the control cohort.
    pub beta0: f64,
    /// Slope: intervention minus control mean gain.
    pub beta1: f64,
    pub r_squared: f64,
}

fn raw_mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

/// Arithmetic mean, `0.0` for an empty slice.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        raw_mean(values)
    }
}

/// Unweighted ordinary least squares of `gains` on `interventions`.
///
/// Degenerate inputs yield `NaN` fields rather than an error.
pub fn linear_regression(gains: &[f64], interventions: &[f64]) -> Regression {
    let x_mean = raw_mean(interventions);
    let y_mean = raw_mean(gains);

    let (sxx, sxy) = interventions
        .iter()
        .zip(gains)
        .fold((0.0, 0.0), |(sxx, sxy), (x, y)| {
            let dx = x - x_mean;
            (sxx + dx * dx, sxy + dx * (y - y_mean))
        });

    let beta1 = sxy / sxx;
    let beta0 = y_mean - beta1 * x_mean;

    let (rss, tss) = interventions
        .iter()
        .zip(gains)
        .fold((0.0, 0.0), |(rss, tss), (x, y)| {
            let residual = y - (beta0 + beta1 * x);
            let deviation = y - y_mean;
            (rss + residual * residual, tss + deviation * deviation)
        });

    Regression {
        beta0,
        beta1,
        r_squared: 1.0 - rss / tss,
    }
}

/// Two-tailed p-value of the slope.
///
/// `NaN` when the standard error is undefined: fewer than three
/// observations, or no contrast in the indicator.
pub fn p_value(beta0: f64, beta1: f64, gains: &[f64], interventions: &[f64]) -> f64 {
    let n = gains.len() as f64;
    let rss: f64 = gains
        .iter()
        .zip(interventions)
        .map(|(y, x)| {
            let residual = y - (beta0 + beta1 * x);
            residual * residual
        })
        .sum();

    let x_mean = raw_mean(interventions);
    let sxx: f64 = interventions.iter().map(|x| (x - x_mean).powi(2)).sum();

    let df = n - 2.0;
    let standard_error = (rss / df / sxx).sqrt();
    let t = beta1 / standard_error;

    tracing::debug!(rss, standard_error, t, df, "slope significance");

    if t.is_nan() || df <= 0.0 {
        return f64::NAN;
    }
    if t.is_infinite() {
        return 0.0;
    }

    match StudentsT::new(0.0, 1.0, df) {
        Ok(dist) => 2.0 * (1.0 - dist.cdf(t.abs())),
        Err(_) => f64::NAN,
    }
}

/// Regression and significance of one comparison, ready for display.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GainStatistics {
    pub beta0: f64,
    pub beta1: f64,
    pub r_squared: f64,
    pub p_value: f64,
    /// Number of gains in the regression.
    pub observations: usize,
}

impl GainStatistics {
    /// Run the full test on aligned rows.
    ///
    /// The result is normalized: an undefined p-value becomes `1.0` and an
    /// undefined R² becomes `0.0`.
    pub fn from_rows(rows: &[StatsRow]) -> Self {
        let (gains, interventions) = learning_gains(rows);
        let regression = linear_regression(&gains, &interventions);
        let p = p_value(regression.beta0, regression.beta1, &gains, &interventions);

        GainStatistics {
            beta0: regression.beta0,
            beta1: regression.beta1,
            r_squared: regression.r_squared,
            p_value: p,
            observations: gains.len(),
        }
        .normalized()
    }

    /// Replace undefined statistics with their neutral values.
    pub fn normalized(self) -> Self {
        GainStatistics {
            p_value: if self.p_value.is_nan() { 1.0 } else { self.p_value },
            r_squared: if self.r_squared.is_nan() {
                0.0
            } else {
                self.r_squared
            },
            ..self
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(pre_control: f64, post_control: f64, pre_int: f64, post_int: f64) -> StatsRow {
        StatsRow {
            pre_control,
            post_control,
            pre_intervention: pre_int,
            post_intervention: post_int,
        }
    }

    fn close(a: f64, b: f64, tolerance: f64) -> bool {
        (a - b).abs() < tolerance
    }

    #[test]
    fn gains_are_interleaved() {
        let rows = [row(0.0, 1.0, 0.5, 1.0), row(1.0, 0.5, 0.0, 0.0)];
        let (gains, interventions) = learning_gains(&rows);
        assert_eq!(gains, vec![1.0, 0.5, -0.5, 0.0]);
        assert_eq!(interventions, vec![0.0, 1.0, 0.0, 1.0]);
    }

    #[test]
    fn slope_is_difference_of_group_means() {
        let gains = [1.0, 3.0, 2.0, 4.0, 3.0, 5.0];
        let interventions = [0.0, 1.0, 0.0, 1.0, 0.0, 1.0];
        let fit = linear_regression(&gains, &interventions);
        assert!(close(fit.beta0, 2.0, 1e-12), "beta0 = {}", fit.beta0);
        assert!(close(fit.beta1, 2.0, 1e-12), "beta1 = {}", fit.beta1);
        assert!(close(fit.r_squared, 0.6, 1e-12), "r2 = {}", fit.r_squared);
    }

    #[test]
    fn p_value_matches_students_t() {
        let gains = [1.0, 3.0, 2.0, 4.0, 3.0, 5.0];
        let interventions = [0.0, 1.0, 0.0, 1.0, 0.0, 1.0];
        let fit = linear_regression(&gains, &interventions);
        // t = sqrt(6) with 4 degrees of freedom.
        let p = p_value(fit.beta0, fit.beta1, &gains, &interventions);
        assert!(close(p, 0.070484, 1e-4), "p = {p}");
    }

    #[test]
    fn no_difference_gives_p_of_one() {
        let gains = [1.0, 1.0, 0.0, 0.0];
        let interventions = [0.0, 1.0, 0.0, 1.0];
        let fit = linear_regression(&gains, &interventions);
        assert_eq!(fit.beta1, 0.0);
        let p = p_value(fit.beta0, fit.beta1, &gains, &interventions);
        assert!(close(p, 1.0, 1e-9), "p = {p}");
    }

    #[test]
    fn degenerate_pair_is_normalized() {
        let gains = [2.0, 2.0];
        let interventions = [0.0, 1.0];
        let fit = linear_regression(&gains, &interventions);
        assert_eq!(fit.beta1, 0.0);
        assert_eq!(fit.beta0, 2.0);
        assert!(fit.r_squared.is_nan());

        let p = p_value(fit.beta0, fit.beta1, &gains, &interventions);
        assert!(p.is_nan());

        let stats = GainStatistics {
            beta0: fit.beta0,
            beta1: fit.beta1,
            r_squared: fit.r_squared,
            p_value: p,
            observations: 2,
        }
        .normalized();
        assert_eq!(stats.p_value, 1.0);
        assert_eq!(stats.r_squared, 0.0);
    }

    #[test]
    fn from_rows_runs_the_whole_test() {
        let rows = [
            row(0.0, 1.0, 0.0, 3.0),
            row(0.0, 2.0, 0.0, 4.0),
            row(0.0, 3.0, 0.0, 5.0),
        ];
        let stats = GainStatistics::from_rows(&rows);
        assert_eq!(stats.observations, 6);
        assert!(close(stats.beta1, 2.0, 1e-12));
        assert!(stats.p_value > 0.05 && stats.p_value < 0.10);
    }

    #[test]
    fn perfect_separation_is_significant() {
        let rows = [row(0.0, 0.0, 0.0, 1.0), row(0.0, 0.0, 0.0, 1.0)];
        let stats = GainStatistics::from_rows(&rows);
        assert_eq!(stats.p_value, 0.0);
        assert_eq!(stats.r_squared, 1.0);
    }

    #[test]
    fn mean_of_empty_is_zero() {
        assert_eq!(mean(&[]), 0.0);
        assert_eq!(mean(&[1.0, 0.0, 0.5]), 0.5);
    }
}
