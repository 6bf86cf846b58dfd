//! Distribution statistics over a sample of non-negative counts.
//!
//! Every function returns 0 for an empty sample.

use crate::model::DistributionStats;

pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population standard deviation (divides by `n`, not `n - 1`).
pub fn standard_deviation(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mean = mean(values);
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / values.len() as f64;
    variance.sqrt()
}

/// Gini-style inequality over raw counts.
///
/// With the sample sorted ascending and 1-based ranks `i`:
/// `(2 * Σ(x_i * i)) / (n * Σx) - (n + 1) / n`.
/// Counts are not normalized for sample size, so values from repositories
/// with different numbers of severities are not directly comparable.
pub fn gini_coefficient(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));

    let n = sorted.len() as f64;
    let total: f64 = sorted.iter().sum();
    if total == 0.0 {
        return 0.0;
    }
    let weighted: f64 = sorted
        .iter()
        .enumerate()
        .map(|(i, v)| v * (i + 1) as f64)
        .sum();

    (2.0 * weighted) / (n * total) - (n + 1.0) / n
}

pub fn describe(values: &[f64]) -> DistributionStats {
    DistributionStats {
        mean: mean(values),
        standard_deviation: standard_deviation(values),
        gini_coefficient: gini_coefficient(values),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    #[test]
    fn test_empty_sample_is_zero() {
        assert_eq!(mean(&[]), 0.0);
        assert_eq!(standard_deviation(&[]), 0.0);
        assert_eq!(gini_coefficient(&[]), 0.0);
        assert_eq!(describe(&[]), DistributionStats::default());
    }

    #[test]
    fn test_mean_and_std_dev() {
        let sample = [1.0, 2.0, 3.0, 4.0];
        assert!((mean(&sample) - 2.5).abs() < EPS);
        assert!((standard_deviation(&sample) - 1.118_033_988_749_895).abs() < EPS);
    }

    #[test]
    fn test_gini_perfect_equality() {
        assert!(gini_coefficient(&[4.0, 4.0, 4.0]).abs() < EPS);
        assert!(gini_coefficient(&[1.0]).abs() < EPS);
    }

    #[test]
    fn test_gini_all_zero_sum() {
        assert_eq!(gini_coefficient(&[0.0, 0.0, 0.0]), 0.0);
    }

    #[test]
    fn test_gini_is_order_independent() {
        let a = gini_coefficient(&[5.0, 1.0, 3.0]);
        let b = gini_coefficient(&[1.0, 3.0, 5.0]);
        assert!((a - b).abs() < EPS);
    }

    #[test]
    fn test_gini_known_values() {
        // sorted [0, 10]: C = 20, S = 10, n = 2 -> 40/20 - 3/2 = 0.5
        assert!((gini_coefficient(&[10.0, 0.0]) - 0.5).abs() < EPS);
        // sorted [1, 2, 3, 4]: C = 30, S = 10 -> 60/40 - 5/4 = 0.25
        assert!((gini_coefficient(&[1.0, 2.0, 3.0, 4.0]) - 0.25).abs() < EPS);
    }
}
