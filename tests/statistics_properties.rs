use proptest::prelude::*;
use team_security_report::statistics::{gini_coefficient, mean, standard_deviation};

proptest! {
    #[test]
    fn mean_lies_between_min_and_max(values in prop::collection::vec(0u32..10_000, 1..50)) {
        let sample: Vec<f64> = values.iter().map(|&v| v as f64).collect();
        let min = sample.iter().cloned().fold(f64::INFINITY, f64::min);
        let max = sample.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        let m = mean(&sample);
        prop_assert!(m >= min - 1e-9 && m <= max + 1e-9);
    }

    #[test]
    fn std_dev_is_non_negative(values in prop::collection::vec(0u32..10_000, 0..50)) {
        let sample: Vec<f64> = values.iter().map(|&v| v as f64).collect();
        prop_assert!(standard_deviation(&sample) >= 0.0);
    }

    #[test]
    fn gini_of_repeated_value_is_zero(x in 1u32..10_000, n in 1usize..30) {
        let sample = vec![x as f64; n];
        prop_assert!(gini_coefficient(&sample).abs() < 1e-9);
    }

    #[test]
    fn gini_is_bounded(values in prop::collection::vec(0u32..10_000, 1..50)) {
        let sample: Vec<f64> = values.iter().map(|&v| v as f64).collect();
        let g = gini_coefficient(&sample);
        prop_assert!(g >= -1e-9 && g < 1.0);
    }

    #[test]
    fn gini_ignores_order(mut values in prop::collection::vec(0u32..10_000, 1..30)) {
        let forward: Vec<f64> = values.iter().map(|&v| v as f64).collect();
        values.reverse();
        let backward: Vec<f64> = values.iter().map(|&v| v as f64).collect();
        prop_assert!((gini_coefficient(&forward) - gini_coefficient(&backward)).abs() < 1e-9);
    }
}
