//! Descriptive statistics and root-sum-square combination.

use serde::{Deserialize, Serialize};

/// Summary of a sample, NaN-free.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub count: usize,
    pub mean: f64,
    /// Sample standard deviation (n − 1); 0.0 for a single value.
    pub std: f64,
    pub min: f64,
    pub max: f64,
    /// std / |mean|; 0.0 when the mean is zero.
    pub cv: f64,
}

pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Sample standard deviation with Bessel's correction.
pub fn sample_std(values: &[f64]) -> Option<f64> {
    let m = mean(values)?;
    if values.len() < 2 {
        return Some(0.0);
    }
    let ss: f64 = values.iter().map(|v| (v - m).powi(2)).sum();
    Some((ss / (values.len() - 1) as f64).sqrt())
}

/// Summary over the finite entries of `values`; `None` if there are none.
pub fn describe(values: &[f64]) -> Option<Summary> {
    let finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    let m = mean(&finite)?;
    let std = sample_std(&finite)?;
    let min = finite.iter().copied().fold(f64::INFINITY, f64::min);
    let max = finite.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let cv = if m != 0.0 { std / m.abs() } else { 0.0 };
    Some(Summary {
        count: finite.len(),
        mean: m,
        std,
        min,
        max,
        cv,
    })
}

/// sqrt(Σ xᵢ²)
pub fn root_sum_square<I>(values: I) -> f64
where
    I: IntoIterator<Item = f64>,
{
    values.into_iter().map(|v| v * v).sum::<f64>().sqrt()
}

/// First forward difference, one element shorter than the input.
pub fn diff(values: &[f64]) -> Vec<f64> {
    values.windows(2).map(|w| w[1] - w[0]).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mean_and_std() {
        let v = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert!((mean(&v).unwrap() - 5.0).abs() < 1e-12);
        // population std is 2.0; sample std = 2·sqrt(8/7)
        let expected = 2.0 * (8.0f64 / 7.0).sqrt();
        assert!((sample_std(&v).unwrap() - expected).abs() < 1e-12);
    }

    #[test]
    fn test_describe_skips_non_finite() {
        let s = describe(&[1.0, f64::NAN, 3.0, f64::INFINITY]).unwrap();
        assert_eq!(s.count, 2);
        assert!((s.mean - 2.0).abs() < 1e-12);
        assert_eq!(s.min, 1.0);
        assert_eq!(s.max, 3.0);
        assert!(describe(&[f64::NAN]).is_none());
    }

    #[test]
    fn test_single_value_has_zero_std() {
        let s = describe(&[4.2]).unwrap();
        assert_eq!(s.std, 0.0);
        assert_eq!(s.cv, 0.0);
    }

    #[test]
    fn test_root_sum_square() {
        assert!((root_sum_square([3.0, 4.0]) - 5.0).abs() < 1e-12);
        assert_eq!(root_sum_square(Vec::<f64>::new()), 0.0);
    }

    #[test]
    fn test_diff() {
        assert_eq!(diff(&[1.0, 4.0, 9.0]), vec![3.0, 5.0]);
        assert!(diff(&[1.0]).is_empty());
    }
}
