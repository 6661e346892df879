//! Cross-sectional statistics.

use crate::MathError;

/// Percentile of `values` with linear interpolation between order statistics.
///
/// For sorted values `x_0 <= ... <= x_{n-1}` and `h = (n - 1) * q`, returns
/// `x_⌊h⌋ + (h - ⌊h⌋) * (x_⌊h⌋+1 - x_⌊h⌋)`. Non-finite values are ignored.
///
/// # Errors
/// Returns `MathError::InvalidPercentile` if `q` is outside `[0, 1]` and
/// `MathError::EmptyData` if no finite value is present.
pub fn percentile(values: &[f64], q: f64) -> Result<f64, MathError> {
    if !(0.0..=1.0).contains(&q) {
        return Err(MathError::InvalidPercentile(q));
    }

    let mut sorted: Vec<f64> = values.iter().copied().filter(|x| x.is_finite()).collect();
    if sorted.is_empty() {
        return Err(MathError::EmptyData);
    }
    sorted.sort_by(f64::total_cmp);

    let h = (sorted.len() - 1) as f64 * q;
    let lo = h.floor() as usize;
    let hi = (lo + 1).min(sorted.len() - 1);
    Ok(sorted[lo] + (h - lo as f64) * (sorted[hi] - sorted[lo]))
}

/// Median of `values` (50th percentile, averaging the middle pair).
///
/// # Errors
/// Returns `MathError::EmptyData` if no finite value is present.
pub fn median(values: &[f64]) -> Result<f64, MathError> {
    percentile(values, 0.5)
}

/// Arithmetic mean. `None` for an empty slice.
#[must_use]
pub fn mean(values: &[f64]) -> Option<f64> {
    (!values.is_empty()).then(|| values.iter().sum::<f64>() / values.len() as f64)
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(&[1.0, 2.0, 3.0, 4.0, 5.0], 0.3, 2.2)]
    #[case(&[1.0, 2.0, 3.0, 4.0, 5.0], 0.7, 3.8)]
    #[case(&[5.0, 1.0, 3.0], 0.3, 2.2)]
    #[case(&[10.0, 20.0, 30.0, 40.0], 0.0, 10.0)]
    #[case(&[10.0, 20.0, 30.0, 40.0], 1.0, 40.0)]
    #[case(&[7.0], 0.7, 7.0)]
    fn percentile_interpolates(#[case] values: &[f64], #[case] q: f64, #[case] expected: f64) {
        assert_relative_eq!(percentile(values, q).unwrap(), expected, epsilon = 1e-12);
    }

    #[test]
    fn percentile_ignores_nan() {
        let p = percentile(&[f64::NAN, 1.0, 2.0, 3.0], 0.5).unwrap();
        assert_relative_eq!(p, 2.0, epsilon = 1e-12);
    }

    #[test]
    fn percentile_rejects_bad_input() {
        assert!(matches!(percentile(&[1.0], 1.5), Err(MathError::InvalidPercentile(_))));
        assert!(matches!(percentile(&[], 0.5), Err(MathError::EmptyData)));
    }

    #[test]
    fn median_even_count_averages_middle() {
        assert_relative_eq!(median(&[4.0, 1.0, 3.0, 2.0]).unwrap(), 2.5, epsilon = 1e-12);
    }

    #[test]
    fn mean_of_empty_is_none() {
        assert_eq!(mean(&[]), None);
        assert_relative_eq!(mean(&[1.0, 2.0, 6.0]).unwrap(), 3.0);
    }
}
