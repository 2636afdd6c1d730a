//! Empirical quantiles and population moments.
//!
//! All functions use generic type parameter `T: num_traits::Float` and
//! return `None` on empty or degenerate input instead of NaN.

use std::cmp::Ordering;

use num_traits::Float;

/// Quantile of an already sorted sample.
///
/// Linear interpolation between order statistics at rank `p * (n - 1)`.
/// `p` is clamped into `[0, 1]`.
///
/// # Examples
/// ```
/// use book_core::math::quantile_sorted;
///
/// let xs = [1.0_f64, 2.0, 3.0, 4.0, 5.0];
/// assert_eq!(quantile_sorted(&xs, 0.5), Some(3.0));
/// assert_eq!(quantile_sorted(&xs, 0.375), Some(2.5));
/// ```
pub fn quantile_sorted<T: Float>(sorted: &[T], p: T) -> Option<T> {
    let n = sorted.len();
    if n == 0 {
        return None;
    }
    let p = p.max(T::zero()).min(T::one());
    let rank = p * T::from(n - 1)?;
    let lo = rank.floor();
    let hi = rank.ceil();
    let lo_i = lo.to_usize()?;
    let hi_i = hi.to_usize()?.min(n - 1);
    let weight = rank - lo;
    Some(sorted[lo_i] + weight * (sorted[hi_i] - sorted[lo_i]))
}

/// Empirical `p`-quantile of an unsorted sample.
///
/// Non-finite values are ignored.
pub fn empirical_quantile<T: Float>(sample: &[T], p: T) -> Option<T> {
    let mut sorted: Vec<T> = sample.iter().copied().filter(|x| x.is_finite()).collect();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
    quantile_sorted(&sorted, p)
}

/// Arithmetic mean.
#[inline]
pub fn mean<T: Float>(xs: &[T]) -> Option<T> {
    if xs.is_empty() {
        return None;
    }
    let sum = xs.iter().fold(T::zero(), |acc, &x| acc + x);
    Some(sum / T::from(xs.len())?)
}

/// Population variance (divides by `n`).
pub fn population_variance<T: Float>(xs: &[T]) -> Option<T> {
    let m = mean(xs)?;
    let ss = xs.iter().fold(T::zero(), |acc, &x| acc + (x - m) * (x - m));
    Some(ss / T::from(xs.len())?)
}

/// Population covariance (divides by `n`). Slices must have equal length.
pub fn population_covariance<T: Float>(xs: &[T], ys: &[T]) -> Option<T> {
    if xs.len() != ys.len() {
        return None;
    }
    let mx = mean(xs)?;
    let my = mean(ys)?;
    let s = xs
        .iter()
        .zip(ys)
        .fold(T::zero(), |acc, (&x, &y)| acc + (x - mx) * (y - my));
    Some(s / T::from(xs.len())?)
}

/// Pearson correlation; `None` when either side has zero variance.
pub fn correlation<T: Float>(xs: &[T], ys: &[T]) -> Option<T> {
    let cov = population_covariance(xs, ys)?;
    let vx = population_variance(xs)?;
    let vy = population_variance(ys)?;
    if vx <= T::zero() || vy <= T::zero() {
        return None;
    }
    Some(cov / (vx * vy).sqrt())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    // ========================================
    // Quantile Tests
    // ========================================

    #[test]
    fn test_quantile_interpolates() {
        let xs = [10.0_f64, 20.0, 30.0, 40.0];
        // rank = 0.25 * 3 = 0.75
        assert_relative_eq!(empirical_quantile(&xs, 0.25).unwrap(), 17.5, epsilon = 1e-12);
        assert_eq!(empirical_quantile(&xs, 0.0), Some(10.0));
        assert_eq!(empirical_quantile(&xs, 1.0), Some(40.0));
    }

    #[test]
    fn test_quantile_unsorted_and_nan() {
        let xs = [3.0_f64, f64::NAN, 1.0, 2.0];
        assert_eq!(empirical_quantile(&xs, 0.5), Some(2.0));
    }

    #[test]
    fn test_quantile_empty() {
        assert_eq!(empirical_quantile::<f64>(&[], 0.5), None);
    }

    #[test]
    fn test_quantile_single() {
        assert_eq!(empirical_quantile(&[7.0_f64], 0.01), Some(7.0));
    }

    #[test]
    fn test_quantile_f32() {
        let xs = [1.0_f32, 2.0, 3.0];
        assert_eq!(empirical_quantile(&xs, 0.5), Some(2.0));
    }

    // ========================================
    // Moment Tests
    // ========================================

    #[test]
    fn test_population_moments() {
        let xs = [1.0_f64, 2.0, 3.0, 4.0];
        assert_relative_eq!(mean(&xs).unwrap(), 2.5);
        assert_relative_eq!(population_variance(&xs).unwrap(), 1.25);

        let ys = [2.0_f64, 4.0, 6.0, 8.0];
        assert_relative_eq!(population_covariance(&xs, &ys).unwrap(), 2.5);
        assert_relative_eq!(correlation(&xs, &ys).unwrap(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_covariance_length_mismatch() {
        assert_eq!(population_covariance(&[1.0_f64, 2.0], &[1.0]), None);
    }

    #[test]
    fn test_correlation_constant() {
        assert_eq!(correlation(&[1.0_f64, 1.0, 1.0], &[1.0, 2.0, 3.0]), None);
    }
}
