/// Precomputed percentile values for a dataset.
///
/// This structure stores percentile-value pairs for efficient lookup
/// of the percentile points a report asks for.
///
/// # Examples
///
/// ```
/// use ppd_stats::percentiles::Percentiles;
///
/// let values = vec![1.0, 2.0, 3.0, 4.0, 5.0];
/// let percentiles = Percentiles::new(&values, &[25.0, 50.0, 75.0]);
///
/// assert_eq!(percentiles.get(50.0), Some(3.0));
/// assert_eq!(percentiles.get(25.0), Some(2.0));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Percentiles {
    /// Percentile-value pairs, in the order they were requested.
    /// Each tuple contains (percentile, value) where percentile is 0.0-100.0.
    values: Vec<(f64, f64)>,
}

impl Percentiles {
    /// Computes percentiles from sorted values.
    ///
    /// # Panics
    ///
    /// Panics if `sorted_values` is not sorted in ascending order.
    #[must_use]
    pub fn from_sorted(sorted_values: &[f64], percentile_points: &[f64]) -> Self {
        assert!(
            sorted_values.is_sorted_by(|a, b| a <= b),
            "values must be sorted in ascending order"
        );

        let values = percentile_points
            .iter()
            .map(|&p| (p, compute_percentile(sorted_values, p)))
            .collect();
        Self { values }
    }

    /// Computes percentiles from unsorted values.
    ///
    /// This method will sort the values internally before computing percentiles.
    #[must_use]
    pub fn new(values: &[f64], percentile_points: &[f64]) -> Self {
        let mut sorted = values.to_vec();
        sorted.sort_by(f64::total_cmp);
        Self::from_sorted(&sorted, percentile_points)
    }

    /// Gets the value at a specific percentile.
    ///
    /// Returns `None` if the percentile was not precomputed.
    ///
    /// # Examples
    ///
    /// ```
    /// use ppd_stats::percentiles::Percentiles;
    ///
    /// let values = vec![1.0, 2.0, 3.0, 4.0, 5.0];
    /// let percentiles = Percentiles::new(&values, &[50.0, 75.0]);
    ///
    /// assert_eq!(percentiles.get(75.0), Some(4.0));
    /// assert_eq!(percentiles.get(25.0), None); // Not precomputed
    /// ```
    #[must_use]
    pub fn get(&self, percentile: f64) -> Option<f64> {
        self.values.iter().find_map(|(p, value)| {
            if (*p - percentile).abs() < f64::EPSILON {
                Some(*value)
            } else {
                None
            }
        })
    }

    /// Returns an iterator over all (percentile, value) pairs.
    pub fn iter(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.values.iter().copied()
    }

    /// Returns all percentile-value pairs as a slice.
    #[must_use]
    pub fn as_slice(&self) -> &[(f64, f64)] {
        &self.values
    }
}

/// Computes a single percentile value from sorted data.
///
/// Uses linear interpolation between order statistics: for `n` values the
/// fractional rank is `p / 100 * (n - 1)`, and the result interpolates
/// between the two neighbouring sorted values. This is the same rule as
/// NumPy's default (`method="linear"`). `percentile` is clamped to
/// `[0, 100]`, so the result is monotone non-decreasing in `percentile`.
///
/// # Returns
///
/// The value at the specified percentile. Returns `f64::NAN` if the input is empty.
///
/// # Examples
///
/// ```
/// use ppd_stats::percentiles::compute_percentile;
///
/// let values = vec![1.0, 2.0, 3.0, 4.0];
///
/// assert_eq!(compute_percentile(&values, 50.0), 2.5);
/// assert_eq!(compute_percentile(&values, 0.0), 1.0);
/// assert_eq!(compute_percentile(&values, 100.0), 4.0);
/// assert_eq!(compute_percentile(&[7.0], 10.0), 7.0);
/// ```
#[expect(
    clippy::cast_sign_loss,
    clippy::cast_possible_truncation,
    clippy::cast_precision_loss
)]
#[must_use]
pub fn compute_percentile(sorted_values: &[f64], percentile: f64) -> f64 {
    let n = sorted_values.len();
    if n == 0 {
        return f64::NAN;
    }
    let rank = percentile.clamp(0.0, 100.0) / 100.0 * (n - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = (lower + 1).min(n - 1);
    let fraction = rank - rank.floor();
    let lo = sorted_values[lower];
    let hi = sorted_values[upper];
    if fraction == 0.0 {
        lo
    } else {
        // rounding in `lo + (hi - lo)` may overshoot `hi`
        (lo + (hi - lo) * fraction).min(hi)
    }
}

/// Computes the percentile rank of `value` within sorted data.
///
/// Ranks are 1-based midranks: tied values share the average of the
/// positions they occupy. The rank is scaled to `[0, 100]` as
/// `(rank - 1) / (n - 1) * 100`, so the smallest member ranks 0 and the
/// largest ranks 100.
///
/// A value that is not present in the data takes the rank halfway between
/// its neighbours (`below + 0.5`), clamped to `[0, 100]`. For a single
/// data point the rank is 100 when `value` is at or above it and 0 otherwise.
///
/// Returns `f64::NAN` if the input is empty.
///
/// # Panics
///
/// Panics if `sorted_values` is not sorted in ascending order.
///
/// # Examples
///
/// ```
/// use ppd_stats::percentiles::percentile_rank;
///
/// let values = [0.2, 0.4, 0.4, 0.8];
/// assert_eq!(percentile_rank(&values, 0.2), 0.0);
/// assert_eq!(percentile_rank(&values, 0.4), 50.0);
/// assert_eq!(percentile_rank(&values, 0.8), 100.0);
/// ```
#[expect(clippy::cast_precision_loss)]
#[must_use]
pub fn percentile_rank(sorted_values: &[f64], value: f64) -> f64 {
    assert!(
        sorted_values.is_sorted_by(|a, b| a <= b),
        "values must be sorted in ascending order"
    );

    let n = sorted_values.len();
    if n == 0 {
        return f64::NAN;
    }
    if n == 1 {
        return if value >= sorted_values[0] { 100.0 } else { 0.0 };
    }

    let below = sorted_values.partition_point(|v| *v < value);
    let not_above = sorted_values.partition_point(|v| *v <= value);
    let equal = not_above - below;

    let rank = if equal == 0 {
        below as f64 + 0.5
    } else {
        below as f64 + (equal as f64 + 1.0) / 2.0
    };
    ((rank - 1.0) / (n - 1) as f64 * 100.0).clamp(0.0, 100.0)
}

#[cfg(test)]
mod tests {
    use rand::{Rng as _, SeedableRng as _};
    use rand_pcg::Pcg32;

    use super::*;

    #[test]
    fn test_empty_values() {
        assert!(compute_percentile(&[], 50.0).is_nan());
        assert!(percentile_rank(&[], 0.5).is_nan());
    }

    #[test]
    fn test_linear_interpolation() {
        let values = [10.0, 20.0, 30.0, 40.0, 50.0];
        assert_eq!(compute_percentile(&values, 25.0), 20.0);
        assert_eq!(compute_percentile(&values, 10.0), 14.0);
        assert_eq!(compute_percentile(&values, 90.0), 46.0);
    }

    #[test]
    fn test_out_of_range_percentile_is_clamped() {
        let values = [1.0, 2.0, 3.0];
        assert_eq!(compute_percentile(&values, -5.0), 1.0);
        assert_eq!(compute_percentile(&values, 150.0), 3.0);
    }

    #[test]
    fn test_single_point_is_itself() {
        for p in [0.0, 10.0, 50.0, 90.0, 100.0] {
            assert_eq!(compute_percentile(&[0.42], p), 0.42);
        }
    }

    #[test]
    fn test_monotone_in_percentile() {
        let mut rng = Pcg32::seed_from_u64(11);
        for _ in 0..100 {
            let len = rng.random_range(1..40);
            let mut values = (0..len)
                .map(|_| rng.random_range(0.0..=1.0))
                .collect::<Vec<f64>>();
            values.sort_by(f64::total_cmp);
            let mut previous = f64::NEG_INFINITY;
            for step in 0..=200 {
                let p = f64::from(step) * 0.5;
                let value = compute_percentile(&values, p);
                assert!(previous <= value, "P{p}: {previous} > {value}");
                previous = value;
            }
        }
    }

    #[test]
    fn test_percentiles_keep_request_order() {
        let percentiles = Percentiles::new(&[3.0, 1.0, 2.0], &[90.0, 10.0]);
        let points = percentiles.iter().map(|(p, _)| p).collect::<Vec<_>>();
        assert_eq!(points, vec![90.0, 10.0]);
    }

    #[test]
    fn test_rank_midrank_for_ties() {
        let values = [1.0, 2.0, 2.0, 2.0, 3.0];
        // ties occupy ranks 2..=4, midrank 3 -> (3 - 1) / 4
        assert_eq!(percentile_rank(&values, 2.0), 50.0);
        assert_eq!(percentile_rank(&values, 1.0), 0.0);
        assert_eq!(percentile_rank(&values, 3.0), 100.0);
    }

    #[test]
    fn test_rank_all_equal() {
        let values = [0.5; 4];
        assert_eq!(percentile_rank(&values, 0.5), 50.0);
    }

    #[test]
    fn test_rank_absent_value() {
        let values = [1.0, 2.0, 3.0];
        assert_eq!(percentile_rank(&values, 2.5), 75.0);
        assert_eq!(percentile_rank(&values, 0.0), 0.0);
        assert_eq!(percentile_rank(&values, 9.0), 100.0);
    }

    #[test]
    fn test_rank_single_point() {
        assert_eq!(percentile_rank(&[0.3], 0.3), 100.0);
        assert_eq!(percentile_rank(&[0.3], 0.1), 0.0);
    }
}
