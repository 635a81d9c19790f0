use crate::percentiles;

/// Descriptive statistics summarizing a dataset.
///
/// All dispersion measures use the population framing (divide by `N`),
/// since the dataset is treated as the whole population of interest.
///
/// Statistics are always computed from values sorted in ascending order,
/// so two permutations of the same multiset yield bit-identical results.
#[derive(Debug, Clone, PartialEq)]
pub struct DescriptiveStats {
    /// Number of values in the dataset.
    pub count: usize,
    /// The minimum value in the dataset.
    pub min: f64,
    /// The maximum value in the dataset.
    pub max: f64,
    /// The range of the dataset (`max - min`).
    pub range: f64,
    /// The arithmetic mean of the dataset.
    pub mean: f64,
    /// The median (linearly interpolated between the two middle values).
    pub median: f64,
    /// The population variance of the dataset.
    pub variance: f64,
    /// The population standard deviation of the dataset.
    pub std_dev: f64,
}

impl DescriptiveStats {
    /// Computes descriptive statistics from unsorted values.
    ///
    /// This method will sort the values internally before computing statistics.
    ///
    /// # Returns
    ///
    /// * `Some(DescriptiveStats)` - if the dataset contains at least one value
    /// * `None` - if the dataset is empty
    ///
    /// # Examples
    ///
    /// ```
    /// # use ppd_stats::descriptive::DescriptiveStats;
    /// let values = [5.0, 2.0, 4.0, 1.0, 3.0];
    /// let stats = DescriptiveStats::new(values).unwrap();
    /// assert_eq!(stats.min, 1.0);
    /// assert_eq!(stats.max, 5.0);
    /// assert_eq!(stats.mean, 3.0);
    /// assert_eq!(stats.median, 3.0);
    /// assert_eq!(stats.variance, 2.0);
    /// ```
    #[must_use]
    pub fn new<I>(values: I) -> Option<Self>
    where
        I: IntoIterator<Item = f64>,
    {
        let mut values = values.into_iter().collect::<Vec<_>>();
        values.sort_by(f64::total_cmp);
        Self::from_sorted(&values)
    }

    /// Computes descriptive statistics from pre-sorted values.
    ///
    /// A dataset whose values are all equal (`range == 0`) is degenerate:
    /// its mean is exactly the shared value and its variance and standard
    /// deviation are exactly zero, with no floating-point residue from
    /// summation.
    ///
    /// # Panics
    ///
    /// Panics if `sorted_values` is not sorted in ascending order.
    ///
    /// # Examples
    ///
    /// ```
    /// # use ppd_stats::descriptive::DescriptiveStats;
    /// let values = [0.98, 0.98, 0.98];
    /// let stats = DescriptiveStats::from_sorted(&values).unwrap();
    /// assert_eq!(stats.mean, 0.98);
    /// assert_eq!(stats.std_dev, 0.0);
    /// assert_eq!(stats.range, 0.0);
    /// ```
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn from_sorted(sorted_values: &[f64]) -> Option<Self> {
        assert!(
            sorted_values.is_sorted_by(|a, b| a <= b),
            "values must be sorted in ascending order"
        );

        let min = *sorted_values.first()?;
        let max = *sorted_values.last()?;
        let count = sorted_values.len();
        let range = max - min;
        let median = percentiles::compute_percentile(sorted_values, 50.0);

        #[expect(clippy::float_cmp)]
        let degenerate = min == max;
        if degenerate {
            return Some(Self {
                count,
                min,
                max,
                range: 0.0,
                mean: min,
                median: min,
                variance: 0.0,
                std_dev: 0.0,
            });
        }

        let n = count as f64;
        let mean = sorted_values.iter().sum::<f64>() / n;
        let variance = sorted_values
            .iter()
            .map(|v| (v - mean).powi(2))
            .sum::<f64>()
            / n;
        let std_dev = variance.sqrt();

        Some(Self {
            count,
            min,
            max,
            range,
            mean,
            median,
            variance,
            std_dev,
        })
    }
}

#[cfg(test)]
mod tests {
    use rand::{Rng as _, SeedableRng as _, seq::SliceRandom as _};
    use rand_pcg::Pcg32;

    use super::*;

    fn assert_close(a: f64, b: f64) {
        assert!((a - b).abs() < 1e-12, "{a} != {b}");
    }

    #[test]
    fn test_empty_is_none() {
        assert!(DescriptiveStats::new([]).is_none());
    }

    #[test]
    fn test_population_std() {
        // population std of [0.3, 0.94, 0.94, 0.94]
        let stats = DescriptiveStats::new([0.94, 0.3, 0.94, 0.94]).unwrap();
        assert_close(stats.mean, 0.78);
        assert_close(stats.variance, 0.0768);
        assert_close(stats.std_dev, 0.0768_f64.sqrt());
        assert_close(stats.range, 0.64);
        assert_eq!(stats.count, 4);
    }

    #[test]
    fn test_median_even_count_interpolates() {
        let stats = DescriptiveStats::new([1.0, 2.0, 3.0, 4.0]).unwrap();
        assert_close(stats.median, 2.5);
    }

    #[test]
    fn test_single_value() {
        let stats = DescriptiveStats::new([0.4]).unwrap();
        assert_eq!(stats.mean, 0.4);
        assert_eq!(stats.std_dev, 0.0);
        assert_eq!(stats.range, 0.0);
        assert_eq!(stats.median, 0.4);
    }

    #[test]
    fn test_degenerate_has_exact_zero_dispersion() {
        // 0.1 summed ten times is not exactly 1.0; the degenerate path avoids that residue
        let stats = DescriptiveStats::new(vec![0.1; 10]).unwrap();
        assert_eq!(stats.mean, 0.1);
        assert_eq!(stats.variance, 0.0);
        assert_eq!(stats.std_dev, 0.0);
    }

    #[test]
    fn test_permutation_is_bit_identical() {
        let mut rng = Pcg32::seed_from_u64(7);
        for _ in 0..200 {
            let len = rng.random_range(1..12);
            let mut values = (0..len)
                .map(|_| rng.random_range(0.0..=1.0))
                .collect::<Vec<f64>>();
            let expected = DescriptiveStats::new(values.clone()).unwrap();
            values.shuffle(&mut rng);
            let actual = DescriptiveStats::new(values).unwrap();
            assert_eq!(expected, actual);
        }
    }

    #[test]
    #[should_panic(expected = "values must be sorted")]
    fn test_from_sorted_rejects_unsorted() {
        let _ = DescriptiveStats::from_sorted(&[2.0, 1.0]);
    }
}
