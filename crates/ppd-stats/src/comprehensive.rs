use crate::{descriptive::DescriptiveStats, percentiles::Percentiles};

/// Comprehensive statistical summary combining multiple measures.
///
/// This structure provides a complete overview of a distribution by combining:
/// - Basic descriptive statistics (mean, median, population std, min, max, etc.)
/// - The interquartile range (`P75 - P25`)
/// - Percentile values at the requested points
///
/// # Examples
///
/// ```
/// use ppd_stats::comprehensive::ComprehensiveStats;
///
/// let values = [1.0, 2.0, 3.0, 4.0, 5.0];
/// let stats = ComprehensiveStats::new(values, &[25.0, 50.0, 75.0]).unwrap();
///
/// assert_eq!(stats.stats.mean, 3.0);
/// assert_eq!(stats.iqr, 2.0);
/// assert_eq!(stats.percentiles.get(50.0), Some(3.0));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ComprehensiveStats {
    /// Basic descriptive statistics for the dataset.
    pub stats: DescriptiveStats,
    /// Interquartile range (`P75 - P25`, linearly interpolated).
    pub iqr: f64,
    /// Precomputed percentile values for quick lookup.
    pub percentiles: Percentiles,
}

impl ComprehensiveStats {
    /// Computes comprehensive statistics from unsorted values.
    ///
    /// # Returns
    ///
    /// * `Some(ComprehensiveStats)` - if the dataset contains at least one value
    /// * `None` - if the dataset is empty
    #[must_use]
    pub fn new<I>(values: I, percentile_points: &[f64]) -> Option<Self>
    where
        I: IntoIterator<Item = f64>,
    {
        let mut sorted = values.into_iter().collect::<Vec<_>>();
        sorted.sort_by(f64::total_cmp);
        Self::from_sorted(&sorted, percentile_points)
    }

    /// Computes comprehensive statistics from pre-sorted values.
    ///
    /// # Panics
    ///
    /// Panics if `sorted_values` is not sorted in ascending order.
    #[must_use]
    pub fn from_sorted(sorted_values: &[f64], percentile_points: &[f64]) -> Option<Self> {
        let stats = DescriptiveStats::from_sorted(sorted_values)?;
        let quartiles = Percentiles::from_sorted(sorted_values, &[25.0, 75.0]);
        let iqr = match (quartiles.get(75.0), quartiles.get(25.0)) {
            (Some(q3), Some(q1)) => q3 - q1,
            _ => 0.0,
        };
        let percentiles = Percentiles::from_sorted(sorted_values, percentile_points);

        Some(Self {
            stats,
            iqr,
            percentiles,
        })
    }
}
