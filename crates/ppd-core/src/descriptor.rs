//! Per-group statistical descriptors
//!
//! For each group of a [`GroupedVector`](crate::profile::GroupedVector) the
//! descriptor engine computes:
//!
//! | descriptor | definition |
//! |---|---|
//! | `mean` | arithmetic mean of the normalized scores |
//! | `std` | population standard deviation (divide by `N`) |
//! | `min`, `max`, `range` | extremes and `max - min` |
//! | `z_scores` | `(value - mean) / std`, `0` when `std == 0` |
//! | `local_volatility` | mean `|v[i+1] - v[i]|` in declared order, wrapping `v[n] = v[0]`; ordered groups only |
//!
//! Everything except `local_volatility` is invariant under permutation of
//! the group's dimensions: statistics are taken over sorted values, so any
//! input order yields bit-identical results. `local_volatility` reads the
//! declared order on purpose and is absent for unordered groups.

use ppd_stats::descriptive::DescriptiveStats;
use serde::{Deserialize, Serialize};

use crate::profile::GroupScores;

/// Values within this distance of the group min/max count as tied with it.
pub const TIE_TOLERANCE: f64 = 1e-12;

/// A value attached to one dimension.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DimensionScore {
    pub dimension: String,
    pub value: f64,
}

/// Descriptors of one (candidate, group) pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupDescriptors {
    pub mean: f64,
    pub std: f64,
    pub min: f64,
    pub max: f64,
    pub range: f64,
    pub n_dimensions: usize,
    /// Z-score of every dimension, in declared order
    pub z_scores: Vec<DimensionScore>,
    /// Dimensions tied at the group minimum
    pub min_dimensions: Vec<String>,
    /// Dimensions tied at the group maximum
    pub max_dimensions: Vec<String>,
    /// `None` for groups without a declared order
    pub local_volatility: Option<f64>,
}

/// Scalar group descriptors that can be compared against a tau or
/// collected into a cohort distribution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupStatistic {
    Mean,
    Std,
    Min,
    Max,
    Range,
    LocalVolatility,
}

impl GroupStatistic {
    pub const ALL: [Self; 6] = [
        Self::Mean,
        Self::Std,
        Self::Min,
        Self::Max,
        Self::Range,
        Self::LocalVolatility,
    ];

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Mean => "mean",
            Self::Std => "std",
            Self::Min => "min",
            Self::Max => "max",
            Self::Range => "range",
            Self::LocalVolatility => "local_volatility",
        }
    }

    /// Reads this statistic from a group's descriptors.
    ///
    /// Returns `None` only for `LocalVolatility` on an unordered group.
    #[must_use]
    pub fn of(self, descriptors: &GroupDescriptors) -> Option<f64> {
        match self {
            Self::Mean => Some(descriptors.mean),
            Self::Std => Some(descriptors.std),
            Self::Min => Some(descriptors.min),
            Self::Max => Some(descriptors.max),
            Self::Range => Some(descriptors.range),
            Self::LocalVolatility => descriptors.local_volatility,
        }
    }
}

impl std::fmt::Display for GroupStatistic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Computes the descriptors of one group.
///
/// Returns `None` if the group has no dimensions.
///
/// # Examples
///
/// ```
/// use ppd_core::{descriptor, profile::GroupScores};
///
/// let group = GroupScores {
///     group: "reasoning".to_owned(),
///     ordered: true,
///     dimensions: vec!["reasoning::a".to_owned(), "reasoning::b".to_owned()],
///     values: vec![0.25, 0.75],
/// };
/// let d = descriptor::describe(&group).unwrap();
///
/// assert_eq!(d.mean, 0.5);
/// assert_eq!(d.std, 0.25);
/// assert_eq!(d.range, 0.5);
/// assert_eq!(d.z_scores[0].value, -1.0);
/// assert_eq!(d.local_volatility, Some(0.5));
/// assert_eq!(d.min_dimensions, vec!["reasoning::a"]);
/// ```
#[must_use]
pub fn describe(group: &GroupScores) -> Option<GroupDescriptors> {
    let stats = DescriptiveStats::new(group.values.iter().copied())?;

    let z_scores = group
        .dimensions
        .iter()
        .zip(&group.values)
        .map(|(dimension, value)| DimensionScore {
            dimension: dimension.clone(),
            value: z_score(*value, stats.mean, stats.std_dev),
        })
        .collect();

    let tied_with = |target: f64| {
        group
            .dimensions
            .iter()
            .zip(&group.values)
            .filter(|(_, value)| (*value - target).abs() <= TIE_TOLERANCE)
            .map(|(dimension, _)| dimension.clone())
            .collect::<Vec<_>>()
    };

    let local_volatility = group.ordered.then(|| local_volatility(&group.values));

    Some(GroupDescriptors {
        mean: stats.mean,
        std: stats.std_dev,
        min: stats.min,
        max: stats.max,
        range: stats.range,
        n_dimensions: stats.count,
        z_scores,
        min_dimensions: tied_with(stats.min),
        max_dimensions: tied_with(stats.max),
        local_volatility,
    })
}

fn z_score(value: f64, mean: f64, std: f64) -> f64 {
    if std > 0.0 { (value - mean) / std } else { 0.0 }
}

/// Cyclic adjacent-difference energy: the last dimension neighbours the first.
#[expect(clippy::cast_precision_loss)]
fn local_volatility(values: &[f64]) -> f64 {
    let (Some(first), Some(last)) = (values.first(), values.last()) else {
        return 0.0;
    };
    let total = values
        .windows(2)
        .map(|pair| (pair[1] - pair[0]).abs())
        .sum::<f64>()
        + (first - last).abs();
    total / values.len() as f64
}
