//! Structural pattern labels
//!
//! Each [`PatternLabel`] is an independent predicate over a group's
//! [`GroupDescriptors`], evaluated against a fixed [`Thresholds`]. Labels
//! are not a partition: a group may carry several or none. Threshold
//! boundaries are inclusive (`>=` / `<=`) unless stated otherwise.
//!
//! | label | fires when |
//! |---|---|
//! | `balanced` | `std <= tau_balance_dispersion` |
//! | `bottleneck` | `min <= tau_low` and `mean >= tau_bottleneck_mean` |
//! | `polarised` | not balanced, `max >= tau_high`, `min <= tau_low`, `range >= tau_polarised_range` |
//! | `noisy` | `std >= tau_dispersion` and not `min <= tau_low` |
//! | `uniform_high` | balanced and `mean >= tau_high_level` |
//! | `uniform_moderate` | balanced and `tau_low_level < mean < tau_high_level` |
//! | `uniform_low` | balanced and `mean <= tau_low_level` |
//!
//! `balanced` and `polarised` never co-fire because polarised is gated on
//! the group not being balanced. `bottleneck` and `noisy` never co-fire
//! because noisy requires the floor to stay above `tau_low`.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::{
    descriptor::{DimensionScore, GroupDescriptors},
    thresholds::Thresholds,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PatternLabel {
    Bottleneck,
    Polarised,
    Noisy,
    Balanced,
    UniformHigh,
    UniformModerate,
    UniformLow,
}

impl PatternLabel {
    pub const ALL: [Self; 7] = [
        Self::Bottleneck,
        Self::Polarised,
        Self::Noisy,
        Self::Balanced,
        Self::UniformHigh,
        Self::UniformModerate,
        Self::UniformLow,
    ];

    /// Labels in primary-label priority order, highest first.
    pub const PRIORITY: [Self; 7] = [
        Self::Bottleneck,
        Self::Polarised,
        Self::Noisy,
        Self::UniformLow,
        Self::UniformHigh,
        Self::UniformModerate,
        Self::Balanced,
    ];

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Bottleneck => "bottleneck",
            Self::Polarised => "polarised",
            Self::Noisy => "noisy",
            Self::Balanced => "balanced",
            Self::UniformHigh => "uniform_high",
            Self::UniformModerate => "uniform_moderate",
            Self::UniformLow => "uniform_low",
        }
    }

    /// Evaluates this label's predicate.
    ///
    /// # Examples
    ///
    /// ```
    /// use ppd_core::{descriptor, pattern::PatternLabel, profile::GroupScores, thresholds::Thresholds};
    ///
    /// let group = GroupScores {
    ///     group: "g".to_owned(),
    ///     ordered: false,
    ///     dimensions: vec!["g::a".to_owned(), "g::b".to_owned()],
    ///     values: vec![0.9, 0.9],
    /// };
    /// let d = descriptor::describe(&group).unwrap();
    /// let thresholds = Thresholds::default();
    ///
    /// assert!(PatternLabel::Balanced.evaluate(&d, &thresholds));
    /// assert!(PatternLabel::UniformHigh.evaluate(&d, &thresholds));
    /// assert!(!PatternLabel::Noisy.evaluate(&d, &thresholds));
    /// ```
    #[must_use]
    pub fn evaluate(self, d: &GroupDescriptors, t: &Thresholds) -> bool {
        let balanced = d.std <= t.tau_balance_dispersion;
        let low_floor = d.min <= t.tau_low;
        match self {
            Self::Balanced => balanced,
            Self::Bottleneck => low_floor && d.mean >= t.tau_bottleneck_mean,
            Self::Polarised => {
                !balanced && low_floor && d.max >= t.tau_high && d.range >= t.tau_polarised_range
            }
            Self::Noisy => d.std >= t.tau_dispersion && !low_floor,
            Self::UniformHigh => balanced && d.mean >= t.tau_high_level,
            Self::UniformLow => balanced && d.mean <= t.tau_low_level,
            Self::UniformModerate => {
                balanced && t.tau_low_level < d.mean && d.mean < t.tau_high_level
            }
        }
    }
}

impl std::fmt::Display for PatternLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Labels fired for one group, iterated in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PatternSet(BTreeSet<PatternLabel>);

impl PatternSet {
    #[must_use]
    pub fn contains(&self, label: PatternLabel) -> bool {
        self.0.contains(&label)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = PatternLabel> + '_ {
        self.0.iter().copied()
    }

    /// The single most salient label, or `None` when no label fired.
    #[must_use]
    pub fn primary(&self) -> Option<PatternLabel> {
        PatternLabel::PRIORITY
            .into_iter()
            .find(|label| self.contains(*label))
    }
}

impl FromIterator<PatternLabel> for PatternSet {
    fn from_iter<I: IntoIterator<Item = PatternLabel>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Dimensions behind a fired label.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PatternDetails {
    /// Dimensions at the group minimum, when bottleneck fired
    pub bottleneck_dimensions: Option<Vec<String>>,
    /// The group minimum, when bottleneck fired
    pub bottleneck_value: Option<f64>,
    /// Dimensions with `z >= polarised_z_threshold`, when polarised fired
    pub polarised_high: Option<Vec<DimensionScore>>,
    /// Dimensions with `z <= -polarised_z_threshold`, when polarised fired
    pub polarised_low: Option<Vec<DimensionScore>>,
}

/// Labels and details of one classified group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    pub labels: PatternSet,
    pub primary: Option<PatternLabel>,
    pub details: PatternDetails,
}

/// Evaluates every label against one group's descriptors.
#[must_use]
pub fn classify(descriptors: &GroupDescriptors, thresholds: &Thresholds) -> Classification {
    let labels = PatternLabel::ALL
        .into_iter()
        .filter(|label| label.evaluate(descriptors, thresholds))
        .collect::<PatternSet>();

    let mut details = PatternDetails::default();
    if labels.contains(PatternLabel::Bottleneck) {
        details.bottleneck_dimensions = Some(descriptors.min_dimensions.clone());
        details.bottleneck_value = Some(descriptors.min);
    }
    if labels.contains(PatternLabel::Polarised) {
        let z = thresholds.polarised_z_threshold;
        details.polarised_high = Some(extremes(descriptors, |v| v >= z));
        details.polarised_low = Some(extremes(descriptors, |v| v <= -z));
    }

    Classification {
        primary: labels.primary(),
        labels,
        details,
    }
}

/// Z-scores matching `keep`, by descending `|z|`; ties keep declared order.
fn extremes(descriptors: &GroupDescriptors, keep: impl Fn(f64) -> bool) -> Vec<DimensionScore> {
    let mut selected = descriptors
        .z_scores
        .iter()
        .filter(|z| keep(z.value))
        .cloned()
        .collect::<Vec<_>>();
    selected.sort_by(|a, b| b.value.abs().total_cmp(&a.value.abs()));
    selected
}

#[cfg(test)]
mod tests {
    use rand::{Rng as _, SeedableRng as _};
    use rand_pcg::Pcg32;

    use super::*;
    use crate::{descriptor::describe, profile::GroupScores};

    fn descriptors(values: &[f64]) -> GroupDescriptors {
        describe(&GroupScores {
            group: "g".to_owned(),
            ordered: false,
            dimensions: (0..values.len()).map(|i| format!("g::d{i}")).collect(),
            values: values.to_vec(),
        })
        .unwrap()
    }

    fn labels(values: &[f64]) -> Vec<PatternLabel> {
        classify(&descriptors(values), &Thresholds::default())
            .labels
            .iter()
            .collect()
    }

    #[test]
    fn test_uniform_high() {
        assert_eq!(
            labels(&[0.98; 6]),
            vec![PatternLabel::Balanced, PatternLabel::UniformHigh]
        );
        assert_eq!(
            labels(&[0.84; 4]),
            vec![PatternLabel::Balanced, PatternLabel::UniformHigh]
        );
    }

    #[test]
    fn test_uniform_moderate_and_low() {
        assert_eq!(
            labels(&[0.5, 0.52, 0.48]),
            vec![PatternLabel::Balanced, PatternLabel::UniformModerate]
        );
        assert_eq!(
            labels(&[0.1, 0.12]),
            vec![PatternLabel::Balanced, PatternLabel::UniformLow]
        );
    }

    #[test]
    fn test_single_weak_dimension_is_a_bottleneck() {
        let classification = classify(&descriptors(&[0.94, 0.3, 0.94, 0.94]), &Thresholds::default());
        assert_eq!(
            classification.labels.iter().collect::<Vec<_>>(),
            vec![PatternLabel::Bottleneck]
        );
        assert_eq!(classification.primary, Some(PatternLabel::Bottleneck));
        assert_eq!(
            classification.details.bottleneck_dimensions,
            Some(vec!["g::d1".to_owned()])
        );
        assert_eq!(classification.details.bottleneck_value, Some(0.3));
        assert!(classification.details.polarised_high.is_none());
    }

    #[test]
    fn test_two_tail_spread_is_polarised() {
        let classification = classify(&descriptors(&[0.0, 0.9, 0.0, 0.9]), &Thresholds::default());
        assert!(classification.labels.contains(PatternLabel::Polarised));
        assert!(!classification.labels.contains(PatternLabel::Noisy));
        assert!(!classification.labels.contains(PatternLabel::Bottleneck));
        assert_eq!(classification.primary, Some(PatternLabel::Polarised));

        let high = classification.details.polarised_high.unwrap();
        let low = classification.details.polarised_low.unwrap();
        assert_eq!(
            high.iter().map(|z| z.dimension.as_str()).collect::<Vec<_>>(),
            vec!["g::d1", "g::d3"]
        );
        assert_eq!(
            low.iter().map(|z| z.dimension.as_str()).collect::<Vec<_>>(),
            vec!["g::d0", "g::d2"]
        );
    }

    #[test]
    fn test_dispersion_without_low_floor_is_noisy() {
        assert_eq!(labels(&[0.4, 1.0, 0.4, 1.0]), vec![PatternLabel::Noisy]);
    }

    #[test]
    fn test_boundaries_are_inclusive() {
        let t = Thresholds::default();
        let d = GroupDescriptors {
            mean: t.tau_high_level,
            std: t.tau_balance_dispersion,
            min: t.tau_low,
            max: t.tau_high,
            range: t.tau_polarised_range,
            n_dimensions: 2,
            z_scores: vec![],
            min_dimensions: vec![],
            max_dimensions: vec![],
            local_volatility: None,
        };
        assert!(PatternLabel::Balanced.evaluate(&d, &t));
        assert!(PatternLabel::UniformHigh.evaluate(&d, &t));
        assert!(PatternLabel::Bottleneck.evaluate(&d, &t));
        assert!(!PatternLabel::UniformModerate.evaluate(&d, &t));
    }

    #[test]
    fn test_primary_priority() {
        let set = [PatternLabel::Balanced, PatternLabel::UniformLow]
            .into_iter()
            .collect::<PatternSet>();
        assert_eq!(set.primary(), Some(PatternLabel::UniformLow));
        assert_eq!(PatternSet::default().primary(), None);
    }

    #[test]
    fn test_exclusive_label_pairs() {
        let thresholds = Thresholds::default();
        let mut rng = Pcg32::seed_from_u64(5);
        for _ in 0..2000 {
            let len = rng.random_range(1..8);
            let values = (0..len)
                .map(|_| f64::from(rng.random_range(0..=10_u8)) / 10.0)
                .collect::<Vec<_>>();
            let set = classify(&descriptors(&values), &thresholds).labels;
            assert!(
                !(set.contains(PatternLabel::Balanced) && set.contains(PatternLabel::Polarised)),
                "{values:?}"
            );
            assert!(
                !(set.contains(PatternLabel::Bottleneck) && set.contains(PatternLabel::Noisy)),
                "{values:?}"
            );
            let uniform = [
                PatternLabel::UniformHigh,
                PatternLabel::UniformModerate,
                PatternLabel::UniformLow,
            ]
            .into_iter()
            .filter(|l| set.contains(*l))
            .count();
            let expected = usize::from(set.contains(PatternLabel::Balanced));
            assert_eq!(uniform, expected, "{values:?}");
        }
    }

    #[test]
    fn test_serializes_as_snake_case_list() {
        let set = [PatternLabel::UniformHigh, PatternLabel::Balanced]
            .into_iter()
            .collect::<PatternSet>();
        assert_eq!(
            serde_json::to_string(&set).unwrap(),
            r#"["balanced","uniform_high"]"#
        );
    }
}
