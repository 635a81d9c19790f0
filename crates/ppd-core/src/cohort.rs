//! Cohort pass: distributions, prevalence, breach rates
//!
//! The cohort pass is a read-only reduction over already computed
//! [`CandidateAnalysis`] values. It never touches candidate-level labels.
//!
//! ```text
//! &[CandidateAnalysis] ──> aggregate_cohort ──> CohortReport
//!                                                 ├─ dimensions: per-dimension score distributions
//!                                                 ├─ groups: per-(group, statistic) distributions
//!                                                 ├─ prevalence / primary_prevalence
//!                                                 ├─ overall_prevalence: primary labels over all groups
//!                                                 └─ breach_rates: per-(target, tau)
//! ```
//!
//! Every distribution keeps its values sorted with `f64::total_cmp`, and
//! every table is a plain count over the cohort, so the report is
//! identical for any ordering of the input candidates.

use ppd_stats::{comprehensive::ComprehensiveStats, percentiles};
use rayon::prelude::*;
use serde::Serialize;

use crate::{
    candidate::CandidateAnalysis,
    descriptor::GroupStatistic,
    pattern::PatternLabel,
    schema::ProfileSchema,
    thresholds::{BreachDirection, Thresholds},
};

#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum CohortError {
    #[display("cohort is empty")]
    EmptyCohort,
    #[display("analysis of candidate '{candidate_id}' does not match the schema")]
    SchemaMismatch { candidate_id: String },
}

/// Empirical distribution of one statistic across a cohort.
///
/// # Examples
///
/// ```
/// use ppd_core::cohort::CohortDistribution;
///
/// let distribution = CohortDistribution::new([0.8, 0.2, 0.6, 0.4]);
///
/// assert_eq!(distribution.value_at(0.0), 0.2);
/// assert_eq!(distribution.value_at(100.0), 0.8);
/// assert_eq!(distribution.rank_of(0.8), 100.0);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CohortDistribution {
    sorted: Vec<f64>,
}

impl CohortDistribution {
    #[must_use]
    pub fn new<I>(values: I) -> Self
    where
        I: IntoIterator<Item = f64>,
    {
        let mut sorted = values.into_iter().collect::<Vec<_>>();
        sorted.sort_by(f64::total_cmp);
        Self { sorted }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.sorted.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sorted.is_empty()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[f64] {
        &self.sorted
    }

    /// Value at percentile `p` (linear interpolation, `p` clamped to `[0, 100]`).
    ///
    /// Returns `NaN` for an empty distribution.
    #[must_use]
    pub fn value_at(&self, p: f64) -> f64 {
        percentiles::compute_percentile(&self.sorted, p)
    }

    /// Midrank percentile rank of `value` within the distribution.
    ///
    /// Returns `NaN` for an empty distribution.
    #[must_use]
    pub fn rank_of(&self, value: f64) -> f64 {
        percentiles::percentile_rank(&self.sorted, value)
    }

    /// Summary statistics, or `None` for an empty distribution.
    #[must_use]
    pub fn summary(&self, percentile_points: &[f64]) -> Option<DistributionSummary> {
        let stats = ComprehensiveStats::from_sorted(&self.sorted, percentile_points)?;
        Some(DistributionSummary {
            n: stats.stats.count,
            mean: stats.stats.mean,
            median: stats.stats.median,
            std: stats.stats.std_dev,
            iqr: stats.iqr,
            min: stats.stats.min,
            max: stats.stats.max,
            percentiles: stats
                .percentiles
                .iter()
                .map(|(percentile, value)| PercentileValue { percentile, value })
                .collect(),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PercentileValue {
    pub percentile: f64,
    pub value: f64,
}

/// Summary of a cohort distribution.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DistributionSummary {
    pub n: usize,
    pub mean: f64,
    pub median: f64,
    /// Population standard deviation
    pub std: f64,
    pub iqr: f64,
    pub min: f64,
    pub max: f64,
    pub percentiles: Vec<PercentileValue>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DimensionCohort {
    pub dimension: String,
    pub group: String,
    pub summary: DistributionSummary,
    #[serde(skip)]
    pub distribution: CohortDistribution,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatisticCohort {
    pub statistic: GroupStatistic,
    pub summary: DistributionSummary,
    #[serde(skip)]
    pub distribution: CohortDistribution,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupCohort {
    pub group: String,
    pub ordered: bool,
    /// One entry per statistic; local volatility only for ordered groups
    pub statistics: Vec<StatisticCohort>,
}

impl GroupCohort {
    #[must_use]
    pub fn statistic(&self, statistic: GroupStatistic) -> Option<&StatisticCohort> {
        self.statistics.iter().find(|s| s.statistic == statistic)
    }
}

/// Fraction of the cohort for which `label` fires in `group`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PrevalenceEntry {
    pub group: String,
    pub label: PatternLabel,
    pub count: usize,
    pub proportion: f64,
}

/// Fraction of the cohort whose primary label in `group` is `primary`.
///
/// `primary == None` counts candidates for which no label fired.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PrimaryPrevalenceEntry {
    pub group: String,
    pub primary: Option<PatternLabel>,
    pub count: usize,
    pub proportion: f64,
}

/// Fraction of all (candidate, group) pairs whose primary label is `primary`.
///
/// `primary == None` counts pairs for which no label fired.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverallPrevalenceEntry {
    pub primary: Option<PatternLabel>,
    pub count: usize,
    pub proportion: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum BreachTarget {
    Group(String),
    Dimension(String),
}

/// Fraction of the cohort whose value crosses one tau.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BreachRate {
    pub target: BreachTarget,
    pub tau: String,
    pub tau_value: f64,
    /// Group statistic compared, `None` for a dimension score
    pub statistic: Option<GroupStatistic>,
    pub direction: BreachDirection,
    pub count: usize,
    pub rate: f64,
}

/// Result of the cohort pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CohortReport {
    pub cohort_size: usize,
    pub thresholds_version: String,
    pub dimensions: Vec<DimensionCohort>,
    pub groups: Vec<GroupCohort>,
    pub prevalence: Vec<PrevalenceEntry>,
    pub primary_prevalence: Vec<PrimaryPrevalenceEntry>,
    pub overall_prevalence: Vec<OverallPrevalenceEntry>,
    pub breach_rates: Vec<BreachRate>,
}

impl CohortReport {
    #[must_use]
    pub fn dimension(&self, id: &str) -> Option<&DimensionCohort> {
        self.dimensions.iter().find(|d| d.dimension == id)
    }

    #[must_use]
    pub fn group(&self, id: &str) -> Option<&GroupCohort> {
        self.groups.iter().find(|g| g.group == id)
    }

    #[must_use]
    pub fn prevalence_of(&self, group: &str, label: PatternLabel) -> Option<&PrevalenceEntry> {
        self.prevalence
            .iter()
            .find(|p| p.group == group && p.label == label)
    }
}

#[expect(clippy::cast_precision_loss)]
fn proportion(count: usize, total: usize) -> f64 {
    count as f64 / total as f64
}

fn check_matches_schema(
    schema: &ProfileSchema,
    analysis: &CandidateAnalysis,
) -> Result<(), CohortError> {
    let dimensions_match = analysis.normalized.len() == schema.dimension_count()
        && schema
            .dimensions()
            .zip(&analysis.normalized)
            .all(|(d, score)| d.id == score.dimension);
    let groups_match = analysis.groups.len() == schema.groups().len()
        && schema
            .groups()
            .iter()
            .zip(&analysis.groups)
            .all(|(g, diagnostics)| {
                g.id == diagnostics.group
                    && g.ordered == diagnostics.ordered
                    && g.ordered == diagnostics.descriptors.local_volatility.is_some()
            });
    if dimensions_match && groups_match {
        Ok(())
    } else {
        Err(CohortError::SchemaMismatch {
            candidate_id: analysis.candidate_id.clone(),
        })
    }
}

/// Aggregates the candidate pass results of a whole cohort.
///
/// Fails with [`CohortError::EmptyCohort`] for an empty slice and with
/// [`CohortError::SchemaMismatch`] if an analysis was produced against a
/// different schema.
pub fn aggregate_cohort(
    schema: &ProfileSchema,
    thresholds: &Thresholds,
    analyses: &[CandidateAnalysis],
) -> Result<CohortReport, CohortError> {
    if analyses.is_empty() {
        return Err(CohortError::EmptyCohort);
    }
    for analysis in analyses {
        check_matches_schema(schema, analysis)?;
    }
    let n = analyses.len();
    let points = &thresholds.percentiles;

    let dimensions = schema
        .dimensions()
        .enumerate()
        .collect::<Vec<_>>()
        .into_par_iter()
        .map(|(index, dimension)| -> Result<_, CohortError> {
            let distribution =
                CohortDistribution::new(analyses.iter().map(|a| a.normalized[index].value));
            let summary = distribution
                .summary(points)
                .ok_or(CohortError::EmptyCohort)?;
            Ok(DimensionCohort {
                dimension: dimension.id.clone(),
                group: dimension.group.clone(),
                summary,
                distribution,
            })
        })
        .collect::<Vec<_>>()
        .into_iter()
        .collect::<Result<Vec<_>, _>>()?;

    let groups = schema
        .groups()
        .par_iter()
        .enumerate()
        .map(|(index, group)| -> Result<_, CohortError> {
            let statistics = GroupStatistic::ALL
                .into_iter()
                .filter(|s| group.ordered || *s != GroupStatistic::LocalVolatility)
                .map(|statistic| {
                    let distribution = CohortDistribution::new(
                        analyses
                            .iter()
                            .filter_map(|a| statistic.of(&a.groups[index].descriptors)),
                    );
                    let summary = distribution
                        .summary(points)
                        .ok_or(CohortError::EmptyCohort)?;
                    Ok(StatisticCohort {
                        statistic,
                        summary,
                        distribution,
                    })
                })
                .collect::<Result<Vec<_>, CohortError>>()?;
            Ok(GroupCohort {
                group: group.id.clone(),
                ordered: group.ordered,
                statistics,
            })
        })
        .collect::<Vec<_>>()
        .into_iter()
        .collect::<Result<Vec<_>, _>>()?;

    let mut prevalence = vec![];
    let mut primary_prevalence = vec![];
    for (index, group) in schema.groups().iter().enumerate() {
        for label in PatternLabel::ALL {
            let count = analyses
                .iter()
                .filter(|a| a.groups[index].classification.labels.contains(label))
                .count();
            prevalence.push(PrevalenceEntry {
                group: group.id.clone(),
                label,
                count,
                proportion: proportion(count, n),
            });
        }
        let primaries = PatternLabel::PRIORITY.into_iter().map(Some).chain([None]);
        for primary in primaries {
            let count = analyses
                .iter()
                .filter(|a| a.groups[index].classification.primary == primary)
                .count();
            primary_prevalence.push(PrimaryPrevalenceEntry {
                group: group.id.clone(),
                primary,
                count,
                proportion: proportion(count, n),
            });
        }
    }

    let pairs = n * schema.groups().len();
    let overall_prevalence = PatternLabel::PRIORITY
        .into_iter()
        .map(Some)
        .chain([None])
        .map(|primary| {
            let count = primary_prevalence
                .iter()
                .filter(|p| p.primary == primary)
                .map(|p| p.count)
                .sum();
            OverallPrevalenceEntry {
                primary,
                count,
                proportion: proportion(count, pairs),
            }
        })
        .collect();

    let mut breach_rates = vec![];
    for tau in thresholds.taus() {
        for (index, group) in schema.groups().iter().enumerate() {
            let count = analyses
                .iter()
                .filter_map(|a| tau.group_statistic.of(&a.groups[index].descriptors))
                .filter(|value| tau.direction.crosses(*value, tau.value))
                .count();
            breach_rates.push(BreachRate {
                target: BreachTarget::Group(group.id.clone()),
                tau: tau.name.to_owned(),
                tau_value: tau.value,
                statistic: Some(tau.group_statistic),
                direction: tau.direction,
                count,
                rate: proportion(count, n),
            });
        }
        if !tau.applies_to_dimensions {
            continue;
        }
        for (index, dimension) in schema.dimensions().enumerate() {
            let count = analyses
                .iter()
                .filter(|a| tau.direction.crosses(a.normalized[index].value, tau.value))
                .count();
            breach_rates.push(BreachRate {
                target: BreachTarget::Dimension(dimension.id.clone()),
                tau: tau.name.to_owned(),
                tau_value: tau.value,
                statistic: None,
                direction: tau.direction,
                count,
                rate: proportion(count, n),
            });
        }
    }

    tracing::debug!(
        cohort_size = n,
        dimensions = dimensions.len(),
        groups = groups.len(),
        breach_rates = breach_rates.len(),
        "aggregated cohort"
    );

    Ok(CohortReport {
        cohort_size: n,
        thresholds_version: thresholds.version.clone(),
        dimensions,
        groups,
        prevalence,
        primary_prevalence,
        overall_prevalence,
        breach_rates,
    })
}
