//! Positions a candidate within a cohort
//!
//! Context is computed from a borrowed [`CandidateAnalysis`] and returned as
//! a separate value: the candidate's descriptors and labels are never read
//! for anything but their numeric values, and never modified.

use rayon::prelude::*;
use serde::Serialize;

use crate::{
    candidate::CandidateAnalysis,
    cohort::{CohortError, CohortReport},
    descriptor::GroupStatistic,
};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DimensionContext {
    pub dimension: String,
    pub value: f64,
    pub percentile_rank: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatisticContext {
    pub statistic: GroupStatistic,
    pub value: f64,
    pub percentile_rank: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupContext {
    pub group: String,
    pub statistics: Vec<StatisticContext>,
}

/// Percentile ranks of one candidate's scores and group statistics.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CandidateContext {
    pub candidate_id: String,
    pub dimensions: Vec<DimensionContext>,
    pub groups: Vec<GroupContext>,
}

/// Computes the candidate's percentile rank for every dimension score and
/// every group statistic the cohort reports.
///
/// Fails with [`CohortError::SchemaMismatch`] if the candidate has a
/// dimension or group the cohort does not know.
pub fn resolve_context(
    report: &CohortReport,
    analysis: &CandidateAnalysis,
) -> Result<CandidateContext, CohortError> {
    let mismatch = || CohortError::SchemaMismatch {
        candidate_id: analysis.candidate_id.clone(),
    };

    let dimensions = analysis
        .normalized
        .iter()
        .map(|score| {
            let cohort = report.dimension(&score.dimension).ok_or_else(mismatch)?;
            Ok(DimensionContext {
                dimension: score.dimension.clone(),
                value: score.value,
                percentile_rank: cohort.distribution.rank_of(score.value),
            })
        })
        .collect::<Result<Vec<_>, CohortError>>()?;

    let groups = analysis
        .groups
        .iter()
        .map(|diagnostics| {
            let cohort = report.group(&diagnostics.group).ok_or_else(mismatch)?;
            let statistics = cohort
                .statistics
                .iter()
                .filter_map(|entry| {
                    let value = entry.statistic.of(&diagnostics.descriptors)?;
                    Some(StatisticContext {
                        statistic: entry.statistic,
                        value,
                        percentile_rank: entry.distribution.rank_of(value),
                    })
                })
                .collect();
            Ok(GroupContext {
                group: diagnostics.group.clone(),
                statistics,
            })
        })
        .collect::<Result<Vec<_>, CohortError>>()?;

    Ok(CandidateContext {
        candidate_id: analysis.candidate_id.clone(),
        dimensions,
        groups,
    })
}

/// Resolves the context of many candidates in parallel, preserving order.
pub fn resolve_contexts(
    report: &CohortReport,
    analyses: &[CandidateAnalysis],
) -> Result<Vec<CandidateContext>, CohortError> {
    analyses
        .par_iter()
        .map(|analysis| resolve_context(report, analysis))
        .collect::<Vec<_>>()
        .into_iter()
        .collect()
}
