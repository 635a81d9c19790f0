//! Candidate pass: normalize, structure, describe, classify
//!
//! The candidate pass depends only on the candidate's own raw scores plus
//! the frozen schema, scale and thresholds. Candidates share no mutable
//! state, so [`analyze_candidates`] runs them in parallel and still
//! returns results in input order.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::{
    descriptor::{self, GroupDescriptors},
    pattern::{self, Classification},
    profile::{CandidateScores, GroupedVector, NormalizeError, NormalizedScore, StructureError},
    scale::ScoreScale,
    schema::ProfileSchema,
    thresholds::Thresholds,
};

#[derive(Debug, Clone, PartialEq, derive_more::Display, derive_more::Error)]
pub enum AnalysisError {
    #[display("candidate '{candidate_id}': {source}")]
    Normalize {
        candidate_id: String,
        source: NormalizeError,
    },
    #[display("candidate '{candidate_id}': {source}")]
    Structure {
        candidate_id: String,
        source: StructureError,
    },
    #[display("candidate '{candidate_id}': group '{group}' has no scores")]
    EmptyGroup { candidate_id: String, group: String },
}

impl AnalysisError {
    #[must_use]
    pub fn candidate_id(&self) -> &str {
        match self {
            Self::Normalize { candidate_id, .. }
            | Self::Structure { candidate_id, .. }
            | Self::EmptyGroup { candidate_id, .. } => candidate_id,
        }
    }
}

/// Descriptors and labels of one group of one candidate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupDiagnostics {
    pub group: String,
    pub ordered: bool,
    pub descriptors: GroupDescriptors,
    #[serde(flatten)]
    pub classification: Classification,
}

/// Candidate-level result: normalized scores and per-group diagnostics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateAnalysis {
    pub candidate_id: String,
    /// Normalized scores in schema order
    pub normalized: Vec<NormalizedScore>,
    /// Group diagnostics in schema order
    pub groups: Vec<GroupDiagnostics>,
}

impl CandidateAnalysis {
    #[must_use]
    pub fn group(&self, id: &str) -> Option<&GroupDiagnostics> {
        self.groups.iter().find(|g| g.group == id)
    }
}

/// Runs the candidate pass for one candidate.
///
/// # Examples
///
/// ```
/// use std::collections::BTreeMap;
/// use ppd_core::{
///     candidate, pattern::PatternLabel, profile::CandidateScores, scale::ScoreScale,
///     schema::{GroupSpec, ProfileSchema}, thresholds::Thresholds,
/// };
///
/// let schema = ProfileSchema::new(vec![GroupSpec {
///     id: "communication".to_owned(),
///     ordered: false,
///     dimensions: vec!["grammar".to_owned(), "clarity".to_owned()],
/// }])
/// .unwrap();
/// let nested = BTreeMap::from([(
///     "communication".to_owned(),
///     BTreeMap::from([("grammar".to_owned(), 4.9), ("clarity".to_owned(), 4.9)]),
/// )]);
/// let scores = CandidateScores::from_nested("C001", &nested);
///
/// let analysis = candidate::analyze_candidate(
///     &schema,
///     &ScoreScale::default(),
///     &Thresholds::default(),
///     &scores,
/// )
/// .unwrap();
///
/// let labels = &analysis.groups[0].classification.labels;
/// assert!(labels.contains(PatternLabel::Balanced));
/// assert!(labels.contains(PatternLabel::UniformHigh));
/// ```
pub fn analyze_candidate(
    schema: &ProfileSchema,
    scale: &ScoreScale,
    thresholds: &Thresholds,
    scores: &CandidateScores,
) -> Result<CandidateAnalysis, AnalysisError> {
    let candidate_id = &scores.candidate_id;

    let mut normalized = scores
        .normalize(scale)
        .map_err(|source| AnalysisError::Normalize {
            candidate_id: candidate_id.clone(),
            source,
        })?;
    let grouped = GroupedVector::structure(schema, candidate_id, &normalized).map_err(|source| {
        AnalysisError::Structure {
            candidate_id: candidate_id.clone(),
            source,
        }
    })?;
    // every dimension is known and unique once structuring succeeded
    normalized.sort_by_key(|score| schema.locate(&score.dimension));

    let groups = grouped
        .groups
        .iter()
        .map(|group| {
            let descriptors =
                descriptor::describe(group).ok_or_else(|| AnalysisError::EmptyGroup {
                    candidate_id: candidate_id.clone(),
                    group: group.group.clone(),
                })?;
            let classification = pattern::classify(&descriptors, thresholds);
            Ok(GroupDiagnostics {
                group: group.group.clone(),
                ordered: group.ordered,
                descriptors,
                classification,
            })
        })
        .collect::<Result<Vec<_>, AnalysisError>>()?;

    tracing::debug!(
        candidate_id = %candidate_id,
        groups = groups.len(),
        "analyzed candidate"
    );

    Ok(CandidateAnalysis {
        candidate_id: candidate_id.clone(),
        normalized,
        groups,
    })
}

/// Runs the candidate pass for many candidates in parallel.
///
/// Output order matches input order. If any candidate fails, the error of
/// the first failing candidate (in input order) is returned.
pub fn analyze_candidates(
    schema: &ProfileSchema,
    scale: &ScoreScale,
    thresholds: &Thresholds,
    candidates: &[CandidateScores],
) -> Result<Vec<CandidateAnalysis>, AnalysisError> {
    let results = candidates
        .par_iter()
        .map(|scores| analyze_candidate(schema, scale, thresholds, scores))
        .collect::<Vec<_>>();
    results.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use rand::{Rng as _, SeedableRng as _, seq::SliceRandom as _};
    use rand_pcg::Pcg32;

    use super::*;
    use crate::{
        pattern::PatternLabel,
        profile::RawScore,
        schema::{self, GroupSpec},
    };

    const GROUPS: [(&str, bool, &[&str]); 3] = [
        (
            "communication",
            false,
            &["grammar", "clarity", "structure", "vocabulary"],
        ),
        ("cognitive", true, &["recall", "apply", "analyze", "evaluate"]),
        ("collaboration", false, &["listening", "feedback", "ownership"]),
    ];

    fn schema() -> ProfileSchema {
        ProfileSchema::new(
            GROUPS
                .iter()
                .map(|(id, ordered, dims)| GroupSpec {
                    id: (*id).to_owned(),
                    ordered: *ordered,
                    dimensions: dims.iter().map(|d| (*d).to_owned()).collect(),
                })
                .collect(),
        )
        .unwrap()
    }

    fn candidate(id: &str, score: impl Fn(&str, &str) -> f64) -> CandidateScores {
        let scores = GROUPS
            .iter()
            .flat_map(|(group, _, dims)| {
                dims.iter().map(|name| RawScore {
                    dimension: schema::dimension_id(group, name),
                    value: score(group, name),
                })
            })
            .collect();
        CandidateScores {
            candidate_id: id.to_owned(),
            scores,
        }
    }

    fn random_candidate(id: &str, rng: &mut Pcg32) -> CandidateScores {
        let mut scores = candidate(id, |_, _| 0.0);
        for score in &mut scores.scores {
            score.value = f64::from(rng.random_range(0..=10_u8)) / 2.0;
        }
        scores
    }

    fn analyze(scores: &CandidateScores) -> CandidateAnalysis {
        analyze_candidate(
            &schema(),
            &ScoreScale::default(),
            &Thresholds::default(),
            scores,
        )
        .unwrap()
    }

    fn labels(analysis: &CandidateAnalysis, group: &str) -> Vec<PatternLabel> {
        analysis
            .group(group)
            .unwrap()
            .classification
            .labels
            .iter()
            .collect()
    }

    #[test]
    fn test_uniform_high_profile() {
        let analysis = analyze(&candidate("C001", |_, _| 4.9));
        for group in &analysis.groups {
            assert!(group.descriptors.std.abs() < 1e-12);
            assert!((group.descriptors.mean - 0.98).abs() < 1e-12);
            assert_eq!(
                labels(&analysis, &group.group),
                vec![PatternLabel::Balanced, PatternLabel::UniformHigh]
            );
        }
    }

    #[test]
    fn test_single_group_bottleneck() {
        let analysis = analyze(&candidate("C002", |group, name| {
            match (group, name) {
                ("communication", "clarity") => 1.5,
                ("communication", _) => 4.7,
                _ => 4.2,
            }
        }));
        assert_eq!(
            labels(&analysis, "communication"),
            vec![PatternLabel::Bottleneck]
        );
        let details = &analysis.group("communication").unwrap().classification.details;
        assert_eq!(
            details.bottleneck_dimensions,
            Some(vec!["communication::clarity".to_owned()])
        );
        for group in ["cognitive", "collaboration"] {
            assert_eq!(
                labels(&analysis, group),
                vec![PatternLabel::Balanced, PatternLabel::UniformHigh]
            );
        }
    }

    #[test]
    fn test_normalized_scores_follow_schema_order() {
        let mut scores = candidate("C003", |_, _| 3.0);
        scores.scores.reverse();
        let analysis = analyze(&scores);
        assert_eq!(analysis.normalized[0].dimension, "communication::grammar");
        assert_eq!(analysis.normalized[0].raw, 3.0);
        assert_eq!(
            analysis.normalized.last().unwrap().dimension,
            "collaboration::ownership"
        );
    }

    #[test]
    fn test_out_of_range_fails_the_candidate() {
        let err = analyze_candidate(
            &schema(),
            &ScoreScale::default(),
            &Thresholds::default(),
            &candidate("C004", |_, name| if name == "apply" { 7.0 } else { 3.0 }),
        )
        .unwrap_err();
        assert!(matches!(err, AnalysisError::Normalize { .. }));
        assert_eq!(err.candidate_id(), "C004");
    }

    #[test]
    fn test_missing_dimension_fails_the_candidate() {
        let mut scores = candidate("C005", |_, _| 3.0);
        scores.scores.pop();
        let err = analyze_candidate(
            &schema(),
            &ScoreScale::default(),
            &Thresholds::default(),
            &scores,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            AnalysisError::Structure {
                source: StructureError::MissingDimension { .. },
                ..
            }
        ));
    }

    #[test]
    fn test_repeated_runs_are_identical() {
        let mut rng = Pcg32::seed_from_u64(17);
        for i in 0..50 {
            let scores = random_candidate(&format!("C{i:03}"), &mut rng);
            assert_eq!(analyze(&scores), analyze(&scores));
        }
    }

    #[test]
    fn test_input_order_does_not_matter() {
        let mut rng = Pcg32::seed_from_u64(23);
        for i in 0..50 {
            let scores = random_candidate(&format!("C{i:03}"), &mut rng);
            let mut shuffled = scores.clone();
            shuffled.scores.shuffle(&mut rng);
            assert_eq!(analyze(&scores), analyze(&shuffled));
        }
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let mut rng = Pcg32::seed_from_u64(29);
        let candidates = (0..64)
            .map(|i| random_candidate(&format!("C{i:03}"), &mut rng))
            .collect::<Vec<_>>();
        let sequential = candidates.iter().map(analyze).collect::<Vec<_>>();
        let parallel = analyze_candidates(
            &schema(),
            &ScoreScale::default(),
            &Thresholds::default(),
            &candidates,
        )
        .unwrap();
        assert_eq!(sequential, parallel);
    }

    #[test]
    fn test_batch_reports_first_failure_in_input_order() {
        let mut candidates = (0..16)
            .map(|i| candidate(&format!("C{i:03}"), |_, _| 3.0))
            .collect::<Vec<_>>();
        candidates[5].scores[0].value = -1.0;
        candidates[11].scores[0].value = 9.0;
        let err = analyze_candidates(
            &schema(),
            &ScoreScale::default(),
            &Thresholds::default(),
            &candidates,
        )
        .unwrap_err();
        assert_eq!(err.candidate_id(), "C005");
    }
}
