//! Candidate score records and their grouped, normalized form
//!
//! ```text
//! CandidateScores (raw, flat)
//!   └─ normalize ──> Vec<NormalizedScore>
//!        └─ structure (against ProfileSchema) ──> GroupedVector
//!             └─ groups: Vec<GroupScores>   (schema order)
//!                  └─ values in declared dimension order
//! ```
//!
//! Every schema dimension must be scored exactly once per candidate. A
//! missing, unknown, or duplicated dimension fails the whole candidate.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{
    scale::{OutOfRangeError, ScoreScale},
    schema::{self, ProfileSchema},
};

#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum StructureError {
    #[display("dimension '{dimension}' has no score")]
    MissingDimension { dimension: String },
    #[display("dimension '{dimension}' is not part of the schema")]
    UnknownDimension { dimension: String },
    #[display("dimension '{dimension}' is scored more than once")]
    DuplicateScore { dimension: String },
}

/// Error raised while normalizing one dimension score.
#[derive(Debug, Clone, PartialEq, derive_more::Display, derive_more::Error)]
#[display("dimension '{dimension}': {source}")]
pub struct NormalizeError {
    pub dimension: String,
    pub source: OutOfRangeError,
}

/// One raw rubric score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawScore {
    pub dimension: String,
    pub value: f64,
}

/// All raw scores of one candidate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateScores {
    pub candidate_id: String,
    pub scores: Vec<RawScore>,
}

impl CandidateScores {
    /// Flattens `{group: {name: score}}` into `"<group>::<name>"` dimension scores.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::collections::BTreeMap;
    /// use ppd_core::profile::CandidateScores;
    ///
    /// let nested = BTreeMap::from([(
    ///     "communication".to_owned(),
    ///     BTreeMap::from([("grammar".to_owned(), 4.0), ("clarity".to_owned(), 3.5)]),
    /// )]);
    /// let scores = CandidateScores::from_nested("C001", &nested);
    ///
    /// assert_eq!(scores.scores.len(), 2);
    /// assert_eq!(scores.scores[0].dimension, "communication::clarity");
    /// ```
    #[must_use]
    pub fn from_nested(
        candidate_id: impl Into<String>,
        nested: &BTreeMap<String, BTreeMap<String, f64>>,
    ) -> Self {
        let scores = nested
            .iter()
            .flat_map(|(group, metrics)| {
                metrics.iter().map(move |(name, value)| RawScore {
                    dimension: schema::dimension_id(group, name),
                    value: *value,
                })
            })
            .collect();
        Self {
            candidate_id: candidate_id.into(),
            scores,
        }
    }

    /// Normalizes every score onto `[0, 1]`, failing on the first out-of-range value.
    pub fn normalize(&self, scale: &ScoreScale) -> Result<Vec<NormalizedScore>, NormalizeError> {
        self.scores
            .iter()
            .map(|score| {
                let value = scale.normalize(score.value).map_err(|source| NormalizeError {
                    dimension: score.dimension.clone(),
                    source,
                })?;
                Ok(NormalizedScore {
                    dimension: score.dimension.clone(),
                    raw: score.value,
                    value,
                })
            })
            .collect()
    }
}

/// A raw score together with its normalized value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedScore {
    pub dimension: String,
    pub raw: f64,
    pub value: f64,
}

/// Normalized scores of one group, in declared dimension order.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupScores {
    pub group: String,
    pub ordered: bool,
    pub dimensions: Vec<String>,
    pub values: Vec<f64>,
}

/// Normalized scores of one candidate, partitioned by group in schema order.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupedVector {
    pub candidate_id: String,
    pub groups: Vec<GroupScores>,
}

impl GroupedVector {
    /// Places normalized scores into the schema's groups.
    ///
    /// Scores may arrive in any order; the result always follows the schema.
    pub fn structure(
        schema: &ProfileSchema,
        candidate_id: &str,
        scores: &[NormalizedScore],
    ) -> Result<Self, StructureError> {
        let mut slots = schema
            .groups()
            .iter()
            .map(|g| vec![None; g.dimensions.len()])
            .collect::<Vec<Vec<Option<f64>>>>();

        for score in scores {
            let (group, position) =
                schema
                    .locate(&score.dimension)
                    .ok_or_else(|| StructureError::UnknownDimension {
                        dimension: score.dimension.clone(),
                    })?;
            let slot = &mut slots[group][position];
            if slot.is_some() {
                return Err(StructureError::DuplicateScore {
                    dimension: score.dimension.clone(),
                });
            }
            *slot = Some(score.value);
        }

        let groups = schema
            .groups()
            .iter()
            .zip(slots)
            .map(|(group, slots)| {
                let values = group
                    .dimensions
                    .iter()
                    .zip(slots)
                    .map(|(dimension, value)| {
                        value.ok_or_else(|| StructureError::MissingDimension {
                            dimension: dimension.id.clone(),
                        })
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(GroupScores {
                    group: group.id.clone(),
                    ordered: group.ordered,
                    dimensions: group.dimensions.iter().map(|d| d.id.clone()).collect(),
                    values,
                })
            })
            .collect::<Result<Vec<_>, StructureError>>()?;

        Ok(Self {
            candidate_id: candidate_id.to_owned(),
            groups,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::GroupSpec;

    fn schema() -> ProfileSchema {
        ProfileSchema::new(vec![
            GroupSpec {
                id: "g".to_owned(),
                ordered: true,
                dimensions: vec!["a".to_owned(), "b".to_owned(), "c".to_owned()],
            },
            GroupSpec {
                id: "h".to_owned(),
                ordered: false,
                dimensions: vec!["x".to_owned()],
            },
        ])
        .unwrap()
    }

    fn scores(pairs: &[(&str, f64)]) -> CandidateScores {
        CandidateScores {
            candidate_id: "C001".to_owned(),
            scores: pairs
                .iter()
                .map(|(dimension, value)| RawScore {
                    dimension: (*dimension).to_owned(),
                    value: *value,
                })
                .collect(),
        }
    }

    fn structure(pairs: &[(&str, f64)]) -> Result<GroupedVector, StructureError> {
        let normalized = scores(pairs).normalize(&ScoreScale::default()).unwrap();
        GroupedVector::structure(&schema(), "C001", &normalized)
    }

    #[test]
    fn test_structure_follows_schema_order() {
        let grouped = structure(&[("h::x", 5.0), ("g::c", 1.0), ("g::a", 2.0), ("g::b", 0.0)])
            .unwrap();
        assert_eq!(grouped.groups[0].group, "g");
        assert_eq!(grouped.groups[0].values, vec![0.4, 0.0, 0.2]);
        assert_eq!(grouped.groups[0].dimensions, vec!["g::a", "g::b", "g::c"]);
        assert!(grouped.groups[0].ordered);
        assert_eq!(grouped.groups[1].values, vec![1.0]);
    }

    #[test]
    fn test_missing_dimension_is_an_error() {
        let err = structure(&[("g::a", 1.0), ("g::b", 1.0), ("h::x", 1.0)]).unwrap_err();
        assert_eq!(
            err,
            StructureError::MissingDimension {
                dimension: "g::c".to_owned()
            }
        );
    }

    #[test]
    fn test_unknown_dimension_is_an_error() {
        let err = structure(&[
            ("g::a", 1.0),
            ("g::b", 1.0),
            ("g::c", 1.0),
            ("h::x", 1.0),
            ("h::y", 1.0),
        ])
        .unwrap_err();
        assert!(matches!(err, StructureError::UnknownDimension { .. }));
    }

    #[test]
    fn test_duplicate_score_is_an_error() {
        let err = structure(&[("g::a", 1.0), ("g::a", 2.0)]).unwrap_err();
        assert!(matches!(err, StructureError::DuplicateScore { .. }));
    }

    #[test]
    fn test_normalize_reports_dimension() {
        let err = scores(&[("g::a", 1.0), ("g::b", 6.0)])
            .normalize(&ScoreScale::default())
            .unwrap_err();
        assert_eq!(err.dimension, "g::b");
        assert_eq!(err.source.value, 6.0);
    }
}
