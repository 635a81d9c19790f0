//! Input payloads
//!
//! A candidate payload carries identity metadata and nested rubric scores:
//!
//! ```json
//! {
//!   "candidate": { "id": 1, "email": "a@b.c", "phone_number": "0", "linkedin_tag": "a" },
//!   "scores": { "communication": { "grammar": 4.0, "clarity": 3.5 } }
//! }
//! ```
//!
//! A cohort payload is `{ "candidates": [payload, ...] }`. Identity is
//! metadata only: the analysis sees nothing but the opaque candidate id.

use std::{
    collections::{BTreeMap, HashSet},
    fmt,
};

use anyhow::{bail, ensure};
use ppd_core::{
    profile::CandidateScores,
    schema::{GroupSpec, ProfileSchema, SchemaError},
};
use serde::{Deserialize, Serialize};

pub type NestedScores = BTreeMap<String, BTreeMap<String, f64>>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CandidateId {
    Number(i64),
    Text(String),
}

impl fmt::Display for CandidateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CandidateId::Number(id) => write!(f, "{id}"),
            CandidateId::Text(id) => f.write_str(id),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateIdentity {
    pub id: CandidateId,
    pub email: String,
    pub phone_number: String,
    pub linkedin_tag: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CandidatePayload {
    pub candidate: CandidateIdentity,
    pub scores: NestedScores,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CohortPayload {
    pub candidates: Vec<CandidatePayload>,
}

impl CandidatePayload {
    pub fn validate(&self) -> anyhow::Result<()> {
        let identity = &self.candidate;
        if let CandidateId::Text(id) = &identity.id {
            ensure!(!id.trim().is_empty(), "candidate.id must be non-empty");
        }
        for (field, value) in [
            ("email", &identity.email),
            ("phone_number", &identity.phone_number),
            ("linkedin_tag", &identity.linkedin_tag),
        ] {
            ensure!(
                !value.trim().is_empty(),
                "candidate.{field} must be a non-empty string"
            );
        }

        ensure!(!self.scores.is_empty(), "'scores' contains no groups");
        for (group, metrics) in &self.scores {
            ensure!(!group.trim().is_empty(), "group names must be non-empty");
            ensure!(!metrics.is_empty(), "group '{group}' has no metrics");
            if let Some(metric) = metrics.keys().find(|m| m.trim().is_empty()) {
                bail!("group '{group}' has an empty metric name '{metric}'");
            }
        }
        Ok(())
    }

    pub fn to_scores(&self) -> CandidateScores {
        CandidateScores::from_nested(self.candidate.id.to_string(), &self.scores)
    }
}

impl CohortPayload {
    pub fn validate(&self) -> anyhow::Result<()> {
        ensure!(!self.candidates.is_empty(), "cohort contains no candidates");
        let mut seen = HashSet::new();
        for (index, payload) in self.candidates.iter().enumerate() {
            payload
                .validate()
                .map_err(|e| e.context(format!("invalid candidate at index {index}")))?;
            let id = payload.candidate.id.to_string();
            ensure!(seen.insert(id.clone()), "candidate id '{id}' appears more than once");
        }
        Ok(())
    }
}

/// Builds a schema from one candidate's nested scores.
///
/// Groups and dimensions follow the key order of the payload maps, and
/// every group is treated as unordered.
pub fn infer_schema(scores: &NestedScores) -> Result<ProfileSchema, SchemaError> {
    let specs = scores
        .iter()
        .map(|(group, metrics)| GroupSpec {
            id: group.clone(),
            ordered: false,
            dimensions: metrics.keys().cloned().collect(),
        })
        .collect();
    ProfileSchema::new(specs)
}
