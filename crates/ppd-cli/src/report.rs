//! Report envelopes
//!
//! Every report carries a [`Metadata`] block and has its floats rounded to
//! [`FLOAT_DECIMALS`] places before it is written.

use chrono::{SecondsFormat, Utc};
use ppd_core::{
    candidate::{CandidateAnalysis, GroupDiagnostics},
    cohort::CohortReport,
    context::CandidateContext,
    descriptor::GroupDescriptors,
    pattern::Classification,
    profile::NormalizedScore,
};
use serde::Serialize;
use serde_json::{Number, Value};

use crate::payload::CandidateIdentity;

pub const FLOAT_DECIMALS: i32 = 6;

const TOOL: &str = "Profile Pattern Diagnostics (PPD)";
const SCOPE_NOTE: &str =
    "Diagnostic + descriptive only. No predictions, rankings, or suitability decisions.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Axis {
    #[serde(rename = "within-candidate")]
    WithinCandidate,
    #[serde(rename = "across-candidate")]
    AcrossCandidate,
}

#[derive(Debug, Clone, Serialize)]
pub struct Metadata {
    pub tool: &'static str,
    pub version: &'static str,
    pub axis: Axis,
    pub thresholds_version: String,
    pub generated_at_utc: String,
    pub scope_note: &'static str,
}

impl Metadata {
    pub fn new(axis: Axis, thresholds_version: &str) -> Self {
        Self {
            tool: TOOL,
            version: env!("CARGO_PKG_VERSION"),
            axis,
            thresholds_version: thresholds_version.to_owned(),
            generated_at_utc: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
            scope_note: SCOPE_NOTE,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct GroupReport<'a> {
    pub group: &'a str,
    pub ordered: bool,
    pub descriptors: &'a GroupDescriptors,
    #[serde(flatten)]
    pub patterns: Option<&'a Classification>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport<'a> {
    pub candidate_id: &'a str,
    pub normalized: &'a [NormalizedScore],
    pub groups: Vec<GroupReport<'a>>,
}

impl<'a> AnalysisReport<'a> {
    pub fn new(analysis: &'a CandidateAnalysis, include_patterns: bool) -> Self {
        let group = |g: &'a GroupDiagnostics| GroupReport {
            group: &g.group,
            ordered: g.ordered,
            descriptors: &g.descriptors,
            patterns: include_patterns.then_some(&g.classification),
        };
        Self {
            candidate_id: &analysis.candidate_id,
            normalized: &analysis.normalized,
            groups: analysis.groups.iter().map(group).collect(),
        }
    }
}

/// Within-candidate report.
#[derive(Debug, Clone, Serialize)]
pub struct CandidateReport<'a> {
    pub metadata: Metadata,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub candidate: Option<&'a CandidateIdentity>,
    pub analysis: AnalysisReport<'a>,
}

/// Candidate reports of a whole cohort, written next to the cohort report.
#[derive(Debug, Clone, Serialize)]
pub struct CandidateReportBatch<'a> {
    pub metadata: Metadata,
    pub candidates: Vec<CandidateEntry<'a>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CandidateEntry<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub candidate: Option<&'a CandidateIdentity>,
    pub analysis: AnalysisReport<'a>,
}

/// Across-candidate report. Carries no identity beyond opaque candidate ids.
#[derive(Debug, Clone, Serialize)]
pub struct CohortReportEnvelope<'a> {
    pub metadata: Metadata,
    pub cohort: &'a CohortReport,
    pub contexts: &'a [CandidateContext],
}

/// Serializes `value` and rounds every float in it.
pub fn to_rounded_json<T>(value: &T) -> serde_json::Result<Value>
where
    T: Serialize,
{
    let mut json = serde_json::to_value(value)?;
    round_floats(&mut json);
    Ok(json)
}

fn round_floats(value: &mut Value) {
    match value {
        Value::Number(n) if n.is_f64() => {
            if let Some(rounded) = n.as_f64().map(round).and_then(Number::from_f64) {
                *n = rounded;
            }
        }
        Value::Array(items) => items.iter_mut().for_each(round_floats),
        Value::Object(map) => map.values_mut().for_each(round_floats),
        _ => {}
    }
}

fn round(value: f64) -> f64 {
    let scale = 10_f64.powi(FLOAT_DECIMALS);
    (value * scale).round() / scale
}
