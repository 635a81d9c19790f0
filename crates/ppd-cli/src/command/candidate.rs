use std::path::PathBuf;

use anyhow::Context;
use ppd_core::{candidate, scale::ScoreScale, schema::ProfileSchema, thresholds::Thresholds};
use serde_json::Value;

use crate::{
    command::EngineArg,
    payload::{self, CandidatePayload},
    report::{self, AnalysisReport, Axis, CandidateReport, Metadata},
    util::{self, Output},
};

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct CandidateArg {
    /// Candidate JSON file
    input: PathBuf,
    #[clap(flatten)]
    engine: EngineArg,
    /// Output file path
    #[arg(long)]
    output: Option<PathBuf>,
    /// Omit candidate identity from the report
    #[arg(long)]
    no_identity: bool,
    /// Omit pattern labels from the report
    #[arg(long)]
    no_patterns: bool,
}

pub(crate) fn run(arg: &CandidateArg) -> anyhow::Result<()> {
    let payload = util::read_json_file::<CandidatePayload, _>("candidate", &arg.input)?;
    let schema = arg
        .engine
        .schema
        .as_ref()
        .map(util::read_schema_file)
        .transpose()?;
    let scale = arg.engine.scale()?;
    let thresholds = util::load_thresholds(arg.engine.thresholds.as_deref())?;

    let report = build_report(
        &payload,
        schema,
        &scale,
        &thresholds,
        !arg.no_identity,
        !arg.no_patterns,
    )?;
    Output::save_json(&report, arg.output.as_deref())
}

fn build_report(
    payload: &CandidatePayload,
    schema: Option<ProfileSchema>,
    scale: &ScoreScale,
    thresholds: &Thresholds,
    include_identity: bool,
    include_patterns: bool,
) -> anyhow::Result<Value> {
    payload.validate().context("Invalid candidate payload")?;
    let schema = match schema {
        Some(schema) => schema,
        None => payload::infer_schema(&payload.scores)
            .context("Failed to infer schema from candidate scores")?,
    };

    let analysis = candidate::analyze_candidate(&schema, scale, thresholds, &payload.to_scores())?;
    tracing::info!(
        candidate_id = %analysis.candidate_id,
        groups = analysis.groups.len(),
        "candidate analyzed"
    );

    let report = CandidateReport {
        metadata: Metadata::new(Axis::WithinCandidate, &thresholds.version),
        candidate: include_identity.then_some(&payload.candidate),
        analysis: AnalysisReport::new(&analysis, include_patterns),
    };
    Ok(report::to_rounded_json(&report)?)
}
