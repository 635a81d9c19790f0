use std::path::PathBuf;

use anyhow::Context;
use ppd_core::{
    candidate, cohort, context, scale::ScoreScale, schema::ProfileSchema, thresholds::Thresholds,
};
use serde_json::Value;

use crate::{
    command::EngineArg,
    payload::{self, CohortPayload},
    report::{
        self, AnalysisReport, Axis, CandidateEntry, CandidateReportBatch, CohortReportEnvelope,
        Metadata,
    },
    util::{self, Output},
};

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct CohortArg {
    /// Cohort JSON file (`{"candidates": [...]}`)
    input: PathBuf,
    #[clap(flatten)]
    engine: EngineArg,
    /// Output file path for the cohort report
    #[arg(long)]
    output: Option<PathBuf>,
    /// Also write every candidate report to this file
    #[arg(long)]
    candidates_output: Option<PathBuf>,
    /// Omit candidate identity from the candidate reports
    #[arg(long)]
    no_identity: bool,
}

/// Rounded cohort report and, optionally, the rounded candidate reports.
struct CohortOutputs {
    cohort: Value,
    candidates: Option<Value>,
}

pub(crate) fn run(arg: &CohortArg) -> anyhow::Result<()> {
    let payload = util::read_json_file::<CohortPayload, _>("cohort", &arg.input)?;
    let schema = arg
        .engine
        .schema
        .as_ref()
        .map(util::read_schema_file)
        .transpose()?;
    let scale = arg.engine.scale()?;
    let thresholds = util::load_thresholds(arg.engine.thresholds.as_deref())?;

    let outputs = build_reports(
        &payload,
        schema,
        &scale,
        &thresholds,
        arg.candidates_output.is_some(),
        !arg.no_identity,
    )?;

    Output::save_json(&outputs.cohort, arg.output.as_deref())?;
    if let (Some(path), Some(candidates)) = (&arg.candidates_output, &outputs.candidates) {
        Output::save_json(candidates, Some(path.as_path()))?;
    }
    Ok(())
}

fn build_reports(
    payload: &CohortPayload,
    schema: Option<ProfileSchema>,
    scale: &ScoreScale,
    thresholds: &Thresholds,
    with_candidates: bool,
    include_identity: bool,
) -> anyhow::Result<CohortOutputs> {
    payload.validate().context("Invalid cohort payload")?;
    let schema = match (schema, payload.candidates.first()) {
        (Some(schema), _) => schema,
        (None, Some(first)) => payload::infer_schema(&first.scores)
            .context("Failed to infer schema from the first candidate")?,
        (None, None) => anyhow::bail!("cohort contains no candidates"),
    };

    let scores = payload
        .candidates
        .iter()
        .map(payload::CandidatePayload::to_scores)
        .collect::<Vec<_>>();
    tracing::info!(candidates = scores.len(), "analyzing cohort");
    let analyses = candidate::analyze_candidates(&schema, scale, thresholds, &scores)?;

    let cohort_report = cohort::aggregate_cohort(&schema, thresholds, &analyses)?;
    let contexts = context::resolve_contexts(&cohort_report, &analyses)?;
    tracing::info!(
        cohort_size = cohort_report.cohort_size,
        breach_rates = cohort_report.breach_rates.len(),
        "cohort aggregated"
    );

    let cohort = report::to_rounded_json(&CohortReportEnvelope {
        metadata: Metadata::new(Axis::AcrossCandidate, &thresholds.version),
        cohort: &cohort_report,
        contexts: &contexts,
    })?;

    let candidates = if with_candidates {
        let entries = payload
            .candidates
            .iter()
            .zip(&analyses)
            .map(|(payload, analysis)| CandidateEntry {
                candidate: include_identity.then_some(&payload.candidate),
                analysis: AnalysisReport::new(analysis, true),
            })
            .collect();
        Some(report::to_rounded_json(&CandidateReportBatch {
            metadata: Metadata::new(Axis::WithinCandidate, &thresholds.version),
            candidates: entries,
        })?)
    } else {
        None
    };

    Ok(CohortOutputs { cohort, candidates })
}
