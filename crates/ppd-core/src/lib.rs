//! Structural diagnostics for rubric-scored skill profiles.
//!
//! The engine turns raw rubric scores into descriptive, non-evaluative
//! diagnostics. It never ranks candidates, fits weights, or learns from
//! data: every threshold is a fixed, versioned input.
//!
//! # Pipeline
//!
//! ```text
//! candidate path:
//!   RawScore ─> normalize ─> structure ─> describe ─> classify ─> CandidateAnalysis
//!
//! cohort path:
//!   [CandidateAnalysis] ─> aggregate_cohort ─> CohortReport ─> resolve_context
//! ```
//!
//! # Modules
//!
//! - [`scale`]: rubric scale and normalization onto `[0, 1]`
//! - [`schema`]: frozen dimension-to-group schema
//! - [`thresholds`]: versioned threshold configuration
//! - [`profile`]: raw and normalized scores, grouping by schema
//! - [`descriptor`]: per-group statistical descriptors
//! - [`pattern`]: structural pattern labels
//! - [`candidate`]: candidate pass orchestration
//! - [`cohort`]: cohort distributions, prevalence and breach rates
//! - [`context`]: percentile position of a candidate within a cohort
//!
//! # Determinism
//!
//! Identical scores, schema, scale and thresholds always produce identical
//! results, whatever the order of scores within a candidate or of
//! candidates within a cohort. Cohort data never feeds back into
//! candidate-level labels.

pub mod candidate;
pub mod cohort;
pub mod context;
pub mod descriptor;
pub mod pattern;
pub mod profile;
pub mod scale;
pub mod schema;
pub mod thresholds;
