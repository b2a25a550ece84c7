//! Cropwatch Domain Layer
//!
//! Core types for turning free-form model answers into structured crop
//! analysis results. This crate is pure data and declarations: no I/O, no
//! validation logic (that lives in `cropwatch-extractor`).
//!
//! ## Key Concepts
//!
//! - **ExtractionSchema**: declarative shape an answer must have
//! - **ExtractionResult**: `Structured` payload or `Fallback` with a reason
//! - **Provenance**: `ai` vs `default`
//! - **RequestKind**: trends, insights, risk assessment, image health, general analysis
//! - **Reports**: typed payloads whose `Default` is the fallback object

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod field;
pub mod kind;
pub mod reports;
pub mod result;
pub mod schema;
pub mod traits;

// Re-exports for convenience
pub use field::{FieldData, ImageAttachment, UploadedFile};
pub use kind::RequestKind;
pub use reports::{
    CropInsights, PlantHealthReport, Report, RiskAssessment, TrendPrediction, UploadAnalysis,
};
pub use result::{ExtractionResult, FallbackReason, Provenance};
pub use schema::{ExtractionSchema, FieldSpec, FieldType, NumericRange};
pub use traits::{GenerationRequest, LlmProvider};
