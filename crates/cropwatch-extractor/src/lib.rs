//! Cropwatch Extractor
//!
//! Recovers schema-validated structured results from free-form model output,
//! degrading to typed defaults when the output is unusable.
//!
//! # Overview
//!
//! Generative models wrap their answers in prose, fence them inconsistently,
//! truncate them or fill fields with the wrong types. The extractor treats
//! the text as untrusted and always hands the caller a complete payload:
//! either the model's answer (`Structured`) or the kind's default
//! (`Fallback`) with a diagnostic reason.
//!
//! # Architecture
//!
//! ```text
//! raw text → locate (fence | last {...}) → parse → validate → Structured
//!                 └────────────── any failure ──────────────→ Fallback(default, reason)
//! ```
//!
//! The [`Analyzer`] wraps the extractor with prompt construction and the
//! model call, mapping provider failures to the same fallback shape.
//!
//! # Example Usage
//!
//! ```
//! use cropwatch_domain::{Provenance, TrendPrediction};
//! use cropwatch_extractor::ResponseExtractor;
//!
//! let extractor = ResponseExtractor::new();
//! let raw = "Here is the result:\n```json\n\
//!            {\"predicted_ndvi\":{\"value\":0.8,\"change_percent\":5,\"confidence\":90}}\n```";
//!
//! let result = extractor.extract_report::<TrendPrediction>(raw);
//! assert_eq!(result.provenance(), Provenance::Ai);
//! assert_eq!(result.value().predicted_ndvi.value, 0.8);
//!
//! let result = extractor.extract_report::<TrendPrediction>("no numbers today");
//! assert_eq!(result.reason().unwrap().to_string(), "no-candidate-found");
//! ```

#![warn(missing_docs)]

mod analyzer;
mod config;
mod error;
mod extractor;
mod locate;
mod prompt;
mod types;
mod validate;


pub use analyzer::Analyzer;
pub use config::ExtractorConfig;
pub use error::ExtractorError;
pub use extractor::ResponseExtractor;
pub use locate::{locate_candidate, Candidate, CandidateSource};
pub use prompt::{PromptBuilder, DEFAULT_TIMEFRAME};
pub use types::{Analysis, AnalysisInput, AnalysisMetadata};
pub use validate::{validate_value, SchemaViolation, ViolationKind, ROOT_PATH};
