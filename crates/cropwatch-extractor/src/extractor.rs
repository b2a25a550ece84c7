//! Core ResponseExtractor implementation

use crate::config::ExtractorConfig;
use crate::locate::{locate_candidate, Candidate};
use crate::validate::{validate_value, ROOT_PATH};
use cropwatch_domain::{
    ExtractionResult, ExtractionSchema, FallbackReason, Report, RequestKind,
};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

/// Recovers schema-checked structured data from raw model output
///
/// Extraction never fails: when the text holds no usable answer the caller's
/// fallback is returned together with the reason.
#[derive(Debug, Clone, Default)]
pub struct ResponseExtractor {
    config: ExtractorConfig,
}

/// Why a raw response did not yield a structured value
struct Rejection {
    reason: FallbackReason,
    detail: String,
}

impl Rejection {
    fn new(reason: FallbackReason, detail: impl Into<String>) -> Self {
        Self {
            reason,
            detail: detail.into(),
        }
    }
}

impl ResponseExtractor {
    /// Create an extractor with the default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an extractor with a specific configuration
    pub fn with_config(config: ExtractorConfig) -> Self {
        Self { config }
    }

    /// Active configuration
    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    /// Extract a typed value from `raw`, or return `fallback` with the reason
    pub fn extract<T: DeserializeOwned>(
        &self,
        raw: &str,
        schema: &ExtractionSchema,
        fallback: T,
    ) -> ExtractionResult<T> {
        let typed = self.structured_value(raw, schema).and_then(|value| {
            serde_json::from_value::<T>(value).map_err(|e| {
                Rejection::new(FallbackReason::schema_violation(ROOT_PATH), e.to_string())
            })
        });
        self.finish(schema, typed, fallback)
    }

    /// Extract an untyped JSON value; on success it is the parsed answer
    /// after coercion
    pub fn extract_value(
        &self,
        raw: &str,
        schema: &ExtractionSchema,
        fallback: Value,
    ) -> ExtractionResult<Value> {
        let value = self.structured_value(raw, schema);
        self.finish(schema, value, fallback)
    }

    /// Extract the payload of a request kind with its catalog schema and
    /// default
    pub fn extract_report<R: Report>(&self, raw: &str) -> ExtractionResult<R> {
        self.extract(raw, R::KIND.schema(), R::default())
    }

    /// Untyped counterpart of [`extract_report`](Self::extract_report)
    pub fn extract_kind(&self, kind: RequestKind, raw: &str) -> ExtractionResult<Value> {
        self.extract_value(raw, kind.schema(), kind.fallback_value())
    }

    fn structured_value(&self, raw: &str, schema: &ExtractionSchema) -> Result<Value, Rejection> {
        let Candidate { text, source } = locate_candidate(raw, &self.config).ok_or_else(|| {
            Rejection::new(
                FallbackReason::NoCandidateFound,
                format!("{} chars without a fence or brace span", raw.len()),
            )
        })?;
        debug!("Candidate from {:?}: {} chars", source, text.len());

        let mut value: Value = serde_json::from_str(text)
            .map_err(|e| Rejection::new(FallbackReason::ParseError, e.to_string()))?;

        validate_value(&mut value, schema, &self.config).map_err(|violation| {
            Rejection::new(
                FallbackReason::schema_violation(violation.path.clone()),
                violation.to_string(),
            )
        })?;

        Ok(value)
    }

    fn finish<T>(
        &self,
        schema: &ExtractionSchema,
        outcome: Result<T, Rejection>,
        fallback: T,
    ) -> ExtractionResult<T> {
        match outcome {
            Ok(value) => {
                debug!("Extracted structured '{}' result", schema.name());
                ExtractionResult::Structured(value)
            }
            Err(rejection) => {
                warn!(
                    "Falling back to default '{}' result: {} ({})",
                    schema.name(),
                    rejection.reason,
                    rejection.detail
                );
                ExtractionResult::fallback(fallback, rejection.reason)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cropwatch_domain::{FieldSpec, FieldType, Provenance, TrendPrediction};
    use serde_json::json;

    fn trends(raw: &str) -> ExtractionResult<Value> {
        ResponseExtractor::new().extract_kind(RequestKind::Trends, raw)
    }

    fn reason(result: &ExtractionResult<Value>) -> String {
        result.reason().map(ToString::to_string).unwrap_or_default()
    }

    #[test]
    fn test_fenced_answer_is_structured() {
        let raw = "Here is the result:\n```json\n{\"predicted_ndvi\":{\"value\":0.8,\"change_percent\":5,\"confidence\":90}}\n```";
        let result = trends(raw);
        assert!(result.is_structured());
        assert_eq!(result.value()["predicted_ndvi"]["value"], json!(0.8));
    }

    #[test]
    fn test_prose_only_is_no_candidate() {
        let result = trends("I think the crop looks fine but I can't give numbers.");
        assert_eq!(reason(&result), "no-candidate-found");
        assert_eq!(result.value(), &RequestKind::Trends.fallback_value());
    }

    #[test]
    fn test_out_of_range_names_field() {
        let result = trends("{ \"predicted_ndvi\": { \"value\": 1.5 } }");
        assert_eq!(reason(&result), "schema-violation:predicted_ndvi.value");
        assert_eq!(result.provenance(), Provenance::Default);
    }

    #[test]
    fn test_malformed_candidates_are_parse_errors() {
        for raw in [
            "```json\n{\"predicted_ndvi\": {\"value\": 0.5,}}\n```",
            "{\"predicted_ndvi\": \"unterminated}",
            "```json\nnot json at all\n```",
        ] {
            assert_eq!(reason(&trends(raw)), "parse-error", "{}", raw);
        }
    }

    #[test]
    fn test_non_object_answer_is_root_violation() {
        assert_eq!(reason(&trends("```json\n[1, 2]\n```")), "schema-violation:$");
    }

    #[test]
    fn test_typed_extraction_fills_optional_members() {
        let raw = r#"{"predicted_ndvi":{"value":0.61,"change_percent":-2,"confidence":70}}"#;
        let result = ResponseExtractor::new().extract_report::<TrendPrediction>(raw);
        assert!(result.is_structured());
        let report = result.value();
        assert_eq!(report.predicted_ndvi.value, 0.61);
        assert_eq!(report.predicted_gndvi, TrendPrediction::default().predicted_gndvi);
    }

    #[test]
    fn test_typed_failure_is_root_violation() {
        let schema = ExtractionSchema::new("ad-hoc")
            .with_field(FieldSpec::required("count", FieldType::number()));
        let result: ExtractionResult<u8> =
            ResponseExtractor::new().extract(r#"{"count": 3}"#, &schema, 0);
        assert_eq!(result.reason(), Some(&FallbackReason::schema_violation("$")));
        assert_eq!(*result.value(), 0);
    }

    #[test]
    fn test_config_controls_coercion() {
        let raw = r#"{"predicted_ndvi":{"value":"0.7","change_percent":1,"confidence":"80%"}}"#;
        assert_eq!(
            reason(&trends(raw)),
            "schema-violation:predicted_ndvi.value"
        );

        let lenient = ResponseExtractor::with_config(ExtractorConfig::lenient());
        let result = lenient.extract_kind(RequestKind::Trends, raw);
        assert!(result.is_structured());
        assert_eq!(result.value()["predicted_ndvi"]["confidence"], json!(80));
    }
}
