//! Analyzer: prompt, model call and extraction for one request

use crate::config::ExtractorConfig;
use crate::error::ExtractorError;
use crate::extractor::ResponseExtractor;
use crate::prompt::{PromptBuilder, DEFAULT_TIMEFRAME};
use crate::types::{Analysis, AnalysisInput, AnalysisMetadata};
use cropwatch_domain::{
    ExtractionResult, FallbackReason, GenerationRequest, LlmProvider, Report, RequestKind,
};
use serde_json::Value;
use std::sync::Arc;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};
use tokio::time::timeout;
use tracing::{debug, info, warn};

/// Runs analysis requests against a model provider
///
/// Provider failures and timeouts do not surface as errors: they produce the
/// kind's default payload tagged `provider-error`, the same shape as any
/// other fallback.
pub struct Analyzer<L>
where
    L: LlmProvider,
{
    provider: Arc<L>,
    extractor: ResponseExtractor,
    request_timeout: Duration,
}

impl<L> Clone for Analyzer<L>
where
    L: LlmProvider,
{
    fn clone(&self) -> Self {
        Self {
            provider: Arc::clone(&self.provider),
            extractor: self.extractor.clone(),
            request_timeout: self.request_timeout,
        }
    }
}

impl<L> Analyzer<L>
where
    L: LlmProvider,
{
    /// Create a new Analyzer
    pub fn new(provider: L, config: ExtractorConfig) -> Result<Self, ExtractorError> {
        config.validate().map_err(ExtractorError::Config)?;
        let request_timeout = config.request_timeout();
        Ok(Self {
            provider: Arc::new(provider),
            extractor: ResponseExtractor::with_config(config),
            request_timeout,
        })
    }

    /// Override the model call timeout
    pub fn with_timeout(mut self, request_timeout: Duration) -> Self {
        self.request_timeout = request_timeout;
        self
    }

    /// Extractor used on model answers
    pub fn extractor(&self) -> &ResponseExtractor {
        &self.extractor
    }

    /// Analyze `input` and extract the typed payload for `R::KIND`
    pub async fn analyze<R: Report>(
        &self,
        input: AnalysisInput,
    ) -> Result<Analysis<R>, ExtractorError> {
        let started = Instant::now();
        let request = build_request(R::KIND, &input)?;

        let result = match self.call(R::KIND, &request).await {
            Some(raw) => self.extractor.extract_report::<R>(&raw),
            None => ExtractionResult::fallback(R::default(), FallbackReason::ProviderError),
        };

        Ok(self.finish(R::KIND, &input, result, started))
    }

    /// Analyze `input` for `kind` and extract an untyped JSON payload
    pub async fn analyze_value(
        &self,
        kind: RequestKind,
        input: AnalysisInput,
    ) -> Result<Analysis<Value>, ExtractorError> {
        let started = Instant::now();
        let request = build_request(kind, &input)?;

        let result = match self.call(kind, &request).await {
            Some(raw) => self.extractor.extract_kind(kind, &raw),
            None => ExtractionResult::fallback(kind.fallback_value(), FallbackReason::ProviderError),
        };

        Ok(self.finish(kind, &input, result, started))
    }

    /// Call the model with a timeout; `None` when no answer arrived
    async fn call(&self, kind: RequestKind, request: &GenerationRequest) -> Option<String> {
        info!(
            "Requesting '{}' analysis from {} (prompt {} chars, image: {})",
            kind,
            self.provider.model_name(),
            request.prompt.len(),
            request.image.is_some()
        );

        match timeout(self.request_timeout, self.provider.generate(request)).await {
            Ok(Ok(raw)) => {
                debug!("Model response length: {} chars", raw.len());
                Some(raw)
            }
            Ok(Err(e)) => {
                warn!("Model call for '{}' failed: {}", kind, e);
                None
            }
            Err(_) => {
                warn!(
                    "Model call for '{}' timed out after {:?}",
                    kind, self.request_timeout
                );
                None
            }
        }
    }

    fn finish<T>(
        &self,
        kind: RequestKind,
        input: &AnalysisInput,
        result: ExtractionResult<T>,
        started: Instant,
    ) -> Analysis<T> {
        let timeframe = match input {
            AnalysisInput::Field { timeframe, .. } => Some(
                timeframe
                    .clone()
                    .unwrap_or_else(|| DEFAULT_TIMEFRAME.to_string()),
            ),
            _ => None,
        };

        let metadata = AnalysisMetadata {
            kind,
            timeframe,
            model_name: self.provider.model_name().to_string(),
            generated_at: SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_secs())
                .unwrap_or(0),
            processing_time_ms: started.elapsed().as_millis() as u64,
        };

        info!(
            "Analysis '{}' complete: provenance {}, {} ms",
            kind,
            result.provenance(),
            metadata.processing_time_ms
        );

        Analysis { result, metadata }
    }
}

/// Build the model request for `kind`, rejecting inputs that cannot feed it
fn build_request(
    kind: RequestKind,
    input: &AnalysisInput,
) -> Result<GenerationRequest, ExtractorError> {
    if !input.accepts(kind) {
        return Err(ExtractorError::InvalidRequest(format!(
            "'{}' cannot be analyzed from {}",
            kind,
            input.describe()
        )));
    }

    let builder = PromptBuilder::new(kind);
    let request = match input {
        AnalysisInput::Field { data, timeframe } => {
            let mut builder = builder.with_field_data(data.clone());
            if let Some(timeframe) = timeframe {
                builder = builder.with_timeframe(timeframe.clone());
            }
            GenerationRequest::text(builder.build())
        }
        AnalysisInput::Image { image, context } => {
            if image.is_empty() {
                return Err(ExtractorError::InvalidRequest(
                    "Missing image data".to_string(),
                ));
            }
            let builder = match context {
                Some(context) => builder.with_context(context.clone()),
                None => builder,
            };
            GenerationRequest::text(builder.build()).with_image(image.clone())
        }
        AnalysisInput::Files { files, context } => {
            let builder = builder.with_files(files.clone());
            let builder = match context {
                Some(context) => builder.with_context(context.clone()),
                None => builder,
            };
            GenerationRequest::text(builder.build())
        }
    };

    Ok(request)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use cropwatch_domain::{
        FieldData, ImageAttachment, PlantHealthReport, Provenance, TrendPrediction, UploadedFile,
    };
    use cropwatch_llm::MockProvider;

    fn field_input() -> AnalysisInput {
        AnalysisInput::Field {
            data: FieldData {
                ndvi: 0.7,
                gndvi: 0.6,
                temperature: 22.0,
                soil_moisture: 30.0,
                vpd: 1.1,
                field_size: 8.0,
                crop_type: "Wheat".to_string(),
                growth_stage: "Tillering".to_string(),
                last_rainfall: 2.0,
                humidity: 55.0,
            },
            timeframe: None,
        }
    }

    fn analyzer(provider: MockProvider) -> Analyzer<MockProvider> {
        Analyzer::new(provider, ExtractorConfig::default()).unwrap()
    }

    /// Provider that never answers in time
    struct SlowProvider;

    #[async_trait]
    impl LlmProvider for SlowProvider {
        type Error = String;

        async fn generate(&self, _request: &GenerationRequest) -> Result<String, Self::Error> {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok("{}".to_string())
        }

        fn model_name(&self) -> &str {
            "slow"
        }
    }

    #[tokio::test]
    async fn test_analyze_structured() {
        let provider = MockProvider::new(
            "Forecast below.\n```json\n{\"predicted_ndvi\":{\"value\":0.75,\"change_percent\":3,\"confidence\":80}}\n```",
        );
        let analysis = analyzer(provider.clone())
            .analyze::<TrendPrediction>(field_input())
            .await
            .unwrap();

        assert!(analysis.result.is_structured());
        assert_eq!(analysis.result.value().predicted_ndvi.value, 0.75);
        assert_eq!(analysis.metadata.kind, RequestKind::Trends);
        assert_eq!(analysis.metadata.timeframe.as_deref(), Some(DEFAULT_TIMEFRAME));
        assert_eq!(analysis.metadata.model_name, "mock");
        assert_eq!(provider.call_count(), 1);
    }

    #[tokio::test]
    async fn test_provider_error_falls_back() {
        let mut provider = MockProvider::new("unused");
        let prompt = PromptBuilder::new(RequestKind::Trends)
            .with_field_data(match field_input() {
                AnalysisInput::Field { data, .. } => data,
                _ => unreachable!(),
            })
            .build();
        provider.add_error(prompt, "HTTP 503");

        let analysis = analyzer(provider)
            .analyze::<TrendPrediction>(field_input())
            .await
            .unwrap();
        assert_eq!(analysis.result.reason(), Some(&FallbackReason::ProviderError));
        assert_eq!(analysis.result.value(), &TrendPrediction::default());
    }

    #[tokio::test]
    async fn test_timeout_falls_back() {
        let analyzer = Analyzer::new(SlowProvider, ExtractorConfig::default())
            .unwrap()
            .with_timeout(Duration::from_millis(20));
        let analysis = analyzer
            .analyze_value(RequestKind::Insights, field_input())
            .await
            .unwrap();
        assert_eq!(analysis.result.provenance(), Provenance::Default);
        assert_eq!(analysis.result.reason(), Some(&FallbackReason::ProviderError));
        assert_eq!(analysis.result.value(), &RequestKind::Insights.fallback_value());
    }

    #[tokio::test]
    async fn test_image_request_carries_attachment() {
        let provider = MockProvider::new(
            r#"Mild stress. {"status":"Stressed","issues":["leaf curl"],"recommendations":["irrigate"],"confidence":72}"#,
        );
        let analysis = analyzer(provider.clone())
            .analyze::<PlantHealthReport>(AnalysisInput::Image {
                image: ImageAttachment::new("image/png", "iVBORw0"),
                context: Some("tomato leaves".to_string()),
            })
            .await
            .unwrap();

        assert!(analysis.result.is_structured());
        assert_eq!(analysis.result.value().issues, vec!["leaf curl".to_string()]);
        assert!(analysis.metadata.timeframe.is_none());

        let request = provider.last_request().unwrap();
        assert!(request.prompt.contains("tomato leaves"));
        assert_eq!(request.image.unwrap().mime_type, "image/png");
    }

    #[tokio::test]
    async fn test_empty_image_is_invalid() {
        let provider = MockProvider::new("{}");
        let result = analyzer(provider.clone())
            .analyze::<PlantHealthReport>(AnalysisInput::Image {
                image: ImageAttachment::new("image/jpeg", ""),
                context: None,
            })
            .await;
        assert!(matches!(result, Err(ExtractorError::InvalidRequest(ref m)) if m == "Missing image data"));
        assert_eq!(provider.call_count(), 0);
    }

    #[tokio::test]
    async fn test_kind_input_mismatch_is_invalid() {
        let result = analyzer(MockProvider::new("{}"))
            .analyze_value(
                RequestKind::Trends,
                AnalysisInput::Files {
                    files: vec![UploadedFile::new("text/csv", "a.csv")],
                    context: None,
                },
            )
            .await;
        assert!(matches!(result, Err(ExtractorError::InvalidRequest(_))));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = ExtractorConfig {
            request_timeout_secs: 0,
            ..ExtractorConfig::default()
        };
        assert!(matches!(
            Analyzer::new(MockProvider::new("{}"), config),
            Err(ExtractorError::Config(_))
        ));
    }
}
