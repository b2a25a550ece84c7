//! Analyze command implementation.

use crate::cli::{AnalyzeArgs, AnalyzeTarget};
use crate::config::Config;
use crate::error::{CliError, Result};
use crate::output::Formatter;
use base64::{engine::general_purpose, Engine as _};
use cropwatch_domain::{FieldData, ImageAttachment, LlmProvider, RequestKind, UploadedFile};
use cropwatch_extractor::{Analysis, AnalysisInput, Analyzer};
use cropwatch_llm::GeminiProvider;
use serde_json::Value;
use std::fs;
use std::path::Path;
use tracing::debug;

/// Execute the analyze command against Gemini.
pub async fn execute_analyze(args: AnalyzeArgs, config: &Config, formatter: &Formatter) -> Result<()> {
    let provider = GeminiProvider::from_env()?
        .with_endpoint(config.gemini.endpoint.clone())
        .with_model(config.gemini.model.clone())
        .with_max_retries(config.gemini.max_retries);
    let analyzer = Analyzer::new(provider, config.extractor.clone())?;

    let analysis = run_analysis(&analyzer, args.target).await?;
    println!("{}", formatter.format_analysis(&analysis)?);
    Ok(())
}

/// Resolve the target into a request and run it through `analyzer`.
pub async fn run_analysis<L: LlmProvider>(
    analyzer: &Analyzer<L>,
    target: AnalyzeTarget,
) -> Result<Analysis<Value>> {
    let (kind, input) = build_input(target)?;
    debug!("Analyzing '{}' with {}", kind, input.describe());
    Ok(analyzer.analyze_value(kind, input).await?)
}

fn build_input(target: AnalyzeTarget) -> Result<(RequestKind, AnalysisInput)> {
    match target {
        AnalyzeTarget::Field {
            kind,
            data,
            timeframe,
        } => {
            if !kind.uses_field_data() {
                return Err(CliError::InvalidInput(format!(
                    "'{}' is not a field-data analysis; use 'analyze image' or 'analyze upload'",
                    kind
                )));
            }
            let data: FieldData = serde_json::from_str(&fs::read_to_string(&data)?)?;
            Ok((kind, AnalysisInput::Field { data, timeframe }))
        }
        AnalyzeTarget::Image {
            image,
            mime,
            context,
        } => {
            let bytes = fs::read(&image)?;
            let mime_type = match mime {
                Some(mime) => mime,
                None => guess_mime(Path::new(&image))?.to_string(),
            };
            let image = ImageAttachment::new(mime_type, general_purpose::STANDARD.encode(bytes));
            Ok((
                RequestKind::ImageHealthAnalysis,
                AnalysisInput::Image { image, context },
            ))
        }
        AnalyzeTarget::Upload { files, context } => {
            let files = files
                .iter()
                .map(|spec| parse_file_spec(spec))
                .collect::<Result<Vec<_>>>()?;
            Ok((
                RequestKind::GeneralAnalysis,
                AnalysisInput::Files { files, context },
            ))
        }
    }
}

/// Parse `type:name`
fn parse_file_spec(spec: &str) -> Result<UploadedFile> {
    match spec.split_once(':') {
        Some((file_type, name)) if !file_type.trim().is_empty() && !name.trim().is_empty() => {
            Ok(UploadedFile::new(file_type.trim(), name.trim()))
        }
        _ => Err(CliError::InvalidInput(format!(
            "Expected TYPE:NAME for uploaded file, got '{}'",
            spec
        ))),
    }
}

fn guess_mime(path: &Path) -> Result<&'static str> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();

    match extension.as_str() {
        "jpg" | "jpeg" => Ok("image/jpeg"),
        "png" => Ok("image/png"),
        "webp" => Ok("image/webp"),
        "heic" => Ok("image/heic"),
        "gif" => Ok("image/gif"),
        _ => Err(CliError::InvalidInput(format!(
            "Cannot tell the image type of '{}'; pass --mime",
            path.display()
        ))),
    }
}
