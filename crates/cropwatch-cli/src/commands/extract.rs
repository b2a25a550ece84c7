//! Extract command implementation.

use crate::cli::ExtractArgs;
use crate::config::Config;
use crate::error::{CliError, Result};
use crate::output::Formatter;
use cropwatch_extractor::ResponseExtractor;
use std::fs;
use std::io::{self, Read};

/// Execute the extract command.
pub fn execute_extract(args: ExtractArgs, config: &Config, formatter: &Formatter) -> Result<()> {
    let raw = match &args.file {
        Some(path) => fs::read_to_string(path)?,
        None => {
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer)?;
            buffer
        }
    };

    println!("{}", render_extraction(&args, &raw, config, formatter)?);
    Ok(())
}

/// Run the extractor on `raw` and format the result.
pub fn render_extraction(
    args: &ExtractArgs,
    raw: &str,
    config: &Config,
    formatter: &Formatter,
) -> Result<String> {
    if raw.trim().is_empty() {
        return Err(CliError::InvalidInput("No model output provided".to_string()));
    }

    let extractor = ResponseExtractor::with_config(config.extractor.clone());
    let result = extractor.extract_kind(args.kind, raw);
    formatter.format_extraction(&result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::OutputFormat;
    use cropwatch_domain::RequestKind;

    fn args(kind: RequestKind) -> ExtractArgs {
        ExtractArgs { kind, file: None }
    }

    #[test]
    fn test_render_structured() {
        let formatter = Formatter::new(OutputFormat::Quiet, false);
        let raw = "Summary first.\n```json\n{\"summary\":\"ok\",\"risks\":[],\"actions\":[\"scout\"]}\n```";
        let output = render_extraction(
            &args(RequestKind::GeneralAnalysis),
            raw,
            &Config::default(),
            &formatter,
        )
        .unwrap();
        assert_eq!(output, "ai");
    }

    #[test]
    fn test_render_uses_configured_extractor() {
        let formatter = Formatter::new(OutputFormat::Quiet, false);
        let raw = r#"{"predicted_ndvi":{"value":"0.8","change_percent":1,"confidence":90}}"#;

        let mut config = Config::default();
        let output =
            render_extraction(&args(RequestKind::Trends), raw, &config, &formatter).unwrap();
        assert_eq!(output, "default schema-violation:predicted_ndvi.value");

        config.extractor.coerce_numeric_strings = true;
        let output =
            render_extraction(&args(RequestKind::Trends), raw, &config, &formatter).unwrap();
        assert_eq!(output, "ai");
    }

    #[test]
    fn test_render_fallback() {
        let formatter = Formatter::new(OutputFormat::Quiet, false);
        let output = render_extraction(
            &args(RequestKind::Trends),
            "I can't give numbers.",
            &Config::default(),
            &formatter,
        )
        .unwrap();
        assert_eq!(output, "default no-candidate-found");
    }

    #[test]
    fn test_empty_input_rejected() {
        let formatter = Formatter::new(OutputFormat::Quiet, false);
        let result = render_extraction(
            &args(RequestKind::Trends),
            "  \n",
            &Config::default(),
            &formatter,
        );
        assert!(matches!(result, Err(CliError::InvalidInput(_))));
    }
}
