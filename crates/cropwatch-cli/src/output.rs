//! Output formatting for the CLI.

use crate::config::OutputFormat;
use crate::error::Result;
use colored::*;
use cropwatch_domain::{ExtractionResult, ExtractionSchema, FieldSpec, FieldType, RequestKind};
use cropwatch_extractor::Analysis;
use serde_json::{json, Value};
use tabled::{
    builder::Builder,
    settings::{object::Rows, Alignment, Modify, Style},
};

/// Output formatter.
pub struct Formatter {
    format: OutputFormat,
    color_enabled: bool,
}

impl Formatter {
    /// Create a new formatter.
    pub fn new(format: OutputFormat, color_enabled: bool) -> Self {
        Self {
            format,
            color_enabled,
        }
    }

    /// Active output format.
    pub fn format(&self) -> OutputFormat {
        self.format
    }

    /// Format an extraction result.
    pub fn format_extraction(&self, result: &ExtractionResult<Value>) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(result)?),
            OutputFormat::Table => Ok(self.extraction_table(result)),
            OutputFormat::Quiet => Ok(quiet_line(result)),
        }
    }

    /// Format an analysis with its metadata.
    pub fn format_analysis(&self, analysis: &Analysis<Value>) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(analysis)?),
            OutputFormat::Quiet => Ok(quiet_line(&analysis.result)),
            OutputFormat::Table => {
                let meta = &analysis.metadata;
                let mut lines = vec![self.info(&format!(
                    "{} analysis by {} in {} ms",
                    meta.kind, meta.model_name, meta.processing_time_ms
                ))];
                if let Some(timeframe) = &meta.timeframe {
                    lines.push(format!("Timeframe: {}", timeframe));
                }
                lines.push(self.extraction_table(&analysis.result));
                Ok(lines.join("\n"))
            }
        }
    }

    /// Format the schemas of `kinds`.
    pub fn format_schemas(&self, kinds: &[RequestKind]) -> Result<String> {
        match self.format {
            OutputFormat::Json => {
                let schemas: Vec<Value> = kinds
                    .iter()
                    .map(|kind| {
                        let fields: Vec<Value> = schema_rows(kind.schema())
                            .into_iter()
                            .map(|row| {
                                json!({
                                    "path": row.path,
                                    "type": row.type_desc,
                                    "required": row.required,
                                })
                            })
                            .collect();
                        json!({ "kind": kind.as_str(), "fields": fields })
                    })
                    .collect();
                Ok(serde_json::to_string_pretty(&schemas)?)
            }
            OutputFormat::Quiet => Ok(kinds
                .iter()
                .map(|kind| kind.schema().skeleton())
                .collect::<Vec<_>>()
                .join("\n")),
            OutputFormat::Table => {
                let mut sections = Vec::new();
                for kind in kinds {
                    let mut builder = Builder::default();
                    builder.push_record(["Field", "Type", "Required"]);
                    for row in schema_rows(kind.schema()) {
                        let required = if row.required { "yes" } else { "no" };
                        builder.push_record([row.path.as_str(), row.type_desc.as_str(), required]);
                    }
                    sections.push(format!(
                        "{}\n{}",
                        self.colorize(kind.as_str(), "cyan"),
                        styled(builder)
                    ));
                }
                Ok(sections.join("\n\n"))
            }
        }
    }

    /// Notice shown above default data.
    pub fn fallback_notice<T>(&self, result: &ExtractionResult<T>) -> Option<String> {
        result
            .reason()
            .map(|reason| self.warning(&format!("Showing default data ({})", reason)))
    }

    fn extraction_table(&self, result: &ExtractionResult<Value>) -> String {
        let mut rows = Vec::new();
        flatten(result.value(), "", &mut rows);

        let mut builder = Builder::default();
        builder.push_record(["Field", "Value"]);
        for (path, value) in &rows {
            builder.push_record([path.as_str(), value.as_str()]);
        }

        let header = self.fallback_notice(result).unwrap_or_else(|| {
            self.success(&format!("Structured result (provenance: {})", result.provenance()))
        });
        format!("{}\n{}", header, styled(builder))
    }

    /// Format a success message.
    pub fn success(&self, message: &str) -> String {
        self.colorize(&format!("✓ {}", message), "green")
    }

    /// Format an error message.
    pub fn error(&self, message: &str) -> String {
        self.colorize(&format!("✗ {}", message), "red")
    }

    /// Format an info message.
    pub fn info(&self, message: &str) -> String {
        self.colorize(&format!("ℹ {}", message), "blue")
    }

    /// Format a warning message.
    pub fn warning(&self, message: &str) -> String {
        self.colorize(&format!("⚠ {}", message), "yellow")
    }

    /// Colorize text if color is enabled.
    fn colorize(&self, text: &str, color: &str) -> String {
        if !self.color_enabled {
            return text.to_string();
        }

        match color {
            "red" => text.red().to_string(),
            "green" => text.green().to_string(),
            "blue" => text.blue().to_string(),
            "yellow" => text.yellow().to_string(),
            "cyan" => text.cyan().to_string(),
            _ => text.to_string(),
        }
    }
}

fn styled(builder: Builder) -> String {
    let mut table = builder.build();
    table
        .with(Style::rounded())
        .with(Modify::new(Rows::first()).with(Alignment::center()));
    table.to_string()
}

/// `ai`, or `default <reason>`
fn quiet_line<T>(result: &ExtractionResult<T>) -> String {
    match result.reason() {
        None => result.provenance().to_string(),
        Some(reason) => format!("{} {}", result.provenance(), reason),
    }
}

/// One row of a schema listing.
#[derive(Debug, PartialEq)]
struct SchemaRow {
    path: String,
    type_desc: String,
    required: bool,
}

fn schema_rows(schema: &ExtractionSchema) -> Vec<SchemaRow> {
    let mut rows = Vec::new();
    push_schema_rows(schema.fields(), "", &mut rows);
    rows
}

fn push_schema_rows(fields: &[FieldSpec], prefix: &str, rows: &mut Vec<SchemaRow>) {
    for field in fields {
        let path = join_path(prefix, &field.name);
        rows.push(SchemaRow {
            path: path.clone(),
            type_desc: describe_type(&field.field_type),
            required: field.required,
        });

        match &field.field_type {
            FieldType::Object(nested) => push_schema_rows(nested, &path, rows),
            FieldType::Array(element) => {
                if let FieldType::Object(nested) = element.as_ref() {
                    push_schema_rows(nested, &format!("{}[]", path), rows);
                }
            }
            _ => {}
        }
    }
}

fn describe_type(field_type: &FieldType) -> String {
    match field_type {
        FieldType::Number { range: Some(range) } => format!("number ({})", range),
        FieldType::Enum(values) => values.join(" | "),
        FieldType::Array(element) => format!("array of {}", describe_type(element)),
        other => other.name().to_string(),
    }
}

/// Flatten a JSON value into `(path, text)` rows for table output.
fn flatten(value: &Value, prefix: &str, rows: &mut Vec<(String, String)>) {
    match value {
        Value::Object(map) => {
            for (key, member) in map {
                flatten(member, &join_path(prefix, key), rows);
            }
        }
        Value::Array(items) if items.iter().all(|i| !i.is_object() && !i.is_array()) => {
            let joined: Vec<String> = items.iter().map(scalar_text).collect();
            rows.push((prefix.to_string(), joined.join(", ")));
        }
        Value::Array(items) => {
            for (idx, item) in items.iter().enumerate() {
                flatten(item, &format!("{}[{}]", prefix, idx), rows);
            }
        }
        scalar => rows.push((prefix.to_string(), scalar_text(scalar))),
    }
}

fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn join_path(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{}.{}", prefix, name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cropwatch_domain::FallbackReason;

    fn structured() -> ExtractionResult<Value> {
        ExtractionResult::Structured(json!({
            "summary": "Dry north block",
            "risks": ["water stress", "heat"],
            "actions": []
        }))
    }

    fn fallback() -> ExtractionResult<Value> {
        ExtractionResult::fallback(
            RequestKind::GeneralAnalysis.fallback_value(),
            FallbackReason::ParseError,
        )
    }

    #[test]
    fn test_table_format() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        let output = formatter.format_extraction(&structured()).unwrap();
        assert!(output.starts_with("✓ Structured result (provenance: ai)"));
        assert!(output.contains("water stress, heat"));
        assert!(output.contains("summary"));
    }

    #[test]
    fn test_table_fallback_notice() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        let output = formatter.format_extraction(&fallback()).unwrap();
        assert!(output.starts_with("⚠ Showing default data (parse-error)"));
    }

    #[test]
    fn test_json_format() {
        let formatter = Formatter::new(OutputFormat::Json, false);
        let output = formatter.format_extraction(&fallback()).unwrap();
        let parsed: Value = serde_json::from_str(&output).unwrap();
        assert_eq!(parsed["provenance"], json!("default"));
        assert_eq!(parsed["reason"], json!("parse-error"));
    }

    #[test]
    fn test_quiet_format() {
        let formatter = Formatter::new(OutputFormat::Quiet, false);
        assert_eq!(formatter.format_extraction(&structured()).unwrap(), "ai");
        assert_eq!(
            formatter.format_extraction(&fallback()).unwrap(),
            "default parse-error"
        );
    }

    #[test]
    fn test_flatten_nested_values() {
        let mut rows = Vec::new();
        flatten(
            &json!({ "a": { "b": 1 }, "list": [{ "c": true }], "tags": ["x"] }),
            "",
            &mut rows,
        );
        assert!(rows.contains(&("a.b".to_string(), "1".to_string())));
        assert!(rows.contains(&("list[0].c".to_string(), "true".to_string())));
        assert!(rows.contains(&("tags".to_string(), "x".to_string())));
    }

    #[test]
    fn test_schema_rows() {
        let rows = schema_rows(RequestKind::Insights.schema());
        let impact = rows
            .iter()
            .find(|r| r.path == "top_risk_drivers[].impact")
            .unwrap();
        assert_eq!(impact.type_desc, "Low | Medium | High");
        assert!(impact.required);

        let confidence = rows.iter().find(|r| r.path == "model_confidence").unwrap();
        assert!(!confidence.required);
    }

    #[test]
    fn test_schema_json_format() {
        let formatter = Formatter::new(OutputFormat::Json, false);
        let output = formatter
            .format_schemas(&[RequestKind::ImageHealthAnalysis])
            .unwrap();
        let parsed: Value = serde_json::from_str(&output).unwrap();
        assert_eq!(parsed[0]["kind"], json!("image-health-analysis"));
        assert_eq!(parsed[0]["fields"][3]["type"], json!("number (0 to 100)"));
    }

    #[test]
    fn test_colorize_disabled() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        assert_eq!(formatter.success("test"), "✓ test");
        assert_eq!(formatter.error("bad"), "✗ bad");
    }
}
