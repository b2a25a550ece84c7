//! Declarative description of the shape an AI answer must have
//!
//! A schema lists the fields a structured answer has to carry, with their
//! primitive types and, for numbers, an optional plausible range. Schemas are
//! built once per request kind and shared read-only.

use std::fmt;

/// Inclusive numeric range used for sanity-checking model output
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NumericRange {
    /// Lower bound (inclusive)
    pub min: f64,
    /// Upper bound (inclusive)
    pub max: f64,
}

impl NumericRange {
    /// Create a new range
    ///
    /// # Panics
    /// Panics if `min > max`
    pub fn new(min: f64, max: f64) -> Self {
        assert!(min <= max, "Range minimum must be <= maximum");
        Self { min, max }
    }

    /// Range with only a lower bound
    pub fn at_least(min: f64) -> Self {
        Self {
            min,
            max: f64::INFINITY,
        }
    }

    /// Check if the range contains a value
    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }
}

impl fmt::Display for NumericRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.max.is_infinite() {
            write!(f, ">= {}", self.min)
        } else {
            write!(f, "{} to {}", self.min, self.max)
        }
    }
}

/// Expected runtime type of a field
#[derive(Debug, Clone, PartialEq)]
pub enum FieldType {
    /// Any JSON number, optionally range-checked
    Number {
        /// Plausible range, if any
        range: Option<NumericRange>,
    },
    /// Any JSON string
    String,
    /// A string restricted to a fixed set of values
    Enum(Vec<String>),
    /// JSON `true` / `false`
    Boolean,
    /// A non-null array whose elements all have the given type
    Array(Box<FieldType>),
    /// A nested object validated recursively
    Object(Vec<FieldSpec>),
}

impl FieldType {
    /// Unbounded number
    pub fn number() -> Self {
        FieldType::Number { range: None }
    }

    /// Number within `[min, max]`
    pub fn number_in(min: f64, max: f64) -> Self {
        FieldType::Number {
            range: Some(NumericRange::new(min, max)),
        }
    }

    /// Number that must be at least `min`
    pub fn number_at_least(min: f64) -> Self {
        FieldType::Number {
            range: Some(NumericRange::at_least(min)),
        }
    }

    /// Enumerated string
    pub fn one_of(values: &[&str]) -> Self {
        FieldType::Enum(values.iter().map(|v| v.to_string()).collect())
    }

    /// Array of `element`
    pub fn array(element: FieldType) -> Self {
        FieldType::Array(Box::new(element))
    }

    /// Array of strings
    pub fn string_array() -> Self {
        Self::array(FieldType::String)
    }

    /// Nested object
    pub fn object(fields: Vec<FieldSpec>) -> Self {
        FieldType::Object(fields)
    }

    /// Short human-readable name of the type, used in diagnostics
    pub fn name(&self) -> &'static str {
        match self {
            FieldType::Number { .. } => "number",
            FieldType::String => "string",
            FieldType::Enum(_) => "enumerated string",
            FieldType::Boolean => "boolean",
            FieldType::Array(_) => "array",
            FieldType::Object(_) => "object",
        }
    }
}

/// A named field inside a schema or nested object
#[derive(Debug, Clone, PartialEq)]
pub struct FieldSpec {
    /// Member name in the JSON object
    pub name: String,
    /// Expected type
    pub field_type: FieldType,
    /// Whether the field must be present
    pub required: bool,
}

impl FieldSpec {
    /// A field that must be present
    pub fn required(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type,
            required: true,
        }
    }

    /// A field that is validated only when present
    pub fn optional(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type,
            required: false,
        }
    }
}

/// Expected output shape for one request kind
///
/// # Examples
///
/// ```
/// use cropwatch_domain::{ExtractionSchema, FieldSpec, FieldType};
///
/// let schema = ExtractionSchema::new("ndvi-only").with_field(FieldSpec::required(
///     "ndvi",
///     FieldType::number_in(0.0, 1.0),
/// ));
/// assert_eq!(schema.fields().len(), 1);
/// assert!(schema.skeleton().contains("\"ndvi\": number (0 to 1)"));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractionSchema {
    name: String,
    fields: Vec<FieldSpec>,
}

impl ExtractionSchema {
    /// Create an empty schema
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
        }
    }

    /// Add a top-level field
    pub fn with_field(mut self, field: FieldSpec) -> Self {
        self.fields.push(field);
        self
    }

    /// Add several top-level fields
    pub fn with_fields(mut self, fields: impl IntoIterator<Item = FieldSpec>) -> Self {
        self.fields.extend(fields);
        self
    }

    /// Schema name (the request kind it belongs to)
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Top-level fields in declaration order
    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    /// Render the schema as a JSON-like template for prompts and help output
    pub fn skeleton(&self) -> String {
        let mut out = String::new();
        write_object(&mut out, &self.fields, 0);
        out
    }
}

fn write_object(out: &mut String, fields: &[FieldSpec], indent: usize) {
    if fields.is_empty() {
        out.push_str("{}");
        return;
    }
    out.push_str("{\n");
    for (idx, field) in fields.iter().enumerate() {
        push_indent(out, indent + 1);
        out.push_str(&format!("\"{}\": ", field.name));
        write_type(out, &field.field_type, indent + 1);
        if idx + 1 < fields.len() {
            out.push(',');
        }
        if !field.required {
            out.push_str(" // optional");
        }
        out.push('\n');
    }
    push_indent(out, indent);
    out.push('}');
}

fn write_type(out: &mut String, field_type: &FieldType, indent: usize) {
    match field_type {
        FieldType::Number { range: None } => out.push_str("number"),
        FieldType::Number { range: Some(range) } => {
            out.push_str(&format!("number ({})", range));
        }
        FieldType::String => out.push_str("string"),
        FieldType::Boolean => out.push_str("boolean"),
        FieldType::Enum(values) => out.push_str(&format!("\"{}\"", values.join("|"))),
        FieldType::Array(element) => {
            out.push('[');
            write_type(out, element, indent);
            out.push(']');
        }
        FieldType::Object(fields) => write_object(out, fields, indent),
    }
}

fn push_indent(out: &mut String, indent: usize) {
    for _ in 0..indent {
        out.push_str("  ");
    }
}
