//! Extraction outcomes and their provenance

use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

/// Where a result's payload came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provenance {
    /// Recovered from the model's answer
    Ai,
    /// Statically-defined fallback object
    Default,
}

impl fmt::Display for Provenance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Provenance::Ai => write!(f, "ai"),
            Provenance::Default => write!(f, "default"),
        }
    }
}

/// Why a result fell back to its default payload
///
/// The `Display` form is the diagnostic code (`no-candidate-found`,
/// `parse-error`, `schema-violation:<field>`, `provider-error`). It is meant
/// for logs, not for end users.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FallbackReason {
    /// No fenced or brace-delimited span in the text
    NoCandidateFound,
    /// A candidate was found but is not valid JSON
    ParseError,
    /// Parsed, but the value at `field` violates the schema
    SchemaViolation {
        /// Path of the first offending field (`a.b[0].c`, `$` for the root)
        field: String,
    },
    /// The model could not be reached; produced by the analyzer only
    ProviderError,
}

impl FallbackReason {
    /// Convenience constructor for schema violations
    pub fn schema_violation(field: impl Into<String>) -> Self {
        FallbackReason::SchemaViolation {
            field: field.into(),
        }
    }
}

impl fmt::Display for FallbackReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FallbackReason::NoCandidateFound => write!(f, "no-candidate-found"),
            FallbackReason::ParseError => write!(f, "parse-error"),
            FallbackReason::SchemaViolation { field } => write!(f, "schema-violation:{}", field),
            FallbackReason::ProviderError => write!(f, "provider-error"),
        }
    }
}

impl Serialize for FallbackReason {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Outcome of extracting a structured answer
///
/// Both variants carry a complete payload of the same type, so callers can
/// render either without checking for missing fields.
#[derive(Debug, Clone, PartialEq)]
pub enum ExtractionResult<T> {
    /// The model's answer satisfied the schema
    Structured(T),
    /// The default payload, with the reason extraction failed
    Fallback {
        /// Statically-defined default
        value: T,
        /// Diagnostic reason
        reason: FallbackReason,
    },
}

impl<T> ExtractionResult<T> {
    /// Build a fallback result
    pub fn fallback(value: T, reason: FallbackReason) -> Self {
        ExtractionResult::Fallback { value, reason }
    }

    /// Provenance tag of the payload
    pub fn provenance(&self) -> Provenance {
        match self {
            ExtractionResult::Structured(_) => Provenance::Ai,
            ExtractionResult::Fallback { .. } => Provenance::Default,
        }
    }

    /// Whether the payload came from the model
    pub fn is_structured(&self) -> bool {
        matches!(self, ExtractionResult::Structured(_))
    }

    /// Borrow the payload
    pub fn value(&self) -> &T {
        match self {
            ExtractionResult::Structured(value) => value,
            ExtractionResult::Fallback { value, .. } => value,
        }
    }

    /// Take the payload
    pub fn into_value(self) -> T {
        match self {
            ExtractionResult::Structured(value) => value,
            ExtractionResult::Fallback { value, .. } => value,
        }
    }

    /// Fallback reason, if any
    pub fn reason(&self) -> Option<&FallbackReason> {
        match self {
            ExtractionResult::Structured(_) => None,
            ExtractionResult::Fallback { reason, .. } => Some(reason),
        }
    }

    /// Transform the payload, keeping provenance and reason
    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> ExtractionResult<U> {
        match self {
            ExtractionResult::Structured(value) => ExtractionResult::Structured(f(value)),
            ExtractionResult::Fallback { value, reason } => ExtractionResult::Fallback {
                value: f(value),
                reason,
            },
        }
    }
}

impl<T: Serialize> Serialize for ExtractionResult<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            ExtractionResult::Structured(value) => {
                let mut state = serializer.serialize_struct("ExtractionResult", 2)?;
                state.serialize_field("provenance", &Provenance::Ai)?;
                state.serialize_field("value", value)?;
                state.end()
            }
            ExtractionResult::Fallback { value, reason } => {
                let mut state = serializer.serialize_struct("ExtractionResult", 3)?;
                state.serialize_field("provenance", &Provenance::Default)?;
                state.serialize_field("value", value)?;
                state.serialize_field("reason", reason)?;
                state.end()
            }
        }
    }
}
