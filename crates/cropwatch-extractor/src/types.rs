//! Request and response types for analysis

use cropwatch_domain::{ExtractionResult, FieldData, ImageAttachment, RequestKind, UploadedFile};
use serde::Serialize;

/// Inputs for one analysis request
#[derive(Debug, Clone)]
pub enum AnalysisInput {
    /// Field readings, for `trends`, `insights` and `risk_assessment`
    Field {
        /// Current readings
        data: FieldData,
        /// Forecast horizon; the prompt default applies when `None`
        timeframe: Option<String>,
    },

    /// A photo, for `image-health-analysis`
    Image {
        /// Encoded image
        image: ImageAttachment,
        /// Optional user description
        context: Option<String>,
    },

    /// Uploaded assets, for `general-analysis`
    Files {
        /// Uploaded files
        files: Vec<UploadedFile>,
        /// Optional user description
        context: Option<String>,
    },
}

impl AnalysisInput {
    /// Whether this input can feed a request of `kind`
    pub fn accepts(&self, kind: RequestKind) -> bool {
        match self {
            AnalysisInput::Field { .. } => kind.uses_field_data(),
            AnalysisInput::Image { .. } => kind == RequestKind::ImageHealthAnalysis,
            AnalysisInput::Files { .. } => kind == RequestKind::GeneralAnalysis,
        }
    }

    /// Short name used in error messages
    pub fn describe(&self) -> &'static str {
        match self {
            AnalysisInput::Field { .. } => "field data",
            AnalysisInput::Image { .. } => "an image",
            AnalysisInput::Files { .. } => "uploaded files",
        }
    }
}

/// Outcome of an analysis: the extraction result plus request metadata
#[derive(Debug, Clone, Serialize)]
pub struct Analysis<T> {
    /// Structured answer or fallback
    pub result: ExtractionResult<T>,

    /// Metadata about the request
    pub metadata: AnalysisMetadata,
}

/// Metadata about an analysis
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisMetadata {
    /// Request kind
    pub kind: RequestKind,

    /// Forecast horizon, for field-data kinds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeframe: Option<String>,

    /// Model that produced the answer
    pub model_name: String,

    /// Unix timestamp (seconds)
    pub generated_at: u64,

    /// Processing time in milliseconds
    pub processing_time_ms: u64,
}
