//! Request kinds and the schema catalog
//!
//! Every kind of AI request the dashboard issues has one schema, defined
//! here once and shared read-only by all extractions.

use crate::reports::{CropInsights, PlantHealthReport, RiskAssessment, TrendPrediction, UploadAnalysis};
use crate::schema::{ExtractionSchema, FieldSpec, FieldType};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

/// Kind of analysis requested from the model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RequestKind {
    /// Vegetation-index trend prediction
    #[serde(rename = "trends")]
    Trends,
    /// Risk drivers and recommendations
    #[serde(rename = "insights")]
    Insights,
    /// Early-warning risk assessment
    #[serde(rename = "risk_assessment")]
    RiskAssessment,
    /// Plant health from a photo
    #[serde(rename = "image-health-analysis")]
    ImageHealthAnalysis,
    /// Summary of uploaded assets
    #[serde(rename = "general-analysis")]
    GeneralAnalysis,
}

impl RequestKind {
    /// All kinds, in catalog order
    pub const ALL: [RequestKind; 5] = [
        RequestKind::Trends,
        RequestKind::Insights,
        RequestKind::RiskAssessment,
        RequestKind::ImageHealthAnalysis,
        RequestKind::GeneralAnalysis,
    ];

    /// Wire name of the kind
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestKind::Trends => "trends",
            RequestKind::Insights => "insights",
            RequestKind::RiskAssessment => "risk_assessment",
            RequestKind::ImageHealthAnalysis => "image-health-analysis",
            RequestKind::GeneralAnalysis => "general-analysis",
        }
    }

    /// Whether prompts for this kind are built from field readings
    pub fn uses_field_data(&self) -> bool {
        matches!(
            self,
            RequestKind::Trends | RequestKind::Insights | RequestKind::RiskAssessment
        )
    }

    /// Shared schema for this kind
    pub fn schema(&self) -> &'static ExtractionSchema {
        match self {
            RequestKind::Trends => &TRENDS_SCHEMA,
            RequestKind::Insights => &INSIGHTS_SCHEMA,
            RequestKind::RiskAssessment => &RISK_ASSESSMENT_SCHEMA,
            RequestKind::ImageHealthAnalysis => &IMAGE_HEALTH_SCHEMA,
            RequestKind::GeneralAnalysis => &GENERAL_ANALYSIS_SCHEMA,
        }
    }

    /// Fallback payload for this kind as untyped JSON
    pub fn fallback_value(&self) -> Value {
        let value = match self {
            RequestKind::Trends => serde_json::to_value(TrendPrediction::default()),
            RequestKind::Insights => serde_json::to_value(CropInsights::default()),
            RequestKind::RiskAssessment => serde_json::to_value(RiskAssessment::default()),
            RequestKind::ImageHealthAnalysis => serde_json::to_value(PlantHealthReport::default()),
            RequestKind::GeneralAnalysis => serde_json::to_value(UploadAnalysis::default()),
        };
        // Plain structs with string keys always serialize.
        value.unwrap_or_default()
    }
}

impl fmt::Display for RequestKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RequestKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace('_', "-");
        match normalized.as_str() {
            "trends" => Ok(RequestKind::Trends),
            "insights" => Ok(RequestKind::Insights),
            "risk-assessment" => Ok(RequestKind::RiskAssessment),
            "image-health-analysis" => Ok(RequestKind::ImageHealthAnalysis),
            "general-analysis" => Ok(RequestKind::GeneralAnalysis),
            _ => Err(format!("Unknown request kind: {}", s)),
        }
    }
}

const LEVELS: &[&str] = &["Low", "Medium", "High"];
const SEVERITIES: &[&str] = &["Low", "Medium", "High", "Critical"];

fn percent() -> FieldType {
    FieldType::number_in(0.0, 100.0)
}

fn index_forecast(value: FieldType) -> FieldType {
    FieldType::object(vec![
        FieldSpec::required("value", value),
        FieldSpec::required("change_percent", FieldType::number()),
        FieldSpec::required("confidence", percent()),
    ])
}

static TRENDS_SCHEMA: LazyLock<ExtractionSchema> = LazyLock::new(|| {
    ExtractionSchema::new(RequestKind::Trends.as_str()).with_fields([
        FieldSpec::required("predicted_ndvi", index_forecast(FieldType::number_in(0.0, 1.0))),
        FieldSpec::optional("predicted_gndvi", index_forecast(FieldType::number_in(0.0, 1.0))),
        FieldSpec::optional("predicted_vpd", index_forecast(FieldType::number_at_least(0.0))),
        FieldSpec::optional(
            "risk_score",
            FieldType::object(vec![
                FieldSpec::required("level", FieldType::one_of(LEVELS)),
                FieldSpec::required(
                    "trend",
                    FieldType::one_of(&["Improving", "Stable", "Declining"]),
                ),
                FieldSpec::required("confidence", percent()),
            ]),
        ),
        FieldSpec::optional(
            "environmental_forecast",
            FieldType::object(vec![
                FieldSpec::required(
                    "temperature_range",
                    FieldType::object(vec![
                        FieldSpec::required("min", FieldType::number()),
                        FieldSpec::required("max", FieldType::number()),
                    ]),
                ),
                FieldSpec::required("soil_moisture_prediction", percent()),
                FieldSpec::required("irrigation_needed", FieldType::Boolean),
            ]),
        ),
        FieldSpec::optional(
            "trend_summary",
            FieldType::object(vec![
                FieldSpec::required("positive_trends", FieldType::string_array()),
                FieldSpec::required("concerning_trends", FieldType::string_array()),
                FieldSpec::required("stable_conditions", FieldType::string_array()),
            ]),
        ),
    ])
});

static INSIGHTS_SCHEMA: LazyLock<ExtractionSchema> = LazyLock::new(|| {
    ExtractionSchema::new(RequestKind::Insights.as_str()).with_fields([
        FieldSpec::required(
            "top_risk_drivers",
            FieldType::array(FieldType::object(vec![
                FieldSpec::required("factor", FieldType::String),
                FieldSpec::required("impact", FieldType::one_of(LEVELS)),
                FieldSpec::required("trend", FieldType::String),
                FieldSpec::required("description", FieldType::String),
                FieldSpec::optional(
                    "icon_type",
                    FieldType::one_of(&["moisture", "temperature", "wind", "nutrition", "disease"]),
                ),
                FieldSpec::optional("current_value", FieldType::number()),
                FieldSpec::optional("optimal_range", FieldType::String),
            ])),
        ),
        FieldSpec::required(
            "action_recommendations",
            FieldType::array(FieldType::object(vec![
                FieldSpec::required("priority", FieldType::one_of(LEVELS)),
                FieldSpec::required("title", FieldType::String),
                FieldSpec::required("description", FieldType::String),
                FieldSpec::required("urgency", FieldType::one_of(&["urgent", "moderate", "routine"])),
                FieldSpec::required("actions", FieldType::string_array()),
                FieldSpec::optional("expected_outcome", FieldType::String),
                FieldSpec::optional("timeframe", FieldType::String),
            ])),
        ),
        FieldSpec::optional(
            "model_confidence",
            FieldType::object(vec![
                FieldSpec::required("risk_assessment", percent()),
                FieldSpec::required("data_quality", percent()),
                FieldSpec::required("prediction_reliability", percent()),
            ]),
        ),
    ])
});

static RISK_ASSESSMENT_SCHEMA: LazyLock<ExtractionSchema> = LazyLock::new(|| {
    ExtractionSchema::new(RequestKind::RiskAssessment.as_str()).with_fields([
        FieldSpec::required("overall_risk_level", FieldType::one_of(SEVERITIES)),
        FieldSpec::optional(
            "risk_factors",
            FieldType::array(FieldType::object(vec![
                FieldSpec::required("type", FieldType::String),
                FieldSpec::required("severity", FieldType::one_of(SEVERITIES)),
                FieldSpec::required("probability", percent()),
                FieldSpec::required("description", FieldType::String),
                FieldSpec::required("mitigation_actions", FieldType::string_array()),
            ])),
        ),
        FieldSpec::optional(
            "early_warnings",
            FieldType::array(FieldType::object(vec![
                FieldSpec::required("alert_type", FieldType::String),
                FieldSpec::required(
                    "urgency",
                    FieldType::one_of(&["immediate", "24h", "48h", "7days"]),
                ),
                FieldSpec::required("message", FieldType::String),
                FieldSpec::required("recommended_action", FieldType::String),
            ])),
        ),
        FieldSpec::optional(
            "field_health_score",
            FieldType::object(vec![
                FieldSpec::required("overall", percent()),
                FieldSpec::required("vegetation_health", percent()),
                FieldSpec::required("water_stress", percent()),
                FieldSpec::required("environmental_stress", percent()),
            ]),
        ),
    ])
});

static IMAGE_HEALTH_SCHEMA: LazyLock<ExtractionSchema> = LazyLock::new(|| {
    ExtractionSchema::new(RequestKind::ImageHealthAnalysis.as_str()).with_fields([
        FieldSpec::required(
            "status",
            FieldType::one_of(&["healthy", "stressed", "diseased", "unknown"]),
        ),
        FieldSpec::required("issues", FieldType::string_array()),
        FieldSpec::required("recommendations", FieldType::string_array()),
        FieldSpec::required("confidence", percent()),
    ])
});

static GENERAL_ANALYSIS_SCHEMA: LazyLock<ExtractionSchema> = LazyLock::new(|| {
    ExtractionSchema::new(RequestKind::GeneralAnalysis.as_str()).with_fields([
        FieldSpec::required("summary", FieldType::String),
        FieldSpec::required("risks", FieldType::string_array()),
        FieldSpec::required("actions", FieldType::string_array()),
    ])
});
