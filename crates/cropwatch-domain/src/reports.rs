//! Typed payloads for each request kind, with their fallback defaults
//!
//! The `Default` impl of every report is the fallback shown when extraction
//! fails. Each one is a complete instance of its kind's schema. Optional
//! members missing from a model answer are filled from the same defaults.

use crate::kind::RequestKind;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// A payload type bound to one request kind
pub trait Report: Serialize + DeserializeOwned + Default + Clone + Send + Sync + 'static {
    /// Request kind whose schema this payload satisfies
    const KIND: RequestKind;
}

/// Low/Medium/High/Critical rating shared by risk levels, impacts and priorities
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Severity {
    /// Low
    Low,
    /// Medium
    Medium,
    /// High
    High,
    /// Critical
    Critical,
}

/// Direction of a risk trend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TrendDirection {
    /// Getting better
    Improving,
    /// Unchanged
    Stable,
    /// Getting worse
    Declining,
}

// ---------------------------------------------------------------------------
// trends
// ---------------------------------------------------------------------------

/// Forecast for a single vegetation or climate index
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexForecast {
    /// Predicted value
    pub value: f64,
    /// Change relative to the current reading, in percent
    pub change_percent: f64,
    /// Model confidence, 0-100
    pub confidence: f64,
}

/// Overall risk rating with direction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskScore {
    /// Rating
    pub level: Severity,
    /// Direction
    pub trend: TrendDirection,
    /// Model confidence, 0-100
    pub confidence: f64,
}

/// Min/max temperature in °C
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemperatureRange {
    /// Minimum
    pub min: f64,
    /// Maximum
    pub max: f64,
}

/// Weather and soil outlook
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnvironmentalForecast {
    /// Expected temperature band
    pub temperature_range: TemperatureRange,
    /// Expected soil moisture in percent
    pub soil_moisture_prediction: f64,
    /// Whether irrigation is recommended
    pub irrigation_needed: bool,
}

/// Plain-language trend notes
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrendSummary {
    /// Improving signals
    pub positive_trends: Vec<String>,
    /// Deteriorating signals
    pub concerning_trends: Vec<String>,
    /// Signals holding steady
    pub stable_conditions: Vec<String>,
}

/// Vegetation-index forecast for the trends panel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrendPrediction {
    /// NDVI forecast
    pub predicted_ndvi: IndexForecast,
    /// GNDVI forecast
    pub predicted_gndvi: IndexForecast,
    /// VPD forecast (kPa)
    pub predicted_vpd: IndexForecast,
    /// Risk rating
    pub risk_score: RiskScore,
    /// Environmental outlook
    pub environmental_forecast: EnvironmentalForecast,
    /// Trend notes
    pub trend_summary: TrendSummary,
}

impl Default for TrendPrediction {
    fn default() -> Self {
        Self {
            predicted_ndvi: IndexForecast {
                value: 0.72,
                change_percent: 5.2,
                confidence: 75.0,
            },
            predicted_gndvi: IndexForecast {
                value: 0.68,
                change_percent: 3.1,
                confidence: 75.0,
            },
            predicted_vpd: IndexForecast {
                value: 1.8,
                change_percent: -2.3,
                confidence: 70.0,
            },
            risk_score: RiskScore {
                level: Severity::Medium,
                trend: TrendDirection::Stable,
                confidence: 70.0,
            },
            environmental_forecast: EnvironmentalForecast {
                temperature_range: TemperatureRange { min: 18.0, max: 29.0 },
                soil_moisture_prediction: 32.0,
                irrigation_needed: true,
            },
            trend_summary: TrendSummary {
                positive_trends: vec!["NDVI trending upward over the past week".to_string()],
                concerning_trends: vec!["Soil moisture below optimal range".to_string()],
                stable_conditions: vec!["Wind exposure within acceptable limits".to_string()],
            },
        }
    }
}

impl Report for TrendPrediction {
    const KIND: RequestKind = RequestKind::Trends;
}

// ---------------------------------------------------------------------------
// insights
// ---------------------------------------------------------------------------

/// Icon category for a risk driver
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DriverIcon {
    /// Water related
    Moisture,
    /// Heat related
    Temperature,
    /// Wind related
    Wind,
    /// Nutrient related
    Nutrition,
    /// Pathogen related
    Disease,
}

/// How soon an action should happen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionUrgency {
    /// Act now
    Urgent,
    /// Act soon
    Moderate,
    /// Part of normal operations
    Routine,
}

/// A factor currently driving crop risk
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskDriver {
    /// Factor name
    pub factor: String,
    /// Impact rating
    pub impact: Severity,
    /// Direction in words
    pub trend: String,
    /// Explanation
    pub description: String,
    /// Icon category
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon_type: Option<DriverIcon>,
    /// Current reading
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_value: Option<f64>,
    /// Optimal band in words
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub optimal_range: Option<String>,
}

/// A prioritized management recommendation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionRecommendation {
    /// Priority rating
    pub priority: Severity,
    /// Short title
    pub title: String,
    /// Explanation
    pub description: String,
    /// Urgency
    pub urgency: ActionUrgency,
    /// Concrete steps
    pub actions: Vec<String>,
    /// Expected result
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected_outcome: Option<String>,
    /// When to do it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeframe: Option<String>,
}

/// Self-reported model confidence, each 0-100
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelConfidence {
    /// Confidence in the risk assessment
    pub risk_assessment: f64,
    /// Quality of the input data
    pub data_quality: f64,
    /// Reliability of predictions
    pub prediction_reliability: f64,
}

/// Risk drivers and recommendations for the insights panel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CropInsights {
    /// Top risk drivers
    pub top_risk_drivers: Vec<RiskDriver>,
    /// Recommended actions
    pub action_recommendations: Vec<ActionRecommendation>,
    /// Model confidence
    pub model_confidence: ModelConfidence,
}

impl Default for CropInsights {
    fn default() -> Self {
        Self {
            top_risk_drivers: vec![
                RiskDriver {
                    factor: "Soil Moisture".to_string(),
                    impact: Severity::High,
                    trend: "Decreasing".to_string(),
                    description: "Soil moisture levels have dropped 15% in the past week".to_string(),
                    icon_type: Some(DriverIcon::Moisture),
                    current_value: None,
                    optimal_range: None,
                },
                RiskDriver {
                    factor: "Temperature Stress".to_string(),
                    impact: Severity::Medium,
                    trend: "Increasing".to_string(),
                    description: "Daytime temperatures exceeding optimal range for crop type".to_string(),
                    icon_type: Some(DriverIcon::Temperature),
                    current_value: None,
                    optimal_range: None,
                },
                RiskDriver {
                    factor: "Wind Exposure".to_string(),
                    impact: Severity::Low,
                    trend: "Stable".to_string(),
                    description: "Wind patterns within acceptable limits".to_string(),
                    icon_type: Some(DriverIcon::Wind),
                    current_value: None,
                    optimal_range: None,
                },
            ],
            action_recommendations: vec![
                ActionRecommendation {
                    priority: Severity::High,
                    title: "Irrigation Scheduling".to_string(),
                    description: "Soil moisture levels are below optimal. Consider scheduling irrigation within 48 hours.".to_string(),
                    urgency: ActionUrgency::Urgent,
                    actions: vec![
                        "Check soil moisture sensors".to_string(),
                        "Review irrigation system".to_string(),
                        "Schedule watering".to_string(),
                    ],
                    expected_outcome: None,
                    timeframe: None,
                },
                ActionRecommendation {
                    priority: Severity::Medium,
                    title: "Heat Stress Mitigation".to_string(),
                    description: "Temperature trends suggest potential heat stress. Monitor crop response closely.".to_string(),
                    urgency: ActionUrgency::Moderate,
                    actions: vec![
                        "Increase monitoring frequency".to_string(),
                        "Consider shade management".to_string(),
                        "Adjust irrigation timing".to_string(),
                    ],
                    expected_outcome: None,
                    timeframe: None,
                },
                ActionRecommendation {
                    priority: Severity::Low,
                    title: "Nutrient Management".to_string(),
                    description: "NDVI patterns suggest adequate nutrition levels. Continue current program.".to_string(),
                    urgency: ActionUrgency::Routine,
                    actions: vec![
                        "Maintain fertilizer schedule".to_string(),
                        "Monitor for deficiency signs".to_string(),
                    ],
                    expected_outcome: None,
                    timeframe: None,
                },
            ],
            model_confidence: ModelConfidence {
                risk_assessment: 70.0,
                data_quality: 70.0,
                prediction_reliability: 70.0,
            },
        }
    }
}

impl Report for CropInsights {
    const KIND: RequestKind = RequestKind::Insights;
}

// ---------------------------------------------------------------------------
// risk_assessment
// ---------------------------------------------------------------------------

/// Time window of an early warning
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WarningUrgency {
    /// Act immediately
    #[serde(rename = "immediate")]
    Immediate,
    /// Within a day
    #[serde(rename = "24h")]
    Within24Hours,
    /// Within two days
    #[serde(rename = "48h")]
    Within48Hours,
    /// Within a week
    #[serde(rename = "7days")]
    Within7Days,
}

/// A single identified risk
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskFactor {
    /// Risk category
    #[serde(rename = "type")]
    pub risk_type: String,
    /// Severity
    pub severity: Severity,
    /// Probability, 0-100
    pub probability: f64,
    /// Explanation
    pub description: String,
    /// Mitigations
    pub mitigation_actions: Vec<String>,
}

/// An early-warning alert
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EarlyWarning {
    /// Alert category
    pub alert_type: String,
    /// Time window
    pub urgency: WarningUrgency,
    /// Alert text
    pub message: String,
    /// Suggested response
    pub recommended_action: String,
}

/// Composite health scores, each 0-100
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldHealthScore {
    /// Overall score
    pub overall: f64,
    /// Vegetation vigour
    pub vegetation_health: f64,
    /// Water stress
    pub water_stress: f64,
    /// Environmental stress
    pub environmental_stress: f64,
}

/// Early-warning risk assessment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskAssessment {
    /// Overall rating
    pub overall_risk_level: Severity,
    /// Identified risks
    pub risk_factors: Vec<RiskFactor>,
    /// Alerts
    pub early_warnings: Vec<EarlyWarning>,
    /// Health scores
    pub field_health_score: FieldHealthScore,
}

impl Default for RiskAssessment {
    fn default() -> Self {
        Self {
            overall_risk_level: Severity::Medium,
            risk_factors: vec![RiskFactor {
                risk_type: "Water stress".to_string(),
                severity: Severity::Medium,
                probability: 60.0,
                description: "Soil moisture is trending below the optimal range".to_string(),
                mitigation_actions: vec![
                    "Check soil moisture sensors".to_string(),
                    "Schedule irrigation".to_string(),
                ],
            }],
            early_warnings: vec![EarlyWarning {
                alert_type: "Irrigation".to_string(),
                urgency: WarningUrgency::Within48Hours,
                message: "Soil moisture may drop below the stress threshold".to_string(),
                recommended_action: "Plan an irrigation cycle".to_string(),
            }],
            field_health_score: FieldHealthScore {
                overall: 72.0,
                vegetation_health: 75.0,
                water_stress: 40.0,
                environmental_stress: 35.0,
            },
        }
    }
}

impl Report for RiskAssessment {
    const KIND: RequestKind = RequestKind::RiskAssessment;
}

// ---------------------------------------------------------------------------
// image-health-analysis
// ---------------------------------------------------------------------------

/// Health verdict for an analysed image
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    /// No problems found
    Healthy,
    /// Under stress
    Stressed,
    /// Disease present
    Diseased,
    /// Could not tell
    Unknown,
}

/// Plant and soil health read from an image
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlantHealthReport {
    /// Verdict
    pub status: HealthStatus,
    /// Problems found
    pub issues: Vec<String>,
    /// Advice
    pub recommendations: Vec<String>,
    /// Confidence, 0-100
    pub confidence: f64,
}

impl Default for PlantHealthReport {
    fn default() -> Self {
        Self {
            status: HealthStatus::Unknown,
            issues: Vec::new(),
            recommendations: vec!["Retake the photo in good daylight and try again".to_string()],
            confidence: 0.0,
        }
    }
}

impl Report for PlantHealthReport {
    const KIND: RequestKind = RequestKind::ImageHealthAnalysis;
}

// ---------------------------------------------------------------------------
// general-analysis
// ---------------------------------------------------------------------------

/// Summary of uploaded imagery and sensor data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadAnalysis {
    /// Readable summary
    pub summary: String,
    /// Risks spotted
    pub risks: Vec<String>,
    /// Suggested actions
    pub actions: Vec<String>,
}

impl Default for UploadAnalysis {
    fn default() -> Self {
        Self {
            summary: "No analysis available for the uploaded files".to_string(),
            risks: Vec::new(),
            actions: Vec::new(),
        }
    }
}

impl Report for UploadAnalysis {
    const KIND: RequestKind = RequestKind::GeneralAnalysis;
}
