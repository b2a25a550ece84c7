//! Prompt construction for each request kind

use cropwatch_domain::{FieldData, RequestKind, UploadedFile};

/// Forecast horizon used when none is given
pub const DEFAULT_TIMEFRAME: &str = "7 days";

/// Builds the prompt text sent to the model for one request kind
#[derive(Debug, Clone)]
pub struct PromptBuilder {
    kind: RequestKind,
    field_data: Option<FieldData>,
    timeframe: String,
    context: Option<String>,
    files: Vec<UploadedFile>,
}

impl PromptBuilder {
    /// Create a new prompt builder
    pub fn new(kind: RequestKind) -> Self {
        Self {
            kind,
            field_data: None,
            timeframe: DEFAULT_TIMEFRAME.to_string(),
            context: None,
            files: Vec::new(),
        }
    }

    /// Field readings for `trends`, `insights` and `risk_assessment`
    pub fn with_field_data(mut self, field_data: FieldData) -> Self {
        self.field_data = Some(field_data);
        self
    }

    /// Forecast horizon for `trends`
    pub fn with_timeframe(mut self, timeframe: impl Into<String>) -> Self {
        let timeframe = timeframe.into();
        if !timeframe.trim().is_empty() {
            self.timeframe = timeframe.trim().to_string();
        }
        self
    }

    /// Free-form user context; blank context is ignored
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        let context = context.into();
        self.context = (!context.trim().is_empty()).then(|| context.trim().to_string());
        self
    }

    /// Uploaded assets for `general-analysis`
    pub fn with_files(mut self, files: Vec<UploadedFile>) -> Self {
        self.files = files;
        self
    }

    /// Build the complete prompt
    pub fn build(&self) -> String {
        let mut prompt = String::new();

        match self.kind {
            RequestKind::Trends => {
                prompt.push_str(TRENDS_ROLE);
                prompt.push_str("\n\n");
                prompt.push_str(&format!(
                    "Analyze this field data and predict trends for the next {}:\n\n",
                    self.timeframe
                ));
                self.push_field_data(&mut prompt);
            }
            RequestKind::Insights => {
                prompt.push_str(INSIGHTS_ROLE);
                prompt.push_str("\n\n");
                prompt.push_str("Analyze this field data and provide actionable insights:\n\n");
                self.push_field_data(&mut prompt);
            }
            RequestKind::RiskAssessment => {
                prompt.push_str(RISK_ROLE);
                prompt.push_str("\n\n");
                prompt.push_str("Perform a comprehensive risk assessment for this field:\n\n");
                self.push_field_data(&mut prompt);
            }
            RequestKind::ImageHealthAnalysis => {
                prompt.push_str(IMAGE_ROLE);
                prompt.push_str("\n\n");
                prompt.push_str(self.context.as_deref().unwrap_or(DEFAULT_IMAGE_CONTEXT));
                prompt.push_str("\n\n");
                prompt.push_str(IMAGE_CHECKLIST);
                prompt.push('\n');
            }
            RequestKind::GeneralAnalysis => {
                prompt.push_str(UPLOAD_ROLE);
                prompt.push_str("\n\n");
                prompt.push_str(&format!("Files: {}.\n", self.file_summary()));
                if let Some(context) = &self.context {
                    prompt.push_str(&format!("Context: {}\n", context));
                }
                prompt.push_str(UPLOAD_TASK);
                prompt.push('\n');
            }
        }

        prompt.push('\n');
        prompt.push_str(JSON_BLOCK_INSTRUCTION);
        prompt.push_str("\n```json\n");
        prompt.push_str(&self.kind.schema().skeleton());
        prompt.push_str("\n```\n");

        prompt
    }

    fn push_field_data(&self, prompt: &mut String) {
        prompt.push_str("Current Field Data:\n");
        let Some(data) = &self.field_data else {
            prompt.push_str("- (no readings provided)\n");
            return;
        };

        prompt.push_str(&format!("- NDVI: {}\n", data.ndvi));
        prompt.push_str(&format!("- GNDVI: {}\n", data.gndvi));
        prompt.push_str(&format!("- Temperature: {}°C\n", data.temperature));
        prompt.push_str(&format!("- Soil Moisture: {}%\n", data.soil_moisture));
        prompt.push_str(&format!("- VPD: {} kPa\n", data.vpd));
        if self.kind == RequestKind::Insights {
            prompt.push_str(&format!("- Field Size: {} hectares\n", data.field_size));
        }
        prompt.push_str(&format!("- Crop Type: {}\n", data.crop_type));
        prompt.push_str(&format!("- Growth Stage: {}\n", data.growth_stage));
        prompt.push_str(&format!("- Last Rainfall: {}mm\n", data.last_rainfall));
        if self.kind == RequestKind::Insights {
            prompt.push_str(&format!("- Humidity: {}%\n", data.humidity));
        }
    }

    fn file_summary(&self) -> String {
        if self.files.is_empty() {
            return "none".to_string();
        }
        self.files
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

const TRENDS_ROLE: &str = "You are an expert agricultural AI analyst specializing in crop health trends \
and time-series prediction. Analyze the provided field data to generate accurate trend predictions \
and vegetation index forecasts.";

const INSIGHTS_ROLE: &str = "You are an expert agricultural AI consultant specializing in actionable crop \
management insights. Identify risk drivers and provide specific, prioritized recommendations that \
farmers can act on under current conditions.";

const RISK_ROLE: &str = "You are an expert agricultural risk assessment AI. Analyze field conditions to \
predict potential risks and provide early warnings, so issues are prevented before they become critical.";

const IMAGE_ROLE: &str = "You are an expert agricultural scientist and plant pathologist. Analyze this \
image for plant and soil health indicators.";

const DEFAULT_IMAGE_CONTEXT: &str = "Analyze this image for signs of plant diseases, nutrient \
deficiencies, pest damage, soil quality, and overall plant health.";

const IMAGE_CHECKLIST: &str = r#"Provide an assessment including:
1. Overall health status (healthy, stressed, diseased)
2. Specific issues identified (if any)
3. Possible causes and recommendations
4. Confidence level of your assessment (0-100)"#;

const UPLOAD_ROLE: &str = "You are an agronomy assistant. You receive uploaded field assets \
(imagery and CSV sensor data).";

const UPLOAD_TASK: &str = "Analyze likely vegetation stress, irrigation or fertilizer opportunities, \
and data issues. Start with a concise, readable summary.";

const JSON_BLOCK_INSTRUCTION: &str = "Finish with a single ```json fenced block holding one object \
with this structure (numbers as plain JSON numbers, no comments):";
