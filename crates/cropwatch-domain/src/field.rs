//! Inputs the analysis prompts are built from

use serde::{Deserialize, Serialize};
use std::fmt;

/// Current sensor and vegetation-index readings for a field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldData {
    /// Normalized difference vegetation index
    pub ndvi: f64,
    /// Green NDVI
    pub gndvi: f64,
    /// Air temperature in °C
    pub temperature: f64,
    /// Soil moisture in percent
    pub soil_moisture: f64,
    /// Vapour pressure deficit in kPa
    pub vpd: f64,
    /// Field size in hectares
    pub field_size: f64,
    /// Crop grown in the field
    pub crop_type: String,
    /// Phenological stage
    pub growth_stage: String,
    /// Last rainfall in mm
    pub last_rainfall: f64,
    /// Relative humidity in percent
    pub humidity: f64,
}

/// Base64-encoded image sent alongside a prompt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageAttachment {
    /// MIME type, e.g. `image/jpeg`
    pub mime_type: String,
    /// Base64 payload without the data-URL prefix
    pub data: String,
}

impl ImageAttachment {
    /// Create an attachment from already-encoded data
    pub fn new(mime_type: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            mime_type: mime_type.into(),
            data: data.into(),
        }
    }

    /// Parse a `data:<mime>;base64,<payload>` URL
    ///
    /// Anything that is not a data URL is rejected. The MIME type falls back
    /// to `image/jpeg` when the header omits it.
    ///
    /// # Examples
    ///
    /// ```
    /// use cropwatch_domain::ImageAttachment;
    ///
    /// let image = ImageAttachment::from_data_url("data:image/png;base64,iVBORw0").unwrap();
    /// assert_eq!(image.mime_type, "image/png");
    /// assert_eq!(image.data, "iVBORw0");
    /// ```
    pub fn from_data_url(url: &str) -> Result<Self, String> {
        let rest = url
            .strip_prefix("data:")
            .ok_or_else(|| "Not a data URL".to_string())?;
        let (header, data) = rest
            .split_once(',')
            .ok_or_else(|| "Data URL has no payload".to_string())?;

        let mime_type = header
            .split(';')
            .next()
            .filter(|m| !m.is_empty())
            .unwrap_or("image/jpeg");

        Ok(Self::new(mime_type, data))
    }

    /// Whether the payload is empty
    pub fn is_empty(&self) -> bool {
        self.data.trim().is_empty()
    }
}

/// An uploaded asset described to the model by type and name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadedFile {
    /// Asset type, e.g. `image` or `csv`
    #[serde(rename = "type")]
    pub file_type: String,
    /// File name
    pub name: String,
}

impl UploadedFile {
    /// Create a new file descriptor
    pub fn new(file_type: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            file_type: file_type.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for UploadedFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.file_type, self.name)
    }
}
