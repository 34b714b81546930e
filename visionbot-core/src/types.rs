use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// What the service should look for in the uploaded image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecognitionMode {
    /// Describe the image and read any text on it.
    #[default]
    All,
    /// Describe the image only.
    Image,
    /// Read text only.
    Text,
}

impl RecognitionMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecognitionMode::All => "all",
            RecognitionMode::Image => "image",
            RecognitionMode::Text => "text",
        }
    }
}

impl fmt::Display for RecognitionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown recognition mode: {0} (expected all, image or text)")]
pub struct ParseModeError(pub String);

impl FromStr for RecognitionMode {
    type Err = ParseModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" | "1" => Ok(RecognitionMode::All),
            "image" | "2" => Ok(RecognitionMode::Image),
            "text" | "3" => Ok(RecognitionMode::Text),
            _ => Err(ParseModeError(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecognitionOptions {
    pub mode: RecognitionMode,
    pub translate: bool,
    pub lang: String,
    pub qr: bool,
}

impl Default for RecognitionOptions {
    fn default() -> Self {
        Self {
            mode: RecognitionMode::All,
            translate: false,
            lang: "en".into(),
            qr: true,
        }
    }
}

/// Classified `status` field of a [`StatusEnvelope`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnvelopeStatus {
    Ok,
    Error,
    /// Anything else, including a missing status.
    Pending,
}

pub const STATUS_OK: &str = "ok";
pub const STATUS_ERROR: &str = "error";
pub const SERVER_DID_NOT_RESPOND: &str = "server did not respond";

/// Status/result payload returned by both remote endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StatusEnvelope {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub qr: Option<String>,
}

impl StatusEnvelope {
    /// Envelope built locally when the server reply could not be used.
    pub fn error(text: impl Into<String>) -> Self {
        Self {
            id: None,
            status: Some(STATUS_ERROR.into()),
            text: Some(text.into()),
            qr: None,
        }
    }

    pub fn no_response() -> Self {
        Self::error(SERVER_DID_NOT_RESPOND)
    }

    pub fn status(&self) -> EnvelopeStatus {
        match self.status.as_deref() {
            Some(STATUS_OK) => EnvelopeStatus::Ok,
            Some(STATUS_ERROR) => EnvelopeStatus::Error,
            _ => EnvelopeStatus::Pending,
        }
    }

    pub fn job_id(&self) -> Option<&str> {
        self.id.as_deref().filter(|id| !id.is_empty())
    }

    pub fn text_or_empty(&self) -> &str {
        self.text.as_deref().unwrap_or_default()
    }

    pub fn qr_or_empty(&self) -> &str {
        self.qr.as_deref().unwrap_or_default()
    }

    /// `"<text>\r\n<qr>"`, the string handed back to callers on success.
    pub fn combined_result(&self) -> String {
        format!("{}\r\n{}", self.text_or_empty(), self.qr_or_empty())
    }
}
