use crate::types::RecognitionOptions;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_INGEST_URL: &str = "https://visionbot.ru/apiv2/in.php";
pub const DEFAULT_RESULT_URL: &str = "https://visionbot.ru/apiv2/res.php";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("{field} is not a valid http(s) URL: {value}")]
    InvalidUrl { field: &'static str, value: String },
    #[error("{0} must be greater than zero")]
    Zero(&'static str),
    #[error("language code must not be empty")]
    EmptyLanguage,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Endpoints {
    pub ingest_url: String,
    pub result_url: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            ingest_url: DEFAULT_INGEST_URL.into(),
            result_url: DEFAULT_RESULT_URL.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PollingConfig {
    pub delay_ms: u64,
    pub tries: u32,

    // Upper bound for the whole submit + poll sequence.
    pub deadline_ms: Option<u64>,
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            delay_ms: 1000,
            tries: 30,
            deadline_ms: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub connect_timeout_ms: u64,
    pub request_timeout_ms: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            connect_timeout_ms: 10_000,
            request_timeout_ms: 30_000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub endpoints: Endpoints,
    pub polling: PollingConfig,
    pub http: HttpConfig,
    pub options: RecognitionOptions,
}

impl ClientConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_url("ingest_url", &self.endpoints.ingest_url)?;
        check_url("result_url", &self.endpoints.result_url)?;

        if self.http.connect_timeout_ms == 0 {
            return Err(ConfigError::Zero("http.connect_timeout_ms"));
        }
        if self.http.request_timeout_ms == 0 {
            return Err(ConfigError::Zero("http.request_timeout_ms"));
        }
        if self.polling.deadline_ms == Some(0) {
            return Err(ConfigError::Zero("polling.deadline_ms"));
        }
        if self.options.lang.trim().is_empty() {
            return Err(ConfigError::EmptyLanguage);
        }
        Ok(())
    }
}

fn check_url(field: &'static str, value: &str) -> Result<(), ConfigError> {
    let invalid = || ConfigError::InvalidUrl {
        field,
        value: value.to_string(),
    };
    let parsed = url::Url::parse(value).map_err(|_| invalid())?;
    match parsed.scheme() {
        "http" | "https" if parsed.has_host() => Ok(()),
        _ => Err(invalid()),
    }
}
