use visionbot_core::config::{Endpoints, HttpConfig};
use visionbot_core::types::{RecognitionOptions, StatusEnvelope};
use visionbot_engine::traits::RecognitionBackend;
use visionbot_providers::parse::{decode_envelope, envelope_from_response};
use visionbot_providers::request::HttpRequest;
use visionbot_providers::runtime::HttpTransport;
use visionbot_providers::visionbot::{build_ingest_request, build_result_request};

/// VisionBot over HTTP.
///
/// Owns one transport; dropping the client releases its connections.
#[derive(Debug, Clone)]
pub struct VisionBotClient {
    endpoints: Endpoints,
    transport: HttpTransport,
}

impl VisionBotClient {
    pub fn new(endpoints: Endpoints, http: &HttpConfig) -> anyhow::Result<Self> {
        Ok(Self {
            endpoints,
            transport: HttpTransport::new(http)?,
        })
    }

    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    async fn round_trip(&self, req: &HttpRequest) -> StatusEnvelope {
        let resp = match self.transport.execute(req).await {
            Ok(resp) => resp,
            Err(e) => {
                log::warn!("request to {} failed: {e:#}", req.url);
                return StatusEnvelope::no_response();
            }
        };

        if !resp.is_success() {
            log::warn!("{} answered with HTTP {}", req.url, resp.status);
            return envelope_from_response(&resp);
        }

        match decode_envelope(&resp.body) {
            Ok(envelope) => {
                log::debug!("{} -> {:?}", req.url, envelope.status);
                envelope
            }
            Err(e) => {
                log::warn!("undecodable reply from {}: {e}", req.url);
                StatusEnvelope::error(e.to_string())
            }
        }
    }
}

#[async_trait::async_trait]
impl RecognitionBackend for VisionBotClient {
    async fn submit(&self, image: &[u8], options: &RecognitionOptions) -> StatusEnvelope {
        let req = build_ingest_request(&self.endpoints, image, options);
        log::debug!("submitting {req:?}");
        self.round_trip(&req).await
    }

    async fn poll(&self, job_id: &str) -> StatusEnvelope {
        let req = build_result_request(&self.endpoints, job_id);
        self.round_trip(&req).await
    }
}
