use async_trait::async_trait;
use visionbot_core::types::{RecognitionOptions, StatusEnvelope};

/// One round trip to the recognition service per call.
///
/// Implementations never fail: transport and decode problems come back as
/// synthesized `error` envelopes.
#[async_trait]
pub trait RecognitionBackend: Send + Sync {
    async fn submit(&self, image: &[u8], options: &RecognitionOptions) -> StatusEnvelope;

    async fn poll(&self, job_id: &str) -> StatusEnvelope;
}
