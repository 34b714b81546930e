use std::sync::Arc;
use std::time::Duration;

use visionbot_core::config::ClientConfig;
use visionbot_core::types::RecognitionOptions;
use visionbot_engine::engine::Recognizer;
use visionbot_engine::session::PollPolicy;

use crate::client::VisionBotClient;

/// Build a runnable recognizer from config.
///
/// This keeps the CLI layer thin.
pub fn build_recognizer_from_config(cfg: &ClientConfig) -> anyhow::Result<Recognizer> {
    cfg.validate()?;
    let client = VisionBotClient::new(cfg.endpoints.clone(), &cfg.http)?;
    log::debug!(
        "recognizer ready: ingest={} result={}",
        client.endpoints().ingest_url,
        client.endpoints().result_url
    );
    Ok(Recognizer::new(Arc::new(client)))
}

/// `(bytes, options, delay, tries)` in, `(text, is_success)` out.
pub async fn describe_image(
    recognizer: &Recognizer,
    image: &[u8],
    options: &RecognitionOptions,
    delay: Duration,
    tries: u32,
) -> (String, bool) {
    let policy = PollPolicy {
        delay,
        tries,
        deadline: None,
    };
    recognizer
        .recognize(image, options, &policy)
        .await
        .into_result()
}
