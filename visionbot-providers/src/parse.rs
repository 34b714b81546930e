use crate::runtime::HttpResponse;
use thiserror::Error;
use visionbot_core::types::StatusEnvelope;

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("decode status JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("decode status JSON: expected an object, got {0}")]
    NotAnObject(&'static str),
}

pub fn decode_envelope(body: &[u8]) -> Result<StatusEnvelope, DecodeError> {
    // Derived struct decoding also takes arrays by position; only objects are envelopes.
    let value: serde_json::Value = serde_json::from_slice(body)?;
    if !value.is_object() {
        return Err(DecodeError::NotAnObject(json_kind(&value)));
    }
    Ok(serde_json::from_value(value)?)
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}

/// Maps one HTTP reply to an envelope.
///
/// Non-2xx replies and undecodable bodies become synthesized `error`
/// envelopes, so callers only ever branch on the status field.
pub fn envelope_from_response(resp: &HttpResponse) -> StatusEnvelope {
    if !resp.is_success() {
        return StatusEnvelope::no_response();
    }

    match decode_envelope(&resp.body) {
        Ok(env) => env,
        Err(e) => StatusEnvelope::error(e.to_string()),
    }
}
