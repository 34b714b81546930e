use crate::request::{HttpRequest, MultipartBody};
use base64::Engine;
use visionbot_core::config::Endpoints;
use visionbot_core::types::RecognitionOptions;

/// Upload request for the ingest endpoint.
///
/// The image travels as base64 text in the `body` field, not as a file part.
pub fn build_ingest_request(
    endpoints: &Endpoints,
    image: &[u8],
    options: &RecognitionOptions,
) -> HttpRequest {
    let encoded = base64::engine::general_purpose::STANDARD.encode(image);

    let mut form = MultipartForm::new();
    form.field("body", &encoded);
    form.field("target", options.mode.as_str());
    form.field("lang", &options.lang);
    form.field("translate", flag(options.translate));
    form.field("qr", flag(options.qr));

    form.into_request(&endpoints.ingest_url)
}

/// Status query for a previously submitted job.
pub fn build_result_request(endpoints: &Endpoints, job_id: &str) -> HttpRequest {
    let mut form = MultipartForm::new();
    form.field("id", job_id);
    form.into_request(&endpoints.result_url)
}

fn flag(on: bool) -> &'static str {
    if on { "1" } else { "0" }
}

struct MultipartForm {
    boundary: String,
    body: Vec<u8>,
}

impl MultipartForm {
    fn new() -> Self {
        Self {
            boundary: format!("Boundary-{}", uuid::Uuid::new_v4()),
            body: Vec::new(),
        }
    }

    fn field(&mut self, name: &str, value: &str) {
        self.body
            .extend_from_slice(format!("--{}\r\n", self.boundary).as_bytes());
        self.body.extend_from_slice(
            format!("Content-Disposition: form-data; name=\"{}\"\r\n", name).as_bytes(),
        );
        self.body
            .extend_from_slice(b"Content-Type: text/plain; charset=utf-8\r\n\r\n");
        self.body.extend_from_slice(value.as_bytes());
        self.body.extend_from_slice(b"\r\n");
    }

    fn into_request(mut self, url: &str) -> HttpRequest {
        self.body
            .extend_from_slice(format!("--{}--\r\n", self.boundary).as_bytes());

        HttpRequest {
            method: "POST".into(),
            url: url.to_string(),
            headers: vec![
                (
                    "Content-Type".into(),
                    format!("multipart/form-data; boundary={}", self.boundary),
                ),
                ("Accept".into(), "application/json".into()),
            ],
            body: MultipartBody {
                boundary: self.boundary,
                bytes: self.body,
            },
        }
    }
}
