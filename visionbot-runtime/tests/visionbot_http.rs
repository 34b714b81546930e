use std::time::Duration;
use visionbot_core::config::{ClientConfig, Endpoints};
use visionbot_core::types::{RecognitionMode, RecognitionOptions};
use visionbot_runtime::runtime_engine::{build_recognizer_from_config, describe_image};
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const INGEST: &str = "/apiv2/in.php";
const RESULT: &str = "/apiv2/res.php";

fn config_for(server: &MockServer) -> ClientConfig {
    ClientConfig {
        endpoints: Endpoints {
            ingest_url: format!("{}{INGEST}", server.uri()),
            result_url: format!("{}{RESULT}", server.uri()),
        },
        ..Default::default()
    }
}

fn json(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(body.to_string(), "application/json")
}

async fn requests_to(server: &MockServer, p: &str) -> usize {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .filter(|r| r.url.path() == p)
        .count()
}

#[tokio::test]
async fn end_to_end_pending_then_ok() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(INGEST))
        .and(body_string_contains("name=\"translate\""))
        .respond_with(json(r#"{"id":"42","status":"ok","text":null,"qr":null}"#))
        .expect(1)
        .mount(&server)
        .await;

    // First matching mock wins until its budget is used up.
    Mock::given(method("POST"))
        .and(path(RESULT))
        .and(body_string_contains("42"))
        .respond_with(json(r#"{"status":"notready"}"#))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(RESULT))
        .respond_with(json(r#"{"id":"42","status":"ok","text":"hello","qr":""}"#))
        .mount(&server)
        .await;

    let recognizer = build_recognizer_from_config(&config_for(&server)).unwrap();
    let options = RecognitionOptions {
        mode: RecognitionMode::All,
        translate: true,
        lang: "en".into(),
        qr: true,
    };
    let (text, ok) =
        describe_image(&recognizer, b"\x89PNG", &options, Duration::from_millis(5), 5).await;

    assert!(ok);
    assert_eq!(text, "hello\r\n");
    assert_eq!(requests_to(&server, RESULT).await, 2);
}

#[tokio::test]
async fn ingest_failure_skips_polling() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(INGEST))
        .respond_with(ResponseTemplate::new(502))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(RESULT))
        .respond_with(json(r#"{"status":"ok","text":"never"}"#))
        .expect(0)
        .mount(&server)
        .await;

    let recognizer = build_recognizer_from_config(&config_for(&server)).unwrap();
    let (text, ok) = describe_image(
        &recognizer,
        b"img",
        &RecognitionOptions::default(),
        Duration::from_millis(5),
        5,
    )
    .await;

    assert!(!ok);
    assert_eq!(text, "");
}

#[tokio::test]
async fn server_error_ends_polling() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(INGEST))
        .respond_with(json(r#"{"id":"7","status":"ok"}"#))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(RESULT))
        .respond_with(json(r#"{"id":"7","status":"error","text":"bad image"}"#))
        .expect(1)
        .mount(&server)
        .await;

    let recognizer = build_recognizer_from_config(&config_for(&server)).unwrap();
    let (text, ok) = describe_image(
        &recognizer,
        b"img",
        &RecognitionOptions::default(),
        Duration::from_millis(5),
        10,
    )
    .await;

    assert!(!ok);
    assert_eq!(text, "");
}

#[tokio::test]
async fn zero_budget_polls_exactly_once() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(INGEST))
        .respond_with(json(r#"{"id":"9","status":"ok"}"#))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(RESULT))
        .respond_with(json(r#"{"id":"9","status":"notready"}"#))
        .expect(1)
        .mount(&server)
        .await;

    let recognizer = build_recognizer_from_config(&config_for(&server)).unwrap();
    let (text, ok) = describe_image(
        &recognizer,
        b"img",
        &RecognitionOptions::default(),
        Duration::from_millis(5),
        0,
    )
    .await;

    assert!(!ok);
    assert_eq!(text, "");
}

fn form_field(name: &str, value: &str) -> String {
    format!("name=\"{name}\"\r\nContent-Type: text/plain; charset=utf-8\r\n\r\n{value}\r\n")
}

#[tokio::test]
async fn concurrent_recognitions_keep_their_own_jobs() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(INGEST))
        .and(body_string_contains(form_field("lang", "ru")))
        .respond_with(json(r#"{"id":"A","status":"ok"}"#))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(INGEST))
        .and(body_string_contains(form_field("lang", "de")))
        .respond_with(json(r#"{"id":"B","status":"ok"}"#))
        .expect(1)
        .mount(&server)
        .await;

    // Job A stays pending for one round so the two poll loops interleave.
    Mock::given(method("POST"))
        .and(path(RESULT))
        .and(body_string_contains(form_field("id", "A")))
        .respond_with(json(r#"{"id":"A","status":"notready"}"#))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(RESULT))
        .and(body_string_contains(form_field("id", "A")))
        .respond_with(json(r#"{"id":"A","status":"ok","text":"tA"}"#))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(RESULT))
        .and(body_string_contains(form_field("id", "B")))
        .respond_with(json(r#"{"id":"B","status":"ok","text":"tB"}"#))
        .expect(1)
        .mount(&server)
        .await;

    let recognizer = build_recognizer_from_config(&config_for(&server)).unwrap();
    let ru = RecognitionOptions {
        lang: "ru".into(),
        ..Default::default()
    };
    let de = RecognitionOptions {
        lang: "de".into(),
        ..Default::default()
    };

    let (a, b) = tokio::join!(
        describe_image(&recognizer, b"first", &ru, Duration::from_millis(5), 5),
        describe_image(&recognizer, b"second", &de, Duration::from_millis(5), 5),
    );

    assert_eq!(a, ("tA\r\n".to_string(), true));
    assert_eq!(b, ("tB\r\n".to_string(), true));
    assert_eq!(requests_to(&server, RESULT).await, 3);
}
