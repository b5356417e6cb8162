mod helpers;

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use tower::ServiceExt;

use audio_to_text::infrastructure::storage::LocalTempFileStore;
use audio_to_text::presentation::{AppState, create_router};

use helpers::{FakeConversionService, FakeSpeechRecognizer, build_pipeline, dir_entries};

const BOUNDARY: &str = "----audio-to-text-test-boundary";
const TEST_MAX_UPLOAD_BYTES: usize = 1024 * 1024;

struct TestApp {
    dir: tempfile::TempDir,
    conversion: Arc<FakeConversionService>,
    router: Router,
}

fn create_test_app(
    conversion: FakeConversionService,
    recognizer: FakeSpeechRecognizer,
    max_upload_bytes: usize,
) -> TestApp {
    let dir = tempfile::TempDir::new().unwrap();
    let store = Arc::new(LocalTempFileStore::new(dir.path()).unwrap());
    let conversion = Arc::new(conversion);
    let pipeline = build_pipeline(store, Arc::clone(&conversion), Arc::new(recognizer));

    let router = create_router(AppState {
        pipeline: Arc::new(pipeline),
        max_upload_bytes,
    });

    TestApp {
        dir,
        conversion,
        router,
    }
}

fn default_app(segments: Vec<Vec<&'static str>>) -> TestApp {
    create_test_app(
        FakeConversionService::default(),
        FakeSpeechRecognizer::returning(segments),
        TEST_MAX_UPLOAD_BYTES,
    )
}

fn multipart_body(file_name: &str, content: &[u8]) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
    body.extend_from_slice(b"Content-Disposition: form-data; name=\"note\"\r\n\r\n");
    body.extend_from_slice(b"ignored text field\r\n");
    body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
    body.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"audio\"; filename=\"{}\"\r\n",
            file_name
        )
        .as_bytes(),
    );
    body.extend_from_slice(b"Content-Type: audio/mp4\r\n\r\n");
    body.extend_from_slice(content);
    body.extend_from_slice(format!("\r\n--{}--\r\n", BOUNDARY).as_bytes());
    body
}

fn upload_request(uri: &str, body: Vec<u8>) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(body))
        .unwrap()
}

async fn json_body(response: axum::response::Response) -> serde_json::Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

#[tokio::test]
async fn given_running_server_when_health_check_then_returns_ok() {
    let app = default_app(vec![]);

    let response = app
        .router
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = json_body(response).await;
    assert_eq!(json["status"], "healthy");
}

#[tokio::test]
async fn given_audio_upload_when_posting_root_then_returns_transcript() {
    let app = default_app(vec![vec!["hello world"], vec!["goodbye"]]);

    let response = app
        .router
        .oneshot(upload_request("/", multipart_body("memo.m4a", b"m4a-bytes")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(header::CONTENT_TYPE).unwrap(),
        "application/json"
    );
    let json = json_body(response).await;
    assert_eq!(json, serde_json::json!({ "transcript": "hello world\ngoodbye" }));
    assert!(dir_entries(app.dir.path()).is_empty());
}

#[tokio::test]
async fn given_audio_upload_when_posting_versioned_route_then_returns_transcript() {
    let app = default_app(vec![vec!["versioned"]]);

    let response = app
        .router
        .oneshot(upload_request(
            "/api/v1/transcriptions",
            multipart_body("memo.m4a", b"m4a-bytes"),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = json_body(response).await;
    assert_eq!(json["transcript"], "versioned");
}

#[tokio::test]
async fn given_silent_audio_when_posting_then_returns_empty_transcript() {
    let app = default_app(vec![]);

    let response = app
        .router
        .oneshot(upload_request("/", multipart_body("silence.m4a", b"quiet")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = json_body(response).await;
    assert_eq!(json["transcript"], "");
}

#[tokio::test]
async fn given_get_request_when_calling_root_then_returns_method_not_allowed() {
    let app = default_app(vec![vec!["unused"]]);

    let response = app
        .router
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert!(body.is_empty());
    assert_eq!(app.conversion.job_count(), 0);
}

#[tokio::test]
async fn given_json_body_when_posting_then_returns_bad_request() {
    let app = default_app(vec![vec!["unused"]]);

    let response = app
        .router
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(r#"{"audio":"nope"}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = json_body(response).await;
    assert_eq!(json["error"], "MalformedRequest");
    assert_eq!(app.conversion.job_count(), 0);
    assert!(dir_entries(app.dir.path()).is_empty());
}

#[tokio::test]
async fn given_multipart_without_file_when_posting_then_returns_bad_request() {
    let app = default_app(vec![vec!["unused"]]);
    let body = format!(
        "--{b}\r\nContent-Disposition: form-data; name=\"note\"\r\n\r\nhello\r\n--{b}--\r\n",
        b = BOUNDARY
    );

    let response = app
        .router
        .oneshot(upload_request("/", body.into_bytes()))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = json_body(response).await;
    assert_eq!(json["error"], "MalformedRequest");
    assert!(dir_entries(app.dir.path()).is_empty());
}

#[tokio::test]
async fn given_failed_conversion_when_posting_then_returns_bad_gateway_without_paths() {
    let app = create_test_app(
        FakeConversionService::failing_at("convert-1"),
        FakeSpeechRecognizer::returning(vec![vec!["unused"]]),
        TEST_MAX_UPLOAD_BYTES,
    );
    let temp_root = app.dir.path().to_string_lossy().into_owned();

    let response = app
        .router
        .oneshot(upload_request("/", multipart_body("memo.m4a", b"m4a-bytes")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let json = json_body(response).await;
    assert_eq!(json["error"], "ConversionFailed");
    let message = json["message"].as_str().unwrap();
    assert!(message.contains("convert-1"));
    assert!(!message.contains(&temp_root));
    assert!(dir_entries(app.dir.path()).is_empty());
}

#[tokio::test]
async fn given_recognizer_failure_when_posting_then_returns_bad_gateway() {
    let app = create_test_app(
        FakeConversionService::default(),
        FakeSpeechRecognizer::failing("invalid credentials"),
        TEST_MAX_UPLOAD_BYTES,
    );

    let response = app
        .router
        .oneshot(upload_request("/", multipart_body("memo.m4a", b"m4a-bytes")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let json = json_body(response).await;
    assert_eq!(json["error"], "RecognitionFailed");
    assert!(!json["message"].as_str().unwrap().contains("credentials"));
    assert!(dir_entries(app.dir.path()).is_empty());
}

#[tokio::test]
async fn given_upload_over_limit_when_posting_then_returns_client_error_and_no_files_remain() {
    let app = create_test_app(
        FakeConversionService::default(),
        FakeSpeechRecognizer::returning(vec![vec!["unused"]]),
        64,
    );
    let content = vec![b'x'; 4096];

    let response = app
        .router
        .oneshot(upload_request("/", multipart_body("big.m4a", &content)))
        .await
        .unwrap();

    assert!(response.status().is_client_error());
    assert_eq!(app.conversion.job_count(), 0);
    assert!(dir_entries(app.dir.path()).is_empty());
}

#[tokio::test]
async fn given_request_without_id_when_any_endpoint_then_response_contains_request_id() {
    let app = default_app(vec![]);

    let response = app
        .router
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    let request_id = response.headers().get("x-request-id").unwrap();
    assert!(!request_id.to_str().unwrap().is_empty());
}

#[tokio::test]
async fn given_request_with_id_when_any_endpoint_then_response_echoes_request_id() {
    let app = default_app(vec![vec!["ok"]]);
    let mut request = upload_request("/", multipart_body("memo.m4a", b"m4a-bytes"));
    request
        .headers_mut()
        .insert("x-request-id", "caller-supplied-42".parse().unwrap());

    let response = app.router.oneshot(request).await.unwrap();

    assert_eq!(
        response.headers().get("x-request-id").unwrap(),
        "caller-supplied-42"
    );
}
