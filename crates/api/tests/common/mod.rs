#![allow(dead_code)]

use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::body::Body;
use axum::extract::{Multipart, Path as UrlPath, State};
use axum::http::{HeaderMap, Request, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{self, post};
use axum::{Json, Router};
use http_body_util::BodyExt;
use serde_json::json;
use tower::ServiceExt;

use winzaap_api::config::{CloudConvertConfig, ServerConfig};
use winzaap_api::router::build_app_router;
use winzaap_api::state::AppState;
use winzaap_core::polling::PollPolicy;

/// Bearer credential the mock provider expects.
pub const TEST_API_KEY: &str = "test-api-key";

/// Bytes served by the mock export URL.
pub const PDF_BYTES: &[u8] = b"%PDF-1.7\n% converted by mock provider\n%%EOF\n";

/// Multipart boundary used by [`multipart_request`].
const BOUNDARY: &str = "winzaap-test-boundary";

// ---------------------------------------------------------------------------
// App under test
// ---------------------------------------------------------------------------

/// Build a test `ServerConfig` pointed at `api_url`, staging uploads in
/// `upload_dir`. Polling is fast so tests finish in milliseconds.
pub fn test_config(upload_dir: &Path, api_url: &str) -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        max_upload_bytes: 1024 * 1024,
        upload_dir: upload_dir.to_path_buf(),
        cloudconvert: CloudConvertConfig {
            api_url: api_url.to_string(),
            api_key: TEST_API_KEY.to_string(),
        },
        poll: PollPolicy {
            initial_delay: Duration::from_millis(10),
            max_delay: Duration::from_millis(20),
            multiplier: 1.5,
            max_wait: Duration::from_millis(300),
        },
    }
}

/// Build the full application router, returning the state so tests can
/// reach the shutdown token.
pub fn build_test_app(config: ServerConfig) -> (Router, AppState) {
    let state = AppState::new(config);
    (build_app_router(state.clone()), state)
}

/// Number of entries left in the upload directory.
pub fn staged_file_count(dir: &Path) -> usize {
    std::fs::read_dir(dir).unwrap().count()
}

/// A `127.0.0.1` URL nothing is listening on.
pub async fn unreachable_url() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}/v2")
}

// ---------------------------------------------------------------------------
// Request / response helpers
// ---------------------------------------------------------------------------

pub async fn get(app: Router, uri: &str) -> Response {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn send(app: Router, request: Request<Body>) -> Response {
    app.oneshot(request).await.unwrap()
}

/// Build a `POST` with a single multipart field.
pub fn multipart_request(uri: &str, field: &str, filename: &str, data: &[u8]) -> Request<Body> {
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
    body.extend_from_slice(
        format!("Content-Disposition: form-data; name=\"{field}\"; filename=\"{filename}\"\r\n")
            .as_bytes(),
    );
    body.extend_from_slice(b"Content-Type: application/octet-stream\r\n\r\n");
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

    Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            "content-type",
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

/// Build a `POST` with a single multipart text field (no `filename`).
pub fn text_field_request(uri: &str, field: &str, value: &str) -> Request<Body> {
    let body = format!(
        "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{field}\"\r\n\r\n{value}\r\n--{BOUNDARY}--\r\n"
    );

    Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            "content-type",
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

/// A well-formed multipart body with no parts at all.
pub fn empty_multipart_request(uri: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            "content-type",
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(format!("--{BOUNDARY}--\r\n")))
        .unwrap()
}

pub async fn body_bytes(response: Response) -> Vec<u8> {
    response
        .into_body()
        .collect()
        .await
        .unwrap()
        .to_bytes()
        .to_vec()
}

pub async fn body_json(response: Response) -> serde_json::Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}

// ---------------------------------------------------------------------------
// Mock conversion provider
// ---------------------------------------------------------------------------

/// How the mock provider's job behaves.
#[derive(Debug, Clone, Copy)]
pub enum JobOutcome {
    /// Report `processing` for this many polls, then `finished`.
    FinishAfter(u32),
    /// Report `processing` for this many polls, then `error`.
    FailAfter(u32),
    /// Report `processing` forever.
    Never,
    /// Reject job creation with 401.
    RejectCreate,
    /// Create a job whose descriptor lacks the import task.
    MissingImportTask,
    /// Refuse the file upload with 403.
    RejectUpload,
    /// Finish on the first poll, then answer the export URL with 404.
    DownloadFails,
}

/// Everything the mock provider observed.
#[derive(Debug, Default)]
pub struct Recorded {
    pub create_calls: u32,
    pub polls: u32,
    pub auth_headers: Vec<String>,
    pub upload_fields: Vec<String>,
    pub uploaded_filename: Option<String>,
    pub uploaded_bytes: Vec<u8>,
    pub deleted_jobs: Vec<String>,
    pub download_had_auth: Option<bool>,
}

#[derive(Clone)]
struct MockState {
    base_url: String,
    outcome: JobOutcome,
    recorded: Arc<Mutex<Recorded>>,
}

/// In-process CloudConvert stand-in bound to `127.0.0.1:0`.
pub struct MockProvider {
    pub base_url: String,
    pub recorded: Arc<Mutex<Recorded>>,
}

const JOB_ID: &str = "mock-job-1";

impl MockProvider {
    pub async fn start(outcome: JobOutcome) -> Self {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base_url = format!("http://{}", listener.local_addr().unwrap());
        let recorded = Arc::new(Mutex::new(Recorded::default()));

        let state = MockState {
            base_url: base_url.clone(),
            outcome,
            recorded: Arc::clone(&recorded),
        };

        let app = Router::new()
            .route("/v2/jobs", post(create_job))
            .route("/v2/jobs/{id}", routing::get(get_job).delete(delete_job))
            .route("/upload", post(upload))
            .route("/files/converted.pdf", routing::get(download))
            .with_state(state);

        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { base_url, recorded }
    }

    /// API base URL to configure the relay with.
    pub fn api_url(&self) -> String {
        format!("{}/v2", self.base_url)
    }

    pub fn recorded(&self) -> std::sync::MutexGuard<'_, Recorded> {
        self.recorded.lock().unwrap()
    }
}

fn record_auth(state: &MockState, headers: &HeaderMap) {
    let value = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_string();
    state.recorded.lock().unwrap().auth_headers.push(value);
}

fn task(name: &str, operation: &str, status: &str, result: serde_json::Value) -> serde_json::Value {
    json!({
        "id": format!("task-{name}"),
        "name": name,
        "operation": operation,
        "status": status,
        "result": result,
    })
}

async fn create_job(State(state): State<MockState>, headers: HeaderMap) -> Response {
    record_auth(&state, &headers);
    state.recorded.lock().unwrap().create_calls += 1;

    let import = task(
        "import-my-file",
        "import/upload",
        "waiting",
        json!({
            "form": {
                "url": format!("{}/upload", state.base_url),
                "parameters": {
                    "expires": 1545444403,
                    "signature": "abc123",
                }
            }
        }),
    );
    let convert = task("convert-my-file", "convert", "waiting", serde_json::Value::Null);
    let export = task("export-my-file", "export/url", "waiting", serde_json::Value::Null);

    match state.outcome {
        JobOutcome::RejectCreate => (
            StatusCode::UNAUTHORIZED,
            Json(json!({"message": "Unauthenticated.", "code": "UNAUTHENTICATED"})),
        )
            .into_response(),
        JobOutcome::MissingImportTask => (
            StatusCode::CREATED,
            Json(json!({"data": {"id": JOB_ID, "status": "waiting", "tasks": [convert, export]}})),
        )
            .into_response(),
        _ => (
            StatusCode::CREATED,
            Json(json!({"data": {"id": JOB_ID, "status": "waiting", "tasks": [import, convert, export]}})),
        )
            .into_response(),
    }
}

async fn upload(State(state): State<MockState>, mut multipart: Multipart) -> StatusCode {
    while let Some(field) = multipart.next_field().await.unwrap() {
        let name = field.name().unwrap_or("").to_string();
        let filename = field.file_name().map(str::to_string);
        let data = field.bytes().await.unwrap();

        let mut recorded = state.recorded.lock().unwrap();
        recorded.upload_fields.push(name.clone());
        if name == "file" {
            recorded.uploaded_filename = filename;
            recorded.uploaded_bytes = data.to_vec();
        }
    }
    match state.outcome {
        JobOutcome::RejectUpload => StatusCode::FORBIDDEN,
        _ => StatusCode::CREATED,
    }
}

async fn get_job(
    State(state): State<MockState>,
    UrlPath(id): UrlPath<String>,
    headers: HeaderMap,
) -> Json<serde_json::Value> {
    record_auth(&state, &headers);
    let polls = {
        let mut recorded = state.recorded.lock().unwrap();
        recorded.polls += 1;
        recorded.polls
    };

    let processing = json!({"data": {"id": id, "status": "processing", "tasks": [
        task("import-my-file", "import/upload", "finished", json!({})),
        task("convert-my-file", "convert", "processing", serde_json::Value::Null),
        task("export-my-file", "export/url", "waiting", serde_json::Value::Null),
    ]}});

    let finished = || json!({"data": {"id": id, "status": "finished", "tasks": [
        task("import-my-file", "import/upload", "finished", json!({})),
        task("convert-my-file", "convert", "finished", json!({})),
        task("export-my-file", "export/url", "finished", json!({
            "files": [{
                "filename": "report.pdf",
                "url": format!("{}/files/converted.pdf", state.base_url),
            }]
        })),
    ]}});

    let body = match state.outcome {
        JobOutcome::FinishAfter(n) if polls > n => finished(),
        JobOutcome::DownloadFails => finished(),
        JobOutcome::FailAfter(n) if polls > n => json!({"data": {"id": id, "status": "error", "tasks": [
            task("import-my-file", "import/upload", "finished", json!({})),
            {
                "name": "convert-my-file",
                "operation": "convert",
                "status": "error",
                "code": "INVALID_CONVERSION_TYPE",
                "message": "The file could not be converted",
            },
            task("export-my-file", "export/url", "waiting", serde_json::Value::Null),
        ]}}),
        _ => processing,
    };

    Json(body)
}

async fn delete_job(State(state): State<MockState>, UrlPath(id): UrlPath<String>) -> StatusCode {
    state.recorded.lock().unwrap().deleted_jobs.push(id);
    StatusCode::NO_CONTENT
}

async fn download(State(state): State<MockState>, headers: HeaderMap) -> Response {
    state.recorded.lock().unwrap().download_had_auth = Some(headers.contains_key("authorization"));
    if matches!(state.outcome, JobOutcome::DownloadFails) {
        return (StatusCode::NOT_FOUND, "file expired").into_response();
    }
    ([("content-type", "application/pdf")], PDF_BYTES).into_response()
}
