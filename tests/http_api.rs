//! End-to-end checks of the HTTP adapter against an in-process stub service.

use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use axum::{
    extract::{Multipart, State},
    http::{StatusCode, Uri},
    routing::post,
    Router,
};
use tokio::sync::oneshot;

use dermadetect::adapters::HttpAnalysisApi;
use dermadetect::application::AnalysisService;
use dermadetect::config::ApiConfig;
use dermadetect::domain::{ClinicalFields, RiskTier, SubmissionPayload, UploadedFile};
use dermadetect::ports::ApiError;
use dermadetect::DermadetectError;

/// One multipart part as the stub saw it.
#[derive(Debug, Clone)]
struct SeenPart {
    name: String,
    file_name: Option<String>,
    content_type: Option<String>,
    data: Vec<u8>,
}

#[derive(Debug, Clone)]
struct SeenRequest {
    path: String,
    parts: Vec<SeenPart>,
}

impl SeenRequest {
    fn text(&self, name: &str) -> Option<String> {
        self.parts
            .iter()
            .find(|p| p.name == name)
            .map(|p| String::from_utf8_lossy(&p.data).into_owned())
    }
}

#[derive(Clone)]
struct StubState {
    seen: Arc<Mutex<Vec<SeenRequest>>>,
    upload: (u16, &'static str),
    predict: (u16, &'static str),
}

async fn capture(State(state): State<StubState>, uri: Uri, mut multipart: Multipart) -> (StatusCode, String) {
    let mut parts = Vec::new();
    while let Ok(Some(field)) = multipart.next_field().await {
        let name = field.name().unwrap_or_default().to_string();
        let file_name = field.file_name().map(str::to_string);
        let content_type = field.content_type().map(str::to_string);
        let data = field.bytes().await.map(|b| b.to_vec()).unwrap_or_default();
        parts.push(SeenPart {
            name,
            file_name,
            content_type,
            data,
        });
    }

    let path = uri.path().to_string();
    let (status, body) = if path == "/upload" {
        state.upload
    } else {
        state.predict
    };
    state
        .seen
        .lock()
        .expect("seen lock")
        .push(SeenRequest { path, parts });

    (
        StatusCode::from_u16(status).expect("valid status"),
        body.to_string(),
    )
}

struct Stub {
    base_url: String,
    seen: Arc<Mutex<Vec<SeenRequest>>>,
    shutdown: Option<oneshot::Sender<()>>,
    server: Option<thread::JoinHandle<()>>,
}

impl Stub {
    fn start(upload: (u16, &'static str), predict: (u16, &'static str)) -> Self {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let state = StubState {
            seen: seen.clone(),
            upload,
            predict,
        };
        let (addr_tx, addr_rx) = std::sync::mpsc::channel();
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

        let server = thread::spawn(move || {
            let rt = tokio::runtime::Builder::new_multi_thread()
                .worker_threads(1)
                .enable_all()
                .build()
                .expect("runtime");
            rt.block_on(async move {
                let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
                    .await
                    .expect("bind");
                addr_tx
                    .send(listener.local_addr().expect("addr"))
                    .expect("send addr");

                let app = Router::new()
                    .route("/upload", post(capture))
                    .route("/predict", post(capture))
                    .with_state(state);
                axum::serve(listener, app)
                    .with_graceful_shutdown(async {
                        let _ = shutdown_rx.await;
                    })
                    .await
                    .expect("serve");
            });
        });

        let addr = addr_rx
            .recv_timeout(Duration::from_secs(5))
            .expect("stub did not start");

        Self {
            base_url: format!("http://{addr}"),
            seen,
            shutdown: Some(shutdown_tx),
            server: Some(server),
        }
    }

    fn service(&self) -> AnalysisService<HttpAnalysisApi> {
        let config = ApiConfig {
            base_url: self.base_url.clone(),
            timeout: Some(Duration::from_secs(5)),
            ..ApiConfig::default()
        };
        let api = HttpAnalysisApi::new(&config).expect("client");
        AnalysisService::new(Arc::new(api), Duration::ZERO)
    }

    fn seen(&self) -> Vec<SeenRequest> {
        self.seen.lock().expect("seen lock").clone()
    }
}

impl Drop for Stub {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        if let Some(server) = self.server.take() {
            let _ = server.join();
        }
    }
}

const ACCEPTED: (u16, &str) = (200, r#"{"success": true, "filename": "mole.png"}"#);

fn payload() -> SubmissionPayload {
    SubmissionPayload::new(
        UploadedFile::new("mole.png", "image/png", vec![0x89, b'P', b'N', b'G', 1, 2, 3]),
        ClinicalFields {
            age: "45".to_string(),
            gender: "Female".to_string(),
            skin_type: "Type II - Fair".to_string(),
            location: "Back".to_string(),
            additional_notes: "Itchy since spring".to_string(),
            ..Default::default()
        },
        ["Itching".to_string(), "Bleeding".to_string()],
    )
}

#[test]
fn test_upload_then_predict_send_same_multipart_body() {
    let stub = Stub::start(
        ACCEPTED,
        (200, r#"{"prediction": "Melanoma", "probability": 0.82}"#),
    );

    let result = stub.service().run(&payload()).expect("analysis");
    assert_eq!(result.label(), "Melanoma");
    assert_eq!(result.percentage_text(), "82.0%");
    assert_eq!(result.risk_tier(), RiskTier::High);

    let seen = stub.seen();
    let paths: Vec<&str> = seen.iter().map(|r| r.path.as_str()).collect();
    assert_eq!(paths, ["/upload", "/predict"]);

    for request in &seen {
        let file = request
            .parts
            .iter()
            .find(|p| p.name == "file")
            .expect("file part");
        assert_eq!(file.file_name.as_deref(), Some("mole.png"));
        assert_eq!(file.content_type.as_deref(), Some("image/png"));
        assert_eq!(file.data, [0x89, b'P', b'N', b'G', 1, 2, 3]);

        assert_eq!(request.text("age").as_deref(), Some("45"));
        assert_eq!(request.text("skinType").as_deref(), Some("Type II - Fair"));
        assert_eq!(request.text("lesionSize").as_deref(), Some(""));
        assert_eq!(
            request.text("symptoms").as_deref(),
            Some(r#"["Bleeding","Itching"]"#)
        );
        assert_eq!(
            request.text("additionalNotes").as_deref(),
            Some("Itchy since spring")
        );
    }
}

#[test]
fn test_refused_upload_skips_prediction() {
    let stub = Stub::start(
        (200, r#"{"success": false, "error": "Invalid file type"}"#),
        (200, r#"{"prediction": "Melanoma", "probability": 0.82}"#),
    );

    let err = stub.service().run(&payload()).expect_err("refused");
    assert!(matches!(err, DermadetectError::UploadRefused(ref r) if r == "Invalid file type"));
    assert_eq!(stub.seen().len(), 1);
}

#[test]
fn test_server_error_on_predict_is_rejected() {
    let stub = Stub::start(ACCEPTED, (500, "model not loaded"));

    let err = stub.service().run(&payload()).expect_err("server error");
    match err {
        DermadetectError::Api(ApiError::Rejected { status, body }) => {
            assert_eq!(status, 500);
            assert_eq!(body, "model not loaded");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn test_unparseable_prediction_is_decode_error() {
    let stub = Stub::start(ACCEPTED, (200, "<html>oops</html>"));

    let err = stub.service().run(&payload()).expect_err("bad body");
    assert!(matches!(err, DermadetectError::Api(ApiError::Decode(_))));
}

#[test]
fn test_missing_prediction_label_renders_unknown() {
    let stub = Stub::start(ACCEPTED, (200, r#"{"probability": 0.3}"#));

    let result = stub.service().run(&payload()).expect("analysis");
    assert_eq!(result.label(), "Unknown");
    assert_eq!(result.risk_tier(), RiskTier::Low);
    assert_eq!(result.percentage_text(), "30.0%");
}
