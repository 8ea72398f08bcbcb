//! Shared test harness: stub external services, the full application
//! router with production middleware, and HTTP helpers.

#![allow(dead_code)]

use std::io::Cursor;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::header::{HeaderName, CONTENT_TYPE};
use axum::http::{Method, Request, Response, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use sqlx::PgPool;
use tower::ServiceExt;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::CorsLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use atelier_api::config::{ApiEndpoint, ExternalServices, ServerConfig};
use atelier_api::routes;
use atelier_api::state::AppState;
use atelier_pipeline::generation::GenerationFlow;
use atelier_pipeline::poller::StatusPoller;
use atelier_pipeline::submission::SubmissionPipeline;
use atelier_pipeline::PipelineConfig;
use atelier_services::{
    BackgroundRemoval, ImageSynthesis, ObjectStorage, RemoteStatus, RemoteTraining, ServiceError,
    SynthesisRequest, TextGeneration, TrainingParams, TrainingService,
};

pub const VALID_REPLY: &str = "A woven leather belt coiled on pale linen.";

// ---------------------------------------------------------------------------
// Stub services
// ---------------------------------------------------------------------------

/// Text generation that always returns the same valid description.
pub struct FixedTextGen;

#[async_trait]
impl TextGeneration for FixedTextGen {
    async fn complete(
        &self,
        _system_prompt: &str,
        _user_prompt: &str,
        _image_url: Option<&str>,
    ) -> Result<String, ServiceError> {
        Ok(VALID_REPLY.to_string())
    }
}

/// Image synthesis returning two fixed output URLs.
pub struct FixedSynthesizer;

#[async_trait]
impl ImageSynthesis for FixedSynthesizer {
    async fn generate(&self, request: &SynthesisRequest) -> Result<Vec<String>, ServiceError> {
        Ok((0..request.count)
            .map(|i| format!("https://cdn.test/generated_{i}.png"))
            .collect())
    }
}

/// In-memory object storage.
pub struct MemoryStorage {
    pub objects: Mutex<Vec<String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self {
            objects: Mutex::new(Vec::new()),
        }
    }

    pub fn object_count(&self) -> usize {
        self.objects.lock().unwrap().len()
    }
}

#[async_trait]
impl ObjectStorage for MemoryStorage {
    async fn put(
        &self,
        name: &str,
        _bytes: Vec<u8>,
        _content_type: &str,
    ) -> Result<String, ServiceError> {
        self.objects.lock().unwrap().push(name.to_string());
        Ok(self.public_url(name))
    }

    fn public_url(&self, name: &str) -> String {
        format!("https://storage.test/{name}")
    }
}

/// Background removal returning a valid tiny PNG.
pub struct StubRemover {
    png: Vec<u8>,
}

impl StubRemover {
    pub fn new() -> Self {
        let img = image::DynamicImage::ImageRgb8(image::RgbImage::from_pixel(
            1,
            1,
            image::Rgb([255, 255, 255]),
        ));
        let mut png = Vec::new();
        img.write_to(&mut Cursor::new(&mut png), image::ImageFormat::Png)
            .unwrap();
        Self { png }
    }
}

#[async_trait]
impl BackgroundRemoval for StubRemover {
    async fn remove(&self, _image_url: &str) -> Result<Vec<u8>, ServiceError> {
        Ok(self.png.clone())
    }
}

/// Training service with scriptable remote state.
pub struct StubTrainer {
    pub remote: Mutex<Option<RemoteTraining>>,
}

impl StubTrainer {
    pub fn new() -> Self {
        Self {
            remote: Mutex::new(None),
        }
    }

    pub fn set_succeeded(&self, weights_url: &str) {
        *self.remote.lock().unwrap() = Some(RemoteTraining {
            status: RemoteStatus::Succeeded,
            logs: "flux_train_replicate: 100%|".to_string(),
            weights_url: Some(weights_url.to_string()),
        });
    }
}

#[async_trait]
impl TrainingService for StubTrainer {
    async fn submit(
        &self,
        _archive_url: &str,
        _params: &TrainingParams,
    ) -> Result<String, ServiceError> {
        Ok("ext-training-1".to_string())
    }

    async fn get(&self, _external_id: &str) -> Result<RemoteTraining, ServiceError> {
        match self.remote.lock().unwrap().clone() {
            Some(remote) => Ok(remote),
            None => Err(ServiceError::Api {
                status: 503,
                body: "unreachable".to_string(),
            }),
        }
    }
}

// ---------------------------------------------------------------------------
// Application builder
// ---------------------------------------------------------------------------

/// The router plus handles to the stubs tests need to script.
pub struct TestApp {
    pub router: Router,
    pub trainer: Arc<StubTrainer>,
    pub storage: Arc<MemoryStorage>,
}

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    let endpoint = ApiEndpoint {
        base_url: String::new(),
        api_token: String::new(),
        model: String::new(),
    };
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        services: ExternalServices {
            storage_bucket: "test".to_string(),
            storage_public_url: "https://storage.test".to_string(),
            training: endpoint.clone(),
            textgen: endpoint.clone(),
            imagegen: endpoint.clone(),
            rembg: endpoint,
        },
    }
}

/// Build the full application router with all middleware layers, stub
/// external services, and the given database pool.
///
/// This mirrors the router construction in `main.rs` so integration
/// tests exercise the same middleware stack that production uses.
pub fn build_test_app(pool: PgPool) -> TestApp {
    let config = test_config();
    let pipeline_config = Arc::new(PipelineConfig::default());

    let storage = Arc::new(MemoryStorage::new());
    let trainer = Arc::new(StubTrainer::new());

    let submission = Arc::new(SubmissionPipeline::new(
        pool.clone(),
        Arc::clone(&storage) as _,
        Arc::new(StubRemover::new()) as _,
        Arc::clone(&trainer) as _,
        Arc::clone(&pipeline_config),
    ));
    let poller = Arc::new(StatusPoller::new(
        pool.clone(),
        Arc::clone(&trainer) as _,
        Arc::clone(&pipeline_config),
    ));
    let generation = Arc::new(GenerationFlow::new(
        pool.clone(),
        Arc::new(FixedTextGen) as _,
        Arc::new(FixedSynthesizer) as _,
        Arc::clone(&pipeline_config),
    ));

    let state = AppState {
        pool,
        config: Arc::new(config),
        pipeline_config,
        submission,
        poller,
        generation,
    };

    let cors = CorsLayer::new()
        .allow_origin(["http://localhost:5173".parse().unwrap()])
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([CONTENT_TYPE])
        .allow_credentials(true);

    let request_id_header = HeaderName::from_static("x-request-id");

    let router = Router::new()
        .merge(routes::health::router())
        .nest("/api/v1", routes::api_routes())
        .layer(CatchPanicLayer::new())
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            std::time::Duration::from_secs(30),
        ))
        .layer(PropagateRequestIdLayer::new(request_id_header.clone()))
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::new(request_id_header, MakeRequestUuid))
        .layer(cors)
        .with_state(state);

    TestApp {
        router,
        trainer,
        storage,
    }
}

// ---------------------------------------------------------------------------
// HTTP helpers
// ---------------------------------------------------------------------------

/// Send a GET request to the app.
pub async fn get(app: Router, uri: &str) -> Response<Body> {
    app.oneshot(
        Request::builder()
            .method(Method::GET)
            .uri(uri)
            .body(Body::empty())
            .unwrap(),
    )
    .await
    .unwrap()
}

/// Send a POST request with a JSON body.
pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    app.oneshot(
        Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
    )
    .await
    .unwrap()
}

/// Read a response body as JSON.
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Multipart boundary used by [`multipart_submission`].
pub const BOUNDARY: &str = "atelier-test-boundary";

/// Build a multipart training submission body: `file_count` JPEG parts
/// named `files` plus a `user_id` text part.
pub fn multipart_submission(user_id: &str, file_count: usize) -> (String, Vec<u8>) {
    let mut body = Vec::new();

    for i in 0..file_count {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        body.extend_from_slice(
            format!(
                "Content-Disposition: form-data; name=\"files\"; filename=\"shot_{i}.jpg\"\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(b"Content-Type: image/jpeg\r\n\r\n");
        body.extend_from_slice(&[0xFF, 0xD8, 0xFF, 0xE0]);
        body.extend_from_slice(b"\r\n");
    }

    body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
    body.extend_from_slice(b"Content-Disposition: form-data; name=\"user_id\"\r\n\r\n");
    body.extend_from_slice(user_id.as_bytes());
    body.extend_from_slice(b"\r\n");
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

    (format!("multipart/form-data; boundary={BOUNDARY}"), body)
}

/// Send a multipart POST request.
pub async fn post_multipart(
    app: Router,
    uri: &str,
    content_type: &str,
    body: Vec<u8>,
) -> Response<Body> {
    app.oneshot(
        Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(CONTENT_TYPE, content_type)
            .body(Body::from(body))
            .unwrap(),
    )
    .await
    .unwrap()
}
