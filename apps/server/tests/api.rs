use axum::body::{Body, to_bytes};
use axum::http::{Method, Request, StatusCode, header};
use axum::response::Response;
use serde_json::{Value, json};
use spore::domain::config::{ApiConfig, TrainingConfig};
use spore_server::Server;
use std::io::Write;
use tower::ServiceExt;

const BOUNDARY: &str = "spore-server-boundary";

const QUERY: &str = "cap_shape=x&cap_surface=g&cap_color=o&does_bruise_or_bleed=f&gill_attachment=e\
    &gill_color=w&stem_color=w&has_ring=t&ring_type=g&habitat=d&season=w\
    &cap_diameter=15.26&stem_height=16.95&stem_width=17.09";

fn dataset() -> String {
    let mut rows = vec![
        "id;class;cap-diameter;cap-shape;cap-surface;cap-color;does-bruise-or-bleed;gill-attachment;gill-color;stem-height;stem-width;stem-color;has-ring;ring-type;habitat;season".to_owned(),
    ];
    for i in 0..40 {
        let jitter = f64::from(i % 5) * 0.2;
        rows.push(if i % 2 == 0 {
            format!("{i};p;{:.1};x;g;o;f;e;w;{:.1};{:.1};w;t;g;d;w", 15.0 + jitter, 16.0 + jitter, 17.0 + jitter)
        } else {
            format!("{i};e;{:.1};f;s;n;t;a;n;{:.1};{:.1};n;f;f;g;s", 3.0 + jitter, 4.0 + jitter, 5.0 + jitter)
        });
    }
    rows.join("\n")
}

fn fit_request(contents: &[u8]) -> Request<Body> {
    let mut body = Vec::new();
    write!(
        body,
        "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"filename\"; filename=\"train.csv\"\r\n\r\n"
    )
    .unwrap();
    body.extend_from_slice(contents);
    write!(body, "\r\n--{BOUNDARY}--\r\n").unwrap();

    Request::post("/fit/")
        .header(header::CONTENT_TYPE, format!("multipart/form-data; boundary={BOUNDARY}"))
        .body(Body::from(body))
        .unwrap()
}

async fn server(dir: &tempfile::TempDir) -> Server {
    let mut cfg = ApiConfig::default();
    cfg.model.path = dir.path().join("model.bin");
    cfg.training = TrainingConfig { n_trees: 10, min_samples_split: 2, ..TrainingConfig::default() };
    Server::builder().config(cfg).build().await.unwrap()
}

async fn json(response: Response) -> Value {
    serde_json::from_slice(&to_bytes(response.into_body(), 1 << 20).await.unwrap()).unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::get(uri).body(Body::empty()).unwrap()
}

#[tokio::test(flavor = "multi_thread")]
async fn root_redirects_to_docs() {
    let dir = tempfile::tempdir().unwrap();
    let app = server(&dir).await.router();

    let response = app.clone().oneshot(get("/")).await.unwrap();
    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(response.headers()[header::LOCATION], "/docs");

    let response = app.oneshot(get("/docs")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test(flavor = "multi_thread")]
async fn train_then_predict_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let app = server(&dir).await.router();

    let response = app.clone().oneshot(get("/predict/status/")).await.unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let response = app.clone().oneshot(get(&format!("/predict/?{QUERY}"))).await.unwrap();
    assert_eq!(json(response).await, json!({ "poisonous": null }));

    let response = app.clone().oneshot(fit_request(dataset().as_bytes())).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json(response).await, json!({ "success": true }));

    let response = app.clone().oneshot(get(&format!("/predict/?{QUERY}"))).await.unwrap();
    assert_eq!(json(response).await, json!({ "poisonous": true }));

    let response = app.clone().oneshot(get("/predict/status/")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(json(response).await["model_trained_at"].is_string());

    let response = app.oneshot(get("/health")).await.unwrap();
    assert_eq!(json(response).await["model_loaded"], true);
}

#[tokio::test(flavor = "multi_thread")]
async fn trained_model_is_loaded_on_restart() {
    let dir = tempfile::tempdir().unwrap();
    let first = server(&dir).await.router();
    let response = first.oneshot(fit_request(dataset().as_bytes())).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let restarted = server(&dir).await;
    assert!(restarted.state().model.is_loaded());
}

#[tokio::test(flavor = "multi_thread")]
async fn corrupt_artifact_starts_untrained() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("model.bin"), b"\0garbage").unwrap();

    let server = server(&dir).await;
    assert!(!server.state().model.is_loaded());
}

#[tokio::test(flavor = "multi_thread")]
async fn openapi_document_lists_every_endpoint() {
    let dir = tempfile::tempdir().unwrap();
    let server = server(&dir).await;
    let response = server.router().oneshot(get("/openapi.json")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let spec = json(response).await;

    for path in [
        "/health",
        "/fit/",
        "/predict/",
        "/predict/predict_proba/",
        "/predict/predict_batch/",
        "/predict/predict_proba_batch/",
        "/predict/status/",
    ] {
        assert!(spec["paths"].get(path).is_some(), "{path} missing from the OpenAPI document");
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn cors_allows_configured_origins() {
    let dir = tempfile::tempdir().unwrap();
    let app = server(&dir).await.router();

    let preflight = Request::builder()
        .method(Method::OPTIONS)
        .uri("/predict/")
        .header(header::ORIGIN, "http://localhost:8000")
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "GET")
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(preflight).await.unwrap();
    assert_eq!(
        response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
        "http://localhost:8000"
    );
    assert_eq!(response.headers()[header::ACCESS_CONTROL_ALLOW_CREDENTIALS], "true");

    let foreign = Request::get("/health")
        .header(header::ORIGIN, "http://evil.example")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(foreign).await.unwrap();
    assert!(response.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).is_none());
}
