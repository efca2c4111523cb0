#![cfg(feature = "server")]

use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode, header};
use axum::response::Response;
use spore_kernel::domain::config::{ApiConfig, Compression, ModelConfig, TrainingConfig};
use spore_kernel::server::{ApiState, ModelSlot};
use spore_ml::{ModelArtifactStore, ModelTrainer};
use std::io::{Cursor, Write};
use tower::ServiceExt;
use zip::write::{SimpleFileOptions, ZipWriter};

const BOUNDARY: &str = "spore-test-boundary";

fn dataset() -> String {
    let mut out = vec![
        "class,cap-diameter,cap-shape,cap-surface,cap-color,does-bruise-or-bleed,gill-attachment,gill-color,stem-height,stem-width,stem-color,has-ring,ring-type,habitat,season".to_owned(),
    ];
    for i in 0..24 {
        let jitter = f64::from(i % 5) * 0.2;
        out.push(if i % 2 == 0 {
            format!("p,{:.1},x,g,o,f,e,w,{:.1},{:.1},w,t,g,d,w", 15.0 + jitter, 16.0 + jitter, 17.0 + jitter)
        } else {
            format!("e,{:.1},f,s,n,t,a,n,{:.1},{:.1},n,f,f,g,s", 3.0 + jitter, 4.0 + jitter, 5.0 + jitter)
        });
    }
    out.join("\n")
}

fn zipped(name: &str, contents: &[u8]) -> Vec<u8> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    writer.start_file(name, SimpleFileOptions::default()).unwrap();
    writer.write_all(contents).unwrap();
    writer.finish().unwrap().into_inner()
}

fn multipart(field: &str, file_name: &str, contents: &[u8]) -> Request<Body> {
    let mut body = Vec::new();
    write!(
        body,
        "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{field}\"; filename=\"{file_name}\"\r\n\
         Content-Type: application/octet-stream\r\n\r\n"
    )
    .unwrap();
    body.extend_from_slice(contents);
    write!(body, "\r\n--{BOUNDARY}--\r\n").unwrap();

    Request::post("/fit/")
        .header(header::CONTENT_TYPE, format!("multipart/form-data; boundary={BOUNDARY}"))
        .body(Body::from(body))
        .unwrap()
}

struct Harness {
    app: axum::Router,
    model: ModelSlot,
    store: ModelArtifactStore,
    _dir: tempfile::TempDir,
}

async fn harness() -> Harness {
    let dir = tempfile::tempdir().unwrap();
    let store = ModelArtifactStore::open(&ModelConfig {
        path: dir.path().join("model.bin"),
        compression: Compression::Lz4,
    })
    .await
    .unwrap();

    let trainer = ModelTrainer::new(TrainingConfig {
        n_trees: 5,
        min_samples_split: 2,
        ..TrainingConfig::default()
    });
    let model = ModelSlot::default();
    let slice = spore_training::init(trainer, store.clone(), model.clone()).unwrap();

    let state = ApiState::builder()
        .config(ApiConfig::default())
        .model(model.clone())
        .register_slice(slice)
        .build()
        .unwrap();
    let (app, _) = spore_training::router().with_state(state).split_for_parts();

    Harness { app, model, store, _dir: dir }
}

async fn json(response: Response) -> serde_json::Value {
    serde_json::from_slice(&to_bytes(response.into_body(), 1 << 20).await.unwrap()).unwrap()
}

#[tokio::test(flavor = "multi_thread")]
async fn zip_upload_trains_saves_and_installs() {
    let h = harness().await;
    let upload = zipped("train_mushrooms.csv", dataset().as_bytes());

    let response = h.app.oneshot(multipart("filename", "train_mushrooms.zip", &upload)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json(response).await, serde_json::json!({ "success": true }));

    assert!(h.model.is_loaded());
    let saved = h.store.load().await.unwrap().expect("artifact persisted");
    assert_eq!(saved.trained_at, h.model.get().unwrap().trained_at);
}

#[tokio::test(flavor = "multi_thread")]
async fn csv_upload_is_accepted_without_trailing_slash() {
    let h = harness().await;
    let mut request = multipart("filename", "train.csv", dataset().as_bytes());
    *request.uri_mut() = "/fit".parse().unwrap();

    let response = h.app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(h.model.is_loaded());
}

#[tokio::test(flavor = "multi_thread")]
async fn unsupported_extension_is_a_bad_request() {
    let h = harness().await;
    let response = h.app.oneshot(multipart("filename", "train.xlsx", b"whatever")).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(json(response).await["detail"].as_str().unwrap().contains("train.xlsx"));
    assert!(!h.model.is_loaded());
}

#[tokio::test(flavor = "multi_thread")]
async fn archive_without_csv_is_a_bad_request() {
    let h = harness().await;
    let upload = zipped("notes.txt", b"nothing here");
    let response = h.app.oneshot(multipart("filename", "data.zip", &upload)).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test(flavor = "multi_thread")]
async fn missing_file_is_unprocessable() {
    let h = harness().await;

    let response = h.app.clone().oneshot(multipart("other", "train.csv", b"x")).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let plain_value = format!(
        "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"filename\"\r\n\r\ntrain.csv\r\n--{BOUNDARY}--\r\n"
    );
    let request = Request::post("/fit/")
        .header(header::CONTENT_TYPE, format!("multipart/form-data; boundary={BOUNDARY}"))
        .body(Body::from(plain_value))
        .unwrap();
    let response = h.app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert!(json(response).await["detail"].as_str().unwrap().contains("filename"));

    let empty = Request::post("/fit/").body(Body::empty()).unwrap();
    let response = h.app.oneshot(empty).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test(flavor = "multi_thread")]
async fn broken_dataset_is_an_internal_error() {
    let h = harness().await;
    let response = h
        .app
        .oneshot(multipart("filename", "train.csv", b"class,color\np,red\n"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert!(json(response).await["detail"].as_str().unwrap().contains("Training failed"));
    assert!(!h.model.is_loaded());
}

#[tokio::test]
async fn archive_errors_surface_from_the_blocking_pool() {
    use spore_training::{Training, TrainingError, TrainingInner};

    let dir = tempfile::tempdir().unwrap();
    let store = ModelArtifactStore::open(&ModelConfig {
        path: dir.path().join("model.bin"),
        compression: Compression::None,
    })
    .await
    .unwrap();
    let training = Training::new(TrainingInner {
        trainer: ModelTrainer::new(TrainingConfig { n_trees: 5, ..TrainingConfig::default() }),
        store,
        model: ModelSlot::default(),
    });

    let no_csv = bytes::Bytes::from(zipped("readme.md", b"# nothing"));
    let err = training.fit("data.zip", no_csv).await.unwrap_err();
    assert!(matches!(err, TrainingError::NoTable { .. }), "{err}");

    let garbage = bytes::Bytes::from_static(b"PK\x03\x04 definitely not an archive");
    let err = training.fit("data.zip", garbage).await.unwrap_err();
    assert!(matches!(err, TrainingError::Zip { .. }), "{err}");

    assert!(!training.model.is_loaded());
}
