#![cfg(feature = "server")]

use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode};
use spore_kernel::domain::config::{ApiConfig, TrainingConfig};
use spore_kernel::domain::registry::{FeatureSlice, InitializedSlice};
use spore_kernel::server::router::system_router;
use spore_kernel::server::{ApiState, ModelSlot};
use spore_ml::ModelTrainer;
use std::any::Any;
use std::sync::Arc;
use tower::ServiceExt;

const CSV: &str = "class,cap-diameter,cap-shape,cap-surface,cap-color,does-bruise-or-bleed,gill-attachment,gill-color,stem-height,stem-width,stem-color,has-ring,ring-type,habitat,season
p,15.2,x,g,o,f,e,w,16.9,17.0,w,t,g,d,w
e,3.1,f,s,n,t,a,n,4.0,5.2,n,f,f,g,s
p,14.8,x,g,o,f,e,w,15.9,16.5,w,t,g,d,w
e,2.9,f,s,n,t,a,n,3.8,5.0,n,f,f,g,s
";

#[derive(Debug)]
struct Probe;

impl FeatureSlice for Probe {
    fn as_any(&self) -> &dyn Any {
        self
    }
}

fn artifact() -> spore_ml::TrainedArtifact {
    let config = TrainingConfig { n_trees: 3, min_samples_split: 2, ..TrainingConfig::default() };
    ModelTrainer::new(config).fit_csv(CSV.as_bytes()).unwrap()
}

#[test]
fn build_requires_config() {
    assert!(ApiState::builder().build().is_err());
}

#[test]
fn slices_are_found_by_type() {
    let state = ApiState::builder()
        .config(ApiConfig::default())
        .register_slice(InitializedSlice::new(Probe))
        .build()
        .unwrap();

    assert!(state.get_slice::<Probe>().is_some());
    assert_eq!(state.slice_names().count(), 1);
}

#[test]
fn model_slot_is_shared_between_clones() {
    let slot = ModelSlot::default();
    let state = ApiState::builder().config(ApiConfig::default()).model(slot.clone()).build().unwrap();
    assert!(!state.model.is_loaded());

    let first = Arc::new(artifact());
    assert!(slot.install(Arc::clone(&first)).is_none());
    assert!(state.model.is_loaded());

    let replaced = slot.install(Arc::new(artifact())).unwrap();
    assert!(Arc::ptr_eq(&replaced, &first));
}

#[tokio::test]
async fn health_reports_model_presence() {
    let slot = ModelSlot::default();
    let state = ApiState::builder().config(ApiConfig::default()).model(slot.clone()).build().unwrap();
    let (router, _) = system_router().with_state(state).split_for_parts();

    let request = || Request::get("/health").body(Body::empty()).unwrap();

    let response = router.clone().oneshot(request()).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body: serde_json::Value =
        serde_json::from_slice(&to_bytes(response.into_body(), 1 << 16).await.unwrap()).unwrap();
    assert_eq!(body["status"], "up");
    assert_eq!(body["model_loaded"], false);

    slot.install(Arc::new(artifact()));
    let response = router.oneshot(request()).await.unwrap();
    let body: serde_json::Value =
        serde_json::from_slice(&to_bytes(response.into_body(), 1 << 16).await.unwrap()).unwrap();
    assert_eq!(body["model_loaded"], true);
}
