//! Training feature slice: dataset ingestion and the `/fit/` endpoint.
//!
//! A fit runs synchronously for the request: the table is extracted, the
//! pipeline is trained on the blocking pool, persisted, and only then
//! installed into the shared model slot.

mod error;
#[cfg(feature = "server")]
mod handlers;
pub mod ingest;
#[cfg(feature = "server")]
mod service;

pub use crate::error::{TrainingError, TrainingErrorExt};
#[cfg(feature = "server")]
pub use crate::service::{Training, TrainingInner};

#[cfg(feature = "server")]
use spore_kernel::{
    domain::registry::InitializedSlice,
    server::{ApiState, ModelSlot},
};
#[cfg(feature = "server")]
use spore_ml::{ModelArtifactStore, ModelTrainer};

/// Initialize the training feature.
///
/// # Errors
/// Never fails today; slice initializers share the fallible signature.
#[cfg(feature = "server")]
pub fn init(
    trainer: ModelTrainer,
    store: ModelArtifactStore,
    model: ModelSlot,
) -> Result<InitializedSlice, TrainingError> {
    tracing::info!(
        path = %store.path().display(),
        search = trainer.config().search,
        "Training server slice initialized"
    );

    let slice = Training::new(TrainingInner { trainer, store, model });

    Ok(InitializedSlice::new(slice))
}

/// Routes of this slice, to be merged into the application router.
#[cfg(feature = "server")]
#[must_use]
pub fn router() -> utoipa_axum::router::OpenApiRouter<ApiState> {
    handlers::router()
}
