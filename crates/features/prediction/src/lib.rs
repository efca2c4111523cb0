//! Prediction feature slice: [`PredictionService`] and the `/predict/` endpoints.

mod error;
#[cfg(feature = "server")]
mod handlers;
pub mod inference;
#[cfg(feature = "server")]
mod service;

pub use crate::error::{PredictionError, PredictionErrorExt};
#[cfg(feature = "server")]
pub use crate::service::PredictionService;

#[cfg(feature = "server")]
use spore_kernel::{
    domain::registry::InitializedSlice,
    server::{ApiState, ModelSlot},
};

/// Prediction feature state
#[cfg(feature = "server")]
#[spore_derive::spore_slice]
pub struct Prediction {
    pub service: PredictionService,
}

/// Initialize the prediction feature around the shared model slot.
///
/// # Errors
/// Never fails today; slice initializers share the fallible signature.
#[cfg(feature = "server")]
pub fn init(model: ModelSlot) -> Result<InitializedSlice, PredictionError> {
    tracing::info!(model_loaded = model.is_loaded(), "Prediction server slice initialized");

    let slice = Prediction::new(PredictionInner { service: PredictionService::new(model) });

    Ok(InitializedSlice::new(slice))
}

/// Routes of this slice, to be merged into the application router.
#[cfg(feature = "server")]
#[must_use]
pub fn router() -> utoipa_axum::router::OpenApiRouter<ApiState> {
    handlers::router()
}
