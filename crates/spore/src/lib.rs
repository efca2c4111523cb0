//! Facade crate for `SporeCheck` features and shared modules.
//! Re-exports domain/kernel/model primitives and aggregates feature initialization.
//! Keep this crate thin: it should compose other crates, not implement business logic.
//!
//! ## Usage
//! - Add `spore` with the `server` feature.
//! - Call `spore::init` to register feature slices around one shared model slot,
//!   then merge `spore::server::router::feature_router` into the application router.

pub use spore_domain as domain;
pub use spore_kernel as kernel;
pub use spore_ml as ml;

#[cfg(feature = "server")]
pub mod server {
    pub mod router {
        pub use spore_kernel::server::router::system_router;
        use spore_kernel::server::ApiState;
        use utoipa_axum::router::OpenApiRouter;

        /// Routes of every enabled feature slice.
        #[must_use]
        pub fn feature_router() -> OpenApiRouter<ApiState> {
            OpenApiRouter::new()
                .merge(crate::features::prediction::router())
                .merge(crate::features::training::router())
        }
    }
}

/// Feature registry for runtime introspection.
pub mod features {
    pub use spore_prediction as prediction;
    pub use spore_training as training;

    /// Build-time enabled features (by Cargo feature).
    pub const ENABLED: &[&str] = &[
        #[cfg(feature = "server")]
        "server",
        #[cfg(feature = "server")]
        "prediction",
        #[cfg(feature = "server")]
        "training",
    ];

    #[must_use]
    pub fn is_enabled(name: &str) -> bool {
        ENABLED.contains(&name)
    }
}

/// Initialize all enabled features for server mode.
///
/// Both slices share `model`: training installs into it, prediction reads from it.
///
/// # Errors
/// Returns an error if any feature initialization fails.
#[cfg(feature = "server")]
pub fn init(
    config: &domain::config::ApiConfig,
    store: ml::ModelArtifactStore,
    model: &kernel::server::ModelSlot,
) -> Result<Vec<domain::registry::InitializedSlice>, Box<dyn std::error::Error + Send + Sync>> {
    let mut slices = Vec::new();

    // Prediction
    slices.push(features::prediction::init(model.clone())?);

    // Training
    let trainer = ml::ModelTrainer::new(config.training.clone());
    slices.push(features::training::init(trainer, store, model.clone())?);

    tracing::debug!(slices = slices.len(), "Feature slices initialized");
    Ok(slices)
}
