//! # SporeCheck Server
//!
//! HTTP front of the mushroom classifier, built on `Axum`: prediction and
//! training endpoints, a health probe and Scalar API docs at `/docs`.
//!
//! ## Example
//! ```no_run
//! use spore_server::Server;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     Server::builder()
//!         .port(8000)
//!         .build()
//!         .await?
//!         .run()
//!         .await
//! }
//! ```

mod router;

use anyhow::{Context, Result, anyhow};
use axum::Router;
use axum_server::Handle;
use spore::domain::config::ApiConfig;
use spore::kernel::server::{ApiState, ModelSlot};
use spore::ml::ModelArtifactStore;
use std::net::SocketAddr;
use tokio::signal;
use tracing::{error, info, warn};

/// A fluent builder for configuring and initializing the [`Server`].
#[must_use = "builders do nothing unless you call .build()"]
#[derive(Debug, Default)]
pub struct ServerBuilder {
    cfg: ApiConfig,
}

impl ServerBuilder {
    /// Set up the server's configuration.
    pub fn config(mut self, cfg: ApiConfig) -> Self {
        self.cfg = cfg;
        self
    }

    pub fn port(mut self, port: u16) -> Self {
        self.cfg.server.port = port;
        self
    }

    /// Opens the artifact store and loads the last trained model, if any.
    ///
    /// An unreadable artifact is not fatal: the server starts untrained and
    /// the next `/fit/` overwrites the file.
    async fn init_model(&self) -> Result<(ModelArtifactStore, ModelSlot)> {
        let store = ModelArtifactStore::open(&self.cfg.model)
            .await
            .context("Failed to open the model artifact store")?;

        let artifact = match store.load().await {
            Ok(Some(artifact)) => {
                info!(
                    path = %store.path().display(),
                    trained_at = %artifact.trained_at_rfc3339(),
                    "Model artifact loaded"
                );
                Some(artifact)
            },
            Ok(None) => {
                info!(path = %store.path().display(), "No model artifact yet, train one with POST /fit/");
                None
            },
            Err(e) => {
                warn!(path = %store.path().display(), error = %e, "Ignoring unreadable model artifact");
                None
            },
        };

        Ok((store, ModelSlot::new(artifact)))
    }

    /// Consumes the builder and initializes the server.
    ///
    /// # Process
    /// 1. Opens the artifact store and loads the persisted model
    /// 2. Initializes the feature slices around the shared model slot
    /// 3. Constructs application state
    ///
    /// # Errors
    /// Returns an error if the model directory is unusable or a slice fails to initialize.
    pub async fn build(self) -> Result<Server> {
        let address = SocketAddr::new(self.cfg.server.address, self.cfg.server.port);

        info!(address = %address, "Initializing server");

        let (store, model) = self.init_model().await?;

        let slices = spore::init(&self.cfg, store, &model)
            .map_err(|e| anyhow!("Platform bootstrap failed: {e}"))?;

        let state = slices
            .into_iter()
            .fold(ApiState::builder().config(self.cfg).model(model), |builder, slice| {
                builder.register_slice(slice)
            })
            .build()
            .context("Failed to finalize API state registry")?;
        Ok(Server { state })
    }
}

/// A fully initialized server instance ready to run.
#[must_use = "call .run().await to start the server"]
#[derive(Debug)]
pub struct Server {
    state: ApiState,
}

impl Server {
    /// Returns a new [`ServerBuilder`] to configure the server.
    pub fn builder() -> ServerBuilder {
        ServerBuilder::default()
    }

    /// The complete application router, with docs and middleware.
    pub fn router(&self) -> Router {
        router::init(self.state.clone())
    }

    /// Starts the server and runs until the shutdown signal is received.
    ///
    /// # Errors
    /// Returns an error if the server fails to bind to the configured address.
    pub async fn run(self) -> Result<()> {
        let cfg = self.state.config.clone();
        let address = SocketAddr::new(cfg.server.address, cfg.server.port);

        let app = self.router();

        let handle = Handle::<SocketAddr>::new();
        let shutdown_handle = handle.clone();

        tokio::spawn(async move {
            if let Err(e) = shutdown_signal().await {
                error!("Error while waiting for shutdown signal: {e}");
                return;
            }
            info!("Shutdown signal received, starting graceful shutdown...");
            shutdown_handle.graceful_shutdown(Some(std::time::Duration::from_secs(30)));
        });

        info!("Starting HTTP server on http://{address}");

        axum_server::bind(address)
            .handle(handle)
            .serve(app.into_make_service())
            .await
            .context("HTTP server failed")?;

        info!("Server shutdown complete");
        Ok(())
    }

    /// Returns a reference to the application state.
    #[must_use]
    pub const fn state(&self) -> &ApiState {
        &self.state
    }
}

/// Listens for shutdown signals (Ctrl+C, SIGTERM).
async fn shutdown_signal() -> Result<()> {
    let ctrl_c = async { signal::ctrl_c().await.context("Failed to install Ctrl+C handler") };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .context("Failed to install SIGTERM handler")?
            .recv()
            .await;
        Ok::<_, anyhow::Error>(())
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<Result<()>>();

    tokio::select! {
        res = ctrl_c => {
            res.context("Ctrl+C signal received")?;
        },
        res = terminate => {
            res.context("SIGTERM signal received")?;
        },
    }

    Ok(())
}
