use parking_lot::RwLock;
use spore_ml::TrainedArtifact;
use std::sync::Arc;

/// The one slot holding the currently served model.
///
/// Readers clone the inner `Arc` and release the lock immediately; a fit
/// replaces the whole artifact, so nobody observes a half-trained model.
#[derive(Debug, Clone, Default)]
pub struct ModelSlot {
    inner: Arc<RwLock<Option<Arc<TrainedArtifact>>>>,
}

impl ModelSlot {
    #[must_use]
    pub fn new(artifact: Option<TrainedArtifact>) -> Self {
        Self { inner: Arc::new(RwLock::new(artifact.map(Arc::new))) }
    }

    /// Snapshot of the current artifact, `None` until the first successful training.
    #[must_use]
    pub fn get(&self) -> Option<Arc<TrainedArtifact>> {
        self.inner.read().clone()
    }

    /// Swaps in a new artifact and returns the one it replaced.
    pub fn install(&self, artifact: Arc<TrainedArtifact>) -> Option<Arc<TrainedArtifact>> {
        self.inner.write().replace(artifact)
    }

    #[must_use]
    pub fn is_loaded(&self) -> bool {
        self.inner.read().is_some()
    }
}
