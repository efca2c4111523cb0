use crate::engine::{BlobStore, BlobStoreInner};
use crate::error::{StorageError, StorageErrorExt};
use private::Sealed;
use spore_domain::config::Compression;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::AtomicU64;
use tokio::fs;
use tracing::info;

#[derive(Debug, Clone)]
struct StoreConfig {
    compression: Compression,
    create: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self { compression: Compression::None, create: true }
    }
}

#[derive(Debug, Default)]
pub struct NoPath;
#[derive(Debug)]
pub struct WithPath(PathBuf);

mod private {
    pub(super) trait Sealed {}
}
impl Sealed for NoPath {}
impl Sealed for WithPath {}

#[allow(private_bounds)]
#[derive(Debug, Default)]
pub struct BlobStoreBuilder<S: Sealed = NoPath> {
    state: S,
    config: StoreConfig,
}

#[allow(private_bounds)]
impl<S: Sealed> BlobStoreBuilder<S> {
    #[must_use = "Sets compression for newly written blobs"]
    pub const fn compression(mut self, compression: Compression) -> Self {
        self.config.compression = compression;
        self
    }

    #[must_use = "Sets whether the parent directory should be created if it does not exist"]
    pub const fn create(mut self, enable: bool) -> Self {
        self.config.create = enable;
        self
    }

    fn transition<N: Sealed>(self, state: N) -> BlobStoreBuilder<N> {
        BlobStoreBuilder { state, config: self.config }
    }
}

impl BlobStoreBuilder<NoPath> {
    #[must_use = "Creates a new blob store builder with default configuration"]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use = "Sets the file backing the blob store"]
    pub fn path(self, path: impl Into<PathBuf>) -> BlobStoreBuilder<WithPath> {
        self.transition(WithPath(path.into()))
    }
}

impl BlobStoreBuilder<WithPath> {
    /// Consumes the configuration and opens the store.
    ///
    /// 1. Creates the parent directory if `create(true)` was set.
    /// 2. Resolves the parent to an absolute path.
    /// 3. Removes stale temp files left behind by interrupted writes.
    ///
    /// Opening never touches the blob itself; a missing blob is a valid state.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::InvalidPath`] if the path has no file name.
    /// Returns [`StorageError::Io`] if the parent directory cannot be created or resolved.
    pub async fn open(self) -> Result<BlobStore, StorageError> {
        let path = self.state.0;

        let file_name = path.file_name().map(ToOwned::to_owned).ok_or_else(|| {
            StorageError::InvalidPath { message: path.display().to_string().into(), context: None }
        })?;

        let parent = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };

        if self.config.create {
            fs::create_dir_all(&parent)
                .await
                .context(format!("Failed to bootstrap blob directory: {}", parent.display()))?;
        }

        let canonical = fs::canonicalize(&parent)
            .await
            .context(format!("Failed to resolve blob directory: {}", parent.display()))?;

        let store = BlobStore {
            inner: Arc::new(BlobStoreInner {
                path: canonical.join(file_name),
                compression: self.config.compression,
                tmp_counter: AtomicU64::new(1),
            }),
        };

        info!(path = %store.path().display(), "Blob store opened");
        store.purge_tmp().await;

        Ok(store)
    }
}
