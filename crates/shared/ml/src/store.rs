//! Persistence of [`TrainedArtifact`] in a single blob.
//!
//! Layout: `b"SPOREART"` magic, little-endian `u16` format version, then the
//! postcard-encoded artifact. Framing and compression are left to
//! [`spore_storage::BlobStore`].

use crate::artifact::TrainedArtifact;
use spore_domain::config::ModelConfig;
use spore_storage::{BlobStore, StorageError};
use std::borrow::Cow;
use std::path::Path;
use tracing::info;

const MAGIC: &[u8; 8] = b"SPOREART";
const FORMAT_VERSION: u16 = 1;
const HEADER_LEN: usize = MAGIC.len() + 2;

#[spore_derive::spore_error]
pub enum ArtifactStoreError {
    #[error("Artifact storage error{}: {source}", format_context(.context))]
    Storage { source: StorageError, context: Option<Cow<'static, str>> },

    #[error("Artifact encoding error{}: {source}", format_context(.context))]
    Codec { source: postcard::Error, context: Option<Cow<'static, str>> },

    #[error("Unrecognised artifact{}: {message}", format_context(.context))]
    Format { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

fn encode(artifact: &TrainedArtifact) -> Result<Vec<u8>, ArtifactStoreError> {
    let body = postcard::to_allocvec(artifact).context("Serializing artifact")?;
    let mut bytes = Vec::with_capacity(HEADER_LEN + body.len());
    bytes.extend_from_slice(MAGIC);
    bytes.extend_from_slice(&FORMAT_VERSION.to_le_bytes());
    bytes.extend_from_slice(&body);
    Ok(bytes)
}

fn decode(bytes: &[u8]) -> Result<TrainedArtifact, ArtifactStoreError> {
    let (header, body) = bytes.split_at_checked(HEADER_LEN).ok_or_else(|| {
        ArtifactStoreError::Format { message: "truncated header".into(), context: None }
    })?;
    if &header[..MAGIC.len()] != MAGIC {
        return Err(ArtifactStoreError::Format {
            message: "not a SporeCheck model file".into(),
            context: None,
        });
    }
    let version = u16::from_le_bytes([header[MAGIC.len()], header[MAGIC.len() + 1]]);
    if version != FORMAT_VERSION {
        return Err(ArtifactStoreError::Format {
            message: format!("format version {version}, expected {FORMAT_VERSION}").into(),
            context: None,
        });
    }
    postcard::from_bytes(body).context("Deserializing artifact")
}

/// Saves and loads the one trained artifact. Saving replaces the previous one.
#[derive(Debug, Clone)]
pub struct ModelArtifactStore {
    blob: BlobStore,
}

impl ModelArtifactStore {
    /// Opens the store at the configured path without reading the artifact.
    ///
    /// # Errors
    /// Returns [`ArtifactStoreError::Storage`] if the parent directory is unusable.
    pub async fn open(config: &ModelConfig) -> Result<Self, ArtifactStoreError> {
        let blob = BlobStore::builder()
            .path(&config.path)
            .compression(config.compression)
            .open()
            .await
            .context("Opening model store")?;
        Ok(Self { blob })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        self.blob.path()
    }

    /// Persists `artifact` atomically, overwriting any previous one.
    ///
    /// # Errors
    /// Returns encoding or storage errors.
    pub async fn save(&self, artifact: &TrainedArtifact) -> Result<(), ArtifactStoreError> {
        let bytes = encode(artifact)?;
        self.blob.write(&bytes).await.context("Saving model artifact")?;
        info!(
            path = %self.blob.path().display(),
            bytes = bytes.len(),
            trained_at = %artifact.trained_at_rfc3339(),
            "Model artifact saved"
        );
        Ok(())
    }

    /// Loads the artifact, `Ok(None)` when none was saved yet.
    ///
    /// # Errors
    /// Returns storage errors and [`ArtifactStoreError::Format`]/[`ArtifactStoreError::Codec`]
    /// for files that are not a readable artifact.
    pub async fn load(&self) -> Result<Option<TrainedArtifact>, ArtifactStoreError> {
        let Some(bytes) = self.blob.read().await.context("Loading model artifact")? else {
            return Ok(None);
        };
        decode(&bytes).map(Some)
    }
}
