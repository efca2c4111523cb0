//! Core blob engine: framing, compression and the atomic write path.

use crate::builder::BlobStoreBuilder;
use crate::error::{StorageError, StorageErrorExt};
use crate::maintenance;
use spore_domain::config::Compression;
use std::ops::Deref;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

pub(crate) const TMP_MARKER: &str = ".sporetmp.";

const CODEC_NONE: u8 = 0;
const CODEC_LZ4: u8 = 1;

fn encode_frame(compression: Compression, data: &[u8]) -> Vec<u8> {
    let (codec, body) = match compression {
        Compression::None => (CODEC_NONE, data.to_vec()),
        Compression::Lz4 => (CODEC_LZ4, lz4_flex::compress_prepend_size(data)),
    };
    let mut frame = Vec::with_capacity(body.len() + 1);
    frame.push(codec);
    frame.extend_from_slice(&body);
    frame
}

fn decode_frame(frame: &[u8]) -> Result<Vec<u8>, StorageError> {
    match frame.split_first() {
        Some((&CODEC_NONE, body)) => Ok(body.to_vec()),
        Some((&CODEC_LZ4, body)) => {
            lz4_flex::decompress_size_prepended(body).context("Lz4 decompression failed")
        },
        Some((codec, _)) => Err(StorageError::Corrupted {
            message: format!("unknown codec marker {codec}").into(),
            context: None,
        }),
        None => Err(StorageError::Corrupted { message: "empty blob".into(), context: None }),
    }
}

#[derive(Debug)]
pub struct BlobStoreInner {
    /// Absolute path of the blob.
    pub(crate) path: PathBuf,
    pub(crate) compression: Compression,
    pub(crate) tmp_counter: AtomicU64,
}

/// A cheap-to-clone handle to a single durable blob.
#[derive(Debug, Clone)]
pub struct BlobStore {
    pub(crate) inner: Arc<BlobStoreInner>,
}

impl Deref for BlobStore {
    type Target = BlobStoreInner;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl BlobStore {
    #[must_use = "The blob store is not opened until you call .open()"]
    pub fn builder() -> BlobStoreBuilder {
        BlobStoreBuilder::new()
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.inner.path
    }

    #[must_use]
    pub fn compression(&self) -> Compression {
        self.inner.compression
    }

    /// Reads the blob, returning `Ok(None)` when nothing was written yet.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Io`] on read failures other than "not found".
    /// Returns [`StorageError::Corrupted`] or [`StorageError::Decompress`] for damaged frames.
    pub async fn read(&self) -> Result<Option<Vec<u8>>, StorageError> {
        let frame = match fs::read(&self.inner.path).await {
            Ok(frame) => frame,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => {
                return Err(StorageError::Io {
                    source: err,
                    context: Some(format!("Read failed: {}", self.inner.path.display()).into()),
                });
            },
        };

        decode_frame(&frame).map(Some)
    }

    /// Replaces the blob atomically.
    ///
    /// The data is framed (and compressed when configured), written to a unique
    /// temp file next to the target, synced, and renamed over the target.
    /// Overwriting an existing blob is allowed but logged as a warning.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Io`] if disk space is full or hardware failure occurs.
    pub async fn write(&self, data: &[u8]) -> Result<(), StorageError> {
        let target = &self.inner.path;

        if fs::try_exists(target).await.unwrap_or(false) {
            warn!(path = %target.display(), "Overwriting existing blob");
        }

        let temp = unique_tmp_path(target, &self.inner.tmp_counter);
        let frame = encode_frame(self.inner.compression, data);

        {
            let mut file = fs::OpenOptions::new()
                .create_new(true)
                .write(true)
                .open(&temp)
                .await
                .context(format!("Temp creation failed: {}", temp.display()))?;
            file.write_all(&frame).await.context("Write failed")?;
            file.sync_all().await.context("Hardware sync failed")?;
        }

        if let Err(err) = fs::rename(&temp, target).await {
            if err.kind() == std::io::ErrorKind::AlreadyExists {
                fs::remove_file(target)
                    .await
                    .context(format!("Failed to replace existing file: {}", target.display()))?;
                fs::rename(&temp, target).await.context(format!(
                    "Atomic swap failed: {} -> {}",
                    temp.display(),
                    target.display()
                ))?;
            } else {
                let _ = fs::remove_file(&temp).await;
                return Err(StorageError::Io {
                    source: err,
                    context: Some(
                        format!("Atomic swap failed: {} -> {}", temp.display(), target.display())
                            .into(),
                    ),
                });
            }
        }

        if let Some(parent) = target.parent() {
            Self::sync_dir(parent).await;
        }

        debug!(path = %target.display(), bytes = frame.len(), "Blob saved atomically");
        Ok(())
    }

    /// Whether the blob currently exists on disk.
    #[must_use]
    pub fn exists(&self) -> bool {
        self.inner.path.exists()
    }

    /// Removes stale temp files belonging to this blob.
    pub async fn purge_tmp(&self) {
        maintenance::purge_tmp(&self.inner.path).await;
    }

    async fn sync_dir(path: &Path) {
        match fs::File::open(path).await {
            Ok(dir) => {
                if let Err(err) = dir.sync_all().await {
                    warn!(path = %path.display(), error = %err, "Directory sync failed");
                }
            },
            Err(err) => {
                warn!(path = %path.display(), error = %err, "Directory open failed");
            },
        }
    }
}

fn unique_tmp_path(target: &Path, counter: &AtomicU64) -> PathBuf {
    let counter = counter.fetch_add(1, Ordering::Relaxed);
    let file_name = target.file_name().and_then(|s| s.to_str()).unwrap_or("blob");
    target.with_file_name(format!("{file_name}{TMP_MARKER}{}.{counter}", std::process::id()))
}
