//! Durable single-blob storage for the trained model artifact.
//!
//! A [`BlobStore`] owns exactly one file. Every write goes through an atomic
//! swap (unique temp file + `fsync` + `rename`), so readers never see a torn
//! artifact even if the process dies mid-write. Payloads can be transparently
//! LZ4 compressed; the codec is recorded in a one-byte frame prefix, so a blob
//! written with one setting stays readable after the setting changes.
//!
//! Orphaned temp files from crashed writes are purged when the store is opened.
//!
//! # Examples
//!
//! ```rust
//! use spore_storage::{BlobStore, Compression, StorageError};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), StorageError> {
//!     # let tmp = tempfile::tempdir().unwrap();
//!     # let path = tmp.path().join("model.bin");
//!     let store = BlobStore::builder()
//!         .path(&path)
//!         .compression(Compression::Lz4)
//!         .open()
//!         .await?;
//!
//!     assert!(store.read().await?.is_none());
//!
//!     store.write(b"fitted pipeline").await?;
//!     assert_eq!(store.read().await?.as_deref(), Some(&b"fitted pipeline"[..]));
//!
//!     Ok(())
//! }
//! ```

mod builder;
mod engine;
mod error;
mod maintenance;

pub use builder::BlobStoreBuilder;
pub use engine::BlobStore;
pub use error::{StorageError, StorageErrorExt};
pub use spore_domain::config::Compression;
