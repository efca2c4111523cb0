use crate::error::TrainingError;
use crate::ingest::{UploadKind, extract_table};
use bytes::Bytes;
use spore_kernel::server::ModelSlot;
use spore_ml::{ModelArtifactStore, ModelTrainer, TrainedArtifact};
use std::sync::Arc;
use tracing::info;

/// Training feature state
#[spore_derive::spore_slice]
pub struct Training {
    pub trainer: ModelTrainer,
    pub store: ModelArtifactStore,
    pub model: ModelSlot,
}

impl Training {
    /// Extracts, trains and persists; the served model is left untouched.
    ///
    /// # Errors
    /// * [`TrainingError::UnsupportedExtension`] / [`TrainingError::NoTable`] for unusable uploads.
    /// * [`TrainingError::Train`] / [`TrainingError::Store`] when fitting or saving fails.
    pub async fn train_upload(
        &self,
        file_name: &str,
        bytes: Bytes,
    ) -> Result<Arc<TrainedArtifact>, TrainingError> {
        let kind = UploadKind::from_file_name(file_name)?;
        let name = file_name.to_owned();
        let trainer = self.trainer.clone();

        // Archive inflation and fitting are both CPU bound.
        let artifact = tokio::task::spawn_blocking(move || {
            let table = extract_table(kind, bytes)?.ok_or_else(|| TrainingError::NoTable {
                message: format!("'{name}' has no .csv entry").into(),
                context: None,
            })?;
            info!(file = %name, ?kind, bytes = table.len(), "Training requested");
            Ok::<_, TrainingError>(trainer.fit_csv(&table)?)
        })
        .await
        .map_err(|e| TrainingError::from(format!("training task aborted: {e}")))??;

        self.store.save(&artifact).await?;
        Ok(Arc::new(artifact))
    }

    /// [`Self::train_upload`], then swaps the served model.
    ///
    /// # Errors
    /// See [`Self::train_upload`]; on error the previously served model stays in place.
    pub async fn fit(
        &self,
        file_name: &str,
        bytes: Bytes,
    ) -> Result<Arc<TrainedArtifact>, TrainingError> {
        let artifact = self.train_upload(file_name, bytes).await?;
        let replaced = self.model.install(Arc::clone(&artifact)).is_some();
        info!(trained_at = %artifact.trained_at_rfc3339(), replaced, "Model installed");
        Ok(artifact)
    }
}
