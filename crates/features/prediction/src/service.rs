use crate::error::PredictionError;
use crate::inference::{classify, probabilities};
use spore_domain::api::{PredictResponse, ProbaResponse, StatusResponse};
use spore_domain::mushroom::MushroomRecord;
use spore_kernel::server::ModelSlot;
use std::slice;
use tracing::debug;

/// Answers classification queries from whatever model the slot currently holds.
///
/// Every call takes one snapshot of the slot, so a batch is never split
/// across two models. Without a model the answers are `None`.
#[derive(Debug, Clone)]
pub struct PredictionService {
    model: ModelSlot,
}

impl PredictionService {
    #[must_use]
    pub const fn new(model: ModelSlot) -> Self {
        Self { model }
    }

    /// # Errors
    /// Returns [`PredictionError::Prepare`] if the record cannot be prepared.
    pub fn predict(&self, record: &MushroomRecord) -> Result<PredictResponse, PredictionError> {
        let mut batch = self.predict_batch(slice::from_ref(record))?;
        Ok(batch.pop().unwrap_or(PredictResponse { poisonous: None }))
    }

    /// # Errors
    /// Returns [`PredictionError::Prepare`] if the record cannot be prepared.
    pub fn predict_proba(&self, record: &MushroomRecord) -> Result<ProbaResponse, PredictionError> {
        let mut batch = self.predict_proba_batch(slice::from_ref(record))?;
        Ok(batch.pop().unwrap_or(ProbaResponse { probability_of_poisonous: None }))
    }

    /// One answer per record, in order.
    ///
    /// # Errors
    /// Returns [`PredictionError::Prepare`] if the records cannot be prepared.
    pub fn predict_batch(
        &self,
        records: &[MushroomRecord],
    ) -> Result<Vec<PredictResponse>, PredictionError> {
        let Some(artifact) = self.model.get() else {
            debug!(records = records.len(), "No model yet, answering null");
            return Ok(vec![PredictResponse { poisonous: None }; records.len()]);
        };
        Ok(classify(&artifact, records)?
            .into_iter()
            .map(|poisonous| PredictResponse { poisonous: Some(poisonous) })
            .collect())
    }

    /// One probability per record, in order.
    ///
    /// # Errors
    /// Returns [`PredictionError::Prepare`] if the records cannot be prepared.
    pub fn predict_proba_batch(
        &self,
        records: &[MushroomRecord],
    ) -> Result<Vec<ProbaResponse>, PredictionError> {
        let Some(artifact) = self.model.get() else {
            debug!(records = records.len(), "No model yet, answering null");
            return Ok(vec![ProbaResponse { probability_of_poisonous: None }; records.len()]);
        };
        Ok(probabilities(&artifact, records)?
            .into_iter()
            .map(|p| ProbaResponse { probability_of_poisonous: Some(p) })
            .collect())
    }

    /// Training timestamp of the served model.
    ///
    /// # Errors
    /// Returns [`PredictionError::NotTrained`] when no model is available.
    pub fn status(&self) -> Result<StatusResponse, PredictionError> {
        let artifact = self.model.get().ok_or_else(|| PredictionError::NotTrained {
            message: "train one with POST /fit/".into(),
            context: None,
        })?;
        Ok(StatusResponse { model_trained_at: artifact.trained_at_rfc3339() })
    }
}
