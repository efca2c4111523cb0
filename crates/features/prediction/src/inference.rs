//! Applying a trained artifact to validated records.

use crate::error::{PredictionError, PredictionErrorExt};
use spore_domain::mushroom::MushroomRecord;
use spore_ml::{PreparedTable, RawFrame, TrainedArtifact};

/// Runs the artifact's own preparer once over the whole batch.
fn prepare(
    artifact: &TrainedArtifact,
    records: &[MushroomRecord],
) -> Result<PreparedTable, PredictionError> {
    let table = artifact
        .preparer
        .prepare(&RawFrame::from_records(records))
        .context(format!("{} record(s)", records.len()))?;

    if table.len() != records.len() {
        return Err(format!("{} records prepared into {} rows", records.len(), table.len()).into());
    }
    Ok(table)
}

/// `true` for every record classified as poisonous, in input order.
///
/// # Errors
/// Returns [`PredictionError::Prepare`] when the records cannot be prepared.
pub fn classify(
    artifact: &TrainedArtifact,
    records: &[MushroomRecord],
) -> Result<Vec<bool>, PredictionError> {
    if records.is_empty() {
        return Ok(Vec::new());
    }
    Ok(artifact.pipeline.predict(&prepare(artifact, records)?))
}

/// Probability of the poisonous class for every record, in input order.
///
/// # Errors
/// Returns [`PredictionError::Prepare`] when the records cannot be prepared.
pub fn probabilities(
    artifact: &TrainedArtifact,
    records: &[MushroomRecord],
) -> Result<Vec<f64>, PredictionError> {
    if records.is_empty() {
        return Ok(Vec::new());
    }
    Ok(artifact.pipeline.predict_proba(&prepare(artifact, records)?))
}
