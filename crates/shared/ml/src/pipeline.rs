//! Encoder + forest, fitted together and applied together.

use crate::encoder::FeatureEncoder;
use crate::error::TrainError;
use crate::forest::{ForestParams, RandomForest};
use crate::preparer::PreparedTable;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MushroomPipeline {
    encoder: FeatureEncoder,
    forest: RandomForest,
}

impl MushroomPipeline {
    /// Fits the encoder on `table`, then the forest on the encoded matrix.
    ///
    /// # Errors
    /// Propagates [`RandomForest::fit`] errors.
    pub fn fit(
        table: &PreparedTable,
        labels: &[bool],
        params: &ForestParams,
    ) -> Result<Self, TrainError> {
        let encoder = FeatureEncoder::fit(table);
        let forest = RandomForest::fit(&encoder.transform(table), labels, params)?;
        Ok(Self { encoder, forest })
    }

    /// Probability of the poisonous class, one per row.
    #[must_use]
    pub fn predict_proba(&self, table: &PreparedTable) -> Vec<f64> {
        if table.is_empty() {
            return Vec::new();
        }
        self.forest.predict_proba(&self.encoder.transform(table))
    }

    #[must_use]
    pub fn predict(&self, table: &PreparedTable) -> Vec<bool> {
        if table.is_empty() {
            return Vec::new();
        }
        self.forest.predict(&self.encoder.transform(table))
    }

    #[must_use]
    pub const fn encoder(&self) -> &FeatureEncoder {
        &self.encoder
    }

    #[must_use]
    pub const fn forest(&self) -> &RandomForest {
        &self.forest
    }
}
