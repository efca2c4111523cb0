use crate::pipeline::MushroomPipeline;
use crate::preparer::FeaturePreparer;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// A fitted pipeline and the moment it was trained. Immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainedArtifact {
    pub pipeline: MushroomPipeline,
    /// Preparation settings used at training time, replayed at inference.
    pub preparer: FeaturePreparer,
    pub trained_at: DateTime<Utc>,
}

impl TrainedArtifact {
    /// RFC 3339 rendering of [`Self::trained_at`].
    #[must_use]
    pub fn trained_at_rfc3339(&self) -> String {
        self.trained_at.to_rfc3339_opts(SecondsFormat::Micros, true)
    }
}
