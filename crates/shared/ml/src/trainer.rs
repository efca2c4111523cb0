use crate::artifact::TrainedArtifact;
use crate::error::TrainError;
use crate::forest::ForestParams;
use crate::frame::RawFrame;
use crate::pipeline::MushroomPipeline;
use crate::preparer::FeaturePreparer;
use crate::schema::LABEL_COLUMN;
use crate::search::{GridSearch, KFold, ParamGrid};
use chrono::Utc;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use spore_domain::config::TrainingConfig;
use std::time::Instant;
use tracing::info;

/// Maps a raw `class` cell to "is poisonous".
///
/// # Errors
/// Returns [`TrainError::Label`] for anything but `p`/`1`/`true` and `e`/`0`/`false`.
pub fn parse_label(raw: &str) -> Result<bool, TrainError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "p" | "1" | "1.0" | "true" | "poisonous" => Ok(true),
        "e" | "0" | "0.0" | "false" | "edible" => Ok(false),
        other => Err(TrainError::Label {
            message: format!("'{other}' is neither poisonous (p) nor edible (e)").into(),
            context: None,
        }),
    }
}

/// Seeded shuffle split; the test part gets `ceil(n * test_size)` rows.
///
/// # Errors
/// Returns [`TrainError::Params`] for a test size outside `[0, 1)` and
/// [`TrainError::EmptyDataset`] when nothing is left to train on.
pub fn train_test_split(
    n: usize,
    test_size: f64,
    seed: u64,
) -> Result<(Vec<usize>, Vec<usize>), TrainError> {
    if !(0.0..1.0).contains(&test_size) {
        return Err(TrainError::Params {
            message: format!("test_size must be in [0, 1), got {test_size}").into(),
            context: None,
        });
    }

    let n_test = (n as f64 * test_size).ceil() as usize;
    if n_test >= n {
        return Err(TrainError::EmptyDataset {
            message: format!("{n} rows leave nothing to train on after the split").into(),
            context: None,
        });
    }

    let mut indices: Vec<usize> = (0..n).collect();
    indices.shuffle(&mut StdRng::seed_from_u64(seed));
    let train = indices.split_off(n_test);
    Ok((train, indices))
}

/// Fits the full pipeline from a raw table.
#[derive(Debug, Clone)]
pub struct ModelTrainer {
    config: TrainingConfig,
    grid: ParamGrid,
}

impl ModelTrainer {
    #[must_use]
    pub fn new(config: TrainingConfig) -> Self {
        Self { config, grid: ParamGrid::default() }
    }

    /// Replaces the grid explored when `search` is enabled.
    #[must_use]
    pub fn with_grid(mut self, grid: ParamGrid) -> Self {
        self.grid = grid;
        self
    }

    #[must_use]
    pub const fn config(&self) -> &TrainingConfig {
        &self.config
    }

    /// Parses `bytes` as CSV and fits on it.
    ///
    /// # Errors
    /// See [`RawFrame::from_csv`] and [`ModelTrainer::fit`].
    pub fn fit_csv(&self, bytes: &[u8]) -> Result<TrainedArtifact, TrainError> {
        let frame = RawFrame::from_csv(bytes)?;
        self.fit(&frame)
    }

    /// Prepares `frame`, splits off the holdout, optionally searches
    /// hyperparameters, and fits the pipeline on the training part.
    ///
    /// # Errors
    /// Every preparation, label, split or fitting failure is returned as is.
    pub fn fit(&self, frame: &RawFrame) -> Result<TrainedArtifact, TrainError> {
        let started = Instant::now();
        let preparer = FeaturePreparer::from_config(&self.config);
        let prepared = preparer.prepare(frame)?;

        let raw_labels = prepared.labels.as_ref().ok_or_else(|| TrainError::MissingColumn {
            message: LABEL_COLUMN.into(),
            context: None,
        })?;
        let labels = raw_labels
            .iter()
            .enumerate()
            .map(|(row, cell)| {
                cell.as_deref()
                    .ok_or_else(|| TrainError::Label {
                        message: "missing label".into(),
                        context: Some(format!("prepared row {row}").into()),
                    })
                    .and_then(parse_label)
            })
            .collect::<Result<Vec<bool>, _>>()?;

        let (train, holdout) =
            train_test_split(prepared.len(), self.config.test_size, self.config.seed)?;
        let train_table = prepared.select(&train);
        let train_labels: Vec<bool> = train.iter().map(|&i| labels[i]).collect();

        let params = if self.config.search {
            let search = GridSearch {
                grid: self.grid.clone(),
                folds: KFold { n_splits: self.config.cv_folds, seed: self.config.seed },
            };
            search.run(&train_table, &train_labels, self.config.seed)?.best
        } else {
            ForestParams {
                n_trees: self.config.n_trees,
                min_samples_split: self.config.min_samples_split,
                max_depth: self.config.max_depth,
                seed: self.config.seed,
            }
        };

        let pipeline = MushroomPipeline::fit(&train_table, &train_labels, &params)?;

        info!(
            rows = frame.rows(),
            prepared = prepared.len(),
            train = train.len(),
            holdout = holdout.len(),
            poisonous = train_labels.iter().filter(|&&p| p).count(),
            features = pipeline.encoder().n_features(),
            trees = params.n_trees,
            elapsed_ms = started.elapsed().as_millis(),
            "Model trained"
        );

        Ok(TrainedArtifact {
            pipeline,
            preparer: preparer.for_inference(),
            trained_at: Utc::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_map_to_poisonous() {
        assert!(parse_label("p").unwrap());
        assert!(parse_label(" TRUE ").unwrap());
        assert!(parse_label("1").unwrap());
        assert!(!parse_label("e").unwrap());
        assert!(!parse_label("0").unwrap());
        assert!(matches!(parse_label("maybe"), Err(TrainError::Label { .. })));
    }

    #[test]
    fn split_sizes_follow_ceil_of_test_fraction() {
        let (train, test) = train_test_split(10, 0.25, 42).unwrap();
        assert_eq!((train.len(), test.len()), (7, 3));

        let mut all: Vec<usize> = train.iter().chain(&test).copied().collect();
        all.sort_unstable();
        assert_eq!(all, (0..10).collect::<Vec<_>>());

        assert_eq!(train_test_split(10, 0.25, 42).unwrap(), (train, test));
    }

    #[test]
    fn split_rejects_degenerate_inputs() {
        assert!(matches!(train_test_split(10, 1.0, 42), Err(TrainError::Params { .. })));
        assert!(matches!(train_test_split(1, 0.5, 42), Err(TrainError::EmptyDataset { .. })));
        let (train, test) = train_test_split(4, 0.0, 42).unwrap();
        assert_eq!((train.len(), test.len()), (4, 0));
    }
}
