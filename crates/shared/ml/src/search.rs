//! Hyperparameter selection: shuffled k-fold cross-validation scored by binary F1.

use crate::error::TrainError;
use crate::forest::ForestParams;
use crate::pipeline::MushroomPipeline;
use crate::preparer::PreparedTable;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rayon::prelude::*;
use tracing::info;

/// Binary F1 with `true` (poisonous) as the positive class; 0 when undefined.
#[must_use]
pub fn f1_score(truth: &[bool], predicted: &[bool]) -> f64 {
    let (mut tp, mut fp, mut fn_) = (0usize, 0usize, 0usize);
    for (&t, &p) in truth.iter().zip(predicted) {
        match (t, p) {
            (true, true) => tp += 1,
            (false, true) => fp += 1,
            (true, false) => fn_ += 1,
            (false, false) => {},
        }
    }
    let denominator = 2 * tp + fp + fn_;
    if denominator == 0 { 0.0 } else { (2 * tp) as f64 / denominator as f64 }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KFold {
    pub n_splits: usize,
    pub seed: u64,
}

impl KFold {
    /// Shuffled `(train, test)` index pairs; the first `n % k` folds get one extra row.
    ///
    /// # Errors
    /// Returns [`TrainError::Params`] when `n_splits < 2` or exceeds the number of rows.
    pub fn split(&self, n: usize) -> Result<Vec<(Vec<usize>, Vec<usize>)>, TrainError> {
        if self.n_splits < 2 || self.n_splits > n {
            return Err(TrainError::Params {
                message: format!("cannot make {} folds out of {n} rows", self.n_splits).into(),
                context: None,
            });
        }

        let mut indices: Vec<usize> = (0..n).collect();
        indices.shuffle(&mut StdRng::seed_from_u64(self.seed));

        let base = n / self.n_splits;
        let extra = n % self.n_splits;
        let mut start = 0;

        Ok((0..self.n_splits)
            .map(|fold| {
                let size = base + usize::from(fold < extra);
                let test = indices[start..start + size].to_vec();
                let train = indices[..start].iter().chain(&indices[start + size..]).copied().collect();
                start += size;
                (train, test)
            })
            .collect())
    }
}

/// Candidate grid; every combination is evaluated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamGrid {
    pub n_trees: Vec<usize>,
    pub min_samples_split: Vec<usize>,
    pub max_depth: Vec<Option<usize>>,
}

impl Default for ParamGrid {
    fn default() -> Self {
        Self {
            n_trees: vec![50, 150],
            min_samples_split: vec![2, 10],
            max_depth: vec![None, Some(20)],
        }
    }
}

impl ParamGrid {
    #[must_use]
    pub fn candidates(&self, seed: u64) -> Vec<ForestParams> {
        let mut out = Vec::new();
        for &n_trees in &self.n_trees {
            for &min_samples_split in &self.min_samples_split {
                for &max_depth in &self.max_depth {
                    out.push(ForestParams { n_trees, min_samples_split, max_depth, seed });
                }
            }
        }
        out
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SearchOutcome {
    pub best: ForestParams,
    pub best_score: f64,
    /// Mean F1 of every candidate, in grid order.
    pub scores: Vec<(ForestParams, f64)>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridSearch {
    pub grid: ParamGrid,
    pub folds: KFold,
}

impl GridSearch {
    /// Cross-validates the whole pipeline (encoder + forest) for every candidate.
    ///
    /// Ties keep the earliest candidate in grid order.
    ///
    /// # Errors
    /// Propagates fold construction and fitting errors.
    pub fn run(
        &self,
        table: &PreparedTable,
        labels: &[bool],
        seed: u64,
    ) -> Result<SearchOutcome, TrainError> {
        let folds = self.folds.split(table.len())?;
        let candidates = self.grid.candidates(seed);
        if candidates.is_empty() {
            return Err(TrainError::Params { message: "empty parameter grid".into(), context: None });
        }

        let scores = candidates
            .par_iter()
            .map(|params| {
                let mut total = 0.0;
                for (train, test) in &folds {
                    let train_labels: Vec<bool> = train.iter().map(|&i| labels[i]).collect();
                    let test_labels: Vec<bool> = test.iter().map(|&i| labels[i]).collect();
                    let pipeline =
                        MushroomPipeline::fit(&table.select(train), &train_labels, params)?;
                    total += f1_score(&test_labels, &pipeline.predict(&table.select(test)));
                }
                Ok((*params, total / folds.len() as f64))
            })
            .collect::<Result<Vec<_>, TrainError>>()?;

        let (best, best_score) = scores
            .iter()
            .copied()
            .reduce(|best, next| if next.1 > best.1 { next } else { best })
            .ok_or("grid search produced no scores")?;

        info!(
            n_trees = best.n_trees,
            min_samples_split = best.min_samples_split,
            max_depth = ?best.max_depth,
            f1 = best_score,
            candidates = scores.len(),
            "Selected hyperparameters"
        );

        Ok(SearchOutcome { best, best_score, scores })
    }
}
