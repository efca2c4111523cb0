//! Random forest of CART trees for binary classification.
//!
//! Trees split on Gini impurity, draw a bootstrap sample of the training rows
//! and consider `floor(sqrt(n_features))` candidate features per node.
//! Constant candidates do not count against that budget. Each tree gets its own
//! seed drawn up-front from the forest seed, so training is deterministic even
//! though trees are fitted in parallel.

use crate::error::TrainError;
use ndarray::{Array2, ArrayView1};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

const MIN_IMPURITY_DECREASE: f64 = 1e-12;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ForestParams {
    pub n_trees: usize,
    pub min_samples_split: usize,
    pub max_depth: Option<usize>,
    pub seed: u64,
}

impl Default for ForestParams {
    fn default() -> Self {
        Self { n_trees: 150, min_samples_split: 10, max_depth: None, seed: 42 }
    }
}

impl ForestParams {
    fn validate(&self) -> Result<(), TrainError> {
        if self.n_trees == 0 {
            return Err(TrainError::Params { message: "n_trees must be positive".into(), context: None });
        }
        if self.min_samples_split < 2 {
            return Err(TrainError::Params {
                message: format!("min_samples_split must be at least 2, got {}", self.min_samples_split)
                    .into(),
                context: None,
            });
        }
        if self.max_depth == Some(0) {
            return Err(TrainError::Params { message: "max_depth must be positive".into(), context: None });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
enum Node {
    Leaf { proba: f64 },
    Split { feature: usize, threshold: f64, left: usize, right: usize },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionTree {
    nodes: Vec<Node>,
}

struct TreeBuilder<'a> {
    x: &'a Array2<f64>,
    y: &'a [bool],
    params: &'a ForestParams,
    max_features: usize,
    rng: StdRng,
    nodes: Vec<Node>,
}

fn gini(positives: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let p = positives as f64 / total as f64;
    2.0 * p * (1.0 - p)
}

impl TreeBuilder<'_> {
    fn build(&mut self, rows: Vec<usize>, depth: usize) -> usize {
        let total = rows.len();
        let positives = rows.iter().filter(|&&r| self.y[r]).count();
        let proba = positives as f64 / total as f64;

        let exhausted = self.params.max_depth.is_some_and(|max| depth >= max);
        let split = if total < self.params.min_samples_split
            || positives == 0
            || positives == total
            || exhausted
        {
            None
        } else {
            self.best_split(&rows, positives)
        };

        let Some((feature, threshold)) = split else {
            self.nodes.push(Node::Leaf { proba });
            return self.nodes.len() - 1;
        };

        let (left_rows, right_rows): (Vec<usize>, Vec<usize>) =
            rows.into_iter().partition(|&r| self.x[[r, feature]] <= threshold);

        let id = self.nodes.len();
        self.nodes.push(Node::Leaf { proba });
        let left = self.build(left_rows, depth + 1);
        let right = self.build(right_rows, depth + 1);
        self.nodes[id] = Node::Split { feature, threshold, left, right };
        id
    }

    /// Best (feature, threshold) by weighted Gini, or `None` when nothing improves the node.
    fn best_split(&mut self, rows: &[usize], positives: usize) -> Option<(usize, f64)> {
        let total = rows.len();
        let parent = gini(positives, total);

        let mut features: Vec<usize> = (0..self.x.ncols()).collect();
        features.shuffle(&mut self.rng);

        let mut best: Option<(usize, f64, f64)> = None;
        let mut evaluated = 0;
        let mut column: Vec<(f64, bool)> = Vec::with_capacity(total);

        for feature in features {
            if evaluated >= self.max_features {
                break;
            }

            column.clear();
            column.extend(rows.iter().map(|&r| (self.x[[r, feature]], self.y[r])));
            column.sort_unstable_by(|a, b| a.0.total_cmp(&b.0));

            if column[0].0 >= column[total - 1].0 {
                continue;
            }
            evaluated += 1;

            let mut left_pos = 0;
            for i in 0..total - 1 {
                if column[i].1 {
                    left_pos += 1;
                }
                let (value, next) = (column[i].0, column[i + 1].0);
                if value >= next {
                    continue;
                }

                let left_n = i + 1;
                let right_n = total - left_n;
                let impurity = (left_n as f64 * gini(left_pos, left_n)
                    + right_n as f64 * gini(positives - left_pos, right_n))
                    / total as f64;

                if best.is_none_or(|(_, _, score)| impurity < score) {
                    let mid = value + (next - value) / 2.0;
                    let threshold = if mid < next { mid } else { value };
                    best = Some((feature, threshold, impurity));
                }
            }
        }

        best.filter(|(_, _, impurity)| parent - impurity > MIN_IMPURITY_DECREASE)
            .map(|(feature, threshold, _)| (feature, threshold))
    }
}

impl DecisionTree {
    fn fit(x: &Array2<f64>, y: &[bool], params: &ForestParams, max_features: usize, seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let n = x.nrows();
        let bootstrap: Vec<usize> = (0..n).map(|_| rng.random_range(0..n)).collect();

        let mut builder = TreeBuilder { x, y, params, max_features, rng, nodes: Vec::new() };
        builder.build(bootstrap, 0);
        Self { nodes: builder.nodes }
    }

    /// Fraction of poisonous training samples in the leaf reached by `row`.
    #[must_use]
    pub fn predict_proba_row(&self, row: ArrayView1<'_, f64>) -> f64 {
        let mut id = 0;
        loop {
            match &self.nodes[id] {
                Node::Leaf { proba } => return *proba,
                Node::Split { feature, threshold, left, right } => {
                    id = if row[*feature] <= *threshold { *left } else { *right };
                },
            }
        }
    }

    #[must_use]
    pub fn depth(&self) -> usize {
        fn walk(nodes: &[Node], id: usize) -> usize {
            match &nodes[id] {
                Node::Leaf { .. } => 0,
                Node::Split { left, right, .. } => 1 + walk(nodes, *left).max(walk(nodes, *right)),
            }
        }
        walk(&self.nodes, 0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RandomForest {
    trees: Vec<DecisionTree>,
    n_features: usize,
    params: ForestParams,
}

impl RandomForest {
    /// Fits `params.n_trees` trees on `x`/`y`.
    ///
    /// # Errors
    /// * [`TrainError::EmptyDataset`] for zero rows.
    /// * [`TrainError::Params`] for invalid hyperparameters.
    /// * [`TrainError::Internal`] when `x` and `y` disagree in length.
    pub fn fit(x: &Array2<f64>, y: &[bool], params: &ForestParams) -> Result<Self, TrainError> {
        params.validate()?;
        if x.nrows() == 0 || x.ncols() == 0 {
            return Err(TrainError::EmptyDataset {
                message: format!("cannot fit a forest on a {}x{} matrix", x.nrows(), x.ncols()).into(),
                context: None,
            });
        }
        if x.nrows() != y.len() {
            return Err(format!("{} feature rows but {} labels", x.nrows(), y.len()).into());
        }

        let max_features = (x.ncols() as f64).sqrt().floor().max(1.0) as usize;
        let mut master = StdRng::seed_from_u64(params.seed);
        let seeds: Vec<u64> = (0..params.n_trees).map(|_| master.random()).collect();

        let trees: Vec<DecisionTree> = seeds
            .into_par_iter()
            .map(|seed| DecisionTree::fit(x, y, params, max_features, seed))
            .collect();

        debug!(
            trees = trees.len(),
            rows = x.nrows(),
            features = x.ncols(),
            max_features,
            max_depth = trees.iter().map(DecisionTree::depth).max().unwrap_or_default(),
            "Random forest fitted"
        );

        Ok(Self { trees, n_features: x.ncols(), params: *params })
    }

    /// Mean of the per-tree leaf probabilities for every row.
    #[must_use]
    pub fn predict_proba(&self, x: &Array2<f64>) -> Vec<f64> {
        let n_trees = self.trees.len() as f64;
        x.outer_iter()
            .map(|row| self.trees.iter().map(|t| t.predict_proba_row(row)).sum::<f64>() / n_trees)
            .collect()
    }

    /// Poisonous when the mean probability is strictly above one half.
    #[must_use]
    pub fn predict(&self, x: &Array2<f64>) -> Vec<bool> {
        self.predict_proba(x).into_iter().map(|p| p > 0.5).collect()
    }

    #[must_use]
    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    #[must_use]
    pub const fn n_features(&self) -> usize {
        self.n_features
    }

    #[must_use]
    pub const fn params(&self) -> &ForestParams {
        &self.params
    }
}
