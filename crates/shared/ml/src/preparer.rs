//! Deterministic raw-table → model-ready table transformation.
//!
//! Step order is fixed:
//! 1. drop rows missing any continuous attribute,
//! 2. down-sample to `max_rows` with a seeded RNG when larger (training only),
//! 3. drop `id`,
//! 4. drop columns below the completeness threshold,
//! 5. collapse every categorical column to its allow-list plus sentinel,
//! 6. compute `mushroom_area` and drop the raw continuous columns.

use crate::error::TrainError;
use crate::frame::{ColumnValues, RawFrame};
use crate::schema::{CONTINUOUS_COLUMNS, CategoricalFeature, ID_COLUMN, LABEL_COLUMN};
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use spore_domain::config::TrainingConfig;
use std::f64::consts::PI;
use tracing::debug;

/// Output of [`FeaturePreparer::prepare`]: the static schema, row-aligned.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PreparedTable {
    /// One entry per row, ordered as [`CategoricalFeature::ALL`].
    pub categories: Vec<[&'static str; 11]>,
    pub area: Vec<f64>,
    /// Raw `class` cells, present only when the input carried a label column.
    pub labels: Option<Vec<Option<String>>>,
}

impl PreparedTable {
    #[must_use]
    pub fn len(&self) -> usize {
        self.area.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.area.is_empty()
    }

    /// Keeps only the given rows, in the given order.
    #[must_use]
    pub fn select(&self, rows: &[usize]) -> Self {
        Self {
            categories: rows.iter().map(|&r| self.categories[r]).collect(),
            area: rows.iter().map(|&r| self.area[r]).collect(),
            labels: self.labels.as_ref().map(|l| rows.iter().map(|&r| l[r].clone()).collect()),
        }
    }
}

/// `π·(d/2)² + h·w`, rounded to two decimals.
#[must_use]
pub fn mushroom_area(cap_diameter: f64, stem_height: f64, stem_width: f64) -> f64 {
    let area = PI * (cap_diameter / 2.0).powi(2) + stem_height * stem_width;
    (area * 100.0).round() / 100.0
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeaturePreparer {
    completeness_threshold: f64,
    /// `None` disables down-sampling, which inference relies on to keep N rows in, N rows out.
    max_rows: Option<usize>,
    seed: u64,
}

impl Default for FeaturePreparer {
    fn default() -> Self {
        Self::from_config(&TrainingConfig::default())
    }
}

impl FeaturePreparer {
    #[must_use]
    pub const fn new(completeness_threshold: f64, max_rows: Option<usize>, seed: u64) -> Self {
        Self { completeness_threshold, max_rows, seed }
    }

    #[must_use]
    pub const fn from_config(config: &TrainingConfig) -> Self {
        Self::new(config.completeness_threshold, Some(config.max_rows), config.seed)
    }

    /// Same transform without down-sampling.
    #[must_use]
    pub const fn for_inference(self) -> Self {
        Self { max_rows: None, ..self }
    }

    /// Runs the preparation steps on `frame`.
    ///
    /// # Errors
    /// * [`TrainError::MissingColumn`] when a continuous or categorical column is absent
    ///   (never supplied, or removed by the completeness filter).
    /// * [`TrainError::EmptyDataset`] when no row survives the continuous-attribute filter.
    pub fn prepare(&self, frame: &RawFrame) -> Result<PreparedTable, TrainError> {
        for name in CONTINUOUS_COLUMNS {
            frame.require(name)?;
        }

        let complete_rows: Vec<usize> = (0..frame.rows())
            .filter(|&row| {
                CONTINUOUS_COLUMNS
                    .iter()
                    .filter_map(|name| frame.column(name))
                    .all(|c| !c.values.is_missing(row))
            })
            .collect();
        if complete_rows.is_empty() {
            return Err(TrainError::EmptyDataset {
                message: format!(
                    "no row has all of {} ({} rows read)",
                    CONTINUOUS_COLUMNS.join(", "),
                    frame.rows()
                )
                .into(),
                context: None,
            });
        }

        let rows = self.sample(complete_rows);
        let mut frame = frame.select_rows(&rows);

        frame.drop_column(ID_COLUMN);
        let dropped = frame.drop_incomplete(self.completeness_threshold);
        if !dropped.is_empty() {
            debug!(?dropped, threshold = self.completeness_threshold, "Dropped incomplete columns");
        }

        let mut categories = vec![[""; 11]; frame.rows()];
        for (slot, feature) in CategoricalFeature::ALL.iter().enumerate() {
            let column = frame.require(feature.column())?;
            for (row, cells) in categories.iter_mut().enumerate() {
                cells[slot] = match &column.values {
                    ColumnValues::Text(values) => feature.collapse(values[row].as_deref()),
                    ColumnValues::Number(_) => feature.sentinel(),
                };
            }
        }

        let [diameter, height, width] = CONTINUOUS_COLUMNS.map(|name| numbers(&frame, name));
        let (diameter, height, width) = (diameter?, height?, width?);
        let area = (0..frame.rows())
            .map(|row| {
                mushroom_area(
                    diameter[row].unwrap_or_default(),
                    height[row].unwrap_or_default(),
                    width[row].unwrap_or_default(),
                )
            })
            .collect();

        let labels = frame.column(LABEL_COLUMN).map(|c| match &c.values {
            ColumnValues::Text(values) => values.clone(),
            ColumnValues::Number(values) => values.iter().map(|v| v.map(|n| n.to_string())).collect(),
        });

        Ok(PreparedTable { categories, area, labels })
    }

    fn sample(&self, rows: Vec<usize>) -> Vec<usize> {
        match self.max_rows {
            Some(max) if rows.len() > max => {
                let mut rng = StdRng::seed_from_u64(self.seed);
                let mut picked = rand::seq::index::sample(&mut rng, rows.len(), max).into_vec();
                picked.sort_unstable();
                debug!(from = rows.len(), to = max, seed = self.seed, "Down-sampled dataset");
                picked.into_iter().map(|i| rows[i]).collect()
            },
            _ => rows,
        }
    }
}

fn numbers<'a>(frame: &'a RawFrame, name: &str) -> Result<&'a [Option<f64>], TrainError> {
    match &frame.require(name)?.values {
        ColumnValues::Number(values) => Ok(values),
        ColumnValues::Text(_) => {
            Err(TrainError::Parse { message: format!("column '{name}' is not numeric").into(), context: None })
        },
    }
}
