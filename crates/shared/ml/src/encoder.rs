//! Column transformer: min-max scaled area followed by one-hot blocks.

use crate::preparer::PreparedTable;
use crate::schema::CategoricalFeature;
use ndarray::Array2;
use serde::{Deserialize, Serialize};

/// Fitted encoder. Feature layout is `[area, block(cap-shape), block(cap-surface), ...]`,
/// each block listing the categories seen during fitting in sorted order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureEncoder {
    area_min: f64,
    area_scale: f64,
    categories: Vec<Vec<String>>,
}

impl FeatureEncoder {
    /// Learns the area range and the category vocabulary of every column.
    #[must_use]
    pub fn fit(table: &PreparedTable) -> Self {
        let (min, max) = table
            .area
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)));
        let (area_min, range) = if table.is_empty() { (0.0, 0.0) } else { (min, max - min) };
        // A constant column is shifted but not scaled.
        let area_scale = if range > 0.0 { 1.0 / range } else { 1.0 };

        let categories = (0..CategoricalFeature::ALL.len())
            .map(|slot| {
                let mut seen: Vec<String> =
                    table.categories.iter().map(|row| row[slot].to_owned()).collect();
                seen.sort_unstable();
                seen.dedup();
                seen
            })
            .collect();

        Self { area_min, area_scale, categories }
    }

    #[must_use]
    pub fn n_features(&self) -> usize {
        1 + self.categories.iter().map(Vec::len).sum::<usize>()
    }

    /// Categories learned for `feature`, in encoding order.
    #[must_use]
    pub fn categories(&self, feature: CategoricalFeature) -> &[String] {
        &self.categories[feature.slot()]
    }

    /// Encodes a prepared table. Categories never seen in training yield an all-zero block.
    #[must_use]
    pub fn transform(&self, table: &PreparedTable) -> Array2<f64> {
        let mut matrix = Array2::<f64>::zeros((table.len(), self.n_features()));

        for (row, mut out) in matrix.rows_mut().into_iter().enumerate() {
            out[0] = (table.area[row] - self.area_min) * self.area_scale;

            let mut offset = 1;
            for (slot, vocabulary) in self.categories.iter().enumerate() {
                let value = table.categories[row][slot];
                if let Ok(hit) = vocabulary.binary_search_by(|c| c.as_str().cmp(value)) {
                    out[offset + hit] = 1.0;
                }
                offset += vocabulary.len();
            }
        }

        matrix
    }
}
