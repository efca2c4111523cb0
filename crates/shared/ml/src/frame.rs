//! A small column-oriented table for raw mushroom data.
//!
//! Continuous columns are parsed into numbers when the table is built; every
//! other column stays text. Empty cells (and the usual `NA`/`NaN` spellings)
//! are missing values.

use crate::error::{TrainError, TrainErrorExt};
use crate::schema::{CAP_DIAMETER, CONTINUOUS_COLUMNS, CategoricalFeature, STEM_HEIGHT, STEM_WIDTH};
use csv::{ReaderBuilder, Trim};
use spore_domain::mushroom::MushroomRecord;

#[derive(Debug, Clone, PartialEq)]
pub enum ColumnValues {
    Text(Vec<Option<String>>),
    Number(Vec<Option<f64>>),
}

impl ColumnValues {
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Text(values) => values.len(),
            Self::Number(values) => values.len(),
        }
    }

    #[must_use]
    pub fn is_missing(&self, row: usize) -> bool {
        match self {
            Self::Text(values) => values[row].is_none(),
            Self::Number(values) => values[row].is_none(),
        }
    }

    fn non_missing(&self) -> usize {
        match self {
            Self::Text(values) => values.iter().filter(|v| v.is_some()).count(),
            Self::Number(values) => values.iter().filter(|v| v.is_some()).count(),
        }
    }

    fn select(&self, rows: &[usize]) -> Self {
        match self {
            Self::Text(values) => Self::Text(rows.iter().map(|&r| values[r].clone()).collect()),
            Self::Number(values) => Self::Number(rows.iter().map(|&r| values[r]).collect()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub values: ColumnValues,
}

impl Column {
    /// Fraction of non-missing cells; an empty column counts as complete.
    #[must_use]
    pub fn completeness(&self) -> f64 {
        let len = self.values.len();
        if len == 0 { 1.0 } else { self.values.non_missing() as f64 / len as f64 }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawFrame {
    columns: Vec<Column>,
    rows: usize,
}

fn is_missing_token(cell: &str) -> bool {
    cell.is_empty() || matches!(cell, "NA" | "N/A" | "NaN" | "nan" | "null" | "None")
}

/// Semicolon-separated exports of the dataset are common; anything else is comma.
fn sniff_delimiter(bytes: &[u8]) -> u8 {
    let header = bytes.split(|b| *b == b'\n').next().unwrap_or_default();
    let count = |needle: u8| header.iter().filter(|b| **b == needle).count();
    if count(b';') > count(b',') { b';' } else { b',' }
}

impl RawFrame {
    /// Parses a CSV table with a header row.
    ///
    /// # Errors
    /// Returns [`TrainError::Csv`] for malformed CSV and [`TrainError::Parse`]
    /// for a non-numeric continuous cell, naming the line and column.
    pub fn from_csv(bytes: &[u8]) -> Result<Self, TrainError> {
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .trim(Trim::All)
            .delimiter(sniff_delimiter(bytes))
            .from_reader(bytes);

        let headers = reader.headers().context("Reading CSV header")?.clone();
        let mut columns: Vec<Column> = headers
            .iter()
            .map(|name| Column {
                name: name.to_owned(),
                values: if CONTINUOUS_COLUMNS.contains(&name) {
                    ColumnValues::Number(Vec::new())
                } else {
                    ColumnValues::Text(Vec::new())
                },
            })
            .collect();

        let mut rows = 0;
        for record in reader.records() {
            let record = record.context("Reading CSV record")?;
            let line = record.position().map_or(rows + 2, |p| p.line() as usize);

            for (column, cell) in columns.iter_mut().zip(record.iter()) {
                let cell = if is_missing_token(cell) { None } else { Some(cell) };
                match &mut column.values {
                    ColumnValues::Text(values) => values.push(cell.map(ToOwned::to_owned)),
                    ColumnValues::Number(values) => {
                        let parsed = cell
                            .map(|c| {
                                c.parse::<f64>().map_err(|_| TrainError::Parse {
                                    message: format!(
                                        "line {line}, column '{}': '{c}' is not a number",
                                        column.name
                                    )
                                    .into(),
                                    context: None,
                                })
                            })
                            .transpose()?;
                        values.push(parsed.filter(|v| !v.is_nan()));
                    },
                }
            }
            rows += 1;
        }

        Ok(Self { columns, rows })
    }

    /// Builds a table from validated records, in the same layout as the CSV.
    #[must_use]
    pub fn from_records(records: &[MushroomRecord]) -> Self {
        let mut columns: Vec<Column> = CategoricalFeature::ALL
            .iter()
            .map(|feature| Column {
                name: feature.column().to_owned(),
                values: ColumnValues::Text(
                    records.iter().map(|r| Some(feature.code_of(r).to_owned())).collect(),
                ),
            })
            .collect();

        let numeric: [(&str, fn(&MushroomRecord) -> f64); 3] = [
            (CAP_DIAMETER, |r| r.cap_diameter),
            (STEM_HEIGHT, |r| r.stem_height),
            (STEM_WIDTH, |r| r.stem_width),
        ];
        columns.extend(numeric.iter().map(|(name, get)| Column {
            name: (*name).to_owned(),
            values: ColumnValues::Number(records.iter().map(|r| Some(get(r))).collect()),
        }));

        Self { columns, rows: records.len() }
    }

    #[must_use]
    pub const fn rows(&self) -> usize {
        self.rows
    }

    #[must_use]
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    #[must_use]
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Looks a column up, failing with [`TrainError::MissingColumn`].
    ///
    /// # Errors
    /// See above.
    pub fn require(&self, name: &str) -> Result<&Column, TrainError> {
        self.column(name)
            .ok_or_else(|| TrainError::MissingColumn { message: name.to_owned().into(), context: None })
    }

    /// Keeps only the given rows, in the given order.
    #[must_use]
    pub fn select_rows(&self, rows: &[usize]) -> Self {
        Self {
            columns: self
                .columns
                .iter()
                .map(|c| Column { name: c.name.clone(), values: c.values.select(rows) })
                .collect(),
            rows: rows.len(),
        }
    }

    /// Removes a column if present; returns whether it existed.
    pub fn drop_column(&mut self, name: &str) -> bool {
        let before = self.columns.len();
        self.columns.retain(|c| c.name != name);
        before != self.columns.len()
    }

    /// Drops every column whose completeness is below `threshold`, returning their names.
    pub fn drop_incomplete(&mut self, threshold: f64) -> Vec<String> {
        let (kept, dropped): (Vec<_>, Vec<_>) =
            std::mem::take(&mut self.columns).into_iter().partition(|c| c.completeness() >= threshold);
        self.columns = kept;
        dropped.into_iter().map(|c| c.name).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CSV: &str = "\
id,class,cap-diameter,cap-shape,stem-height,stem-width
0,p,15.26,x,16.95,17.09
1,e,,f,4.1,5.0
2,p,3.5,,NA,8.0
";

    #[test]
    fn parses_typed_columns_and_missing_cells() {
        let frame = RawFrame::from_csv(CSV.as_bytes()).unwrap();
        assert_eq!(frame.rows(), 3);

        let diameter = frame.require("cap-diameter").unwrap();
        assert_eq!(diameter.values, ColumnValues::Number(vec![Some(15.26), None, Some(3.5)]));

        let shape = frame.require("cap-shape").unwrap();
        assert!(shape.values.is_missing(2));
        assert!((shape.completeness() - 2.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn non_numeric_continuous_cell_names_line_and_column() {
        let csv = "cap-diameter,stem-height,stem-width\n1.0,2.0,3.0\nbig,2.0,3.0\n";
        let err = RawFrame::from_csv(csv.as_bytes()).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("line 3"), "{message}");
        assert!(message.contains("cap-diameter"), "{message}");
    }

    #[test]
    fn semicolon_tables_are_detected() {
        let csv = "class;cap-diameter;cap-shape\np;15.26;x\n";
        let frame = RawFrame::from_csv(csv.as_bytes()).unwrap();
        assert_eq!(frame.columns().len(), 3);
        assert_eq!(frame.rows(), 1);
    }

    #[test]
    fn select_and_drop_columns() {
        let mut frame = RawFrame::from_csv(CSV.as_bytes()).unwrap();
        let picked = frame.select_rows(&[2, 0]);
        assert_eq!(picked.rows(), 2);
        let ids = picked.require("id").unwrap();
        assert_eq!(ids.values, ColumnValues::Text(vec![Some("2".into()), Some("0".into())]));

        assert!(frame.drop_column("id"));
        assert!(!frame.drop_column("id"));
        assert!(matches!(frame.require("id"), Err(TrainError::MissingColumn { .. })));
    }
}
