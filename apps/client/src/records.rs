//! Reading mushroom records from disk and shaping them for the wire.

use crate::error::{ClientError, ClientErrorExt};
use serde::Deserialize;
use spore_domain::api::MushroomsBatch;
use spore_domain::mushroom::MushroomRecord;
use std::path::Path;

/// Accepted layouts of a records file.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RecordsFile {
    Batch(MushroomsBatch),
    Many(Vec<MushroomRecord>),
    One(MushroomRecord),
}

/// Parses a single object, a list, or a `{"mushrooms": [...]}` batch body.
///
/// # Errors
/// Returns [`ClientError::Json`] when the text matches none of the layouts.
pub fn parse_records(text: &str) -> Result<Vec<MushroomRecord>, ClientError> {
    let file: RecordsFile = serde_json::from_str(text).context("Parsing mushroom records")?;
    Ok(match file {
        RecordsFile::Batch(batch) => batch.mushrooms,
        RecordsFile::Many(records) => records,
        RecordsFile::One(record) => vec![record],
    })
}

/// # Errors
/// I/O and parse failures.
pub async fn read_records(path: &Path) -> Result<Vec<MushroomRecord>, ClientError> {
    let text = tokio::fs::read_to_string(path)
        .await
        .context(format!("Reading {}", path.display()))?;
    parse_records(&text).context(path.display().to_string())
}

/// Like [`read_records`], but insists on exactly one record.
///
/// # Errors
/// Returns [`ClientError::Input`] when the file holds zero or several records.
pub async fn read_record(path: &Path) -> Result<MushroomRecord, ClientError> {
    let mut records = read_records(path).await?;
    let n = records.len();
    match (records.pop(), n) {
        (Some(record), 1) => Ok(record),
        _ => Err(ClientError::Input {
            message: format!("expected one mushroom, found {n}").into(),
            context: Some(path.display().to_string().into()),
        }),
    }
}

/// Column-wise query pairs: every field repeated once per record, records in order.
#[must_use]
pub fn column_query(records: &[MushroomRecord]) -> Vec<(&'static str, String)> {
    let mut pairs = Vec::with_capacity(records.len() * 14);
    for r in records {
        pairs.extend([
            ("cap_shape", r.cap_shape.code().to_owned()),
            ("cap_surface", r.cap_surface.code().to_owned()),
            ("cap_color", r.cap_color.code().to_owned()),
            ("does_bruise_or_bleed", r.does_bruise_or_bleed.code().to_owned()),
            ("gill_attachment", r.gill_attachment.code().to_owned()),
            ("gill_color", r.gill_color.code().to_owned()),
            ("stem_color", r.stem_color.code().to_owned()),
            ("has_ring", r.has_ring.code().to_owned()),
            ("ring_type", r.ring_type.code().to_owned()),
            ("habitat", r.habitat.code().to_owned()),
            ("season", r.season.code().to_owned()),
            ("cap_diameter", r.cap_diameter.to_string()),
            ("stem_height", r.stem_height.to_string()),
            ("stem_width", r.stem_width.to_string()),
        ]);
    }
    pairs
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record() -> serde_json::Value {
        json!({
            "cap_shape": "x", "cap_surface": "g", "cap_color": "o",
            "does_bruise_or_bleed": "f", "gill_attachment": "e", "gill_color": "w",
            "stem_color": "w", "has_ring": "t", "ring_type": "g", "habitat": "d",
            "season": "a", "cap_diameter": 15.0, "stem_height": 16.0, "stem_width": 17.0
        })
    }

    #[test]
    fn every_layout_is_accepted() {
        let one = record().to_string();
        let many = json!([record(), record()]).to_string();
        let batch = json!({ "mushrooms": [record(), record(), record()] }).to_string();

        assert_eq!(parse_records(&one).unwrap().len(), 1);
        assert_eq!(parse_records(&many).unwrap().len(), 2);
        assert_eq!(parse_records(&batch).unwrap().len(), 3);
    }

    #[test]
    fn unknown_codes_do_not_parse() {
        let mut bad = record();
        bad["cap_shape"] = json!("z");
        assert!(matches!(parse_records(&bad.to_string()), Err(ClientError::Json { .. })));
    }

    #[test]
    fn query_repeats_each_field_per_record() {
        let records = parse_records(&json!([record(), record()]).to_string()).unwrap();
        let pairs = column_query(&records);

        assert_eq!(pairs.len(), 28);
        let shapes: Vec<&str> =
            pairs.iter().filter(|(k, _)| *k == "cap_shape").map(|(_, v)| v.as_str()).collect();
        assert_eq!(shapes, ["x", "x"]);
        assert!(pairs.contains(&("stem_width", "17".to_owned())));
    }

    #[tokio::test]
    async fn read_record_wants_exactly_one() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("two.json");
        std::fs::write(&path, json!([record(), record()]).to_string()).unwrap();

        assert!(matches!(read_record(&path).await, Err(ClientError::Input { .. })));
        assert_eq!(read_records(&path).await.unwrap().len(), 2);
    }
}
