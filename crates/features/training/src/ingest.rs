//! Turns an uploaded file into the bytes of one CSV table.

use crate::error::{TrainingError, TrainingErrorExt};
use bytes::Bytes;
use std::io::{Cursor, Read};
use std::path::Path;
use tracing::debug;

/// Upload formats accepted by `/fit/`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadKind {
    Csv,
    Zip,
}

impl UploadKind {
    /// Classifies an upload by its (case-insensitive) extension.
    ///
    /// # Errors
    /// Returns [`TrainingError::UnsupportedExtension`] for anything but `.csv` and `.zip`.
    pub fn from_file_name(name: &str) -> Result<Self, TrainingError> {
        let extension = Path::new(name)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase);

        match extension.as_deref() {
            Some("csv") => Ok(Self::Csv),
            Some("zip") => Ok(Self::Zip),
            _ => Err(TrainingError::UnsupportedExtension {
                message: format!("'{name}', only .csv or .zip containing a .csv are accepted").into(),
                context: None,
            }),
        }
    }
}

/// Returns the CSV table carried by an upload.
///
/// A CSV passes through untouched. For a ZIP the first entry (in archive
/// order) whose name ends in `.csv`, ignoring case, is decompressed;
/// `Ok(None)` when there is none.
///
/// # Errors
/// Returns [`TrainingError::Zip`] / [`TrainingError::Io`] for unreadable archives.
pub fn extract_table(kind: UploadKind, bytes: Bytes) -> Result<Option<Bytes>, TrainingError> {
    match kind {
        UploadKind::Csv => Ok(Some(bytes)),
        UploadKind::Zip => {
            let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).context("Opening archive")?;
            for index in 0..archive.len() {
                let mut entry = archive.by_index(index).context("Reading archive entry")?;
                if !entry.is_file() || !entry.name().to_ascii_lowercase().ends_with(".csv") {
                    continue;
                }

                let mut table = Vec::new();
                entry.read_to_end(&mut table).context(format!("Decompressing '{}'", entry.name()))?;
                debug!(entry = entry.name(), bytes = table.len(), "Extracted CSV from archive");
                return Ok(Some(Bytes::from(table)));
            }
            Ok(None)
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_follow_the_extension() {
        assert_eq!(UploadKind::from_file_name("train.csv").unwrap(), UploadKind::Csv);
        assert_eq!(UploadKind::from_file_name("TRAIN.ZIP").unwrap(), UploadKind::Zip);
        assert_eq!(UploadKind::from_file_name("a.b.data.zip").unwrap(), UploadKind::Zip);
        assert!(matches!(
            UploadKind::from_file_name("train.xlsx"),
            Err(TrainingError::UnsupportedExtension { .. })
        ));
        assert!(UploadKind::from_file_name("csv").is_err());
    }

    #[test]
    fn csv_passes_through() {
        let bytes = Bytes::from_static(b"a,b\n1,2\n");
        assert_eq!(extract_table(UploadKind::Csv, bytes.clone()).unwrap(), Some(bytes));
    }

    #[test]
    fn garbage_is_not_an_archive() {
        let result = extract_table(UploadKind::Zip, Bytes::from_static(b"not a zip"));
        assert!(matches!(result, Err(TrainingError::Zip { .. })));
    }
}
