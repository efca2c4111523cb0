use spore_ml::{ArtifactStoreError, TrainError};
use std::borrow::Cow;

/// A specialized [`TrainingError`] enum of this crate.
#[spore_derive::spore_error]
pub enum TrainingError {
    /// Upload whose extension is neither `.csv` nor `.zip`.
    #[error("Unsupported file extension{}: {message}", format_context(.context))]
    UnsupportedExtension { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// Archive that does not contain a `.csv` entry.
    #[error("No CSV table in archive{}: {message}", format_context(.context))]
    NoTable { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Archive error{}: {source}", format_context(.context))]
    Zip { source: zip::result::ZipError, context: Option<Cow<'static, str>> },

    #[error("I/O error{}: {source}", format_context(.context))]
    Io { source: std::io::Error, context: Option<Cow<'static, str>> },

    #[error("Training failed{}: {source}", format_context(.context))]
    Train { source: TrainError, context: Option<Cow<'static, str>> },

    #[error("Model persistence failed{}: {source}", format_context(.context))]
    Store { source: ArtifactStoreError, context: Option<Cow<'static, str>> },

    /// Internal fallback for unexpected issues or logic errors.
    #[error("Internal training error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

#[cfg(feature = "server")]
impl From<TrainingError> for spore_kernel::server::ApiError {
    fn from(err: TrainingError) -> Self {
        match err {
            TrainingError::UnsupportedExtension { .. } | TrainingError::NoTable { .. } => {
                Self::bad_request(err.to_string())
            },
            other => Self::from(other.to_string()),
        }
    }
}
