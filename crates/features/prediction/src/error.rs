use spore_ml::TrainError;
use std::borrow::Cow;

/// A specialized [`PredictionError`] enum of this crate.
#[spore_derive::spore_error]
pub enum PredictionError {
    /// No artifact has been trained or loaded yet.
    #[error("Model is not trained yet{}: {message}", format_context(.context))]
    NotTrained { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// The records could not be turned into model features.
    #[error("Feature preparation failed{}: {source}", format_context(.context))]
    Prepare { source: TrainError, context: Option<Cow<'static, str>> },

    /// Internal fallback for unexpected issues or logic errors.
    #[error("Internal prediction error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

#[cfg(feature = "server")]
impl From<PredictionError> for spore_kernel::server::ApiError {
    fn from(err: PredictionError) -> Self {
        Self::from(err.to_string())
    }
}
