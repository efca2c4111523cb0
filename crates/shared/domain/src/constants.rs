//! Shared constants: OpenAPI tags and physical bounds of the dataset.

pub const SYSTEM_TAG: &str = "System";
pub const PREDICTION_TAG: &str = "Prediction";
pub const TRAINING_TAG: &str = "Training";

/// Upper bound of the cap diameter in centimetres.
pub const CAP_DIAMETER_MAX: f64 = 58.4;
/// Upper bound of the stem height in centimetres.
pub const STEM_HEIGHT_MAX: f64 = 27.3;
/// Upper bound of the stem width in millimetres.
pub const STEM_WIDTH_MAX: f64 = 66.3;

pub const DEFAULT_MODEL_FILE: &str = "mushrooms_model.bin";
pub const DEFAULT_CONFIG_FILE: &str = "server";
pub const ENV_PREFIX: &str = "SPORE";
