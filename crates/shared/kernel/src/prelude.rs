pub use crate::config::load_config;
pub use spore_domain::config::ApiConfig;

#[cfg(feature = "server")]
pub use crate::server::{ApiError, ApiState, ModelSlot, ValidJson, ValidQuery};
