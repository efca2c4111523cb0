//! HTTP plumbing shared by every slice.

mod error;
mod extract;
mod health;
mod model;
pub mod router;
mod state;

pub use error::{ApiError, ApiErrorExt};
pub use extract::{ValidJson, ValidQuery};
pub use health::HealthResponse;
pub use model::ModelSlot;
pub use state::{ApiState, ApiStateBuilder, ApiStateError, ApiStateInner};
