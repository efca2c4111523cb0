//! # Domain Models
//!
//! Pure data for the mushroom classifier: configuration sections, the closed
//! single-letter code sets of the dataset, and the HTTP payloads.
//! Keep it lean: no I/O, networking, or model logic, just data and validation.

pub mod api;
pub mod config;
pub mod constants;
pub mod error;
pub mod mushroom;
pub mod registry;

pub use error::{DomainError, DomainErrorExt};
