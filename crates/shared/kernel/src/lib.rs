//! Kernel utilities shared across slices.
//! Keep this crate lightweight: config loading, the application state with its
//! model slot, the HTTP error type and validating extractors.
//!
//! ## Config loading
//! ```rust,no_run
//! use spore_kernel::config::load_config;
//! use spore_kernel::domain::config::ApiConfig;
//!
//! let cfg: ApiConfig = load_config::<ApiConfig>(None::<&str>).unwrap();
//! assert_eq!(cfg.server.port, 8000);
//! ```
pub mod config;
pub mod prelude;
#[cfg(feature = "server")]
pub mod server;

pub use spore_domain as domain;
