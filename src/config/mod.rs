//! Configuration module
//!
//! Loading and validation of scorer configuration files: attackable lines,
//! risk window, end-of-episode bonus and per-event rewards.

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{ConfigFormat, ConfigLimits, ConfigLoader, LoadResult, LoadWarning};
pub use schema::*;
pub use validation::{ValidationResult, Validator};
