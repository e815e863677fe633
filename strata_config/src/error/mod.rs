//! Error types produced while building and merging configuration trees.

mod constructors;
mod types;

pub use types::ConfigError;

/// Result alias used throughout the crate.
pub type StrataResult<T> = Result<T, ConfigError>;
