//! Primary error enum for tree, merge and codec operations.

use thiserror::Error;

/// Errors that can occur while assembling configuration.
///
/// Variants are matched by category; the payloads carry the offending key or
/// path for diagnostics.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// Malformed command syntax in a map key, or a command that is not legal
    /// for the node it targets.
    #[error("invalid command in key '{key}': {reason}")]
    InvalidCommand {
        /// Raw key (or resolved path) carrying the command.
        key: String,
        /// Human-readable explanation of the failure.
        reason: String,
    },

    /// A `fail` command met an existing value.
    #[error("conflicting value at '{path}': existing value is marked fail")]
    Conflict {
        /// Path of the node that already held a value.
        path: String,
    },

    /// Two keys in one map resolved to the same final key.
    #[error("duplicate key '{key}' in map at '{path}'")]
    DuplicateKey {
        /// Path of the map holding the duplicate.
        path: String,
        /// Resolved key that appeared more than once.
        key: String,
    },

    /// A path segment named a map key that does not exist.
    #[error("no value found at '{path}'")]
    NotFound {
        /// Path that could not be resolved.
        path: String,
    },

    /// An array index was outside the permitted range.
    #[error("index {index} is out of bounds for array at '{path}' (length {len})")]
    ArrayOutOfBounds {
        /// Path of the array that was indexed.
        path: String,
        /// Requested index.
        index: usize,
        /// Length of the array at the time of the lookup.
        len: usize,
    },

    /// A path segment addressing an array was not a valid index.
    #[error("invalid array index '{segment}' at '{path}'")]
    InvalidIndex {
        /// Path of the array that was indexed.
        path: String,
        /// Segment that failed to parse.
        segment: String,
    },

    /// Placeholder expansion kept producing substitutions past the depth bound.
    #[error("placeholder expansion at '{path}' exceeded {depth} rounds")]
    RecursionTooDeep {
        /// Path of the value being expanded.
        path: String,
        /// Configured depth bound.
        depth: usize,
    },

    /// A value could not be represented as a configuration tree.
    #[error("value cannot be serialised into a configuration tree: {reason}")]
    NonSerializable {
        /// Explanation reported by the serialiser.
        reason: String,
    },

    /// No codec is registered for the requested extension.
    #[error("no codec registered for format '{extension}'")]
    UnknownFormat {
        /// Lower-cased extension that was looked up.
        extension: String,
    },

    /// A decoder rejected its input.
    #[error("failed to decode '{file}': {source}")]
    Decode {
        /// File name (or source label) passed to the decoder.
        file: String,
        /// Underlying decoder error.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// An encoder failed to render a tree.
    #[error("failed to encode as '{format}': {source}")]
    Encode {
        /// Format extension of the encoder.
        format: String,
        /// Underlying encoder error.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Reading a configuration file failed.
    #[error("configuration file error in '{path}': {source}")]
    File {
        /// Path that triggered the failure.
        path: camino::Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The tree at `path` could not be deserialised into the requested type.
    #[error("failed to unmarshal '{path}': {source}")]
    Unmarshal {
        /// Path of the subtree being unmarshalled; empty for the root.
        path: String,
        /// Underlying deserialisation error.
        #[source]
        source: serde_json::Error,
    },
}
