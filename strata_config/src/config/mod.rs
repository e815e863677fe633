//! The assembled configuration and the builder that produces it.

mod builder;

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::Value;

pub use builder::ConfigBuilder;

use crate::codec::CodecRegistry;
use crate::result_ext::JsonResultExt;
use crate::{Object, Origin, StrataResult, merge, resolve_commands};

/// Final configuration tree plus the settings used to query and render it.
#[derive(Clone, Debug)]
pub struct Config {
    tree: Object,
    delimiter: String,
    registry: Arc<CodecRegistry>,
}

impl Config {
    /// Start a [`ConfigBuilder`].
    #[must_use]
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::new()
    }

    pub(crate) const fn from_parts(
        tree: Object,
        delimiter: String,
        registry: Arc<CodecRegistry>,
    ) -> Self {
        Self {
            tree,
            delimiter,
            registry,
        }
    }

    /// The merged tree, secrets included.
    #[must_use]
    pub const fn tree(&self) -> &Object {
        &self.tree
    }

    /// Consume the configuration, returning the merged tree.
    #[must_use]
    pub fn into_tree(self) -> Object {
        self.tree
    }

    /// Delimiter used by [`Config::fetch`] and [`Config::set`].
    #[must_use]
    pub fn delimiter(&self) -> &str {
        &self.delimiter
    }

    /// Look up the node at `path`.
    ///
    /// # Errors
    ///
    /// See [`Object::fetch`].
    pub fn fetch(&self, path: &str) -> StrataResult<&Object> {
        self.tree.fetch(path, &self.delimiter)
    }

    /// Deserialise the subtree at `path` into `T`. An empty path selects the
    /// whole tree.
    ///
    /// # Errors
    ///
    /// Returns a path error when `path` does not exist and
    /// [`ConfigError::Unmarshal`](crate::ConfigError::Unmarshal) when the
    /// subtree does not match `T`.
    pub fn unmarshal<T: DeserializeOwned>(&self, path: &str) -> StrataResult<T> {
        let node = self.fetch(path)?;
        serde_json::from_value(node.to_raw()).unmarshal_at(path)
    }

    /// Merge `tree` on top of the current configuration.
    ///
    /// The configuration is unchanged when the merge fails.
    ///
    /// # Errors
    ///
    /// See [`merge`](crate::merge()).
    pub fn apply(&mut self, tree: Object) -> StrataResult<()> {
        self.tree = merge(self.tree.clone(), tree)?.convert_maps_to_arrays();
        Ok(())
    }

    /// Insert `value` at `key`, replacing whatever was there.
    ///
    /// New nodes record `Origin { file: "set" }`. Command suffixes inside
    /// `value` are resolved, so `{"token((secret))": "…"}` stores a secret.
    ///
    /// # Errors
    ///
    /// Returns a path error when `key` cannot be reached and the resolver's
    /// errors for malformed keys in `value`.
    pub fn set(&mut self, key: &str, value: Value) -> StrataResult<()> {
        let mut next = self.tree.clone();
        next.add(&self.delimiter, key, value, &[Origin::new("set")])?;
        self.tree = resolve_commands(next)?;
        Ok(())
    }

    /// The tree with every secret node replaced by
    /// [`REDACTED`](crate::REDACTED).
    #[must_use]
    pub fn redacted(&self) -> Object {
        self.tree.redacted()
    }

    /// Render the redacted tree with the encoder for `extension`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnknownFormat`](crate::ConfigError::UnknownFormat)
    /// when no encoder is registered, otherwise the encoder's error.
    pub fn encode(&self, extension: &str) -> StrataResult<Vec<u8>> {
        self.registry.encode(extension, &self.redacted().to_raw())
    }

    /// Render the redacted tree including provenance, where the format
    /// supports it.
    ///
    /// # Errors
    ///
    /// See [`Config::encode`].
    pub fn encode_extended(&self, extension: &str) -> StrataResult<Vec<u8>> {
        self.registry.encode_extended(extension, &self.redacted())
    }
}

#[cfg(test)]
mod tests;
