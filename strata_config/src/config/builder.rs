//! Layer composition for [`Config`].

use std::fmt;
use std::sync::Arc;

use camino::Utf8PathBuf;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use super::Config;
use crate::codec::{CodecRegistry, EnvSource};
use crate::{ConfigError, Expansion, Layer, Object, StrataResult, merge};

type Lookup = Arc<dyn Fn(&str) -> Option<String> + Send + Sync>;

/// Builder that accumulates [`Layer`]s in priority order and folds them into
/// a [`Config`].
///
/// Later layers win. Each layer's keys may carry merge commands, so a later
/// layer can prepend to a list or refuse to override a value.
///
/// ```rust
/// use serde_json::json;
/// use strata_config::ConfigBuilder;
///
/// let mut builder = ConfigBuilder::new();
/// builder.push_value(json!({"hosts": ["a"], "port": 80}), "defaults");
/// builder.push_bytes("site.json", br#"{"hosts((prepend))": ["z"], "port": 8080}"#.as_slice());
/// let config = builder.build()?;
/// assert_eq!(config.fetch("hosts")?.to_raw(), json!(["z", "a"]));
/// assert_eq!(config.unmarshal::<u16>("port")?, 8080);
/// # Ok::<_, strata_config::ConfigError>(())
/// ```
pub struct ConfigBuilder {
    layers: Vec<Layer>,
    delimiter: String,
    registry: Arc<CodecRegistry>,
    expansion: Option<(Expansion, Lookup)>,
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self {
            layers: Vec::new(),
            delimiter: ".".to_owned(),
            registry: Arc::new(CodecRegistry::with_defaults()),
            expansion: None,
        }
    }
}

impl ConfigBuilder {
    /// Create a builder with the `.` delimiter and the built-in codecs.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the delimiter used for flat keys and path lookups.
    pub fn delimiter(&mut self, delimiter: impl Into<String>) -> &mut Self {
        self.delimiter = delimiter.into();
        self
    }

    /// Decode files with `registry` instead of the built-in codecs.
    pub fn registry(&mut self, registry: Arc<CodecRegistry>) -> &mut Self {
        self.registry = registry;
        self
    }

    /// Expand placeholders in the merged tree using `lookup`.
    pub fn expand<F>(&mut self, expansion: Expansion, lookup: F) -> &mut Self
    where
        F: Fn(&str) -> Option<String> + Send + Sync + 'static,
    {
        self.expansion = Some((expansion, Arc::new(lookup)));
        self
    }

    /// Expand placeholders from the process environment.
    pub fn expand_env(&mut self, expansion: Expansion) -> &mut Self {
        self.expand(expansion, |name| std::env::var(name).ok())
    }

    /// Push a defaults layer from any serialisable value.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NonSerializable`] when serde cannot represent
    /// `defaults`.
    pub fn push_defaults<T: Serialize + ?Sized>(
        &mut self,
        defaults: &T,
    ) -> StrataResult<&mut Self> {
        let value = serde_json::to_value(defaults).map_err(|e| ConfigError::NonSerializable {
            reason: e.to_string(),
        })?;
        Ok(self.push_layer(Layer::defaults(value)))
    }

    /// Push a native value whose nodes record `label` as their origin.
    pub fn push_value(&mut self, value: Value, label: impl Into<String>) -> &mut Self {
        self.push_layer(Layer::value(value, label))
    }

    /// Push a prebuilt tree.
    pub fn push_tree(&mut self, tree: Object) -> &mut Self {
        self.push_layer(Layer::tree(tree))
    }

    /// Push an in-memory document; the codec is chosen by `filename`'s
    /// extension.
    pub fn push_bytes(
        &mut self,
        filename: impl Into<String>,
        bytes: impl Into<Arc<[u8]>>,
    ) -> &mut Self {
        self.push_layer(Layer::bytes(filename, bytes))
    }

    /// Push a file that must exist.
    pub fn push_file(&mut self, path: impl Into<Utf8PathBuf>) -> &mut Self {
        self.push_layer(Layer::file(path))
    }

    /// Push a file that is skipped when missing.
    pub fn push_optional_file(&mut self, path: impl Into<Utf8PathBuf>) -> &mut Self {
        self.push_layer(Layer::optional_file(path))
    }

    /// Push an environment layer.
    pub fn push_environment(&mut self, env: EnvSource) -> &mut Self {
        self.push_layer(Layer::environment(env))
    }

    /// Push an arbitrary layer.
    pub fn push_layer(&mut self, layer: Layer) -> &mut Self {
        self.layers.push(layer);
        self
    }

    /// The layers pushed so far, lowest priority first.
    #[must_use]
    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    /// Load every layer and merge them in order.
    ///
    /// Positional maps in the merged tree become arrays, then the expansion
    /// pass runs if one was configured.
    ///
    /// # Errors
    ///
    /// Returns the first error raised while loading or merging a layer, or
    /// while expanding placeholders.
    pub fn build(&self) -> StrataResult<Config> {
        let mut tree = Object::default();
        for layer in &self.layers {
            let Some(next) = layer.load(&self.registry, &self.delimiter)? else {
                continue;
            };
            debug!(
                provenance = ?layer.provenance(),
                source = %layer.describe(),
                "merging configuration layer"
            );
            tree = merge(tree, next)?;
        }
        let mut tree = tree.convert_maps_to_arrays();
        if let Some((expansion, lookup)) = &self.expansion {
            tree = tree.to_expanded(expansion, |name| lookup(name))?;
        }
        Ok(Config::from_parts(
            tree,
            self.delimiter.clone(),
            Arc::clone(&self.registry),
        ))
    }
}

impl fmt::Debug for ConfigBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfigBuilder")
            .field("layers", &self.layers)
            .field("delimiter", &self.delimiter)
            .field("expansion", &self.expansion.as_ref().map(|(exp, _)| exp))
            .finish_non_exhaustive()
    }
}
