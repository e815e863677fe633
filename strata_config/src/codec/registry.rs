//! Extension-keyed lookup of decoders and encoders.

use std::collections::BTreeMap;
use std::sync::Arc;

use parking_lot::RwLock;
use serde_json::Value;
use tracing::{debug, warn};

use super::{DecodeContext, Decoder, Encoder, Json, Properties};
use crate::{ConfigError, Object, StrataResult};

#[derive(Default)]
struct Codecs {
    decoders: BTreeMap<String, Arc<dyn Decoder>>,
    encoders: BTreeMap<String, Arc<dyn Encoder>>,
}

/// Thread-safe table of codecs keyed by lower-cased file extension.
///
/// Lookups take a shared lock; registration takes the exclusive lock, so a
/// registry may be shared across threads behind an [`Arc`].
///
/// # Examples
///
/// ```
/// use serde_json::json;
/// use strata_config::codec::{CodecRegistry, DecodeContext};
///
/// let registry = CodecRegistry::with_defaults();
/// let tree = registry.decode("JSON", &DecodeContext::new("app.json"), br#"{"a": 1}"#)?;
/// assert_eq!(tree.to_raw(), json!({"a": 1}));
/// # Ok::<_, strata_config::ConfigError>(())
/// ```
#[derive(Default)]
pub struct CodecRegistry {
    codecs: RwLock<Codecs>,
}

fn normalise(extension: &str) -> String {
    extension.trim_start_matches('.').to_ascii_lowercase()
}

impl CodecRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry holding the built-in codecs.
    ///
    /// Decoders: `json`, `properties`, `toml` (feature `toml`) and
    /// `yaml`/`yml` (feature `yaml`). Encoders: `json`, `properties` and
    /// `toml` (feature `toml`).
    #[must_use]
    pub fn with_defaults() -> Self {
        let registry = Self::new();
        registry.register_decoder("json", Json);
        registry.register_encoder("json", Json);
        registry.register_decoder("properties", Properties);
        registry.register_encoder("properties", Properties);
        #[cfg(feature = "toml")]
        {
            registry.register_decoder("toml", super::Toml);
            registry.register_encoder("toml", super::Toml);
        }
        #[cfg(feature = "yaml")]
        {
            registry.register_decoder("yaml", super::Yaml);
            registry.register_decoder("yml", super::Yaml);
        }
        registry
    }

    /// Register `decoder` for `extension`, replacing any previous entry.
    pub fn register_decoder(&self, extension: &str, decoder: impl Decoder + 'static) {
        let extension = normalise(extension);
        debug!(%extension, "registering decoder");
        let previous = self
            .codecs
            .write()
            .decoders
            .insert(extension.clone(), Arc::new(decoder));
        if previous.is_some() {
            warn!(%extension, "replaced existing decoder");
        }
    }

    /// Register `encoder` for `extension`, replacing any previous entry.
    pub fn register_encoder(&self, extension: &str, encoder: impl Encoder + 'static) {
        let extension = normalise(extension);
        debug!(%extension, "registering encoder");
        let previous = self
            .codecs
            .write()
            .encoders
            .insert(extension.clone(), Arc::new(encoder));
        if previous.is_some() {
            warn!(%extension, "replaced existing encoder");
        }
    }

    /// Remove the decoder for `extension`, returning whether one existed.
    pub fn remove_decoder(&self, extension: &str) -> bool {
        self.codecs
            .write()
            .decoders
            .remove(&normalise(extension))
            .is_some()
    }

    /// Remove the encoder for `extension`, returning whether one existed.
    pub fn remove_encoder(&self, extension: &str) -> bool {
        self.codecs
            .write()
            .encoders
            .remove(&normalise(extension))
            .is_some()
    }

    /// Extensions with a registered decoder, in sorted order.
    #[must_use]
    pub fn decoder_extensions(&self) -> Vec<String> {
        self.codecs.read().decoders.keys().cloned().collect()
    }

    /// Extensions with a registered encoder, in sorted order.
    #[must_use]
    pub fn encoder_extensions(&self) -> Vec<String> {
        self.codecs.read().encoders.keys().cloned().collect()
    }

    fn decoder(&self, extension: &str) -> StrataResult<Arc<dyn Decoder>> {
        let extension = normalise(extension);
        self.codecs
            .read()
            .decoders
            .get(&extension)
            .cloned()
            .ok_or(ConfigError::UnknownFormat { extension })
    }

    fn encoder(&self, extension: &str) -> StrataResult<Arc<dyn Encoder>> {
        let extension = normalise(extension);
        self.codecs
            .read()
            .encoders
            .get(&extension)
            .cloned()
            .ok_or(ConfigError::UnknownFormat { extension })
    }

    /// Decode `bytes` with the decoder registered for `extension`.
    ///
    /// The lock is released before decoding starts.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnknownFormat`] when no decoder is registered,
    /// otherwise whatever the decoder reports.
    pub fn decode(
        &self,
        extension: &str,
        ctx: &DecodeContext<'_>,
        bytes: &[u8],
    ) -> StrataResult<Object> {
        self.decoder(extension)?.decode(ctx, bytes)
    }

    /// Encode a native value with the encoder registered for `extension`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnknownFormat`] when no encoder is registered,
    /// otherwise whatever the encoder reports.
    pub fn encode(&self, extension: &str, value: &Value) -> StrataResult<Vec<u8>> {
        self.encoder(extension)?.encode(value)
    }

    /// Encode a tree, with provenance where the format supports it.
    ///
    /// # Errors
    ///
    /// See [`CodecRegistry::encode`].
    pub fn encode_extended(&self, extension: &str, tree: &Object) -> StrataResult<Vec<u8>> {
        self.encoder(extension)?.encode_extended(tree)
    }
}

impl std::fmt::Debug for CodecRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let codecs = self.codecs.read();
        f.debug_struct("CodecRegistry")
            .field("decoders", &codecs.decoders.keys().collect::<Vec<_>>())
            .field("encoders", &codecs.encoders.keys().collect::<Vec<_>>())
            .finish()
    }
}
