//! Decoders and encoders that move configuration trees in and out of bytes.
//!
//! Codecs are looked up by file extension through a [`CodecRegistry`]. The
//! built-in set covers JSON, TOML (feature `toml`), YAML (feature `yaml`) and
//! Java-style properties files. Environment variables are read by
//! [`EnvSource`], which produces a tree directly.

mod env;
mod json;
mod properties;
mod registry;
#[cfg(feature = "toml")]
mod toml;
#[cfg(feature = "yaml")]
mod yaml;

use serde_json::Value;

use crate::{ConfigError, Object, Origin, StrataResult};

pub use env::EnvSource;
pub use json::Json;
pub use properties::Properties;
pub use registry::CodecRegistry;
#[cfg(feature = "toml")]
pub use self::toml::Toml;
#[cfg(feature = "yaml")]
pub use yaml::Yaml;

/// Information about the source being decoded.
#[derive(Clone, Copy, Debug)]
pub struct DecodeContext<'a> {
    /// File name recorded in every origin of the decoded tree.
    pub filename: &'a str,
    /// Delimiter splitting dotted keys, for formats with flat keys.
    pub key_delimiter: &'a str,
}

impl<'a> DecodeContext<'a> {
    /// Context for `filename` with the default `.` delimiter.
    #[must_use]
    pub const fn new(filename: &'a str) -> Self {
        Self {
            filename,
            key_delimiter: ".",
        }
    }

    /// Override the key delimiter.
    #[must_use]
    pub const fn with_delimiter(mut self, key_delimiter: &'a str) -> Self {
        self.key_delimiter = key_delimiter;
        self
    }

    /// Origin naming the whole file.
    #[must_use]
    pub fn origin(&self) -> Origin {
        Origin::new(self.filename)
    }
}

/// Turns the bytes of one source into an origin-annotated tree.
pub trait Decoder: Send + Sync {
    /// Decode `bytes`. Empty input yields an empty tree.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Decode`] when the input is malformed.
    fn decode(&self, ctx: &DecodeContext<'_>, bytes: &[u8]) -> StrataResult<Object>;
}

/// Renders native values or trees to bytes.
pub trait Encoder: Send + Sync {
    /// Format name used in error messages.
    fn format(&self) -> &'static str;

    /// Encode a native value.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Encode`] when the value cannot be represented.
    fn encode(&self, value: &Value) -> StrataResult<Vec<u8>>;

    /// Encode a tree, optionally including provenance. The default renders
    /// [`Object::to_raw`] through [`Encoder::encode`].
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Encode`] when the tree cannot be represented.
    fn encode_extended(&self, tree: &Object) -> StrataResult<Vec<u8>> {
        self.encode(&tree.to_raw())
    }
}

/// Interpret decoder input as UTF-8, returning `None` for blank input.
pub(crate) fn text<'a>(ctx: &DecodeContext<'_>, bytes: &'a [u8]) -> StrataResult<Option<&'a str>> {
    let text =
        std::str::from_utf8(bytes).map_err(|err| ConfigError::decode(ctx.filename, err))?;
    Ok((!text.trim().is_empty()).then_some(text))
}

/// Build a tree from a decoded document, requiring a mapping at the root.
pub(crate) fn document(ctx: &DecodeContext<'_>, value: Value) -> StrataResult<Object> {
    if !value.is_object() {
        return Err(ConfigError::decode(
            ctx.filename,
            "expected a mapping at the document root",
        ));
    }
    Ok(Object::from_raw(value, &[ctx.origin()]))
}
