//! Configuration layers and how each one becomes a tree.

use std::sync::Arc;

use camino::{Utf8Path, Utf8PathBuf};
use serde_json::Value;
use tracing::debug;

use crate::codec::{CodecRegistry, DecodeContext, EnvSource};
use crate::result_ext::IoResultExt;
use crate::{ConfigError, Object, Origin, StrataResult};

/// Provenance of a configuration layer.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[non_exhaustive]
pub enum LayerProvenance {
    /// Built-in default values.
    Defaults,
    /// Values decoded from a file or an in-memory document.
    File,
    /// Values collected from environment variables.
    Environment,
    /// Values supplied directly by the application.
    Programmatic,
}

#[derive(Clone, Debug)]
enum Source {
    Tree(Object),
    Raw { value: Value, label: String },
    Bytes { filename: String, bytes: Arc<[u8]> },
    File { path: Utf8PathBuf, optional: bool },
    Environment(EnvSource),
}

/// One source of configuration, merged in order by
/// [`ConfigBuilder`](crate::ConfigBuilder).
///
/// Files and environment variables are read when the layer is loaded, not
/// when it is constructed.
#[derive(Clone, Debug)]
pub struct Layer {
    provenance: LayerProvenance,
    source: Source,
}

impl Layer {
    /// Defaults supplied as a native value, labelled `defaults`.
    #[must_use]
    pub const fn defaults(value: Value) -> Self {
        Self {
            provenance: LayerProvenance::Defaults,
            source: Source::Raw {
                value,
                label: String::new(),
            },
        }
    }

    /// A native value whose nodes record `label` as their origin.
    #[must_use]
    pub fn value(value: Value, label: impl Into<String>) -> Self {
        Self {
            provenance: LayerProvenance::Programmatic,
            source: Source::Raw {
                value,
                label: label.into(),
            },
        }
    }

    /// A tree that already carries its own origins.
    #[must_use]
    pub const fn tree(tree: Object) -> Self {
        Self {
            provenance: LayerProvenance::Programmatic,
            source: Source::Tree(tree),
        }
    }

    /// An in-memory document decoded by the codec for `filename`'s extension.
    #[must_use]
    pub fn bytes(filename: impl Into<String>, bytes: impl Into<Arc<[u8]>>) -> Self {
        Self {
            provenance: LayerProvenance::File,
            source: Source::Bytes {
                filename: filename.into(),
                bytes: bytes.into(),
            },
        }
    }

    /// A file that must exist.
    #[must_use]
    pub fn file(path: impl Into<Utf8PathBuf>) -> Self {
        Self {
            provenance: LayerProvenance::File,
            source: Source::File {
                path: path.into(),
                optional: false,
            },
        }
    }

    /// A file that is skipped when it does not exist.
    #[must_use]
    pub fn optional_file(path: impl Into<Utf8PathBuf>) -> Self {
        Self {
            provenance: LayerProvenance::File,
            source: Source::File {
                path: path.into(),
                optional: true,
            },
        }
    }

    /// Environment variables selected by `env`.
    #[must_use]
    pub const fn environment(env: EnvSource) -> Self {
        Self {
            provenance: LayerProvenance::Environment,
            source: Source::Environment(env),
        }
    }

    /// Returns the provenance of the layer.
    #[must_use]
    pub const fn provenance(&self) -> LayerProvenance {
        self.provenance
    }

    /// Returns the path if this layer is read from disk.
    #[must_use]
    pub fn path(&self) -> Option<&Utf8Path> {
        match &self.source {
            Source::File { path, .. } => Some(path),
            _ => None,
        }
    }

    /// Short description used in logs.
    #[must_use]
    pub fn describe(&self) -> String {
        match &self.source {
            Source::Tree(_) => "tree".to_owned(),
            Source::Raw { label, .. } if label.is_empty() => "defaults".to_owned(),
            Source::Raw { label, .. } => label.clone(),
            Source::Bytes { filename, .. } => filename.clone(),
            Source::File { path, .. } => path.to_string(),
            Source::Environment(_) => "environment".to_owned(),
        }
    }

    /// Produce the layer's tree.
    ///
    /// Returns `Ok(None)` for an optional file that does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::File`] when a file cannot be read,
    /// [`ConfigError::UnknownFormat`] when no decoder matches its extension and
    /// any error raised by the decoder or environment source.
    pub fn load(&self, registry: &CodecRegistry, delimiter: &str) -> StrataResult<Option<Object>> {
        match &self.source {
            Source::Tree(tree) => Ok(Some(tree.clone())),
            Source::Raw { value, .. } => {
                let origin = Origin::new(self.describe());
                Ok(Some(Object::from_raw(value.clone(), &[origin])))
            }
            Source::Bytes { filename, bytes } => {
                decode(registry, filename, extension_of(filename)?, bytes, delimiter).map(Some)
            }
            Source::File { path, optional } => {
                let bytes = match std::fs::read(path) {
                    Err(err) if *optional && err.kind() == std::io::ErrorKind::NotFound => {
                        debug!(%path, "optional configuration file not found");
                        return Ok(None);
                    }
                    other => other.for_file(path)?,
                };
                decode(registry, path.as_str(), extension_of(path.as_str())?, &bytes, delimiter)
                    .map(Some)
            }
            Source::Environment(env) => env.read().map(Some),
        }
    }
}

fn extension_of(filename: &str) -> StrataResult<&str> {
    Utf8Path::new(filename)
        .extension()
        .ok_or_else(|| ConfigError::UnknownFormat {
            extension: String::new(),
        })
}

fn decode(
    registry: &CodecRegistry,
    filename: &str,
    extension: &str,
    bytes: &[u8],
    delimiter: &str,
) -> StrataResult<Object> {
    let ctx = DecodeContext::new(filename).with_delimiter(delimiter);
    registry.decode(extension, &ctx, bytes)
}
