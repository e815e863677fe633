//! Extensions for mapping external errors to `StrataResult` concisely.
//!
//! These helpers replace repeated `.map_err(|e| ConfigError::…)` closures when
//! I/O and `serde_json` failures cross into the crate's error type.
//!
//! # Examples
//!
//! ```
//! use camino::Utf8Path;
//! use strata_config::{ConfigError, IoResultExt};
//!
//! let path = Utf8Path::new("/definitely/missing/app.toml");
//! let err = std::fs::read(path).for_file(path).expect_err("file is missing");
//! assert!(matches!(err, ConfigError::File { .. }));
//! ```

use camino::Utf8Path;

use crate::{ConfigError, StrataResult};

/// Attach a file path to I/O failures.
pub trait IoResultExt<T> {
    /// Convert `Result<T, io::Error>` into `StrataResult<T>` as a
    /// [`ConfigError::File`] naming `path`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::File`] when the input is `Err`.
    fn for_file(self, path: &Utf8Path) -> StrataResult<T>;
}

impl<T> IoResultExt<T> for Result<T, std::io::Error> {
    fn for_file(self, path: &Utf8Path) -> StrataResult<T> {
        self.map_err(|source| ConfigError::File {
            path: path.to_owned(),
            source,
        })
    }
}

/// Classify `serde_json` failures.
pub trait JsonResultExt<T> {
    /// Report a failed deserialisation of the subtree at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Unmarshal`] when the input is `Err`.
    fn unmarshal_at(self, path: &str) -> StrataResult<T>;

    /// Report malformed JSON read from `file`, including the error position.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Decode`] when the input is `Err`.
    fn decode_in(self, file: &str) -> StrataResult<T>;
}

impl<T> JsonResultExt<T> for Result<T, serde_json::Error> {
    fn unmarshal_at(self, path: &str) -> StrataResult<T> {
        self.map_err(|source| ConfigError::Unmarshal {
            path: path.to_owned(),
            source,
        })
    }

    fn decode_in(self, file: &str) -> StrataResult<T> {
        self.map_err(|err| ConfigError::decode(file, err))
    }
}
