//! Convenience constructors for `ConfigError`.

use super::ConfigError;

impl ConfigError {
    /// Construct an [`ConfigError::InvalidCommand`].
    ///
    /// # Examples
    ///
    /// ```
    /// use strata_config::ConfigError;
    /// let e = ConfigError::invalid_command("foo((x))", "unknown command `x`");
    /// assert!(matches!(e, ConfigError::InvalidCommand { .. }));
    /// ```
    #[must_use]
    pub fn invalid_command(key: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidCommand {
            key: key.into(),
            reason: reason.into(),
        }
    }

    /// Construct a [`ConfigError::Conflict`] for `path`.
    #[must_use]
    pub fn conflict(path: impl Into<String>) -> Self {
        Self::Conflict { path: path.into() }
    }

    /// Construct a [`ConfigError::NotFound`] for `path`.
    #[must_use]
    pub fn not_found(path: impl Into<String>) -> Self {
        Self::NotFound { path: path.into() }
    }

    /// Construct a [`ConfigError::Decode`] from any boxed error source.
    ///
    /// # Examples
    ///
    /// ```
    /// use strata_config::ConfigError;
    /// let e = ConfigError::decode("app.json", "unexpected end of input");
    /// assert!(e.to_string().contains("app.json"));
    /// ```
    #[must_use]
    pub fn decode(
        file: impl Into<String>,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Self::Decode {
            file: file.into(),
            source: source.into(),
        }
    }

    /// Construct a [`ConfigError::Encode`] from any boxed error source.
    #[must_use]
    pub fn encode(
        format: impl Into<String>,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Self::Encode {
            format: format.into(),
            source: source.into(),
        }
    }

    /// Returns `true` for the path traversal failures raised by `fetch` and
    /// `add`.
    #[must_use]
    pub const fn is_path_error(&self) -> bool {
        matches!(
            self,
            Self::NotFound { .. } | Self::ArrayOutOfBounds { .. } | Self::InvalidIndex { .. }
        )
    }
}
