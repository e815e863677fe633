//! Merge commands embedded in map keys.
//!
//! A key may end in `(( … ))` holding up to two comma- or space-separated
//! tokens: a merge command and the `secret` marker, in either order.
//!
//! ```rust
//! use strata_config::command::parse_key;
//!
//! let parsed = parse_key("password ((replace, secret))")?;
//! assert_eq!(parsed.key, "password");
//! assert_eq!(parsed.command.as_deref(), Some("replace"));
//! assert!(parsed.secret);
//! # Ok::<_, strata_config::ConfigError>(())
//! ```

use std::fmt;
use std::str::FromStr;

use crate::tree::Kind;
use crate::{ConfigError, StrataResult};

const OPEN: &str = "((";
const CLOSE: &str = "))";
const SECRET: &str = "secret";

/// A map key split into its final key and command suffix.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct KeyCommand {
    /// Key with the command suffix removed.
    pub key: String,
    /// Command keyword, unvalidated.
    pub command: Option<String>,
    /// Whether the `secret` marker was present.
    pub secret: bool,
}

/// A merge command understood by the merge engine.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Command {
    /// Adopt the incoming node.
    Replace,
    /// Retain the existing node.
    Keep,
    /// Reject the incoming node when a value already exists.
    Fail,
    /// Add incoming array items after the existing ones.
    Append,
    /// Add incoming array items before the existing ones.
    Prepend,
    /// Merge map keys recursively.
    Splice,
    /// Discard the whole existing tree.
    Clear,
}

impl Command {
    /// Keyword used in key suffixes.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Replace => "replace",
            Self::Keep => "keep",
            Self::Fail => "fail",
            Self::Append => "append",
            Self::Prepend => "prepend",
            Self::Splice => "splice",
            Self::Clear => "clear",
        }
    }

    /// Whether the command may target a node of `kind`.
    ///
    /// `clear` is only honoured as a top-level key and is never legal on a
    /// node.
    #[must_use]
    pub const fn applies_to(self, kind: Kind) -> bool {
        match self {
            Self::Replace | Self::Keep | Self::Fail => true,
            Self::Append | Self::Prepend => matches!(kind, Kind::Array),
            Self::Splice => matches!(kind, Kind::Map),
            Self::Clear => false,
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Command {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "replace" => Self::Replace,
            "keep" => Self::Keep,
            "fail" => Self::Fail,
            "append" => Self::Append,
            "prepend" => Self::Prepend,
            "splice" => Self::Splice,
            "clear" => Self::Clear,
            other => {
                return Err(ConfigError::invalid_command(
                    other,
                    format!("unknown command `{other}`"),
                ));
            }
        })
    }
}

impl KeyCommand {
    /// Parse the command keyword, if any.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidCommand`] naming `raw_key` when the
    /// keyword is not a known command.
    pub fn parsed_command(&self, raw_key: &str) -> StrataResult<Option<Command>> {
        self.command
            .as_deref()
            .map(|keyword| {
                keyword.parse().map_err(|_| {
                    ConfigError::invalid_command(raw_key, format!("unknown command `{keyword}`"))
                })
            })
            .transpose()
    }

    /// Parse the command and check it is legal for a node of `kind`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidCommand`] for unknown keywords and for
    /// commands that do not apply to `kind`.
    pub fn command_for(&self, raw_key: &str, kind: Kind) -> StrataResult<Option<Command>> {
        let command = self.parsed_command(raw_key)?;
        match command {
            Some(cmd) if !cmd.applies_to(kind) => Err(ConfigError::invalid_command(
                raw_key,
                format!("`{cmd}` cannot be applied to {kind:?} nodes"),
            )),
            _ => Ok(command),
        }
    }
}

fn valid_token(token: &str) -> bool {
    token
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-'))
}

/// Split `raw` into its final key, command and secret marker.
///
/// Keys without a trailing `(( … ))` suffix are returned unchanged. The
/// suffix must close at the end of the key (trailing whitespace allowed);
/// whitespace before the suffix is trimmed from the key.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidCommand`] when the suffix holds more than one
/// command, repeats `secret`, contains characters outside
/// `[A-Za-z0-9 _-]`, or when `((` appears more than once.
pub fn parse_key(raw: &str) -> StrataResult<KeyCommand> {
    let plain = || KeyCommand {
        key: raw.to_owned(),
        command: None,
        secret: false,
    };
    let Some(body) = raw.trim_end().strip_suffix(CLOSE) else {
        return Ok(plain());
    };
    let Some(open) = body.rfind(OPEN) else {
        return Ok(plain());
    };
    let (key, inner) = body.split_at(open);
    let inner = inner.get(OPEN.len()..).unwrap_or_default();
    if key.contains(OPEN) {
        return Err(ConfigError::invalid_command(raw, "nested `((` in key"));
    }

    let mut parsed = KeyCommand {
        key: key.trim_end().to_owned(),
        command: None,
        secret: false,
    };
    for token in inner
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|t| !t.is_empty())
    {
        if !valid_token(token) {
            return Err(ConfigError::invalid_command(
                raw,
                format!("invalid characters in `{token}`"),
            ));
        }
        if token == SECRET {
            if parsed.secret {
                return Err(ConfigError::invalid_command(raw, "`secret` given twice"));
            }
            parsed.secret = true;
        } else if parsed.command.replace(token.to_owned()).is_some() {
            return Err(ConfigError::invalid_command(raw, "more than one command"));
        }
    }
    Ok(parsed)
}

#[cfg(test)]
mod tests;
