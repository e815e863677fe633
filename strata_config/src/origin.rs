//! Provenance records attached to tree nodes.

use std::fmt;

/// Where a configuration value came from.
///
/// A line or column of `0` means the position is unknown; an empty file name
/// means the source itself is unknown.
#[derive(Clone, Debug, Default, Eq, Hash, PartialEq)]
pub struct Origin {
    /// File name or source label (for example `env:PORT`).
    pub file: String,
    /// 1-based line, or `0` when unknown.
    pub line: usize,
    /// 1-based column, or `0` when unknown.
    pub col: usize,
}

impl Origin {
    /// Origin naming only a source, without a position.
    #[must_use]
    pub fn new(file: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            line: 0,
            col: 0,
        }
    }

    /// Origin naming a position within `file`.
    #[must_use]
    pub fn at(file: impl Into<String>, line: usize, col: usize) -> Self {
        Self {
            file: file.into(),
            line,
            col,
        }
    }

    /// Returns `true` when neither the source nor the position is known.
    #[must_use]
    pub const fn is_unknown(&self) -> bool {
        self.file.is_empty() && self.line == 0 && self.col == 0
    }
}

impl fmt::Display for Origin {
    /// Renders `file`, `file:line` or `file:line:col` depending on what is known.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let file = if self.file.is_empty() {
            "<unknown>"
        } else {
            self.file.as_str()
        };
        match (self.line, self.col) {
            (0, _) => f.write_str(file),
            (line, 0) => write!(f, "{file}:{line}"),
            (line, col) => write!(f, "{file}:{line}:{col}"),
        }
    }
}
