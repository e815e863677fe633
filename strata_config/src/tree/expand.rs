//! Placeholder expansion and redaction passes.

use super::{Node, Object, Scalar, child_path};
use crate::{ConfigError, Origin, StrataResult};

/// Literal written in place of secret nodes by [`Object::redacted`].
pub const REDACTED: &str = "REDACTED";

/// Settings for [`Object::to_expanded`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Expansion {
    /// Maximum number of substitution rounds applied to a single value.
    pub max_depth: usize,
    /// Source label recorded as an extra origin on every changed value.
    pub origin_label: String,
    /// Token opening a placeholder.
    pub start: String,
    /// Token closing a placeholder.
    pub end: String,
}

impl Default for Expansion {
    fn default() -> Self {
        Self {
            max_depth: 10,
            origin_label: "expanded".to_owned(),
            start: "${{".to_owned(),
            end: "}}".to_owned(),
        }
    }
}

impl Expansion {
    /// Run one left-to-right substitution round over `text`.
    ///
    /// Unknown placeholders and an unterminated start token are kept verbatim.
    fn substitute_once<F>(&self, text: &str, lookup: &F) -> Option<String>
    where
        F: Fn(&str) -> Option<String>,
    {
        if self.start.is_empty() || self.end.is_empty() {
            return None;
        }
        let mut out = String::with_capacity(text.len());
        let mut rest = text;
        let mut changed = false;
        while let Some(open) = rest.find(&self.start) {
            let (before, tail) = rest.split_at(open);
            out.push_str(before);
            let body = tail.get(self.start.len()..).unwrap_or_default();
            let Some(close) = body.find(&self.end) else {
                out.push_str(tail);
                rest = "";
                break;
            };
            let (name, after) = body.split_at(close);
            let after = after.get(self.end.len()..).unwrap_or_default();
            if let Some(replacement) = lookup(name.trim()) {
                out.push_str(&replacement);
                changed = true;
            } else {
                out.push_str(&self.start);
                out.push_str(name);
                out.push_str(&self.end);
            }
            rest = after;
        }
        out.push_str(rest);
        changed.then_some(out)
    }

    /// Substitute until a fixpoint, allowing at most `max_depth` rounds.
    ///
    /// Returns `None` when nothing changed.
    fn expand_str<F>(&self, text: &str, path: &str, lookup: &F) -> StrataResult<Option<String>>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut current: Option<String> = None;
        for _ in 0..self.max_depth {
            let source = current.as_deref().unwrap_or(text);
            match self.substitute_once(source, lookup) {
                Some(next) => current = Some(next),
                None => return Ok(current),
            }
        }
        let source = current.as_deref().unwrap_or(text);
        if self.substitute_once(source, lookup).is_some() {
            return Err(ConfigError::RecursionTooDeep {
                path: path.to_owned(),
                depth: self.max_depth,
            });
        }
        Ok(current)
    }
}

impl Object {
    /// Return a copy with placeholders in string values replaced.
    ///
    /// Each string is scanned for `start … end` spans; the trimmed text between
    /// the tokens is passed to `lookup` and the span is replaced when a value
    /// is returned. Rounds repeat so replacements may themselves contain
    /// placeholders. Every value that changed gains an
    /// `Origin { file: origin_label }` entry.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::RecursionTooDeep`] when a value still expands
    /// after `max_depth` rounds, which is how reference cycles surface.
    ///
    /// # Examples
    ///
    /// ```
    /// use serde_json::json;
    /// use strata_config::{Expansion, Object};
    ///
    /// let tree = Object::from_raw(json!({"url": "http://${{ host }}/"}), &[]);
    /// let lookup = |name: &str| (name == "host").then(|| "example.org".to_owned());
    /// let expanded = tree.to_expanded(&Expansion::default(), lookup)?;
    /// assert_eq!(expanded.to_raw(), json!({"url": "http://example.org/"}));
    /// # Ok::<_, strata_config::ConfigError>(())
    /// ```
    pub fn to_expanded<F>(&self, expansion: &Expansion, lookup: F) -> StrataResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        self.expand_at(expansion, &lookup, "")
    }

    fn expand_at<F>(&self, expansion: &Expansion, lookup: &F, path: &str) -> StrataResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let node = match &self.node {
            Node::Map(map) => Node::Map(
                map.iter()
                    .map(|(key, child)| {
                        child
                            .expand_at(expansion, lookup, &child_path(path, key))
                            .map(|expanded| (key.clone(), expanded))
                    })
                    .collect::<StrataResult<_>>()?,
            ),
            Node::Array(items) => Node::Array(
                items
                    .iter()
                    .enumerate()
                    .map(|(index, item)| {
                        item.expand_at(expansion, lookup, &child_path(path, &index.to_string()))
                    })
                    .collect::<StrataResult<_>>()?,
            ),
            Node::Value(Scalar::String(text)) => {
                if let Some(expanded) = expansion.expand_str(text, path, lookup)? {
                    let mut origins = self.origins.clone();
                    origins.push(Origin::new(expansion.origin_label.clone()));
                    return Ok(Self {
                        node: Node::Value(Scalar::String(expanded)),
                        origins,
                        secret: self.secret,
                    });
                }
                self.node.clone()
            }
            Node::Value(other) => Node::Value(other.clone()),
        };
        Ok(Self {
            node,
            origins: self.origins.clone(),
            secret: self.secret,
        })
    }

    /// Return a copy where every secret node is collapsed to the string
    /// [`REDACTED`].
    ///
    /// Secret maps and arrays lose their children entirely so the output does
    /// not reveal their shape.
    #[must_use]
    pub fn redacted(&self) -> Self {
        let node = if self.secret {
            Node::Value(Scalar::String(REDACTED.to_owned()))
        } else {
            match &self.node {
                Node::Map(map) => Node::Map(
                    map.iter()
                        .map(|(key, child)| (key.clone(), child.redacted()))
                        .collect(),
                ),
                Node::Array(items) => Node::Array(items.iter().map(Self::redacted).collect()),
                Node::Value(scalar) => Node::Value(scalar.clone()),
            }
        };
        Self {
            node,
            origins: self.origins.clone(),
            secret: self.secret,
        }
    }
}
