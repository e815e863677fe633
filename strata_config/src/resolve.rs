//! Normalisation of command-bearing keys.

use std::collections::btree_map::Entry;

use crate::command::parse_key;
use crate::tree::{Map, Node, Object, child_path};
use crate::{ConfigError, StrataResult};

/// Strip command suffixes from every map key and propagate secret markers.
///
/// Commands are not applied here; only the merge engine acts on them. A
/// `secret` marker flags the child and, transitively, its whole subtree.
/// Resolving an already-resolved tree returns it unchanged.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidCommand`] for malformed suffixes and
/// [`ConfigError::DuplicateKey`] when two keys of one map resolve to the same
/// final key.
///
/// # Examples
///
/// ```rust
/// use serde_json::json;
/// use strata_config::{Object, resolve_commands};
///
/// let raw = Object::from_raw(json!({"db": {"password((secret))": "hunter2"}}), &[]);
/// let resolved = resolve_commands(raw)?;
/// let password = resolved.fetch("db.password", ".")?;
/// assert!(password.is_secret());
/// # Ok::<_, strata_config::ConfigError>(())
/// ```
pub fn resolve_commands(tree: Object) -> StrataResult<Object> {
    resolve_node(tree, false, "")
}

pub(crate) fn resolve_node(
    tree: Object,
    inherited_secret: bool,
    path: &str,
) -> StrataResult<Object> {
    let (node, origins, secret) = tree.into_parts();
    let secret = secret || inherited_secret;
    let node = match node {
        Node::Map(map) => {
            let mut resolved = Map::new();
            for (raw_key, child) in map {
                let parsed = parse_key(&raw_key)?;
                let at = child_path(path, &parsed.key);
                let child = resolve_node(child, secret || parsed.secret, &at)?;
                match resolved.entry(parsed.key) {
                    Entry::Vacant(slot) => {
                        slot.insert(child);
                    }
                    Entry::Occupied(slot) => {
                        return Err(ConfigError::DuplicateKey {
                            path: path.to_owned(),
                            key: slot.key().clone(),
                        });
                    }
                }
            }
            Node::Map(resolved)
        }
        Node::Array(items) => Node::Array(
            items
                .into_iter()
                .enumerate()
                .map(|(index, item)| {
                    resolve_node(item, secret, &child_path(path, &index.to_string()))
                })
                .collect::<StrataResult<_>>()?,
        ),
        value @ Node::Value(_) => value,
    };
    Ok(Object::new(node).with_origins(origins).with_secret(secret))
}

impl Object {
    /// Method form of [`resolve_commands`].
    ///
    /// # Errors
    ///
    /// See [`resolve_commands`].
    pub fn resolve_commands(self) -> StrataResult<Self> {
        resolve_commands(self)
    }
}
