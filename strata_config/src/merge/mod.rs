//! Deterministic merging of configuration trees.
//!
//! The existing node's kind selects the strategy and the incoming key's
//! command chooses between the strategy's options:
//!
//! | current | legal commands | default |
//! | --- | --- | --- |
//! | map | `splice`, `replace`, `keep`, `fail` | `splice` |
//! | array | `append`, `prepend`, `replace`, `keep`, `fail` | `append` |
//! | value | `replace`, `keep`, `fail` | `replace` |
//!
//! A top-level `clear` key in the incoming tree discards everything merged so
//! far.

use std::collections::HashSet;

use tracing::debug;

use crate::command::{Command, parse_key};
use crate::resolve::resolve_node;
use crate::tree::{Kind, Node, Object, child_path};
use crate::{ConfigError, StrataResult};

/// Command context for merging one pair of nodes.
struct Step<'a> {
    command: Option<Command>,
    secret: bool,
    key: &'a str,
    path: &'a str,
}

impl Step<'_> {
    fn illegal(&self, kind: Kind) -> ConfigError {
        let command = self.command.map_or("none", Command::as_str);
        ConfigError::invalid_command(
            self.key,
            format!("`{command}` cannot be applied to {kind:?} nodes"),
        )
    }
}

/// Merge `incoming` onto `current`, returning the combined tree.
///
/// `current` must already be resolved (for example the output of a previous
/// merge); `incoming` is resolved while it is merged, so its keys may carry
/// command suffixes.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidCommand`] for malformed or illegal commands,
/// [`ConfigError::Conflict`] when a `fail` key meets an existing value and
/// [`ConfigError::DuplicateKey`] when two incoming keys resolve to the same
/// final key. Any error aborts the whole merge.
///
/// # Examples
///
/// ```rust
/// use serde_json::json;
/// use strata_config::{Object, merge};
///
/// let base = merge(Object::default(), Object::from_raw(json!({"hosts": ["a"]}), &[]))?;
/// let next = Object::from_raw(json!({"hosts((prepend))": ["z"], "port": 80}), &[]);
/// let merged = merge(base, next)?;
/// assert_eq!(merged.to_raw(), json!({"hosts": ["z", "a"], "port": 80}));
/// # Ok::<_, strata_config::ConfigError>(())
/// ```
pub fn merge(current: Object, incoming: Object) -> StrataResult<Object> {
    if clears(&incoming)? {
        debug!("incoming tree carries a top-level clear; discarding existing configuration");
        return Ok(Object::default());
    }
    let step = Step {
        command: None,
        secret: false,
        key: "",
        path: "",
    };
    if current.kind() == incoming.kind() {
        merge_node(current, incoming, &step)
    } else {
        resolve_incoming(incoming, false, "")
    }
}

/// Resolve an incoming subtree that has no existing counterpart.
///
/// Every command is checked against the kind of the node it labels, so a
/// malformed key aborts the merge even when the subtree is dropped.
fn resolve_incoming(incoming: Object, secret: bool, path: &str) -> StrataResult<Object> {
    check_commands(&incoming)?;
    resolve_node(incoming, secret, path)
}

fn check_commands(tree: &Object) -> StrataResult<()> {
    match tree.node() {
        Node::Map(map) => map.iter().try_for_each(|(raw_key, child)| {
            parse_key(raw_key)?.command_for(raw_key, child.kind())?;
            check_commands(child)
        }),
        Node::Array(items) => items.iter().try_for_each(check_commands),
        Node::Value(_) => Ok(()),
    }
}

/// Whether any top-level key of `incoming` carries the `clear` command.
fn clears(incoming: &Object) -> StrataResult<bool> {
    let Some(map) = incoming.as_map() else {
        return Ok(false);
    };
    for key in map.keys() {
        if parse_key(key)?.command.as_deref() == Some(Command::Clear.as_str()) {
            return Ok(true);
        }
    }
    Ok(false)
}

fn merge_node(current: Object, incoming: Object, step: &Step<'_>) -> StrataResult<Object> {
    match (current.kind(), step.command) {
        (_, Some(Command::Fail)) => Err(ConfigError::conflict(step.path)),
        (_, Some(Command::Keep)) => {
            resolve_incoming(incoming, step.secret, step.path)?;
            Ok(current)
        }
        (Kind::Value, None | Some(Command::Replace)) => {
            resolve_incoming(incoming, step.secret, step.path)
        }
        (Kind::Map, Some(Command::Replace)) => {
            resolve_incoming(incoming, step.secret, step.path)
        }
        (Kind::Map, None | Some(Command::Splice)) => splice(current, incoming, step),
        (Kind::Array, _) => merge_array(current, incoming, step),
        (kind, _) => Err(step.illegal(kind)),
    }
}

fn merge_array(current: Object, incoming: Object, step: &Step<'_>) -> StrataResult<Object> {
    let inherited = current.is_secret() || step.secret;
    let incoming = resolve_incoming(incoming, inherited, step.path)?;
    if step.command == Some(Command::Replace) {
        return Ok(incoming);
    }
    let prepend = match step.command {
        None | Some(Command::Append) => false,
        Some(Command::Prepend) => true,
        _ => return Err(step.illegal(Kind::Array)),
    };
    let secret = inherited || incoming.is_secret();
    let (current_node, current_origins, _) = current.into_parts();
    let (incoming_node, incoming_origins, _) = incoming.into_parts();
    let (Node::Array(existing), Node::Array(added)) = (current_node, incoming_node) else {
        return Err(step.illegal(Kind::Array));
    };
    let (items, origins) = if prepend {
        (
            added.into_iter().chain(existing).collect(),
            incoming_origins.into_iter().chain(current_origins).collect(),
        )
    } else {
        (
            existing.into_iter().chain(added).collect(),
            current_origins.into_iter().chain(incoming_origins).collect(),
        )
    };
    Ok(Object::from_array(items)
        .with_origins(origins)
        .with_secret(secret))
}

fn splice(current: Object, incoming: Object, step: &Step<'_>) -> StrataResult<Object> {
    let (current_node, origins, current_secret) = current.into_parts();
    let (incoming_node, _, _) = incoming.into_parts();
    let (Node::Map(mut map), Node::Map(entries)) = (current_node, incoming_node) else {
        return Err(step.illegal(Kind::Map));
    };
    let inherited = current_secret || step.secret;
    let mut seen = HashSet::with_capacity(entries.len());
    for (raw_key, child) in entries {
        let parsed = parse_key(&raw_key)?;
        if !seen.insert(parsed.key.clone()) {
            return Err(ConfigError::DuplicateKey {
                path: step.path.to_owned(),
                key: parsed.key,
            });
        }
        let at = child_path(step.path, &parsed.key);
        let secret = parsed.secret || inherited;
        let merged = match map.remove(&parsed.key) {
            None => {
                parsed.command_for(&raw_key, child.kind())?;
                resolve_incoming(child, secret, &at)?
            }
            Some(existing) if existing.kind() == child.kind() => {
                let command = parsed.command_for(&raw_key, existing.kind())?;
                let child_step = Step {
                    command,
                    secret,
                    key: &raw_key,
                    path: &at,
                };
                merge_node(existing, child, &child_step)?
            }
            Some(existing) => match parsed.parsed_command(&raw_key)? {
                None | Some(Command::Splice | Command::Replace) => {
                    resolve_incoming(child, secret, &at)?
                }
                Some(Command::Keep) => {
                    resolve_incoming(child, secret, &at)?;
                    existing
                }
                Some(Command::Fail) => return Err(ConfigError::conflict(at)),
                Some(other) => {
                    return Err(ConfigError::invalid_command(
                        raw_key.as_str(),
                        format!("`{other}` cannot replace a {:?} node", existing.kind()),
                    ));
                }
            },
        };
        map.insert(parsed.key, merged);
    }
    Ok(Object::from_map(map)
        .with_origins(origins)
        .with_secret(inherited))
}

impl Object {
    /// Method form of [`merge`].
    ///
    /// # Errors
    ///
    /// See [`merge`].
    pub fn merge(self, incoming: Self) -> StrataResult<Self> {
        merge(self, incoming)
    }
}
