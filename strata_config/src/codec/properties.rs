//! Flat `key = value` properties files.
//!
//! Keys are split on the context delimiter, so `db.hosts.0 = a` builds nested
//! maps; positional maps are turned into arrays once the whole file is read.
//! Every value records the line and column of its key.

use std::fmt::{self, Write as _};

use serde_json::Value;

use super::{DecodeContext, Decoder, Encoder, text};
use crate::tree::Node;
use crate::{ConfigError, Object, Origin, Scalar, StrataResult};

/// Properties decoder and encoder.
///
/// The extended encoding appends the origins of each value as a trailing
/// `#` comment.
#[derive(Clone, Copy, Debug, Default)]
pub struct Properties;

fn is_comment(line: &str) -> bool {
    line.is_empty() || line.starts_with('#') || line.starts_with('!')
}

impl Decoder for Properties {
    fn decode(&self, ctx: &DecodeContext<'_>, bytes: &[u8]) -> StrataResult<Object> {
        let Some(text) = text(ctx, bytes)? else {
            return Ok(Object::default());
        };
        let mut tree = Object::default();
        for (index, line) in text.lines().enumerate() {
            let line_no = index + 1;
            let entry = line.trim_start();
            if is_comment(entry) {
                continue;
            }
            let col = line.len() - entry.len() + 1;
            let Some(split) = entry.find(['=', ':']) else {
                return Err(ConfigError::decode(
                    ctx.filename,
                    format!("line {line_no}: expected `key = value`"),
                ));
            };
            let (key, rest) = entry.split_at(split);
            let key = key.trim_end();
            if key.is_empty() {
                return Err(ConfigError::decode(
                    ctx.filename,
                    format!("line {line_no}: missing key"),
                ));
            }
            let value = rest.get(1..).unwrap_or_default().trim();
            let origin = Origin::at(ctx.filename, line_no, col);
            tree.add(
                ctx.key_delimiter,
                key,
                Scalar::infer(value).to_json(),
                &[origin],
            )?;
        }
        Ok(tree.convert_maps_to_arrays())
    }
}

fn flatten(tree: &Object, prefix: &str, extended: bool, out: &mut String) -> fmt::Result {
    let join = |key: &str| {
        if prefix.is_empty() {
            key.to_owned()
        } else {
            format!("{prefix}.{key}")
        }
    };
    match tree.node() {
        Node::Map(map) => {
            for (key, child) in map {
                flatten(child, &join(key), extended, out)?;
            }
        }
        Node::Array(items) => {
            for (index, item) in items.iter().enumerate() {
                flatten(item, &join(&index.to_string()), extended, out)?;
            }
        }
        Node::Value(scalar) => {
            write!(out, "{prefix} = {scalar}")?;
            if extended && !tree.origins().is_empty() {
                let origins: Vec<String> =
                    tree.origins().iter().map(ToString::to_string).collect();
                write!(out, " # {}", origins.join(", "))?;
            }
            out.push('\n');
        }
    }
    Ok(())
}

fn render(tree: &Object, extended: bool) -> StrataResult<Vec<u8>> {
    let mut out = String::new();
    flatten(tree, "", extended, &mut out).map_err(|err| ConfigError::encode("properties", err))?;
    Ok(out.into_bytes())
}

impl Encoder for Properties {
    fn format(&self) -> &'static str {
        "properties"
    }

    fn encode(&self, value: &Value) -> StrataResult<Vec<u8>> {
        render(&Object::from_raw(value.clone(), &[]), false)
    }

    fn encode_extended(&self, tree: &Object) -> StrataResult<Vec<u8>> {
        render(tree, true)
    }
}
