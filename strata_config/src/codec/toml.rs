//! TOML codec backed by the `toml` crate.

use serde_json::Value;

use super::{DecodeContext, Decoder, Encoder, document, text};
use crate::{ConfigError, Object, StrataResult};

/// TOML decoder and encoder.
///
/// TOML has no null; encoding a tree that contains one fails.
#[derive(Clone, Copy, Debug, Default)]
pub struct Toml;

impl Decoder for Toml {
    fn decode(&self, ctx: &DecodeContext<'_>, bytes: &[u8]) -> StrataResult<Object> {
        let Some(text) = text(ctx, bytes)? else {
            return Ok(Object::default());
        };
        let value: Value =
            toml::from_str(text).map_err(|err| ConfigError::decode(ctx.filename, err))?;
        document(ctx, value)
    }
}

impl Encoder for Toml {
    fn format(&self) -> &'static str {
        "toml"
    }

    fn encode(&self, value: &Value) -> StrataResult<Vec<u8>> {
        toml::to_string_pretty(value)
            .map(String::into_bytes)
            .map_err(|err| ConfigError::encode("toml", err))
    }
}
