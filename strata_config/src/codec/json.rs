//! JSON codec backed by `serde_json`.

use serde_json::Value;

use super::{DecodeContext, Decoder, Encoder, document, text};
use crate::result_ext::JsonResultExt;
use crate::{ConfigError, Object, StrataResult};

/// JSON decoder and pretty-printing encoder.
#[derive(Clone, Copy, Debug, Default)]
pub struct Json;

impl Decoder for Json {
    fn decode(&self, ctx: &DecodeContext<'_>, bytes: &[u8]) -> StrataResult<Object> {
        let Some(text) = text(ctx, bytes)? else {
            return Ok(Object::default());
        };
        let value: Value = serde_json::from_str(text).decode_in(ctx.filename)?;
        document(ctx, value)
    }
}

impl Encoder for Json {
    fn format(&self) -> &'static str {
        "json"
    }

    fn encode(&self, value: &Value) -> StrataResult<Vec<u8>> {
        let mut out =
            serde_json::to_vec_pretty(value).map_err(|err| ConfigError::encode("json", err))?;
        out.push(b'\n');
        Ok(out)
    }
}
