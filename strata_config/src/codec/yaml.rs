//! YAML decoder backed by `serde-saphyr`.

use serde_json::Value;
use serde_saphyr::Options;

use super::{DecodeContext, Decoder, document, text};
use crate::{ConfigError, Object, StrataResult};

/// YAML decoder using YAML 1.2 strict booleans, so `yes` stays a string.
#[derive(Clone, Copy, Debug, Default)]
pub struct Yaml;

impl Decoder for Yaml {
    fn decode(&self, ctx: &DecodeContext<'_>, bytes: &[u8]) -> StrataResult<Object> {
        let Some(text) = text(ctx, bytes)? else {
            return Ok(Object::default());
        };
        let value: Value = serde_saphyr::from_str_with_options(
            text,
            Options {
                strict_booleans: true,
                ..Options::default()
            },
        )
        .map_err(|err| ConfigError::decode(ctx.filename, err.to_string()))?;
        document(ctx, value)
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use serde_json::json;

    use super::Yaml;
    use crate::codec::{DecodeContext, Decoder};

    #[test]
    fn yes_remains_a_string() {
        let tree = Yaml
            .decode(&DecodeContext::new("app.yaml"), b"recipient: yes\n")
            .expect("valid yaml");
        assert_eq!(tree.to_raw(), json!({"recipient": "yes"}));
    }

    #[rstest]
    #[case("recipient: first\nrecipient: second", "duplicate")]
    #[case("recipient: [", "app.yaml")]
    fn errors_are_reported(#[case] input: &str, #[case] expected: &str) {
        let err = Yaml
            .decode(&DecodeContext::new("app.yaml"), input.as_bytes())
            .expect_err("invalid yaml");
        let rendered = format!(
            "{err}: {}",
            std::error::Error::source(&err)
                .map(ToString::to_string)
                .unwrap_or_default()
        );
        assert!(rendered.contains(expected), "{rendered}");
    }
}
