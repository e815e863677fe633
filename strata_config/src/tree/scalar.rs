//! Scalar payloads held by `Value` nodes.

use std::fmt;

use serde::{Serialize, Serializer};
use serde_json::{Number, Value};

/// A single configuration scalar.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum Scalar {
    /// Absent value (`null` in JSON).
    #[default]
    Null,
    /// Boolean.
    Bool(bool),
    /// Signed integer.
    Int(i64),
    /// Floating-point number.
    Float(f64),
    /// UTF-8 string.
    String(String),
}

impl Scalar {
    /// Infer a scalar from untyped text, as found in environment variables and
    /// properties files.
    ///
    /// `true`/`false` become booleans, integers and plain decimal numbers
    /// become numbers, everything else stays a string. Words that Rust would
    /// parse as floats (`inf`, `NaN`) are kept as strings.
    ///
    /// # Examples
    ///
    /// ```
    /// use strata_config::Scalar;
    /// assert_eq!(Scalar::infer("8080"), Scalar::Int(8080));
    /// assert_eq!(Scalar::infer("true"), Scalar::Bool(true));
    /// assert_eq!(Scalar::infer("inf"), Scalar::String("inf".into()));
    /// ```
    #[must_use]
    pub fn infer(text: &str) -> Self {
        match text {
            "true" => return Self::Bool(true),
            "false" => return Self::Bool(false),
            _ => {}
        }
        if let Ok(int) = text.parse::<i64>() {
            return Self::Int(int);
        }
        let numeric = !text.is_empty()
            && text.chars().any(|c| c.is_ascii_digit())
            && text
                .chars()
                .all(|c| c.is_ascii_digit() || matches!(c, '.' | 'e' | 'E' | '+' | '-'));
        match text.parse::<f64>() {
            Ok(float) if numeric && float.is_finite() => Self::Float(float),
            _ => Self::String(text.to_owned()),
        }
    }

    /// Returns the string payload, if any.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns `true` for [`Scalar::Null`].
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Convert into the equivalent JSON value.
    ///
    /// Non-finite floats have no JSON form and become `null`.
    #[must_use]
    pub fn to_json(&self) -> Value {
        match self {
            Self::Null => Value::Null,
            Self::Bool(b) => Value::Bool(*b),
            Self::Int(i) => Value::Number(Number::from(*i)),
            Self::Float(f) => Number::from_f64(*f).map_or(Value::Null, Value::Number),
            Self::String(s) => Value::String(s.clone()),
        }
    }

    /// Convert a JSON number into a scalar, falling back to a float for
    /// integers outside the `i64` range.
    pub(crate) fn from_number(number: &Number) -> Self {
        number.as_i64().map_or_else(
            || number.as_f64().map_or(Self::Null, Self::Float),
            Self::Int,
        )
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => Ok(()),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(i) => write!(f, "{i}"),
            Self::Float(x) => write!(f, "{x}"),
            Self::String(s) => f.write_str(s),
        }
    }
}

impl Serialize for Scalar {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Null => serializer.serialize_unit(),
            Self::Bool(b) => serializer.serialize_bool(*b),
            Self::Int(i) => serializer.serialize_i64(*i),
            Self::Float(f) => serializer.serialize_f64(*f),
            Self::String(s) => serializer.serialize_str(s),
        }
    }
}

impl From<bool> for Scalar {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for Scalar {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<f64> for Scalar {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<&str> for Scalar {
    fn from(value: &str) -> Self {
        Self::String(value.to_owned())
    }
}

impl From<String> for Scalar {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}
