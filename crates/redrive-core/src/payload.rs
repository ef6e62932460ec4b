//! Body handling between receive and forward.

use std::str::FromStr;

use serde_json::Value;

use crate::error::{ConfigError, RelayError};

/// How the record body becomes the forwarded message.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PayloadMode {
    /// Forward the body byte for byte.
    #[default]
    PassThrough,
    /// Parse the body as JSON and wrap it in a processed envelope.
    ParseAndWrap,
}

impl FromStr for PayloadMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pass-through" => Ok(Self::PassThrough),
            "parse-and-wrap" => Ok(Self::ParseAndWrap),
            other => Err(ConfigError::UnknownPayloadMode(other.to_string())),
        }
    }
}

/// Clean-up applied to a body before it is parsed.
///
/// Some upstream producers double-encode their JSON. Neither fix is safe for
/// every payload, so both are opt-in.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Normalization {
    #[default]
    Off,
    /// Replace every `\"` with `"` before parsing.
    ///
    /// Breaks bodies that legitimately contain escaped quotes inside strings.
    UnescapeQuotes,
    /// If the body parses to a JSON string that itself holds a JSON
    /// document, decode that inner document.
    UnwrapString,
}

impl FromStr for Normalization {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "off" => Ok(Self::Off),
            "unescape-quotes" => Ok(Self::UnescapeQuotes),
            "unwrap-string" => Ok(Self::UnwrapString),
            other => Err(ConfigError::UnknownNormalization(other.to_string())),
        }
    }
}

/// Parses a record body according to `normalization`.
pub fn parse_body(body: &str, normalization: Normalization) -> Result<Value, RelayError> {
    match normalization {
        Normalization::Off => Ok(serde_json::from_str(body)?),
        Normalization::UnescapeQuotes => Ok(serde_json::from_str(&body.replace("\\\"", "\""))?),
        Normalization::UnwrapString => match serde_json::from_str::<Value>(body)? {
            Value::String(inner) => match serde_json::from_str::<Value>(&inner) {
                Ok(decoded @ (Value::Object(_) | Value::Array(_))) => Ok(decoded),
                _ => Ok(Value::String(inner)),
            },
            other => Ok(other),
        },
    }
}

/// Builds the message to forward for a record body.
pub fn outbound_body(
    body: &str,
    mode: PayloadMode,
    normalization: Normalization,
) -> Result<String, RelayError> {
    match mode {
        PayloadMode::PassThrough => Ok(body.to_string()),
        PayloadMode::ParseAndWrap => {
            let message = parse_body(body, normalization)?;
            Ok(serde_json::json!({ "status": "processed", "message": message }).to_string())
        }
    }
}
