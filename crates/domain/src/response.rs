//! Decoded response bodies

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::constants::RAW_RESPONSE_KEY;

/// Body of a successful API response
///
/// JSON bodies are kept as parsed values; anything else is kept verbatim.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseBody {
    Json(Value),
    Raw(String),
}

impl ResponseBody {
    /// Decode a response payload
    ///
    /// Empty and `null` bodies become an empty JSON object so callers always
    /// receive a mapping for successful calls.
    #[must_use]
    pub fn parse(text: &str) -> Self {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Self::Json(Value::Object(Map::new()));
        }

        match serde_json::from_str::<Value>(trimmed) {
            Ok(Value::Null) => Self::Json(Value::Object(Map::new())),
            Ok(value) => Self::Json(value),
            Err(_) => Self::Raw(text.to_string()),
        }
    }

    /// Parsed JSON value, if the body was JSON
    #[must_use]
    pub const fn as_json(&self) -> Option<&Value> {
        match self {
            Self::Json(value) => Some(value),
            Self::Raw(_) => None,
        }
    }

    /// Verbatim text, if the body was not JSON
    #[must_use]
    pub fn raw(&self) -> Option<&str> {
        match self {
            Self::Raw(text) => Some(text),
            Self::Json(_) => None,
        }
    }

    /// Top-level field of a JSON object body
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.as_json().and_then(|value| value.get(key))
    }

    /// Convert to a JSON value, wrapping raw text as `{"raw_response": text}`
    #[must_use]
    pub fn into_json(self) -> Value {
        match self {
            Self::Json(value) => value,
            Self::Raw(text) => {
                let mut map = Map::new();
                map.insert(RAW_RESPONSE_KEY.to_string(), Value::String(text));
                Value::Object(map)
            }
        }
    }

    /// Decode into a caller-defined type
    ///
    /// # Errors
    /// Returns the serde error when the body does not match `T`.
    pub fn deserialize<T: DeserializeOwned>(&self) -> serde_json::Result<T> {
        match self {
            Self::Json(value) => T::deserialize(value),
            Self::Raw(_) => T::deserialize(&self.clone().into_json()),
        }
    }
}
