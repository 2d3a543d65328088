//! Wire format for negotiation documents and candidate records
//!
//! The relay treats payloads as opaque: an offer, answer, or candidate is a
//! single well-formed JSON document that round-trips byte-for-byte. There is
//! exactly one accepted format; malformed input is rejected up front rather
//! than fed through fallback parse strategies.

use serde_json::Value;

use crate::{Error, Result};

/// An opaque negotiation or candidate payload.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentBody(Value);

impl DocumentBody {
    /// Validate and wrap an incoming payload.
    ///
    /// Rejects JSON `null` and empty strings with `InvalidInput`; any other
    /// well-formed JSON value passes through verbatim.
    pub fn new(value: Value) -> Result<Self> {
        match &value {
            Value::Null => Err(Error::InvalidInput(
                "document body must not be null".to_string(),
            )),
            Value::String(s) if s.is_empty() => Err(Error::InvalidInput(
                "document body must not be empty".to_string(),
            )),
            _ => Ok(Self(value)),
        }
    }

    /// Parse a stored row back into a body. Strict single-format parse; a
    /// row that no longer parses is reported, never coerced.
    pub(crate) fn from_stored(text: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(text)?;
        Self::new(value)
    }

    /// Serialized form written to storage.
    pub(crate) fn to_stored(&self) -> Result<String> {
        Ok(serde_json::to_string(&self.0)?)
    }

    /// Borrow the underlying JSON value.
    pub fn as_value(&self) -> &Value {
        &self.0
    }

    /// Consume into the underlying JSON value.
    pub fn into_value(self) -> Value {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn accepts_structured_documents() {
        assert!(DocumentBody::new(json!({"sdp": "v=0..."})).is_ok());
        assert!(DocumentBody::new(json!("v=0\r\no=- 0 0 IN IP4 0.0.0.0")).is_ok());
        assert!(DocumentBody::new(json!({"candidate": "candidate:1 1 UDP ...", "sdpMid": null})).is_ok());
    }

    #[test]
    fn rejects_null_and_empty() {
        assert!(matches!(DocumentBody::new(Value::Null), Err(Error::InvalidInput(_))));
        assert!(matches!(DocumentBody::new(json!("")), Err(Error::InvalidInput(_))));
    }

    #[test]
    fn round_trips_through_storage_form() {
        let body = DocumentBody::new(json!({"sdp": "O1", "type": "offer"})).unwrap();
        let stored = body.to_stored().unwrap();
        let restored = DocumentBody::from_stored(&stored).unwrap();
        assert_eq!(restored, body);
    }

    #[test]
    fn stored_garbage_is_an_error_not_a_fallback() {
        assert!(DocumentBody::from_stored("not json at all").is_err());
    }
}
