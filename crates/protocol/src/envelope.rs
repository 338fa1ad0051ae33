use serde::{Deserialize, Serialize};

use crate::constants::Method;

/// Error details carried by a failed response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RpcError {
    pub code: i32,
    pub message: String,
}

/// Envelope for every request and response exchanged with the backend gateway.
///
/// The `payload` field uses `serde_json::value::RawValue` to defer
/// deserialization until the caller knows which type to expect.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub method: Method,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload: Option<Box<serde_json::value::RawValue>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<RpcError>,
}

impl Message {
    /// Creates a new message with the given method and payload.
    pub fn new<T: Serialize>(
        id: impl Into<String>,
        method: Method,
        payload: Option<&T>,
    ) -> Result<Self, serde_json::Error> {
        let raw = match payload {
            Some(p) => {
                let json = serde_json::to_string(p)?;
                Some(serde_json::value::RawValue::from_string(json)?)
            }
            None => None,
        };
        Ok(Self {
            id: id.into(),
            method,
            payload: raw,
            error: None,
        })
    }

    /// Deserializes the payload into the given type.
    pub fn parse_payload<T: for<'de> Deserialize<'de>>(
        &self,
    ) -> Result<Option<T>, serde_json::Error> {
        match &self.payload {
            Some(raw) => Ok(Some(serde_json::from_str(raw.get())?)),
            None => Ok(None),
        }
    }
}
