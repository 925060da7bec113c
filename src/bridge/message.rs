//! Wire format of JS-to-native bridge calls.

use serde::{Deserialize, Serialize};

use crate::bridge::plugin::JsonObject;
use crate::error::BridgeError;

/// A single call posted from the page through the transport adapter.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BridgeMessage {
    /// Routing key of the target plugin.
    pub identifier: String,
    /// Argument object supplied by the JS caller.
    #[serde(default)]
    pub payload: JsonObject,
    /// JS-side pending-callback id, present only for response-expecting calls.
    #[serde(default)]
    pub callback_id: Option<String>,
}

impl BridgeMessage {
    /// Parse the raw JSON string handed over by the transport adapter.
    pub fn parse(raw: &str) -> Result<Self, BridgeError> {
        Ok(serde_json::from_str(raw)?)
    }
}
