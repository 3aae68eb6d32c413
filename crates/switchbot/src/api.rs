use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{SwitchBotError, SwitchBotResult};

/// Control command for a physical or virtual device.
///
/// Serialized as the request body of `POST /v1.1/devices/{id}/commands`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Command {
    pub command: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub command_type: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub parameter: Option<Value>,
}

impl Command {
    #[must_use]
    pub const fn new(command: String) -> Self {
        Self {
            command,
            command_type: None,
            parameter: None,
        }
    }
}

/// Response wrapper returned by every v1.1 endpoint.
///
/// The payload under `body` is endpoint-specific, and left opaque here.
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Envelope {
    pub status_code: i64,

    #[serde(default)]
    pub message: String,

    #[serde(default)]
    pub body: Value,
}

impl Envelope {
    /// The one `statusCode` value that means success.
    pub const SUCCESS: i64 = 100;

    /// Classify the envelope: anything but `statusCode == 100` is a
    /// remote-side failure carrying the server's `message`.
    pub fn into_result(self) -> SwitchBotResult<Self> {
        if self.status_code == Self::SUCCESS {
            Ok(self)
        } else {
            Err(SwitchBotError::Api {
                status_code: self.status_code,
                message: self.message,
            })
        }
    }
}
