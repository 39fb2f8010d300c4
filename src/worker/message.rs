//! Control messages exchanged with open pages.

use color_eyre::{eyre::eyre, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ControlMessage {
  /// Activate a waiting worker right away
  SkipWaiting,
  /// Ask for the current cache name
  GetVersion,
}

impl ControlMessage {
  /// Parse either a JSON message (`{"type": "GET_VERSION"}`) or a bare type name.
  pub fn parse(input: &str) -> Result<Self> {
    let input = input.trim();
    if input.starts_with('{') {
      return serde_json::from_str(input).map_err(|e| eyre!("Invalid message '{}': {}", input, e));
    }

    match input.to_ascii_uppercase().replace('-', "_").as_str() {
      "SKIP_WAITING" => Ok(Self::SkipWaiting),
      "GET_VERSION" => Ok(Self::GetVersion),
      other => Err(eyre!("Unknown message type: {}", other)),
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum MessageReply {
  Version { version: String },
  SkipWaiting { skip_waiting: bool },
}
