use crate::game::types::Cell;
use serde::{Deserialize, Serialize};

/// Inbound command envelope: `{ "cmd": ..., ...fields }`. Frames that fail
/// to decode are dropped by the caller; the connection stays open.
#[derive(Debug, Deserialize)]
#[serde(tag = "cmd", rename_all = "snake_case")]
pub enum ClientCommand {
  Start,
  SetDirection {
    dir: Option<String>,
  },
  UpdateRoom {
    #[serde(rename = "appleCount")]
    apple_count: Option<u32>,
    size: Option<u32>,
    #[serde(rename = "tickRate")]
    tick_rate: Option<f64>,
  },
}

pub fn decode_command(text: &str) -> Option<ClientCommand> {
  serde_json::from_str(text).ok()
}

/// Outbound event envelope: `{ "event": ..., ...fields }`.
#[derive(Debug, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ServerEvent {
  SetBoard {
    size: u32,
  },
  UpdateBoard {
    players: Vec<Vec<Cell>>,
    apples: Vec<Cell>,
  },
}

impl ServerEvent {
  pub fn encode(&self) -> String {
    serde_json::to_string(self).unwrap_or_default()
  }
}
