use super::constants::{
  DEFAULT_APPLE_COUNT, DEFAULT_BOARD_SIZE, DEFAULT_TICK_RATE_HZ, MIN_BOARD_SIZE,
};
use serde::{Deserialize, Serialize};

/// One board cell, serialized as `[x, y]` on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Cell(pub i32, pub i32);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
  Left,
  Right,
  Up,
  Down,
}

impl Direction {
  pub fn velocity(self) -> (i32, i32) {
    match self {
      Direction::Left => (-1, 0),
      Direction::Right => (1, 0),
      Direction::Up => (0, -1),
      Direction::Down => (0, 1),
    }
  }

  pub fn opposite(self) -> Self {
    match self {
      Direction::Left => Direction::Right,
      Direction::Right => Direction::Left,
      Direction::Up => Direction::Down,
      Direction::Down => Direction::Up,
    }
  }

  pub fn from_name(name: &str) -> Option<Self> {
    match name {
      "left" => Some(Direction::Left),
      "right" => Some(Direction::Right),
      "up" => Some(Direction::Up),
      "down" => Some(Direction::Down),
      _ => None,
    }
  }
}

#[derive(Debug, Clone, Copy)]
pub struct RoomConfig {
  pub size: u32,
  pub tick_rate: f64,
  pub apple_count: u32,
}

impl Default for RoomConfig {
  fn default() -> Self {
    Self {
      size: DEFAULT_BOARD_SIZE,
      tick_rate: DEFAULT_TICK_RATE_HZ,
      apple_count: DEFAULT_APPLE_COUNT,
    }
  }
}

impl RoomConfig {
  /// Builds a config from connection parameters, falling back to defaults
  /// for absent or out-of-range values.
  pub fn from_params(size: Option<u32>, tick_rate: Option<f64>, apple_count: Option<u32>) -> Self {
    let defaults = Self::default();
    Self {
      size: size
        .filter(|size| *size >= MIN_BOARD_SIZE)
        .unwrap_or(defaults.size),
      tick_rate: tick_rate
        .filter(|rate| rate.is_finite() && *rate > 0.0)
        .unwrap_or(defaults.tick_rate),
      apple_count: apple_count
        .filter(|count| *count >= 1)
        .unwrap_or(defaults.apple_count),
    }
  }
}
