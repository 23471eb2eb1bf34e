use super::types::{Cell, Direction};
use tokio::sync::mpsc::UnboundedSender;

/// A connected participant: the snake it controls plus the outbound half of
/// its connection.
#[derive(Debug)]
pub struct Player {
  pub session_id: String,
  pub tx: UnboundedSender<String>,
  pub direction: Direction,
  pub body: Vec<Cell>,
  pub is_dead: bool,
  pub grow_next_tick: bool,
  pub is_host: bool,
}

pub fn corner_cell(index: usize, size: u32) -> Cell {
  let far = size as i32 - 2;
  match index {
    0 => Cell(1, 1),
    1 => Cell(far, 1),
    2 => Cell(1, far),
    _ => Cell(far, far),
  }
}

pub fn starting_direction(index: usize) -> Direction {
  if index % 2 == 0 {
    Direction::Right
  } else {
    Direction::Left
  }
}

impl Player {
  pub fn new(session_id: String, tx: UnboundedSender<String>, index: usize, size: u32) -> Self {
    Self {
      session_id,
      tx,
      direction: starting_direction(index),
      body: vec![corner_cell(index, size)],
      is_dead: false,
      grow_next_tick: false,
      is_host: index == 0,
    }
  }

  pub fn head(&self) -> Option<Cell> {
    self.body.first().copied()
  }

  /// Moves one cell in the current direction. Each segment follows its
  /// predecessor's pre-tick position; a pending growth keeps the tail
  /// instead of dropping it.
  pub fn advance(&mut self) {
    let Some(&head) = self.body.first() else { return };
    let (dx, dy) = self.direction.velocity();
    self.body.insert(0, Cell(head.0 + dx, head.1 + dy));
    if self.grow_next_tick {
      self.grow_next_tick = false;
    } else {
      self.body.pop();
    }
  }

  pub fn steer(&mut self, direction: Direction) {
    // a reversal into the neck is ignored; a single cell has no neck
    if self.body.len() > 1 && direction == self.direction.opposite() {
      return;
    }
    self.direction = direction;
  }

  pub fn reset(&mut self, index: usize, size: u32) {
    self.is_dead = false;
    self.grow_next_tick = false;
    self.direction = starting_direction(index);
    self.body = vec![corner_cell(index, size)];
  }
}
