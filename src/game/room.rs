use super::constants::{MAX_PLAYERS, MIN_BOARD_SIZE};
use super::grid;
use super::snake::Player;
use super::types::{Cell, Direction, RoomConfig};
use crate::protocol::{self, ClientCommand, ServerEvent};
use crate::registry::RoomRegistry;
use std::cmp::Ordering;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::{self, UnboundedSender};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use uuid::Uuid;


/// Everything that can touch a room's state arrives here: joins, inbound
/// frames, disconnects, and timer ticks are all drained by a single worker,
/// so two ticks, or a tick and a command, never run concurrently against
/// the same room.
#[derive(Debug)]
pub enum RoomEvent {
  Join {
    tx: UnboundedSender<String>,
    reply: oneshot::Sender<JoinReply>,
  },
  Command {
    session_id: String,
    text: String,
  },
  Disconnect {
    session_id: String,
  },
  Tick,
}

#[derive(Debug)]
pub enum JoinReply {
  Accepted { session_id: String },
  Locked,
}

#[derive(Debug, Clone)]
pub struct RoomHandle {
  pub(crate) events: UnboundedSender<RoomEvent>,
}

impl RoomHandle {
  pub fn send(&self, event: RoomEvent) -> bool {
    self.events.send(event).is_ok()
  }
}

pub fn spawn_room(id: String, config: RoomConfig, registry: Arc<RoomRegistry>) -> RoomHandle {
  let (events, mut queue) = mpsc::unbounded_channel();
  let handle = RoomHandle {
    events: events.clone(),
  };
  let mut state = RoomState::new(id, config, events);
  tokio::spawn(async move {
    tracing::debug!(room = %state.id, size = state.size, "room created");
    while let Some(event) = queue.recv().await {
      state.apply(event);
      if state.is_abandoned() {
        break;
      }
    }
    state.stop_timer();
    registry.remove_if_same(&state.id, &state.events);
    tracing::debug!(room = %state.id, "room destroyed");
  });
  handle
}

#[derive(Debug)]
struct RoomState {
  id: String,
  size: u32,
  tick_rate: f64,
  started: bool,
  players: Vec<Player>,
  apples: Vec<Cell>,
  events: UnboundedSender<RoomEvent>,
  timer: Option<JoinHandle<()>>,
  ever_joined: bool,
}

impl RoomState {
  fn new(id: String, config: RoomConfig, events: UnboundedSender<RoomEvent>) -> Self {
    let mut state = Self {
      id,
      size: config.size,
      tick_rate: config.tick_rate,
      started: false,
      players: Vec::new(),
      apples: Vec::new(),
      events,
      timer: None,
      ever_joined: false,
    };
    state.seed_apples(config.apple_count);
    state
  }

  fn apply(&mut self, event: RoomEvent) {
    match event {
      RoomEvent::Join { tx, reply } => {
        let _ = reply.send(self.handle_join(tx));
      }
      RoomEvent::Command { session_id, text } => self.handle_command(&session_id, &text),
      RoomEvent::Disconnect { session_id } => self.remove_player(&session_id),
      RoomEvent::Tick => self.tick(),
    }
  }

  fn is_abandoned(&self) -> bool {
    self.ever_joined && self.players.is_empty()
  }

  fn handle_join(&mut self, tx: UnboundedSender<String>) -> JoinReply {
    if self.started || self.players.len() >= MAX_PLAYERS {
      return JoinReply::Locked;
    }
    let session_id = Uuid::new_v4().to_string();
    let index = self.players.len();
    let player = Player::new(session_id.clone(), tx, index, self.size);
    let _ = player.tx.send(ServerEvent::SetBoard { size: self.size }.encode());
    self.players.push(player);
    self.ever_joined = true;
    tracing::debug!(
      room = %self.id,
      session = %session_id,
      players = self.players.len(),
      "player joined"
    );
    self.broadcast_board();
    JoinReply::Accepted { session_id }
  }

  fn handle_command(&mut self, session_id: &str, text: &str) {
    let Some(command) = protocol::decode_command(text) else { return };
    match command {
      ClientCommand::Start => self.handle_start(session_id),
      ClientCommand::SetDirection { dir } => {
        self.handle_set_direction(session_id, dir.as_deref());
      }
      ClientCommand::UpdateRoom {
        apple_count,
        size,
        tick_rate,
      } => self.handle_update_room(session_id, apple_count, size, tick_rate),
    }
  }

  fn is_host(&self, session_id: &str) -> bool {
    self
      .players
      .iter()
      .any(|player| player.session_id == session_id && player.is_host)
  }

  fn handle_start(&mut self, session_id: &str) {
    if self.started || !self.is_host(session_id) {
      return;
    }
    self.reseat_apples();
    self.started = true;
    self.arm_timer();
    tracing::debug!(room = %self.id, tick_rate = self.tick_rate, "game started");
  }

  fn handle_set_direction(&mut self, session_id: &str, dir: Option<&str>) {
    if !self.started {
      return;
    }
    let Some(direction) = dir.and_then(Direction::from_name) else { return };
    if let Some(player) = self
      .players
      .iter_mut()
      .find(|player| player.session_id == session_id)
    {
      player.steer(direction);
    }
  }

  fn handle_update_room(
    &mut self,
    session_id: &str,
    apple_count: Option<u32>,
    size: Option<u32>,
    tick_rate: Option<f64>,
  ) {
    if self.started || !self.is_host(session_id) {
      return;
    }
    if let Some(count) = apple_count.filter(|count| *count >= 1) {
      self.seed_apples(count);
    }
    if let Some(size) = size.filter(|size| *size >= MIN_BOARD_SIZE) {
      self.size = size;
      // clients must resize their view right away, not on the next tick
      let payload = ServerEvent::SetBoard { size }.encode();
      self.send_to_all(payload);
    }
    if let Some(rate) = tick_rate.filter(|rate| rate.is_finite() && *rate > 0.0) {
      self.tick_rate = rate;
    }
  }

  fn seed_apples(&mut self, count: u32) {
    let mut rng = rand::thread_rng();
    self.apples.clear();
    for _ in 0..count {
      match grid::random_free_cell(&mut rng, self.size, &self.players) {
        Some(cell) => self.apples.push(cell),
        None => {
          tracing::warn!(room = %self.id, "board saturated, apple not placed");
          break;
        }
      }
    }
  }

  // apples may sit on reset bodies or outside a shrunk board; fix before play
  fn reseat_apples(&mut self) {
    let mut rng = rand::thread_rng();
    for index in 0..self.apples.len() {
      let apple = self.apples[index];
      if grid::in_bounds(self.size, apple) && grid::is_free(&self.players, apple) {
        continue;
      }
      match grid::random_free_cell(&mut rng, self.size, &self.players) {
        Some(cell) => self.apples[index] = cell,
        None => tracing::warn!(room = %self.id, "board saturated, apple left in place"),
      }
    }
  }

  fn tick(&mut self) {
    if !self.started {
      // a queued tick can outlive its cancelled timer
      return;
    }
    for player in self.players.iter_mut().filter(|player| !player.is_dead) {
      player.advance();
    }
    let deaths = self.evaluate_collisions();
    for &index in &deaths {
      let player = &mut self.players[index];
      player.is_dead = true;
      tracing::debug!(room = %self.id, session = %player.session_id, "snake died");
    }
    if !self.players.is_empty() && self.players.iter().all(|player| player.is_dead) {
      self.reset_round();
    }
    self.broadcast_board();
  }

  /// Two-phase evaluation over post-move positions: deaths are collected
  /// here and applied by the caller, so one snake's death never suppresses
  /// evaluation of another in the same tick.
  fn evaluate_collisions(&mut self) -> HashSet<usize> {
    let mut dead = HashSet::new();
    let living: Vec<usize> = self
      .players
      .iter()
      .enumerate()
      .filter(|(_, player)| !player.is_dead)
      .map(|(index, _)| index)
      .collect();
    let mut rng = rand::thread_rng();

    for &index in &living {
      let Some(head) = self.players[index].head() else { continue };
      if !grid::in_bounds(self.size, head) {
        dead.insert(index);
        continue;
      }

      for &other in &living {
        let other_player = &self.players[other];
        if other != index && other_player.head() == Some(head) {
          // head-to-head: the shorter snake dies, an exact tie kills both
          let length = self.players[index].body.len();
          match length.cmp(&other_player.body.len()) {
            Ordering::Less => {
              dead.insert(index);
            }
            Ordering::Greater => {
              dead.insert(other);
            }
            Ordering::Equal => {
              dead.insert(index);
              dead.insert(other);
            }
          }
        }
        // heads are settled above; body scans skip index 0 of every snake
        if other_player.body.iter().skip(1).any(|cell| *cell == head) {
          dead.insert(index);
        }
      }

      // a collision death does not forfeit an apple landed on this tick;
      // only a wall death skips evaluation
      for apple_index in 0..self.apples.len() {
        if self.apples[apple_index] != head {
          continue;
        }
        self.players[index].grow_next_tick = true;
        match grid::random_free_cell(&mut rng, self.size, &self.players) {
          Some(cell) => self.apples[apple_index] = cell,
          None => tracing::warn!(room = %self.id, "board saturated, apple left in place"),
        }
      }
    }

    dead
  }

  fn reset_round(&mut self) {
    self.stop_timer();
    self.started = false;
    for index in 0..self.players.len() {
      let size = self.size;
      self.players[index].reset(index, size);
    }
    tracing::debug!(room = %self.id, players = self.players.len(), "round over, room reset");
  }

  fn arm_timer(&mut self) {
    let events = self.events.clone();
    let period = Duration::from_secs_f64(1.0 / self.tick_rate);
    self.timer = Some(tokio::spawn(async move {
      let mut interval = tokio::time::interval(period);
      // the first interval tick completes immediately; consume it so the
      // first game tick lands one full period after start
      interval.tick().await;
      loop {
        interval.tick().await;
        if events.send(RoomEvent::Tick).is_err() {
          break;
        }
      }
    }));
  }

  fn stop_timer(&mut self) {
    if let Some(timer) = self.timer.take() {
      timer.abort();
    }
  }

  fn board_snapshot(&self) -> (Vec<Vec<Cell>>, Vec<Cell>) {
    let players = self
      .players
      .iter()
      .filter(|player| !player.is_dead)
      .map(|player| player.body.clone())
      .collect();
    (players, self.apples.clone())
  }

  fn broadcast_board(&mut self) {
    let (players, apples) = self.board_snapshot();
    let payload = ServerEvent::UpdateBoard { players, apples }.encode();
    self.send_to_all(payload);
  }

  fn send_to_all(&mut self, payload: String) {
    let mut stale = Vec::new();
    for player in &self.players {
      if player.tx.send(payload.clone()).is_err() {
        stale.push(player.session_id.clone());
      }
    }
    for session_id in stale {
      tracing::debug!(room = %self.id, session = %session_id, "dropping unreachable session");
      self.remove_player(&session_id);
    }
  }

  fn remove_player(&mut self, session_id: &str) {
    let before = self.players.len();
    self.players.retain(|player| player.session_id != session_id);
    if self.players.len() == before {
      return;
    }
    tracing::debug!(
      room = %self.id,
      session = %session_id,
      players = self.players.len(),
      "player left"
    );
    if let Some(first) = self.players.first_mut() {
      // join order is preserved, so the front player is the oldest survivor
      first.is_host = true;
      self.broadcast_board();
    } else {
      self.stop_timer();
    }
  }
}
