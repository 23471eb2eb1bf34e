use crate::game::room::{self, JoinReply, RoomEvent, RoomHandle};
use crate::game::types::RoomConfig;
use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedSender;
use tokio::sync::oneshot;

/// Process-wide room store: rooms are created on first reference and remove
/// themselves once their player set empties. Injected as shared state, never
/// reached through a global.
#[derive(Debug, Default)]
pub struct RoomRegistry {
  rooms: DashMap<String, RoomHandle>,
}

#[derive(Debug)]
pub struct JoinedRoom {
  pub handle: RoomHandle,
  pub session_id: String,
}

#[derive(Debug, PartialEq, Eq)]
pub enum JoinError {
  /// The room is running or at the player cap.
  Locked,
  /// The room shut down while the join was in flight and a retry also lost
  /// the race.
  Unavailable,
}

impl RoomRegistry {
  pub fn new() -> Arc<Self> {
    Arc::new(Self {
      rooms: DashMap::new(),
    })
  }

  fn get_or_spawn(self: &Arc<Self>, id: &str, config: RoomConfig) -> RoomHandle {
    match self.rooms.entry(id.to_string()) {
      dashmap::mapref::entry::Entry::Occupied(entry) => entry.get().clone(),
      dashmap::mapref::entry::Entry::Vacant(entry) => {
        let handle = room::spawn_room(id.to_string(), config, Arc::clone(self));
        entry.insert(handle.clone());
        handle
      }
    }
  }

  pub async fn join(
    self: &Arc<Self>,
    id: &str,
    config: RoomConfig,
    tx: UnboundedSender<String>,
  ) -> Result<JoinedRoom, JoinError> {
    // an emptied room tears itself down; losing that race is retried once
    // against a freshly spawned replacement
    for _ in 0..2 {
      let handle = self.get_or_spawn(id, config);
      let (reply_tx, reply_rx) = oneshot::channel();
      if !handle.send(RoomEvent::Join {
        tx: tx.clone(),
        reply: reply_tx,
      }) {
        self.remove_if_same(id, &handle.events);
        continue;
      }
      match reply_rx.await {
        Ok(JoinReply::Accepted { session_id }) => {
          return Ok(JoinedRoom { handle, session_id });
        }
        Ok(JoinReply::Locked) => return Err(JoinError::Locked),
        Err(_) => continue,
      }
    }
    Err(JoinError::Unavailable)
  }

  /// Removes the entry for `id` only if it still maps to the same room
  /// worker; a replacement spawned in the meantime is left alone.
  pub(crate) fn remove_if_same(&self, id: &str, events: &UnboundedSender<RoomEvent>) {
    self
      .rooms
      .remove_if(id, |_, handle| handle.events.same_channel(events));
  }

  pub fn room_count(&self) -> usize {
    self.rooms.len()
  }
}
