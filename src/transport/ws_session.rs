use crate::game::room::{RoomEvent, RoomHandle};
use axum::extract::ws::{Message, WebSocket};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc::UnboundedReceiver;

/// Pumps one accepted connection: outbound frames are drained by their own
/// task so a slow socket never holds up the room, inbound text frames are
/// forwarded to the room's event queue, and the room always learns about
/// the disconnect.
pub async fn run_session(
  socket: WebSocket,
  room: RoomHandle,
  session_id: String,
  mut outbound: UnboundedReceiver<String>,
) {
  let (mut sender, mut receiver) = socket.split();

  let send_task = tokio::spawn(async move {
    while let Some(payload) = outbound.recv().await {
      if sender.send(Message::Text(payload)).await.is_err() {
        break;
      }
    }
  });

  while let Some(result) = receiver.next().await {
    let Ok(message) = result else { break };
    match message {
      Message::Text(text) => {
        if !room.send(RoomEvent::Command {
          session_id: session_id.clone(),
          text,
        }) {
          break;
        }
      }
      Message::Close(_) => break,
      _ => {}
    }
  }

  room.send(RoomEvent::Disconnect { session_id });
  send_task.abort();
}
