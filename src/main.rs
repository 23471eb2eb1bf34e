use axum::{
  extract::{Query, State, WebSocketUpgrade},
  http::{Method, StatusCode},
  response::{Html, IntoResponse, Redirect, Response},
  routing::get,
  Json, Router,
};
use serde::Serialize;
use std::collections::HashMap;
use std::env;
use std::sync::Arc;
use tokio::sync::mpsc;
use tower_http::cors::{Any, CorsLayer};
use tracing_subscriber::EnvFilter;

mod game;
mod protocol;
mod registry;
mod shared;
mod transport;

use game::types::RoomConfig;
use registry::{JoinError, RoomRegistry};

const INDEX_HTML_PATH: &str = "static/index.html";

#[derive(Clone)]
struct AppState {
  registry: Arc<RoomRegistry>,
  cached_page: Option<Arc<String>>,
}

#[derive(Debug, Serialize)]
struct HealthResponse {
  ok: bool,
  rooms: usize,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::from_default_env())
    .init();

  let cached_page = if env::var("CACHE_HTML").is_ok() {
    Some(Arc::new(std::fs::read_to_string(INDEX_HTML_PATH)?))
  } else {
    None
  };

  let state = AppState {
    registry: RoomRegistry::new(),
    cached_page,
  };

  let cors = CorsLayer::new()
    .allow_origin(Any)
    .allow_methods([Method::GET])
    .allow_headers(Any);

  let app: Router = Router::new()
    .route("/", get(index))
    .route("/ws", get(ws_handler))
    .route("/api/health", get(health))
    .layer(cors)
    .with_state(state);

  let port: u16 = env::var("PORT")
    .ok()
    .and_then(|value| value.parse().ok())
    .unwrap_or(8787);

  let address = format!("0.0.0.0:{port}");
  tracing::info!("listening on {address}");

  let listener = tokio::net::TcpListener::bind(&address).await?;
  axum::serve(listener, app).await?;

  Ok(())
}

async fn health(State(state): State<AppState>) -> impl IntoResponse {
  Json(HealthResponse {
    ok: true,
    rooms: state.registry.room_count(),
  })
}

async fn index(
  State(state): State<AppState>,
  Query(params): Query<HashMap<String, String>>,
) -> Response {
  if !params.contains_key("room") {
    let mut location = format!("/?room={}", shared::room_id::generate());
    for (key, value) in &params {
      location.push_str(&format!("&{key}={value}"));
    }
    return Redirect::temporary(&location).into_response();
  }
  if let Some(page) = &state.cached_page {
    return Html(page.to_string()).into_response();
  }
  match tokio::fs::read_to_string(INDEX_HTML_PATH).await {
    Ok(page) => Html(page).into_response(),
    Err(error) => {
      tracing::error!(?error, "failed to read game page");
      StatusCode::INTERNAL_SERVER_ERROR.into_response()
    }
  }
}

async fn ws_handler(
  ws: WebSocketUpgrade,
  State(state): State<AppState>,
  Query(params): Query<HashMap<String, String>>,
) -> Response {
  let Some(room_id) = params
    .get("room")
    .map(|room| room.trim().to_string())
    .filter(|room| !room.is_empty())
  else {
    return (StatusCode::BAD_REQUEST, "missing room parameter").into_response();
  };
  let config = RoomConfig::from_params(
    params.get("size").and_then(|value| value.parse().ok()),
    params.get("tick_rate").and_then(|value| value.parse().ok()),
    params.get("apples").and_then(|value| value.parse().ok()),
  );

  let (tx, rx) = mpsc::unbounded_channel();
  match state.registry.join(&room_id, config, tx).await {
    Ok(joined) => ws
      .on_upgrade(move |socket| {
        transport::ws_session::run_session(socket, joined.handle, joined.session_id, rx)
      })
      .into_response(),
    Err(JoinError::Locked) => (
      StatusCode::LOCKED,
      "This game has started or has the maximum allowed of players.",
    )
      .into_response(),
    Err(JoinError::Unavailable) => StatusCode::SERVICE_UNAVAILABLE.into_response(),
  }
}
