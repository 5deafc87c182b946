//! The session layer (component G) and the clock/tick loop (component I).
//!
//! Grounded on the teacher's `server.rs` for the axum/websocket scaffolding
//! (router, split sender/receiver, per-connection write task) and on
//! `snakepit/server.py`'s `GameServer` for the single-writer game actor: one
//! task owns the [`Game`] exclusively, driven by a command channel from
//! connection handlers and by its own tick clock, so no lock is needed
//! around world/player/score state (spec §5).

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{
        ws::{CloseFrame, Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::{Html, IntoResponse, Response},
    routing::get,
    Router,
};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::{mpsc, oneshot};
use tokio_stream::wrappers::IntervalStream;
use tokio_stream::StreamExt as _;
use tokio_util::sync::CancellationToken;
use tower_http::{cors::CorsLayer, services::ServeDir};
use tracing::{debug, info, warn};
use utoipa::OpenApi;

use crate::config::Settings;
use crate::constants::PLAYER_ENDPOINT;
use crate::docs::{ApiDoc, API_DOCUMENTATION};
use crate::error::GameError;
use crate::game::{Game, JoinOutcome};
use crate::protocol::{self, ClientMsg, ServerMsg};
use crate::types::{Direction, PlayerId};

/// A request from a connection handler to the game actor. The actor is the
/// sole mutator of [`Game`]; everything that touches world/player state
/// crosses this channel instead of a shared lock.
enum GameCommand {
    Handshake {
        name: String,
        id: Option<String>,
        tx: crate::player::OutboundTx,
        reply: oneshot::Sender<Result<(PlayerId, Vec<ServerMsg>), GameError>>,
    },
    Join {
        player_id: PlayerId,
    },
    Keypress {
        player_id: PlayerId,
        direction: Direction,
    },
    Stats {
        reply: oneshot::Sender<GameStats>,
    },
}

#[derive(Debug, Clone, serde::Serialize, utoipa::ToSchema)]
pub struct GameStats {
    pub frame: u64,
    pub speed: f64,
    pub running: bool,
    pub alive_players: usize,
    pub max_players: usize,
}

#[derive(Clone)]
pub struct AppState {
    game_tx: mpsc::UnboundedSender<GameCommand>,
    pub shutdown: CancellationToken,
}

/// Owns the [`Game`] and steps it: processes inbound commands between
/// ticks, and while a game is running, drives the fixed-step clock
/// (component I), re-deriving its tick interval whenever the speed ramp
/// changes `speed`.
struct GameActor {
    game: Game,
    rx: mpsc::UnboundedReceiver<GameCommand>,
    shutdown: CancellationToken,
}

impl GameActor {
    async fn run(mut self) {
        loop {
            if self.shutdown.is_cancelled() {
                return;
            }
            if self.game.running {
                self.run_ticking_phase().await;
            } else {
                tokio::select! {
                    _ = self.shutdown.cancelled() => return,
                    maybe_cmd = self.rx.recv() => match maybe_cmd {
                        Some(cmd) => self.handle_command(cmd),
                        None => return,
                    },
                }
            }
        }
    }

    async fn run_ticking_phase(&mut self) {
        while self.game.running {
            let interval_secs = 1.0 / self.game.speed().max(0.001);
            let mut ticks = IntervalStream::new(tokio::time::interval(Duration::from_secs_f64(
                interval_secs,
            )));
            let speed_at_start = self.game.speed();

            loop {
                tokio::select! {
                    biased;
                    _ = self.shutdown.cancelled() => return,
                    maybe_cmd = self.rx.recv() => {
                        match maybe_cmd {
                            Some(cmd) => self.handle_command(cmd),
                            None => return,
                        }
                        if !self.game.running {
                            return;
                        }
                    }
                    Some(_) = ticks.next() => {
                        let batch = self.game.run_tick();
                        self.broadcast(&batch);
                        if self.game.shutdown_requested() {
                            self.shutdown.cancel();
                            return;
                        }
                        if !self.game.running || self.game.speed() != speed_at_start {
                            break;
                        }
                    }
                }
            }
        }
    }

    fn handle_command(&mut self, cmd: GameCommand) {
        match cmd {
            GameCommand::Handshake { name, id, tx, reply } => {
                let result = self.game.handshake(&name, id.as_deref(), tx);
                if let Ok((player_id, _)) = &result {
                    info!(player = %player_id, name, "player handshake");
                }
                let _ = reply.send(result);
            }
            GameCommand::Join { player_id } => self.handle_join(player_id),
            GameCommand::Keypress { player_id, direction } => {
                self.game.keypress(&player_id, direction);
            }
            GameCommand::Stats { reply } => {
                let _ = reply.send(GameStats {
                    frame: self.game.frame(),
                    speed: self.game.speed(),
                    running: self.game.running,
                    alive_players: self.game.alive_count(),
                    max_players: self.game.settings().max_players,
                });
            }
        }
    }

    fn handle_join(&mut self, player_id: PlayerId) {
        let mut batch = Vec::new();
        if let Some(reset_msg) = self.game.ensure_running() {
            batch.push(reset_msg);
            info!(frame = self.game.frame(), "game (re)started");
        }

        match self.game.join(&player_id) {
            Ok(JoinOutcome::Joined(msgs)) => {
                batch.extend(msgs);
                self.broadcast(&batch);
            }
            Ok(JoinOutcome::AlreadyAlive) => {
                if !batch.is_empty() {
                    self.broadcast(&batch);
                }
            }
            Ok(JoinOutcome::Full) => {
                if !batch.is_empty() {
                    self.broadcast(&batch);
                }
                self.send_to(&player_id, &ServerMsg::Error("Maximum players reached".to_string()));
            }
            Err(err) => {
                warn!(player = %player_id, %err, "join failed");
                self.send_to(&player_id, &ServerMsg::Error(err.to_string()));
            }
        }
    }

    fn broadcast(&self, batch: &[ServerMsg]) {
        if batch.is_empty() {
            return;
        }
        let payload = protocol::encode_batch(batch);
        for player in self.game.players().values() {
            player.send(payload.clone());
        }
    }

    fn send_to(&self, player_id: &str, msg: &ServerMsg) {
        if let Some(player) = self.game.players().get(player_id) {
            player.send(protocol::encode_single(msg));
        }
    }
}

pub fn create_app(settings: Arc<Settings>, shutdown: CancellationToken) -> Router {
    let (game_tx, game_rx) = mpsc::unbounded_channel();
    let game = Game::new(settings.clone());
    let actor = GameActor {
        game,
        rx: game_rx,
        shutdown: shutdown.clone(),
    };
    tokio::spawn(actor.run());

    let state = AppState { game_tx, shutdown };

    Router::new()
        .route(PLAYER_ENDPOINT, get(websocket_handler))
        .route("/health", get(health_check))
        .route("/stats", get(game_stats))
        .route("/", get(serve_index))
        .route("/docs", get(serve_api_docs))
        .route("/api-spec.json", get(serve_openapi_spec))
        .nest_service("/static", ServeDir::new("static"))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[utoipa::path(get, path = "/health", tag = "health", responses((status = 200, description = "Server is healthy", body = String)))]
async fn health_check() -> impl IntoResponse {
    "OK"
}

#[utoipa::path(get, path = "/stats", tag = "game", responses((status = 200, description = "Current game statistics", body = GameStats)))]
async fn game_stats(State(state): State<AppState>) -> impl IntoResponse {
    let (reply, rx) = oneshot::channel();
    if state.game_tx.send(GameCommand::Stats { reply }).is_err() {
        return axum::Json(GameStats {
            frame: 0,
            speed: 0.0,
            running: false,
            alive_players: 0,
            max_players: 0,
        });
    }
    let stats = rx.await.unwrap_or(GameStats {
        frame: 0,
        speed: 0.0,
        running: false,
        alive_players: 0,
        max_players: 0,
    });
    axum::Json(stats)
}

#[utoipa::path(get, path = "/", tag = "game", responses((status = 200, description = "Main game interface", content_type = "text/html")))]
async fn serve_index() -> impl IntoResponse {
    match tokio::fs::read_to_string("static/index.html").await {
        Ok(content) => Html(content),
        Err(_) => Html("<h1>Snake Arena</h1><p>GUI not found. Check the static/ directory.</p>".to_string()),
    }
}

#[utoipa::path(get, path = "/docs", tag = "docs", responses((status = 200, description = "Protocol documentation", content_type = "text/html")))]
async fn serve_api_docs() -> impl IntoResponse {
    Html(format!(
        "<!DOCTYPE html><html><head><title>Snake Arena Protocol</title></head><body><pre>{}</pre></body></html>",
        API_DOCUMENTATION
    ))
}

#[utoipa::path(get, path = "/api-spec.json", tag = "docs", responses((status = 200, description = "OpenAPI specification", content_type = "application/json")))]
async fn serve_openapi_spec() -> impl IntoResponse {
    axum::Json(ApiDoc::openapi())
}

async fn websocket_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    ws.on_upgrade(move |socket| handle_connection(socket, state))
}

/// One player connection: a write task fanning out the game actor's
/// broadcasts (and closing with `GOING_AWAY` on shutdown), and a read loop
/// dispatching parsed client frames to the game actor.
async fn handle_connection(socket: WebSocket, state: AppState) {
    let (mut ws_tx, mut ws_rx) = socket.split();
    let (tx, mut out_rx) = mpsc::unbounded_channel::<std::sync::Arc<str>>();
    let shutdown = state.shutdown.clone();

    let writer = tokio::spawn(async move {
        loop {
            tokio::select! {
                biased;
                _ = shutdown.cancelled() => {
                    // 1001: GOING_AWAY
                    let frame = CloseFrame {
                        code: 1001,
                        reason: "server shutting down".into(),
                    };
                    let _ = ws_tx.send(Message::Close(Some(frame))).await;
                    return;
                }
                maybe_payload = out_rx.recv() => {
                    match maybe_payload {
                        Some(payload) => {
                            if ws_tx.send(Message::Text(payload.to_string())).await.is_err() {
                                return;
                            }
                        }
                        None => return,
                    }
                }
            }
        }
    });

    let mut player_id: Option<PlayerId> = None;

    while let Some(Ok(msg)) = ws_rx.next().await {
        let Message::Text(text) = msg else { continue };

        match protocol::parse_client_message(&text) {
            Ok(ClientMsg::NewPlayer { name, id }) => {
                let (reply, reply_rx) = oneshot::channel();
                if state
                    .game_tx
                    .send(GameCommand::Handshake { name, id, tx: tx.clone(), reply })
                    .is_err()
                {
                    break;
                }
                match reply_rx.await {
                    Ok(Ok((id, msgs))) => {
                        player_id = Some(id);
                        let _ = tx.send(protocol::encode_batch(&msgs));
                    }
                    Ok(Err(err)) => {
                        let _ = tx.send(protocol::encode_single(&ServerMsg::Error(err.to_string())));
                        break;
                    }
                    Err(_) => break,
                }
            }
            Ok(ClientMsg::Join) => match &player_id {
                Some(id) => {
                    let _ = state.game_tx.send(GameCommand::Join { player_id: id.clone() });
                }
                None => {
                    let _ = tx.send(protocol::encode_single(&ServerMsg::Error(
                        "join before new_player".to_string(),
                    )));
                }
            },
            Ok(ClientMsg::Keypress(direction)) => {
                if let Some(id) = &player_id {
                    let _ = state.game_tx.send(GameCommand::Keypress {
                        player_id: id.clone(),
                        direction,
                    });
                }
            }
            Ok(ClientMsg::Ping(args)) => {
                let _ = tx.send(protocol::encode_single(&ServerMsg::Pong(args)));
            }
            Err(err) => {
                debug!(%err, "malformed client message");
                let _ = tx.send(protocol::encode_single(&ServerMsg::Error(err.to_string())));
                if player_id.is_none() {
                    break;
                }
            }
        }
    }

    drop(tx);
    let _ = writer.await;
    info!(player = ?player_id, "connection closed");
}
