//! Wire protocol (component J): a tag-array JSON encoding, matching
//! `snakepit/messaging.py`'s `Messaging` helper class byte-for-byte in
//! shape. A message is `[tag, ...args]`; a single send wraps that one array
//! in an outer array (`_send_one`), and a batched send is a list of such
//! arrays sent together (`_send_all`/`_send_msg_all_multi`). Incoming
//! client messages are either a bare integer (a key code, per
//! `player.keypress`) or a `[tag, ...args]` array (`new_player`/`join`).

use std::sync::Arc;

use serde_json::{json, Value};

use crate::error::GameError;
use crate::scores::ScoreEntryWithHint;
use crate::types::{Direction, Draw, PlayerId};

const MSG_SYNC: &str = "sync";

const MSG_NEW_PLAYER: &str = "new_player";
const MSG_JOIN: &str = "join";
const MSG_HANDSHAKE: &str = "handshake";
const MSG_WORLD: &str = "world";
const MSG_P_JOINED: &str = "p_joined";
const MSG_P_GAMEOVER: &str = "p_gameover";
const MSG_P_SCORE: &str = "p_score";
const MSG_RESET_WORLD: &str = "reset_world";
const MSG_TOP_SCORES: &str = "top_scores";
const MSG_RENDER: &str = "render";
const MSG_ERROR: &str = "error";
const MSG_PING: &str = "ping";
const MSG_PONG: &str = "pong";

#[derive(Debug, Clone)]
pub enum ServerMsg {
    Handshake { name: String, id: PlayerId, settings: Value },
    World(Vec<Vec<(char, u8)>>),
    TopScores(Vec<ScoreEntryWithHint>),
    PJoined { id: PlayerId, name: String, color: u8, score: i64 },
    PGameOver { id: PlayerId },
    PScore { id: PlayerId, score: i64 },
    ResetWorld,
    Render(Draw),
    Sync { frame: u64, speed: f64 },
    Error(String),
    Ping,
    /// Echoes back whatever args accompanied the client's `ping`.
    Pong(Vec<Value>),
}

impl ServerMsg {
    fn to_value(&self) -> Value {
        match self {
            ServerMsg::Handshake { name, id, settings } => {
                json!([MSG_HANDSHAKE, name, id, settings])
            }
            ServerMsg::World(rows) => json!([MSG_WORLD, rows]),
            ServerMsg::TopScores(entries) => {
                let rows: Vec<Value> = entries
                    .iter()
                    .map(|e| json!([e.name, e.score, e.color_hint]))
                    .collect();
                json!([MSG_TOP_SCORES, rows])
            }
            ServerMsg::PJoined { id, name, color, score } => {
                json!([MSG_P_JOINED, id, name, color, score])
            }
            ServerMsg::PGameOver { id } => json!([MSG_P_GAMEOVER, id]),
            ServerMsg::PScore { id, score } => json!([MSG_P_SCORE, id, score]),
            ServerMsg::ResetWorld => json!([MSG_RESET_WORLD]),
            ServerMsg::Render(draw) => json!([MSG_RENDER, draw.x, draw.y, draw.ch, draw.color]),
            ServerMsg::Sync { frame, speed } => json!([MSG_SYNC, frame, speed]),
            ServerMsg::Error(text) => json!([MSG_ERROR, text]),
            ServerMsg::Ping => json!([MSG_PING]),
            ServerMsg::Pong(args) => {
                let mut row = vec![Value::String(MSG_PONG.to_string())];
                row.extend(args.iter().cloned());
                Value::Array(row)
            }
        }
    }
}

/// Encodes a single message as `[[tag, ...args]]`, matching `_send_one`.
pub fn encode_single(msg: &ServerMsg) -> Arc<str> {
    Value::Array(vec![msg.to_value()]).to_string().into()
}

/// Encodes a batch of messages as `[[tag, ...args], ...]`, matching
/// `_send_all`/`_send_msg_all_multi`.
pub fn encode_batch(msgs: &[ServerMsg]) -> Arc<str> {
    let values: Vec<Value> = msgs.iter().map(ServerMsg::to_value).collect();
    Value::Array(values).to_string().into()
}

#[derive(Debug, Clone, PartialEq)]
pub enum ClientMsg {
    NewPlayer { name: String, id: Option<String> },
    Join,
    Ping(Vec<Value>),
    Keypress(Direction),
}

/// Parses one incoming text frame. A bare JSON integer is a key code; a
/// `[tag, ...]` array names `new_player`/`join`. Anything else, and any key
/// code that doesn't map to a known arrow key, is rejected.
pub fn parse_client_message(raw: &str) -> Result<ClientMsg, GameError> {
    let value: Value =
        serde_json::from_str(raw).map_err(|e| GameError::MalformedMessage(e.to_string()))?;

    if let Some(code) = value.as_i64() {
        return Direction::from_key_code(code)
            .map(ClientMsg::Keypress)
            .ok_or_else(|| GameError::MalformedMessage(format!("unknown key code {code}")));
    }

    let Value::Array(items) = value else {
        return Err(GameError::MalformedMessage(
            "expected an integer or an array".to_string(),
        ));
    };

    let tag = items
        .first()
        .and_then(Value::as_str)
        .ok_or_else(|| GameError::MalformedMessage("missing message tag".to_string()))?;

    match tag {
        MSG_NEW_PLAYER => {
            let name = items
                .get(1)
                .and_then(Value::as_str)
                .ok_or_else(|| GameError::MalformedMessage("new_player needs a name".to_string()))?;
            let id = items.get(2).and_then(Value::as_str).map(str::to_string);
            Ok(ClientMsg::NewPlayer { name: name.to_string(), id })
        }
        MSG_JOIN => Ok(ClientMsg::Join),
        MSG_PING => Ok(ClientMsg::Ping(items.into_iter().skip(1).collect())),
        other => Err(GameError::MalformedMessage(format!("unknown tag {other:?}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Position;

    #[test]
    fn keypress_code_parses_to_direction() {
        assert_eq!(parse_client_message("37").unwrap(), ClientMsg::Keypress(Direction::Left));
        assert_eq!(parse_client_message("40").unwrap(), ClientMsg::Keypress(Direction::Down));
    }

    #[test]
    fn unknown_key_code_is_rejected() {
        assert!(parse_client_message("13").is_err());
    }

    #[test]
    fn new_player_array_parses_name() {
        let parsed = parse_client_message(r#"["new_player", "alice"]"#).unwrap();
        assert_eq!(
            parsed,
            ClientMsg::NewPlayer {
                name: "alice".to_string(),
                id: None
            }
        );
    }

    #[test]
    fn new_player_array_parses_optional_id() {
        let parsed = parse_client_message(r#"["new_player", "alice", "p1"]"#).unwrap();
        assert_eq!(
            parsed,
            ClientMsg::NewPlayer {
                name: "alice".to_string(),
                id: Some("p1".to_string())
            }
        );
    }

    #[test]
    fn join_array_parses() {
        assert_eq!(parse_client_message(r#"["join"]"#).unwrap(), ClientMsg::Join);
    }

    #[test]
    fn garbage_is_rejected() {
        assert!(parse_client_message(r#"{"not":"an array"}"#).is_err());
    }

    #[test]
    fn single_message_wraps_in_outer_array() {
        let encoded = encode_single(&ServerMsg::PGameOver { id: "p1".to_string() });
        let value: Value = serde_json::from_str(&encoded).unwrap();
        assert_eq!(value, json!([["p_gameover", "p1"]]));
    }

    #[test]
    fn render_message_flattens_draw_fields() {
        let draw = Draw::new(Position::new(2, 3), '@', 4);
        let encoded = encode_batch(&[ServerMsg::Render(draw)]);
        let value: Value = serde_json::from_str(&encoded).unwrap();
        assert_eq!(value, json!([["render", 2, 3, "@", 4]]));
    }

    #[test]
    fn batch_preserves_order() {
        let msgs = vec![ServerMsg::Ping, ServerMsg::Pong(vec![json!(42)])];
        let encoded = encode_batch(&msgs);
        let value: Value = serde_json::from_str(&encoded).unwrap();
        assert_eq!(value, json!([["ping"], ["pong", 42]]));
    }

    #[test]
    fn ping_round_trips_its_args() {
        let parsed = parse_client_message(r#"["ping", 7, "tag"]"#).unwrap();
        assert_eq!(parsed, ClientMsg::Ping(vec![json!(7), json!("tag")]));
    }
}
