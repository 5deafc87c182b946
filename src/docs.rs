//! OpenAPI documentation for the snake arena server.
//!
//! Grounded on the teacher's `docs.rs`: a `utoipa` `ApiDoc` listing the
//! HTTP paths and schemas, plus a plain-text `API_DOCUMENTATION` constant
//! describing the WebSocket wire protocol for client authors (the JSON
//! protocol isn't itself expressible as OpenAPI paths, since it's a single
//! `/connect` upgrade carrying a tag-array message stream, not a request/
//! response surface).

use utoipa::OpenApi;

use crate::server::GameStats;
use crate::types::{Direction, Position};

/// OpenAPI specification for the snake arena server's HTTP surface.
#[derive(OpenApi)]
#[openapi(
    paths(
        crate::server::health_check,
        crate::server::game_stats,
        crate::server::serve_index,
        crate::server::serve_api_docs,
        crate::server::serve_openapi_spec,
    ),
    components(schemas(Position, Direction, GameStats)),
    tags(
        (name = "health", description = "Health check and monitoring endpoints"),
        (name = "game", description = "Game state and statistics endpoints"),
        (name = "docs", description = "Protocol documentation endpoints"),
    ),
    info(
        title = "Snake Arena API",
        version = "1.0.0",
        description = "A real-time multiplayer snake arena. Gameplay itself happens over a single WebSocket upgrade (see `/docs` for the wire protocol); this OpenAPI document covers the surrounding HTTP surface: health, stats, and documentation.",
        license(
            name = "MIT",
            url = "https://opensource.org/licenses/MIT"
        )
    )
)]
pub struct ApiDoc;

/// Plain-text protocol documentation served at `/docs`.
pub const API_DOCUMENTATION: &str = r#"
# Snake Arena Protocol

## Overview

Players connect over a single WebSocket upgrade at `/connect`. Every frame
in either direction is JSON text. Server frames are always a batch: a JSON
array of `[tag, ...args]` messages, even when the batch holds one message.
Client frames are either a bare integer (an arrow-key code) or a single
`[tag, ...args]` array.

## Connecting

```
ws://host:port/connect
```

## Client -> Server messages

### Key code
A bare JSON integer naming an arrow key:

```json
37   // left
38   // up
39   // right
40   // down
```

### new_player
```json
["new_player", "display name"]
["new_player", "display name", "previously issued player id"]
```
Performs the handshake. The optional third element lets a reconnecting
client resume its prior identity (and, if still alive, its in-progress
snake) instead of being issued a new one. The server replies with a
`handshake` message and the current `world`/`top_scores` snapshot.

### join
```json
["join"]
```
Enters the sender into the game: starts the clock if this is the first
player, allocates a color, and queues the player's snake to be placed on
the next tick.

### ping
```json
["ping", ...anything]
```
Echoed back verbatim as a `pong` message, for round-trip latency checks.

## Server -> Client messages

Each outer frame is a JSON array of these, e.g. `[["sync", 42, 2.3],
["render", 3, 4, "@", 1]]`.

- `["handshake", name, id, settings]` - reply to `new_player`.
- `["world", rows]` - a full-grid snapshot, each cell `[char, color]`.
- `["top_scores", [[name, score, color_hint], ...]]`
- `["p_joined", id, name, color, score]`
- `["p_gameover", id]`
- `["p_score", id, score]`
- `["reset_world"]` - a new game has started; discard all local state.
- `["render", x, y, ch, color]` - one cell changed.
- `["sync", frame, speed]` - sent once per tick, before any `render`s.
- `["error", message]`
- `["ping"]` / `["pong", ...args]`

## Rules in brief

- The world has hard edges: moving off the grid is a wall death, not a wrap.
- A snake also dies on collision with another snake's body, a stone, or
  (depending on timing) a tail it can no longer catch.
- Eating a digit grows the snake by that many cells and adds that many
  points to its score.
- The last snake standing, or the first to empty the board of rivals,
  ends the round; scores are persisted to the top-scores table and a new
  round begins on the next `join`.
"#;
