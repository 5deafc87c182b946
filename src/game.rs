//! The tick engine (component F) and the process-wide `Game` state it steps.
//!
//! `snakepit/game.py`'s `Game.next_frame` is the starting point: the
//! per-player loop over alive snakes, the digit/wall/collision checks on
//! the next position, and the game-over bookkeeping in `Game._game_over`
//! (now split out as this module's `game_over`). The postponement queue and
//! the pre-render/committed-cell decision tables for tail-chases and
//! frontal crashes are not present in that simpler original loop — they
//! implement the more detailed within-frame dependency resolution this
//! server's spec calls for. `snakepit/world.py` supplies the flush step and
//! `snakepit/game.py`'s `spawn_digit`/`spawn_stone` the per-tick spawn
//! calls; `snakepit/messaging.py` supplies the message batch shape, now
//! expressed as strongly typed [`ServerMsg`] values instead of that
//! module's dict literals.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;

use indexmap::IndexMap;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, warn};

use crate::config::Settings;
use crate::constants::*;
use crate::error::{GameError, GameResult};
use crate::player::{OutboundTx, Player};
use crate::protocol::ServerMsg;
use crate::render::RenderBuffer;
use crate::scores::TopScores;
use crate::spawner;
use crate::types::{Direction, Draw, PlayerId, Position};
use crate::world::World;

/// Outcome of a `[MSG_JOIN]` request, per spec §4.G.
pub enum JoinOutcome {
    /// The player was already alive; no state changed.
    AlreadyAlive,
    /// The arena is already at `max_players` alive snakes.
    Full,
    /// A snake slot was allocated; broadcast the carried `p_joined`.
    Joined(Vec<ServerMsg>),
}

/// Per-frame flags accumulated while resolving one player's move, mirroring
/// the local variables `game.py`'s `next_frame` tracks per snake.
#[derive(Default)]
struct MoveFlags {
    grow: u32,
    snake_crash: bool,
    tail_chase: bool,
    tail_crash: bool,
    own_tail_chaser: bool,
}

/// The process-wide game state: world, players, palette, score table, and
/// the clock. A single `Game` is owned exclusively by the actor task in
/// `server.rs`; nothing else mutates it, so the cooperative single-writer
/// model in spec §5 needs no locking here.
pub struct Game {
    pub(crate) world: World,
    pub(crate) players: IndexMap<PlayerId, Player>,
    free_colors: Vec<u8>,
    pub(crate) top_scores: TopScores,
    pub(crate) frame: u64,
    pub(crate) speed: f64,
    pub(crate) running: bool,
    pub(crate) shutdown_requested: bool,
    rng: StdRng,
    settings: Arc<Settings>,
}

impl Game {
    pub fn new(settings: Arc<Settings>) -> Self {
        let world = World::new(settings.field_size_x, settings.field_size_y);
        let top_scores = TopScores::load(&settings.top_scores_file, settings.max_top_scores);
        let free_colors = (1..=settings.num_colors).rev().collect();

        Self {
            world,
            players: IndexMap::new(),
            free_colors,
            top_scores,
            frame: 0,
            speed: settings.game_speed,
            running: false,
            shutdown_requested: false,
            rng: StdRng::from_entropy(),
            settings,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn players(&self) -> &IndexMap<PlayerId, Player> {
        &self.players
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }

    pub fn speed(&self) -> f64 {
        self.speed
    }

    pub fn shutdown_requested(&self) -> bool {
        self.shutdown_requested
    }

    pub fn alive_count(&self) -> usize {
        self.players.values().filter(|p| p.alive()).count()
    }

    /// If no game is currently running, resets the world and clock and
    /// starts one. Returns the `reset_world` broadcast when it did.
    pub fn ensure_running(&mut self) -> Option<ServerMsg> {
        if self.running {
            return None;
        }
        self.world.reset();
        self.frame = 0;
        self.speed = self.settings.game_speed;
        self.running = true;
        self.shutdown_requested = false;
        Some(ServerMsg::ResetWorld)
    }

    /// Registers (or reuses) a player identity for a new connection and
    /// returns its id plus the full handshake sequence (§4.G).
    pub fn handshake(
        &mut self,
        name: &str,
        requested_id: Option<&str>,
        tx: OutboundTx,
    ) -> GameResult<(PlayerId, Vec<ServerMsg>)> {
        let name = name.trim();
        if name.is_empty() || name.chars().count() > 15 {
            return Err(GameError::MalformedMessage(
                "player name must be 1..15 characters".to_string(),
            ));
        }
        if let Some(id) = requested_id {
            if id.is_empty() || id.chars().count() > 36 {
                return Err(GameError::MalformedMessage(
                    "player id must be 1..36 characters".to_string(),
                ));
            }
        }

        let id = match requested_id.and_then(|id| self.players.get_mut(id)) {
            Some(existing) => {
                existing.add_connection(tx.clone());
                existing.id.clone()
            }
            None => {
                let id = uuid::Uuid::new_v4().to_string();
                let mut player = Player::new(id.clone(), name.to_string(), COLOR_NEUTRAL);
                player.add_connection(tx.clone());
                self.players.insert(id.clone(), player);
                id
            }
        };

        let mut msgs = vec![
            ServerMsg::Handshake {
                name: name.to_string(),
                id: id.clone(),
                settings: self.settings.client_view(),
            },
            ServerMsg::Sync {
                frame: self.frame,
                speed: self.speed,
            },
            ServerMsg::World(self.world.rows()),
            ServerMsg::TopScores(
                self.top_scores
                    .with_color_hints(&mut self.rng, self.settings.num_colors),
            ),
        ];
        for player in self.players.values().filter(|p| p.alive()) {
            msgs.push(ServerMsg::PJoined {
                id: player.id.clone(),
                name: player.name.clone(),
                color: player.color,
                score: player.score,
            });
        }

        Ok((id, msgs))
    }

    /// Handles `[MSG_JOIN]` for an already-handshaken player (§4.G).
    pub fn join(&mut self, player_id: &str) -> GameResult<JoinOutcome> {
        let alive_count = self.alive_count();
        let player = self
            .players
            .get_mut(player_id)
            .ok_or_else(|| GameError::UnknownPlayer(player_id.to_string()))?;

        if player.alive() {
            return Ok(JoinOutcome::AlreadyAlive);
        }
        if alive_count >= self.settings.max_players {
            return Ok(JoinOutcome::Full);
        }

        let color = self.free_colors.pop().ok_or(GameError::NoColorAvailable)?;
        player.assign_color(color);
        player.score = 0;

        Ok(JoinOutcome::Joined(vec![ServerMsg::PJoined {
            id: player.id.clone(),
            name: player.name.clone(),
            color: player.color,
            score: player.score,
        }]))
    }

    pub fn keypress(&mut self, player_id: &str, direction: Direction) {
        if let Some(player) = self.players.get_mut(player_id) {
            player.keypress(direction);
        }
    }

    /// Removes a player entirely: frees its color and drops its record.
    /// Called once a player's connection set has gone empty.
    fn remove_player(&mut self, player_id: &str) {
        if let Some(player) = self.players.shift_remove(player_id) {
            if player.color != COLOR_NEUTRAL {
                self.free_colors.push(player.color);
            }
        }
    }

    /// Sweeps closed connections after a tick; forces a game-over for any
    /// player whose connections all closed while alive, then removes it.
    fn sweep_disconnects(&mut self, batch: &mut Vec<ServerMsg>, render: &mut RenderBuffer) {
        let ids: Vec<PlayerId> = self.players.keys().cloned().collect();
        for id in ids {
            let Some(player) = self.players.get_mut(&id) else {
                continue;
            };
            if player.sweep_closed() == 0 || player.has_connections() {
                continue;
            }
            if player.alive() {
                let draws = self.game_over(&id, None, false, batch);
                render.extend(draws);
            }
            self.remove_player(&id);
        }
    }

    /// Advances the world by one frame (§4.F). Returns the full outgoing
    /// message batch for this tick, in send order.
    pub fn run_tick(&mut self) -> Vec<ServerMsg> {
        self.frame += 1;
        let mut batch = vec![ServerMsg::Sync {
            frame: self.frame,
            speed: self.speed,
        }];

        let mut render = RenderBuffer::new();
        let mut moves: HashMap<PlayerId, u32> = HashMap::new();
        let mut frontal_crashers: HashSet<PlayerId> = HashSet::new();
        let mut newborn: Vec<PlayerId> = Vec::new();
        let mut already_postponed: HashSet<PlayerId> = HashSet::new();

        let owner_by_color: HashMap<u8, PlayerId> = self
            .players
            .iter()
            .filter(|(_, p)| p.alive())
            .map(|(id, p)| (p.color, id.clone()))
            .collect();

        let mut pending: VecDeque<PlayerId> = self
            .players
            .iter()
            .filter(|(_, p)| p.alive())
            .map(|(id, _)| id.clone())
            .collect();

        while let Some(pid) = pending.pop_front() {
            let Some(player) = self.players.get(&pid) else {
                continue;
            };
            if player.snake.body.is_empty() {
                newborn.push(pid);
                continue;
            }

            let next_pos = player.snake.next_position();
            if self.world.is_invalid(next_pos) {
                let draws = self.game_over(&pid, None, false, &mut batch);
                render.extend(draws);
                continue;
            }

            let cur = self.world.get(next_pos);
            let pre = render.get(next_pos);
            let first_visit = !moves.contains_key(&pid);
            if first_visit {
                moves.insert(pid.clone(), 0);
            }

            let mut flags = MoveFlags::default();
            if let Some(pre) = pre {
                match pre.ch {
                    ch if is_dead_glyph(ch) => {}
                    CH_HEAD if cur.ch == CH_VOID || cur.ch.is_ascii_digit() => {
                        frontal_crashers.insert(pid.clone());
                        if let Some(other) = owner_by_color.get(&pre.color) {
                            frontal_crashers.insert(other.clone());
                        }
                    }
                    CH_TAIL if cur.ch == CH_TAIL => flags.tail_crash = true,
                    CH_VOID if cur.ch == CH_TAIL => flags.tail_chase = true,
                    CH_BODY => flags.snake_crash = true,
                    _ => {}
                }
            }

            if frontal_crashers.contains(&pid) {
                continue;
            }

            let mut killer: Option<PlayerId> = None;
            let mut dies = false;
            let mut postpone = false;

            if cur.ch.is_ascii_digit() && cur.ch != '0' {
                let value = cur.ch.to_digit(10).expect("checked ascii digit");
                flags.grow = value;
                if let Some(player) = self.players.get_mut(&pid) {
                    player.score += value as i64;
                    batch.push(ServerMsg::PScore {
                        id: pid.clone(),
                        score: player.score,
                    });
                }
            } else if cur.ch == CH_TAIL && !flags.tail_crash {
                if cur.color == self.players[&pid].color {
                    // Own tail, otherMoved=false: it will stay put iff this
                    // snake's own grow counter is still pending.
                    if self.players[&pid].snake.grow > 0 {
                        dies = true;
                    } else {
                        flags.own_tail_chaser = true;
                    }
                } else if let Some(owner_id) = owner_by_color.get(&cur.color).cloned() {
                    let other_moved = moves.get(&owner_id).copied().unwrap_or(0) > 0;
                    let owner = self.players.get(&owner_id);
                    let tail_will_stay = owner
                        .map(|o| {
                            if other_moved {
                                o.snake.grew
                            } else {
                                o.snake.grow > 0
                            }
                        })
                        .unwrap_or(false);

                    if tail_will_stay {
                        dies = true;
                    } else if !flags.tail_chase {
                        if already_postponed.insert(pid.clone()) {
                            pending.push_back(pid.clone());
                            postpone = true;
                        } else {
                            let err = GameError::Internal(format!(
                                "tail-chase postponement invariant violated for player {pid}"
                            ));
                            warn!(player = %pid, %err, "forcing death");
                            dies = true;
                        }
                    }
                }
            } else if cur.ch != CH_VOID {
                if let Some(owner_id) = owner_by_color.get(&cur.color).cloned() {
                    let owner_has_visited = moves.contains_key(&owner_id);
                    if cur.ch == CH_BODY && !owner_has_visited && first_visit {
                        if already_postponed.insert(pid.clone()) {
                            pending.push_back(pid.clone());
                            postpone = true;
                        } else {
                            let err = GameError::Internal(format!(
                                "body postponement invariant violated for player {pid}"
                            ));
                            warn!(player = %pid, %err, "forcing death");
                            dies = true;
                        }
                    } else {
                        let owner_alive = self
                            .players
                            .get(&owner_id)
                            .map(|o| o.alive())
                            .unwrap_or(false);
                        if cur.ch == CH_HEAD && owner_alive && !flags.snake_crash {
                            frontal_crashers.insert(pid.clone());
                            frontal_crashers.insert(owner_id);
                        } else {
                            dies = true;
                            killer = Some(owner_id);
                        }
                    }
                } else {
                    dies = true;
                }
            }

            if postpone || frontal_crashers.contains(&pid) {
                continue;
            }
            if dies {
                let draws = self.game_over(&pid, killer.as_deref(), false, &mut batch);
                render.extend(draws);
                continue;
            }

            let Some(player) = self.players.get_mut(&pid) else {
                continue;
            };
            let draws = player.snake.move_snake(flags.own_tail_chaser);
            render.extend(draws);
            player.snake.grow += flags.grow;
            *moves.entry(pid.clone()).or_insert(0) += 1;
        }

        for pid in frontal_crashers {
            let draws = self.game_over(&pid, None, true, &mut batch);
            render.extend(draws);
        }

        self.flush(&mut render, &mut batch);

        let alive_snakes = self.alive_count();
        for _ in 0..alive_snakes {
            if let Some(draw) = spawner::spawn_digit(
                &self.world,
                &mut self.rng,
                self.settings.digit_spawn_rate,
                false,
                self.settings.digit_min,
                self.settings.digit_max,
                self.settings.num_colors,
            ) {
                render.push(draw);
            }
        }

        for pid in newborn {
            let Some(player) = self.players.get_mut(&pid) else {
                continue;
            };
            match player.new_snake(
                &self.world,
                &mut self.rng,
                self.settings.init_min_distance_border,
                self.settings.init_length,
                self.settings.init_retries,
            ) {
                Ok(draws) => {
                    render.extend(draws);
                    if let Some(draw) = spawner::spawn_digit(
                        &self.world,
                        &mut self.rng,
                        100,
                        true,
                        self.settings.digit_min,
                        self.settings.digit_max,
                        self.settings.num_colors,
                    ) {
                        render.push(draw);
                    }
                }
                Err(_) => {
                    batch.push(ServerMsg::Error(GameError::NoSnakePlacement.to_string()));
                    let draws = self.game_over(&pid, None, false, &mut batch);
                    render.extend(draws);
                }
            }
        }

        self.flush(&mut render, &mut batch);

        if self.settings.stones_enabled {
            if let Some(draw) =
                spawner::spawn_stone(&self.world, &mut self.rng, self.settings.stone_spawn_rate)
            {
                render.push(draw);
            }
            self.flush(&mut render, &mut batch);
        }

        self.apply_speed_ramp();
        self.apply_frame_cap(&mut batch);
        self.sweep_disconnects(&mut batch, &mut render);
        if !render.is_empty() {
            self.flush(&mut render, &mut batch);
        }

        batch
    }

    fn flush(&mut self, render: &mut RenderBuffer, batch: &mut Vec<ServerMsg>) {
        for draw in render.drain() {
            self.world.set(draw.position(), draw.cell());
            batch.push(ServerMsg::Render(draw));
        }
    }

    fn apply_speed_ramp(&mut self) {
        let Some(threshold) = self.settings.game_speed_increase else {
            return;
        };
        if self.frame < threshold {
            return;
        }
        let max_speed = self.settings.game_speed_max.unwrap_or(f64::MAX);
        if self.speed >= max_speed {
            return;
        }
        self.speed = (self.speed * (1.0 + self.settings.game_speed_increase_rate)).min(max_speed);
    }

    /// Forces game-over on every alive player once `GAME_FRAMES_MAX` is
    /// reached, and optionally requests a process shutdown (§4.I).
    fn apply_frame_cap(&mut self, batch: &mut Vec<ServerMsg>) {
        let Some(max_frames) = self.settings.game_frames_max else {
            return;
        };
        if self.frame < max_frames {
            return;
        }

        let ids: Vec<PlayerId> = self
            .players
            .iter()
            .filter(|(_, p)| p.alive())
            .map(|(id, _)| id.clone())
            .collect();
        if ids.is_empty() {
            return;
        }

        let mut extra = RenderBuffer::new();
        for id in ids {
            let draws = self.game_over(&id, None, false, batch);
            extra.extend(draws);
        }
        self.flush(&mut extra, batch);

        if self.settings.game_shutdown_on_frames_max {
            self.shutdown_requested = true;
        }
    }

    /// The game-over sub-procedure (§4.F.2). Returns the dead snake's
    /// repaint draws; pushes every emitted message onto `batch`.
    fn game_over(
        &mut self,
        pid: &str,
        killer: Option<&str>,
        frontal: bool,
        batch: &mut Vec<ServerMsg>,
    ) -> Vec<Draw> {
        let Some(player) = self.players.get_mut(pid) else {
            return Vec::new();
        };
        if !player.snake.alive {
            return Vec::new();
        }
        player.snake.alive = false;
        let draws = player.snake.render_game_over();
        let color = player.color;
        let name = player.name.clone();
        let score = player.score;

        batch.push(ServerMsg::PGameOver { id: pid.to_string() });
        debug!(player = pid, frontal, "game over");

        if !frontal {
            if let Some(killer_id) = killer {
                if killer_id != pid {
                    if let Some(killer_player) = self.players.get_mut(killer_id) {
                        if killer_player.color != color && killer_player.alive() {
                            killer_player.score += self.settings.kill_points;
                            batch.push(ServerMsg::PScore {
                                id: killer_id.to_string(),
                                score: killer_player.score,
                            });
                        }
                    }
                }
            }
        }

        if color != COLOR_NEUTRAL {
            self.free_colors.push(color);
        }

        // A score of 0 never enters the table, matching `_calc_top_scores`'s
        // `if not player.score: return`.
        if score != 0 && self.top_scores.update(&name, score) {
            batch.push(ServerMsg::TopScores(
                self.top_scores
                    .with_color_hints(&mut self.rng, self.settings.num_colors),
            ));
        }

        let mut all_draws = draws;
        if self.alive_count() == 0 {
            all_draws.extend(self.render_game_over_banner());
            self.top_scores.persist();
            self.running = false;
        }

        all_draws
    }

    /// Paints the centered game-over banner (§4.F.2).
    fn render_game_over_banner(&mut self) -> Vec<Draw> {
        let text = GAME_OVER_TEXT;
        let len = text.chars().count() as i32;
        let start_x = (self.world.width() - len) / 2;
        let y = self.world.height() / 2;
        let color = rand::Rng::gen_range(&mut self.rng, 1..=self.settings.num_colors.max(1));

        text.chars()
            .enumerate()
            .map(|(i, ch)| Draw::new(Position::new(start_x + i as i32, y), ch, color))
            .collect()
    }
}

fn is_dead_glyph(ch: char) -> bool {
    matches!(ch, CH_DEAD_HEAD | CH_DEAD_BODY | CH_DEAD_TAIL)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    fn settings() -> Arc<Settings> {
        Arc::new(Settings {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            debug: false,
            game_speed: DEFAULT_GAME_SPEED,
            game_speed_increase: None,
            game_speed_increase_rate: DEFAULT_GAME_SPEED_INCREASE_RATE,
            game_speed_max: None,
            game_frames_max: None,
            game_shutdown_on_frames_max: false,
            max_players: 2,
            num_colors: 2,
            max_top_scores: DEFAULT_MAX_TOP_SCORES,
            field_size_x: 20,
            field_size_y: 20,
            init_length: 3,
            init_min_distance_border: 2,
            init_retries: DEFAULT_INIT_RETRIES,
            digit_min: DEFAULT_DIGIT_MIN,
            digit_max: DEFAULT_DIGIT_MAX,
            kill_points: DEFAULT_KILL_POINTS,
            stones_enabled: false,
            digit_spawn_rate: 0,
            stone_spawn_rate: 0,
            top_scores_file: "/tmp/snake-arena-test-scores.json".to_string(),
        })
    }

    fn connection() -> OutboundTx {
        let (tx, _rx) = mpsc::unbounded_channel();
        tx
    }

    #[test]
    fn handshake_creates_a_fresh_player_and_replays_state() {
        let mut game = Game::new(settings());
        let (id, msgs) = game.handshake("alice", None, connection()).unwrap();
        assert!(!id.is_empty());
        assert!(matches!(msgs[0], ServerMsg::Handshake { .. }));
        assert!(matches!(msgs[1], ServerMsg::Sync { .. }));
        assert!(matches!(msgs[2], ServerMsg::World(_)));
        assert!(matches!(msgs[3], ServerMsg::TopScores(_)));
    }

    #[test]
    fn handshake_with_known_id_reuses_player() {
        let mut game = Game::new(settings());
        let (id, _) = game.handshake("alice", None, connection()).unwrap();
        let (id2, _) = game.handshake("alice", Some(&id), connection()).unwrap();
        assert_eq!(id, id2);
        assert_eq!(game.players.len(), 1);
    }

    #[test]
    fn join_allocates_a_color_and_broadcasts() {
        let mut game = Game::new(settings());
        let (id, _) = game.handshake("alice", None, connection()).unwrap();
        game.ensure_running();
        match game.join(&id).unwrap() {
            JoinOutcome::Joined(msgs) => {
                assert_eq!(msgs.len(), 1);
                assert!(matches!(msgs[0], ServerMsg::PJoined { .. }));
            }
            _ => panic!("expected Joined"),
        }
        assert_ne!(game.players[&id].color, COLOR_NEUTRAL);
    }

    #[test]
    fn join_twice_is_a_noop() {
        let mut game = Game::new(settings());
        let (id, _) = game.handshake("alice", None, connection()).unwrap();
        game.ensure_running();
        game.join(&id).unwrap();
        assert!(matches!(game.join(&id).unwrap(), JoinOutcome::AlreadyAlive));
    }

    #[test]
    fn join_rejects_once_max_players_reached() {
        let mut game = Game::new(settings());
        let (a, _) = game.handshake("a", None, connection()).unwrap();
        let (b, _) = game.handshake("b", None, connection()).unwrap();
        let (c, _) = game.handshake("c", None, connection()).unwrap();
        game.ensure_running();
        game.join(&a).unwrap();
        game.join(&b).unwrap();
        assert!(matches!(game.join(&c).unwrap(), JoinOutcome::Full));
    }

    #[test]
    fn newborn_snake_is_rendered_on_first_tick_after_join() {
        let mut game = Game::new(settings());
        let (id, _) = game.handshake("alice", None, connection()).unwrap();
        game.ensure_running();
        game.join(&id).unwrap();
        assert!(game.players[&id].snake.body.is_empty());

        game.run_tick();

        assert!(!game.players[&id].snake.body.is_empty());
    }

    #[test]
    fn wall_death_marks_snake_dead_and_emits_gameover() {
        let mut game = Game::new(settings());
        let (id, _) = game.handshake("alice", None, connection()).unwrap();
        game.ensure_running();
        game.join(&id).unwrap();
        game.run_tick();

        let player = game.players.get_mut(&id).unwrap();
        player.snake.body.clear();
        player.snake.body.push_back(Position::new(0, 10));
        player.snake.direction = Some(Direction::Left);
        player.snake.current_direction = Some(Direction::Left);

        let batch = game.run_tick();
        assert!(!game.players[&id].snake.alive);
        assert!(batch
            .iter()
            .any(|m| matches!(m, ServerMsg::PGameOver { id: pid } if pid == &id)));
    }

    #[test]
    fn own_tail_chase_with_pending_grow_kills_the_snake() {
        let mut game = Game::new(settings());
        let (id, _) = game.handshake("alice", None, connection()).unwrap();
        game.ensure_running();
        game.join(&id).unwrap();
        let color = game.players[&id].color;

        // A 4-cell snake coiled into a square, head chasing its own tail
        // while `grow` is still pending: the tail will not vacate in time.
        let tail = Position::new(0, 0);
        let mid1 = Position::new(1, 0);
        let mid2 = Position::new(1, 1);
        let head = Position::new(0, 1);

        {
            let player = game.players.get_mut(&id).unwrap();
            player.snake.body.clear();
            player.snake.body.push_back(head);
            player.snake.body.push_back(mid2);
            player.snake.body.push_back(mid1);
            player.snake.body.push_back(tail);
            player.snake.direction = Some(Direction::Up);
            player.snake.current_direction = Some(Direction::Up);
            player.snake.grow = 1;
        }

        game.world.set(tail, crate::types::Cell::new(CH_TAIL, color));
        game.world.set(mid1, crate::types::Cell::new(CH_BODY, color));
        game.world.set(mid2, crate::types::Cell::new(CH_BODY, color));
        game.world.set(head, crate::types::Cell::new(CH_HEAD, color));

        let batch = game.run_tick();
        assert!(!game.players[&id].snake.alive);
        assert!(batch
            .iter()
            .any(|m| matches!(m, ServerMsg::PGameOver { id: pid } if pid == &id)));
    }

    #[test]
    fn disconnect_while_alive_forces_game_over() {
        let mut game = Game::new(settings());
        let (tx, rx) = mpsc::unbounded_channel();
        let (id, _) = game.handshake("alice", None, tx).unwrap();
        game.ensure_running();
        game.join(&id).unwrap();
        game.run_tick();
        drop(rx);

        let batch = game.run_tick();
        assert!(!game.players.contains_key(&id));
        assert!(batch
            .iter()
            .any(|m| matches!(m, ServerMsg::PGameOver { id: pid } if pid == &id)));
    }
}
