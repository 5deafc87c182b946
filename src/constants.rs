//! Default values for every configurable game parameter.
//!
//! These are the values used when the corresponding environment variable
//! (see [`crate::config`]) is absent. They mirror `snakepit/settings.py`
//! from the original implementation this server reimplements.

/// Default listener host.
pub const DEFAULT_HOST: &str = "0.0.0.0";
/// Default listener port.
pub const DEFAULT_PORT: u16 = 8000;

/// Initial ticks per second.
pub const DEFAULT_GAME_SPEED: f64 = 2.3;
/// Per-tick multiplier applied once the speed ramp is active.
pub const DEFAULT_GAME_SPEED_INCREASE_RATE: f64 = 0.0;

/// Concurrent player cap. Must be `<= NUM_COLORS`.
pub const DEFAULT_MAX_PLAYERS: usize = 6;
/// Number of distinct snake colors (color 0 is reserved for neutral/stones).
pub const DEFAULT_NUM_COLORS: u8 = 6;
/// Capacity of the persisted top-scores table.
pub const DEFAULT_MAX_TOP_SCORES: usize = 15;

/// World width, in cells.
pub const DEFAULT_FIELD_SIZE_X: i32 = 50;
/// World height, in cells.
pub const DEFAULT_FIELD_SIZE_Y: i32 = 25;

/// Initial snake body length.
pub const DEFAULT_INIT_LENGTH: usize = 5;
/// Minimum distance kept between a freshly placed snake and the world border.
pub const DEFAULT_INIT_MIN_DISTANCE_BORDER: i32 = 2;
/// Number of placement retries before a snake placement gives up.
pub const DEFAULT_INIT_RETRIES: u32 = 10;

/// Lowest digit value that can be spawned as food.
pub const DEFAULT_DIGIT_MIN: u8 = 1;
/// Highest digit value that can be spawned as food.
pub const DEFAULT_DIGIT_MAX: u8 = 9;

/// Points awarded to the killer of another snake.
pub const DEFAULT_KILL_POINTS: i64 = 1000;

/// Whether stones are spawned at all.
pub const DEFAULT_STONES_ENABLED: bool = true;
/// Probability (percent) that a digit spawns per alive snake per frame.
pub const DEFAULT_DIGIT_SPAWN_RATE: u8 = 6;
/// Probability (percent) that a stone spawns once per frame.
pub const DEFAULT_STONE_SPAWN_RATE: u8 = 6;

/// Path to the persisted top-scores file.
pub const DEFAULT_TOP_SCORES_FILE: &str = "var/run/top_scores.json";

/// Text painted centered on the world when the last snake dies.
pub const GAME_OVER_TEXT: &str = ">>> GAME OVER <<<";

/// Color reserved for neutral/interface/stone cells.
pub const COLOR_NEUTRAL: u8 = 0;

pub const CH_VOID: char = ' ';
pub const CH_STONE: char = '#';

pub const CH_HEAD: char = '@';
pub const CH_BODY: char = '*';
pub const CH_TAIL: char = '$';

pub const CH_DEAD_HEAD: char = 'x';
pub const CH_DEAD_BODY: char = '*';
pub const CH_DEAD_TAIL: char = '+';

/// WebSocket endpoint a player client connects to.
pub const PLAYER_ENDPOINT: &str = "/connect";

/// Number of random positions `pick_empty_cell` samples before giving up.
pub const SPAWN_PICK_RETRIES: u32 = 2;
