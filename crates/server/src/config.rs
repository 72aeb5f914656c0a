//! Server configuration.

use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

/// Root configuration structure.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub board: BoardConfig,
    #[serde(default)]
    pub arena: ArenaConfig,
    #[serde(default)]
    pub time_attack: TimeAttackConfig,
    #[serde(default)]
    pub ctf: CtfConfig,
}

impl Config {
    /// Load configuration from `config.toml` or use defaults.
    pub fn load() -> anyhow::Result<Self> {
        let path = Path::new("config.toml");
        if path.exists() {
            let contents = std::fs::read_to_string(path)?;
            Ok(toml::from_str(&contents)?)
        } else {
            info!("No config.toml found, creating default config");
            let default_config = Self::default();
            std::fs::write(path, toml::to_string_pretty(&default_config)?)?;
            Ok(default_config)
        }
    }
}

/// Server networking and general settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    /// Bind address.
    #[serde(default = "default_bind")]
    pub bind: String,
    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Tick interval in milliseconds (20 Hz).
    #[serde(default = "default_tick_interval")]
    pub tick_interval_ms: u64,
    /// Total connection cap.
    #[serde(default = "default_max_connections")]
    pub max_connections: usize,
    /// Connection cap per remote IP.
    #[serde(default = "default_ip_limit")]
    pub ip_limit: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            port: default_port(),
            tick_interval_ms: default_tick_interval(),
            max_connections: default_max_connections(),
            ip_limit: default_ip_limit(),
        }
    }
}

fn default_bind() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    8000
}
fn default_tick_interval() -> u64 {
    50
}
fn default_max_connections() -> usize {
    100
}
fn default_ip_limit() -> usize {
    4
}

/// Grid dimensions, shared by all three modes.
#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
pub struct BoardConfig {
    #[serde(default = "default_board_width")]
    pub width: i32,
    #[serde(default = "default_board_height")]
    pub height: i32,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            width: default_board_width(),
            height: default_board_height(),
        }
    }
}

fn default_board_width() -> i32 {
    60
}
fn default_board_height() -> i32 {
    35
}

/// Classic arena settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ArenaConfig {
    /// Maximum simultaneous players.
    #[serde(default = "default_max_players")]
    pub max_players: usize,
    /// Match length in seconds.
    #[serde(default = "default_arena_duration")]
    pub game_duration_secs: u64,
    /// Starting snake length.
    #[serde(default = "default_start_length")]
    pub start_length: usize,
    /// Body length cap (growth past this is truncated).
    #[serde(default = "default_max_snake_length")]
    pub max_snake_length: usize,
    /// Apples on the board at match start.
    #[serde(default = "default_initial_food")]
    pub initial_food: usize,
    /// Per-tick chance of a golden apple appearing while none exists.
    #[serde(default = "default_golden_food_chance")]
    pub golden_food_chance: f64,
    /// Per-tick chance of a power-up spawn roll succeeding.
    #[serde(default = "default_arena_powerup_chance")]
    pub powerup_spawn_chance: f64,
    /// Concurrent board power-up cap.
    #[serde(default = "default_arena_max_powerups")]
    pub max_powerups: usize,
    /// Concurrent cap per power-up kind.
    #[serde(default = "default_max_per_kind")]
    pub max_powerups_per_kind: usize,
    /// Obstacle counts, regenerated when the first player joins an empty arena.
    #[serde(default = "default_slow_obstacles")]
    pub slow_obstacles: usize,
    #[serde(default = "default_poison_obstacles")]
    pub poison_obstacles: usize,
    #[serde(default = "default_hidden_walls")]
    pub hidden_walls: usize,
    /// Trail ring capacity while the trail effect is active.
    #[serde(default = "default_trail_limit")]
    pub trail_limit: usize,
    /// Magnet attraction radius (Manhattan).
    #[serde(default = "default_magnet_range")]
    pub magnet_range: i32,
    /// Rows at the top of the board excluded from spawn sampling.
    #[serde(default = "default_spawn_top_margin")]
    pub spawn_top_margin: i32,
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            max_players: default_max_players(),
            game_duration_secs: default_arena_duration(),
            start_length: default_start_length(),
            max_snake_length: default_max_snake_length(),
            initial_food: default_initial_food(),
            golden_food_chance: default_golden_food_chance(),
            powerup_spawn_chance: default_arena_powerup_chance(),
            max_powerups: default_arena_max_powerups(),
            max_powerups_per_kind: default_max_per_kind(),
            slow_obstacles: default_slow_obstacles(),
            poison_obstacles: default_poison_obstacles(),
            hidden_walls: default_hidden_walls(),
            trail_limit: default_trail_limit(),
            magnet_range: default_magnet_range(),
            spawn_top_margin: default_spawn_top_margin(),
        }
    }
}

fn default_max_players() -> usize {
    8
}
fn default_arena_duration() -> u64 {
    120
}
fn default_start_length() -> usize {
    3
}
fn default_max_snake_length() -> usize {
    10
}
fn default_initial_food() -> usize {
    4
}
fn default_golden_food_chance() -> f64 {
    0.01
}
fn default_arena_powerup_chance() -> f64 {
    0.01
}
fn default_arena_max_powerups() -> usize {
    4
}
fn default_max_per_kind() -> usize {
    2
}
fn default_slow_obstacles() -> usize {
    15
}
fn default_poison_obstacles() -> usize {
    7
}
fn default_hidden_walls() -> usize {
    7
}
fn default_trail_limit() -> usize {
    6
}
fn default_magnet_range() -> i32 {
    5
}
fn default_spawn_top_margin() -> i32 {
    5
}

/// Time Attack settings shared by all difficulties.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TimeAttackConfig {
    /// Apples kept on the board.
    #[serde(default = "default_ta_food_count")]
    pub food_count: usize,
    /// Concurrent board power-up cap.
    #[serde(default = "default_ta_max_powerups")]
    pub max_powerups: usize,
    /// Per-tick golden apple chance while none exists.
    #[serde(default = "default_ta_golden_chance")]
    pub golden_food_chance: f64,
    /// Per-tick power-up spawn chance.
    #[serde(default = "default_ta_powerup_chance")]
    pub powerup_spawn_chance: f64,
    /// Bonus seconds per apple.
    #[serde(default = "default_food_bonus")]
    pub food_bonus_secs: u64,
    /// Bonus seconds per golden apple.
    #[serde(default = "default_golden_bonus")]
    pub golden_food_bonus_secs: u64,
    /// Bonus seconds per power-up pickup.
    #[serde(default = "default_powerup_bonus")]
    pub powerup_bonus_secs: u64,
    /// Score per apple.
    #[serde(default = "default_ta_food_score")]
    pub food_score: u32,
    /// Score per golden apple.
    #[serde(default = "default_ta_golden_score")]
    pub golden_food_score: u32,
    /// Slow obstacles before the difficulty multiplier is applied.
    #[serde(default = "default_ta_base_obstacles")]
    pub base_obstacles: usize,
    #[serde(default = "default_start_length")]
    pub start_length: usize,
    #[serde(default = "default_max_snake_length")]
    pub max_snake_length: usize,
    #[serde(default = "default_magnet_range")]
    pub magnet_range: i32,
}

impl Default for TimeAttackConfig {
    fn default() -> Self {
        Self {
            food_count: default_ta_food_count(),
            max_powerups: default_ta_max_powerups(),
            golden_food_chance: default_ta_golden_chance(),
            powerup_spawn_chance: default_ta_powerup_chance(),
            food_bonus_secs: default_food_bonus(),
            golden_food_bonus_secs: default_golden_bonus(),
            powerup_bonus_secs: default_powerup_bonus(),
            food_score: default_ta_food_score(),
            golden_food_score: default_ta_golden_score(),
            base_obstacles: default_ta_base_obstacles(),
            start_length: default_start_length(),
            max_snake_length: default_max_snake_length(),
            magnet_range: default_magnet_range(),
        }
    }
}

fn default_ta_food_count() -> usize {
    3
}
fn default_ta_max_powerups() -> usize {
    2
}
fn default_ta_golden_chance() -> f64 {
    0.02
}
fn default_ta_powerup_chance() -> f64 {
    0.02
}
fn default_food_bonus() -> u64 {
    5
}
fn default_golden_bonus() -> u64 {
    15
}
fn default_powerup_bonus() -> u64 {
    3
}
fn default_ta_food_score() -> u32 {
    10
}
fn default_ta_golden_score() -> u32 {
    50
}
fn default_ta_base_obstacles() -> usize {
    8
}

/// Where a carried flag lands when its carrier is eliminated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FlagDropPolicy {
    /// Drop at the carrier's head position.
    CarrierHead,
    /// Drop at the carrier's last body segment.
    LastSegment,
    /// Return straight to the owning team's base.
    ReturnToBase,
}

/// Capture-the-flag settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CtfConfig {
    /// Match length in seconds.
    #[serde(default = "default_ctf_duration")]
    pub match_duration_secs: u64,
    /// Pre-match countdown in seconds.
    #[serde(default = "default_ctf_countdown")]
    pub countdown_secs: u64,
    /// Pause between a delivery and the round reset, in seconds.
    #[serde(default = "default_round_end")]
    pub round_end_secs: u64,
    /// Manual respawn cooldown after elimination, in seconds.
    #[serde(default = "default_respawn_cooldown")]
    pub respawn_cooldown_secs: f64,
    /// Player cap per team.
    #[serde(default = "default_team_capacity")]
    pub team_capacity: usize,
    #[serde(default = "default_capture_score")]
    pub capture_score: u32,
    #[serde(default = "default_delivery_score")]
    pub delivery_score: u32,
    #[serde(default = "default_kill_score")]
    pub kill_score: u32,
    #[serde(default = "default_flag_drop_policy")]
    pub flag_drop_policy: FlagDropPolicy,
    #[serde(default = "default_start_length")]
    pub start_length: usize,
    #[serde(default = "default_max_snake_length")]
    pub max_snake_length: usize,
    /// Per-tick power-up spawn chance.
    #[serde(default = "default_arena_powerup_chance")]
    pub powerup_spawn_chance: f64,
    /// Concurrent board power-up cap.
    #[serde(default = "default_arena_max_powerups")]
    pub max_powerups: usize,
    #[serde(default = "default_max_per_kind")]
    pub max_powerups_per_kind: usize,
    #[serde(default = "default_trail_limit")]
    pub trail_limit: usize,
    #[serde(default = "default_magnet_range")]
    pub magnet_range: i32,
}

impl Default for CtfConfig {
    fn default() -> Self {
        Self {
            match_duration_secs: default_ctf_duration(),
            countdown_secs: default_ctf_countdown(),
            round_end_secs: default_round_end(),
            respawn_cooldown_secs: default_respawn_cooldown(),
            team_capacity: default_team_capacity(),
            capture_score: default_capture_score(),
            delivery_score: default_delivery_score(),
            kill_score: default_kill_score(),
            flag_drop_policy: default_flag_drop_policy(),
            start_length: default_start_length(),
            max_snake_length: default_max_snake_length(),
            powerup_spawn_chance: default_arena_powerup_chance(),
            max_powerups: default_arena_max_powerups(),
            max_powerups_per_kind: default_max_per_kind(),
            trail_limit: default_trail_limit(),
            magnet_range: default_magnet_range(),
        }
    }
}

fn default_ctf_duration() -> u64 {
    300
}
fn default_ctf_countdown() -> u64 {
    3
}
fn default_round_end() -> u64 {
    3
}
fn default_respawn_cooldown() -> f64 {
    5.0
}
fn default_team_capacity() -> usize {
    4
}
fn default_capture_score() -> u32 {
    10
}
fn default_delivery_score() -> u32 {
    15
}
fn default_kill_score() -> u32 {
    5
}
fn default_flag_drop_policy() -> FlagDropPolicy {
    FlagDropPolicy::CarrierHead
}
