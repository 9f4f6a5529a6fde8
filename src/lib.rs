//! Canyon Jumper - A vertically scrolling canyon platformer
//!
//! Core modules:
//! - `sim`: Deterministic simulation (session state, spawning, contacts, physics world)
//! - `scene`: Start → Gameplay → GameOver flow
//! - `renderer`: Draw-list building for the host renderer
//! - `platform`: Host abstraction (scene presentation, frame capture)
//! - `assets`: Named texture lookup with placeholder fallback
//! - `ui`: Layered controls and hit testing
//! - `tuning`: Data-driven game balance

pub mod assets;
pub mod error;
pub mod platform;
pub mod renderer;
pub mod scene;
pub mod sim;
pub mod tuning;
pub mod ui;

pub use error::Error;
pub use scene::{SceneFlow, SceneId};
pub use tuning::Tuning;

/// Game configuration constants (defaults for [`Tuning`])
pub mod consts {
    /// Scene size in points (portrait phone)
    pub const SCREEN_WIDTH: f32 = 390.0;
    pub const SCREEN_HEIGHT: f32 = 844.0;

    /// World gravity (scene units/s², y up)
    pub const GRAVITY: f32 = -1000.0;

    /// Downward scroll speed of everything except player and background
    pub const SCROLL_SPEED: f32 = 100.0;
    /// Scrolled entities at or below this y are removed
    pub const CULL_Y: f32 = -100.0;
    /// Player below this y ends the session
    pub const FALL_Y: f32 = -50.0;

    /// Player body
    pub const PLAYER_SIZE: (f32, f32) = (40.0, 50.0);
    pub const PLAYER_MASS: f32 = 0.25;
    /// Start position as a fraction of screen height
    pub const PLAYER_START_Y_FRACTION: f32 = 0.9;
    /// Upward impulse for both ground and air jumps
    pub const JUMP_IMPULSE: f32 = 150.0;
    /// Horizontal steering: vx = gain * (target - x)
    pub const STEERING_GAIN: f32 = 2.0;

    /// Platforms
    pub const PLATFORM_MARGIN: f32 = 50.0;
    pub const PLATFORM_NARROW_WIDTH: f32 = 100.0;
    pub const PLATFORM_WIDE_WIDTH: f32 = 150.0;
    pub const PLATFORM_HEIGHT: f32 = 20.0;
    pub const INITIAL_PLATFORMS: u32 = 5;
    pub const INITIAL_PLATFORM_SPACING: f32 = 220.0;
    pub const PLATFORM_INTERVAL: f32 = 1.5;

    /// Treasures
    pub const TREASURE_RADIUS: f32 = 15.0;
    pub const TREASURE_SPAWN_OFFSET: f32 = 40.0;
    pub const TREASURE_INTERVAL: f32 = 3.0;

    /// Rocks
    pub const ROCK_RADIUS: f32 = 20.0;
    pub const ROCK_MASS: f32 = 0.5;
    pub const ROCK_RESTITUTION: f32 = 0.3;
    pub const ROCK_DAMPING: f32 = 0.5;
    pub const ROCK_SPAWN_OFFSET: f32 = 50.0;
    pub const ROCK_INTERVAL_MIN: f32 = 3.0;
    pub const ROCK_INTERVAL_MAX: f32 = 4.0;
    pub const ROCK_IMPULSE_X: f32 = 50.0;

    /// Rock hit on the player
    pub const KNOCKBACK_X: f32 = 100.0;
    pub const KNOCKBACK_Y: f32 = -50.0;
    pub const FLASH_DURATION: f32 = 0.2;

    /// Scene transitions
    pub const CROSSFADE_SECS: f32 = 1.0;

    /// Frame steps longer than this are clamped (seconds)
    pub const MAX_FRAME_DT: f32 = 0.1;
}
