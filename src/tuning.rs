//! Data-driven game balance
//!
//! Every gameplay constant can be overridden from JSON. Missing fields keep
//! their defaults from [`crate::consts`].

use std::path::Path;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::{Error, Result};

/// Gameplay tuning values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // === Scene ===
    pub screen_width: f32,
    pub screen_height: f32,
    pub gravity: f32,
    /// Crossfade between scenes (seconds)
    pub crossfade_secs: f32,
    /// Longest frame step fed to the simulation (seconds)
    pub max_frame_dt: f32,

    // === Scrolling ===
    pub scroll_speed: f32,
    pub cull_y: f32,
    pub fall_y: f32,

    // === Player ===
    pub player_mass: f32,
    pub jump_impulse: f32,
    pub steering_gain: f32,
    pub knockback_x: f32,
    pub knockback_y: f32,
    pub flash_duration: f32,

    // === Spawning ===
    /// Master switch for the recurring spawn timers (initial platforms still spawn)
    pub spawning: bool,
    pub platform_interval: f32,
    pub treasure_interval: f32,
    pub rock_interval_min: f32,
    pub rock_interval_max: f32,
    pub rock_mass: f32,
    pub rock_impulse_x: f32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            screen_width: SCREEN_WIDTH,
            screen_height: SCREEN_HEIGHT,
            gravity: GRAVITY,
            crossfade_secs: CROSSFADE_SECS,
            max_frame_dt: MAX_FRAME_DT,

            scroll_speed: SCROLL_SPEED,
            cull_y: CULL_Y,
            fall_y: FALL_Y,

            player_mass: PLAYER_MASS,
            jump_impulse: JUMP_IMPULSE,
            steering_gain: STEERING_GAIN,
            knockback_x: KNOCKBACK_X,
            knockback_y: KNOCKBACK_Y,
            flash_duration: FLASH_DURATION,

            spawning: true,
            platform_interval: PLATFORM_INTERVAL,
            treasure_interval: TREASURE_INTERVAL,
            rock_interval_min: ROCK_INTERVAL_MIN,
            rock_interval_max: ROCK_INTERVAL_MAX,
            rock_mass: ROCK_MASS,
            rock_impulse_x: ROCK_IMPULSE_X,
        }
    }
}

impl Tuning {
    /// Parse and validate tuning JSON
    pub fn from_json(json: &str) -> Result<Self> {
        let tuning: Tuning = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Load tuning from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let tuning = Self::from_json(&json)?;
        log::info!("Loaded tuning from {}", path.display());
        Ok(tuning)
    }

    /// Reject values the simulation cannot run with
    pub fn validate(&self) -> Result<()> {
        fn positive(field: &'static str, value: f32) -> Result<()> {
            if value > 0.0 && value.is_finite() {
                Ok(())
            } else {
                Err(Error::Invalid {
                    field,
                    reason: format!("must be a positive number, got {value}"),
                })
            }
        }

        // Random reaches are sampled from -x..=x
        fn non_negative(field: &'static str, value: f32) -> Result<()> {
            if value >= 0.0 && value.is_finite() {
                Ok(())
            } else {
                Err(Error::Invalid {
                    field,
                    reason: format!("must be zero or positive, got {value}"),
                })
            }
        }

        positive("screen_width", self.screen_width)?;
        positive("screen_height", self.screen_height)?;
        positive("crossfade_secs", self.crossfade_secs)?;
        positive("player_mass", self.player_mass)?;
        positive("rock_mass", self.rock_mass)?;
        positive("platform_interval", self.platform_interval)?;
        positive("treasure_interval", self.treasure_interval)?;
        positive("rock_interval_min", self.rock_interval_min)?;
        non_negative("rock_impulse_x", self.rock_impulse_x)?;
        non_negative("knockback_x", self.knockback_x)?;
        positive("max_frame_dt", self.max_frame_dt)?;

        if self.rock_interval_max <= self.rock_interval_min {
            return Err(Error::Invalid {
                field: "rock_interval_max",
                reason: format!(
                    "must exceed rock_interval_min ({} <= {})",
                    self.rock_interval_max, self.rock_interval_min
                ),
            });
        }
        if self.cull_y >= 0.0 || self.fall_y >= 0.0 {
            return Err(Error::Invalid {
                field: "cull_y",
                reason: "cull and fall bounds must sit below the screen".to_string(),
            });
        }
        Ok(())
    }

    /// Gravity vector for the physics world
    pub fn gravity_vec(&self) -> Vec2 {
        Vec2::new(0.0, self.gravity)
    }

    /// Left and right spawn columns
    pub fn spawn_columns(&self) -> [f32; 2] {
        [PLATFORM_MARGIN, self.screen_width - PLATFORM_MARGIN]
    }

    /// Player start position (top of the screen, centered)
    pub fn player_start(&self) -> Vec2 {
        Vec2::new(
            self.screen_width / 2.0,
            self.screen_height * PLAYER_START_Y_FRACTION,
        )
    }

    /// Center of the scene
    pub fn center(&self) -> Vec2 {
        Vec2::new(self.screen_width / 2.0, self.screen_height / 2.0)
    }
}
