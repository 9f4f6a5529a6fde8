//! Session state and entity vocabulary
//!
//! Everything a single gameplay session mutates lives in [`Session`]; the
//! physics world only holds bodies.

use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::spawn::SpawnScheduler;
use super::world::{BodySpec, PhysicsWorld};
use crate::tuning::Tuning;

/// Stable handle to a body in the physics world
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntityId(pub u32);

/// Physics category of an entity
///
/// Ordering is used to key contact pairs, see [`super::contact::classify`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Category {
    /// Background and other non-physical sprites
    Scenery,
    Player,
    Platform,
    Treasure,
    Rock,
}

impl Category {
    pub const TREASURE_BIT: u32 = 0x1 << 1;
    pub const PLATFORM_BIT: u32 = 0x1 << 2;
    pub const PLAYER_BIT: u32 = 0x1 << 3;
    pub const ROCK_BIT: u32 = 0x1 << 4;

    pub fn bit(self) -> u32 {
        match self {
            Category::Scenery => 0,
            Category::Player => Self::PLAYER_BIT,
            Category::Platform => Self::PLATFORM_BIT,
            Category::Treasure => Self::TREASURE_BIT,
            Category::Rock => Self::ROCK_BIT,
        }
    }
}

/// Treasure sub-kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TreasureKind {
    Coin,
    Chest,
}

/// What an entity is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    Player,
    Platform { wide: bool },
    Treasure(TreasureKind),
    Rock,
    Background,
}

impl EntityKind {
    pub fn category(self) -> Category {
        match self {
            EntityKind::Player => Category::Player,
            EntityKind::Platform { .. } => Category::Platform,
            EntityKind::Treasure(_) => Category::Treasure,
            EntityKind::Rock => Category::Rock,
            EntityKind::Background => Category::Scenery,
        }
    }

    /// Name reported in contact events
    pub fn name(self) -> &'static str {
        match self {
            EntityKind::Player => "player",
            EntityKind::Platform { wide: false } => "platform",
            EntityKind::Platform { wide: true } => "wide_platform",
            EntityKind::Treasure(TreasureKind::Coin) => "coin",
            EntityKind::Treasure(TreasureKind::Chest) => "chest",
            EntityKind::Rock => "rock",
            EntityKind::Background => "background",
        }
    }

    /// Texture name for the gameplay scene
    pub fn image(self) -> &'static str {
        match self {
            EntityKind::Player => "playerImage",
            EntityKind::Platform { wide: false } => "platformImage",
            EntityKind::Platform { wide: true } => "widePlatformImage",
            EntityKind::Treasure(TreasureKind::Coin) => "coinImage",
            EntityKind::Treasure(TreasureKind::Chest) => "chestImage",
            EntityKind::Rock => "rockImage",
            EntityKind::Background => "backgroundImage",
        }
    }

    /// Whether the world scrolls this entity down each frame
    pub fn scrolls(self) -> bool {
        matches!(
            self,
            EntityKind::Platform { .. } | EntityKind::Treasure(_) | EntityKind::Rock
        )
    }
}

/// Session phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Player hangs at the top, waiting for the first tap
    NotStarted,
    /// Player is falling, jumping and steering
    Running,
    /// Player fell through the bottom; terminal
    Ended,
}

/// Mutable gameplay record for one session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameplayState {
    pub on_ground: bool,
    pub can_double_jump: bool,
    pub started: bool,
    pub coin_count: u32,
    pub chest_count: u32,
    /// Horizontal steering target (last pointer x)
    pub last_pointer_x: Option<f32>,
    pub scroll_speed: f32,
}

impl GameplayState {
    pub fn new(scroll_speed: f32) -> Self {
        Self {
            on_ground: false,
            can_double_jump: false,
            started: false,
            coin_count: 0,
            chest_count: 0,
            last_pointer_x: None,
            scroll_speed,
        }
    }

    pub fn collect(&mut self, kind: TreasureKind) {
        match kind {
            TreasureKind::Coin => self.coin_count += 1,
            TreasureKind::Chest => self.chest_count += 1,
        }
    }
}

/// Highlight pulse on the player after a rock hit
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Flash {
    pub elapsed: f32,
    pub duration: f32,
}

impl Flash {
    pub fn start(duration: f32) -> Self {
        Self {
            elapsed: 0.0,
            duration,
        }
    }

    pub fn is_active(&self) -> bool {
        self.elapsed < self.duration
    }

    pub fn advance(&mut self, dt: f32) {
        self.elapsed = (self.elapsed + dt).min(self.duration);
    }

    /// 0 → 1 over the first half, back to 0 over the second
    pub fn intensity(&self) -> f32 {
        if !self.is_active() || self.duration <= 0.0 {
            return 0.0;
        }
        let t = self.elapsed / self.duration;
        1.0 - (2.0 * t - 1.0).abs()
    }
}

/// What a finished session hands to the GameOver scene
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionOutcome {
    pub coin_count: u32,
    pub chest_count: u32,
}

/// One gameplay session
#[derive(Debug, Clone)]
pub struct Session {
    pub seed: u64,
    pub phase: GamePhase,
    pub state: GameplayState,
    pub player: EntityId,
    pub background: EntityId,
    pub scheduler: SpawnScheduler,
    pub flash: Option<Flash>,
    pub tuning: Tuning,
    /// Simulation ticks since the session began
    pub time_ticks: u64,
    pub(crate) rng: Pcg32,
}

impl Session {
    /// Populate the world and start the spawn timers
    pub fn begin(world: &mut impl PhysicsWorld, tuning: &Tuning, seed: u64) -> Self {
        let mut rng = Pcg32::seed_from_u64(seed);

        world.clear();
        world.set_gravity(tuning.gravity_vec());

        let background = world.spawn(BodySpec::background(tuning));
        let player = world.spawn(BodySpec::player(tuning));

        for request in SpawnScheduler::initial_platforms(tuning, &mut rng) {
            request.spawn_into(world, tuning);
        }

        let scheduler = SpawnScheduler::new(tuning, &mut rng);
        log::info!("Session started (seed {seed})");

        Self {
            seed,
            phase: GamePhase::NotStarted,
            state: GameplayState::new(tuning.scroll_speed),
            player,
            background,
            scheduler,
            flash: None,
            tuning: tuning.clone(),
            time_ticks: 0,
            rng,
        }
    }

    pub fn outcome(&self) -> SessionOutcome {
        SessionOutcome {
            coin_count: self.state.coin_count,
            chest_count: self.state.chest_count,
        }
    }

    /// Cancel every timer and release the world's bodies
    pub fn teardown(&mut self, world: &mut impl PhysicsWorld) {
        self.scheduler.cancel();
        world.clear();
        log::debug!(
            "Session torn down after {} ticks ({} coins, {} chests)",
            self.time_ticks,
            self.state.coin_count,
            self.state.chest_count
        );
    }

    /// Player tint for the renderer (flash pulses toward the highlight)
    pub fn flash_intensity(&self) -> f32 {
        self.flash.map(|f| f.intensity()).unwrap_or(0.0)
    }
}
