//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must stay deterministic:
//! - Seeded RNG only (one generator per session)
//! - Stable iteration order (by entity ID)
//! - No rendering or platform dependencies

pub mod collision;
pub mod contact;
pub mod spawn;
pub mod state;
pub mod tick;
pub mod world;

pub use collision::{Contact, Shape};
pub use contact::{ContactRule, classify};
pub use spawn::{Cadence, SpawnKind, SpawnRequest, SpawnScheduler};
pub use state::{
    Category, EntityId, EntityKind, Flash, GamePhase, GameplayState, Session, SessionOutcome,
    TreasureKind,
};
pub use tick::{TickInput, tick};
pub use world::{
    ArcadeWorld, BodySpec, ContactBody, ContactEvent, ContactPhase, PhysicsMasks, PhysicsWorld,
};
