//! Contact response policy
//!
//! Begin/end events are dispatched on the unordered pair of categories, so a
//! rule never cares which side the world reported first.

use glam::Vec2;
use rand::Rng;

use super::state::{Category, EntityKind, Flash, Session};
use super::world::{ContactBody, ContactEvent, ContactPhase, PhysicsWorld};

/// What a contact pair means to the game
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactRule {
    /// Pick up the treasure on the given side
    Collect(Side),
    /// Player touching a ledge
    Land,
    /// Rock hit the player
    Knockback,
    Ignore,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    A,
    B,
}

/// Map a category pair to its rule
///
/// Treasure wins over everything else. With two treasures only side A is
/// collected.
pub fn classify(a: Category, b: Category) -> ContactRule {
    if a == Category::Treasure {
        return ContactRule::Collect(Side::A);
    }
    if b == Category::Treasure {
        return ContactRule::Collect(Side::B);
    }

    let pair = if a <= b { (a, b) } else { (b, a) };
    match pair {
        (Category::Player, Category::Platform) => ContactRule::Land,
        (Category::Player, Category::Rock) => ContactRule::Knockback,
        _ => ContactRule::Ignore,
    }
}

/// Apply one contact event to the session
pub fn resolve(session: &mut Session, world: &mut impl PhysicsWorld, event: &ContactEvent) {
    let rule = classify(event.a.category(), event.b.category());
    match (event.phase, rule) {
        (ContactPhase::Begin, ContactRule::Collect(side)) => {
            let treasure = match side {
                Side::A => event.a,
                Side::B => event.b,
            };
            if event.a.category() == event.b.category() {
                log::warn!(
                    "Treasure-treasure contact ({} / {}), collecting only {:?}",
                    event.a.name(),
                    event.b.name(),
                    treasure.id
                );
            }
            collect(session, world, treasure);
        }
        (ContactPhase::Begin, ContactRule::Land) => {
            session.state.on_ground = true;
            session.state.can_double_jump = true;
        }
        (ContactPhase::Begin, ContactRule::Knockback) => {
            let reach = session.tuning.knockback_x;
            let impulse = Vec2::new(
                session.rng.random_range(-reach..=reach),
                session.tuning.knockback_y,
            );
            world.apply_impulse(session.player, impulse);
            session.flash = Some(Flash::start(session.tuning.flash_duration));
            log::debug!("Rock hit, knockback {impulse}");
        }
        (ContactPhase::End, ContactRule::Land) => {
            session.state.on_ground = false;
        }
        _ => {}
    }
}

fn collect(session: &mut Session, world: &mut impl PhysicsWorld, treasure: ContactBody) {
    let EntityKind::Treasure(kind) = treasure.kind else {
        return;
    };
    // Removal gates the counter so a treasure pays out once
    if world.remove(treasure.id) {
        session.state.collect(kind);
        log::debug!(
            "Collected {} (coins {}, chests {})",
            treasure.name(),
            session.state.coin_count,
            session.state.chest_count
        );
    }
}
