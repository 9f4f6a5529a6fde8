//! Physics world seam
//!
//! The game core drives bodies through [`PhysicsWorld`]; on device this is the
//! host's rigid-body engine. [`ArcadeWorld`] is a small reference
//! implementation used by the headless binary and the tests.

use std::collections::BTreeMap;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collision::{Contact, Shape, bounce, contact};
use super::state::{Category, EntityId, EntityKind, TreasureKind};
use crate::consts::*;
use crate::tuning::Tuning;

/// Category / collision / contact bit masks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PhysicsMasks {
    pub category: u32,
    /// Categories this body is pushed out of
    pub collision: u32,
    /// Categories this body reports contacts with
    pub contact: u32,
}

impl PhysicsMasks {
    /// Whether a pair reports begin/end contact events
    pub fn reports_contact(&self, other: &PhysicsMasks) -> bool {
        self.contact & other.category != 0 || other.contact & self.category != 0
    }

    pub fn collides_with(&self, other: &PhysicsMasks) -> bool {
        self.collision & other.category != 0
    }
}

/// Everything needed to create a body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BodySpec {
    pub kind: EntityKind,
    pub pos: Vec2,
    pub shape: Shape,
    pub dynamic: bool,
    pub masks: PhysicsMasks,
    pub mass: f32,
    pub restitution: f32,
    pub friction: f32,
    pub linear_damping: f32,
}

impl BodySpec {
    pub fn background(tuning: &Tuning) -> Self {
        Self {
            kind: EntityKind::Background,
            pos: tuning.center(),
            shape: Shape::rect(tuning.screen_width, tuning.screen_height),
            dynamic: false,
            masks: PhysicsMasks::default(),
            mass: 1.0,
            restitution: 0.0,
            friction: 0.0,
            linear_damping: 0.0,
        }
    }

    /// Player starts static until the first tap
    pub fn player(tuning: &Tuning) -> Self {
        Self {
            kind: EntityKind::Player,
            pos: tuning.player_start(),
            shape: Shape::rect(PLAYER_SIZE.0, PLAYER_SIZE.1),
            dynamic: false,
            masks: PhysicsMasks {
                category: Category::PLAYER_BIT,
                collision: Category::PLATFORM_BIT | Category::ROCK_BIT,
                contact: Category::PLATFORM_BIT | Category::TREASURE_BIT | Category::ROCK_BIT,
            },
            mass: tuning.player_mass,
            restitution: 0.0,
            friction: 0.0,
            linear_damping: 0.0,
        }
    }

    pub fn platform(pos: Vec2, wide: bool) -> Self {
        let width = if wide {
            PLATFORM_WIDE_WIDTH
        } else {
            PLATFORM_NARROW_WIDTH
        };
        Self {
            kind: EntityKind::Platform { wide },
            pos,
            shape: Shape::rect(width, PLATFORM_HEIGHT),
            dynamic: false,
            masks: PhysicsMasks {
                category: Category::PLATFORM_BIT,
                collision: 0,
                contact: 0,
            },
            mass: 1.0,
            restitution: 0.0,
            friction: 0.0,
            linear_damping: 0.0,
        }
    }

    pub fn treasure(pos: Vec2, kind: TreasureKind) -> Self {
        Self {
            kind: EntityKind::Treasure(kind),
            pos,
            shape: Shape::circle(TREASURE_RADIUS),
            dynamic: false,
            masks: PhysicsMasks {
                category: Category::TREASURE_BIT,
                collision: 0,
                contact: Category::PLAYER_BIT,
            },
            mass: 1.0,
            restitution: 0.0,
            friction: 0.0,
            linear_damping: 0.0,
        }
    }

    pub fn rock(pos: Vec2, tuning: &Tuning) -> Self {
        Self {
            kind: EntityKind::Rock,
            pos,
            shape: Shape::circle(ROCK_RADIUS),
            dynamic: true,
            masks: PhysicsMasks {
                category: Category::ROCK_BIT,
                collision: Category::PLATFORM_BIT | Category::PLAYER_BIT,
                contact: Category::PLAYER_BIT,
            },
            mass: tuning.rock_mass,
            restitution: ROCK_RESTITUTION,
            friction: 0.0,
            linear_damping: ROCK_DAMPING,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContactPhase {
    Begin,
    End,
}

/// One side of a contact
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactBody {
    pub id: EntityId,
    pub kind: EntityKind,
}

impl ContactBody {
    pub fn category(&self) -> Category {
        self.kind.category()
    }

    pub fn name(&self) -> &'static str {
        self.kind.name()
    }
}

/// Two colliders started or stopped touching
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactEvent {
    pub phase: ContactPhase,
    pub a: ContactBody,
    pub b: ContactBody,
}

impl ContactEvent {
    pub fn begin(a: ContactBody, b: ContactBody) -> Self {
        Self {
            phase: ContactPhase::Begin,
            a,
            b,
        }
    }

    pub fn end(a: ContactBody, b: ContactBody) -> Self {
        Self {
            phase: ContactPhase::End,
            a,
            b,
        }
    }
}

/// Rigid-body simulation the game core configures and queries
///
/// Calls naming an unknown entity are no-ops that return `None` / `false`.
pub trait PhysicsWorld {
    fn set_gravity(&mut self, gravity: Vec2);
    fn spawn(&mut self, spec: BodySpec) -> EntityId;
    /// Returns false if the entity was already gone
    fn remove(&mut self, id: EntityId) -> bool;
    fn kind(&self, id: EntityId) -> Option<EntityKind>;
    fn shape(&self, id: EntityId) -> Option<Shape>;
    fn position(&self, id: EntityId) -> Option<Vec2>;
    fn set_position(&mut self, id: EntityId, pos: Vec2) -> bool;
    fn velocity(&self, id: EntityId) -> Option<Vec2>;
    fn set_velocity(&mut self, id: EntityId, vel: Vec2) -> bool;
    /// Changes velocity by `impulse / mass`; ignored by static bodies
    fn apply_impulse(&mut self, id: EntityId, impulse: Vec2) -> bool;
    fn is_dynamic(&self, id: EntityId) -> bool;
    fn set_dynamic(&mut self, id: EntityId, dynamic: bool) -> bool;
    /// Live entities in creation order
    fn entity_ids(&self) -> Vec<EntityId>;
    /// Advance the simulation and report contact changes
    fn step(&mut self, dt: f32) -> Vec<ContactEvent>;
    /// Remove every body
    fn clear(&mut self);

    fn contains(&self, id: EntityId) -> bool {
        self.kind(id).is_some()
    }
}

/// Vertical gap across which a resting body still counts as touching
///
/// Scrolled platforms move away from a resting player for a few frames before
/// gravity catches up; the slop keeps that from flickering contact. Only a
/// dynamic body directly above the other gets it.
pub const CONTACT_SLOP: f32 = 6.0;

#[derive(Debug, Clone)]
struct Body {
    id: EntityId,
    spec: BodySpec,
    vel: Vec2,
}

/// Reference world: gravity, damping, push-out collisions and contact tracking
#[derive(Debug, Clone)]
pub struct ArcadeWorld {
    gravity: Vec2,
    /// Sorted by id
    bodies: Vec<Body>,
    touching: BTreeMap<(EntityId, EntityId), (EntityKind, EntityKind)>,
    next_id: u32,
}

impl Default for ArcadeWorld {
    fn default() -> Self {
        Self::new(Vec2::new(0.0, GRAVITY))
    }
}

impl ArcadeWorld {
    pub fn new(gravity: Vec2) -> Self {
        Self {
            gravity,
            bodies: Vec::new(),
            touching: BTreeMap::new(),
            next_id: 1,
        }
    }

    fn body(&self, id: EntityId) -> Option<&Body> {
        self.bodies
            .binary_search_by_key(&id, |b| b.id)
            .ok()
            .map(|i| &self.bodies[i])
    }

    fn body_mut(&mut self, id: EntityId) -> Option<&mut Body> {
        self.bodies
            .binary_search_by_key(&id, |b| b.id)
            .ok()
            .map(|i| &mut self.bodies[i])
    }

    fn integrate(&mut self, dt: f32) {
        let gravity = self.gravity;
        for body in self.bodies.iter_mut().filter(|b| b.spec.dynamic) {
            body.vel += gravity * dt;
            body.vel /= 1.0 + body.spec.linear_damping * dt;
            body.spec.pos += body.vel * dt;
        }
    }

    fn resolve_collisions(&mut self) {
        for i in 0..self.bodies.len() {
            if !self.bodies[i].spec.dynamic {
                continue;
            }
            for j in 0..self.bodies.len() {
                if i == j || !self.bodies[i].spec.masks.collides_with(&self.bodies[j].spec.masks) {
                    continue;
                }
                let (other_pos, other_shape) = (self.bodies[j].spec.pos, self.bodies[j].spec.shape);
                let body = &mut self.bodies[i];
                let c = contact(body.spec.pos, body.spec.shape, other_pos, other_shape);
                if c.overlapping() {
                    body.spec.pos += c.normal * c.depth;
                    body.vel = bounce(body.vel, c.normal, body.spec.restitution);
                    if body.spec.friction > 0.0 {
                        let tangent = Vec2::new(-c.normal.y, c.normal.x);
                        let vt = body.vel.dot(tangent);
                        body.vel -= tangent * vt * body.spec.friction.min(1.0);
                    }
                }
            }
        }
    }

    fn current_contacts(&self) -> BTreeMap<(EntityId, EntityId), (EntityKind, EntityKind)> {
        let mut pairs = BTreeMap::new();
        for (i, a) in self.bodies.iter().enumerate() {
            for b in &self.bodies[i + 1..] {
                if !a.spec.masks.reports_contact(&b.spec.masks) {
                    continue;
                }
                let c = contact(a.spec.pos, a.spec.shape, b.spec.pos, b.spec.shape);
                if c.overlapping() || resting(a, b, &c) {
                    pairs.insert((a.id, b.id), (a.spec.kind, b.spec.kind));
                }
            }
        }
        pairs
    }
}

/// Dynamic body sitting just above the other, separated only vertically
fn resting(a: &Body, b: &Body, c: &Contact) -> bool {
    if !c.touching(CONTACT_SLOP) || c.normal.x != 0.0 {
        return false;
    }
    // Normal points from B toward A
    let upper = if c.normal.y > 0.0 { a } else { b };
    upper.spec.dynamic
}

impl PhysicsWorld for ArcadeWorld {
    fn set_gravity(&mut self, gravity: Vec2) {
        self.gravity = gravity;
    }

    fn spawn(&mut self, spec: BodySpec) -> EntityId {
        let id = EntityId(self.next_id);
        self.next_id += 1;
        self.bodies.push(Body {
            id,
            spec,
            vel: Vec2::ZERO,
        });
        id
    }

    fn remove(&mut self, id: EntityId) -> bool {
        match self.bodies.binary_search_by_key(&id, |b| b.id) {
            Ok(i) => {
                self.bodies.remove(i);
                true
            }
            Err(_) => false,
        }
    }

    fn kind(&self, id: EntityId) -> Option<EntityKind> {
        self.body(id).map(|b| b.spec.kind)
    }

    fn shape(&self, id: EntityId) -> Option<Shape> {
        self.body(id).map(|b| b.spec.shape)
    }

    fn position(&self, id: EntityId) -> Option<Vec2> {
        self.body(id).map(|b| b.spec.pos)
    }

    fn set_position(&mut self, id: EntityId, pos: Vec2) -> bool {
        self.body_mut(id).map(|b| b.spec.pos = pos).is_some()
    }

    fn velocity(&self, id: EntityId) -> Option<Vec2> {
        self.body(id).map(|b| b.vel)
    }

    fn set_velocity(&mut self, id: EntityId, vel: Vec2) -> bool {
        self.body_mut(id).map(|b| b.vel = vel).is_some()
    }

    fn apply_impulse(&mut self, id: EntityId, impulse: Vec2) -> bool {
        match self.body_mut(id) {
            Some(body) if body.spec.dynamic => {
                body.vel += impulse / body.spec.mass;
                true
            }
            _ => false,
        }
    }

    fn is_dynamic(&self, id: EntityId) -> bool {
        self.body(id).is_some_and(|b| b.spec.dynamic)
    }

    fn set_dynamic(&mut self, id: EntityId, dynamic: bool) -> bool {
        self.body_mut(id).map(|b| b.spec.dynamic = dynamic).is_some()
    }

    fn entity_ids(&self) -> Vec<EntityId> {
        self.bodies.iter().map(|b| b.id).collect()
    }

    fn step(&mut self, dt: f32) -> Vec<ContactEvent> {
        if dt > 0.0 {
            self.integrate(dt);
            self.resolve_collisions();
        }

        let current = self.current_contacts();
        let mut events = Vec::new();
        for (&(a, b), &(ka, kb)) in &self.touching {
            if !current.contains_key(&(a, b)) {
                events.push(ContactEvent::end(
                    ContactBody { id: a, kind: ka },
                    ContactBody { id: b, kind: kb },
                ));
            }
        }
        for (&(a, b), &(ka, kb)) in &current {
            if !self.touching.contains_key(&(a, b)) {
                events.push(ContactEvent::begin(
                    ContactBody { id: a, kind: ka },
                    ContactBody { id: b, kind: kb },
                ));
            }
        }
        self.touching = current;
        events
    }

    fn clear(&mut self) {
        self.bodies.clear();
        self.touching.clear();
    }
}
