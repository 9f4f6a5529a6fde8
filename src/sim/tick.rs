//! Per-frame simulation tick
//!
//! Frame order: buffered pointer input, due spawns, scroll/cull, steering,
//! fall-through check, physics step, contact resolution, flash decay.

use glam::Vec2;

use super::contact;
use super::state::{GamePhase, Session, SessionOutcome};
use super::world::PhysicsWorld;

/// Pointer input gathered since the previous frame
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Pointer-down positions, oldest first
    pub taps: Vec<Vec2>,
    /// Latest pointer-move position
    pub pointer: Option<Vec2>,
}

impl TickInput {
    pub fn is_empty(&self) -> bool {
        self.taps.is_empty() && self.pointer.is_none()
    }
}

/// Advance the session by one frame
///
/// Returns the outcome on the frame the player falls through the bottom of
/// the screen. An ended session no longer ticks.
pub fn tick(
    session: &mut Session,
    world: &mut impl PhysicsWorld,
    input: &TickInput,
    dt: f32,
) -> Option<SessionOutcome> {
    if session.phase == GamePhase::Ended {
        return None;
    }
    session.time_ticks += 1;

    for &pos in &input.taps {
        pointer_down(session, world, pos);
    }
    if let Some(pos) = input.pointer {
        pointer_moved(session, pos);
    }

    let requests = session
        .scheduler
        .advance(dt, &session.tuning, &mut session.rng);
    for request in requests {
        request.spawn_into(world, &session.tuning);
    }

    scroll_and_cull(session, world, dt);
    steer(session, world);

    if fell_through(session, world) {
        session.phase = GamePhase::Ended;
        let outcome = session.outcome();
        log::info!(
            "Player fell after {} ticks: {} coins, {} chests",
            session.time_ticks,
            outcome.coin_count,
            outcome.chest_count
        );
        return Some(outcome);
    }

    for event in world.step(dt) {
        contact::resolve(session, world, &event);
    }

    if let Some(flash) = session.flash.as_mut() {
        flash.advance(dt);
    }
    if session.flash.is_some_and(|f| !f.is_active()) {
        session.flash = None;
    }

    None
}

/// Tap: start the run if needed, then try to jump
pub fn pointer_down(session: &mut Session, world: &mut impl PhysicsWorld, pos: Vec2) {
    if session.phase == GamePhase::Ended {
        return;
    }
    if !session.state.started {
        session.state.started = true;
        session.phase = GamePhase::Running;
        world.set_dynamic(session.player, true);
        log::info!("Run started");
    }
    session.state.last_pointer_x = Some(pos.x);
    jump(session, world);
}

/// Drag: move the steering target
pub fn pointer_moved(session: &mut Session, pos: Vec2) {
    if session.phase == GamePhase::Running {
        session.state.last_pointer_x = Some(pos.x);
    }
}

/// Ground jump, else the one air jump, else nothing
///
/// Returns whether a jump happened.
pub fn jump(session: &mut Session, world: &mut impl PhysicsWorld) -> bool {
    let state = &mut session.state;
    if state.on_ground {
        state.on_ground = false;
    } else if state.can_double_jump {
        state.can_double_jump = false;
    } else {
        return false;
    }

    let vel = world.velocity(session.player).unwrap_or_default();
    world.set_velocity(session.player, Vec2::new(vel.x, 0.0));
    world.apply_impulse(session.player, Vec2::new(0.0, session.tuning.jump_impulse));
    true
}

/// Move every scrolling entity down and drop the ones past the cull bound
pub fn scroll_and_cull(session: &Session, world: &mut impl PhysicsWorld, dt: f32) {
    let dy = session.state.scroll_speed * dt;
    let cull_y = session.tuning.cull_y;
    let mut culled = 0;

    for id in world.entity_ids() {
        if !world.kind(id).is_some_and(|k| k.scrolls()) {
            continue;
        }
        let Some(pos) = world.position(id) else {
            continue;
        };
        let pos = Vec2::new(pos.x, pos.y - dy);
        if pos.y <= cull_y {
            world.remove(id);
            culled += 1;
        } else {
            world.set_position(id, pos);
        }
    }

    if culled > 0 {
        log::trace!("Culled {culled} entities");
    }
}

/// Proportional horizontal steering toward the last pointer x
pub fn steer(session: &Session, world: &mut impl PhysicsWorld) {
    let Some(target_x) = session.state.last_pointer_x else {
        return;
    };
    let (Some(pos), Some(vel)) = (world.position(session.player), world.velocity(session.player))
    else {
        return;
    };
    let vx = session.tuning.steering_gain * (target_x - pos.x);
    world.set_velocity(session.player, Vec2::new(vx, vel.y));
}

fn fell_through(session: &Session, world: &impl PhysicsWorld) -> bool {
    world
        .position(session.player)
        .is_some_and(|pos| pos.y < session.tuning.fall_y)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::{EntityKind, TreasureKind};
    use crate::sim::world::{ArcadeWorld, BodySpec, ContactBody, ContactEvent};
    use crate::tuning::Tuning;
    use proptest::prelude::*;

    const DT: f32 = 1.0 / 60.0;

    fn setup() -> (Session, ArcadeWorld) {
        let tuning = Tuning {
            spawning: false,
            ..Tuning::default()
        };
        let mut world = ArcadeWorld::default();
        let session = Session::begin(&mut world, &tuning, 1234);
        (session, world)
    }

    fn tap_at(x: f32) -> TickInput {
        TickInput {
            taps: vec![Vec2::new(x, 400.0)],
            ..Default::default()
        }
    }

    #[test]
    fn test_first_tap_starts_run() {
        let (mut session, mut world) = setup();
        assert!(tick(&mut session, &mut world, &TickInput::default(), 0.0).is_none());
        assert_eq!(session.phase, GamePhase::NotStarted);
        assert!(!world.is_dynamic(session.player));

        tick(&mut session, &mut world, &tap_at(120.0), DT);
        assert_eq!(session.phase, GamePhase::Running);
        assert!(session.state.started);
        assert!(world.is_dynamic(session.player));
        assert_eq!(session.state.last_pointer_x, Some(120.0));
    }

    #[test]
    fn test_move_ignored_before_start() {
        let (mut session, _world) = setup();
        pointer_moved(&mut session, Vec2::new(10.0, 10.0));
        assert_eq!(session.state.last_pointer_x, None);
    }

    #[test]
    fn test_ground_jump() {
        let (mut session, mut world) = setup();
        pointer_down(&mut session, &mut world, Vec2::new(195.0, 0.0));
        session.state.on_ground = true;
        session.state.can_double_jump = true;
        world.set_velocity(session.player, Vec2::new(12.0, -300.0));

        pointer_down(&mut session, &mut world, Vec2::new(195.0, 0.0));
        assert!(!session.state.on_ground);
        assert!(session.state.can_double_jump);
        let vel = world.velocity(session.player).unwrap();
        assert_eq!(vel.y, session.tuning.jump_impulse / session.tuning.player_mass);
        assert_eq!(vel.x, 12.0);
    }

    #[test]
    fn test_double_jump_once() {
        let (mut session, mut world) = setup();
        pointer_down(&mut session, &mut world, Vec2::ZERO);
        session.state.on_ground = true;
        session.state.can_double_jump = true;

        assert!(jump(&mut session, &mut world));
        world.set_velocity(session.player, Vec2::new(0.0, -80.0));
        assert!(jump(&mut session, &mut world));
        assert!(!session.state.can_double_jump);
        let expected = session.tuning.jump_impulse / session.tuning.player_mass;
        assert_eq!(world.velocity(session.player).unwrap().y, expected);

        // Third tap in the air does nothing
        world.set_velocity(session.player, Vec2::new(0.0, -80.0));
        pointer_down(&mut session, &mut world, Vec2::ZERO);
        assert_eq!(world.velocity(session.player), Some(Vec2::new(0.0, -80.0)));
    }

    #[test]
    fn test_first_tap_does_not_jump() {
        let (mut session, mut world) = setup();
        pointer_down(&mut session, &mut world, Vec2::ZERO);
        assert_eq!(world.velocity(session.player), Some(Vec2::ZERO));
    }

    #[test]
    fn test_cull_boundary() {
        let (session, mut world) = setup();
        let at_zero = world.spawn(BodySpec::platform(Vec2::new(50.0, 0.0), false));
        let at_one = world.spawn(BodySpec::platform(Vec2::new(50.0, 1.0), false));
        let background_y = world.position(session.background).unwrap().y;

        scroll_and_cull(&session, &mut world, 1.0);

        assert!(!world.contains(at_zero));
        assert_eq!(world.position(at_one), Some(Vec2::new(50.0, -99.0)));
        // Player and background never scroll
        assert_eq!(world.position(session.player), Some(session.tuning.player_start()));
        assert_eq!(world.position(session.background).unwrap().y, background_y);
    }

    #[test]
    fn test_steering_overrides_velocity() {
        let (mut session, mut world) = setup();
        pointer_down(&mut session, &mut world, Vec2::new(300.0, 0.0));
        world.set_velocity(session.player, Vec2::new(-500.0, -40.0));

        steer(&session, &mut world);
        let x = world.position(session.player).unwrap().x;
        let vel = world.velocity(session.player).unwrap();
        assert_eq!(vel.x, 2.0 * (300.0 - x));
        assert_eq!(vel.y, -40.0);
    }

    #[test]
    fn test_fall_through_ends_session() {
        let (mut session, mut world) = setup();
        tick(&mut session, &mut world, &tap_at(195.0), DT);

        world.set_position(session.player, Vec2::new(195.0, -50.0));
        world.set_velocity(session.player, Vec2::ZERO);
        world.set_dynamic(session.player, false);
        assert!(tick(&mut session, &mut world, &TickInput::default(), 0.0).is_none());

        world.set_position(session.player, Vec2::new(195.0, -50.5));
        let outcome = tick(&mut session, &mut world, &TickInput::default(), 0.0);
        assert_eq!(
            outcome,
            Some(SessionOutcome {
                coin_count: 0,
                chest_count: 0
            })
        );
        assert_eq!(session.phase, GamePhase::Ended);
        assert!(tick(&mut session, &mut world, &TickInput::default(), DT).is_none());
    }

    #[test]
    fn test_determinism() {
        let tuning = Tuning::default();
        let mut world1 = ArcadeWorld::default();
        let mut world2 = ArcadeWorld::default();
        let mut s1 = Session::begin(&mut world1, &tuning, 99999);
        let mut s2 = Session::begin(&mut world2, &tuning, 99999);

        for i in 0..600 {
            let input = if i % 45 == 0 { tap_at(100.0 + i as f32 % 200.0) } else { TickInput::default() };
            tick(&mut s1, &mut world1, &input, DT);
            tick(&mut s2, &mut world2, &input, DT);
        }

        assert_eq!(world1.entity_ids(), world2.entity_ids());
        assert_eq!(s1.state, s2.state);
        assert_eq!(world1.position(s1.player), world2.position(s2.player));
    }

    #[derive(Debug, Clone)]
    enum Op {
        Tap(f32),
        Tick(f32),
        Coin,
        Chest,
    }

    fn op() -> impl Strategy<Value = Op> {
        prop_oneof![
            (0.0f32..390.0).prop_map(Op::Tap),
            (0.0f32..0.1).prop_map(Op::Tick),
            Just(Op::Coin),
            Just(Op::Chest),
        ]
    }

    proptest! {
        #[test]
        fn prop_counters_never_decrease(ops in proptest::collection::vec(op(), 1..200)) {
            let (mut session, mut world) = setup();
            let mut last = (0, 0);
            for op in ops {
                match op {
                    Op::Tap(x) => pointer_down(&mut session, &mut world, Vec2::new(x, 0.0)),
                    Op::Tick(dt) => {
                        tick(&mut session, &mut world, &TickInput::default(), dt);
                    }
                    Op::Coin | Op::Chest => {
                        let kind = if matches!(op, Op::Coin) { TreasureKind::Coin } else { TreasureKind::Chest };
                        let id = world.spawn(BodySpec::treasure(Vec2::new(-500.0, 500.0), kind));
                        let event = ContactEvent::begin(
                            ContactBody { id: session.player, kind: EntityKind::Player },
                            ContactBody { id, kind: EntityKind::Treasure(kind) },
                        );
                        contact::resolve(&mut session, &mut world, &event);
                    }
                }
                let now = (session.state.coin_count, session.state.chest_count);
                prop_assert!(now.0 >= last.0 && now.1 >= last.1);
                last = now;
            }
        }
    }
}
