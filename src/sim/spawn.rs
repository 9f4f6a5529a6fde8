//! Platform, treasure and rock spawning
//!
//! Each cadence is an explicit next-fire time advanced by simulated time, so
//! spawning is deterministic for a given seed and trivially testable.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::state::{EntityId, TreasureKind};
use super::world::{BodySpec, PhysicsWorld};
use crate::consts::*;
use crate::tuning::Tuning;

/// How a timer picks its next interval
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Cadence {
    Fixed(f32),
    /// Interval drawn uniformly from `[min, max)` after every fire
    Renewal { min: f32, max: f32 },
}

impl Cadence {
    pub fn draw(&self, rng: &mut impl Rng) -> f32 {
        match *self {
            Cadence::Fixed(interval) => interval,
            Cadence::Renewal { min, max } => rng.random_range(min..max),
        }
    }
}

/// A repeating timer
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpawnTimer {
    pub cadence: Cadence,
    /// Session time of the next fire (seconds)
    pub next_fire: f64,
    /// Interval most recently drawn
    pub last_interval: f32,
}

impl SpawnTimer {
    /// Fires at t = 0, then every interval
    pub fn immediate(cadence: Cadence) -> Self {
        Self {
            cadence,
            next_fire: 0.0,
            last_interval: 0.0,
        }
    }

    /// First fire after one drawn interval
    pub fn delayed(cadence: Cadence, rng: &mut impl Rng) -> Self {
        let interval = cadence.draw(rng);
        Self {
            cadence,
            next_fire: interval as f64,
            last_interval: interval,
        }
    }

    /// Pop one due fire, rescheduling the next; returns the fire time
    fn pop_due(&mut self, now: f64, rng: &mut impl Rng) -> Option<f64> {
        if self.next_fire > now {
            return None;
        }
        let fired = self.next_fire;
        self.last_interval = self.cadence.draw(rng);
        self.next_fire += self.last_interval as f64;
        Some(fired)
    }
}

/// What to spawn
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum SpawnKind {
    Platform { wide: bool },
    Treasure(TreasureKind),
    /// Dynamic rock with an initial sideways impulse
    Rock { impulse_x: f32 },
}

/// A single spawn, fully rolled
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpawnRequest {
    pub kind: SpawnKind,
    pub pos: Vec2,
}

impl SpawnRequest {
    /// Random platform at the given height in one of the two columns
    pub fn platform(tuning: &Tuning, y: f32, rng: &mut impl Rng) -> Self {
        let x = pick_column(tuning, rng);
        Self {
            kind: SpawnKind::Platform {
                wide: !rng.random_bool(0.5),
            },
            pos: Vec2::new(x, y),
        }
    }

    pub fn treasure(tuning: &Tuning, rng: &mut impl Rng) -> Self {
        let x = pick_column(tuning, rng);
        let kind = if rng.random_bool(0.5) {
            TreasureKind::Coin
        } else {
            TreasureKind::Chest
        };
        Self {
            kind: SpawnKind::Treasure(kind),
            pos: Vec2::new(x, tuning.screen_height + TREASURE_SPAWN_OFFSET),
        }
    }

    pub fn rock(tuning: &Tuning, rng: &mut impl Rng) -> Self {
        let reach = tuning.rock_impulse_x;
        Self {
            kind: SpawnKind::Rock {
                impulse_x: rng.random_range(-reach..=reach),
            },
            pos: Vec2::new(
                tuning.screen_width / 2.0,
                tuning.screen_height + ROCK_SPAWN_OFFSET,
            ),
        }
    }

    /// Create the body (and kick rocks)
    pub fn spawn_into(&self, world: &mut impl PhysicsWorld, tuning: &Tuning) -> EntityId {
        match self.kind {
            SpawnKind::Platform { wide } => world.spawn(BodySpec::platform(self.pos, wide)),
            SpawnKind::Treasure(kind) => world.spawn(BodySpec::treasure(self.pos, kind)),
            SpawnKind::Rock { impulse_x } => {
                let id = world.spawn(BodySpec::rock(self.pos, tuning));
                world.apply_impulse(id, Vec2::new(impulse_x, 0.0));
                id
            }
        }
    }
}

fn pick_column(tuning: &Tuning, rng: &mut impl Rng) -> f32 {
    let [left, right] = tuning.spawn_columns();
    if rng.random_bool(0.5) { left } else { right }
}

/// Independent platform / treasure / rock cadences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpawnScheduler {
    /// Session time (seconds)
    pub elapsed: f64,
    pub platforms: SpawnTimer,
    pub treasures: SpawnTimer,
    pub rocks: SpawnTimer,
    cancelled: bool,
}

impl SpawnScheduler {
    pub fn new(tuning: &Tuning, rng: &mut impl Rng) -> Self {
        Self {
            elapsed: 0.0,
            platforms: SpawnTimer::immediate(Cadence::Fixed(tuning.platform_interval)),
            treasures: SpawnTimer::immediate(Cadence::Fixed(tuning.treasure_interval)),
            rocks: SpawnTimer::delayed(
                Cadence::Renewal {
                    min: tuning.rock_interval_min,
                    max: tuning.rock_interval_max,
                },
                rng,
            ),
            cancelled: !tuning.spawning,
        }
    }

    /// The five ledges the session starts with
    pub fn initial_platforms(tuning: &Tuning, rng: &mut impl Rng) -> Vec<SpawnRequest> {
        (0..INITIAL_PLATFORMS)
            .map(|i| {
                let y = i as f32 * INITIAL_PLATFORM_SPACING + INITIAL_PLATFORM_SPACING;
                let x = pick_column(tuning, rng);
                SpawnRequest {
                    kind: SpawnKind::Platform {
                        wide: !rng.random_bool(0.5),
                    },
                    pos: Vec2::new(x, y),
                }
            })
            .collect()
    }

    /// Stop every timer for good
    pub fn cancel(&mut self) {
        if !self.cancelled {
            log::debug!("Spawn timers cancelled at t={:.2}s", self.elapsed);
        }
        self.cancelled = true;
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled
    }

    /// Advance session time and roll every spawn that came due
    pub fn advance(&mut self, dt: f32, tuning: &Tuning, rng: &mut impl Rng) -> Vec<SpawnRequest> {
        self.elapsed += dt as f64;
        let mut requests = Vec::new();
        if self.cancelled {
            return requests;
        }

        let now = self.elapsed;
        while self.platforms.pop_due(now, rng).is_some() {
            requests.push(SpawnRequest::platform(tuning, tuning.screen_height, rng));
        }
        while self.treasures.pop_due(now, rng).is_some() {
            requests.push(SpawnRequest::treasure(tuning, rng));
        }
        while let Some(at) = self.rocks.pop_due(now, rng) {
            log::debug!(
                "Rock at t={:.2}s, next in {:.2}s",
                at,
                self.rocks.last_interval
            );
            requests.push(SpawnRequest::rock(tuning, rng));
        }
        requests
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn count(requests: &[SpawnRequest], pred: impl Fn(&SpawnKind) -> bool) -> usize {
        requests.iter().filter(|r| pred(&r.kind)).count()
    }

    #[test]
    fn test_initial_platforms_layout() {
        let tuning = Tuning::default();
        let mut rng = Pcg32::seed_from_u64(3);
        let platforms = SpawnScheduler::initial_platforms(&tuning, &mut rng);

        assert_eq!(platforms.len(), 5);
        for (i, p) in platforms.iter().enumerate() {
            assert_eq!(p.pos.y, 220.0 * i as f32 + 220.0);
            assert!(p.pos.x == 50.0 || p.pos.x == tuning.screen_width - 50.0);
            assert!(matches!(p.kind, SpawnKind::Platform { .. }));
        }
    }

    #[test]
    fn test_fixed_cadences() {
        let tuning = Tuning {
            rock_interval_min: 100.0,
            rock_interval_max: 101.0,
            ..Tuning::default()
        };
        let mut rng = Pcg32::seed_from_u64(11);
        let mut scheduler = SpawnScheduler::new(&tuning, &mut rng);

        // First frame fires platform + treasure immediately
        let first = scheduler.advance(0.0, &tuning, &mut rng);
        assert_eq!(count(&first, |k| matches!(k, SpawnKind::Platform { .. })), 1);
        assert_eq!(count(&first, |k| matches!(k, SpawnKind::Treasure(_))), 1);

        // 6 more seconds at 60 Hz: platforms at 1.5, 3.0, 4.5, 6.0; treasures at 3.0, 6.0
        let mut rest = Vec::new();
        for _ in 0..361 {
            rest.extend(scheduler.advance(1.0 / 60.0, &tuning, &mut rng));
        }
        assert_eq!(count(&rest, |k| matches!(k, SpawnKind::Platform { .. })), 4);
        assert_eq!(count(&rest, |k| matches!(k, SpawnKind::Treasure(_))), 2);
        assert_eq!(count(&rest, |k| matches!(k, SpawnKind::Rock { .. })), 0);
    }

    #[test]
    fn test_spawn_positions() {
        let tuning = Tuning::default();
        let mut rng = Pcg32::seed_from_u64(5);
        for _ in 0..50 {
            let t = SpawnRequest::treasure(&tuning, &mut rng);
            assert_eq!(t.pos.y, tuning.screen_height + 40.0);
            assert!(t.pos.x == 50.0 || t.pos.x == tuning.screen_width - 50.0);

            let r = SpawnRequest::rock(&tuning, &mut rng);
            assert_eq!(r.pos, Vec2::new(tuning.screen_width / 2.0, tuning.screen_height + 50.0));
            let SpawnKind::Rock { impulse_x } = r.kind else {
                panic!("expected rock");
            };
            assert!((-50.0..=50.0).contains(&impulse_x));
        }
    }

    #[test]
    fn test_rock_renewal_intervals() {
        let tuning = Tuning::default();
        let mut rng = Pcg32::seed_from_u64(42);
        let mut scheduler = SpawnScheduler::new(&tuning, &mut rng);

        let mut intervals = vec![scheduler.rocks.last_interval];
        let mut rocks = 0;
        while intervals.len() < 1000 {
            let due_in = (scheduler.rocks.next_fire - scheduler.elapsed) as f32;
            let spawned = scheduler.advance(due_in + 1e-3, &tuning, &mut rng);
            rocks += count(&spawned, |k| matches!(k, SpawnKind::Rock { .. }));
            intervals.push(scheduler.rocks.last_interval);
        }
        assert_eq!(rocks, 999);

        for interval in &intervals {
            assert!((3.0..4.0).contains(interval), "interval {interval} out of range");
        }
        let distinct = intervals
            .windows(2)
            .filter(|w| (w[0] - w[1]).abs() > 1e-6)
            .count();
        assert!(distinct > 900, "intervals look fixed");
    }

    #[test]
    fn test_cancel_stops_everything() {
        let tuning = Tuning::default();
        let mut rng = Pcg32::seed_from_u64(9);
        let mut scheduler = SpawnScheduler::new(&tuning, &mut rng);
        scheduler.cancel();
        for _ in 0..600 {
            assert!(scheduler.advance(0.1, &tuning, &mut rng).is_empty());
        }
    }

    #[test]
    fn test_spawning_switch() {
        let tuning = Tuning {
            spawning: false,
            ..Tuning::default()
        };
        let mut rng = Pcg32::seed_from_u64(9);
        let mut scheduler = SpawnScheduler::new(&tuning, &mut rng);
        assert!(scheduler.advance(10.0, &tuning, &mut rng).is_empty());
    }

    proptest! {
        #[test]
        fn prop_renewal_draws_in_range(seed in any::<u64>()) {
            let mut rng = Pcg32::seed_from_u64(seed);
            let cadence = Cadence::Renewal { min: 3.0, max: 4.0 };
            for _ in 0..100 {
                let interval = cadence.draw(&mut rng);
                prop_assert!((3.0..4.0).contains(&interval));
            }
        }
    }
}
