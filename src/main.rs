//! Canyon Jumper entry point
//!
//! Runs headless: an autopilot plays one session at 60 Hz and the result is
//! logged. Pass a tuning JSON path as the first argument to override the
//! defaults.

use canyon_jumper::platform::HeadlessHost;
use canyon_jumper::sim::{ArcadeWorld, EntityKind, PhysicsWorld};
use canyon_jumper::ui::ControlId;
use canyon_jumper::{SceneFlow, SceneId, Tuning};
use glam::Vec2;

const FRAME_DT: f64 = 1.0 / 60.0;
/// Give up after this much simulated time
const MAX_SECS: f64 = 120.0;
/// Seconds between autopilot taps
const TAP_EVERY: f64 = 0.6;

fn load_tuning() -> Tuning {
    let Some(path) = std::env::args().nth(1) else {
        return Tuning::default();
    };
    match Tuning::load(&path) {
        Ok(tuning) => tuning,
        Err(e) => {
            log::error!("Failed to load tuning from {path}: {e}, using defaults");
            Tuning::default()
        }
    }
}

/// Steer toward the closest platform below the player
fn autopilot_target(flow: &SceneFlow<ArcadeWorld, HeadlessHost>) -> Option<Vec2> {
    let session = flow.session()?;
    let world = flow.world();
    let player = world.position(session.player)?;

    world
        .entity_ids()
        .into_iter()
        .filter(|&id| matches!(world.kind(id), Some(EntityKind::Platform { .. })))
        .filter_map(|id| world.position(id))
        .filter(|pos| pos.y < player.y)
        .min_by(|a, b| (player.y - a.y).total_cmp(&(player.y - b.y)))
}

fn press(flow: &mut SceneFlow<ArcadeWorld, HeadlessHost>, id: ControlId) {
    let layout = match flow.scene() {
        SceneId::GameOver => flow.game_over_menu(),
        _ => flow.start_menu(),
    };
    if let Some(center) = layout.get(id).map(|c| c.center) {
        flow.pointer_down(center);
    }
}

fn main() {
    env_logger::init();
    log::info!("Canyon Jumper (headless) starting...");

    let tuning = load_tuning();
    let seed = rand::random::<u64>();
    log::info!("Seed {seed}");

    let mut flow = match SceneFlow::new(ArcadeWorld::default(), HeadlessHost::new(), tuning, seed) {
        Ok(flow) => flow,
        Err(e) => {
            log::error!("Invalid tuning: {e}");
            return;
        }
    };
    let mut now = 0.0;
    flow.frame(now);
    press(&mut flow, ControlId::Play);

    let mut next_tap = 0.0;
    while flow.scene() == SceneId::Gameplay && now < MAX_SECS {
        if let Some(target) = autopilot_target(&flow) {
            if now >= next_tap {
                flow.pointer_down(target);
                next_tap = now + TAP_EVERY;
            } else {
                flow.pointer_moved(target);
            }
        } else if now >= next_tap {
            let center = flow.tuning().center();
            flow.pointer_down(center);
            next_tap = now + TAP_EVERY;
        }
        now += FRAME_DT;
        flow.frame(now);
    }

    match flow.game_over() {
        Some(data) => log::info!(
            "Game over after {:.1}s: {} coins, {} chests",
            now,
            data.coin_count,
            data.chest_count
        ),
        None => log::info!("Autopilot survived {MAX_SECS}s"),
    }
    log::info!("{} frames drawn", flow.host().frames_drawn);

    if flow.scene() == SceneId::GameOver {
        press(&mut flow, ControlId::Menu);
    }
}
