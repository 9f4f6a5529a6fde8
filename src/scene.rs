//! Scene flow: Start → Gameplay → GameOver → Start
//!
//! Owns the physics world, the host and the active gameplay session. Pointer
//! input during gameplay is buffered and applied at the next frame boundary;
//! menu taps act immediately.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::assets::AssetCatalog;
use crate::error::Result;
use crate::platform::{SceneHost, Transition};
use crate::renderer::{Frame, game_over_frame, gameplay_frame, start_frame};
use crate::sim::{PhysicsWorld, Session, SessionOutcome, TickInput, tick};
use crate::tuning::Tuning;
use crate::ui::{ControlId, ControlLayout};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SceneId {
    Start,
    Gameplay,
    GameOver,
}

/// Carried from a finished session into the GameOver scene
#[derive(Debug, Clone, PartialEq)]
pub struct GameOverData {
    pub coin_count: u32,
    pub chest_count: u32,
    /// Final gameplay frame, drawn behind the overlay
    pub snapshot: Option<Frame>,
}

#[derive(Debug)]
enum ActiveScene {
    Start,
    Gameplay(Box<Session>),
    GameOver(GameOverData),
}

/// Turns frame timestamps into Δt
///
/// The first frame after a reset has Δt = 0; longer gaps than `max_dt` are
/// clamped.
#[derive(Debug, Clone, Copy)]
pub struct FrameClock {
    last: Option<f64>,
    max_dt: f32,
}

impl FrameClock {
    pub fn new(max_dt: f32) -> Self {
        Self { last: None, max_dt }
    }

    pub fn reset(&mut self) {
        self.last = None;
    }

    pub fn delta(&mut self, now: f64) -> f32 {
        let dt = self
            .last
            .map(|last| (now - last).max(0.0) as f32)
            .unwrap_or(0.0);
        self.last = Some(now);
        dt.min(self.max_dt)
    }
}

pub struct SceneFlow<W, H> {
    world: W,
    host: H,
    tuning: Tuning,
    catalog: AssetCatalog,
    /// Base seed; session n plays with `seed + n`
    seed: u64,
    sessions_started: u64,
    active: ActiveScene,
    clock: FrameClock,
    pending: TickInput,
    start_menu: ControlLayout,
    game_over_menu: ControlLayout,
}

impl<W: PhysicsWorld, H: SceneHost> SceneFlow<W, H> {
    /// Validate the tuning and show the start screen
    pub fn new(world: W, mut host: H, tuning: Tuning, seed: u64) -> Result<Self> {
        tuning.validate()?;
        host.present(SceneId::Start, Transition::Cut);
        Ok(Self {
            world,
            host,
            catalog: AssetCatalog::with_game_images(),
            seed,
            sessions_started: 0,
            active: ActiveScene::Start,
            clock: FrameClock::new(tuning.max_frame_dt),
            pending: TickInput::default(),
            start_menu: ControlLayout::start_menu(&tuning),
            game_over_menu: ControlLayout::game_over(&tuning),
            tuning,
        })
    }

    /// Replace the default asset catalog
    pub fn with_catalog(mut self, catalog: AssetCatalog) -> Self {
        self.catalog = catalog;
        self
    }

    pub fn scene(&self) -> SceneId {
        match self.active {
            ActiveScene::Start => SceneId::Start,
            ActiveScene::Gameplay(_) => SceneId::Gameplay,
            ActiveScene::GameOver(_) => SceneId::GameOver,
        }
    }

    pub fn session(&self) -> Option<&Session> {
        match &self.active {
            ActiveScene::Gameplay(session) => Some(&**session),
            _ => None,
        }
    }

    pub fn game_over(&self) -> Option<&GameOverData> {
        match &self.active {
            ActiveScene::GameOver(data) => Some(data),
            _ => None,
        }
    }

    pub fn world(&self) -> &W {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut W {
        &mut self.world
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    pub fn start_menu(&self) -> &ControlLayout {
        &self.start_menu
    }

    pub fn game_over_menu(&self) -> &ControlLayout {
        &self.game_over_menu
    }

    pub fn pointer_down(&mut self, pos: Vec2) {
        match self.active {
            ActiveScene::Start => match self.start_menu.hit(pos) {
                Some(ControlId::Play | ControlId::Start) => self.enter_gameplay(),
                Some(ControlId::Settings) => log::info!("Settings tapped (no settings screen)"),
                _ => {}
            },
            ActiveScene::Gameplay(_) => self.pending.taps.push(pos),
            ActiveScene::GameOver(_) => {
                if self.game_over_menu.hit(pos) == Some(ControlId::Menu) {
                    self.enter_start();
                }
            }
        }
    }

    pub fn pointer_moved(&mut self, pos: Vec2) {
        if let ActiveScene::Gameplay(_) = self.active {
            self.pending.pointer = Some(pos);
        }
    }

    /// Run one display frame at host time `now` (seconds)
    pub fn frame(&mut self, now: f64) {
        let dt = self.clock.delta(now);

        let outcome = match &mut self.active {
            ActiveScene::Start => {
                let frame = start_frame(&self.tuning, &mut self.catalog, &self.start_menu);
                self.host.draw(&frame);
                None
            }
            ActiveScene::Gameplay(session) => {
                let input = std::mem::take(&mut self.pending);
                let outcome = tick(session, &mut self.world, &input, dt);
                let frame = gameplay_frame(session, &self.world, &mut self.catalog);
                self.host.draw(&frame);
                outcome
            }
            ActiveScene::GameOver(data) => {
                let frame = game_over_frame(
                    &self.tuning,
                    &mut self.catalog,
                    &self.game_over_menu,
                    data.coin_count,
                    data.chest_count,
                    data.snapshot.as_ref(),
                );
                self.host.draw(&frame);
                None
            }
        };

        if let Some(outcome) = outcome {
            self.enter_game_over(outcome);
        }
    }

    fn crossfade(&self) -> Transition {
        Transition::Crossfade {
            secs: self.tuning.crossfade_secs,
        }
    }

    fn enter_gameplay(&mut self) {
        let seed = self.seed.wrapping_add(self.sessions_started);
        self.sessions_started += 1;

        let session = Session::begin(&mut self.world, &self.tuning, seed);
        self.active = ActiveScene::Gameplay(Box::new(session));
        self.clock.reset();
        self.pending = TickInput::default();
        self.host.present(SceneId::Gameplay, self.crossfade());
    }

    fn enter_game_over(&mut self, outcome: SessionOutcome) {
        let snapshot = self.host.capture_frame();
        if snapshot.is_none() {
            log::warn!("Host returned no final frame, game over without backdrop");
        }
        self.release_session();

        self.active = ActiveScene::GameOver(GameOverData {
            coin_count: outcome.coin_count,
            chest_count: outcome.chest_count,
            snapshot,
        });
        self.host.present(SceneId::GameOver, self.crossfade());
    }

    fn enter_start(&mut self) {
        self.release_session();
        self.active = ActiveScene::Start;
        self.host.present(SceneId::Start, self.crossfade());
    }

    /// Cancel the session's timers and empty the world before dropping it
    fn release_session(&mut self) {
        if let ActiveScene::Gameplay(mut session) =
            std::mem::replace(&mut self.active, ActiveScene::Start)
        {
            session.teardown(&mut self.world);
        }
        self.pending = TickInput::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::Texture;
    use crate::platform::HeadlessHost;
    use crate::sim::{ArcadeWorld, BodySpec, TreasureKind};

    const DT: f64 = 1.0 / 60.0;

    fn flow(spawning: bool) -> SceneFlow<ArcadeWorld, HeadlessHost> {
        let tuning = Tuning {
            spawning,
            ..Tuning::default()
        };
        SceneFlow::new(ArcadeWorld::default(), HeadlessHost::new(), tuning, 77).unwrap()
    }

    fn tap(flow: &mut SceneFlow<ArcadeWorld, HeadlessHost>, id: ControlId, menu: SceneId) {
        let layout = match menu {
            SceneId::GameOver => flow.game_over_menu(),
            _ => flow.start_menu(),
        };
        let center = layout.get(id).unwrap().center;
        flow.pointer_down(center);
    }

    fn player_pos(flow: &SceneFlow<ArcadeWorld, HeadlessHost>) -> Vec2 {
        let player = flow.session().unwrap().player;
        flow.world().position(player).unwrap()
    }

    #[test]
    fn test_full_loop_carries_counters() {
        let mut flow = flow(false);
        assert_eq!(flow.scene(), SceneId::Start);

        tap(&mut flow, ControlId::Play, SceneId::Start);
        assert_eq!(flow.scene(), SceneId::Gameplay);

        let mut t = 0.0;
        flow.frame(t);

        let pos = player_pos(&flow);
        flow.world_mut().spawn(BodySpec::treasure(pos, TreasureKind::Coin));
        t += DT;
        flow.frame(t);

        let pos = player_pos(&flow);
        flow.world_mut().spawn(BodySpec::treasure(pos, TreasureKind::Chest));
        t += DT;
        flow.frame(t);

        let state = &flow.session().unwrap().state;
        assert_eq!((state.coin_count, state.chest_count), (1, 1));

        // Start falling straight down between the ledge columns
        flow.pointer_down(Vec2::new(pos.x, 300.0));
        while flow.scene() == SceneId::Gameplay && t < 10.0 {
            t += DT;
            flow.frame(t);
        }

        assert_eq!(flow.scene(), SceneId::GameOver);
        let data = flow.game_over().unwrap();
        assert_eq!((data.coin_count, data.chest_count), (1, 1));
        assert!(data.snapshot.is_some());
        assert!(flow.world().entity_ids().is_empty());
        assert_eq!(
            flow.host().presented.last(),
            Some(&(SceneId::GameOver, Transition::Crossfade { secs: 1.0 }))
        );

        flow.frame(t + DT);
        let drawn = flow.host().last_frame().unwrap();
        let texts: Vec<_> = drawn.labels().map(|l| l.text.clone()).collect();
        assert_eq!(texts, ["1", "1"]);

        tap(&mut flow, ControlId::Menu, SceneId::GameOver);
        assert_eq!(flow.scene(), SceneId::Start);
        let scenes: Vec<_> = flow.host().presented.iter().map(|(s, _)| *s).collect();
        assert_eq!(
            scenes,
            [SceneId::Start, SceneId::Gameplay, SceneId::GameOver, SceneId::Start]
        );
    }

    #[test]
    fn test_start_button_also_plays() {
        let mut flow = flow(true);
        tap(&mut flow, ControlId::Start, SceneId::Start);
        assert_eq!(flow.scene(), SceneId::Gameplay);
    }

    #[test]
    fn test_settings_and_misses_stay_on_start() {
        let mut flow = flow(true);
        tap(&mut flow, ControlId::Settings, SceneId::Start);
        flow.pointer_down(Vec2::new(1.0, 1.0));
        assert_eq!(flow.scene(), SceneId::Start);
        assert_eq!(flow.host().presented.len(), 1);
    }

    #[test]
    fn test_gameplay_input_waits_for_frame() {
        let mut flow = flow(true);
        tap(&mut flow, ControlId::Play, SceneId::Start);
        flow.pointer_down(Vec2::new(100.0, 100.0));
        assert!(!flow.session().unwrap().state.started);

        flow.frame(0.0);
        assert!(flow.session().unwrap().state.started);
        assert_eq!(flow.session().unwrap().state.last_pointer_x, Some(100.0));
    }

    #[test]
    fn test_first_gameplay_frame_has_zero_dt() {
        let mut flow = flow(true);
        flow.frame(3.0);
        tap(&mut flow, ControlId::Play, SceneId::Start);

        flow.frame(50.0);
        assert_eq!(flow.session().unwrap().scheduler.elapsed, 0.0);

        // Long stalls are clamped
        flow.frame(52.0);
        let elapsed = flow.session().unwrap().scheduler.elapsed;
        assert!((elapsed - flow.tuning().max_frame_dt as f64).abs() < 1e-9);
    }

    #[test]
    fn test_new_session_resets_counters() {
        let mut flow = flow(false);
        tap(&mut flow, ControlId::Play, SceneId::Start);
        flow.frame(0.0);
        let pos = player_pos(&flow);
        flow.world_mut().spawn(BodySpec::treasure(pos, TreasureKind::Coin));
        flow.frame(DT);
        let first_seed = flow.session().unwrap().seed;
        assert_eq!(flow.session().unwrap().state.coin_count, 1);

        flow.pointer_down(Vec2::new(pos.x, 0.0));
        let mut t = DT;
        while flow.scene() == SceneId::Gameplay && t < 10.0 {
            t += DT;
            flow.frame(t);
        }
        tap(&mut flow, ControlId::Menu, SceneId::GameOver);
        tap(&mut flow, ControlId::Play, SceneId::Start);

        let session = flow.session().unwrap();
        assert_eq!(session.state.coin_count, 0);
        assert_ne!(session.seed, first_seed);
    }

    #[test]
    fn test_frame_clock() {
        let mut clock = FrameClock::new(0.1);
        assert_eq!(clock.delta(10.0), 0.0);
        assert!((clock.delta(10.05) - 0.05).abs() < 1e-6);
        assert_eq!(clock.delta(9.0), 0.0);
        clock.reset();
        assert_eq!(clock.delta(100.0), 0.0);
    }

    #[test]
    fn test_frame_clock_limit_from_tuning() {
        let tuning = Tuning {
            max_frame_dt: 0.5,
            ..Tuning::default()
        };
        let mut flow =
            SceneFlow::new(ArcadeWorld::default(), HeadlessHost::new(), tuning, 3).unwrap();
        tap(&mut flow, ControlId::Play, SceneId::Start);
        flow.frame(0.0);
        flow.frame(0.4);
        let elapsed = flow.session().unwrap().scheduler.elapsed;
        assert!((elapsed - 0.4).abs() < 1e-6);
    }

    #[test]
    fn test_invalid_tuning_rejected() {
        let tuning = Tuning {
            platform_interval: 0.0,
            ..Tuning::default()
        };
        let result = SceneFlow::new(ArcadeWorld::default(), HeadlessHost::new(), tuning, 1);
        assert!(matches!(
            result,
            Err(crate::Error::Invalid {
                field: "platform_interval",
                ..
            })
        ));
    }

    #[test]
    fn test_missing_assets_draw_placeholders() {
        let mut flow = flow(false).with_catalog(AssetCatalog::new());
        flow.frame(0.0);
        let frame = flow.host().last_frame().unwrap();
        assert_eq!(frame.sprites().count(), 4);
        assert!(frame.sprites().all(|s| s.texture == Texture::Placeholder));

        tap(&mut flow, ControlId::Play, SceneId::Start);
        flow.frame(0.1);
        let frame = flow.host().last_frame().unwrap();
        assert!(frame.sprites().all(|s| s.texture == Texture::Placeholder));
    }
}
