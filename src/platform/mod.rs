//! Platform abstraction layer
//!
//! The device side of the game:
//! - Scene presentation with a transition effect
//! - Drawing a frame's draw list
//! - Capturing the last drawn frame
//!
//! [`HeadlessHost`] implements it without a screen for the native binary and
//! tests.

use serde::{Deserialize, Serialize};

use crate::renderer::Frame;
use crate::scene::SceneId;

/// How the host swaps the visible scene
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Transition {
    /// Immediate swap (first scene only)
    Cut,
    Crossfade { secs: f32 },
}

pub trait SceneHost {
    fn present(&mut self, scene: SceneId, transition: Transition);
    fn draw(&mut self, frame: &Frame);
    /// Snapshot of the last drawn frame, if the host can provide one
    fn capture_frame(&mut self) -> Option<Frame>;
}

/// Records presentations and keeps the last frame
#[derive(Debug, Clone, Default)]
pub struct HeadlessHost {
    pub presented: Vec<(SceneId, Transition)>,
    pub frames_drawn: u64,
    last_frame: Option<Frame>,
}

impl HeadlessHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last_frame(&self) -> Option<&Frame> {
        self.last_frame.as_ref()
    }
}

impl SceneHost for HeadlessHost {
    fn present(&mut self, scene: SceneId, transition: Transition) {
        log::info!("Presenting {scene:?} ({transition:?})");
        self.presented.push((scene, transition));
    }

    fn draw(&mut self, frame: &Frame) {
        self.frames_drawn += 1;
        self.last_frame = Some(frame.clone());
    }

    fn capture_frame(&mut self) -> Option<Frame> {
        self.last_frame.clone()
    }
}
