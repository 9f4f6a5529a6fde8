//! Menu controls
//!
//! Buttons are named, layered sprites; a tap hits the top-most control under
//! the pointer.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::tuning::Tuning;

/// Button size in scene units
pub const BUTTON_SIZE: Vec2 = Vec2::new(220.0, 70.0);

/// Counter label style on the game over screen
pub const LABEL_FONT: &str = "Avenir-Black";
pub const LABEL_SIZE: f32 = 48.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ControlId {
    Play,
    Start,
    Settings,
    Menu,
}

impl ControlId {
    pub fn name(self) -> &'static str {
        match self {
            ControlId::Play => "playButton",
            ControlId::Start => "startButton",
            ControlId::Settings => "settingsButton",
            ControlId::Menu => "menuButton",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Control {
    pub id: ControlId,
    pub image: String,
    pub center: Vec2,
    pub size: Vec2,
    pub z: f32,
}

impl Control {
    pub fn new(id: ControlId, image: &str, center: Vec2, z: f32) -> Self {
        Self {
            id,
            image: image.to_string(),
            center,
            size: BUTTON_SIZE,
            z,
        }
    }

    pub fn contains(&self, pos: Vec2) -> bool {
        let d = (pos - self.center).abs();
        d.x <= self.size.x / 2.0 && d.y <= self.size.y / 2.0
    }
}

/// The controls of one scene
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ControlLayout {
    pub controls: Vec<Control>,
}

impl ControlLayout {
    /// Play, start and (inert) settings, stacked down the middle
    pub fn start_menu(tuning: &Tuning) -> Self {
        let x = tuning.screen_width / 2.0;
        let h = tuning.screen_height;
        Self {
            controls: vec![
                Control::new(ControlId::Play, "playButtonImage", Vec2::new(x, h * 0.65), 3.0),
                Control::new(ControlId::Start, "startButtonImage", Vec2::new(x, h * 0.5), 2.0),
                Control::new(
                    ControlId::Settings,
                    "settingsButtonImage",
                    Vec2::new(x, h * 0.35),
                    1.0,
                ),
            ],
        }
    }

    /// Single return-to-menu button
    pub fn game_over(tuning: &Tuning) -> Self {
        Self {
            controls: vec![Control::new(
                ControlId::Menu,
                "startButtonImage",
                Vec2::new(tuning.screen_width / 2.0, tuning.screen_height * 0.3),
                2.0,
            )],
        }
    }

    /// Top-most control under `pos`
    pub fn hit(&self, pos: Vec2) -> Option<ControlId> {
        self.controls
            .iter()
            .filter(|c| c.contains(pos))
            .max_by(|a, b| a.z.total_cmp(&b.z))
            .map(|c| c.id)
    }

    pub fn get(&self, id: ControlId) -> Option<&Control> {
        self.controls.iter().find(|c| c.id == id)
    }
}
