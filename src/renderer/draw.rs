//! Draw-list building for the three scenes

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::assets::{AssetCatalog, Texture};
use crate::sim::{PhysicsWorld, Session};
use crate::tuning::Tuning;
use crate::ui::{ControlLayout, LABEL_FONT, LABEL_SIZE};

pub const WHITE: [f32; 4] = [1.0, 1.0, 1.0, 1.0];
pub const BLACK: [f32; 4] = [0.0, 0.0, 0.0, 1.0];
/// Player pulses toward this on a rock hit
pub const HIGHLIGHT: [f32; 4] = [1.0, 0.25, 0.2, 1.0];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sprite {
    pub texture: Texture,
    pub pos: Vec2,
    pub size: Vec2,
    pub z: f32,
    /// Multiplied into the texture color
    pub tint: [f32; 4],
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Label {
    pub text: String,
    pub font: String,
    pub font_size: f32,
    pub color: [f32; 4],
    pub pos: Vec2,
    pub z: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DrawItem {
    Sprite(Sprite),
    Label(Label),
    /// A previously captured frame stretched over `size`
    Backdrop { frame: Box<Frame>, pos: Vec2, size: Vec2, z: f32 },
}

impl DrawItem {
    pub fn z(&self) -> f32 {
        match self {
            DrawItem::Sprite(s) => s.z,
            DrawItem::Label(l) => l.z,
            DrawItem::Backdrop { z, .. } => *z,
        }
    }
}

/// One frame's draw list, back to front
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    pub width: f32,
    pub height: f32,
    pub items: Vec<DrawItem>,
}

impl Frame {
    pub fn new(tuning: &Tuning) -> Self {
        Self {
            width: tuning.screen_width,
            height: tuning.screen_height,
            items: Vec::new(),
        }
    }

    pub fn push(&mut self, item: DrawItem) {
        self.items.push(item);
    }

    /// Stable sort by z so equal layers keep insertion order
    pub fn sort(&mut self) {
        self.items.sort_by(|a, b| a.z().total_cmp(&b.z()));
    }

    pub fn sprites(&self) -> impl Iterator<Item = &Sprite> {
        self.items.iter().filter_map(|item| match item {
            DrawItem::Sprite(s) => Some(s),
            _ => None,
        })
    }

    pub fn labels(&self) -> impl Iterator<Item = &Label> {
        self.items.iter().filter_map(|item| match item {
            DrawItem::Label(l) => Some(l),
            _ => None,
        })
    }

    fn full_screen(&mut self, catalog: &mut AssetCatalog, image: &str, z: f32) {
        let size = Vec2::new(self.width, self.height);
        self.push(DrawItem::Sprite(Sprite {
            texture: catalog.resolve(image),
            pos: size / 2.0,
            size,
            z,
            tint: WHITE,
        }));
    }

    fn controls(&mut self, catalog: &mut AssetCatalog, layout: &ControlLayout) {
        for control in &layout.controls {
            self.push(DrawItem::Sprite(Sprite {
                texture: catalog.resolve(&control.image),
                pos: control.center,
                size: control.size,
                z: control.z,
                tint: WHITE,
            }));
        }
    }
}

/// Blend from white toward the highlight color
pub fn flash_tint(intensity: f32) -> [f32; 4] {
    let t = intensity.clamp(0.0, 1.0);
    let mut tint = WHITE;
    for (c, h) in tint.iter_mut().zip(HIGHLIGHT) {
        *c += (h - *c) * t;
    }
    tint
}

pub fn start_frame(tuning: &Tuning, catalog: &mut AssetCatalog, layout: &ControlLayout) -> Frame {
    let mut frame = Frame::new(tuning);
    frame.full_screen(catalog, "startBackgroundImage", -1.0);
    frame.controls(catalog, layout);
    frame.sort();
    frame
}

/// Every live body, background at the back and the player on top
pub fn gameplay_frame(
    session: &Session,
    world: &impl PhysicsWorld,
    catalog: &mut AssetCatalog,
) -> Frame {
    let mut frame = Frame::new(&session.tuning);
    for id in world.entity_ids() {
        let (Some(kind), Some(pos), Some(shape)) = (world.kind(id), world.position(id), world.shape(id))
        else {
            continue;
        };
        let (z, tint) = if id == session.background {
            (-1.0, WHITE)
        } else if id == session.player {
            (1.0, flash_tint(session.flash_intensity()))
        } else {
            (0.0, WHITE)
        };
        frame.push(DrawItem::Sprite(Sprite {
            texture: catalog.resolve(kind.image()),
            pos,
            size: shape.size(),
            z,
            tint,
        }));
    }
    frame.sort();
    frame
}

/// Final-frame backdrop, overlay, the two counters and the menu button
pub fn game_over_frame(
    tuning: &Tuning,
    catalog: &mut AssetCatalog,
    layout: &ControlLayout,
    coin_count: u32,
    chest_count: u32,
    snapshot: Option<&Frame>,
) -> Frame {
    let mut frame = Frame::new(tuning);
    let size = Vec2::new(frame.width, frame.height);

    if let Some(snapshot) = snapshot {
        frame.push(DrawItem::Backdrop {
            frame: Box::new(snapshot.clone()),
            pos: size / 2.0,
            size,
            z: -1.0,
        });
    }
    frame.full_screen(catalog, "overBackgroundImage", 1.0);

    for (count, x) in [(coin_count, 0.25), (chest_count, 0.65)] {
        frame.push(DrawItem::Label(Label {
            text: count.to_string(),
            font: LABEL_FONT.to_string(),
            font_size: LABEL_SIZE,
            color: BLACK,
            pos: Vec2::new(size.x * x, size.y * 0.45),
            z: 2.0,
        }));
    }
    frame.controls(catalog, layout);
    frame.sort();
    frame
}
