//! Overlap tests for the reference physics world
//!
//! Bodies are axis-aligned rectangles or circles. Every test reports a signed
//! depth so the world can tell "overlapping" (push out) from "touching within
//! slop" (still in contact) from "apart".

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Collider shape, centered on the body position
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Shape {
    Rect { half: Vec2 },
    Circle { radius: f32 },
}

impl Shape {
    pub fn rect(width: f32, height: f32) -> Self {
        Shape::Rect {
            half: Vec2::new(width / 2.0, height / 2.0),
        }
    }

    pub fn circle(radius: f32) -> Self {
        Shape::Circle { radius }
    }

    /// Full width and height of the bounding box
    pub fn size(&self) -> Vec2 {
        match *self {
            Shape::Rect { half } => half * 2.0,
            Shape::Circle { radius } => Vec2::splat(radius * 2.0),
        }
    }
}

/// Result of an overlap test between body A and body B
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Contact {
    /// Unit normal pointing from B toward A (push A along it to separate)
    pub normal: Vec2,
    /// Positive when overlapping, negative gap when apart
    pub depth: f32,
}

impl Contact {
    pub fn overlapping(&self) -> bool {
        self.depth > 0.0
    }

    /// Overlapping or separated by at most `slop`
    pub fn touching(&self, slop: f32) -> bool {
        self.depth > -slop
    }
}

/// Overlap test between two placed shapes
pub fn contact(a_pos: Vec2, a: Shape, b_pos: Vec2, b: Shape) -> Contact {
    match (a, b) {
        (Shape::Rect { half: ha }, Shape::Rect { half: hb }) => rect_rect(a_pos, ha, b_pos, hb),
        (Shape::Circle { radius }, Shape::Rect { half }) => circle_rect(a_pos, radius, b_pos, half),
        (Shape::Rect { half }, Shape::Circle { radius }) => {
            let c = circle_rect(b_pos, radius, a_pos, half);
            Contact {
                normal: -c.normal,
                depth: c.depth,
            }
        }
        (Shape::Circle { radius: ra }, Shape::Circle { radius: rb }) => {
            circle_circle(a_pos, ra, b_pos, rb)
        }
    }
}

fn sign(v: f32) -> f32 {
    if v < 0.0 { -1.0 } else { 1.0 }
}

fn rect_rect(a_pos: Vec2, ha: Vec2, b_pos: Vec2, hb: Vec2) -> Contact {
    let d = a_pos - b_pos;
    let ox = ha.x + hb.x - d.x.abs();
    let oy = ha.y + hb.y - d.y.abs();

    if ox >= 0.0 && oy >= 0.0 {
        // Separate along the axis of least penetration
        if ox < oy {
            Contact {
                normal: Vec2::new(sign(d.x), 0.0),
                depth: ox,
            }
        } else {
            Contact {
                normal: Vec2::new(0.0, sign(d.y)),
                depth: oy,
            }
        }
    } else if ox < 0.0 && oy < 0.0 {
        Contact {
            normal: Vec2::new(sign(d.x), sign(d.y)).normalize(),
            depth: -(ox * ox + oy * oy).sqrt(),
        }
    } else if ox < 0.0 {
        Contact {
            normal: Vec2::new(sign(d.x), 0.0),
            depth: ox,
        }
    } else {
        Contact {
            normal: Vec2::new(0.0, sign(d.y)),
            depth: oy,
        }
    }
}

fn circle_rect(center: Vec2, radius: f32, rect_pos: Vec2, half: Vec2) -> Contact {
    let local = center - rect_pos;
    let closest = local.clamp(-half, half);
    let offset = local - closest;
    let dist = offset.length();

    if dist > 0.0 {
        return Contact {
            normal: offset / dist,
            depth: radius - dist,
        };
    }

    // Center inside the rectangle: push out through the nearest face
    let to_x = half.x - local.x.abs();
    let to_y = half.y - local.y.abs();
    if to_x < to_y {
        Contact {
            normal: Vec2::new(sign(local.x), 0.0),
            depth: to_x + radius,
        }
    } else {
        Contact {
            normal: Vec2::new(0.0, sign(local.y)),
            depth: to_y + radius,
        }
    }
}

fn circle_circle(a_pos: Vec2, ra: f32, b_pos: Vec2, rb: f32) -> Contact {
    let d = a_pos - b_pos;
    let dist = d.length();
    let normal = if dist > 0.0 { d / dist } else { Vec2::Y };
    Contact {
        normal,
        depth: ra + rb - dist,
    }
}

/// Reflect the inbound part of `vel` off a surface with the given normal
///
/// Only the component moving into the surface is affected; `restitution` of 0
/// kills it, 1 mirrors it.
pub fn bounce(vel: Vec2, normal: Vec2, restitution: f32) -> Vec2 {
    let vn = vel.dot(normal);
    if vn < 0.0 {
        vel - normal * vn * (1.0 + restitution)
    } else {
        vel
    }
}
