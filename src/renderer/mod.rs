//! Draw-list rendering module
//!
//! Scenes are turned into flat lists of sprites and labels; the host renderer
//! draws them and can hand the last one back as a frame snapshot.

pub mod draw;

pub use draw::{
    DrawItem, Frame, HIGHLIGHT, Label, Sprite, WHITE, flash_tint, game_over_frame, gameplay_frame,
    start_frame,
};
