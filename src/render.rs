//! Drawing seam between the simulation and whatever puts pixels (or
//! terminal cells) on screen.
//!
//! The core never touches a surface.  Each entity's `draw` turns its state
//! into one or more `Glyph`s at screen coordinates and hands them to a
//! `Canvas`.

use glam::Vec2;

use crate::entities::TextTone;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Glyph<'a> {
    Player { facing_right: bool },
    Enemy {
        kind: &'a str,
        asset: &'a str,
        /// Height the sprite is raised by (burst attacker take-off).
        lift: f32,
    },
    /// A filled fraction in `0.0..=1.0`, drawn above its owner.
    HealthBar { fraction: f32, hostile: bool },
    Projectile { hostile: bool },
    Shard,
    /// A dropped item, named by its consumable id.
    Item { name: &'a str },
    Text { text: &'a str, tone: TextTone, alpha: f32 },
}

pub trait Canvas {
    fn draw(&mut self, glyph: Glyph<'_>, at: Vec2);
}

/// Canvas that keeps everything it is given.  Used by tests and handy for
/// debugging a frame.
#[derive(Debug, Default)]
pub struct RecordingCanvas {
    pub calls: Vec<(String, Vec2)>,
}

impl Canvas for RecordingCanvas {
    fn draw(&mut self, glyph: Glyph<'_>, at: Vec2) {
        self.calls.push((format!("{glyph:?}"), at));
    }
}
