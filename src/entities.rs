//! Small shared entity types: pure data plus the geometry they need.

use glam::Vec2;

use crate::camera::Camera;
use crate::consumable::Consumable;
use crate::render::{Canvas, Glyph};

/// Axis-aligned box described by its centre, the way every hitbox in the
/// game is anchored.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rect {
    pub center: Vec2,
    pub size: Vec2,
}

impl Rect {
    pub fn new(center: Vec2, size: Vec2) -> Self {
        Self { center, size }
    }

    pub fn min(&self) -> Vec2 {
        self.center - self.size * 0.5
    }

    pub fn max(&self) -> Vec2 {
        self.center + self.size * 0.5
    }

    /// Strict overlap: boxes that only share an edge do not collide.
    pub fn overlaps(&self, other: &Rect) -> bool {
        let (a_min, a_max) = (self.min(), self.max());
        let (b_min, b_max) = (other.min(), other.max());
        a_min.x < b_max.x && b_min.x < a_max.x && a_min.y < b_max.y && b_min.y < a_max.y
    }
}

// ── Pickups ───────────────────────────────────────────────────────────────────

pub const SHARD_SIZE: Vec2 = Vec2::new(32.0, 32.0);

#[derive(Clone, Debug, PartialEq)]
pub enum PickupKind {
    /// One astral shard.
    Shard,
    /// An item that goes into the inventory when collected.
    Item(Consumable),
}

/// Something lying in the world, waiting to be collected.
#[derive(Clone, Debug, PartialEq)]
pub struct Pickup {
    pub position: Vec2,
    pub kind: PickupKind,
}

impl Pickup {
    /// An astral shard.
    pub fn new(position: Vec2) -> Self {
        Self {
            position,
            kind: PickupKind::Shard,
        }
    }

    pub fn item(position: Vec2, item: Consumable) -> Self {
        Self {
            position,
            kind: PickupKind::Item(item),
        }
    }

    pub fn is_shard(&self) -> bool {
        matches!(self.kind, PickupKind::Shard)
    }

    pub fn rect(&self) -> Rect {
        Rect::new(self.position, SHARD_SIZE)
    }

    pub fn draw(&self, canvas: &mut dyn Canvas, camera: &Camera) {
        let glyph = match &self.kind {
            PickupKind::Shard => Glyph::Shard,
            PickupKind::Item(item) => Glyph::Item { name: &item.name },
        };
        canvas.draw(glyph, camera.apply(self.position));
    }
}

// ── Floating text ─────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TextTone {
    Damage,
    Heal,
}

/// Short-lived number that drifts away from where damage or healing happened.
#[derive(Clone, Debug)]
pub struct FloatingText {
    pub text: String,
    pub position: Vec2,
    pub tone: TextTone,
    /// Added to `position` once per tick.
    pub drift: Vec2,
    pub started_at: f64,
    pub duration: f64,
}

impl FloatingText {
    /// Advance one tick.  Returns `true` once the text has outlived its
    /// duration and should be dropped.
    pub fn update(&mut self, now: f64) -> bool {
        self.position += self.drift;
        now - self.started_at >= self.duration
    }

    /// 1.0 when fresh, fading linearly to 0.0 at expiry.
    pub fn alpha(&self, now: f64) -> f32 {
        if self.duration <= 0.0 {
            return 0.0;
        }
        (1.0 - (now - self.started_at) / self.duration).clamp(0.0, 1.0) as f32
    }

    pub fn draw(&self, canvas: &mut dyn Canvas, camera: &Camera, now: f64) {
        canvas.draw(
            Glyph::Text {
                text: &self.text,
                tone: self.tone,
                alpha: self.alpha(now),
            },
            camera.apply(self.position),
        );
    }
}
