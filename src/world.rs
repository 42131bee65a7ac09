use glam::Vec2;
use rand::Rng;
use tracing::info;

use crate::camera::Camera;
use crate::entities::{FloatingText, Pickup, PickupKind, TextTone};
use crate::player::Player;
use crate::render::Canvas;

/// Seconds a floating number stays on screen.
pub const FLOATING_TEXT_DURATION: f64 = 0.5;

/// The playing field: its bounds plus the loose objects lying around in it.
/// Enemies and projectiles live with their managers.
#[derive(Clone, Debug)]
pub struct World {
    pub width: f32,
    pub height: f32,
    pub pickups: Vec<Pickup>,
    pub floating_texts: Vec<FloatingText>,
    /// Where enemies died since the last `take_fallen`.
    pub fallen: Vec<Vec2>,
}

impl World {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            pickups: Vec::new(),
            floating_texts: Vec::new(),
            fallen: Vec::new(),
        }
    }

    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width, self.height)
    }

    pub fn clamp(&self, position: Vec2) -> Vec2 {
        position.clamp(Vec2::ZERO, self.size())
    }

    pub fn add_pickup(&mut self, pickup: Pickup) {
        self.pickups.push(pickup);
    }

    pub fn record_death(&mut self, position: Vec2) {
        self.fallen.push(position);
    }

    /// Drain the death spots recorded so far.
    pub fn take_fallen(&mut self) -> Vec<Vec2> {
        std::mem::take(&mut self.fallen)
    }

    pub fn add_floating_text(
        &mut self,
        text: String,
        position: Vec2,
        tone: TextTone,
        now: f64,
        rng: &mut impl Rng,
    ) {
        // Sideways sway with an upward bias.
        let drift = Vec2::new(rng.gen_range(-0.5..=0.5), rng.gen_range(-0.5..=-0.2));
        self.floating_texts.push(FloatingText {
            text,
            position,
            tone,
            drift,
            started_at: now,
            duration: FLOATING_TEXT_DURATION,
        });
    }

    /// Hand every shard the player is touching to the player.  Returns how
    /// many were collected.
    pub fn check_shard_collection(&mut self, player: &mut Player) -> usize {
        let hitbox = player.rect();
        let before = self.pickups.len();
        self.pickups
            .retain(|pickup| !(pickup.is_shard() && pickup.rect().overlaps(&hitbox)));
        let collected = before - self.pickups.len();
        for _ in 0..collected {
            player.collect_astral_shard();
        }
        collected
    }

    /// Move touched items into the player's inventory.  Items stay on the
    /// ground while every slot is taken.
    pub fn check_item_collection(&mut self, player: &mut Player) -> usize {
        let hitbox = player.rect();
        let mut collected = 0;
        let mut kept = Vec::with_capacity(self.pickups.len());
        for pickup in std::mem::take(&mut self.pickups) {
            let touching = pickup.rect().overlaps(&hitbox);
            match pickup.kind {
                PickupKind::Item(item) if touching && player.inventory.has_consumable_space() => {
                    info!(name = %item.name, "item picked up");
                    if player.inventory.add_consumable(item).is_ok() {
                        collected += 1;
                    }
                }
                kind => kept.push(Pickup {
                    position: pickup.position,
                    kind,
                }),
            }
        }
        self.pickups = kept;
        collected
    }

    /// Drift floating text and drop the expired entries.
    pub fn update(&mut self, now: f64) {
        self.floating_texts.retain_mut(|text| !text.update(now));
    }

    pub fn draw_pickups(&self, canvas: &mut dyn Canvas, camera: &Camera) {
        for pickup in &self.pickups {
            pickup.draw(canvas, camera);
        }
    }

    /// Drawn last so numbers stay on top of everything else.
    pub fn draw_floating_texts(&self, canvas: &mut dyn Canvas, camera: &Camera, now: f64) {
        for text in &self.floating_texts {
            text.draw(canvas, camera, now);
        }
    }
}
