use glam::Vec2;
use rand::Rng;
use tracing::{debug, info};

use crate::buffs::{Buffs, StatKind, Stats};
use crate::camera::Camera;
use crate::consumable::{Activation, Effect};
use crate::entities::{Rect, TextTone};
use crate::inventory::Inventory;
use crate::render::{Canvas, Glyph};
use crate::world::World;

pub const PLAYER_SIZE: Vec2 = Vec2::new(48.0, 64.0);
pub const STARTING_HP: f32 = 100.0;
pub const STARTING_MAX_HP: f32 = 150.0;
pub const STARTING_SHARDS: u32 = 50;
/// Seconds after a hit during which further hits are ignored.
pub const INVINCIBILITY_DURATION: f64 = 1.0;

/// Where floating numbers appear relative to the player.
const TEXT_OFFSET: Vec2 = Vec2::new(0.0, -20.0);

#[derive(Clone, Debug)]
pub struct Player {
    pub position: Vec2,
    pub size: Vec2,
    pub hp: f32,
    pub max_hp: f32,
    /// Permanent stat values.
    pub base: Stats,
    /// Base values plus active buffs.  This is what the game reads.
    pub stats: Stats,
    pub buffs: Buffs,
    pub astral_shards: u32,
    pub inventory: Inventory,
    pub invincible: bool,
    pub last_hit_time: f64,
    pub facing_right: bool,
}

impl Player {
    pub fn new(position: Vec2) -> Self {
        let base = Stats::default();
        Self {
            position,
            size: PLAYER_SIZE,
            hp: STARTING_HP,
            max_hp: STARTING_MAX_HP,
            base,
            stats: base,
            buffs: Buffs::new(),
            astral_shards: STARTING_SHARDS,
            inventory: Inventory::new(),
            invincible: false,
            last_hit_time: f64::NEG_INFINITY,
            facing_right: true,
        }
    }

    pub fn rect(&self) -> Rect {
        Rect::new(self.position, self.size)
    }

    pub fn is_dead(&self) -> bool {
        self.hp <= 0.0
    }

    // ── Movement ──────────────────────────────────────────────────────────────

    /// Move by `intent` (each axis in `-1.0..=1.0`) scaled by movement speed,
    /// staying inside a world of `bounds`.
    pub fn move_by(&mut self, intent: Vec2, bounds: Vec2) {
        if intent.x < 0.0 {
            self.facing_right = false;
        } else if intent.x > 0.0 {
            self.facing_right = true;
        }
        let half = self.size * 0.5;
        let target = self.position + intent * self.stats.movement_speed;
        self.position = target.clamp(half, (bounds - half).max(half));
    }

    // ── Health ────────────────────────────────────────────────────────────────

    pub fn is_invincible(&self, now: f64) -> bool {
        self.invincible && now - self.last_hit_time < INVINCIBILITY_DURATION
    }

    /// Apply a hit unless the player is still invincible from the last one.
    /// Returns whether the damage landed.
    pub fn take_damage(
        &mut self,
        amount: f32,
        now: f64,
        world: &mut World,
        rng: &mut impl Rng,
    ) -> bool {
        if self.is_invincible(now) {
            return false;
        }
        self.hp = (self.hp - amount).max(0.0);
        self.last_hit_time = now;
        self.invincible = true;
        world.add_floating_text(
            format!("{}", amount.round()),
            self.position + TEXT_OFFSET,
            TextTone::Damage,
            now,
            rng,
        );
        if self.is_dead() {
            info!("player has died");
        }
        true
    }

    pub fn heal(&mut self, amount: f32, now: f64, world: &mut World, rng: &mut impl Rng) {
        self.hp = (self.hp + amount).min(self.max_hp);
        world.add_floating_text(
            format!("{}", amount.round()),
            self.position + TEXT_OFFSET,
            TextTone::Heal,
            now,
            rng,
        );
    }

    // ── Buffs & upgrades ──────────────────────────────────────────────────────

    pub fn add_buff(&mut self, kind: StatKind, magnitude: f32, duration: f64, now: f64) {
        self.buffs
            .apply(&self.base, &mut self.stats, kind, magnitude, duration, now);
        debug!(?kind, magnitude, duration, "buff applied");
    }

    pub fn update_buffs(&mut self, now: f64) {
        for kind in self.buffs.expire(&self.base, &mut self.stats, now) {
            debug!(?kind, "buff expired");
        }
    }

    /// Permanent upgrade.  Attack speed and range scale by `magnitude`; the
    /// other stats add it.
    pub fn upgrade_stat(&mut self, kind: StatKind, magnitude: f32) {
        let base = self.base.get_mut(kind);
        match kind {
            StatKind::AttackSpeed | StatKind::AttackRange => *base *= magnitude,
            StatKind::MovementSpeed | StatKind::AbilityPower | StatKind::Luck => {
                *base += magnitude
            }
        }
        self.buffs.refresh(&self.base, &mut self.stats, kind);
    }

    /// Raise max HP and refill to it.
    pub fn raise_max_hp(&mut self, amount: f32) {
        self.max_hp += amount;
        self.hp = self.max_hp;
    }

    // ── Items ─────────────────────────────────────────────────────────────────

    /// Use the consumable in `slot`.  Returns whether anything happened.
    pub fn use_consumable(
        &mut self,
        slot: usize,
        now: f64,
        world: &mut World,
        rng: &mut impl Rng,
    ) -> bool {
        match self.inventory.use_consumable(slot, now) {
            Some(activation) => {
                self.apply(activation, now, world, rng);
                true
            }
            None => false,
        }
    }

    pub fn apply(&mut self, activation: Activation, now: f64, world: &mut World, rng: &mut impl Rng) {
        match (activation.effect, activation.effect.stat()) {
            (Effect::Heal, _) => self.heal(activation.magnitude, now, world, rng),
            (_, Some(kind)) => self.add_buff(kind, activation.magnitude, activation.duration, now),
            // Max hp is a shop upgrade; content validation keeps it off consumables.
            (_, None) => {}
        }
    }

    pub fn collect_astral_shard(&mut self) {
        self.astral_shards += 1;
    }

    /// Once-per-tick bookkeeping: buff expiry, consumable countdowns and the
    /// invincibility flag.
    pub fn update(&mut self, now: f64) {
        self.update_buffs(now);
        self.inventory.update_consumables(now);
        if self.invincible && !self.is_invincible(now) {
            self.invincible = false;
        }
    }

    pub fn draw(&self, canvas: &mut dyn Canvas, camera: &Camera) {
        let at = camera.apply(self.position);
        canvas.draw(
            Glyph::Player {
                facing_right: self.facing_right,
            },
            at,
        );
        canvas.draw(
            Glyph::HealthBar {
                fraction: (self.hp / self.max_hp).clamp(0.0, 1.0),
                hostile: false,
            },
            at + Vec2::new(0.0, -40.0),
        );
    }
}
