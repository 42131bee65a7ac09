use std::collections::BTreeMap;

use glam::Vec2;
use rand::Rng;
use tracing::info;

use crate::buffs::Stats;
use crate::camera::Camera;
use crate::config::WeaponDef;
use crate::entities::Rect;
use crate::error::GameError;
use crate::render::{Canvas, Glyph};
use crate::world::World;

pub const PROJECTILE_SIZE: Vec2 = Vec2::new(16.0, 16.0);

/// Anything a projectile can hit.
pub trait Damageable {
    fn hitbox(&self) -> Rect;

    /// Dead or vanished targets are passed through.
    fn is_targetable(&self) -> bool;

    fn take_damage<R: Rng>(&mut self, amount: f32, now: f64, world: &mut World, rng: &mut R);
}

// ── Projectiles ───────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq)]
pub struct Projectile {
    pub origin: Vec2,
    pub position: Vec2,
    /// Unit vector.
    pub direction: Vec2,
    /// Distance covered per tick.
    pub speed: f32,
    pub damage: f32,
    pub range: f32,
    pub size: Vec2,
}

impl Projectile {
    pub fn new(origin: Vec2, direction: Vec2, speed: f32, damage: f32, range: f32) -> Self {
        Self {
            origin,
            position: origin,
            direction,
            speed,
            damage,
            range,
            size: PROJECTILE_SIZE,
        }
    }

    /// A projectile heading from `origin` towards `target`.  `None` when the
    /// two points coincide and there is no direction to fly in.
    pub fn aimed(origin: Vec2, target: Vec2, speed: f32, damage: f32, range: f32) -> Option<Self> {
        let direction = (target - origin).try_normalize()?;
        Some(Self::new(origin, direction, speed, damage, range))
    }

    pub fn distance_traveled(&self) -> f32 {
        self.position.distance(self.origin)
    }

    pub fn rect(&self) -> Rect {
        Rect::new(self.position, self.size)
    }

    /// Advance one tick and resolve hits.  Returns `true` while the
    /// projectile is still in flight; `false` once it has gone past its range
    /// or spent itself on a target.  A projectile hits at most one target.
    pub fn update<T: Damageable, R: Rng>(
        &mut self,
        targets: &mut [T],
        now: f64,
        world: &mut World,
        rng: &mut R,
    ) -> bool {
        self.position += self.direction * self.speed;

        if self.distance_traveled() > self.range {
            return false;
        }

        let hitbox = self.rect();
        match targets
            .iter_mut()
            .find(|target| target.is_targetable() && target.hitbox().overlaps(&hitbox))
        {
            Some(target) => {
                target.take_damage(self.damage, now, world, rng);
                false
            }
            None => true,
        }
    }

    pub fn draw(&self, canvas: &mut dyn Canvas, camera: &Camera, hostile: bool) {
        canvas.draw(Glyph::Projectile { hostile }, camera.apply(self.position));
    }
}

/// Move every projectile and keep the ones still in flight.
pub fn update_projectiles<T: Damageable, R: Rng>(
    projectiles: &mut Vec<Projectile>,
    targets: &mut [T],
    now: f64,
    world: &mut World,
    rng: &mut R,
) {
    *projectiles = std::mem::take(projectiles)
        .into_iter()
        .filter_map(|mut p| p.update(targets, now, world, rng).then_some(p))
        .collect();
}

// ── Weapons ───────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq)]
pub struct Weapon {
    pub id: String,
    pub def: WeaponDef,
    pub last_shot_time: Option<f64>,
}

impl Weapon {
    pub fn new(id: &str, def: WeaponDef) -> Self {
        Self {
            id: id.to_string(),
            def,
            last_shot_time: None,
        }
    }

    /// Seconds between shots, or `None` when the effective fire rate is not
    /// positive and the weapon can never fire.
    pub fn cooldown(&self, attack_speed: f32) -> Option<f64> {
        let rate = self.def.fire_rate * f64::from(attack_speed);
        (rate > 0.0).then(|| 1.0 / rate)
    }

    pub fn can_fire(&self, now: f64, attack_speed: f32) -> bool {
        match (self.cooldown(attack_speed), self.last_shot_time) {
            (None, _) => false,
            (Some(_), None) => true,
            (Some(cooldown), Some(last)) => now - last >= cooldown,
        }
    }

    /// Shoot at `target` if the cooldown allows.  Damage scales with ability
    /// power and range with the attack-range multiplier; the weapon's own
    /// `scale` sizes the projectile.
    pub fn fire(&mut self, origin: Vec2, target: Vec2, stats: &Stats, now: f64) -> Option<Projectile> {
        if !self.can_fire(now, stats.attack_speed) {
            return None;
        }
        let mut projectile = Projectile::aimed(
            origin,
            target,
            self.def.projectile_speed,
            self.def.damage * stats.ability_power,
            self.def.range * stats.attack_range,
        )?;
        projectile.size *= self.def.scale;
        self.last_shot_time = Some(now);
        Some(projectile)
    }
}

/// The player's armoury and every player projectile in flight.
#[derive(Clone, Debug, Default)]
pub struct WeaponManager {
    weapons: BTreeMap<String, WeaponDef>,
    pub active_weapon: Option<Weapon>,
    pub projectiles: Vec<Projectile>,
}

impl WeaponManager {
    pub fn new(weapons: BTreeMap<String, WeaponDef>) -> Self {
        Self {
            weapons,
            active_weapon: None,
            projectiles: Vec::new(),
        }
    }

    pub fn equip_weapon(&mut self, name: &str) -> Result<(), GameError> {
        let def = self
            .weapons
            .get(name)
            .ok_or_else(|| GameError::unknown("weapon", name))?;
        info!(weapon = %def.name, "weapon equipped");
        self.active_weapon = Some(Weapon::new(name, def.clone()));
        Ok(())
    }

    /// Fire the equipped weapon.  Returns whether a projectile was launched.
    pub fn fire_weapon(&mut self, origin: Vec2, target: Vec2, stats: &Stats, now: f64) -> bool {
        let Some(weapon) = self.active_weapon.as_mut() else {
            return false;
        };
        match weapon.fire(origin, target, stats, now) {
            Some(projectile) => {
                self.projectiles.push(projectile);
                true
            }
            None => false,
        }
    }

    pub fn update<T: Damageable, R: Rng>(
        &mut self,
        targets: &mut [T],
        now: f64,
        world: &mut World,
        rng: &mut R,
    ) {
        update_projectiles(&mut self.projectiles, targets, now, world, rng);
    }

    pub fn clear(&mut self) {
        self.active_weapon = None;
        self.projectiles.clear();
    }

    pub fn draw(&self, canvas: &mut dyn Canvas, camera: &Camera) {
        for projectile in &self.projectiles {
            projectile.draw(canvas, camera, false);
        }
    }
}
