//! Enemies, their behaviours, and the collection that owns them.
//!
//! Behaviour is a closed set: plain chasers, and burst attackers that
//! periodically leap out of sight, land next to the player and fire a ring of
//! projectiles.  Both share hit points, contact damage and the shard drop on
//! death.

use std::f32::consts::TAU;

use glam::Vec2;
use rand::Rng;
use tracing::debug;

use crate::camera::Camera;
use crate::config::{BehaviorDef, BurstDef, EnemyDef};
use crate::entities::{Pickup, Rect, TextTone};
use crate::player::Player;
use crate::render::{Canvas, Glyph};
use crate::weapon::{update_projectiles, Damageable, Projectile};
use crate::world::World;

pub const BASE_ENEMY_SIZE: Vec2 = Vec2::new(48.0, 48.0);
/// Largest heading perturbation applied each tick while chasing.
pub const JITTER_DEGREES: f32 = 5.0;
/// Shards land up to this far from the body on each axis.
pub const DROP_SPREAD: f32 = 20.0;
/// How high a burst attacker's sprite rises before it vanishes.
pub const LIFT_HEIGHT: f32 = 60.0;

const TEXT_OFFSET: Vec2 = Vec2::new(0.0, -20.0);

// ── Behaviour ─────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum JumpPhase {
    Idle,
    Rising { since: f64 },
    Disappeared { since: f64 },
    Reappearing { since: f64 },
}

#[derive(Clone, Debug, PartialEq)]
pub struct BurstAttacker {
    pub tuning: BurstDef,
    pub phase: JumpPhase,
    /// When the last jump finished (or when the enemy spawned).
    pub last_jump_end: f64,
    pub last_shot_time: Option<f64>,
    /// Projectiles this enemy has fired.  They hit the player only.
    pub projectiles: Vec<Projectile>,
}

impl BurstAttacker {
    pub fn new(tuning: BurstDef, now: f64) -> Self {
        Self {
            tuning,
            phase: JumpPhase::Idle,
            last_jump_end: now,
            last_shot_time: None,
            projectiles: Vec::new(),
        }
    }

    fn can_shoot(&self, now: f64) -> bool {
        self.last_shot_time
            .map_or(true, |last| now - last >= self.tuning.fire_cooldown)
    }

    /// `count` projectiles spread evenly around a full circle.
    fn fire_ring(&mut self, center: Vec2) {
        let count = self.tuning.burst_count.max(1);
        for i in 0..count {
            let angle = TAU * i as f32 / count as f32;
            self.projectiles.push(Projectile::new(
                center,
                Vec2::from_angle(angle),
                self.tuning.projectile_speed,
                self.tuning.projectile_damage,
                self.tuning.projectile_range,
            ));
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Behavior {
    Chaser,
    Burst(BurstAttacker),
}

/// One step from `from` towards `to` with a small random wobble in heading,
/// so a crowd of chasers does not collapse onto one straight line.
pub fn chase_step(from: Vec2, to: Vec2, speed: f32, rng: &mut impl Rng) -> Vec2 {
    let Some(direction) = (to - from).try_normalize() else {
        return from;
    };
    let wobble = rng.gen_range(-JITTER_DEGREES..=JITTER_DEGREES).to_radians();
    let heading = Vec2::from_angle(wobble).rotate(direction).normalize_or_zero();
    from + heading * speed
}

// ── Enemy ─────────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq)]
pub struct Enemy {
    pub kind: String,
    pub asset: String,
    pub position: Vec2,
    pub size: Vec2,
    pub hp: f32,
    pub max_hp: f32,
    /// Contact damage.
    pub damage: f32,
    pub speed: f32,
    pub shard_drop: u32,
    pub behavior: Behavior,
}

impl Enemy {
    pub fn from_def(kind: &str, def: &EnemyDef, position: Vec2, now: f64) -> Self {
        let behavior = match &def.behavior {
            BehaviorDef::Chaser => Behavior::Chaser,
            BehaviorDef::Burst(tuning) => Behavior::Burst(BurstAttacker::new(tuning.clone(), now)),
        };
        Self {
            kind: kind.to_string(),
            asset: def.image.clone(),
            position,
            size: BASE_ENEMY_SIZE * def.size,
            hp: def.hp,
            max_hp: def.hp,
            damage: def.damage,
            speed: def.movement_speed,
            shard_drop: def.astral_shards_drop,
            behavior,
        }
    }

    pub fn rect(&self) -> Rect {
        Rect::new(self.position, self.size)
    }

    pub fn is_alive(&self) -> bool {
        self.hp > 0.0
    }

    /// Hidden mid-jump.
    pub fn is_vanished(&self) -> bool {
        matches!(
            self.behavior,
            Behavior::Burst(BurstAttacker {
                phase: JumpPhase::Disappeared { .. },
                ..
            })
        )
    }

    /// Visual lift while taking off or landing.
    pub fn lift(&self, now: f64) -> f32 {
        let Behavior::Burst(burst) = &self.behavior else {
            return 0.0;
        };
        let progress = |since: f64| {
            let rise = burst.tuning.rise_duration;
            if rise <= 0.0 {
                1.0
            } else {
                ((now - since) / rise).clamp(0.0, 1.0) as f32
            }
        };
        match burst.phase {
            JumpPhase::Idle => 0.0,
            JumpPhase::Rising { since } => LIFT_HEIGHT * progress(since),
            JumpPhase::Disappeared { .. } => LIFT_HEIGHT,
            JumpPhase::Reappearing { since } => LIFT_HEIGHT * (1.0 - progress(since)),
        }
    }

    pub fn move_towards_player(&mut self, target: Vec2, rng: &mut impl Rng) {
        self.position = chase_step(self.position, target, self.speed, rng);
    }

    /// Advance this enemy's behaviour by one tick.
    pub fn update(&mut self, player: &mut Player, now: f64, world: &mut World, rng: &mut impl Rng) {
        match &mut self.behavior {
            Behavior::Chaser => {
                self.position = chase_step(self.position, player.position, self.speed, rng);
            }
            Behavior::Burst(burst) => {
                match burst.phase {
                    JumpPhase::Idle => {
                        if now - burst.last_jump_end >= burst.tuning.jump_cooldown {
                            burst.phase = JumpPhase::Rising { since: now };
                        } else {
                            self.position =
                                chase_step(self.position, player.position, self.speed, rng);
                            let in_range = self.position.distance(player.position)
                                <= burst.tuning.attack_range;
                            if in_range && burst.can_shoot(now) {
                                if let Some(shot) = Projectile::aimed(
                                    self.position,
                                    player.position,
                                    burst.tuning.projectile_speed,
                                    burst.tuning.projectile_damage,
                                    burst.tuning.projectile_range,
                                ) {
                                    burst.projectiles.push(shot);
                                    burst.last_shot_time = Some(now);
                                }
                            }
                        }
                    }
                    JumpPhase::Rising { since } => {
                        if now - since >= burst.tuning.rise_duration {
                            burst.phase = JumpPhase::Disappeared { since: now };
                        }
                    }
                    JumpPhase::Disappeared { since } => {
                        if now - since >= burst.tuning.vanish_duration {
                            let radius = burst.tuning.teleport_radius.max(0.0);
                            let angle = rng.gen_range(0.0..TAU);
                            let distance = rng.gen_range(0.5..=1.0) * radius;
                            self.position =
                                world.clamp(player.position + Vec2::from_angle(angle) * distance);
                            burst.fire_ring(self.position);
                            burst.phase = JumpPhase::Reappearing { since: now };
                            debug!(kind = %self.kind, position = ?self.position, "burst attacker landed");
                        }
                    }
                    JumpPhase::Reappearing { since } => {
                        if now - since >= burst.tuning.rise_duration {
                            burst.phase = JumpPhase::Idle;
                            burst.last_jump_end = now;
                        }
                    }
                }
                update_projectiles(
                    &mut burst.projectiles,
                    std::slice::from_mut(player),
                    now,
                    world,
                    rng,
                );
            }
        }
    }

    /// Lose `amount` hp.  Reaching zero runs `die` exactly once; hits on a dead
    /// enemy are ignored.
    pub fn take_damage(&mut self, amount: f32, now: f64, world: &mut World, rng: &mut impl Rng) {
        if !self.is_alive() {
            return;
        }
        self.hp = (self.hp - amount).max(0.0);
        world.add_floating_text(
            format!("{}", amount.round()),
            self.position + TEXT_OFFSET,
            TextTone::Damage,
            now,
            rng,
        );
        if !self.is_alive() {
            self.die(world, rng);
        }
    }

    /// Scatter this enemy's shards around where it fell and mark the spot
    /// for the item roll.
    pub fn die(&mut self, world: &mut World, rng: &mut impl Rng) {
        debug!(kind = %self.kind, position = ?self.position, "enemy died");
        world.record_death(self.position);
        for _ in 0..self.shard_drop {
            let offset = Vec2::new(
                rng.gen_range(-DROP_SPREAD..=DROP_SPREAD),
                rng.gen_range(-DROP_SPREAD..=DROP_SPREAD),
            );
            let spot = world.clamp(self.position + offset);
            world.add_pickup(Pickup::new(spot));
        }
    }

    pub fn draw(&self, canvas: &mut dyn Canvas, camera: &Camera, now: f64) {
        if let Behavior::Burst(burst) = &self.behavior {
            for projectile in &burst.projectiles {
                projectile.draw(canvas, camera, true);
            }
        }
        if self.is_vanished() {
            return;
        }
        let lift = self.lift(now);
        let at = camera.apply(self.position);
        canvas.draw(
            Glyph::Enemy {
                kind: &self.kind,
                asset: &self.asset,
                lift,
            },
            at,
        );
        canvas.draw(
            Glyph::HealthBar {
                fraction: (self.hp / self.max_hp).clamp(0.0, 1.0),
                hostile: true,
            },
            at + Vec2::new(0.0, -self.size.y * 0.5 - 10.0 - lift),
        );
    }
}

impl Damageable for Enemy {
    fn hitbox(&self) -> Rect {
        self.rect()
    }

    fn is_targetable(&self) -> bool {
        self.is_alive() && !self.is_vanished()
    }

    fn take_damage<R: Rng>(&mut self, amount: f32, now: f64, world: &mut World, rng: &mut R) {
        Enemy::take_damage(self, amount, now, world, rng);
    }
}

impl Damageable for Player {
    fn hitbox(&self) -> Rect {
        self.rect()
    }

    fn is_targetable(&self) -> bool {
        !self.is_dead()
    }

    fn take_damage<R: Rng>(&mut self, amount: f32, now: f64, world: &mut World, rng: &mut R) {
        Player::take_damage(self, amount, now, world, rng);
    }
}

// ── Manager ───────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, Default)]
pub struct EnemyManager {
    pub enemies: Vec<Enemy>,
}

impl EnemyManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn spawn(&mut self, enemy: Enemy) {
        self.enemies.push(enemy);
    }

    pub fn len(&self) -> usize {
        self.enemies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.enemies.is_empty()
    }

    pub fn alive(&self) -> usize {
        self.enemies.iter().filter(|e| e.is_alive()).count()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Enemy> {
        self.enemies.iter()
    }

    pub fn clear(&mut self) {
        self.enemies.clear();
    }

    /// Run every living enemy, apply contact damage to the player, then drop
    /// the dead.  Removal waits until the end of the tick so death effects
    /// see a valid enemy.
    pub fn update(&mut self, player: &mut Player, now: f64, world: &mut World, rng: &mut impl Rng) {
        for enemy in self.enemies.iter_mut() {
            if !enemy.is_alive() {
                continue;
            }
            enemy.update(player, now, world, rng);
            if enemy.is_targetable() && enemy.rect().overlaps(&player.rect()) {
                player.take_damage(enemy.damage, now, world, rng);
            }
        }

        self.enemies = std::mem::take(&mut self.enemies)
            .into_iter()
            .filter(Enemy::is_alive)
            .collect();
    }

    pub fn draw(&self, canvas: &mut dyn Canvas, camera: &Camera, now: f64) {
        for enemy in &self.enemies {
            enemy.draw(canvas, camera, now);
        }
    }
}
