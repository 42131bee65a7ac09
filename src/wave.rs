//! Wave director.
//!
//! A wave runs for a fixed time, emitting enemies at a steady rate from its
//! per-type quotas.  It ends when its time is up, or early once every quota
//! is spent and nothing is left alive.  Then the next wave starts; after the
//! last one the director stops spawning for good.

use std::collections::BTreeMap;

use glam::Vec2;
use rand::Rng;
use tracing::{debug, info, warn};

use crate::camera::Camera;
use crate::config::{EnemyDef, WaveDef};
use crate::enemy::{Enemy, EnemyManager};
use crate::world::World;

/// How far outside the visible area enemies appear.
pub const SPAWN_MARGIN: f32 = 50.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SpawnZone {
    Top,
    Bottom,
    Left,
    Right,
}

impl SpawnZone {
    pub const ALL: [SpawnZone; 4] = [
        SpawnZone::Top,
        SpawnZone::Bottom,
        SpawnZone::Left,
        SpawnZone::Right,
    ];
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WaveStatus {
    /// No wave started yet.
    Idle,
    Active,
    /// Every configured wave has been played.
    Exhausted,
}

/// The wave being played, with its own copy of the quotas.
#[derive(Clone, Debug, PartialEq)]
pub struct ActiveWave {
    pub index: usize,
    pub def: WaveDef,
    /// Enemies still to spawn, parallel to `def.enemies`.
    pub remaining: Vec<u32>,
    /// Timer reading when the wave began.
    pub started_at: f64,
    pub spawned: u32,
}

impl ActiveWave {
    fn new(index: usize, def: WaveDef, now: f64) -> Self {
        let remaining = def.enemies.iter().map(|quota| quota.count).collect();
        Self {
            index,
            def,
            remaining,
            started_at: now,
            spawned: 0,
        }
    }

    pub fn quotas_exhausted(&self) -> bool {
        self.remaining.iter().all(|&count| count == 0)
    }

    /// Index of the first enemy group with something left to spawn.
    fn next_group(&self) -> Option<usize> {
        self.remaining.iter().position(|&count| count > 0)
    }
}

#[derive(Clone, Debug)]
pub struct WaveManager {
    waves: Vec<WaveDef>,
    enemy_defs: BTreeMap<String, EnemyDef>,
    pub wave_index: usize,
    pub current: Option<ActiveWave>,
    status: WaveStatus,
}

impl WaveManager {
    pub fn new(waves: Vec<WaveDef>, enemy_defs: BTreeMap<String, EnemyDef>) -> Self {
        Self {
            waves,
            enemy_defs,
            wave_index: 0,
            current: None,
            status: WaveStatus::Idle,
        }
    }

    pub fn status(&self) -> WaveStatus {
        self.status
    }

    pub fn wave_count(&self) -> usize {
        self.waves.len()
    }

    pub fn start_wave(&mut self, index: usize, now: f64) {
        self.wave_index = index;
        match self.waves.get(index) {
            Some(def) => {
                info!(wave = def.wave_number, "wave started");
                self.current = Some(ActiveWave::new(index, def.clone(), now));
                self.status = WaveStatus::Active;
            }
            None => {
                info!("no more waves");
                self.current = None;
                self.status = WaveStatus::Exhausted;
            }
        }
    }

    pub fn end_wave(&mut self, now: f64) {
        if let Some(wave) = self.current.take() {
            info!(wave = wave.def.wave_number, spawned = wave.spawned, "wave ended");
        }
        self.start_wave(self.wave_index + 1, now);
    }

    /// Back to the state before the first wave.
    pub fn reset(&mut self) {
        self.wave_index = 0;
        self.current = None;
        self.status = WaveStatus::Idle;
    }

    /// Advance the wave clock: end the wave if it is over, otherwise spawn
    /// every enemy that is due.  Spawns missed during a slow frame are made up
    /// in the same call.  Returns how many enemies were spawned.
    pub fn update(
        &mut self,
        now: f64,
        enemies: &mut EnemyManager,
        camera: &Camera,
        world: &World,
        rng: &mut impl Rng,
    ) -> usize {
        let Some(wave) = self.current.as_mut() else {
            return 0;
        };

        let elapsed = now - wave.started_at;
        let cleared = wave.quotas_exhausted() && enemies.alive() == 0;
        if elapsed >= wave.def.duration || cleared {
            self.end_wave(now);
            return 0;
        }

        if !(wave.def.spawn_rate > 0.0) {
            return 0;
        }
        let interval = 1.0 / wave.def.spawn_rate;

        let mut spawned = 0;
        while f64::from(wave.spawned) * interval <= elapsed {
            let Some(group) = wave.next_group() else {
                break;
            };
            let kind = &wave.def.enemies[group].kind;
            match self.enemy_defs.get(kind) {
                Some(def) => {
                    let position = spawn_position(camera, world, rng);
                    debug!(%kind, ?position, "enemy spawned");
                    enemies.spawn(Enemy::from_def(kind, def, position, now));
                    wave.remaining[group] -= 1;
                    wave.spawned += 1;
                    spawned += 1;
                }
                None => {
                    warn!(%kind, "wave references an unknown enemy type; skipping group");
                    wave.remaining[group] = 0;
                }
            }
        }
        spawned
    }

    pub fn current_wave_number(&self) -> Option<u32> {
        self.current.as_ref().map(|wave| wave.def.wave_number)
    }

    pub fn wave_start_offset(&self) -> Option<f64> {
        self.current.as_ref().map(|wave| wave.started_at)
    }

    /// Seconds until the current wave times out.
    pub fn time_remaining(&self, now: f64) -> Option<f64> {
        self.current
            .as_ref()
            .map(|wave| (wave.def.duration - (now - wave.started_at)).max(0.0))
    }
}

/// A point just outside one random edge of the view, pulled back inside the
/// world if the view touches the world's border.
pub fn spawn_position(camera: &Camera, world: &World, rng: &mut impl Rng) -> Vec2 {
    let min = camera.offset;
    let max = camera.offset + camera.screen_size;
    let zone = SpawnZone::ALL[rng.gen_range(0..SpawnZone::ALL.len())];
    let position = match zone {
        SpawnZone::Top => Vec2::new(along(rng, min.x, max.x), min.y - SPAWN_MARGIN),
        SpawnZone::Bottom => Vec2::new(along(rng, min.x, max.x), max.y + SPAWN_MARGIN),
        SpawnZone::Left => Vec2::new(min.x - SPAWN_MARGIN, along(rng, min.y, max.y)),
        SpawnZone::Right => Vec2::new(max.x + SPAWN_MARGIN, along(rng, min.y, max.y)),
    };
    world.clamp(position)
}

fn along(rng: &mut impl Rng, lo: f32, hi: f32) -> f32 {
    if hi > lo {
        rng.gen_range(lo..=hi)
    } else {
        lo
    }
}
