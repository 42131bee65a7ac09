use std::collections::BTreeMap;

use astral_shards::camera::Camera;
use astral_shards::config::{BehaviorDef, EnemyDef, EnemyQuota, WaveDef};
use astral_shards::enemy::EnemyManager;
use astral_shards::wave::{spawn_position, WaveManager, WaveStatus, SPAWN_MARGIN};
use astral_shards::world::World;
use glam::Vec2;

use rand::rngs::StdRng;
use rand::SeedableRng;

fn seeded_rng() -> StdRng {
    StdRng::seed_from_u64(42)
}

fn enemy_defs() -> BTreeMap<String, EnemyDef> {
    let slime = EnemyDef {
        hp: 40.0,
        damage: 8.0,
        movement_speed: 2.0,
        astral_shards_drop: 1,
        image: "slime.png".to_string(),
        size: 1.0,
        behavior: BehaviorDef::Chaser,
    };
    BTreeMap::from([("slime".to_string(), slime)])
}

fn wave(number: u32, duration: f64, spawn_rate: f64, quotas: &[(&str, u32)]) -> WaveDef {
    WaveDef {
        wave_number: number,
        duration,
        spawn_rate,
        enemies: quotas
            .iter()
            .map(|(kind, count)| EnemyQuota {
                kind: kind.to_string(),
                count: *count,
            })
            .collect(),
    }
}

/// World, a camera centred in it, and an empty enemy list.
fn arena() -> (World, Camera, EnemyManager) {
    let world = World::new(4096.0, 4096.0);
    let mut camera = Camera::new(Vec2::new(1600.0, 900.0), world.size());
    camera.update(world.size() * 0.5);
    (world, camera, EnemyManager::new())
}

// ── Lifecycle ─────────────────────────────────────────────────────────────────

#[test]
fn manager_starts_idle_and_spawns_nothing() {
    let (world, camera, mut enemies) = arena();
    let mut waves = WaveManager::new(vec![wave(1, 30.0, 2.0, &[("slime", 100)])], enemy_defs());
    assert_eq!(waves.status(), WaveStatus::Idle);
    assert_eq!(waves.update(5.0, &mut enemies, &camera, &world, &mut seeded_rng()), 0);
    assert!(enemies.is_empty());
}

#[test]
fn wave_runs_for_its_duration_then_the_next_begins() {
    let (world, camera, mut enemies) = arena();
    let mut rng = seeded_rng();
    let mut waves = WaveManager::new(
        vec![
            wave(1, 30.0, 2.0, &[("slime", 100)]),
            wave(2, 45.0, 1.0, &[("slime", 10)]),
        ],
        enemy_defs(),
    );
    waves.start_wave(0, 0.0);

    for step in 0..60 {
        let now = step as f64 * 0.5;
        waves.update(now, &mut enemies, &camera, &world, &mut rng);
        assert_eq!(waves.current_wave_number(), Some(1), "at {now}s");
    }
    // One spawn every half second from t=0 to t=29.5.
    assert_eq!(enemies.len(), 60);

    waves.update(30.0, &mut enemies, &camera, &world, &mut rng);
    assert_eq!(waves.current_wave_number(), Some(2));
    assert_eq!(waves.wave_start_offset(), Some(30.0));
    assert_eq!(waves.time_remaining(40.0), Some(35.0));
}

#[test]
fn missed_spawns_are_made_up_after_a_stall() {
    let (world, camera, mut enemies) = arena();
    let mut rng = seeded_rng();
    let mut waves = WaveManager::new(vec![wave(1, 30.0, 2.0, &[("slime", 100)])], enemy_defs());
    waves.start_wave(0, 0.0);

    assert_eq!(waves.update(0.0, &mut enemies, &camera, &world, &mut rng), 1);
    // Due at 0.5, 1.0, 1.5 and 2.0.
    assert_eq!(waves.update(2.0, &mut enemies, &camera, &world, &mut rng), 4);
    assert_eq!(enemies.len(), 5);
}

#[test]
fn spawning_stops_when_quotas_run_out() {
    let (world, camera, mut enemies) = arena();
    let mut rng = seeded_rng();
    let mut waves = WaveManager::new(vec![wave(1, 30.0, 10.0, &[("slime", 3)])], enemy_defs());
    waves.start_wave(0, 0.0);

    assert_eq!(waves.update(5.0, &mut enemies, &camera, &world, &mut rng), 3);
    assert_eq!(waves.update(6.0, &mut enemies, &camera, &world, &mut rng), 0);
    assert_eq!(enemies.len(), 3);
    assert!(waves.current.as_ref().unwrap().quotas_exhausted());
}

#[test]
fn wave_ends_early_once_cleared() {
    let (world, camera, mut enemies) = arena();
    let mut rng = seeded_rng();
    let mut waves = WaveManager::new(
        vec![
            wave(1, 30.0, 10.0, &[("slime", 2)]),
            wave(2, 30.0, 1.0, &[("slime", 5)]),
        ],
        enemy_defs(),
    );
    waves.start_wave(0, 0.0);
    waves.update(1.0, &mut enemies, &camera, &world, &mut rng);
    assert_eq!(enemies.len(), 2);

    // Quotas are spent but the enemies still live: the wave carries on.
    waves.update(2.0, &mut enemies, &camera, &world, &mut rng);
    assert_eq!(waves.current_wave_number(), Some(1));

    for enemy in enemies.enemies.iter_mut() {
        enemy.hp = 0.0;
    }
    waves.update(3.0, &mut enemies, &camera, &world, &mut rng);
    assert_eq!(waves.current_wave_number(), Some(2));
    assert_eq!(waves.wave_start_offset(), Some(3.0));
}

#[test]
fn no_spawning_after_the_last_wave() {
    let (world, camera, mut enemies) = arena();
    let mut rng = seeded_rng();
    let mut waves = WaveManager::new(vec![wave(1, 1.0, 1.0, &[("slime", 10)])], enemy_defs());
    waves.start_wave(0, 0.0);
    waves.update(0.0, &mut enemies, &camera, &world, &mut rng);

    waves.update(1.0, &mut enemies, &camera, &world, &mut rng);
    assert_eq!(waves.status(), WaveStatus::Exhausted);
    assert_eq!(waves.current_wave_number(), None);

    let before = enemies.len();
    assert_eq!(waves.update(50.0, &mut enemies, &camera, &world, &mut rng), 0);
    assert_eq!(enemies.len(), before);
}

#[test]
fn wave_definitions_are_not_consumed_by_play() {
    let (world, camera, mut enemies) = arena();
    let mut rng = seeded_rng();
    let mut waves = WaveManager::new(vec![wave(1, 30.0, 10.0, &[("slime", 3)])], enemy_defs());
    waves.start_wave(0, 0.0);
    waves.update(5.0, &mut enemies, &camera, &world, &mut rng);

    // Replaying the wave starts from the full quota again.
    waves.reset();
    waves.start_wave(0, 10.0);
    assert_eq!(waves.update(15.0, &mut enemies, &camera, &world, &mut rng), 3);
}

#[test]
fn zero_spawn_rate_never_spawns() {
    let (world, camera, mut enemies) = arena();
    let mut rng = seeded_rng();
    let mut waves = WaveManager::new(vec![wave(1, 30.0, 0.0, &[("slime", 10)])], enemy_defs());
    waves.start_wave(0, 0.0);
    assert_eq!(waves.update(10.0, &mut enemies, &camera, &world, &mut rng), 0);
    assert_eq!(waves.status(), WaveStatus::Active);
}

#[test]
fn unknown_enemy_type_is_skipped() {
    let (world, camera, mut enemies) = arena();
    let mut rng = seeded_rng();
    let mut waves = WaveManager::new(
        vec![wave(1, 30.0, 1.0, &[("ghost", 5), ("slime", 5)])],
        enemy_defs(),
    );
    waves.start_wave(0, 0.0);
    assert_eq!(waves.update(0.0, &mut enemies, &camera, &world, &mut rng), 1);
    assert_eq!(enemies.iter().next().map(|e| e.kind.as_str()), Some("slime"));
}

// ── Spawn placement ───────────────────────────────────────────────────────────

#[test]
fn spawns_appear_just_outside_the_view() {
    let (world, camera, _) = arena();
    let mut rng = seeded_rng();
    let min = camera.offset;
    let max = camera.offset + camera.screen_size;

    for _ in 0..200 {
        let p = spawn_position(&camera, &world, &mut rng);
        let inside_view = p.x > min.x && p.x < max.x && p.y > min.y && p.y < max.y;
        assert!(!inside_view, "{p:?} is on screen");
        let beyond = (min.x - p.x)
            .max(p.x - max.x)
            .max(min.y - p.y)
            .max(p.y - max.y);
        assert!((beyond - SPAWN_MARGIN).abs() < 1e-3, "{p:?}");
    }
}

#[test]
fn spawns_stay_inside_the_world_at_its_edge() {
    let world = World::new(4096.0, 4096.0);
    let mut camera = Camera::new(Vec2::new(1600.0, 900.0), world.size());
    camera.update(Vec2::ZERO);
    let mut rng = seeded_rng();

    for _ in 0..200 {
        let p = spawn_position(&camera, &world, &mut rng);
        assert!(p.x >= 0.0 && p.y >= 0.0 && p.x <= 4096.0 && p.y <= 4096.0);
    }
}
