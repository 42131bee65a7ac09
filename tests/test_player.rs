use astral_shards::buffs::{StatKind, Stats};
use astral_shards::consumable::{Activation, Effect};
use astral_shards::entities::TextTone;
use astral_shards::player::{Player, STARTING_HP, STARTING_MAX_HP};
use astral_shards::world::World;
use glam::Vec2;

use rand::rngs::StdRng;
use rand::SeedableRng;

fn seeded_rng() -> StdRng {
    StdRng::seed_from_u64(42)
}

fn make_world() -> World {
    World::new(4096.0, 4096.0)
}

fn make_player() -> Player {
    Player::new(Vec2::new(2048.0, 2048.0))
}

// ── Defaults ──────────────────────────────────────────────────────────────────

#[test]
fn new_player_starting_values() {
    let p = make_player();
    assert_eq!(p.hp, STARTING_HP);
    assert_eq!(p.max_hp, STARTING_MAX_HP);
    assert_eq!(p.astral_shards, 50);
    assert_eq!(p.stats, Stats::default());
    assert_eq!(p.stats.movement_speed, 5.0);
    assert_eq!(p.stats.ability_power, 20.0);
    assert!(p.buffs.is_empty());
}

// ── Movement ──────────────────────────────────────────────────────────────────

#[test]
fn movement_scales_with_speed_and_sets_facing() {
    let mut p = make_player();
    p.move_by(Vec2::new(-1.0, 0.0), Vec2::new(4096.0, 4096.0));
    assert_eq!(p.position, Vec2::new(2043.0, 2048.0));
    assert!(!p.facing_right);
}

#[test]
fn movement_stays_inside_the_world() {
    let mut p = Player::new(Vec2::new(30.0, 40.0));
    for _ in 0..20 {
        p.move_by(Vec2::new(-1.0, -1.0), Vec2::new(4096.0, 4096.0));
    }
    // Half the player's size from the corner.
    assert_eq!(p.position, Vec2::new(24.0, 32.0));
}

// ── Buffs ─────────────────────────────────────────────────────────────────────

#[test]
fn buff_raises_stat_until_it_expires() {
    let mut p = make_player();
    p.add_buff(StatKind::MovementSpeed, 3.0, 10.0, 0.0);
    assert_eq!(p.stats.movement_speed, 8.0);

    p.update_buffs(9.99);
    assert_eq!(p.stats.movement_speed, 8.0);

    p.update_buffs(10.0);
    assert_eq!(p.stats.movement_speed, 5.0);
    assert!(p.buffs.is_empty());
}

#[test]
fn expired_buff_restores_the_exact_base_value() {
    let mut p = make_player();
    p.add_buff(StatKind::AbilityPower, 0.1, 1.0, 0.0);
    p.add_buff(StatKind::Luck, 0.3, 1.0, 0.0);
    p.update_buffs(1.0);
    assert_eq!(p.stats, p.base);
    assert_eq!(p.stats.ability_power, 20.0);
    assert_eq!(p.stats.luck, 1.0);
}

#[test]
fn repeated_buff_cycles_leave_no_drift() {
    let mut p = make_player();
    for cycle in 0..10_000 {
        let now = f64::from(cycle);
        p.add_buff(StatKind::MovementSpeed, 0.1, 0.5, now);
        p.add_buff(StatKind::Luck, 0.7, 0.5, now);
        p.update_buffs(now + 0.5);
    }
    assert!(p.buffs.is_empty());
    assert_eq!(p.stats, p.base);
    assert_eq!(p.stats.movement_speed, 5.0);
    assert_eq!(p.stats.luck, 1.0);
}

#[test]
fn reapplying_a_buff_replaces_the_old_one() {
    let mut p = make_player();
    p.add_buff(StatKind::MovementSpeed, 3.0, 10.0, 0.0);
    p.add_buff(StatKind::MovementSpeed, 5.0, 2.0, 1.0);
    assert_eq!(p.stats.movement_speed, 10.0); // not 13: no stacking
    assert_eq!(p.buffs.len(), 1);

    // The newer expiry wins.
    p.update_buffs(3.0);
    assert_eq!(p.stats.movement_speed, 5.0);
}

#[test]
fn buffs_on_different_stats_expire_independently() {
    let mut p = make_player();
    p.add_buff(StatKind::MovementSpeed, 2.0, 5.0, 0.0);
    p.add_buff(StatKind::AbilityPower, 10.0, 15.0, 0.0);
    p.update_buffs(5.0);
    assert_eq!(p.stats.movement_speed, 5.0);
    assert_eq!(p.stats.ability_power, 30.0);
    p.update_buffs(15.0);
    assert_eq!(p.stats.ability_power, 20.0);
}

#[test]
fn permanent_upgrade_survives_buff_expiry() {
    let mut p = make_player();
    p.add_buff(StatKind::MovementSpeed, 3.0, 10.0, 0.0);
    p.upgrade_stat(StatKind::MovementSpeed, 2.0);
    assert_eq!(p.base.movement_speed, 7.0);
    assert_eq!(p.stats.movement_speed, 10.0);

    p.update_buffs(10.0);
    assert_eq!(p.stats.movement_speed, 7.0);
}

#[test]
fn attack_multiplier_upgrades_scale_instead_of_add() {
    let mut p = make_player();
    p.upgrade_stat(StatKind::AttackSpeed, 1.5);
    p.upgrade_stat(StatKind::AttackRange, 2.0);
    assert_eq!(p.stats.attack_speed, 1.5);
    assert_eq!(p.stats.attack_range, 2.0);
}

// ── Damage & healing ──────────────────────────────────────────────────────────

#[test]
fn second_hit_inside_invincibility_window_is_ignored() {
    let mut p = make_player();
    let mut world = make_world();
    let mut rng = seeded_rng();

    assert!(p.take_damage(30.0, 0.0, &mut world, &mut rng));
    assert_eq!(p.hp, 70.0);

    assert!(!p.take_damage(30.0, 0.5, &mut world, &mut rng));
    assert_eq!(p.hp, 70.0);

    // A full second later the window has closed.
    assert!(p.take_damage(30.0, 1.0, &mut world, &mut rng));
    assert_eq!(p.hp, 40.0);
}

#[test]
fn hp_never_goes_below_zero() {
    let mut p = make_player();
    let mut world = make_world();
    p.take_damage(500.0, 0.0, &mut world, &mut seeded_rng());
    assert_eq!(p.hp, 0.0);
    assert!(p.is_dead());
}

#[test]
fn landed_hit_leaves_a_damage_number() {
    let mut p = make_player();
    let mut world = make_world();
    p.take_damage(30.0, 0.0, &mut world, &mut seeded_rng());

    assert_eq!(world.floating_texts.len(), 1);
    let text = &world.floating_texts[0];
    assert_eq!(text.text, "30");
    assert_eq!(text.tone, TextTone::Damage);
    assert_eq!(text.position, p.position + Vec2::new(0.0, -20.0));
}

#[test]
fn healing_is_capped_at_max_hp() {
    let mut p = make_player();
    let mut world = make_world();
    p.heal(80.0, 0.0, &mut world, &mut seeded_rng());
    assert_eq!(p.hp, STARTING_MAX_HP);
    assert_eq!(world.floating_texts[0].tone, TextTone::Heal);
}

#[test]
fn update_clears_invincibility_after_the_window() {
    let mut p = make_player();
    let mut world = make_world();
    p.take_damage(10.0, 2.0, &mut world, &mut seeded_rng());
    p.update(2.5);
    assert!(p.invincible);
    p.update(3.0);
    assert!(!p.invincible);
}

#[test]
fn raising_max_hp_refills_health() {
    let mut p = make_player();
    p.raise_max_hp(25.0);
    assert_eq!(p.max_hp, 175.0);
    assert_eq!(p.hp, 175.0);
}

#[test]
fn max_hp_activation_is_not_a_consumable_effect() {
    let mut world = make_world();
    let mut p = make_player();
    let before = p.clone();
    let activation = Activation {
        effect: Effect::MaxHp,
        magnitude: 25.0,
        duration: 0.0,
    };
    p.apply(activation, 0.0, &mut world, &mut seeded_rng());
    assert_eq!(p.max_hp, before.max_hp);
    assert_eq!(p.hp, before.hp);
    assert_eq!(p.stats, before.stats);
}
