use astral_shards::buffs::StatKind;
use astral_shards::config::GameConfig;
use astral_shards::consumable::ConsumableManager;
use astral_shards::error::{InventoryFull, PurchaseError};
use astral_shards::inventory::CONSUMABLE_SLOTS;
use astral_shards::player::Player;
use astral_shards::shop::Shop;
use glam::Vec2;

fn setup() -> (Shop, Player, ConsumableManager) {
    let config = GameConfig::bundled().expect("bundled content is valid");
    (
        Shop::new(config.shop),
        Player::new(Vec2::new(100.0, 100.0)),
        ConsumableManager::new(config.consumables),
    )
}

fn index_of(shop: &Shop, name: &str) -> usize {
    shop.items
        .iter()
        .position(|item| item.name() == name)
        .unwrap_or_else(|| panic!("no shop item named {name}"))
}

// ── Refusals ──────────────────────────────────────────────────────────────────

#[test]
fn insufficient_shards_changes_nothing() {
    let (shop, mut player, consumables) = setup();
    player.astral_shards = 5;
    let sigil = index_of(&shop, "Vitality Sigil");

    let err = shop.purchase(sigil, &mut player, &consumables, 0.0).unwrap_err();
    assert_eq!(err, PurchaseError::InsufficientShards { cost: 40, balance: 5 });
    assert_eq!(player.astral_shards, 5);
    assert_eq!(player.max_hp, 150.0);
}

#[test]
fn full_inventory_refuses_and_keeps_the_shards() {
    let (shop, mut player, consumables) = setup();
    player.astral_shards = 1000;
    for _ in 0..CONSUMABLE_SLOTS {
        player
            .inventory
            .add_consumable(consumables.create_consumable("clover_brew").unwrap())
            .unwrap();
    }
    let potion = index_of(&shop, "Health Potion");

    let err = shop.purchase(potion, &mut player, &consumables, 0.0).unwrap_err();
    assert_eq!(err, PurchaseError::NoSpace(InventoryFull));
    assert_eq!(player.astral_shards, 1000);
}

#[test]
fn missing_item_is_an_error() {
    let (shop, mut player, consumables) = setup();
    assert_eq!(
        shop.purchase(99, &mut player, &consumables, 0.0),
        Err(PurchaseError::NoSuchItem(99))
    );
}

// ── Purchases ─────────────────────────────────────────────────────────────────

#[test]
fn max_hp_upgrade_raises_the_cap_and_refills() {
    let (shop, mut player, consumables) = setup();
    let sigil = index_of(&shop, "Vitality Sigil");

    let purchase = shop.purchase(sigil, &mut player, &consumables, 0.0).unwrap();
    assert_eq!(purchase.cost, 40);
    assert_eq!(purchase.slot, None);
    assert_eq!(player.max_hp, 175.0);
    assert_eq!(player.hp, 175.0);
    assert_eq!(player.astral_shards, 10);
}

#[test]
fn consumable_purchase_lands_in_the_inventory() {
    let (shop, mut player, consumables) = setup();
    let potion = index_of(&shop, "Health Potion");

    let purchase = shop.purchase(potion, &mut player, &consumables, 0.0).unwrap();
    assert_eq!(purchase.slot, Some(0));
    assert_eq!(player.astral_shards, 35);
    let bought = player.inventory.consumables[0].as_ref().unwrap();
    assert_eq!(bought.name, "health_potion");
    assert!(!bought.is_used);
}

#[test]
fn permanent_upgrades_change_base_stats() {
    let (shop, mut player, consumables) = setup();
    player.astral_shards = 200;

    shop.purchase(index_of(&shop, "Fleet Boots"), &mut player, &consumables, 0.0)
        .unwrap();
    shop.purchase(index_of(&shop, "Quickened Hands"), &mut player, &consumables, 0.0)
        .unwrap();

    assert_eq!(player.base.movement_speed, 6.0);
    assert_eq!(player.stats.movement_speed, 6.0);
    assert!((player.stats.attack_speed - 1.15).abs() < 1e-6);
    assert!(player.buffs.is_empty());
    assert_eq!(player.astral_shards, 110);
}

#[test]
fn timed_shop_buff_wears_off() {
    let (shop, mut player, consumables) = setup();
    let hymn = index_of(&shop, "Battle Hymn");

    shop.purchase(hymn, &mut player, &consumables, 5.0).unwrap();
    assert_eq!(player.stats.ability_power, 35.0);
    assert_eq!(player.buffs.get(StatKind::AbilityPower).unwrap().expires_at, 25.0);

    player.update_buffs(25.0);
    assert_eq!(player.stats.ability_power, 20.0);
}

// ── Cursor ────────────────────────────────────────────────────────────────────

#[test]
fn selection_wraps_both_ways() {
    let (mut shop, _, _) = setup();
    let last = shop.items.len() - 1;
    shop.open();
    assert!(shop.visible);
    assert_eq!(shop.selected, 0);

    shop.select_prev();
    assert_eq!(shop.selected, last);
    shop.select_next();
    assert_eq!(shop.selected, 0);
    shop.select_next();
    assert_eq!(shop.selected_item().map(|item| item.name()), Some("Fleet Boots"));

    shop.close();
    shop.open();
    assert_eq!(shop.selected, 0);
}

#[test]
fn buy_selected_uses_the_cursor() {
    let (mut shop, mut player, consumables) = setup();
    while shop.selected_item().map(|item| item.name()) != Some("Clover Brew") {
        shop.select_next();
    }
    let purchase = shop.buy_selected(&mut player, &consumables, 0.0).unwrap();
    assert_eq!(purchase.item, "Clover Brew");
    assert_eq!(player.astral_shards, 40);
}
