use tracing::{info, warn};

use crate::config::ShopItemDef;
use crate::consumable::{ConsumableManager, Effect};
use crate::error::{InventoryFull, PurchaseError};
use crate::player::Player;

/// A completed purchase.
#[derive(Clone, Debug, PartialEq)]
pub struct Purchase {
    pub item: String,
    pub cost: u32,
    /// Inventory slot the bought consumable went into.
    pub slot: Option<usize>,
}

/// Catalogue plus the cursor the player moves through it.
#[derive(Clone, Debug, Default)]
pub struct Shop {
    pub items: Vec<ShopItemDef>,
    pub visible: bool,
    pub selected: usize,
    /// Outcome of the last purchase attempt, for the UI to show.
    pub notice: Option<String>,
}

impl Shop {
    pub fn new(items: Vec<ShopItemDef>) -> Self {
        Self {
            items,
            visible: false,
            selected: 0,
            notice: None,
        }
    }

    pub fn open(&mut self) {
        self.visible = true;
        self.selected = 0;
        self.notice = None;
    }

    pub fn close(&mut self) {
        self.visible = false;
    }

    pub fn select_next(&mut self) {
        if !self.items.is_empty() {
            self.selected = (self.selected + 1) % self.items.len();
        }
    }

    pub fn select_prev(&mut self) {
        if !self.items.is_empty() {
            self.selected = (self.selected + self.items.len() - 1) % self.items.len();
        }
    }

    pub fn selected_item(&self) -> Option<&ShopItemDef> {
        self.items.get(self.selected)
    }

    pub fn buy_selected(
        &self,
        player: &mut Player,
        consumables: &ConsumableManager,
        now: f64,
    ) -> Result<Purchase, PurchaseError> {
        self.purchase(self.selected, player, consumables, now)
    }

    /// Buy the item at `index`.  On any error nothing is spent and the player
    /// is left untouched.
    pub fn purchase(
        &self,
        index: usize,
        player: &mut Player,
        consumables: &ConsumableManager,
        now: f64,
    ) -> Result<Purchase, PurchaseError> {
        let item = self.items.get(index).ok_or(PurchaseError::NoSuchItem(index))?;
        let cost = item.cost();
        if player.astral_shards < cost {
            warn!(item = item.name(), cost, balance = player.astral_shards, "not enough astral shards");
            return Err(PurchaseError::InsufficientShards {
                cost,
                balance: player.astral_shards,
            });
        }

        let slot = match item {
            ShopItemDef::Buff {
                effect,
                magnitude,
                duration,
                ..
            } => {
                player.astral_shards -= cost;
                apply_upgrade(player, *effect, *magnitude, *duration, now);
                None
            }
            ShopItemDef::Consumable {
                consumable_name, ..
            } => {
                if !player.inventory.has_consumable_space() {
                    warn!(item = item.name(), "no space in inventory; purchase cancelled");
                    return Err(InventoryFull.into());
                }
                let consumable = consumables.create_consumable(consumable_name)?;
                let slot = player.inventory.add_consumable(consumable)?;
                player.astral_shards -= cost;
                Some(slot)
            }
        };

        info!(item = item.name(), cost, "item purchased");
        Ok(Purchase {
            item: item.name().to_string(),
            cost,
            slot,
        })
    }
}

/// Shop buffs: `max_hp` raises the cap and refills, a zero duration is a
/// permanent stat upgrade, anything else is a timed buff.
fn apply_upgrade(player: &mut Player, effect: Effect, magnitude: f32, duration: f64, now: f64) {
    match (effect, effect.stat()) {
        (_, Some(kind)) if duration > 0.0 => player.add_buff(kind, magnitude, duration, now),
        (_, Some(kind)) => player.upgrade_stat(kind, magnitude),
        (Effect::MaxHp, None) => player.raise_max_hp(magnitude),
        (_, None) => player.hp = (player.hp + magnitude).min(player.max_hp),
    }
}
