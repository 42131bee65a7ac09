use tracing::warn;

use crate::consumable::{Activation, Consumable};
use crate::error::InventoryFull;

pub const CONSUMABLE_SLOTS: usize = 5;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Inventory {
    /// Name of the equipped weapon definition.
    pub weapon: Option<String>,
    pub consumables: [Option<Consumable>; CONSUMABLE_SLOTS],
}

impl Inventory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn equip_weapon(&mut self, name: &str) {
        self.weapon = Some(name.to_string());
    }

    pub fn has_consumable_space(&self) -> bool {
        self.consumables.iter().any(Option::is_none)
    }

    /// Put `consumable` in the first empty slot and return that slot.
    pub fn add_consumable(&mut self, consumable: Consumable) -> Result<usize, InventoryFull> {
        match self.consumables.iter().position(Option::is_none) {
            Some(slot) => {
                self.consumables[slot] = Some(consumable);
                Ok(slot)
            }
            None => {
                warn!(name = %consumable.name, "no free slot for consumable");
                Err(InventoryFull)
            }
        }
    }

    /// Start the consumable in `slot`.  Out-of-range, empty and already
    /// running slots do nothing.
    pub fn use_consumable(&mut self, slot: usize, now: f64) -> Option<Activation> {
        self.consumables.get_mut(slot)?.as_mut()?.activate(now)
    }

    /// Tick every consumable and free the slots of the ones that are done.
    pub fn update_consumables(&mut self, now: f64) {
        for slot in self.consumables.iter_mut() {
            if let Some(consumable) = slot {
                consumable.update(now);
                if consumable.is_spent() {
                    *slot = None;
                }
            }
        }
    }

    pub fn occupied(&self) -> usize {
        self.consumables.iter().filter(|slot| slot.is_some()).count()
    }
}
