use std::collections::BTreeMap;

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::buffs::StatKind;
use crate::config::ConsumableDef;
use crate::error::GameError;

/// Item drop chance per point of luck.
pub const LOOT_CHANCE_PER_LUCK: f64 = 0.25;

/// Probability that a fallen enemy leaves an item, in `0.0..=1.0`.
pub fn loot_chance(luck: f32) -> f64 {
    let chance = LOOT_CHANCE_PER_LUCK * f64::from(luck);
    if chance.is_nan() {
        0.0
    } else {
        chance.clamp(0.0, 1.0)
    }
}

/// Everything an item can do to the player.  Content files name these with
/// snake_case tags; an unknown tag is rejected when the file is parsed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Effect {
    Heal,
    MaxHp,
    MovementSpeed,
    AbilityPower,
    AttackSpeed,
    AttackRange,
    Luck,
}

impl Effect {
    /// The stat a buff of this effect modifies, if it is a stat effect.
    pub fn stat(self) -> Option<StatKind> {
        match self {
            Effect::Heal | Effect::MaxHp => None,
            Effect::MovementSpeed => Some(StatKind::MovementSpeed),
            Effect::AbilityPower => Some(StatKind::AbilityPower),
            Effect::AttackSpeed => Some(StatKind::AttackSpeed),
            Effect::AttackRange => Some(StatKind::AttackRange),
            Effect::Luck => Some(StatKind::Luck),
        }
    }
}

/// What using a consumable asks the player to do.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Activation {
    pub effect: Effect,
    pub magnitude: f32,
    pub duration: f64,
}

/// One owned, usable copy of a consumable.
#[derive(Clone, Debug, PartialEq)]
pub struct Consumable {
    pub name: String,
    pub effect: Effect,
    pub magnitude: f32,
    pub duration: f64,
    pub image: String,
    pub start_time: Option<f64>,
    pub is_active: bool,
    pub is_used: bool,
}

impl Consumable {
    pub fn new(name: &str, def: &ConsumableDef) -> Self {
        Self {
            name: name.to_string(),
            effect: def.effect,
            magnitude: def.magnitude,
            duration: def.duration,
            image: def.image.clone(),
            start_time: None,
            is_active: false,
            is_used: false,
        }
    }

    /// Mark the consumable used and running.  A consumable works once:
    /// `None` if it has already been used.
    pub fn activate(&mut self, now: f64) -> Option<Activation> {
        if self.is_used || self.is_active {
            return None;
        }
        self.is_active = true;
        self.is_used = true;
        self.start_time = Some(now);
        Some(Activation {
            effect: self.effect,
            magnitude: self.magnitude,
            duration: self.duration,
        })
    }

    pub fn update(&mut self, now: f64) {
        if let (true, Some(start)) = (self.is_active, self.start_time) {
            if now - start >= self.duration {
                self.is_active = false;
            }
        }
    }

    pub fn time_remaining(&self, now: f64) -> f64 {
        match (self.is_active, self.start_time) {
            (true, Some(start)) => (self.duration - (now - start)).max(0.0),
            _ => 0.0,
        }
    }

    /// Used and finished: the slot can be freed.
    pub fn is_spent(&self) -> bool {
        self.is_used && !self.is_active
    }
}

/// Holds the consumable blueprints loaded from content.  Blueprints are
/// read-only; every purchase gets its own `Consumable`.
#[derive(Clone, Debug, Default)]
pub struct ConsumableManager {
    blueprints: BTreeMap<String, ConsumableDef>,
}

impl ConsumableManager {
    pub fn new(blueprints: BTreeMap<String, ConsumableDef>) -> Self {
        Self { blueprints }
    }

    pub fn create_consumable(&self, name: &str) -> Result<Consumable, GameError> {
        let def = self
            .blueprints
            .get(name)
            .ok_or_else(|| GameError::unknown("consumable", name))?;
        debug!(name, "consumable created");
        Ok(Consumable::new(name, def))
    }

    /// Roll for an item drop.  On success any blueprint may come out, each
    /// equally likely.
    pub fn roll_loot(&self, luck: f32, rng: &mut impl Rng) -> Option<Consumable> {
        if self.blueprints.is_empty() || !rng.gen_bool(loot_chance(luck)) {
            return None;
        }
        let pick = rng.gen_range(0..self.blueprints.len());
        let (name, def) = self.blueprints.iter().nth(pick)?;
        Some(Consumable::new(name, def))
    }

    pub fn blueprint(&self, name: &str) -> Option<&ConsumableDef> {
        self.blueprints.get(name)
    }
}
