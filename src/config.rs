//! Content definitions: enemies, waves, weapons, consumables and the shop
//! catalogue.
//!
//! Each file is parsed with serde and then cross-checked, so a typo in an
//! effect tag or a wave that names an enemy nobody defined fails at load
//! time with the file and key in the message instead of misbehaving later.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::consumable::Effect;
use crate::error::ConfigError;

pub const ENEMIES_FILE: &str = "enemies.json";
pub const WAVES_FILE: &str = "waves.json";
pub const WEAPONS_FILE: &str = "weapons.json";
pub const CONSUMABLES_FILE: &str = "consumables.json";
pub const SHOP_FILE: &str = "shop.json";

// ── Enemies ───────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct EnemyDef {
    pub hp: f32,
    pub damage: f32,
    pub movement_speed: f32,
    pub astral_shards_drop: u32,
    /// Sprite path, handed to the renderer untouched.
    pub image: String,
    /// Scale applied to the base hitbox.
    #[serde(default = "unit_scale")]
    pub size: f32,
    #[serde(default)]
    pub behavior: BehaviorDef,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BehaviorDef {
    #[default]
    Chaser,
    Burst(BurstDef),
}

/// Tuning for the teleport-and-volley enemy.  Times are in seconds.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct BurstDef {
    pub jump_cooldown: f64,
    pub rise_duration: f64,
    pub vanish_duration: f64,
    pub teleport_radius: f32,
    pub burst_count: u32,
    pub fire_cooldown: f64,
    pub attack_range: f32,
    pub projectile_speed: f32,
    pub projectile_damage: f32,
    pub projectile_range: f32,
}

fn unit_scale() -> f32 {
    1.0
}

// ── Waves ─────────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct WaveDef {
    pub wave_number: u32,
    /// Seconds before the wave ends on its own.
    pub duration: f64,
    /// Enemies per second.
    pub spawn_rate: f64,
    pub enemies: Vec<EnemyQuota>,
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct EnemyQuota {
    #[serde(rename = "type")]
    pub kind: String,
    pub count: u32,
}

// ── Weapons ───────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct WeaponDef {
    pub name: String,
    pub damage: f32,
    /// Shots per second before the attack-speed multiplier.
    pub fire_rate: f64,
    pub projectile_speed: f32,
    pub range: f32,
    pub image: String,
    #[serde(default = "unit_scale")]
    pub scale: f32,
}

// ── Consumables & shop ────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct ConsumableDef {
    pub effect: Effect,
    pub magnitude: f32,
    /// Seconds the effect stays active.  Zero for instant effects.
    #[serde(default)]
    pub duration: f64,
    pub image: String,
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ShopItemDef {
    /// Applied to the player on purchase.  A zero duration is permanent.
    Buff {
        name: String,
        cost: u32,
        effect: Effect,
        magnitude: f32,
        #[serde(default)]
        duration: f64,
        #[serde(default)]
        description: String,
    },
    /// Puts a fresh consumable in the inventory.
    Consumable {
        name: String,
        cost: u32,
        consumable_name: String,
        #[serde(default)]
        description: String,
    },
}

impl ShopItemDef {
    pub fn name(&self) -> &str {
        match self {
            ShopItemDef::Buff { name, .. } | ShopItemDef::Consumable { name, .. } => name,
        }
    }

    pub fn cost(&self) -> u32 {
        match self {
            ShopItemDef::Buff { cost, .. } | ShopItemDef::Consumable { cost, .. } => *cost,
        }
    }

    pub fn description(&self) -> &str {
        match self {
            ShopItemDef::Buff { description, .. }
            | ShopItemDef::Consumable { description, .. } => description,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
struct ShopFile {
    items: Vec<ShopItemDef>,
}

// ── Aggregate ─────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq)]
pub struct GameConfig {
    pub enemies: BTreeMap<String, EnemyDef>,
    pub waves: Vec<WaveDef>,
    pub weapons: BTreeMap<String, WeaponDef>,
    pub consumables: BTreeMap<String, ConsumableDef>,
    pub shop: Vec<ShopItemDef>,
}

impl GameConfig {
    /// Load every content file from `dir` and validate the result.
    pub fn load_dir(dir: &Path) -> Result<Self, ConfigError> {
        let read = |file: &str| {
            let path = dir.join(file);
            fs::read_to_string(&path).map_err(|source| ConfigError::Io { path, source })
        };
        let config = Self::from_strs(
            &read(ENEMIES_FILE)?,
            &read(WAVES_FILE)?,
            &read(WEAPONS_FILE)?,
            &read(CONSUMABLES_FILE)?,
            &read(SHOP_FILE)?,
        )?;
        info!(
            dir = %dir.display(),
            enemies = config.enemies.len(),
            waves = config.waves.len(),
            weapons = config.weapons.len(),
            "content loaded"
        );
        Ok(config)
    }

    /// The content shipped in `assets/config`, compiled into the binary.
    pub fn bundled() -> Result<Self, ConfigError> {
        Self::from_strs(
            include_str!("../assets/config/enemies.json"),
            include_str!("../assets/config/waves.json"),
            include_str!("../assets/config/weapons.json"),
            include_str!("../assets/config/consumables.json"),
            include_str!("../assets/config/shop.json"),
        )
    }

    pub fn from_strs(
        enemies: &str,
        waves: &str,
        weapons: &str,
        consumables: &str,
        shop: &str,
    ) -> Result<Self, ConfigError> {
        let shop: ShopFile = parse(SHOP_FILE, shop)?;
        let config = GameConfig {
            enemies: parse(ENEMIES_FILE, enemies)?,
            waves: parse(WAVES_FILE, waves)?,
            weapons: parse(WEAPONS_FILE, weapons)?,
            consumables: parse(CONSUMABLES_FILE, consumables)?,
            shop: shop.items,
        };
        config.validate()?;
        Ok(config)
    }

    /// Cross-file and range checks serde cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, enemy) in &self.enemies {
            if !(enemy.hp > 0.0) {
                return Err(invalid(ENEMIES_FILE, format!("{name}.hp"), "must be positive"));
            }
            if let BehaviorDef::Burst(burst) = &enemy.behavior {
                if burst.burst_count == 0 {
                    return Err(invalid(
                        ENEMIES_FILE,
                        format!("{name}.behavior.burst_count"),
                        "must be at least 1",
                    ));
                }
            }
        }

        for (i, wave) in self.waves.iter().enumerate() {
            if !(wave.duration > 0.0) {
                return Err(invalid(WAVES_FILE, format!("[{i}].duration"), "must be positive"));
            }
            if !wave.spawn_rate.is_finite() {
                return Err(invalid(WAVES_FILE, format!("[{i}].spawn_rate"), "must be finite"));
            }
            for quota in &wave.enemies {
                if !self.enemies.contains_key(&quota.kind) {
                    return Err(ConfigError::UnknownReference {
                        file: WAVES_FILE.to_string(),
                        key: format!("[{i}].enemies"),
                        kind: "enemy",
                        name: quota.kind.clone(),
                    });
                }
            }
        }

        for (name, consumable) in &self.consumables {
            if consumable.effect == Effect::MaxHp {
                return Err(invalid(
                    CONSUMABLES_FILE,
                    format!("{name}.effect"),
                    "max_hp is a shop upgrade, not a consumable effect",
                ));
            }
            if consumable.duration < 0.0 {
                return Err(invalid(
                    CONSUMABLES_FILE,
                    format!("{name}.duration"),
                    "must not be negative",
                ));
            }
        }

        for item in &self.shop {
            match item {
                ShopItemDef::Buff { name, effect, .. } if *effect == Effect::Heal => {
                    return Err(invalid(
                        SHOP_FILE,
                        format!("{name}.effect"),
                        "heal is only available as a consumable",
                    ));
                }
                ShopItemDef::Consumable {
                    name,
                    consumable_name,
                    ..
                } if !self.consumables.contains_key(consumable_name) => {
                    return Err(ConfigError::UnknownReference {
                        file: SHOP_FILE.to_string(),
                        key: format!("{name}.consumable_name"),
                        kind: "consumable",
                        name: consumable_name.clone(),
                    });
                }
                _ => {}
            }
        }

        Ok(())
    }
}

/// Parse one content file, tagging failures with its name.
pub fn parse<T: DeserializeOwned>(file: &str, text: &str) -> Result<T, ConfigError> {
    serde_json::from_str(text).map_err(|source| ConfigError::Parse {
        file: file.to_string(),
        source,
    })
}

fn invalid(file: &str, key: String, reason: &str) -> ConfigError {
    ConfigError::InvalidValue {
        file: file.to_string(),
        key,
        reason: reason.to_string(),
    }
}
