//! Timed, additive stat modifiers.
//!
//! The player keeps two stat blocks: `base` (permanent values, changed only
//! by upgrades) and `live` (what the game reads).  A stat's live value is
//! always its base value plus the magnitude of the active buff on it.  Live
//! values are rebuilt from that sum rather than nudged up and down, so an
//! expired buff leaves no floating-point residue behind.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StatKind {
    MovementSpeed,
    AbilityPower,
    AttackSpeed,
    AttackRange,
    Luck,
}

impl StatKind {
    pub fn label(self) -> &'static str {
        match self {
            StatKind::MovementSpeed => "Speed",
            StatKind::AbilityPower => "Power",
            StatKind::AttackSpeed => "Atk Speed",
            StatKind::AttackRange => "Range",
            StatKind::Luck => "Luck",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Stats {
    pub movement_speed: f32,
    /// Multiplies weapon damage.
    pub ability_power: f32,
    /// Multiplies weapon fire rate.
    pub attack_speed: f32,
    /// Multiplies weapon range.
    pub attack_range: f32,
    pub luck: f32,
}

impl Default for Stats {
    fn default() -> Self {
        Self {
            movement_speed: 5.0,
            ability_power: 20.0,
            attack_speed: 1.0,
            attack_range: 1.0,
            luck: 1.0,
        }
    }
}

impl Stats {
    pub fn get(&self, kind: StatKind) -> f32 {
        match kind {
            StatKind::MovementSpeed => self.movement_speed,
            StatKind::AbilityPower => self.ability_power,
            StatKind::AttackSpeed => self.attack_speed,
            StatKind::AttackRange => self.attack_range,
            StatKind::Luck => self.luck,
        }
    }

    pub fn get_mut(&mut self, kind: StatKind) -> &mut f32 {
        match kind {
            StatKind::MovementSpeed => &mut self.movement_speed,
            StatKind::AbilityPower => &mut self.ability_power,
            StatKind::AttackSpeed => &mut self.attack_speed,
            StatKind::AttackRange => &mut self.attack_range,
            StatKind::Luck => &mut self.luck,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ActiveBuff {
    pub magnitude: f32,
    /// Timer reading at which the buff is removed.
    pub expires_at: f64,
}

/// At most one buff per stat.  Re-applying a stat's buff replaces the old one
/// (magnitude and expiry both) instead of stacking on top of it.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Buffs {
    active: BTreeMap<StatKind, ActiveBuff>,
}

impl Buffs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn apply(
        &mut self,
        base: &Stats,
        live: &mut Stats,
        kind: StatKind,
        magnitude: f32,
        duration: f64,
        now: f64,
    ) {
        self.active.insert(
            kind,
            ActiveBuff {
                magnitude,
                expires_at: now + duration,
            },
        );
        self.refresh(base, live, kind);
    }

    /// Drop every buff whose expiry has been reached and restore the stats it
    /// touched.  Returns the stats that changed.
    pub fn expire(&mut self, base: &Stats, live: &mut Stats, now: f64) -> Vec<StatKind> {
        let expired: Vec<StatKind> = self
            .active
            .iter()
            .filter(|(_, buff)| buff.expires_at <= now)
            .map(|(kind, _)| *kind)
            .collect();
        for kind in &expired {
            self.active.remove(kind);
            self.refresh(base, live, *kind);
        }
        expired
    }

    /// Recompute one live stat from its base and the active buff.
    pub fn refresh(&self, base: &Stats, live: &mut Stats, kind: StatKind) {
        *live.get_mut(kind) = base.get(kind) + self.bonus(kind);
    }

    pub fn bonus(&self, kind: StatKind) -> f32 {
        self.active.get(&kind).map_or(0.0, |buff| buff.magnitude)
    }

    pub fn get(&self, kind: StatKind) -> Option<&ActiveBuff> {
        self.active.get(&kind)
    }

    pub fn iter(&self) -> impl Iterator<Item = (StatKind, &ActiveBuff)> {
        self.active.iter().map(|(kind, buff)| (*kind, buff))
    }

    pub fn len(&self) -> usize {
        self.active.len()
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }
}
