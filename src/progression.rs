//! Persistent progression: currency balance and upgrade levels
//!
//! Persisted to the key-value store after every purchase and every run
//! settlement. Levels only ever go up, except through [`Progression::reset`].

use serde::{Deserialize, Serialize};

use crate::persistence::{self, ProgressSnapshot};
use crate::platform::KeyValueStore;

/// Cost growth per purchased level
pub const COST_GROWTH: f64 = 1.5;

/// Upgradable glider stats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UpgradeKind {
    Speed,
    Weight,
    Aero,
    Fuel,
}

impl UpgradeKind {
    pub const ALL: [UpgradeKind; 4] = [
        UpgradeKind::Speed,
        UpgradeKind::Weight,
        UpgradeKind::Aero,
        UpgradeKind::Fuel,
    ];

    /// Price of the first purchase
    pub fn base_cost(self) -> u64 {
        match self {
            UpgradeKind::Speed => 50,
            UpgradeKind::Weight => 75,
            UpgradeKind::Aero => 100,
            UpgradeKind::Fuel => 200,
        }
    }

    /// Starting level. Fuel starts locked at 0.
    pub fn default_level(self) -> u32 {
        match self {
            UpgradeKind::Fuel => 0,
            _ => 1,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            UpgradeKind::Speed => "speed",
            UpgradeKind::Weight => "weight",
            UpgradeKind::Aero => "aero",
            UpgradeKind::Fuel => "fuel",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "speed" => Some(UpgradeKind::Speed),
            "weight" => Some(UpgradeKind::Weight),
            "aero" => Some(UpgradeKind::Aero),
            "fuel" => Some(UpgradeKind::Fuel),
            _ => None,
        }
    }

    /// Cost of buying the next level when currently at `level`
    pub fn cost_at(self, level: u32) -> u64 {
        let exponent = level as i32 - self.default_level() as i32;
        (self.base_cost() as f64 * COST_GROWTH.powi(exponent)).floor() as u64
    }
}

/// Upgrade levels, serialized as a flat `{speed, weight, aero, fuel}` object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Upgrades {
    pub speed: u32,
    pub weight: u32,
    pub aero: u32,
    pub fuel: u32,
}

impl Default for Upgrades {
    fn default() -> Self {
        Self {
            speed: UpgradeKind::Speed.default_level(),
            weight: UpgradeKind::Weight.default_level(),
            aero: UpgradeKind::Aero.default_level(),
            fuel: UpgradeKind::Fuel.default_level(),
        }
    }
}

impl Upgrades {
    pub fn level(&self, kind: UpgradeKind) -> u32 {
        match kind {
            UpgradeKind::Speed => self.speed,
            UpgradeKind::Weight => self.weight,
            UpgradeKind::Aero => self.aero,
            UpgradeKind::Fuel => self.fuel,
        }
    }

    fn level_mut(&mut self, kind: UpgradeKind) -> &mut u32 {
        match kind {
            UpgradeKind::Speed => &mut self.speed,
            UpgradeKind::Weight => &mut self.weight,
            UpgradeKind::Aero => &mut self.aero,
            UpgradeKind::Fuel => &mut self.fuel,
        }
    }

    /// Zero levels would divide by zero in the player's stat formulas
    fn sanitized(mut self) -> Self {
        let defaults = Self::default();
        for kind in [UpgradeKind::Speed, UpgradeKind::Weight, UpgradeKind::Aero] {
            if self.level(kind) == 0 {
                *self.level_mut(kind) = defaults.level(kind);
            }
        }
        self
    }
}

/// Currency balance plus upgrade levels
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Progression {
    balance: u64,
    upgrades: Upgrades,
}

impl Progression {
    /// Fresh progression: zero balance, default levels
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_balance(balance: u64) -> Self {
        Self {
            balance,
            upgrades: Upgrades::default(),
        }
    }

    pub fn from_snapshot(snapshot: ProgressSnapshot) -> Self {
        Self {
            balance: snapshot.balance,
            upgrades: snapshot.upgrade_level.sanitized(),
        }
    }

    pub fn snapshot(&self) -> ProgressSnapshot {
        ProgressSnapshot {
            balance: self.balance,
            upgrade_level: self.upgrades,
        }
    }

    /// Restore from storage, or start fresh when nothing usable is saved
    pub fn load(store: &dyn KeyValueStore) -> Self {
        match persistence::load_progress(store) {
            Some(snapshot) => {
                let progression = Self::from_snapshot(snapshot);
                log::info!(
                    "Loaded progression (balance {}, upgrades {:?})",
                    progression.balance,
                    progression.upgrades
                );
                progression
            }
            None => {
                log::info!("No saved progression, starting fresh");
                Self::new()
            }
        }
    }

    /// Persist the current state. Failures are logged, never surfaced.
    pub fn save(&self, store: &mut dyn KeyValueStore) {
        if let Err(err) = persistence::save_progress(store, &self.snapshot()) {
            log::warn!("Failed to save progression: {err}");
        }
    }

    pub fn balance(&self) -> u64 {
        self.balance
    }

    pub fn upgrades(&self) -> &Upgrades {
        &self.upgrades
    }

    pub fn level(&self, kind: UpgradeKind) -> u32 {
        self.upgrades.level(kind)
    }

    /// Cost of the next level of `kind`
    pub fn cost(&self, kind: UpgradeKind) -> u64 {
        kind.cost_at(self.level(kind))
    }

    pub fn can_afford(&self, kind: UpgradeKind) -> bool {
        self.balance >= self.cost(kind)
    }

    /// Buy one level without persisting. Returns the price paid, or `None`
    /// with state untouched when the balance is short.
    pub fn try_purchase(&mut self, kind: UpgradeKind) -> Option<u64> {
        let cost = self.cost(kind);
        if self.balance < cost {
            return None;
        }
        self.balance -= cost;
        *self.upgrades.level_mut(kind) += 1;
        Some(cost)
    }

    /// Buy one level and persist on success
    pub fn purchase(&mut self, kind: UpgradeKind, store: &mut dyn KeyValueStore) -> bool {
        match self.try_purchase(kind) {
            Some(cost) => {
                log::info!(
                    "Purchased {} level {} for {}",
                    kind.as_str(),
                    self.level(kind),
                    cost
                );
                self.save(store);
                true
            }
            None => {
                log::debug!(
                    "Cannot afford {} ({} < {})",
                    kind.as_str(),
                    self.balance,
                    self.cost(kind)
                );
                false
            }
        }
    }

    /// Add run earnings to the balance and persist
    pub fn credit(&mut self, amount: u64, store: &mut dyn KeyValueStore) {
        self.balance = self.balance.saturating_add(amount);
        self.save(store);
    }

    /// Back to a fresh progression, persisted
    pub fn reset(&mut self, store: &mut dyn KeyValueStore) {
        *self = Self::new();
        self.save(store);
        log::info!("Progression reset to defaults");
    }
}
