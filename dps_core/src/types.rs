//! Core types shared by the damage engine and the optimizer

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How a hit interacts with the target's resistances
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DamageType {
    /// Mitigated by armor
    Physical,
    /// Mitigated by magic resist
    Magic,
    /// Bypasses resistances
    True,
    /// Physical or magic depending on the attacker's bonus stats
    Adaptive,
}

impl DamageType {
    /// Resolve adaptive damage: physical when bonus AD >= bonus AP, else magic
    pub fn resolve(self, bonus_ad: f64, bonus_ap: f64) -> DamageType {
        match self {
            DamageType::Adaptive => {
                if bonus_ad >= bonus_ap {
                    DamageType::Physical
                } else {
                    DamageType::Magic
                }
            }
            other => other,
        }
    }

    pub fn bypasses_resistance(self) -> bool {
        matches!(self, DamageType::True)
    }

    /// Index into per-type tables (adaptive must be resolved first)
    pub(crate) fn resolved_index(self) -> usize {
        match self {
            DamageType::Physical | DamageType::Adaptive => 0,
            DamageType::Magic => 1,
            DamageType::True => 2,
        }
    }
}

impl fmt::Display for DamageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DamageType::Physical => "physical",
            DamageType::Magic => "magic",
            DamageType::True => "true",
            DamageType::Adaptive => "adaptive",
        };
        write!(f, "{}", name)
    }
}

/// Every action the optimizer can schedule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ActionId {
    #[serde(rename = "AA")]
    AutoAttack,
    #[serde(rename = "Q")]
    Q,
    #[serde(rename = "W")]
    W,
    #[serde(rename = "E_ACTIVATE")]
    EActivate,
    #[serde(rename = "E_FIRST")]
    EFirst,
    #[serde(rename = "E_CRIT")]
    ECrit,
    #[serde(rename = "R_ACTIVATE")]
    RActivate,
    #[serde(rename = "WAIT")]
    Wait,
}

impl ActionId {
    pub const ALL: [ActionId; 8] = [
        ActionId::AutoAttack,
        ActionId::Q,
        ActionId::W,
        ActionId::EActivate,
        ActionId::EFirst,
        ActionId::ECrit,
        ActionId::RActivate,
        ActionId::Wait,
    ];

    pub fn label(self) -> &'static str {
        match self {
            ActionId::AutoAttack => "AA",
            ActionId::Q => "Q",
            ActionId::W => "W",
            ActionId::EActivate => "E_ACTIVATE",
            ActionId::EFirst => "E_FIRST",
            ActionId::ECrit => "E_CRIT",
            ActionId::RActivate => "R_ACTIVATE",
            ActionId::Wait => "WAIT",
        }
    }

    pub fn index(self) -> usize {
        self as usize
    }

    /// Applies on-hit effects (life steal, on-hit items, keystone hit counters)
    pub fn is_on_hit(self) -> bool {
        matches!(
            self,
            ActionId::AutoAttack | ActionId::Q | ActionId::EFirst | ActionId::ECrit
        )
    }

    /// Counts as an ability cast (arms spellblade)
    pub fn is_ability_cast(self) -> bool {
        matches!(
            self,
            ActionId::Q | ActionId::W | ActionId::EActivate | ActionId::RActivate
        )
    }

    /// Damage that scales from ability amplifiers
    pub fn is_ability_damage(self) -> bool {
        matches!(
            self,
            ActionId::Q | ActionId::W | ActionId::EFirst | ActionId::ECrit
        )
    }

    /// Occupies the basic attack slot
    pub fn is_attack_slot(self) -> bool {
        matches!(
            self,
            ActionId::AutoAttack | ActionId::EFirst | ActionId::ECrit
        )
    }

    pub fn deals_damage(self) -> bool {
        self.is_attack_slot() || matches!(self, ActionId::Q | ActionId::W)
    }
}

impl fmt::Display for ActionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl FromStr for ActionId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_ascii_uppercase();
        ActionId::ALL
            .iter()
            .copied()
            .find(|a| a.label() == upper)
            .or(match upper.as_str() {
                "AUTO" | "AUTOATTACK" | "AUTO_ATTACK" => Some(ActionId::AutoAttack),
                _ => None,
            })
            .ok_or_else(|| format!("unknown action '{}'", s))
    }
}

/// Compact set of actions
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct ActionSet(u16);

impl ActionSet {
    pub const EMPTY: ActionSet = ActionSet(0);

    pub const fn of(actions: &[ActionId]) -> ActionSet {
        let mut bits = 0u16;
        let mut i = 0;
        while i < actions.len() {
            bits |= 1 << (actions[i] as u16);
            i += 1;
        }
        ActionSet(bits)
    }

    pub fn contains(self, action: ActionId) -> bool {
        self.0 & (1 << action as u16) != 0
    }

    pub fn insert(&mut self, action: ActionId) {
        self.0 |= 1 << action as u16;
    }

    pub fn iter(self) -> impl Iterator<Item = ActionId> {
        ActionId::ALL.into_iter().filter(move |a| self.contains(*a))
    }
}
