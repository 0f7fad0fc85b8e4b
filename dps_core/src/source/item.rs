//! Item effects - Dynamic amplifiers and on-hit procs
//!
//! Item effects are immutable; everything that changes during a fight lives
//! in an [`ItemState`] owned by the search branch.

use crate::damage::DamagePayload;
use crate::stat_block::StatBlock;
use crate::types::{ActionId, ActionSet, DamageType};
use serde::Serialize;
use std::str::FromStr;

/// Most items a combatant can carry
pub const MAX_ITEMS: usize = 6;

/// Abilities and empowered attacks
const ABILITY_HITS: ActionSet = ActionSet::of(&[
    ActionId::Q,
    ActionId::W,
    ActionId::EFirst,
    ActionId::ECrit,
]);

/// Seconds a spellblade charge stays armed
const SPELLBLADE_WINDOW: f64 = 10.0;

#[derive(Debug, Clone, PartialEq)]
pub enum ItemEffect {
    /// Gains a stack from `grants` actions, each stack amplifying `amplifies` actions
    StackingAmplifier {
        name: String,
        initial_stacks: u8,
        max_stacks: u8,
        amp_per_stack: f64,
        amplifies: ActionSet,
        grants: ActionSet,
        /// Also amplifies the periodic proc
        amplifies_proc: bool,
    },
    /// On-hit damage as a fraction of the target's current health
    CurrentHealthOnHit {
        name: String,
        melee_ratio: f64,
        ranged_ratio: f64,
    },
    /// Fixed on-hit damage
    FlatOnHit {
        name: String,
        raw_damage: f64,
        ap_ratio: f64,
        damage_type: DamageType,
    },
    /// An ability cast arms the next on-hit
    Spellblade {
        name: String,
        base_ad_ratio: f64,
        ap_ratio: f64,
        damage_type: DamageType,
        cooldown: f64,
    },
}

/// Per-branch item state
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct ItemState {
    pub stacks: u8,
    /// Spellblade charge is armed while `time < armed_until`
    pub armed_until: f64,
    pub ready_at: f64,
}

impl ItemEffect {
    // === Presets ===

    pub fn spear_of_shojin() -> Self {
        ItemEffect::StackingAmplifier {
            name: "Spear of Shojin".to_string(),
            initial_stacks: 0,
            max_stacks: 4,
            amp_per_stack: 0.03,
            amplifies: ABILITY_HITS,
            grants: ABILITY_HITS,
            amplifies_proc: true,
        }
    }

    pub fn blade_of_the_ruined_king() -> Self {
        ItemEffect::CurrentHealthOnHit {
            name: "Blade of the Ruined King".to_string(),
            melee_ratio: 0.09,
            ranged_ratio: 0.06,
        }
    }

    pub fn wits_end() -> Self {
        ItemEffect::flat_on_hit("Wit's End", 45.0, 0.0, DamageType::Magic)
    }

    pub fn nashors_tooth() -> Self {
        ItemEffect::flat_on_hit("Nashor's Tooth", 15.0, 0.15, DamageType::Magic)
    }

    pub fn recurve_bow() -> Self {
        ItemEffect::flat_on_hit("Recurve Bow", 15.0, 0.0, DamageType::Physical)
    }

    pub fn terminus() -> Self {
        ItemEffect::flat_on_hit("Terminus", 30.0, 0.0, DamageType::Magic)
    }

    pub fn trinity_force() -> Self {
        ItemEffect::spellblade("Trinity Force", 2.0, 0.0, DamageType::Physical)
    }

    pub fn iceborn_gauntlet() -> Self {
        ItemEffect::spellblade("Iceborn Gauntlet", 1.5, 0.0, DamageType::Physical)
    }

    pub fn lich_bane() -> Self {
        ItemEffect::spellblade("Lich Bane", 0.75, 0.4, DamageType::Magic)
    }

    fn flat_on_hit(name: &str, raw_damage: f64, ap_ratio: f64, damage_type: DamageType) -> Self {
        ItemEffect::FlatOnHit {
            name: name.to_string(),
            raw_damage,
            ap_ratio,
            damage_type,
        }
    }

    fn spellblade(name: &str, base_ad_ratio: f64, ap_ratio: f64, damage_type: DamageType) -> Self {
        ItemEffect::Spellblade {
            name: name.to_string(),
            base_ad_ratio,
            ap_ratio,
            damage_type,
            cooldown: 1.5,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            ItemEffect::StackingAmplifier { name, .. }
            | ItemEffect::CurrentHealthOnHit { name, .. }
            | ItemEffect::FlatOnHit { name, .. }
            | ItemEffect::Spellblade { name, .. } => name,
        }
    }

    pub fn initial_state(&self) -> ItemState {
        match self {
            ItemEffect::StackingAmplifier {
                initial_stacks,
                max_stacks,
                ..
            } => ItemState {
                stacks: (*initial_stacks).min(*max_stacks),
                ..ItemState::default()
            },
            _ => ItemState::default(),
        }
    }

    // === Amplification ===

    /// The dynamic amplifier scales this action's damage
    pub fn applies_to(&self, action: ActionId) -> bool {
        match self {
            ItemEffect::StackingAmplifier { amplifies, .. } => amplifies.contains(action),
            _ => false,
        }
    }

    /// The dynamic amplifier scales the periodic proc
    pub fn amplifies_proc(&self) -> bool {
        matches!(
            self,
            ItemEffect::StackingAmplifier {
                amplifies_proc: true,
                ..
            }
        )
    }

    pub fn current_amp(&self, state: &ItemState) -> f64 {
        match self {
            ItemEffect::StackingAmplifier {
                max_stacks,
                amp_per_stack,
                ..
            } => state.stacks.min(*max_stacks) as f64 * amp_per_stack,
            _ => 0.0,
        }
    }

    pub fn max_amp(&self) -> f64 {
        match self {
            ItemEffect::StackingAmplifier {
                max_stacks,
                amp_per_stack,
                ..
            } => *max_stacks as f64 * amp_per_stack,
            _ => 0.0,
        }
    }

    // === On-hit procs ===

    pub fn has_on_hit(&self) -> bool {
        !matches!(self, ItemEffect::StackingAmplifier { .. })
    }

    pub fn is_armed(&self, state: &ItemState, time: f64) -> bool {
        matches!(self, ItemEffect::Spellblade { .. }) && state.armed_until > time
    }

    /// Raw on-hit proc of `action` landing at `time`
    pub fn proc_payload(
        &self,
        action: ActionId,
        state: &ItemState,
        time: f64,
        stats: &StatBlock,
        target_current_hp: f64,
    ) -> Option<DamagePayload> {
        if !action.is_on_hit() {
            return None;
        }
        match self {
            ItemEffect::StackingAmplifier { .. } => None,
            ItemEffect::CurrentHealthOnHit {
                melee_ratio,
                ranged_ratio,
                ..
            } => {
                let ratio = if stats.is_melee { melee_ratio } else { ranged_ratio };
                Some(DamagePayload::new(
                    ratio * target_current_hp.max(0.0),
                    DamageType::Physical,
                ))
            }
            ItemEffect::FlatOnHit {
                raw_damage,
                ap_ratio,
                damage_type,
                ..
            } => Some(DamagePayload::new(
                raw_damage + ap_ratio * stats.total_ap(),
                *damage_type,
            )),
            ItemEffect::Spellblade {
                base_ad_ratio,
                ap_ratio,
                damage_type,
                ..
            } => self.is_armed(state, time).then(|| {
                DamagePayload::new(
                    base_ad_ratio * stats.base_ad() + ap_ratio * stats.total_ap(),
                    *damage_type,
                )
            }),
        }
    }

    /// Largest raw proc any single on-hit can produce against a target of `target_max_hp`
    pub fn max_proc_raw(&self, stats: &StatBlock, target_max_hp: f64) -> f64 {
        match self {
            ItemEffect::StackingAmplifier { .. } => 0.0,
            ItemEffect::CurrentHealthOnHit {
                melee_ratio,
                ranged_ratio,
                ..
            } => {
                let ratio = if stats.is_melee { melee_ratio } else { ranged_ratio };
                ratio * target_max_hp
            }
            ItemEffect::FlatOnHit {
                raw_damage,
                ap_ratio,
                ..
            } => raw_damage + ap_ratio * stats.total_ap(),
            ItemEffect::Spellblade {
                base_ad_ratio,
                ap_ratio,
                ..
            } => base_ad_ratio * stats.base_ad() + ap_ratio * stats.total_ap(),
        }
    }

    pub fn proc_damage_type(&self) -> Option<DamageType> {
        match self {
            ItemEffect::StackingAmplifier { .. } => None,
            ItemEffect::CurrentHealthOnHit { .. } => Some(DamageType::Physical),
            ItemEffect::FlatOnHit { damage_type, .. }
            | ItemEffect::Spellblade { damage_type, .. } => Some(*damage_type),
        }
    }

    pub fn spellblade_cooldown(&self) -> Option<f64> {
        match self {
            ItemEffect::Spellblade { cooldown, .. } => Some(*cooldown),
            _ => None,
        }
    }

    // === State updates ===

    /// Update state after `action`'s damage landed at `time`; true when a stack was granted
    pub fn on_action(&self, action: ActionId, state: &mut ItemState, time: f64) -> bool {
        match self {
            ItemEffect::StackingAmplifier {
                max_stacks, grants, ..
            } => {
                if grants.contains(action) {
                    state.stacks = (state.stacks + 1).min(*max_stacks);
                    return true;
                }
                false
            }
            ItemEffect::Spellblade { cooldown, .. } => {
                if action.is_on_hit() && self.is_armed(state, time) {
                    state.armed_until = 0.0;
                    state.ready_at = time + cooldown;
                }
                if action.is_ability_cast() && !self.is_armed(state, time) && state.ready_at <= time
                {
                    state.armed_until = time + SPELLBLADE_WINDOW;
                }
                false
            }
            ItemEffect::CurrentHealthOnHit { .. } | ItemEffect::FlatOnHit { .. } => false,
        }
    }
}

impl FromStr for ItemEffect {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_ascii_lowercase();
        match key.as_str() {
            "spearofshojin" | "shojin" => Ok(ItemEffect::spear_of_shojin()),
            "bladeoftheruinedking" | "botrk" => Ok(ItemEffect::blade_of_the_ruined_king()),
            "witsend" => Ok(ItemEffect::wits_end()),
            "nashorstooth" => Ok(ItemEffect::nashors_tooth()),
            "recurvebow" => Ok(ItemEffect::recurve_bow()),
            "terminus" => Ok(ItemEffect::terminus()),
            "trinityforce" | "triforce" => Ok(ItemEffect::trinity_force()),
            "iceborngauntlet" => Ok(ItemEffect::iceborn_gauntlet()),
            "lichbane" => Ok(ItemEffect::lich_bane()),
            _ => Err(format!("unknown item '{}'", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kit::{AbilityRanks, Kit};

    fn stats() -> StatBlock {
        Kit::duelist(AbilityRanks::default()).unwrap().stats_at(9)
    }

    #[test]
    fn test_shojin_stacks_cap() {
        let shojin = ItemEffect::spear_of_shojin();
        let mut state = shojin.initial_state();
        for i in 0..6 {
            assert!(shojin.on_action(ActionId::Q, &mut state, i as f64));
        }
        assert_eq!(state.stacks, 4);
        assert!((shojin.current_amp(&state) - 0.12).abs() < 1e-12);
    }

    #[test]
    fn test_shojin_scope() {
        let shojin = ItemEffect::spear_of_shojin();
        let mut state = shojin.initial_state();
        assert!(!shojin.on_action(ActionId::AutoAttack, &mut state, 0.0));
        assert!(!shojin.applies_to(ActionId::AutoAttack));
        assert!(shojin.applies_to(ActionId::ECrit));
        assert!(shojin.amplifies_proc());
    }

    #[test]
    fn test_botrk_uses_current_health() {
        let botrk = ItemEffect::blade_of_the_ruined_king();
        let state = botrk.initial_state();
        let payload = botrk
            .proc_payload(ActionId::AutoAttack, &state, 0.0, &stats(), 1500.0)
            .unwrap();
        assert!((payload.raw_damage - 135.0).abs() < 1e-9);
        assert!(botrk
            .proc_payload(ActionId::W, &state, 0.0, &stats(), 1500.0)
            .is_none());
    }

    #[test]
    fn test_spellblade_cycle() {
        let trinity = ItemEffect::trinity_force();
        let stats = stats();
        let mut state = trinity.initial_state();

        // Unarmed: no proc
        assert!(trinity
            .proc_payload(ActionId::AutoAttack, &state, 0.0, &stats, 1000.0)
            .is_none());

        trinity.on_action(ActionId::W, &mut state, 0.5);
        let payload = trinity
            .proc_payload(ActionId::AutoAttack, &state, 1.0, &stats, 1000.0)
            .unwrap();
        assert!((payload.raw_damage - 2.0 * stats.base_ad()).abs() < 1e-9);

        trinity.on_action(ActionId::AutoAttack, &mut state, 1.0);
        assert!(!trinity.is_armed(&state, 1.0));

        // Cast during the cooldown does not arm
        trinity.on_action(ActionId::EActivate, &mut state, 2.0);
        assert!(!trinity.is_armed(&state, 2.1));
        trinity.on_action(ActionId::EActivate, &mut state, 2.5);
        assert!(trinity.is_armed(&state, 2.6));
    }

    #[test]
    fn test_parse_items() {
        assert_eq!("Spear of Shojin".parse::<ItemEffect>().unwrap().name(), "Spear of Shojin");
        assert_eq!("wits_end".parse::<ItemEffect>().unwrap().name(), "Wit's End");
        assert!("infinity edge".parse::<ItemEffect>().is_err());
    }
}
