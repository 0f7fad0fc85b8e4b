//! Keystone - The single selected rune that drives the damage condition

use super::level_scale;
use crate::damage::DamagePayload;
use crate::stat_block::{StatBlock, StatDelta};
use crate::table::Condition;
use crate::types::{ActionId, DamageType};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// === Press the Attack ===
pub const PTA_HITS_TO_PROC: u8 = 3;
pub const PTA_EXPOSURE_AMP: f64 = 0.08;

// === Conqueror ===
pub const CONQUEROR_MAX_STACKS: u8 = 12;
pub const CONQUEROR_STACKS_PER_ACTION: u8 = 2;

// === Hail of Blades ===
pub const HOB_STACKS: u8 = 2;
pub const HOB_DURATION: f64 = 3.0;
pub const HOB_COOLDOWN: f64 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Keystone {
    /// Third consecutive on-hit deals adaptive damage and exposes the target
    PressTheAttack,
    /// Stacks on damage; at max stacks grants bonus AD and heals
    Conqueror,
    /// First on-hit grants a burst of attack speed that can exceed the cap
    HailOfBlades,
    /// First on-hit deals bonus magic damage based on own max health
    GraspOfTheUndying,
}

/// Per-branch keystone state
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct KeystoneState {
    /// On-hit counter (Press the Attack)
    pub hits: u8,
    /// Current stacks (Conqueror, Hail of Blades)
    pub stacks: u8,
    pub exposed: bool,
    pub active_until: f64,
    pub ready_at: f64,
    /// One-shot proc already consumed (Grasp)
    pub spent: bool,
}

/// What the keystone contributed to one action
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct KeystoneTrigger {
    /// The keystone proc lands on this action
    pub proc: bool,
    /// Fraction of the action's total damage healed
    pub heal_fraction: f64,
}

impl Keystone {
    pub const ALL: [Keystone; 4] = [
        Keystone::PressTheAttack,
        Keystone::Conqueror,
        Keystone::HailOfBlades,
        Keystone::GraspOfTheUndying,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Keystone::PressTheAttack => "Press the Attack",
            Keystone::Conqueror => "Conqueror",
            Keystone::HailOfBlades => "Hail of Blades",
            Keystone::GraspOfTheUndying => "Grasp of the Undying",
        }
    }

    /// Conditions this keystone can put the damage table in
    pub fn conditions(&self) -> &'static [Condition] {
        match self {
            Keystone::PressTheAttack => &[Condition::Base, Condition::Exposed],
            Keystone::Conqueror => &[Condition::Base, Condition::FullyStacked],
            Keystone::HailOfBlades | Keystone::GraspOfTheUndying => &[Condition::Base],
        }
    }

    /// Condition implied by the current state
    pub fn condition(&self, state: &KeystoneState) -> Condition {
        match self {
            Keystone::PressTheAttack if state.exposed => Condition::Exposed,
            Keystone::Conqueror if state.stacks >= CONQUEROR_MAX_STACKS => {
                Condition::FullyStacked
            }
            _ => Condition::Base,
        }
    }

    /// Damage amplifier active under `condition`
    pub fn condition_amp(&self, condition: Condition) -> f64 {
        match (self, condition) {
            (Keystone::PressTheAttack, Condition::Exposed) => PTA_EXPOSURE_AMP,
            _ => 0.0,
        }
    }

    /// Stat adjustment active under `condition`
    pub fn condition_delta(&self, condition: Condition, level: u32) -> StatDelta {
        match (self, condition) {
            (Keystone::Conqueror, Condition::FullyStacked) => {
                StatDelta::bonus_ad(conqueror_bonus_ad(level, CONQUEROR_MAX_STACKS))
            }
            _ => StatDelta::default(),
        }
    }

    /// Raw proc payload, if this keystone deals damage
    pub fn proc_payload(&self, stats: &StatBlock) -> Option<DamagePayload> {
        match self {
            Keystone::PressTheAttack => Some(DamagePayload::new(
                level_scale(40.0, 174.12, stats.level),
                DamageType::Adaptive,
            )),
            Keystone::GraspOfTheUndying => {
                let (damage_pct, heal_pct) = if stats.is_melee {
                    (0.035, 0.013)
                } else {
                    (0.014, 0.0052)
                };
                let max_health = stats.max_health();
                Some(
                    DamagePayload::new(max_health * damage_pct, DamageType::Magic)
                        .with_heal(max_health * heal_pct),
                )
            }
            Keystone::Conqueror | Keystone::HailOfBlades => None,
        }
    }

    /// Proc can still land in this branch
    pub fn proc_pending(&self, state: &KeystoneState) -> bool {
        match self {
            Keystone::PressTheAttack => !state.exposed,
            Keystone::GraspOfTheUndying => !state.spent,
            Keystone::Conqueror | Keystone::HailOfBlades => false,
        }
    }

    /// Temporary bonus attack speed at `time`
    pub fn extra_attack_speed(&self, state: &KeystoneState, time: f64, is_melee: bool) -> f64 {
        match self {
            Keystone::HailOfBlades if state.stacks > 0 && state.active_until > time => {
                hail_of_blades_attack_speed(is_melee)
            }
            _ => 0.0,
        }
    }

    /// Attack speed bonus may exceed the cap
    pub fn ignores_attack_speed_cap(&self, state: &KeystoneState, time: f64) -> bool {
        matches!(self, Keystone::HailOfBlades) && state.stacks > 0 && state.active_until > time
    }

    /// Update the state for a damaging action starting at `time`
    pub fn on_action(
        &self,
        state: &mut KeystoneState,
        action: ActionId,
        time: f64,
        is_melee: bool,
    ) -> KeystoneTrigger {
        let mut trigger = KeystoneTrigger::default();
        match self {
            Keystone::PressTheAttack => {
                if action.is_on_hit() && !state.exposed {
                    state.hits += 1;
                    if state.hits >= PTA_HITS_TO_PROC {
                        state.exposed = true;
                        trigger.proc = true;
                    }
                }
            }
            Keystone::Conqueror => {
                if action.deals_damage() {
                    state.stacks = (state.stacks + CONQUEROR_STACKS_PER_ACTION)
                        .min(CONQUEROR_MAX_STACKS);
                    if state.stacks >= CONQUEROR_MAX_STACKS {
                        trigger.heal_fraction = if is_melee { 0.08 } else { 0.05 };
                    }
                }
            }
            Keystone::HailOfBlades => {
                if action.is_on_hit() {
                    if state.stacks > 0 && state.active_until > time {
                        state.stacks -= 1;
                    } else if state.ready_at <= time {
                        state.stacks = HOB_STACKS;
                        state.active_until = time + HOB_DURATION;
                        state.ready_at = time + HOB_COOLDOWN;
                    }
                }
            }
            Keystone::GraspOfTheUndying => {
                if action.is_on_hit() && !state.spent {
                    state.spent = true;
                    trigger.proc = true;
                }
            }
        }
        trigger
    }
}

/// Conqueror bonus AD at `stacks`
pub fn conqueror_bonus_ad(level: u32, stacks: u8) -> f64 {
    level_scale(1.08, 2.56, level) * stacks.min(CONQUEROR_MAX_STACKS) as f64
}

pub fn hail_of_blades_attack_speed(is_melee: bool) -> f64 {
    if is_melee {
        1.6
    } else {
        0.8
    }
}

impl fmt::Display for Keystone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Keystone {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_ascii_lowercase();
        match key.as_str() {
            "pta" | "presstheattack" => Ok(Keystone::PressTheAttack),
            "conq" | "conqueror" => Ok(Keystone::Conqueror),
            "hob" | "hailofblades" => Ok(Keystone::HailOfBlades),
            "grasp" | "graspoftheundying" => Ok(Keystone::GraspOfTheUndying),
            _ => Err(format!("unknown keystone '{}'", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_press_the_attack_third_hit() {
        let pta = Keystone::PressTheAttack;
        let mut state = KeystoneState::default();

        assert!(!pta.on_action(&mut state, ActionId::AutoAttack, 0.0, true).proc);
        assert!(!pta.on_action(&mut state, ActionId::W, 0.5, true).proc);
        assert!(!pta.on_action(&mut state, ActionId::Q, 1.0, true).proc);
        assert_eq!(pta.condition(&state), Condition::Base);

        assert!(pta.on_action(&mut state, ActionId::AutoAttack, 1.5, true).proc);
        assert_eq!(pta.condition(&state), Condition::Exposed);
        assert!(!pta.on_action(&mut state, ActionId::AutoAttack, 2.0, true).proc);
    }

    #[test]
    fn test_conqueror_caps_and_heals() {
        let conq = Keystone::Conqueror;
        let mut state = KeystoneState::default();
        for i in 0..5 {
            let trigger = conq.on_action(&mut state, ActionId::AutoAttack, i as f64, true);
            assert!(trigger.heal_fraction.abs() < 1e-12);
        }
        let trigger = conq.on_action(&mut state, ActionId::W, 5.0, true);
        assert_eq!(state.stacks, CONQUEROR_MAX_STACKS);
        assert!((trigger.heal_fraction - 0.08).abs() < 1e-12);

        conq.on_action(&mut state, ActionId::W, 6.0, false);
        assert_eq!(state.stacks, CONQUEROR_MAX_STACKS);
        assert_eq!(conq.condition(&state), Condition::FullyStacked);
    }

    #[test]
    fn test_conqueror_ignores_non_damaging_actions() {
        let conq = Keystone::Conqueror;
        let mut state = KeystoneState::default();
        conq.on_action(&mut state, ActionId::EActivate, 0.0, true);
        assert_eq!(state.stacks, 0);
    }

    #[test]
    fn test_hail_of_blades_window() {
        let hob = Keystone::HailOfBlades;
        let mut state = KeystoneState::default();

        hob.on_action(&mut state, ActionId::AutoAttack, 0.0, true);
        assert_eq!(state.stacks, HOB_STACKS);
        assert!((hob.extra_attack_speed(&state, 0.5, true) - 1.6).abs() < 1e-12);
        assert!(hob.ignores_attack_speed_cap(&state, 0.5));

        hob.on_action(&mut state, ActionId::AutoAttack, 0.5, true);
        hob.on_action(&mut state, ActionId::AutoAttack, 1.0, true);
        assert_eq!(state.stacks, 0);
        assert!(hob.extra_attack_speed(&state, 1.2, true).abs() < 1e-12);

        // On cooldown: no reactivation
        hob.on_action(&mut state, ActionId::AutoAttack, 4.0, true);
        assert_eq!(state.stacks, 0);
        hob.on_action(&mut state, ActionId::AutoAttack, 10.0, true);
        assert_eq!(state.stacks, HOB_STACKS);
    }

    #[test]
    fn test_grasp_once() {
        let grasp = Keystone::GraspOfTheUndying;
        let mut state = KeystoneState::default();
        assert!(!grasp.on_action(&mut state, ActionId::W, 0.0, true).proc);
        assert!(grasp.on_action(&mut state, ActionId::AutoAttack, 0.5, true).proc);
        assert!(!grasp.on_action(&mut state, ActionId::AutoAttack, 1.5, true).proc);
        assert!(!grasp.proc_pending(&state));
    }

    #[test]
    fn test_conqueror_bonus_ad() {
        assert!((conqueror_bonus_ad(1, 12) - 12.96).abs() < 1e-9);
        assert!((conqueror_bonus_ad(18, 12) - 30.72).abs() < 1e-9);
    }

    #[test]
    fn test_parse_names() {
        assert_eq!("Press the Attack".parse::<Keystone>().unwrap(), Keystone::PressTheAttack);
        assert_eq!("conqueror".parse::<Keystone>().unwrap(), Keystone::Conqueror);
        assert_eq!("hail_of_blades".parse::<Keystone>().unwrap(), Keystone::HailOfBlades);
        assert!("electrocute".parse::<Keystone>().is_err());
    }
}
