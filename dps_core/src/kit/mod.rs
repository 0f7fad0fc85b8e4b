//! Kit - The action catalog of a configured combatant
//!
//! A kit pairs a [`KitConfig`] with learned ability ranks. It produces the
//! timing descriptor and raw damage payload of every action.

mod descriptor;

pub use descriptor::{ActionDescriptor, Timing};

use crate::config::{default_kit, AbilityConfig, ConfigError, KitConfig};
use crate::damage::{DamagePayload, Payload};
use crate::defense::{PenetrationProfile, Target};
use crate::stat_block::StatBlock;
use crate::types::{ActionId, DamageType};
use serde::{Deserialize, Serialize};

/// Highest supported champion level
pub const MAX_LEVEL: u32 = 18;

/// Ability slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Slot {
    Q,
    W,
    E,
    R,
}

impl Slot {
    pub const ALL: [Slot; 4] = [Slot::Q, Slot::W, Slot::E, Slot::R];

    pub fn index(self) -> usize {
        self as usize
    }

    /// Slot whose rank and cooldown govern `action`
    pub fn of(action: ActionId) -> Option<Slot> {
        match action {
            ActionId::Q => Some(Slot::Q),
            ActionId::W => Some(Slot::W),
            ActionId::EActivate | ActionId::EFirst | ActionId::ECrit => Some(Slot::E),
            ActionId::RActivate => Some(Slot::R),
            ActionId::AutoAttack | ActionId::Wait => None,
        }
    }

    /// Action that puts this slot on cooldown
    pub fn cast_action(self) -> ActionId {
        match self {
            Slot::Q => ActionId::Q,
            Slot::W => ActionId::W,
            Slot::E => ActionId::EActivate,
            Slot::R => ActionId::RActivate,
        }
    }
}

/// Learned rank of every ability (0 = unlearned)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AbilityRanks {
    pub q: u8,
    pub w: u8,
    pub e: u8,
    pub r: u8,
}

impl AbilityRanks {
    pub fn new(q: u8, w: u8, e: u8, r: u8) -> Self {
        AbilityRanks { q, w, e, r }
    }

    pub fn get(&self, slot: Slot) -> u8 {
        match slot {
            Slot::Q => self.q,
            Slot::W => self.w,
            Slot::E => self.e,
            Slot::R => self.r,
        }
    }

    pub fn total(&self) -> u32 {
        self.q as u32 + self.w as u32 + self.e as u32 + self.r as u32
    }
}

/// A kit configuration at fixed ranks
#[derive(Debug, Clone)]
pub struct Kit {
    config: KitConfig,
    ranks: AbilityRanks,
    descriptors: [ActionDescriptor; 8],
}

impl Kit {
    pub fn new(config: KitConfig, ranks: AbilityRanks) -> Result<Self, ConfigError> {
        config.validate()?;
        for slot in Slot::ALL {
            let ability = ability_of(&config, slot);
            if ranks.get(slot) > ability.max_rank {
                return Err(ConfigError::ValidationError(format!(
                    "{:?} rank {} exceeds max rank {}",
                    slot,
                    ranks.get(slot),
                    ability.max_rank
                )));
            }
        }
        let descriptors = ActionId::ALL.map(|id| build_descriptor(&config, &ranks, id));
        Ok(Kit {
            config,
            ranks,
            descriptors,
        })
    }

    /// The built-in duelist kit at the given ranks
    pub fn duelist(ranks: AbilityRanks) -> Result<Self, ConfigError> {
        Kit::new(default_kit()?, ranks)
    }

    pub fn config(&self) -> &KitConfig {
        &self.config
    }

    pub fn ranks(&self) -> AbilityRanks {
        self.ranks
    }

    pub fn rank(&self, slot: Slot) -> u8 {
        self.ranks.get(slot)
    }

    pub fn ability(&self, slot: Slot) -> &AbilityConfig {
        ability_of(&self.config, slot)
    }

    pub fn descriptor(&self, action: ActionId) -> &ActionDescriptor {
        &self.descriptors[action.index()]
    }

    pub fn descriptors(&self) -> &[ActionDescriptor] {
        &self.descriptors
    }

    pub fn is_learned(&self, action: ActionId) -> bool {
        self.descriptor(action).is_learned()
    }

    /// Cooldown of a slot at its current rank
    pub fn cooldown(&self, slot: Slot) -> Option<f64> {
        self.ability(slot).cooldown(self.rank(slot))
    }

    /// Check that the ranks are reachable at `level`
    pub fn validate_level(&self, level: u32) -> Result<(), ConfigError> {
        if level == 0 || level > MAX_LEVEL {
            return Err(ConfigError::ValidationError(format!(
                "level must lie in [1, {}], got {}",
                MAX_LEVEL, level
            )));
        }
        if self.ranks.total() > level {
            return Err(ConfigError::ValidationError(format!(
                "{} ability ranks exceed level {}",
                self.ranks.total(),
                level
            )));
        }
        for slot in Slot::ALL {
            let rank = self.rank(slot);
            if rank == 0 {
                continue;
            }
            let unlocks = &self.ability(slot).unlock_levels;
            if let Some(required) = unlocks.get(rank as usize - 1) {
                if level < *required {
                    return Err(ConfigError::ValidationError(format!(
                        "{:?} rank {} requires level {}, got {}",
                        slot, rank, required, level
                    )));
                }
            }
        }
        Ok(())
    }

    /// Base stats at `level` with no bonuses
    pub fn stats_at(&self, level: u32) -> StatBlock {
        let base = &self.config.stats;
        StatBlock {
            level,
            is_melee: self.config.is_melee,
            attack_damage: base.attack_damage,
            ability_power: base.ability_power,
            health: base.health,
            armor: base.armor,
            magic_resist: base.magic_resist,
            penetration: PenetrationProfile::default(),
            attack_speed: self.config.attack_speed,
            crit_chance: 0.0,
            crit_damage: self.config.basic_attack.crit_damage,
            life_steal: 0.0,
            omnivamp: 0.0,
            health_regen: base.health_regen,
        }
    }

    /// Bonus attack speed while empowered attacks remain
    pub fn empowered_attack_speed(&self) -> f64 {
        AbilityConfig::at_rank(&self.config.e.bonus_attack_speed, self.ranks.e)
    }

    pub fn empower_duration(&self) -> f64 {
        self.config.empower.duration
    }

    pub fn empower_charges(&self) -> u8 {
        self.config.empower.charges
    }

    pub fn vital_enabled(&self) -> bool {
        self.config.vital.enabled
    }

    pub fn vital_respawn_delay(&self) -> f64 {
        self.config.vital.respawn_delay
    }

    pub fn ult_reveal_delay(&self) -> f64 {
        self.config.vital.ult_reveal_delay
    }

    pub fn ult_vital_count(&self) -> u8 {
        self.config.vital.ult_count
    }

    /// Raw payload of an action
    pub fn payload(&self, action: ActionId, stats: &StatBlock) -> Payload {
        if !self.is_learned(action) {
            return Payload::Unavailable {
                reason: "ability not learned",
            };
        }
        match action {
            ActionId::AutoAttack | ActionId::EFirst => Payload::Damage(DamagePayload::new(
                stats.total_ad() * stats.expected_crit_multiplier(),
                DamageType::Physical,
            )),
            ActionId::Q => self.ability_payload(Slot::Q, stats),
            ActionId::W => self.ability_payload(Slot::W, stats),
            ActionId::ECrit => self.ability_payload(Slot::E, stats),
            ActionId::EActivate | ActionId::RActivate | ActionId::Wait => {
                Payload::Damage(DamagePayload::none())
            }
        }
    }

    /// Periodic proc: percent max HP true damage plus a level-scaled heal
    pub fn vital_payload(&self, stats: &StatBlock, target: &Target) -> Payload {
        let vital = &self.config.vital;
        if !vital.enabled {
            return Payload::Unavailable {
                reason: "vitals disabled",
            };
        }
        let ratio = vital.max_hp_ratio + vital.bonus_ad_ratio * stats.bonus_ad() / 100.0;
        Payload::Damage(
            DamagePayload::new(ratio * target.max_hp, DamageType::True)
                .with_heal(self.vital_heal(stats.level)),
        )
    }

    pub fn vital_heal(&self, level: u32) -> f64 {
        let vital = &self.config.vital;
        let per_level = (vital.heal_max - vital.heal_min) / (vital.heal_max_level - 1) as f64;
        vital.heal_min + per_level * level.saturating_sub(1) as f64
    }

    fn ability_payload(&self, slot: Slot, stats: &StatBlock) -> Payload {
        let ability = self.ability(slot);
        let rank = self.rank(slot);
        let raw = AbilityConfig::at_rank(&ability.base_damage, rank)
            + AbilityConfig::at_rank(&ability.bonus_ad_ratio, rank) * stats.bonus_ad()
            + AbilityConfig::at_rank(&ability.total_ad_ratio, rank) * stats.total_ad()
            + AbilityConfig::at_rank(&ability.ap_ratio, rank) * stats.total_ap();
        Payload::Damage(DamagePayload::new(raw, ability.damage_type))
    }
}

fn ability_of(config: &KitConfig, slot: Slot) -> &AbilityConfig {
    match slot {
        Slot::Q => &config.q,
        Slot::W => &config.w,
        Slot::E => &config.e,
        Slot::R => &config.r,
    }
}

fn build_descriptor(config: &KitConfig, ranks: &AbilityRanks, id: ActionId) -> ActionDescriptor {
    let slot = Slot::of(id);
    let cooldown = match (id, slot) {
        (ActionId::AutoAttack | ActionId::Wait, _) => Some(0.0),
        (ActionId::EFirst | ActionId::ECrit, Some(slot)) => {
            (ranks.get(slot) > 0).then_some(0.0)
        }
        (_, Some(slot)) => ability_of(config, slot).cooldown(ranks.get(slot)),
        (_, None) => None,
    };
    let timing = match id {
        ActionId::AutoAttack | ActionId::EFirst | ActionId::ECrit => Timing::Attack,
        ActionId::Q => Timing::Fixed {
            lock: config.q.cast_time,
            hit_delay: config.q.hit_delay,
        },
        ActionId::W => Timing::Fixed {
            lock: config.w.cast_time,
            hit_delay: config.w.hit_delay,
        },
        ActionId::EActivate | ActionId::RActivate | ActionId::Wait => Timing::Instant,
    };
    let priority = match id {
        ActionId::AutoAttack | ActionId::EFirst | ActionId::ECrit => config.basic_attack.priority,
        ActionId::Q => config.q.priority,
        ActionId::W => config.w.priority,
        ActionId::EActivate => config.e.priority,
        ActionId::RActivate => config.r.priority,
        ActionId::Wait => u8::MAX,
    };
    ActionDescriptor {
        id,
        timing,
        cooldown,
        priority,
        resets_attack: matches!(id, ActionId::Q | ActionId::EActivate),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_ranks() -> AbilityRanks {
        AbilityRanks::new(5, 5, 5, 3)
    }

    #[test]
    fn test_unlearned_ability_is_unavailable() {
        let kit = Kit::duelist(AbilityRanks::new(1, 0, 0, 0)).unwrap();
        let stats = kit.stats_at(1);
        assert!(!kit.payload(ActionId::W, &stats).is_available());
        assert!(!kit.payload(ActionId::ECrit, &stats).is_available());
        assert!(kit.payload(ActionId::Q, &stats).is_available());
        assert_eq!(kit.descriptor(ActionId::W).cooldown, None);
    }

    #[test]
    fn test_q_payload_scales_with_bonus_ad() {
        let kit = Kit::duelist(full_ranks()).unwrap();
        let mut stats = kit.stats_at(18);
        stats.attack_damage.bonus = 100.0;
        let payload = *kit.payload(ActionId::Q, &stats).damage().unwrap();
        assert!((payload.raw_damage - (110.0 + 1.1 * 100.0)).abs() < 1e-9);
        assert_eq!(payload.damage_type, DamageType::Physical);
    }

    #[test]
    fn test_e_crit_uses_rank_multiplier() {
        let kit = Kit::duelist(AbilityRanks::new(0, 0, 3, 0)).unwrap();
        let mut stats = kit.stats_at(5);

        // Guaranteed crit whatever the baseline crit chance
        stats.crit_chance = 0.0;
        let e_never = *kit.payload(ActionId::ECrit, &stats).damage().unwrap();
        let aa_never = *kit.payload(ActionId::AutoAttack, &stats).damage().unwrap();
        stats.crit_chance = 1.0;
        let e_always = *kit.payload(ActionId::ECrit, &stats).damage().unwrap();
        let aa_always = *kit.payload(ActionId::AutoAttack, &stats).damage().unwrap();

        assert!((e_never.raw_damage - stats.total_ad() * 1.8).abs() < 1e-9);
        assert!((e_always.raw_damage - e_never.raw_damage).abs() < 1e-9);
        assert!((aa_never.raw_damage - stats.total_ad()).abs() < 1e-9);
        assert!((aa_always.raw_damage - stats.total_ad() * stats.crit_damage).abs() < 1e-9);
    }

    #[test]
    fn test_vital_heal_by_level() {
        let kit = Kit::duelist(full_ranks()).unwrap();
        assert!((kit.vital_heal(1) - 35.0).abs() < 1e-9);
        assert!((kit.vital_heal(20) - 107.65).abs() < 1e-9);
    }

    #[test]
    fn test_vital_damage_ratio() {
        let kit = Kit::duelist(full_ranks()).unwrap();
        let mut stats = kit.stats_at(11);
        stats.attack_damage.bonus = 50.0;
        let target = Target::new(2000.0, 80.0, 50.0).unwrap();
        let payload = *kit.vital_payload(&stats, &target).damage().unwrap();
        assert!((payload.raw_damage - 0.05 * 2000.0).abs() < 1e-9);
        assert_eq!(payload.damage_type, DamageType::True);
    }

    #[test]
    fn test_level_validation() {
        let kit = Kit::duelist(AbilityRanks::new(1, 1, 1, 1)).unwrap();
        assert!(kit.validate_level(5).is_err());
        assert!(kit.validate_level(6).is_ok());

        let kit = Kit::duelist(AbilityRanks::new(3, 1, 1, 0)).unwrap();
        assert!(kit.validate_level(4).is_err());
        assert!(kit.validate_level(5).is_ok());
    }

    #[test]
    fn test_rank_above_max_rejected() {
        assert!(Kit::duelist(AbilityRanks::new(6, 0, 0, 0)).is_err());
        assert!(Kit::duelist(AbilityRanks::new(0, 0, 0, 4)).is_err());
    }

    #[test]
    fn test_descriptors() {
        let kit = Kit::duelist(full_ranks()).unwrap();
        let q = kit.descriptor(ActionId::Q);
        assert!(q.resets_attack);
        assert_eq!(q.cooldown, Some(6.0));
        assert!((q.hit_delay(0.3) - 0.25).abs() < 1e-9);

        let aa = kit.descriptor(ActionId::AutoAttack);
        assert!((aa.lock(0.3) - 0.3).abs() < 1e-9);
        assert_eq!(kit.descriptor(ActionId::EFirst).cooldown, Some(0.0));
    }
}
