//! Damage calculation - turning a payload + stats into mitigated damage

use super::{total_multiplier, DamageError, DamageModifier, DamagePayload, Payload};
use crate::defense::{mitigate, Target};
use crate::stat_block::StatBlock;
use crate::types::DamageType;
use serde::{Deserialize, Serialize};

/// Breakdown of one mitigated hit
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DamageResult {
    pub raw_damage: f64,
    /// Damage type after adaptive resolution
    pub damage_type: DamageType,
    pub effective_resistance: f64,
    /// Damage after resistances, before modifiers
    pub post_mitigation: f64,
    pub total_multiplier: f64,
    /// Final damage dealt
    pub damage: f64,
    pub heal: f64,
}

/// Calculate the damage a payload deals to `target`
pub fn calculate_damage(
    payload: &Payload,
    target: &Target,
    attacker: &StatBlock,
    modifiers: &[DamageModifier],
) -> Result<DamageResult, DamageError> {
    match payload {
        Payload::Damage(payload) => {
            mitigate_payload(payload, target, attacker, total_multiplier(modifiers))
        }
        Payload::Unavailable { reason } => Err(DamageError::Unavailable { reason: *reason }),
    }
}

/// Mitigate an available payload and scale it by a precomputed multiplier
pub fn mitigate_payload(
    payload: &DamagePayload,
    target: &Target,
    attacker: &StatBlock,
    multiplier: f64,
) -> Result<DamageResult, DamageError> {
    // Step 1: Resolve adaptive damage against the attacker's bonus stats
    let damage_type = payload
        .damage_type
        .resolve(attacker.bonus_ad(), attacker.bonus_ap());

    // Step 2: Effective resistance after reduction and penetration
    let effective_resistance = target.effective_resistance(damage_type, attacker);

    // Step 3: Mitigate
    let post_mitigation = mitigate(payload.raw_damage, damage_type, effective_resistance)?;

    // Step 4: Multiplicative modifiers
    Ok(DamageResult {
        raw_damage: payload.raw_damage,
        damage_type,
        effective_resistance,
        post_mitigation,
        total_multiplier: multiplier,
        damage: post_mitigation * multiplier,
        heal: payload.heal,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::defense::PenetrationProfile;
    use crate::stat_block::{AttackSpeed, Stat};

    fn attacker() -> StatBlock {
        StatBlock {
            level: 1,
            is_melee: true,
            attack_damage: Stat::flat(100.0),
            ability_power: Stat::flat(0.0),
            health: Stat::flat(1000.0),
            armor: Stat::flat(30.0),
            magic_resist: Stat::flat(30.0),
            penetration: PenetrationProfile::default(),
            attack_speed: AttackSpeed {
                base: 1.0,
                ratio: 1.0,
                growth: 0.0,
                bonus: 0.0,
                cap: 2.5,
                windup_fraction: 0.2,
            },
            crit_chance: 0.0,
            crit_damage: 1.75,
            life_steal: 0.0,
            omnivamp: 0.0,
            health_regen: 0.0,
        }
    }

    #[test]
    fn test_unavailable_payload() {
        let target = Target::new(1000.0, 50.0, 50.0).unwrap();
        let payload = Payload::Unavailable {
            reason: "not learned",
        };
        let result = calculate_damage(&payload, &target, &attacker(), &[]);
        assert!(matches!(result, Err(DamageError::Unavailable { .. })));
    }

    #[test]
    fn test_adaptive_resolves_to_magic() {
        let mut stats = attacker();
        stats.ability_power.bonus = 50.0;
        let target = Target::new(1000.0, 100.0, 0.0).unwrap();
        let payload = Payload::Damage(DamagePayload::new(100.0, DamageType::Adaptive));

        let result = calculate_damage(&payload, &target, &stats, &[]).unwrap();
        assert_eq!(result.damage_type, DamageType::Magic);
        assert!((result.damage - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_modifiers_scale_post_mitigation() {
        let target = Target::new(1000.0, 100.0, 0.0).unwrap();
        let payload = Payload::Damage(DamagePayload::new(200.0, DamageType::Physical));
        let mods = [DamageModifier::new("amp", 0.1)];

        let result = calculate_damage(&payload, &target, &attacker(), &mods).unwrap();
        assert!((result.post_mitigation - 100.0).abs() < 1e-9);
        assert!((result.damage - 110.0).abs() < 1e-9);
    }
}
