//! Single action - Mitigated damage of one action in isolation

use crate::damage::{calculate_damage, DamageError, DamageModifier, DamageResult};
use crate::defense::Target;
use crate::kit::Kit;
use crate::stat_block::StatBlock;
use crate::types::ActionId;

/// Damage of `action` against `target`
///
/// Unlearned abilities and actions without a hit report
/// [`DamageError::Unavailable`].
pub fn calculate_action(
    kit: &Kit,
    action: ActionId,
    stats: &StatBlock,
    target: &Target,
    modifiers: &[DamageModifier],
) -> Result<DamageResult, DamageError> {
    if !action.deals_damage() {
        return Err(DamageError::Unavailable {
            reason: "action deals no damage",
        });
    }
    calculate_damage(&kit.payload(action, stats), target, stats, modifiers)
}

/// Damage of one periodic proc against `target`
pub fn calculate_vital(
    kit: &Kit,
    stats: &StatBlock,
    target: &Target,
    modifiers: &[DamageModifier],
) -> Result<DamageResult, DamageError> {
    calculate_damage(&kit.vital_payload(stats, target), target, stats, modifiers)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kit::AbilityRanks;

    #[test]
    fn test_unlearned_ability_unavailable() {
        let kit = Kit::duelist(AbilityRanks::new(1, 0, 0, 0)).unwrap();
        let stats = kit.stats_at(1);
        let target = Target::new(1000.0, 30.0, 30.0).unwrap();

        assert!(calculate_action(&kit, ActionId::Q, &stats, &target, &[]).is_ok());
        assert!(matches!(
            calculate_action(&kit, ActionId::W, &stats, &target, &[]),
            Err(DamageError::Unavailable { .. })
        ));
        assert!(matches!(
            calculate_action(&kit, ActionId::Wait, &stats, &target, &[]),
            Err(DamageError::Unavailable { .. })
        ));
    }

    #[test]
    fn test_magic_ability_uses_magic_resist() {
        let kit = Kit::duelist(AbilityRanks::new(0, 1, 0, 0)).unwrap();
        let stats = kit.stats_at(1);
        let target = Target::new(1000.0, 200.0, 50.0).unwrap();

        let result = calculate_action(&kit, ActionId::W, &stats, &target, &[]).unwrap();
        assert!((result.effective_resistance - 50.0).abs() < 1e-9);
        assert!((result.damage - result.raw_damage * 100.0 / 150.0).abs() < 1e-9);
    }

    #[test]
    fn test_vital_is_true_damage() {
        let kit = Kit::duelist(AbilityRanks::default()).unwrap();
        let stats = kit.stats_at(1);
        let target = Target::new(2000.0, 300.0, 300.0).unwrap();

        let result = calculate_vital(&kit, &stats, &target, &[]).unwrap();
        assert!((result.damage - 60.0).abs() < 1e-9);
        assert!((result.heal - 35.0).abs() < 1e-9);
    }
}
