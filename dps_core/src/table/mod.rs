//! Damage table - Mitigated damage memoized per (source, condition)
//!
//! Everything that stays fixed during one optimizer call is baked in here:
//! resistances, penetration, static modifiers and the keystone condition.
//! Dynamic amplifiers (item stacks) are multiplied in at lookup time.

use crate::damage::{mitigate_payload, total_multiplier, DamageError, DamageModifier, DamagePayload, Payload};
use crate::defense::Target;
use crate::kit::Kit;
use crate::source::Keystone;
use crate::stat_block::StatBlock;
use crate::types::{ActionId, DamageType};
use serde::Serialize;
use tracing::debug;

/// Keystone-driven damage condition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Condition {
    Base,
    /// Target is exposed (+8% damage taken)
    Exposed,
    /// Conqueror at max stacks
    FullyStacked,
}

impl Condition {
    pub const ALL: [Condition; 3] = [Condition::Base, Condition::Exposed, Condition::FullyStacked];
    pub const COUNT: usize = 3;

    pub fn index(self) -> usize {
        self as usize
    }
}

/// Damage source with a table entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum DamageSource {
    AutoAttack,
    Q,
    W,
    ECrit,
    Vital,
    KeystoneProc,
}

impl DamageSource {
    pub const ALL: [DamageSource; 6] = [
        DamageSource::AutoAttack,
        DamageSource::Q,
        DamageSource::W,
        DamageSource::ECrit,
        DamageSource::Vital,
        DamageSource::KeystoneProc,
    ];
    pub const COUNT: usize = 6;

    pub fn index(self) -> usize {
        self as usize
    }

    /// Source whose entry an action deals
    pub fn of_action(action: ActionId) -> Option<DamageSource> {
        match action {
            ActionId::AutoAttack | ActionId::EFirst => Some(DamageSource::AutoAttack),
            ActionId::Q => Some(DamageSource::Q),
            ActionId::W => Some(DamageSource::W),
            ActionId::ECrit => Some(DamageSource::ECrit),
            ActionId::EActivate | ActionId::RActivate | ActionId::Wait => None,
        }
    }
}

/// Mitigated damage of one source under one condition
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TableEntry {
    pub damage: f64,
    pub damage_type: DamageType,
    pub heal: f64,
}

#[derive(Debug, Clone)]
pub struct DamageTable {
    entries: [[Option<TableEntry>; DamageSource::COUNT]; Condition::COUNT],
    /// Damage of one raw point per condition and resolved damage type
    unit: [[f64; 3]; Condition::COUNT],
    built: [bool; Condition::COUNT],
    static_multiplier: f64,
    bonus_ad: f64,
    bonus_ap: f64,
}

impl DamageTable {
    /// Build the table for one optimizer call
    ///
    /// Condition stat adjustments are applied to `stats` through a scoped
    /// delta and undone before returning, including on error.
    pub fn build(
        kit: &Kit,
        stats: &mut StatBlock,
        target: &Target,
        keystone: Option<Keystone>,
        static_modifiers: &[DamageModifier],
    ) -> Result<Self, DamageError> {
        let static_multiplier = total_multiplier(static_modifiers);
        let conditions: &[Condition] = match keystone {
            Some(keystone) => keystone.conditions(),
            None => &[Condition::Base],
        };

        let mut table = DamageTable {
            entries: [[None; DamageSource::COUNT]; Condition::COUNT],
            unit: [[0.0; 3]; Condition::COUNT],
            built: [false; Condition::COUNT],
            static_multiplier,
            bonus_ad: stats.bonus_ad(),
            bonus_ap: stats.bonus_ap(),
        };

        for &condition in conditions {
            let (amp, delta) = match keystone {
                Some(keystone) => (
                    keystone.condition_amp(condition),
                    keystone.condition_delta(condition, stats.level),
                ),
                None => (0.0, Default::default()),
            };
            let multiplier = static_multiplier * (1.0 + amp);
            let guard = stats.scoped(delta);

            for source in DamageSource::ALL {
                let payload = match source {
                    DamageSource::AutoAttack => kit.payload(ActionId::AutoAttack, &guard),
                    DamageSource::Q => kit.payload(ActionId::Q, &guard),
                    DamageSource::W => kit.payload(ActionId::W, &guard),
                    DamageSource::ECrit => kit.payload(ActionId::ECrit, &guard),
                    DamageSource::Vital => kit.vital_payload(&guard, target),
                    DamageSource::KeystoneProc => keystone
                        .and_then(|k| k.proc_payload(&guard))
                        .map(Payload::Damage)
                        .unwrap_or(Payload::Unavailable {
                            reason: "no keystone proc",
                        }),
                };
                if let Payload::Damage(payload) = payload {
                    let result = mitigate_payload(&payload, target, &guard, multiplier)?;
                    table.entries[condition.index()][source.index()] = Some(TableEntry {
                        damage: result.damage,
                        damage_type: result.damage_type,
                        heal: result.heal,
                    });
                }
            }

            for damage_type in [DamageType::Physical, DamageType::Magic, DamageType::True] {
                let unit = DamagePayload::new(1.0, damage_type);
                table.unit[condition.index()][damage_type.resolved_index()] =
                    mitigate_payload(&unit, target, &guard, multiplier)?.damage;
            }
            table.built[condition.index()] = true;

            debug!(
                ?condition,
                auto_attack = table.damage(DamageSource::AutoAttack, condition),
                q = table.damage(DamageSource::Q, condition),
                w = table.damage(DamageSource::W, condition),
                e_crit = table.damage(DamageSource::ECrit, condition),
                vital = table.damage(DamageSource::Vital, condition),
                "damage table condition built"
            );
        }

        Ok(table)
    }

    pub fn get(&self, source: DamageSource, condition: Condition) -> Option<&TableEntry> {
        let condition = self.resolve(condition);
        self.entries[condition.index()][source.index()].as_ref()
    }

    /// Damage of `source` under `condition` (zero when unavailable)
    pub fn damage(&self, source: DamageSource, condition: Condition) -> f64 {
        self.get(source, condition).map_or(0.0, |entry| entry.damage)
    }

    pub fn action_entry(&self, action: ActionId, condition: Condition) -> Option<&TableEntry> {
        DamageSource::of_action(action).and_then(|source| self.get(source, condition))
    }

    /// Mitigate a dynamic raw payload under `condition`
    pub fn mitigate_dynamic(&self, payload: &DamagePayload, condition: Condition) -> f64 {
        let condition = self.resolve(condition);
        let damage_type = payload.damage_type.resolve(self.bonus_ad, self.bonus_ap);
        payload.raw_damage * self.unit[condition.index()][damage_type.resolved_index()]
    }

    /// Damage type a dynamic payload resolves to
    pub fn resolve_type(&self, damage_type: DamageType) -> DamageType {
        damage_type.resolve(self.bonus_ad, self.bonus_ap)
    }

    /// Largest damage of `source` over the built conditions
    pub fn max_damage(&self, source: DamageSource) -> f64 {
        self.built_conditions()
            .map(|c| self.damage(source, c))
            .fold(0.0, f64::max)
    }

    /// Largest unit multiplier for a damage type over the built conditions
    pub fn max_unit(&self, damage_type: DamageType) -> f64 {
        let index = self.resolve_type(damage_type).resolved_index();
        self.built_conditions()
            .map(|c| self.unit[c.index()][index])
            .fold(0.0, f64::max)
    }

    pub fn static_multiplier(&self) -> f64 {
        self.static_multiplier
    }

    pub fn built_conditions(&self) -> impl Iterator<Item = Condition> + '_ {
        Condition::ALL
            .into_iter()
            .filter(move |c| self.built[c.index()])
    }

    fn resolve(&self, condition: Condition) -> Condition {
        if self.built[condition.index()] {
            condition
        } else {
            Condition::Base
        }
    }
}
