//! Integration test: Scenario -> Damage table -> Optimizer -> Timeline
//!
//! These tests drive the public API end to end on the duelist kit.

use dps_core::config::{default_kit, parse_scenario, KitConfig};
use dps_core::search::{EventNotes, Machine, UpperBound};
use dps_core::{
    calculate_combo, calculate_damage, optimize, AbilityRanks, ActionId, DamageError, DamagePayload,
    DamageTable, DamageType, ItemEffect, Keystone, Kit, Method, Payload, SearchRequest, SearchResult, StatBlock,
    StatDelta, Target,
};

/// Helper to print a separator
fn separator(title: &str) {
    println!("\n{}", "=".repeat(60));
    println!("  {}", title);
    println!("{}\n", "=".repeat(60));
}

/// Helper to print a timeline
fn print_result(result: &SearchResult) {
    println!(
        "  {} ({}): {:.1} damage, {:.1} dps, {} nodes",
        result.sequence, result.method, result.total_damage, result.dps, result.nodes_explored
    );
    for event in &result.timeline {
        let notes: Vec<_> = event.notes.labels().collect();
        println!(
            "    t={:>5.2}  {:<10} {:>8.1}  {:?}",
            event.time,
            event.action.label(),
            event.damage,
            notes
        );
    }
}

/// Kit whose basic attacks land exactly on round numbers
fn metronome_kit(vitals: bool) -> Kit {
    let mut config: KitConfig = default_kit().unwrap();
    config.attack_speed.base = 1.0;
    config.attack_speed.ratio = 1.0;
    config.attack_speed.growth = 0.0;
    config.attack_speed.cap = 2.5;
    config.attack_speed.windup_fraction = 0.1;
    config.vital.enabled = vitals;
    Kit::new(config, AbilityRanks::default()).unwrap()
}

#[test]
fn test_worked_mitigation_example() {
    separator("Worked example: 200 physical into 80 armor");

    let kit = Kit::duelist(AbilityRanks::default()).unwrap();
    let mut stats = kit.stats_at(1);
    let target = Target::new(2000.0, 80.0, 30.0).unwrap();
    let payload = Payload::Damage(DamagePayload::new(200.0, DamageType::Physical));

    let plain = calculate_damage(&payload, &target, &stats, &[]).unwrap();
    println!("  no lethality: {:.2}", plain.damage);
    assert!((plain.damage - 111.11).abs() < 0.01);

    stats.apply(&StatDelta {
        lethality: 10.0,
        ..Default::default()
    });
    let lethal = calculate_damage(&payload, &target, &stats, &[]).unwrap();
    println!("  10 lethality: {:.2}", lethal.damage);
    assert!((lethal.effective_resistance - 70.0).abs() < 1e-9);
    assert!((lethal.damage - 117.65).abs() < 0.01);
}

#[test]
fn test_negative_armor_keeps_value_under_lethality() {
    let kit = Kit::duelist(AbilityRanks::default()).unwrap();
    let mut stats = kit.stats_at(1);
    stats.penetration.armor.flat_reduction = 30.0;
    stats.penetration.armor.flat_penetration = 18.0;
    let target = Target::new(2000.0, 20.0, 30.0).unwrap();

    // 20 - 30 = -10; lethality never moves a negative value
    assert!((target.effective_resistance(DamageType::Physical, &stats) + 10.0).abs() < 1e-9);
    let payload = Payload::Damage(DamagePayload::new(90.0, DamageType::Physical));
    let result = calculate_damage(&payload, &target, &stats, &[]).unwrap();
    assert!((result.damage - 100.0).abs() < 1e-9);
}

#[test]
fn test_resistance_floor_is_an_error() {
    let kit = Kit::duelist(AbilityRanks::default()).unwrap();
    let mut stats = kit.stats_at(1);
    stats.penetration.magic.flat_reduction = 150.0;
    let target = Target::new(2000.0, 20.0, 30.0).unwrap();
    let payload = Payload::Damage(DamagePayload::new(90.0, DamageType::Magic));

    assert!(matches!(
        calculate_damage(&payload, &target, &stats, &[]),
        Err(DamageError::ResistanceOutOfRange { .. })
    ));
    // True damage ignores resistances entirely
    let payload = Payload::Damage(DamagePayload::new(90.0, DamageType::True));
    assert!(calculate_damage(&payload, &target, &stats, &[]).is_ok());
}

#[test]
fn test_exact_and_greedy_agree_on_attacks_only() {
    separator("Exact vs greedy: basic attacks only");

    let kit = metronome_kit(false);
    let stats = kit.stats_at(1);
    let target = Target::new(3000.0, 50.0, 50.0).unwrap();

    let exact = optimize(&SearchRequest::new(&kit, &stats, &target, 5.0)).unwrap();
    let greedy =
        optimize(&SearchRequest::new(&kit, &stats, &target, 5.0).with_method(Method::Greedy))
            .unwrap();
    print_result(&exact);
    print_result(&greedy);

    assert_eq!(exact.method, Method::Exact);
    assert!((exact.total_damage - greedy.total_damage).abs() < 1e-9);
    assert_eq!(exact.actions, greedy.actions);
    assert_eq!(exact.count(ActionId::AutoAttack), 5);
}

#[test]
fn test_waiting_for_vital_dominates() {
    separator("Wait dominance");

    let kit = metronome_kit(true);
    let stats = kit.stats_at(1);
    let target = Target::new(3000.0, 50.0, 50.0).unwrap();

    let waiting = optimize(&SearchRequest::new(&kit, &stats, &target, 2.45)).unwrap();
    let eager = optimize(&SearchRequest::new(&kit, &stats, &target, 2.45).with_wait(false)).unwrap();
    print_result(&waiting);
    print_result(&eager);

    assert_eq!(
        waiting.actions,
        vec![
            ActionId::AutoAttack,
            ActionId::AutoAttack,
            ActionId::Wait,
            ActionId::AutoAttack
        ]
    );
    assert_eq!(waiting.vital_procs(), 2);
    assert_eq!(eager.count(ActionId::AutoAttack), 3);
    assert_eq!(eager.vital_procs(), 1);
    assert!(waiting.total_damage > eager.total_damage);
}

#[test]
fn test_empowered_attacks_come_in_order() {
    let kit = Kit::duelist(AbilityRanks::new(2, 1, 2, 0)).unwrap();
    let mut stats = kit.stats_at(5);
    stats.apply(&StatDelta::bonus_ad(30.0));
    let target = Target::new(2200.0, 70.0, 45.0).unwrap();

    for time_limit in [4.0, 14.0] {
        let result = optimize(&SearchRequest::new(&kit, &stats, &target, time_limit)).unwrap();
        print_result(&result);

        // Every E_CRIT follows an E_FIRST of the same activation
        let mut pending = 0;
        for action in &result.actions {
            match action {
                ActionId::EActivate => pending = 2,
                ActionId::EFirst => {
                    assert_eq!(pending, 2);
                    pending = 1;
                }
                ActionId::ECrit => {
                    assert_eq!(pending, 1);
                    pending = 0;
                }
                _ => {}
            }
        }
    }
}

#[test]
fn test_bound_admissible_from_root() {
    let kit = Kit::duelist(AbilityRanks::new(3, 1, 1, 1)).unwrap();
    let mut stats = kit.stats_at(6);
    stats.apply(&StatDelta::bonus_ad(25.0));
    let target = Target::new(2400.0, 60.0, 40.0).unwrap();
    let items = ["Spear of Shojin", "Blade of the Ruined King"]
        .iter()
        .map(|name| name.parse::<ItemEffect>().unwrap())
        .collect::<Vec<_>>();

    let result = optimize(
        &SearchRequest::new(&kit, &stats, &target, 5.0)
            .with_items(&items)
            .with_keystone(Some(Keystone::PressTheAttack)),
    )
    .unwrap();

    let mut table_stats = stats.clone();
    let table = DamageTable::build(
        &kit,
        &mut table_stats,
        &target,
        Some(Keystone::PressTheAttack),
        &[],
    )
    .unwrap();
    let machine = Machine::new(
        &kit,
        &stats,
        &table,
        Some(Keystone::PressTheAttack),
        &items,
        5.0,
    );
    let bound = UpperBound::new(&machine);
    let root = machine.root(&target, false);
    assert!(bound.estimate(&root) + 1e-9 >= result.total_damage);
}

#[test]
fn test_ult_reveal_in_timeline() {
    let kit = Kit::duelist(AbilityRanks::new(1, 1, 1, 1)).unwrap();
    let stats = kit.stats_at(6);
    let target = Target::new(3000.0, 60.0, 40.0).unwrap();

    let result = optimize(&SearchRequest::new(&kit, &stats, &target, 6.0)).unwrap();
    print_result(&result);
    if result.count(ActionId::RActivate) > 0 {
        assert!(result
            .timeline
            .iter()
            .any(|e| e.notes.contains(EventNotes::ULT_REVEAL)));
        assert!(result.vital_procs() >= 2);
    }
    let cumulative = result.timeline.last().map_or(0.0, |e| e.cumulative_damage);
    assert!((cumulative - result.total_damage).abs() < 1e-6);
}

#[test]
fn test_guard_undoes_on_error_path() {
    fn failing(stats: &mut StatBlock) -> Result<f64, DamageError> {
        let guard = stats.scoped(StatDelta::bonus_ad(500.0));
        let target = Target::new(1000.0, -150.0, 0.0).unwrap();
        let payload = Payload::Damage(DamagePayload::new(guard.total_ad(), DamageType::Physical));
        let result = calculate_damage(&payload, &target, &guard, &[])?;
        Ok(result.damage)
    }

    let kit = Kit::duelist(AbilityRanks::default()).unwrap();
    let mut stats = kit.stats_at(3);
    let before = stats.bonus_ad();
    assert!(failing(&mut stats).is_err());
    assert!((stats.bonus_ad() - before).abs() < 1e-9);
}

#[test]
fn test_scenario_end_to_end() {
    separator("Bundled skirmish scenario");

    let scenario = parse_scenario(include_str!("../config/skirmish.toml")).unwrap();
    let parts = scenario.build_default().unwrap();

    let result = optimize(&parts.search_request(&scenario)).unwrap();
    print_result(&result);
    assert_eq!(result.method, Method::Exact);
    assert!(result.total_damage > 0.0);
    assert!(result.total_healing > 0.0);

    let steps: Vec<&str> = scenario.combo.iter().map(String::as_str).collect();
    let trace = calculate_combo(&parts.combo_request(), &steps).unwrap();
    for step in &trace.steps {
        println!("  {:<10} {:>8.1} (+{:.1} procs)", step.step, step.damage, step.proc_damage);
    }
    assert_eq!(trace.steps.len(), steps.len());
    assert!(trace.steps.iter().all(|s| s.available));
    assert!(trace.target_hp_remaining < parts.target.max_hp);
}
