//! Plain-text reports

use dps_core::config::ScenarioParts;
use dps_core::{ComboTrace, DamageResult, SearchResult};

fn separator(title: &str) {
    println!("{}", "=".repeat(60));
    println!("  {}", title);
    println!("{}", "=".repeat(60));
}

pub fn print_search(parts: &ScenarioParts, result: &SearchResult) {
    separator(&format!(
        "{} vs {:.0} HP / {:.0} AR / {:.0} MR",
        parts.kit.config().name,
        parts.target.max_hp,
        parts.target.armor,
        parts.target.magic_resist
    ));
    println!(
        "Method: {}{}  ({} nodes)",
        result.method,
        if result.complete { "" } else { " (budget exhausted)" },
        result.nodes_explored
    );
    println!("Sequence: {}", result.sequence);
    println!();
    println!("{:>7}  {:<11} {:>9} {:>8} {:>10}  Notes", "Time", "Action", "Damage", "Heal", "Total");
    for event in &result.timeline {
        let notes: Vec<_> = event.notes.labels().collect();
        println!(
            "{:>7.2}  {:<11} {:>9.1} {:>8.1} {:>10.1}  {}",
            event.time,
            event.action.label(),
            event.damage,
            event.heal,
            event.cumulative_damage,
            notes.join(", ")
        );
    }
    println!();
    println!(
        "Total: {:.1} damage in {:.2}s ({:.1} DPS), {:.1} healing",
        result.total_damage, result.time_limit, result.dps, result.total_healing
    );
}

pub fn print_combo(trace: &ComboTrace) {
    separator("Combo");
    for step in &trace.steps {
        if step.available {
            println!(
                "{:<11} {:>9.1} (+{:.1} procs)  heal {:.1}  [{:?}]",
                step.step, step.damage, step.proc_damage, step.heal, step.condition
            );
        } else {
            println!(
                "{:<11} unavailable: {}",
                step.step,
                step.reason.unwrap_or("unknown")
            );
        }
    }
    println!();
    println!(
        "Total: {:.1} damage, {:.1} healing, target left at {:.1} HP",
        trace.total_damage, trace.total_healing, trace.target_hp_remaining
    );
}

pub fn print_action(label: &str, result: &DamageResult) {
    separator(label);
    println!("Raw:        {:.2} {}", result.raw_damage, result.damage_type);
    println!("Resistance: {:.2}", result.effective_resistance);
    println!("Mitigated:  {:.2}", result.post_mitigation);
    println!("Multiplier: {:.4}", result.total_multiplier);
    println!("Damage:     {:.2}", result.damage);
    if result.heal > 0.0 {
        println!("Heal:       {:.2}", result.heal);
    }
}
