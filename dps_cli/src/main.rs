//! dps - Command-line front end for the burst/DPS optimizer
//!
//! Run with: `dps <command> --scenario <file.toml>`

mod report;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use dps_core::config::{load_kit_config, load_scenario, Scenario, ScenarioParts};
use dps_core::{calculate_action, calculate_combo, calculate_vital, optimize, ActionId, Method};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Burst and sustained damage optimizer
#[derive(Parser)]
#[command(name = "dps")]
#[command(about = "Find the highest-damage action sequence for a scenario", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Search for the best action sequence
    Optimize(OptimizeCmd),

    /// Replay a fixed combo step by step
    Combo(ComboCmd),

    /// Damage of a single action
    Action(ActionCmd),
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Text,
    Json,
}

#[derive(Clone, Copy, ValueEnum)]
enum MethodArg {
    Exact,
    Greedy,
}

impl From<MethodArg> for Method {
    fn from(arg: MethodArg) -> Self {
        match arg {
            MethodArg::Exact => Method::Exact,
            MethodArg::Greedy => Method::Greedy,
        }
    }
}

/// Options shared by every command
#[derive(Args)]
struct ScenarioArgs {
    /// Scenario TOML file
    #[arg(short, long)]
    scenario: PathBuf,

    /// Kit TOML file (defaults to the built-in duelist)
    #[arg(short, long)]
    kit: Option<PathBuf>,

    #[arg(short, long, value_enum, default_value = "text")]
    format: Format,
}

impl ScenarioArgs {
    fn load(&self) -> Result<(Scenario, ScenarioParts)> {
        let scenario = load_scenario(&self.scenario)
            .with_context(|| format!("loading scenario {}", self.scenario.display()))?;
        let parts = match &self.kit {
            Some(path) => {
                let kit = load_kit_config(path)
                    .with_context(|| format!("loading kit {}", path.display()))?;
                scenario.build(kit)?
            }
            None => scenario.build_default()?,
        };
        info!(
            level = scenario.level,
            kit = %parts.kit.config().name,
            "scenario loaded"
        );
        Ok((scenario, parts))
    }
}

#[derive(Args)]
struct OptimizeCmd {
    #[command(flatten)]
    common: ScenarioArgs,

    /// Override the scenario's time window (seconds)
    #[arg(short, long)]
    time_limit: Option<f64>,

    /// Force a search method
    #[arg(short, long, value_enum)]
    method: Option<MethodArg>,

    /// Never wait for the periodic proc
    #[arg(long)]
    no_wait: bool,
}

impl OptimizeCmd {
    fn execute(&self) -> Result<()> {
        let (mut scenario, parts) = self.common.load()?;
        if let Some(limit) = self.time_limit {
            scenario.time_limit = limit;
        }
        if let Some(method) = self.method {
            scenario.method = Some(method.into());
        }
        if self.no_wait {
            scenario.allow_wait = false;
        }

        let result = optimize(&parts.search_request(&scenario))?;
        match self.common.format {
            Format::Json => println!("{}", serde_json::to_string_pretty(&result)?),
            Format::Text => report::print_search(&parts, &result),
        }
        Ok(())
    }
}

#[derive(Args)]
struct ComboCmd {
    #[command(flatten)]
    common: ScenarioArgs,

    /// Steps to replay (defaults to the scenario's combo)
    steps: Vec<String>,
}

impl ComboCmd {
    fn execute(&self) -> Result<()> {
        let (scenario, parts) = self.common.load()?;
        let steps = if self.steps.is_empty() {
            &scenario.combo
        } else {
            &self.steps
        };
        let steps: Vec<&str> = steps.iter().map(String::as_str).collect();

        let trace = calculate_combo(&parts.combo_request(), &steps)?;
        match self.common.format {
            Format::Json => println!("{}", serde_json::to_string_pretty(&trace)?),
            Format::Text => report::print_combo(&trace),
        }
        Ok(())
    }
}

#[derive(Args)]
struct ActionCmd {
    #[command(flatten)]
    common: ScenarioArgs,

    /// Action id (AA, Q, W, E_FIRST, E_CRIT) or VITAL
    action: String,
}

impl ActionCmd {
    fn execute(&self) -> Result<()> {
        let (_, parts) = self.common.load()?;
        let result = if self.action.eq_ignore_ascii_case("vital") {
            calculate_vital(&parts.kit, &parts.stats, &parts.target, &parts.static_modifiers)?
        } else {
            let action: ActionId = self.action.parse().map_err(anyhow::Error::msg)?;
            calculate_action(
                &parts.kit,
                action,
                &parts.stats,
                &parts.target,
                &parts.static_modifiers,
            )?
        };
        match self.common.format {
            Format::Json => println!("{}", serde_json::to_string_pretty(&result)?),
            Format::Text => report::print_action(&self.action, &result),
        }
        Ok(())
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Optimize(cmd) => cmd.execute(),
        Command::Combo(cmd) => cmd.execute(),
        Command::Action(cmd) => cmd.execute(),
    }
}
