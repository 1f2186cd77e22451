//! Headless Battle Runner
//!
//! Loads a TOML scenario, simulates the battle and prints the report.

use std::path::PathBuf;

use clap::Parser;
use frontline::battle::{
    AttackEvent, AttackLog, Battle, BattleEventLog, BattleReport, SleepPacer, TracingAttackLog,
    Unit,
};
use frontline::core::{load_scenario, Result, Round, Scenario};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

/// Headless Battle Runner - simulate a battle between two armies
#[derive(Parser, Debug)]
#[command(name = "battle_runner")]
#[command(about = "Simulate a turn-based battle from a TOML scenario")]
struct Args {
    /// Scenario file; the built-in demo is used when omitted
    #[arg(long)]
    scenario: Option<PathBuf>,

    /// Delay after each attack in milliseconds (overrides the scenario)
    #[arg(long)]
    pace_ms: Option<u64>,

    /// Stop as a stalemate after this many rounds (overrides the scenario)
    #[arg(long)]
    max_rounds: Option<Round>,

    /// Output format: json or text
    #[arg(long, default_value = "json")]
    format: String,

    /// Include every attack in the output and log at debug level
    #[arg(long, short = 'v')]
    verbose: bool,
}

const DEMO_SCENARIO: &str = r#"
[config]
pacing_ms = 0
max_rounds = 200

[left]
max_points = 250

[[left.units]]
name = "Swordsman"
unit_type = "Swordsman"
health = 60
base_attack = 12
cost = 15
attack_type = "Melee"
attack_bonuses = { Archer = 1.5 }

[[left.units]]
name = "Crossbowman"
unit_type = "Crossbowman"
health = 40
base_attack = 10
cost = 20
attack_type = "Ranged"

[right]
max_points = 250

[[right.units]]
name = "Pikeman"
unit_type = "Pikeman"
health = 70
base_attack = 9
cost = 15
attack_type = "Melee"
defence_bonuses = { Swordsman = 1.25 }

[[right.units]]
name = "Archer"
unit_type = "Archer"
health = 35
base_attack = 11
cost = 18
attack_type = "Ranged"
"#;

/// Logs through tracing and keeps the events for the report
#[derive(Default)]
struct RunnerLog {
    events: BattleEventLog,
    tracing: TracingAttackLog,
}

impl AttackLog for RunnerLog {
    fn log_attack(&mut self, round: Round, attacker: &Unit, target: &Unit) {
        self.tracing.log_attack(round, attacker, target);
        self.events.log_attack(round, attacker, target);
    }
}

#[derive(Serialize)]
struct RunnerOutput {
    #[serde(flatten)]
    report: BattleReport,
    #[serde(skip_serializing_if = "Option::is_none")]
    events: Option<Vec<AttackEvent>>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let default_filter = if args.verbose {
        "frontline=debug"
    } else {
        "frontline=info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    let scenario = resolve_scenario(&args)?;
    let field = scenario.build_battlefield()?;
    let pacer = SleepPacer::new(scenario.config.pacing());
    let mut battle = Battle::with_collaborators(field, RunnerLog::default(), pacer)
        .with_max_rounds(scenario.config.max_rounds);

    let report = battle.simulate()?;
    let (_, log) = battle.into_parts();
    let events = args.verbose.then_some(log.events.events);

    println!("{}", render(&args.format, report, events)?);
    Ok(())
}

/// Load the requested scenario and apply command-line overrides
fn resolve_scenario(args: &Args) -> Result<Scenario> {
    let mut scenario = match &args.scenario {
        Some(path) => load_scenario(path)?,
        None => Scenario::from_toml_str(DEMO_SCENARIO)?,
    };
    if let Some(pace_ms) = args.pace_ms {
        scenario.config.pacing_ms = pace_ms;
    }
    if args.max_rounds.is_some() {
        scenario.config.max_rounds = args.max_rounds;
    }
    scenario.config.validate()?;
    Ok(scenario)
}

/// Format the report; anything but "text" falls back to JSON
fn render(format: &str, report: BattleReport, events: Option<Vec<AttackEvent>>) -> Result<String> {
    if format == "text" {
        return Ok(render_text(&report, events.as_deref()));
    }
    if format != "json" {
        tracing::warn!("Unknown format '{}', defaulting to json", format);
    }
    let output = RunnerOutput { report, events };
    Ok(serde_json::to_string_pretty(&output)?)
}

fn render_text(report: &BattleReport, events: Option<&[AttackEvent]>) -> String {
    let mut lines = Vec::new();
    if let Some(events) = events {
        for event in events {
            lines.push(format!(
                "[round {}] {} -> {} ({} health left)",
                event.round, event.attacker_name, event.target_name, event.target_health
            ));
        }
        lines.push(String::new());
    }

    lines.push("Battle Result".to_string());
    lines.push("=============".to_string());
    lines.push(format!("Outcome: {:?}", report.outcome));
    lines.push(format!("Rounds: {}", report.rounds));
    lines.push(format!("Attacks: {}", report.attacks));
    lines.push(format!(
        "Left survivors: {} ({} health)",
        report.left_survivors, report.left_health
    ));
    lines.push(format!(
        "Right survivors: {} ({} health)",
        report.right_survivors, report.right_health
    ));
    lines.join("\n")
}
