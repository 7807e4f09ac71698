mod common;
mod interactive;
mod logic;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use colored::Colorize;
use lifepath_game::{Philosopher, QuestionPool, SessionConfig, load_pool_from_path_async};
use std::fs::File;
use std::io::{BufWriter, Write, stdout};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use common::scenario::{ALL_SCENARIO_KEYS, get_scenario, list_scenarios};
use common::{entropy_seed, split_csv};
use interactive::{PlayOptions, run_interactive};
use logic::{JourneySimulator, LogicTester, ScenarioResult, aggregate_runs, resolve_seed_inputs};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum RunMode {
    /// Play a journey in the terminal
    Play,
    /// Run automated journeys against scenarios
    Simulate,
}

#[derive(Debug, Parser)]
#[command(name = "lifepath-tester", version)]
#[command(about = "Play the philosophical life journey, or run automated playthrough QA on it")]
struct Args {
    /// Interactive play or automated simulation
    #[arg(long, value_enum, default_value_t = RunMode::Simulate)]
    mode: RunMode,

    /// Question table CSV to load instead of the bundled one
    #[arg(long)]
    data: Option<PathBuf>,

    /// Session rules JSON (death_chance, final_age, shuffle_options)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Scenarios to run (comma-separated)
    #[arg(long, default_value = "smoke")]
    scenarios: String,

    /// List all available scenarios and exit
    #[arg(long)]
    list_scenarios: bool,

    /// Seeds or journey codes (comma-separated); `all` expands to every journey code
    #[arg(long)]
    seeds: Option<String>,

    /// Philosopher for play mode, or for scenarios that do not pin one
    #[arg(long)]
    philosopher: Option<Philosopher>,

    /// Number of iterations per scenario and seed
    #[arg(long, default_value_t = 10)]
    iterations: usize,

    /// Output report format
    #[arg(long, default_value = "console")]
    #[arg(value_parser = ["json", "markdown", "console", "csv"])]
    report: String,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Optional path to write the report output instead of stdout
    #[arg(long)]
    output: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    if maybe_list_scenarios(&args)? {
        return Ok(());
    }

    let config = load_config(args.config.as_deref()).await?;
    let pool = Arc::new(load_questions(args.data.as_deref()).await?);

    match args.mode {
        RunMode::Play => play(&args, pool, config),
        RunMode::Simulate => {
            let all_passed = simulate(&args, pool, config)?;
            if !all_passed {
                std::process::exit(1);
            }
            Ok(())
        }
    }
}

fn maybe_list_scenarios(args: &Args) -> Result<bool> {
    if !args.list_scenarios {
        return Ok(false);
    }
    let mut output_target = OutputTarget::new(args.output.clone())?;
    writeln!(output_target.writer(), "Available scenarios:")?;
    for (key, description) in list_scenarios() {
        writeln!(output_target.writer(), "  {key:25} - {description}")?;
    }
    output_target.flush_inner()?;
    Ok(true)
}

async fn load_config(path: Option<&Path>) -> Result<SessionConfig> {
    let Some(path) = path else {
        return Ok(SessionConfig::load_from_static());
    };
    let text = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("failed to read config {}", path.display()))?;
    SessionConfig::from_json(&text).with_context(|| format!("invalid config {}", path.display()))
}

async fn load_questions(path: Option<&Path>) -> Result<QuestionPool> {
    let pool = match path {
        Some(path) => load_pool_from_path_async(path)
            .await
            .with_context(|| format!("failed to load question table {}", path.display()))?,
        None => QuestionPool::bundled().context("bundled question table is invalid")?,
    };
    log::info!("question pool ready: {} rows", pool.len());
    Ok(pool)
}

fn play(args: &Args, pool: Arc<QuestionPool>, config: SessionConfig) -> Result<()> {
    let seed = match args.seeds.as_deref() {
        Some(raw) => resolve_seed_inputs(&split_csv(raw))?.into_iter().next(),
        None => None,
    };
    let options = PlayOptions {
        philosopher: args.philosopher,
        seed,
    };
    let stdin = std::io::stdin();
    let mut input = stdin.lock();
    let mut out = stdout().lock();
    let finished = run_interactive(&mut input, &mut out, pool, config, options, entropy_seed)?;
    log::info!("{finished} journeys finished");
    Ok(())
}

fn announce_banner() {
    println!("{}", "🎮 Lifepath Automated Tester".bright_cyan().bold());
    println!("{}", "================================".cyan());
}

fn expand_scenarios(scenarios_arg: &str) -> Vec<String> {
    let mut scenarios = split_csv(scenarios_arg);
    if scenarios.iter().any(|s| s.eq_ignore_ascii_case("all")) {
        scenarios.retain(|s| !s.eq_ignore_ascii_case("all"));
        for key in ALL_SCENARIO_KEYS {
            if !scenarios.iter().any(|s| s == key) {
                scenarios.push(key.to_string());
            }
        }
    }
    scenarios
}

fn simulate(args: &Args, pool: Arc<QuestionPool>, config: SessionConfig) -> Result<bool> {
    announce_banner();
    let start_time = Instant::now();
    let scenarios = expand_scenarios(&args.scenarios);
    let seed_tokens = split_csv(args.seeds.as_deref().unwrap_or_default());
    let seed_infos = resolve_seed_inputs(&seed_tokens)?;
    let tester = LogicTester::new(JourneySimulator::new(pool, args.verbose), args.verbose);

    println!("{}", "🧠 Running Journey Scenarios".bright_yellow().bold());
    println!("{}", "-".repeat(30).yellow());

    let mut results: Vec<ScenarioResult> = Vec::new();
    for scenario_name in &scenarios {
        let Some(resolved) = get_scenario(scenario_name, config) else {
            eprintln!("⚠️  Unknown scenario: {}", scenario_name.yellow());
            continue;
        };
        for mut scenario in resolved {
            if scenario.plan.philosopher.is_none() {
                scenario.plan.philosopher = args.philosopher;
            }
            results.extend(tester.run_scenario(&scenario, &seed_infos, args.iterations));
        }
    }

    write_reports(args, &results, start_time)?;
    Ok(results.iter().all(|r| r.passed))
}

fn write_reports(args: &Args, results: &[ScenarioResult], start_time: Instant) -> Result<()> {
    let mut output_target = OutputTarget::new(args.output.clone())?;
    let aggregates = aggregate_runs(results);

    match args.report.as_str() {
        "json" => logic::reports::generate_json_report(&mut output_target, results)?,
        "csv" => logic::reports::generate_csv_report(&mut output_target, results)?,
        "markdown" => {
            if results.is_empty() {
                writeln!(
                    &mut output_target,
                    "# Lifepath Journey Test Results\n\n_No scenarios executed._"
                )?;
            } else {
                logic::reports::generate_markdown_report(
                    &mut output_target,
                    results,
                    &aggregates,
                )?;
            }
        }
        _ => {
            if results.is_empty() {
                writeln!(&mut output_target, "No journey scenarios executed.")?;
            } else {
                logic::reports::generate_console_report(
                    &mut output_target,
                    results,
                    &aggregates,
                    start_time.elapsed(),
                )?;
            }
            writeln!(&mut output_target)?;
            writeln!(
                &mut output_target,
                "🏁 Total time: {:?}",
                start_time.elapsed()
            )?;
        }
    }

    output_target.flush_inner()?;
    Ok(())
}

enum OutputTarget {
    Stdout(BufWriter<std::io::Stdout>),
    File(BufWriter<File>),
}

impl OutputTarget {
    fn new(path: Option<PathBuf>) -> Result<Self> {
        if let Some(path) = path {
            let file = File::create(&path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            Ok(Self::File(BufWriter::new(file)))
        } else {
            Ok(Self::Stdout(BufWriter::new(stdout())))
        }
    }

    fn writer(&mut self) -> &mut dyn Write {
        match self {
            Self::Stdout(w) => w,
            Self::File(w) => w,
        }
    }

    fn flush_inner(&mut self) -> std::io::Result<()> {
        match self {
            Self::Stdout(w) => w.flush(),
            Self::File(w) => w.flush(),
        }
    }
}

impl Write for OutputTarget {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.writer().write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.flush_inner()
    }
}
