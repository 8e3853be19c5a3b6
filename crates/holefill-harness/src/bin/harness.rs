//! CLI entrypoint for the hole-filling allocator harness.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use holefill_harness::report::{FixtureDigest, ScenarioReport, VerificationSummary};
use holefill_harness::runner::run_scenario_with_state;
use holefill_harness::structured_log::{LogEmitter, LogEntry, LogLevel};
use holefill_harness::{Scenario, builtin_scenarios, render, repl};

/// Interactive driver and scenario harness for the hole-filling allocator.
#[derive(Debug, Parser)]
#[command(name = "holefill-harness")]
#[command(about = "Interactive driver and scenario harness for the hole-filling allocator")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the interactive menu loop on stdin/stdout.
    Repl {
        /// Preconfigure the memory size instead of prompting.
        #[arg(long)]
        size: Option<usize>,
        /// Strategy code used with --size (0=first fit, 1=best fit).
        #[arg(long, default_value_t = 0)]
        strategy: u8,
    },
    /// Run scenario fixtures and verify their expectations.
    Verify {
        /// Directory containing scenario JSON files (built-ins if omitted).
        #[arg(long)]
        fixture: Option<PathBuf>,
        /// Output report path (markdown; a JSON sibling is written too).
        #[arg(long)]
        report: Option<PathBuf>,
        /// JSONL structured log path (stderr if omitted).
        #[arg(long)]
        log: Option<PathBuf>,
        /// Optional fixed timestamp string for deterministic reports.
        #[arg(long)]
        timestamp: Option<String>,
    },
    /// Run the built-in scenarios and print each final layout.
    Demo,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Command::Repl { size, strategy } => {
            let initial = match size {
                Some(size) => {
                    let Some(strategy) = holefill_core::FitStrategy::from_code(strategy) else {
                        return Err(
                            format!("Unsupported strategy code {strategy}, expected 0|1").into()
                        );
                    };
                    Some(holefill_core::Allocator::new(size, strategy)?)
                }
                None => None,
            };
            let stdin = std::io::stdin();
            let stdout = std::io::stdout();
            repl::run_session(&mut stdin.lock(), &mut stdout.lock(), initial)?;
        }
        Command::Verify {
            fixture,
            report,
            log,
            timestamp,
        } => {
            let scenarios = load_scenarios(fixture.as_deref())?;
            let mut emitter = match &log {
                Some(path) => LogEmitter::to_file(path)?,
                None => LogEmitter::to_stderr(),
            };

            let mut results = Vec::new();
            let mut fixtures = Vec::new();
            for (index, scenario) in scenarios.iter().enumerate() {
                fixtures.push(FixtureDigest::of(scenario)?);
                let (scenario_results, _) = run_scenario_with_state(scenario);
                let failed = scenario_results.iter().filter(|r| !r.passed).count();

                let mut entry = LogEntry::new(
                    format!("harness::verify::{index:04}"),
                    if failed == 0 {
                        LogLevel::Info
                    } else {
                        LogLevel::Warn
                    },
                    "scenario_result",
                );
                entry.scenario = Some(scenario.name.clone());
                entry.outcome = Some(if failed == 0 { "pass" } else { "fail" }.to_string());
                entry.details = Some(format!("steps={} failed={failed}", scenario_results.len()));
                emitter.emit(&entry)?;

                results.extend(scenario_results);
            }

            let summary = VerificationSummary::from_results(&results);
            let report_doc = ScenarioReport {
                title: String::from("Hole-filling allocator verification report"),
                timestamp: timestamp
                    .unwrap_or_else(|| format!("{:?}", std::time::SystemTime::now())),
                fixtures,
                summary,
                results,
            };

            eprintln!(
                "Verification complete: total={}, passed={}, failed={}",
                summary.total, summary.passed, summary.failed
            );

            if let Some(report_path) = report {
                if let Some(parent) = report_path.parent() {
                    std::fs::create_dir_all(parent)?;
                }
                eprintln!("Writing report to {}", report_path.display());
                std::fs::write(&report_path, report_doc.to_markdown())?;
                std::fs::write(report_path.with_extension("json"), report_doc.to_json()?)?;
            }

            if !summary.all_passed() {
                return Err("Scenario verification failed".into());
            }
        }
        Command::Demo => {
            for scenario in builtin_scenarios() {
                let (results, allocator) = run_scenario_with_state(&scenario);
                let failed = results.iter().filter(|r| !r.passed).count();
                println!(
                    "== {} [{}]",
                    scenario.name,
                    if failed == 0 { "pass" } else { "FAIL" }
                );
                if let Some(allocator) = allocator {
                    println!("{}", render::render_layout(&allocator.layout()));
                }
            }
        }
    }

    Ok(())
}

/// Loads `*.json` scenarios from `dir` in sorted order, or the built-ins.
fn load_scenarios(dir: Option<&std::path::Path>) -> Result<Vec<Scenario>, Box<dyn std::error::Error>> {
    let Some(dir) = dir else {
        return Ok(builtin_scenarios());
    };

    let mut paths: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|entry| entry.path()))
        .filter(|path| path.extension().and_then(|s| s.to_str()) == Some("json"))
        .collect();
    paths.sort();

    let mut scenarios = Vec::new();
    for path in paths {
        match Scenario::from_file(&path) {
            Ok(scenario) => scenarios.push(scenario),
            Err(err) => eprintln!("Skipping {}: {}", path.display(), err),
        }
    }
    if scenarios.is_empty() {
        return Err(format!("No scenario JSON files found in {}", dir.display()).into());
    }
    Ok(scenarios)
}
