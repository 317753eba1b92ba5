//! schedule-runner: headless weekly coaching-schedule runner.
//!
//! Usage:
//!   schedule-runner --roster agents.json --week 2026-10-19 --db coaching.db
//!   schedule-runner --demo 60 --seed 12345 --json

use anyhow::{Context, Result};
use chrono::NaiveDate;
use coaching_core::{
    agent::AgentRecord,
    config::SchedulerConfig,
    engine::{monday_of, CoachingEngine, WeeklyReport},
    roster::RosterGenerator,
    store::SchedStore,
};
use std::env;
use std::path::Path;

/// Roster file as written by the upstream report converter.
#[derive(serde::Deserialize)]
struct RosterFile {
    #[serde(default)]
    excluded_by_tenure: usize,
    agents: Vec<AgentRecord>,
}

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let seed = parse_arg(&args, "--seed", 42u64);
    let demo_size = parse_arg(&args, "--demo", 0usize);
    let json_mode = args.iter().any(|a| a == "--json");
    let roster_path = string_arg(&args, "--roster");
    let db = string_arg(&args, "--db").unwrap_or(":memory:");
    let data_dir = string_arg(&args, "--data-dir").unwrap_or("./data");
    let week_of = match string_arg(&args, "--week") {
        Some(w) => NaiveDate::parse_from_str(w, "%Y-%m-%d")
            .with_context(|| format!("--week expects YYYY-MM-DD, got {w}"))?,
        None => chrono::Local::now().date_naive(),
    };
    let week_of = monday_of(week_of);

    let config = load_config(data_dir)?;

    let (records, excluded_by_tenure, source) = match roster_path {
        Some(path) => {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Cannot read roster {path}"))?;
            let file: RosterFile = serde_json::from_str(&content)
                .with_context(|| format!("Cannot parse roster {path}"))?;
            (file.agents, file.excluded_by_tenure, path.to_string())
        }
        None => {
            let size = if demo_size > 0 { demo_size } else { 60 };
            (
                RosterGenerator::new(seed, size).generate(),
                0,
                format!("synthetic ({size} agents, seed {seed})"),
            )
        }
    };

    if !json_mode {
        println!("Coaching schedule runner");
        println!("  roster:    {source}");
        println!("  week of:   {week_of}");
        println!("  db:        {db}");
        println!("  data_dir:  {data_dir}");
        println!();
    }

    let store = SchedStore::open(db)?;
    store.migrate()?;

    let run_id = format!("week-{week_of}-{}", uuid::Uuid::new_v4().simple());
    let engine = CoachingEngine::new(run_id, config)?;
    let report = engine.run_week(week_of, records, excluded_by_tenure);
    let schedule_id = engine.persist(&store, &report)?;

    if json_mode {
        println!("{}", serde_json::to_string_pretty(&report.schedule)?);
    } else {
        print_summary(&report, &schedule_id);
    }
    Ok(())
}

fn load_config(data_dir: &str) -> Result<SchedulerConfig> {
    let path = Path::new(data_dir).join("scheduler_config.json");
    if path.exists() {
        SchedulerConfig::load(data_dir)
    } else {
        log::warn!("{} not found, using default scheduler config", path.display());
        Ok(SchedulerConfig::default())
    }
}

fn print_summary(report: &WeeklyReport, schedule_id: &str) {
    let stats = &report.stats;
    println!("=== RUN SUMMARY ===");
    println!("  run_id:             {}", report.run_id);
    println!("  schedule_id:        {schedule_id}");
    println!("  agents:             {}", stats.total_agents);
    println!("  excluded (tenure):  {}", stats.excluded_by_tenure);
    println!("  zero score:         {}", stats.zero_score_agents);
    println!("  needs training:     {}", stats.needs_training);
    println!("  avg raw score:      {:.1}", stats.avg_raw_score);
    println!("  avg adjusted score: {:.1}", stats.avg_adjusted_score);
    println!("  sessions:           {}", report.metadata.session_count);
    println!("  agents scheduled:   {}", report.metadata.scheduled_agents);
    println!("  unplaced needs:     {}", report.unplaced.len());

    println!();
    println!("=== SCHEDULE (week of {}) ===", report.schedule.week_of);
    for day in &report.schedule.days {
        println!("  {}: {}", day.day, day.focus);
        if day.sessions.is_empty() {
            println!("    (no sessions)");
        }
        for session in &day.sessions {
            let names: Vec<&str> = session.agents.iter().map(|a| a.name.as_str()).collect();
            println!(
                "    #{} {} {} (local {}) [{}] {}: {}",
                session.cohort_number,
                session.time_label(),
                session.location,
                session.local_time_label(),
                session.tier,
                session.priority,
                names.join(", ")
            );
        }
    }

    if !report.unplaced.is_empty() {
        println!();
        println!("=== COULD NOT BE SCHEDULED ===");
        for u in &report.unplaced {
            println!("  {} ({}): {}", u.agent, u.location, u.training);
        }
    }

    let validation = &report.validation;
    if !validation.is_clean() {
        println!();
        println!(
            "=== VALIDATION: {} error(s), {} warning(s) ===",
            validation.errors.len(),
            validation.warnings.len()
        );
        for issue in &validation.errors {
            println!("  ERROR   {}", issue.message);
        }
        for issue in &validation.warnings {
            println!("  WARNING {}", issue.message);
        }
    }
}

fn string_arg<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.windows(2)
        .find(|w| w[0] == flag)
        .map(|w| w[1].as_str())
}

fn parse_arg<T: std::str::FromStr + Copy>(args: &[String], flag: &str, default: T) -> T {
    args.windows(2)
        .find(|w| w[0] == flag)
        .and_then(|w| w[1].parse().ok())
        .unwrap_or(default)
}
