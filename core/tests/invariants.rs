//! Schedule invariants over seeded synthetic rosters.
//!
//! Every generated schedule, whatever the roster, must satisfy:
//!   - at most 2 sessions per agent
//!   - at most 2 of one manager's agents per (day, slot)
//!   - at most one location per (day, slot)
//!   - 2 ≤ cohort size ≤ 5
//!   - no session over either site's lunch hour
//!   - no zero-score agent in any session

use coaching_core::{
    config::SchedulerConfig,
    engine::{CoachingEngine, WeeklyReport},
    roster::RosterGenerator,
};
use chrono::{NaiveDate, Weekday};
use std::collections::{HashMap, HashSet};

const SEEDS: [u64; 6] = [1, 2, 3, 0xABCD, 0xDEAD_BEEF, 0x1234_5678_9ABC];

fn run(seed: u64, size: usize) -> WeeklyReport {
    let engine = CoachingEngine::new(format!("sweep-{seed}"), SchedulerConfig::default())
        .expect("default config is valid");
    let week = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();
    engine.run_week(week, RosterGenerator::new(seed, size).generate(), 0)
}

fn sweep() -> Vec<(u64, WeeklyReport)> {
    SEEDS
        .iter()
        .flat_map(|seed| [40, 120].map(|size| (*seed, run(*seed, size))))
        .collect()
}

#[test]
fn sweep_produces_sessions() {
    let total: usize = sweep().iter().map(|(_, r)| r.schedule.session_count()).sum();
    assert!(total > 0, "no seed produced a single session");
}

#[test]
fn no_agent_exceeds_two_sessions() {
    for (seed, report) in sweep() {
        for name in report.schedule.scheduled_agents() {
            let count = report.schedule.sessions_for(name);
            assert!(count <= 2, "seed {seed}: {name} has {count} sessions");
        }
    }
}

#[test]
fn no_manager_exceeds_two_agents_per_slot() {
    for (seed, report) in sweep() {
        let mut per_slot: HashMap<(&str, Weekday, u8), usize> = HashMap::new();
        for session in report.schedule.sessions() {
            for agent in &session.agents {
                *per_slot
                    .entry((agent.manager.as_str(), session.day, session.slot.index))
                    .or_insert(0) += 1;
            }
        }
        for ((manager, day, slot), count) in per_slot {
            assert!(
                count <= 2,
                "seed {seed}: manager {manager} has {count} agents in {day} slot {slot}"
            );
        }
    }
}

#[test]
fn one_location_per_day_and_slot() {
    for (seed, report) in sweep() {
        let mut seen = HashSet::new();
        for session in report.schedule.sessions() {
            assert!(
                seen.insert((session.day, session.slot.index)),
                "seed {seed}: two sessions share {} slot {}",
                session.day,
                session.slot.index
            );
        }
    }
}

#[test]
fn cohort_sizes_stay_in_bounds() {
    for (seed, report) in sweep() {
        for session in report.schedule.sessions() {
            assert!(
                (2..=5).contains(&session.size()),
                "seed {seed}: session of size {} on {}",
                session.size(),
                session.day
            );
        }
    }
}

#[test]
fn no_session_touches_lunch() {
    for (seed, report) in sweep() {
        for session in report.schedule.sessions() {
            assert!(
                !session.slot.overlaps_lunch(),
                "seed {seed}: lunch-hour session at {}",
                session.time_label()
            );
            assert!(!session.time_label().contains("12:00-1:00"));
        }
    }
}

#[test]
fn zero_score_agents_are_never_scheduled() {
    for (seed, report) in sweep() {
        let zero: HashSet<&str> = report
            .agents
            .iter()
            .filter(|a| a.raw_score == 0.0)
            .map(|a| a.name.as_str())
            .collect();
        for name in report.schedule.scheduled_agents() {
            assert!(!zero.contains(name), "seed {seed}: zero-score {name} scheduled");
        }
        assert!(report.agents.iter().all(|a| a.raw_score > 0.0 || a.recommendations.is_empty()));
    }
}

#[test]
fn validator_finds_no_errors_in_generated_schedules() {
    for (seed, report) in sweep() {
        assert!(
            !report.validation.has_errors(),
            "seed {seed}: validator errors {:?}",
            report.validation.errors
        );
    }
}

#[test]
fn overflow_sessions_use_morning_slots_only() {
    for (seed, report) in sweep() {
        let friday = report.schedule.day(Weekday::Fri).expect("friday present");
        for session in &friday.sessions {
            assert!(session.slot.is_morning(), "seed {seed}: afternoon overflow session");
        }
    }
}
