//! Schedule validator tests on hand-built schedules.

use coaching_core::{
    agent::{Agent, Location, Tier, TrainingType},
    config::SchedulerConfig,
    event::MemorySink,
    grid::{standard_slots, DayFocus, TimeSlot},
    metrics::Priority,
    schedule::{DaySchedule, Schedule, SessionTier, TrainingSession},
    validator::{validate, IssueKind},
};
use chrono::{NaiveDate, NaiveTime, Weekday};

fn agent(name: &str, location: Location, manager: &str) -> Agent {
    Agent {
        name: name.to_string(),
        tenure_years: 2.5,
        tier: Tier::Standard,
        location,
        manager: manager.to_string(),
        raw_score: 40.0,
        leads_received: 100.0,
        lead_attainment_pct: 100.0,
        adjusted_score: 40.0,
        close_rate: Some(8.0),
        annual_premium: None,
        place_rate: None,
        recommendations: vec![TrainingType::CloseRate],
    }
}

fn team(location: Location, prefix: &str, size: usize) -> Vec<Agent> {
    (0..size)
        .map(|i| agent(&format!("{prefix} {i}"), location, &format!("{prefix} manager {i}")))
        .collect()
}

fn session(day: Weekday, slot: TimeSlot, location: Location, agents: Vec<Agent>) -> TrainingSession {
    TrainingSession {
        day,
        slot,
        location,
        tier: SessionTier::Standard,
        focus: DayFocus::Training(TrainingType::CloseRate),
        agents,
        priority: Priority::High,
        rationale: "test".to_string(),
        cohort_number: 1,
    }
}

fn schedule(sessions: Vec<TrainingSession>) -> Schedule {
    let days = [Weekday::Tue, Weekday::Wed, Weekday::Thu, Weekday::Fri]
        .into_iter()
        .map(|day| DaySchedule {
            day,
            focus: DayFocus::Training(TrainingType::CloseRate),
            sessions: sessions.iter().filter(|s| s.day == day).cloned().collect(),
        })
        .collect();
    Schedule {
        week_of: NaiveDate::from_ymd_opt(2026, 10, 19).unwrap(),
        days,
    }
}

fn slot(index: usize) -> TimeSlot {
    standard_slots()[index]
}

#[test]
fn balanced_schedule_is_clean() {
    let s = schedule(vec![
        session(Weekday::Tue, slot(0), Location::Clt, team(Location::Clt, "Clt", 3)),
        session(Weekday::Tue, slot(3), Location::Atx, team(Location::Atx, "Atx", 2)),
    ]);
    let report = validate(&s, &SchedulerConfig::default());
    assert!(report.is_clean(), "unexpected findings: {report:?}");
}

#[test]
fn duplicate_cell_and_location_conflict_are_errors() {
    let s = schedule(vec![
        session(Weekday::Tue, slot(0), Location::Clt, team(Location::Clt, "A", 2)),
        session(Weekday::Tue, slot(0), Location::Clt, team(Location::Clt, "B", 2)),
        session(Weekday::Tue, slot(0), Location::Atx, team(Location::Atx, "C", 2)),
    ]);
    let report = validate(&s, &SchedulerConfig::default());
    assert!(report.has_errors());
    assert!(report.has(IssueKind::DuplicateSlot));
    assert!(report.has(IssueKind::LocationConflict));
}

#[test]
fn cohort_size_bounds() {
    let config = SchedulerConfig::default();

    let small = schedule(vec![
        session(Weekday::Tue, slot(0), Location::Clt, team(Location::Clt, "A", 1)),
        session(Weekday::Tue, slot(3), Location::Atx, team(Location::Atx, "B", 2)),
    ]);
    let report = validate(&small, &config);
    assert!(report.has(IssueKind::CohortTooSmall));
    assert!(!report.has_errors(), "an undersized cohort is only a warning");

    let mut remediation = session(Weekday::Fri, slot(0), Location::Clt, team(Location::Clt, "R", 1));
    remediation.tier = SessionTier::Remediation;
    remediation.focus = DayFocus::Overflow;
    let report = validate(&schedule(vec![remediation]), &config);
    assert!(!report.has(IssueKind::CohortTooSmall), "remediation sessions are exempt");

    let large = schedule(vec![session(Weekday::Wed, slot(1), Location::Atx, team(Location::Atx, "L", 6))]);
    let report = validate(&large, &config);
    assert!(report.errors.iter().any(|i| i.kind == IssueKind::CohortTooLarge));
}

#[test]
fn lunch_hour_session_is_an_error() {
    let eleven_central = TimeSlot::new(
        9,
        NaiveTime::from_hms_opt(11, 0, 0).unwrap(),
        Priority::Low,
    );
    let s = schedule(vec![
        session(Weekday::Thu, eleven_central, Location::Atx, team(Location::Atx, "A", 2)),
        session(Weekday::Thu, slot(0), Location::Clt, team(Location::Clt, "B", 2)),
    ]);
    let report = validate(&s, &SchedulerConfig::default());
    let lunch: Vec<_> = report.errors.iter().filter(|i| i.kind == IssueKind::LunchHour).collect();
    assert_eq!(lunch.len(), 1);
    assert_eq!(lunch[0].day, Some(Weekday::Thu));
}

#[test]
fn one_sided_schedule_warns_about_balance() {
    let s = schedule(vec![
        session(Weekday::Tue, slot(0), Location::Clt, team(Location::Clt, "A", 2)),
        session(Weekday::Wed, slot(0), Location::Clt, team(Location::Clt, "B", 2)),
        session(Weekday::Thu, slot(0), Location::Clt, team(Location::Clt, "C", 2)),
    ]);
    let report = validate(&s, &SchedulerConfig::default());
    assert!(report.warnings.iter().any(|i| i.kind == IssueKind::LocationImbalance));
    assert!(!report.has_errors());
}

#[test]
fn agent_over_weekly_cap_is_an_error() {
    let pair = team(Location::Clt, "Over", 2);
    let s = schedule(vec![
        session(Weekday::Tue, slot(0), Location::Clt, pair.clone()),
        session(Weekday::Wed, slot(0), Location::Clt, pair.clone()),
        session(Weekday::Thu, slot(0), Location::Clt, pair),
    ]);
    let report = validate(&s, &SchedulerConfig::default());
    let overbooked = report
        .errors
        .iter()
        .filter(|i| i.kind == IssueKind::AgentOverbooked)
        .count();
    assert_eq!(overbooked, 2, "both agents sit in three sessions");
}

#[test]
fn manager_with_three_agents_in_one_slot_warns() {
    let crowd = vec![
        agent("One", Location::Atx, "Okafor"),
        agent("Two", Location::Atx, "Okafor"),
        agent("Three", Location::Atx, "Okafor"),
    ];
    let s = schedule(vec![
        session(Weekday::Wed, slot(0), Location::Atx, crowd),
        session(Weekday::Wed, slot(3), Location::Clt, team(Location::Clt, "B", 2)),
    ]);
    let report = validate(&s, &SchedulerConfig::default());
    let overloaded: Vec<_> = report
        .warnings
        .iter()
        .filter(|i| i.kind == IssueKind::ManagerOverloaded)
        .collect();
    assert_eq!(overloaded.len(), 1);
    assert_eq!(overloaded[0].day, Some(Weekday::Wed));
    assert!(overloaded[0].message.contains("Okafor"));
}

#[test]
fn findings_replay_as_events() {
    let s = schedule(vec![
        session(Weekday::Tue, slot(0), Location::Clt, team(Location::Clt, "A", 6)),
        session(Weekday::Tue, slot(0), Location::Atx, team(Location::Atx, "B", 1)),
    ]);
    let report = validate(&s, &SchedulerConfig::default());
    let mut sink = MemorySink::new();
    report.emit(&mut sink);
    assert_eq!(
        sink.count("validation_finding"),
        report.errors.len() + report.warnings.len()
    );
}
