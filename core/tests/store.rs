//! Persistence tests: schedules must load back exactly as generated.

use coaching_core::{
    agent::{Agent, AgentRecord, Location, Tier},
    config::SchedulerConfig,
    engine::{duplicate_names, CoachingEngine, WeeklyReport},
    error::SchedError,
    event::ScheduleEvent,
    roster::RosterGenerator,
    store::SchedStore,
};
use chrono::NaiveDate;

fn store() -> SchedStore {
    let _ = env_logger::builder().is_test(true).try_init();
    let store = SchedStore::in_memory().expect("in-memory store");
    store.migrate().expect("migration");
    store
}

fn week() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()
}

fn run(run_id: &str, seed: u64) -> (CoachingEngine, WeeklyReport) {
    let engine = CoachingEngine::new(run_id.to_string(), SchedulerConfig::default())
        .expect("default config is valid");
    let report = engine.run_week(week(), RosterGenerator::new(seed, 90).generate(), 4);
    (engine, report)
}

#[test]
fn saved_schedule_round_trips_exactly() {
    let store = store();
    let (engine, report) = run("store-roundtrip", 0x5EED);
    assert!(report.schedule.session_count() > 0, "roster should produce sessions");

    let schedule_id = engine.persist(&store, &report).expect("persist");
    let loaded = store.load_schedule(&schedule_id).expect("load");

    assert_eq!(loaded.schedule_id, schedule_id);
    assert_eq!(loaded.run_id, "store-roundtrip");
    assert_eq!(loaded.schedule, report.schedule, "schedule shape changed on reload");
    assert_eq!(loaded.agents, report.agents, "roster changed on reload");

    assert_eq!(loaded.metadata.session_count, report.metadata.session_count);
    assert_eq!(loaded.metadata.excluded_by_tenure, 4);
    assert_eq!(loaded.metadata.unplaced_needs, report.unplaced.len());
    assert!((loaded.metadata.avg_adjusted_score - report.metadata.avg_adjusted_score).abs() < 1e-9);

    let sessions = store.session_count(&schedule_id).unwrap();
    assert_eq!(sessions as usize, report.schedule.session_count());
    let assignments = store.assignment_count(&schedule_id).unwrap();
    let expected: usize = report.schedule.sessions().map(|s| s.size()).sum();
    assert_eq!(assignments as usize, expected);
}

#[test]
fn unknown_schedule_is_not_found() {
    let store = store();
    assert!(matches!(
        store.load_schedule("no-such-schedule"),
        Err(SchedError::ScheduleNotFound { .. })
    ));
}

#[test]
fn events_are_logged_in_emission_order() {
    let store = store();
    let (engine, report) = run("store-events", 77);
    engine.persist(&store, &report).expect("persist");

    let entries = store.events_for_run("store-events").unwrap();
    assert_eq!(entries.len(), report.events.len());
    assert_eq!(entries.first().map(|e| e.event_type.as_str()), Some("run_started"));
    assert_eq!(entries.last().map(|e| e.event_type.as_str()), Some("run_completed"));

    for (i, entry) in entries.iter().enumerate() {
        assert_eq!(entry.seq, i as u64);
        let event: ScheduleEvent =
            serde_json::from_str(&entry.payload).expect("payload deserializes");
        assert_eq!(coaching_core::event::event_type_name(&event), entry.event_type);
    }

    let committed = store.event_count("store-events", "session_committed").unwrap();
    assert_eq!(committed as usize, report.schedule.session_count());
}

#[test]
fn latest_schedule_for_week_returns_newest_save() {
    let store = store();
    assert!(store.latest_schedule_for_week(week()).unwrap().is_none());

    let (engine, report) = run("store-latest", 3);
    let first = engine.persist(&store, &report).unwrap();
    let second = engine.persist(&store, &report).unwrap();
    assert_ne!(first, second);

    let latest = store
        .latest_schedule_for_week(week())
        .unwrap()
        .expect("a schedule was saved");
    assert_eq!(latest.schedule_id, second);
    assert_eq!(store.schedule_ids_for_run("store-latest").unwrap(), vec![first, second]);
}

#[test]
fn empty_week_persists_and_reloads() {
    let store = store();
    let engine = CoachingEngine::new("store-empty".into(), SchedulerConfig::default()).unwrap();
    let lone = AgentRecord {
        name: "Solo".into(),
        tenure_years: 6.0,
        tier: Tier::Performance,
        location: Location::Atx,
        manager: "Beaumont".into(),
        raw_score: 70.0,
        leads_received: 100.0,
        lead_target: 100.0,
        close_rate: Some(20.0),
        annual_premium: Some(1_200.0),
        place_rate: Some(60.0),
    };
    let report = engine.run_week(week(), vec![lone], 0);
    assert_eq!(report.schedule.session_count(), 0);

    let id = engine.persist(&store, &report).unwrap();
    let loaded = store.load_schedule(&id).unwrap();
    assert_eq!(loaded.schedule, report.schedule);
    assert_eq!(loaded.schedule.days.len(), 4, "empty days are kept");
}

#[test]
fn file_store_reloads_after_reconnect() {
    let path = std::env::temp_dir().join(format!("coaching-{}.db", uuid::Uuid::new_v4()));
    let path_str = path.to_str().expect("temp path is utf-8").to_string();
    let (engine, report) = run("store-file", 21);

    let schedule_id = {
        let store = SchedStore::open(&path_str).expect("open file store");
        store.migrate().expect("migration");
        engine.persist(&store, &report).expect("persist")
    };

    let store = SchedStore::open(&path_str).expect("reopen file store");
    let loaded = store.load_schedule(&schedule_id).expect("load after reconnect");
    assert_eq!(loaded.schedule, report.schedule, "schedule changed across connections");
    assert_eq!(store.events_for_run("store-file").unwrap().len(), report.events.len());
    drop(store);

    for suffix in ["", "-wal", "-shm"] {
        let _ = std::fs::remove_file(format!("{path_str}{suffix}"));
    }
}

#[test]
fn duplicate_roster_names_merge_on_save() {
    let store = store();
    let mut records = RosterGenerator::new(0x5EED, 40).generate();
    let twin = AgentRecord {
        manager: "Someone Else".into(),
        ..records[0].clone()
    };
    let twin_name = twin.name.clone();
    records.push(twin);

    let agents: Vec<Agent> = records.iter().cloned().map(Agent::from_record).collect();
    assert_eq!(duplicate_names(&agents), vec![twin_name.as_str()]);
    assert!(duplicate_names(&agents[..40]).is_empty(), "generated names are unique");

    let engine = CoachingEngine::new("store-dupes".into(), SchedulerConfig::default()).unwrap();
    let report = engine.run_week(week(), records, 0);
    assert_eq!(report.agents.len(), 41);
    assert!(report.schedule.sessions_for(&twin_name) <= 2, "one weekly cap per name");

    let id = engine.persist(&store, &report).unwrap();
    let loaded = store.load_schedule(&id).unwrap();
    assert_eq!(loaded.agents.len(), 40, "the later entry is merged into the first");
    assert_eq!(loaded.agents[0].name, twin_name);
    assert_eq!(loaded.agents[0].manager, report.agents[0].manager);
}
