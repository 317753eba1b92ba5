//! The weekly coaching engine: one scheduling run, end to end.
//!
//! EXECUTION ORDER (fixed, documented, never reordered):
//!   1. Intake: agent records → agents (attainment, adjusted score)
//!   2. Metrics: company stats, per-tier percentile thresholds
//!   3. Eligibility: per-agent training recommendations
//!   4. Cohorts: location × tier pre-grouping
//!   5. Scheduler: greedy slot-constrained placement
//!   6. Validator: advisory invariant check
//!
//! RULES:
//!   - Data flows strictly forward; nothing downstream mutates upstream state.
//!   - Each run gets fresh trackers; runs never share state.
//!   - Persistence happens after the run, never during it.

use crate::{
    agent::{Agent, AgentRecord},
    config::SchedulerConfig,
    error::SchedResult,
    event::{event_type_name, EventLogEntry, EventSink, LogSink, MemorySink, ScheduleEvent, TeeSink},
    metrics::{assign_recommendations, compute_stats, compute_tier_percentiles_at, Stats, TierPercentiles},
    schedule::{Schedule, ScheduleMetadata, Unplaced},
    scheduler::Scheduler,
    store::SchedStore,
    types::{RunId, ScheduleId},
    validator::{validate, ValidationReport},
};
use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Everything one weekly run produces.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeeklyReport {
    pub run_id: RunId,
    pub stats: Stats,
    pub percentiles: TierPercentiles,
    /// The roster with recommendations assigned.
    pub agents: Vec<Agent>,
    pub schedule: Schedule,
    pub unplaced: Vec<Unplaced>,
    pub validation: ValidationReport,
    pub metadata: ScheduleMetadata,
    pub events: Vec<ScheduleEvent>,
}

pub struct CoachingEngine {
    pub run_id: RunId,
    config: SchedulerConfig,
    scheduler: Scheduler,
}

impl CoachingEngine {
    pub fn new(run_id: RunId, config: SchedulerConfig) -> SchedResult<Self> {
        config.validate()?;
        Ok(Self {
            run_id,
            scheduler: Scheduler::standard(config.clone()),
            config,
        })
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    /// Run one week from raw intake records.
    pub fn run_week(
        &self,
        week_of: NaiveDate,
        records: Vec<AgentRecord>,
        excluded_by_tenure: usize,
    ) -> WeeklyReport {
        let agents = records.into_iter().map(Agent::from_record).collect();
        self.run_week_with_agents(week_of, agents, excluded_by_tenure)
    }

    /// Run one week from already-built agents. Existing recommendations
    /// are recomputed.
    pub fn run_week_with_agents(
        &self,
        week_of: NaiveDate,
        mut agents: Vec<Agent>,
        excluded_by_tenure: usize,
    ) -> WeeklyReport {
        let week_of = monday_of(week_of);
        let mut memory = MemorySink::new();
        let mut logger = LogSink;
        let mut sink = TeeSink { first: &mut memory, second: &mut logger };

        sink.emit(ScheduleEvent::RunStarted {
            run_id: self.run_id.clone(),
            week_of,
            agents: agents.len(),
        });

        // Names are the identity key: the scheduler and the store keep one entry per name.
        for name in duplicate_names(&agents) {
            log::warn!("Roster lists agent {name} more than once; entries are merged by name");
        }

        let stats = compute_stats(&agents).with_excluded_by_tenure(excluded_by_tenure);
        let percentiles = compute_tier_percentiles_at(&agents, self.config.metric_percentile);
        assign_recommendations(&mut agents, &percentiles);
        sink.emit(ScheduleEvent::EligibilityComputed {
            eligible: stats.eligible_agents,
            needs_training: stats.needs_training,
            avg_adjusted_score: stats.avg_adjusted_score,
        });

        let outcome = self.scheduler.schedule_agents(week_of, &agents, &mut sink);

        let validation = validate(&outcome.schedule, &self.config);
        validation.emit(&mut sink);

        let metadata = ScheduleMetadata::summarize(&stats, &outcome.schedule, &outcome.unplaced);
        sink.emit(ScheduleEvent::RunCompleted {
            run_id: self.run_id.clone(),
            sessions: metadata.session_count,
            unplaced: outcome.unplaced.len(),
        });

        WeeklyReport {
            run_id: self.run_id.clone(),
            stats,
            percentiles,
            agents,
            schedule: outcome.schedule,
            unplaced: outcome.unplaced,
            validation,
            metadata,
            events: memory.events,
        }
    }

    /// Persist a finished run: run row, event log, schedule.
    /// Validation errors never block persistence.
    pub fn persist(&self, store: &SchedStore, report: &WeeklyReport) -> SchedResult<ScheduleId> {
        if !store.run_exists(&report.run_id)? {
            store.insert_run(&report.run_id, report.schedule.week_of, env!("CARGO_PKG_VERSION"))?;
        }

        for (seq, event) in report.events.iter().enumerate() {
            let entry = EventLogEntry {
                id: None,
                run_id: report.run_id.clone(),
                seq: seq as u64,
                event_type: event_type_name(event).to_string(),
                payload: serde_json::to_string(event)?,
            };
            store.append_event(&entry)?;
        }

        let schedule_id =
            store.save_schedule(&report.run_id, &report.schedule, &report.agents, &report.metadata)?;
        log::info!(
            "Persisted schedule {schedule_id}: {} sessions, {} unplaced needs, {} validation errors",
            report.metadata.session_count,
            report.unplaced.len(),
            report.validation.errors.len()
        );
        Ok(schedule_id)
    }
}

/// The Monday starting the week that contains `date`.
pub fn monday_of(date: NaiveDate) -> NaiveDate {
    date - Duration::days(date.weekday().num_days_from_monday() as i64)
}

/// Agent names that appear more than once in the roster, sorted.
pub fn duplicate_names(agents: &[Agent]) -> Vec<&str> {
    let mut seen = BTreeSet::new();
    let mut repeated = BTreeSet::new();
    for agent in agents {
        if !seen.insert(agent.name.as_str()) {
            repeated.insert(agent.name.as_str());
        }
    }
    repeated.into_iter().collect()
}
