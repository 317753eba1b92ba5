//! Structured scheduling events.
//!
//! RULE: the scheduler never logs directly. Every decision worth reporting
//! (slot skipped, cohort below minimum, agent deferred) is emitted as a
//! `ScheduleEvent` through an `EventSink` supplied by the caller.

use crate::{
    agent::Location,
    grid::DayFocus,
    schedule::SessionTier,
    types::RunId,
};
use chrono::{NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

/// Variants are appended, never removed or reordered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ScheduleEvent {
    // ── Run lifecycle ──────────────────────────────
    RunStarted {
        run_id: RunId,
        week_of: NaiveDate,
        agents: usize,
    },
    RunCompleted {
        run_id: RunId,
        sessions: usize,
        unplaced: usize,
    },

    // ── Collecting ─────────────────────────────────
    EligibilityComputed {
        eligible: usize,
        needs_training: usize,
        avg_adjusted_score: f64,
    },
    CohortsBuilt {
        cohorts: usize,
        agents: usize,
    },
    DayStarted {
        day: Weekday,
        focus: DayFocus,
        candidates: usize,
    },

    // ── Assigning ──────────────────────────────────
    SlotSkipped {
        day: Weekday,
        slot: u8,
        occupied_by: Location,
    },
    CohortBelowMinimum {
        day: Weekday,
        slot: u8,
        location: Location,
        size: usize,
    },
    SessionCommitted {
        day: Weekday,
        slot: u8,
        location: Location,
        tier: SessionTier,
        size: usize,
    },
    SlotLeftEmpty {
        day: Weekday,
        slot: u8,
    },

    // ── Closing ────────────────────────────────────
    AgentDeferred {
        day: Weekday,
        agent: String,
        location: Location,
        focus: DayFocus,
    },
    ValidationFinding {
        severity: FindingSeverity,
        message: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FindingSeverity {
    Warning,
    Error,
}

/// Extract a stable string name from a ScheduleEvent variant.
/// Used for the event_type column in event_log.
pub fn event_type_name(event: &ScheduleEvent) -> &'static str {
    match event {
        ScheduleEvent::RunStarted { .. }          => "run_started",
        ScheduleEvent::RunCompleted { .. }        => "run_completed",
        ScheduleEvent::EligibilityComputed { .. } => "eligibility_computed",
        ScheduleEvent::CohortsBuilt { .. }        => "cohorts_built",
        ScheduleEvent::DayStarted { .. }          => "day_started",
        ScheduleEvent::SlotSkipped { .. }         => "slot_skipped",
        ScheduleEvent::CohortBelowMinimum { .. }  => "cohort_below_minimum",
        ScheduleEvent::SessionCommitted { .. }    => "session_committed",
        ScheduleEvent::SlotLeftEmpty { .. }       => "slot_left_empty",
        ScheduleEvent::AgentDeferred { .. }       => "agent_deferred",
        ScheduleEvent::ValidationFinding { .. }   => "validation_finding",
    }
}

/// The event log entry as persisted to SQLite.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventLogEntry {
    pub id: Option<i64>,
    pub run_id: RunId,
    pub seq: u64,
    pub event_type: String,
    pub payload: String, // JSON-serialized ScheduleEvent
}

// ── Sinks ────────────────────────────────────────────────────────────────────

pub trait EventSink {
    fn emit(&mut self, event: ScheduleEvent);
}

/// Forwards events to the `log` facade.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl EventSink for LogSink {
    fn emit(&mut self, event: ScheduleEvent) {
        match &event {
            ScheduleEvent::AgentDeferred { day, agent, location, focus } => {
                log::warn!("{day}: {agent} ({location}) could not be scheduled for {focus}");
            }
            ScheduleEvent::ValidationFinding { severity: FindingSeverity::Error, message } => {
                log::error!("schedule validation: {message}");
            }
            ScheduleEvent::ValidationFinding { severity: FindingSeverity::Warning, message } => {
                log::warn!("schedule validation: {message}");
            }
            ScheduleEvent::RunStarted { .. } | ScheduleEvent::RunCompleted { .. } => {
                log::info!("{event:?}");
            }
            _ => log::debug!("{event:?}"),
        }
    }
}

/// Keeps every event in order. Used by the engine and in tests.
#[derive(Debug, Default, Clone)]
pub struct MemorySink {
    pub events: Vec<ScheduleEvent>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self, event_type: &str) -> usize {
        self.events
            .iter()
            .filter(|e| event_type_name(e) == event_type)
            .count()
    }
}

impl EventSink for MemorySink {
    fn emit(&mut self, event: ScheduleEvent) {
        self.events.push(event);
    }
}

/// Fans one event out to two sinks.
pub struct TeeSink<'a, A: EventSink, B: EventSink> {
    pub first: &'a mut A,
    pub second: &'a mut B,
}

impl<A: EventSink, B: EventSink> EventSink for TeeSink<'_, A, B> {
    fn emit(&mut self, event: ScheduleEvent) {
        self.first.emit(event.clone());
        self.second.emit(event);
    }
}
