//! Post-hoc schedule validation.
//!
//! A pure function over a completed schedule. Findings are advisory: the
//! schedule is always returned and persisted, errors are surfaced to an
//! operator for manual correction.

use crate::{
    agent::Location,
    config::SchedulerConfig,
    event::{EventSink, FindingSeverity, ScheduleEvent},
    schedule::{Schedule, SessionTier},
};
use chrono::Weekday;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueKind {
    DuplicateSlot,
    LocationConflict,
    CohortTooSmall,
    CohortTooLarge,
    LunchHour,
    LocationImbalance,
    AgentOverbooked,
    ManagerOverloaded,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationIssue {
    pub kind: IssueKind,
    pub day: Option<Weekday>,
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub warnings: Vec<ValidationIssue>,
    pub errors: Vec<ValidationIssue>,
}

impl ValidationReport {
    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty() && self.errors.is_empty()
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn has(&self, kind: IssueKind) -> bool {
        self.warnings.iter().chain(self.errors.iter()).any(|i| i.kind == kind)
    }

    fn warn(&mut self, kind: IssueKind, day: Option<Weekday>, message: String) {
        self.warnings.push(ValidationIssue { kind, day, message });
    }

    fn error(&mut self, kind: IssueKind, day: Option<Weekday>, message: String) {
        self.errors.push(ValidationIssue { kind, day, message });
    }

    /// Replay findings as events (errors first).
    pub fn emit(&self, sink: &mut dyn EventSink) {
        for issue in &self.errors {
            sink.emit(ScheduleEvent::ValidationFinding {
                severity: FindingSeverity::Error,
                message: issue.message.clone(),
            });
        }
        for issue in &self.warnings {
            sink.emit(ScheduleEvent::ValidationFinding {
                severity: FindingSeverity::Warning,
                message: issue.message.clone(),
            });
        }
    }
}

pub fn validate(schedule: &Schedule, config: &SchedulerConfig) -> ValidationReport {
    let mut report = ValidationReport::default();

    // ── Per-day checks ─────────────────────────────────────────
    for day in &schedule.days {
        let mut by_cell: HashMap<(u8, Location), usize> = HashMap::new();
        let mut by_slot: BTreeMap<u8, Vec<Location>> = BTreeMap::new();

        for session in &day.sessions {
            let label = session.time_label();
            let count = by_cell.entry((session.slot.index, session.location)).or_insert(0);
            *count += 1;
            if *count == 2 {
                report.error(
                    IssueKind::DuplicateSlot,
                    Some(day.day),
                    format!("{}: duplicate {} sessions at {label}", day.day, session.location),
                );
            }

            let locations = by_slot.entry(session.slot.index).or_default();
            if !locations.contains(&session.location) {
                locations.push(session.location);
            }

            let size = session.size();
            if size < config.min_cohort_size && session.tier != SessionTier::Remediation {
                report.warn(
                    IssueKind::CohortTooSmall,
                    Some(day.day),
                    format!(
                        "{}: {} session at {label} has {size} agent(s), below minimum {}",
                        day.day, session.location, config.min_cohort_size
                    ),
                );
            }
            if size > config.max_cohort_size {
                report.error(
                    IssueKind::CohortTooLarge,
                    Some(day.day),
                    format!(
                        "{}: {} session at {label} has {size} agents, above maximum {}",
                        day.day, session.location, config.max_cohort_size
                    ),
                );
            }

            if session.slot.overlaps_lunch() {
                report.error(
                    IssueKind::LunchHour,
                    Some(day.day),
                    format!("{}: {} session scheduled over lunch ({label})", day.day, session.location),
                );
            }
        }

        for (slot, locations) in &by_slot {
            if locations.len() > 1 {
                report.error(
                    IssueKind::LocationConflict,
                    Some(day.day),
                    format!("{}: both locations scheduled in slot {slot}", day.day),
                );
            }
        }
    }

    // ── Location balance ───────────────────────────────────────
    let total = schedule.session_count();
    if total > 0 {
        let clt = schedule.sessions().filter(|s| s.location == Location::Clt).count();
        let clt_share = clt as f64 / total as f64 * 100.0;
        let atx_share = 100.0 - clt_share;
        if (clt_share - atx_share).abs() > config.location_balance_tolerance_pct {
            report.warn(
                IssueKind::LocationImbalance,
                None,
                format!(
                    "location imbalance: CLT {clt_share:.0}% vs ATX {atx_share:.0}% of {total} sessions"
                ),
            );
        }
    }

    // ── Cross-day checks ───────────────────────────────────────
    let mut per_agent: BTreeMap<&str, u32> = BTreeMap::new();
    let mut per_manager_slot: BTreeMap<(&str, u32, u8), (Weekday, u32)> = BTreeMap::new();
    for session in schedule.sessions() {
        for agent in &session.agents {
            *per_agent.entry(agent.name.as_str()).or_insert(0) += 1;
            per_manager_slot
                .entry((
                    agent.manager.as_str(),
                    session.day.num_days_from_monday(),
                    session.slot.index,
                ))
                .or_insert((session.day, 0))
                .1 += 1;
        }
    }

    for (agent, count) in per_agent {
        if count > config.max_sessions_per_agent {
            report.error(
                IssueKind::AgentOverbooked,
                None,
                format!(
                    "{agent} has {count} sessions, above weekly maximum {}",
                    config.max_sessions_per_agent
                ),
            );
        }
    }

    for ((manager, _, slot), (day, count)) in per_manager_slot {
        if count > config.max_agents_per_manager_per_slot {
            report.warn(
                IssueKind::ManagerOverloaded,
                Some(day),
                format!("manager {manager} has {count} agents in slot {slot} on {day}"),
            );
        }
    }

    report
}
