//! Scheduler-owned trackers for one weekly run.
//!
//! `SchedulingContext` holds the three constraint trackers plus the
//! per-day alternation state. It is created fresh for every run and is
//! never shared between runs.
//!
//! RULE: the context only changes through `commit`. A cohort attempt is
//! computed against an immutable context; discarding an attempt is the
//! rollback.

use crate::{
    agent::{Agent, Location, TrainingType},
    config::SchedulerConfig,
    grid::{DayFocus, TimeSlot},
    metrics::Priority,
    types::AgentName,
};
use chrono::Weekday;
use std::collections::HashMap;

/// One agent in a day's candidate pool.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub agent: Agent,
    pub priority: Priority,
}

/// The outcome of filling one (day, slot, location) from a candidate pool.
/// Nothing is applied until `SchedulingContext::commit`.
#[derive(Debug, Clone, PartialEq)]
pub struct CohortAttempt {
    pub day: Weekday,
    pub slot: TimeSlot,
    pub location: Location,
    /// In admission order.
    pub admitted: Vec<Candidate>,
    /// The pool minus `admitted`, original order preserved.
    pub remaining: Vec<Candidate>,
}

impl CohortAttempt {
    pub fn size(&self) -> usize {
        self.admitted.len()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AgentLoad {
    pub sessions: u32,
    pub days: Vec<Weekday>,
    /// Trainings covered by this week's sessions so far.
    pub trainings: Vec<TrainingType>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SchedulingContext {
    max_sessions_per_agent: u32,
    max_agents_per_manager_per_slot: u32,
    agent_load: HashMap<AgentName, AgentLoad>,
    manager_slots: HashMap<(String, Weekday, u8), u32>,
    occupancy: HashMap<(Weekday, u8), Location>,
    last_location: HashMap<Weekday, Location>,
}

impl SchedulingContext {
    pub fn new(config: &SchedulerConfig) -> Self {
        Self {
            max_sessions_per_agent: config.max_sessions_per_agent,
            max_agents_per_manager_per_slot: config.max_agents_per_manager_per_slot,
            agent_load: HashMap::new(),
            manager_slots: HashMap::new(),
            occupancy: HashMap::new(),
            last_location: HashMap::new(),
        }
    }

    // ── Queries ────────────────────────────────────────────────

    pub fn sessions_for(&self, agent: &str) -> u32 {
        self.agent_load.get(agent).map_or(0, |l| l.sessions)
    }

    pub fn has_capacity(&self, agent: &str) -> bool {
        self.sessions_for(agent) < self.max_sessions_per_agent
    }

    pub fn manager_count(&self, manager: &str, day: Weekday, slot: u8) -> u32 {
        self.manager_slots
            .get(&(manager.to_string(), day, slot))
            .copied()
            .unwrap_or(0)
    }

    pub fn manager_has_room(&self, manager: &str, day: Weekday, slot: u8, pending: u32) -> bool {
        self.manager_count(manager, day, slot) + pending < self.max_agents_per_manager_per_slot
    }

    pub fn occupant(&self, day: Weekday, slot: u8) -> Option<Location> {
        self.occupancy.get(&(day, slot)).copied()
    }

    pub fn last_location(&self, day: Weekday) -> Option<Location> {
        self.last_location.get(&day).copied()
    }

    /// Opposite of the day's last scheduled location; CLT when none.
    pub fn location_order(&self, day: Weekday) -> [Location; 2] {
        match self.last_location(day) {
            Some(last) => [last.other(), last],
            None => [Location::Clt, Location::Atx],
        }
    }

    /// Recommended trainings not yet covered this week.
    pub fn outstanding(&self, agent: &Agent) -> Vec<TrainingType> {
        let covered = self.agent_load.get(&agent.name).map(|l| l.trainings.as_slice());
        agent
            .recommendations
            .iter()
            .copied()
            .filter(|t| !covered.is_some_and(|c| c.contains(t)))
            .collect()
    }

    // ── Mutation ───────────────────────────────────────────────

    /// Apply a successful attempt: every tracker moves together.
    pub fn commit(&mut self, attempt: &CohortAttempt, focus: DayFocus) {
        for candidate in &attempt.admitted {
            let covered = match focus {
                DayFocus::Training(t) => vec![t],
                DayFocus::Overflow => self.outstanding(&candidate.agent),
            };
            let load = self
                .agent_load
                .entry(candidate.agent.name.clone())
                .or_default();
            load.sessions += 1;
            load.days.push(attempt.day);
            for t in covered {
                if !load.trainings.contains(&t) {
                    load.trainings.push(t);
                }
            }

            *self
                .manager_slots
                .entry((candidate.agent.manager.clone(), attempt.day, attempt.slot.index))
                .or_insert(0) += 1;
        }
        self.occupancy
            .insert((attempt.day, attempt.slot.index), attempt.location);
        self.last_location.insert(attempt.day, attempt.location);
    }

    /// Record a session booked outside this run (e.g. carried over by an
    /// operator) so it counts against the weekly cap.
    pub fn record_external_session(&mut self, agent: &str, day: Weekday) {
        let load = self.agent_load.entry(agent.to_string()).or_default();
        load.sessions += 1;
        load.days.push(day);
    }

    /// Reserve a slot for a location without creating a session.
    pub fn reserve_slot(&mut self, day: Weekday, slot: u8, location: Location) {
        self.occupancy.insert((day, slot), location);
    }
}
