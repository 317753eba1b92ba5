//! Scheduler output, also the persistence load/save contract.
//! A schedule loaded from the store must be structurally identical to a
//! freshly generated one.

use crate::{
    agent::{Agent, Location, Tier, TrainingType},
    grid::{DayFocus, TimeSlot},
    metrics::{Priority, Stats},
};
use chrono::{NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionTier {
    Performance,
    Standard,
    /// Overflow-day sessions mixing agents with outstanding needs.
    Remediation,
}

impl SessionTier {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Performance => "Performance",
            Self::Standard => "Standard",
            Self::Remediation => "Zero-Need Remediation",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        [Self::Performance, Self::Standard, Self::Remediation]
            .into_iter()
            .find(|t| t.label() == s)
    }
}

impl From<Tier> for SessionTier {
    fn from(tier: Tier) -> Self {
        match tier {
            Tier::Performance => Self::Performance,
            Tier::Standard => Self::Standard,
        }
    }
}

impl fmt::Display for SessionTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingSession {
    pub day: Weekday,
    pub slot: TimeSlot,
    pub location: Location,
    pub tier: SessionTier,
    pub focus: DayFocus,
    pub agents: Vec<Agent>,
    pub priority: Priority,
    /// Human-readable reason this cohort was scheduled.
    pub rationale: String,
    /// 1-based position within the day in slot order; display only.
    pub cohort_number: u32,
}

impl TrainingSession {
    pub fn size(&self) -> usize {
        self.agents.len()
    }

    pub fn contains(&self, agent_name: &str) -> bool {
        self.agents.iter().any(|a| a.name == agent_name)
    }

    /// `"8:00-9:00 AM CST / 9:00-10:00 AM EST"`
    pub fn time_label(&self) -> String {
        self.slot.label()
    }

    /// The slot as seen on this session's own wall clock.
    pub fn local_time_label(&self) -> String {
        self.slot.local_label(self.location)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DaySchedule {
    pub day: Weekday,
    pub focus: DayFocus,
    pub sessions: Vec<TrainingSession>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Schedule {
    /// Monday of the scheduled week.
    pub week_of: NaiveDate,
    pub days: Vec<DaySchedule>,
}

impl Schedule {
    pub fn sessions(&self) -> impl Iterator<Item = &TrainingSession> {
        self.days.iter().flat_map(|d| d.sessions.iter())
    }

    pub fn session_count(&self) -> usize {
        self.days.iter().map(|d| d.sessions.len()).sum()
    }

    pub fn sessions_for(&self, agent_name: &str) -> usize {
        self.sessions().filter(|s| s.contains(agent_name)).count()
    }

    /// Distinct agents placed in at least one session.
    pub fn scheduled_agents(&self) -> BTreeSet<&str> {
        self.sessions()
            .flat_map(|s| s.agents.iter().map(|a| a.name.as_str()))
            .collect()
    }

    pub fn day(&self, day: Weekday) -> Option<&DaySchedule> {
        self.days.iter().find(|d| d.day == day)
    }
}

/// One recommended training the week could not cover.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Unplaced {
    pub agent: String,
    pub location: Location,
    pub training: TrainingType,
}

/// Aggregate figures persisted alongside a schedule.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScheduleMetadata {
    pub avg_raw_score: f64,
    pub avg_adjusted_score: f64,
    pub total_agents: usize,
    pub eligible_agents: usize,
    pub needs_training: usize,
    pub excluded_by_tenure: usize,
    pub scheduled_agents: usize,
    pub unplaced_needs: usize,
    pub session_count: usize,
}

impl ScheduleMetadata {
    pub fn summarize(stats: &Stats, schedule: &Schedule, unplaced: &[Unplaced]) -> Self {
        Self {
            avg_raw_score: stats.avg_raw_score,
            avg_adjusted_score: stats.avg_adjusted_score,
            total_agents: stats.total_agents,
            eligible_agents: stats.eligible_agents,
            needs_training: stats.needs_training,
            excluded_by_tenure: stats.excluded_by_tenure,
            scheduled_agents: schedule.scheduled_agents().len(),
            unplaced_needs: unplaced.len(),
            session_count: schedule.session_count(),
        }
    }
}
