//! Store methods for generated schedules and their originating agents.

use crate::{
    agent::{Agent, Location, Tier, TrainingType},
    error::{SchedError, SchedResult},
    grid::{DayFocus, TimeSlot},
    metrics::Priority,
    schedule::{DaySchedule, Schedule, ScheduleMetadata, SessionTier, TrainingSession},
    types::ScheduleId,
};
use chrono::{NaiveDate, NaiveTime, Weekday};
use rusqlite::{params, OptionalExtension, Row};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::SchedStore;

/// A schedule as loaded back from the store, in the same shape the
/// scheduler produces, plus the agent list it was generated from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredSchedule {
    pub schedule_id: ScheduleId,
    pub run_id: String,
    pub schedule: Schedule,
    pub agents: Vec<Agent>,
    pub metadata: ScheduleMetadata,
}

fn corrupt(table: &'static str, detail: String) -> SchedError {
    SchedError::CorruptRecord { table, detail }
}

fn join_trainings(trainings: &[TrainingType]) -> String {
    trainings.iter().map(|t| t.key()).collect::<Vec<_>>().join(",")
}

fn split_trainings(s: &str) -> SchedResult<Vec<TrainingType>> {
    s.split(',')
        .filter(|k| !k.is_empty())
        .map(|k| {
            TrainingType::from_key(k)
                .ok_or_else(|| corrupt("schedule_agent", format!("unknown training '{k}'")))
        })
        .collect()
}

fn parse_day(table: &'static str, s: &str) -> SchedResult<Weekday> {
    s.parse::<Weekday>()
        .map_err(|_| corrupt(table, format!("bad weekday '{s}'")))
}

fn parse_focus(table: &'static str, s: &str) -> SchedResult<DayFocus> {
    DayFocus::from_key(s).ok_or_else(|| corrupt(table, format!("bad day focus '{s}'")))
}

fn parse_location(table: &'static str, s: &str) -> SchedResult<Location> {
    Location::parse(s).ok_or_else(|| corrupt(table, format!("bad location '{s}'")))
}

fn parse_priority(table: &'static str, s: &str) -> SchedResult<Priority> {
    Priority::parse(s).ok_or_else(|| corrupt(table, format!("bad priority '{s}'")))
}

/// Raw agent row; text columns decoded after the query.
struct AgentRow {
    name: String,
    on_roster: bool,
    tenure_years: f64,
    tier: String,
    location: String,
    manager: String,
    raw_score: f64,
    leads_received: f64,
    lead_attainment_pct: f64,
    adjusted_score: f64,
    close_rate: Option<f64>,
    annual_premium: Option<f64>,
    place_rate: Option<f64>,
    recommendations: String,
}

impl AgentRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            name: row.get(0)?,
            on_roster: row.get(1)?,
            tenure_years: row.get(2)?,
            tier: row.get(3)?,
            location: row.get(4)?,
            manager: row.get(5)?,
            raw_score: row.get(6)?,
            leads_received: row.get(7)?,
            lead_attainment_pct: row.get(8)?,
            adjusted_score: row.get(9)?,
            close_rate: row.get(10)?,
            annual_premium: row.get(11)?,
            place_rate: row.get(12)?,
            recommendations: row.get(13)?,
        })
    }

    fn into_agent(self) -> SchedResult<(Agent, bool)> {
        let on_roster = self.on_roster;
        let agent = Agent {
            tier: Tier::parse(&self.tier)
                .ok_or_else(|| corrupt("schedule_agent", format!("bad tier '{}'", self.tier)))?,
            location: parse_location("schedule_agent", &self.location)?,
            recommendations: split_trainings(&self.recommendations)?,
            name: self.name,
            tenure_years: self.tenure_years,
            manager: self.manager,
            raw_score: self.raw_score,
            leads_received: self.leads_received,
            lead_attainment_pct: self.lead_attainment_pct,
            adjusted_score: self.adjusted_score,
            close_rate: self.close_rate,
            annual_premium: self.annual_premium,
            place_rate: self.place_rate,
        };
        Ok((agent, on_roster))
    }
}

struct SessionRow {
    session_id: i64,
    day_position: i64,
    day: String,
    focus: String,
    slot_index: i64,
    central_start: String,
    slot_priority: String,
    location: String,
    tier: String,
    priority: String,
    rationale: String,
    cohort_number: i64,
}

impl SchedStore {
    /// Persist a schedule, its agents and the aggregate metadata in one
    /// transaction. Returns the new schedule id.
    pub fn save_schedule(
        &self,
        run_id: &str,
        schedule: &Schedule,
        agents: &[Agent],
        metadata: &ScheduleMetadata,
    ) -> SchedResult<ScheduleId> {
        let schedule_id = uuid::Uuid::new_v4().to_string();
        let tx = self.conn.unchecked_transaction()?;

        tx.execute(
            "INSERT INTO schedule_week (schedule_id, run_id, week_of, metadata_json, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                schedule_id,
                run_id,
                schedule.week_of.to_string(),
                serde_json::to_string(metadata)?,
                chrono::Utc::now().to_rfc3339(),
            ],
        )?;

        // Roster first, then any session agent missing from it.
        let roster = agents.iter().map(|a| (a, true));
        let extras = schedule.sessions().flat_map(|s| s.agents.iter()).map(|a| (a, false));
        for (position, (agent, on_roster)) in roster.chain(extras).enumerate() {
            tx.execute(
                "INSERT OR IGNORE INTO schedule_agent (
                    schedule_id, name, position, on_roster, tenure_years, tier, location,
                    manager, raw_score, leads_received, lead_attainment_pct, adjusted_score,
                    close_rate, annual_premium, place_rate, recommendations
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16)",
                params![
                    schedule_id,
                    agent.name,
                    position as i64,
                    on_roster,
                    agent.tenure_years,
                    agent.tier.label(),
                    agent.location.code(),
                    agent.manager,
                    agent.raw_score,
                    agent.leads_received,
                    agent.lead_attainment_pct,
                    agent.adjusted_score,
                    agent.close_rate,
                    agent.annual_premium,
                    agent.place_rate,
                    join_trainings(&agent.recommendations),
                ],
            )?;
        }

        for (day_position, day) in schedule.days.iter().enumerate() {
            tx.execute(
                "INSERT INTO schedule_day (schedule_id, position, day, focus)
                 VALUES (?1, ?2, ?3, ?4)",
                params![schedule_id, day_position as i64, day.day.to_string(), day.focus.key()],
            )?;

            for (position, session) in day.sessions.iter().enumerate() {
                tx.execute(
                    "INSERT INTO training_session (
                        schedule_id, day_position, position, day, focus, slot_index,
                        central_start, slot_priority, location, tier, priority,
                        rationale, cohort_number
                    ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
                    params![
                        schedule_id,
                        day_position as i64,
                        position as i64,
                        session.day.to_string(),
                        session.focus.key(),
                        session.slot.index as i64,
                        session.slot.central_start.format("%H:%M").to_string(),
                        session.slot.priority.label(),
                        session.location.code(),
                        session.tier.label(),
                        session.priority.label(),
                        session.rationale,
                        session.cohort_number as i64,
                    ],
                )?;
                let session_id = tx.last_insert_rowid();

                for (agent_position, agent) in session.agents.iter().enumerate() {
                    tx.execute(
                        "INSERT INTO session_assignment (session_id, agent_name, position)
                         VALUES (?1, ?2, ?3)",
                        params![session_id, agent.name, agent_position as i64],
                    )?;
                }
            }
        }

        tx.commit()?;
        log::debug!(
            "Saved schedule {schedule_id} ({} sessions) for week of {}",
            schedule.session_count(),
            schedule.week_of
        );
        Ok(schedule_id)
    }

    /// Rebuild a saved schedule in exactly the generated shape.
    pub fn load_schedule(&self, schedule_id: &str) -> SchedResult<StoredSchedule> {
        let header = self
            .conn
            .query_row(
                "SELECT run_id, week_of, metadata_json FROM schedule_week WHERE schedule_id = ?1",
                params![schedule_id],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(2)?,
                    ))
                },
            )
            .optional()?;
        let Some((run_id, week_of, metadata_json)) = header else {
            return Err(SchedError::ScheduleNotFound {
                schedule_id: schedule_id.to_string(),
            });
        };

        let week_of = NaiveDate::parse_from_str(&week_of, "%Y-%m-%d")
            .map_err(|e| corrupt("schedule_week", format!("bad week_of '{week_of}': {e}")))?;
        let metadata: ScheduleMetadata = serde_json::from_str(&metadata_json)?;

        let all_agents = self.schedule_agents(schedule_id)?;
        let by_name: HashMap<&str, &Agent> =
            all_agents.iter().map(|(a, _)| (a.name.as_str(), a)).collect();

        let mut days = self.schedule_days(schedule_id)?;
        for row in self.session_rows(schedule_id)? {
            let day_position = row.day_position as usize;
            let day = days.get_mut(day_position).ok_or_else(|| {
                corrupt("training_session", format!("day position {day_position} out of range"))
            })?;

            let central_start = NaiveTime::parse_from_str(&row.central_start, "%H:%M")
                .map_err(|e| corrupt("training_session", format!("bad time '{}': {e}", row.central_start)))?;
            let slot = TimeSlot::new(
                row.slot_index as u8,
                central_start,
                parse_priority("training_session", &row.slot_priority)?,
            );

            let agents = self
                .assignment_names(row.session_id)?
                .into_iter()
                .map(|name| {
                    by_name.get(name.as_str()).map(|a| (*a).clone()).ok_or_else(|| {
                        corrupt("session_assignment", format!("unknown agent '{name}'"))
                    })
                })
                .collect::<SchedResult<Vec<_>>>()?;

            day.sessions.push(TrainingSession {
                day: parse_day("training_session", &row.day)?,
                slot,
                location: parse_location("training_session", &row.location)?,
                tier: SessionTier::parse(&row.tier)
                    .ok_or_else(|| corrupt("training_session", format!("bad tier '{}'", row.tier)))?,
                focus: parse_focus("training_session", &row.focus)?,
                agents,
                priority: parse_priority("training_session", &row.priority)?,
                rationale: row.rationale,
                cohort_number: row.cohort_number as u32,
            });
        }

        Ok(StoredSchedule {
            schedule_id: schedule_id.to_string(),
            run_id,
            schedule: Schedule { week_of, days },
            agents: all_agents
                .into_iter()
                .filter(|(_, on_roster)| *on_roster)
                .map(|(agent, _)| agent)
                .collect(),
            metadata,
        })
    }

    /// Most recently saved schedule for a week, if any.
    pub fn latest_schedule_for_week(&self, week_of: NaiveDate) -> SchedResult<Option<StoredSchedule>> {
        let schedule_id: Option<String> = self
            .conn
            .query_row(
                "SELECT schedule_id FROM schedule_week
                 WHERE week_of = ?1
                 ORDER BY created_at DESC, rowid DESC LIMIT 1",
                params![week_of.to_string()],
                |row| row.get(0),
            )
            .optional()?;
        schedule_id.map(|id| self.load_schedule(&id)).transpose()
    }

    pub fn schedule_ids_for_run(&self, run_id: &str) -> SchedResult<Vec<ScheduleId>> {
        let mut stmt = self.conn.prepare(
            "SELECT schedule_id FROM schedule_week WHERE run_id = ?1 ORDER BY rowid ASC",
        )?;
        let ids = stmt
            .query_map(params![run_id], |row| row.get(0))?
            .collect::<Result<Vec<String>, _>>()?;
        Ok(ids)
    }

    // ── Row helpers ───────────────────────────────────────────────

    /// Every stored agent with its on-roster flag, in save order.
    fn schedule_agents(&self, schedule_id: &str) -> SchedResult<Vec<(Agent, bool)>> {
        let mut stmt = self.conn.prepare(
            "SELECT name, on_roster, tenure_years, tier, location, manager, raw_score, leads_received,
                    lead_attainment_pct, adjusted_score, close_rate, annual_premium,
                    place_rate, recommendations
             FROM schedule_agent WHERE schedule_id = ?1
             ORDER BY position ASC",
        )?;
        let rows = stmt
            .query_map(params![schedule_id], AgentRow::from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        rows.into_iter().map(AgentRow::into_agent).collect()
    }

    fn schedule_days(&self, schedule_id: &str) -> SchedResult<Vec<DaySchedule>> {
        let mut stmt = self.conn.prepare(
            "SELECT day, focus FROM schedule_day WHERE schedule_id = ?1 ORDER BY position ASC",
        )?;
        let rows = stmt
            .query_map(params![schedule_id], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
            })?
            .collect::<Result<Vec<_>, _>>()?;
        rows.into_iter()
            .map(|(day, focus)| {
                Ok(DaySchedule {
                    day: parse_day("schedule_day", &day)?,
                    focus: parse_focus("schedule_day", &focus)?,
                    sessions: Vec::new(),
                })
            })
            .collect()
    }

    fn session_rows(&self, schedule_id: &str) -> SchedResult<Vec<SessionRow>> {
        let mut stmt = self.conn.prepare(
            "SELECT session_id, day_position, day, focus, slot_index, central_start,
                    slot_priority, location, tier, priority, rationale, cohort_number
             FROM training_session WHERE schedule_id = ?1
             ORDER BY day_position ASC, position ASC",
        )?;
        let rows = stmt
            .query_map(params![schedule_id], |row| {
                Ok(SessionRow {
                    session_id: row.get(0)?,
                    day_position: row.get(1)?,
                    day: row.get(2)?,
                    focus: row.get(3)?,
                    slot_index: row.get(4)?,
                    central_start: row.get(5)?,
                    slot_priority: row.get(6)?,
                    location: row.get(7)?,
                    tier: row.get(8)?,
                    priority: row.get(9)?,
                    rationale: row.get(10)?,
                    cohort_number: row.get(11)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    fn assignment_names(&self, session_id: i64) -> SchedResult<Vec<String>> {
        let mut stmt = self.conn.prepare_cached(
            "SELECT agent_name FROM session_assignment WHERE session_id = ?1 ORDER BY position ASC",
        )?;
        let names = stmt
            .query_map(params![session_id], |row| row.get(0))?
            .collect::<Result<Vec<String>, _>>()?;
        Ok(names)
    }

    // ── Test / summary helpers ────────────────────────────────────

    /// Number of persisted sessions for a schedule (for tests).
    pub fn session_count(&self, schedule_id: &str) -> SchedResult<i64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM training_session WHERE schedule_id = ?1",
            params![schedule_id],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    /// Number of per-agent assignment rows for a schedule (for tests).
    pub fn assignment_count(&self, schedule_id: &str) -> SchedResult<i64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM session_assignment sa
             JOIN training_session ts ON ts.session_id = sa.session_id
             WHERE ts.schedule_id = ?1",
            params![schedule_id],
            |row| row.get(0),
        )?;
        Ok(count)
    }
}
