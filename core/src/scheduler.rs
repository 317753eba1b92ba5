//! Slot-constrained scheduler: places cohorts into the weekly
//! (day × slot × location) grid.
//!
//! Per weekly run:
//!   1. Collecting: build each day's candidate pool from the cohorts
//!   2. Assigning: walk the day's slots by priority, alternate locations,
//!      greedily fill a cohort under the tracker limits
//!   3. Closing: emit sessions; leftovers are reported, never retried
//!
//! Greedy and deterministic. Commitments are final: there is no
//! backtracking across slots or days, and infeasibility is never an error.

use crate::{
    agent::{Agent, Location, Tier, TrainingType},
    cohort::{build_cohorts, company_average_adjusted, Cohort},
    config::SchedulerConfig,
    event::{EventSink, ScheduleEvent},
    grid::{DayFocus, DayPlan, TimeSlot, WeeklyGrid},
    metrics::{priority_level_with, Priority},
    schedule::{DaySchedule, Schedule, SessionTier, TrainingSession, Unplaced},
    tracker::{Candidate, CohortAttempt, SchedulingContext},
};
use chrono::{NaiveDate, Weekday};
use std::collections::HashSet;

/// Result of one weekly run.
#[derive(Debug, Clone)]
pub struct ScheduleOutcome {
    pub schedule: Schedule,
    /// Every (agent, recommended training) pair the week did not cover.
    pub unplaced: Vec<Unplaced>,
    /// Final tracker state, for inspection.
    pub context: SchedulingContext,
}

/// Result of one day's assignment loop.
#[derive(Debug, Clone)]
pub struct DayOutcome {
    pub context: SchedulingContext,
    pub day: DaySchedule,
    /// Candidates no slot could admit.
    pub leftover: Vec<Candidate>,
}

pub struct Scheduler {
    config: SchedulerConfig,
    grid: WeeklyGrid,
}

impl Scheduler {
    pub fn new(config: SchedulerConfig, grid: WeeklyGrid) -> Self {
        Self { config, grid }
    }

    pub fn standard(config: SchedulerConfig) -> Self {
        Self::new(config, WeeklyGrid::standard())
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    pub fn grid(&self) -> &WeeklyGrid {
        &self.grid
    }

    /// Build cohorts from `agents` (recommendations already assigned) and
    /// schedule them.
    pub fn schedule_agents(
        &self,
        week_of: NaiveDate,
        agents: &[Agent],
        sink: &mut dyn EventSink,
    ) -> ScheduleOutcome {
        let cohorts = build_cohorts(agents, self.config.cohort_chunk_size);
        let average = company_average_adjusted(agents);
        self.schedule(week_of, &cohorts, average, sink)
    }

    pub fn schedule(
        &self,
        week_of: NaiveDate,
        cohorts: &[Cohort],
        average: f64,
        sink: &mut dyn EventSink,
    ) -> ScheduleOutcome {
        let context = SchedulingContext::new(&self.config);
        self.schedule_with_context(week_of, cohorts, average, context, sink)
    }

    /// Like `schedule`, starting from an existing tracker state.
    pub fn schedule_with_context(
        &self,
        week_of: NaiveDate,
        cohorts: &[Cohort],
        average: f64,
        mut context: SchedulingContext,
        sink: &mut dyn EventSink,
    ) -> ScheduleOutcome {
        sink.emit(ScheduleEvent::CohortsBuilt {
            cohorts: cohorts.len(),
            agents: cohorts.iter().map(Cohort::len).sum(),
        });

        let mut days = Vec::with_capacity(self.grid.days.len());
        for plan in &self.grid.days {
            let pool = self.candidates_for(&context, cohorts, plan.focus, average);
            sink.emit(ScheduleEvent::DayStarted {
                day: plan.day,
                focus: plan.focus,
                candidates: pool.len(),
            });

            let outcome = self.schedule_day(context, *plan, pool, average, sink);
            context = outcome.context;
            days.push(outcome.day);
        }

        let unplaced = unplaced_needs(&context, cohorts);
        ScheduleOutcome {
            schedule: Schedule { week_of, days },
            unplaced,
            context,
        }
    }

    // ── Collecting ─────────────────────────────────────────────

    /// The day's candidate pool, in scheduling order.
    pub fn candidates_for(
        &self,
        context: &SchedulingContext,
        cohorts: &[Cohort],
        focus: DayFocus,
        average: f64,
    ) -> Vec<Candidate> {
        let mut seen = HashSet::new();
        let mut pool: Vec<Candidate> = cohorts
            .iter()
            .flat_map(|c| c.agents.iter())
            .filter(|a| seen.insert(a.name.as_str()))
            .filter(|a| a.is_training_eligible() && context.has_capacity(&a.name))
            .filter(|a| match focus {
                DayFocus::Training(t) => a.needs(t),
                DayFocus::Overflow => !context.outstanding(a).is_empty(),
            })
            .map(|a| Candidate {
                priority: priority_level_with(a.adjusted_score, average, &self.config),
                agent: a.clone(),
            })
            .collect();

        pool.sort_by(|a, b| {
            let multi_need = |c: &Candidate| {
                focus == DayFocus::Overflow && c.agent.recommendations.len() > 1
            };
            multi_need(b)
                .cmp(&multi_need(a))
                .then(a.priority.cmp(&b.priority))
                .then(a.agent.adjusted_score.total_cmp(&b.agent.adjusted_score))
                .then_with(|| a.agent.name.cmp(&b.agent.name))
        });
        pool
    }

    // ── Assigning ──────────────────────────────────────────────

    pub fn schedule_day(
        &self,
        mut context: SchedulingContext,
        plan: DayPlan,
        mut pool: Vec<Candidate>,
        average: f64,
        sink: &mut dyn EventSink,
    ) -> DayOutcome {
        let day = plan.day;
        let mut sessions: Vec<TrainingSession> = Vec::new();

        for slot in self.grid.slots_by_priority(plan.focus) {
            if pool.is_empty() {
                break;
            }
            if let Some(occupied_by) = context.occupant(day, slot.index) {
                sink.emit(ScheduleEvent::SlotSkipped { day, slot: slot.index, occupied_by });
                continue;
            }

            let mut committed = false;
            for location in context.location_order(day) {
                let attempt = fill_cohort(&context, &self.config, &pool, day, slot, location);
                if attempt.size() < self.config.min_cohort_size {
                    if attempt.size() > 0 {
                        sink.emit(ScheduleEvent::CohortBelowMinimum {
                            day,
                            slot: slot.index,
                            location,
                            size: attempt.size(),
                        });
                    }
                    continue;
                }

                let session = self.build_session(&attempt, plan.focus, &context, average);
                context.commit(&attempt, plan.focus);
                sink.emit(ScheduleEvent::SessionCommitted {
                    day,
                    slot: slot.index,
                    location,
                    tier: session.tier,
                    size: session.size(),
                });
                sessions.push(session);
                pool = attempt.remaining;
                committed = true;
                break;
            }

            if !committed {
                sink.emit(ScheduleEvent::SlotLeftEmpty { day, slot: slot.index });
            }
        }

        for candidate in &pool {
            sink.emit(ScheduleEvent::AgentDeferred {
                day,
                agent: candidate.agent.name.clone(),
                location: candidate.agent.location,
                focus: plan.focus,
            });
        }

        sessions.sort_by_key(|s| (s.slot.index, s.location));
        for (i, session) in sessions.iter_mut().enumerate() {
            session.cohort_number = i as u32 + 1;
        }
        DayOutcome {
            context,
            day: DaySchedule { day, focus: plan.focus, sessions },
            leftover: pool,
        }
    }

    fn build_session(
        &self,
        attempt: &CohortAttempt,
        focus: DayFocus,
        context: &SchedulingContext,
        average: f64,
    ) -> TrainingSession {
        let agents: Vec<Agent> = attempt.admitted.iter().map(|c| c.agent.clone()).collect();
        let priority = attempt
            .admitted
            .iter()
            .map(|c| c.priority)
            .min()
            .unwrap_or(Priority::Low);

        let (tier, rationale) = match focus {
            DayFocus::Training(training) => {
                let tier = majority_tier(&agents);
                let lowest = agents
                    .iter()
                    .map(|a| a.adjusted_score)
                    .fold(f64::INFINITY, f64::min);
                (
                    SessionTier::from(tier),
                    format!(
                        "{priority} priority: {} {tier} agents at {} below tier threshold for {training}; \
                         lowest adjusted score {lowest:.1} vs company average {average:.1}",
                        agents.len(),
                        attempt.location,
                    ),
                )
            }
            DayFocus::Overflow => {
                let mut needs: Vec<TrainingType> = attempt
                    .admitted
                    .iter()
                    .flat_map(|c| context.outstanding(&c.agent))
                    .collect();
                needs.sort();
                needs.dedup();
                let needs: Vec<&str> = needs.iter().map(|t| t.label()).collect();
                (
                    SessionTier::Remediation,
                    format!(
                        "{priority} priority: {} agents at {} with outstanding needs ({})",
                        agents.len(),
                        attempt.location,
                        needs.join(", "),
                    ),
                )
            }
        };

        TrainingSession {
            day: attempt.day,
            slot: attempt.slot,
            location: attempt.location,
            tier,
            focus,
            agents,
            priority,
            rationale,
            // Numbered once the day is sorted into slot order.
            cohort_number: 0,
        }
    }
}

/// Greedily admit candidates for one (day, slot, location).
///
/// Admission rules, checked in pool order: same location, cohort below the
/// cap, agent below the weekly session cap, and the agent's manager below
/// the per-slot cap counting this attempt's earlier admissions.
///
/// Pure: `context` is read, never written.
pub fn fill_cohort(
    context: &SchedulingContext,
    config: &SchedulerConfig,
    pool: &[Candidate],
    day: Weekday,
    slot: TimeSlot,
    location: Location,
) -> CohortAttempt {
    let mut admitted: Vec<Candidate> = Vec::new();
    let mut remaining: Vec<Candidate> = Vec::with_capacity(pool.len());

    for candidate in pool {
        let agent = &candidate.agent;
        let pending_for_manager = admitted
            .iter()
            .filter(|c| c.agent.manager == agent.manager)
            .count() as u32;

        let admit = agent.location == location
            && admitted.len() < config.max_cohort_size
            && context.has_capacity(&agent.name)
            && context.manager_has_room(&agent.manager, day, slot.index, pending_for_manager);

        if admit {
            admitted.push(candidate.clone());
        } else {
            remaining.push(candidate.clone());
        }
    }

    CohortAttempt { day, slot, location, admitted, remaining }
}

/// Majority tier; a tie goes to the first admitted (most in-need) agent.
pub fn majority_tier(agents: &[Agent]) -> Tier {
    let performance = agents.iter().filter(|a| a.tier == Tier::Performance).count();
    let standard = agents.len() - performance;
    match performance.cmp(&standard) {
        std::cmp::Ordering::Greater => Tier::Performance,
        std::cmp::Ordering::Less => Tier::Standard,
        std::cmp::Ordering::Equal => agents.first().map_or(Tier::Performance, |a| a.tier),
    }
}

fn unplaced_needs(context: &SchedulingContext, cohorts: &[Cohort]) -> Vec<Unplaced> {
    let mut seen = HashSet::new();
    cohorts
        .iter()
        .flat_map(|c| c.agents.iter())
        .filter(|a| seen.insert(a.name.as_str()))
        .flat_map(|a| {
            context.outstanding(a).into_iter().map(move |training| Unplaced {
                agent: a.name.clone(),
                location: a.location,
                training,
            })
        })
        .collect()
}
