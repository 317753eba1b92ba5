//! The fixed weekly grid: working days, each day's training focus, and the
//! one-hour slot table.
//!
//! RULE: the slot table is built here and nowhere else. Lunch (12:00-1:00
//! local at either site) is excluded by construction, never filtered at
//! runtime.
//!
//! Slots carry a Central-time start; Eastern wall clock is derived. The
//! combined `"… CST / … EST"` label is rendered only for display.

use crate::{
    agent::{Location, TrainingType},
    metrics::Priority,
};
use chrono::{Duration, NaiveTime, Weekday};
use serde::{Deserialize, Serialize};
use std::fmt;

fn central(hour: i64) -> NaiveTime {
    NaiveTime::default() + Duration::hours(hour)
}

fn lunch_start() -> NaiveTime {
    central(12)
}

fn lunch_end() -> NaiveTime {
    central(13)
}

// ── Day focus ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "training", rename_all = "snake_case")]
pub enum DayFocus {
    Training(TrainingType),
    /// Agents with more than one need, or unplaced on their primary day.
    Overflow,
}

impl DayFocus {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Training(t) => t.label(),
            Self::Overflow => "Overflow / Remediation",
        }
    }

    pub fn key(&self) -> &'static str {
        match self {
            Self::Training(t) => t.key(),
            Self::Overflow => "overflow",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        if key == "overflow" {
            return Some(Self::Overflow);
        }
        TrainingType::from_key(key).map(Self::Training)
    }
}

impl fmt::Display for DayFocus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayPlan {
    pub day: Weekday,
    pub focus: DayFocus,
}

// ── Time slots ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimeSlot {
    /// Position in the slot table; stable across runs.
    pub index: u8,
    /// Start of the hour, Central time.
    pub central_start: NaiveTime,
    pub priority: Priority,
}

impl TimeSlot {
    pub fn new(index: u8, central_start: NaiveTime, priority: Priority) -> Self {
        Self { index, central_start, priority }
    }

    pub fn start_in(&self, location: Location) -> NaiveTime {
        self.central_start + Duration::hours(location.offset_from_central())
    }

    pub fn end_in(&self, location: Location) -> NaiveTime {
        self.start_in(location) + Duration::hours(1)
    }

    /// True when the hour touches 12:00-1:00 local at either site.
    pub fn overlaps_lunch(&self) -> bool {
        Location::ALL
            .iter()
            .any(|loc| self.start_in(*loc) < lunch_end() && self.end_in(*loc) > lunch_start())
    }

    /// Ends by noon at both sites.
    pub fn is_morning(&self) -> bool {
        Location::ALL.iter().all(|loc| self.end_in(*loc) <= lunch_start())
    }

    /// `"9:00-10:00 AM EST"`
    pub fn local_label(&self, location: Location) -> String {
        format!(
            "{}-{} {}",
            self.start_in(location).format("%-I:%M"),
            self.end_in(location).format("%-I:%M %p"),
            location.zone()
        )
    }

    /// `"8:00-9:00 AM CST / 9:00-10:00 AM EST"`, the display/export convention.
    pub fn label(&self) -> String {
        format!(
            "{} / {}",
            self.local_label(Location::Atx),
            self.local_label(Location::Clt)
        )
    }
}

impl fmt::Display for TimeSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

/// Central 8-9 and 1-2 (pre-peak / post-lunch) are the preferred hours.
pub fn standard_slots() -> Vec<TimeSlot> {
    [
        (8, Priority::High),
        (9, Priority::Medium),
        (10, Priority::Low),
        (13, Priority::High),
        (14, Priority::Medium),
        (15, Priority::Low),
    ]
    .into_iter()
    .enumerate()
    .map(|(i, (hour, priority))| TimeSlot::new(i as u8, central(hour), priority))
    .collect()
}

// ── Grid ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeeklyGrid {
    pub days: Vec<DayPlan>,
    pub slots: Vec<TimeSlot>,
}

impl Default for WeeklyGrid {
    fn default() -> Self {
        Self::standard()
    }
}

impl WeeklyGrid {
    /// Tue/Wed/Thu each carry one metric training; Fri is overflow.
    pub fn standard() -> Self {
        Self {
            days: vec![
                DayPlan { day: Weekday::Tue, focus: DayFocus::Training(TrainingType::CloseRate) },
                DayPlan { day: Weekday::Wed, focus: DayFocus::Training(TrainingType::AnnualPremium) },
                DayPlan { day: Weekday::Thu, focus: DayFocus::Training(TrainingType::PlaceRate) },
                DayPlan { day: Weekday::Fri, focus: DayFocus::Overflow },
            ],
            slots: standard_slots(),
        }
    }

    pub fn slot(&self, index: u8) -> Option<&TimeSlot> {
        self.slots.iter().find(|s| s.index == index)
    }

    /// The slots tried on `focus`'s day, highest slot priority first.
    /// Overflow days only use the morning subset.
    pub fn slots_by_priority(&self, focus: DayFocus) -> Vec<TimeSlot> {
        let mut slots: Vec<TimeSlot> = self
            .slots
            .iter()
            .copied()
            .filter(|s| focus != DayFocus::Overflow || s.is_morning())
            .collect();
        // Stable: equal priorities keep table order.
        slots.sort_by_key(|s| s.priority);
        slots
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slot_table_never_touches_lunch() {
        let slots = standard_slots();
        assert_eq!(slots.len(), 6);
        assert!(slots.iter().all(|s| !s.overlaps_lunch()));
    }

    #[test]
    fn central_eleven_is_eastern_lunch() {
        let slot = TimeSlot::new(99, central(11), Priority::Low);
        assert!(slot.overlaps_lunch());
        let slot = TimeSlot::new(99, central(12), Priority::Low);
        assert!(slot.overlaps_lunch());
    }

    #[test]
    fn combined_label_format() {
        let first = standard_slots()[0];
        assert_eq!(first.label(), "8:00-9:00 AM CST / 9:00-10:00 AM EST");
        assert_eq!(first.local_label(Location::Clt), "9:00-10:00 AM EST");
    }

    #[test]
    fn overflow_day_uses_morning_slots_only() {
        let grid = WeeklyGrid::standard();
        let slots = grid.slots_by_priority(DayFocus::Overflow);
        assert_eq!(slots.len(), 3);
        assert!(slots.iter().all(|s| s.is_morning()));
        // HIGH first, then MEDIUM, then LOW
        assert_eq!(slots[0].priority, Priority::High);
        assert_eq!(slots[2].priority, Priority::Low);
    }

    #[test]
    fn focus_day_slot_order_is_stable_by_priority() {
        let grid = WeeklyGrid::standard();
        let order: Vec<u8> = grid
            .slots_by_priority(DayFocus::Training(TrainingType::CloseRate))
            .iter()
            .map(|s| s.index)
            .collect();
        assert_eq!(order, vec![0, 3, 1, 4, 2, 5]);
    }
}
