//! Agents, their tier and location, and the training types they can need.

use crate::types::AgentName;
use serde::{Deserialize, Serialize};
use std::fmt;

// ── Enumerations ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    Performance,
    Standard,
}

impl Tier {
    pub const ALL: [Tier; 2] = [Tier::Performance, Tier::Standard];

    pub fn label(&self) -> &'static str {
        match self {
            Self::Performance => "Performance",
            Self::Standard => "Standard",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "performance" => Some(Self::Performance),
            "standard" => Some(Self::Standard),
            _ => None,
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// The two office locations. CLT runs on Eastern time, ATX on Central.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Location {
    #[serde(rename = "CLT")]
    Clt,
    #[serde(rename = "ATX")]
    Atx,
}

impl Location {
    pub const ALL: [Location; 2] = [Location::Clt, Location::Atx];

    pub fn code(&self) -> &'static str {
        match self {
            Self::Clt => "CLT",
            Self::Atx => "ATX",
        }
    }

    /// Time zone abbreviation used in slot labels.
    pub fn zone(&self) -> &'static str {
        match self {
            Self::Clt => "EST",
            Self::Atx => "CST",
        }
    }

    /// Hours this location's wall clock runs ahead of Central time.
    pub fn offset_from_central(&self) -> i64 {
        match self {
            Self::Clt => 1,
            Self::Atx => 0,
        }
    }

    pub fn other(&self) -> Self {
        match self {
            Self::Clt => Self::Atx,
            Self::Atx => Self::Clt,
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "CLT" => Some(Self::Clt),
            "ATX" => Some(Self::Atx),
            _ => None,
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Metric-specific trainings. Declaration order is the order
/// recommendations are listed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrainingType {
    CloseRate,
    AnnualPremium,
    PlaceRate,
}

impl TrainingType {
    pub const ALL: [TrainingType; 3] = [
        TrainingType::CloseRate,
        TrainingType::AnnualPremium,
        TrainingType::PlaceRate,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Self::CloseRate => "Close Rate Training",
            Self::AnnualPremium => "Annual Premium Training",
            Self::PlaceRate => "Place Rate Training",
        }
    }

    /// Stable storage key.
    pub fn key(&self) -> &'static str {
        match self {
            Self::CloseRate => "close_rate",
            Self::AnnualPremium => "annual_premium",
            Self::PlaceRate => "place_rate",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.key() == key)
    }
}

impl fmt::Display for TrainingType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ── Intake ───────────────────────────────────────────────────────────────────

/// One row as produced by the upstream report parser.
/// Tenure filtering has already happened by the time a record arrives here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentRecord {
    pub name: AgentName,
    pub tenure_years: f64,
    pub tier: Tier,
    pub location: Location,
    pub manager: String,
    pub raw_score: f64,
    pub leads_received: f64,
    pub lead_target: f64,
    #[serde(default)]
    pub close_rate: Option<f64>,
    #[serde(default)]
    pub annual_premium: Option<f64>,
    #[serde(default)]
    pub place_rate: Option<f64>,
}

// ── Agent ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Agent {
    pub name: AgentName,
    pub tenure_years: f64,
    pub tier: Tier,
    pub location: Location,
    pub manager: String,
    pub raw_score: f64,
    pub leads_received: f64,
    /// Capped at 100.
    pub lead_attainment_pct: f64,
    /// `raw_score * lead_attainment_pct / 100`, never above `raw_score`.
    pub adjusted_score: f64,
    pub close_rate: Option<f64>,
    pub annual_premium: Option<f64>,
    pub place_rate: Option<f64>,
    /// Filled by `metrics::assign_recommendations`.
    #[serde(default)]
    pub recommendations: Vec<TrainingType>,
}

impl Agent {
    pub fn from_record(record: AgentRecord) -> Self {
        let raw_score = record.raw_score.max(0.0);
        let lead_attainment_pct = lead_attainment(record.leads_received, record.lead_target);
        Self {
            adjusted_score: raw_score * lead_attainment_pct / 100.0,
            name: record.name,
            tenure_years: record.tenure_years,
            tier: record.tier,
            location: record.location,
            manager: record.manager,
            raw_score,
            leads_received: record.leads_received.max(0.0),
            lead_attainment_pct,
            close_rate: record.close_rate,
            annual_premium: record.annual_premium,
            place_rate: record.place_rate,
            recommendations: Vec::new(),
        }
    }

    /// The agent's value for the metric behind a training type.
    pub fn metric(&self, training: TrainingType) -> Option<f64> {
        match training {
            TrainingType::CloseRate => self.close_rate,
            TrainingType::AnnualPremium => self.annual_premium,
            TrainingType::PlaceRate => self.place_rate,
        }
    }

    /// Zero-score agents are excluded from every training path.
    pub fn is_training_eligible(&self) -> bool {
        self.raw_score > 0.0
    }

    pub fn needs(&self, training: TrainingType) -> bool {
        self.recommendations.contains(&training)
    }
}

/// Percentage of the lead target actually received, capped to [0, 100].
pub fn lead_attainment(leads_received: f64, lead_target: f64) -> f64 {
    if lead_target <= 0.0 || leads_received <= 0.0 {
        return 0.0;
    }
    (leads_received / lead_target * 100.0).min(100.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(raw: f64, leads: f64, target: f64) -> AgentRecord {
        AgentRecord {
            name: "Dana Whitfield".into(),
            tenure_years: 3.0,
            tier: Tier::Standard,
            location: Location::Atx,
            manager: "Ortega".into(),
            raw_score: raw,
            leads_received: leads,
            lead_target: target,
            close_rate: Some(12.0),
            annual_premium: None,
            place_rate: None,
        }
    }

    #[test]
    fn attainment_is_capped_at_one_hundred() {
        let agent = Agent::from_record(record(80.0, 150.0, 100.0));
        assert_eq!(agent.lead_attainment_pct, 100.0);
        assert_eq!(agent.adjusted_score, 80.0);
    }

    #[test]
    fn adjusted_score_scales_with_attainment() {
        let agent = Agent::from_record(record(80.0, 50.0, 100.0));
        assert_eq!(agent.lead_attainment_pct, 50.0);
        assert_eq!(agent.adjusted_score, 40.0);
        assert!(agent.adjusted_score <= agent.raw_score);
    }

    #[test]
    fn zero_target_means_zero_attainment() {
        let agent = Agent::from_record(record(80.0, 50.0, 0.0));
        assert_eq!(agent.lead_attainment_pct, 0.0);
        assert_eq!(agent.adjusted_score, 0.0);
    }

    #[test]
    fn location_codes_round_trip() {
        for loc in Location::ALL {
            assert_eq!(Location::parse(loc.code()), Some(loc));
        }
        assert_eq!(Location::Clt.other(), Location::Atx);
    }
}
