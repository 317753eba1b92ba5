//! Metrics & eligibility engine.
//!
//! Decides who needs training, of what kind, and how urgently:
//!   1. Company averages and the "needs training" count (`compute_stats`)
//!   2. Per-tier 25th-percentile metric thresholds (`compute_tier_percentiles`)
//!   3. Per-agent training recommendations (`assign_recommendations`)
//!   4. Scheduling priority (`priority_level`)
//!
//! Every function is pure and returns zero/empty results on empty input.

use crate::{
    agent::{Agent, Tier, TrainingType},
    config::SchedulerConfig,
};
use serde::{Deserialize, Serialize};
use std::fmt;

// ── Stats ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Stats {
    pub total_agents: usize,
    /// Agents with a raw score above zero.
    pub eligible_agents: usize,
    pub zero_score_agents: usize,
    /// Eligible agents whose adjusted score is below `avg_adjusted_score`.
    pub needs_training: usize,
    /// Mean raw score over agents with raw score > 0.
    pub avg_raw_score: f64,
    /// Mean adjusted score over agents with adjusted score > 0 and leads > 0.
    pub avg_adjusted_score: f64,
    /// Supplied by the intake step; the core never sees these agents.
    pub excluded_by_tenure: usize,
}

impl Stats {
    pub fn with_excluded_by_tenure(mut self, count: usize) -> Self {
        self.excluded_by_tenure = count;
        self
    }
}

pub fn compute_stats(agents: &[Agent]) -> Stats {
    let raw_scores: Vec<f64> = agents
        .iter()
        .filter(|a| a.raw_score > 0.0)
        .map(|a| a.raw_score)
        .collect();
    let adjusted_scores: Vec<f64> = agents
        .iter()
        .filter(|a| a.adjusted_score > 0.0 && a.leads_received > 0.0)
        .map(|a| a.adjusted_score)
        .collect();

    let avg_raw_score = mean(&raw_scores);
    let avg_adjusted_score = mean(&adjusted_scores);

    let needs_training = agents
        .iter()
        .filter(|a| a.is_training_eligible() && a.adjusted_score < avg_adjusted_score)
        .count();

    Stats {
        total_agents: agents.len(),
        eligible_agents: raw_scores.len(),
        zero_score_agents: agents.len() - raw_scores.len(),
        needs_training,
        avg_raw_score,
        avg_adjusted_score,
        excluded_by_tenure: 0,
    }
}

pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

// ── Percentiles ──────────────────────────────────────────────────────────────

/// Lower-index percentile: `sorted[floor(n * p)]`. Not interpolated.
/// Returns 0 for an empty population.
pub fn percentile(values: &[f64], p: f64) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let index = ((sorted.len() as f64 * p).floor() as usize).min(sorted.len() - 1);
    sorted[index]
}

pub fn median(values: &[f64]) -> f64 {
    percentile(values, 0.5)
}

/// Percentile thresholds for one tier.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricThresholds {
    pub close_rate: f64,
    pub annual_premium: f64,
    pub place_rate: f64,
}

impl MetricThresholds {
    pub fn for_training(&self, training: TrainingType) -> f64 {
        match training {
            TrainingType::CloseRate => self.close_rate,
            TrainingType::AnnualPremium => self.annual_premium,
            TrainingType::PlaceRate => self.place_rate,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TierPercentiles {
    pub performance: MetricThresholds,
    pub standard: MetricThresholds,
}

impl TierPercentiles {
    pub fn for_tier(&self, tier: Tier) -> &MetricThresholds {
        match tier {
            Tier::Performance => &self.performance,
            Tier::Standard => &self.standard,
        }
    }
}

/// Positive values of one metric within one tier.
pub fn metric_population(agents: &[Agent], tier: Tier, training: TrainingType) -> Vec<f64> {
    agents
        .iter()
        .filter(|a| a.tier == tier)
        .filter_map(|a| a.metric(training))
        .filter(|v| *v > 0.0)
        .collect()
}

pub fn compute_tier_percentiles(agents: &[Agent]) -> TierPercentiles {
    compute_tier_percentiles_at(agents, SchedulerConfig::default().metric_percentile)
}

pub fn compute_tier_percentiles_at(agents: &[Agent], p: f64) -> TierPercentiles {
    let thresholds = |tier: Tier| MetricThresholds {
        close_rate: percentile(&metric_population(agents, tier, TrainingType::CloseRate), p),
        annual_premium: percentile(
            &metric_population(agents, tier, TrainingType::AnnualPremium),
            p,
        ),
        place_rate: percentile(&metric_population(agents, tier, TrainingType::PlaceRate), p),
    };
    TierPercentiles {
        performance: thresholds(Tier::Performance),
        standard: thresholds(Tier::Standard),
    }
}

// ── Recommendations ──────────────────────────────────────────────────────────

/// Flag each training type whose metric sits strictly below the agent's
/// tier threshold. Zero-score agents always end up with no recommendations.
pub fn assign_recommendations(agents: &mut [Agent], percentiles: &TierPercentiles) {
    for agent in agents.iter_mut() {
        agent.recommendations = recommendations_for(agent, percentiles);
    }
}

pub fn recommendations_for(agent: &Agent, percentiles: &TierPercentiles) -> Vec<TrainingType> {
    if !agent.is_training_eligible() {
        return Vec::new();
    }
    let thresholds = percentiles.for_tier(agent.tier);
    TrainingType::ALL
        .into_iter()
        .filter(|t| matches!(agent.metric(*t), Some(v) if v < thresholds.for_training(*t)))
        .collect()
}

// ── Priority ─────────────────────────────────────────────────────────────────

/// Scheduling urgency. Declaration order is scheduling order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl Priority {
    pub fn label(&self) -> &'static str {
        match self {
            Self::High => "HIGH",
            Self::Medium => "MEDIUM",
            Self::Low => "LOW",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "HIGH" => Some(Self::High),
            "MEDIUM" => Some(Self::Medium),
            "LOW" => Some(Self::Low),
            _ => None,
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Gaps are absolute score differences, not ratios.
pub fn priority_level(score: f64, average: f64) -> Priority {
    let config = SchedulerConfig::default();
    priority_level_with(score, average, &config)
}

pub fn priority_level_with(score: f64, average: f64, config: &SchedulerConfig) -> Priority {
    let gap = average - score;
    if gap >= config.high_priority_gap {
        Priority::High
    } else if gap >= config.medium_priority_gap {
        Priority::Medium
    } else {
        Priority::Low
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percentile_uses_floor_index() {
        // n = 7 → floor(1.75) = 1
        let values = [70.0, 10.0, 30.0, 20.0, 60.0, 50.0, 40.0];
        assert_eq!(percentile(&values, 0.25), 20.0);
        // n = 3 → floor(0.75) = 0
        assert_eq!(percentile(&[9.0, 3.0, 6.0], 0.25), 3.0);
    }

    #[test]
    fn percentile_of_empty_is_zero() {
        assert_eq!(percentile(&[], 0.25), 0.0);
        assert_eq!(median(&[]), 0.0);
    }

    #[test]
    fn priority_boundaries_are_inclusive() {
        assert_eq!(priority_level(30.0, 50.0), Priority::High);
        assert_eq!(priority_level(30.1, 50.0), Priority::Medium);
        assert_eq!(priority_level(40.0, 50.0), Priority::Medium);
        assert_eq!(priority_level(40.5, 50.0), Priority::Low);
        assert_eq!(priority_level(70.0, 50.0), Priority::Low);
    }

    #[test]
    fn high_sorts_before_low() {
        let mut levels = vec![Priority::Low, Priority::High, Priority::Medium];
        levels.sort();
        assert_eq!(levels, vec![Priority::High, Priority::Medium, Priority::Low]);
    }
}
