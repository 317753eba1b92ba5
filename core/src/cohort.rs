//! Cohort builder: partitions the training-eligible population into
//! per-location, per-tier batches of bounded size, most in-need first.
//!
//! Chunking is pure fixed-size slicing in rank order. The chunk size is a
//! pre-grouping hint: the scheduler re-forms groups per training type and
//! applies its own (larger) slot cap.

use crate::{
    agent::{Agent, Location, Tier},
    metrics::mean,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cohort {
    pub location: Location,
    pub tier: Tier,
    /// Ascending adjusted score.
    pub agents: Vec<Agent>,
}

impl Cohort {
    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    /// True when this chunk alone could not form a session.
    pub fn is_below_minimum(&self, min_size: usize) -> bool {
        self.agents.len() < min_size
    }
}

/// Bucket order: CLT before ATX, Performance before Standard.
pub const BUCKET_ORDER: [(Location, Tier); 4] = [
    (Location::Clt, Tier::Performance),
    (Location::Clt, Tier::Standard),
    (Location::Atx, Tier::Performance),
    (Location::Atx, Tier::Standard),
];

/// Mean adjusted score over agents with a positive adjusted score.
pub fn company_average_adjusted(agents: &[Agent]) -> f64 {
    let scores: Vec<f64> = agents
        .iter()
        .filter(|a| a.adjusted_score > 0.0)
        .map(|a| a.adjusted_score)
        .collect();
    mean(&scores)
}

/// Raw score > 0 and 0 < adjusted < company average.
pub fn eligible_agents(agents: &[Agent]) -> Vec<&Agent> {
    let average = company_average_adjusted(agents);
    agents
        .iter()
        .filter(|a| a.is_training_eligible())
        .filter(|a| a.adjusted_score > 0.0 && a.adjusted_score < average)
        .collect()
}

pub fn build_cohorts(agents: &[Agent], max_size: usize) -> Vec<Cohort> {
    let max_size = max_size.max(1);
    let eligible = eligible_agents(agents);

    let mut cohorts = Vec::new();
    for (location, tier) in BUCKET_ORDER {
        let mut bucket: Vec<&Agent> = eligible
            .iter()
            .copied()
            .filter(|a| a.location == location && a.tier == tier)
            .collect();
        bucket.sort_by(|a, b| {
            a.adjusted_score
                .total_cmp(&b.adjusted_score)
                .then_with(|| a.name.cmp(&b.name))
        });

        for chunk in bucket.chunks(max_size) {
            cohorts.push(Cohort {
                location,
                tier,
                agents: chunk.iter().map(|a| (*a).clone()).collect(),
            });
        }
    }

    log::debug!(
        "Built {} cohorts from {} eligible agents (chunk size {max_size})",
        cohorts.len(),
        eligible.len()
    );
    cohorts
}
