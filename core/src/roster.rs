//! Synthetic agent rosters for demos and invariant sweeps.
//!
//! Same seed + same parameters = same roster, record for record.

use crate::{
    agent::{AgentRecord, Location, Tier},
    name_generator::NameGenerator,
    rng::{RosterRng, RosterStream},
};

#[derive(Debug, Clone)]
pub struct RosterGenerator {
    pub seed: u64,
    pub size: usize,
    pub managers_per_location: usize,
    /// Share of agents with a raw score of exactly zero.
    pub zero_score_rate: f64,
    /// Share of metric values left undefined.
    pub missing_metric_rate: f64,
}

impl RosterGenerator {
    pub fn new(seed: u64, size: usize) -> Self {
        Self {
            seed,
            size,
            managers_per_location: 4,
            zero_score_rate: 0.05,
            missing_metric_rate: 0.05,
        }
    }

    pub fn generate(&self) -> Vec<AgentRecord> {
        let mut names = RosterRng::new(self.seed, RosterStream::Names);
        let mut placement = RosterRng::new(self.seed, RosterStream::Placement);
        let mut scores = RosterRng::new(self.seed, RosterStream::Scores);
        let mut metrics = RosterRng::new(self.seed, RosterStream::Metrics);

        let managers: Vec<(Location, String)> = Location::ALL
            .iter()
            .flat_map(|loc| {
                (0..self.managers_per_location.max(1)).map(move |i| (*loc, i))
            })
            .map(|(loc, i)| (loc, format!("{} ({}{})", NameGenerator::manager_name(&mut names), loc.code(), i + 1)))
            .collect();

        let mut taken: Vec<String> = Vec::with_capacity(self.size);
        let mut records = Vec::with_capacity(self.size);
        for _ in 0..self.size {
            let name = NameGenerator::unique_full_name(&mut names, &taken);
            taken.push(name.clone());

            let (location, manager) = placement.pick(&managers).clone();
            let tier = if placement.chance(0.4) { Tier::Performance } else { Tier::Standard };

            let raw_score = if scores.chance(self.zero_score_rate) {
                0.0
            } else {
                (scores.range(35.0, 100.0) * 10.0).round() / 10.0
            };
            let leads_received = scores.range(30.0, 130.0).round();

            // Performance-tier agents run hotter on every metric.
            let lift = if tier == Tier::Performance { 1.25 } else { 1.0 };
            let mut metric = |lo: f64, hi: f64| {
                if metrics.chance(self.missing_metric_rate) {
                    None
                } else {
                    Some((metrics.range(lo, hi) * lift * 100.0).round() / 100.0)
                }
            };
            let close_rate = metric(5.0, 35.0);
            let annual_premium = metric(400.0, 2_400.0);
            let place_rate = metric(40.0, 80.0);

            records.push(AgentRecord {
                name,
                tenure_years: (placement.range(2.0, 12.0) * 10.0).round() / 10.0,
                tier,
                location,
                manager,
                raw_score,
                leads_received,
                lead_target: 100.0,
                close_rate,
                annual_premium,
                place_rate,
            });
        }
        records
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roster_is_deterministic() {
        let a = RosterGenerator::new(0xC0FFEE, 60).generate();
        let b = RosterGenerator::new(0xC0FFEE, 60).generate();
        assert_eq!(a, b);
    }

    #[test]
    fn roster_covers_both_locations() {
        let roster = RosterGenerator::new(11, 80).generate();
        assert_eq!(roster.len(), 80);
        for loc in Location::ALL {
            assert!(roster.iter().any(|r| r.location == loc), "no agents at {loc}");
        }
        assert!(roster.iter().all(|r| r.tenure_years > 1.9));
    }
}
