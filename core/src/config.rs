use crate::error::{SchedError, SchedResult};
use serde::{Deserialize, Serialize};

/// Every tunable constant the scheduling core reads.
///
/// The slot table and weekday focus are NOT configurable: they are fixed by
/// construction in `grid.rs` so the lunch window can never be scheduled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Weekly cap on sessions per agent.
    pub max_sessions_per_agent: u32,
    /// Cap on one manager's agents inside a single (day, slot).
    pub max_agents_per_manager_per_slot: u32,
    /// Smallest cohort that may be committed as a session.
    pub min_cohort_size: usize,
    /// Largest cohort a slot may hold.
    pub max_cohort_size: usize,
    /// Chunk size used by the cohort builder's pre-grouping pass.
    pub cohort_chunk_size: usize,
    /// Score gap below the average that makes an agent HIGH priority.
    pub high_priority_gap: f64,
    /// Score gap below the average that makes an agent MEDIUM priority.
    pub medium_priority_gap: f64,
    /// Percentile used for the per-tier metric thresholds.
    pub metric_percentile: f64,
    /// Maximum allowed difference, in percentage points, between the
    /// two locations' shares of all sessions before a balance warning.
    pub location_balance_tolerance_pct: f64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            max_sessions_per_agent: 2,
            max_agents_per_manager_per_slot: 2,
            min_cohort_size: 2,
            max_cohort_size: 5,
            cohort_chunk_size: 3,
            high_priority_gap: 20.0,
            medium_priority_gap: 10.0,
            metric_percentile: 0.25,
            location_balance_tolerance_pct: 30.0,
        }
    }
}

impl SchedulerConfig {
    /// Load from `{data_dir}/scheduler_config.json`.
    /// Missing keys fall back to the defaults.
    pub fn load(data_dir: &str) -> anyhow::Result<Self> {
        let path = format!("{data_dir}/scheduler_config.json");
        let content = std::fs::read_to_string(&path)
            .map_err(|e| anyhow::anyhow!("Cannot read {path}: {e}"))?;
        let config: SchedulerConfig = serde_json::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Cannot parse {path}: {e}"))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject combinations the scheduler cannot honour.
    pub fn validate(&self) -> SchedResult<()> {
        let fail = |reason: String| Err(SchedError::InvalidConfig { reason });

        if self.min_cohort_size == 0 {
            return fail("min_cohort_size must be at least 1".into());
        }
        if self.min_cohort_size > self.max_cohort_size {
            return fail(format!(
                "min_cohort_size ({}) exceeds max_cohort_size ({})",
                self.min_cohort_size, self.max_cohort_size
            ));
        }
        if self.cohort_chunk_size == 0 {
            return fail("cohort_chunk_size must be at least 1".into());
        }
        if self.max_sessions_per_agent == 0 {
            return fail("max_sessions_per_agent must be at least 1".into());
        }
        if self.max_agents_per_manager_per_slot == 0 {
            return fail("max_agents_per_manager_per_slot must be at least 1".into());
        }
        if self.medium_priority_gap > self.high_priority_gap {
            return fail(format!(
                "medium_priority_gap ({}) exceeds high_priority_gap ({})",
                self.medium_priority_gap, self.high_priority_gap
            ));
        }
        if !(0.0..1.0).contains(&self.metric_percentile) {
            return fail(format!(
                "metric_percentile must be in [0, 1), got {}",
                self.metric_percentile
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        SchedulerConfig::default().validate().unwrap();
    }

    #[test]
    fn partial_json_falls_back_to_defaults() {
        let config: SchedulerConfig =
            serde_json::from_str(r#"{ "max_cohort_size": 4 }"#).unwrap();
        assert_eq!(config.max_cohort_size, 4);
        assert_eq!(config.min_cohort_size, 2);
        assert_eq!(config.max_sessions_per_agent, 2);
    }

    #[test]
    fn inverted_cohort_bounds_rejected() {
        let config = SchedulerConfig {
            min_cohort_size: 6,
            ..SchedulerConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(SchedError::InvalidConfig { .. })
        ));
    }
}
