//! Shared primitive types used across the scheduling core.

/// The canonical identifier of one weekly scheduling run.
pub type RunId = String;

/// Agents are identified by their display name across trackers and storage.
pub type AgentName = String;

/// A persisted schedule identifier (UUID v4, hyphenated).
pub type ScheduleId = String;
