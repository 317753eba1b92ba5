//! Weekly coaching-session scheduler.
//!
//! Assigns one-hour coaching sessions to underperforming sales agents at
//! two locations (CLT, Eastern; ATX, Central) under per-agent,
//! per-manager and per-slot limits. See `engine.rs` for the execution
//! order of one weekly run.

pub mod agent;
pub mod cohort;
pub mod config;
pub mod engine;
pub mod error;
pub mod event;
pub mod grid;
pub mod metrics;
pub mod name_generator;
pub mod rng;
pub mod roster;
pub mod schedule;
pub mod scheduler;
pub mod store;
pub mod tracker;
pub mod types;
pub mod validator;
