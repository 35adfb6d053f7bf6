//! HTTP client for the goal-tracking service, implementing the engine's
//! `GoalTracking` port.

pub mod client;

pub use client::{GoalServiceClient, GoalServiceConfig};
