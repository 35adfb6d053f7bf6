//! Domain core of the motivation notification engine.
//!
//! This crate holds everything with algorithmic content: progress analysis,
//! eligibility filtering, urgency ranking, message composition, and the two
//! orchestration paths (on-demand and batch). It has no internal crate
//! dependencies; all I/O goes through the capability traits in [`ports`].

pub mod analysis;
pub mod batch;
pub mod compose;
pub mod eligibility;
pub mod encourage;
pub mod error;
pub mod ports;
pub mod ranking;
pub mod types;

pub use error::CoreError;
