//! In-process TTL cache implementing the engine's `Cache` port.
//!
//! Stands in for a shared Redis instance with the same write contract; the
//! port boundary keeps a networked adapter drop-in.

pub mod memory;

pub use memory::MemoryCache;
