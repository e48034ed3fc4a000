//! Paging - moving cold subtrees out of memory and back.
//!
//! # Components
//! - [`Serializer`] - Evicts a node's children to a blob and restores them
//! - [`EvictionScheduler`] - Background thread running periodic sweeps
//! - [`sweep`] - One sweep: pick oversized subtrees and evict them
//! - [`PagingStats`] - Counters for everything above

mod scheduler;
mod serializer;
mod stats;

pub use scheduler::{sweep, EvictionScheduler, SweepPolicy, SweepReport};
pub use serializer::Serializer;
pub use stats::{PagingSnapshot, PagingStats};
