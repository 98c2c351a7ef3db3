//! Activity log for kdepanel
//!
//! This crate records every command the panel runs, together with its output
//! and errors, and provides filtering over the recorded lines.

mod buffer;
mod entry;
mod filter;

pub use buffer::{ActivityCounts, ActivityLog};
pub use entry::{ActivityEntry, ActivityKind};
pub use filter::{ActivityFilter, FilterPresets};
