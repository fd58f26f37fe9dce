pub mod entities;
pub mod interface;
mod migrations;
pub mod sql;

/// Most events returned by a single listing.
pub const DEFAULT_RECENT_LIMIT: usize = 50;
