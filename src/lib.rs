//! # Ladder Watch
//!
//! Periodically collects solo-queue ranked stats for a fixed roster of
//! players and serves the latest snapshot over HTTP.
//!
//! ## Architecture
//!
//! - **models**: Identifiers, ranked entries and the snapshot shape
//! - **fetch**: Ranked-ladder API client
//! - **resolve**: Riot ID to summoner identity chain
//! - **ranked**: Ranked entry retrieval and solo-queue selection
//! - **pipeline**: Concurrent per-player aggregation into a snapshot
//! - **storage**: Durable, atomically replaced snapshot
//! - **scheduler**: Periodic, non-overlapping refresh cycles
//! - **view**: Filtering, sorting and table rendering
//! - **api**: REST API endpoints
//! - **config**: Configuration loading and validation

pub mod api;
pub mod config;
pub mod fetch;
pub mod models;
pub mod pipeline;
pub mod ranked;
pub mod resolve;
pub mod scheduler;
pub mod storage;
pub mod view;

pub use models::*;

use std::time::Duration;

/// Parse a human-friendly duration string (e.g., "1h", "30m", "90s", "1d").
pub fn parse_duration(s: &str) -> Option<Duration> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    let (num_str, multiplier) = if let Some(n) = s.strip_suffix('d') {
        (n, 86_400)
    } else if let Some(n) = s.strip_suffix('h') {
        (n, 3600)
    } else if let Some(n) = s.strip_suffix('m') {
        (n, 60)
    } else if let Some(n) = s.strip_suffix('s') {
        (n, 1)
    } else {
        // Default to seconds
        (s, 1)
    };

    let num: u64 = num_str.trim().parse().ok()?;
    num.checked_mul(multiplier).map(Duration::from_secs)
}
