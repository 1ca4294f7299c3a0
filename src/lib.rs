//! # Match Standings
//!
//! Tournament score standings with per-player drop counts.
//!
//! ## Architecture
//!
//! - **models**: Dataset, selection and derived standings types
//! - **calculate**: Map ordering, drop selection and the aggregation engine
//! - **storage**: One-shot dataset loading from a file or URL
//! - **render**: Display formatting and plain-text tables
//! - **api**: REST API endpoints
//! - **export**: Dataset export from osu! multiplayer match history
//! - **config**: Configuration loading and validation

pub mod api;
pub mod calculate;
pub mod config;
pub mod export;
pub mod models;
pub mod render;
pub mod storage;

pub use models::*;
