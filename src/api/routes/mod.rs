//! Route handlers.

pub mod dataset;
pub mod standings;
