//! Core data models: the results dataset, selections and derived standings.

mod dataset;
mod ids;
mod selection;
mod standings;

pub use dataset::*;
pub use ids::*;
pub use selection::*;
pub use standings::*;
