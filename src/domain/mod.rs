//! Domain layer: entities and tree invariants
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod engine;
pub mod entities;
pub mod error;
pub mod forest;
pub mod snapshot;

pub use engine::{
    sibling_order, sort_siblings, CategoryLookup, Descendants, Placement, TreeEngine,
    DEFAULT_MAX_DEPTH,
};
pub use entities::*;
pub use error::{DomainError, DomainResult};
pub use forest::{CategoryForest, ForestNode};
pub use snapshot::Snapshot;
