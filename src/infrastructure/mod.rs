//! Infrastructure layer: store adapters, I/O implementations and DI container
//!
//! This layer implements the repository port and wires up services.

pub mod di;
pub mod error;
pub mod store;
pub mod traits;

pub use error::{StoreError, StoreResult};
