//! Application services
//!
//! Concrete service implementations that orchestrate domain logic.
//! Services depend on I/O boundary traits (CategoryRepository)
//! but are themselves concrete structs, not traits.

mod category;

pub use category::CategoryService;
