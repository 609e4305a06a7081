//! popcat: category tree for a popup store catalog
//!
//! Categories form a forest: every category has at most one parent, names are
//! unique across the catalog and siblings are ordered by a fractional sort key.
//!
//! Layers:
//! - [`domain`]: entities, invariants and the pure [`domain::TreeEngine`]
//! - [`application`]: the [`application::services::CategoryService`] use cases
//! - [`infrastructure`]: the repository port, its stores and the DI container
//! - [`cli`]: the `popcat` command line

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod util;
