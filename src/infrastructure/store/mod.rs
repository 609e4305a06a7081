//! Category repository adapters

mod file_lock;
mod memory;
mod toml_file;
mod working_set;

pub use memory::MemoryStore;
pub use toml_file::TomlFileStore;
