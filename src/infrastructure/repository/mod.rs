//! Mind map repositories: one JSON file per map, or process memory.

mod json_file;
mod memory;

pub use json_file::JsonFileRepository;
pub use memory::InMemoryRepository;
