//! Application services
//!
//! Concrete service implementations that orchestrate domain logic.
//! Services depend on I/O boundary traits (MindMapRepository, FileSystem)
//! but are themselves concrete structs, not traits.

mod mindmap;

pub use mindmap::{DeleteMode, ExchangeFormat, MindMapService, MindMapSummary};
