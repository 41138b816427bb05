//! Application layer: graph surgery, interchange and use cases
//!
//! This layer orchestrates domain logic and depends on I/O boundary traits.

pub mod error;
pub mod error_ext;
pub mod outline;
pub mod services;
pub mod surgery;

pub use error::{ApplicationError, ApplicationResult};
pub use error_ext::IoResultExt;
pub use outline::{export_text, import_text, parse_outline};
