//! Mind-map model with graph surgery.
//!
//! Layers, innermost first: `domain` (model and invariants), `application`
//! (surgery, outline interchange, use cases), `infrastructure` (storage and
//! wiring) and `cli`.

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod util;
