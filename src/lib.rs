pub mod cli;
pub mod config;
pub mod content;
pub mod error;

pub use config::{DuplicatePolicy, RepairConfig};
pub use error::RepairError;
