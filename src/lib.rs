pub mod asset;
pub mod cli;
pub mod command;
pub mod config;
pub mod error;
pub mod forge;
pub mod notes;
pub mod orchestrator;

pub use cli::Args;
pub use error::{ReleaseError, Result};
pub use orchestrator::{Orchestrator, RunConfig, RunOutcome};
