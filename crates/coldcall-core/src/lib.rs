pub mod cache;
pub mod classifier;
pub mod config;
pub mod error;
pub mod io;
pub mod mail;
pub mod orchestrator;
pub mod paths;
pub mod reconcile;
pub mod roster;
pub mod shuffle;
pub mod types;
pub mod usage;

pub use error::{ColdCallError, Result};
