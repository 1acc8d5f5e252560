pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::cli::{Cli, Commands};

pub use adapters::storage::LocalStorage;
pub use config::roster::RosterConfig;
pub use crate::core::{checkin::CheckInWorkflow, report::ReportExporter, tasks::TaskService};
pub use utils::error::{CheckError, Result};
