//! kde command-line integration for kdepanel
//!
//! This crate owns the whole contract with the external `kde` binary:
//! building its command lines, running them, and parsing what they print.

mod client;
mod command;
mod error;
mod parse;
mod runner;
mod validate;

pub use client::KdeClient;
pub use command::{COMPLETED_MESSAGE, KdeCommand, Pipeline, RunStyle};
pub use error::KdeError;
pub use parse::{parse_lines, parse_status};
pub use runner::{TaskOutcome, TaskRunner};
pub use validate::{parse_line_count, parse_port, validate_env_name, validate_project_name};

// Re-export types that are used in our public API
pub use kdepanel_types::{
    DeployOp, EnvKind, EnvStatus, EnvironmentInfo, ExecTarget, PodInfo, ProjectInfo,
};
