//! Subprocess helper for the `kde` binary

use std::collections::HashMap;
use std::path::PathBuf;
use std::process::Stdio;

use kdepanel_activity::{ActivityKind, ActivityLog};
use kdepanel_types::{EnvStatus, EnvironmentInfo, PodInfo, ProjectInfo};
use tracing::{debug, warn};

use crate::{KdeCommand, KdeError, parse_lines, parse_status};

/// Runs `kde` commands and captures their output
#[derive(Clone)]
pub struct KdeClient {
    binary: String,
    cwd: PathBuf,
    activity: ActivityLog,
}

impl KdeClient {
    pub fn new(binary: impl Into<String>, cwd: impl Into<PathBuf>, activity: ActivityLog) -> Self {
        Self {
            binary: binary.into(),
            cwd: cwd.into(),
            activity,
        }
    }

    /// Run one command to completion and return its trimmed stdout.
    ///
    /// A non-zero exit yields [`KdeError::Failed`] carrying the trimmed stderr,
    /// or a description of the exit status when stderr is empty.
    pub async fn exec(&self, command: &KdeCommand) -> Result<String, KdeError> {
        let rendered = command.render(&self.binary);

        self.activity.blank_line();
        self.activity.record(ActivityKind::Command, rendered.as_str());
        self.activity
            .record(ActivityKind::Cwd, self.cwd.display().to_string());
        debug!(command = %rendered, cwd = %self.cwd.display(), "running kde command");

        let output = tokio::process::Command::new(&self.binary)
            .args(command.args())
            .current_dir(&self.cwd)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|source| {
                self.activity
                    .record(ActivityKind::Error, source.to_string());
                warn!(command = %rendered, error = %source, "failed to spawn kde");
                KdeError::Spawn {
                    command: rendered.clone(),
                    source,
                }
            })?;

        if output.status.success() {
            let stdout = String::from_utf8_lossy(&output.stdout).trim().to_string();
            if !stdout.is_empty() {
                self.activity.record_lines(ActivityKind::Output, &stdout);
            }
            Ok(stdout)
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            let message = if stderr.is_empty() {
                format!("Command failed: {} ({})", rendered, output.status)
            } else {
                stderr
            };
            self.activity.record_lines(ActivityKind::Error, &message);
            warn!(command = %rendered, status = %output.status, "kde command failed");
            Err(KdeError::Failed {
                command: rendered,
                message,
            })
        }
    }

    /// Environment name -> status from `kde status json`
    pub async fn environment_status(&self) -> Result<HashMap<String, EnvStatus>, KdeError> {
        let output = self.exec(&KdeCommand::status_json()).await?;
        let status = parse_status(&output)?;
        debug!(?status, "environment status");
        Ok(status)
    }

    /// Environment names from `kde ls`
    pub async fn environment_names(&self) -> Result<Vec<String>, KdeError> {
        let output = self.exec(&KdeCommand::list()).await?;
        Ok(parse_lines(&output))
    }

    /// Root level of the tree: `kde ls` names decorated with their status
    pub async fn environments(&self) -> Result<Vec<EnvironmentInfo>, KdeError> {
        let mut status = self.environment_status().await?;
        let names = self.environment_names().await?;

        Ok(names
            .into_iter()
            .map(|name| {
                let env_status = status.remove(&name).unwrap_or_default();
                EnvironmentInfo::new(name, env_status)
            })
            .collect())
    }

    /// Projects inside an environment (switches the CLI to it first)
    pub async fn projects(&self, env: &str) -> Result<Vec<ProjectInfo>, KdeError> {
        self.exec(&KdeCommand::use_env(env)).await?;
        let output = self.exec(&KdeCommand::project_list()).await?;

        Ok(parse_lines(&output)
            .into_iter()
            .map(|name| ProjectInfo::new(env.to_string(), name))
            .collect())
    }

    /// Pods of a project (switches the CLI to its environment first)
    pub async fn pods(&self, env: &str, project: &str) -> Result<Vec<PodInfo>, KdeError> {
        self.exec(&KdeCommand::use_env(env)).await?;
        let output = self.exec(&KdeCommand::project_pods(project)).await?;

        Ok(parse_lines(&output)
            .into_iter()
            .map(|name| PodInfo::new(env.to_string(), project.to_string(), name))
            .collect())
    }
}
