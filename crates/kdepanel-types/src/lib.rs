//! Shared types for kdepanel
//!
//! This crate contains the display records used across multiple kdepanel crates.

use ratatui::style::Color;
use serde::Deserialize;

// ============================================================================
// Environment Types
// ============================================================================

/// Environment status as reported by `kde status json`
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub enum EnvStatus {
    Running,
    /// Also used when the status report has no entry for the environment
    #[default]
    Unready,
    Error,
    Other(String),
}

impl From<&str> for EnvStatus {
    fn from(s: &str) -> Self {
        match s {
            "RUNNING" => Self::Running,
            "UNREADY" => Self::Unready,
            "error" => Self::Error,
            other => Self::Other(other.to_string()),
        }
    }
}

impl EnvStatus {
    /// Status as the CLI spells it
    pub fn as_str(&self) -> &str {
        match self {
            Self::Running => "RUNNING",
            Self::Unready => "UNREADY",
            Self::Error => "error",
            Self::Other(s) => s,
        }
    }

    /// Tree icon: filled for running/error, hollow otherwise
    pub fn symbol(&self) -> &'static str {
        match self {
            Self::Running | Self::Error => "●",
            Self::Unready | Self::Other(_) => "○",
        }
    }

    /// Get display color for this status
    pub fn color(&self) -> Color {
        match self {
            Self::Running => Color::Green,
            Self::Unready => Color::DarkGray,
            Self::Error => Color::Red,
            Self::Other(_) => Color::White,
        }
    }
}

/// One record of the `kde status json` array
#[derive(Clone, Debug, Deserialize)]
pub struct StatusRecord {
    pub environment: String,
    pub status: String,
}

/// Environment information
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EnvironmentInfo {
    pub name: String,
    pub status: EnvStatus,
}

impl EnvironmentInfo {
    pub fn new(name: String, status: EnvStatus) -> Self {
        Self { name, status }
    }
}

/// Project information
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProjectInfo {
    pub env_name: String,
    pub name: String,
}

impl ProjectInfo {
    pub fn new(env_name: String, name: String) -> Self {
        Self { env_name, name }
    }
}

/// Pod information
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PodInfo {
    pub env_name: String,
    pub project_name: String,
    pub name: String,
}

impl PodInfo {
    pub fn new(env_name: String, project_name: String, name: String) -> Self {
        Self {
            env_name,
            project_name,
            name,
        }
    }
}

// ============================================================================
// Environment Kinds
// ============================================================================

/// Kind of cluster backing a new environment
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EnvKind {
    /// Kubernetes in local Docker
    Kind,
    /// Lightweight K3s on Docker
    K3d,
    /// Existing cluster reached through a kubeconfig
    K8s,
}

impl EnvKind {
    pub const ALL: [EnvKind; 3] = [Self::Kind, Self::K3d, Self::K8s];

    /// Argument passed to `kde create`
    pub fn as_arg(&self) -> &'static str {
        match self {
            Self::Kind => "kind",
            Self::K3d => "k3d",
            Self::K8s => "k8s",
        }
    }

    /// Label shown in the kind picker
    pub fn label(&self) -> &'static str {
        match self {
            Self::Kind => "kind (K8s inside local Docker)",
            Self::K3d => "k3d (lightweight K3s on Docker)",
            Self::K8s => "k8s (connect an existing cluster)",
        }
    }

    pub fn needs_kubeconfig(&self) -> bool {
        matches!(self, Self::K8s)
    }
}

/// How a project shell is entered with `kde project exec`
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExecTarget {
    Develop,
    Deploy,
}

impl ExecTarget {
    pub fn as_arg(&self) -> &'static str {
        match self {
            Self::Develop => "develop",
            Self::Deploy => "deploy",
        }
    }
}

/// Deployment lifecycle operation on a project
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DeployOp {
    Deploy,
    Undeploy,
    Redeploy,
}

impl DeployOp {
    pub fn as_arg(&self) -> &'static str {
        match self {
            Self::Deploy => "deploy",
            Self::Undeploy => "undeploy",
            Self::Redeploy => "redeploy",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_from_cli_strings() {
        assert_eq!(EnvStatus::from("RUNNING"), EnvStatus::Running);
        assert_eq!(EnvStatus::from("UNREADY"), EnvStatus::Unready);
        assert_eq!(EnvStatus::from("error"), EnvStatus::Error);
        assert_eq!(
            EnvStatus::from("STARTING"),
            EnvStatus::Other("STARTING".to_string())
        );
        assert_eq!(EnvStatus::default(), EnvStatus::Unready);
    }

    #[test]
    fn test_status_icons() {
        assert_eq!(EnvStatus::Running.symbol(), "●");
        assert_eq!(EnvStatus::Running.color(), Color::Green);
        assert_eq!(EnvStatus::Unready.symbol(), "○");
        assert_eq!(EnvStatus::Error.color(), Color::Red);
    }

    #[test]
    fn test_only_k8s_needs_kubeconfig() {
        let needing: Vec<_> = EnvKind::ALL
            .iter()
            .filter(|k| k.needs_kubeconfig())
            .collect();
        assert_eq!(needing, vec![&EnvKind::K8s]);
    }
}
