//! Environment → project → pod tree
//!
//! The tree is rebuilt level by level from fresh CLI output. Expansion flags
//! and already-loaded children are carried over by name, so a refresh does
//! not collapse what the user opened.

use kdepanel_types::{EnvStatus, EnvironmentInfo, PodInfo, ProjectInfo};

/// Name-based identity of a tree node
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum NodeRef {
    Environment(String),
    Project { env: String, project: String },
    Pod {
        env: String,
        project: String,
        pod: String,
    },
}

impl NodeRef {
    /// Environment this node lives in
    pub fn env_name(&self) -> &str {
        match self {
            Self::Environment(env) => env,
            Self::Project { env, .. } | Self::Pod { env, .. } => env,
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Self::Environment(env) => env,
            Self::Project { project, .. } => project,
            Self::Pod { pod, .. } => pod,
        }
    }
}

#[derive(Clone, Debug)]
pub struct ProjectNode {
    pub info: ProjectInfo,
    pub expanded: bool,
    pub pods: Vec<PodInfo>,
}

#[derive(Clone, Debug)]
pub struct EnvNode {
    pub info: EnvironmentInfo,
    pub expanded: bool,
    pub projects: Vec<ProjectNode>,
}

/// One visible line of the flattened tree
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TreeRow {
    pub depth: usize,
    pub node: NodeRef,
    /// Pods have no children
    pub expandable: bool,
    pub expanded: bool,
    /// Only set for environments
    pub status: Option<EnvStatus>,
}

#[derive(Clone, Debug, Default)]
pub struct EnvironmentTree {
    envs: Vec<EnvNode>,
}

impl EnvironmentTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn environments(&self) -> &[EnvNode] {
        &self.envs
    }

    /// Replace the root level, keeping state of environments that still exist
    pub fn set_environments(&mut self, envs: Vec<EnvironmentInfo>) {
        let mut previous = std::mem::take(&mut self.envs);
        self.envs = envs
            .into_iter()
            .map(|info| match previous.iter().position(|n| n.info.name == info.name) {
                Some(idx) => {
                    let mut node = previous.swap_remove(idx);
                    node.info = info;
                    node
                }
                None => EnvNode {
                    info,
                    expanded: false,
                    projects: Vec::new(),
                },
            })
            .collect();
    }

    /// Replace an environment's projects; unknown environment is ignored
    pub fn set_projects(&mut self, env: &str, projects: Vec<ProjectInfo>) {
        let Some(node) = self.env_mut(env) else {
            return;
        };

        let mut previous = std::mem::take(&mut node.projects);
        node.projects = projects
            .into_iter()
            .map(|info| match previous.iter().position(|p| p.info.name == info.name) {
                Some(idx) => {
                    let mut project = previous.swap_remove(idx);
                    project.info = info;
                    project
                }
                None => ProjectNode {
                    info,
                    expanded: false,
                    pods: Vec::new(),
                },
            })
            .collect();
    }

    /// Replace a project's pods; unknown project is ignored
    pub fn set_pods(&mut self, env: &str, project: &str, pods: Vec<PodInfo>) {
        if let Some(node) = self.project_mut(env, project) {
            node.pods = pods;
        }
    }

    /// Set the expansion flag; returns false for pods and unknown nodes
    pub fn set_expanded(&mut self, node: &NodeRef, expanded: bool) -> bool {
        match node {
            NodeRef::Environment(env) => match self.env_mut(env) {
                Some(n) => {
                    n.expanded = expanded;
                    true
                }
                None => false,
            },
            NodeRef::Project { env, project } => match self.project_mut(env, project) {
                Some(p) => {
                    p.expanded = expanded;
                    true
                }
                None => false,
            },
            NodeRef::Pod { .. } => false,
        }
    }

    pub fn is_expanded(&self, node: &NodeRef) -> bool {
        match node {
            NodeRef::Environment(env) => self.env(env).is_some_and(|n| n.expanded),
            NodeRef::Project { env, project } => self
                .env(env)
                .and_then(|n| n.projects.iter().find(|p| &p.info.name == project))
                .is_some_and(|p| p.expanded),
            NodeRef::Pod { .. } => false,
        }
    }

    /// Expanded environments, in display order
    pub fn expanded_environments(&self) -> Vec<String> {
        self.envs
            .iter()
            .filter(|n| n.expanded)
            .map(|n| n.info.name.clone())
            .collect()
    }

    /// Expanded projects of an expanded environment, in display order
    pub fn expanded_projects(&self, env: &str) -> Vec<String> {
        self.env(env)
            .filter(|n| n.expanded)
            .map(|n| {
                n.projects
                    .iter()
                    .filter(|p| p.expanded)
                    .map(|p| p.info.name.clone())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Flatten the visible part of the tree
    pub fn rows(&self) -> Vec<TreeRow> {
        let mut rows = Vec::new();
        for env in &self.envs {
            rows.push(TreeRow {
                depth: 0,
                node: NodeRef::Environment(env.info.name.clone()),
                expandable: true,
                expanded: env.expanded,
                status: Some(env.info.status.clone()),
            });
            if !env.expanded {
                continue;
            }
            for project in &env.projects {
                rows.push(TreeRow {
                    depth: 1,
                    node: NodeRef::Project {
                        env: env.info.name.clone(),
                        project: project.info.name.clone(),
                    },
                    expandable: true,
                    expanded: project.expanded,
                    status: None,
                });
                if !project.expanded {
                    continue;
                }
                for pod in &project.pods {
                    rows.push(TreeRow {
                        depth: 2,
                        node: NodeRef::Pod {
                            env: env.info.name.clone(),
                            project: project.info.name.clone(),
                            pod: pod.name.clone(),
                        },
                        expandable: false,
                        expanded: false,
                        status: None,
                    });
                }
            }
        }
        rows
    }

    fn env(&self, env: &str) -> Option<&EnvNode> {
        self.envs.iter().find(|n| n.info.name == env)
    }

    fn env_mut(&mut self, env: &str) -> Option<&mut EnvNode> {
        self.envs.iter_mut().find(|n| n.info.name == env)
    }

    fn project_mut(&mut self, env: &str, project: &str) -> Option<&mut ProjectNode> {
        self.env_mut(env)?
            .projects
            .iter_mut()
            .find(|p| p.info.name == project)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env(name: &str, status: EnvStatus) -> EnvironmentInfo {
        EnvironmentInfo::new(name.to_string(), status)
    }

    fn projects(env: &str, names: &[&str]) -> Vec<ProjectInfo> {
        names
            .iter()
            .map(|n| ProjectInfo::new(env.to_string(), n.to_string()))
            .collect()
    }

    fn pods(env: &str, project: &str, names: &[&str]) -> Vec<PodInfo> {
        names
            .iter()
            .map(|n| PodInfo::new(env.to_string(), project.to_string(), n.to_string()))
            .collect()
    }

    fn sample_tree() -> EnvironmentTree {
        let mut tree = EnvironmentTree::new();
        tree.set_environments(vec![
            env("dev", EnvStatus::Running),
            env("staging", EnvStatus::Unready),
        ]);
        tree.set_expanded(&NodeRef::Environment("dev".to_string()), true);
        tree.set_projects("dev", projects("dev", &["shop", "blog"]));
        let shop = NodeRef::Project {
            env: "dev".to_string(),
            project: "shop".to_string(),
        };
        tree.set_expanded(&shop, true);
        tree.set_pods("dev", "shop", pods("dev", "shop", &["shop-1", "shop-2"]));
        tree
    }

    #[test]
    fn test_rows_follow_expansion() {
        let tree = sample_tree();
        let labels: Vec<_> = tree
            .rows()
            .iter()
            .map(|r| (r.depth, r.node.label().to_string()))
            .collect();

        assert_eq!(
            labels,
            vec![
                (0, "dev".to_string()),
                (1, "shop".to_string()),
                (2, "shop-1".to_string()),
                (2, "shop-2".to_string()),
                (1, "blog".to_string()),
                (0, "staging".to_string()),
            ]
        );
    }

    #[test]
    fn test_collapsed_environment_hides_children() {
        let mut tree = sample_tree();
        tree.set_expanded(&NodeRef::Environment("dev".to_string()), false);
        assert_eq!(tree.rows().len(), 2);
    }

    #[test]
    fn test_refresh_keeps_expansion_by_name() {
        let mut tree = sample_tree();
        tree.set_environments(vec![
            env("new", EnvStatus::Unready),
            env("dev", EnvStatus::Error),
        ]);

        assert_eq!(tree.expanded_environments(), vec!["dev"]);
        assert_eq!(tree.expanded_projects("dev"), vec!["shop"]);
        let first_dev = &tree.rows()[1];
        assert_eq!(first_dev.status, Some(EnvStatus::Error));
        assert!(first_dev.expanded);

        // A project that disappears loses its state; survivors keep theirs
        tree.set_projects("dev", projects("dev", &["shop"]));
        assert_eq!(tree.expanded_projects("dev"), vec!["shop"]);
        assert_eq!(tree.rows().len(), 5);
    }

    #[test]
    fn test_removed_environment_is_dropped() {
        let mut tree = sample_tree();
        tree.set_environments(vec![env("staging", EnvStatus::Running)]);
        assert_eq!(tree.environments().len(), 1);
        assert_eq!(tree.environments()[0].info.name, "staging");
        assert!(tree.expanded_environments().is_empty());
    }

    #[test]
    fn test_pods_cannot_expand() {
        let mut tree = sample_tree();
        let pod = NodeRef::Pod {
            env: "dev".to_string(),
            project: "shop".to_string(),
            pod: "shop-1".to_string(),
        };
        assert!(!tree.set_expanded(&pod, true));
        assert!(!tree.is_expanded(&pod));
        assert_eq!(pod.env_name(), "dev");
    }

    #[test]
    fn test_unknown_targets_are_ignored() {
        let mut tree = sample_tree();
        tree.set_projects("missing", projects("missing", &["x"]));
        tree.set_pods("dev", "missing", pods("dev", "missing", &["x"]));
        assert!(!tree.set_expanded(&NodeRef::Environment("missing".to_string()), true));
        assert_eq!(tree.rows().len(), 6);
    }
}
