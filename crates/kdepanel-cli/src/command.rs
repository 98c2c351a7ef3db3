use std::fmt;

use kdepanel_types::{DeployOp, EnvKind, ExecTarget};

/// Printed after a task pipeline succeeds, before returning to the panel
pub const COMPLETED_MESSAGE: &str = "Please enter any key to continue...";

/// A single invocation of the `kde` binary
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KdeCommand {
    args: Vec<String>,
}

impl KdeCommand {
    pub fn new<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// Shell rendering of the command, e.g. `kde use dev`
    pub fn render(&self, binary: &str) -> String {
        std::iter::once(binary)
            .chain(self.args.iter().map(String::as_str))
            .map(quote_arg)
            .collect::<Vec<_>>()
            .join(" ")
    }

    // Queries

    pub fn list() -> Self {
        Self::new(["ls"])
    }

    pub fn status_json() -> Self {
        Self::new(["status", "json"])
    }

    pub fn use_env(env: &str) -> Self {
        Self::new(["use", env])
    }

    pub fn project_list() -> Self {
        Self::new(["project", "ls"])
    }

    pub fn project_pods(project: &str) -> Self {
        Self::new(["project", "pod", project])
    }

    // Environment lifecycle

    pub fn init() -> Self {
        Self::new(["init"])
    }

    /// `kde create <env>`, with the kind (and kubeconfig for `k8s`) when adding
    pub fn create(env: &str, kind: Option<EnvKind>, kubeconfig: Option<&str>) -> Self {
        let mut args = vec!["create".to_string(), env.to_string()];
        if let Some(kind) = kind {
            args.push(kind.as_arg().to_string());
            if kind.needs_kubeconfig() {
                if let Some(path) = kubeconfig {
                    args.push(path.to_string());
                }
            }
        }
        Self { args }
    }

    pub fn stop(env: &str) -> Self {
        Self::new(["stop", env])
    }

    pub fn k9s() -> Self {
        Self::new(["k9s"])
    }

    pub fn headlamp() -> Self {
        Self::new(["headlamp"])
    }

    pub fn expose() -> Self {
        Self::new(["expose"])
    }

    // Projects

    pub fn project_create(project: &str) -> Self {
        Self::new(["project", "create", project])
    }

    pub fn project_deploy(op: DeployOp, project: &str) -> Self {
        Self::new(["project", op.as_arg(), project])
    }

    pub fn project_exec(project: &str, target: ExecTarget) -> Self {
        Self::new(["project", "exec", project, target.as_arg()])
    }

    pub fn telepresence_replace(project: &str) -> Self {
        Self::new(["telepresence", "replace", project])
    }

    // Pods

    pub fn project_tail(project: &str, pod: &str, lines: u32) -> Self {
        Self::new([
            "project".to_string(),
            "tail".to_string(),
            project.to_string(),
            pod.to_string(),
            lines.to_string(),
        ])
    }

    pub fn expose_pod(project: &str, pod: &str, target_port: u16, local_port: u16) -> Self {
        Self::new([
            "expose".to_string(),
            project.to_string(),
            "pod".to_string(),
            pod.to_string(),
            target_port.to_string(),
            local_port.to_string(),
        ])
    }

    pub fn pod_exec(project: &str, pod: &str) -> Self {
        Self::new(["project", "pod-exec", project, pod])
    }
}

/// How a pipeline is run
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunStyle {
    /// One-shot, awaited; success banner and refresh afterwards
    Task,
    /// Long-running or interactive; handed to a terminal
    Terminal,
}

/// Commands chained with `&&` semantics
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Pipeline {
    title: String,
    steps: Vec<KdeCommand>,
    style: RunStyle,
}

impl Pipeline {
    pub fn new(title: impl Into<String>, steps: Vec<KdeCommand>, style: RunStyle) -> Self {
        Self {
            title: title.into(),
            steps,
            style,
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn steps(&self) -> &[KdeCommand] {
        &self.steps
    }

    pub fn style(&self) -> RunStyle {
        self.style
    }

    /// Whether the completion banner is shown after success
    pub fn has_banner(&self) -> bool {
        self.style == RunStyle::Task
    }

    /// Shell rendering, e.g. `kde use dev && kde stop dev`
    pub fn render(&self, binary: &str) -> String {
        self.steps
            .iter()
            .map(|step| step.render(binary))
            .collect::<Vec<_>>()
            .join(" && ")
    }

    fn in_env(env: &str, title: String, command: KdeCommand, style: RunStyle) -> Self {
        Self::new(title, vec![KdeCommand::use_env(env), command], style)
    }

    // Environment level

    /// Initialize and create a brand-new environment
    pub fn add_environment(env: &str, kind: EnvKind, kubeconfig: Option<&str>) -> Self {
        Self::new(
            format!("create env {}", env),
            vec![
                KdeCommand::init(),
                KdeCommand::create(env, Some(kind), kubeconfig),
            ],
            RunStyle::Task,
        )
    }

    /// (Re)create an environment that is already listed
    pub fn create_environment(env: &str) -> Self {
        Self::new(
            format!("create env {}", env),
            vec![KdeCommand::create(env, None, None)],
            RunStyle::Task,
        )
    }

    pub fn stop_environment(env: &str) -> Self {
        Self::in_env(
            env,
            format!("stop env {}", env),
            KdeCommand::stop(env),
            RunStyle::Task,
        )
    }

    pub fn k9s(env: &str) -> Self {
        Self::in_env(env, format!("k9s ({})", env), KdeCommand::k9s(), RunStyle::Terminal)
    }

    pub fn headlamp(env: &str) -> Self {
        Self::in_env(
            env,
            format!("headlamp ({})", env),
            KdeCommand::headlamp(),
            RunStyle::Terminal,
        )
    }

    pub fn expose_environment(env: &str) -> Self {
        Self::in_env(
            env,
            format!("port forward ({})", env),
            KdeCommand::expose(),
            RunStyle::Terminal,
        )
    }

    pub fn create_project(env: &str, project: &str) -> Self {
        Self::in_env(
            env,
            format!("create project {}", project),
            KdeCommand::project_create(project),
            RunStyle::Task,
        )
    }

    // Project level

    pub fn deploy(env: &str, project: &str, op: DeployOp) -> Self {
        Self::in_env(
            env,
            format!("{} ({})", op.as_arg(), project),
            KdeCommand::project_deploy(op, project),
            RunStyle::Task,
        )
    }

    pub fn exec_project(env: &str, project: &str, target: ExecTarget) -> Self {
        Self::in_env(
            env,
            format!("exec {} env ({})", target.as_arg(), project),
            KdeCommand::project_exec(project, target),
            RunStyle::Terminal,
        )
    }

    pub fn telepresence_replace(env: &str, project: &str) -> Self {
        Self::in_env(
            env,
            format!("telepresence replace ({})", project),
            KdeCommand::telepresence_replace(project),
            RunStyle::Terminal,
        )
    }

    // Pod level

    pub fn tail_pod(env: &str, project: &str, pod: &str, lines: u32) -> Self {
        Self::in_env(
            env,
            format!("logs {}", pod),
            KdeCommand::project_tail(project, pod, lines),
            RunStyle::Terminal,
        )
    }

    pub fn forward_pod(
        env: &str,
        project: &str,
        pod: &str,
        target_port: u16,
        local_port: u16,
    ) -> Self {
        Self::in_env(
            env,
            format!("pod port-forward {} ({}/{})", local_port, project, pod),
            KdeCommand::expose_pod(project, pod, target_port, local_port),
            RunStyle::Terminal,
        )
    }

    pub fn exec_pod(env: &str, project: &str, pod: &str) -> Self {
        Self::in_env(
            env,
            format!("exec {}", pod),
            KdeCommand::pod_exec(project, pod),
            RunStyle::Terminal,
        )
    }
}

impl fmt::Display for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "KDE: {}", self.title())
    }
}

/// Single-quote an argument unless it is made of shell-safe characters only
fn quote_arg(arg: &str) -> String {
    let safe = !arg.is_empty()
        && arg
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | '/' | ':' | '='));
    if safe {
        arg.to_string()
    } else {
        format!("'{}'", arg.replace('\'', r"'\''"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_commands() {
        assert_eq!(KdeCommand::list().render("kde"), "kde ls");
        assert_eq!(KdeCommand::status_json().render("kde"), "kde status json");
        assert_eq!(KdeCommand::use_env("dev").render("kde"), "kde use dev");
        assert_eq!(KdeCommand::project_list().render("kde"), "kde project ls");
        assert_eq!(
            KdeCommand::project_pods("api").render("kde"),
            "kde project pod api"
        );
    }

    #[test]
    fn test_add_environment_per_kind() {
        assert_eq!(
            Pipeline::add_environment("dev", EnvKind::Kind, None).render("kde"),
            "kde init && kde create dev kind"
        );
        assert_eq!(
            Pipeline::add_environment("dev", EnvKind::K3d, None).render("kde"),
            "kde init && kde create dev k3d"
        );
        assert_eq!(
            Pipeline::add_environment("prod", EnvKind::K8s, Some("/home/me/.kube/prod.yaml"))
                .render("kde"),
            "kde init && kde create prod k8s /home/me/.kube/prod.yaml"
        );
    }

    #[test]
    fn test_kubeconfig_ignored_for_local_kinds() {
        let cmd = KdeCommand::create("dev", Some(EnvKind::Kind), Some("/tmp/kc"));
        assert_eq!(cmd.args(), ["create", "dev", "kind"]);
    }

    #[test]
    fn test_environment_pipelines() {
        assert_eq!(
            Pipeline::create_environment("dev").render("kde"),
            "kde create dev"
        );
        assert_eq!(
            Pipeline::stop_environment("dev").render("kde"),
            "kde use dev && kde stop dev"
        );
        assert_eq!(Pipeline::k9s("dev").render("kde"), "kde use dev && kde k9s");
        assert_eq!(
            Pipeline::headlamp("dev").render("kde"),
            "kde use dev && kde headlamp"
        );
        assert_eq!(
            Pipeline::expose_environment("dev").render("kde"),
            "kde use dev && kde expose"
        );
        assert_eq!(
            Pipeline::create_project("dev", "shop").render("kde"),
            "kde use dev && kde project create shop"
        );
    }

    #[test]
    fn test_project_pipelines() {
        assert_eq!(
            Pipeline::deploy("dev", "shop", DeployOp::Deploy).render("kde"),
            "kde use dev && kde project deploy shop"
        );
        assert_eq!(
            Pipeline::deploy("dev", "shop", DeployOp::Undeploy).render("kde"),
            "kde use dev && kde project undeploy shop"
        );
        assert_eq!(
            Pipeline::deploy("dev", "shop", DeployOp::Redeploy).render("kde"),
            "kde use dev && kde project redeploy shop"
        );
        assert_eq!(
            Pipeline::exec_project("dev", "shop", ExecTarget::Develop).render("kde"),
            "kde use dev && kde project exec shop develop"
        );
        assert_eq!(
            Pipeline::exec_project("dev", "shop", ExecTarget::Deploy).render("kde"),
            "kde use dev && kde project exec shop deploy"
        );
        assert_eq!(
            Pipeline::telepresence_replace("dev", "shop").render("kde"),
            "kde use dev && kde telepresence replace shop"
        );
    }

    #[test]
    fn test_pod_pipelines() {
        assert_eq!(
            Pipeline::tail_pod("dev", "shop", "shop-7d9f-abc", 100).render("kde"),
            "kde use dev && kde project tail shop shop-7d9f-abc 100"
        );
        assert_eq!(
            Pipeline::forward_pod("dev", "shop", "shop-7d9f-abc", 80, 8080).render("kde"),
            "kde use dev && kde expose shop pod shop-7d9f-abc 80 8080"
        );
        assert_eq!(
            Pipeline::exec_pod("dev", "shop", "shop-7d9f-abc").render("kde"),
            "kde use dev && kde project pod-exec shop shop-7d9f-abc"
        );
    }

    #[test]
    fn test_run_styles_and_titles() {
        let stop = Pipeline::stop_environment("dev");
        assert_eq!(stop.style(), RunStyle::Task);
        assert!(stop.has_banner());
        assert_eq!(stop.to_string(), "KDE: stop env dev");

        let k9s = Pipeline::k9s("dev");
        assert_eq!(k9s.style(), RunStyle::Terminal);
        assert!(!k9s.has_banner());
        assert_eq!(k9s.title(), "k9s (dev)");
    }

    #[test]
    fn test_custom_binary_and_quoting() {
        assert_eq!(
            Pipeline::stop_environment("dev").render("/opt/kde/bin/kde"),
            "/opt/kde/bin/kde use dev && /opt/kde/bin/kde stop dev"
        );
        assert_eq!(
            KdeCommand::create("dev", Some(EnvKind::K8s), Some("/My Configs/it's.yaml"))
                .render("kde"),
            r"kde create dev k8s '/My Configs/it'\''s.yaml'"
        );
    }
}
