//! Multi-step input flows (text boxes and pickers) that end in a pipeline

use kdepanel_cli::{
    EnvKind, KdeError, Pipeline, parse_line_count, parse_port, validate_env_name,
    validate_project_name,
};
use kdepanel_types::PodInfo;

/// Auxiliary tools opened for a whole environment
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EnvTool {
    K9s,
    Headlamp,
    PortForward,
}

impl EnvTool {
    pub fn pipeline(&self, env: &str) -> Pipeline {
        match self {
            Self::K9s => Pipeline::k9s(env),
            Self::Headlamp => Pipeline::headlamp(env),
            Self::PortForward => Pipeline::expose_environment(env),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::K9s => "K9s",
            Self::Headlamp => "Headlamp",
            Self::PortForward => "Port Forward",
        }
    }
}

/// Where a prompt sits in its flow, with everything collected so far
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Flow {
    AddEnvName,
    AddEnvKind { env: String },
    AddEnvKubeconfig { env: String },
    CreateProject { env: String },
    PickEnvironment { tool: EnvTool },
    TailLines { pod: PodInfo },
    ForwardLocalPort { pod: PodInfo },
    ForwardTargetPort { pod: PodInfo, local_port: u16 },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PromptInput {
    Text { value: String, placeholder: String },
    Pick { options: Vec<String>, selected: usize },
}

/// What submitting a prompt leads to
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PromptStep {
    Next(Prompt),
    Run(Pipeline),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Prompt {
    pub title: String,
    pub input: PromptInput,
    pub error: Option<String>,
    pub flow: Flow,
}

impl Prompt {
    fn text(title: impl Into<String>, placeholder: impl Into<String>, flow: Flow) -> Self {
        Self {
            title: title.into(),
            input: PromptInput::Text {
                value: String::new(),
                placeholder: placeholder.into(),
            },
            error: None,
            flow,
        }
    }

    fn pick(title: impl Into<String>, options: Vec<String>, flow: Flow) -> Self {
        Self {
            title: title.into(),
            input: PromptInput::Pick {
                options,
                selected: 0,
            },
            error: None,
            flow,
        }
    }

    // Flow entry points

    pub fn add_environment() -> Self {
        Self::text(
            "Name of the environment to create",
            "e.g. dev, staging, prod",
            Flow::AddEnvName,
        )
    }

    pub fn create_project(env: &str) -> Self {
        Self::text(
            format!("Name of the project to create in {}", env),
            "e.g. my-project",
            Flow::CreateProject {
                env: env.to_string(),
            },
        )
    }

    pub fn pick_environment(tool: EnvTool, envs: Vec<String>) -> Self {
        Self::pick(
            format!("Environment to open {} in", tool.label()),
            envs,
            Flow::PickEnvironment { tool },
        )
    }

    pub fn tail_lines(pod: PodInfo) -> Self {
        Self::text(
            format!("Number of log lines to show for {}", pod.name),
            "e.g. 100",
            Flow::TailLines { pod },
        )
    }

    pub fn forward_pod(pod: PodInfo) -> Self {
        Self::text(
            format!("Local port to forward for {}", pod.name),
            "e.g. 8080",
            Flow::ForwardLocalPort { pod },
        )
    }

    // Editing

    pub fn input_char(&mut self, c: char) {
        if let PromptInput::Text { value, .. } = &mut self.input {
            value.push(c);
            self.error = None;
        }
    }

    pub fn backspace(&mut self) {
        if let PromptInput::Text { value, .. } = &mut self.input {
            value.pop();
            self.error = None;
        }
    }

    pub fn clear(&mut self) {
        if let PromptInput::Text { value, .. } = &mut self.input {
            value.clear();
            self.error = None;
        }
    }

    pub fn move_up(&mut self) {
        if let PromptInput::Pick { options, selected } = &mut self.input {
            if options.is_empty() {
                return;
            }
            *selected = if *selected == 0 {
                options.len() - 1
            } else {
                *selected - 1
            };
        }
    }

    pub fn move_down(&mut self) {
        if let PromptInput::Pick { options, selected } = &mut self.input {
            if options.is_empty() {
                return;
            }
            *selected = if *selected + 1 >= options.len() {
                0
            } else {
                *selected + 1
            };
        }
    }

    /// Text value, or the highlighted option of a picker
    pub fn value(&self) -> Option<&str> {
        match &self.input {
            PromptInput::Text { value, .. } => Some(value.trim()),
            PromptInput::Pick { options, selected } => options.get(*selected).map(String::as_str),
        }
    }

    /// Validate the current input and move the flow forward
    pub fn submit(&self) -> Result<PromptStep, String> {
        let value = self
            .value()
            .filter(|v| !v.is_empty())
            .ok_or_else(|| "A value is required".to_string())?;

        let step = match &self.flow {
            Flow::AddEnvName => {
                validate_env_name(value).map_err(message)?;
                PromptStep::Next(Self::pick(
                    "Environment type",
                    EnvKind::ALL.iter().map(|k| k.label().to_string()).collect(),
                    Flow::AddEnvKind {
                        env: value.to_string(),
                    },
                ))
            }
            Flow::AddEnvKind { env } => {
                let kind = EnvKind::ALL
                    .into_iter()
                    .find(|k| k.label() == value)
                    .ok_or_else(|| "Unknown environment type".to_string())?;
                if kind.needs_kubeconfig() {
                    PromptStep::Next(Self::text(
                        "Path of the kubeconfig file",
                        "e.g. ~/.kube/config",
                        Flow::AddEnvKubeconfig { env: env.clone() },
                    ))
                } else {
                    PromptStep::Run(Pipeline::add_environment(env, kind, None))
                }
            }
            Flow::AddEnvKubeconfig { env } => PromptStep::Run(Pipeline::add_environment(
                env,
                EnvKind::K8s,
                Some(&expand_home(value)),
            )),
            Flow::CreateProject { env } => {
                validate_project_name(value).map_err(message)?;
                PromptStep::Run(Pipeline::create_project(env, value))
            }
            Flow::PickEnvironment { tool } => PromptStep::Run(tool.pipeline(value)),
            Flow::TailLines { pod } => {
                let lines = parse_line_count(value).map_err(message)?;
                PromptStep::Run(Pipeline::tail_pod(
                    &pod.env_name,
                    &pod.project_name,
                    &pod.name,
                    lines,
                ))
            }
            Flow::ForwardLocalPort { pod } => {
                let local_port = parse_port(value).map_err(message)?;
                PromptStep::Next(Self::text(
                    format!("Target port on {}", pod.name),
                    "e.g. 8080",
                    Flow::ForwardTargetPort {
                        pod: pod.clone(),
                        local_port,
                    },
                ))
            }
            Flow::ForwardTargetPort { pod, local_port } => {
                let target_port = parse_port(value).map_err(message)?;
                PromptStep::Run(Pipeline::forward_pod(
                    &pod.env_name,
                    &pod.project_name,
                    &pod.name,
                    target_port,
                    *local_port,
                ))
            }
        };

        Ok(step)
    }
}

fn message(err: KdeError) -> String {
    err.to_string()
}

/// Expand a leading `~/` to the home directory
fn expand_home(path: &str) -> String {
    match (path.strip_prefix("~/"), dirs::home_dir()) {
        (Some(rest), Some(home)) => home.join(rest).display().to_string(),
        _ => path.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn typed(mut prompt: Prompt, text: &str) -> Prompt {
        for c in text.chars() {
            prompt.input_char(c);
        }
        prompt
    }

    fn next(step: PromptStep) -> Prompt {
        match step {
            PromptStep::Next(p) => p,
            PromptStep::Run(p) => panic!("expected another prompt, got {p:?}"),
        }
    }

    fn run(step: PromptStep) -> Pipeline {
        match step {
            PromptStep::Run(p) => p,
            PromptStep::Next(p) => panic!("expected a pipeline, got {p:?}"),
        }
    }

    #[test]
    fn test_add_local_environment() {
        let name = typed(Prompt::add_environment(), "dev");
        let mut kind = next(name.submit().unwrap());
        assert_eq!(kind.value(), Some(EnvKind::Kind.label()));

        kind.move_down();
        let pipeline = run(kind.submit().unwrap());
        assert_eq!(pipeline.render("kde"), "kde init && kde create dev k3d");
    }

    #[test]
    fn test_add_k8s_environment_asks_for_kubeconfig() {
        let name = typed(Prompt::add_environment(), "prod");
        let mut kind = next(name.submit().unwrap());
        kind.move_up();
        assert_eq!(kind.value(), Some(EnvKind::K8s.label()));

        let path = typed(next(kind.submit().unwrap()), "/etc/kube/prod.yaml");
        assert_eq!(
            run(path.submit().unwrap()).render("kde"),
            "kde init && kde create prod k8s /etc/kube/prod.yaml"
        );
    }

    #[test]
    fn test_invalid_env_name_is_rejected() {
        let prompt = typed(Prompt::add_environment(), "my env");
        assert!(prompt.submit().unwrap_err().contains("letters, digits"));
        assert_eq!(Prompt::add_environment().submit(), Err("A value is required".to_string()));
    }

    #[test]
    fn test_editing_clears_error() {
        let mut prompt = typed(Prompt::create_project("dev"), "ab");
        prompt.error = Some("bad".to_string());
        prompt.backspace();
        assert_eq!(prompt.error, None);
        assert_eq!(prompt.value(), Some("a"));
        prompt.clear();
        assert_eq!(prompt.value(), Some(""));
    }

    #[test]
    fn test_create_project() {
        let prompt = typed(Prompt::create_project("dev"), "shop");
        assert_eq!(
            run(prompt.submit().unwrap()).render("kde"),
            "kde use dev && kde project create shop"
        );
    }

    #[test]
    fn test_pick_environment_for_tool() {
        let mut prompt = Prompt::pick_environment(
            EnvTool::Headlamp,
            vec!["dev".to_string(), "staging".to_string()],
        );
        prompt.move_down();
        prompt.input_char('x');
        assert_eq!(
            run(prompt.submit().unwrap()).render("kde"),
            "kde use staging && kde headlamp"
        );
    }

    #[test]
    fn test_empty_pick_cannot_submit() {
        let mut prompt = Prompt::pick_environment(EnvTool::K9s, Vec::new());
        prompt.move_down();
        assert!(prompt.submit().is_err());
    }

    #[test]
    fn test_tail_lines() {
        let pod = PodInfo::new("dev".to_string(), "shop".to_string(), "shop-1".to_string());
        assert!(typed(Prompt::tail_lines(pod.clone()), "lots").submit().is_err());
        let prompt = typed(Prompt::tail_lines(pod), "50");
        assert_eq!(
            run(prompt.submit().unwrap()).render("kde"),
            "kde use dev && kde project tail shop shop-1 50"
        );
    }

    #[test]
    fn test_forward_pod_asks_local_then_target() {
        let pod = PodInfo::new("dev".to_string(), "shop".to_string(), "shop-1".to_string());
        let local = typed(Prompt::forward_pod(pod), "9000");
        let target = typed(next(local.submit().unwrap()), "80");
        assert_eq!(
            run(target.submit().unwrap()).render("kde"),
            "kde use dev && kde expose shop pod shop-1 80 9000"
        );
    }
}
