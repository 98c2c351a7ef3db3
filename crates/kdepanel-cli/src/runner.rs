use std::path::PathBuf;
use std::process::{ExitStatus, Stdio};

use kdepanel_activity::{ActivityKind, ActivityLog};
use tracing::{info, warn};

use crate::{KdeError, Pipeline};

/// Placeholder in launcher arguments replaced by the pipeline title
const TITLE_PLACEHOLDER: &str = "{title}";

/// Result of a pipeline run in the foreground
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TaskOutcome {
    Succeeded,
    /// Exit code of the failing step, `None` when killed by a signal
    Failed(Option<i32>),
}

impl TaskOutcome {
    fn from_status(status: ExitStatus) -> Self {
        if status.success() {
            Self::Succeeded
        } else {
            Self::Failed(status.code())
        }
    }

    /// User-facing failure description for a pipeline title
    pub fn failure_message(&self, title: &str) -> Option<String> {
        match self {
            Self::Succeeded => None,
            Self::Failed(Some(code)) => {
                Some(format!("Task {} failed with exit code {}", title, code))
            }
            Self::Failed(None) => Some(format!("Task {} was terminated by a signal", title)),
        }
    }
}

/// SIGINT listener held while a foreground task owns the terminal
struct Interrupts {
    #[cfg(unix)]
    signal: tokio::signal::unix::Signal,
}

impl Interrupts {
    #[cfg(unix)]
    fn listen() -> std::io::Result<Self> {
        use tokio::signal::unix::{SignalKind, signal};

        Ok(Self {
            signal: signal(SignalKind::interrupt())?,
        })
    }

    #[cfg(not(unix))]
    fn listen() -> std::io::Result<Self> {
        Ok(Self {})
    }

    #[cfg(unix)]
    async fn recv(&mut self) {
        if self.signal.recv().await.is_none() {
            std::future::pending::<()>().await;
        }
    }

    #[cfg(not(unix))]
    async fn recv(&mut self) {
        if tokio::signal::ctrl_c().await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}

/// Runs user-triggered pipelines, either owning the terminal or in a
/// separate terminal window opened by the configured launcher
#[derive(Clone)]
pub struct TaskRunner {
    binary: String,
    cwd: PathBuf,
    launcher: Option<Vec<String>>,
    activity: ActivityLog,
}

impl TaskRunner {
    pub fn new(
        binary: impl Into<String>,
        cwd: impl Into<PathBuf>,
        launcher: Option<Vec<String>>,
        activity: ActivityLog,
    ) -> Self {
        Self {
            binary: binary.into(),
            cwd: cwd.into(),
            launcher: launcher.filter(|argv| !argv.is_empty()),
            activity,
        }
    }

    pub fn has_launcher(&self) -> bool {
        self.launcher.is_some()
    }

    /// Run every step with inherited stdio, stopping at the first failure.
    ///
    /// The caller must have released the terminal before calling this.
    pub async fn run_foreground(&self, pipeline: &Pipeline) -> Result<TaskOutcome, KdeError> {
        let rendered = pipeline.render(&self.binary);
        self.activity.blank_line();
        self.activity
            .record(ActivityKind::Info, format!("[task] {}", pipeline));
        self.activity.record(ActivityKind::Command, rendered.as_str());
        info!(task = %pipeline, command = %rendered, "running task");

        // Ctrl-C reaches the whole foreground process group while the panel
        // is suspended; only the child may die from it.
        let mut interrupts = Interrupts::listen().map_err(|source| KdeError::Spawn {
            command: rendered.clone(),
            source,
        })?;

        for step in pipeline.steps() {
            let mut child = tokio::process::Command::new(&self.binary)
                .args(step.args())
                .current_dir(&self.cwd)
                .stdin(Stdio::inherit())
                .stdout(Stdio::inherit())
                .stderr(Stdio::inherit())
                .spawn()
                .map_err(|source| {
                    self.activity.record(ActivityKind::Error, source.to_string());
                    KdeError::Spawn {
                        command: step.render(&self.binary),
                        source,
                    }
                })?;

            let status = loop {
                tokio::select! {
                    status = child.wait() => break status,
                    _ = interrupts.recv() => {
                        info!(task = %pipeline, "interrupt received while task runs");
                    }
                }
            }
            .map_err(|source| KdeError::Spawn {
                command: step.render(&self.binary),
                source,
            })?;

            let outcome = TaskOutcome::from_status(status);
            if let Some(message) = outcome.failure_message(&pipeline.to_string()) {
                self.activity.record(ActivityKind::Error, message.as_str());
                warn!(task = %pipeline, %status, "task failed");
                return Ok(outcome);
            }
        }

        Ok(TaskOutcome::Succeeded)
    }

    /// Hand the pipeline to the launcher and return without waiting
    pub fn launch(&self, pipeline: &Pipeline) -> Result<(), KdeError> {
        let Some(argv) = self.launcher_argv(pipeline) else {
            return Err(KdeError::InvalidInput("no terminal launcher configured".to_string()));
        };

        self.activity.blank_line();
        self.activity
            .record(ActivityKind::Info, format!("[terminal:new] {}", pipeline));
        self.activity.record(
            ActivityKind::Info,
            format!("[terminal:cmd] {}", pipeline.render(&self.binary)),
        );
        info!(terminal = %pipeline, launcher = ?argv, "launching terminal");

        let (program, args) = argv.split_first().ok_or_else(|| {
            KdeError::InvalidInput("terminal launcher is empty".to_string())
        })?;

        // The child is intentionally not awaited; it outlives this call.
        tokio::process::Command::new(program)
            .args(args)
            .current_dir(&self.cwd)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|source| {
                self.activity.record(ActivityKind::Error, source.to_string());
                KdeError::Spawn {
                    command: argv.join(" "),
                    source,
                }
            })?;

        Ok(())
    }

    /// Full launcher command line: launcher words, then `sh -lc <pipeline>`
    fn launcher_argv(&self, pipeline: &Pipeline) -> Option<Vec<String>> {
        let launcher = self.launcher.as_ref()?;
        let title = pipeline.to_string();

        let mut argv: Vec<String> = launcher
            .iter()
            .map(|word| word.replace(TITLE_PLACEHOLDER, &title))
            .collect();
        argv.push("sh".to_string());
        argv.push("-lc".to_string());
        argv.push(pipeline.render(&self.binary));
        Some(argv)
    }
}
