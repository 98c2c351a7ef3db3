use std::fs::File;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::sync::mpsc;
use tracing::{info, warn};

use kdepanel_activity::{ActivityKind, ActivityLog, FilterPresets};
use kdepanel_cli::{
    COMPLETED_MESSAGE, KdeClient, KdeError, Pipeline, RunStyle, TaskOutcome, TaskRunner,
};
use kdepanel_tui::{
    Action, AppState, Command, CommandPaletteState, EnvTool, Event, EventHandler, Focus,
    KeyBindings, KeyContext, MainScreen, NodeRef, Prompt, PromptStep, Settings, Tui,
    activity_commands, commands_for,
};

/// Redraw rate of the panel
const TICK_RATE: Duration = Duration::from_millis(250);

/// kdepanel - A terminal panel for kde development environments
#[derive(Parser, Debug)]
#[command(name = "kdepanel")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// The kde executable to run
    #[arg(long, value_name = "PATH")]
    binary: Option<String>,

    /// Working directory for every kde command
    #[arg(long, value_name = "DIR")]
    cwd: Option<PathBuf>,

    /// Seconds between automatic refreshes of the tree
    #[arg(long, value_name = "SECS")]
    refresh_secs: Option<u64>,

    /// Settings file (defaults to <config dir>/kdepanel/config.toml)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Write diagnostics to this file instead of stderr
    #[arg(long, value_name = "FILE")]
    log_file: Option<PathBuf>,

    /// Command that opens a new terminal for interactive commands,
    /// e.g. `--launcher tmux new-window -n {title}`
    #[arg(long, value_name = "CMD", num_args = 1.., allow_hyphen_values = true)]
    launcher: Option<Vec<String>>,
}

impl Args {
    /// Command line flags win over the settings file
    fn merge_into(self, mut settings: Settings) -> Settings {
        if let Some(binary) = self.binary {
            settings.binary = binary;
        }
        if let Some(cwd) = self.cwd {
            settings.cwd = Some(cwd);
        }
        if let Some(secs) = self.refresh_secs {
            settings.refresh_secs = secs;
        }
        if let Some(launcher) = self.launcher {
            settings.launcher = Some(launcher);
        }
        settings
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    init_tracing(args.log_file.as_deref())?;

    let settings = Settings::load(args.config.as_deref())?;
    let settings = args.merge_into(settings);

    // Run the application
    let result = run_app(settings).await;

    // Handle any errors
    if let Err(e) = &result {
        eprintln!("Error: {:#}", e);
    }

    result
}

fn init_tracing(log_file: Option<&std::path::Path>) -> Result<()> {
    match log_file {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("cannot create log file {}", path.display()))?;
            tracing_subscriber::fmt()
                .with_env_filter(
                    tracing_subscriber::EnvFilter::from_default_env()
                        .add_directive(tracing::Level::INFO.into()),
                )
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .init();
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(
                    tracing_subscriber::EnvFilter::from_default_env()
                        .add_directive(tracing::Level::WARN.into()),
                )
                .with_writer(std::io::stderr)
                .init();
        }
    }
    Ok(())
}

/// Internal actions for async operations
enum InternalAction {
    /// Reload environments and every expanded node
    RefreshTree,
    LoadProjects(String),
    LoadPods(String, String),
    /// Ask which environment to open a tool in
    PickEnvironmentFor(EnvTool),
    RunPipeline(Pipeline),
}

async fn run_app(settings: Settings) -> Result<()> {
    // Create action channels
    let (action_tx, mut action_rx) = mpsc::unbounded_channel::<Action>();
    let (internal_tx, mut internal_rx) = mpsc::unbounded_channel::<InternalAction>();

    let cwd = match &settings.cwd {
        Some(cwd) => cwd.clone(),
        None => std::env::current_dir().context("cannot determine working directory")?,
    };
    let refresh_rate = settings.refresh_interval();

    let activity = ActivityLog::new(settings.activity_capacity);
    let client = KdeClient::new(settings.binary.clone(), cwd.clone(), activity.clone());
    let runner = TaskRunner::new(
        settings.binary.clone(),
        cwd.clone(),
        settings.launcher.clone(),
        activity.clone(),
    );
    let context = format!("{} @ {}", settings.binary, cwd.display());
    info!(binary = %settings.binary, cwd = %cwd.display(), ?refresh_rate, "starting kdepanel");

    // Initialize state
    let mut state = AppState::new();

    // Initialize TUI
    let mut tui = Tui::new()?;

    // Initialize event handler
    let mut events = EventHandler::new(TICK_RATE, refresh_rate);

    // Initialize keybindings
    let keybindings = KeyBindings::new();

    // Command palette
    let mut palette_state = CommandPaletteState::default();
    let mut commands = commands_for(None);

    let _ = internal_tx.send(InternalAction::RefreshTree);

    // Main event loop
    loop {
        render(&mut tui, &mut state, &activity, &mut palette_state, &commands, &context)?;

        tokio::select! {
            // Handle terminal events
            Some(event) = events.next() => {
                match event {
                    Event::Key(key) => {
                        let action = if state.ui_state.help_visible {
                            // Any key closes the help overlay
                            Some(Action::ToggleHelp)
                        } else if palette_state.visible {
                            keybindings.get_palette_action(&key)
                        } else if state.prompt.is_some() {
                            keybindings.get_prompt_action(&key)
                        } else if state.ui_state.search_active {
                            keybindings.get_filter_input_action(&key)
                        } else {
                            let context = match state.ui_state.focus {
                                Focus::Tree => KeyContext::Tree,
                                Focus::Activity => KeyContext::Activity,
                            };
                            keybindings.get_action(context, &key)
                        };

                        if let Some(action) = action {
                            let _ = action_tx.send(action);
                        }
                    }
                    Event::Refresh => {
                        if timer_refresh_allowed(&state) {
                            let _ = internal_tx.send(InternalAction::RefreshTree);
                        }
                    }
                    Event::Tick | Event::Resize(_, _) => {
                        // Redrawn at the top of the loop
                    }
                    Event::Error(e) => {
                        warn!(error = %e, "terminal event error");
                        state.show_error(e);
                    }
                }
            }

            // Handle user actions
            Some(action) = action_rx.recv() => {
                handle_action(
                    &mut state,
                    &internal_tx,
                    &activity,
                    &mut palette_state,
                    &mut commands,
                    action,
                );
            }

            // Handle internal async actions
            Some(internal) = internal_rx.recv() => {
                match internal {
                    InternalAction::RefreshTree => {
                        state.ui_state.busy = Some("refreshing".to_string());
                        render(&mut tui, &mut state, &activity, &mut palette_state, &commands, &context)?;
                        refresh_tree(&mut state, &client, &activity).await;
                        state.ui_state.busy = None;
                    }

                    InternalAction::LoadProjects(env) => {
                        state.ui_state.busy = Some(format!("loading projects of {}", env));
                        render(&mut tui, &mut state, &activity, &mut palette_state, &commands, &context)?;
                        load_projects(&mut state, &client, &env).await;
                        state.rebuild_rows();
                        state.ui_state.busy = None;
                    }

                    InternalAction::LoadPods(env, project) => {
                        state.ui_state.busy = Some(format!("loading pods of {}", project));
                        render(&mut tui, &mut state, &activity, &mut palette_state, &commands, &context)?;
                        load_pods(&mut state, &client, &env, &project).await;
                        state.rebuild_rows();
                        state.ui_state.busy = None;
                    }

                    InternalAction::PickEnvironmentFor(tool) => {
                        match client.environment_names().await {
                            Ok(names) if names.is_empty() => {
                                state.show_error("No environments to choose from".to_string());
                            }
                            Ok(names) => {
                                state.open_prompt(Prompt::pick_environment(tool, names));
                            }
                            Err(e) => {
                                state.show_error(e.to_string());
                            }
                        }
                    }

                    InternalAction::RunPipeline(pipeline) => {
                        if pipeline.style() == RunStyle::Terminal && runner.has_launcher() {
                            match runner.launch(&pipeline) {
                                Ok(()) => state.show_info(format!("Opened {}", pipeline)),
                                Err(e) => state.show_error(e.to_string()),
                            }
                        } else {
                            let result = run_in_foreground(
                                &mut tui,
                                &mut events,
                                &runner,
                                &pipeline,
                                refresh_rate,
                            )
                            .await?;

                            match result {
                                Ok(TaskOutcome::Succeeded) => {
                                    if pipeline.style() == RunStyle::Task {
                                        state.show_info(format!("{} finished", pipeline));
                                        let _ = internal_tx.send(InternalAction::RefreshTree);
                                    }
                                }
                                Ok(outcome) => {
                                    if let Some(message) = outcome.failure_message(&pipeline.to_string()) {
                                        state.show_error(message);
                                    }
                                }
                                Err(e) => {
                                    state.show_error(e.to_string());
                                }
                            }
                        }
                    }
                }
            }
        }

        if state.should_quit {
            break;
        }
    }

    // Cleanup
    events.stop().await;
    tui.restore()?;

    Ok(())
}

/// Timer refreshes would reload the choices under an open prompt
fn timer_refresh_allowed(state: &AppState) -> bool {
    state.prompt.is_none()
}

/// Root level plus every expanded environment and project
async fn refresh_tree(state: &mut AppState, client: &KdeClient, activity: &ActivityLog) {
    match client.environments().await {
        Ok(envs) => {
            let names: Vec<&str> = envs.iter().map(|e| e.name.as_str()).collect();
            activity.record(
                ActivityKind::Info,
                format!("[refresh] environments: {}", names.join(", ")),
            );
            state.tree.set_environments(envs);
        }
        Err(e) => {
            state.tree.set_environments(Vec::new());
            state.rebuild_rows();
            state.show_error(e.to_string());
            return;
        }
    }

    for env in state.tree.expanded_environments() {
        if !load_projects(state, client, &env).await {
            continue;
        }
        for project in state.tree.expanded_projects(&env) {
            load_pods(state, client, &env, &project).await;
        }
    }

    state.rebuild_rows();
}

/// Returns false when the projects could not be listed
async fn load_projects(state: &mut AppState, client: &KdeClient, env: &str) -> bool {
    match client.projects(env).await {
        Ok(projects) => {
            state.tree.set_projects(env, projects);
            true
        }
        Err(e) => {
            state.tree.set_projects(env, Vec::new());
            state.show_error(format!("Unable to load projects ({}): {}", env, e));
            false
        }
    }
}

async fn load_pods(state: &mut AppState, client: &KdeClient, env: &str, project: &str) {
    match client.pods(env, project).await {
        Ok(pods) => state.tree.set_pods(env, project, pods),
        Err(e) => {
            state.tree.set_pods(env, project, Vec::new());
            state.show_error(format!("Unable to load pods ({}): {}", project, e));
        }
    }
}

/// Hand the terminal to the pipeline and take it back afterwards
async fn run_in_foreground(
    tui: &mut Tui,
    events: &mut EventHandler,
    runner: &TaskRunner,
    pipeline: &Pipeline,
    refresh_rate: Duration,
) -> Result<Result<TaskOutcome, KdeError>> {
    // The event reader would otherwise compete with the child for stdin
    events.stop().await;
    tui.suspend()?;

    println!("==> {}", pipeline);
    let result = runner.run_foreground(pipeline).await;

    if pipeline.has_banner() {
        let banner = match &result {
            Ok(TaskOutcome::Succeeded) => COMPLETED_MESSAGE.to_string(),
            Ok(outcome) => format!(
                "{}. {}",
                outcome
                    .failure_message(&pipeline.to_string())
                    .unwrap_or_default(),
                COMPLETED_MESSAGE
            ),
            Err(e) => format!("{}. {}", e, COMPLETED_MESSAGE),
        };
        tui.wait_for_key(&banner)?;
    }

    tui.resume()?;
    *events = EventHandler::new(TICK_RATE, refresh_rate);

    Ok(result)
}

fn handle_action(
    state: &mut AppState,
    internal_tx: &mpsc::UnboundedSender<InternalAction>,
    activity: &ActivityLog,
    palette_state: &mut CommandPaletteState,
    commands: &mut Vec<Command>,
    action: Action,
) {
    let run = |pipeline: Pipeline| {
        let _ = internal_tx.send(InternalAction::RunPipeline(pipeline));
    };

    match action {
        Action::Quit => {
            state.should_quit = true;
        }
        Action::GoBack => {
            if state.ui_state.message.is_some() {
                state.dismiss_message();
            } else if state.ui_state.focus == Focus::Activity {
                if state.ui_state.active_filter.is_some() {
                    state.clear_filter();
                } else {
                    state.toggle_focus();
                }
            }
        }
        Action::ToggleHelp => {
            state.ui_state.help_visible = !state.ui_state.help_visible;
        }
        Action::ToggleActivity => {
            state.toggle_activity();
        }
        Action::SwitchFocus => {
            state.toggle_focus();
        }
        Action::ToggleCommandPalette => {
            if palette_state.visible {
                palette_state.close();
            } else {
                *commands = match state.ui_state.focus {
                    Focus::Tree => commands_for(state.selected_node()),
                    Focus::Activity => activity_commands(),
                };
                palette_state.open(commands);
            }
        }

        // Command palette actions
        Action::PaletteUp => {
            palette_state.move_up();
        }
        Action::PaletteDown => {
            palette_state.move_down();
        }
        Action::PaletteInput(c) => {
            palette_state.input_char(c, commands);
        }
        Action::PaletteBackspace => {
            palette_state.input_backspace(commands);
        }
        Action::PaletteClose => {
            palette_state.close();
        }
        Action::PaletteSelect => {
            if let Some(cmd) = palette_state.selected_command(commands) {
                let action = cmd.action.clone();
                palette_state.close();
                // Recursively handle the selected action
                handle_action(state, internal_tx, activity, palette_state, commands, action);
            }
        }

        // Tree navigation
        Action::ListUp => {
            state.list_up();
        }
        Action::ListDown => {
            state.list_down();
        }
        Action::ListTop => {
            state.list_top();
        }
        Action::ListBottom => {
            state.list_bottom();
        }
        Action::Expand => {
            expand_selected(state, internal_tx);
        }
        Action::Collapse => {
            state.collapse_selected();
        }
        Action::ToggleNode => {
            let expanded = state
                .selected_node()
                .is_some_and(|node| state.tree.is_expanded(node));
            if expanded {
                state.collapse_selected();
            } else {
                expand_selected(state, internal_tx);
            }
        }
        Action::Refresh => {
            let _ = internal_tx.send(InternalAction::RefreshTree);
        }

        // Environment actions
        Action::AddEnvironment => {
            state.open_prompt(Prompt::add_environment());
        }
        Action::CreateEnvironment => match state.selected_environment() {
            Some(env) => run(Pipeline::create_environment(&env)),
            None => state.show_error("Select an environment first".to_string()),
        },
        Action::StopEnvironment => match state.selected_environment() {
            Some(env) => run(Pipeline::stop_environment(&env)),
            None => state.show_error("Select an environment first".to_string()),
        },
        Action::OpenTool(tool) => match state.selected_env() {
            Some(env) => run(tool.pipeline(&env)),
            None => {
                let _ = internal_tx.send(InternalAction::PickEnvironmentFor(tool));
            }
        },
        Action::CreateProject => match state.selected_environment() {
            Some(env) => state.open_prompt(Prompt::create_project(&env)),
            None => state.show_error("Select an environment first".to_string()),
        },

        // Project actions
        Action::Deploy(op) => match state.selected_project() {
            Some((env, project)) => run(Pipeline::deploy(&env, &project, op)),
            None => state.show_error("Select a project first".to_string()),
        },
        Action::ExecProject(target) => match state.selected_project() {
            Some((env, project)) => run(Pipeline::exec_project(&env, &project, target)),
            None => state.show_error("Select a project first".to_string()),
        },
        Action::TelepresenceReplace => match state.selected_project() {
            Some((env, project)) => run(Pipeline::telepresence_replace(&env, &project)),
            None => state.show_error("Select a project first".to_string()),
        },

        // Pod actions
        Action::TailPodLogs => match state.selected_pod() {
            Some(pod) => state.open_prompt(Prompt::tail_lines(pod)),
            None => state.show_error("Select a pod first".to_string()),
        },
        Action::ForwardPod => match state.selected_pod() {
            Some(pod) => state.open_prompt(Prompt::forward_pod(pod)),
            None => state.show_error("Select a pod first".to_string()),
        },
        Action::ExecPod => match state.selected_pod() {
            Some(pod) => run(Pipeline::exec_pod(
                &pod.env_name,
                &pod.project_name,
                &pod.name,
            )),
            None => state.show_error("Select a pod first".to_string()),
        },

        // Prompt input
        Action::PromptInput(c) => {
            if let Some(prompt) = &mut state.prompt {
                prompt.input_char(c);
            }
        }
        Action::PromptBackspace => {
            if let Some(prompt) = &mut state.prompt {
                prompt.backspace();
            }
        }
        Action::PromptClear => {
            if let Some(prompt) = &mut state.prompt {
                prompt.clear();
            }
        }
        Action::PromptUp => {
            if let Some(prompt) = &mut state.prompt {
                prompt.move_up();
            }
        }
        Action::PromptDown => {
            if let Some(prompt) = &mut state.prompt {
                prompt.move_down();
            }
        }
        Action::PromptSubmit => {
            let Some(prompt) = &mut state.prompt else {
                return;
            };
            match prompt.submit() {
                Ok(PromptStep::Next(next)) => state.open_prompt(next),
                Ok(PromptStep::Run(pipeline)) => {
                    state.close_prompt();
                    run(pipeline);
                }
                Err(message) => prompt.error = Some(message),
            }
        }
        Action::PromptCancel => {
            state.close_prompt();
        }

        // Activity pane
        Action::ScrollUp(n) => {
            state.ui_state.follow = false;
            state.ui_state.activity_scroll = state.ui_state.activity_scroll.saturating_sub(n);
        }
        Action::ScrollDown(n) => {
            state.ui_state.follow = false;
            // Clamped to the filtered line count while rendering
            state.ui_state.activity_scroll = state.ui_state.activity_scroll.saturating_add(n);
        }
        Action::ScrollToTop => {
            state.ui_state.follow = false;
            state.ui_state.activity_scroll = 0;
        }
        Action::ScrollToBottom => {
            state.ui_state.follow = false;
            state.ui_state.activity_scroll = usize::MAX;
        }
        Action::ToggleFollow => {
            state.ui_state.follow = !state.ui_state.follow;
        }
        Action::ClearActivity => {
            activity.clear();
            state.ui_state.activity_scroll = 0;
        }
        Action::ExportActivity => {
            let timestamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
            let filename = format!("kdepanel_activity_{}.log", timestamp);

            match export_activity_to_file(&filename, activity, state) {
                Ok(count) => {
                    state.show_info(format!("Exported {} lines to {}", count, filename));
                }
                Err(e) => {
                    state.show_error(format!("Export failed: {}", e));
                }
            }
        }

        // Filter/Search actions
        Action::OpenSearch => {
            state.start_search();
        }
        Action::CloseSearch => {
            state.cancel_search();
        }
        Action::SearchInput(c) => {
            state.search_input_char(c);
        }
        Action::SearchBackspace => {
            state.search_input_backspace();
        }
        Action::SearchClear => {
            state.ui_state.search_input.clear();
        }
        Action::ApplyFilter => {
            state.apply_filter();
            state.ui_state.activity_scroll = 0;
        }
        Action::ClearFilter => {
            state.clear_filter();
        }
        Action::ShowCommandsOnly => {
            state.apply_preset(FilterPresets::commands_and_errors());
            state.ui_state.activity_scroll = 0;
        }
        Action::ToggleCaseSensitive => {
            state.ui_state.filter_case_insensitive = !state.ui_state.filter_case_insensitive;
            // Re-apply a typed filter with the new case sensitivity
            if let Some(pattern) = state
                .ui_state
                .active_filter
                .as_ref()
                .map(|f| f.pattern().to_string())
                .filter(|p| !p.is_empty())
            {
                state.ui_state.search_input = pattern;
                state.apply_filter();
            }
        }
    }
}

/// Expand the selected node and fetch its children
fn expand_selected(state: &mut AppState, internal_tx: &mpsc::UnboundedSender<InternalAction>) {
    let Some(row) = state.selected_row().cloned() else {
        return;
    };
    if !row.expandable {
        return;
    }
    if row.expanded {
        // Already open: step onto the first child
        state.list_down();
        return;
    }

    state.tree.set_expanded(&row.node, true);
    state.rebuild_rows();
    let load = match row.node {
        NodeRef::Environment(env) => InternalAction::LoadProjects(env),
        NodeRef::Project { env, project } => InternalAction::LoadPods(env, project),
        NodeRef::Pod { .. } => return,
    };
    let _ = internal_tx.send(load);
}

fn render(
    tui: &mut Tui,
    state: &mut AppState,
    activity: &ActivityLog,
    palette_state: &mut CommandPaletteState,
    commands: &[Command],
    context: &str,
) -> Result<()> {
    tui.terminal().draw(|frame| {
        MainScreen::render(frame, state, activity, palette_state, commands, context);
    })?;

    Ok(())
}

fn export_activity_to_file(
    filename: &str,
    activity: &ActivityLog,
    state: &AppState,
) -> Result<usize> {
    let mut file = File::create(filename)?;
    let entries = match &state.ui_state.active_filter {
        Some(filter) => activity.filtered(|e| filter.matches(e)),
        None => activity.all(),
    };

    for entry in &entries {
        writeln!(
            file,
            "{} {}",
            entry.timestamp.format("%Y-%m-%dT%H:%M:%S%.3f"),
            entry.display()
        )?;
    }

    Ok(entries.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use kdepanel_cli::{EnvStatus, EnvironmentInfo, ProjectInfo};
    use std::fs;

    const STATUS: (&str, &str) = (
        "status",
        r#"echo '[{"environment":"dev","status":"RUNNING"}]'"#,
    );
    const LS: (&str, &str) = ("ls", "echo dev");

    /// `sh` stands in for `kde`: each subcommand is a script in the cwd
    #[cfg(unix)]
    fn fake_kde(scripts: &[(&str, &str)]) -> (tempfile::TempDir, KdeClient, ActivityLog) {
        let dir = tempfile::tempdir().unwrap();
        for (name, body) in scripts {
            fs::write(dir.path().join(name), body).unwrap();
        }
        let activity = ActivityLog::new(100);
        let client = KdeClient::new("sh", dir.path(), activity.clone());
        (dir, client, activity)
    }

    /// dev is expanded, and so is its project shop
    fn expanded_tree() -> AppState {
        let mut state = AppState::new();
        state.tree.set_environments(vec![EnvironmentInfo::new(
            "dev".to_string(),
            EnvStatus::Running,
        )]);
        state
            .tree
            .set_expanded(&NodeRef::Environment("dev".to_string()), true);
        state.tree.set_projects(
            "dev",
            vec![ProjectInfo::new("dev".to_string(), "shop".to_string())],
        );
        state.tree.set_expanded(
            &NodeRef::Project {
                env: "dev".to_string(),
                project: "shop".to_string(),
            },
            true,
        );
        state.rebuild_rows();
        state
    }

    fn labels(state: &AppState) -> Vec<&str> {
        state.rows.iter().map(|r| r.node.label()).collect()
    }

    fn message(state: &AppState) -> Option<&str> {
        state.ui_state.message.as_ref().map(|m| m.text.as_str())
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_refresh_refetches_expanded_nodes() {
        let (dir, client, activity) = fake_kde(&[
            STATUS,
            LS,
            ("use", r#"echo "use $1" >> calls.log"#),
            (
                "project",
                r#"echo "project $*" >> calls.log
case "$1" in
  ls) printf 'shop\nblog\n' ;;
  pod) echo shop-7 ;;
esac"#,
            ),
        ]);
        let mut state = expanded_tree();

        refresh_tree(&mut state, &client, &activity).await;

        assert_eq!(labels(&state), vec!["dev", "shop", "shop-7", "blog"]);
        assert_eq!(message(&state), None);
        let calls = fs::read_to_string(dir.path().join("calls.log")).unwrap();
        assert_eq!(calls, "use dev\nproject ls\nuse dev\nproject pod shop\n");
        assert!(
            activity
                .all()
                .iter()
                .any(|e| e.display() == "[refresh] environments: dev")
        );
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_refresh_root_failure_empties_tree() {
        let (_dir, client, activity) = fake_kde(&[
            ("status", "echo 'cluster unreachable' >&2\nexit 1"),
            LS,
        ]);
        let mut state = expanded_tree();

        refresh_tree(&mut state, &client, &activity).await;

        assert!(state.rows.is_empty());
        assert!(state.selected_node().is_none());
        assert_eq!(message(&state), Some("cluster unreachable"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_refresh_blank_status_fails_root_load() {
        let (_dir, client, activity) = fake_kde(&[("status", "true"), LS]);
        let mut state = expanded_tree();

        refresh_tree(&mut state, &client, &activity).await;

        assert!(state.rows.is_empty());
        assert!(message(&state).is_some_and(|m| m.starts_with("invalid status output")));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_refresh_project_failure_leaves_environment_empty() {
        let (_dir, client, activity) = fake_kde(&[
            STATUS,
            LS,
            ("use", "true"),
            ("project", "echo 'no projects here' >&2\nexit 2"),
        ]);
        let mut state = expanded_tree();

        refresh_tree(&mut state, &client, &activity).await;

        assert_eq!(labels(&state), vec!["dev"]);
        assert_eq!(
            message(&state),
            Some("Unable to load projects (dev): no projects here")
        );
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_refresh_pod_failure_leaves_project_empty() {
        let (_dir, client, activity) = fake_kde(&[
            STATUS,
            LS,
            ("use", "true"),
            (
                "project",
                r#"case "$1" in
  ls) echo shop ;;
  pod) echo 'pods unavailable' >&2; exit 1 ;;
esac"#,
            ),
        ]);
        let mut state = expanded_tree();

        refresh_tree(&mut state, &client, &activity).await;

        assert_eq!(labels(&state), vec!["dev", "shop"]);
        assert_eq!(
            message(&state),
            Some("Unable to load pods (shop): pods unavailable")
        );
    }

    #[test]
    fn test_timer_refresh_waits_for_prompt() {
        let mut state = AppState::new();
        assert!(timer_refresh_allowed(&state));

        state.open_prompt(Prompt::add_environment());
        assert!(!timer_refresh_allowed(&state));

        state.close_prompt();
        assert!(timer_refresh_allowed(&state));
    }

    #[test]
    fn test_environment_actions_need_environment_row() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let activity = ActivityLog::new(10);
        let mut palette = CommandPaletteState::default();
        let mut commands = Vec::new();
        let mut state = expanded_tree();
        state.list_down();
        assert_eq!(state.selected_node().map(|n| n.label()), Some("shop"));

        for action in [
            Action::CreateEnvironment,
            Action::StopEnvironment,
            Action::CreateProject,
        ] {
            state.dismiss_message();
            handle_action(&mut state, &tx, &activity, &mut palette, &mut commands, action);
            assert_eq!(message(&state), Some("Select an environment first"));
        }
        assert!(state.prompt.is_none());
        assert!(rx.try_recv().is_err());

        state.list_up();
        handle_action(
            &mut state,
            &tx,
            &activity,
            &mut palette,
            &mut commands,
            Action::StopEnvironment,
        );
        match rx.try_recv() {
            Ok(InternalAction::RunPipeline(pipeline)) => {
                assert_eq!(pipeline.render("kde"), "kde use dev && kde stop dev");
            }
            _ => panic!("expected a pipeline"),
        }
    }

    #[test]
    fn test_flags_override_settings() {
        let args = Args::parse_from([
            "kdepanel",
            "--binary",
            "/opt/kde",
            "--refresh-secs",
            "30",
            "--launcher",
            "tmux",
            "new-window",
            "-n",
            "{title}",
        ]);
        let settings = args.merge_into(Settings {
            cwd: Some(PathBuf::from("/srv")),
            ..Settings::default()
        });

        assert_eq!(settings.binary, "/opt/kde");
        assert_eq!(settings.refresh_secs, 30);
        assert_eq!(settings.cwd, Some(PathBuf::from("/srv")));
        assert_eq!(
            settings.launcher,
            Some(vec![
                "tmux".to_string(),
                "new-window".to_string(),
                "-n".to_string(),
                "{title}".to_string(),
            ])
        );
    }

    #[test]
    fn test_settings_kept_without_flags() {
        let args = Args::parse_from(["kdepanel"]);
        let settings = args.merge_into(Settings::default());
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_expand_queues_project_load() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut state = AppState::new();
        state.tree.set_environments(vec![EnvironmentInfo::new(
            "dev".to_string(),
            EnvStatus::Running,
        )]);
        state.rebuild_rows();

        expand_selected(&mut state, &tx);
        assert!(state.rows[0].expanded);
        assert!(matches!(rx.try_recv(), Ok(InternalAction::LoadProjects(env)) if env == "dev"));
    }

    #[test]
    fn test_prompt_submit_runs_pipeline() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let activity = ActivityLog::new(10);
        let mut palette = CommandPaletteState::default();
        let mut commands = Vec::new();
        let mut state = AppState::new();
        state.open_prompt(Prompt::create_project("dev"));

        for action in "shop"
            .chars()
            .map(Action::PromptInput)
            .chain([Action::PromptSubmit])
        {
            handle_action(&mut state, &tx, &activity, &mut palette, &mut commands, action);
        }

        assert!(state.prompt.is_none());
        match rx.try_recv() {
            Ok(InternalAction::RunPipeline(pipeline)) => {
                assert_eq!(pipeline.render("kde"), "kde use dev && kde project create shop");
            }
            _ => panic!("expected a pipeline"),
        }
    }

    #[test]
    fn test_prompt_error_keeps_prompt_open() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let activity = ActivityLog::new(10);
        let mut palette = CommandPaletteState::default();
        let mut commands = Vec::new();
        let mut state = AppState::new();
        state.open_prompt(Prompt::add_environment());

        handle_action(&mut state, &tx, &activity, &mut palette, &mut commands, Action::PromptInput(' '));
        handle_action(&mut state, &tx, &activity, &mut palette, &mut commands, Action::PromptSubmit);

        assert!(state.prompt.as_ref().is_some_and(|p| p.error.is_some()));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_project_action_without_project_selected() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let activity = ActivityLog::new(10);
        let mut palette = CommandPaletteState::default();
        let mut commands = Vec::new();
        let mut state = AppState::new();

        handle_action(
            &mut state,
            &tx,
            &activity,
            &mut palette,
            &mut commands,
            Action::TelepresenceReplace,
        );
        assert_eq!(
            state.ui_state.message.as_ref().map(|m| m.text.as_str()),
            Some("Select a project first")
        );
        assert!(rx.try_recv().is_err());
    }
}
