use kdepanel_types::{DeployOp, ExecTarget};
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout as RatatuiLayout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph},
};

use crate::app::{Action, EnvTool, NodeRef};
use crate::ui::Layout;

/// A command that can be executed from the palette
#[derive(Clone, Debug)]
pub struct Command {
    pub name: &'static str,
    pub description: &'static str,
    pub key_hint: &'static str,
    pub action: Action,
}

impl Command {
    const fn new(
        name: &'static str,
        description: &'static str,
        key_hint: &'static str,
        action: Action,
    ) -> Self {
        Self {
            name,
            description,
            key_hint,
            action,
        }
    }
}

/// Command palette state
pub struct CommandPaletteState {
    pub visible: bool,
    pub search_input: String,
    pub list_state: ListState,
    pub filtered_indices: Vec<usize>,
}

impl Default for CommandPaletteState {
    fn default() -> Self {
        let mut list_state = ListState::default();
        list_state.select(Some(0));
        Self {
            visible: false,
            search_input: String::new(),
            list_state,
            filtered_indices: Vec::new(),
        }
    }
}

impl CommandPaletteState {
    pub fn open(&mut self, commands: &[Command]) {
        self.visible = true;
        self.search_input.clear();
        self.list_state.select(Some(0));
        self.update_filtered(commands);
    }

    pub fn close(&mut self) {
        self.visible = false;
        self.search_input.clear();
    }

    pub fn update_filtered(&mut self, commands: &[Command]) {
        let query = self.search_input.to_lowercase();
        self.filtered_indices = commands
            .iter()
            .enumerate()
            .filter(|(_, cmd)| {
                query.is_empty()
                    || cmd.name.to_lowercase().contains(&query)
                    || cmd.description.to_lowercase().contains(&query)
            })
            .map(|(i, _)| i)
            .collect();

        // Reset selection if out of bounds
        if self.filtered_indices.is_empty() {
            self.list_state.select(None);
        } else if self
            .list_state
            .selected()
            .is_none_or(|current| current >= self.filtered_indices.len())
        {
            self.list_state.select(Some(0));
        }
    }

    pub fn move_up(&mut self) {
        if self.filtered_indices.is_empty() {
            return;
        }
        let i = match self.list_state.selected() {
            Some(0) | None => self.filtered_indices.len() - 1,
            Some(i) => i - 1,
        };
        self.list_state.select(Some(i));
    }

    pub fn move_down(&mut self) {
        if self.filtered_indices.is_empty() {
            return;
        }
        let i = match self.list_state.selected() {
            Some(i) if i + 1 < self.filtered_indices.len() => i + 1,
            _ => 0,
        };
        self.list_state.select(Some(i));
    }

    pub fn selected_command<'a>(&self, commands: &'a [Command]) -> Option<&'a Command> {
        let selected_idx = self.list_state.selected()?;
        let cmd_idx = self.filtered_indices.get(selected_idx)?;
        commands.get(*cmd_idx)
    }

    pub fn input_char(&mut self, c: char, commands: &[Command]) {
        self.search_input.push(c);
        self.update_filtered(commands);
    }

    pub fn input_backspace(&mut self, commands: &[Command]) {
        self.search_input.pop();
        self.update_filtered(commands);
    }
}

/// Command palette widget
pub struct CommandPalette;

impl CommandPalette {
    pub fn render(
        frame: &mut Frame,
        state: &mut CommandPaletteState,
        commands: &[Command],
        scope: &str,
    ) {
        let popup_area = Layout::centered(64, 18, frame.area());

        // Clear the background
        frame.render_widget(Clear, popup_area);

        // Split into search input and list
        let chunks = RatatuiLayout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Search input
                Constraint::Min(1),    // Command list
            ])
            .split(popup_area);

        // Render search input
        let search_text = if state.search_input.is_empty() {
            vec![Span::styled(
                "Type to filter...",
                Style::default().fg(Color::DarkGray),
            )]
        } else {
            vec![
                Span::styled(&state.search_input, Style::default().fg(Color::White)),
                Span::styled("█", Style::default().fg(Color::Yellow)),
            ]
        };

        let search_widget = Paragraph::new(Line::from(search_text)).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Yellow))
                .title(Span::styled(
                    format!(" Commands: {} ", scope),
                    Style::default()
                        .fg(Color::Yellow)
                        .add_modifier(Modifier::BOLD),
                )),
        );
        frame.render_widget(search_widget, chunks[0]);

        // Build list items
        let items: Vec<ListItem> = state
            .filtered_indices
            .iter()
            .filter_map(|&idx| commands.get(idx))
            .map(|cmd| {
                let line = Line::from(vec![
                    Span::styled(
                        format!("{:<24}", cmd.name),
                        Style::default().add_modifier(Modifier::BOLD),
                    ),
                    Span::styled(cmd.description, Style::default().fg(Color::Gray)),
                    Span::styled(
                        format!("  {}", cmd.key_hint),
                        Style::default().fg(Color::DarkGray),
                    ),
                ]);
                ListItem::new(line)
            })
            .collect();

        let list = List::new(items)
            .block(
                Block::default()
                    .borders(Borders::LEFT | Borders::RIGHT | Borders::BOTTOM)
                    .border_style(Style::default().fg(Color::Yellow)),
            )
            .highlight_style(
                Style::default()
                    .bg(Color::Yellow)
                    .fg(Color::Black)
                    .add_modifier(Modifier::BOLD),
            )
            .highlight_symbol("▸ ");

        frame.render_stateful_widget(list, chunks[1], &mut state.list_state);
    }
}

/// Commands offered for the selected tree node
pub fn commands_for(selected: Option<&NodeRef>) -> Vec<Command> {
    let mut commands = match selected {
        None => vec![
            Command::new("Add Environment", "Initialize and create an environment", "N", Action::AddEnvironment),
            Command::new("K9s", "Pick an environment and open k9s", "K", Action::OpenTool(EnvTool::K9s)),
            Command::new("Headlamp", "Pick an environment and open Headlamp", "H", Action::OpenTool(EnvTool::Headlamp)),
            Command::new("Port Forward", "Pick an environment and expose it", "F", Action::OpenTool(EnvTool::PortForward)),
        ],
        Some(NodeRef::Environment(_)) => vec![
            Command::new("Create Environment", "Recreate the environment", "c", Action::CreateEnvironment),
            Command::new("Stop Environment", "Stop the environment", "s", Action::StopEnvironment),
            Command::new("K9s", "Open k9s in this environment", "K", Action::OpenTool(EnvTool::K9s)),
            Command::new("Headlamp", "Open Headlamp in this environment", "H", Action::OpenTool(EnvTool::Headlamp)),
            Command::new("Port Forward", "Expose this environment", "F", Action::OpenTool(EnvTool::PortForward)),
            Command::new("Create Project", "Create a project here", "n", Action::CreateProject),
            Command::new("Add Environment", "Initialize and create an environment", "N", Action::AddEnvironment),
        ],
        Some(NodeRef::Project { .. }) => vec![
            Command::new("Deploy", "Deploy the project", "d", Action::Deploy(DeployOp::Deploy)),
            Command::new("Undeploy", "Undeploy the project", "u", Action::Deploy(DeployOp::Undeploy)),
            Command::new("Redeploy", "Undeploy and deploy again", "D", Action::Deploy(DeployOp::Redeploy)),
            Command::new("Exec Develop", "Shell in the develop environment", "e", Action::ExecProject(ExecTarget::Develop)),
            Command::new("Exec Deploy", "Shell in the deploy environment", "E", Action::ExecProject(ExecTarget::Deploy)),
            Command::new("Telepresence Replace", "Replace the deployment locally", "t", Action::TelepresenceReplace),
        ],
        Some(NodeRef::Pod { .. }) => vec![
            Command::new("Tail Logs", "Follow the pod logs", "L", Action::TailPodLogs),
            Command::new("Port Forward", "Forward a pod port", "f", Action::ForwardPod),
            Command::new("Exec", "Shell in the pod", "x", Action::ExecPod),
        ],
    };

    commands.extend([
        Command::new("Refresh", "Reload the whole tree", "r", Action::Refresh),
        Command::new("Toggle Activity", "Show/hide the activity pane", "o", Action::ToggleActivity),
        Command::new("Show Help", "Display keybindings", "?", Action::ToggleHelp),
        Command::new("Quit", "Exit kdepanel", "q", Action::Quit),
    ]);
    commands
}

/// Commands for the focused activity pane
pub fn activity_commands() -> Vec<Command> {
    vec![
        Command::new("Search/Filter", "Filter activity with regex", "/", Action::OpenSearch),
        Command::new("Clear Filter", "Remove active filter", "n", Action::ClearFilter),
        Command::new("Commands Only", "Show commands and errors", "C", Action::ShowCommandsOnly),
        Command::new("Toggle Case Sensitive", "Case sensitive search", "i", Action::ToggleCaseSensitive),
        Command::new("Toggle Follow", "Stay on the newest line", "f", Action::ToggleFollow),
        Command::new("Clear Activity", "Drop all recorded lines", "c", Action::ClearActivity),
        Command::new("Export Activity", "Save activity to a file", "e", Action::ExportActivity),
        Command::new("Scroll to Top", "Jump to the first line", "g", Action::ScrollToTop),
        Command::new("Scroll to Bottom", "Jump to the newest line", "G", Action::ScrollToBottom),
        Command::new("Back to Tree", "Move focus to the tree", "Tab", Action::SwitchFocus),
        Command::new("Show Help", "Display keybindings", "?", Action::ToggleHelp),
        Command::new("Quit", "Exit kdepanel", "q", Action::Quit),
    ]
}
