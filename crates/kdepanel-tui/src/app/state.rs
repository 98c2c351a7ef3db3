use kdepanel_activity::ActivityFilter;
use kdepanel_types::PodInfo;
use ratatui::widgets::ListState;

use super::{EnvironmentTree, NodeRef, Prompt, TreeRow};

/// Which pane receives navigation keys
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Focus {
    #[default]
    Tree,
    Activity,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MessageLevel {
    Info,
    Error,
}

/// One-line message shown above the status bar until dismissed
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Message {
    pub level: MessageLevel,
    pub text: String,
}

/// UI-specific transient state
pub struct UiState {
    /// Selection in the flattened tree
    pub list_state: ListState,

    /// Is help overlay visible?
    pub help_visible: bool,

    /// Is the activity pane shown under the tree?
    pub activity_visible: bool,

    pub focus: Focus,

    /// Scroll position in the activity pane
    pub activity_scroll: usize,

    /// Keep the activity pane pinned to the newest line
    pub follow: bool,

    /// Is search/filter bar active?
    pub search_active: bool,

    /// Current search input text
    pub search_input: String,

    /// Currently active filter (None = show all)
    pub active_filter: Option<ActivityFilter>,

    /// Filter input error message (e.g., invalid regex)
    pub filter_error: Option<String>,

    /// Case insensitive search?
    pub filter_case_insensitive: bool,

    pub message: Option<Message>,

    /// What the panel is waiting on, if anything
    pub busy: Option<String>,
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            list_state: ListState::default(),
            help_visible: false,
            activity_visible: true,
            focus: Focus::Tree,
            activity_scroll: 0,
            follow: true,
            search_active: false,
            search_input: String::new(),
            active_filter: None,
            filter_error: None,
            filter_case_insensitive: true,
            message: None,
            busy: None,
        }
    }
}

/// Global application state
pub struct AppState {
    pub tree: EnvironmentTree,

    /// Visible rows of the tree, rebuilt after every tree change
    pub rows: Vec<TreeRow>,

    /// Open input prompt, if any
    pub prompt: Option<Prompt>,

    /// UI state
    pub ui_state: UiState,

    /// Whether app should quit
    pub should_quit: bool,
}

impl AppState {
    pub fn new() -> Self {
        Self {
            tree: EnvironmentTree::new(),
            rows: Vec::new(),
            prompt: None,
            ui_state: UiState::default(),
            should_quit: false,
        }
    }

    /// Recompute visible rows, keeping the selection on the same node
    pub fn rebuild_rows(&mut self) {
        let selected = self.selected_node().cloned();
        let previous_index = self.ui_state.list_state.selected();
        self.rows = self.tree.rows();

        if self.rows.is_empty() {
            self.ui_state.list_state.select(None);
            return;
        }

        let index = selected
            .and_then(|node| self.rows.iter().position(|r| r.node == node))
            .or_else(|| previous_index.map(|i| i.min(self.rows.len() - 1)))
            .unwrap_or(0);
        self.ui_state.list_state.select(Some(index));
    }

    pub fn selected_row(&self) -> Option<&TreeRow> {
        self.ui_state
            .list_state
            .selected()
            .and_then(|i| self.rows.get(i))
    }

    pub fn selected_node(&self) -> Option<&NodeRef> {
        self.selected_row().map(|r| &r.node)
    }

    /// Environment of whatever is selected
    pub fn selected_env(&self) -> Option<String> {
        self.selected_node().map(|n| n.env_name().to_string())
    }

    /// Selected environment row; projects and pods are not environments
    pub fn selected_environment(&self) -> Option<String> {
        match self.selected_node()? {
            NodeRef::Environment(env) => Some(env.clone()),
            _ => None,
        }
    }

    /// Selected project as (environment, project); pods are not projects
    pub fn selected_project(&self) -> Option<(String, String)> {
        match self.selected_node()? {
            NodeRef::Project { env, project } => Some((env.clone(), project.clone())),
            _ => None,
        }
    }

    pub fn selected_pod(&self) -> Option<PodInfo> {
        match self.selected_node()? {
            NodeRef::Pod { env, project, pod } => {
                Some(PodInfo::new(env.clone(), project.clone(), pod.clone()))
            }
            _ => None,
        }
    }

    /// Move selection up
    pub fn list_up(&mut self) {
        let len = self.rows.len();
        if len == 0 {
            return;
        }

        let i = match self.ui_state.list_state.selected() {
            Some(i) => {
                if i == 0 {
                    len - 1
                } else {
                    i - 1
                }
            }
            None => 0,
        };
        self.ui_state.list_state.select(Some(i));
    }

    /// Move selection down
    pub fn list_down(&mut self) {
        let len = self.rows.len();
        if len == 0 {
            return;
        }

        let i = match self.ui_state.list_state.selected() {
            Some(i) => {
                if i >= len - 1 {
                    0
                } else {
                    i + 1
                }
            }
            None => 0,
        };
        self.ui_state.list_state.select(Some(i));
    }

    pub fn list_top(&mut self) {
        if !self.rows.is_empty() {
            self.ui_state.list_state.select(Some(0));
        }
    }

    pub fn list_bottom(&mut self) {
        if !self.rows.is_empty() {
            self.ui_state.list_state.select(Some(self.rows.len() - 1));
        }
    }

    /// Collapse the selected node, or jump to its parent when already collapsed
    pub fn collapse_selected(&mut self) {
        let Some(node) = self.selected_node().cloned() else {
            return;
        };

        if self.tree.is_expanded(&node) {
            self.tree.set_expanded(&node, false);
            self.rebuild_rows();
            return;
        }

        let parent = match node {
            NodeRef::Environment(_) => None,
            NodeRef::Project { env, .. } => Some(NodeRef::Environment(env)),
            NodeRef::Pod { env, project, .. } => Some(NodeRef::Project { env, project }),
        };
        if let Some(index) = parent.and_then(|p| self.rows.iter().position(|r| r.node == p)) {
            self.ui_state.list_state.select(Some(index));
        }
    }

    /// Show an error message
    pub fn show_error(&mut self, msg: String) {
        self.ui_state.message = Some(Message {
            level: MessageLevel::Error,
            text: msg,
        });
    }

    pub fn show_info(&mut self, msg: String) {
        self.ui_state.message = Some(Message {
            level: MessageLevel::Info,
            text: msg,
        });
    }

    /// Dismiss the message
    pub fn dismiss_message(&mut self) {
        self.ui_state.message = None;
    }

    pub fn open_prompt(&mut self, prompt: Prompt) {
        self.prompt = Some(prompt);
    }

    pub fn close_prompt(&mut self) {
        self.prompt = None;
    }

    pub fn toggle_focus(&mut self) {
        self.ui_state.focus = match self.ui_state.focus {
            Focus::Tree if self.ui_state.activity_visible => Focus::Activity,
            _ => Focus::Tree,
        };
    }

    pub fn toggle_activity(&mut self) {
        self.ui_state.activity_visible = !self.ui_state.activity_visible;
        if !self.ui_state.activity_visible {
            self.ui_state.focus = Focus::Tree;
            self.ui_state.search_active = false;
        }
    }

    /// Start search/filter input mode
    pub fn start_search(&mut self) {
        self.ui_state.search_active = true;
        self.ui_state.search_input.clear();
        self.ui_state.filter_error = None;
    }

    /// Cancel search/filter input and clear filter
    pub fn cancel_search(&mut self) {
        self.ui_state.search_active = false;
        self.ui_state.search_input.clear();
        self.ui_state.active_filter = None;
        self.ui_state.filter_error = None;
    }

    /// Apply the current search input as a filter
    pub fn apply_filter(&mut self) {
        self.ui_state.search_active = false;
        self.ui_state.filter_error = None;

        if self.ui_state.search_input.is_empty() {
            self.ui_state.active_filter = None;
            return;
        }

        let result = if self.ui_state.filter_case_insensitive {
            ActivityFilter::new_case_insensitive(&self.ui_state.search_input)
        } else {
            ActivityFilter::new(&self.ui_state.search_input)
        };

        match result {
            Ok(filter) => {
                self.ui_state.active_filter = Some(filter);
            }
            Err(e) => {
                self.ui_state.filter_error = Some(format!("Invalid regex: {}", e));
                self.ui_state.search_active = true;
            }
        }
    }

    /// Replace the active filter with a ready-made one
    pub fn apply_preset(&mut self, filter: ActivityFilter) {
        self.ui_state.search_active = false;
        self.ui_state.search_input.clear();
        self.ui_state.filter_error = None;
        self.ui_state.active_filter = Some(filter);
    }

    /// Clear the active filter
    pub fn clear_filter(&mut self) {
        self.ui_state.active_filter = None;
        self.ui_state.search_input.clear();
        self.ui_state.filter_error = None;
    }

    /// Add a character to search input
    pub fn search_input_char(&mut self, c: char) {
        self.ui_state.search_input.push(c);
    }

    /// Remove last character from search input
    pub fn search_input_backspace(&mut self) {
        self.ui_state.search_input.pop();
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kdepanel_types::{EnvStatus, EnvironmentInfo, ProjectInfo};

    fn state_with_tree() -> AppState {
        let mut state = AppState::new();
        state.tree.set_environments(vec![
            EnvironmentInfo::new("dev".to_string(), EnvStatus::Running),
            EnvironmentInfo::new("qa".to_string(), EnvStatus::Unready),
        ]);
        state.rebuild_rows();
        state
    }

    fn expand_dev(state: &mut AppState) {
        state
            .tree
            .set_expanded(&NodeRef::Environment("dev".to_string()), true);
        state.tree.set_projects(
            "dev",
            vec![
                ProjectInfo::new("dev".to_string(), "shop".to_string()),
                ProjectInfo::new("dev".to_string(), "blog".to_string()),
            ],
        );
        state.rebuild_rows();
    }

    #[test]
    fn test_selection_wraps() {
        let mut state = state_with_tree();
        assert_eq!(state.selected_env().as_deref(), Some("dev"));
        state.list_up();
        assert_eq!(state.selected_env().as_deref(), Some("qa"));
        state.list_down();
        assert_eq!(state.selected_env().as_deref(), Some("dev"));
    }

    #[test]
    fn test_selection_follows_node_across_rebuild() {
        let mut state = state_with_tree();
        state.list_bottom();
        assert_eq!(state.selected_env().as_deref(), Some("qa"));

        expand_dev(&mut state);
        assert_eq!(state.selected_env().as_deref(), Some("qa"));
        assert_eq!(state.ui_state.list_state.selected(), Some(3));
    }

    #[test]
    fn test_selection_clamped_when_node_disappears() {
        let mut state = state_with_tree();
        state.list_bottom();
        state.tree.set_environments(vec![EnvironmentInfo::new(
            "dev".to_string(),
            EnvStatus::Running,
        )]);
        state.rebuild_rows();
        assert_eq!(state.ui_state.list_state.selected(), Some(0));

        state.tree.set_environments(Vec::new());
        state.rebuild_rows();
        assert_eq!(state.ui_state.list_state.selected(), None);
        assert!(state.selected_node().is_none());
    }

    #[test]
    fn test_selected_project_and_collapse_to_parent() {
        let mut state = state_with_tree();
        expand_dev(&mut state);
        state.list_down();
        assert_eq!(
            state.selected_project(),
            Some(("dev".to_string(), "shop".to_string()))
        );
        assert!(state.selected_pod().is_none());
        assert_eq!(state.selected_env().as_deref(), Some("dev"));
        assert_eq!(state.selected_environment(), None);

        state.collapse_selected();
        assert_eq!(state.ui_state.list_state.selected(), Some(0));
        assert_eq!(state.selected_environment().as_deref(), Some("dev"));

        state.collapse_selected();
        assert_eq!(state.rows.len(), 2);
    }

    #[test]
    fn test_filter_apply_and_invalid_regex() {
        let mut state = state_with_tree();
        state.start_search();
        state.search_input_char('(');
        state.apply_filter();
        assert!(state.ui_state.filter_error.is_some());
        assert!(state.ui_state.search_active);

        state.search_input_backspace();
        "kde use".chars().for_each(|c| state.search_input_char(c));
        state.apply_filter();
        assert_eq!(
            state.ui_state.active_filter.as_ref().map(|f| f.pattern()),
            Some("kde use")
        );

        state.clear_filter();
        assert!(state.ui_state.active_filter.is_none());

        state.apply_preset(kdepanel_activity::FilterPresets::commands_and_errors());
        assert!(state.ui_state.active_filter.is_some());
        assert!(state.ui_state.search_input.is_empty());
    }

    #[test]
    fn test_focus_requires_visible_activity() {
        let mut state = state_with_tree();
        state.toggle_focus();
        assert_eq!(state.ui_state.focus, Focus::Activity);
        state.toggle_activity();
        assert_eq!(state.ui_state.focus, Focus::Tree);
        state.toggle_focus();
        assert_eq!(state.ui_state.focus, Focus::Tree);
    }
}
