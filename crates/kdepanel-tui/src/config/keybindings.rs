use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::collections::HashMap;

use kdepanel_types::{DeployOp, ExecTarget};

use crate::app::{Action, EnvTool};

/// A key combination
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct KeyBinding {
    pub code: KeyCode,
    pub modifiers: KeyModifiers,
}

impl KeyBinding {
    pub fn new(code: KeyCode) -> Self {
        Self {
            code,
            modifiers: KeyModifiers::NONE,
        }
    }

    pub fn ctrl(code: KeyCode) -> Self {
        Self {
            code,
            modifiers: KeyModifiers::CONTROL,
        }
    }

    pub fn shift(code: KeyCode) -> Self {
        Self {
            code,
            modifiers: KeyModifiers::SHIFT,
        }
    }

    pub fn from_event(event: &KeyEvent) -> Self {
        Self {
            code: event.code,
            modifiers: event.modifiers,
        }
    }
}

/// Context for keybindings
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum KeyContext {
    Global,
    Tree,
    Activity,
    FilterInput,
    Prompt,
    CommandPalette,
}

/// Keybinding configuration
pub struct KeyBindings {
    bindings: HashMap<KeyContext, HashMap<KeyBinding, Action>>,
}

impl KeyBindings {
    pub fn new() -> Self {
        let mut bindings = HashMap::new();

        // Global bindings
        let mut global = HashMap::new();
        global.insert(
            KeyBinding::new(KeyCode::Char(' ')),
            Action::ToggleCommandPalette,
        );
        global.insert(KeyBinding::new(KeyCode::Char('?')), Action::ToggleHelp);
        global.insert(KeyBinding::new(KeyCode::Esc), Action::GoBack);
        global.insert(KeyBinding::ctrl(KeyCode::Char('c')), Action::Quit);
        global.insert(KeyBinding::new(KeyCode::Char('q')), Action::Quit);
        global.insert(KeyBinding::new(KeyCode::Tab), Action::SwitchFocus);
        global.insert(KeyBinding::new(KeyCode::Char('o')), Action::ToggleActivity);
        global.insert(KeyBinding::new(KeyCode::Char('r')), Action::Refresh);
        global.insert(KeyBinding::new(KeyCode::F(5)), Action::Refresh);
        bindings.insert(KeyContext::Global, global);

        // Tree bindings
        let mut tree = HashMap::new();
        tree.insert(KeyBinding::new(KeyCode::Char('j')), Action::ListDown);
        tree.insert(KeyBinding::new(KeyCode::Down), Action::ListDown);
        tree.insert(KeyBinding::new(KeyCode::Char('k')), Action::ListUp);
        tree.insert(KeyBinding::new(KeyCode::Up), Action::ListUp);
        tree.insert(KeyBinding::new(KeyCode::Char('g')), Action::ListTop);
        tree.insert(KeyBinding::shift(KeyCode::Char('G')), Action::ListBottom);
        tree.insert(KeyBinding::new(KeyCode::Home), Action::ListTop);
        tree.insert(KeyBinding::new(KeyCode::End), Action::ListBottom);
        tree.insert(KeyBinding::new(KeyCode::Char('l')), Action::Expand);
        tree.insert(KeyBinding::new(KeyCode::Right), Action::Expand);
        tree.insert(KeyBinding::new(KeyCode::Char('h')), Action::Collapse);
        tree.insert(KeyBinding::new(KeyCode::Left), Action::Collapse);
        tree.insert(KeyBinding::new(KeyCode::Enter), Action::ToggleNode);
        // Environment
        tree.insert(KeyBinding::shift(KeyCode::Char('N')), Action::AddEnvironment);
        tree.insert(KeyBinding::new(KeyCode::Char('c')), Action::CreateEnvironment);
        tree.insert(KeyBinding::new(KeyCode::Char('s')), Action::StopEnvironment);
        tree.insert(
            KeyBinding::shift(KeyCode::Char('K')),
            Action::OpenTool(EnvTool::K9s),
        );
        tree.insert(
            KeyBinding::shift(KeyCode::Char('H')),
            Action::OpenTool(EnvTool::Headlamp),
        );
        tree.insert(
            KeyBinding::shift(KeyCode::Char('F')),
            Action::OpenTool(EnvTool::PortForward),
        );
        tree.insert(KeyBinding::new(KeyCode::Char('n')), Action::CreateProject);
        // Project
        tree.insert(
            KeyBinding::new(KeyCode::Char('d')),
            Action::Deploy(DeployOp::Deploy),
        );
        tree.insert(
            KeyBinding::new(KeyCode::Char('u')),
            Action::Deploy(DeployOp::Undeploy),
        );
        tree.insert(
            KeyBinding::shift(KeyCode::Char('D')),
            Action::Deploy(DeployOp::Redeploy),
        );
        tree.insert(
            KeyBinding::new(KeyCode::Char('e')),
            Action::ExecProject(ExecTarget::Develop),
        );
        tree.insert(
            KeyBinding::shift(KeyCode::Char('E')),
            Action::ExecProject(ExecTarget::Deploy),
        );
        tree.insert(
            KeyBinding::new(KeyCode::Char('t')),
            Action::TelepresenceReplace,
        );
        // Pod
        tree.insert(KeyBinding::shift(KeyCode::Char('L')), Action::TailPodLogs);
        tree.insert(KeyBinding::new(KeyCode::Char('f')), Action::ForwardPod);
        tree.insert(KeyBinding::new(KeyCode::Char('x')), Action::ExecPod);
        bindings.insert(KeyContext::Tree, tree);

        // Activity pane bindings - less-like navigation
        let mut activity = HashMap::new();
        activity.insert(KeyBinding::new(KeyCode::Char('j')), Action::ScrollDown(1));
        activity.insert(KeyBinding::new(KeyCode::Down), Action::ScrollDown(1));
        activity.insert(KeyBinding::new(KeyCode::Char('k')), Action::ScrollUp(1));
        activity.insert(KeyBinding::new(KeyCode::Up), Action::ScrollUp(1));
        activity.insert(KeyBinding::ctrl(KeyCode::Char('d')), Action::ScrollDown(10));
        activity.insert(KeyBinding::ctrl(KeyCode::Char('u')), Action::ScrollUp(10));
        activity.insert(KeyBinding::new(KeyCode::PageDown), Action::ScrollDown(10));
        activity.insert(KeyBinding::new(KeyCode::PageUp), Action::ScrollUp(10));
        activity.insert(KeyBinding::new(KeyCode::Char('g')), Action::ScrollToTop);
        activity.insert(KeyBinding::shift(KeyCode::Char('G')), Action::ScrollToBottom);
        activity.insert(KeyBinding::new(KeyCode::Home), Action::ScrollToTop);
        activity.insert(KeyBinding::new(KeyCode::End), Action::ScrollToBottom);
        activity.insert(KeyBinding::new(KeyCode::Char('f')), Action::ToggleFollow);
        activity.insert(KeyBinding::new(KeyCode::Char('/')), Action::OpenSearch);
        activity.insert(KeyBinding::new(KeyCode::Char('n')), Action::ClearFilter);
        activity.insert(KeyBinding::shift(KeyCode::Char('C')), Action::ShowCommandsOnly);
        activity.insert(KeyBinding::new(KeyCode::Char('i')), Action::ToggleCaseSensitive);
        activity.insert(KeyBinding::new(KeyCode::Char('c')), Action::ClearActivity);
        activity.insert(KeyBinding::new(KeyCode::Char('e')), Action::ExportActivity);
        bindings.insert(KeyContext::Activity, activity);

        // Filter input bindings (when search bar is active)
        let mut filter_input = HashMap::new();
        filter_input.insert(KeyBinding::new(KeyCode::Enter), Action::ApplyFilter);
        filter_input.insert(KeyBinding::new(KeyCode::Esc), Action::CloseSearch);
        filter_input.insert(KeyBinding::new(KeyCode::Backspace), Action::SearchBackspace);
        filter_input.insert(KeyBinding::ctrl(KeyCode::Char('u')), Action::SearchClear);
        filter_input.insert(KeyBinding::ctrl(KeyCode::Char('c')), Action::CloseSearch);
        bindings.insert(KeyContext::FilterInput, filter_input);

        // Prompt bindings
        let mut prompt = HashMap::new();
        prompt.insert(KeyBinding::new(KeyCode::Enter), Action::PromptSubmit);
        prompt.insert(KeyBinding::new(KeyCode::Esc), Action::PromptCancel);
        prompt.insert(KeyBinding::ctrl(KeyCode::Char('c')), Action::PromptCancel);
        prompt.insert(KeyBinding::new(KeyCode::Backspace), Action::PromptBackspace);
        prompt.insert(KeyBinding::ctrl(KeyCode::Char('u')), Action::PromptClear);
        prompt.insert(KeyBinding::new(KeyCode::Up), Action::PromptUp);
        prompt.insert(KeyBinding::new(KeyCode::Down), Action::PromptDown);
        prompt.insert(KeyBinding::ctrl(KeyCode::Char('p')), Action::PromptUp);
        prompt.insert(KeyBinding::ctrl(KeyCode::Char('n')), Action::PromptDown);
        bindings.insert(KeyContext::Prompt, prompt);

        // Command palette bindings
        let mut palette = HashMap::new();
        palette.insert(KeyBinding::new(KeyCode::Up), Action::PaletteUp);
        palette.insert(KeyBinding::new(KeyCode::Down), Action::PaletteDown);
        palette.insert(KeyBinding::ctrl(KeyCode::Char('p')), Action::PaletteUp);
        palette.insert(KeyBinding::ctrl(KeyCode::Char('n')), Action::PaletteDown);
        palette.insert(KeyBinding::new(KeyCode::Enter), Action::PaletteSelect);
        palette.insert(KeyBinding::new(KeyCode::Esc), Action::PaletteClose);
        palette.insert(KeyBinding::new(KeyCode::Backspace), Action::PaletteBackspace);
        palette.insert(KeyBinding::ctrl(KeyCode::Char('c')), Action::PaletteClose);
        bindings.insert(KeyContext::CommandPalette, palette);

        Self { bindings }
    }

    /// Look up action for key event in given context
    pub fn get_action(&self, context: KeyContext, key: &KeyEvent) -> Option<Action> {
        let binding = KeyBinding::from_event(key);

        // First check context-specific bindings
        if let Some(action) = self
            .bindings
            .get(&context)
            .and_then(|context_bindings| context_bindings.get(&binding))
        {
            return Some(action.clone());
        }

        // Fall back to global bindings
        self.bindings
            .get(&KeyContext::Global)?
            .get(&binding)
            .cloned()
    }

    /// Handle key event in filter input mode
    /// Returns Some(Action) for special keys, None for unbound non-character keys
    pub fn get_filter_input_action(&self, key: &KeyEvent) -> Option<Action> {
        self.text_input_action(KeyContext::FilterInput, key, Action::SearchInput)
    }

    /// Handle key event while a prompt is open
    pub fn get_prompt_action(&self, key: &KeyEvent) -> Option<Action> {
        self.text_input_action(KeyContext::Prompt, key, Action::PromptInput)
    }

    /// Handle key event in command palette mode
    pub fn get_palette_action(&self, key: &KeyEvent) -> Option<Action> {
        self.text_input_action(KeyContext::CommandPalette, key, Action::PaletteInput)
    }

    /// Context bindings first; plain (or shifted) characters become input
    fn text_input_action(
        &self,
        context: KeyContext,
        key: &KeyEvent,
        input: fn(char) -> Action,
    ) -> Option<Action> {
        let binding = KeyBinding::from_event(key);

        if let Some(action) = self
            .bindings
            .get(&context)
            .and_then(|context_bindings| context_bindings.get(&binding))
        {
            return Some(action.clone());
        }

        if let KeyCode::Char(c) = key.code {
            if key.modifiers.is_empty() || key.modifiers == KeyModifiers::SHIFT {
                return Some(input(c));
            }
        }

        None
    }
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self::new()
    }
}
