//! Terminal UI for kdepanel
//!
//! State, keybindings, settings, event handling and widgets for the
//! environment tree and the activity pane.

pub mod app;
pub mod config;
pub mod tui;
pub mod ui;

pub use app::{
    Action, AppState, EnvTool, Focus, NodeRef, Prompt, PromptStep, UiState,
};
pub use config::{KeyBinding, KeyBindings, KeyContext, Settings, SettingsError};
pub use tui::{Event, EventHandler, Tui};
pub use ui::components::{
    Command, CommandPalette, CommandPaletteState, HelpOverlay, PromptPopup, StatusBar,
    activity_commands, commands_for,
};
pub use ui::screens::{ActivityPane, EnvironmentTreeView, MainScreen};
pub use ui::{Layout, Theme};
