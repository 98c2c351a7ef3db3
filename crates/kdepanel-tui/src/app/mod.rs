//! Application state and actions

mod action;
mod prompt;
mod state;
mod tree;

pub use action::Action;
pub use prompt::{EnvTool, Flow, Prompt, PromptInput, PromptStep};
pub use state::{AppState, Focus, Message, MessageLevel, UiState};
pub use tree::{EnvNode, EnvironmentTree, NodeRef, ProjectNode, TreeRow};
