mod command_palette;
mod help_overlay;
mod prompt_popup;
mod status_bar;

pub use command_palette::{
    Command, CommandPalette, CommandPaletteState, activity_commands, commands_for,
};
pub use help_overlay::HelpOverlay;
pub use prompt_popup::PromptPopup;
pub use status_bar::{StatusBar, activity_hints, tree_hints};
