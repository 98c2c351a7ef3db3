use kdepanel_types::{DeployOp, ExecTarget};

use crate::app::EnvTool;

/// All possible actions in the application (command pattern)
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Action {
    // Navigation
    GoBack,
    Quit,

    // UI toggles
    ToggleCommandPalette,
    ToggleHelp,
    ToggleActivity,
    SwitchFocus,

    // Command palette
    PaletteUp,
    PaletteDown,
    PaletteSelect,
    PaletteInput(char),
    PaletteBackspace,
    PaletteClose,

    // Tree navigation
    ListUp,
    ListDown,
    ListTop,
    ListBottom,
    Expand,
    Collapse,
    ToggleNode,

    // Refresh
    Refresh,

    // Environment actions
    AddEnvironment,
    CreateEnvironment,
    StopEnvironment,
    OpenTool(EnvTool),
    CreateProject,

    // Project actions
    Deploy(DeployOp),
    ExecProject(ExecTarget),
    TelepresenceReplace,

    // Pod actions
    TailPodLogs,
    ForwardPod,
    ExecPod,

    // Prompt input
    PromptInput(char),
    PromptBackspace,
    PromptClear,
    PromptUp,
    PromptDown,
    PromptSubmit,
    PromptCancel,

    // Activity pane
    ScrollUp(usize),
    ScrollDown(usize),
    ScrollToTop,
    ScrollToBottom,
    ToggleFollow,
    ClearActivity,
    ExportActivity,

    // Search/Filter in the activity pane
    OpenSearch,
    CloseSearch,
    SearchInput(char),
    SearchBackspace,
    SearchClear,
    ApplyFilter,
    ClearFilter,
    ShowCommandsOnly,
    ToggleCaseSensitive,
}
