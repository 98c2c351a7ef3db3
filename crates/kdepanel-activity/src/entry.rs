use chrono::{DateTime, Local};

/// What an activity line records
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ActivityKind {
    /// A command line about to run (`$ kde ls`)
    Command,
    /// Working directory of the command
    Cwd,
    /// Captured standard output
    Output,
    /// Failure text (stderr or exit status)
    Error,
    /// Panel-side notes such as task starts, terminal launches and refreshes
    Info,
}

impl ActivityKind {
    /// Prefix used when rendering and exporting the line
    pub fn prefix(&self) -> &'static str {
        match self {
            Self::Command => "$ ",
            Self::Cwd => "cwd: ",
            Self::Output => "",
            Self::Error => "[error] ",
            Self::Info => "",
        }
    }
}

/// A single activity line
#[derive(Clone, Debug)]
pub struct ActivityEntry {
    /// Unique sequential ID
    pub id: u64,

    /// When the line was recorded
    pub timestamp: DateTime<Local>,

    pub kind: ActivityKind,

    /// Line text without prefix
    pub text: String,
}

impl ActivityEntry {
    pub fn new(kind: ActivityKind, text: impl Into<String>) -> Self {
        Self {
            id: 0,
            timestamp: Local::now(),
            kind,
            text: text.into(),
        }
    }

    /// Line as it appears in the activity pane
    pub fn display(&self) -> String {
        format!("{}{}", self.kind.prefix(), self.text)
    }
}
