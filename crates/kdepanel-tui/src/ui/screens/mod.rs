mod activity_pane;
mod environment_tree;
mod main_screen;

pub use activity_pane::ActivityPane;
pub use environment_tree::EnvironmentTreeView;
pub use main_screen::MainScreen;
