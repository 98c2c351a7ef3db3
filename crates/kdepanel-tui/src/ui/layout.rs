use ratatui::layout::{Constraint, Direction, Layout as RatatuiLayout, Rect};

/// Areas of the main screen
pub struct MainAreas {
    pub header: Rect,
    pub tree: Rect,
    pub activity: Option<Rect>,
    pub message: Option<Rect>,
    pub status: Rect,
}

/// Layout helper for consistent screen layouts
pub struct Layout;

impl Layout {
    /// Header, tree, optional activity pane, optional message line, status bar
    pub fn main(area: Rect, show_activity: bool, show_message: bool) -> MainAreas {
        let mut constraints = vec![Constraint::Length(3)]; // Header
        if show_activity {
            constraints.push(Constraint::Percentage(55)); // Tree
            constraints.push(Constraint::Min(5)); // Activity
        } else {
            constraints.push(Constraint::Min(1)); // Tree
        }
        if show_message {
            constraints.push(Constraint::Length(1)); // Message
        }
        constraints.push(Constraint::Length(1)); // Status bar

        let chunks = RatatuiLayout::default()
            .direction(Direction::Vertical)
            .constraints(constraints)
            .split(area);

        let mut idx = 0;
        let mut next = || {
            let rect = chunks[idx];
            idx += 1;
            rect
        };

        let header = next();
        let tree = next();
        let activity = show_activity.then(&mut next);
        let message = show_message.then(&mut next);
        let status = next();

        MainAreas {
            header,
            tree,
            activity,
            message,
            status,
        }
    }

    /// Rect of the given size centered in `area`, clamped to fit
    pub fn centered(width: u16, height: u16, area: Rect) -> Rect {
        let width = width.min(area.width.saturating_sub(4));
        let height = height.min(area.height.saturating_sub(4));
        let x = area.x + (area.width.saturating_sub(width)) / 2;
        let y = area.y + (area.height.saturating_sub(height)) / 2;
        Rect::new(x, y, width, height)
    }
}
