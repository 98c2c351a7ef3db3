use ratatui::{
    buffer::Buffer,
    layout::Rect,
    text::{Line, Span},
    widgets::Widget,
};
use unicode_width::UnicodeWidthStr;

use crate::app::NodeRef;
use crate::ui::Theme;

/// Status bar showing keyboard shortcuts
pub struct StatusBar<'a> {
    hints: Vec<(&'a str, &'a str)>,
    right_text: Option<String>,
}

impl<'a> StatusBar<'a> {
    pub fn new() -> Self {
        Self {
            hints: Vec::new(),
            right_text: None,
        }
    }

    /// Add keyboard hints as (key, description) pairs
    pub fn hints<I>(mut self, hints: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        self.hints = hints.into_iter().collect();
        self
    }

    /// Set text to display on the right side
    pub fn right<S: Into<String>>(mut self, text: S) -> Self {
        self.right_text = Some(text.into());
        self
    }
}

impl Default for StatusBar<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl Widget for StatusBar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        // Fill background
        buf.set_style(area, Theme::status_bar());

        // Build hints
        let mut spans = Vec::new();
        for (i, (key, desc)) in self.hints.iter().enumerate() {
            if i > 0 {
                spans.push(Span::styled("  ", Theme::status_bar()));
            }
            spans.push(Span::styled(format!("[{}]", key), Theme::status_bar_key()));
            spans.push(Span::styled(format!(" {}", desc), Theme::status_bar()));
        }

        let line = Line::from(spans);
        let line_width = line.width() as u16;

        // Render hints on the left
        buf.set_line(area.x + 1, area.y, &line, area.width.saturating_sub(2));

        // Render right text if there is room for it
        if let Some(right) = self.right_text {
            let right_width = right.width() as u16;
            let right_span = Span::styled(&right, Theme::status_bar());
            let right_x = area.x + area.width.saturating_sub(right_width + 2);
            if right_x > area.x + line_width + 2 {
                buf.set_span(right_x, area.y, &right_span, right_width);
            }
        }
    }
}

/// Hints for the tree, depending on what is selected
pub fn tree_hints(selected: Option<&NodeRef>) -> Vec<(&'static str, &'static str)> {
    let mut hints = vec![("Space", "Cmd")];
    match selected {
        None => hints.push(("N", "Add env")),
        Some(NodeRef::Environment(_)) => {
            hints.extend([("Enter", "Expand"), ("c", "Create"), ("s", "Stop"), ("K", "K9s")]);
        }
        Some(NodeRef::Project { .. }) => {
            hints.extend([("Enter", "Expand"), ("d", "Deploy"), ("e", "Exec")]);
        }
        Some(NodeRef::Pod { .. }) => {
            hints.extend([("L", "Logs"), ("f", "Forward"), ("x", "Exec")]);
        }
    }
    hints.extend([("r", "Refresh"), ("?", "Help"), ("q", "Quit")]);
    hints
}

/// Hints while the activity pane has focus
pub fn activity_hints() -> Vec<(&'static str, &'static str)> {
    vec![
        ("Space", "Cmd"),
        ("/", "Filter"),
        ("f", "Follow"),
        ("e", "Export"),
        ("Tab", "Tree"),
        ("?", "Help"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rendered(bar: StatusBar, width: u16) -> String {
        let area = Rect::new(0, 0, width, 1);
        let mut buf = Buffer::empty(area);
        bar.render(area, &mut buf);
        buf.content().iter().map(|c| c.symbol()).collect()
    }

    #[test]
    fn test_hints_and_right_text() {
        let text = rendered(
            StatusBar::new().hints([("q", "Quit")]).right("3 envs"),
            40,
        );
        assert!(text.starts_with(" [q] Quit"));
        assert!(text.trim_end().ends_with("3 envs"));
    }

    #[test]
    fn test_right_text_dropped_when_crowded() {
        let text = rendered(
            StatusBar::new()
                .hints([("Space", "Command palette")])
                .right("refreshing"),
            24,
        );
        assert!(!text.contains("refreshing"));
    }

    #[test]
    fn test_tree_hints_follow_selection() {
        let pod = NodeRef::Pod {
            env: "dev".to_string(),
            project: "shop".to_string(),
            pod: "shop-1".to_string(),
        };
        assert!(tree_hints(Some(&pod)).contains(&("L", "Logs")));
        assert!(tree_hints(None).contains(&("N", "Add env")));
    }
}
