use ratatui::{
    Frame,
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph},
};

use crate::app::{AppState, Focus, NodeRef, TreeRow};
use crate::ui::Theme;

/// Environment → project → pod tree
pub struct EnvironmentTreeView;

impl EnvironmentTreeView {
    pub fn render(frame: &mut Frame, area: Rect, state: &mut AppState) {
        let focused = state.ui_state.focus == Focus::Tree;
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(if focused {
                Theme::border_focused()
            } else {
                Theme::border()
            })
            .title(Span::styled(" Environments ", Theme::title()));

        if state.rows.is_empty() {
            let text = if state.ui_state.busy.is_some() {
                "Loading..."
            } else {
                "No environments. Press N to add one."
            };
            let empty = Paragraph::new(Span::styled(text, Theme::text_dim())).block(block);
            frame.render_widget(empty, area);
            return;
        }

        let items: Vec<ListItem> = state
            .rows
            .iter()
            .map(|row| ListItem::new(row_line(row)))
            .collect();

        let list = List::new(items)
            .block(block)
            .highlight_style(if focused {
                Theme::list_item_selected()
            } else {
                Theme::text_highlight()
            });

        frame.render_stateful_widget(list, area, &mut state.ui_state.list_state);
    }
}

/// One tree row: indentation, expand marker, status icon, name
pub fn row_line(row: &TreeRow) -> Line<'static> {
    let mut spans = vec![Span::raw("  ".repeat(row.depth))];

    let marker = match (row.expandable, row.expanded) {
        (true, true) => "▾ ",
        (true, false) => "▸ ",
        (false, _) => "  ",
    };
    spans.push(Span::styled(marker, Theme::text_dim()));

    if let Some(status) = &row.status {
        spans.push(Span::styled(
            format!("{} ", status.symbol()),
            Style::default().fg(status.color()),
        ));
    }

    let label_style = match row.node {
        NodeRef::Environment(_) => Theme::text_highlight(),
        NodeRef::Project { .. } => Theme::text(),
        NodeRef::Pod { .. } => Theme::text_dim(),
    };
    spans.push(Span::styled(row.node.label().to_string(), label_style));

    if let Some(status) = &row.status {
        spans.push(Span::styled(format!("  {}", status.as_str()), Theme::text_dim()));
    }

    Line::from(spans)
}

#[cfg(test)]
mod tests {
    use super::*;
    use kdepanel_types::EnvStatus;

    fn text(line: &Line) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    #[test]
    fn test_environment_row() {
        let row = TreeRow {
            depth: 0,
            node: NodeRef::Environment("dev".to_string()),
            expandable: true,
            expanded: false,
            status: Some(EnvStatus::Running),
        };
        let line = row_line(&row);
        assert_eq!(text(&line), "▸ ● dev  RUNNING");
        assert_eq!(line.spans[2].style.fg, Some(EnvStatus::Running.color()));
    }

    #[test]
    fn test_pod_row_is_indented_without_marker() {
        let row = TreeRow {
            depth: 2,
            node: NodeRef::Pod {
                env: "dev".to_string(),
                project: "shop".to_string(),
                pod: "shop-7d9f".to_string(),
            },
            expandable: false,
            expanded: false,
            status: None,
        };
        assert_eq!(text(&row_line(&row)), "      shop-7d9f");
    }

    #[test]
    fn test_expanded_project_marker() {
        let row = TreeRow {
            depth: 1,
            node: NodeRef::Project {
                env: "dev".to_string(),
                project: "shop".to_string(),
            },
            expandable: true,
            expanded: true,
            status: None,
        };
        assert_eq!(text(&row_line(&row)), "  ▾ shop");
    }
}
