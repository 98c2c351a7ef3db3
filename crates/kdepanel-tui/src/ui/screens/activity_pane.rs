use kdepanel_activity::{ActivityEntry, ActivityFilter, ActivityLog};
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout as RatatuiLayout, Margin, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState},
};

use crate::app::{AppState, Focus};
use crate::ui::Theme;

/// Commands run by the panel and what they printed
pub struct ActivityPane;

impl ActivityPane {
    pub fn render(frame: &mut Frame, area: Rect, state: &mut AppState, activity: &ActivityLog) {
        let show_filter_bar = state.ui_state.search_active
            || state.ui_state.active_filter.is_some()
            || state.ui_state.filter_error.is_some();

        if show_filter_bar {
            let chunks = RatatuiLayout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Length(3), Constraint::Min(1)])
                .split(area);
            Self::render_filter_bar(frame, chunks[0], state);
            Self::render_lines(frame, chunks[1], state, activity);
        } else {
            Self::render_lines(frame, area, state, activity);
        }
    }

    fn render_filter_bar(frame: &mut Frame, area: Rect, state: &AppState) {
        let mut spans = vec![];

        // Prompt
        if state.ui_state.search_active {
            spans.push(Span::styled(
                " /",
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            ));
        } else {
            spans.push(Span::styled(" Filter: ", Theme::text_dim()));
        }

        // Input or current filter pattern
        let pattern = match (&state.ui_state.active_filter, state.ui_state.search_active) {
            (_, true) => state.ui_state.search_input.as_str(),
            (Some(filter), false) if filter.pattern().is_empty() => "commands and errors",
            (Some(filter), false) => filter.pattern(),
            (None, false) => "",
        };
        spans.push(Span::styled(pattern.to_string(), Theme::text_highlight()));

        // Cursor when active
        if state.ui_state.search_active {
            spans.push(Span::styled(
                "█",
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::SLOW_BLINK),
            ));
        }

        // Error message
        if let Some(err) = &state.ui_state.filter_error {
            spans.push(Span::styled(" ", Theme::text()));
            spans.push(Span::styled(format!("⚠ {}", err), Style::default().fg(Color::Red)));
        }

        // Case sensitivity indicator
        if state.ui_state.active_filter.is_some() || state.ui_state.search_active {
            spans.push(Span::styled("  ", Theme::text()));
            let case_insensitive = match (&state.ui_state.active_filter, state.ui_state.search_active) {
                (Some(filter), false) => filter.is_case_insensitive(),
                _ => state.ui_state.filter_case_insensitive,
            };
            let case_text = if case_insensitive {
                "[i] case-insensitive"
            } else {
                "[I] case-sensitive"
            };
            spans.push(Span::styled(case_text, Theme::text_dim()));
        }

        // Hints
        if state.ui_state.search_active {
            spans.push(Span::styled("  [Enter] Apply  [Esc] Cancel", Theme::text_dim()));
        } else if state.ui_state.active_filter.is_some() {
            spans.push(Span::styled("  [n] Clear  [/] Edit", Theme::text_dim()));
        }

        let filter_bar = Paragraph::new(Line::from(spans)).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(if state.ui_state.search_active {
                    Style::default().fg(Color::Yellow)
                } else if state.ui_state.filter_error.is_some() {
                    Style::default().fg(Color::Red)
                } else {
                    Theme::border()
                })
                .title(Span::styled(" Search/Filter ", Theme::title())),
        );

        frame.render_widget(filter_bar, area);
    }

    fn render_lines(frame: &mut Frame, area: Rect, state: &mut AppState, activity: &ActivityLog) {
        let filter = state.ui_state.active_filter.as_ref();
        let entries = match filter {
            Some(filter) => activity.filtered(|e| filter.matches(e)),
            None => activity.all(),
        };
        let total = entries.len();

        // Calculate visible area (accounting for border)
        let inner_height = area.height.saturating_sub(2) as usize;
        let max_scroll = total.saturating_sub(inner_height);

        // Follow mode pins the view to the newest line
        if state.ui_state.follow {
            state.ui_state.activity_scroll = max_scroll;
        }
        if state.ui_state.activity_scroll > max_scroll {
            state.ui_state.activity_scroll = max_scroll;
        }

        let lines: Vec<Line> = entries
            .iter()
            .skip(state.ui_state.activity_scroll)
            .take(inner_height)
            .map(|entry| entry_line(entry, filter))
            .collect();

        let title = if filter.is_some() {
            format!(" Activity ({} matching) ", total)
        } else {
            format!(" Activity ({}) ", total)
        };

        let widget = Paragraph::new(lines).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(if state.ui_state.focus == Focus::Activity {
                    Theme::border_focused()
                } else {
                    Theme::border()
                })
                .title(Span::styled(title, Theme::title())),
        );
        frame.render_widget(widget, area);

        if total > inner_height {
            let scrollbar = Scrollbar::new(ScrollbarOrientation::VerticalRight)
                .begin_symbol(Some("▲"))
                .end_symbol(Some("▼"));
            let mut scrollbar_state = ScrollbarState::default()
                .content_length(max_scroll)
                .position(state.ui_state.activity_scroll);

            frame.render_stateful_widget(
                scrollbar,
                area.inner(Margin {
                    vertical: 1,
                    horizontal: 0,
                }),
                &mut scrollbar_state,
            );
        }
    }
}

/// Timestamp, kind prefix and text, with filter matches highlighted
pub fn entry_line(entry: &ActivityEntry, filter: Option<&ActivityFilter>) -> Line<'static> {
    let base_style = Theme::activity(entry.kind);
    let mut spans = vec![
        Span::styled(entry.timestamp.format("%H:%M:%S ").to_string(), Theme::text_dim()),
        Span::styled(entry.kind.prefix(), base_style),
    ];

    let text = entry.text.as_str();
    let matches = filter.map(|f| f.find_matches(text)).unwrap_or_default();

    let mut last_end = 0;
    for (start, end) in matches {
        if start > last_end {
            spans.push(Span::styled(text[last_end..start].to_string(), base_style));
        }
        spans.push(Span::styled(text[start..end].to_string(), Theme::match_highlight()));
        last_end = end;
    }
    if last_end < text.len() || text.is_empty() {
        spans.push(Span::styled(text[last_end..].to_string(), base_style));
    }

    Line::from(spans)
}

#[cfg(test)]
mod tests {
    use super::*;
    use kdepanel_activity::ActivityKind;

    fn text(line: &Line) -> String {
        line.spans.iter().skip(1).map(|s| s.content.as_ref()).collect()
    }

    #[test]
    fn test_entry_line_prefix() {
        let entry = ActivityEntry::new(ActivityKind::Command, "kde ls");
        let line = entry_line(&entry, None);
        assert_eq!(text(&line), "$ kde ls");
        assert_eq!(line.spans.len(), 3);
    }

    #[test]
    fn test_entry_line_highlights_matches() {
        let entry = ActivityEntry::new(ActivityKind::Output, "dev staging dev");
        let filter = ActivityFilter::new("dev").unwrap();
        let line = entry_line(&entry, Some(&filter));

        assert_eq!(text(&line), "dev staging dev");
        let highlighted: Vec<_> = line
            .spans
            .iter()
            .filter(|s| s.style == Theme::match_highlight())
            .map(|s| s.content.as_ref())
            .collect();
        assert_eq!(highlighted, vec!["dev", "dev"]);
    }
}
