use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout as RatatuiLayout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph},
};

use crate::app::{Prompt, PromptInput};
use crate::ui::{Layout, Theme};

/// Popup for the open prompt: a text box or a picker
pub struct PromptPopup;

impl PromptPopup {
    pub fn render(frame: &mut Frame, prompt: &Prompt) {
        let height = match &prompt.input {
            PromptInput::Text { .. } => 6,
            PromptInput::Pick { options, .. } => options.len().clamp(1, 10) as u16 + 5,
        };
        let popup_area = Layout::centered(64, height, frame.area());

        frame.render_widget(Clear, popup_area);

        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Yellow))
            .title(Span::styled(
                format!(" {} ", prompt.title),
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            ));
        let inner = block.inner(popup_area);
        frame.render_widget(block, popup_area);

        let chunks = RatatuiLayout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(1),    // Input
                Constraint::Length(1), // Error
                Constraint::Length(1), // Hints
            ])
            .split(inner);

        match &prompt.input {
            PromptInput::Text { value, placeholder } => {
                let line = if value.is_empty() {
                    Line::from(vec![
                        Span::styled("█", Style::default().fg(Color::Yellow)),
                        Span::styled(placeholder.as_str(), Theme::text_dim()),
                    ])
                } else {
                    Line::from(vec![
                        Span::styled(value.as_str(), Theme::text()),
                        Span::styled("█", Style::default().fg(Color::Yellow)),
                    ])
                };
                frame.render_widget(Paragraph::new(line), chunks[0]);
            }
            PromptInput::Pick { options, selected } => {
                if options.is_empty() {
                    frame.render_widget(
                        Paragraph::new(Span::styled("Nothing to choose from", Theme::text_dim())),
                        chunks[0],
                    );
                } else {
                    let items: Vec<ListItem> = options
                        .iter()
                        .map(|o| ListItem::new(o.as_str()).style(Theme::list_item()))
                        .collect();
                    let list = List::new(items)
                        .highlight_style(Theme::list_item_selected())
                        .highlight_symbol("▸ ");
                    let mut list_state = ListState::default();
                    list_state.select(Some(*selected));
                    frame.render_stateful_widget(list, chunks[0], &mut list_state);
                }
            }
        }

        if let Some(err) = &prompt.error {
            frame.render_widget(
                Paragraph::new(Span::styled(format!("⚠ {}", err), Theme::error())),
                chunks[1],
            );
        }

        let hints = match &prompt.input {
            PromptInput::Text { .. } => "[Enter] Confirm  [Ctrl+u] Clear  [Esc] Cancel",
            PromptInput::Pick { .. } => "[↑/↓] Choose  [Enter] Confirm  [Esc] Cancel",
        };
        frame.render_widget(
            Paragraph::new(Span::styled(hints, Theme::text_dim())),
            chunks[2],
        );
    }
}
