use kdepanel_activity::ActivityLog;
use ratatui::{
    Frame,
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};

use crate::app::{AppState, Focus, MessageLevel};
use crate::ui::components::{
    Command, CommandPalette, CommandPaletteState, HelpOverlay, PromptPopup, StatusBar,
    activity_hints, tree_hints,
};
use crate::ui::{Layout, Theme};

use super::{ActivityPane, EnvironmentTreeView};

/// The single screen of the panel with its overlays
pub struct MainScreen;

impl MainScreen {
    pub fn render(
        frame: &mut Frame,
        state: &mut AppState,
        activity: &ActivityLog,
        palette: &mut CommandPaletteState,
        commands: &[Command],
        context: &str,
    ) {
        let areas = Layout::main(
            frame.area(),
            state.ui_state.activity_visible,
            state.ui_state.message.is_some(),
        );

        Self::render_header(frame, areas.header, state, context);
        EnvironmentTreeView::render(frame, areas.tree, state);
        if let Some(area) = areas.activity {
            ActivityPane::render(frame, area, state, activity);
        }
        if let Some(area) = areas.message {
            Self::render_message(frame, area, state);
        }
        Self::render_status_bar(frame, areas.status, state, activity);

        // Overlays
        if let Some(prompt) = &state.prompt {
            PromptPopup::render(frame, prompt);
        }
        if palette.visible {
            let scope = match state.ui_state.focus {
                Focus::Activity => "activity",
                Focus::Tree => state.selected_node().map_or("panel", |n| n.label()),
            };
            CommandPalette::render(frame, palette, commands, scope);
        }
        if state.ui_state.help_visible {
            HelpOverlay::render(frame);
        }
    }

    fn render_header(frame: &mut Frame, area: Rect, state: &AppState, context: &str) {
        let env_count = state.tree.environments().len();
        let mut spans = vec![
            Span::styled("kdepanel", Theme::title()),
            Span::styled(" │ ", Theme::text_dim()),
            Span::styled(context.to_string(), Theme::text()),
            Span::styled(" │ ", Theme::text_dim()),
            Span::styled(format!("{} environments", env_count), Theme::text()),
        ];
        if let Some(node) = state.selected_node() {
            spans.push(Span::styled(" │ ", Theme::text_dim()));
            spans.push(Span::styled(node.label().to_string(), Theme::text_highlight()));
        }

        let header = Paragraph::new(Line::from(spans)).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Theme::border()),
        );
        frame.render_widget(header, area);
    }

    fn render_message(frame: &mut Frame, area: Rect, state: &AppState) {
        let Some(message) = &state.ui_state.message else {
            return;
        };
        let (icon, style) = match message.level {
            MessageLevel::Error => ("✗", Theme::error()),
            MessageLevel::Info => ("✓", Theme::info()),
        };
        let line = Line::from(vec![
            Span::styled(format!(" {} {}", icon, message.text), style),
            Span::styled("  [Esc] Dismiss", Theme::text_dim()),
        ]);
        frame.render_widget(Paragraph::new(line), area);
    }

    fn render_status_bar(frame: &mut Frame, area: Rect, state: &AppState, activity: &ActivityLog) {
        let hints = match state.ui_state.focus {
            Focus::Tree => tree_hints(state.selected_node()),
            Focus::Activity => activity_hints(),
        };

        let right = match &state.ui_state.busy {
            Some(what) => format!("⟳ {}", what),
            None => {
                let counts = activity.counts();
                format!(
                    "cmds:{} err:{} lines:{} {}",
                    counts.commands,
                    counts.errors,
                    counts.total(),
                    if state.ui_state.follow { "▼" } else { " " }
                )
            }
        };

        frame.render_widget(StatusBar::new().hints(hints).right(right), area);
    }
}
