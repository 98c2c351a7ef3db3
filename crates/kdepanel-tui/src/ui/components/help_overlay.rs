use ratatui::{
    Frame,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
};

use crate::ui::Layout;

/// Help overlay showing keybindings
pub struct HelpOverlay;

impl HelpOverlay {
    pub fn render(frame: &mut Frame) {
        let popup_area = Layout::centered(56, 44, frame.area());

        // Clear the background
        frame.render_widget(Clear, popup_area);

        let help_text = vec![
            Line::from(Span::styled(
                "Keybindings",
                Style::default().add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
            Self::section("Tree"),
            Self::key_line("j/k", "Move down / up"),
            Self::key_line("l/h", "Expand / collapse"),
            Self::key_line("Enter", "Toggle node"),
            Self::key_line("r", "Refresh everything"),
            Line::from(""),
            Self::section("Environment"),
            Self::key_line("N", "Add environment"),
            Self::key_line("c", "(Re)create environment"),
            Self::key_line("s", "Stop environment"),
            Self::key_line("K", "Open k9s"),
            Self::key_line("H", "Open Headlamp"),
            Self::key_line("F", "Port forward"),
            Self::key_line("n", "Create project"),
            Line::from(""),
            Self::section("Project"),
            Self::key_line("d/u/D", "Deploy / undeploy / redeploy"),
            Self::key_line("e/E", "Exec develop / deploy env"),
            Self::key_line("t", "Telepresence replace"),
            Line::from(""),
            Self::section("Pod"),
            Self::key_line("L", "Tail logs"),
            Self::key_line("f", "Port forward"),
            Self::key_line("x", "Exec"),
            Line::from(""),
            Self::section("Activity"),
            Self::key_line("Tab", "Switch focus"),
            Self::key_line("o", "Show / hide pane"),
            Self::key_line("/", "Search/filter"),
            Self::key_line("n", "Clear filter"),
            Self::key_line("C", "Commands and errors only"),
            Self::key_line("f", "Toggle follow mode"),
            Self::key_line("c", "Clear"),
            Self::key_line("e", "Export to file"),
            Line::from(""),
            Self::section("General"),
            Self::key_line("Space", "Command palette"),
            Self::key_line("?", "Toggle this help"),
            Self::key_line("Esc", "Close / dismiss"),
            Self::key_line("q", "Quit"),
        ];

        let help_widget = Paragraph::new(help_text).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan))
                .title(Span::styled(
                    " Help ",
                    Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
                )),
        );

        frame.render_widget(help_widget, popup_area);
    }

    fn section(title: &str) -> Line<'_> {
        Line::from(Span::styled(title, Style::default().fg(Color::Yellow)))
    }

    fn key_line<'a>(key: &'a str, desc: &'a str) -> Line<'a> {
        Line::from(vec![
            Span::styled(format!("  {:>8}", key), Style::default().fg(Color::Green)),
            Span::styled(format!("  {}", desc), Style::default().fg(Color::White)),
        ])
    }
}
