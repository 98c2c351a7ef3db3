use std::io::{self, Stdout, Write, stdout};

use crossterm::{
    event::{self, Event as CrosstermEvent, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};

/// A wrapper around the terminal that handles setup and teardown
pub struct Tui {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    suspended: bool,
}

impl Tui {
    /// Create a new TUI instance, entering raw mode and alternate screen
    pub fn new() -> io::Result<Self> {
        enable_raw_mode()?;
        execute!(stdout(), EnterAlternateScreen)?;

        let backend = CrosstermBackend::new(stdout());
        let terminal = Terminal::new(backend)?;

        Ok(Self {
            terminal,
            suspended: false,
        })
    }

    /// Get a mutable reference to the terminal for drawing
    pub fn terminal(&mut self) -> &mut Terminal<CrosstermBackend<Stdout>> {
        &mut self.terminal
    }

    /// Hand the terminal back to the shell so a child process can use it
    pub fn suspend(&mut self) -> io::Result<()> {
        self.restore()?;
        self.suspended = true;
        Ok(())
    }

    /// Take the terminal back after [`Tui::suspend`]
    pub fn resume(&mut self) -> io::Result<()> {
        enable_raw_mode()?;
        execute!(self.terminal.backend_mut(), EnterAlternateScreen)?;
        self.terminal.clear()?;
        self.suspended = false;
        Ok(())
    }

    /// Print a line on the suspended terminal and block until a key is pressed
    pub fn wait_for_key(&mut self, banner: &str) -> io::Result<()> {
        let mut out = stdout();
        writeln!(out)?;
        writeln!(out, "{}", banner)?;
        out.flush()?;

        enable_raw_mode()?;
        let result = loop {
            match event::read() {
                Ok(CrosstermEvent::Key(key)) if key.kind == KeyEventKind::Press => break Ok(()),
                Ok(_) => continue,
                Err(e) => break Err(e),
            }
        };
        disable_raw_mode()?;
        result
    }

    /// Restore the terminal to its original state
    pub fn restore(&mut self) -> io::Result<()> {
        disable_raw_mode()?;
        execute!(self.terminal.backend_mut(), LeaveAlternateScreen)?;
        self.terminal.show_cursor()?;
        Ok(())
    }
}

impl Drop for Tui {
    fn drop(&mut self) {
        // Best effort cleanup on drop
        if !self.suspended {
            let _ = self.restore();
        }
    }
}
