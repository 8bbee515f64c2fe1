//! Application state and event loop for the protocol viewer.
//!
//! [`App`] owns the theme, the sheets of one protocol and the selected class
//! tab.

use std::io;
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Frame, Terminal};
use tracing::debug;

use crate::sheet::ProtocolSheet;
use crate::table_view;
use crate::themes::Theme;

/// Root state of the protocol viewer.
pub struct App {
    pub theme: Theme,
    /// Title shown in the terminal window (the export name).
    pub title: String,
    pub sheets: Vec<ProtocolSheet>,
    /// Index into `sheets` of the visible class.
    pub selected: usize,
    /// Set to `true` to break out of the event loop on the next iteration.
    pub should_quit: bool,
}

impl App {
    pub fn new(theme_name: &str, title: String, sheets: Vec<ProtocolSheet>) -> Self {
        Self {
            theme: Theme::from_name(theme_name),
            title,
            sheets,
            selected: 0,
            should_quit: false,
        }
    }

    pub fn next_sheet(&mut self) {
        if !self.sheets.is_empty() {
            self.selected = (self.selected + 1) % self.sheets.len();
        }
    }

    pub fn previous_sheet(&mut self) {
        if !self.sheets.is_empty() {
            self.selected = (self.selected + self.sheets.len() - 1) % self.sheets.len();
        }
    }

    /// Apply one key press.
    ///
    /// Tab, Right and `l` move to the next class; BackTab, Left and `h` to the
    /// previous one. `q`, `Q`, Esc and Ctrl+C quit.
    pub fn handle_key(&mut self, key: KeyEvent) {
        if key.kind == KeyEventKind::Release {
            return;
        }
        match key.code {
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.should_quit = true;
            }
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => self.should_quit = true,
            KeyCode::Tab | KeyCode::Right | KeyCode::Char('l') => self.next_sheet(),
            KeyCode::BackTab | KeyCode::Left | KeyCode::Char('h') => self.previous_sheet(),
            _ => {}
        }
    }

    /// Run the viewer until the user quits.
    ///
    /// Blocks the calling thread. Uses `crossterm::event::poll` with a 250 ms
    /// timeout so the terminal is redrawn after resizes even without key
    /// presses. In raw mode Ctrl+C arrives as a key event, not a signal.
    pub fn run(mut self) -> io::Result<()> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, crossterm::terminal::SetTitle(&self.title))?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        debug!("Viewer started with {} sheets", self.sheets.len());
        let tick_rate = Duration::from_millis(250);

        let result = loop {
            if let Err(e) = terminal.draw(|frame| self.render(frame)) {
                break Err(e);
            }

            match event::poll(tick_rate) {
                Ok(true) => match event::read() {
                    Ok(Event::Key(key)) => self.handle_key(key),
                    Ok(_) => {}
                    Err(e) => break Err(e),
                },
                Ok(false) => {}
                Err(e) => break Err(e),
            }

            if self.should_quit {
                break Ok(());
            }
        };

        // Restore terminal state unconditionally.
        disable_raw_mode()?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
        terminal.show_cursor()?;

        result
    }

    fn render(&self, frame: &mut Frame) {
        table_view::render_protocol(frame, &self.sheets, self.selected, &self.theme);
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
