use ratatui::style::{Color, Modifier, Style};

/// Terminal background type detection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BackgroundType {
    Dark,
    Light,
}

/// Detect terminal background type from the `COLORFGBG` environment variable.
///
/// The variable has the format `"foreground;background"`. Background values
/// 0–6 are dark, 7–15 light. Without a usable value the background is assumed
/// dark.
pub fn detect_background() -> BackgroundType {
    if let Ok(val) = std::env::var("COLORFGBG") {
        if let Some(bg) = val.split(';').next_back() {
            if let Ok(bg_num) = bg.parse::<u8>() {
                return if bg_num <= 6 {
                    BackgroundType::Dark
                } else {
                    BackgroundType::Light
                };
            }
        }
    }
    BackgroundType::Dark
}

/// Styles used by the protocol viewer.
#[derive(Debug, Clone)]
pub struct Theme {
    // ── Chrome ───────────────────────────────────────────────────────────────
    pub title: Style,
    pub tab: Style,
    pub tab_selected: Style,
    pub border: Style,
    pub footer: Style,

    // ── Text ─────────────────────────────────────────────────────────────────
    pub text: Style,
    pub warning: Style,

    // ── Table ────────────────────────────────────────────────────────────────
    pub table_header: Style,
    pub table_row: Style,
    pub table_row_alt: Style,
    /// Top three places.
    pub podium: Style,
    /// Session best and total columns.
    pub highlight_column: Style,
}

impl Theme {
    /// Dark-background terminal theme (default).
    pub fn dark() -> Self {
        Self {
            title: Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
            tab: Style::default().fg(Color::Gray),
            tab_selected: Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
            border: Style::default().fg(Color::DarkGray),
            footer: Style::default().fg(Color::DarkGray),

            text: Style::default().fg(Color::White),
            warning: Style::default().fg(Color::Yellow),

            table_header: Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
            table_row: Style::default().fg(Color::White),
            table_row_alt: Style::default().fg(Color::Gray),
            podium: Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
            highlight_column: Style::default().fg(Color::Green),
        }
    }

    /// Light-background terminal theme.
    pub fn light() -> Self {
        Self {
            title: Style::default()
                .fg(Color::Blue)
                .add_modifier(Modifier::BOLD),
            tab: Style::default().fg(Color::DarkGray),
            tab_selected: Style::default()
                .fg(Color::Magenta)
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
            border: Style::default().fg(Color::Gray),
            footer: Style::default().fg(Color::Gray),

            text: Style::default().fg(Color::Black),
            warning: Style::default().fg(Color::Red),

            table_header: Style::default()
                .fg(Color::Blue)
                .add_modifier(Modifier::BOLD),
            table_row: Style::default().fg(Color::Black),
            table_row_alt: Style::default().fg(Color::DarkGray),
            podium: Style::default()
                .fg(Color::Magenta)
                .add_modifier(Modifier::BOLD),
            highlight_column: Style::default().fg(Color::Blue),
        }
    }

    /// Plain theme without colours, for terminals that render them badly.
    pub fn classic() -> Self {
        let plain = Style::default();
        Self {
            title: plain.add_modifier(Modifier::BOLD),
            tab: plain,
            tab_selected: plain.add_modifier(Modifier::REVERSED),
            border: plain,
            footer: plain,
            text: plain,
            warning: plain.add_modifier(Modifier::BOLD),
            table_header: plain.add_modifier(Modifier::BOLD),
            table_row: plain,
            table_row_alt: plain,
            podium: plain.add_modifier(Modifier::BOLD),
            highlight_column: plain,
        }
    }

    /// Choose a theme automatically based on the detected terminal background.
    pub fn auto_detect() -> Self {
        match detect_background() {
            BackgroundType::Light => Self::light(),
            BackgroundType::Dark => Self::dark(),
        }
    }

    /// Construct a theme by name. Unknown names fall back to `auto_detect`.
    pub fn from_name(name: &str) -> Self {
        match name {
            "light" => Self::light(),
            "dark" => Self::dark(),
            "classic" => Self::classic(),
            _ => Self::auto_detect(),
        }
    }

    /// Row style for a 0-based position.
    pub fn row_style(&self, position: usize) -> Style {
        if position < 3 {
            self.podium
        } else if position % 2 == 0 {
            self.table_row
        } else {
            self.table_row_alt
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_name_known_themes() {
        assert_eq!(Theme::from_name("dark").text, Theme::dark().text);
        assert_eq!(Theme::from_name("light").text, Theme::light().text);
        assert_eq!(Theme::from_name("classic").text, Style::default());
    }

    #[test]
    fn test_row_style_podium_then_alternating() {
        let theme = Theme::dark();
        assert_eq!(theme.row_style(0), theme.podium);
        assert_eq!(theme.row_style(2), theme.podium);
        assert_eq!(theme.row_style(3), theme.table_row_alt);
        assert_eq!(theme.row_style(4), theme.table_row);
    }

    #[test]
    fn test_auto_detect_matches_background() {
        // Environment dependent; compare against whatever is detected.
        let expected = match detect_background() {
            BackgroundType::Light => Theme::light(),
            BackgroundType::Dark => Theme::dark(),
        };
        assert_eq!(Theme::auto_detect().text, expected.text);
    }
}
