use crate::currency::format_euro_cents;
use owo_colors::{OwoColorize, Style};
use std::sync::OnceLock;

static THEME: OnceLock<Theme> = OnceLock::new();

#[derive(Debug, Clone)]
pub struct Theme {
    pub header: Style,
    pub success: Style,
    pub info: Style,
    pub dim: Style,
    /// Euro amounts
    pub money: Style,
}

impl Theme {
    /// Colors on a terminal, plain text when piped
    pub fn detect() -> Self {
        if console::Term::stdout().is_term() && console::colors_enabled() {
            Self::colored()
        } else {
            Self::plain()
        }
    }

    pub fn colored() -> Self {
        Self {
            header: Style::new().cyan().bold(),
            success: Style::new().green().bold(),
            info: Style::new().magenta(),
            dim: Style::new().white().dimmed(),
            money: Style::new().green(),
        }
    }

    pub fn plain() -> Self {
        Self {
            header: Style::new(),
            success: Style::new(),
            info: Style::new(),
            dim: Style::new(),
            money: Style::new(),
        }
    }

    /// Euro cents rendered as `€12.34` in the money style
    pub fn euro(&self, cents: i64) -> String {
        format_euro_cents(cents).style(self.money.clone()).to_string()
    }
}

pub fn theme() -> &'static Theme {
    THEME.get_or_init(Theme::detect)
}
