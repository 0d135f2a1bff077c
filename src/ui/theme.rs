use owo_colors::Style;
use std::sync::OnceLock;

static THEME: OnceLock<Theme> = OnceLock::new();

/// Styles of the terminal report; every style is plain when output is piped.
#[derive(Debug, Clone)]
pub struct Theme {
    pub header: Style,
    pub success: Style,
    pub error: Style,
    pub warn: Style,
    pub info: Style,
    pub dim: Style,
    pub value: Style,
}

impl Theme {
    pub fn new(colored: bool) -> Self {
        let pick = |style: Style| if colored { style } else { Style::new() };
        Self {
            header: pick(Style::new().cyan().bold()),
            success: pick(Style::new().green().bold()),
            error: pick(Style::new().red().bold()),
            warn: pick(Style::new().yellow().bold()),
            info: pick(Style::new().magenta()),
            dim: pick(Style::new().dimmed()),
            value: pick(Style::new().bold()),
        }
    }
}

pub fn theme() -> &'static Theme {
    THEME.get_or_init(|| Theme::new(console::Term::stdout().is_term()))
}
