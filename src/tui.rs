use ratatui::style::{Color, Modifier, Style};
use ratatui::DefaultTerminal;

use crate::error::Result;

pub const HEADER_STYLE: Style = Style::new()
    .fg(Color::Yellow)
    .add_modifier(Modifier::BOLD);

pub const FOOTER_STYLE: Style = Style::new().fg(Color::DarkGray);

pub const ERROR_STYLE: Style = Style::new().fg(Color::Red).add_modifier(Modifier::BOLD);

pub const SELECTED_STYLE: Style = Style::new()
    .bg(Color::Rgb(40, 40, 60))
    .add_modifier(Modifier::BOLD);

/// Run `app` inside a ratatui terminal. Installs a panic hook and always
/// restores the terminal on exit.
pub fn with_terminal<F>(app: F) -> Result<()>
where
    F: FnOnce(&mut DefaultTerminal) -> Result<()>,
{
    let hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        ratatui::restore();
        hook(info);
    }));

    let mut terminal = ratatui::init();
    let result = app(&mut terminal);
    ratatui::restore();
    result
}
