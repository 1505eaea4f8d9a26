//! Coloured terminal output

use owo_colors::{OwoColorize, Style};

fn styled(text: &str, style: Style) -> String {
    if supports_color::on(supports_color::Stream::Stdout).is_some() {
        text.style(style).to_string()
    } else {
        text.to_string()
    }
}

/// Extension trait for colorizing output.
///
/// Colour is dropped when stdout is not a colour terminal.
pub trait Colorize: AsRef<str> {
    /// Green.
    fn success(&self) -> String {
        styled(self.as_ref(), Style::new().green())
    }

    /// Yellow.
    fn warning(&self) -> String {
        styled(self.as_ref(), Style::new().yellow())
    }

    /// Dimmed.
    fn dim(&self) -> String {
        styled(self.as_ref(), Style::new().dimmed())
    }
}

impl Colorize for str {}

impl Colorize for String {}
