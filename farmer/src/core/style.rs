//! Stateless ANSI styling for console messages.

const RESET: &str = "\x1b[0m";

/// Presentation tag for a console line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Style {
    Plain,
    Header,
    Info,
    Notice,
    Success,
    Warning,
    Failure,
}

impl Style {
    /// ANSI escape prefix for this style (empty for `Plain`).
    pub fn ansi(self) -> &'static str {
        match self {
            Style::Plain => "",
            Style::Header => "\x1b[95m",
            Style::Info => "\x1b[94m",
            Style::Notice => "\x1b[96m",
            Style::Success => "\x1b[92m",
            Style::Warning => "\x1b[1m\x1b[93m",
            Style::Failure => "\x1b[91m",
        }
    }
}

/// Wrap `text` in the escape codes for `style`.
pub fn paint(style: Style, text: &str) -> String {
    match style {
        Style::Plain => text.to_string(),
        _ => format!("{}{text}{RESET}", style.ansi()),
    }
}

/// A horizontal rule of `width` `=` characters.
pub fn rule(width: usize) -> String {
    "=".repeat(width)
}
