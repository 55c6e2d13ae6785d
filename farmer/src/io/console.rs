//! Operator-facing console output.
//!
//! Distinct from `tracing` diagnostics: this is what the operator reads while
//! setup runs, and it is never filtered by `RUST_LOG`.

use std::io::{self, IsTerminal, Write};

use crate::core::style::{Style, paint};

/// Line-oriented writer that applies [`Style`]s and flushes after every write.
pub struct Console<W> {
    out: W,
    color: bool,
}

impl Console<io::Stdout> {
    /// Console on stdout, colored when stdout is a terminal and `NO_COLOR` is unset.
    pub fn stdout() -> Self {
        let out = io::stdout();
        let color = out.is_terminal() && color_allowed();
        Self { out, color }
    }
}

impl Console<io::Stderr> {
    pub fn stderr() -> Self {
        let out = io::stderr();
        let color = out.is_terminal() && color_allowed();
        Self { out, color }
    }
}

fn color_allowed() -> bool {
    std::env::var_os("NO_COLOR").is_none_or(|v| v.is_empty())
}

impl<W: Write> Console<W> {
    pub fn new(out: W, color: bool) -> Self {
        Self { out, color }
    }

    /// Write `text` followed by a newline.
    pub fn line(&mut self, style: Style, text: &str) -> io::Result<()> {
        let rendered = self.render(style, text);
        writeln!(self.out, "{rendered}")?;
        self.out.flush()
    }

    pub fn blank(&mut self) -> io::Result<()> {
        writeln!(self.out)?;
        self.out.flush()
    }

    /// Pass child output through verbatim.
    pub fn echo(&mut self, chunk: &str) -> io::Result<()> {
        self.out.write_all(chunk.as_bytes())?;
        self.out.flush()
    }

    pub fn get_ref(&self) -> &W {
        &self.out
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn render(&self, style: Style, text: &str) -> String {
        if self.color {
            // Escapes never span a newline.
            text.lines()
                .map(|line| paint(style, line))
                .collect::<Vec<_>>()
                .join("\n")
        } else {
            text.to_string()
        }
    }
}
