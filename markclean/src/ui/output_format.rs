// markclean/src/ui/output_format.rs
//! Coloured status lines for stderr.

use is_terminal::IsTerminal;
use owo_colors::OwoColorize;
use std::io::{self, Write};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Info,
    Success,
    Warn,
    Error,
}

impl MessageKind {
    fn label(self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Success => "ok",
            Self::Warn => "warning",
            Self::Error => "error",
        }
    }
}

/// Writes `[label] message`, colouring the label when `supports_color` is set.
pub fn print_message<W: Write>(writer: &mut W, kind: MessageKind, message: &str, supports_color: bool) -> io::Result<()> {
    let label = kind.label();
    if !supports_color {
        return writeln!(writer, "[{}] {}", label, message);
    }
    let styled = match kind {
        MessageKind::Info => label.cyan().to_string(),
        MessageKind::Success => label.green().to_string(),
        MessageKind::Warn => label.yellow().to_string(),
        MessageKind::Error => label.red().bold().to_string(),
    };
    writeln!(writer, "[{}] {}", styled, message)
}

pub fn print_info_message<W: Write>(writer: &mut W, message: &str, supports_color: bool) -> io::Result<()> {
    print_message(writer, MessageKind::Info, message, supports_color)
}

pub fn print_success_message<W: Write>(writer: &mut W, message: &str, supports_color: bool) -> io::Result<()> {
    print_message(writer, MessageKind::Success, message, supports_color)
}

pub fn print_warn_message<W: Write>(writer: &mut W, message: &str, supports_color: bool) -> io::Result<()> {
    print_message(writer, MessageKind::Warn, message, supports_color)
}

pub fn print_error_message<W: Write>(writer: &mut W, message: &str, supports_color: bool) -> io::Result<()> {
    print_message(writer, MessageKind::Error, message, supports_color)
}

/// Helper for printing to stderr with colour when stderr is a terminal.
pub fn stderr_msg(kind: MessageKind, message: impl AsRef<str>) {
    let supports_color = io::stderr().is_terminal() && std::env::var_os("NO_COLOR").is_none();
    let _ = print_message(&mut io::stderr(), kind, message.as_ref(), supports_color);
}
