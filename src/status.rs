//! tmux status-line markup.
//!
//! Every applet prints a single line made of `#[bg=<colour>]` tokens wrapping
//! two literal spaces, which tmux renders as a solid coloured block, and a
//! trailing `#[default]` to restore formatting.

use std::io::{self, Write};

use log::error;

/// Two spaces: one rendered block.
pub const BLOCK: &str = "  ";

/// Resets all formatting.
pub const RESET: &str = "#[default]";

/// Printed instead of a status line on the documented failure paths.
pub const ERROR_MARKER: &str = "ER";

/// `#[bg=<color>]`
pub fn bg(color: &str) -> String {
    format!("#[bg={}]", color)
}

/// A status line under construction.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StatusLine {
    buf: String,
}

impl StatusLine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one coloured block.
    pub fn block(&mut self, color: &str) -> &mut Self {
        self.buf.push_str(&bg(color));
        self.buf.push_str(BLOCK);
        self
    }

    /// Append the reset token. Must be the last thing pushed.
    pub fn reset(&mut self) -> &mut Self {
        self.buf.push_str(RESET);
        self
    }

    pub fn as_str(&self) -> &str {
        &self.buf
    }

    /// Write the line, a newline, and flush.
    pub fn write_to<W: Write>(&self, out: &mut W) -> io::Result<()> {
        writeln!(out, "{}", self.buf)?;
        out.flush()
    }
}

/// Write `ER\n` and flush.
pub fn write_error_marker<W: Write>(out: &mut W) -> io::Result<()> {
    writeln!(out, "{}", ERROR_MARKER)?;
    out.flush()
}

/// Turn an applet result into a process exit code.
///
/// On error nothing has been written yet; `ER\n` goes out instead and the
/// exit code is 1.
pub fn report<W: Write>(result: anyhow::Result<()>, out: &mut W) -> i32 {
    match result {
        Ok(()) => 0,
        Err(e) => {
            error!("{:#}", e);
            if let Err(e) = write_error_marker(out) {
                error!("writing error marker: {}", e);
            }
            1
        }
    }
}

// ---------------------------------------------------------------------------
// parse_color: "red", "brightcyan", "colour196", "#ff0000", "default"
// ---------------------------------------------------------------------------

const NAMED_COLORS: &[&str] = &[
    "default",
    "terminal",
    "black",
    "red",
    "green",
    "yellow",
    "blue",
    "magenta",
    "cyan",
    "white",
    "brightblack",
    "brightred",
    "brightgreen",
    "brightyellow",
    "brightblue",
    "brightmagenta",
    "brightcyan",
    "brightwhite",
];

/// Validate a tmux colour and return it in canonical (lowercase) form.
pub fn parse_color(s: &str) -> Option<String> {
    let s = s.trim().to_lowercase();

    if let Some(hex) = s.strip_prefix('#') {
        if hex.len() == 6 && hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Some(s);
        }
        return None;
    }

    for prefix in ["colour", "color"] {
        if let Some(n) = s.strip_prefix(prefix) {
            return match n.parse::<u8>() {
                Ok(idx) => Some(format!("colour{}", idx)),
                Err(_) => None,
            };
        }
    }

    if NAMED_COLORS.contains(&s.as_str()) {
        Some(s)
    } else {
        None
    }
}
