//! Table rendering utilities for CLI outputs.
//!
//! Column widths are measured from the content (display width, not byte
//! length), so accented item names and colored cells line up.

use regex::Regex;
use std::sync::LazyLock;
use unicode_width::UnicodeWidthStr;

static ANSI_SEQ: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\x1B\[[0-9;]*[mK]").unwrap());

fn strip_ansi(s: &str) -> String {
    ANSI_SEQ.replace_all(s, "").into_owned()
}

/// Printable width of a cell, ignoring ANSI color codes.
pub fn display_width(s: &str) -> usize {
    UnicodeWidthStr::width(strip_ansi(s).as_str())
}

pub struct Column {
    pub header: String,
    /// Right-align (used for money columns).
    pub right: bool,
}

impl Column {
    pub fn new(header: impl Into<String>) -> Self {
        Self {
            header: header.into(),
            right: false,
        }
    }

    pub fn money(header: impl Into<String>) -> Self {
        Self {
            header: header.into(),
            right: true,
        }
    }
}

pub struct Table {
    pub columns: Vec<Column>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(columns: Vec<Column>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    pub fn add_row(&mut self, row: Vec<String>) {
        self.rows.push(row);
    }

    pub fn render(&self) -> String {
        // Widths: headers first, then every row.
        let mut widths: Vec<usize> = self
            .columns
            .iter()
            .map(|c| display_width(&c.header))
            .collect();
        for row in &self.rows {
            for (i, cell) in row.iter().enumerate().take(widths.len()) {
                widths[i] = widths[i].max(display_width(cell));
            }
        }

        let mut out = String::new();

        for (i, col) in self.columns.iter().enumerate() {
            out.push_str(&pad(&col.header, widths[i], col.right));
            out.push(' ');
        }
        out.push('\n');

        for row in &self.rows {
            for (i, col) in self.columns.iter().enumerate() {
                let cell = row.get(i).map(String::as_str).unwrap_or("");
                out.push_str(&pad(cell, widths[i], col.right));
                out.push(' ');
            }
            out.push('\n');
        }

        out
    }
}

/// Pad to `width` display columns. Color codes do not count.
fn pad(s: &str, width: usize, right: bool) -> String {
    let fill = width.saturating_sub(display_width(s));
    if right {
        format!("{}{}", " ".repeat(fill), s)
    } else {
        format!("{}{}", s, " ".repeat(fill))
    }
}
