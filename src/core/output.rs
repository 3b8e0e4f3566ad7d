//! Terminal output helpers for CLI surfaces.
//!
//! Status lines share one look: green check for success, yellow bang for
//! warnings, red cross on stderr for errors, two-space indent for details.

use crate::core::error::Result;
use crate::core::reconcile::ChangeKind;
use colored::{ColoredString, Colorize};
use serde::Serialize;

#[derive(clap::ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

pub fn print_success(msg: &str) {
    println!("{} {}", "✓".bright_green(), msg);
}

pub fn print_warning(msg: &str) {
    println!("{} {}", "!".bright_yellow(), msg);
}

pub fn print_info(msg: &str) {
    println!("  {}", msg);
}

pub fn print_error(msg: &str) {
    eprintln!("{} {}", "✗".bright_red(), msg);
}

/// Pretty JSON on stdout, for `--format json`.
pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub fn change_marker(kind: ChangeKind) -> ColoredString {
    match kind {
        ChangeKind::Added => "+".bright_green(),
        ChangeKind::Removed => "-".bright_red(),
        ChangeKind::Modified => "M".bright_yellow(),
    }
}

/// Collapse newlines/extra whitespace and bound length for terminal display.
pub fn compact_line(input: &str, max_chars: usize) -> String {
    let collapsed = input.split_whitespace().collect::<Vec<_>>().join(" ");
    let mut chars = collapsed.chars();
    let preview: String = chars.by_ref().take(max_chars).collect();
    if chars.next().is_some() {
        let kept: String = preview
            .chars()
            .take(max_chars.saturating_sub(3))
            .collect();
        format!("{}...", kept)
    } else {
        preview
    }
}

pub fn plural(count: usize, singular: &str, plural: &str) -> String {
    if count == 1 {
        format!("{} {}", count, singular)
    } else {
        format!("{} {}", count, plural)
    }
}

/// Left-aligned columns separated by two spaces, with a dashed rule under
/// the header.
pub fn render_table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            if let Some(w) = widths.get_mut(i) {
                *w = (*w).max(cell.chars().count());
            }
        }
    }

    let line = |cells: Vec<String>| -> String {
        cells
            .iter()
            .enumerate()
            .map(|(i, c)| {
                let width = widths.get(i).copied().unwrap_or(0);
                format!("{:<width$}", c, width = width)
            })
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    let mut out = Vec::with_capacity(rows.len() + 2);
    out.push(line(headers.iter().map(|h| h.to_string()).collect()));
    out.push(line(headers.iter().map(|h| "-".repeat(h.chars().count())).collect()));
    for row in rows {
        out.push(line(row.clone()));
    }
    out.join("\n")
}
