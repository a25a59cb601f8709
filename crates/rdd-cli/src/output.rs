use colored::Colorize;
use serde::Serialize;
use std::io::IsTerminal;

const BANNER_WIDTH: usize = 60;

/// User-facing status lines. Diagnostics go through `tracing` instead.
#[derive(Debug, Clone, Copy)]
pub struct Output;

impl Output {
    /// Colors on or off explicitly. Also sets the process-wide override used
    /// by `colored` so ad-hoc `.green()` calls agree.
    pub fn new(color: bool) -> Self {
        colored::control::set_override(color);
        Self
    }

    /// Colors unless `--no-color`, `NO_COLOR`, or stdout is not a terminal.
    pub fn detect(no_color: bool) -> Self {
        let color =
            !no_color && std::env::var_os("NO_COLOR").is_none() && std::io::stdout().is_terminal();
        Self::new(color)
    }

    pub fn success(&self, msg: impl AsRef<str>) {
        println!("{}", format!("✓ {}", msg.as_ref()).green());
    }

    pub fn error(&self, msg: impl AsRef<str>) {
        eprintln!("{}", format!("✗ {}", msg.as_ref()).red());
    }

    pub fn warning(&self, msg: impl AsRef<str>) {
        println!("{}", format!("⚠ {}", msg.as_ref()).yellow());
    }

    pub fn info(&self, msg: impl AsRef<str>) {
        println!("{}", format!("ℹ {}", msg.as_ref()).blue());
    }

    pub fn step(&self, msg: impl AsRef<str>) {
        println!("{} {}", "▶".cyan(), msg.as_ref());
    }

    pub fn line(&self, msg: impl AsRef<str>) {
        println!("{}", msg.as_ref());
    }

    pub fn blank(&self) {
        println!();
    }

    pub fn banner(&self, title: &str, subtitle: Option<&str>) {
        println!();
        for line in banner_lines(title, subtitle) {
            println!("{}", line.cyan().bold());
        }
        println!();
    }

    /// Heavy rule used around comparison reports.
    pub fn rule(&self) {
        println!("{}", "━".repeat(50));
    }
}

fn banner_lines(title: &str, subtitle: Option<&str>) -> Vec<String> {
    let inner = BANNER_WIDTH - 2;
    let centered = |text: &str| {
        let len = text.chars().count().min(inner);
        let left = (inner - len) / 2;
        let right = inner - len - left;
        format!("║{}{}{}║", " ".repeat(left), text, " ".repeat(right))
    };
    let mut lines = vec![format!("╔{}╗", "═".repeat(inner)), centered(title)];
    if let Some(sub) = subtitle.filter(|s| !s.is_empty()) {
        lines.push(centered(sub));
    }
    lines.push(format!("╚{}╝", "═".repeat(inner)));
    lines
}

pub fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    println!("{}", json);
    Ok(())
}

pub fn print_table(headers: &[&str], rows: Vec<Vec<String>>) {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.len()).collect();
    for row in &rows {
        for (i, cell) in row.iter().enumerate() {
            if i < widths.len() {
                widths[i] = widths[i].max(cell.chars().count());
            }
        }
    }

    let header_row: Vec<String> = headers
        .iter()
        .enumerate()
        .map(|(i, h)| format!("{:width$}", h, width = widths[i]))
        .collect();
    println!("{}", header_row.join("  ").trim_end());

    let sep: Vec<String> = widths.iter().map(|&w| "-".repeat(w)).collect();
    println!("{}", sep.join("  "));

    for row in &rows {
        let cells: Vec<String> = row
            .iter()
            .enumerate()
            .map(|(i, cell)| {
                let w = widths.get(i).copied().unwrap_or(0);
                format!("{:width$}", cell, width = w)
            })
            .collect();
        println!("{}", cells.join("  ").trim_end());
    }
}
