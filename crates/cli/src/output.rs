//! CLI output formatting utilities.
//!
//! Colored status messages, human-readable sizes and durations, and plain
//! text tables for the report actions.

use std::time::Duration;

use anyhow::Context;
use owo_colors::{OwoColorize, Stream};

pub mod symbols {
  pub const SUCCESS: &str = "✓";
  pub const ERROR: &str = "✗";
  pub const WARNING: &str = "⚠";
  pub const INFO: &str = "•";
}

pub fn format_bytes(bytes: u64) -> String {
  const KB: u64 = 1024;
  const MB: u64 = KB * 1024;
  const GB: u64 = MB * 1024;

  if bytes >= GB {
    format!("{:.1} GB", bytes as f64 / GB as f64)
  } else if bytes >= MB {
    format!("{:.1} MB", bytes as f64 / MB as f64)
  } else if bytes >= KB {
    format!("{:.1} KB", bytes as f64 / KB as f64)
  } else {
    format!("{} B", bytes)
  }
}

pub fn format_duration(duration: Duration) -> String {
  let secs = duration.as_secs();
  let millis = duration.subsec_millis();

  if secs >= 60 {
    let mins = secs / 60;
    let remaining_secs = secs % 60;
    format!("{}m {}s", mins, remaining_secs)
  } else if secs > 0 {
    format!("{}.{:02}s", secs, millis / 10)
  } else {
    format!("{}ms", millis)
  }
}

pub fn print_success(message: &str) {
  println!(
    "{} {}",
    symbols::SUCCESS.if_supports_color(Stream::Stdout, |s| s.green()),
    message
  );
}

pub fn print_error(message: &str) {
  eprintln!(
    "{} {}",
    symbols::ERROR.if_supports_color(Stream::Stderr, |s| s.red()),
    message.if_supports_color(Stream::Stderr, |s| s.red())
  );
}

pub fn print_warning(message: &str) {
  eprintln!(
    "{} {}",
    symbols::WARNING.if_supports_color(Stream::Stderr, |s| s.yellow()),
    message.if_supports_color(Stream::Stderr, |s| s.yellow())
  );
}

pub fn print_info(message: &str) {
  println!(
    "{} {}",
    symbols::INFO.if_supports_color(Stream::Stdout, |s| s.blue()),
    message
  );
}

pub fn print_stat(label: &str, value: &str) {
  println!(
    "  {}: {}",
    label.if_supports_color(Stream::Stdout, |s| s.dimmed()),
    value
  );
}

pub fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
  let json = serde_json::to_string_pretty(value).context("Failed to serialize to JSON")?;
  println!("{}", json);
  Ok(())
}

/// Render rows as an ASCII table. Cells may span several lines.
pub fn render_table(headers: &[&str], rows: &[Vec<String>]) -> String {
  let columns = headers.len();
  let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
  for row in rows {
    for (i, cell) in row.iter().enumerate().take(columns) {
      let widest = cell.lines().map(|l| l.chars().count()).max().unwrap_or(0);
      widths[i] = widths[i].max(widest);
    }
  }

  let border = {
    let mut line = String::from("+");
    for width in &widths {
      line.push_str(&"-".repeat(width + 2));
      line.push('+');
    }
    line
  };

  let render_row = |cells: Vec<&str>| -> String {
    let split: Vec<Vec<&str>> = cells.iter().map(|c| c.lines().collect()).collect();
    let height = split.iter().map(Vec::len).max().unwrap_or(0).max(1);
    let mut out = String::new();
    for line in 0..height {
      out.push('|');
      for (i, width) in widths.iter().enumerate() {
        let text = split.get(i).and_then(|c| c.get(line)).copied().unwrap_or("");
        let pad = width - text.chars().count();
        out.push_str(&format!(" {}{} |", text, " ".repeat(pad)));
      }
      out.push('\n');
    }
    out
  };

  let mut table = String::new();
  table.push_str(&border);
  table.push('\n');
  table.push_str(&render_row(headers.to_vec()));
  table.push_str(&border);
  table.push('\n');
  for row in rows {
    table.push_str(&render_row(row.iter().map(String::as_str).collect()));
    table.push_str(&border);
    table.push('\n');
  }
  table
}

pub fn print_table(headers: &[&str], rows: &[Vec<String>]) {
  print!("{}", render_table(headers, rows));
}
