//! Action log sink.
//!
//! Every action reports its progress through a [`LogSink`] handed to it by the
//! caller instead of a process-wide logger. The CLI forwards entries to a
//! `tracing` dispatcher; tests collect them with [`MemorySink`].

use std::sync::Mutex;

use tracing::{Dispatch, Level};

/// The user-facing action an entry belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
  Build,
  Clean,
  Deps,
  Graph,
  Stats,
}

impl Action {
  pub fn as_str(&self) -> &'static str {
    match self {
      Action::Build => "build",
      Action::Clean => "clean",
      Action::Deps => "deps",
      Action::Graph => "graph",
      Action::Stats => "stats",
    }
  }
}

impl std::fmt::Display for Action {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(self.as_str())
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
  pub action: Action,
  pub level: Level,
  pub message: String,
}

/// Destination for action log entries.
pub trait LogSink: Send + Sync {
  fn record(&self, entry: LogEntry);

  fn error(&self, action: Action, message: String) {
    self.record(LogEntry {
      action,
      level: Level::ERROR,
      message,
    });
  }

  fn warn(&self, action: Action, message: String) {
    self.record(LogEntry {
      action,
      level: Level::WARN,
      message,
    });
  }

  fn info(&self, action: Action, message: String) {
    self.record(LogEntry {
      action,
      level: Level::INFO,
      message,
    });
  }

  fn debug(&self, action: Action, message: String) {
    self.record(LogEntry {
      action,
      level: Level::DEBUG,
      message,
    });
  }
}

/// Forwards entries as `tracing` events to an owned dispatcher.
///
/// Events carry the action name in an `action` field.
#[derive(Clone)]
pub struct TracingSink {
  dispatch: Dispatch,
}

impl TracingSink {
  pub fn new(dispatch: Dispatch) -> Self {
    Self { dispatch }
  }

  /// Sink bound to whatever dispatcher is current on this thread.
  pub fn current() -> Self {
    Self::new(tracing::dispatcher::get_default(Dispatch::clone))
  }
}

impl LogSink for TracingSink {
  fn record(&self, entry: LogEntry) {
    let action = entry.action.as_str();
    let message = entry.message.as_str();

    tracing::dispatcher::with_default(&self.dispatch, || {
      if entry.level == Level::ERROR {
        tracing::error!(action, "{}", message);
      } else if entry.level == Level::WARN {
        tracing::warn!(action, "{}", message);
      } else if entry.level == Level::INFO {
        tracing::info!(action, "{}", message);
      } else if entry.level == Level::DEBUG {
        tracing::debug!(action, "{}", message);
      } else {
        tracing::trace!(action, "{}", message);
      }
    });
  }
}

/// Keeps entries in memory, in the order they were recorded.
#[derive(Debug, Default)]
pub struct MemorySink {
  entries: Mutex<Vec<LogEntry>>,
}

impl MemorySink {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn entries(&self) -> Vec<LogEntry> {
    self.entries.lock().unwrap_or_else(|e| e.into_inner()).clone()
  }

  /// Messages recorded at `level`.
  pub fn messages(&self, level: Level) -> Vec<String> {
    self
      .entries()
      .into_iter()
      .filter(|entry| entry.level == level)
      .map(|entry| entry.message)
      .collect()
  }

  /// True when any recorded message contains `needle`.
  pub fn contains(&self, needle: &str) -> bool {
    self.entries().iter().any(|entry| entry.message.contains(needle))
  }
}

impl LogSink for MemorySink {
  fn record(&self, entry: LogEntry) {
    self.entries.lock().unwrap_or_else(|e| e.into_inner()).push(entry);
  }
}
