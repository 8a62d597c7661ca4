//! Crate-wide constants.

pub const APP_NAME: &str = "cadb";

/// Configuration file used when `--config-file` is not given.
pub const DEFAULT_CONFIG_PATH: &str = "config/core.conf";

/// Chunk size used when streaming files through the hasher.
pub const HASH_READ_BUFFER_SIZE: usize = 64 * 1024;

pub const DEFAULT_DIRECTIVE_MARKER: &str = "#";
pub const DEFAULT_INCLUDE_KEYWORD: &str = "include";
pub const DEFAULT_OBJECT_EXTENSION: &str = "o";

/// Base name of generated dependency graph files.
pub const GRAPH_NAME: &str = "deps_graph";

/// Directory (below the build directory) for graphs when none is configured.
pub const DEFAULT_GRAPHS_DIR: &str = "graphs";

/// Rows shown per ranking in the stats report.
pub const STATS_ROWS: usize = 10;
