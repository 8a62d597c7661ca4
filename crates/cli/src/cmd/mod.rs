mod build;
mod clean;
mod deps;
mod graph;
mod stats;

pub use build::cmd_build;
pub use clean::cmd_clean;
pub use deps::cmd_deps;
pub use graph::cmd_graph;
pub use stats::cmd_stats;
