//! Implementation of the `cadb stats` action.
//!
//! Ignores `--source-file`; statistics always cover the whole source set.

use anyhow::Result;

use cadb_lib::config::BuildConfig;
use cadb_lib::consts::STATS_ROWS;
use cadb_lib::report::{Extremes, RankedEntry, SourceStats};
use cadb_lib::source::SourceSet;

use crate::output::{format_bytes, print_json, print_table};

pub fn cmd_stats(config: &BuildConfig, sources: &SourceSet, json: bool) -> Result<()> {
  let stats = SourceStats::collect(sources, &config.paths.sources, STATS_ROWS);

  if json {
    return print_json(&stats);
  }

  let bytes = format_bytes;
  let count = |value: u64| value.to_string();

  print_extremes(
    ["Largest Header File", "Size", "Smallest Header File", "Size"],
    &stats.header_sizes,
    bytes,
  );
  print_extremes(
    ["Largest Implementation File", "Size", "Smallest Implementation File", "Size"],
    &stats.implementation_sizes,
    bytes,
  );
  print_extremes(
    ["Most Dependencies Header File", "Count", "Least Dependencies Header File", "Count"],
    &stats.header_dependencies,
    count,
  );
  print_extremes(
    ["Most Dependencies Impl File", "Count", "Least Dependencies Impl File", "Count"],
    &stats.implementation_dependencies,
    count,
  );
  print_extremes(
    ["Most Used Internal Dependency", "Count", "Least Used Internal Dependency", "Count"],
    &stats.internal_by_use,
    count,
  );
  print_extremes(
    ["Most Used External Dependency", "Count", "Least Used External Dependency", "Count"],
    &stats.external_by_use,
    count,
  );

  let totals = vec![
    vec!["Lines of Code".to_string(), stats.total_lines.to_string()],
    vec!["Average Lines of Code".to_string(), format!("{:.0}", stats.mean_lines)],
    vec!["Files".to_string(), stats.total_files.to_string()],
    vec!["Files Size".to_string(), format_bytes(stats.total_bytes)],
    vec!["Average File Size".to_string(), format_bytes(stats.mean_bytes.round() as u64)],
    vec!["Header Files".to_string(), stats.header_files.to_string()],
    vec!["Implementation Files".to_string(), stats.implementation_files.to_string()],
    vec!["Internal Dependencies".to_string(), stats.internal_dependencies.to_string()],
    vec!["External Dependencies".to_string(), stats.external_dependencies.to_string()],
  ];
  print_table(&["Summary", ""], &totals);

  Ok(())
}

/// One table with the top entries on the left and the bottom entries on the right.
fn print_extremes(headers: [&str; 4], extremes: &Extremes, value: impl Fn(u64) -> String) {
  let cell = |entry: Option<&RankedEntry>| match entry {
    Some(e) => (e.name.clone(), value(e.value)),
    None => ("-".to_string(), "-".to_string()),
  };

  let rows: Vec<Vec<String>> = (0..extremes.rows())
    .map(|n| {
      let (top, top_value) = cell(extremes.largest.get(n));
      let (bottom, bottom_value) = cell(extremes.smallest.get(n));
      vec![top, top_value, bottom, bottom_value]
    })
    .collect();

  print_table(&headers, &rows);
  println!();
}
