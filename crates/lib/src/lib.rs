//! cadb-lib: incremental build engine for cadb
//!
//! This crate provides the pieces behind the `cadb` binary:
//! - `SourceSet`: discovered header and implementation files with their hashes and includes
//! - `DependencyIndex`: reverse include index (dependency -> dependents)
//! - `RebuildPlan`: which implementation files must be recompiled this run
//! - `execute`: hook, compile, link and clean actions driving an external toolchain
//! - `HashDatabase`: persisted path -> hash snapshot that makes runs incremental

pub mod config;
pub mod consts;
pub mod database;
pub mod deps;
pub mod execute;
pub mod log;
pub mod plan;
pub mod report;
pub mod source;
pub mod util;
