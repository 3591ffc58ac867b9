// src/paths/mod.rs

//! Path Table and everything derived from it.
//!
//! - [`table`] holds the declarative category -> {sources, dest, watch} map.
//! - [`patterns`] compiles globs and collects matching files.
//! - [`freshness`] implements the modification-time "newer" check.
//! - [`path_utils`] relativises and renames paths.

pub mod freshness;
pub mod path_utils;
pub mod patterns;
pub mod table;

pub use freshness::{dest_is_fresh, dest_is_fresh_for_all, is_up_to_date};
pub use patterns::{PatternSet, SourceSet};
pub use table::{PathSpec, PathTable};
