// src/dag/mod.rs

//! Build ordering.
//!
//! - [`graph`] holds the petgraph-backed [`BuildGraph`] of Clean and the
//!   category runs, and groups it into stages that run one after another.

pub mod graph;

pub use graph::{BuildGraph, BuildNode};
