//! kbgraph: hierarchical knowledge base to cross-linked HTML pages.
//!
//! Layers:
//! - `domain`: hierarchy entities, builder, navigation and search (no I/O)
//! - `application`: source loading, rendering, export, site generation
//! - `infrastructure`: filesystem boundary and service wiring
//! - `cli`: argument parsing and command dispatch

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod tree_traits;
pub mod util;
