//! Application services
//!
//! Concrete service implementations that orchestrate domain logic.
//! Services depend on I/O boundary traits (FileSystem) but are themselves
//! concrete structs, not traits.

pub mod loader;
mod site;

pub use loader::{
    parse_yaml_structure, LoadOutcome, LoadWarning, LoaderOptions, SourceKind, SourceLoader,
};
pub use site::{GenerateReport, LoadedTree, SiteService, Summary};
