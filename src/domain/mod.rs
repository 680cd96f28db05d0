//! Domain layer: hierarchy entities and construction logic
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod arena;
pub mod builder;
pub mod entities;
pub mod error;
pub mod links;
pub mod search;

pub use arena::{HierarchyNode, HierarchyTree};
pub use builder::{BuildOptions, HierarchyBuilder};
pub use entities::*;
pub use error::{DomainError, DomainResult};
pub use links::{ChildView, LinkResolver, NavLink, PageView};
pub use search::{MatchedField, SearchHit, SearchIndex};
