//! # Tree
//!
//! Directory tree fixtures and enumeration for treewatch.
//!
//! This crate builds the synthetic directory trees the watch probe runs
//! against and discovers every existing directory under a root so the
//! fallback watcher can cover them one by one.
//!
//! ## Features
//!
//! - **Fixture Building**: Idempotent, best-effort construction of a
//!   balanced tree of configurable width and depth
//! - **Enumeration**: Recursive directory discovery that drops
//!   unreadable or racing entries instead of failing
//! - **Path Helpers**: Normalization and hidden-entry filtering shared
//!   with the watcher

pub mod builder;
pub mod enumerate;
pub mod error;
pub mod path;

pub use builder::{BuildReport, build};
pub use enumerate::enumerate;
pub use error::{Result, TreeError};
