//! core
//!
//! Core domain types, persistence, and history algorithms for Twig.
//!
//! # Modules
//!
//! - [`types`] - Strong types: ObjectId, BranchName, RefName, FileName, Timestamp
//! - [`paths`] - Centralized path routing for `.twig` storage
//! - [`atomic`] - Write-then-rename file replacement
//! - [`object`] - Tagged object encoding
//! - [`store`] - Content-addressed object store
//! - [`commit`] - The immutable commit record
//! - [`graph`] - Commit history traversal and merge-base search
//! - [`stage`] - The staging area
//! - [`refs`] - Branch pointers and HEAD
//! - [`config`] - Configuration schema and loading
//! - [`ops`] - Repository locking
//! - [`verify`] - Fast verification of repository invariants
//!
//! # Design Principles
//!
//! - Strong typing prevents invalid states at compile time
//! - Objects are written before anything references them
//! - All traversal is iterative and deterministic

pub mod atomic;
pub mod commit;
pub mod config;
pub mod graph;
pub mod object;
pub mod ops;
pub mod paths;
pub mod refs;
pub mod stage;
pub mod store;
pub mod types;
pub mod verify;
