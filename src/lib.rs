//! Twig - a small local version-control system
//!
//! Twig snapshots the files of one flat working directory into a
//! content-addressed object store, keeps named branches of commits, and merges
//! branches with a three-way algorithm that writes conflict markers where both
//! sides changed a file differently.
//!
//! # Architecture
//!
//! The codebase follows a strict layered architecture:
//!
//! - [`cli`] - Command-line interface layer (parses args, delegates to engine)
//! - [`engine`] - One typed operation per command on a [`engine::Repository`]
//! - [`core`] - Domain types, object store, commit graph, stage, refs, config
//! - [`ui`] - Output formatting
//!
//! # Correctness Invariants
//!
//! Twig maintains the following invariants:
//!
//! 1. Stored objects are immutable and named by the hash of their bytes
//! 2. Objects are written before any reference names them
//! 3. Every pointer update is an atomic rename, so an interrupted command
//!    leaves the previous valid pointer in place
//! 4. Preconditions are checked before the first write

pub mod cli;
pub mod core;
pub mod engine;
pub mod ui;
