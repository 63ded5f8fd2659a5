//! ui
//!
//! User-facing output.
//!
//! # Modules
//!
//! - [`output`] - Verbosity handling and the log/status/merge renderers
//!
//! # Design
//!
//! The engine never prints. Command handlers pass engine results to this
//! module so that every message has one format.

pub mod output;
