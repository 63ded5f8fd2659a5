//! core::ops
//!
//! Coordination for mutating commands.
//!
//! # Modules
//!
//! - [`lock`] - Exclusive repository lock
//!
//! # Architecture
//!
//! Every mutating command:
//! 1. Acquires the exclusive repo lock
//! 2. Loads the stage
//! 3. Writes new objects before anything that references them
//! 4. Publishes the branch pointer or HEAD last
//! 5. Saves the stage and releases the lock

pub mod lock;

pub use lock::{LockError, RepoLock};
