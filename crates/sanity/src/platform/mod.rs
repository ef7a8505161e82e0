//! Platform abstraction layer for native/web compatibility.
//!
//! This module provides traits that abstract platform-specific functionality:
//! - [`Storage`]: Persistence for the last and saved sessions
//! - [`MonteCarloExecutor`]: Where Monte Carlo runs execute
//!
//! Each trait has implementations for native (using filesystem and threads)
//! and web (using browser storage and deferred tasks), plus in-process
//! fallbacks that work everywhere.

mod storage;
mod worker;

#[cfg(feature = "native")]
pub mod native;

#[cfg(feature = "web")]
pub mod web;

pub use storage::{MemoryStorage, Storage, StorageError};
pub use worker::{DeferredExecutor, Generation, MonteCarloExecutor};

// Re-export platform-specific implementations
#[cfg(feature = "native")]
pub use native::{NativeStorage, ThreadExecutor};

#[cfg(feature = "web")]
pub use web::{WebExecutor, WebStorage};
