//! spdrive Transfer - concurrent transfer engine
//!
//! Moves files between the local filesystem and a remote store through
//! the core ports:
//! - [`filesystem`] - `ILocalStore` adapter over `tokio::fs`
//! - [`unit`] - single-item transfers (download / upload)
//! - [`batch`] - bounded-concurrency batch orchestration

pub mod batch;
pub mod filesystem;
pub mod unit;

pub use batch::BatchOrchestrator;
pub use filesystem::TokioFileSystem;
pub use unit::TransferUnit;
