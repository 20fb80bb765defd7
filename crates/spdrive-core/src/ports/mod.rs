//! Port definitions (hexagonal architecture interfaces)
//!
//! This module defines the port traits that form the boundaries of the
//! hexagonal architecture. Ports are interfaces that the domain core
//! depends on, but whose implementations live in adapter crates.
//!
//! ## Ports Overview
//!
//! - [`IRemoteStore`] - Remote drive operations (Microsoft Graph / SharePoint)
//! - [`ILocalStore`] - Local filesystem operations
//! - [`ICredentialProvider`] - Bearer token acquisition
//! - [`IProgressObserver`] - Transfer progress reporting

pub mod credentials;
pub mod local_store;
pub mod progress;
pub mod remote_store;

pub use credentials::{ICredentialProvider, StaticTokenProvider};
pub use local_store::{ILocalStore, LocalSink};
pub use progress::{IProgressObserver, NullProgressObserver, ProgressEvent};
pub use remote_store::{IRemoteStore, RemoteEntry};
