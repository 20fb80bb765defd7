//! spdrive Graph - Microsoft Graph API adapter
//!
//! Provides the remote-store adapter for SharePoint document libraries:
//! - Client-credential token acquisition and caching
//! - Site and drive (document library) resolution
//! - DriveItem operations (list, metadata, folders, delete, move, share)
//! - Chunked upload sessions and ranged downloads
//! - A retrying request executor with exponential backoff
//!
//! ## Modules
//!
//! - [`auth`] - OAuth2 client-credential token provider
//! - [`backoff`] - Backoff policy and `Retry-After` parsing
//! - [`executor`] - Retrying HTTP request executor
//! - [`client`] - Site and drive resolution against the Graph API
//! - [`drive`] - DriveItem operations within one document library
//! - [`upload`] - Resumable upload sessions
//! - [`provider`] - `IRemoteStore` implementation backed by [`drive`]

pub mod auth;
pub mod backoff;
pub mod client;
pub mod drive;
pub mod executor;
pub mod provider;
pub mod upload;

pub use auth::ClientCredentialProvider;
pub use backoff::BackoffPolicy;
pub use client::{Drive, GraphClient, Site};
pub use drive::DriveClient;
pub use executor::{RequestBody, RequestExecutor, RequestSpec};
pub use provider::GraphRemoteStore;
pub use upload::{SessionStatus, UploadSession};

/// Base URL for Microsoft Graph API v1.0
pub const GRAPH_BASE_URL: &str = "https://graph.microsoft.com/v1.0";

/// Files at or below this size are uploaded in a single PUT (4 MiB)
pub const SIMPLE_UPLOAD_MAX_SIZE: u64 = 4 * 1024 * 1024;

/// Default chunk size for upload sessions and ranged downloads: 10 MiB
///
/// Microsoft recommends chunk sizes that are multiples of 320 KiB.
/// 10 MiB = 10,485,760 = 320 KiB * 32, which satisfies this requirement.
pub const DEFAULT_CHUNK_SIZE: u64 = 10 * 1024 * 1024;
