//! spdrive Core - Domain logic and port definitions
//!
//! This crate contains the hexagonal architecture core with:
//! - **Domain entities** - `TransferItem`, `BatchReport`, validated newtypes
//! - **Error taxonomy** - `TransferError` with transient/fatal classification
//! - **Port definitions** - Traits for adapters: `IRemoteStore`, `ILocalStore`,
//!   `ICredentialProvider`, `IProgressObserver`
//! - **Configuration** - Typed YAML configuration with defaults
//!
//! # Architecture
//!
//! This crate follows the hexagonal (ports & adapters) architecture pattern.
//! The domain module contains pure business logic with no HTTP or filesystem
//! dependencies. Ports define trait interfaces that adapter crates implement
//! (`spdrive-graph` for the remote store, `spdrive-transfer` for the local
//! filesystem). The transfer engine orchestrates domain entities through the
//! port interfaces.

pub mod config;
pub mod domain;
pub mod ports;
