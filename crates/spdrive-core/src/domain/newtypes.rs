//! Domain newtypes with validation
//!
//! This module provides strongly-typed wrappers for domain identifiers and
//! values. Each newtype ensures data validity at construction time.

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::errors::DomainError;

// ============================================================================
// UUID-based ID types
// ============================================================================

/// A unique identifier for a transfer item, wrapped around UUID
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UniqueId(Uuid);

impl UniqueId {
    /// Create a new random UniqueId
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create a UniqueId from an existing UUID
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Get the inner UUID value
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for UniqueId {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for UniqueId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for UniqueId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s)
            .map(Self)
            .map_err(|e| DomainError::InvalidId(format!("Invalid UUID: {e}")))
    }
}

// ============================================================================
// Opaque remote identifiers
// ============================================================================

/// Identifier for a SharePoint site, as returned by the Graph API
///
/// Site IDs are opaque composite strings
/// (e.g., `contoso.sharepoint.com,guid,guid`); the only validation
/// performed is non-emptiness.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SiteId(String);

impl SiteId {
    /// Creates a SiteId, rejecting empty strings
    pub fn new(id: String) -> Result<Self, DomainError> {
        if id.trim().is_empty() {
            return Err(DomainError::InvalidId("Site ID cannot be empty".into()));
        }
        Ok(Self(id))
    }

    /// Returns the inner string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for SiteId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier for a document library (drive) within a site
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DriveId(String);

impl DriveId {
    /// Creates a DriveId, rejecting empty strings
    pub fn new(id: String) -> Result<Self, DomainError> {
        if id.trim().is_empty() {
            return Err(DomainError::InvalidId("Drive ID cannot be empty".into()));
        }
        Ok(Self(id))
    }

    /// Returns the inner string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for DriveId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// RemotePath
// ============================================================================

/// A validated drive-relative remote path
///
/// Remote paths are always absolute (start with `/`), use `/` as the
/// separator, and contain no `.` or `..` segments. The root is `/`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RemotePath(String);

impl RemotePath {
    /// Creates a validated RemotePath
    ///
    /// # Errors
    /// Returns `DomainError::InvalidRemotePath` if the path is empty,
    /// relative, ends with `/` (except the root), or contains empty,
    /// `.` or `..` segments.
    pub fn new(path: String) -> Result<Self, DomainError> {
        if path.is_empty() {
            return Err(DomainError::InvalidRemotePath(
                "Remote path cannot be empty".into(),
            ));
        }
        if !path.starts_with('/') {
            return Err(DomainError::InvalidRemotePath(format!(
                "Remote path must be absolute: {path}"
            )));
        }
        if path == "/" {
            return Ok(Self(path));
        }
        if path.ends_with('/') {
            return Err(DomainError::InvalidRemotePath(format!(
                "Remote path must not end with '/': {path}"
            )));
        }
        for segment in path[1..].split('/') {
            if segment.is_empty() || segment == "." || segment == ".." {
                return Err(DomainError::InvalidRemotePath(format!(
                    "Invalid path segment in: {path}"
                )));
            }
        }
        Ok(Self(path))
    }

    /// Returns the drive root path `/`
    #[must_use]
    pub fn root() -> Self {
        Self("/".to_string())
    }

    /// Returns true if this is the drive root
    pub fn is_root(&self) -> bool {
        self.0 == "/"
    }

    /// Returns the inner string
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Joins a child name onto this path
    ///
    /// # Errors
    /// Returns an error if the resulting path would be invalid
    /// (e.g., `name` contains a slash).
    pub fn join(&self, name: &str) -> Result<Self, DomainError> {
        if name.contains('/') {
            return Err(DomainError::InvalidRemotePath(format!(
                "Child name cannot contain '/': {name}"
            )));
        }
        let joined = if self.is_root() {
            format!("/{name}")
        } else {
            format!("{}/{name}", self.0)
        };
        Self::new(joined)
    }

    /// Returns the parent path, or None for the root
    pub fn parent(&self) -> Option<Self> {
        if self.is_root() {
            return None;
        }
        match self.0.rfind('/') {
            Some(0) => Some(Self::root()),
            Some(idx) => Some(Self(self.0[..idx].to_string())),
            None => None,
        }
    }

    /// Returns the final path component, or None for the root
    pub fn name(&self) -> Option<&str> {
        if self.is_root() {
            return None;
        }
        self.0.rsplit('/').next()
    }

    /// Returns every ancestor of this path from shallow to deep,
    /// excluding the root and including the path itself
    ///
    /// `/a/b/c` yields `/a`, `/a/b`, `/a/b/c`. Used by the batch
    /// orchestrator to create destination folders before file placement.
    pub fn ancestors_inclusive(&self) -> Vec<Self> {
        if self.is_root() {
            return Vec::new();
        }
        let mut out = Vec::new();
        let mut end = 0;
        let bytes = self.0.as_bytes();
        for (i, b) in bytes.iter().enumerate().skip(1) {
            if *b == b'/' {
                out.push(Self(self.0[..i].to_string()));
            }
            end = i;
        }
        out.push(Self(self.0[..=end].to_string()));
        out
    }
}

impl Display for RemotePath {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for RemotePath {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<RemotePath> for String {
    fn from(path: RemotePath) -> Self {
        path.0
    }
}

impl FromStr for RemotePath {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s.to_string())
    }
}

// ============================================================================
// Tests
// ============================================================================
