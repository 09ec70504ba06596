//! Store endpoints and database namespaces
//!
//! An endpoint names where documents live:
//!
//! | form | store |
//! |------|-------|
//! | `mem://` | ephemeral, in-process |
//! | `file:///var/lib/streams` | durable, rooted at the path |
//! | `./data` (bare path) | durable, rooted at the path |
//!
//! A durable root holds `streamstate.toml` and one directory per database
//! namespace. The collection inside a namespace is always `streams`.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use streamstate_core::{Error, Result};

/// Namespace used when none is given
pub const DEFAULT_DATABASE: &str = "test";

/// Fixed collection name inside every namespace
pub const COLLECTION_NAME: &str = "streams";

const MEMORY_SCHEME: &str = "mem://";
const FILE_SCHEME: &str = "file://";

/// Parsed store endpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Endpoint {
    /// In-process store, lost on exit
    Memory,
    /// Write-ahead-logged store rooted at a directory
    Directory(PathBuf),
}

impl Endpoint {
    /// Parse an endpoint string
    ///
    /// # Errors
    ///
    /// `InvalidInput` for an empty string, an unsupported `scheme://`, or a
    /// `file://` endpoint without a path.
    pub fn parse(raw: &str) -> Result<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(Error::invalid_input("store endpoint is empty"));
        }

        if let Some(rest) = raw.strip_prefix(MEMORY_SCHEME) {
            if !rest.is_empty() {
                return Err(Error::invalid_input(format!(
                    "memory endpoint takes no path: '{}'",
                    raw
                )));
            }
            return Ok(Endpoint::Memory);
        }

        if let Some(path) = raw.strip_prefix(FILE_SCHEME) {
            if path.is_empty() {
                return Err(Error::invalid_input("file endpoint has no path"));
            }
            return Ok(Endpoint::Directory(PathBuf::from(path)));
        }

        if let Some((scheme, _)) = raw.split_once("://") {
            return Err(Error::invalid_input(format!(
                "unsupported endpoint scheme '{}' (expected mem:// or file://)",
                scheme
            )));
        }

        Ok(Endpoint::Directory(PathBuf::from(raw)))
    }

    /// Root directory for durable endpoints
    pub fn root(&self) -> Option<&Path> {
        match self {
            Endpoint::Memory => None,
            Endpoint::Directory(path) => Some(path),
        }
    }

    /// True if documents survive a restart
    pub fn is_durable(&self) -> bool {
        matches!(self, Endpoint::Directory(_))
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Endpoint::Memory => f.write_str(MEMORY_SCHEME),
            Endpoint::Directory(path) => write!(f, "{}{}", FILE_SCHEME, path.display()),
        }
    }
}

impl FromStr for Endpoint {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// Check a database namespace: non-empty, `[A-Za-z0-9_-]` only
pub fn validate_database_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(Error::invalid_input("database name is empty"));
    }
    if let Some(bad) = name
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || *c == '_' || *c == '-'))
    {
        return Err(Error::invalid_input(format!(
            "database name '{}' contains '{}' (allowed: letters, digits, '_' and '-')",
            name, bad
        )));
    }
    Ok(())
}
