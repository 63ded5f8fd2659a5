//! core::types
//!
//! Strong types for core domain concepts.
//!
//! # Types
//!
//! - [`ObjectId`] - SHA-256 content hash naming a stored object
//! - [`BranchName`] - Validated branch name
//! - [`RefName`] - Validated reference name (`refs/heads/<branch>`)
//! - [`FileName`] - A plain file name in the work directory
//! - [`Timestamp`] - Commit creation time
//!
//! # Validation
//!
//! These types enforce validity at construction time. A `BranchName` is always
//! safe to join under `refs/heads/`, and a `FileName` is always a single path
//! component inside the work directory.
//!
//! # Examples
//!
//! ```
//! use twig::core::types::{BranchName, ObjectId, RefName};
//!
//! let branch = BranchName::new("feature/login").unwrap();
//! let id = ObjectId::of(b"hello");
//! let refname = RefName::for_branch(&branch);
//!
//! assert_eq!(refname.as_str(), "refs/heads/feature/login");
//! assert_eq!(id.as_str().len(), 64);
//! assert!(BranchName::new("bad..name").is_err());
//! ```

use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;

/// Errors from type validation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid branch name: {0}")]
    InvalidBranchName(String),

    #[error("invalid object id: {0}")]
    InvalidObjectId(String),

    #[error("invalid ref name: {0}")]
    InvalidRefName(String),

    #[error("invalid file name: {0}")]
    InvalidFileName(String),
}

/// Characters git refuses anywhere in a refname.
const FORBIDDEN_REF_CHARS: [char; 8] = [' ', '~', '^', ':', '\\', '?', '*', '['];

/// Check a name against git's refname rules (`git check-ref-format`).
///
/// Returns a human-readable reason on failure.
fn check_refname(name: &str) -> Result<(), String> {
    if name.is_empty() {
        return Err("cannot be empty".into());
    }
    if name == "@" {
        return Err("cannot be '@'".into());
    }
    if name.starts_with('/') || name.ends_with('/') {
        return Err("cannot start or end with '/'".into());
    }
    if name.ends_with(".lock") {
        return Err("cannot end with '.lock'".into());
    }
    for bad in ["..", "@{", "//"] {
        if name.contains(bad) {
            return Err(format!("cannot contain '{bad}'"));
        }
    }
    if let Some(c) = name.chars().find(|c| FORBIDDEN_REF_CHARS.contains(c)) {
        return Err(format!("cannot contain '{c}'"));
    }
    if name.chars().any(|c| c.is_ascii_control()) {
        return Err("cannot contain control characters".into());
    }
    for component in name.split('/') {
        if component.starts_with('.') {
            return Err("path component cannot start with '.'".into());
        }
        if component.ends_with(".lock") {
            return Err("path component cannot end with '.lock'".into());
        }
    }
    Ok(())
}

/// A content hash identifying one stored object.
///
/// Ids are SHA-256 digests rendered as 64 lowercase hex characters.
/// Commits and blobs share this namespace.
///
/// # Example
///
/// ```
/// use twig::core::types::ObjectId;
///
/// let id = ObjectId::of(b"same bytes");
/// assert_eq!(id, ObjectId::of(b"same bytes"));
/// assert_eq!(id.short(7).len(), 7);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ObjectId(String);

impl ObjectId {
    /// Number of hex characters in a full id.
    pub const HEX_LEN: usize = 64;

    /// Hash a byte sequence.
    pub fn of(bytes: &[u8]) -> Self {
        Self(hex::encode(Sha256::digest(bytes)))
    }

    /// Parse a full-length hex id. Input is normalized to lowercase.
    ///
    /// # Errors
    ///
    /// Returns `TypeError::InvalidObjectId` unless the input is exactly
    /// 64 hex characters.
    pub fn new(id: impl Into<String>) -> Result<Self, TypeError> {
        let id = id.into().to_ascii_lowercase();
        if id.len() != Self::HEX_LEN {
            return Err(TypeError::InvalidObjectId(format!(
                "expected {} hex characters, got {}",
                Self::HEX_LEN,
                id.len()
            )));
        }
        if !id.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(TypeError::InvalidObjectId(
                "object id must be hexadecimal".into(),
            ));
        }
        Ok(Self(id))
    }

    /// The first `len` hex characters (the whole id if `len` is larger).
    pub fn short(&self, len: usize) -> &str {
        &self.0[..len.min(self.0.len())]
    }

    /// Whether this id begins with `prefix` (already lowercased).
    pub fn has_prefix(&self, prefix: &str) -> bool {
        self.0.starts_with(prefix)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for ObjectId {
    type Error = TypeError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<ObjectId> for String {
    fn from(id: ObjectId) -> Self {
        id.0
    }
}

impl AsRef<str> for ObjectId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ObjectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A validated branch name.
///
/// Branch names follow git's refname rules, which also guarantees the name
/// can be joined under `refs/heads/` without escaping the control directory.
///
/// # Example
///
/// ```
/// use twig::core::types::BranchName;
///
/// assert!(BranchName::new("master").is_ok());
/// assert!(BranchName::new("topic/merge-fix").is_ok());
///
/// assert!(BranchName::new("").is_err());
/// assert!(BranchName::new("../escape").is_err());
/// assert!(BranchName::new("has space").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct BranchName(String);

impl BranchName {
    /// Create a new validated branch name.
    ///
    /// # Errors
    ///
    /// Returns `TypeError::InvalidBranchName` if the name violates refname rules
    /// or starts with `-`.
    pub fn new(name: impl Into<String>) -> Result<Self, TypeError> {
        let name = name.into();
        if name.starts_with('-') {
            return Err(TypeError::InvalidBranchName(format!(
                "'{name}' cannot start with '-'"
            )));
        }
        check_refname(&name)
            .map_err(|reason| TypeError::InvalidBranchName(format!("'{name}' {reason}")))?;
        Ok(Self(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for BranchName {
    type Error = TypeError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<BranchName> for String {
    fn from(name: BranchName) -> Self {
        name.0
    }
}

impl AsRef<str> for BranchName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for BranchName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A validated reference name such as `refs/heads/master`.
///
/// This is the form written into the symbolic `HEAD` file.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RefName(String);

impl RefName {
    /// Prefix for branch refs.
    pub const HEADS_PREFIX: &'static str = "refs/heads/";

    /// Create a new validated ref name.
    ///
    /// # Errors
    ///
    /// Returns `TypeError::InvalidRefName` if the name violates refname rules.
    pub fn new(name: impl Into<String>) -> Result<Self, TypeError> {
        let name = name.into();
        check_refname(&name)
            .map_err(|reason| TypeError::InvalidRefName(format!("'{name}' {reason}")))?;
        Ok(Self(name))
    }

    /// The ref for a branch (`refs/heads/<branch>`).
    ///
    /// # Example
    ///
    /// ```
    /// use twig::core::types::{BranchName, RefName};
    ///
    /// let branch = BranchName::new("master").unwrap();
    /// assert_eq!(RefName::for_branch(&branch).as_str(), "refs/heads/master");
    /// ```
    pub fn for_branch(branch: &BranchName) -> Self {
        Self(format!("{}{}", Self::HEADS_PREFIX, branch.as_str()))
    }

    /// The branch this ref names, if it lives under `refs/heads/`.
    pub fn branch(&self) -> Option<BranchName> {
        self.0
            .strip_prefix(Self::HEADS_PREFIX)
            .and_then(|name| BranchName::new(name).ok())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for RefName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A plain file name inside the work directory.
///
/// Twig tracks a flat directory: names are single path components, never
/// `.`/`..`, and never the control directory itself.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct FileName(String);

impl FileName {
    /// Create a new validated file name.
    ///
    /// # Errors
    ///
    /// Returns `TypeError::InvalidFileName` for empty names, names containing a
    /// path separator or NUL, `.`/`..`, and the control directory name.
    pub fn new(name: impl Into<String>) -> Result<Self, TypeError> {
        let name = name.into();
        let reason = if name.is_empty() {
            Some("cannot be empty")
        } else if name.contains('/') || name.contains('\\') || name.contains('\0') {
            Some("must be a plain file name")
        } else if name == "." || name == ".." {
            Some("cannot be '.' or '..'")
        } else if name == crate::core::paths::CONTROL_DIR {
            Some("is reserved")
        } else {
            None
        };
        match reason {
            Some(reason) => Err(TypeError::InvalidFileName(format!("'{name}' {reason}"))),
            None => Ok(Self(name)),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for FileName {
    type Error = TypeError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<FileName> for String {
    fn from(name: FileName) -> Self {
        name.0
    }
}

impl AsRef<str> for FileName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for FileName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// The moment a commit was created, stored in UTC.
///
/// The root commit always carries the Unix epoch so every repository starts
/// from the same root id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Log date layout, e.g. `Thu Nov 9 20:00:05 2017 -0800`.
    pub const LOG_FORMAT: &'static str = "%a %b %-d %H:%M:%S %Y %z";

    /// The Unix epoch.
    pub fn epoch() -> Self {
        // `DateTime<Utc>` defaults to the epoch.
        Self(DateTime::<Utc>::default())
    }

    pub fn now() -> Self {
        Self(Utc::now())
    }

    pub fn from_datetime(dt: DateTime<Utc>) -> Self {
        Self(dt)
    }

    pub fn as_datetime(&self) -> &DateTime<Utc> {
        &self.0
    }

    /// Seconds since the Unix epoch.
    pub fn unix_seconds(&self) -> i64 {
        self.0.timestamp()
    }

    /// Render for a log entry, in UTC or in the local time zone.
    pub fn format_log(&self, utc: bool) -> String {
        if utc {
            self.0.format(Self::LOG_FORMAT).to_string()
        } else {
            self.0
                .with_timezone(&Local)
                .format(Self::LOG_FORMAT)
                .to_string()
        }
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.to_rfc3339())
    }
}
