#![forbid(unsafe_code)]
#![deny(
    dead_code,
    unused_imports,
    unused_must_use,
    unreachable_pub,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls,
    missing_docs
)]
//! Shared HTTP DTOs for the Artifactory administrative REST API.
//!
//! Only the fields the CLI reads or writes are modelled; every response type
//! tolerates (and drops) additional keys so newer server versions keep
//! decoding.

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Repository class as understood by the instance.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum RepoClass {
    /// Repository hosted on the instance itself.
    Local,
    /// Caching proxy for an upstream repository.
    Remote,
    /// Aggregation of local and remote repositories.
    Virtual,
}

impl RepoClass {
    /// Every class, in the order the instance documents them.
    pub const ALL: [Self; 3] = [Self::Local, Self::Remote, Self::Virtual];

    /// Wire representation used in query strings and request bodies.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Local => "local",
            Self::Remote => "remote",
            Self::Virtual => "virtual",
        }
    }
}

impl Display for RepoClass {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Error returned when a string does not name a [`RepoClass`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownRepoClass(pub String);

impl Display for UnknownRepoClass {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        write!(
            formatter,
            "unknown repository type '{}' (expected local, remote, or virtual)",
            self.0
        )
    }
}

impl std::error::Error for UnknownRepoClass {}

impl FromStr for RepoClass {
    type Err = UnknownRepoClass;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalised = value.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|class| class.as_str() == normalised)
            .ok_or_else(|| UnknownRepoClass(value.trim().to_string()))
    }
}

/// Body of `PUT /repositories/{key}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RepositorySpec {
    /// Unique repository key; also the final path segment.
    pub key: String,
    /// Repository class.
    pub rclass: RepoClass,
    /// Package type (e.g. `maven`, `npm`, `generic`).
    pub package_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    /// Public description shown in the UI.
    pub description: Option<String>,
}

/// Body of `POST /repositories/{key}` when only the description changes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RepositoryUpdate {
    /// Repository being updated.
    pub key: String,
    /// Replacement public description.
    pub description: String,
}

/// Body of `PUT /security/users/{name}`.
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserSpec {
    /// Unique user name; also the final path segment.
    pub name: String,
    /// Contact address for the account.
    pub email: String,
    /// Initial password.
    pub password: String,
}

impl fmt::Debug for UserSpec {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("UserSpec")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Response of `GET /system/version`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct VersionInfo {
    /// Product version, e.g. `7.1.0`.
    pub version: String,
    /// Build revision identifier.
    pub revision: String,
}

/// Element of the `GET /repositories` array.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RepositorySummary {
    /// Repository key.
    pub key: String,
}

/// Element of the `GET /security/users` array.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserSummary {
    /// User name.
    pub name: String,
}

/// Error envelope returned by the instance on rejected requests.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorsBody {
    /// Individual error entries, most relevant first.
    #[serde(default)]
    pub errors: Vec<ErrorEntry>,
}

/// Single entry of an [`ErrorsBody`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// Status code echoed by the server, when present.
    pub status: Option<u16>,
    /// Human-readable explanation.
    pub message: String,
}

impl ErrorsBody {
    /// Message of the first error entry, if any.
    #[must_use]
    pub fn first_message(&self) -> Option<&str> {
        self.errors
            .first()
            .map(|entry| entry.message.trim())
            .filter(|message| !message.is_empty())
    }
}
