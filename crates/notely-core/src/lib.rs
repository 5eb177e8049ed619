pub mod export;
pub mod live;
pub mod notes;
pub mod settings;
pub mod store;
pub mod view;

mod error;

pub use error::{NoteError, Operation, StoreError};
pub use notes::Notes;

use serde::{Deserialize, Serialize};
use std::fmt;
use time::OffsetDateTime;

/// Group filter value selecting notes that have no group assigned.
pub const NO_GROUP: &str = "no_group";

const MAX_OWNER_ID_LEN: usize = 256;

// --- Identifiers ---

/// Store-assigned note identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NoteId(pub i64);

impl fmt::Display for NoteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Opaque authenticated-user reference. Every note belongs to exactly one.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OwnerId(String);

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OwnerIdError {
    #[error("owner id is empty")]
    Empty,
    #[error("owner id is longer than {MAX_OWNER_ID_LEN} bytes")]
    TooLong,
}

impl OwnerId {
    pub fn try_new(value: impl Into<String>) -> Result<Self, OwnerIdError> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(OwnerIdError::Empty);
        }
        if value.len() > MAX_OWNER_ID_LEN {
            return Err(OwnerIdError::TooLong);
        }
        Ok(Self(value))
    }

    /// Rows read back from the store were validated on the way in.
    pub(crate) fn from_stored(value: String) -> Self {
        Self(value)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OwnerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// --- Session ---

/// The caller as resolved by the authentication collaborator.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    user: Option<OwnerId>,
}

impl Session {
    pub fn anonymous() -> Self {
        Self { user: None }
    }

    pub fn authenticated(user: OwnerId) -> Self {
        Self { user: Some(user) }
    }

    pub fn user(&self) -> Option<&OwnerId> {
        self.user.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    /// Resolve the caller for a write, or reject with the operation's login message.
    pub fn require(&self, operation: Operation) -> Result<&OwnerId, NoteError> {
        self.user
            .as_ref()
            .ok_or(NoteError::Unauthenticated(operation))
    }
}

// --- Notes ---

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: NoteId,
    pub author_id: OwnerId,
    pub content: String,
    /// Absent in storage reads as `false`.
    #[serde(default)]
    pub completed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
    pub created_at_ms: i64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StatusFilter {
    #[default]
    All,
    Completed,
    Incomplete,
}

impl StatusFilter {
    /// Unknown filter names select everything.
    pub fn from_arg(arg: Option<&str>) -> Self {
        match arg {
            Some("completed") => StatusFilter::Completed,
            Some("incomplete") => StatusFilter::Incomplete,
            _ => StatusFilter::All,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum GroupFilter {
    #[default]
    Any,
    /// Group absent or empty.
    Ungrouped,
    /// Exact, untrimmed match.
    Named(String),
}

impl GroupFilter {
    pub fn from_arg(arg: Option<&str>) -> Self {
        match arg {
            None | Some("") => GroupFilter::Any,
            Some(NO_GROUP) => GroupFilter::Ungrouped,
            Some(name) => GroupFilter::Named(name.to_string()),
        }
    }
}

/// Owner-scoped predicate for list and live queries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NoteQuery {
    pub status: StatusFilter,
    pub group: GroupFilter,
}

impl NoteQuery {
    pub fn new(filter: Option<&str>, group: Option<&str>) -> Self {
        Self {
            status: StatusFilter::from_arg(filter),
            group: GroupFilter::from_arg(group),
        }
    }
}

// --- Normalization ---

/// Trimmed content, or `None` when nothing but whitespace is left.
pub fn normalize_content(content: &str) -> Option<String> {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Empty and whitespace-only group labels are stored as absent.
pub fn normalize_group(group: Option<&str>) -> Option<String> {
    group
        .map(str::trim)
        .filter(|g| !g.is_empty())
        .map(str::to_string)
}

pub fn now_ms() -> i64 {
    let ms = OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000i128;
    if ms <= 0 {
        0
    } else if ms >= i64::MAX as i128 {
        i64::MAX
    } else {
        ms as i64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn owner_id_rejects_blank_and_oversized_values() {
        assert_eq!(OwnerId::try_new("   "), Err(OwnerIdError::Empty));
        assert_eq!(
            OwnerId::try_new("x".repeat(MAX_OWNER_ID_LEN + 1)),
            Err(OwnerIdError::TooLong)
        );
        assert_eq!(OwnerId::try_new("alice").unwrap().as_str(), "alice");
    }

    #[test]
    fn group_normalization_treats_blank_as_absent() {
        assert_eq!(normalize_group(None), None);
        assert_eq!(normalize_group(Some("")), None);
        assert_eq!(normalize_group(Some("  \t")), None);
        assert_eq!(normalize_group(Some("  work ")), Some("work".to_string()));
    }

    #[test]
    fn content_normalization_trims() {
        assert_eq!(normalize_content("  hi  "), Some("hi".to_string()));
        assert_eq!(normalize_content(" \n "), None);
    }

    #[test]
    fn query_arguments_follow_list_semantics() {
        assert_eq!(StatusFilter::from_arg(Some("completed")), StatusFilter::Completed);
        assert_eq!(StatusFilter::from_arg(Some("incomplete")), StatusFilter::Incomplete);
        assert_eq!(StatusFilter::from_arg(Some("starred")), StatusFilter::All);
        assert_eq!(GroupFilter::from_arg(Some("")), GroupFilter::Any);
        assert_eq!(GroupFilter::from_arg(Some(NO_GROUP)), GroupFilter::Ungrouped);
        assert_eq!(
            GroupFilter::from_arg(Some(" work")),
            GroupFilter::Named(" work".to_string())
        );
    }

    #[test]
    fn anonymous_session_rejects_writes_with_operation_message() {
        let err = Session::anonymous()
            .require(Operation::RenameGroup)
            .unwrap_err();
        assert_eq!(err.to_string(), "Must be logged in to rename groups");
    }
}
