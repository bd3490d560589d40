//! Action identities and per-action status records.

use serde::Serialize;
use std::fmt;

use crate::core::OclError;

/// Kinds of operations whose status the store tracks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ActionType {
    CreateSourceCollectionDictionary,
    EditSourceCollectionDictionary,
    AddConceptsToCollection,
    RemoveReferencesFromCollection,
    RetrieveDictionary,
    RetrieveDictionaryVersions,
    RetrieveDictionaries,
}

impl ActionType {
    /// Stable name, as shown in logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::CreateSourceCollectionDictionary => {
                "dictionaries/createSourceCollectionDictionary"
            }
            Self::EditSourceCollectionDictionary => "dictionaries/editSourceCollectionDictionary",
            Self::AddConceptsToCollection => "dictionaries/addConceptsToCollection",
            Self::RemoveReferencesFromCollection => "dictionaries/removeReferencesFromCollection",
            Self::RetrieveDictionary => "dictionaries/retrieveDictionary",
            Self::RetrieveDictionaryVersions => "dictionaries/retrieveDictionaryVersions",
            Self::RetrieveDictionaries => "dictionaries/retrieveDictionaries",
        }
    }
}

impl fmt::Display for ActionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One operation instance: its kind plus an index distinguishing concurrent runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct ActionKey {
    pub action: ActionType,
    pub index: usize,
}

impl ActionKey {
    #[must_use]
    pub const fn new(action: ActionType, index: usize) -> Self {
        Self {
            action,
            index,
        }
    }

    /// Index 0, for actions that never run concurrently with themselves.
    #[must_use]
    pub const fn single(action: ActionType) -> Self {
        Self::new(action, 0)
    }
}

impl fmt::Display for ActionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.action, self.index)
    }
}

/// Failure recorded for an action.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActionFailure {
    pub message: String,
    /// Request that failed, when the failure came from a call
    pub url: Option<String>,
    /// HTTP status when the server answered
    pub status: Option<u16>,
    /// Remote error body
    pub payload: Option<serde_json::Value>,
}

impl From<&OclError> for ActionFailure {
    fn from(error: &OclError) -> Self {
        Self {
            message: error.to_string(),
            url: error.url().map(str::to_string),
            status: error.status(),
            payload: error.payload().cloned(),
        }
    }
}

impl ActionFailure {
    /// Rebuild an error for reporting; server answers keep their status and payload.
    #[must_use]
    pub fn to_error(&self) -> OclError {
        match self.status {
            Some(status) => OclError::ApiStatus {
                status,
                url: self.url.clone().unwrap_or_default(),
                payload: self.payload.clone(),
            },
            None => OclError::Other {
                message: self.message.clone(),
            },
        }
    }
}

/// Loading flag, progress log and outcome of one action.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ActionStatus {
    pub loading: bool,
    /// Append-only progress messages, oldest first
    pub progress: Vec<String>,
    pub failure: Option<ActionFailure>,
    pub completed: bool,
}

impl ActionStatus {
    #[must_use]
    pub fn last_progress(&self) -> Option<&str> {
        self.progress.last().map(String::as_str)
    }

    #[must_use]
    pub const fn succeeded(&self) -> bool {
        self.completed && self.failure.is_none()
    }
}
