//! Session state and published snapshots.

use std::fmt;
use std::sync::Arc;

use crate::controller::error::ControllerError;
use crate::draft::ConfigDraft;

/// Phase of the editing session.
///
/// `Loading` and `Submitting` are transient: each has exactly one call to
/// the config service outstanding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SessionState {
    #[default]
    Closed,
    Loading,
    Open,
    Submitting,
}

impl SessionState {
    pub fn as_str(self) -> &'static str {
        match self {
            SessionState::Closed => "closed",
            SessionState::Loading => "loading",
            SessionState::Open => "open",
            SessionState::Submitting => "submitting",
        }
    }

    /// True while a fetch or submit is outstanding.
    pub fn is_transient(self) -> bool {
        matches!(self, SessionState::Loading | SessionState::Submitting)
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Controller operation, used to scope errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Open,
    SetField,
    Undo,
    Submit,
    Cancel,
}

impl Operation {
    pub fn as_str(self) -> &'static str {
        match self {
            Operation::Open => "open",
            Operation::SetField => "set_field",
            Operation::Undo => "undo",
            Operation::Submit => "submit",
            Operation::Cancel => "cancel",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Immutable view of the controller at one point in time.
///
/// Every transition publishes a fresh snapshot; readers holding an older
/// one keep seeing a consistent, fully-formed state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub session: SessionState,
    pub draft: Arc<ConfigDraft>,
    /// Drafts replaced by accepted edits in this session, oldest first.
    pub history: Vec<Arc<ConfigDraft>>,
    pub last_error: Option<ControllerError>,
    /// Bumped whenever a fetch or submit starts and on cancel. Resolutions
    /// carrying an older generation are discarded.
    pub generation: u64,
}

impl Snapshot {
    /// Closed session holding a default draft.
    pub fn closed(generation: u64) -> Self {
        Self {
            session: SessionState::Closed,
            draft: Arc::new(ConfigDraft::default()),
            history: Vec::new(),
            last_error: None,
            generation,
        }
    }

    pub fn can_undo(&self) -> bool {
        !self.history.is_empty()
    }
}

impl Default for Snapshot {
    fn default() -> Self {
        Self::closed(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_snapshot_is_closed_with_default_draft() {
        let snapshot = Snapshot::default();
        assert_eq!(snapshot.session, SessionState::Closed);
        assert_eq!(*snapshot.draft, ConfigDraft::default());
        assert!(snapshot.draft.methods.is_empty());
        assert!(!snapshot.can_undo());
        assert_eq!(snapshot.generation, 0);
    }

    #[test]
    fn only_loading_and_submitting_are_transient() {
        assert!(SessionState::Loading.is_transient());
        assert!(SessionState::Submitting.is_transient());
        assert!(!SessionState::Open.is_transient());
        assert!(!SessionState::Closed.is_transient());
    }
}
