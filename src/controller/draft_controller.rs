//! The draft controller.
//!
//! # Responsibilities
//! - Own the current draft and the session state
//! - Run the open / edit / submit / cancel lifecycle against a [`ConfigService`]
//! - Allow at most one fetch or submit in flight
//! - Drop resolutions that arrive after the session moved on
//!
//! # Design Decisions
//! - State lives in one `ArcSwap<Snapshot>`; every transition swaps in a new
//!   snapshot with compare-and-swap, so readers never see a half-applied edit
//! - Begin transitions are synchronous, which makes the in-flight guard hold
//!   even when several callers race on the same controller
//! - Service calls happen outside any transition

use std::sync::Arc;

use arc_swap::ArcSwap;

use crate::controller::error::{ControllerError, RejectReason};
use crate::controller::state::{Operation, SessionState, Snapshot};
use crate::draft::{
    ConfigDraft, DraftValidator, FieldName, FieldValue, MethodRegistry, ValidationError,
};
use crate::observability::metrics;
use crate::service::{ConfigService, ServiceError};

/// Accepted edits remembered per session for [`DraftController::undo`].
pub const HISTORY_LIMIT: usize = 64;

enum Step<T> {
    Keep(T),
    Replace(Snapshot, T),
}

/// Sole owner and mutator of a [`ConfigDraft`].
pub struct DraftController {
    service: Arc<dyn ConfigService>,
    validator: DraftValidator,
    state: ArcSwap<Snapshot>,
}

impl DraftController {
    pub fn new(service: Arc<dyn ConfigService>, validator: DraftValidator) -> Self {
        Self {
            service,
            validator,
            state: ArcSwap::from_pointee(Snapshot::default()),
        }
    }

    /// Controller with the default validation policy over `registry`.
    pub fn with_registry(service: Arc<dyn ConfigService>, registry: Arc<MethodRegistry>) -> Self {
        Self::new(service, DraftValidator::new(registry, Default::default()))
    }

    pub fn snapshot(&self) -> Arc<Snapshot> {
        self.state.load_full()
    }

    pub fn session(&self) -> SessionState {
        self.state.load().session
    }

    pub fn draft(&self) -> Arc<ConfigDraft> {
        Arc::clone(&self.state.load().draft)
    }

    pub fn last_error(&self) -> Option<ControllerError> {
        self.state.load().last_error.clone()
    }

    pub fn validator(&self) -> &DraftValidator {
        &self.validator
    }

    /// Injected method catalog, for listing selectable methods.
    pub fn registry(&self) -> &MethodRegistry {
        self.validator.registry()
    }

    /// Fetch the stored configuration and start an editing session.
    ///
    /// Only valid from `Closed`. Fields the store omits keep their default
    /// values. On failure the session returns to `Closed` with the draft
    /// untouched and the error recorded.
    pub async fn open(&self) -> Result<Arc<ConfigDraft>, ControllerError> {
        let (generation, base) = self.transition(|current| {
            if current.session != SessionState::Closed {
                return Step::Keep(Err(ControllerError::InvalidState {
                    operation: Operation::Open,
                    session: current.session,
                }));
            }
            let next = Snapshot {
                session: SessionState::Loading,
                generation: current.generation + 1,
                last_error: None,
                ..current.clone()
            };
            let ticket = (next.generation, Arc::clone(&current.draft));
            Step::Replace(next, Ok(ticket))
        })?;

        tracing::debug!(generation, "Fetching configuration");

        match self.service.fetch().await {
            Ok(payload) => {
                let fetched = Arc::new(base.overlay(payload));
                if let Err(errors) = self.validator.check_draft(&fetched) {
                    tracing::warn!(
                        generation,
                        violations = errors.len(),
                        first = %errors[0],
                        "Fetched configuration does not satisfy every constraint"
                    );
                }
                self.resolve(Operation::Open, generation, SessionState::Loading, |current| {
                    Snapshot {
                        session: SessionState::Open,
                        draft: Arc::clone(&fetched),
                        history: Vec::new(),
                        last_error: None,
                        generation: current.generation,
                    }
                })?;
                tracing::info!(generation, methods = fetched.methods.len(), "Editing session opened");
                Ok(fetched)
            }
            Err(err) => {
                tracing::warn!(generation, error = %err, "Failed to open editing session");
                let failure = ControllerError::Fetch(err);
                self.resolve(Operation::Open, generation, SessionState::Loading, |current| {
                    Snapshot {
                        session: SessionState::Closed,
                        last_error: Some(failure.clone()),
                        ..current.clone()
                    }
                })?;
                Err(failure)
            }
        }
    }

    /// Validate and apply one edit given by wire field name.
    pub fn set_field(
        &self,
        name: &str,
        value: impl Into<FieldValue>,
    ) -> Result<Arc<ConfigDraft>, ControllerError> {
        let field = name
            .parse::<FieldName>()
            .map_err(|unknown| ControllerError::Field(ValidationError::UnknownField(unknown)))?;
        self.set(field, value)
    }

    /// Validate and apply one edit.
    ///
    /// A rejected value leaves the draft exactly as it was.
    pub fn set(
        &self,
        field: FieldName,
        value: impl Into<FieldValue>,
    ) -> Result<Arc<ConfigDraft>, ControllerError> {
        let session = self.session();
        if session != SessionState::Open {
            return Err(ControllerError::InvalidState {
                operation: Operation::SetField,
                session,
            });
        }

        let update = self.validator.check_field(field, &value.into()).map_err(|err| {
            tracing::debug!(field = %field, error = %err, "Rejected field edit");
            ControllerError::Field(err)
        })?;

        self.transition(|current| {
            if current.session != SessionState::Open {
                return Step::Keep(Err(ControllerError::InvalidState {
                    operation: Operation::SetField,
                    session: current.session,
                }));
            }
            let draft = Arc::new(current.draft.with(update.clone()));
            let mut history = current.history.clone();
            history.push(Arc::clone(&current.draft));
            if history.len() > HISTORY_LIMIT {
                history.remove(0);
            }
            let next = Snapshot {
                draft: Arc::clone(&draft),
                history,
                ..current.clone()
            };
            Step::Replace(next, Ok(draft))
        })
    }

    /// Restore the draft as it was before the last accepted edit.
    pub fn undo(&self) -> Result<Arc<ConfigDraft>, ControllerError> {
        self.transition(|current| {
            if current.session != SessionState::Open {
                return Step::Keep(Err(ControllerError::InvalidState {
                    operation: Operation::Undo,
                    session: current.session,
                }));
            }
            let mut history = current.history.clone();
            let Some(previous) = history.pop() else {
                return Step::Keep(Err(ControllerError::NothingToUndo));
            };
            let next = Snapshot {
                draft: Arc::clone(&previous),
                history,
                ..current.clone()
            };
            Step::Replace(next, Ok(previous))
        })
    }

    /// Validate the whole draft and offer it to the store.
    ///
    /// Refused while a call is in flight. Invalid drafts are reported before
    /// the session is checked and never reach the service. On success the session closes
    /// and the draft resets to defaults; otherwise the session reopens with
    /// the draft preserved and the rejection recorded.
    pub async fn submit(&self) -> Result<Arc<ConfigDraft>, ControllerError> {
        let (generation, draft) = self.transition(|current| {
            if current.session.is_transient() {
                return Step::Keep(Err(ControllerError::InvalidState {
                    operation: Operation::Submit,
                    session: current.session,
                }));
            }
            if let Err(errors) = self.validator.check_draft(&current.draft) {
                return Step::Keep(Err(ControllerError::Draft(errors)));
            }
            if current.session != SessionState::Open {
                return Step::Keep(Err(ControllerError::InvalidState {
                    operation: Operation::Submit,
                    session: current.session,
                }));
            }
            let next = Snapshot {
                session: SessionState::Submitting,
                generation: current.generation + 1,
                last_error: None,
                ..current.clone()
            };
            let ticket = (next.generation, Arc::clone(&current.draft));
            Step::Replace(next, Ok(ticket))
        })
        .inspect_err(|err| {
            if let ControllerError::Draft(errors) = err {
                tracing::debug!(violations = errors.len(), "Submit blocked by validation");
            }
        })?;

        tracing::debug!(generation, "Submitting configuration");

        let reason = match self.service.submit(&draft).await {
            Ok(reply) if reply.success => {
                self.resolve(Operation::Submit, generation, SessionState::Submitting, |current| {
                    Snapshot::closed(current.generation)
                })?;
                tracing::info!(generation, "Configuration submitted");
                return Ok(draft);
            }
            Ok(_) => RejectReason::Declined,
            Err(err) => RejectReason::Service(err),
        };

        tracing::warn!(generation, reason = %reason, "Submission did not take effect");
        let failure = ControllerError::SubmissionRejected { reason };
        self.resolve(Operation::Submit, generation, SessionState::Submitting, |current| {
            Snapshot {
                session: SessionState::Open,
                last_error: Some(failure.clone()),
                ..current.clone()
            }
        })?;
        Err(failure)
    }

    /// Discard the draft and close the session.
    ///
    /// Allowed while `Open` or `Loading`; a fetch still in flight is ignored
    /// when it resolves.
    pub fn cancel(&self) -> Result<(), ControllerError> {
        self.transition(|current| match current.session {
            SessionState::Open | SessionState::Loading => {
                Step::Replace(Snapshot::closed(current.generation + 1), Ok(()))
            }
            session => Step::Keep(Err(ControllerError::InvalidState {
                operation: Operation::Cancel,
                session,
            })),
        })?;
        tracing::info!("Editing session cancelled");
        Ok(())
    }

    /// Apply the outcome of a service call issued under `generation`.
    fn resolve<F>(
        &self,
        operation: Operation,
        generation: u64,
        expected: SessionState,
        settle: F,
    ) -> Result<(), ControllerError>
    where
        F: Fn(&Snapshot) -> Snapshot,
    {
        self.transition(|current| {
            if current.generation != generation || current.session != expected {
                tracing::debug!(
                    operation = %operation,
                    issued = generation,
                    current = current.generation,
                    "Discarding stale resolution"
                );
                return Step::Keep(Err(ControllerError::Superseded { operation }));
            }
            Step::Replace(settle(current), Ok(()))
        })
    }

    fn transition<T, F>(&self, mut step: F) -> T
    where
        F: FnMut(&Snapshot) -> Step<T>,
    {
        let mut current = self.state.load_full();
        loop {
            match step(&current) {
                Step::Keep(out) => return out,
                Step::Replace(next, out) => {
                    let from = current.session;
                    let to = next.session;
                    let next = Arc::new(next);
                    let previous = self.state.compare_and_swap(&current, next);
                    if Arc::ptr_eq(&*previous, &current) {
                        if from != to {
                            metrics::record_transition(from.as_str(), to.as_str());
                            tracing::debug!(from = %from, to = %to, "Session transition");
                        }
                        return out;
                    }
                    current = arc_swap::Guard::into_inner(previous);
                }
            }
        }
    }
}

impl std::fmt::Debug for DraftController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let snapshot = self.state.load();
        f.debug_struct("DraftController")
            .field("session", &snapshot.session)
            .field("generation", &snapshot.generation)
            .field("draft", &snapshot.draft)
            .finish()
    }
}

/// Service failure recorded by the last rejected submission, if any.
pub fn submission_failure(error: &ControllerError) -> Option<&ServiceError> {
    match error {
        ControllerError::SubmissionRejected {
            reason: RejectReason::Service(err),
        } => Some(err),
        _ => None,
    }
}
