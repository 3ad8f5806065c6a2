//! Errors surfaced by the draft controller.

use thiserror::Error;

use crate::controller::state::{Operation, SessionState};
use crate::draft::ValidationError;
use crate::service::ServiceError;

/// Why a submission did not take effect.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RejectReason {
    /// The store answered `{success: false}`.
    #[error("the store declined the draft")]
    Declined,

    #[error(transparent)]
    Service(ServiceError),
}

/// Every failure is recoverable; the controller stays usable afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ControllerError {
    #[error("cannot {operation} while the session is {session}")]
    InvalidState {
        operation: Operation,
        session: SessionState,
    },

    /// A single edit was rejected; the draft is unchanged.
    #[error(transparent)]
    Field(#[from] ValidationError),

    /// The whole draft failed validation before submit.
    #[error("draft is invalid: {}", join_messages(.0))]
    Draft(Vec<ValidationError>),

    #[error("failed to load configuration: {0}")]
    Fetch(ServiceError),

    #[error("submission did not take effect: {reason}")]
    SubmissionRejected { reason: RejectReason },

    /// The session moved on while the call was in flight; its result was dropped.
    #[error("{operation} was superseded by a later session change")]
    Superseded { operation: Operation },

    #[error("nothing to undo")]
    NothingToUndo,
}

impl ControllerError {
    /// Validation failures carried by this error, if any.
    pub fn validation_errors(&self) -> &[ValidationError] {
        match self {
            ControllerError::Field(err) => std::slice::from_ref(err),
            ControllerError::Draft(errors) => errors,
            _ => &[],
        }
    }
}

fn join_messages(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draft::FieldName;

    #[test]
    fn draft_error_lists_every_violation() {
        let err = ControllerError::Draft(vec![
            ValidationError::Empty {
                field: FieldName::Methods,
            },
            ValidationError::BelowMinimum {
                field: FieldName::Budget,
                minimum: 1,
                actual: 0,
            },
        ]);
        assert_eq!(
            err.to_string(),
            "draft is invalid: methods must contain at least one element; budget must be >= 1, got 0"
        );
        assert_eq!(err.validation_errors().len(), 2);
    }

    #[test]
    fn rejection_messages_name_the_cause() {
        let declined = ControllerError::SubmissionRejected {
            reason: RejectReason::Declined,
        };
        assert_eq!(
            declined.to_string(),
            "submission did not take effect: the store declined the draft"
        );

        let network = ControllerError::SubmissionRejected {
            reason: RejectReason::Service(ServiceError::Network("connection refused".into())),
        };
        assert!(network.to_string().contains("connection refused"));
        assert!(network.validation_errors().is_empty());
    }

    #[test]
    fn invalid_state_names_operation_and_session() {
        let err = ControllerError::InvalidState {
            operation: Operation::Submit,
            session: SessionState::Submitting,
        };
        assert_eq!(err.to_string(), "cannot submit while the session is submitting");
    }
}
