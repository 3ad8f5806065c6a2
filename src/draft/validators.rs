//! Field validators.
//!
//! # Responsibilities
//! - One total, side-effect-free check per draft field
//! - Turn loosely typed [`FieldValue`]s into typed [`FieldUpdate`]s
//! - Check a whole draft before it may leave the process
//!
//! # Design Decisions
//! - Numeric fields share one "integer >= bound" rule
//! - Enum fields share one "member of closed set" rule
//! - Whole-draft checks return every violation, not just the first

use std::collections::HashSet;
use std::sync::Arc;

use thiserror::Error;

use crate::draft::model::{
    BudgetType, ClosedSet, ConfigDraft, FieldName, FieldUpdate, FieldValue, MethodId, Metric,
    Selector, Tuner,
};
use crate::draft::registry::MethodRegistry;

/// A constraint violation, scoped to one field where possible.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field} must contain at least one element")]
    Empty { field: FieldName },

    #[error("{field} must not contain blank identifiers")]
    BlankIdentifier { field: FieldName },

    #[error("{field} contains `{method}`, which is not in the method registry")]
    UnregisteredMethod { field: FieldName, method: String },

    #[error("{field} must be >= {minimum}, got {actual}")]
    BelowMinimum {
        field: FieldName,
        minimum: i64,
        actual: i64,
    },

    #[error("{field} must be an integer, got `{actual}`")]
    NotAnInteger { field: FieldName, actual: String },

    #[error("{field} must be one of {allowed}, got `{actual}`")]
    NotAMember {
        field: FieldName,
        allowed: String,
        actual: String,
    },

    #[error("{field} expects a {expected} value, got {actual}")]
    WrongKind {
        field: FieldName,
        expected: &'static str,
        actual: &'static str,
    },

    #[error("unknown field `{0}`")]
    UnknownField(String),
}

impl ValidationError {
    /// Field the error is scoped to, if it names a known one.
    pub fn field(&self) -> Option<FieldName> {
        match self {
            ValidationError::Empty { field }
            | ValidationError::BlankIdentifier { field }
            | ValidationError::UnregisteredMethod { field, .. }
            | ValidationError::BelowMinimum { field, .. }
            | ValidationError::NotAnInteger { field, .. }
            | ValidationError::NotAMember { field, .. }
            | ValidationError::WrongKind { field, .. } => Some(*field),
            ValidationError::UnknownField(_) => None,
        }
    }
}

/// Knobs for checks that go beyond the field table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ValidationPolicy {
    /// Reject method identifiers the injected registry does not know.
    pub require_registered_methods: bool,
}

/// Non-empty set of non-blank identifiers; duplicates collapse to the first
/// occurrence.
pub fn methods(values: &[String]) -> Result<Vec<MethodId>, ValidationError> {
    if values.is_empty() {
        return Err(ValidationError::Empty {
            field: FieldName::Methods,
        });
    }
    let mut seen = HashSet::new();
    let mut accepted = Vec::with_capacity(values.len());
    for value in values {
        if value.trim().is_empty() {
            return Err(ValidationError::BlankIdentifier {
                field: FieldName::Methods,
            });
        }
        if seen.insert(value.as_str()) {
            accepted.push(MethodId::new(value.as_str()));
        }
    }
    Ok(accepted)
}

/// Every identifier must be present in `registry`.
pub fn registered(registry: &MethodRegistry, ids: &[MethodId]) -> Result<(), ValidationError> {
    match ids.iter().find(|id| !registry.contains(id.as_str())) {
        Some(unknown) => Err(ValidationError::UnregisteredMethod {
            field: FieldName::Methods,
            method: unknown.to_string(),
        }),
        None => Ok(()),
    }
}

/// `value >= minimum` for an integer field.
pub fn at_least(field: FieldName, value: i64, minimum: i64) -> Result<i64, ValidationError> {
    if value < minimum {
        return Err(ValidationError::BelowMinimum {
            field,
            minimum,
            actual: value,
        });
    }
    Ok(value)
}

/// `raw` must be one of the literals of `T`.
pub fn member_of<T: ClosedSet>(raw: &str) -> Result<T, ValidationError> {
    T::from_literal(raw).ok_or_else(|| ValidationError::NotAMember {
        field: T::FIELD,
        allowed: T::describe(),
        actual: raw.to_string(),
    })
}

fn integer(field: FieldName, value: &FieldValue) -> Result<i64, ValidationError> {
    match value {
        FieldValue::Integer(number) => Ok(*number),
        FieldValue::Text(raw) => raw
            .trim()
            .parse::<i64>()
            .map_err(|_| ValidationError::NotAnInteger {
                field,
                actual: raw.clone(),
            }),
        FieldValue::List(_) => Err(ValidationError::WrongKind {
            field,
            expected: "integer",
            actual: value.kind(),
        }),
    }
}

fn bounded(field: FieldName, value: &FieldValue) -> Result<i64, ValidationError> {
    let minimum = field.minimum().unwrap_or(i64::MIN);
    at_least(field, integer(field, value)?, minimum)
}

fn literal<T: ClosedSet>(value: &FieldValue) -> Result<T, ValidationError> {
    match value {
        FieldValue::Text(raw) => member_of::<T>(raw),
        other => Err(ValidationError::WrongKind {
            field: T::FIELD,
            expected: "text",
            actual: other.kind(),
        }),
    }
}

/// Applies the per-field rules plus the registry policy.
#[derive(Debug, Clone, Default)]
pub struct DraftValidator {
    registry: Arc<MethodRegistry>,
    policy: ValidationPolicy,
}

impl DraftValidator {
    pub fn new(registry: Arc<MethodRegistry>, policy: ValidationPolicy) -> Self {
        Self { registry, policy }
    }

    pub fn registry(&self) -> &MethodRegistry {
        &self.registry
    }

    pub fn policy(&self) -> ValidationPolicy {
        self.policy
    }

    /// Validate a candidate for a field given by its wire name.
    pub fn check_named(&self, name: &str, value: &FieldValue) -> Result<FieldUpdate, ValidationError> {
        let field = name
            .parse::<FieldName>()
            .map_err(ValidationError::UnknownField)?;
        self.check_field(field, value)
    }

    /// Validate a candidate for `field`, yielding the typed replacement.
    pub fn check_field(&self, field: FieldName, value: &FieldValue) -> Result<FieldUpdate, ValidationError> {
        match field {
            FieldName::Methods => {
                let FieldValue::List(values) = value else {
                    return Err(ValidationError::WrongKind {
                        field,
                        expected: "list",
                        actual: value.kind(),
                    });
                };
                let accepted = methods(values)?;
                if self.policy.require_registered_methods {
                    registered(&self.registry, &accepted)?;
                }
                Ok(FieldUpdate::Methods(accepted))
            }
            FieldName::Budget => bounded(field, value).map(FieldUpdate::Budget),
            FieldName::Priority => bounded(field, value).map(FieldUpdate::Priority),
            FieldName::RMinimum => bounded(field, value).map(FieldUpdate::RMinimum),
            FieldName::KWindow => bounded(field, value).map(FieldUpdate::KWindow),
            FieldName::Gridding => bounded(field, value).map(FieldUpdate::Gridding),
            FieldName::Metric => literal::<Metric>(value).map(FieldUpdate::Metric),
            FieldName::Selector => literal::<Selector>(value).map(FieldUpdate::Selector),
            FieldName::BudgetType => literal::<BudgetType>(value).map(FieldUpdate::BudgetType),
            FieldName::Tuner => literal::<Tuner>(value).map(FieldUpdate::Tuner),
        }
    }

    /// Check every constraint of a complete draft.
    ///
    /// Enum members are re-checked through their literals so a draft built
    /// outside the validators gets the same treatment as an edited one.
    pub fn check_draft(&self, draft: &ConfigDraft) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        let ids: Vec<String> = draft.methods.iter().map(|id| id.to_string()).collect();
        match methods(&ids) {
            Ok(accepted) => {
                if self.policy.require_registered_methods {
                    if let Err(err) = registered(&self.registry, &accepted) {
                        errors.push(err);
                    }
                }
            }
            Err(err) => errors.push(err),
        }

        let numeric = [
            (FieldName::Budget, draft.budget),
            (FieldName::Priority, draft.priority),
            (FieldName::RMinimum, draft.r_minimum),
            (FieldName::KWindow, draft.k_window),
            (FieldName::Gridding, draft.gridding),
        ];
        for (field, value) in numeric {
            if let Err(err) = bounded(field, &FieldValue::Integer(value)) {
                errors.push(err);
            }
        }

        let literals = [
            member_of::<Metric>(draft.metric.as_str()).err(),
            member_of::<Selector>(draft.selector.as_str()).err(),
            member_of::<BudgetType>(draft.budget_type.as_str()).err(),
            member_of::<Tuner>(draft.tuner.as_str()).err(),
        ];
        errors.extend(literals.into_iter().flatten());

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}
