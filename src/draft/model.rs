//! Draft record, closed enum sets, and the loosely typed values accepted at
//! the editing boundary.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// A closed set of literal string values (one per enum field of the draft).
pub trait ClosedSet: Sized + Copy + 'static {
    /// Draft field holding values of this set.
    const FIELD: FieldName;

    /// Every member, in declaration order.
    fn all() -> &'static [Self];

    /// Wire literal for this member.
    fn as_str(self) -> &'static str;

    /// Exact, case-sensitive lookup of a wire literal.
    fn from_literal(raw: &str) -> Option<Self> {
        Self::all().iter().copied().find(|member| member.as_str() == raw)
    }

    /// `{a, b, c}` rendering used in error messages.
    fn describe() -> String {
        let members: Vec<&str> = Self::all().iter().map(|member| member.as_str()).collect();
        format!("{{{}}}", members.join(", "))
    }
}

macro_rules! closed_set {
    ($(#[$meta:meta])* $name:ident => $field:ident { $($variant:ident => $wire:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $($variant),+
        }

        impl ClosedSet for $name {
            const FIELD: FieldName = FieldName::$field;

            fn all() -> &'static [Self] {
                &[$($name::$variant),+]
            }

            fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $wire),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(ClosedSet::as_str(*self))
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(ClosedSet::as_str(*self))
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let raw = String::deserialize(deserializer)?;
                <$name as ClosedSet>::from_literal(&raw).ok_or_else(|| {
                    D::Error::custom(format!(
                        "{} must be one of {}, got `{}`",
                        <$name as ClosedSet>::FIELD,
                        <$name as ClosedSet>::describe(),
                        raw
                    ))
                })
            }
        }
    };
}

closed_set!(
    /// Score used to compare candidate classifiers.
    Metric => Metric {
        F1 => "f1",
        RocAuc => "roc_auc",
    }
);

closed_set!(
    /// Strategy for choosing the next hyperpartition to explore.
    Selector => Selector {
        Uniform => "uniform",
        Ucb1 => "ucb1",
        BestK => "bestk",
        BestKVel => "bestkvel",
        PureBestKVel => "purebestkvel",
        RecentK => "recentk",
        RecentKVel => "recentkvel",
        HierAlg => "hieralg",
    }
);

closed_set!(
    /// Unit in which `budget` is counted.
    BudgetType => BudgetType {
        None => "none",
        Classifier => "classifier",
        Walltime => "walltime",
    }
);

closed_set!(
    /// Hyperparameter tuner used inside a hyperpartition.
    Tuner => Tuner {
        Uniform => "uniform",
        Gp => "gp",
        GpEi => "gp_ei",
        GpEiVel => "gp_eivel",
    }
);

impl Default for Metric {
    fn default() -> Self {
        Metric::F1
    }
}

impl Default for Selector {
    fn default() -> Self {
        Selector::BestK
    }
}

impl Default for BudgetType {
    fn default() -> Self {
        BudgetType::Classifier
    }
}

impl Default for Tuner {
    fn default() -> Self {
        Tuner::Gp
    }
}

/// Identifier of a modelling method (e.g. `logreg`, `dt`).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MethodId(String);

impl MethodId {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MethodId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<&str> for MethodId {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

impl From<String> for MethodId {
    fn from(raw: String) -> Self {
        Self(raw)
    }
}

impl std::borrow::Borrow<str> for MethodId {
    fn borrow(&self) -> &str {
        self.as_str()
    }
}

/// One in-progress edit of the tuning configuration.
///
/// Values are never mutated in place once published; edits go through
/// [`ConfigDraft::with`], which returns a new record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigDraft {
    pub methods: Vec<MethodId>,
    pub budget: i64,
    pub priority: i64,
    pub r_minimum: i64,
    pub k_window: i64,
    pub gridding: i64,
    pub metric: Metric,
    pub selector: Selector,
    pub budget_type: BudgetType,
    pub tuner: Tuner,
}

impl Default for ConfigDraft {
    fn default() -> Self {
        Self {
            methods: Vec::new(),
            budget: 100,
            priority: 1,
            r_minimum: 2,
            k_window: 0,
            gridding: 0,
            metric: Metric::default(),
            selector: Selector::default(),
            budget_type: BudgetType::default(),
            tuner: Tuner::default(),
        }
    }
}

impl ConfigDraft {
    /// Copy of `self` with exactly one field replaced.
    pub fn with(&self, update: FieldUpdate) -> Self {
        let mut next = self.clone();
        match update {
            FieldUpdate::Methods(methods) => next.methods = methods,
            FieldUpdate::Budget(value) => next.budget = value,
            FieldUpdate::Priority(value) => next.priority = value,
            FieldUpdate::RMinimum(value) => next.r_minimum = value,
            FieldUpdate::KWindow(value) => next.k_window = value,
            FieldUpdate::Gridding(value) => next.gridding = value,
            FieldUpdate::Metric(value) => next.metric = value,
            FieldUpdate::Selector(value) => next.selector = value,
            FieldUpdate::BudgetType(value) => next.budget_type = value,
            FieldUpdate::Tuner(value) => next.tuner = value,
        }
        next
    }

    /// Copy of `self` with every field the payload provides taken from it.
    pub fn overlay(&self, payload: DraftPayload) -> Self {
        Self {
            methods: payload.methods.unwrap_or_else(|| self.methods.clone()),
            budget: payload.budget.unwrap_or(self.budget),
            priority: payload.priority.unwrap_or(self.priority),
            r_minimum: payload.r_minimum.unwrap_or(self.r_minimum),
            k_window: payload.k_window.unwrap_or(self.k_window),
            gridding: payload.gridding.unwrap_or(self.gridding),
            metric: payload.metric.unwrap_or(self.metric),
            selector: payload.selector.unwrap_or(self.selector),
            budget_type: payload.budget_type.unwrap_or(self.budget_type),
            tuner: payload.tuner.unwrap_or(self.tuner),
        }
    }
}

/// Wire form of a draft where every field may be absent.
///
/// Absent means "not provided", never "invalid".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DraftPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub methods: Option<Vec<MethodId>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub budget: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub r_minimum: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub k_window: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gridding: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metric: Option<Metric>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selector: Option<Selector>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub budget_type: Option<BudgetType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tuner: Option<Tuner>,
}

impl From<ConfigDraft> for DraftPayload {
    fn from(draft: ConfigDraft) -> Self {
        Self {
            methods: Some(draft.methods),
            budget: Some(draft.budget),
            priority: Some(draft.priority),
            r_minimum: Some(draft.r_minimum),
            k_window: Some(draft.k_window),
            gridding: Some(draft.gridding),
            metric: Some(draft.metric),
            selector: Some(draft.selector),
            budget_type: Some(draft.budget_type),
            tuner: Some(draft.tuner),
        }
    }
}

/// Name of an editable draft field, spelled as on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldName {
    Methods,
    Budget,
    Priority,
    RMinimum,
    KWindow,
    Gridding,
    Metric,
    Selector,
    BudgetType,
    Tuner,
}

impl FieldName {
    pub const ALL: [FieldName; 10] = [
        FieldName::Methods,
        FieldName::Budget,
        FieldName::Priority,
        FieldName::RMinimum,
        FieldName::KWindow,
        FieldName::Gridding,
        FieldName::Metric,
        FieldName::Selector,
        FieldName::BudgetType,
        FieldName::Tuner,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            FieldName::Methods => "methods",
            FieldName::Budget => "budget",
            FieldName::Priority => "priority",
            FieldName::RMinimum => "r_minimum",
            FieldName::KWindow => "k_window",
            FieldName::Gridding => "gridding",
            FieldName::Metric => "metric",
            FieldName::Selector => "selector",
            FieldName::BudgetType => "budget_type",
            FieldName::Tuner => "tuner",
        }
    }

    /// Inclusive lower bound for integer fields, `None` for the rest.
    pub fn minimum(self) -> Option<i64> {
        match self {
            FieldName::Budget | FieldName::Priority => Some(1),
            FieldName::RMinimum | FieldName::KWindow | FieldName::Gridding => Some(0),
            _ => None,
        }
    }
}

impl fmt::Display for FieldName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FieldName {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        FieldName::ALL
            .iter()
            .copied()
            .find(|field| field.as_str() == raw)
            .ok_or_else(|| raw.to_string())
    }
}

/// Untyped candidate value for a field, as a view or CLI hands it over.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    List(Vec<String>),
    Integer(i64),
    Text(String),
}

impl FieldValue {
    /// Interpret raw command-line text for `field`.
    ///
    /// Lists are comma separated; text that does not parse as an integer for
    /// a numeric field is kept as text so the validator can reject it.
    pub fn parse_for(field: FieldName, raw: &str) -> Self {
        match field {
            FieldName::Methods => FieldValue::List(
                raw.split(',')
                    .map(str::trim)
                    .filter(|item| !item.is_empty())
                    .map(str::to_string)
                    .collect(),
            ),
            _ if field.minimum().is_some() => match raw.trim().parse::<i64>() {
                Ok(value) => FieldValue::Integer(value),
                Err(_) => FieldValue::Text(raw.to_string()),
            },
            _ => FieldValue::Text(raw.trim().to_string()),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            FieldValue::List(_) => "list",
            FieldValue::Integer(_) => "integer",
            FieldValue::Text(_) => "text",
        }
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Integer(value)
    }
}

impl From<i32> for FieldValue {
    fn from(value: i32) -> Self {
        FieldValue::Integer(i64::from(value))
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<Vec<String>> for FieldValue {
    fn from(values: Vec<String>) -> Self {
        FieldValue::List(values)
    }
}

impl From<Vec<&str>> for FieldValue {
    fn from(values: Vec<&str>) -> Self {
        FieldValue::List(values.into_iter().map(str::to_string).collect())
    }
}

impl<const N: usize> From<[&str; N]> for FieldValue {
    fn from(values: [&str; N]) -> Self {
        FieldValue::List(values.iter().map(|value| value.to_string()).collect())
    }
}

/// A validated, typed replacement for exactly one draft field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldUpdate {
    Methods(Vec<MethodId>),
    Budget(i64),
    Priority(i64),
    RMinimum(i64),
    KWindow(i64),
    Gridding(i64),
    Metric(Metric),
    Selector(Selector),
    BudgetType(BudgetType),
    Tuner(Tuner),
}
