use std::fmt;

use thiserror::Error;

use crate::algorithm::AlgorithmCategory;

/// Discriminant of [`RuleError`] so callers can branch without matching fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    UnregisteredAlgorithm,
    MissingRequiredRule,
    MissingRequiredStorageUnits,
    InvalidRuleConfiguration,
    InUsedRule,
    AlgorithmInitialization,
    UnsupportedShardingValue,
    NoAvailableReadSource,
    Configuration,
    Lock,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RuleError {
    #[error("'{category}' algorithm '{}' on {owner} {} unregistered", .names.join(", "), plural(.names))]
    UnregisteredAlgorithm {
        category: AlgorithmCategory,
        names: Vec<String>,
        owner: String,
    },

    #[error("{rule_type} rule '{}' in database '{database}' does not exist", .names.join(", "))]
    MissingRequiredRule {
        rule_type: String,
        database: String,
        names: Vec<String>,
    },

    #[error("Storage units '{}' do not exist in database '{database}'", .names.join(", "))]
    MissingRequiredStorageUnits { database: String, names: Vec<String> },

    #[error("Invalid {rule_type} rule configuration: {reason}")]
    InvalidRuleConfiguration { rule_type: String, reason: String },

    #[error("{rule_type} rule '{}' in database '{database}' is still in used", .names.join(", "))]
    InUsedRule {
        rule_type: String,
        database: String,
        names: Vec<String>,
    },

    #[error("'{algorithm_type}' algorithm initialization failed: {reason}")]
    AlgorithmInitialization {
        algorithm_type: String,
        reason: String,
    },

    #[error("'{algorithm_type}' algorithm cannot shard {value_type} value '{value}'")]
    UnsupportedShardingValue {
        algorithm_type: String,
        value_type: String,
        value: String,
    },

    #[error("No available read data source for readwrite-splitting rule '{rule}'")]
    NoAvailableReadSource { rule: String },

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Lock error: {0}")]
    LockError(String),
}

fn plural(names: &[String]) -> &'static str {
    if names.len() > 1 { "are" } else { "is" }
}

impl RuleError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::UnregisteredAlgorithm { .. } => ErrorKind::UnregisteredAlgorithm,
            Self::MissingRequiredRule { .. } => ErrorKind::MissingRequiredRule,
            Self::MissingRequiredStorageUnits { .. } => ErrorKind::MissingRequiredStorageUnits,
            Self::InvalidRuleConfiguration { .. } => ErrorKind::InvalidRuleConfiguration,
            Self::InUsedRule { .. } => ErrorKind::InUsedRule,
            Self::AlgorithmInitialization { .. } => ErrorKind::AlgorithmInitialization,
            Self::UnsupportedShardingValue { .. } => ErrorKind::UnsupportedShardingValue,
            Self::NoAvailableReadSource { .. } => ErrorKind::NoAvailableReadSource,
            Self::Configuration(_) => ErrorKind::Configuration,
            Self::LockError(_) => ErrorKind::Lock,
        }
    }

    pub(crate) fn algorithm_init(algorithm_type: &str, reason: impl fmt::Display) -> Self {
        Self::AlgorithmInitialization {
            algorithm_type: algorithm_type.to_string(),
            reason: reason.to_string(),
        }
    }

    pub(crate) fn invalid_rule(rule_type: &str, reason: impl fmt::Display) -> Self {
        Self::InvalidRuleConfiguration {
            rule_type: rule_type.to_string(),
            reason: reason.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, RuleError>;

impl<T> From<std::sync::PoisonError<T>> for RuleError {
    fn from(err: std::sync::PoisonError<T>) -> Self {
        Self::LockError(err.to_string())
    }
}
