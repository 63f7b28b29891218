use std::fmt;

use crate::core::Properties;
use crate::readwrite::TransactionalReadQueryStrategy;

/// `TYPE(NAME=..., PROPERTIES(...))` as produced by the statement parser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlgorithmSegment {
    pub name: String,
    pub props: Properties,
}

impl AlgorithmSegment {
    pub fn new(name: impl Into<String>, props: Properties) -> Self {
        Self {
            name: name.into(),
            props,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadwriteSplittingRuleSegment {
    pub name: String,
    pub write_data_source: String,
    pub read_data_sources: Vec<String>,
    pub load_balancer: Option<AlgorithmSegment>,
    pub transactional_read_query_strategy: Option<TransactionalReadQueryStrategy>,
}

impl ReadwriteSplittingRuleSegment {
    pub fn new(
        name: impl Into<String>,
        write_data_source: impl Into<String>,
        read_data_sources: Vec<String>,
        load_balancer: Option<AlgorithmSegment>,
    ) -> Self {
        Self {
            name: name.into(),
            write_data_source: write_data_source.into(),
            read_data_sources,
            load_balancer,
            transactional_read_query_strategy: None,
        }
    }

    pub fn with_transactional_read_query_strategy(mut self, strategy: TransactionalReadQueryStrategy) -> Self {
        self.transactional_read_query_strategy = Some(strategy);
        self
    }

    /// Write source (when present) followed by the read sources.
    pub fn referenced_data_sources(&self) -> Vec<String> {
        let mut result = Vec::with_capacity(self.read_data_sources.len() + 1);
        if !self.write_data_source.is_empty() {
            result.push(self.write_data_source.clone());
        }
        result.extend(self.read_data_sources.iter().cloned());
        result
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateReadwriteSplittingRuleStatement {
    pub if_not_exists: bool,
    pub rules: Vec<ReadwriteSplittingRuleSegment>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlterReadwriteSplittingRuleStatement {
    pub rules: Vec<ReadwriteSplittingRuleSegment>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DropReadwriteSplittingRuleStatement {
    pub if_exists: bool,
    pub names: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleStatement {
    Create(CreateReadwriteSplittingRuleStatement),
    Alter(AlterReadwriteSplittingRuleStatement),
    Drop(DropReadwriteSplittingRuleStatement),
}

impl fmt::Display for RuleStatement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (verb, names) = match self {
            RuleStatement::Create(stmt) => ("CREATE", stmt.rules.iter().map(|each| each.name.as_str()).collect::<Vec<_>>()),
            RuleStatement::Alter(stmt) => ("ALTER", stmt.rules.iter().map(|each| each.name.as_str()).collect()),
            RuleStatement::Drop(stmt) => ("DROP", stmt.names.iter().map(String::as_str).collect()),
        };
        write!(f, "{} READWRITE_SPLITTING RULE {}", verb, names.join(", "))
    }
}

impl From<CreateReadwriteSplittingRuleStatement> for RuleStatement {
    fn from(stmt: CreateReadwriteSplittingRuleStatement) -> Self {
        RuleStatement::Create(stmt)
    }
}

impl From<AlterReadwriteSplittingRuleStatement> for RuleStatement {
    fn from(stmt: AlterReadwriteSplittingRuleStatement) -> Self {
        RuleStatement::Alter(stmt)
    }
}

impl From<DropReadwriteSplittingRuleStatement> for RuleStatement {
    fn from(stmt: DropReadwriteSplittingRuleStatement) -> Self {
        RuleStatement::Drop(stmt)
    }
}
