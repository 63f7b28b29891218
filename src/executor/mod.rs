pub mod alter;
mod checker;
pub mod context;
pub mod create;
pub mod drop;
pub mod executor;
pub mod statement;

pub use alter::AlterReadwriteSplittingRuleExecutor;
pub use context::RuleExecutionContext;
pub use create::CreateReadwriteSplittingRuleExecutor;
pub use drop::DropReadwriteSplittingRuleExecutor;
pub use executor::{RuleDefinitionExecutor, RuleExecutorPipeline};
pub use statement::{
    AlgorithmSegment, AlterReadwriteSplittingRuleStatement, CreateReadwriteSplittingRuleStatement,
    DropReadwriteSplittingRuleStatement, ReadwriteSplittingRuleSegment, RuleStatement,
};

use crate::core::RuleError;

pub(crate) fn unexpected_statement(executor: &str, stmt: &RuleStatement) -> RuleError {
    RuleError::Configuration(format!("{} cannot execute '{}'", executor, stmt))
}
