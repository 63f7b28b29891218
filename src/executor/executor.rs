use tracing::{Level, event, info_span};

use super::RuleExecutionContext;
use super::alter::AlterReadwriteSplittingRuleExecutor;
use super::create::CreateReadwriteSplittingRuleExecutor;
use super::drop::DropReadwriteSplittingRuleExecutor;
use super::statement::RuleStatement;
use crate::core::{Result, RuleError};
use crate::readwrite::ReadwriteSplittingRuleConfiguration;

pub trait RuleDefinitionExecutor: Send + Sync {
    /// Executor name for debugging
    fn name(&self) -> &'static str;

    fn can_handle(&self, stmt: &RuleStatement) -> bool;

    /// Validates the statement against the context without changing anything.
    fn check(&self, stmt: &RuleStatement, ctx: &RuleExecutionContext<'_>) -> Result<()>;

    /// Full configuration that replaces `ctx.current` once committed.
    fn build(&self, stmt: &RuleStatement, ctx: &RuleExecutionContext<'_>) -> Result<ReadwriteSplittingRuleConfiguration>;

    fn execute(&self, stmt: &RuleStatement, ctx: &RuleExecutionContext<'_>) -> Result<ReadwriteSplittingRuleConfiguration> {
        self.check(stmt, ctx)?;
        self.build(stmt, ctx)
    }
}

pub struct RuleExecutorPipeline {
    executors: Vec<Box<dyn RuleDefinitionExecutor>>,
}

impl RuleExecutorPipeline {
    pub fn new() -> Self {
        Self {
            executors: Vec::new(),
        }
    }

    pub fn register(&mut self, executor: Box<dyn RuleDefinitionExecutor>) {
        self.executors.push(executor);
    }

    /// Pipeline with the create/alter/drop executors registered
    pub fn with_default_executors() -> Self {
        let mut pipeline = Self::new();
        pipeline.register(Box::new(CreateReadwriteSplittingRuleExecutor));
        pipeline.register(Box::new(AlterReadwriteSplittingRuleExecutor));
        pipeline.register(Box::new(DropReadwriteSplittingRuleExecutor));
        pipeline
    }

    pub fn list_executors(&self) -> Vec<&str> {
        self.executors.iter().map(|e| e.name()).collect()
    }

    /// Runs the first executor that accepts the statement. Nothing is
    /// committed here; the caller swaps the returned configuration in.
    pub fn execute(
        &self,
        stmt: &RuleStatement,
        ctx: &RuleExecutionContext<'_>,
    ) -> Result<ReadwriteSplittingRuleConfiguration> {
        let span = info_span!(
            "rule_update",
            database = %ctx.database_name,
            statement = %stmt
        );
        let _enter = span.enter();

        let executor = self
            .executors
            .iter()
            .find(|executor| executor.can_handle(stmt))
            .ok_or_else(|| RuleError::Configuration(format!("No executor found for statement '{}'", stmt)))?;

        match executor.execute(stmt, ctx) {
            Ok(configuration) => {
                event!(
                    Level::DEBUG,
                    executor = executor.name(),
                    rules = configuration.data_sources.len(),
                    "rule update accepted"
                );
                Ok(configuration)
            }
            Err(err) => {
                event!(Level::WARN, executor = executor.name(), error = %err, "rule update rejected");
                Err(err)
            }
        }
    }
}

impl Default for RuleExecutorPipeline {
    fn default() -> Self {
        Self::with_default_executors()
    }
}
