use crate::algorithm::AlgorithmRegistry;
use crate::metadata::{ResourceMetadata, RuleMetadata};
use crate::readwrite::ReadwriteSplittingRuleConfiguration;

/// Consistent snapshot an executor validates and builds against.
pub struct RuleExecutionContext<'a> {
    pub database_name: &'a str,
    pub current: &'a ReadwriteSplittingRuleConfiguration,
    pub resources: &'a dyn ResourceMetadata,
    pub rules: &'a dyn RuleMetadata,
    pub registry: &'a AlgorithmRegistry,
}

impl<'a> RuleExecutionContext<'a> {
    pub fn new(
        database_name: &'a str,
        current: &'a ReadwriteSplittingRuleConfiguration,
        resources: &'a dyn ResourceMetadata,
        rules: &'a dyn RuleMetadata,
        registry: &'a AlgorithmRegistry,
    ) -> Self {
        Self {
            database_name,
            current,
            resources,
            rules,
            registry,
        }
    }
}
