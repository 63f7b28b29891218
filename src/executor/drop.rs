use std::collections::{BTreeMap, HashSet};

use super::statement::{DropReadwriteSplittingRuleStatement, RuleStatement};
use super::{RuleDefinitionExecutor, RuleExecutionContext, unexpected_statement};
use crate::core::{Result, RuleError};
use crate::readwrite::{RULE_TYPE, ReadwriteSplittingRuleConfiguration};

pub struct DropReadwriteSplittingRuleExecutor;

impl DropReadwriteSplittingRuleExecutor {
    pub fn check_before_update(
        &self,
        stmt: &DropReadwriteSplittingRuleStatement,
        ctx: &RuleExecutionContext<'_>,
    ) -> Result<()> {
        if stmt.if_exists && !self.has_any_one_to_be_dropped(stmt, ctx.current) {
            return Ok(());
        }
        if !stmt.if_exists {
            let missing: Vec<String> = stmt
                .names
                .iter()
                .filter(|name| ctx.current.find_data_source(name).is_none())
                .cloned()
                .collect();
            if !missing.is_empty() {
                return Err(RuleError::MissingRequiredRule {
                    rule_type: RULE_TYPE.to_string(),
                    database: ctx.database_name.to_string(),
                    names: missing,
                });
            }
        }
        self.check_to_be_dropped_in_used(stmt, ctx)
    }

    /// A group is in use while any registered rule owns data nodes on it, or
    /// another feature maps one of its logical data sources onto it.
    fn check_to_be_dropped_in_used(
        &self,
        stmt: &DropReadwriteSplittingRuleStatement,
        ctx: &RuleExecutionContext<'_>,
    ) -> Result<()> {
        let data_nodes = ctx.rules.data_node_attributes();
        let mappers: Vec<_> = ctx
            .rules
            .data_source_mapper_attributes()
            .into_iter()
            .filter(|(rule_type, _)| rule_type != RULE_TYPE)
            .collect();

        let in_used: Vec<String> = stmt
            .names
            .iter()
            .filter(|name| ctx.current.find_data_source(name).is_some())
            .filter(|name| {
                data_nodes.iter().any(|(_, attribute)| attribute.references_data_source(name))
                    || mappers.iter().any(|(_, attribute)| attribute.references_data_source(name))
            })
            .cloned()
            .collect();
        if !in_used.is_empty() {
            return Err(RuleError::InUsedRule {
                rule_type: RULE_TYPE.to_string(),
                database: ctx.database_name.to_string(),
                names: in_used,
            });
        }
        Ok(())
    }

    pub fn has_any_one_to_be_dropped(
        &self,
        stmt: &DropReadwriteSplittingRuleStatement,
        current: &ReadwriteSplittingRuleConfiguration,
    ) -> bool {
        stmt.names
            .iter()
            .any(|name| current.find_data_source(name).is_some())
    }

    /// Fragment to remove: the named rules plus every load balancer left
    /// unreferenced by the surviving rules.
    pub fn build_to_be_dropped_rule_configuration(
        &self,
        stmt: &DropReadwriteSplittingRuleStatement,
        current: &ReadwriteSplittingRuleConfiguration,
    ) -> ReadwriteSplittingRuleConfiguration {
        let to_be_dropped: HashSet<&str> = stmt.names.iter().map(String::as_str).collect();
        let (dropped, remaining): (Vec<_>, Vec<_>) = current
            .data_sources
            .iter()
            .cloned()
            .partition(|each| to_be_dropped.contains(each.name.as_str()));

        let remaining = ReadwriteSplittingRuleConfiguration::new(remaining, BTreeMap::new());
        let load_balancers = current
            .load_balancers
            .iter()
            .filter(|(name, _)| !remaining.is_load_balancer_in_use(name))
            .map(|(name, algorithm)| (name.clone(), algorithm.clone()))
            .collect();
        ReadwriteSplittingRuleConfiguration::new(dropped, load_balancers)
    }

    /// What is left of `current` after the fragment is removed.
    pub fn build_to_be_altered_rule_configuration(
        &self,
        stmt: &DropReadwriteSplittingRuleStatement,
        current: &ReadwriteSplittingRuleConfiguration,
    ) -> ReadwriteSplittingRuleConfiguration {
        let to_be_dropped = self.build_to_be_dropped_rule_configuration(stmt, current);
        let mut result = current.clone();
        result
            .data_sources
            .retain(|each| to_be_dropped.find_data_source(&each.name).is_none());
        result
            .load_balancers
            .retain(|name, _| !to_be_dropped.load_balancers.contains_key(name));
        result
    }
}

impl RuleDefinitionExecutor for DropReadwriteSplittingRuleExecutor {
    fn name(&self) -> &'static str {
        "DROP_READWRITE_SPLITTING_RULE"
    }

    fn can_handle(&self, stmt: &RuleStatement) -> bool {
        matches!(stmt, RuleStatement::Drop(_))
    }

    fn check(&self, stmt: &RuleStatement, ctx: &RuleExecutionContext<'_>) -> Result<()> {
        let RuleStatement::Drop(drop) = stmt else {
            return Err(unexpected_statement(self.name(), stmt));
        };
        self.check_before_update(drop, ctx)
    }

    fn build(&self, stmt: &RuleStatement, ctx: &RuleExecutionContext<'_>) -> Result<ReadwriteSplittingRuleConfiguration> {
        let RuleStatement::Drop(drop) = stmt else {
            return Err(unexpected_statement(self.name(), stmt));
        };
        Ok(self.build_to_be_altered_rule_configuration(drop, ctx.current))
    }
}
