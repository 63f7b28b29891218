use std::collections::HashSet;

use super::checker::{
    check_data_sources_exist, check_duplicate_read_data_source_names, check_duplicate_rule_names_in_statement,
    check_duplicate_write_data_source_names, check_load_balancer_names, check_load_balancers,
};
use super::create::build_rule_configuration;
use super::statement::{AlterReadwriteSplittingRuleStatement, RuleStatement};
use super::{RuleDefinitionExecutor, RuleExecutionContext, unexpected_statement};
use crate::core::{Result, RuleError};
use crate::readwrite::{RULE_TYPE, ReadwriteSplittingRuleConfiguration};

pub struct AlterReadwriteSplittingRuleExecutor;

impl AlterReadwriteSplittingRuleExecutor {
    pub fn check_before_update(
        &self,
        stmt: &AlterReadwriteSplittingRuleStatement,
        ctx: &RuleExecutionContext<'_>,
    ) -> Result<()> {
        check_duplicate_rule_names_in_statement(&stmt.rules)?;
        let missing: Vec<String> = stmt
            .rules
            .iter()
            .filter(|each| ctx.current.find_data_source(&each.name).is_none())
            .map(|each| each.name.clone())
            .collect();
        if !missing.is_empty() {
            return Err(RuleError::MissingRequiredRule {
                rule_type: RULE_TYPE.to_string(),
                database: ctx.database_name.to_string(),
                names: missing,
            });
        }

        check_data_sources_exist(&stmt.rules, ctx)?;
        let altered: HashSet<&str> = stmt.rules.iter().map(|each| each.name.as_str()).collect();
        check_duplicate_write_data_source_names(&stmt.rules, ctx, &altered)?;
        check_duplicate_read_data_source_names(&stmt.rules, ctx, &altered)?;
        check_load_balancers(&stmt.rules, ctx)?;
        check_load_balancer_names(&stmt.rules, ctx, &altered)
    }

    /// Configuration fragment holding the replacement rules.
    pub fn build_to_be_altered_rule_configuration(
        &self,
        stmt: &AlterReadwriteSplittingRuleStatement,
    ) -> ReadwriteSplittingRuleConfiguration {
        build_rule_configuration(&stmt.rules)
    }

    /// Replaces each altered rule wholesale and drops load balancers that
    /// nothing references any more.
    pub fn update_current_rule_configuration(
        &self,
        current: &ReadwriteSplittingRuleConfiguration,
        to_be_altered: ReadwriteSplittingRuleConfiguration,
    ) -> ReadwriteSplittingRuleConfiguration {
        let mut result = current.clone();
        let mut previous_load_balancers = Vec::new();
        for each in to_be_altered.data_sources {
            if let Some(slot) = result.data_sources.iter_mut().find(|current| current.name == each.name) {
                if let Some(previous) = slot.load_balancer_name.take() {
                    previous_load_balancers.push(previous);
                }
                *slot = each;
            }
        }
        result.load_balancers.extend(to_be_altered.load_balancers);
        for name in previous_load_balancers {
            if !result.is_load_balancer_in_use(&name) {
                result.load_balancers.remove(&name);
            }
        }
        result
    }
}

impl RuleDefinitionExecutor for AlterReadwriteSplittingRuleExecutor {
    fn name(&self) -> &'static str {
        "ALTER_READWRITE_SPLITTING_RULE"
    }

    fn can_handle(&self, stmt: &RuleStatement) -> bool {
        matches!(stmt, RuleStatement::Alter(_))
    }

    fn check(&self, stmt: &RuleStatement, ctx: &RuleExecutionContext<'_>) -> Result<()> {
        let RuleStatement::Alter(alter) = stmt else {
            return Err(unexpected_statement(self.name(), stmt));
        };
        self.check_before_update(alter, ctx)
    }

    fn build(&self, stmt: &RuleStatement, ctx: &RuleExecutionContext<'_>) -> Result<ReadwriteSplittingRuleConfiguration> {
        let RuleStatement::Alter(alter) = stmt else {
            return Err(unexpected_statement(self.name(), stmt));
        };
        let to_be_altered = self.build_to_be_altered_rule_configuration(alter);
        Ok(self.update_current_rule_configuration(ctx.current, to_be_altered))
    }
}
