use std::collections::{BTreeMap, HashSet};

use super::checker::{
    check_data_sources_exist, check_duplicate_read_data_source_names, check_duplicate_rule_names_in_statement,
    check_duplicate_write_data_source_names, check_load_balancer_names, check_load_balancers, load_balancer_name,
};
use super::statement::{CreateReadwriteSplittingRuleStatement, ReadwriteSplittingRuleSegment, RuleStatement};
use super::{RuleDefinitionExecutor, RuleExecutionContext, unexpected_statement};
use crate::core::{AlgorithmConfiguration, Result, RuleError};
use crate::readwrite::{
    RULE_TYPE, ReadwriteSplittingDataSourceRuleConfiguration, ReadwriteSplittingRuleConfiguration,
};

pub struct CreateReadwriteSplittingRuleExecutor;

impl CreateReadwriteSplittingRuleExecutor {
    /// Segments that will actually be created; with `IF NOT EXISTS`, rules
    /// already present are skipped.
    fn effective_segments(
        stmt: &CreateReadwriteSplittingRuleStatement,
        ctx: &RuleExecutionContext<'_>,
    ) -> Vec<ReadwriteSplittingRuleSegment> {
        stmt.rules
            .iter()
            .filter(|each| !stmt.if_not_exists || ctx.current.find_data_source(&each.name).is_none())
            .cloned()
            .collect()
    }

    pub fn check_before_update(
        &self,
        stmt: &CreateReadwriteSplittingRuleStatement,
        ctx: &RuleExecutionContext<'_>,
    ) -> Result<()> {
        check_duplicate_rule_names_in_statement(&stmt.rules)?;
        if !stmt.if_not_exists {
            let existing: Vec<String> = stmt
                .rules
                .iter()
                .filter(|each| ctx.current.find_data_source(&each.name).is_some())
                .map(|each| each.name.clone())
                .collect();
            if !existing.is_empty() {
                return Err(RuleError::invalid_rule(
                    RULE_TYPE,
                    format!(
                        "Duplicate rule names `{}` in database `{}`",
                        existing.join(", "),
                        ctx.database_name
                    ),
                ));
            }
        }

        let segments = Self::effective_segments(stmt, ctx);
        let clashing: Vec<String> = segments
            .iter()
            .filter(|each| ctx.resources.contains_storage_unit(&each.name))
            .map(|each| each.name.clone())
            .collect();
        if !clashing.is_empty() {
            return Err(RuleError::invalid_rule(
                RULE_TYPE,
                format!("Rule names `{}` are already used by storage units", clashing.join(", ")),
            ));
        }

        check_data_sources_exist(&segments, ctx)?;
        let excluded = HashSet::new();
        check_duplicate_write_data_source_names(&segments, ctx, &excluded)?;
        check_duplicate_read_data_source_names(&segments, ctx, &excluded)?;
        check_load_balancers(&segments, ctx)?;
        check_load_balancer_names(&segments, ctx, &excluded)
    }

    /// Configuration fragment holding only the rules to be added.
    pub fn build_to_be_created_rule_configuration(
        &self,
        stmt: &CreateReadwriteSplittingRuleStatement,
        ctx: &RuleExecutionContext<'_>,
    ) -> ReadwriteSplittingRuleConfiguration {
        build_rule_configuration(&Self::effective_segments(stmt, ctx))
    }
}

/// Turns statement segments into configuration, naming each load balancer
/// after its rule.
pub(super) fn build_rule_configuration(segments: &[ReadwriteSplittingRuleSegment]) -> ReadwriteSplittingRuleConfiguration {
    let mut data_sources = Vec::with_capacity(segments.len());
    let mut load_balancers = BTreeMap::new();
    for each in segments {
        let load_balancer = each.load_balancer.as_ref().map(|algorithm| {
            let name = load_balancer_name(&each.name, &algorithm.name);
            load_balancers.insert(
                name.clone(),
                AlgorithmConfiguration::new(algorithm.name.clone(), algorithm.props.clone()),
            );
            name
        });
        let mut data_source = ReadwriteSplittingDataSourceRuleConfiguration::new(
            each.name.clone(),
            each.write_data_source.clone(),
            each.read_data_sources.clone(),
            load_balancer,
        );
        data_source.transactional_read_query_strategy = each.transactional_read_query_strategy;
        data_sources.push(data_source);
    }
    ReadwriteSplittingRuleConfiguration::new(data_sources, load_balancers)
}

impl RuleDefinitionExecutor for CreateReadwriteSplittingRuleExecutor {
    fn name(&self) -> &'static str {
        "CREATE_READWRITE_SPLITTING_RULE"
    }

    fn can_handle(&self, stmt: &RuleStatement) -> bool {
        matches!(stmt, RuleStatement::Create(_))
    }

    fn check(&self, stmt: &RuleStatement, ctx: &RuleExecutionContext<'_>) -> Result<()> {
        let RuleStatement::Create(create) = stmt else {
            return Err(unexpected_statement(self.name(), stmt));
        };
        self.check_before_update(create, ctx)
    }

    fn build(&self, stmt: &RuleStatement, ctx: &RuleExecutionContext<'_>) -> Result<ReadwriteSplittingRuleConfiguration> {
        let RuleStatement::Create(create) = stmt else {
            return Err(unexpected_statement(self.name(), stmt));
        };
        let to_be_created = self.build_to_be_created_rule_configuration(create, ctx);
        let mut result = ctx.current.clone();
        result.data_sources.extend(to_be_created.data_sources);
        result.load_balancers.extend(to_be_created.load_balancers);
        Ok(result)
    }
}
