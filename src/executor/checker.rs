//! Validations shared by the create and alter executors.

use std::collections::HashSet;

use super::RuleExecutionContext;
use super::statement::ReadwriteSplittingRuleSegment;
use crate::algorithm::AlgorithmCategory;
use crate::core::{Result, RuleError};
use crate::readwrite::RULE_TYPE;

/// Names appearing more than once, in first-repeat order.
fn duplicates<'a>(names: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut reported = HashSet::new();
    names
        .into_iter()
        .filter(|name| !seen.insert(*name) && reported.insert(*name))
        .map(str::to_string)
        .collect()
}

pub(super) fn check_duplicate_rule_names_in_statement(segments: &[ReadwriteSplittingRuleSegment]) -> Result<()> {
    let duplicated = duplicates(segments.iter().map(|each| each.name.as_str()));
    if !duplicated.is_empty() {
        return Err(RuleError::invalid_rule(
            RULE_TYPE,
            format!("Duplicate rule names `{}` in statement", duplicated.join(", ")),
        ));
    }
    Ok(())
}

/// Every referenced write/read source must be a storage unit, or a logical
/// data source exposed by a rule of another feature.
pub(super) fn check_data_sources_exist(
    segments: &[ReadwriteSplittingRuleSegment],
    ctx: &RuleExecutionContext<'_>,
) -> Result<()> {
    let referenced: Vec<String> = segments
        .iter()
        .flat_map(ReadwriteSplittingRuleSegment::referenced_data_sources)
        .collect();
    let mut missing = ctx.resources.not_existed_data_sources(&referenced);
    if missing.is_empty() {
        return Ok(());
    }

    let logical: HashSet<String> = ctx
        .rules
        .data_source_mapper_attributes()
        .into_iter()
        .filter(|(rule_type, _)| rule_type != RULE_TYPE)
        .flat_map(|(_, attribute)| {
            attribute
                .logical_data_source_names()
                .map(str::to_string)
                .collect::<Vec<_>>()
        })
        .collect();
    missing.retain(|name| !logical.contains(name));
    if !missing.is_empty() {
        return Err(RuleError::MissingRequiredStorageUnits {
            database: ctx.database_name.to_string(),
            names: missing,
        });
    }
    Ok(())
}

/// Write sources of current rules (minus `excluded` rule names) plus the
/// statement's must be pairwise distinct.
pub(super) fn check_duplicate_write_data_source_names(
    segments: &[ReadwriteSplittingRuleSegment],
    ctx: &RuleExecutionContext<'_>,
    excluded: &HashSet<&str>,
) -> Result<()> {
    let current = ctx
        .current
        .data_sources
        .iter()
        .filter(|each| !excluded.contains(each.name.as_str()))
        .map(|each| each.write_data_source_name.as_str());
    let declared = segments.iter().map(|each| each.write_data_source.as_str());
    let duplicated = duplicates(current.chain(declared).filter(|name| !name.is_empty()));
    if !duplicated.is_empty() {
        return Err(RuleError::invalid_rule(
            RULE_TYPE,
            format!("Duplicate write data source names `{}`", duplicated.join(", ")),
        ));
    }
    Ok(())
}

/// Read sources must be distinct inside each rule, and across the current
/// rules (minus `excluded`) and the statement.
pub(super) fn check_duplicate_read_data_source_names(
    segments: &[ReadwriteSplittingRuleSegment],
    ctx: &RuleExecutionContext<'_>,
    excluded: &HashSet<&str>,
) -> Result<()> {
    for each in segments {
        let duplicated = duplicates(each.read_data_sources.iter().map(String::as_str));
        if !duplicated.is_empty() {
            return Err(RuleError::invalid_rule(
                RULE_TYPE,
                format!(
                    "Duplicate read data source names `{}` in rule `{}`",
                    duplicated.join(", "),
                    each.name
                ),
            ));
        }
    }

    let current = ctx
        .current
        .data_sources
        .iter()
        .filter(|each| !excluded.contains(each.name.as_str()))
        .flat_map(|each| each.read_data_source_names.iter().map(String::as_str));
    let declared = segments
        .iter()
        .flat_map(|each| each.read_data_sources.iter().map(String::as_str));
    let duplicated = duplicates(current.chain(declared));
    if !duplicated.is_empty() {
        return Err(RuleError::invalid_rule(
            RULE_TYPE,
            format!("Duplicate read data source names `{}`", duplicated.join(", ")),
        ));
    }
    Ok(())
}

/// Every load balancer type named in the statement must be registered, and
/// must build from the props given with it.
pub(super) fn check_load_balancers(
    segments: &[ReadwriteSplittingRuleSegment],
    ctx: &RuleExecutionContext<'_>,
) -> Result<()> {
    let unregistered = duplicates_free(
        segments
            .iter()
            .filter_map(|each| each.load_balancer.as_ref())
            .map(|each| each.name.as_str())
            .filter(|name| !ctx.registry.contains(AlgorithmCategory::LoadBalancer, name)),
    );
    if !unregistered.is_empty() {
        return Err(RuleError::UnregisteredAlgorithm {
            category: AlgorithmCategory::LoadBalancer,
            names: unregistered,
            owner: ctx.database_name.to_string(),
        });
    }
    for each in segments {
        if let Some(algorithm) = &each.load_balancer {
            ctx.registry
                .resolve_load_balancer(&algorithm.name, &algorithm.props, &each.name)?;
        }
    }
    Ok(())
}

/// Load balancer names generated for the statement must be distinct, and
/// must not name an entry still used by a current rule outside `excluded`.
pub(super) fn check_load_balancer_names(
    segments: &[ReadwriteSplittingRuleSegment],
    ctx: &RuleExecutionContext<'_>,
    excluded: &HashSet<&str>,
) -> Result<()> {
    let generated: Vec<String> = segments
        .iter()
        .filter_map(|each| {
            each.load_balancer
                .as_ref()
                .map(|algorithm| load_balancer_name(&each.name, &algorithm.name))
        })
        .collect();
    let duplicated = duplicates(generated.iter().map(String::as_str));
    if !duplicated.is_empty() {
        return Err(RuleError::invalid_rule(
            RULE_TYPE,
            format!("Duplicate load balancer names `{}` in statement", duplicated.join(", ")),
        ));
    }

    let in_use: HashSet<&str> = ctx
        .current
        .data_sources
        .iter()
        .filter(|each| !excluded.contains(each.name.as_str()))
        .filter_map(|each| each.load_balancer_name.as_deref())
        .collect();
    let taken: Vec<String> = generated
        .into_iter()
        .filter(|name| in_use.contains(name.as_str()))
        .collect();
    if !taken.is_empty() {
        return Err(RuleError::invalid_rule(
            RULE_TYPE,
            format!("Load balancer names `{}` are already used by other rules", taken.join(", ")),
        ));
    }
    Ok(())
}

fn duplicates_free<'a>(names: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    let mut seen = HashSet::new();
    names
        .into_iter()
        .filter(|name| seen.insert(*name))
        .map(str::to_string)
        .collect()
}

/// Load balancer entry name generated for a rule, e.g. `readwrite_ds_random`.
pub(super) fn load_balancer_name(rule_name: &str, type_name: &str) -> String {
    format!("{}_{}", rule_name, type_name).to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicates() {
        assert_eq!(duplicates(["a", "b", "a", "c", "a", "b"]), vec!["a", "b"]);
        assert!(duplicates(["a", "b"]).is_empty());
    }

    #[test]
    fn test_load_balancer_name() {
        assert_eq!(load_balancer_name("Readwrite_DS", "ROUND_ROBIN"), "readwrite_ds_round_robin");
    }
}
