use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

use log::info;

use super::config::{
    ReadwriteSplittingDataSourceRuleConfiguration, ReadwriteSplittingRuleConfiguration,
    TransactionalReadQueryStrategy,
};
use super::load_balance::LoadBalanceAlgorithm;
use crate::algorithm::{AlgorithmCategory, AlgorithmRegistry};
use crate::config::RuleEngineConfig;
use crate::core::{Result, RuleError};
use crate::metadata::{DataSourceMapperRuleAttribute, DatabaseRule, RuleAttribute};

pub const RULE_TYPE: &str = "readwrite_splitting";

/// Runtime view of one data-source group.
///
/// The disabled set is written by an external health checker and read on
/// every routing decision. Writers swap in a new persistent set; readers take
/// a cheap snapshot and never wait on a write. A reader may see the set as it
/// was one decision earlier.
pub struct ReadwriteSplittingDataSourceRule {
    configuration: ReadwriteSplittingDataSourceRuleConfiguration,
    transactional_read_query_strategy: TransactionalReadQueryStrategy,
    load_balancer: Arc<dyn LoadBalanceAlgorithm>,
    disabled_data_source_names: RwLock<im::HashSet<String>>,
}

impl ReadwriteSplittingDataSourceRule {
    pub fn new(
        configuration: ReadwriteSplittingDataSourceRuleConfiguration,
        transactional_read_query_strategy: TransactionalReadQueryStrategy,
        load_balancer: Arc<dyn LoadBalanceAlgorithm>,
    ) -> Self {
        Self {
            configuration,
            transactional_read_query_strategy,
            load_balancer,
            disabled_data_source_names: RwLock::new(im::HashSet::new()),
        }
    }

    pub fn name(&self) -> &str {
        &self.configuration.name
    }

    pub fn write_data_source_name(&self) -> &str {
        &self.configuration.write_data_source_name
    }

    pub fn read_data_source_names(&self) -> &[String] {
        &self.configuration.read_data_source_names
    }

    pub fn configuration(&self) -> &ReadwriteSplittingDataSourceRuleConfiguration {
        &self.configuration
    }

    pub fn transactional_read_query_strategy(&self) -> TransactionalReadQueryStrategy {
        self.transactional_read_query_strategy
    }

    pub fn load_balancer(&self) -> &Arc<dyn LoadBalanceAlgorithm> {
        &self.load_balancer
    }

    /// Marks `data_source_name` disabled or enabled again.
    ///
    /// Idempotent, and the name is not checked against the read sources.
    pub fn update_disabled_data_source_names(&self, data_source_name: &str, disabled: bool) {
        let mut guard = self
            .disabled_data_source_names
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        let changed = if disabled {
            guard.insert(data_source_name.to_string()).is_none()
        } else {
            guard.remove(data_source_name).is_some()
        };
        if changed {
            info!(
                "Read data source '{}' of '{}' is now {}",
                data_source_name,
                self.name(),
                if disabled { "disabled" } else { "enabled" }
            );
        }
    }

    pub fn disabled_data_source_names(&self) -> im::HashSet<String> {
        self.disabled_data_source_names
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// `candidates` minus every disabled name, order kept. Can be empty.
    pub fn filter(&self, candidates: &[String]) -> Vec<String> {
        let disabled = self.disabled_data_source_names();
        candidates
            .iter()
            .filter(|name| !disabled.contains(name.as_str()))
            .cloned()
            .collect()
    }

    pub fn enabled_read_data_source_names(&self) -> Vec<String> {
        self.filter(self.read_data_source_names())
    }

    /// Delegates to the load balancer. `enabled_read_data_source_names` must
    /// not be empty; the routing layer sends the read to the write source
    /// instead.
    pub fn select_read_source(&self, enabled_read_data_source_names: &[String]) -> Result<String> {
        self.load_balancer
            .target_name(self.name(), enabled_read_data_source_names)
    }
}

impl fmt::Debug for ReadwriteSplittingDataSourceRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReadwriteSplittingDataSourceRule")
            .field("configuration", &self.configuration)
            .field("transactional_read_query_strategy", &self.transactional_read_query_strategy)
            .field("load_balancer", &self.load_balancer.type_name())
            .field("disabled_data_source_names", &self.disabled_data_source_names())
            .finish()
    }
}

/// Runtime rule for a whole logical database, rebuilt after every
/// configuration change.
pub struct ReadwriteSplittingRule {
    configuration: ReadwriteSplittingRuleConfiguration,
    data_source_rules: HashMap<String, Arc<ReadwriteSplittingDataSourceRule>>,
}

impl ReadwriteSplittingRule {
    pub fn new(
        configuration: ReadwriteSplittingRuleConfiguration,
        registry: &AlgorithmRegistry,
        engine_config: &RuleEngineConfig,
    ) -> Result<Self> {
        let mut load_balancers: HashMap<&str, Arc<dyn LoadBalanceAlgorithm>> = HashMap::new();
        for (name, algorithm) in &configuration.load_balancers {
            let resolved = registry.resolve_load_balancer(algorithm.algorithm_type(), algorithm.props(), name)?;
            load_balancers.insert(name.as_str(), resolved);
        }
        let mut default_load_balancer = None;

        let mut data_source_rules = HashMap::with_capacity(configuration.data_sources.len());
        for each in &configuration.data_sources {
            let load_balancer = match each.load_balancer_name.as_deref() {
                Some(name) => load_balancers.get(name).cloned().ok_or_else(|| {
                    RuleError::UnregisteredAlgorithm {
                        category: AlgorithmCategory::LoadBalancer,
                        names: vec![name.to_string()],
                        owner: each.name.clone(),
                    }
                })?,
                None => match &default_load_balancer {
                    Some(algorithm) => Arc::clone(algorithm),
                    None => {
                        let algorithm = registry.resolve_load_balancer(
                            &engine_config.default_load_balancer_type,
                            &Default::default(),
                            &each.name,
                        )?;
                        default_load_balancer = Some(Arc::clone(&algorithm));
                        algorithm
                    }
                },
            };
            let strategy = each
                .transactional_read_query_strategy
                .unwrap_or(engine_config.default_transactional_read_query_strategy);
            data_source_rules.insert(
                each.name.clone(),
                Arc::new(ReadwriteSplittingDataSourceRule::new(each.clone(), strategy, load_balancer)),
            );
        }

        Ok(Self {
            configuration,
            data_source_rules,
        })
    }

    /// Builds a new rule and carries disabled read sources over from
    /// `previous` for every group that still exists.
    pub fn rebuild(
        configuration: ReadwriteSplittingRuleConfiguration,
        registry: &AlgorithmRegistry,
        engine_config: &RuleEngineConfig,
        previous: Option<&ReadwriteSplittingRule>,
    ) -> Result<Self> {
        let rule = Self::new(configuration, registry, engine_config)?;
        if let Some(previous) = previous.filter(|_| engine_config.carry_disabled_sources_on_rebuild) {
            for (name, data_source_rule) in &rule.data_source_rules {
                let Some(old) = previous.data_source_rule(name) else {
                    continue;
                };
                for disabled in old.disabled_data_source_names() {
                    data_source_rule.update_disabled_data_source_names(&disabled, true);
                }
            }
        }
        Ok(rule)
    }

    pub fn configuration(&self) -> &ReadwriteSplittingRuleConfiguration {
        &self.configuration
    }

    pub fn data_source_rule(&self, name: &str) -> Option<Arc<ReadwriteSplittingDataSourceRule>> {
        self.data_source_rules.get(name).cloned()
    }

    /// Data-source rules in configuration order.
    pub fn data_source_rules(&self) -> Vec<Arc<ReadwriteSplittingDataSourceRule>> {
        self.configuration
            .data_sources
            .iter()
            .filter_map(|each| self.data_source_rule(&each.name))
            .collect()
    }

    pub fn update_disabled_data_source_names(
        &self,
        group_name: &str,
        data_source_name: &str,
        disabled: bool,
    ) -> Result<()> {
        let rule = self
            .data_source_rule(group_name)
            .ok_or_else(|| RuleError::MissingRequiredRule {
                rule_type: RULE_TYPE.to_string(),
                database: String::new(),
                names: vec![group_name.to_string()],
            })?;
        rule.update_disabled_data_source_names(data_source_name, disabled);
        Ok(())
    }

    fn data_source_mapper(&self) -> DataSourceMapperRuleAttribute {
        let mut data_source_mapper = BTreeMap::new();
        for each in &self.configuration.data_sources {
            let mut actual = Vec::with_capacity(each.read_data_source_names.len() + 1);
            if !each.write_data_source_name.is_empty() {
                actual.push(each.write_data_source_name.clone());
            }
            actual.extend(each.read_data_source_names.iter().cloned());
            data_source_mapper.insert(each.name.clone(), actual);
        }
        DataSourceMapperRuleAttribute { data_source_mapper }
    }
}

impl DatabaseRule for ReadwriteSplittingRule {
    fn rule_type(&self) -> &str {
        RULE_TYPE
    }

    fn attributes(&self) -> Vec<RuleAttribute> {
        vec![RuleAttribute::DataSourceMapper(self.data_source_mapper())]
    }
}

impl fmt::Debug for ReadwriteSplittingRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReadwriteSplittingRule")
            .field("configuration", &self.configuration)
            .finish()
    }
}
