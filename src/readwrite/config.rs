use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::core::{AlgorithmConfiguration, RuleError};

/// How reads inside an open transaction are routed.
///
/// Only carried as configuration; the routing layer decides what to do with it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionalReadQueryStrategy {
    /// Every read inside a transaction goes to the write data source.
    Always,
    /// Decided per statement from the transaction context.
    #[default]
    Dynamic,
    /// Reads keep using the configured read data sources.
    Fixed,
}

impl fmt::Display for TransactionalReadQueryStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Always => write!(f, "ALWAYS"),
            Self::Dynamic => write!(f, "DYNAMIC"),
            Self::Fixed => write!(f, "FIXED"),
        }
    }
}

impl FromStr for TransactionalReadQueryStrategy {
    type Err = RuleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "ALWAYS" => Ok(Self::Always),
            "DYNAMIC" => Ok(Self::Dynamic),
            "FIXED" => Ok(Self::Fixed),
            other => Err(RuleError::Configuration(format!(
                "Unknown transactional read query strategy '{}'",
                other
            ))),
        }
    }
}

/// One logical data-source group: a write source and its read sources.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadwriteSplittingDataSourceRuleConfiguration {
    pub name: String,
    pub write_data_source_name: String,
    #[serde(default)]
    pub read_data_source_names: Vec<String>,
    #[serde(default)]
    pub load_balancer_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transactional_read_query_strategy: Option<TransactionalReadQueryStrategy>,
}

impl ReadwriteSplittingDataSourceRuleConfiguration {
    pub fn new(
        name: impl Into<String>,
        write_data_source_name: impl Into<String>,
        read_data_source_names: Vec<String>,
        load_balancer_name: Option<String>,
    ) -> Self {
        Self {
            name: name.into(),
            write_data_source_name: write_data_source_name.into(),
            read_data_source_names,
            load_balancer_name,
            transactional_read_query_strategy: None,
        }
    }

    pub fn with_transactional_read_query_strategy(mut self, strategy: TransactionalReadQueryStrategy) -> Self {
        self.transactional_read_query_strategy = Some(strategy);
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadwriteSplittingRuleConfiguration {
    #[serde(default, rename = "readWriteSplittingRules")]
    pub data_sources: Vec<ReadwriteSplittingDataSourceRuleConfiguration>,
    #[serde(default)]
    pub load_balancers: BTreeMap<String, AlgorithmConfiguration>,
}

impl ReadwriteSplittingRuleConfiguration {
    pub fn new(
        data_sources: Vec<ReadwriteSplittingDataSourceRuleConfiguration>,
        load_balancers: BTreeMap<String, AlgorithmConfiguration>,
    ) -> Self {
        Self {
            data_sources,
            load_balancers,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.data_sources.is_empty() && self.load_balancers.is_empty()
    }

    pub fn find_data_source(&self, name: &str) -> Option<&ReadwriteSplittingDataSourceRuleConfiguration> {
        self.data_sources.iter().find(|each| each.name == name)
    }

    pub fn rule_names(&self) -> Vec<&str> {
        self.data_sources.iter().map(|each| each.name.as_str()).collect()
    }

    /// True when any data-source rule still points at the load balancer.
    pub fn is_load_balancer_in_use(&self, load_balancer_name: &str) -> bool {
        self.data_sources
            .iter()
            .any(|each| each.load_balancer_name.as_deref() == Some(load_balancer_name))
    }

    /// Load balancers no data-source rule references.
    pub fn unused_load_balancers(&self) -> Vec<&str> {
        self.load_balancers
            .keys()
            .filter(|name| !self.is_load_balancer_in_use(name))
            .map(String::as_str)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Properties;

    #[test]
    fn test_persisted_shape() {
        let json = serde_json::json!({
            "readWriteSplittingRules": [{
                "name": "readwrite_ds",
                "writeDataSourceName": "write_ds",
                "readDataSourceNames": ["read_ds_0", "read_ds_1"],
                "loadBalancerName": "random"
            }],
            "loadBalancers": {
                "random": { "type": "RANDOM", "props": {} }
            }
        });
        let config: ReadwriteSplittingRuleConfiguration = serde_json::from_value(json).unwrap();
        let rule = config.find_data_source("readwrite_ds").unwrap();
        assert_eq!(rule.write_data_source_name, "write_ds");
        assert_eq!(rule.read_data_source_names, vec!["read_ds_0", "read_ds_1"]);
        assert_eq!(rule.transactional_read_query_strategy, None);
        assert_eq!(config.load_balancers["random"], AlgorithmConfiguration::new("RANDOM", Properties::new()));
    }

    #[test]
    fn test_unused_load_balancers() {
        let mut load_balancers = BTreeMap::new();
        load_balancers.insert("used".to_string(), AlgorithmConfiguration::new("RANDOM", Properties::new()));
        load_balancers.insert("orphan".to_string(), AlgorithmConfiguration::new("RANDOM", Properties::new()));
        let config = ReadwriteSplittingRuleConfiguration::new(
            vec![ReadwriteSplittingDataSourceRuleConfiguration::new(
                "readwrite_ds",
                "write_ds",
                vec![],
                Some("used".to_string()),
            )],
            load_balancers,
        );
        assert_eq!(config.unused_load_balancers(), vec!["orphan"]);
    }

    #[test]
    fn test_strategy_from_str() {
        assert_eq!("fixed".parse::<TransactionalReadQueryStrategy>().unwrap(), TransactionalReadQueryStrategy::Fixed);
        assert!("sometimes".parse::<TransactionalReadQueryStrategy>().is_err());
    }
}
