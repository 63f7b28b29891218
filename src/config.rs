use std::collections::HashMap;

use crate::core::{Result, RuleError};
use crate::readwrite::TransactionalReadQueryStrategy;

pub const DEFAULT_LOAD_BALANCER_KEY: &str = "readwrite-splitting.default-load-balancer";
pub const TRANSACTIONAL_READ_QUERY_STRATEGY_KEY: &str = "readwrite-splitting.transactional-read-query-strategy";
pub const CARRY_DISABLED_ON_REBUILD_KEY: &str = "readwrite-splitting.carry-disabled-on-rebuild";

/// Engine-wide defaults applied while building runtime rules
///
/// Similar to a connection config: construct with [`RuleEngineConfig::new`]
/// and adjust with the builder methods.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleEngineConfig {
    /// Load balancer type used by data-source rules without `loadBalancerName`
    pub default_load_balancer_type: String,

    /// Strategy for data-source rules that do not set one
    pub default_transactional_read_query_strategy: TransactionalReadQueryStrategy,

    /// Keep disabled read sources of surviving groups when a rule is rebuilt
    pub carry_disabled_sources_on_rebuild: bool,
}

impl RuleEngineConfig {
    pub fn new() -> Self {
        Self {
            default_load_balancer_type: "ROUND_ROBIN".to_string(),
            default_transactional_read_query_strategy: TransactionalReadQueryStrategy::Dynamic,
            carry_disabled_sources_on_rebuild: true,
        }
    }

    /// Set the default load balancer type
    pub fn default_load_balancer_type(mut self, type_name: &str) -> Self {
        self.default_load_balancer_type = type_name.to_string();
        self
    }

    /// Set the default transactional read query strategy
    pub fn default_transactional_read_query_strategy(mut self, strategy: TransactionalReadQueryStrategy) -> Self {
        self.default_transactional_read_query_strategy = strategy;
        self
    }

    /// Set whether disabled read sources survive a rule rebuild
    pub fn carry_disabled_sources_on_rebuild(mut self, carry: bool) -> Self {
        self.carry_disabled_sources_on_rebuild = carry;
        self
    }

    /// Parse from a flat property map
    ///
    /// Unknown keys are ignored.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::collections::HashMap;
    /// use rustshard::RuleEngineConfig;
    ///
    /// let mut props = HashMap::new();
    /// props.insert("readwrite-splitting.default-load-balancer".to_string(), "RANDOM".to_string());
    /// let config = RuleEngineConfig::from_properties(&props).unwrap();
    /// assert_eq!(config.default_load_balancer_type, "RANDOM");
    /// ```
    pub fn from_properties(props: &HashMap<String, String>) -> Result<Self> {
        let mut config = Self::new();

        if let Some(value) = props.get(DEFAULT_LOAD_BALANCER_KEY) {
            let value = value.trim();
            if value.is_empty() {
                return Err(RuleError::Configuration(format!(
                    "'{}' must not be empty",
                    DEFAULT_LOAD_BALANCER_KEY
                )));
            }
            config.default_load_balancer_type = value.to_string();
        }

        if let Some(value) = props.get(TRANSACTIONAL_READ_QUERY_STRATEGY_KEY) {
            config.default_transactional_read_query_strategy = value.parse()?;
        }

        if let Some(value) = props.get(CARRY_DISABLED_ON_REBUILD_KEY) {
            config.carry_disabled_sources_on_rebuild = value.trim().parse::<bool>().map_err(|_| {
                RuleError::Configuration(format!(
                    "'{}' must be true or false, got '{}'",
                    CARRY_DISABLED_ON_REBUILD_KEY, value
                ))
            })?;
        }

        Ok(config)
    }
}

impl Default for RuleEngineConfig {
    fn default() -> Self {
        Self::new()
    }
}
