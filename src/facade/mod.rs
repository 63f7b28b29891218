mod database;

pub use database::LogicalDatabaseRules;

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use log::info;

use crate::algorithm::AlgorithmRegistry;
use crate::config::RuleEngineConfig;
use crate::core::{Result, RuleError};
use crate::metadata::{ResourceMetadata, RuleMetadata};
use crate::readwrite::ReadwriteSplittingRuleConfiguration;

/// Entry point owning the rules of every logical database.
///
/// Each database serializes its own updates; different databases do not
/// block each other.
pub struct RuleRuntime {
    registry: Arc<AlgorithmRegistry>,
    engine_config: RuleEngineConfig,
    databases: RwLock<HashMap<String, Arc<LogicalDatabaseRules>>>,
}

impl RuleRuntime {
    pub fn new(engine_config: RuleEngineConfig) -> Self {
        Self::with_registry(Arc::new(AlgorithmRegistry::with_default_algorithms()), engine_config)
    }

    pub fn with_registry(registry: Arc<AlgorithmRegistry>, engine_config: RuleEngineConfig) -> Self {
        Self {
            registry,
            engine_config,
            databases: RwLock::new(HashMap::new()),
        }
    }

    pub fn registry(&self) -> &Arc<AlgorithmRegistry> {
        &self.registry
    }

    /// Registers a database with its initial configuration.
    ///
    /// Fails if the name is taken or the configuration does not build.
    pub fn register_database(
        &self,
        name: &str,
        configuration: ReadwriteSplittingRuleConfiguration,
        resources: Arc<dyn ResourceMetadata>,
        rule_metadata: Arc<dyn RuleMetadata>,
    ) -> Result<Arc<LogicalDatabaseRules>> {
        let mut databases = self.databases.write()?;
        if databases.contains_key(name) {
            return Err(RuleError::Configuration(format!(
                "Database '{}' is already registered",
                name
            )));
        }

        let database = Arc::new(LogicalDatabaseRules::new(
            name,
            configuration,
            resources,
            rule_metadata,
            Arc::clone(&self.registry),
            self.engine_config.clone(),
        )?);
        databases.insert(name.to_string(), Arc::clone(&database));
        info!("Registered database '{}'", name);
        Ok(database)
    }

    pub fn database(&self, name: &str) -> Result<Option<Arc<LogicalDatabaseRules>>> {
        Ok(self.databases.read()?.get(name).cloned())
    }

    /// Removes the database. Handles already given out keep working on their
    /// own snapshot.
    pub fn drop_database(&self, name: &str) -> Result<bool> {
        let removed = self.databases.write()?.remove(name).is_some();
        if removed {
            info!("Dropped database '{}'", name);
        }
        Ok(removed)
    }

    pub fn database_names(&self) -> Result<Vec<String>> {
        let mut names: Vec<String> = self.databases.read()?.keys().cloned().collect();
        names.sort();
        Ok(names)
    }
}

impl Default for RuleRuntime {
    fn default() -> Self {
        Self::new(RuleEngineConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ErrorKind;
    use crate::metadata::{InMemoryResourceMetadata, InMemoryRuleMetadata};

    fn register(runtime: &RuleRuntime, name: &str) -> Result<Arc<LogicalDatabaseRules>> {
        runtime.register_database(
            name,
            ReadwriteSplittingRuleConfiguration::default(),
            Arc::new(InMemoryResourceMetadata::new(["ds_0"])),
            Arc::new(InMemoryRuleMetadata::new(Vec::new())),
        )
    }

    #[test]
    fn test_register_and_drop_database() {
        let runtime = RuleRuntime::default();
        register(&runtime, "foo_db").unwrap();
        register(&runtime, "bar_db").unwrap();
        assert_eq!(runtime.database_names().unwrap(), vec!["bar_db", "foo_db"]);

        let err = register(&runtime, "foo_db").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);

        assert!(runtime.drop_database("foo_db").unwrap());
        assert!(!runtime.drop_database("foo_db").unwrap());
        assert!(runtime.database("foo_db").unwrap().is_none());
        assert!(runtime.database("bar_db").unwrap().is_some());
    }
}
