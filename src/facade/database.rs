use std::sync::{Arc, RwLock};

use log::debug;
use tokio::sync::Mutex;

use crate::algorithm::AlgorithmRegistry;
use crate::config::RuleEngineConfig;
use crate::core::Result;
use crate::executor::{RuleExecutionContext, RuleExecutorPipeline, RuleStatement};
use crate::metadata::{ResourceMetadata, RuleMetadata};
use crate::readwrite::{ReadwriteSplittingRule, ReadwriteSplittingRuleConfiguration};

/// Read/write splitting rules of one logical database.
///
/// Updates are serialized in arrival order. Readers only wait while a
/// checked update is rebuilt and swapped in, and always see either the old
/// or the new rule, never a mix.
pub struct LogicalDatabaseRules {
    name: String,
    resources: Arc<dyn ResourceMetadata>,
    rule_metadata: Arc<dyn RuleMetadata>,
    registry: Arc<AlgorithmRegistry>,
    engine_config: RuleEngineConfig,
    pipeline: RuleExecutorPipeline,
    /// Held for the whole check-then-apply of one statement
    update_lock: Mutex<()>,
    runtime: RwLock<Arc<ReadwriteSplittingRule>>,
}

impl LogicalDatabaseRules {
    pub fn new(
        name: impl Into<String>,
        configuration: ReadwriteSplittingRuleConfiguration,
        resources: Arc<dyn ResourceMetadata>,
        rule_metadata: Arc<dyn RuleMetadata>,
        registry: Arc<AlgorithmRegistry>,
        engine_config: RuleEngineConfig,
    ) -> Result<Self> {
        let rule = ReadwriteSplittingRule::new(configuration, &registry, &engine_config)?;
        Ok(Self {
            name: name.into(),
            resources,
            rule_metadata,
            registry,
            engine_config,
            pipeline: RuleExecutorPipeline::with_default_executors(),
            update_lock: Mutex::new(()),
            runtime: RwLock::new(Arc::new(rule)),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn engine_config(&self) -> &RuleEngineConfig {
        &self.engine_config
    }

    /// Current runtime rule. The snapshot stays valid after later updates.
    pub fn rule(&self) -> Result<Arc<ReadwriteSplittingRule>> {
        Ok(Arc::clone(&*self.runtime.read()?))
    }

    pub fn configuration(&self) -> Result<ReadwriteSplittingRuleConfiguration> {
        Ok(self.rule()?.configuration().clone())
    }

    /// Checks and applies one rule definition statement.
    ///
    /// On any error the current configuration and runtime rule are left
    /// untouched.
    pub async fn execute_update(&self, stmt: impl Into<RuleStatement>) -> Result<ReadwriteSplittingRuleConfiguration> {
        let stmt = stmt.into();
        let _guard = self.update_lock.lock().await;

        let previous = self.rule()?;
        let configuration = {
            let ctx = RuleExecutionContext::new(
                &self.name,
                previous.configuration(),
                self.resources.as_ref(),
                self.rule_metadata.as_ref(),
                &self.registry,
            );
            self.pipeline.execute(&stmt, &ctx)?
        };

        // disable writes hold the read side, so none lands between carry-over and swap
        let mut runtime = self.runtime.write()?;
        let rule = ReadwriteSplittingRule::rebuild(
            configuration.clone(),
            &self.registry,
            &self.engine_config,
            Some(runtime.as_ref()),
        )?;
        *runtime = Arc::new(rule);
        drop(runtime);
        debug!("Database '{}' applied {}", self.name, stmt);
        Ok(configuration)
    }

    /// Marks `data_source_name` of `group_name` disabled or enabled on the
    /// current runtime rule.
    pub fn update_disabled_data_source_names(
        &self,
        group_name: &str,
        data_source_name: &str,
        disabled: bool,
    ) -> Result<()> {
        let runtime = self.runtime.read()?;
        runtime.update_disabled_data_source_names(group_name, data_source_name, disabled)
    }
}

impl std::fmt::Debug for LogicalDatabaseRules {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LogicalDatabaseRules")
            .field("name", &self.name)
            .field("engine_config", &self.engine_config)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ErrorKind;
    use crate::executor::{
        CreateReadwriteSplittingRuleStatement, DropReadwriteSplittingRuleStatement, ReadwriteSplittingRuleSegment,
    };
    use crate::metadata::{InMemoryResourceMetadata, InMemoryRuleMetadata};

    fn database() -> LogicalDatabaseRules {
        LogicalDatabaseRules::new(
            "foo_db",
            ReadwriteSplittingRuleConfiguration::default(),
            Arc::new(InMemoryResourceMetadata::new(["write_ds", "read_ds_0", "read_ds_1"])),
            Arc::new(InMemoryRuleMetadata::new(Vec::new())),
            Arc::new(AlgorithmRegistry::with_default_algorithms()),
            RuleEngineConfig::new(),
        )
        .unwrap()
    }

    fn create(name: &str) -> CreateReadwriteSplittingRuleStatement {
        CreateReadwriteSplittingRuleStatement {
            if_not_exists: false,
            rules: vec![ReadwriteSplittingRuleSegment::new(
                name,
                "write_ds",
                vec!["read_ds_0".to_string(), "read_ds_1".to_string()],
                None,
            )],
        }
    }

    #[tokio::test]
    async fn test_execute_update_swaps_rule() {
        let db = database();
        let before = db.rule().unwrap();
        db.execute_update(create("pr_ds")).await.unwrap();

        assert!(before.data_source_rule("pr_ds").is_none());
        let after = db.rule().unwrap();
        assert_eq!(after.data_source_rule("pr_ds").unwrap().write_data_source_name(), "write_ds");
    }

    #[tokio::test]
    async fn test_rejected_update_keeps_state() {
        let db = database();
        db.execute_update(create("pr_ds")).await.unwrap();
        let err = db
            .execute_update(DropReadwriteSplittingRuleStatement {
                if_exists: false,
                names: vec!["missing".to_string()],
            })
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingRequiredRule);
        assert_eq!(db.configuration().unwrap().data_sources.len(), 1);
    }

    #[tokio::test]
    async fn test_disabled_sources_survive_update() {
        let db = database();
        db.execute_update(create("pr_ds")).await.unwrap();
        db.update_disabled_data_source_names("pr_ds", "read_ds_0", true).unwrap();

        let mut stmt = create("pr_ds");
        stmt.if_not_exists = true;
        db.execute_update(stmt).await.unwrap();

        let rule = db.rule().unwrap().data_source_rule("pr_ds").unwrap();
        assert_eq!(rule.enabled_read_data_source_names(), vec!["read_ds_1".to_string()]);
    }
}
