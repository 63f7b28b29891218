//! Read-only views onto the rest of a logical database, consumed by the
//! configuration executors.

use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

use crate::core::DataNode;

/// Knows which physical storage units a logical database has.
pub trait ResourceMetadata: Send + Sync {
    fn contains_storage_unit(&self, name: &str) -> bool;

    /// Names from `names` with no matching storage unit, in input order.
    fn not_existed_data_sources(&self, names: &[String]) -> Vec<String> {
        let mut seen = HashSet::new();
        names
            .iter()
            .filter(|name| !self.contains_storage_unit(name))
            .filter(|name| seen.insert(name.as_str()))
            .cloned()
            .collect()
    }
}

#[derive(Debug, Default)]
pub struct InMemoryResourceMetadata {
    storage_units: RwLock<HashSet<String>>,
}

impl InMemoryResourceMetadata {
    pub fn new<I, S>(storage_units: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            storage_units: RwLock::new(storage_units.into_iter().map(Into::into).collect()),
        }
    }

    pub fn register_storage_unit(&self, name: impl Into<String>) {
        self.storage_units
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(name.into());
    }

    pub fn unregister_storage_unit(&self, name: &str) -> bool {
        self.storage_units
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(name)
    }

    pub fn storage_unit_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .storage_units
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .cloned()
            .collect();
        names.sort();
        names
    }
}

impl ResourceMetadata for InMemoryResourceMetadata {
    fn contains_storage_unit(&self, name: &str) -> bool {
        self.storage_units
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(name)
    }
}

/// Logic table -> physical data nodes owned by a rule.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DataNodeRuleAttribute {
    pub all_data_nodes: BTreeMap<String, Vec<DataNode>>,
}

impl DataNodeRuleAttribute {
    pub fn references_data_source(&self, data_source_name: &str) -> bool {
        self.all_data_nodes
            .values()
            .flatten()
            .any(|node| node.data_source_name == data_source_name)
    }
}

/// Logical data source -> the actual data sources behind it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DataSourceMapperRuleAttribute {
    pub data_source_mapper: BTreeMap<String, Vec<String>>,
}

impl DataSourceMapperRuleAttribute {
    pub fn logical_data_source_names(&self) -> impl Iterator<Item = &str> {
        self.data_source_mapper.keys().map(String::as_str)
    }

    pub fn references_data_source(&self, data_source_name: &str) -> bool {
        self.data_source_mapper
            .values()
            .flatten()
            .any(|each| each == data_source_name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleAttribute {
    DataNode(DataNodeRuleAttribute),
    DataSourceMapper(DataSourceMapperRuleAttribute),
}

/// Any rule registered in a logical database.
pub trait DatabaseRule: Send + Sync {
    fn rule_type(&self) -> &str;

    fn attributes(&self) -> Vec<RuleAttribute>;
}

/// Rule carrying a fixed attribute list, for rules owned by other features.
#[derive(Debug, Clone)]
pub struct DeclaredRule {
    rule_type: String,
    attributes: Vec<RuleAttribute>,
}

impl DeclaredRule {
    pub fn new(rule_type: impl Into<String>, attributes: Vec<RuleAttribute>) -> Self {
        Self {
            rule_type: rule_type.into(),
            attributes,
        }
    }
}

impl DatabaseRule for DeclaredRule {
    fn rule_type(&self) -> &str {
        &self.rule_type
    }

    fn attributes(&self) -> Vec<RuleAttribute> {
        self.attributes.clone()
    }
}

/// Enumerates the rules currently registered in a logical database.
pub trait RuleMetadata: Send + Sync {
    fn rules(&self) -> Vec<Arc<dyn DatabaseRule>>;

    fn data_node_attributes(&self) -> Vec<(String, DataNodeRuleAttribute)> {
        self.rules()
            .iter()
            .flat_map(|rule| {
                let rule_type = rule.rule_type().to_string();
                rule.attributes().into_iter().filter_map(move |attribute| match attribute {
                    RuleAttribute::DataNode(each) => Some((rule_type.clone(), each)),
                    _ => None,
                })
            })
            .collect()
    }

    fn data_source_mapper_attributes(&self) -> Vec<(String, DataSourceMapperRuleAttribute)> {
        self.rules()
            .iter()
            .flat_map(|rule| {
                let rule_type = rule.rule_type().to_string();
                rule.attributes().into_iter().filter_map(move |attribute| match attribute {
                    RuleAttribute::DataSourceMapper(each) => Some((rule_type.clone(), each)),
                    _ => None,
                })
            })
            .collect()
    }
}

#[derive(Default)]
pub struct InMemoryRuleMetadata {
    rules: RwLock<Vec<Arc<dyn DatabaseRule>>>,
}

impl InMemoryRuleMetadata {
    pub fn new(rules: Vec<Arc<dyn DatabaseRule>>) -> Self {
        Self {
            rules: RwLock::new(rules),
        }
    }

    pub fn register(&self, rule: Arc<dyn DatabaseRule>) {
        self.rules
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(rule);
    }

    /// Drops every rule of the given type, returns how many were removed.
    pub fn unregister(&self, rule_type: &str) -> usize {
        let mut rules = self.rules.write().unwrap_or_else(PoisonError::into_inner);
        let before = rules.len();
        rules.retain(|rule| rule.rule_type() != rule_type);
        before - rules.len()
    }
}

impl RuleMetadata for InMemoryRuleMetadata {
    fn rules(&self) -> Vec<Arc<dyn DatabaseRule>> {
        self.rules
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl fmt::Debug for InMemoryRuleMetadata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let types: Vec<String> = self
            .rules()
            .iter()
            .map(|rule| rule.rule_type().to_string())
            .collect();
        f.debug_struct("InMemoryRuleMetadata").field("rules", &types).finish()
    }
}
