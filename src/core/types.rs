use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::core::{Result, RuleError};

/// Algorithm parameters, `props` in the persisted shape.
pub type Properties = BTreeMap<String, String>;

/// Identifies a pluggable algorithm by type name plus its parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlgorithmConfiguration {
    #[serde(rename = "type")]
    algorithm_type: String,
    #[serde(default)]
    props: Properties,
}

impl AlgorithmConfiguration {
    pub fn new(algorithm_type: impl Into<String>, props: Properties) -> Self {
        Self {
            algorithm_type: algorithm_type.into(),
            props,
        }
    }

    pub fn algorithm_type(&self) -> &str {
        &self.algorithm_type
    }

    pub fn props(&self) -> &Properties {
        &self.props
    }
}

/// A physical table location, written as `data_source.table`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DataNode {
    pub data_source_name: String,
    pub table_name: String,
}

impl DataNode {
    pub fn new(data_source_name: impl Into<String>, table_name: impl Into<String>) -> Self {
        Self {
            data_source_name: data_source_name.into(),
            table_name: table_name.into(),
        }
    }

    pub fn parse(data_node: &str) -> Result<Self> {
        match data_node.split_once('.') {
            Some((ds, table)) if !ds.trim().is_empty() && !table.trim().is_empty() => {
                Ok(Self::new(ds.trim(), table.trim()))
            }
            _ => Err(RuleError::Configuration(format!(
                "Invalid format for data node '{}', expected 'data_source.table'",
                data_node
            ))),
        }
    }
}

impl fmt::Display for DataNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.data_source_name, self.table_name)
    }
}
