use std::fmt;

use serde::{Deserialize, Serialize};

/// A sharding key value as handed over by the routing layer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ShardingValue {
    Integer(i64),
    Text(String),
}

impl ShardingValue {
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            ShardingValue::Integer(i) => Some(*i),
            ShardingValue::Text(s) => s.trim().parse::<i64>().ok(),
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            ShardingValue::Integer(_) => "INTEGER",
            ShardingValue::Text(_) => "TEXT",
        }
    }
}

impl fmt::Display for ShardingValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShardingValue::Integer(i) => write!(f, "{}", i),
            ShardingValue::Text(s) => write!(f, "{}", s),
        }
    }
}

impl From<i64> for ShardingValue {
    fn from(value: i64) -> Self {
        ShardingValue::Integer(value)
    }
}

impl From<&str> for ShardingValue {
    fn from(value: &str) -> Self {
        ShardingValue::Text(value.to_string())
    }
}

impl From<String> for ShardingValue {
    fn from(value: String) -> Self {
        ShardingValue::Text(value)
    }
}
