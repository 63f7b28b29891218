// ============================================================================
// RustShard Library
// ============================================================================

pub mod algorithm;
pub mod config;
pub mod core;
pub mod executor;
pub mod facade;
pub mod metadata;
pub mod readwrite;
pub mod sharding;

// Re-export main types for convenience
pub use algorithm::{AlgorithmCategory, AlgorithmInstance, AlgorithmRegistry};
pub use config::RuleEngineConfig;
pub use core::{AlgorithmConfiguration, DataNode, ErrorKind, Properties, Result, RuleError, ShardingValue};
pub use facade::{LogicalDatabaseRules, RuleRuntime};

// Re-export the rule model
pub use readwrite::{
    LoadBalanceAlgorithm, ReadwriteSplittingDataSourceRule, ReadwriteSplittingDataSourceRuleConfiguration,
    ReadwriteSplittingRule, ReadwriteSplittingRuleConfiguration, TransactionalReadQueryStrategy,
};
pub use sharding::{PartitionRange, RangeShardingAlgorithm, ShardingAlgorithm, ValueRange};
