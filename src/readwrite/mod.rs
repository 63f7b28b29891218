//! Read/write splitting: one write data source, many read data sources, and
//! the runtime state needed to pick a read source per statement.

pub mod config;
pub mod load_balance;
pub mod rule;

pub use config::{
    ReadwriteSplittingDataSourceRuleConfiguration, ReadwriteSplittingRuleConfiguration,
    TransactionalReadQueryStrategy,
};
pub use load_balance::LoadBalanceAlgorithm;
pub use rule::{RULE_TYPE, ReadwriteSplittingDataSourceRule, ReadwriteSplittingRule};
