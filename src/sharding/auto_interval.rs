use chrono::NaiveDateTime;

use super::{
    PartitionRange, RangeShardingAlgorithm, ShardingAlgorithm, ValueRange, integer_property,
    required_property, volume_boundaries,
};
use crate::core::{Properties, Result, RuleError, ShardingValue};

const TYPE_NAME: &str = "AUTO_INTERVAL";

const DATE_TIME_LOWER_KEY: &str = "datetime-lower";
const DATE_TIME_UPPER_KEY: &str = "datetime-upper";
const SHARDING_SECONDS_KEY: &str = "sharding-seconds";

pub const DATE_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Time windows of `sharding-seconds` between two datetimes.
///
/// Text values are parsed as `yyyy-MM-dd HH:mm:ss` (UTC); integer values are
/// taken as epoch seconds.
#[derive(Debug, Clone)]
pub struct AutoIntervalShardingAlgorithm {
    partitions: PartitionRange,
}

impl AutoIntervalShardingAlgorithm {
    pub fn new(props: &Properties) -> Result<Self> {
        Ok(Self {
            partitions: Self::calculate_partition_range(props)?,
        })
    }

    pub fn calculate_partition_range(props: &Properties) -> Result<PartitionRange> {
        let lower = parse_date_time(required_property(
            TYPE_NAME,
            props,
            DATE_TIME_LOWER_KEY,
            "Datetime lower cannot be null.",
        )?)?;
        let upper = parse_date_time(required_property(
            TYPE_NAME,
            props,
            DATE_TIME_UPPER_KEY,
            "Datetime upper cannot be null.",
        )?)?;
        let seconds = integer_property(TYPE_NAME, props, SHARDING_SECONDS_KEY, "Sharding seconds cannot be null.")?;
        if seconds <= 0 {
            return Err(RuleError::algorithm_init(TYPE_NAME, "Sharding seconds must be positive."));
        }
        if upper <= lower {
            return Err(RuleError::algorithm_init(TYPE_NAME, "Datetime upper must be later than datetime lower."));
        }
        let boundaries = volume_boundaries(TYPE_NAME, lower, upper, seconds)?;
        Ok(PartitionRange::from_boundaries(&boundaries))
    }

    fn epoch_seconds(value: &ShardingValue) -> Result<i64> {
        match value {
            ShardingValue::Integer(seconds) => Ok(*seconds),
            ShardingValue::Text(text) => NaiveDateTime::parse_from_str(text.trim(), DATE_TIME_FORMAT)
                .map(|date_time| date_time.and_utc().timestamp())
                .map_err(|_| RuleError::UnsupportedShardingValue {
                    algorithm_type: TYPE_NAME.to_string(),
                    value_type: value.type_name().to_string(),
                    value: text.clone(),
                }),
        }
    }
}

fn parse_date_time(raw: &str) -> Result<i64> {
    NaiveDateTime::parse_from_str(raw, DATE_TIME_FORMAT)
        .map(|date_time| date_time.and_utc().timestamp())
        .map_err(|err| {
            RuleError::algorithm_init(TYPE_NAME, format!("Invalid datetime '{}': {}", raw, err))
        })
}

impl ShardingAlgorithm for AutoIntervalShardingAlgorithm {
    fn type_name(&self) -> &'static str {
        TYPE_NAME
    }

    fn auto_tables_amount(&self) -> usize {
        self.partitions.len()
    }

    fn partition_of(&self, value: &ShardingValue) -> Result<usize> {
        Ok(self.partitions.partition_of(Self::epoch_seconds(value)?))
    }

    fn partitions_in(&self, range: &ValueRange) -> Result<Vec<usize>> {
        Ok(self.partitions.intersecting(range))
    }
}

impl RangeShardingAlgorithm for AutoIntervalShardingAlgorithm {
    fn partition_range(&self) -> &PartitionRange {
        &self.partitions
    }
}
