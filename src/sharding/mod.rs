//! Sharding algorithms mapping a key value (or value range) onto partitions.
//!
//! Every algorithm validates its properties once, in its constructor, and is
//! a pure function of those properties afterwards.

pub mod auto_interval;
pub mod boundary_range;
pub mod modulo;
pub mod partition;
pub mod volume_range;

use crate::core::{Properties, Result, RuleError, ShardingValue};

pub use auto_interval::AutoIntervalShardingAlgorithm;
pub use boundary_range::BoundaryBasedRangeShardingAlgorithm;
pub use modulo::{HashModShardingAlgorithm, ModShardingAlgorithm, stable_hash};
pub use partition::{PartitionRange, ValueRange};
pub use volume_range::VolumeBasedRangeShardingAlgorithm;

/// Upper bound on the partitions any built-in algorithm may lay out.
pub const MAX_PARTITION_COUNT: usize = 65_536;

pub trait ShardingAlgorithm: Send + Sync {
    fn type_name(&self) -> &'static str;

    /// Number of partitions this algorithm distributes values over.
    fn auto_tables_amount(&self) -> usize;

    fn partition_of(&self, value: &ShardingValue) -> Result<usize>;

    /// Partitions possibly holding values of `range`, ascending.
    fn partitions_in(&self, range: &ValueRange) -> Result<Vec<usize>>;

    /// Picks the target whose numeric suffix equals the partition of `value`.
    fn do_sharding(&self, available_targets: &[String], value: &ShardingValue) -> Result<Option<String>> {
        let partition = self.partition_of(value)?;
        Ok(find_matched_target(available_targets, partition).map(str::to_string))
    }

    fn do_range_sharding(&self, available_targets: &[String], range: &ValueRange) -> Result<Vec<String>> {
        let partitions = self.partitions_in(range)?;
        Ok(available_targets
            .iter()
            .filter(|target| target_suffix(target).is_some_and(|suffix| partitions.contains(&suffix)))
            .cloned()
            .collect())
    }
}

impl std::fmt::Debug for dyn ShardingAlgorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShardingAlgorithm")
            .field("type", &self.type_name())
            .field("auto_tables_amount", &self.auto_tables_amount())
            .finish()
    }
}

/// Range based algorithms expose their full partition layout.
pub trait RangeShardingAlgorithm: ShardingAlgorithm {
    fn partition_range(&self) -> &PartitionRange;
}

/// Trailing digits of a target name, `t_order_12` -> 12.
pub fn target_suffix(target: &str) -> Option<usize> {
    let digits = target.len() - target.trim_end_matches(|c: char| c.is_ascii_digit()).len();
    if digits == 0 {
        return None;
    }
    target[target.len() - digits..].parse().ok()
}

pub fn find_matched_target(available_targets: &[String], partition: usize) -> Option<&str> {
    available_targets
        .iter()
        .find(|target| target_suffix(target) == Some(partition))
        .map(String::as_str)
}

pub(crate) fn required_property<'a>(
    algorithm_type: &str,
    props: &'a Properties,
    key: &str,
    reason: &str,
) -> Result<&'a str> {
    props
        .get(key)
        .map(|value| value.trim())
        .filter(|value| !value.is_empty())
        .ok_or_else(|| RuleError::algorithm_init(algorithm_type, reason))
}

pub(crate) fn integer_property(
    algorithm_type: &str,
    props: &Properties,
    key: &str,
    reason: &str,
) -> Result<i64> {
    let raw = required_property(algorithm_type, props, key, reason)?;
    raw.parse::<i64>().map_err(|_| {
        RuleError::algorithm_init(
            algorithm_type,
            format!("Property '{}' must be an integer, got '{}'.", key, raw),
        )
    })
}

pub(crate) fn integer_value(algorithm_type: &str, value: &ShardingValue) -> Result<i64> {
    value
        .as_integer()
        .ok_or_else(|| RuleError::UnsupportedShardingValue {
            algorithm_type: algorithm_type.to_string(),
            value_type: value.type_name().to_string(),
            value: value.to_string(),
        })
}

/// `lower, lower + volume, ..., upper`, the last window clipped to `upper`.
pub(crate) fn volume_boundaries(algorithm_type: &str, lower: i64, upper: i64, volume: i64) -> Result<Vec<i64>> {
    let span = i128::from(upper) - i128::from(lower);
    let volume = i128::from(volume);
    let partition_count = (span + volume - 1) / volume;
    let partition_count = u32::try_from(partition_count)
        .ok()
        .filter(|count| *count as usize <= MAX_PARTITION_COUNT)
        .ok_or_else(|| {
            RuleError::algorithm_init(
                algorithm_type,
                format!("Partition count cannot exceed {}.", MAX_PARTITION_COUNT),
            )
        })?;

    let lower = i128::from(lower);
    let mut boundaries = Vec::with_capacity(partition_count as usize + 1);
    for i in 0..i128::from(partition_count) {
        // every window start is below upper, so it fits back into i64
        boundaries.push((lower + i * volume) as i64);
    }
    boundaries.push(upper);
    Ok(boundaries)
}
