use super::{
    PartitionRange, RangeShardingAlgorithm, ShardingAlgorithm, ValueRange, integer_value,
    required_property,
};
use crate::core::{Properties, Result, RuleError, ShardingValue};

const TYPE_NAME: &str = "BOUNDARY_RANGE";

const SHARDING_RANGES_KEY: &str = "sharding-ranges";

/// Partitions cut at an explicit, strictly ascending list of boundaries.
#[derive(Debug, Clone)]
pub struct BoundaryBasedRangeShardingAlgorithm {
    partitions: PartitionRange,
}

impl BoundaryBasedRangeShardingAlgorithm {
    pub fn new(props: &Properties) -> Result<Self> {
        Ok(Self {
            partitions: Self::calculate_partition_range(props)?,
        })
    }

    pub fn calculate_partition_range(props: &Properties) -> Result<PartitionRange> {
        let raw = required_property(TYPE_NAME, props, SHARDING_RANGES_KEY, "Sharding ranges cannot be null.")?;
        let mut boundaries = Vec::new();
        for each in raw.split(',').map(str::trim).filter(|each| !each.is_empty()) {
            let boundary = each.parse::<i64>().map_err(|_| {
                RuleError::algorithm_init(TYPE_NAME, format!("Sharding range '{}' is not an integer.", each))
            })?;
            if boundaries.last().is_some_and(|last| *last >= boundary) {
                return Err(RuleError::algorithm_init(
                    TYPE_NAME,
                    "Sharding ranges must be strictly ascending.",
                ));
            }
            boundaries.push(boundary);
        }
        if boundaries.is_empty() {
            return Err(RuleError::algorithm_init(TYPE_NAME, "Sharding ranges cannot be null."));
        }
        Ok(PartitionRange::from_boundaries(&boundaries))
    }
}

impl ShardingAlgorithm for BoundaryBasedRangeShardingAlgorithm {
    fn type_name(&self) -> &'static str {
        TYPE_NAME
    }

    fn auto_tables_amount(&self) -> usize {
        self.partitions.len()
    }

    fn partition_of(&self, value: &ShardingValue) -> Result<usize> {
        Ok(self.partitions.partition_of(integer_value(TYPE_NAME, value)?))
    }

    fn partitions_in(&self, range: &ValueRange) -> Result<Vec<usize>> {
        Ok(self.partitions.intersecting(range))
    }
}

impl RangeShardingAlgorithm for BoundaryBasedRangeShardingAlgorithm {
    fn partition_range(&self) -> &PartitionRange {
        &self.partitions
    }
}
