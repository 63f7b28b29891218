use super::{
    PartitionRange, RangeShardingAlgorithm, ShardingAlgorithm, ValueRange, integer_property,
    integer_value, volume_boundaries,
};
use crate::core::{Properties, Result, RuleError, ShardingValue};

const TYPE_NAME: &str = "VOLUME_RANGE";

const RANGE_LOWER_KEY: &str = "range-lower";
const RANGE_UPPER_KEY: &str = "range-upper";
const SHARDING_VOLUME_KEY: &str = "sharding-volume";

/// Fixed-width windows of `sharding-volume` between `range-lower` and
/// `range-upper`, plus one open partition on each side.
#[derive(Debug, Clone)]
pub struct VolumeBasedRangeShardingAlgorithm {
    partitions: PartitionRange,
}

impl VolumeBasedRangeShardingAlgorithm {
    pub fn new(props: &Properties) -> Result<Self> {
        Ok(Self {
            partitions: Self::calculate_partition_range(props)?,
        })
    }

    pub fn calculate_partition_range(props: &Properties) -> Result<PartitionRange> {
        let lower = integer_property(TYPE_NAME, props, RANGE_LOWER_KEY, "Lower range cannot be null.")?;
        let upper = integer_property(TYPE_NAME, props, RANGE_UPPER_KEY, "Upper range cannot be null.")?;
        let volume = integer_property(TYPE_NAME, props, SHARDING_VOLUME_KEY, "Sharding volume cannot be null.")?;
        if volume <= 0 {
            return Err(RuleError::algorithm_init(TYPE_NAME, "Sharding volume must be positive."));
        }
        if i128::from(upper) - i128::from(lower) < i128::from(volume) {
            return Err(RuleError::algorithm_init(TYPE_NAME, "Range can not be smaller than volume."));
        }
        let boundaries = volume_boundaries(TYPE_NAME, lower, upper, volume)?;
        Ok(PartitionRange::from_boundaries(&boundaries))
    }
}

impl ShardingAlgorithm for VolumeBasedRangeShardingAlgorithm {
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

impl RangeShardingAlgorithm for VolumeBasedRangeShardingAlgorithm {
    fn partition_range(&self) -> &PartitionRange {
        &self.partitions
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ErrorKind;

    fn props(lower: &str, upper: &str, volume: &str) -> Properties {
        let mut props = Properties::new();
        props.insert(RANGE_LOWER_KEY.to_string(), lower.to_string());
        props.insert(RANGE_UPPER_KEY.to_string(), upper.to_string());
        props.insert(SHARDING_VOLUME_KEY.to_string(), volume.to_string());
        props
    }

    #[test]
    fn test_calculate_partition_range() {
        let partitions = VolumeBasedRangeShardingAlgorithm::calculate_partition_range(&props("0", "10", "4")).unwrap();
        let expected = vec![
            ValueRange::less_than(0),
            ValueRange::closed_open(0, 4),
            ValueRange::closed_open(4, 8),
            ValueRange::closed_open(8, 10),
            ValueRange::at_least(10),
        ];
        assert_eq!(partitions.to_map().into_values().collect::<Vec<_>>(), expected);
    }

    #[test]
    fn test_missing_each_property() {
        for key in [RANGE_LOWER_KEY, RANGE_UPPER_KEY, SHARDING_VOLUME_KEY] {
            let mut props = props("0", "10", "4");
            props.remove(key);
            let err = VolumeBasedRangeShardingAlgorithm::new(&props).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::AlgorithmInitialization, "missing {key}");
        }
    }

    #[test]
    fn test_range_smaller_than_volume() {
        let err = VolumeBasedRangeShardingAlgorithm::new(&props("0", "3", "4")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::AlgorithmInitialization);
        assert!(err.to_string().contains("Range can not be smaller than volume."));
    }

    #[test]
    fn test_non_integer_and_non_positive_volume() {
        assert!(VolumeBasedRangeShardingAlgorithm::new(&props("0", "ten", "4")).is_err());
        assert!(VolumeBasedRangeShardingAlgorithm::new(&props("0", "10", "0")).is_err());
        assert!(VolumeBasedRangeShardingAlgorithm::new(&props("0", "10", "-2")).is_err());
    }

    #[test]
    fn test_do_sharding() {
        let algorithm = VolumeBasedRangeShardingAlgorithm::new(&props("0", "10", "4")).unwrap();
        let targets: Vec<String> = (0..5).map(|i| format!("t_order_{i}")).collect();
        assert_eq!(algorithm.auto_tables_amount(), 5);
        assert_eq!(algorithm.do_sharding(&targets, &(-1i64).into()).unwrap().as_deref(), Some("t_order_0"));
        assert_eq!(algorithm.do_sharding(&targets, &5i64.into()).unwrap().as_deref(), Some("t_order_2"));
        assert_eq!(algorithm.do_sharding(&targets, &"9".into()).unwrap().as_deref(), Some("t_order_3"));
        assert_eq!(algorithm.do_sharding(&targets, &100i64.into()).unwrap().as_deref(), Some("t_order_4"));
        assert_eq!(
            algorithm.do_range_sharding(&targets, &ValueRange::closed(3, 8)).unwrap(),
            vec!["t_order_1".to_string(), "t_order_2".to_string(), "t_order_3".to_string()]
        );
    }

    #[test]
    fn test_text_value_rejected() {
        let algorithm = VolumeBasedRangeShardingAlgorithm::new(&props("0", "10", "4")).unwrap();
        let err = algorithm.partition_of(&"abc".into()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnsupportedShardingValue);
    }
}
