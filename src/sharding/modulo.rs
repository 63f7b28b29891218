use super::{MAX_PARTITION_COUNT, ShardingAlgorithm, ValueRange, integer_property, integer_value};
use crate::core::{Properties, Result, RuleError, ShardingValue};

const SHARDING_COUNT_KEY: &str = "sharding-count";

/// Stable FNV-1a hash, identical on every node and process restart.
pub fn stable_hash(value: &str) -> u64 {
    let mut hash = 14695981039346656037u64;
    for byte in value.as_bytes() {
        hash ^= *byte as u64;
        hash = hash.wrapping_mul(1099511628211);
    }
    hash
}

fn sharding_count(algorithm_type: &str, props: &Properties) -> Result<usize> {
    let count = integer_property(algorithm_type, props, SHARDING_COUNT_KEY, "Sharding count cannot be null.")?;
    if count <= 0 {
        return Err(RuleError::algorithm_init(algorithm_type, "Sharding count must be positive."));
    }
    usize::try_from(count)
        .ok()
        .filter(|count| *count <= MAX_PARTITION_COUNT)
        .ok_or_else(|| {
            RuleError::algorithm_init(
                algorithm_type,
                format!("Sharding count cannot exceed {}.", MAX_PARTITION_COUNT),
            )
        })
}

fn all_partitions(count: usize) -> Vec<usize> {
    (0..count).collect()
}

/// `value mod sharding-count` over integer keys.
#[derive(Debug, Clone)]
pub struct ModShardingAlgorithm {
    sharding_count: usize,
}

impl ModShardingAlgorithm {
    const TYPE_NAME: &'static str = "MOD";

    pub fn new(props: &Properties) -> Result<Self> {
        Ok(Self {
            sharding_count: sharding_count(Self::TYPE_NAME, props)?,
        })
    }

    fn partition_of_integer(&self, value: i64) -> usize {
        value.rem_euclid(self.sharding_count as i64) as usize
    }
}

impl ShardingAlgorithm for ModShardingAlgorithm {
    fn type_name(&self) -> &'static str {
        Self::TYPE_NAME
    }

    fn auto_tables_amount(&self) -> usize {
        self.sharding_count
    }

    fn partition_of(&self, value: &ShardingValue) -> Result<usize> {
        Ok(self.partition_of_integer(integer_value(Self::TYPE_NAME, value)?))
    }

    fn partitions_in(&self, range: &ValueRange) -> Result<Vec<usize>> {
        let Some((first, last)) = range.integer_endpoints() else {
            return Ok(Vec::new());
        };
        let span = i128::from(last) - i128::from(first) + 1;
        if span >= self.sharding_count as i128 {
            return Ok(all_partitions(self.sharding_count));
        }
        let mut partitions: Vec<usize> = (first..=last)
            .map(|value| self.partition_of_integer(value))
            .collect();
        partitions.sort_unstable();
        partitions.dedup();
        Ok(partitions)
    }
}

/// Hash of the key mod `sharding-count`; accepts text keys.
#[derive(Debug, Clone)]
pub struct HashModShardingAlgorithm {
    sharding_count: usize,
}

impl HashModShardingAlgorithm {
    const TYPE_NAME: &'static str = "HASH_MOD";

    pub fn new(props: &Properties) -> Result<Self> {
        Ok(Self {
            sharding_count: sharding_count(Self::TYPE_NAME, props)?,
        })
    }
}

impl ShardingAlgorithm for HashModShardingAlgorithm {
    fn type_name(&self) -> &'static str {
        Self::TYPE_NAME
    }

    fn auto_tables_amount(&self) -> usize {
        self.sharding_count
    }

    fn partition_of(&self, value: &ShardingValue) -> Result<usize> {
        let hash = match value {
            ShardingValue::Integer(i) => i.unsigned_abs(),
            ShardingValue::Text(text) => stable_hash(text),
        };
        Ok((hash % self.sharding_count as u64) as usize)
    }

    fn partitions_in(&self, _range: &ValueRange) -> Result<Vec<usize>> {
        Ok(all_partitions(self.sharding_count))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ErrorKind;

    fn props(count: &str) -> Properties {
        let mut props = Properties::new();
        props.insert(SHARDING_COUNT_KEY.to_string(), count.to_string());
        props
    }

    #[test]
    fn test_mod_sharding() {
        let algorithm = ModShardingAlgorithm::new(&props("4")).unwrap();
        let targets: Vec<String> = (0..4).map(|i| format!("ds_{i}")).collect();
        assert_eq!(algorithm.do_sharding(&targets, &6i64.into()).unwrap().as_deref(), Some("ds_2"));
        assert_eq!(algorithm.partition_of(&(-1i64).into()).unwrap(), 3);
        assert_eq!(algorithm.partitions_in(&ValueRange::closed(5, 6)).unwrap(), vec![1, 2]);
        assert_eq!(algorithm.partitions_in(&ValueRange::at_least(0)).unwrap(), vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_mod_rejects_text_key() {
        let algorithm = ModShardingAlgorithm::new(&props("4")).unwrap();
        let err = algorithm.partition_of(&"user".into()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnsupportedShardingValue);
    }

    #[test]
    fn test_hash_mod_is_deterministic() {
        let algorithm = HashModShardingAlgorithm::new(&props("8")).unwrap();
        let first = algorithm.partition_of(&"user-42".into()).unwrap();
        let second = algorithm.partition_of(&"user-42".into()).unwrap();
        assert_eq!(first, second);
        assert!(first < 8);
        assert_eq!(algorithm.partition_of(&(-9i64).into()).unwrap(), 1);
    }

    #[test]
    fn test_invalid_sharding_count() {
        for count in ["0", "-3", "many"] {
            assert!(ModShardingAlgorithm::new(&props(count)).is_err());
            assert!(HashModShardingAlgorithm::new(&props(count)).is_err());
        }
        assert!(HashModShardingAlgorithm::new(&Properties::new()).is_err());
    }

    #[test]
    fn test_sharding_count_is_capped() {
        let limit = MAX_PARTITION_COUNT.to_string();
        let algorithm = HashModShardingAlgorithm::new(&props(&limit)).unwrap();
        assert_eq!(algorithm.partitions_in(&ValueRange::all()).unwrap().len(), MAX_PARTITION_COUNT);

        for count in ["65537", "1000000000000"] {
            let err = ModShardingAlgorithm::new(&props(count)).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::AlgorithmInitialization);
            let err = HashModShardingAlgorithm::new(&props(count)).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::AlgorithmInitialization);
        }
    }
}
