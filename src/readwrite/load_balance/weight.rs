use std::collections::HashMap;

use rand::{Rng, rng};

use super::{LoadBalanceAlgorithm, ensure_candidates};
use crate::core::{Properties, Result, RuleError};

const TYPE_NAME: &str = "WEIGHT";

/// Weighted random choice; props map a read data source name to its weight.
///
/// Candidates without a configured weight are never chosen.
#[derive(Debug, Clone)]
pub struct WeightLoadBalanceAlgorithm {
    weights: HashMap<String, f64>,
}

impl WeightLoadBalanceAlgorithm {
    pub fn new(props: &Properties) -> Result<Self> {
        let mut weights = HashMap::with_capacity(props.len());
        for (name, raw) in props {
            let weight = raw.trim().parse::<f64>().map_err(|_| {
                RuleError::algorithm_init(
                    TYPE_NAME,
                    format!("Weight of read data source '{}' is not a number: '{}'.", name, raw),
                )
            })?;
            if !weight.is_finite() || weight < 0.0 {
                return Err(RuleError::algorithm_init(
                    TYPE_NAME,
                    format!("Weight of read data source '{}' must be a non-negative number.", name),
                ));
            }
            weights.insert(name.clone(), weight);
        }
        Ok(Self { weights })
    }

    fn weight_of(&self, name: &str) -> f64 {
        self.weights.get(name).copied().unwrap_or(0.0)
    }
}

impl LoadBalanceAlgorithm for WeightLoadBalanceAlgorithm {
    fn type_name(&self) -> &'static str {
        TYPE_NAME
    }

    fn target_name(&self, group_name: &str, read_data_source_names: &[String]) -> Result<String> {
        ensure_candidates(group_name, read_data_source_names)?;
        let total: f64 = read_data_source_names.iter().map(|name| self.weight_of(name)).sum();
        if total <= 0.0 {
            return Err(RuleError::NoAvailableReadSource {
                rule: group_name.to_string(),
            });
        }

        let mut point = rng().random_range(0.0..total);
        let mut last_weighted = None;
        for name in read_data_source_names {
            let weight = self.weight_of(name);
            if weight <= 0.0 {
                continue;
            }
            if point < weight {
                return Ok(name.clone());
            }
            point -= weight;
            last_weighted = Some(name);
        }
        // float rounding can leave `point` a hair above the final weight
        last_weighted.cloned().ok_or_else(|| RuleError::NoAvailableReadSource {
            rule: group_name.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ErrorKind;

    fn props(entries: &[(&str, &str)]) -> Properties {
        entries
            .iter()
            .map(|(name, weight)| (name.to_string(), weight.to_string()))
            .collect()
    }

    #[test]
    fn test_only_weighted_candidates_are_chosen() {
        let algorithm = WeightLoadBalanceAlgorithm::new(&props(&[("read_ds_0", "0"), ("read_ds_1", "3")])).unwrap();
        let candidates = vec!["read_ds_0".to_string(), "read_ds_1".to_string(), "read_ds_2".to_string()];
        for _ in 0..32 {
            assert_eq!(algorithm.target_name("rw", &candidates).unwrap(), "read_ds_1");
        }
    }

    #[test]
    fn test_no_weighted_candidate() {
        let algorithm = WeightLoadBalanceAlgorithm::new(&props(&[("read_ds_0", "1")])).unwrap();
        let err = algorithm.target_name("rw", &["read_ds_9".to_string()]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NoAvailableReadSource);
    }

    #[test]
    fn test_invalid_weight() {
        for weight in ["heavy", "-1", "inf"] {
            let err = WeightLoadBalanceAlgorithm::new(&props(&[("read_ds_0", weight)])).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::AlgorithmInitialization);
        }
    }
}
