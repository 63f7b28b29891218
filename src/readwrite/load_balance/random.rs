use rand::{Rng, rng};

use super::{LoadBalanceAlgorithm, ensure_candidates};
use crate::core::Result;

#[derive(Debug, Clone, Copy, Default)]
pub struct RandomLoadBalanceAlgorithm;

impl LoadBalanceAlgorithm for RandomLoadBalanceAlgorithm {
    fn type_name(&self) -> &'static str {
        "RANDOM"
    }

    fn target_name(&self, group_name: &str, read_data_source_names: &[String]) -> Result<String> {
        ensure_candidates(group_name, read_data_source_names)?;
        let index = rng().random_range(0..read_data_source_names.len());
        Ok(read_data_source_names[index].clone())
    }
}
