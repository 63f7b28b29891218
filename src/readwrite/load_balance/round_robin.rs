use std::collections::HashMap;
use std::sync::RwLock;
use std::sync::atomic::{AtomicUsize, Ordering};

use super::{LoadBalanceAlgorithm, ensure_candidates};
use crate::core::Result;

/// Cycles through the candidates, one counter per data-source group.
#[derive(Debug, Default)]
pub struct RoundRobinLoadBalanceAlgorithm {
    counters: RwLock<HashMap<String, AtomicUsize>>,
}

impl RoundRobinLoadBalanceAlgorithm {
    pub fn new() -> Self {
        Self::default()
    }

    fn next_ticket(&self, group_name: &str) -> Result<usize> {
        if let Some(counter) = self.counters.read()?.get(group_name) {
            return Ok(counter.fetch_add(1, Ordering::Relaxed));
        }
        let mut counters = self.counters.write()?;
        let counter = counters
            .entry(group_name.to_string())
            .or_insert_with(|| AtomicUsize::new(0));
        Ok(counter.fetch_add(1, Ordering::Relaxed))
    }
}

impl LoadBalanceAlgorithm for RoundRobinLoadBalanceAlgorithm {
    fn type_name(&self) -> &'static str {
        "ROUND_ROBIN"
    }

    fn target_name(&self, group_name: &str, read_data_source_names: &[String]) -> Result<String> {
        ensure_candidates(group_name, read_data_source_names)?;
        let ticket = self.next_ticket(group_name)?;
        Ok(read_data_source_names[ticket % read_data_source_names.len()].clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_robin_cycles_per_group() {
        let algorithm = RoundRobinLoadBalanceAlgorithm::new();
        let candidates = vec!["read_ds_0".to_string(), "read_ds_1".to_string()];
        assert_eq!(algorithm.target_name("rw_0", &candidates).unwrap(), "read_ds_0");
        assert_eq!(algorithm.target_name("rw_0", &candidates).unwrap(), "read_ds_1");
        assert_eq!(algorithm.target_name("rw_1", &candidates).unwrap(), "read_ds_0");
        assert_eq!(algorithm.target_name("rw_0", &candidates).unwrap(), "read_ds_0");
    }

    #[test]
    fn test_round_robin_empty_candidates() {
        let algorithm = RoundRobinLoadBalanceAlgorithm::new();
        assert!(algorithm.target_name("rw_0", &[]).is_err());
    }
}
