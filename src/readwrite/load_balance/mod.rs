mod random;
mod round_robin;
mod weight;

pub use random::RandomLoadBalanceAlgorithm;
pub use round_robin::RoundRobinLoadBalanceAlgorithm;
pub use weight::WeightLoadBalanceAlgorithm;

use crate::core::{Result, RuleError};

/// Picks one read data source among the currently eligible ones.
pub trait LoadBalanceAlgorithm: Send + Sync {
    fn type_name(&self) -> &'static str;

    /// `read_data_source_names` is the already filtered, non-empty candidate
    /// list; callers fall back to the write data source when nothing is left.
    fn target_name(&self, group_name: &str, read_data_source_names: &[String]) -> Result<String>;
}

impl std::fmt::Debug for dyn LoadBalanceAlgorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoadBalanceAlgorithm").field("type", &self.type_name()).finish()
    }
}

fn ensure_candidates(group_name: &str, read_data_source_names: &[String]) -> Result<()> {
    if read_data_source_names.is_empty() {
        return Err(RuleError::NoAvailableReadSource {
            rule: group_name.to_string(),
        });
    }
    Ok(())
}
