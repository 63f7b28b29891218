pub mod registry;

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::readwrite::LoadBalanceAlgorithm;
use crate::sharding::ShardingAlgorithm;

pub use registry::AlgorithmRegistry;

/// Family an algorithm type name is registered under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AlgorithmCategory {
    Sharding,
    LoadBalancer,
}

impl fmt::Display for AlgorithmCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AlgorithmCategory::Sharding => write!(f, "SHARDING"),
            AlgorithmCategory::LoadBalancer => write!(f, "LOAD_BALANCER"),
        }
    }
}

/// A resolved algorithm, ready to be shared by rule objects.
#[derive(Clone)]
pub enum AlgorithmInstance {
    Sharding(Arc<dyn ShardingAlgorithm>),
    LoadBalancer(Arc<dyn LoadBalanceAlgorithm>),
}

impl AlgorithmInstance {
    pub fn category(&self) -> AlgorithmCategory {
        match self {
            AlgorithmInstance::Sharding(_) => AlgorithmCategory::Sharding,
            AlgorithmInstance::LoadBalancer(_) => AlgorithmCategory::LoadBalancer,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            AlgorithmInstance::Sharding(algorithm) => algorithm.type_name(),
            AlgorithmInstance::LoadBalancer(algorithm) => algorithm.type_name(),
        }
    }
}

impl fmt::Debug for AlgorithmInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AlgorithmInstance")
            .field("category", &self.category())
            .field("type", &self.type_name())
            .finish()
    }
}
