use std::collections::HashMap;
use std::sync::Arc;

use lazy_static::lazy_static;
use log::debug;

use super::{AlgorithmCategory, AlgorithmInstance};
use crate::core::{Properties, Result, RuleError};
use crate::readwrite::LoadBalanceAlgorithm;
use crate::readwrite::load_balance::{
    RandomLoadBalanceAlgorithm, RoundRobinLoadBalanceAlgorithm, WeightLoadBalanceAlgorithm,
};
use crate::sharding::{
    AutoIntervalShardingAlgorithm, BoundaryBasedRangeShardingAlgorithm, HashModShardingAlgorithm,
    ModShardingAlgorithm, ShardingAlgorithm, VolumeBasedRangeShardingAlgorithm,
};

type AlgorithmFactory = Box<dyn Fn(&Properties) -> Result<AlgorithmInstance> + Send + Sync>;

lazy_static! {
    static ref GLOBAL_REGISTRY: AlgorithmRegistry = AlgorithmRegistry::with_default_algorithms();
}

/// Factory table keyed by `(category, type name)`.
///
/// Populated once at startup; after that every lookup is a plain read and the
/// registry can be shared across threads without locking.
pub struct AlgorithmRegistry {
    factories: HashMap<(AlgorithmCategory, String), AlgorithmFactory>,
}

impl AlgorithmRegistry {
    pub fn new() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    /// Process-wide registry holding the built-in algorithms.
    pub fn global() -> &'static AlgorithmRegistry {
        &GLOBAL_REGISTRY
    }

    pub fn with_default_algorithms() -> Self {
        let mut registry = Self::new();

        registry.register_sharding("VOLUME_RANGE", VolumeBasedRangeShardingAlgorithm::new);
        registry.register_sharding("BOUNDARY_RANGE", BoundaryBasedRangeShardingAlgorithm::new);
        registry.register_sharding("AUTO_INTERVAL", AutoIntervalShardingAlgorithm::new);
        registry.register_sharding("MOD", ModShardingAlgorithm::new);
        registry.register_sharding("HASH_MOD", HashModShardingAlgorithm::new);

        registry.register_load_balancer("ROUND_ROBIN", |_| Ok(RoundRobinLoadBalanceAlgorithm::new()));
        registry.register_load_balancer("RANDOM", |_| Ok(RandomLoadBalanceAlgorithm));
        registry.register_load_balancer("WEIGHT", WeightLoadBalanceAlgorithm::new);

        registry
    }

    pub fn register_sharding<F, A>(&mut self, type_name: &str, factory: F)
    where
        F: Fn(&Properties) -> Result<A> + Send + Sync + 'static,
        A: ShardingAlgorithm + 'static,
    {
        self.register(
            AlgorithmCategory::Sharding,
            type_name,
            Box::new(move |props| Ok(AlgorithmInstance::Sharding(Arc::new(factory(props)?)))),
        );
    }

    pub fn register_load_balancer<F, A>(&mut self, type_name: &str, factory: F)
    where
        F: Fn(&Properties) -> Result<A> + Send + Sync + 'static,
        A: LoadBalanceAlgorithm + 'static,
    {
        self.register(
            AlgorithmCategory::LoadBalancer,
            type_name,
            Box::new(move |props| Ok(AlgorithmInstance::LoadBalancer(Arc::new(factory(props)?)))),
        );
    }

    fn register(&mut self, category: AlgorithmCategory, type_name: &str, factory: AlgorithmFactory) {
        debug!("Registered {} algorithm: {}", category, type_name);
        self.factories.insert((category, type_name.to_string()), factory);
    }

    /// Exact, case-sensitive lookup.
    pub fn contains(&self, category: AlgorithmCategory, type_name: &str) -> bool {
        self.factories
            .contains_key(&(category, type_name.to_string()))
    }

    pub fn registered_types(&self, category: AlgorithmCategory) -> Vec<&str> {
        let mut types: Vec<&str> = self
            .factories
            .keys()
            .filter(|(each, _)| *each == category)
            .map(|(_, type_name)| type_name.as_str())
            .collect();
        types.sort_unstable();
        types
    }

    /// Builds an algorithm instance; `owner` names the object asking for it
    /// and only shows up in the error.
    pub fn resolve(
        &self,
        category: AlgorithmCategory,
        type_name: &str,
        props: &Properties,
        owner: &str,
    ) -> Result<AlgorithmInstance> {
        let factory = self
            .factories
            .get(&(category, type_name.to_string()))
            .ok_or_else(|| RuleError::UnregisteredAlgorithm {
                category,
                names: vec![type_name.to_string()],
                owner: owner.to_string(),
            })?;
        factory(props)
    }

    pub fn resolve_sharding(
        &self,
        type_name: &str,
        props: &Properties,
        owner: &str,
    ) -> Result<Arc<dyn ShardingAlgorithm>> {
        match self.resolve(AlgorithmCategory::Sharding, type_name, props, owner)? {
            AlgorithmInstance::Sharding(algorithm) => Ok(algorithm),
            other => Err(RuleError::algorithm_init(
                type_name,
                format!("expected a sharding algorithm, got {}", other.category()),
            )),
        }
    }

    pub fn resolve_load_balancer(
        &self,
        type_name: &str,
        props: &Properties,
        owner: &str,
    ) -> Result<Arc<dyn LoadBalanceAlgorithm>> {
        match self.resolve(AlgorithmCategory::LoadBalancer, type_name, props, owner)? {
            AlgorithmInstance::LoadBalancer(algorithm) => Ok(algorithm),
            other => Err(RuleError::algorithm_init(
                type_name,
                format!("expected a load balancer, got {}", other.category()),
            )),
        }
    }
}

impl Default for AlgorithmRegistry {
    fn default() -> Self {
        Self::with_default_algorithms()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ErrorKind;

    #[test]
    fn test_default_registry_types() {
        let registry = AlgorithmRegistry::with_default_algorithms();
        assert_eq!(
            registry.registered_types(AlgorithmCategory::LoadBalancer),
            vec!["RANDOM", "ROUND_ROBIN", "WEIGHT"]
        );
        assert!(registry.contains(AlgorithmCategory::Sharding, "VOLUME_RANGE"));
        assert!(!registry.contains(AlgorithmCategory::LoadBalancer, "VOLUME_RANGE"));
    }

    #[test]
    fn test_lookup_is_case_sensitive() {
        let registry = AlgorithmRegistry::global();
        let err = registry
            .resolve_load_balancer("round_robin", &Properties::new(), "readwrite_ds")
            .unwrap_err();
        match err {
            RuleError::UnregisteredAlgorithm { category, names, owner } => {
                assert_eq!(category, AlgorithmCategory::LoadBalancer);
                assert_eq!(names, vec!["round_robin".to_string()]);
                assert_eq!(owner, "readwrite_ds");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_resolve_propagates_initialization_failure() {
        let err = AlgorithmRegistry::global()
            .resolve_sharding("VOLUME_RANGE", &Properties::new(), "t_order")
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::AlgorithmInitialization);
    }

    #[test]
    fn test_register_custom_load_balancer() {
        let mut registry = AlgorithmRegistry::new();
        registry.register_load_balancer("FIRST", |_| Ok(RandomLoadBalanceAlgorithm));
        let instance = registry
            .resolve(AlgorithmCategory::LoadBalancer, "FIRST", &Properties::new(), "test")
            .unwrap();
        assert_eq!(instance.category(), AlgorithmCategory::LoadBalancer);
    }
}
