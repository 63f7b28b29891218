/// Read/write splitting rule tests
///
/// Disabled read sources, read source selection and rule rebuilds
/// Run with: cargo test --test readwrite_rule_tests

use std::collections::BTreeMap;
use std::sync::Arc;

use rustshard::{
    AlgorithmConfiguration, AlgorithmRegistry, ErrorKind, Properties, ReadwriteSplittingDataSourceRuleConfiguration,
    ReadwriteSplittingRule, ReadwriteSplittingRuleConfiguration, RuleEngineConfig, TransactionalReadQueryStrategy,
};

fn names(names: &[&str]) -> Vec<String> {
    names.iter().map(|each| each.to_string()).collect()
}

fn configuration() -> ReadwriteSplittingRuleConfiguration {
    let mut weights = Properties::new();
    weights.insert("read_ds_2".to_string(), "1".to_string());
    weights.insert("read_ds_3".to_string(), "0".to_string());

    let mut load_balancers = BTreeMap::new();
    load_balancers.insert("random".to_string(), AlgorithmConfiguration::new("RANDOM", Properties::new()));
    load_balancers.insert("weight".to_string(), AlgorithmConfiguration::new("WEIGHT", weights));

    ReadwriteSplittingRuleConfiguration::new(
        vec![
            ReadwriteSplittingDataSourceRuleConfiguration::new(
                "pr_ds",
                "write_ds",
                names(&["read_ds_0", "read_ds_1"]),
                Some("random".to_string()),
            ),
            ReadwriteSplittingDataSourceRuleConfiguration::new(
                "weighted_ds",
                "write_ds_1",
                names(&["read_ds_2", "read_ds_3"]),
                Some("weight".to_string()),
            ),
            ReadwriteSplittingDataSourceRuleConfiguration::new("default_ds", "write_ds_2", names(&["read_ds_4"]), None)
                .with_transactional_read_query_strategy(TransactionalReadQueryStrategy::Fixed),
        ],
        load_balancers,
    )
}

fn rule() -> ReadwriteSplittingRule {
    ReadwriteSplittingRule::new(configuration(), AlgorithmRegistry::global(), &RuleEngineConfig::new()).unwrap()
}

#[test]
fn test_filter_after_disable_and_enable() {
    let rule = rule();
    let pr_ds = rule.data_source_rule("pr_ds").unwrap();
    let candidates = names(&["read_ds_0", "read_ds_1"]);

    pr_ds.update_disabled_data_source_names("read_ds_0", true);
    assert_eq!(pr_ds.filter(&candidates), names(&["read_ds_1"]));

    pr_ds.update_disabled_data_source_names("read_ds_0", false);
    assert_eq!(pr_ds.filter(&candidates), candidates);
}

#[test]
fn test_filter_is_order_preserving_and_idempotent() {
    let rule = rule();
    let pr_ds = rule.data_source_rule("pr_ds").unwrap();
    let candidates = names(&["read_ds_3", "read_ds_1", "read_ds_0", "read_ds_2"]);

    pr_ds.update_disabled_data_source_names("read_ds_1", true);
    pr_ds.update_disabled_data_source_names("read_ds_1", true);
    pr_ds.update_disabled_data_source_names("unknown_ds", true);

    let once = pr_ds.filter(&candidates);
    assert_eq!(once, names(&["read_ds_3", "read_ds_0", "read_ds_2"]));
    assert_eq!(pr_ds.filter(&once), once);
}

#[test]
fn test_all_disabled_yields_empty_list() {
    let rule = rule();
    let pr_ds = rule.data_source_rule("pr_ds").unwrap();
    pr_ds.update_disabled_data_source_names("read_ds_0", true);
    pr_ds.update_disabled_data_source_names("read_ds_1", true);

    let enabled = pr_ds.enabled_read_data_source_names();
    assert!(enabled.is_empty());
    let err = pr_ds.select_read_source(&enabled).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NoAvailableReadSource);
}

#[test]
fn test_select_read_source_uses_configured_load_balancer() {
    let rule = rule();

    let pr_ds = rule.data_source_rule("pr_ds").unwrap();
    assert_eq!(pr_ds.load_balancer().type_name(), "RANDOM");
    for _ in 0..20 {
        let selected = pr_ds.select_read_source(&names(&["read_ds_0", "read_ds_1"])).unwrap();
        assert!(selected == "read_ds_0" || selected == "read_ds_1");
    }

    let weighted = rule.data_source_rule("weighted_ds").unwrap();
    for _ in 0..20 {
        assert_eq!(weighted.select_read_source(&weighted.enabled_read_data_source_names()).unwrap(), "read_ds_2");
    }
}

#[test]
fn test_defaults_come_from_engine_config() {
    let rule = rule();

    let default_ds = rule.data_source_rule("default_ds").unwrap();
    assert_eq!(default_ds.load_balancer().type_name(), "ROUND_ROBIN");
    assert_eq!(default_ds.transactional_read_query_strategy(), TransactionalReadQueryStrategy::Fixed);

    let pr_ds = rule.data_source_rule("pr_ds").unwrap();
    assert_eq!(pr_ds.transactional_read_query_strategy(), TransactionalReadQueryStrategy::Dynamic);

    let rule = ReadwriteSplittingRule::new(
        configuration(),
        AlgorithmRegistry::global(),
        &RuleEngineConfig::new()
            .default_load_balancer_type("RANDOM")
            .default_transactional_read_query_strategy(TransactionalReadQueryStrategy::Always),
    )
    .unwrap();
    let default_ds = rule.data_source_rule("default_ds").unwrap();
    assert_eq!(default_ds.load_balancer().type_name(), "RANDOM");
    assert_eq!(
        rule.data_source_rule("pr_ds").unwrap().transactional_read_query_strategy(),
        TransactionalReadQueryStrategy::Always
    );
}

#[test]
fn test_dangling_load_balancer_name_is_rejected() {
    let mut configuration = configuration();
    configuration.data_sources[0].load_balancer_name = Some("missing".to_string());

    let err = ReadwriteSplittingRule::new(configuration, AlgorithmRegistry::global(), &RuleEngineConfig::new())
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnregisteredAlgorithm);
}

#[test]
fn test_unregistered_load_balancer_type_is_rejected() {
    let mut configuration = configuration();
    configuration
        .load_balancers
        .insert("random".to_string(), AlgorithmConfiguration::new("UNKNOWN", Properties::new()));

    let err = ReadwriteSplittingRule::new(configuration, AlgorithmRegistry::global(), &RuleEngineConfig::new())
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnregisteredAlgorithm);
}

#[test]
fn test_rebuild_carries_disabled_sources() {
    let previous = rule();
    previous
        .update_disabled_data_source_names("pr_ds", "read_ds_0", true)
        .unwrap();

    let carried = ReadwriteSplittingRule::rebuild(
        configuration(),
        AlgorithmRegistry::global(),
        &RuleEngineConfig::new(),
        Some(&previous),
    )
    .unwrap();
    assert_eq!(
        carried.data_source_rule("pr_ds").unwrap().enabled_read_data_source_names(),
        names(&["read_ds_1"])
    );

    let fresh = ReadwriteSplittingRule::rebuild(
        configuration(),
        AlgorithmRegistry::global(),
        &RuleEngineConfig::new().carry_disabled_sources_on_rebuild(false),
        Some(&previous),
    )
    .unwrap();
    assert_eq!(
        fresh.data_source_rule("pr_ds").unwrap().enabled_read_data_source_names(),
        names(&["read_ds_0", "read_ds_1"])
    );
}

#[test]
fn test_update_disabled_on_unknown_group() {
    let err = rule()
        .update_disabled_data_source_names("missing", "read_ds_0", true)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::MissingRequiredRule);
}

#[test]
fn test_concurrent_disable_and_filter() {
    let rule = Arc::new(rule());
    let pr_ds = rule.data_source_rule("pr_ds").unwrap();
    let candidates = names(&["read_ds_0", "read_ds_1"]);

    let writer = {
        let pr_ds = Arc::clone(&pr_ds);
        std::thread::spawn(move || {
            for i in 0..1000 {
                pr_ds.update_disabled_data_source_names("read_ds_0", i % 2 == 0);
            }
        })
    };
    for _ in 0..1000 {
        let filtered = pr_ds.filter(&candidates);
        assert!(filtered == candidates || filtered == names(&["read_ds_1"]));
    }
    writer.join().unwrap();

    // last write was i = 999, which enables read_ds_0 again
    assert_eq!(pr_ds.filter(&candidates), candidates);
}

#[test]
fn test_persisted_configuration_shape() {
    let json = r#"{
        "readWriteSplittingRules": [
            {
                "name": "pr_ds",
                "writeDataSourceName": "write_ds",
                "readDataSourceNames": ["read_ds_0", "read_ds_1"],
                "loadBalancerName": "random"
            },
            {
                "name": "default_ds",
                "writeDataSourceName": "write_ds_2",
                "readDataSourceNames": ["read_ds_4"],
                "loadBalancerName": null
            }
        ],
        "loadBalancers": {
            "random": { "type": "RANDOM", "props": {} }
        }
    }"#;
    let configuration: ReadwriteSplittingRuleConfiguration = serde_json::from_str(json).unwrap();

    assert_eq!(configuration.rule_names(), vec!["pr_ds", "default_ds"]);
    assert_eq!(configuration.data_sources[1].load_balancer_name, None);
    assert_eq!(configuration.load_balancers["random"].algorithm_type(), "RANDOM");
    assert!(configuration.unused_load_balancers().is_empty());
}
