use vault_core::config::*;
use vault_core::VaultError;

#[test]
fn config_loads_from_empty_toml_with_all_defaults() {
    let config = VaultConfig::from_toml("").unwrap();

    // Routing defaults
    assert_eq!(config.routing.mf_threshold_high, 0.75);
    assert_eq!(config.routing.semantic_polarity_threshold, 0.5);
    assert_eq!(config.routing.entropy_balance_threshold, 0.26);
    assert_eq!(config.routing.cls_angle_proximity_deg, 15.0);

    // Friction defaults
    assert_eq!(config.friction.mfg_threshold, 0.5);
    assert_eq!(config.friction.scar_delay_cycles, 2);

    // Fracture defaults
    assert_eq!(config.fracture.vsi_fracture_threshold, 0.8);
    assert_eq!(config.fracture.isolation_cycles, 3);
    assert_eq!(config.fracture.fallback_throttle_rate, 50);
    assert_eq!(config.fracture.quarantine_idi_threshold, 0.72);
    assert_eq!(config.fracture.suspend_idi_threshold, 0.80);
    assert_eq!(config.fracture.echo_friction_threshold, 0.68);

    // Optimization defaults
    assert_eq!(config.optimization.drift_depth_threshold, 12);
    assert_eq!(config.optimization.scar_density_threshold, 25);
    assert_eq!(config.optimization.density_window_cycles, 100);
    assert_eq!(config.optimization.entropy_slope_threshold, 0.05);
    assert_eq!(config.optimization.entropy_history_window, 500);
    assert_eq!(config.optimization.thread_overlap_threshold, 0.85);
    assert_eq!(config.optimization.memory_usage_threshold, 0.90);
    assert_eq!(config.optimization.low_entropy_cluster_cutoff, 0.43);
    assert_eq!(config.optimization.compression_entropy_threshold, 5.0);
    assert!(config.optimization.rng_seed.is_none());

    // Retention defaults
    assert_eq!(config.retention.irs_cutoff, 0.12);

    // Observability defaults
    assert_eq!(config.observability.log_level, "info");
}

#[test]
fn config_loads_partial_toml_with_overrides() {
    let toml = r#"
[routing]
entropy_balance_threshold = 1.5

[fracture]
isolation_cycles = 5

[optimization]
rng_seed = 42
"#;
    let config = VaultConfig::from_toml(toml).unwrap();
    assert_eq!(config.routing.entropy_balance_threshold, 1.5);
    assert_eq!(config.fracture.isolation_cycles, 5);
    assert_eq!(config.optimization.rng_seed, Some(42));
    // Non-overridden fields keep defaults
    assert_eq!(config.routing.mf_threshold_high, 0.75);
    assert_eq!(config.fracture.fallback_throttle_rate, 50);
}

#[test]
fn malformed_toml_is_a_config_error() {
    let err = VaultConfig::from_toml("[routing\nmf_threshold_high = ").unwrap_err();
    assert!(matches!(err, VaultError::Config(_)));
}

#[test]
fn zero_isolation_cycles_rejected() {
    let err = VaultConfig::from_toml("[fracture]\nisolation_cycles = 0").unwrap_err();
    assert!(err.to_string().contains("isolation_cycles"));
}

#[test]
fn suspend_threshold_below_quarantine_rejected() {
    let toml = r#"
[fracture]
quarantine_idi_threshold = 0.9
suspend_idi_threshold = 0.8
"#;
    assert!(VaultConfig::from_toml(toml).is_err());
}

#[test]
fn out_of_unit_range_threshold_rejected() {
    assert!(VaultConfig::from_toml("[friction]\nmfg_threshold = 1.5").is_err());
}

#[test]
fn config_round_trips_through_toml() {
    let config = VaultConfig::default();
    let serialized = toml::to_string(&config).unwrap();
    let parsed = VaultConfig::from_toml(&serialized).unwrap();
    assert_eq!(parsed.fracture.isolation_cycles, config.fracture.isolation_cycles);
    assert_eq!(parsed.retention.irs_cutoff, config.retention.irs_cutoff);
}
