//! Configuration file flowing through to regime construction.

use std::fs;
use std::path::PathBuf;

use pretty_assertions::assert_eq;
use rust_decimal_macros::dec;
use salary_cli::{AppConfig, ConfigFileError, parse_salary};
use salary_core::{RegimeRegistry, calculate_net_salary};

/// Writes `contents` to a file unique to this test process.
fn setup_config_file(
    name: &str,
    contents: &str,
) -> PathBuf {
    let path = std::env::temp_dir().join(format!("salary-cli-{}-{name}.toml", std::process::id()));
    fs::write(&path, contents).expect("temp file is writable");
    path
}

#[test]
fn test_fallback_override_changes_converted_thresholds() {
    let path = setup_config_file(
        "override",
        r#"
        [currency.fallback_rates]
        CZK = "20"
        "#,
    );

    let config = AppConfig::load(&path).expect("valid config");
    let rates = config.currency.fallback().expect("valid rates");
    let registry = RegimeRegistry::builtin(&rates).expect("regimes build");
    let salary = parse_salary("100,000").expect("valid salary");

    let result = calculate_net_salary(&registry, "czechia-salaried", salary).expect("calculation succeeds");

    // 1,867,728 CZK / 20
    assert_eq!(result.income_tax_brackets[0].upper_bound(), dec!(93386.4));
    assert_eq!(result.income_tax_brackets[1].taxable_amount(), dec!(6613.6));

    fs::remove_file(path).ok();
}

#[test]
fn test_default_regimes_are_read() {
    let path = setup_config_file(
        "defaults",
        r#"
        [defaults]
        regimes = ["portugal-salaried", "bulgaria-freelancer"]
        "#,
    );

    let config = AppConfig::load(&path).expect("valid config");

    assert_eq!(config.defaults.regimes, vec!["portugal-salaried", "bulgaria-freelancer"]);
    assert_eq!(config.currency.cache_ttl_hours, 24);

    fs::remove_file(path).ok();
}

#[test]
fn test_cache_ttl_leaves_offline_results_unchanged() {
    let path = setup_config_file("ttl", "[currency]\ncache_ttl_hours = 1\n");

    let config = AppConfig::load(&path).expect("valid config");
    let configured = RegimeRegistry::builtin(&config.currency.fallback().expect("valid rates")).expect("regimes build");
    let default = RegimeRegistry::builtin(&AppConfig::default().currency.fallback().expect("valid rates"))
        .expect("regimes build");

    let with_ttl = calculate_net_salary(&configured, "israel-salaried", dec!(90000)).expect("calculation succeeds");
    let without = calculate_net_salary(&default, "israel-salaried", dec!(90000)).expect("calculation succeeds");

    assert_eq!(config.currency.cache_ttl_hours, 1);
    assert_eq!(with_ttl, without);

    fs::remove_file(path).ok();
}

#[test]
fn test_malformed_file_is_an_error() {
    let path = setup_config_file("malformed", "[currency\ncache_ttl_hours = ");

    let result = AppConfig::load(&path);

    assert!(matches!(result, Err(ConfigFileError::Parse { .. })));

    fs::remove_file(path).ok();
}

#[test]
fn test_non_positive_fallback_rate_is_rejected() {
    let config = AppConfig::parse(
        r#"
        [currency.fallback_rates]
        ILS = "0"
        "#,
    )
    .expect("syntactically valid");

    assert!(config.currency.fallback().is_err());
}
