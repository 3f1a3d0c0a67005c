//! Integration tests for configuration parsing and handling.
//!
//! These tests verify that `prax-hydrate.toml` files are read the way the
//! hydrator expects them.

use std::io::Write;

use prax_hydrate::HydratorConfig;
use prax_hydrate::engine::ErrorCode;
use prax_hydrate::engine::config::CONFIG_FILE_NAME;

/// Test minimal configuration
#[test]
fn test_config_minimal() {
    let config: HydratorConfig = toml::from_str("").expect("Failed to parse config");
    assert_eq!(config.hydration.delimiter, '.');
    assert!(!config.debug.log_queries);
    assert!(config.presets.is_empty());
}

/// Test full configuration with all options
#[test]
fn test_config_full() {
    let config_str = r#"
        [hydration]
        delimiter = "."

        [debug]
        log_queries = false
        slow_query_threshold = 1000

        [presets]
        Order = ["customer.address", "items.product"]
        Customer = ["orders"]

        [environments.development.debug]
        log_queries = true
        slow_query_threshold = 50
    "#;

    let config: HydratorConfig = toml::from_str(config_str).expect("Failed to parse config");
    assert_eq!(config.presets_for("Order"), ["customer.address", "items.product"]);

    // presets keep the file order
    let models: Vec<_> = config.presets.keys().map(String::as_str).collect();
    assert_eq!(models, ["Order", "Customer"]);

    let development = config.with_environment("development");
    assert!(development.debug.log_queries);
    assert_eq!(development.debug.slow_query_threshold, 50);
}

/// Test environment variable interpolation
#[test]
fn test_config_env_vars() {
    // SAFETY: This test is the only one touching this variable
    unsafe {
        std::env::set_var("PRAX_HYDRATE_IT_ORDER_PATH", "customer.address");
    }

    let config = HydratorConfig::from_str(
        r#"
        [presets]
        Order = ["${PRAX_HYDRATE_IT_ORDER_PATH}"]
        "#,
    )
    .expect("Failed to parse config");

    unsafe {
        std::env::remove_var("PRAX_HYDRATE_IT_ORDER_PATH");
    }
    assert_eq!(config.presets_for("Order"), ["customer.address"]);
}

/// Test loading from disk
#[test]
fn test_config_from_file() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let path = dir.path().join(CONFIG_FILE_NAME);
    let mut file = std::fs::File::create(&path).expect("Failed to create config file");
    writeln!(file, "[hydration]\ndelimiter = \"/\"\n\n[presets]\nOrder = [\"items/product\"]")
        .expect("Failed to write config file");

    let config = HydratorConfig::from_file(&path).expect("Failed to load config");
    assert_eq!(config.hydration.delimiter, '/');
    assert_eq!(config.presets_for("Order"), ["items/product"]);
}

/// Test configuration errors
#[test]
fn test_config_errors() {
    let unknown = HydratorConfig::from_str("[debug]\npretty_sql = true\n").unwrap_err();
    assert_eq!(unknown.code, ErrorCode::InvalidConfiguration);

    let whitespace = HydratorConfig::from_str("[hydration]\ndelimiter = \" \"\n").unwrap_err();
    assert_eq!(whitespace.code, ErrorCode::InvalidConfiguration);
    assert!(whitespace.context.help.is_some());

    let missing = HydratorConfig::from_file("/nonexistent/prax-hydrate.toml").unwrap_err();
    assert_eq!(missing.code, ErrorCode::InvalidConfiguration);
    assert!(std::error::Error::source(&missing).is_some());
}
