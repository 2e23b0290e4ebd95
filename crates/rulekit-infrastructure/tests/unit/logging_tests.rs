//! Logging helper tests

use rulekit_domain::Error;
use rulekit_infrastructure::logging::verbosity_level;
use rulekit_infrastructure::{LoggingConfig, init_logging, parse_log_level};
use tracing::Level;

#[test]
fn test_parse_log_level() {
    assert_eq!(parse_log_level("trace").unwrap(), Level::TRACE);
    assert_eq!(parse_log_level("DEBUG").unwrap(), Level::DEBUG);
    assert_eq!(parse_log_level("info").unwrap(), Level::INFO);
    assert_eq!(parse_log_level("warning").unwrap(), Level::WARN);
    assert_eq!(parse_log_level("Error").unwrap(), Level::ERROR);
}

#[test]
fn test_parse_log_level_rejects_unknown() {
    let error = parse_log_level("verbose").unwrap_err();
    assert!(matches!(error, Error::Configuration { .. }));
    assert!(error.to_string().contains("verbose"));
}

#[test]
fn test_init_logging_rejects_unknown_level() {
    let config = LoggingConfig {
        level: "chatty".to_string(),
        json_format: false,
    };
    assert!(matches!(
        init_logging(&config),
        Err(Error::Configuration { .. })
    ));
}

#[test]
fn test_verbosity_level() {
    assert_eq!(verbosity_level("warn", 0), "warn");
    assert_eq!(verbosity_level("warn", 1), "debug");
    assert_eq!(verbosity_level("info", 3), "trace");
}
