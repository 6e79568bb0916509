//! Configuration defaults and YAML overrides

use std::time::Duration;

use court_case_fetcher::{Config, load_yaml_config, parse_yaml_config};

#[test]
fn defaults_match_portal() {
    let config = Config::default();

    assert_eq!(config.portal.search_url, "https://delhihighcourt.nic.in/app/case-number");
    assert_eq!(config.portal.no_data_marker, "No data available in table");
    assert_eq!(config.portal.selectors.token, "input[name='_token']");
    assert_eq!(config.portal.selectors.captcha, "#captcha-code");
    assert_eq!(config.portal.selectors.submit, "#search");
    assert!(config.browser.headless);
    assert_eq!((config.browser.window.width, config.browser.window.height), (1920, 1080));
    assert_eq!(config.timing.page_settle(), Duration::from_secs(3));
    assert_eq!(config.timing.results_settle(), Duration::from_secs(5));
    assert_eq!(config.timing.results_timeout(), Duration::from_secs(10));
    assert_eq!(config.server.history_limit, 50);
    assert!(config.validate().is_ok());
}

#[test]
fn empty_document_is_all_defaults() {
    let config = parse_yaml_config("{}").unwrap();

    assert_eq!(config.server.bind, "127.0.0.1:5000");
    assert_eq!(config.database.path.to_str(), Some("court_data.db"));
}

#[test]
fn partial_overrides_keep_other_defaults() {
    let yaml = r#"
portal:
  selectors:
    submit: "button[type=submit]"
browser:
  headless: false
  window:
    width: 1280
timing:
  page_settle_ms: 0
server:
  max_filing_year: 2025
"#;

    let config = parse_yaml_config(yaml).unwrap();

    assert_eq!(config.portal.selectors.submit, "button[type=submit]");
    assert_eq!(config.portal.selectors.captcha, "#captcha-code");
    assert!(!config.browser.headless);
    assert_eq!(config.browser.window.width, 1280);
    assert_eq!(config.browser.window.height, 1080);
    assert_eq!(config.timing.page_settle(), Duration::ZERO);
    assert_eq!(config.timing.results_settle_ms, 5_000);
    assert_eq!(config.server.max_filing_year, Some(2025));
}

#[test]
fn invalid_search_url_is_rejected() {
    let err = parse_yaml_config("portal:\n  search_url: \"not a url\"\n").unwrap_err();
    assert!(format!("{err:#}").contains("search_url"));
}

#[test]
fn timeouts_over_caps_are_rejected() {
    assert!(parse_yaml_config("timing:\n  results_timeout_ms: 60000\n").is_err());
    assert!(parse_yaml_config("browser:\n  navigation_timeout_ms: 600000\n").is_err());
}

#[test]
fn zero_window_is_rejected() {
    assert!(parse_yaml_config("browser:\n  window:\n    height: 0\n").is_err());
}

#[test]
fn explicit_config_file_is_loaded() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("court.yaml");
    std::fs::write(&path, "server:\n  bind: \"0.0.0.0:8080\"\n").unwrap();

    let config = load_yaml_config(Some(&path)).unwrap();
    assert_eq!(config.server.bind, "0.0.0.0:8080");
}

#[test]
fn missing_explicit_config_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    assert!(load_yaml_config(Some(&dir.path().join("absent.yaml"))).is_err());
}

#[test]
fn example_config_parses() {
    let config = parse_yaml_config(include_str!("../config.example.yaml")).unwrap();
    assert_eq!(config.timing.results_timeout_ms, 10_000);
}
