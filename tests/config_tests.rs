//! Configuration loading tests.
//!
//! These exercise the layered environment merge, the aggregate missing-key
//! report, value parsing and the certificate read against real files in a
//! temporary directory.

use bedrock::config::database::Dialect;
use bedrock::config::env_file::{EnvMap, REQUIRED_KEYS};
use bedrock::config::Config;
use bedrock::error::ConfigError;
use std::fs;
use tempfile::TempDir;

const CERT_PEM: &[u8] = b"-----BEGIN CERTIFICATE-----\nMIIBfake\n-----END CERTIFICATE-----\n";

fn base_dir(env_contents: Option<&str>, with_cert: bool) -> TempDir {
    let dir = TempDir::new().expect("temp dir");
    if let Some(contents) = env_contents {
        fs::write(dir.path().join(".env"), contents).expect("write .env");
    }
    if with_cert {
        fs::write(dir.path().join("ca.pem"), CERT_PEM).expect("write ca.pem");
    }
    dir
}

fn full_env() -> EnvMap {
    [
        ("DB_HOST", "localhost"),
        ("DB_PORT", "3306"),
        ("DB_USER", "svc"),
        ("DB_PASSWORD", "secret"),
        ("DB_NAME", "app"),
        ("DB_DIALECT", "mysql"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect()
}

fn missing_from(err: ConfigError) -> Vec<String> {
    match err {
        ConfigError::MissingVariables(keys) => keys,
        other => panic!("expected MissingVariables, got {other:?}"),
    }
}

#[test]
fn env_file_scenario_resolves_port_and_dialect() {
    let dir = base_dir(
        Some("DB_HOST=localhost\nDB_PORT=23075\nDB_USER=u\nDB_PASSWORD=p\nDB_NAME=d\nDB_DIALECT=mysql\n"),
        true,
    );

    let config = Config::from_sources(dir.path(), EnvMap::new()).expect("load");

    assert_eq!(config.database.host, "localhost");
    assert_eq!(config.database.port, 23075);
    assert_eq!(config.database.dialect, Dialect::MySql);
    assert_eq!(config.database.database, "d");
    assert_eq!(config.database.pool.max_connections, 5);
    assert_eq!(config.database.pool.min_connections, 0);
}

#[test]
fn missing_dialect_is_reported_alone() {
    let dir = base_dir(
        Some("DB_HOST=localhost\nDB_PORT=3306\nDB_USER=u\nDB_PASSWORD=p\nDB_NAME=d\n"),
        true,
    );

    let err = Config::from_sources(dir.path(), EnvMap::new()).unwrap_err();

    assert_eq!(missing_from(err), vec!["DB_DIALECT".to_string()]);
}

#[test]
fn each_single_missing_key_is_reported_exactly() {
    for key in REQUIRED_KEYS {
        let dir = base_dir(None, true);
        let mut vars = full_env();
        vars.remove(key);

        let err = Config::from_sources(dir.path(), vars).unwrap_err();

        assert_eq!(missing_from(err), vec![key.to_string()], "dropping {key}");
    }
}

#[test]
fn multiple_missing_keys_are_all_reported() {
    let dir = base_dir(None, true);
    let mut vars = full_env();
    vars.remove("DB_USER");
    vars.remove("DB_PASSWORD");
    vars.remove("DB_DIALECT");

    let mut reported = missing_from(Config::from_sources(dir.path(), vars).unwrap_err());
    reported.sort();
    let mut expected = vec![
        "DB_DIALECT".to_string(),
        "DB_PASSWORD".to_string(),
        "DB_USER".to_string(),
    ];
    expected.sort();

    assert_eq!(reported, expected);
}

#[test]
fn blank_value_counts_as_missing() {
    let dir = base_dir(None, true);
    let mut vars = full_env();
    vars.insert("DB_PASSWORD".to_string(), "   ".to_string());

    let err = Config::from_sources(dir.path(), vars).unwrap_err();

    assert_eq!(missing_from(err), vec!["DB_PASSWORD".to_string()]);
}

#[test]
fn absent_env_file_with_complete_environment_succeeds() {
    let dir = base_dir(None, true);

    let config = Config::from_sources(dir.path(), full_env()).expect("load");

    assert_eq!(config.database.host, "localhost");
    assert_eq!(config.database.port, 3306);
}

#[test]
fn environment_value_wins_over_file_value() {
    let dir = base_dir(
        Some("DB_NAME=from-file\nDB_HOST=file-host\n"),
        true,
    );

    let mut vars = full_env();
    vars.insert("DB_NAME".to_string(), "from-process".to_string());

    let config = Config::from_sources(dir.path(), vars).expect("load");

    assert_eq!(config.database.database, "from-process");
    // A key absent from the environment still comes from the file.
    assert_eq!(config.database.host, "localhost");
}

#[test]
fn unreadable_certificate_is_a_config_error() {
    let dir = base_dir(None, false);

    let err = Config::from_sources(dir.path(), full_env()).unwrap_err();

    match &err {
        ConfigError::CertificateUnreadable { path, .. } => {
            assert!(path.ends_with("ca.pem"));
        }
        other => panic!("expected CertificateUnreadable, got {other:?}"),
    }
    assert!(err.to_string().starts_with("certificate unreadable"));
}

#[test]
fn certificate_bytes_are_loaded_verbatim() {
    let dir = base_dir(None, true);

    let config = Config::from_sources(dir.path(), full_env()).expect("load");

    assert_eq!(config.database.trust_anchor.as_bytes(), CERT_PEM);
}

#[test]
fn unparseable_port_names_the_key() {
    let dir = base_dir(None, true);
    let mut vars = full_env();
    vars.insert("DB_PORT".to_string(), "not-a-port".to_string());

    let err = Config::from_sources(dir.path(), vars).unwrap_err();

    match err {
        ConfigError::InvalidValue { key, .. } => assert_eq!(key, "DB_PORT"),
        other => panic!("expected InvalidValue, got {other:?}"),
    }
}

#[test]
fn out_of_range_port_names_the_key() {
    let dir = base_dir(None, true);
    let mut vars = full_env();
    vars.insert("DB_PORT".to_string(), "70000".to_string());

    let err = Config::from_sources(dir.path(), vars).unwrap_err();

    assert!(matches!(err, ConfigError::InvalidValue { ref key, .. } if key == "DB_PORT"));
}

#[test]
fn unsupported_dialect_is_rejected_by_name() {
    let dir = base_dir(None, true);
    let mut vars = full_env();
    vars.insert("DB_DIALECT".to_string(), "sqlite".to_string());

    let err = Config::from_sources(dir.path(), vars).unwrap_err();

    match err {
        ConfigError::UnsupportedDialect(name) => assert_eq!(name, "sqlite"),
        other => panic!("expected UnsupportedDialect, got {other:?}"),
    }
}

#[test]
fn fallback_parse_recovers_a_file_the_strict_parser_rejects() {
    // The malformed first line stops the structured parser before it sees
    // anything; the fallback re-parse supplies the whole config.
    let dir = base_dir(
        Some("%%%\nDB_HOST=localhost\nDB_PORT=3306\nDB_USER=u\nDB_PASSWORD=p\nDB_NAME=d\nDB_DIALECT=mysql\n"),
        true,
    );

    let config = Config::from_sources(dir.path(), EnvMap::new()).expect("load");

    assert_eq!(config.database.host, "localhost");
    assert_eq!(config.database.user, "u");
}

#[test]
fn server_defaults_apply_when_unset() {
    let dir = base_dir(None, true);

    let config = Config::from_sources(dir.path(), full_env()).expect("load");

    assert_eq!(config.server.host, "127.0.0.1");
    assert_eq!(config.server.port, 3000);
    assert_eq!(config.cors.allowed_origins, vec!["*".to_string()]);
}

#[test]
fn listed_origins_are_split_and_trimmed() {
    let dir = base_dir(None, true);
    let mut vars = full_env();
    vars.insert(
        "ALLOWED_ORIGINS".to_string(),
        "http://localhost:3000, https://example.com".to_string(),
    );

    let config = Config::from_sources(dir.path(), vars).expect("load");

    assert_eq!(
        config.cors.allowed_origins,
        vec![
            "http://localhost:3000".to_string(),
            "https://example.com".to_string()
        ]
    );
    assert!(!config.cors.allow_any());
}
