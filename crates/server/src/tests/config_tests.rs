use super::*;

use std::collections::HashMap;

fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let vars: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |key| vars.get(key).cloned()
}

#[test]
fn defaults_apply_without_file_or_env() {
    let settings = load_settings_from(None, env_from(&[]));
    assert_eq!(settings, Settings::default());
    assert_eq!(settings.store_latency(), Duration::from_millis(1000));
    assert!(settings.seed_on_startup);
}

#[test]
fn file_values_override_defaults() {
    let file = r#"
        bind_addr = "0.0.0.0:9000"
        database_url = "sqlite://./tmp/demo.db"
        store_latency_ms = 0
        seed_on_startup = false
    "#;
    let settings = load_settings_from(Some(file), env_from(&[]));
    assert_eq!(settings.server_bind, "0.0.0.0:9000");
    assert_eq!(settings.database_url, "sqlite://./tmp/demo.db");
    assert_eq!(settings.store_latency_ms, 0);
    assert!(!settings.seed_on_startup);
}

#[test]
fn env_overrides_file_and_prefixed_names_win() {
    let file = r#"bind_addr = "0.0.0.0:9000""#;
    let settings = load_settings_from(
        Some(file),
        env_from(&[
            ("SERVER_BIND", "127.0.0.1:1"),
            ("APP__BIND_ADDR", "127.0.0.1:2"),
            ("DATABASE_URL", "sqlite::memory:"),
            ("APP__STORE_LATENCY_MS", "250"),
            ("APP__SEED_ON_STARTUP", "false"),
        ]),
    );
    assert_eq!(settings.server_bind, "127.0.0.1:2");
    assert_eq!(settings.database_url, "sqlite::memory:");
    assert_eq!(settings.store_latency_ms, 250);
    assert!(!settings.seed_on_startup);
}

#[test]
fn unparseable_values_are_ignored() {
    let settings = load_settings_from(
        Some("store_latency_ms = \"slow\""),
        env_from(&[("APP__STORE_LATENCY_MS", "later"), ("APP__SEED_ON_STARTUP", "maybe")]),
    );
    assert_eq!(settings, Settings::default());
}

#[test]
fn normalizes_plain_file_path_to_sqlite_url() {
    assert_eq!(
        normalize_database_url("./data/test.db"),
        "sqlite://./data/test.db"
    );
    assert_eq!(
        normalize_database_url("sqlite:./data/test.db"),
        "sqlite://./data/test.db"
    );
    assert_eq!(normalize_database_url("  "), Settings::default().database_url);
    assert_eq!(normalize_database_url("sqlite::memory:"), "sqlite::memory:");
}

#[tokio::test]
async fn normalized_plain_path_opens_sqlite_file_in_new_directory() {
    let temp_root = tempfile::tempdir().expect("tempdir");
    let db_path = temp_root.path().join("nested").join("catalog.db");

    let database_url = normalize_database_url(db_path.to_string_lossy().as_ref());
    let storage = storage::Storage::new(&database_url).await.expect("open sqlite");
    drop(storage);

    assert!(
        db_path.exists(),
        "database file should be created: {}",
        db_path.display()
    );
}
