use modelmgmt_server::ServerConfig;
use pretty_assertions::assert_eq;
use std::path::PathBuf;

fn write_config(contents: &str) -> (tempfile::TempDir, PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("modelmgmt.toml");
    std::fs::write(&path, contents).unwrap();
    (dir, path)
}

// ── Loading ──────────────────────────────────────────────────────

#[test]
fn missing_file_uses_defaults() {
    let config = ServerConfig::load_from("/nonexistent/modelmgmt.toml");
    assert_eq!(config, ServerConfig::default());
    assert_eq!(config.listen_addr, "0.0.0.0:8080");
    assert!(config.persist_changes);
}

#[test]
fn full_file_is_read() {
    let (_dir, path) = write_config(
        r#"
listen_addr = "127.0.0.1:9090"
database_path = "/var/lib/modelmgmt/changes.db"
seed_path = "/etc/modelmgmt/seed.json"
persist_changes = false
"#,
    );

    let config = ServerConfig::load_from(&path);
    assert_eq!(
        config,
        ServerConfig {
            listen_addr: "127.0.0.1:9090".into(),
            database_path: Some("/var/lib/modelmgmt/changes.db".into()),
            seed_path: Some("/etc/modelmgmt/seed.json".into()),
            persist_changes: false,
        }
    );
}

#[test]
fn partial_file_keeps_other_defaults() {
    let (_dir, path) = write_config(r#"seed_path = "seed.json""#);
    let config = ServerConfig::load_from(&path);

    assert_eq!(config.seed_path, Some(PathBuf::from("seed.json")));
    assert_eq!(config.listen_addr, "0.0.0.0:8080");
    assert_eq!(config.database_path, None);
}

#[test]
fn malformed_file_uses_defaults() {
    let (_dir, path) = write_config("listen_addr = [not toml");
    assert_eq!(ServerConfig::load_from(&path), ServerConfig::default());
}

// ── Listen address ───────────────────────────────────────────────

#[test]
fn port_flag_overrides_configured_port() {
    let config = ServerConfig::default();
    assert_eq!(config.socket_addr(None).unwrap().port(), 8080);
    assert_eq!(config.socket_addr(Some(9000)).unwrap().to_string(), "0.0.0.0:9000");
}

#[test]
fn invalid_listen_addr_is_an_error() {
    let config = ServerConfig {
        listen_addr: "localhost".into(),
        ..ServerConfig::default()
    };
    assert!(config.socket_addr(Some(80)).is_err());
}
