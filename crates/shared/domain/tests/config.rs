use press_domain::config::{
    AppConfig, DatabaseConfig, LoggingConfig, RedisConfig, ServerConfig, SessionConfig,
};
use serde_json::json;

#[test]
fn config_defaults_are_sane() {
    let server = ServerConfig::default();
    assert_eq!(server.port, 8000);

    let logging = LoggingConfig::default();
    assert_eq!(logging.level, "info");
    assert_eq!(logging.max_file_bytes, 100 * 1024 * 1024);
    assert_eq!(logging.max_files, 10);

    let db = DatabaseConfig::default();
    assert!(db.url.starts_with("mysql://"));
    assert_eq!(db.max_connections, 10);

    let redis = RedisConfig::default();
    assert_eq!(redis.port, 6379);
    assert_eq!(redis.key_prefix, "pressroom");

    let session = SessionConfig::default();
    assert_eq!(session.cookie_name, "session_id");
    assert_eq!(session.ttl_seconds, 86_400);
}

#[test]
fn built_in_profiles_differ_in_logging() {
    let dev = AppConfig::development();
    assert_eq!(dev.logging.level, "debug");
    assert!(!dev.logging.json);

    let prod = AppConfig::production();
    assert_eq!(prod.logging.level, "info");
    assert!(prod.logging.json);
}

#[test]
fn app_config_deserializes() {
    let raw = json!({
        "server": { "address": "::", "port": 8080 },
        "logging": { "level": "warn", "directory": "/var/log/pressroom" },
        "database": { "url": "mysql://press@db:3306/news", "max_connections": 4 },
        "redis": { "host": "cache.internal", "port": 6380, "db": 2 },
        "session": { "ttl_seconds": 3600 }
    });

    let cfg: AppConfig = serde_json::from_value(raw).expect("config deserialize");
    assert_eq!(cfg.server.port, 8080);
    assert_eq!(cfg.logging.level, "warn");
    assert_eq!(cfg.database.max_connections, 4);
    assert_eq!(cfg.redis.host, "cache.internal");
    assert_eq!(cfg.redis.port, 6380);
    assert_eq!(cfg.session.ttl_seconds, 3600);
    // Unspecified fields fall back to defaults.
    assert_eq!(cfg.session.cookie_name, "session_id");
    assert_eq!(cfg.redis.key_prefix, "pressroom");
}

#[test]
fn partial_config_uses_defaults() {
    let cfg: AppConfig = serde_json::from_value(json!({})).expect("empty config");
    assert_eq!(cfg.server.port, 8000);
    assert_eq!(cfg.redis.host, "127.0.0.1");
}
