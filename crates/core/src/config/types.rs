use serde::{Deserialize, Serialize};
use std::net::{IpAddr, Ipv4Addr};
use std::path::PathBuf;

/// Root configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub auth: AuthConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub feed: FeedConfig,
    #[serde(default)]
    pub sync: SyncConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: IpAddr,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> IpAddr {
    IpAddr::V4(Ipv4Addr::UNSPECIFIED)
}

fn default_port() -> u16 {
    8080
}

/// Authentication configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AuthConfig {
    pub method: AuthMethod,
    /// Key granting the ADMIN role (required for `api_key`).
    #[serde(default)]
    pub admin_key: Option<String>,
    /// Key granting the USER role (read-only access).
    #[serde(default)]
    pub user_key: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AuthMethod {
    None,
    ApiKey,
}

/// Database configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_db_path")]
    pub path: PathBuf,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

fn default_db_path() -> PathBuf {
    PathBuf::from("holocron.db")
}

/// External film feed configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FeedConfig {
    /// Feed URL returning the list of films.
    #[serde(default = "default_feed_url")]
    pub url: String,
    /// Request timeout in seconds (default: 30)
    #[serde(default = "default_timeout")]
    pub timeout_secs: u32,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            url: default_feed_url(),
            timeout_secs: default_timeout(),
        }
    }
}

fn default_feed_url() -> String {
    "https://www.swapi.tech/api/films".to_string()
}

fn default_timeout() -> u32 {
    30
}

/// Periodic sync configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SyncConfig {
    /// Run reconciliation on a schedule.
    #[serde(default = "default_sync_enabled")]
    pub enabled: bool,
    /// Seconds between scheduled passes (default: one day).
    #[serde(default = "default_interval")]
    pub interval_secs: u64,
    /// Run one pass immediately at startup.
    #[serde(default)]
    pub run_on_startup: bool,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            enabled: default_sync_enabled(),
            interval_secs: default_interval(),
            run_on_startup: false,
        }
    }
}

fn default_sync_enabled() -> bool {
    true
}

fn default_interval() -> u64 {
    24 * 60 * 60
}

/// Sanitized config for API responses (secrets redacted)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedConfig {
    pub auth: SanitizedAuthConfig,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub feed: FeedConfig,
    pub sync: SyncConfig,
}

#[derive(Debug, Clone, Serialize)]
pub struct SanitizedAuthConfig {
    pub method: String,
    pub admin_key_configured: bool,
    pub user_key_configured: bool,
}

impl From<&Config> for SanitizedConfig {
    fn from(config: &Config) -> Self {
        Self {
            auth: SanitizedAuthConfig {
                method: match config.auth.method {
                    AuthMethod::None => "none".to_string(),
                    AuthMethod::ApiKey => "api_key".to_string(),
                },
                admin_key_configured: config.auth.admin_key.is_some(),
                user_key_configured: config.auth.user_key.is_some(),
            },
            server: config.server.clone(),
            database: config.database.clone(),
            feed: config.feed.clone(),
            sync: config.sync.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_valid_config_with_none_auth() {
        let toml = r#"
[auth]
method = "none"

[server]
host = "127.0.0.1"
port = 9000
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.auth.method, AuthMethod::None);
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.host.to_string(), "127.0.0.1");
    }

    #[test]
    fn test_deserialize_defaults() {
        let toml = r#"
[auth]
method = "none"
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.host.to_string(), "0.0.0.0");
        assert_eq!(config.database.path.to_str().unwrap(), "holocron.db");
        assert_eq!(config.feed.url, "https://www.swapi.tech/api/films");
        assert_eq!(config.feed.timeout_secs, 30);
        assert!(config.sync.enabled);
        assert_eq!(config.sync.interval_secs, 86_400);
        assert!(!config.sync.run_on_startup);
    }

    #[test]
    fn test_deserialize_missing_auth_fails() {
        let toml = r#"
[server]
port = 8080
"#;
        let result: Result<Config, _> = toml::from_str(toml);
        assert!(result.is_err());
    }

    #[test]
    fn test_deserialize_api_key_and_sync() {
        let toml = r#"
[auth]
method = "api_key"
admin_key = "admin-secret"
user_key = "user-secret"

[feed]
url = "http://localhost:9999/films"
timeout_secs = 5

[sync]
enabled = false
interval_secs = 3600
run_on_startup = true
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.auth.method, AuthMethod::ApiKey);
        assert_eq!(config.auth.admin_key.as_deref(), Some("admin-secret"));
        assert_eq!(config.feed.url, "http://localhost:9999/films");
        assert_eq!(config.feed.timeout_secs, 5);
        assert!(!config.sync.enabled);
        assert_eq!(config.sync.interval_secs, 3600);
        assert!(config.sync.run_on_startup);
    }

    #[test]
    fn test_sanitized_config_hides_keys() {
        let config = Config {
            auth: AuthConfig {
                method: AuthMethod::ApiKey,
                admin_key: Some("admin-secret".to_string()),
                user_key: None,
            },
            server: ServerConfig::default(),
            database: DatabaseConfig::default(),
            feed: FeedConfig::default(),
            sync: SyncConfig::default(),
        };
        let sanitized = SanitizedConfig::from(&config);
        assert_eq!(sanitized.auth.method, "api_key");
        assert!(sanitized.auth.admin_key_configured);
        assert!(!sanitized.auth.user_key_configured);

        let json = serde_json::to_string(&sanitized).unwrap();
        assert!(!json.contains("admin-secret"));
    }
}
