// Configuration module entry point
// Manages application configuration and runtime state

mod state;
mod types;

use std::net::SocketAddr;

// Re-export public types
pub use state::AppState;
pub use types::{AssistantConfig, Config, HttpConfig, LookupFailurePolicy, DEFAULT_FILES};

/// Prefix of environment variables overriding the config file
const ENV_PREFIX: &str = "ASSISTANT";

impl Config {
    /// Load configuration from specified file path (without extension)
    /// Default config file is "config.toml" when no path specified
    pub fn load_from(config_path: &str) -> Result<Self, config::ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("assistant.files")
                    .try_parsing(true),
            )
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 3000)?
            .set_default("logging.level", "info")?
            .set_default("logging.access_log", true)?
            .set_default("logging.show_headers", false)?
            .set_default("performance.keep_alive_timeout", 75)?
            .set_default("performance.read_timeout", 30)?
            .set_default("performance.write_timeout", 30)?
            .set_default("http.server_name", "certify-assistant/0.1")?
            .set_default("http.enable_cors", false)?
            .set_default("http.max_body_size", 1_048_576)? // 1MB
            .set_default("assistant.endpoint", "/api/ai")?
            .set_default("assistant.files_dir", "public/files")?
            .set_default("assistant.files", DEFAULT_FILES.to_vec())?
            .set_default("assistant.summarize", true)?
            .set_default("assistant.summary_length", 100)?
            .set_default("assistant.question_bank_file", "QBANK_CIA1.csv")?
            .set_default("assistant.performance_file", "performance.json")?
            .set_default(
                "assistant.performance_subject",
                "Foundations of Internal Auditing",
            )?
            .set_default("assistant.on_lookup_failure", "sentinel")?
            .build()?;

        settings.try_deserialize()
    }

    pub fn get_socket_addr(&self) -> Result<SocketAddr, String> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|e| format!("Invalid address: {e}"))
    }

    /// Whether debug lines should be written
    pub fn is_debug(&self) -> bool {
        self.logging.level.eq_ignore_ascii_case("debug")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_without_file() {
        let cfg = Config::load_from("does-not-exist/config").unwrap();
        assert_eq!(cfg.assistant.endpoint, "/api/ai");
        assert_eq!(cfg.assistant.files_dir, "public/files");
        assert_eq!(cfg.assistant.files, DEFAULT_FILES.to_vec());
        assert!(cfg.assistant.summarize);
        assert_eq!(cfg.assistant.summary_length, 100);
        assert_eq!(cfg.assistant.on_lookup_failure, LookupFailurePolicy::Sentinel);
        assert!(cfg.routes.health.enabled);
        assert_eq!(cfg.routes.health.liveness_path, "/healthz");
    }

    #[test]
    fn test_file_overrides_defaults() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("assistant.toml");
        std::fs::write(
            &path,
            r#"
[server]
port = 9100

[assistant]
summarize = false
files = ["a.txt", "b.txt"]
on_lookup_failure = "error"
"#,
        )
        .unwrap();

        let cfg = Config::load_from(path.to_str().unwrap()).unwrap();
        assert_eq!(cfg.server.port, 9100);
        assert!(!cfg.assistant.summarize);
        assert_eq!(cfg.assistant.files, vec!["a.txt", "b.txt"]);
        assert_eq!(cfg.assistant.on_lookup_failure, LookupFailurePolicy::Error);
        // untouched keys keep their defaults
        assert_eq!(cfg.assistant.performance_file, "performance.json");
    }

    #[test]
    fn test_socket_addr() {
        let mut cfg = Config::load_from("does-not-exist/config").unwrap();
        assert_eq!(cfg.get_socket_addr().unwrap().to_string(), "127.0.0.1:3000");

        cfg.server.host = "not a host".to_string();
        assert!(cfg.get_socket_addr().is_err());
    }
}
