// Configuration types module
// Defines all configuration-related data structures

use serde::{Deserialize, Serialize};

/// Main configuration structure
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub performance: PerformanceConfig,
    pub http: HttpConfig,
    #[serde(default)]
    pub routes: RoutesConfig,
    #[serde(default)]
    pub assistant: AssistantConfig,
}

/// Server configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
}

/// Logging configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LoggingConfig {
    pub level: String,
    pub access_log: bool,
    pub show_headers: bool,
    /// Access log format (combined, common, json, or custom pattern)
    #[serde(default = "default_access_log_format")]
    pub access_log_format: String,
    /// Access log file path (optional, stdout if not set)
    #[serde(default)]
    pub access_log_file: Option<String>,
    /// Error log file path (optional, stderr if not set)
    #[serde(default)]
    pub error_log_file: Option<String>,
}

#[allow(clippy::missing_const_for_fn)]
fn default_access_log_format() -> String {
    "combined".to_string()
}

/// Performance configuration
#[derive(Debug, Deserialize, Clone)]
pub struct PerformanceConfig {
    pub keep_alive_timeout: u64,
    pub read_timeout: u64,
    pub write_timeout: u64,
    pub max_connections: Option<u64>,
}

/// HTTP configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct HttpConfig {
    pub server_name: String,
    pub enable_cors: bool,
    pub max_body_size: u64,
}

/// Routes configuration
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct RoutesConfig {
    /// Health check configuration
    #[serde(default)]
    pub health: HealthConfig,
}

/// Health check configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct HealthConfig {
    /// Enable health check endpoints
    #[serde(default = "default_health_enabled")]
    pub enabled: bool,
    /// Liveness probe path (default: /healthz)
    #[serde(default = "default_healthz_path")]
    pub liveness_path: String,
    /// Readiness probe path (default: /readyz)
    #[serde(default = "default_readyz_path")]
    pub readiness_path: String,
}

#[allow(clippy::missing_const_for_fn)]
fn default_health_enabled() -> bool {
    true
}

#[allow(clippy::missing_const_for_fn)]
fn default_healthz_path() -> String {
    "/healthz".to_string()
}

#[allow(clippy::missing_const_for_fn)]
fn default_readyz_path() -> String {
    "/readyz".to_string()
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            enabled: default_health_enabled(),
            liveness_path: default_healthz_path(),
            readiness_path: default_readyz_path(),
        }
    }
}

/// Assistant endpoint configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AssistantConfig {
    /// Request path of the assistant endpoint
    pub endpoint: String,
    /// Directory the static files are read from
    pub files_dir: String,
    /// Ordered list of file names reported in every response
    pub files: Vec<String>,
    /// Summarize file contents instead of returning them verbatim
    pub summarize: bool,
    /// Number of characters kept by the default summary
    pub summary_length: usize,
    /// File answered with its first lines when the message asks for questions
    pub question_bank_file: String,
    /// File answered with a score line when the message asks for performance
    pub performance_file: String,
    /// Top-level key looked up in the performance file
    pub performance_subject: String,
    /// What to do when the performance lookup finds nothing
    pub on_lookup_failure: LookupFailurePolicy,
}

/// Outcome for an entry whose performance lookup came back empty
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum LookupFailurePolicy {
    /// Report the entry as unreadable
    #[default]
    Sentinel,
    /// Keep the default truncated summary
    Summary,
    /// Fail the whole request
    Error,
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            endpoint: "/api/ai".to_string(),
            files_dir: "public/files".to_string(),
            files: DEFAULT_FILES.iter().map(ToString::to_string).collect(),
            summarize: true,
            summary_length: 100,
            question_bank_file: "QBANK_CIA1.csv".to_string(),
            performance_file: "performance.json".to_string(),
            performance_subject: "Foundations of Internal Auditing".to_string(),
            on_lookup_failure: LookupFailurePolicy::Sentinel,
        }
    }
}

/// Files reported when no list is configured
pub const DEFAULT_FILES: [&str; 5] = [
    "add_questions.py",
    "app.py",
    "performance.json",
    "QBANK_CIA1.csv",
    "README.txt",
];
