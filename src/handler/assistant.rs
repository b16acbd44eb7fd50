//! Assistant reply module
//!
//! Echoes the message back together with the configured files, either
//! verbatim or summarized.

use crate::config::{AssistantConfig, LookupFailurePolicy};
use crate::files::{display_value, FileCatalog, FileEntry, Summary, SummaryRules};
use crate::logger;
use serde::Serialize;
use serde_json::Value;

/// Text used for a request without a `message` field
const MISSING_MESSAGE: &str = "undefined";

/// Trailing suggestion markup, sent as plain text
const SUGGESTION: &str = "<button>Click me</button>";

/// JSON body of a successful reply
#[derive(Debug, Serialize)]
pub struct AssistantResponse {
    pub response: String,
}

#[derive(Debug, thiserror::Error)]
pub enum AssistantError {
    #[error("no usable \"{subject}\" record in {file}")]
    PerformanceRecordMissing { file: String, subject: String },
}

/// Builds replies from the file catalog
#[derive(Debug, Clone)]
pub struct Assistant {
    catalog: FileCatalog,
    rules: SummaryRules,
    summarize: bool,
    on_lookup_failure: LookupFailurePolicy,
}

impl Assistant {
    pub fn new(
        catalog: FileCatalog,
        rules: SummaryRules,
        summarize: bool,
        on_lookup_failure: LookupFailurePolicy,
    ) -> Self {
        Self {
            catalog,
            rules,
            summarize,
            on_lookup_failure,
        }
    }

    pub fn from_config(config: &AssistantConfig) -> Self {
        Self::new(
            FileCatalog::from_config(config),
            SummaryRules::from_config(config),
            config.summarize,
            config.on_lookup_failure,
        )
    }

    pub const fn catalog(&self) -> &FileCatalog {
        &self.catalog
    }

    /// One entry per configured file, in list order.
    ///
    /// `message` is `None` when the request's message is missing or not a
    /// string.
    pub async fn entries(&self, message: Option<&str>) -> Result<Vec<FileEntry>, AssistantError> {
        let mut entries = Vec::with_capacity(self.catalog.names().len());
        for (name, content) in self.catalog.read_all().await {
            let entry = match content {
                None => FileEntry::unreadable(name),
                Some(text) if !self.summarize => FileEntry::new(name, text),
                Some(text) => self.summarized_entry(name, &text, message)?,
            };
            entries.push(entry);
        }
        Ok(entries)
    }

    fn summarized_entry(
        &self,
        name: &str,
        content: &str,
        message: Option<&str>,
    ) -> Result<FileEntry, AssistantError> {
        match self.rules.summarize(name, content, message) {
            Summary::Text(text) => Ok(FileEntry::new(name, text)),
            Summary::MessageNotText => {
                logger::log_debug(&format!("Message is not text, no summary for {name}"));
                Ok(FileEntry::unreadable(name))
            }
            Summary::PerformanceMissing { truncated } => {
                logger::log_warning(&format!(
                    "Performance record \"{}\" not found in {name}",
                    self.rules.performance_subject
                ));
                match self.on_lookup_failure {
                    LookupFailurePolicy::Sentinel => Ok(FileEntry::unreadable(name)),
                    LookupFailurePolicy::Summary => Ok(FileEntry::new(name, truncated)),
                    LookupFailurePolicy::Error => Err(AssistantError::PerformanceRecordMissing {
                        file: name.to_string(),
                        subject: self.rules.performance_subject.clone(),
                    }),
                }
            }
        }
    }

    /// Full reply text for the request's `message` value
    pub async fn reply(&self, message: Option<&Value>) -> Result<String, AssistantError> {
        let entries = self.entries(message.and_then(Value::as_str)).await?;
        Ok(compose_reply(&render_message(message), &entries))
    }
}

/// Text form of the `message` field
pub fn render_message(message: Option<&Value>) -> String {
    message.map_or_else(|| MISSING_MESSAGE.to_string(), display_value)
}

/// `You said: "<message>". Files: <entries>. Suggestion: <markup>`
pub fn compose_reply(message: &str, entries: &[FileEntry]) -> String {
    let files = serde_json::to_string(entries).unwrap_or_else(|e| {
        logger::log_error(&format!("Failed to encode file entries: {e}"));
        "[]".to_string()
    });
    format!("You said: \"{message}\". Files: {files}. Suggestion: {SUGGESTION}")
}
