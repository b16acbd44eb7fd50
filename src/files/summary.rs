//! File summary module
//!
//! Shortens file contents for the assistant reply. Two files get a derived
//! view when the message asks for them:
//! - the question bank answers "questions" with its first lines
//! - the performance record answers "performance" with a score line

use crate::config::AssistantConfig;
use serde_json::Value;

/// Suffix appended to truncated content
const ELLIPSIS: &str = "...";

/// Lines of the question bank shown as a sample
const QUESTION_SAMPLE_LINES: usize = 2;

/// Keyword selecting the question bank sample
const QUESTIONS_KEYWORD: &str = "questions";

/// Keyword selecting the performance score line
const PERFORMANCE_KEYWORD: &str = "performance";

/// Text of a record field that is not present
const MISSING_FIELD: &str = "undefined";

/// Result of summarizing one file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Summary {
    /// Text to report for the file
    Text(String),
    /// The performance record was requested but could not be looked up.
    /// Carries the default truncated summary for callers that fall back to it.
    PerformanceMissing { truncated: String },
    /// A keyword file was checked against a message that is not text
    MessageNotText,
}

/// Per-file summary rules
#[derive(Debug, Clone)]
pub struct SummaryRules {
    pub max_chars: usize,
    pub question_bank_file: String,
    pub performance_file: String,
    pub performance_subject: String,
}

impl SummaryRules {
    pub fn from_config(config: &AssistantConfig) -> Self {
        Self {
            max_chars: config.summary_length,
            question_bank_file: config.question_bank_file.clone(),
            performance_file: config.performance_file.clone(),
            performance_subject: config.performance_subject.clone(),
        }
    }

    /// Summarize `content` of file `name` for a message.
    ///
    /// `message` is matched case-insensitively against the keywords. It is
    /// `None` when the request's message is missing or not a string, which
    /// leaves the question bank and performance file without a summary.
    pub fn summarize(&self, name: &str, content: &str, message: Option<&str>) -> Summary {
        let truncated = truncate(content, self.max_chars);
        let is_keyword_file = name == self.question_bank_file || name == self.performance_file;

        let message = match message {
            Some(text) => text.to_lowercase(),
            None if is_keyword_file => return Summary::MessageNotText,
            None => return Summary::Text(truncated),
        };

        if name == self.question_bank_file && message.contains(QUESTIONS_KEYWORD) {
            return Summary::Text(head_lines(content, QUESTION_SAMPLE_LINES));
        }

        if name == self.performance_file && message.contains(PERFORMANCE_KEYWORD) {
            return match performance_line(content, &self.performance_subject) {
                Some(line) => Summary::Text(line),
                None => Summary::PerformanceMissing { truncated },
            };
        }

        Summary::Text(truncated)
    }
}

/// Keep the first `max_chars` characters, appending `...` only when
/// something was cut off.
///
/// Counts Unicode scalar values, not UTF-16 units, so a character outside
/// the BMP is one character and is never split.
pub fn truncate(content: &str, max_chars: usize) -> String {
    match content.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}{ELLIPSIS}", &content[..cut]),
        None => content.to_string(),
    }
}

/// First `count` lines split on `\n`, rejoined with `\n`
pub fn head_lines(content: &str, count: usize) -> String {
    content.split('\n').take(count).collect::<Vec<_>>().join("\n")
}

/// Build `Correct: <correct>, Total: <total>` from the subject record of a
/// performance file.
///
/// Returns `None` when the file is not JSON or the subject is absent or
/// `null`. A field missing from the record reads `undefined`.
pub fn performance_line(content: &str, subject: &str) -> Option<String> {
    let record: Value = serde_json::from_str(content).ok()?;
    let entry = record.get(subject).filter(|v| !v.is_null())?;
    let field = |key: &str| {
        entry
            .get(key)
            .map_or_else(|| MISSING_FIELD.to_string(), display_value)
    };
    Some(format!(
        "Correct: {}, Total: {}",
        field("correct"),
        field("total")
    ))
}

/// Render a JSON value the way it reads when interpolated into text:
/// strings without quotes, whole numbers without a fractional part, and
/// arrays/objects as compact JSON.
pub fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => match n.as_f64() {
            Some(f) if !n.is_i64() && !n.is_u64() && f.is_finite() && f.fract() == 0.0 => {
                format!("{f:.0}")
            }
            _ => n.to_string(),
        },
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn rules() -> SummaryRules {
        SummaryRules::from_config(&AssistantConfig::default())
    }

    #[test]
    fn test_truncate_short_content_unchanged() {
        assert_eq!(truncate("", 100), "");
        assert_eq!(truncate("hello", 100), "hello");
        let exact = "x".repeat(100);
        assert_eq!(truncate(&exact, 100), exact);
    }

    #[test]
    fn test_truncate_long_content() {
        let long = "y".repeat(101);
        let out = truncate(&long, 100);
        assert_eq!(out, format!("{}...", "y".repeat(100)));
    }

    #[test]
    fn test_truncate_counts_characters() {
        let text = "é".repeat(150);
        let out = truncate(&text, 100);
        assert_eq!(out.chars().count(), 103);
        assert!(out.ends_with("..."));

        let emoji = "😀".repeat(101);
        assert_eq!(truncate(&emoji, 100), format!("{}...", "😀".repeat(100)));
    }

    #[test]
    fn test_head_lines() {
        assert_eq!(head_lines("line1\nline2\nline3", 2), "line1\nline2");
        assert_eq!(head_lines("only", 2), "only");
        assert_eq!(head_lines("", 2), "");
        assert_eq!(head_lines("a\r\nb\r\nc", 2), "a\r\nb\r");
    }

    #[test]
    fn test_performance_line() {
        let content = r#"{"Foundations of Internal Auditing": {"correct": 7, "total": 10}}"#;
        assert_eq!(
            performance_line(content, "Foundations of Internal Auditing").as_deref(),
            Some("Correct: 7, Total: 10")
        );
    }

    #[test]
    fn test_performance_line_missing() {
        let subject = "Foundations of Internal Auditing";
        assert_eq!(performance_line("not json", subject), None);
        assert_eq!(performance_line(r#"{"Fraud Risks": {}}"#, subject), None);
        assert_eq!(
            performance_line(r#"{"Foundations of Internal Auditing": null}"#, subject),
            None
        );
        assert_eq!(performance_line("[1, 2]", subject), None);
    }

    #[test]
    fn test_performance_line_absent_fields() {
        let subject = "Foundations of Internal Auditing";
        assert_eq!(
            performance_line(r#"{"Foundations of Internal Auditing": {"total": 10}}"#, subject)
                .as_deref(),
            Some("Correct: undefined, Total: 10")
        );
        assert_eq!(
            performance_line(r#"{"Foundations of Internal Auditing": 5}"#, subject).as_deref(),
            Some("Correct: undefined, Total: undefined")
        );
    }

    #[test]
    fn test_display_value() {
        assert_eq!(display_value(&json!("hi")), "hi");
        assert_eq!(display_value(&json!(7)), "7");
        assert_eq!(display_value(&json!(7.0)), "7");
        assert_eq!(display_value(&json!(7.5)), "7.5");
        assert_eq!(display_value(&json!(-3)), "-3");
        assert_eq!(display_value(&json!(null)), "null");
        assert_eq!(display_value(&json!(true)), "true");
        assert_eq!(display_value(&json!({"a": 1})), r#"{"a":1}"#);
    }

    #[test]
    fn test_question_bank_sample() {
        let out = rules().summarize(
            "QBANK_CIA1.csv",
            "line1\nline2\nline3",
            Some("show me some QUESTIONS"),
        );
        assert_eq!(out, Summary::Text("line1\nline2".to_string()));
    }

    #[test]
    fn test_question_bank_without_keyword_is_truncated() {
        let content = "q".repeat(120);
        let out = rules().summarize("QBANK_CIA1.csv", &content, Some("hello"));
        assert_eq!(out, Summary::Text(format!("{}...", "q".repeat(100))));
    }

    #[test]
    fn test_keyword_only_applies_to_its_file() {
        let out = rules().summarize("app.py", "a\nb\nc", Some("questions"));
        assert_eq!(out, Summary::Text("a\nb\nc".to_string()));
    }

    #[test]
    fn test_performance_summary() {
        let content = r#"{"Foundations of Internal Auditing": {"correct": 7, "total": 10}}"#;
        let out = rules().summarize("performance.json", content, Some("what's my performance"));
        assert_eq!(out, Summary::Text("Correct: 7, Total: 10".to_string()));
    }

    #[test]
    fn test_performance_summary_missing_subject() {
        let content = r#"{"Fraud Risks": {"correct": 1, "total": 2}}"#;
        let out = rules().summarize("performance.json", content, Some("Performance please"));
        assert_eq!(
            out,
            Summary::PerformanceMissing {
                truncated: content.to_string()
            }
        );
    }

    #[test]
    fn test_non_text_message_only_affects_keyword_files() {
        let rules = rules();
        assert_eq!(
            rules.summarize("QBANK_CIA1.csv", "line1\nline2", None),
            Summary::MessageNotText
        );
        assert_eq!(
            rules.summarize("performance.json", "{}", None),
            Summary::MessageNotText
        );
        assert_eq!(
            rules.summarize("README.txt", "readme", None),
            Summary::Text("readme".to_string())
        );
    }
}
