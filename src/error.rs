use thiserror::Error;

/// Custom Result type for this crate.
pub type Result<T> = std::result::Result<T, WordlistError>;

/// Enum representing all fatal errors in the wordlist_rs library.
///
/// Non-fatal anomalies found while parsing or resolving are not errors;
/// they are reported as [`crate::diagnostics::Diagnostic`] values instead.
#[derive(Error, Debug)]
pub enum WordlistError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// A line does not match the fixed record grammar.
    #[error("Malformed record{}: {reason}: {line:?}", fmt_headword(.headword))]
    MalformedRecord {
        headword: Option<String>,
        line: String,
        reason: String,
    },

    /// A key appeared where the sense builder does not accept it.
    #[error("Unexpected key{}: {key:?} (value {value:?})", fmt_headword(.headword))]
    UnexpectedKey {
        headword: Option<String>,
        key: String,
        value: String,
    },

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

fn fmt_headword(headword: &Option<String>) -> String {
    match headword {
        Some(h) => format!(" in '{}'", h),
        None => String::new(),
    }
}

impl WordlistError {
    pub(crate) fn malformed(line: &str, reason: impl Into<String>) -> Self {
        WordlistError::MalformedRecord {
            headword: None,
            line: line.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn unexpected_key(key: &str, value: &str) -> Self {
        WordlistError::UnexpectedKey {
            headword: None,
            key: key.to_string(),
            value: value.to_string(),
        }
    }

    /// Attaches the headword being parsed, if the error does not carry one yet.
    pub(crate) fn in_headword(self, word: &str) -> Self {
        match self {
            WordlistError::MalformedRecord {
                headword: None,
                line,
                reason,
            } => WordlistError::MalformedRecord {
                headword: Some(word.to_string()),
                line,
                reason,
            },
            WordlistError::UnexpectedKey {
                headword: None,
                key,
                value,
            } => WordlistError::UnexpectedKey {
                headword: Some(word.to_string()),
                key,
                value,
            },
            other => other,
        }
    }
}
