//! Non-fatal anomalies found while parsing or resolving.
//!
//! Diagnostics never abort a run. Each one is logged when reported and kept
//! in a [`DiagnosticLog`] so callers can inspect or count them afterwards.

use log::{info, warn};
use serde::Serialize;
use std::cell::RefCell;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Diagnostic {
    /// A form-of gloss only matched the unquoted fallback pattern.
    AmbiguousFormOf {
        headword: String,
        gloss: String,
        lemma: String,
    },
    /// A redirect chain ran past the resolver's depth limit.
    DepthExceeded {
        headword: String,
        pos: String,
        lemma: String,
    },
    /// A redirect target has no entry for the requested part of speech.
    UnknownLemma {
        headword: String,
        pos: String,
        lemma: String,
    },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::AmbiguousFormOf {
                headword,
                gloss,
                lemma,
            } => write!(
                f,
                "{}: unquoted form-of target '{}' in gloss {:?}",
                headword, lemma, gloss
            ),
            Diagnostic::DepthExceeded {
                headword,
                pos,
                lemma,
            } => write!(
                f,
                "{} {{{}}}: lemma chain through '{}' exceeds max depth",
                headword, pos, lemma
            ),
            Diagnostic::UnknownLemma {
                headword,
                pos,
                lemma,
            } => write!(
                f,
                "{} {{{}}}: form-of target '{}' has no entry",
                headword, pos, lemma
            ),
        }
    }
}

/// Append-only diagnostic sink owned by a single-threaded component.
#[derive(Debug, Default)]
pub struct DiagnosticLog {
    entries: RefCell<Vec<Diagnostic>>,
}

impl DiagnosticLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn report(&self, diagnostic: Diagnostic) {
        match &diagnostic {
            Diagnostic::AmbiguousFormOf { .. } => info!("{}", diagnostic),
            _ => warn!("{}", diagnostic),
        }
        self.entries.borrow_mut().push(diagnostic);
    }

    pub fn extend(&self, diagnostics: impl IntoIterator<Item = Diagnostic>) {
        for d in diagnostics {
            self.report(d);
        }
    }

    /// Snapshot of everything reported so far, in report order.
    pub fn entries(&self) -> Vec<Diagnostic> {
        self.entries.borrow().clone()
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }

    pub fn clear(&self) {
        self.entries.borrow_mut().clear();
    }
}
