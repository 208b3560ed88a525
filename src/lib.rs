//! Parsing of a line-oriented lexicon and resolution of every surface form
//! to its part(s) of speech and canonical lemma(s).

// Declare modules
pub mod data;
pub mod diagnostics;
pub mod error;
pub mod form_of;
pub mod lexicon;
pub mod models;
pub mod progress;
pub mod record;
pub mod resolver;
pub mod sense;
pub mod word;

// Re-export key types for easier use
pub use data::{load_lexicon, read_lines, InputFormat};
pub use diagnostics::Diagnostic;
pub use error::{Result, WordlistError};
pub use form_of::{classify, FormOf};
pub use lexicon::{Lexicon, LoadOptions};
pub use models::{Example, FormTable, Nym, NymKind, Record, Sense};
pub use record::parse_record;
pub use resolver::{AllForms, FormRow, LemmaMap, LemmaResolver, DEFAULT_MAX_DEPTH};
pub use word::{common_pos, Word};
