//! Headword to word-list mapping with parse-on-first-access caching.

use crate::diagnostics::{Diagnostic, DiagnosticLog};
use crate::error::{Result, WordlistError};
use crate::record::{parse_record, BLOCK_SEPARATOR};
use crate::word::{common_pos, parse_words, Word};
use indexmap::IndexMap;
use log::{debug, info};
use std::cell::RefCell;
use std::rc::Rc;

/// Options for loading a lexicon.
#[derive(Debug, Default, Clone)]
pub struct LoadOptions {
    /// Keep each headword's raw lines after its first parse.
    /// When false (the default) they are dropped once parsed to bound memory.
    pub retain_raw: bool,
}

/// Per-headword lifecycle state.
#[derive(Debug)]
enum Entry {
    Unparsed(Vec<String>),
    Parsed {
        words: Rc<[Rc<Word>]>,
        raw: Option<Vec<String>>,
    },
}

/// All headwords of a lexicon, in source order.
///
/// Single-threaded: the cache uses interior mutability so lookups can be
/// made through a shared reference while the resolver walks the lexicon.
#[derive(Debug)]
pub struct Lexicon {
    entries: RefCell<IndexMap<String, Entry>>,
    options: LoadOptions,
    diagnostics: DiagnosticLog,
}

impl Lexicon {
    /// Groups lines of the block format into per-headword raw lines.
    ///
    /// Blocks are separated by a `_____` line followed by the headword; the
    /// first block may omit the separator.
    pub fn from_lines<I, S>(lines: I, options: LoadOptions) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut entries: IndexMap<String, Vec<String>> = IndexMap::new();
        let mut current: Option<String> = None;
        let mut expecting_headword = true;

        for line in lines {
            let line = line.as_ref();
            if line.trim() == BLOCK_SEPARATOR {
                expecting_headword = true;
                current = None;
                continue;
            }
            if expecting_headword {
                let headword = line.trim();
                if headword.is_empty() {
                    continue;
                }
                if headword.contains(": ") || headword.ends_with(':') {
                    return Err(WordlistError::malformed(line, "expected a headword"));
                }
                entries.entry(headword.to_string()).or_default();
                current = Some(headword.to_string());
                expecting_headword = false;
                continue;
            }
            if let Some(headword) = &current {
                if let Some(raw) = entries.get_mut(headword) {
                    raw.push(line.to_string());
                }
            }
        }

        info!("Loaded {} headwords", entries.len());
        Ok(Self::from_entries(entries, options))
    }

    /// Loads the one-line `word {pos} [note] | syn; syn :: definition` format.
    ///
    /// Each record becomes one part-of-speech block: the note is the word
    /// qualifier, the definition its single gloss and the synonyms attach
    /// to that gloss. Blank lines and `#` comments are skipped.
    pub fn from_records<I, S>(lines: I, options: LoadOptions) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut entries: IndexMap<String, Vec<String>> = IndexMap::new();
        for line in lines {
            let line = line.as_ref();
            if line.trim().is_empty() || line.starts_with('#') {
                continue;
            }
            let record = parse_record(line)?;
            let pos = record.pos.as_deref().ok_or_else(|| WordlistError::MalformedRecord {
                headword: Some(record.word.clone()),
                line: line.to_string(),
                reason: "record has no part of speech".to_string(),
            })?;

            let raw = entries.entry(record.word.clone()).or_default();
            raw.push(format!("pos: {}", pos));
            if let Some(note) = &record.note {
                raw.push(format!("  q: {}", note));
            }
            if let Some(definition) = &record.definition {
                raw.push(format!("  gloss: {}", definition));
                if !record.synonyms.is_empty() {
                    raw.push(format!("    syn: {}", record.synonyms.join("; ")));
                }
            } else if !record.synonyms.is_empty() {
                debug!(
                    "{}: dropping synonyms without a definition: {}",
                    record.word,
                    record.synonyms.join("; ")
                );
            }
        }

        info!("Loaded {} headwords from records", entries.len());
        Ok(Self::from_entries(entries, options))
    }

    fn from_entries(entries: IndexMap<String, Vec<String>>, options: LoadOptions) -> Self {
        Lexicon {
            entries: RefCell::new(
                entries
                    .into_iter()
                    .map(|(headword, raw)| (headword, Entry::Unparsed(raw)))
                    .collect(),
            ),
            options,
            diagnostics: DiagnosticLog::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }

    pub fn contains(&self, headword: &str) -> bool {
        self.entries.borrow().contains_key(headword)
    }

    /// Headwords in source order.
    pub fn headwords(&self) -> Vec<String> {
        self.entries.borrow().keys().cloned().collect()
    }

    /// Parse-time diagnostics reported so far.
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        self.diagnostics.entries()
    }

    /// Returns the headword's words in declaration order, optionally
    /// restricted to a coarse part of speech. Unknown headwords yield an
    /// empty list.
    pub fn get_words(&self, headword: &str, pos: Option<&str>) -> Result<Vec<Rc<Word>>> {
        let words = match self.parsed_words(headword)? {
            Some(words) => words,
            None => return Ok(Vec::new()),
        };
        let wanted = pos.map(common_pos);
        Ok(words
            .iter()
            .filter(|w| wanted.is_none_or(|p| w.common_pos() == p))
            .cloned()
            .collect())
    }

    /// True when the first word for `lemma` under `pos` is itself a lemma.
    pub fn has_lemma(&self, lemma: &str, pos: &str) -> Result<bool> {
        Ok(self
            .get_words(lemma, Some(pos))?
            .first()
            .is_some_and(|w| w.is_lemma()))
    }

    /// Raw lines for a headword, if they are still held.
    pub fn raw_lines(&self, headword: &str) -> Option<Vec<String>> {
        match self.entries.borrow().get(headword)? {
            Entry::Unparsed(raw) => Some(raw.clone()),
            Entry::Parsed { raw, .. } => raw.clone(),
        }
    }

    fn parsed_words(&self, headword: &str) -> Result<Option<Rc<[Rc<Word>]>>> {
        let mut entries = self.entries.borrow_mut();
        let entry = match entries.get_mut(headword) {
            Some(entry) => entry,
            None => return Ok(None),
        };

        if let Entry::Unparsed(raw) = &mut *entry {
            debug!("Parsing entry '{}' ({} lines)", headword, raw.len());
            let mut diagnostics = Vec::new();
            let words: Rc<[Rc<Word>]> = parse_words(headword, raw, &mut diagnostics)?
                .into_iter()
                .map(Rc::new)
                .collect();
            self.diagnostics.extend(diagnostics);

            let raw = if self.options.retain_raw {
                Some(std::mem::take(raw))
            } else {
                None
            };
            *entry = Entry::Parsed { words, raw };
        }

        match &*entry {
            Entry::Parsed { words, .. } => Ok(Some(Rc::clone(words))),
            Entry::Unparsed(_) => Ok(None),
        }
    }
}
