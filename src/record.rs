//! Line-level grammars: the one-line record format and the `key: value`
//! lines that make up a part-of-speech block.

use crate::error::{Result, WordlistError};
use crate::models::Record;
use once_cell::sync::Lazy;
use regex::Regex;

/// `word[ {pos}]*[ [note]][ | syn1; syn2][ :: definition]`
static RECORD_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^(?P<word>(?:[^{\\]|\\.)+?)\s*(?:\{(?P<pos>[^}]*)\}\s*)*(?:\[(?P<note>[^\]]*)\]\s*)?(?:\|\s*(?P<syns>.*?)\s*)?(?:::\s*(?P<def>.*?))?\s*$",
    )
    .unwrap()
});

/// Line that separates two headword blocks.
pub const BLOCK_SEPARATOR: &str = "_____";

// --- Key Vocabulary ---

/// Keys that may appear inside a sense (after the first gloss of a block).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SenseKey {
    /// `gloss`, `_gloss`, `__gloss`, ...; the payload is the nesting depth (1-based).
    Gloss(usize),
    Example,
    English,
    Source,
    Id,
    Usage,
    Syn,
    Ant,
    Qualifier,
    Regional,
}

impl SenseKey {
    pub fn parse(key: &str) -> Option<SenseKey> {
        let bare = key.trim_start_matches('_');
        if bare == "gloss" {
            return Some(SenseKey::Gloss(key.len() - bare.len() + 1));
        }
        if bare.len() != key.len() {
            return None;
        }
        Some(match key {
            "ex" => SenseKey::Example,
            "eng" => SenseKey::English,
            "src" => SenseKey::Source,
            "id" => SenseKey::Id,
            "usage" => SenseKey::Usage,
            "syn" => SenseKey::Syn,
            "ant" => SenseKey::Ant,
            "q" => SenseKey::Qualifier,
            "regional" => SenseKey::Regional,
            _ => return None,
        })
    }

    pub fn depth(self) -> Option<usize> {
        match self {
            SenseKey::Gloss(depth) => Some(depth),
            _ => None,
        }
    }
}

/// Keys that describe the word itself (before its first gloss).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WordKey {
    Pos,
    Meta,
    Gender,
    Qualifier,
    Usage,
    Etymology,
    Forms,
}

impl WordKey {
    pub fn parse(key: &str) -> Option<WordKey> {
        Some(match key {
            "pos" => WordKey::Pos,
            "meta" => WordKey::Meta,
            "g" => WordKey::Gender,
            "q" => WordKey::Qualifier,
            "usage" => WordKey::Usage,
            "etymology" => WordKey::Etymology,
            "forms" => WordKey::Forms,
            _ => return None,
        })
    }
}

// --- Parsers ---

/// Splits one block line into its key and value.
///
/// Leading indentation is ignored. The key is everything before the first
/// `:` and may not contain whitespace.
pub fn parse_key_value(line: &str) -> Result<(&str, &str)> {
    let trimmed = line.trim_start();
    let (key, value) = trimmed
        .split_once(':')
        .ok_or_else(|| WordlistError::malformed(line, "expected 'key: value'"))?;
    if key.is_empty() || key.chars().any(char::is_whitespace) {
        return Err(WordlistError::malformed(line, "invalid key"));
    }
    Ok((key, value.trim()))
}

/// Parses one line of the one-line record format.
pub fn parse_record(line: &str) -> Result<Record> {
    let caps = RECORD_PATTERN
        .captures(line)
        .ok_or_else(|| WordlistError::malformed(line, "does not match record grammar"))?;

    let word = unescape(caps.name("word").map_or("", |m| m.as_str()).trim());
    if word.is_empty() {
        return Err(WordlistError::malformed(line, "missing word"));
    }

    let non_empty = |name: &str| {
        caps.name(name)
            .map(|m| m.as_str().trim())
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    };

    let synonyms = caps
        .name("syns")
        .map(|m| split_list(m.as_str()))
        .unwrap_or_default();

    Ok(Record {
        word,
        pos: non_empty("pos"),
        note: non_empty("note"),
        synonyms,
        definition: non_empty("def"),
    })
}

/// Splits a `;`-separated list, dropping empty items.
pub fn split_list(value: &str) -> Vec<String> {
    value
        .split(';')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Restores embedded newlines in `usage`/`etymology` values.
pub fn unescape_newlines(value: &str) -> String {
    value.replace("\\n", "\n")
}

fn unescape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(next) = chars.next() {
                out.push(next);
            }
        } else {
            out.push(c);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_record() {
        let rec = parse_record("gato {n-m} [Mexico] | felino; minino :: cat, tomcat").unwrap();
        assert_eq!(rec.word, "gato");
        assert_eq!(rec.pos.as_deref(), Some("n-m"));
        assert_eq!(rec.note.as_deref(), Some("Mexico"));
        assert_eq!(rec.synonyms, vec!["felino", "minino"]);
        assert_eq!(rec.definition.as_deref(), Some("cat, tomcat"));
    }

    #[test]
    fn test_last_pos_group_wins() {
        let rec = parse_record("correr {v} {vi} :: to run").unwrap();
        assert_eq!(rec.pos.as_deref(), Some("vi"));
        assert_eq!(rec.definition.as_deref(), Some("to run"));
    }

    #[test]
    fn test_minimal_and_multiword_records() {
        let rec = parse_record("hola").unwrap();
        assert_eq!(rec.word, "hola");
        assert_eq!(rec.pos, None);
        assert!(rec.synonyms.is_empty());

        let rec = parse_record("a menudo {adv} :: often").unwrap();
        assert_eq!(rec.word, "a menudo");
        assert_eq!(rec.pos.as_deref(), Some("adv"));
    }

    #[test]
    fn test_escaped_brace_in_word() {
        let rec = parse_record(r"\{x\} {n} :: braces").unwrap();
        assert_eq!(rec.word, "{x}");
        assert_eq!(rec.pos.as_deref(), Some("n"));
    }

    #[test]
    fn test_malformed_records() {
        assert!(matches!(
            parse_record("gato {n"),
            Err(WordlistError::MalformedRecord { .. })
        ));
        assert!(parse_record("gato {n} stray").is_err());
        assert!(parse_record("").is_err());
        assert!(parse_record("{n} :: nothing").is_err());
    }

    #[test]
    fn test_key_value() {
        assert_eq!(parse_key_value("  gloss: to have").unwrap(), ("gloss", "to have"));
        assert_eq!(parse_key_value("q:").unwrap(), ("q", ""));
        assert_eq!(
            parse_key_value("  gloss: see: other").unwrap(),
            ("gloss", "see: other")
        );
        assert!(parse_key_value("no separator here").is_err());
        assert!(parse_key_value("  bad key: x").is_err());
    }

    #[test]
    fn test_sense_key_vocabulary() {
        assert_eq!(SenseKey::parse("gloss"), Some(SenseKey::Gloss(1)));
        assert_eq!(SenseKey::parse("__gloss"), Some(SenseKey::Gloss(3)));
        assert_eq!(SenseKey::parse("syn"), Some(SenseKey::Syn));
        assert_eq!(SenseKey::parse("_syn"), None);
        assert_eq!(SenseKey::parse("meta"), None);
        assert_eq!(SenseKey::Gloss(2).depth(), Some(2));
        assert_eq!(WordKey::parse("g"), Some(WordKey::Gender));
        assert_eq!(WordKey::parse("gloss"), None);
    }

    #[test]
    fn test_unescape_newlines() {
        assert_eq!(unescape_newlines(r"line one\nline two"), "line one\nline two");
    }
}
