use crate::error::{Result, WordlistError};
use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// --- Form Tables ---

/// Insertion-ordered mapping of a key to an ordered set of values.
///
/// Used both for a word's explicit forms (`formType -> forms`) and for its
/// form-of relations (`lemma -> formTypes`). Equality ignores ordering.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FormTable(IndexMap<String, IndexSet<String>>);

impl FormTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `value` under `key`. Returns false if it was already present.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) -> bool {
        self.0.entry(key.into()).or_default().insert(value.into())
    }

    pub fn get(&self, key: &str) -> Option<&IndexSet<String>> {
        self.0.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &IndexSet<String>)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Every `(key, value)` pair in insertion order.
    pub fn pairs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0
            .iter()
            .flat_map(|(k, vs)| vs.iter().map(move |v| (k.as_str(), v.as_str())))
    }

    /// Merges every pair of `other` into this table.
    pub fn extend(&mut self, other: &FormTable) {
        for (k, v) in other.pairs() {
            self.insert(k, v);
        }
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Parses the compact `k=v; k2=v2` notation. Repeated keys accumulate.
impl FromStr for FormTable {
    type Err = WordlistError;

    fn from_str(s: &str) -> Result<Self> {
        let mut table = FormTable::new();
        for segment in s.split(';').map(str::trim).filter(|seg| !seg.is_empty()) {
            let (key, value) = segment
                .split_once('=')
                .ok_or_else(|| WordlistError::malformed(s, format!("form '{}' has no '='", segment)))?;
            let (key, value) = (key.trim(), value.trim());
            if key.is_empty() {
                return Err(WordlistError::malformed(s, "empty form type"));
            }
            if !value.is_empty() {
                table.insert(key, value);
            }
        }
        Ok(table)
    }
}

/// Renders sorted by key then value, one `key=value` per form.
impl fmt::Display for FormTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut pairs: Vec<(&str, &str)> = self.pairs().collect();
        pairs.sort_unstable();
        let rendered: Vec<String> = pairs.iter().map(|(k, v)| format!("{}={}", k, v)).collect();
        write!(f, "{}", rendered.join("; "))
    }
}

// --- Senses ---

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Example {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub english: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NymKind {
    Syn,
    Ant,
}

/// A synonym or antonym list attached to a sense.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Nym {
    pub kind: NymKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub qualifier: Option<String>,
    pub items: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sense {
    /// Empty only for qualifier-only fragments that group subsenses.
    pub gloss: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub qualifier: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub usage: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub examples: Vec<Example>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub nyms: Vec<Nym>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub regions: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub subsenses: Vec<Sense>,

    // Filled from the form-of classifier
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub form_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lemma: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remainder: Option<String>,
}

impl Sense {
    pub fn is_form_of(&self) -> bool {
        self.lemma.is_some()
    }

    pub fn synonyms(&self) -> impl Iterator<Item = &str> {
        self.nyms_of(NymKind::Syn)
    }

    pub fn antonyms(&self) -> impl Iterator<Item = &str> {
        self.nyms_of(NymKind::Ant)
    }

    fn nyms_of(&self, kind: NymKind) -> impl Iterator<Item = &str> {
        self.nyms
            .iter()
            .filter(move |n| n.kind == kind)
            .flat_map(|n| n.items.iter().map(String::as_str))
    }
}

// --- One-line Records ---

/// One line of the `word {pos} [note] | syn; syn :: definition` format.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub word: String,
    pub pos: Option<String>,
    pub note: Option<String>,
    pub synonyms: Vec<String>,
    pub definition: Option<String>,
}
