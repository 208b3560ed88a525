//! One part-of-speech occurrence of a headword.

use crate::diagnostics::Diagnostic;
use crate::error::{Result, WordlistError};
use crate::models::{FormTable, Sense};
use crate::record::{parse_key_value, split_list, unescape_newlines, SenseKey, WordKey};
use crate::sense::build_senses;
use indexmap::IndexSet;
use log::trace;
use serde::Serialize;

const FEMININE_GENDERS: &[&str] = &["f", "fp", "fpl"];

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Word {
    pub headword: String,
    /// Source part-of-speech tag, e.g. `n`, `v`, `adj`.
    pub pos: String,
    pub genders: IndexSet<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub qualifier: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub etymology: Option<String>,
    /// Explicit inflections: form type to surface forms.
    pub forms: FormTable,
    /// Reverse relation: lemma to the form types this word is of it.
    pub form_of: FormTable,
    pub senses: Vec<Sense>,
}

/// Coarse part-of-speech bucket for a source tag.
///
/// Noun and verb tags with gender or valency suffixes (`nm`, `nfp`, `vt`,
/// `vr`, ...) collapse to `noun` and `verb`; anything else is returned as is.
pub fn common_pos(pos: &str) -> &str {
    let mut chars = pos.chars();
    match chars.next() {
        _ if pos == "prop" => "noun",
        Some('n') if chars.as_str().chars().all(|c| "mfp-".contains(c)) => "noun",
        Some('v') if chars.as_str().chars().all(|c| "tirp".contains(c)) => "verb",
        _ => pos,
    }
}

impl Word {
    pub fn new(headword: impl Into<String>, pos: impl Into<String>) -> Self {
        Word {
            headword: headword.into(),
            pos: pos.into(),
            ..Default::default()
        }
    }

    pub fn common_pos(&self) -> &str {
        common_pos(&self.pos)
    }

    /// A word is a lemma when it has senses and is not a form of another
    /// word. A word declaring both masculine and feminine forms is a
    /// gender-neutral lemma regardless of its form-of relations.
    pub fn is_lemma(&self) -> bool {
        !self.senses.is_empty() && (self.form_of.is_empty() || self.declares_both_genders())
    }

    /// Feminine by its `g:` genders or, when it declares none, by a noun tag
    /// such as `nf` or `nfp`.
    pub fn is_feminine(&self) -> bool {
        if !self.genders.is_empty() {
            return self
                .genders
                .iter()
                .all(|g| FEMININE_GENDERS.contains(&g.as_str()));
        }
        self.pos
            .strip_prefix('n')
            .is_some_and(|suffix| FEMININE_GENDERS.contains(&suffix))
    }

    pub fn declares_both_genders(&self) -> bool {
        let has = |keys: &[&str]| keys.iter().any(|k| self.forms.contains_key(k));
        has(&["m", "mpl"]) && has(&["f", "fpl"])
    }

    /// Records an explicit form, deriving the feminine-of relation when a
    /// feminine word names its masculine counterpart.
    pub fn add_form(&mut self, form_type: &str, form: &str) {
        self.forms.insert(form_type, form);
        self.derive_gender_relation(form_type, form);
    }

    pub fn add_form_of(&mut self, lemma: &str, form_type: &str) {
        self.form_of.insert(lemma, form_type);
    }

    fn derive_gender_relation(&mut self, form_type: &str, form: &str) {
        let derived = match form_type {
            "m" => "f",
            "mpl" => "fpl",
            _ => return,
        };
        if self.is_feminine() && !self.declares_both_genders() && form != self.headword {
            trace!("{}: feminine of '{}' ({})", self.headword, form, derived);
            self.add_form_of(form, derived);
        }
    }

    /// Explicit forms that inflect this word, excluding forms that name one
    /// of the word's own lemmas (such as a feminine noun's masculine).
    pub fn inflections(&self) -> impl Iterator<Item = &str> {
        self.forms
            .pairs()
            .map(|(_, form)| form)
            .filter(move |form| !self.form_of.contains_key(form))
    }
}

// --- Block Parsing ---

/// Parses every part-of-speech block in a headword's raw lines.
///
/// Blank lines are ignored. Every block starts with a `pos:` line.
pub fn parse_words(
    headword: &str,
    lines: &[String],
    diagnostics: &mut Vec<Diagnostic>,
) -> Result<Vec<Word>> {
    let mut blocks: Vec<Vec<(&str, &str)>> = Vec::new();
    for line in lines.iter().filter(|l| !l.trim().is_empty()) {
        let (key, value) = parse_key_value(line).map_err(|e| e.in_headword(headword))?;
        if key == "pos" {
            blocks.push(Vec::new());
        }
        match blocks.last_mut() {
            Some(block) => block.push((key, value)),
            None => {
                return Err(WordlistError::MalformedRecord {
                    headword: Some(headword.to_string()),
                    line: line.clone(),
                    reason: "expected 'pos:' before block content".to_string(),
                });
            }
        }
    }

    blocks
        .iter()
        .map(|block| parse_block(headword, block, diagnostics).map_err(|e| e.in_headword(headword)))
        .collect()
}

fn parse_block(
    headword: &str,
    pairs: &[(&str, &str)],
    diagnostics: &mut Vec<Diagnostic>,
) -> Result<Word> {
    let mut word = Word::new(headword, "");
    let mut forms = FormTable::new();

    let sense_start = pairs
        .iter()
        .position(|(key, _)| matches!(SenseKey::parse(key), Some(SenseKey::Gloss(_))))
        .unwrap_or(pairs.len());

    for &(key, value) in &pairs[..sense_start] {
        match WordKey::parse(key).ok_or_else(|| WordlistError::unexpected_key(key, value))? {
            WordKey::Pos => word.pos = value.to_string(),
            WordKey::Meta => word.meta = Some(value.to_string()),
            WordKey::Gender => word.genders.extend(split_list(value)),
            WordKey::Qualifier => word.qualifier = Some(value.to_string()),
            WordKey::Usage => word.usage = Some(unescape_newlines(value)),
            WordKey::Etymology => word.etymology = Some(unescape_newlines(value)),
            WordKey::Forms => forms.extend(&value.parse::<FormTable>()?),
        }
    }

    word.senses = build_senses(headword, &pairs[sense_start..], diagnostics)?;

    // Only the first sense may declare the word a form of another
    if let Some(first) = word.senses.first() {
        if let (Some(lemma), Some(form_type)) = (first.lemma.clone(), first.form_type.clone()) {
            word.add_form_of(&lemma, &form_type);
        }
    }

    // Gender derivation needs the complete table to see whether both genders are declared
    for (form_type, form) in forms.pairs() {
        word.forms.insert(form_type, form);
    }
    for (form_type, form) in forms.pairs() {
        word.derive_gender_relation(form_type, form);
    }

    Ok(word)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(text: &str) -> Vec<String> {
        text.lines().map(str::to_string).collect()
    }

    fn parse(headword: &str, text: &str) -> Vec<Word> {
        let mut diagnostics = Vec::new();
        parse_words(headword, &lines(text), &mut diagnostics).unwrap()
    }

    #[test]
    fn test_common_pos() {
        assert_eq!(common_pos("n"), "noun");
        assert_eq!(common_pos("nfp"), "noun");
        assert_eq!(common_pos("prop"), "noun");
        assert_eq!(common_pos("v"), "verb");
        assert_eq!(common_pos("vr"), "verb");
        assert_eq!(common_pos("adj"), "adj");
        assert_eq!(common_pos("num"), "num");
    }

    #[test]
    fn test_parse_full_block() {
        let words = parse(
            "gato",
            "pos: n\n  meta: {{es-noun|m}}\n  g: m\n  q: colloquial\n  usage: first\\nsecond\n  etymology: From Latin cattus.\n  forms: pl=gatos; f=gata\n  gloss: cat\n    syn: felino\n  gloss: jack\npos: adj\n  gloss: feline",
        );
        assert_eq!(words.len(), 2);
        let noun = &words[0];
        assert_eq!(noun.pos, "n");
        assert_eq!(noun.meta.as_deref(), Some("{{es-noun|m}}"));
        assert!(noun.genders.contains("m"));
        assert_eq!(noun.qualifier.as_deref(), Some("colloquial"));
        assert_eq!(noun.usage.as_deref(), Some("first\nsecond"));
        assert_eq!(noun.senses.len(), 2);
        assert_eq!(noun.forms.get("pl").unwrap().len(), 1);
        assert!(noun.is_lemma());
        assert_eq!(words[1].pos, "adj");
        assert_eq!(words[1].senses[0].gloss, "feline");
    }

    #[test]
    fn test_only_first_sense_sets_form_of() {
        let words = parse(
            "gatos",
            "pos: n\n  gloss: plural of \"gato\"\n  gloss: alternative form of \"gatas\"",
        );
        let word = &words[0];
        assert_eq!(word.form_of.len(), 1);
        assert!(word.form_of.get("gato").unwrap().contains("pl"));
        assert!(!word.is_lemma());
        // The second sense is still classified
        assert_eq!(word.senses[1].lemma.as_deref(), Some("gatas"));
    }

    #[test]
    fn test_feminine_names_masculine() {
        let words = parse(
            "protectora",
            "pos: n\n  g: f\n  forms: m=protector; pl=protectoras\n  gloss: protector (woman)",
        );
        let word = &words[0];
        assert_eq!(
            word.form_of.get("protector").map(|s| s.iter().cloned().collect::<Vec<_>>()),
            Some(vec!["f".to_string()])
        );
        assert!(!word.is_lemma());
        let inflections: Vec<&str> = word.inflections().collect();
        assert_eq!(inflections, vec!["protectoras"]);
    }

    #[test]
    fn test_masculine_names_feminine_is_asymmetric() {
        let words = parse(
            "protector",
            "pos: n\n  g: m\n  forms: f=protectora; pl=protectores\n  gloss: protector",
        );
        assert!(words[0].form_of.is_empty());
        assert!(words[0].is_lemma());
    }

    #[test]
    fn test_gender_neutral_word() {
        // Common gender never derives a relation
        let words = parse("testigo", "pos: n\n  g: mf\n  forms: m=testigo; pl=testigos\n  gloss: witness");
        assert!(words[0].form_of.is_empty());

        // A feminine word naming both genders stays a lemma for both
        let mut word = Word::new("x", "n");
        word.genders.insert("f".to_string());
        word.senses.push(Sense {
            gloss: "g".into(),
            ..Default::default()
        });
        word.add_form("f", "xa");
        word.add_form("m", "xo");
        assert!(word.form_of.is_empty());
        assert!(word.is_lemma());
    }

    #[test]
    fn test_feminine_noun_tag_without_genders() {
        let words = parse("gata", "pos: nf\n  forms: m=gato; pl=gatas\n  gloss: cat (female)");
        let word = &words[0];
        assert!(word.is_feminine());
        assert!(word.form_of.get("gato").unwrap().contains("f"));
        assert!(!word.is_lemma());
        assert_eq!(word.inflections().collect::<Vec<_>>(), vec!["gatas"]);

        let words = parse("gatas", "pos: nfp\n  forms: mpl=gatos\n  gloss: cats (female)");
        assert!(words[0].form_of.get("gatos").unwrap().contains("fpl"));

        // Masculine tags and explicit genders take precedence over the tag
        let words = parse("gato", "pos: nm\n  forms: f=gata\n  gloss: cat");
        assert!(!words[0].is_feminine());
        assert!(words[0].is_lemma());
        let words = parse("testigo", "pos: nf\n  g: mf\n  forms: m=testigo\n  gloss: witness");
        assert!(!words[0].is_feminine());
        assert!(words[0].form_of.is_empty());
    }

    #[test]
    fn test_add_form_derives_plural_relation() {
        let mut word = Word::new("gatas", "n");
        word.genders.insert("fp".to_string());
        word.add_form("mpl", "gatos");
        assert!(word.form_of.get("gatos").unwrap().contains("fpl"));
    }

    #[test]
    fn test_word_without_senses_is_not_lemma() {
        let words = parse("xyz", "pos: n\n  g: m");
        assert!(words[0].senses.is_empty());
        assert!(!words[0].is_lemma());
    }

    #[test]
    fn test_block_errors() {
        let mut diagnostics = Vec::new();
        let err = parse_words("gato", &lines("gloss: cat"), &mut diagnostics).unwrap_err();
        assert!(matches!(err, WordlistError::MalformedRecord { headword: Some(ref h), .. } if h == "gato"));

        let err = parse_words("gato", &lines("pos: n\n  syn: felino\n  gloss: cat"), &mut diagnostics)
            .unwrap_err();
        assert!(matches!(err, WordlistError::UnexpectedKey { .. }));

        let err = parse_words("gato", &lines("pos: n\n  not a pair"), &mut diagnostics).unwrap_err();
        assert!(matches!(err, WordlistError::MalformedRecord { .. }));
    }
}
