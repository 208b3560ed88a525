//! Detection of "form of" glosses such as `plural of "gato"`.
//!
//! The phrase table is compiled once into a single alternation. Longer
//! phrases are listed before any phrase that is a prefix of them so the
//! alternation prefers the most specific match.

use once_cell::sync::Lazy;
use regex::Regex;

/// A phrase in the form-of table.
#[derive(Debug, Clone, Copy)]
enum Phrase {
    /// Literal phrase mapped to a fixed form-type code.
    Literal(&'static str, &'static str),
    /// Regex fragment whose matched text is itself the form-type code.
    Pattern(&'static str),
}

const PHRASES: &[Phrase] = &[
    Phrase::Pattern(r"(?:gerund|pp|cond|fut|impf|pres|pret|imp|sub|inf)_\w+"),
    Phrase::Literal("masculine singular past participle", "pp_ms"),
    Phrase::Literal("masculine plural past participle", "pp_mp"),
    Phrase::Literal("feminine singular past participle", "pp_fs"),
    Phrase::Literal("feminine plural past participle", "pp_fp"),
    Phrase::Literal("alternative spelling", "alt"),
    Phrase::Literal("alternative form", "alt"),
    Phrase::Literal("alternate spelling", "alt"),
    Phrase::Literal("alternate form", "alt"),
    Phrase::Literal("eye dialect spelling", "alt"),
    Phrase::Literal("informal spelling", "alt"),
    Phrase::Literal("nonstandard spelling", "alt"),
    Phrase::Literal("archaic spelling", "old"),
    Phrase::Literal("obsolete spelling", "old"),
    Phrase::Literal("obsolete form", "old"),
    Phrase::Literal("superseded spelling", "old"),
    Phrase::Literal("rare spelling", "rare"),
    Phrase::Literal("misspelling", "spell"),
    Phrase::Literal("abbreviation", "abbrev"),
    Phrase::Literal("acronym", "abbrev"),
    Phrase::Literal("initialism", "abbrev"),
    Phrase::Literal("clipping", "clip"),
    Phrase::Literal("contraction", "contraction"),
    Phrase::Literal("apocopic form", "apoc"),
    Phrase::Literal("diminutive", "dim"),
    Phrase::Literal("augmentative", "aug"),
    Phrase::Literal("pejorative", "pej"),
    Phrase::Literal("female equivalent", "f"),
    Phrase::Literal("feminine singular", "f"),
    Phrase::Literal("feminine plural", "fpl"),
    Phrase::Literal("feminine", "f"),
    Phrase::Literal("masculine singular", "m"),
    Phrase::Literal("masculine plural", "mpl"),
    Phrase::Literal("masculine", "m"),
    Phrase::Literal("plural", "pl"),
    Phrase::Literal("past participle", "pp"),
    Phrase::Literal("present participle", "gerund"),
    Phrase::Literal("gerund", "gerund"),
    Phrase::Literal("compound form", "reflexive"),
    Phrase::Literal("reflexive form", "reflexive"),
    Phrase::Literal("inflection", "inflection"),
    Phrase::Literal("comparative degree", "comp"),
    Phrase::Literal("comparative", "comp"),
    Phrase::Literal("superlative degree", "super"),
    Phrase::Literal("superlative", "super"),
    Phrase::Literal("elative", "elative"),
];

/// Boundary a phrase must start at: start of gloss (optionally after an
/// article), an opening paren, or punctuation followed by a space.
const ANCHOR: &str = r"(?:^(?:an?\s+)?|\(|[,;:.!?]\s+)";

static ALTERNATION: Lazy<String> = Lazy::new(|| {
    PHRASES
        .iter()
        .map(|phrase| match phrase {
            Phrase::Literal(text, _) => regex::escape(text),
            Phrase::Pattern(pattern) => pattern.to_string(),
        })
        .collect::<Vec<_>>()
        .join("|")
});

static QUOTED_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r#"(?i){}(?P<phrase>{})\s+(?:of|in)\s+"(?P<lemma>[^"]+)""#,
        ANCHOR, *ALTERNATION
    ))
    .unwrap()
});

static UNQUOTED_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r#"(?i){}(?P<phrase>{})\s+(?:of|in)\s+(?P<lemma>[^,;:()"]+)"#,
        ANCHOR, *ALTERNATION
    ))
    .unwrap()
});

static COMPOUND_SUFFIX: Lazy<Regex> = Lazy::new(|| Regex::new(r#"^(?:\s*\+\s*"[^"]*")+"#).unwrap());

/// Result of a successful form-of detection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormOf {
    /// Abbreviated form-type code, e.g. `pl` or `pp_ms`.
    pub form_type: String,
    /// The referenced lemma.
    pub lemma: String,
    /// Text of the gloss that is not part of the form-of declaration.
    pub remainder: String,
    /// False when only the unquoted fallback pattern matched.
    pub quoted: bool,
}

/// Classifies `gloss`, returning `None` when it is not a form-of gloss.
pub fn classify(gloss: &str) -> Option<FormOf> {
    if let Some(found) = match_with(&QUOTED_PATTERN, gloss, true) {
        return Some(found);
    }
    match_with(&UNQUOTED_PATTERN, gloss, false)
}

fn match_with(pattern: &Regex, gloss: &str, quoted: bool) -> Option<FormOf> {
    let caps = pattern.captures(gloss)?;
    let whole = caps.get(0)?;
    let phrase = caps.name("phrase")?.as_str();
    let lemma = caps.name("lemma")?.as_str().trim();
    if lemma.is_empty() {
        return None;
    }
    let form_type = form_type_for(phrase)?;

    let mut tail = &gloss[whole.end()..];
    if form_type == "reflexive" && phrase.eq_ignore_ascii_case("compound form") {
        if let Some(m) = COMPOUND_SUFFIX.find(tail) {
            tail = &tail[m.end()..];
        }
    }
    let remainder = join_remainder(&gloss[..whole.start()], tail);

    Some(FormOf {
        form_type,
        lemma: lemma.to_string(),
        remainder,
        quoted,
    })
}

/// Maps matched phrase text back to its code.
fn form_type_for(phrase: &str) -> Option<String> {
    let lowered = phrase.to_lowercase();
    for entry in PHRASES {
        match entry {
            Phrase::Literal(text, code) if *text == lowered => return Some(code.to_string()),
            Phrase::Pattern(_) if META_PATTERN.is_match(&lowered) => return Some(lowered),
            _ => {}
        }
    }
    None
}

static META_PATTERN: Lazy<Regex> = Lazy::new(|| {
    let patterns: Vec<&str> = PHRASES
        .iter()
        .filter_map(|p| match p {
            Phrase::Pattern(pattern) => Some(*pattern),
            Phrase::Literal(..) => None,
        })
        .collect();
    Regex::new(&format!("^(?:{})$", patterns.join("|"))).unwrap()
});

fn join_remainder(head: &str, tail: &str) -> String {
    let head = head.trim_end_matches(|c: char| c.is_whitespace() || "(,;:.".contains(c));
    let tail = tail
        .trim_start_matches(|c: char| c.is_whitespace() || ",;:.)".contains(c))
        .trim_end();
    match (head.is_empty(), tail.is_empty()) {
        (true, _) => tail.to_string(),
        (false, true) => head.to_string(),
        (false, false) => format!("{}; {}", head, tail),
    }
}
