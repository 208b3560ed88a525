//! Rebuilds the tree of glosses for one part-of-speech block.
//!
//! The builder walks an array of `(key, value)` pairs with a cursor. A sense
//! at depth `d` stops, without consuming the pair, when it meets a second
//! gloss at depth `d` (a sibling) or a gloss shallower than `d`. The caller
//! resumes from the same cursor position.

use crate::diagnostics::Diagnostic;
use crate::error::{Result, WordlistError};
use crate::form_of;
use crate::models::{Example, Nym, NymKind, Sense};
use crate::record::{split_list, SenseKey};

/// Builds every top-level sense from `pairs`.
///
/// `pairs` must start at the block's first gloss key. Ambiguous form-of
/// glosses are appended to `diagnostics`.
pub fn build_senses(
    headword: &str,
    pairs: &[(&str, &str)],
    diagnostics: &mut Vec<Diagnostic>,
) -> Result<Vec<Sense>> {
    let mut builder = SenseBuilder {
        headword,
        pairs,
        cursor: 0,
        diagnostics,
    };
    let mut senses = Vec::new();
    while builder.cursor < pairs.len() {
        senses.push(builder.build_sense(1)?);
    }
    Ok(senses)
}

struct SenseBuilder<'a, 'd> {
    headword: &'a str,
    pairs: &'a [(&'a str, &'a str)],
    cursor: usize,
    diagnostics: &'d mut Vec<Diagnostic>,
}

impl<'a> SenseBuilder<'a, '_> {
    fn peek(&self) -> Option<(&'a str, &'a str)> {
        self.pairs.get(self.cursor).copied()
    }

    fn build_sense(&mut self, depth: usize) -> Result<Sense> {
        let mut sense = Sense::default();
        let mut has_gloss = false;
        let mut last_nym: Option<usize> = None;

        while let Some((key, value)) = self.peek() {
            let parsed = SenseKey::parse(key).ok_or_else(|| WordlistError::unexpected_key(key, value))?;
            match parsed {
                SenseKey::Gloss(d) if d == depth => {
                    if has_gloss {
                        break;
                    }
                    sense.gloss = value.to_string();
                    has_gloss = true;
                    self.cursor += 1;
                }
                SenseKey::Gloss(d) if d == depth + 1 => {
                    let subsense = self.build_sense(d)?;
                    sense.subsenses.push(subsense);
                }
                SenseKey::Gloss(d) if d < depth => break,
                SenseKey::Gloss(_) => return Err(WordlistError::unexpected_key(key, value)),
                SenseKey::Example => self.read_examples(&mut sense),
                SenseKey::English | SenseKey::Source => {
                    return Err(WordlistError::unexpected_key(key, value));
                }
                SenseKey::Id => {
                    sense.id = Some(value.to_string());
                    self.cursor += 1;
                }
                SenseKey::Usage => {
                    sense.usage.push(value.to_string());
                    self.cursor += 1;
                }
                SenseKey::Syn | SenseKey::Ant => {
                    let kind = if parsed == SenseKey::Syn {
                        NymKind::Syn
                    } else {
                        NymKind::Ant
                    };
                    sense.nyms.push(Nym {
                        kind,
                        qualifier: None,
                        items: split_list(value),
                    });
                    last_nym = Some(sense.nyms.len() - 1);
                    self.cursor += 1;
                }
                SenseKey::Qualifier => {
                    match last_nym {
                        Some(idx) => sense.nyms[idx].qualifier = Some(value.to_string()),
                        None => sense.qualifier = Some(value.to_string()),
                    }
                    self.cursor += 1;
                }
                SenseKey::Regional => {
                    sense.regions.extend(split_list(value));
                    self.cursor += 1;
                }
            }
        }

        if sense.gloss.is_empty() && sense.qualifier.is_none() && sense.subsenses.is_empty() {
            let line = self
                .pairs
                .get(self.cursor.saturating_sub(1))
                .map(|(k, v)| format!("{}: {}", k, v))
                .unwrap_or_default();
            return Err(WordlistError::malformed(&line, "sense without gloss"));
        }

        self.classify(&mut sense);
        Ok(sense)
    }

    /// Consumes a contiguous run of `ex`/`eng`/`src` pairs.
    fn read_examples(&mut self, sense: &mut Sense) {
        while let Some((key, value)) = self.peek() {
            match SenseKey::parse(key) {
                Some(SenseKey::Example) => sense.examples.push(Example {
                    text: value.to_string(),
                    ..Default::default()
                }),
                Some(SenseKey::English) => {
                    if let Some(ex) = sense.examples.last_mut() {
                        ex.english = Some(value.to_string());
                    }
                }
                Some(SenseKey::Source) => {
                    if let Some(ex) = sense.examples.last_mut() {
                        ex.source = Some(value.to_string());
                    }
                }
                _ => break,
            }
            self.cursor += 1;
        }
    }

    fn classify(&mut self, sense: &mut Sense) {
        if sense.gloss.is_empty() {
            return;
        }
        if let Some(found) = form_of::classify(&sense.gloss) {
            if !found.quoted {
                self.diagnostics.push(Diagnostic::AmbiguousFormOf {
                    headword: self.headword.to_string(),
                    gloss: sense.gloss.clone(),
                    lemma: found.lemma.clone(),
                });
            }
            sense.form_type = Some(found.form_type);
            sense.lemma = Some(found.lemma);
            sense.remainder = Some(found.remainder);
        }
    }
}
