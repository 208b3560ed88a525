//! Resolution of every word to its ultimate lemmas, and the canonical
//! `(form, pos) -> lemmas` table built from it.

use crate::diagnostics::{Diagnostic, DiagnosticLog};
use crate::error::Result;
use crate::lexicon::Lexicon;
use crate::progress::{ProgressCallback, ProgressUpdate};
use crate::word::Word;
use log::{debug, info};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::io::Write;

/// Default bound on redirect chains.
pub const DEFAULT_MAX_DEPTH: usize = 3;

/// Lemma to the form types (or, for a lemma itself, its pos) that lead to it.
/// Keys iterate sorted; each list keeps first-seen order.
pub type LemmaMap = BTreeMap<String, Vec<String>>;

pub struct LemmaResolver<'a> {
    lexicon: &'a Lexicon,
    max_depth: usize,
    diagnostics: DiagnosticLog,
}

impl<'a> LemmaResolver<'a> {
    pub fn new(lexicon: &'a Lexicon) -> Self {
        Self::with_max_depth(lexicon, DEFAULT_MAX_DEPTH)
    }

    pub fn with_max_depth(lexicon: &'a Lexicon, max_depth: usize) -> Self {
        LemmaResolver {
            lexicon,
            max_depth,
            diagnostics: DiagnosticLog::new(),
        }
    }

    pub fn lexicon(&self) -> &'a Lexicon {
        self.lexicon
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Resolution-time diagnostics reported so far.
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        self.diagnostics.entries()
    }

    /// Resolves `word` to the lemmas it is ultimately a form of.
    pub fn resolve(&self, word: &Word) -> Result<LemmaMap> {
        self.resolve_to_depth(word, self.max_depth)
    }

    fn resolve_to_depth(&self, word: &Word, max_depth: usize) -> Result<LemmaMap> {
        let mut lemmas = LemmaMap::new();
        if word.is_lemma() {
            lemmas.insert(word.headword.clone(), vec![word.pos.clone()]);
            return Ok(lemmas);
        }

        let pos = word.common_pos();
        for (lemma, form_types) in word.form_of.iter() {
            if self.lexicon.has_lemma(lemma, pos)? {
                merge(&mut lemmas, lemma, form_types.iter());
                continue;
            }

            if max_depth == 0 {
                self.diagnostics.report(Diagnostic::DepthExceeded {
                    headword: word.headword.clone(),
                    pos: word.pos.clone(),
                    lemma: lemma.to_string(),
                });
                continue;
            }

            // Only the first candidate is followed
            match self.lexicon.get_words(lemma, Some(pos))?.first() {
                Some(target) => {
                    debug!("{} -> {} (redirect, depth {})", word.headword, lemma, max_depth);
                    let redirected = self.resolve_to_depth(target, max_depth - 1)?;
                    for (target_lemma, target_types) in &redirected {
                        merge(&mut lemmas, target_lemma, target_types.iter());
                    }
                }
                None => self.diagnostics.report(Diagnostic::UnknownLemma {
                    headword: word.headword.clone(),
                    pos: word.pos.clone(),
                    lemma: lemma.to_string(),
                }),
            }
        }
        Ok(lemmas)
    }
}

fn merge<'s>(lemmas: &mut LemmaMap, lemma: &str, form_types: impl Iterator<Item = &'s String>) {
    let list = lemmas.entry(lemma.to_string()).or_default();
    for form_type in form_types {
        if !list.contains(form_type) {
            list.push(form_type.clone());
        }
    }
}

// --- Canonical Form Table ---

/// One exported row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormRow<'a> {
    pub form: &'a str,
    pub pos: &'a str,
    pub lemmas: Vec<&'a str>,
}

/// Every surface form mapped to its lemmas, keyed by `(form, pos)`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AllForms {
    table: BTreeMap<(String, String), BTreeSet<String>>,
}

impl AllForms {
    pub fn build(resolver: &LemmaResolver<'_>) -> Result<Self> {
        Self::build_with_progress(resolver, None)
    }

    /// Builds the table from every `(headword, pos)` in the lexicon.
    ///
    /// Each headword maps to itself and its resolved lemmas; each of its
    /// inflections maps to the same set.
    pub fn build_with_progress(
        resolver: &LemmaResolver<'_>,
        mut progress: Option<ProgressCallback>,
    ) -> Result<Self> {
        let lexicon = resolver.lexicon();
        let headwords = lexicon.headwords();
        let stage = "Resolving lemmas".to_string();
        let total = headwords.len() as u64;
        report(&mut progress, ProgressUpdate::new_stage(stage.clone(), Some(total)));

        let mut all_forms = AllForms::default();
        for (idx, headword) in headwords.iter().enumerate() {
            for word in lexicon.get_words(headword, None)? {
                all_forms.add_word(resolver, &word)?;
            }
            if idx % 1000 == 999 {
                report(
                    &mut progress,
                    ProgressUpdate::new(stage.clone(), idx as u64 + 1, Some(total), None),
                );
            }
        }
        report(
            &mut progress,
            ProgressUpdate::new(stage, total, Some(total), Some(format!("{} forms", all_forms.len()))),
        );

        info!(
            "Built form table: {} rows from {} headwords",
            all_forms.len(),
            headwords.len()
        );
        Ok(all_forms)
    }

    fn add_word(&mut self, resolver: &LemmaResolver<'_>, word: &Word) -> Result<()> {
        let mut lemmas: Vec<&str> = vec![word.headword.as_str()];
        let resolved = resolver.resolve(word)?;
        lemmas.extend(resolved.keys().map(String::as_str));

        self.add(&word.headword, &word.pos, &lemmas);
        for form in word.inflections() {
            self.add(form, &word.pos, &lemmas);
        }
        Ok(())
    }

    fn add(&mut self, form: &str, pos: &str, lemmas: &[&str]) {
        let set = self
            .table
            .entry((form.to_string(), pos.to_string()))
            .or_default();
        set.extend(lemmas.iter().map(|l| l.to_string()));
    }

    pub fn get(&self, form: &str, pos: &str) -> Option<&BTreeSet<String>> {
        self.table.get(&(form.to_string(), pos.to_string()))
    }

    /// Every part of speech `form` appears under, with its lemmas.
    pub fn lookup(&self, form: &str) -> Vec<(&str, &BTreeSet<String>)> {
        let start = (form.to_string(), String::new());
        self.table
            .range(start..)
            .take_while(|((f, _), _)| f == form)
            .map(|((_, pos), lemmas)| (pos.as_str(), lemmas))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Rows in `(form, pos)` order.
    pub fn iter(&self) -> impl Iterator<Item = FormRow<'_>> {
        self.table.iter().map(|((form, pos), lemmas)| FormRow {
            form,
            pos,
            lemmas: lemmas.iter().map(String::as_str).collect(),
        })
    }

    // --- Export ---

    /// `form,pos,lemma1,lemma2,...` with lemmas sorted.
    pub fn write_csv<W: Write>(&self, mut out: W) -> Result<()> {
        for row in self.iter() {
            let mut fields = vec![csv_field(row.form), csv_field(row.pos)];
            fields.extend(row.lemmas.iter().map(|l| csv_field(l)));
            writeln!(out, "{}", fields.join(","))?;
        }
        Ok(())
    }

    /// `form {pos} lemma1; lemma2`, or just `form {pos}` when the form is
    /// its own and only lemma.
    pub fn write_text<W: Write>(&self, mut out: W) -> Result<()> {
        for row in self.iter() {
            if row.lemmas == [row.form] {
                writeln!(out, "{} {{{}}}", row.form, row.pos)?;
            } else {
                writeln!(out, "{} {{{}}} {}", row.form, row.pos, row.lemmas.join("; "))?;
            }
        }
        Ok(())
    }

    pub fn write_json<W: Write>(&self, out: W) -> Result<()> {
        let rows: Vec<FormRow<'_>> = self.iter().collect();
        serde_json::to_writer_pretty(out, &rows)?;
        Ok(())
    }
}

fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

fn report(progress: &mut Option<ProgressCallback>, update: ProgressUpdate) {
    if let Some(callback) = progress.as_mut() {
        callback(update);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexicon::LoadOptions;

    fn lexicon(text: &str) -> Lexicon {
        Lexicon::from_lines(text.lines(), LoadOptions::default()).unwrap()
    }

    fn first_word(lex: &Lexicon, headword: &str) -> std::rc::Rc<Word> {
        lex.get_words(headword, None).unwrap().remove(0)
    }

    fn keys(map: &LemmaMap) -> Vec<&str> {
        map.keys().map(String::as_str).collect()
    }

    const GATO: &str = "_____
gato
pos: n
  g: m
  forms: pl=gatos; f=gata; fpl=gatas
  gloss: cat
_____
gatos
pos: n
  gloss: plural of \"gato\"
_____
gatito
pos: n
  gloss: diminutive of \"gato\"
_____
gatita
pos: n
  gloss: alternative form of \"gatito\"
";

    #[test]
    fn test_lemma_resolves_to_itself() {
        let lex = lexicon(GATO);
        let resolver = LemmaResolver::new(&lex);
        let resolved = resolver.resolve(&first_word(&lex, "gato")).unwrap();
        assert_eq!(resolved, LemmaMap::from([("gato".to_string(), vec!["n".to_string()])]));
    }

    #[test]
    fn test_direct_and_redirected_forms() {
        let lex = lexicon(GATO);
        let resolver = LemmaResolver::new(&lex);

        let resolved = resolver.resolve(&first_word(&lex, "gatos")).unwrap();
        assert_eq!(resolved.get("gato"), Some(&vec!["pl".to_string()]));

        // gatita -> gatito (not a lemma) -> gato
        let resolved = resolver.resolve(&first_word(&lex, "gatita")).unwrap();
        assert_eq!(keys(&resolved), vec!["gato"]);
        assert_eq!(resolved["gato"], vec!["dim"]);
        assert!(resolver.diagnostics().is_empty());
    }

    #[test]
    fn test_cycle_terminates_with_diagnostic() {
        let lex = lexicon(
            "_____
ida
pos: n
  gloss: alternative form of \"vuelta\"
_____
vuelta
pos: n
  gloss: alternative form of \"ida\"
",
        );
        let resolver = LemmaResolver::new(&lex);
        let resolved = resolver.resolve(&first_word(&lex, "ida")).unwrap();
        assert!(resolved.is_empty());
        let diagnostics = resolver.diagnostics();
        assert_eq!(diagnostics.len(), 1);
        assert!(matches!(diagnostics[0], Diagnostic::DepthExceeded { .. }));
    }

    #[test]
    fn test_zero_depth_does_not_follow_redirects() {
        let lex = lexicon(GATO);
        let resolver = LemmaResolver::with_max_depth(&lex, 0);
        let resolved = resolver.resolve(&first_word(&lex, "gatita")).unwrap();
        assert!(resolved.is_empty());
        // Direct targets still resolve
        let resolved = resolver.resolve(&first_word(&lex, "gatos")).unwrap();
        assert_eq!(keys(&resolved), vec!["gato"]);
    }

    #[test]
    fn test_unknown_target() {
        let lex = lexicon("_____\nperros\npos: n\n  gloss: plural of \"perro\"\n");
        let resolver = LemmaResolver::new(&lex);
        let resolved = resolver.resolve(&first_word(&lex, "perros")).unwrap();
        assert!(resolved.is_empty());
        assert!(matches!(
            resolver.diagnostics()[0],
            Diagnostic::UnknownLemma { .. }
        ));
    }

    #[test]
    fn test_redirect_follows_first_block_only() {
        let lex = lexicon(
            "_____
vueltita
pos: n
  gloss: diminutive of \"vuelta\"
_____
vuelta
pos: n
  gloss: alternative form of \"volta\"
pos: n
  gloss: turn
_____
volta
pos: n
  gloss: turn (archaic)
",
        );
        let resolver = LemmaResolver::new(&lex);
        let resolved = resolver.resolve(&first_word(&lex, "vueltita")).unwrap();
        assert_eq!(keys(&resolved), vec!["volta"]);
        assert_eq!(resolved["volta"], vec!["alt"]);
        assert!(resolver.diagnostics().is_empty());
    }

    #[test]
    fn test_form_types_union_in_declared_order() {
        let lex = lexicon(
            "_____
hablado
pos: v
  gloss: past participle of \"hablar\"
_____
hablar
pos: v
  gloss: to speak
",
        );
        let mut word = (*first_word(&lex, "hablado")).clone();
        word.add_form_of("hablar", "pp_ms");
        word.add_form_of("hablar", "pp");
        let resolver = LemmaResolver::new(&lex);
        let resolved = resolver.resolve(&word).unwrap();
        assert_eq!(resolved["hablar"], vec!["pp", "pp_ms"]);
    }

    #[test]
    fn test_all_forms_and_exports() {
        let lex = lexicon(GATO);
        let resolver = LemmaResolver::new(&lex);
        let all_forms = AllForms::build(&resolver).unwrap();

        let lemmas = |form: &str| -> Vec<String> {
            all_forms.get(form, "n").unwrap().iter().cloned().collect()
        };
        assert_eq!(lemmas("gato"), vec!["gato"]);
        assert_eq!(lemmas("gatas"), vec!["gato"]);
        assert_eq!(lemmas("gatos"), vec!["gato", "gatos"]);
        assert_eq!(lemmas("gatita"), vec!["gatita", "gato"]);
        assert_eq!(all_forms.lookup("gata").len(), 1);
        assert!(all_forms.lookup("perro").is_empty());

        let mut text = Vec::new();
        all_forms.write_text(&mut text).unwrap();
        let text = String::from_utf8(text).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "gata {n} gato");
        assert!(lines.contains(&"gato {n}"));
        assert!(lines.contains(&"gatos {n} gato; gatos"));

        let mut csv = Vec::new();
        all_forms.write_csv(&mut csv).unwrap();
        let csv = String::from_utf8(csv).unwrap();
        assert!(csv.lines().any(|l| l == "gatos,n,gato,gatos"));
        assert_eq!(csv.lines().count(), all_forms.len());

        let mut json = Vec::new();
        all_forms.write_json(&mut json).unwrap();
        let parsed: serde_json::Value = serde_json::from_slice(&json).unwrap();
        assert_eq!(parsed.as_array().unwrap().len(), all_forms.len());
        assert_eq!(parsed[0]["form"], "gata");
    }

    #[test]
    fn test_csv_quoting() {
        assert_eq!(csv_field("plain"), "plain");
        assert_eq!(csv_field("a, b"), "\"a, b\"");
        assert_eq!(csv_field("say \"hi\""), "\"say \"\"hi\"\"\"");
    }

    #[test]
    fn test_progress_reports_completion() {
        use std::cell::RefCell;
        use std::rc::Rc;

        let lex = lexicon(GATO);
        let resolver = LemmaResolver::new(&lex);
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let callback: ProgressCallback = Box::new(move |update: ProgressUpdate| {
            sink.borrow_mut().push(update.current_item);
        });
        AllForms::build_with_progress(&resolver, Some(callback)).unwrap();
        assert_eq!(*seen.borrow(), vec![0, 4]);
    }
}
