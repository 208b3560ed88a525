//! Command-line interface for the wordlist library.
//!
//! This CLI loads a lexicon file and provides commands for inspecting
//! entries, resolving forms to lemmas, and exporting the full form table.

use clap::{Parser, Subcommand, ValueEnum};
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use log::{LevelFilter, debug, error, info};
use rand::seq::IndexedRandom;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use std::process;
use std::time::{Duration, Instant};
use wordlist_rs::{
    AllForms, InputFormat, LemmaResolver, Lexicon, LoadOptions, Sense, Word,
    error::Result,
    load_lexicon,
    progress::{ProgressCallback, ProgressUpdate},
};

#[derive(Parser, Debug)]
#[command(author, version, about = "Lexicon lemma resolver", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to the lexicon file (.gz files are decompressed)
    #[arg(long, global = true)]
    lexicon: Option<PathBuf>,

    /// Read the one-line `word {pos} :: definition` record format
    #[arg(long, global = true, default_value_t = false)]
    records: bool,

    /// Keep raw entry lines after parsing
    #[arg(long, global = true, default_value_t = false)]
    retain_raw: bool,

    /// Maximum redirect depth when resolving lemmas
    #[arg(long, global = true, default_value_t = wordlist_rs::DEFAULT_MAX_DEPTH)]
    max_depth: usize,

    /// Set verbosity level (use -v, -vv, or -vvv for increasing verbosity)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Show every part-of-speech block for a headword
    Define {
        /// The headword to show
        word: String,
        /// Optional part of speech filter (n, v, adj, ...)
        pos: Option<String>,
    },
    /// Resolve a surface form to its lemmas
    Lemmas {
        /// The form to resolve
        form: String,
        /// Optional part of speech tag
        pos: Option<String>,
    },
    /// Export the full form-to-lemma table
    Export {
        #[arg(long, value_enum, default_value_t = ExportFormat::Csv)]
        format: ExportFormat,
        /// Output file (defaults to stdout)
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Show a random lemma
    Random,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum ExportFormat {
    Csv,
    Text,
    Json,
}

/// Sets up logging based on verbosity level.
fn setup_logging(verbose: u8) {
    let log_level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };

    env_logger::Builder::new()
        .filter(None, log_level)
        .format(|buf, record| writeln!(buf, "[{}] {}", record.level(), record.args()))
        .init();
}

/// Creates a progress callback that drives a single progress bar.
fn create_progress_callback(pb: ProgressBar) -> ProgressCallback {
    Box::new(move |update: ProgressUpdate| {
        if update.current_item == 0 {
            pb.set_length(update.total_items.unwrap_or(0));
            pb.set_prefix(update.stage_description.clone());
            pb.enable_steady_tick(Duration::from_millis(100));
        }
        pb.set_position(update.current_item);
        if let Some(msg) = &update.message {
            pb.set_message(msg.clone());
        }
        if update.is_complete() {
            pb.finish_and_clear();
        }
    })
}

/// Main entry point for the CLI application.
fn main() {
    let cli = Cli::parse();

    setup_logging(cli.verbose);

    let Some(path) = cli.lexicon.clone() else {
        eprintln!("{}", "Error: --lexicon <FILE> is required".red());
        process::exit(2);
    };

    let format = if cli.records {
        InputFormat::Records
    } else {
        InputFormat::Blocks
    };
    let options = LoadOptions {
        retain_raw: cli.retain_raw,
    };

    let start_load = Instant::now();
    let lexicon = match load_lexicon(&path, format, options) {
        Ok(lexicon) => lexicon,
        Err(e) => {
            error!("Failed to load lexicon: {}", e);
            eprintln!("{}", format!("Error: {}", e).red());
            process::exit(1);
        }
    };
    debug!("Loading {:?} took: {:?}", path, start_load.elapsed());

    let resolver = LemmaResolver::with_max_depth(&lexicon, cli.max_depth);

    let result = match &cli.command {
        Commands::Define { word, pos } => handle_define(&lexicon, word, pos.as_deref()),
        Commands::Lemmas { form, pos } => handle_lemmas(&resolver, form, pos.as_deref()),
        Commands::Export { format, output } => handle_export(&resolver, *format, output.as_ref()),
        Commands::Random => handle_random(&lexicon),
    };

    info!(
        "Diagnostics: {} while parsing, {} while resolving",
        lexicon.diagnostics().len(),
        resolver.diagnostics().len()
    );

    if let Err(e) = result {
        error!("Error during {:?}: {}", cli.command, e);
        eprintln!("{}", format!("Error: {}", e).red());
        process::exit(1);
    }
}

/// Handles the define command by printing each matching word block.
fn handle_define(lexicon: &Lexicon, headword: &str, pos: Option<&str>) -> Result<()> {
    info!("Defining word: '{}', PoS filter: {:?}", headword, pos);
    let words = lexicon.get_words(headword, pos)?;
    if words.is_empty() {
        println!("No entries found for '{}'.", headword.yellow());
        return Ok(());
    }

    for word in &words {
        print_word(word);
    }
    Ok(())
}

fn print_word(word: &Word) {
    let genders: Vec<&str> = word.genders.iter().map(String::as_str).collect();
    print!("\n{} ~ {}", word.headword.bold().cyan(), word.pos.italic());
    if !genders.is_empty() {
        print!(" [{}]", genders.join(", ").dimmed());
    }
    println!();

    if let Some(q) = &word.qualifier {
        println!("  ({})", q.italic());
    }
    if !word.forms.is_empty() {
        println!("  {}: {}", "Forms".magenta(), word.forms.to_string().green());
    }
    if !word.form_of.is_empty() {
        println!("  {}: {}", "Form of".magenta(), word.form_of.to_string().green());
    }

    for (idx, sense) in word.senses.iter().enumerate() {
        print_sense(sense, &(idx + 1).to_string(), 1);
    }
}

fn print_sense(sense: &Sense, label: &str, depth: usize) {
    let indent = "  ".repeat(depth);
    let qualifier = sense
        .qualifier
        .as_ref()
        .map(|q| format!("({}) ", q).italic().to_string())
        .unwrap_or_default();
    println!("{}{}: {}{}", indent, label.bold(), qualifier, sense.gloss.trim());

    for example in &sense.examples {
        println!("{}    {}", indent, example.text.italic());
        if let Some(english) = &example.english {
            println!("{}    {}", indent, english.dimmed());
        }
    }
    let synonyms: Vec<&str> = sense.synonyms().collect();
    if !synonyms.is_empty() {
        println!("{}    {}: {}", indent, "Synonyms".magenta(), synonyms.join(", ").green());
    }
    let antonyms: Vec<&str> = sense.antonyms().collect();
    if !antonyms.is_empty() {
        println!("{}    {}: {}", indent, "Antonyms".magenta(), antonyms.join(", ").green());
    }

    for (idx, subsense) in sense.subsenses.iter().enumerate() {
        let sub_label = format!("{}.{}", label, idx + 1);
        print_sense(subsense, &sub_label, depth + 1);
    }
}

/// Handles the lemmas command by resolving a surface form.
///
/// Headwords resolve directly; other forms need the full table.
fn handle_lemmas(resolver: &LemmaResolver<'_>, form: &str, pos: Option<&str>) -> Result<()> {
    let lexicon = resolver.lexicon();
    let words = lexicon.get_words(form, pos)?;

    let mut found = false;
    for word in &words {
        let lemmas = resolver.resolve(word)?;
        let rendered: Vec<String> = lemmas
            .iter()
            .map(|(lemma, types)| format!("{} ({})", lemma, types.join(", ")))
            .collect();
        println!("{} {{{}}}: {}", form.bold().cyan(), word.pos, rendered.join("; ").green());
        found = true;
    }

    if !found {
        let all_forms = AllForms::build(resolver)?;
        for (tag, lemmas) in all_forms.lookup(form) {
            if pos.is_some_and(|p| p != tag) {
                continue;
            }
            let lemmas: Vec<&str> = lemmas.iter().map(String::as_str).collect();
            println!("{} {{{}}}: {}", form.bold().cyan(), tag, lemmas.join("; ").green());
            found = true;
        }
    }

    if !found {
        println!("No lemmas found for '{}'.", form.yellow());
    }
    Ok(())
}

/// Handles the export command.
fn handle_export(
    resolver: &LemmaResolver<'_>,
    format: ExportFormat,
    output: Option<&PathBuf>,
) -> Result<()> {
    let pb = ProgressBar::new(0);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{prefix:>12.cyan.bold} [{elapsed_precise}] {bar:40.cyan/blue} {pos:>7}/{len:7} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("##-"),
    );
    let callback = create_progress_callback(pb.clone());

    let start = Instant::now();
    let all_forms = AllForms::build_with_progress(resolver, Some(callback))?;
    pb.finish_and_clear();
    debug!("Building form table took: {:?}", start.elapsed());

    let writer: Box<dyn Write> = match output {
        Some(path) => Box::new(BufWriter::new(File::create(path)?)),
        None => Box::new(BufWriter::new(std::io::stdout().lock())),
    };

    match format {
        ExportFormat::Csv => all_forms.write_csv(writer)?,
        ExportFormat::Text => all_forms.write_text(writer)?,
        ExportFormat::Json => all_forms.write_json(writer)?,
    }

    if let Some(path) = output {
        eprintln!(
            "{}",
            format!("Wrote {} rows to {}", all_forms.len(), path.display()).green()
        );
    }
    Ok(())
}

fn handle_random(lexicon: &Lexicon) -> Result<()> {
    info!("Getting random lemma...");
    let mut lemmas = Vec::new();
    for headword in lexicon.headwords() {
        for word in lexicon.get_words(&headword, None)? {
            if word.is_lemma() {
                lemmas.push(word);
            }
        }
    }

    match lemmas.choose(&mut rand::rng()) {
        Some(word) => println!(
            "Random word: {} ({})",
            word.headword.bold().cyan(),
            word.pos.italic()
        ),
        None => eprintln!("{}", "The lexicon has no lemmas.".red()),
    }
    Ok(())
}
