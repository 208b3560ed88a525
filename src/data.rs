//! Reading lexicon files from disk.
//!
//! Files ending in `.gz` are decompressed while reading.

use crate::error::Result;
use crate::lexicon::{Lexicon, LoadOptions};
use flate2::read::GzDecoder;
use log::info;
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

/// Line layout of a lexicon file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputFormat {
    /// `_____`-separated headword blocks of `key: value` lines.
    #[default]
    Blocks,
    /// One `word {pos} [note] | syn :: definition` record per line.
    Records,
}

fn open_reader(path: &Path) -> Result<Box<dyn BufRead>> {
    let file = File::open(path)?;
    let is_gz = path.extension().is_some_and(|ext| ext == "gz");
    let reader: Box<dyn Read> = if is_gz {
        info!("Reading gzipped lexicon {:?}", path);
        Box::new(GzDecoder::new(file))
    } else {
        info!("Reading lexicon {:?}", path);
        Box::new(file)
    };
    Ok(Box::new(BufReader::new(reader)))
}

/// Reads every line of a UTF-8 lexicon file.
pub fn read_lines(path: &Path) -> Result<Vec<String>> {
    let lines = open_reader(path)?.lines().collect::<std::io::Result<Vec<_>>>()?;
    info!("Read {} lines from {:?}", lines.len(), path);
    Ok(lines)
}

/// Reads and groups a lexicon file.
pub fn load_lexicon(path: &Path, format: InputFormat, options: LoadOptions) -> Result<Lexicon> {
    let lines = read_lines(path)?;
    match format {
        InputFormat::Blocks => Lexicon::from_lines(lines, options),
        InputFormat::Records => Lexicon::from_records(lines, options),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::io::{BufWriter, Write};
    use tempfile::tempdir;

    const CONTENT: &str = "_____\ngato\npos: n\n  gloss: cat\n";

    // Helper to create a gz file for testing decompression
    fn create_gz(path: &Path, content: &str) -> std::io::Result<()> {
        use flate2::Compression;
        use flate2::write::GzEncoder;

        let file = File::create(path)?;
        let mut encoder = GzEncoder::new(BufWriter::new(file), Compression::default());
        encoder.write_all(content.as_bytes())?;
        encoder.finish()?;
        Ok(())
    }

    #[test]
    fn test_read_plain_and_gz() {
        let _ = env_logger::builder().is_test(true).try_init();
        let temp_dir = tempdir().expect("Failed to create temp dir");

        let plain = temp_dir.path().join("es.txt");
        fs::write(&plain, CONTENT).unwrap();
        let gz = temp_dir.path().join("es.txt.gz");
        create_gz(&gz, CONTENT).expect("Failed to create gz");

        let plain_lines = read_lines(&plain).unwrap();
        assert_eq!(plain_lines.len(), 4);
        assert_eq!(read_lines(&gz).unwrap(), plain_lines);
    }

    #[test]
    fn test_load_lexicon_formats() {
        let temp_dir = tempdir().expect("Failed to create temp dir");
        let blocks = temp_dir.path().join("blocks.txt");
        fs::write(&blocks, CONTENT).unwrap();
        let lex = load_lexicon(&blocks, InputFormat::Blocks, LoadOptions::default()).unwrap();
        assert!(lex.has_lemma("gato", "n").unwrap());

        let records = temp_dir.path().join("records.txt");
        fs::write(&records, "gato {n} :: cat\n").unwrap();
        let lex = load_lexicon(&records, InputFormat::Records, LoadOptions::default()).unwrap();
        assert!(lex.has_lemma("gato", "n").unwrap());
    }

    #[test]
    fn test_missing_file() {
        let err = read_lines(Path::new("/nonexistent/lexicon.txt")).unwrap_err();
        assert!(matches!(err, crate::error::WordlistError::Io(_)));
    }
}
