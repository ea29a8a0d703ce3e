use std::fs;
use std::path::Path;
use tracing::{debug, warn};

use crate::FsrError;

/// Raw pairs read from a replacement-pairs file, in file order.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PairsFile {
    pub pairs: Vec<(String, String)>,
    pub skipped: Vec<SkippedLine>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedLine {
    pub line_number: usize,
    pub content: String,
}

/// Parses `search,replacement` lines. Lines without exactly one comma, or with an
/// empty search term, are skipped with a warning. Blank lines are ignored.
pub fn parse_pairs(text: &str) -> PairsFile {
    let mut parsed = PairsFile::default();

    for (index, line) in text.lines().enumerate() {
        let line_number = index + 1;

        if line.trim().is_empty() {
            debug!("Ignoring blank line {} in replacement pairs", line_number);
            continue;
        }

        let fields: Vec<&str> = line.split(',').collect();
        match fields.as_slice() {
            [search, replacement] if !search.is_empty() => {
                parsed.pairs.push((search.to_string(), replacement.to_string()));
            }
            _ => {
                warn!(
                    "Skipping invalid line {} in replacement pairs, expected 'word_to_replace,new_word': {}",
                    line_number, line
                );
                parsed.skipped.push(SkippedLine {
                    line_number,
                    content: line.to_string(),
                });
            }
        }
    }

    parsed
}

pub fn load_pairs_file(path: &Path) -> Result<PairsFile, FsrError> {
    debug!("Reading replacement pairs from: {:?}", path);

    let text = fs::read_to_string(path).map_err(|source| FsrError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    Ok(parse_pairs(&text))
}
