//! The on-disk book corpus.
//!
//! The crawler (not part of this crate) drops books into a directory as
//! `<digits>_<sanitized-title>.txt`, UTF-8 encoded. The digits before the
//! first underscore are the Gutenberg book id; the rest, minus the `.txt`
//! suffix, is the display title. Files that do not follow the naming scheme
//! are skipped with a warning rather than failing the walk.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::warn;

/// One book file discovered in the corpus directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookFile {
    pub id: String,
    pub title: String,
    pub path: PathBuf,
}

impl BookFile {
    /// Read the full text. Callers decide whether a failure skips the book
    /// (index build) or aborts.
    pub fn read(&self) -> io::Result<String> {
        fs::read_to_string(&self.path)
    }
}

/// Split a corpus file name into `(book_id, title)`.
///
/// Returns `None` unless the name is `<digits>_<title>.txt` with a non-empty
/// all-digit id. Titles may themselves contain underscores (sanitization
/// maps forbidden characters to `_`), so only the first underscore splits.
pub fn parse_book_filename(name: &str) -> Option<(String, String)> {
    let stem = name.strip_suffix(".txt")?;
    let (id, title) = stem.split_once('_')?;
    if id.is_empty() || !id.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some((id.to_string(), title.to_string()))
}

/// List the book files in a corpus directory, sorted by book id.
///
/// Non-`.txt` entries are ignored silently; `.txt` files with malformed
/// names are skipped with a warning.
pub fn scan_corpus(dir: &Path) -> io::Result<Vec<BookFile>> {
    let mut books = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if !name.ends_with(".txt") {
            continue;
        }
        match parse_book_filename(name) {
            Some((id, title)) => books.push(BookFile { id, title, path }),
            None => warn!(file = name, "skipping corpus file with malformed name"),
        }
    }
    books.sort_by(|a, b| a.id.cmp(&b.id));
    Ok(books)
}

/// Book id → title for every well-named file in the corpus.
pub fn book_info(dir: &Path) -> io::Result<HashMap<String, String>> {
    Ok(scan_corpus(dir)?
        .into_iter()
        .map(|book| (book.id, book.title))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;

    #[test]
    fn test_parse_well_formed_name() {
        assert_eq!(
            parse_book_filename("11_Alice's Adventures in Wonderland.txt"),
            Some(("11".to_string(), "Alice's Adventures in Wonderland".to_string()))
        );
    }

    #[test]
    fn test_title_keeps_later_underscores() {
        assert_eq!(
            parse_book_filename("84_Frankenstein_ Or The Modern Prometheus.txt"),
            Some(("84".to_string(), "Frankenstein_ Or The Modern Prometheus".to_string()))
        );
    }

    #[test]
    fn test_rejects_malformed_names() {
        assert_eq!(parse_book_filename("notes.txt"), None);
        assert_eq!(parse_book_filename("abc_Title.txt"), None);
        assert_eq!(parse_book_filename("_Title.txt"), None);
        assert_eq!(parse_book_filename("12_Title.pdf"), None);
        assert_eq!(parse_book_filename("12x_Title.txt"), None);
    }

    #[test]
    fn test_scan_corpus_sorts_and_skips() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["84_Frankenstein.txt", "11_Alice.txt", "README.md", "junk.txt"] {
            let mut f = File::create(dir.path().join(name)).unwrap();
            writeln!(f, "content").unwrap();
        }

        let books = scan_corpus(dir.path()).unwrap();
        let ids: Vec<&str> = books.iter().map(|b| b.id.as_str()).collect();
        assert_eq!(ids, vec!["11", "84"]);
        assert_eq!(books[0].title, "Alice");
    }

    #[test]
    fn test_book_info_maps_id_to_title() {
        let dir = tempfile::tempdir().unwrap();
        File::create(dir.path().join("2701_Moby Dick.txt")).unwrap();
        let info = book_info(dir.path()).unwrap();
        assert_eq!(info["2701"], "Moby Dick");
    }

    #[test]
    fn test_read_book_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("11_Alice.txt");
        fs::write(&path, "Down the rabbit hole").unwrap();
        let books = scan_corpus(dir.path()).unwrap();
        assert_eq!(books[0].read().unwrap(), "Down the rabbit hole");
    }
}
