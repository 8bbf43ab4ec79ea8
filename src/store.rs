// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Index, graph, and score persistence.
//!
//! The query pipeline is written against the [`IndexStore`] trait, which
//! models the backing store as a bag of `(term, part)` records: puts are
//! idempotent by that key, `get_term` reassembles a split term's chunks, and
//! `scan_all` streams every live record in no particular order. Two
//! implementations are provided:
//!
//! - [`MemoryIndexStore`] — a BTreeMap; used by tests and throwaway builds.
//! - [`JsonlIndexStore`] — one JSON record per line in `books_index.jsonl`.
//!   Appends win over earlier lines with the same key, so a rebuild that
//!   rewrites a record supersedes the old one without rewriting the file;
//!   `clear` truncates. A key → byte-offset map is rebuilt on open, and
//!   reads seek straight to the live line.
//!
//! The similarity graph and the closeness scores are small enough to load
//! whole at startup, so they get plain JSONL files (`jaccard_graph.jsonl`,
//! `book_scores.jsonl`) of one record per book.

use std::collections::{BTreeMap, HashMap};
use std::error::Error;
use std::fmt;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use crate::graph::SimilarityGraph;
use crate::types::{GraphRecord, IndexRecord, Postings, ScoreRecord};

/// File names inside a store directory.
pub const BOOKS_INDEX_FILE: &str = "books_index.jsonl";
pub const GRAPH_FILE: &str = "jaccard_graph.jsonl";
pub const SCORES_FILE: &str = "book_scores.jsonl";

/// Store failures. Everything here is an I/O-class problem; the query
/// pipeline maps these to an empty result list for the affected path.
#[derive(Debug)]
pub enum StoreError {
    Io(std::io::Error),
    /// A record line that does not parse back. Carries the file position so
    /// the offending line can be found with `sed -n`.
    Corrupt {
        offset: u64,
        source: serde_json::Error,
    },
    Json(serde_json::Error),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Io(e) => write!(f, "store I/O error: {}", e),
            StoreError::Corrupt { offset, source } => {
                write!(f, "corrupt record at byte {}: {}", offset, source)
            }
            StoreError::Json(e) => write!(f, "record serialization error: {}", e),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            StoreError::Io(e) => Some(e),
            StoreError::Corrupt { source, .. } => Some(source),
            StoreError::Json(e) => Some(e),
        }
    }
}

impl From<std::io::Error> for StoreError {
    fn from(e: std::io::Error) -> Self {
        StoreError::Io(e)
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self {
        StoreError::Json(e)
    }
}

/// Lazy stream of index records, in unspecified order. Consumers must
/// tolerate several records per term and merge chunks themselves.
pub type RecordScan<'a> = Box<dyn Iterator<Item = Result<IndexRecord, StoreError>> + 'a>;

/// The abstract index store of the search engine.
pub trait IndexStore {
    /// Insert or replace the record identified by `(term, part)`.
    fn put_record(&mut self, record: IndexRecord) -> Result<(), StoreError>;

    /// The union of all chunks for `term`; empty for an unknown term.
    fn get_term(&self, term: &str) -> Result<Postings, StoreError>;

    /// Stream every live record.
    fn scan_all(&self) -> Result<RecordScan<'_>, StoreError>;

    /// Remove all records.
    fn clear(&mut self) -> Result<(), StoreError>;
}

// =============================================================================
// IN-MEMORY STORE
// =============================================================================

/// BTreeMap-backed store. Scans come out key-ordered, which the consumers
/// must not (and do not) rely on.
#[derive(Debug, Default)]
pub struct MemoryIndexStore {
    records: BTreeMap<(String, u32), Postings>,
}

impl MemoryIndexStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_count(&self) -> usize {
        self.records.len()
    }
}

impl IndexStore for MemoryIndexStore {
    fn put_record(&mut self, record: IndexRecord) -> Result<(), StoreError> {
        self.records
            .insert((record.term, record.part), record.books);
        Ok(())
    }

    fn get_term(&self, term: &str) -> Result<Postings, StoreError> {
        let mut merged = Postings::new();
        let from = (term.to_string(), 0u32);
        let to = (term.to_string(), u32::MAX);
        for (_, chunk) in self.records.range(from..=to) {
            for (book_id, count) in chunk {
                merged.insert(book_id.clone(), *count);
            }
        }
        Ok(merged)
    }

    fn scan_all(&self) -> Result<RecordScan<'_>, StoreError> {
        Ok(Box::new(self.records.iter().map(
            |((term, part), books)| {
                Ok(IndexRecord {
                    term: term.clone(),
                    part: *part,
                    books: books.clone(),
                })
            },
        )))
    }

    fn clear(&mut self) -> Result<(), StoreError> {
        self.records.clear();
        Ok(())
    }
}

// =============================================================================
// JSONL-BACKED STORE
// =============================================================================

/// File-backed store: one JSON record per line, append-only between clears.
pub struct JsonlIndexStore {
    path: PathBuf,
    appender: File,
    end: u64,
    /// term → part → byte offset of the live line.
    offsets: HashMap<String, BTreeMap<u32, u64>>,
}

impl JsonlIndexStore {
    /// Open (creating if needed) the index file inside a store directory.
    pub fn open_dir(dir: &Path) -> Result<Self, StoreError> {
        std::fs::create_dir_all(dir)?;
        Self::open(dir.join(BOOKS_INDEX_FILE))
    }

    /// Open a store file, scanning existing lines to rebuild the offset map.
    /// For duplicate `(term, part)` keys the later line wins.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let appender = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)?;

        let mut offsets: HashMap<String, BTreeMap<u32, u64>> = HashMap::new();
        let mut reader = BufReader::new(File::open(&path)?);
        let mut line = String::new();
        let mut offset = 0u64;
        loop {
            line.clear();
            let read = reader.read_line(&mut line)?;
            if read == 0 {
                break;
            }
            if !line.trim().is_empty() {
                let record: IndexRecord = serde_json::from_str(&line)
                    .map_err(|source| StoreError::Corrupt { offset, source })?;
                offsets
                    .entry(record.term)
                    .or_default()
                    .insert(record.part, offset);
            }
            offset += read as u64;
        }

        Ok(Self {
            path,
            appender,
            end: offset,
            offsets,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of live records.
    pub fn record_count(&self) -> usize {
        self.offsets.values().map(BTreeMap::len).sum()
    }

    /// Number of distinct terms.
    pub fn term_count(&self) -> usize {
        self.offsets.len()
    }

    /// Terms stored in more than one part, with their part counts.
    pub fn split_terms(&self) -> Vec<(String, usize)> {
        let mut split: Vec<(String, usize)> = self
            .offsets
            .iter()
            .filter(|(_, parts)| parts.len() > 1)
            .map(|(term, parts)| (term.clone(), parts.len()))
            .collect();
        split.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        split
    }

    fn read_record_at(reader: &mut BufReader<File>, offset: u64) -> Result<IndexRecord, StoreError> {
        reader.seek(SeekFrom::Start(offset))?;
        let mut line = String::new();
        reader.read_line(&mut line)?;
        serde_json::from_str(&line).map_err(|source| StoreError::Corrupt { offset, source })
    }
}

impl IndexStore for JsonlIndexStore {
    fn put_record(&mut self, record: IndexRecord) -> Result<(), StoreError> {
        let mut line = serde_json::to_string(&record)?;
        line.push('\n');
        self.appender.write_all(line.as_bytes())?;
        self.offsets
            .entry(record.term)
            .or_default()
            .insert(record.part, self.end);
        self.end += line.len() as u64;
        Ok(())
    }

    fn get_term(&self, term: &str) -> Result<Postings, StoreError> {
        let Some(parts) = self.offsets.get(term) else {
            return Ok(Postings::new());
        };
        let mut reader = BufReader::new(File::open(&self.path)?);
        let mut merged = Postings::new();
        for &offset in parts.values() {
            let record = Self::read_record_at(&mut reader, offset)?;
            merged.extend(record.books);
        }
        Ok(merged)
    }

    fn scan_all(&self) -> Result<RecordScan<'_>, StoreError> {
        // Snapshot live offsets sorted by file position so the scan reads
        // forward through the file.
        let mut live: Vec<u64> = self
            .offsets
            .values()
            .flat_map(|parts| parts.values().copied())
            .collect();
        live.sort_unstable();

        let mut reader = BufReader::new(File::open(&self.path)?);
        Ok(Box::new(live.into_iter().map(move |offset| {
            Self::read_record_at(&mut reader, offset)
        })))
    }

    fn clear(&mut self) -> Result<(), StoreError> {
        self.appender.set_len(0)?;
        self.end = 0;
        self.offsets.clear();
        Ok(())
    }
}

// =============================================================================
// GRAPH AND SCORE FILES
// =============================================================================

/// Persist the similarity graph, one record per book, sorted by id.
pub fn save_graph(dir: &Path, graph: &SimilarityGraph) -> Result<(), StoreError> {
    std::fs::create_dir_all(dir)?;
    write_jsonl(&dir.join(GRAPH_FILE), &graph.to_records())
}

/// Load the similarity graph saved by [`save_graph`].
pub fn load_graph(dir: &Path) -> Result<SimilarityGraph, StoreError> {
    let records: Vec<GraphRecord> = read_jsonl(&dir.join(GRAPH_FILE))?;
    Ok(SimilarityGraph::from_records(records))
}

/// Persist closeness scores, one record per book, sorted by id.
pub fn save_scores(dir: &Path, scores: &HashMap<String, f64>) -> Result<(), StoreError> {
    std::fs::create_dir_all(dir)?;
    let mut records: Vec<ScoreRecord> = scores
        .iter()
        .map(|(book_id, &closeness)| ScoreRecord {
            book_id: book_id.clone(),
            closeness,
        })
        .collect();
    records.sort_by(|a, b| a.book_id.cmp(&b.book_id));
    write_jsonl(&dir.join(SCORES_FILE), &records)
}

/// Load the closeness scores saved by [`save_scores`].
pub fn load_scores(dir: &Path) -> Result<HashMap<String, f64>, StoreError> {
    let records: Vec<ScoreRecord> = read_jsonl(&dir.join(SCORES_FILE))?;
    Ok(records
        .into_iter()
        .map(|r| (r.book_id, r.closeness))
        .collect())
}

fn write_jsonl<T: serde::Serialize>(path: &Path, records: &[T]) -> Result<(), StoreError> {
    let mut writer = BufWriter::new(File::create(path)?);
    for record in records {
        serde_json::to_writer(&mut writer, record)?;
        writer.write_all(b"\n")?;
    }
    writer.flush()?;
    Ok(())
}

fn read_jsonl<T: serde::de::DeserializeOwned>(path: &Path) -> Result<Vec<T>, StoreError> {
    let mut reader = BufReader::new(File::open(path)?);
    let mut records = Vec::new();
    let mut line = String::new();
    let mut offset = 0u64;
    loop {
        line.clear();
        let read = reader.read_line(&mut line)?;
        if read == 0 {
            break;
        }
        if !line.trim().is_empty() {
            let record =
                serde_json::from_str(&line).map_err(|source| StoreError::Corrupt { offset, source })?;
            records.push(record);
        }
        offset += read as u64;
    }
    Ok(records)
}
