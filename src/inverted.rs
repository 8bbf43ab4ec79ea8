//! Inverted index construction.
//!
//! The builder accumulates `term → book → count` wholly in memory, then emits
//! physical records to an [`IndexStore`]. Terms present in more than
//! `max_postings_per_record` books are split into several records whose
//! chunks partition the postings; everything else is one record at part 0.
//!
//! # INVARIANTS (DO NOT VIOLATE)
//!
//! 1. **COUNT_POSITIVE**: every emitted count is ≥ 1
//! 2. **CHUNKS_DISJOINT**: a book id appears in exactly one chunk of a term
//! 3. **CHUNKS_COVER**: the union of a term's chunks is its full postings
//! 4. **NO_LENGTH_FILTER**: single-letter terms are indexed like any other

use std::collections::HashMap;

use crate::store::{IndexStore, StoreError};
use crate::tokenize;
use crate::types::{IndexRecord, Postings};

/// In-memory `term → postings` accumulator.
#[derive(Debug, Default)]
pub struct InvertedIndex {
    terms: HashMap<String, Postings>,
    books_indexed: usize,
}

impl InvertedIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn term_count(&self) -> usize {
        self.terms.len()
    }

    pub fn books_indexed(&self) -> usize {
        self.books_indexed
    }

    pub fn get(&self, term: &str) -> Option<&Postings> {
        self.terms.get(term)
    }

    pub fn terms(&self) -> impl Iterator<Item = (&str, &Postings)> {
        self.terms.iter().map(|(t, p)| (t.as_str(), p))
    }

    /// Tokenize one book and fold its counts in.
    pub fn add_book(&mut self, book_id: &str, content: &str) {
        for (term, count) in count_terms(content) {
            *self
                .terms
                .entry(term)
                .or_default()
                .entry(book_id.to_string())
                .or_insert(0) += count;
        }
        self.books_indexed += 1;
    }

    /// Fold a precomputed per-book count map in (the map step of a parallel
    /// build produces these).
    pub fn absorb_counts(&mut self, book_id: &str, counts: HashMap<String, u64>) {
        for (term, count) in counts {
            *self
                .terms
                .entry(term)
                .or_default()
                .entry(book_id.to_string())
                .or_insert(0) += count;
        }
        self.books_indexed += 1;
    }

    /// Fold another accumulator in (the reduce step of a parallel build).
    pub fn merge(&mut self, other: InvertedIndex) {
        for (term, postings) in other.terms {
            let entry = self.terms.entry(term).or_default();
            for (book_id, count) in postings {
                *entry.entry(book_id).or_insert(0) += count;
            }
        }
        self.books_indexed += other.books_indexed;
    }

    /// Flatten into physical records, splitting large postings.
    ///
    /// Chunk membership comes from the *sorted* book-id order, so the same
    /// corpus always produces the same records regardless of accumulation
    /// order.
    pub fn into_records(self, max_postings_per_record: usize) -> Vec<IndexRecord> {
        let mut records = Vec::with_capacity(self.terms.len());
        for (term, postings) in self.terms {
            if postings.len() <= max_postings_per_record {
                records.push(IndexRecord {
                    term,
                    part: 0,
                    books: postings,
                });
                continue;
            }

            let mut entries: Vec<(String, u64)> = postings.into_iter().collect();
            entries.sort_by(|a, b| a.0.cmp(&b.0));
            for (part, chunk) in entries.chunks(max_postings_per_record).enumerate() {
                records.push(IndexRecord {
                    term: term.clone(),
                    part: part as u32,
                    books: chunk.iter().cloned().collect(),
                });
            }
        }
        records
    }

    /// Emit all records to a store. Any store failure aborts the emission.
    pub fn emit<S: IndexStore>(
        self,
        store: &mut S,
        max_postings_per_record: usize,
    ) -> Result<EmitStats, StoreError> {
        let mut stats = EmitStats::default();
        for record in self.into_records(max_postings_per_record) {
            if record.part == 1 {
                // Seen exactly once per split term.
                stats.split_terms.push(record.term.clone());
            }
            stats.records_written += 1;
            store.put_record(record)?;
        }
        stats.split_terms.sort();
        Ok(stats)
    }
}

/// What `emit` wrote, for build summaries.
#[derive(Debug, Default)]
pub struct EmitStats {
    pub records_written: usize,
    pub split_terms: Vec<String>,
}

/// Occurrence counts of every term in one text.
pub fn count_terms(content: &str) -> HashMap<String, u64> {
    let lowered = content.to_lowercase();
    let mut counts: HashMap<String, u64> = HashMap::new();
    for token in tokenize::tokens(&lowered) {
        if let Some(count) = counts.get_mut(token) {
            *count += 1;
        } else {
            counts.insert(token.to_string(), 1);
        }
    }
    counts
}

/// Build the full index from an iterable of `(book_id, content)`.
pub fn build_inverted_index<I>(books: I) -> InvertedIndex
where
    I: IntoIterator<Item = (String, String)>,
{
    let mut index = InvertedIndex::new();
    for (book_id, content) in books {
        index.add_book(&book_id, &content);
    }
    index
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryIndexStore;

    fn two_book_index() -> InvertedIndex {
        build_inverted_index([
            ("11".to_string(), "Alice saw the White Rabbit. Alice ran.".to_string()),
            ("84".to_string(), "The monster saw the ice.".to_string()),
        ])
    }

    #[test]
    fn test_counts_per_book() {
        let index = two_book_index();
        let alice = index.get("alice").unwrap();
        assert_eq!(alice["11"], 2);
        assert!(!alice.contains_key("84"));

        let the = index.get("the").unwrap();
        assert_eq!(the["11"], 1);
        assert_eq!(the["84"], 2);
    }

    #[test]
    fn test_no_minimum_term_length() {
        let index = build_inverted_index([("1".to_string(), "a b a".to_string())]);
        assert_eq!(index.get("a").unwrap()["1"], 2);
        assert_eq!(index.get("b").unwrap()["1"], 1);
    }

    #[test]
    fn test_merge_matches_sequential_build() {
        let mut left = InvertedIndex::new();
        left.add_book("11", "alice alice rabbit");
        let mut right = InvertedIndex::new();
        right.add_book("84", "alice monster");

        let mut merged = InvertedIndex::new();
        merged.merge(left);
        merged.merge(right);

        let sequential = build_inverted_index([
            ("11".to_string(), "alice alice rabbit".to_string()),
            ("84".to_string(), "alice monster".to_string()),
        ]);

        assert_eq!(merged.books_indexed(), sequential.books_indexed());
        assert_eq!(merged.term_count(), sequential.term_count());
        for (term, postings) in sequential.terms() {
            assert_eq!(merged.get(term), Some(postings));
        }
    }

    #[test]
    fn test_small_term_is_one_record() {
        let records = two_book_index().into_records(500);
        let the: Vec<&IndexRecord> = records.iter().filter(|r| r.term == "the").collect();
        assert_eq!(the.len(), 1);
        assert_eq!(the[0].part, 0);
    }

    #[test]
    fn test_split_chunks_partition_postings() {
        let mut index = InvertedIndex::new();
        for book in 0..7 {
            index.add_book(&book.to_string(), "common");
        }
        let records = index.into_records(3);

        assert_eq!(records.len(), 3); // 3 + 3 + 1
        let mut parts: Vec<u32> = records.iter().map(|r| r.part).collect();
        parts.sort_unstable();
        assert_eq!(parts, vec![0, 1, 2]);

        let mut seen: Vec<String> = records
            .iter()
            .flat_map(|r| r.books.keys().cloned())
            .collect();
        seen.sort();
        let expected: Vec<String> = (0..7).map(|b| b.to_string()).collect();
        assert_eq!(seen, expected); // disjoint and covering

        let full: Vec<&IndexRecord> = records.iter().filter(|r| r.part < 2).collect();
        assert!(full.iter().all(|r| r.books.len() == 3));
    }

    #[test]
    fn test_emit_reports_split_terms() {
        let mut index = InvertedIndex::new();
        for book in 0..5 {
            index.add_book(&book.to_string(), "everywhere rare");
        }
        let mut store = MemoryIndexStore::new();
        let stats = index.emit(&mut store, 4).unwrap();

        assert_eq!(stats.split_terms, vec!["everywhere".to_string(), "rare".to_string()]);
        assert_eq!(stats.records_written, 4);
        assert_eq!(store.get_term("everywhere").unwrap().len(), 5);
    }

    #[test]
    fn test_accented_terms_survive() {
        let index = build_inverted_index([("5".to_string(), "Ça commençait déjà".to_string())]);
        assert!(index.get("ça").is_some());
        assert!(index.get("déjà").is_some());
    }
}
