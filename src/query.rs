//! The query pipeline: keyword search, regex search, ranking, suggestions.
//!
//! A request carries at most one keyword and one regex; each runs as an
//! independent path and failures stay confined to their path. The keyword
//! path tries an exact index lookup first and widens to a KMP substring scan
//! over the whole term space only when the exact postings look thin. The
//! regex path always scans, matching the compiled DFA against every term.
//!
//! ```text
//! keyword ─▶ get_term ──┬─ enough hits ──────────────▶ postings ─┐
//!                       └─ scan_all + KMP substring ─▶ postings ─┤
//!                                                                ├─▶ rank ─▶ top-K ─▶ suggestions
//! regex ──▶ compile ─▶ scan_all + DFA partial match ─▶ postings ─┘
//! ```
//!
//! Ranking is by occurrence count or by closeness centrality; ties always
//! break the same way (count desc, then book id asc) so a query is
//! deterministic for a given store.

use std::collections::HashMap;

use tracing::{debug, warn};

use crate::context::SearchContext;
use crate::kmp::KmpPattern;
use crate::regex;
use crate::store::{IndexStore, StoreError};
use crate::types::{
    Postings, QueryRequest, QueryResponse, Ranking, RankingMethod, SearchHit, Suggestion, Tuning,
};

/// Executes queries against an index store and a loaded context.
pub struct Searcher<'a, S: IndexStore> {
    store: &'a S,
    context: &'a SearchContext,
    tuning: Tuning,
}

impl<'a, S: IndexStore> Searcher<'a, S> {
    pub fn new(store: &'a S, context: &'a SearchContext) -> Self {
        Self::with_tuning(store, context, Tuning::default())
    }

    pub fn with_tuning(store: &'a S, context: &'a SearchContext, tuning: Tuning) -> Self {
        Self {
            store,
            context,
            tuning,
        }
    }

    /// Run the full pipeline for one request.
    pub fn query(&self, request: &QueryRequest) -> QueryResponse {
        let ranking = self.effective_ranking(request.ranking);

        let results_keyword = match request.keyword.as_deref().map(str::trim) {
            Some(keyword) if !keyword.is_empty() => match self.keyword_postings(keyword) {
                Ok(postings) => self.rank(postings, ranking),
                Err(e) => {
                    warn!(error = %e, keyword, "keyword path failed; returning no results");
                    Vec::new()
                }
            },
            _ => Vec::new(),
        };

        let results_regex = match request.regex.as_deref().map(str::trim) {
            Some(pattern) if !pattern.is_empty() => self.rank(self.regex_postings(pattern), ranking),
            _ => Vec::new(),
        };

        let seeds = if results_keyword.is_empty() {
            &results_regex
        } else {
            &results_keyword
        };
        let suggestions = self.suggestions(seeds);

        QueryResponse {
            results_keyword,
            results_regex,
            suggestions,
        }
    }

    /// Closeness ranking needs scores; without them the query silently runs
    /// as an occurrence query.
    fn effective_ranking(&self, requested: RankingMethod) -> RankingMethod {
        match requested {
            RankingMethod::Closeness if !self.context.has_scores() => {
                debug!("no closeness scores loaded; ranking by occurrence");
                RankingMethod::Occurrence
            }
            other => other,
        }
    }

    /// Keyword path: exact lookup, then KMP fallback when the exact postings
    /// are thinner than the tuning floor.
    fn keyword_postings(&self, keyword: &str) -> Result<Postings, StoreError> {
        let keyword = keyword.to_lowercase();
        let exact = self.store.get_term(&keyword)?;
        if exact.len() >= self.tuning.exact_hit_floor {
            return Ok(exact);
        }

        // The exact term contains itself as a substring, so its postings are
        // folded back in by the scan; no need to seed the accumulator.
        let pattern = KmpPattern::new(&keyword);
        let mut accumulated = Postings::new();
        for record in self.store.scan_all()? {
            let record = record?;
            if pattern.matches(&record.term) {
                for (book_id, count) in record.books {
                    *accumulated.entry(book_id).or_insert(0) += count;
                }
            }
        }
        Ok(accumulated)
    }

    /// Regex path: an invalid pattern or a store failure yields no postings.
    ///
    /// Chunks of one split term hold disjoint book ids, so summing per
    /// record never counts a `(term, book)` pair twice.
    fn regex_postings(&self, pattern: &str) -> Postings {
        let dfa = match regex::compile(pattern) {
            Ok(dfa) => dfa,
            Err(e) => {
                debug!(pattern, error = %e, "invalid search regex");
                return Postings::new();
            }
        };

        let scan = match self.store.scan_all() {
            Ok(scan) => scan,
            Err(e) => {
                warn!(error = %e, "regex path failed to scan index");
                return Postings::new();
            }
        };

        let mut accumulated = Postings::new();
        for record in scan {
            let record = match record {
                Ok(record) => record,
                Err(e) => {
                    warn!(error = %e, "regex path aborted mid-scan");
                    return Postings::new();
                }
            };
            if dfa.matches_partial(&record.term) {
                for (book_id, count) in record.books {
                    *accumulated.entry(book_id).or_insert(0) += count;
                }
            }
        }
        accumulated
    }

    /// Materialize and order postings under the given ranking method.
    fn rank(&self, postings: Postings, method: RankingMethod) -> Vec<SearchHit> {
        let mut hits: Vec<SearchHit> = postings
            .into_iter()
            .map(|(id, count)| {
                let ranking = match method {
                    RankingMethod::Occurrence => Ranking::Occurrence { count },
                    RankingMethod::Closeness => Ranking::Closeness {
                        count,
                        score: self.context.closeness(&id),
                    },
                };
                SearchHit {
                    title: self.context.title_for(&id),
                    id,
                    ranking,
                }
            })
            .collect();

        match method {
            RankingMethod::Occurrence => hits.sort_by(|a, b| {
                b.count()
                    .cmp(&a.count())
                    .then_with(|| a.id.cmp(&b.id))
            }),
            RankingMethod::Closeness => hits.sort_by(|a, b| {
                let score_a = a.ranking.centrality().unwrap_or(0.0);
                let score_b = b.ranking.centrality().unwrap_or(0.0);
                score_b
                    .partial_cmp(&score_a)
                    .unwrap_or(std::cmp::Ordering::Equal)
                    .then_with(|| b.count().cmp(&a.count()))
                    .then_with(|| a.id.cmp(&b.id))
            }),
        }
        hits
    }

    /// Expand the top-ranked results through the graph's neighbor relation.
    ///
    /// The seed books themselves are excluded; a book suggested by several
    /// seeds keeps its best weight.
    fn suggestions(&self, ranked: &[SearchHit]) -> Vec<Suggestion> {
        let seeds: Vec<&str> = ranked
            .iter()
            .take(self.tuning.suggestion_seeds)
            .map(|hit| hit.id.as_str())
            .collect();

        let mut best: HashMap<&str, f64> = HashMap::new();
        for seed in &seeds {
            let Some(neighbors) = self.context.graph().neighbors(seed) else {
                continue;
            };
            for (neighbor, &weight) in neighbors {
                if seeds.contains(&neighbor.as_str()) {
                    continue;
                }
                let entry = best.entry(neighbor.as_str()).or_insert(weight);
                if weight > *entry {
                    *entry = weight;
                }
            }
        }

        let mut suggestions: Vec<Suggestion> = best
            .into_iter()
            .map(|(id, similarity)| Suggestion {
                id: id.to_string(),
                title: self.context.title_for(id),
                similarity,
            })
            .collect();
        suggestions.sort_by(|a, b| {
            b.similarity
                .partial_cmp(&a.similarity)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.id.cmp(&b.id))
        });
        suggestions.truncate(self.tuning.max_suggestions);
        suggestions
    }
}
