// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Folio CLI: build, inspect, and query a Gutenberg search store.
//!
//! ```bash
//! # Build the inverted index from a corpus directory
//! folio index --corpus ./gutendex_books --store ./store
//!
//! # Build the similarity graph and closeness scores
//! folio graph --corpus ./gutendex_books --store ./store
//!
//! # Query: keyword and/or regex, ranked by occurrence or closeness
//! folio search --store ./store --corpus ./gutendex_books \
//!     --keyword alice --regex "al.*e" --ranking closeness
//! ```
//!
//! Diagnostics go through `tracing`; set `FOLIO_LOG=debug` to see why a
//! path returned nothing.

use clap::Parser;
use tracing_subscriber::EnvFilter;

use std::path::Path;

use folio::{
    run_graph_build, run_index_build, JsonlIndexStore, QueryRequest, QueryResponse, SearchContext,
    SearchHit, Searcher, Tuning,
};

mod cli;
use cli::{Cli, Commands};

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env("FOLIO_LOG").unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Index { corpus, store } => {
            if let Err(e) = build_index(Path::new(&corpus), Path::new(&store)) {
                eprintln!("❌ {}", e);
                std::process::exit(1);
            }
        }
        Commands::Graph { corpus, store } => {
            if let Err(e) = build_graph(Path::new(&corpus), Path::new(&store)) {
                eprintln!("❌ {}", e);
                std::process::exit(1);
            }
        }
        Commands::Search {
            store,
            corpus,
            keyword,
            regex,
            ranking,
            json,
            limit,
        } => {
            let request = QueryRequest {
                keyword,
                regex,
                ranking,
            };
            if let Err(e) = search(Path::new(&store), corpus.as_deref().map(Path::new), &request, json, limit)
            {
                eprintln!("❌ {}", e);
                std::process::exit(1);
            }
        }
        Commands::Inspect { store } => {
            if let Err(e) = inspect(Path::new(&store)) {
                eprintln!("❌ {}", e);
                std::process::exit(1);
            }
        }
    }
}

fn build_index(corpus: &Path, store_dir: &Path) -> Result<(), String> {
    let mut store =
        JsonlIndexStore::open_dir(store_dir).map_err(|e| format!("failed to open store: {}", e))?;
    let stats = run_index_build(corpus, &mut store, &Tuning::default())?;

    eprintln!();
    eprintln!("✅ Index build complete");
    eprintln!(
        "   {} books │ {} skipped │ {} terms │ {} records",
        stats.books_indexed, stats.books_skipped, stats.terms, stats.records_written
    );
    if !stats.split_terms.is_empty() {
        eprintln!(
            "   {} terms split across multiple records (most frequent first):",
            stats.split_terms.len()
        );
        for term in stats.split_terms.iter().take(10) {
            eprintln!("     • {}", term);
        }
    }
    Ok(())
}

fn build_graph(corpus: &Path, store_dir: &Path) -> Result<(), String> {
    let stats = run_graph_build(corpus, store_dir, &Tuning::default())?;

    eprintln!();
    eprintln!("✅ Graph build complete");
    eprintln!(
        "   {} nodes │ {} edges │ {} isolated books",
        stats.nodes, stats.edges, stats.isolated
    );
    Ok(())
}

fn search(
    store_dir: &Path,
    corpus: Option<&Path>,
    request: &QueryRequest,
    json: bool,
    limit: usize,
) -> Result<(), String> {
    let store =
        JsonlIndexStore::open_dir(store_dir).map_err(|e| format!("failed to open store: {}", e))?;
    let context = SearchContext::load(store_dir, corpus);
    let searcher = Searcher::new(&store, &context);

    let response = searcher.query(request);

    if json {
        let out = serde_json::to_string_pretty(&response)
            .map_err(|e| format!("failed to serialize response: {}", e))?;
        println!("{}", out);
        return Ok(());
    }

    print_response(&response, request, limit);
    Ok(())
}

fn print_response(response: &QueryResponse, request: &QueryRequest, limit: usize) {
    let color = atty::is(atty::Stream::Stdout);
    let bold = |s: &str| {
        if color {
            format!("\x1b[1m{}\x1b[0m", s)
        } else {
            s.to_string()
        }
    };

    if let Some(keyword) = request.keyword.as_deref() {
        println!("{}", bold(&format!("Keyword results for '{}'", keyword)));
        print_hits(&response.results_keyword, limit);
        println!();
    }
    if let Some(pattern) = request.regex.as_deref() {
        println!("{}", bold(&format!("Regex results for '{}'", pattern)));
        print_hits(&response.results_regex, limit);
        println!();
    }

    println!("{}", bold("Similar books"));
    if response.suggestions.is_empty() {
        println!("  (none)");
    }
    for suggestion in &response.suggestions {
        println!(
            "  {:>6}  {:<50}  similarity {:.3}",
            suggestion.id,
            truncate(&suggestion.title, 50),
            suggestion.similarity
        );
    }
}

fn print_hits(hits: &[SearchHit], limit: usize) {
    if hits.is_empty() {
        println!("  (none)");
        return;
    }
    for hit in hits.iter().take(limit) {
        match hit.ranking.centrality() {
            Some(score) => println!(
                "  {:>6}  {:<50}  {:>8} hits  closeness {:.4}",
                hit.id,
                truncate(&hit.title, 50),
                hit.count(),
                score
            ),
            None => println!(
                "  {:>6}  {:<50}  {:>8} hits",
                hit.id,
                truncate(&hit.title, 50),
                hit.count()
            ),
        }
    }
    if hits.len() > limit {
        println!("  … and {} more", hits.len() - limit);
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max.saturating_sub(1)).collect();
        format!("{}…", cut)
    }
}

fn inspect(store_dir: &Path) -> Result<(), String> {
    let store =
        JsonlIndexStore::open_dir(store_dir).map_err(|e| format!("failed to open store: {}", e))?;

    println!("Store: {}", store.path().display());
    println!("  {} records, {} distinct terms", store.record_count(), store.term_count());

    let split = store.split_terms();
    if split.is_empty() {
        println!("  no split terms");
    } else {
        println!("  {} split terms:", split.len());
        for (term, parts) in split.iter().take(10) {
            println!("    • '{}' in {} parts", term, parts);
        }
    }
    Ok(())
}
