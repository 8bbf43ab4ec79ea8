use clap::{Parser, Subcommand};

use folio::RankingMethod;

#[derive(Parser)]
#[command(
    name = "folio",
    about = "Full-text search over a Project Gutenberg corpus",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Rebuild the inverted index from the corpus
    Index {
        /// Directory of <id>_<title>.txt book files
        #[arg(short, long)]
        corpus: String,

        /// Store directory for the index records
        #[arg(short, long)]
        store: String,
    },

    /// Rebuild the similarity graph and closeness scores
    Graph {
        /// Directory of <id>_<title>.txt book files
        #[arg(short, long)]
        corpus: String,

        /// Store directory for graph and score records
        #[arg(short, long)]
        store: String,
    },

    /// Search the index
    Search {
        /// Store directory holding index, graph, and score records
        #[arg(short, long)]
        store: String,

        /// Corpus directory, used to resolve book titles
        #[arg(short, long)]
        corpus: Option<String>,

        /// Exact keyword (falls back to substring matching on sparse hits)
        #[arg(short, long)]
        keyword: Option<String>,

        /// Search regex over terms: [A-Za-z0-9.|*()]
        #[arg(short, long)]
        regex: Option<String>,

        /// Result ordering: occurrence or closeness
        #[arg(long, default_value = "occurrence")]
        ranking: RankingMethod,

        /// Print the response as JSON instead of a table
        #[arg(long)]
        json: bool,

        /// Show at most this many results per path
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },

    /// Show store statistics (records, terms, split terms)
    Inspect {
        /// Store directory
        #[arg(short, long)]
        store: String,
    },
}
