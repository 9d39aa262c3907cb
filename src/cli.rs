use clap::{Parser as ClapParser, Subcommand};
use std::path::PathBuf;

#[derive(ClapParser, Debug)]
#[command(author, version, about = "On-disk inverted index and tf-idf retrieval engine over crawled HTML pages", long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Log level directive passed to the tracing env-filter (e.g. "info", "html_index=debug")
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Emit structured JSON logs instead of plain text
    #[arg(long, global = true)]
    pub log_json: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Ingest input records and build an on-disk index
    Build {
        /// NDJSON file (or "-" for stdin) to ingest
        #[arg(long, value_name = "FILE", conflicts_with = "input_dir")]
        input: Option<PathBuf>,

        /// Directory of *.json files to ingest instead of an NDJSON stream
        #[arg(long, value_name = "DIR", conflicts_with = "input")]
        input_dir: Option<PathBuf>,

        /// Directory to write the index artifacts into
        #[arg(long, value_name = "DIR")]
        index_dir: PathBuf,

        /// Spill the in-memory posting table to disk every this many documents
        #[arg(long)]
        spill_threshold: Option<usize>,

        /// SimHash Hamming distance threshold for near-duplicate detection
        #[arg(long)]
        hamming_threshold: Option<u32>,

        /// Exclude near-duplicate documents from the index instead of merely counting them
        #[arg(long)]
        skip_duplicates: bool,
    },

    /// Load an index directory and run one query
    Search {
        /// Directory containing a previously built index
        #[arg(long, value_name = "DIR")]
        index_dir: PathBuf,

        /// Query string
        #[arg(value_name = "QUERY")]
        query: String,

        /// Maximum number of results to return
        #[arg(long, short = 'k')]
        top_k: Option<usize>,
    },
}
