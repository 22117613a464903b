use chrono::Utc;
use clap::{Parser, Subcommand};
use doc_lookup_core::{
    discover_pdf_files, ClassificationRules, DocumentStore, ExtractionFailurePolicy,
    IngestionOptions, IngestionPipeline, JsonFileStore, LopdfExtractor, SearchEngine,
    SearchRequest, SnippetConfig,
};
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "doc-lookup", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// JSON file holding the ingested documents
    #[arg(long, env = "DOC_LOOKUP_STORE", default_value = "documents.json")]
    store: PathBuf,

    /// Filename substring marking price-table documents (repeatable)
    #[arg(long = "table-pattern", env = "DOC_LOOKUP_TABLE_PATTERNS", value_delimiter = ',')]
    table_patterns: Vec<String>,

    /// Filename substring marking documents that need wide context (repeatable)
    #[arg(long = "wide-pattern", env = "DOC_LOOKUP_WIDE_PATTERNS", value_delimiter = ',')]
    wide_patterns: Vec<String>,

    /// Text identifying the header row of price tables
    #[arg(long, env = "DOC_LOOKUP_TABLE_HEADER")]
    table_header_marker: Option<String>,

    /// Cap on context snippets returned per document
    #[arg(long, env = "DOC_LOOKUP_MAX_SNIPPETS")]
    max_snippets: Option<usize>,
}

#[derive(Subcommand)]
enum Command {
    /// Extract and store every document not stored yet.
    Ingest {
        /// Document to ingest (repeatable).
        #[arg(long = "path")]
        paths: Vec<PathBuf>,
        /// Folder searched recursively for PDFs.
        #[arg(long)]
        folder: Option<PathBuf>,
        /// Skip documents whose text cannot be extracted instead of storing them empty.
        #[arg(long, default_value_t = false)]
        skip_unreadable: bool,
    },
    /// Print snippets around every match of a literal query.
    Search {
        /// Search query
        #[arg(long)]
        query: String,
        /// Print results as a JSON array.
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// List stored documents.
    List,
}

impl Cli {
    fn classification_rules(&self) -> ClassificationRules {
        ClassificationRules::with_overrides(&self.table_patterns, &self.wide_patterns)
    }

    fn snippet_config(&self) -> SnippetConfig {
        let mut config = SnippetConfig {
            max_snippets_per_document: self.max_snippets,
            ..SnippetConfig::default()
        };
        if let Some(marker) = &self.table_header_marker {
            config.table_header_marker = marker.to_lowercase();
        }
        config
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let app_version = env!("CARGO_PKG_VERSION");

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(fmt::layer())
        .init();

    let cli = Cli::parse();
    info!(
        version = app_version,
        started_at = %Utc::now().to_rfc3339(),
        store = %cli.store.display(),
        "doc-lookup boot"
    );

    let store = JsonFileStore::open(&cli.store)
        .await
        .map_err(|error| anyhow::anyhow!("cannot open store {}: {error}", cli.store.display()))?;

    match &cli.command {
        Command::Ingest {
            paths,
            folder,
            skip_unreadable,
        } => {
            let mut targets = paths.clone();
            if let Some(folder) = folder {
                let found = discover_pdf_files(folder);
                if found.is_empty() {
                    warn!(folder = %folder.display(), "no pdf files found in folder");
                }
                targets.extend(found);
            }

            if targets.is_empty() {
                anyhow::bail!("nothing to ingest: pass --path or --folder");
            }

            let options = IngestionOptions {
                on_extraction_failure: if *skip_unreadable {
                    ExtractionFailurePolicy::Skip
                } else {
                    ExtractionFailurePolicy::StoreEmpty
                },
            };
            let report = IngestionPipeline::new(&store, LopdfExtractor, cli.classification_rules())
                .with_options(options)
                .ingest(&targets)
                .await;

            for skipped in &report.failed {
                warn!(path = %skipped.path.display(), reason = %skipped.reason, "skipped pdf");
            }
            if let Some(failure) = &report.batch_failure {
                warn!(error = %failure, "no documents were stored");
            }

            println!(
                "{} documents ingested, {} already stored, {} missing, {} skipped at {}",
                report.inserted,
                report.already_present.len(),
                report.missing.len(),
                report.failed.len(),
                Utc::now().to_rfc3339()
            );
        }
        Command::Search { query, json } => {
            let engine = SearchEngine::with_config(store, cli.snippet_config());
            let request = SearchRequest {
                query: query.clone(),
            };

            let results = engine
                .handle(&request)
                .await
                .map_err(|error| anyhow::anyhow!("{error} ({:?})", error.class()))?;

            if *json {
                println!("{}", serde_json::to_string_pretty(&results)?);
            } else {
                println!("query: {}", request.query);
                for item in results {
                    println!("[{}]\n{}\n", item.filename, item.snippet);
                }
            }
        }
        Command::List => {
            for document in store
                .list_all()
                .await
                .map_err(|error| anyhow::anyhow!(error.to_string()))?
            {
                println!(
                    "{} kind={:?} chars={}",
                    document.filename,
                    document.kind,
                    document.content.chars().count()
                );
            }
        }
    }

    Ok(())
}
