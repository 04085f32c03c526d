use clap::Parser;
use khobor_core::{Error, Result, Source};
use khobor_scrapers::{IngestManager, IngestOutcome, Scraper};
use tracing::info;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Storage backend to use
    #[arg(long, default_value = "memory")]
    storage: String,
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Ingest one source, or every registered source when omitted
    Ingest {
        /// Source tag (e.g. bd-pratidin, prothom-alo, daily-star)
        source: Option<String>,
        /// Cap on how many candidate links discovery returns
        #[arg(long)]
        limit: Option<i64>,
    },
    /// Ingest a single article URL
    Url { url: String },
    /// List registered sources
    Sources,
    /// Serve the HTTP API
    Serve {
        #[arg(long, default_value_t = 3000)]
        port: u16,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();
    let cli = Cli::parse();

    let store = khobor_storage::create_store(&cli.storage)?;
    let manager = IngestManager::with_default_scrapers(store);

    match cli.command {
        Commands::Ingest {
            source: Some(source),
            limit,
        } => {
            let source: Source = source.parse().map_err(Error::Scraping)?;
            let report = manager.ingest_source(source, limit).await?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Commands::Ingest {
            source: None,
            limit,
        } => {
            for (source, report) in manager.ingest_all(limit).await {
                info!("📰 {} run finished", source);
                println!("{}", serde_json::to_string_pretty(&report)?);
            }
        }
        Commands::Url { url } => {
            let (record, outcome) = manager.ingest_url(&url).await?;
            match outcome {
                IngestOutcome::Inserted => info!("stored {}", record.url),
                IngestOutcome::AlreadyStored => info!("already stored {}", record.url),
            }
            println!("{}", serde_json::to_string_pretty(&record)?);
        }
        Commands::Sources => {
            for scraper in manager.scrapers() {
                println!(
                    "{}\t{}",
                    scraper.source().tag(),
                    scraper.source().display_name()
                );
            }
        }
        Commands::Serve { port } => {
            let app = khobor_web::create_app(khobor_web::AppState { manager }).await;
            let listener = tokio::net::TcpListener::bind(("0.0.0.0", port)).await?;
            info!("🌐 listening on port {}", port);
            axum::serve(listener, app).await?;
        }
    }

    Ok(())
}
