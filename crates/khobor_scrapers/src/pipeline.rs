use futures::stream::{self, StreamExt};
use khobor_core::{ArticleRecord, ArticleStore, Error, Result, Source, ValidationIssue};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::scrapers::{Scraper, ScraperType};

/// Simultaneous in-flight article fetches per run. A fixed pool, not
/// unbounded fan-out, so a run cannot overwhelm the source site.
const CONCURRENT_FETCHES: usize = 10;

/// Machine-stable reason reported when extraction accepts nothing.
const ZERO_RECORDS: &str = "zero records";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Discovering,
    Extracting,
    Deduplicating,
    Persisting,
    Done,
}

/// One article that failed extraction or validation, kept with its URL for
/// the operator-facing report.
#[derive(Debug, Clone, Serialize)]
pub struct ParseFailure {
    pub url: String,
    pub issues: Vec<ValidationIssue>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ReportErrors {
    pub critical: Option<String>,
    pub parsing: Vec<ParseFailure>,
}

/// Outcome of one ingestion run. Partial per-article failures land in
/// `errors.parsing`; only a critical failure means the run produced nothing.
#[derive(Debug, Clone, Default, Serialize)]
pub struct IngestReport {
    pub info: Vec<String>,
    pub errors: ReportErrors,
}

impl IngestReport {
    pub fn critical(reason: impl Into<String>) -> Self {
        IngestReport {
            info: Vec::new(),
            errors: ReportErrors {
                critical: Some(reason.into()),
                parsing: Vec::new(),
            },
        }
    }

    pub fn is_critical(&self) -> bool {
        self.errors.critical.is_some()
    }
}

/// Drives one source through discovery, bounded-concurrency extraction,
/// dedup against the store and one bulk insert. Discovery, zero accepted
/// records and store failures end the run; a single article never does.
pub async fn run_pipeline<S>(
    scraper: &S,
    store: &dyn ArticleStore,
    limit: Option<i64>,
) -> IngestReport
where
    S: Scraper + ?Sized,
{
    let source = scraper.source();

    debug!(source = %source, phase = ?Phase::Discovering, "starting ingestion run");
    let links = match scraper.discover_links(limit).await {
        Ok(links) => links,
        Err(e) => {
            warn!(source = %source, "link discovery failed: {}", e);
            return IngestReport::critical(e.to_string());
        }
    };

    debug!(source = %source, phase = ?Phase::Extracting, links = links.len(), "extracting articles");
    let results: Vec<(String, std::result::Result<ArticleRecord, _>)> = stream::iter(links)
        .map(|url| async move {
            let result = scraper.extract(&url).await;
            (url, result)
        })
        .buffer_unordered(CONCURRENT_FETCHES)
        .collect()
        .await;

    let mut accepted = Vec::new();
    let mut parsing = Vec::new();
    for (url, result) in results {
        match result {
            Ok(record) => accepted.push(record),
            Err(e) => {
                warn!(source = %source, url = %url, "article dropped: {}", e);
                parsing.push(ParseFailure {
                    url,
                    issues: e.into_issues(),
                });
            }
        }
    }

    if accepted.is_empty() {
        warn!(source = %source, "no article survived extraction");
        let mut report = IngestReport::critical(ZERO_RECORDS);
        report.errors.parsing = parsing;
        return report;
    }

    debug!(source = %source, phase = ?Phase::Deduplicating, accepted = accepted.len(), "checking for existing urls");
    let urls: Vec<String> = accepted.iter().map(|r| r.url.clone()).collect();
    let existing = match store.find_existing_urls(source, &urls).await {
        Ok(existing) => existing,
        Err(e) => {
            warn!(source = %source, "existence check failed: {}", e);
            let mut report = IngestReport::critical(e.to_string());
            report.errors.parsing = parsing;
            return report;
        }
    };

    let before = accepted.len();
    let new_records: Vec<ArticleRecord> = accepted
        .into_iter()
        .filter(|record| !existing.contains(&record.url))
        .collect();
    let skipped = before - new_records.len();

    let mut info = Vec::new();
    if skipped > 0 {
        info.push(format!("skipped {} existing entries", skipped));
    }

    debug!(source = %source, phase = ?Phase::Persisting, new = new_records.len(), "persisting new records");
    if !new_records.is_empty() {
        if let Err(e) = store.bulk_insert(&new_records).await {
            warn!(source = %source, "bulk insert failed: {}", e);
            let mut report = IngestReport::critical(e.to_string());
            report.errors.parsing = parsing;
            return report;
        }
    }
    info.push(format!("inserted {} new entries", new_records.len()));

    debug!(source = %source, phase = ?Phase::Done, "ingestion run complete");
    IngestReport {
        info,
        errors: ReportErrors {
            critical: None,
            parsing,
        },
    }
}

/// Whether `ingest_url` stored a new record or found it already present.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestOutcome {
    Inserted,
    AlreadyStored,
}

/// Owns the store handle and the scraper set for the process. Constructed
/// once at startup and passed by reference into the callers that need it.
pub struct IngestManager {
    store: Arc<dyn ArticleStore>,
    scrapers: Vec<ScraperType>,
}

impl IngestManager {
    pub fn new(store: Arc<dyn ArticleStore>) -> Self {
        Self {
            store,
            scrapers: Vec::new(),
        }
    }

    /// Manager with every supported publisher registered.
    pub fn with_default_scrapers(store: Arc<dyn ArticleStore>) -> Self {
        let mut manager = Self::new(store);
        for scraper in crate::scrapers::bangladesh::default_scrapers() {
            manager.add_scraper(scraper);
        }
        manager
    }

    pub fn add_scraper(&mut self, scraper: ScraperType) {
        self.scrapers.push(scraper);
    }

    pub fn scrapers(&self) -> &[ScraperType] {
        &self.scrapers
    }

    /// Runs the full pipeline for one source.
    pub async fn ingest_source(&self, source: Source, limit: Option<i64>) -> Result<IngestReport> {
        let scraper = self
            .scrapers
            .iter()
            .find(|s| s.source() == source)
            .ok_or_else(|| Error::Scraping(format!("no scraper registered for {}", source)))?;
        Ok(run_pipeline(scraper, self.store.as_ref(), limit).await)
    }

    /// Runs every registered source in turn.
    pub async fn ingest_all(&self, limit: Option<i64>) -> Vec<(Source, IngestReport)> {
        let mut reports = Vec::new();
        for scraper in &self.scrapers {
            let report = run_pipeline(scraper, self.store.as_ref(), limit).await;
            reports.push((scraper.source(), report));
        }
        reports
    }

    /// Extracts and stores a single article by URL, picking the scraper that
    /// can handle it. The store's dedup contract applies as in a batch run.
    pub async fn ingest_url(&self, url: &str) -> Result<(ArticleRecord, IngestOutcome)> {
        let scraper = self
            .scrapers
            .iter()
            .find(|s| s.can_handle(url))
            .ok_or_else(|| Error::Scraping(format!("no scraper found for URL: {}", url)))?;

        let record = scraper
            .extract(url)
            .await
            .map_err(|e| Error::Scraping(e.to_string()))?;

        let existing = self
            .store
            .find_existing_urls(scraper.source(), std::slice::from_ref(&record.url))
            .await?;
        if existing.contains(&record.url) {
            return Ok((record, IngestOutcome::AlreadyStored));
        }

        self.store.bulk_insert(std::slice::from_ref(&record)).await?;
        Ok((record, IngestOutcome::Inserted))
    }
}
