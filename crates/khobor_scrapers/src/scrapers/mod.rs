use async_trait::async_trait;
use khobor_core::{ArticleRecord, Error, Result, Source, ValidationErrors, ValidationIssue};
use thiserror::Error as ThisError;
use url::Url;

pub mod bangladesh;
use bangladesh::bd_pratidin::BdPratidinScraper;
use bangladesh::daily_star::DailyStarScraper;
use bangladesh::prothom_alo::ProthomAloScraper;

/// Expected per-article failure during extraction. Returned, never panicked,
/// so a batch run continues past individual articles; the orchestrator folds
/// these into the operator-facing report keyed by URL.
#[derive(Debug, ThisError)]
pub enum ExtractionError {
    /// The URL wraps video/live content rather than a text article.
    #[error("not an article")]
    NotAnArticle,

    /// The upstream payload no longer matches the shape this adapter expects,
    /// which almost always means the publisher changed its markup.
    #[error("upstream shape mismatch: {0}")]
    UpstreamShapeMismatch(String),

    /// The source requires a trailing credit line; unattributed content is a
    /// deliberate exclusion, not a bug.
    #[error("no attribution line")]
    NoAttribution,

    /// The body flow contains a structural element the mapper does not
    /// support yet, e.g. an embedded gallery.
    #[error("unsupported body element: {0}")]
    NonPlainBody(String),

    /// The mapped record failed canonical-shape validation.
    #[error("schema violation: {0}")]
    SchemaViolation(#[from] ValidationErrors),

    /// Catch-all around a single article's I/O.
    #[error("fetch failed: {0}")]
    Fetch(#[from] reqwest::Error),
}

impl ExtractionError {
    /// Structured issue detail for the report's `parsing` list.
    pub fn into_issues(self) -> Vec<ValidationIssue> {
        match self {
            ExtractionError::SchemaViolation(errors) => errors.issues,
            ExtractionError::NoAttribution => {
                vec![ValidationIssue::new("signature", "no attribution line")]
            }
            ExtractionError::NonPlainBody(kind) => {
                vec![ValidationIssue::new(
                    "body",
                    format!("unsupported body element: {}", kind),
                )]
            }
            other => vec![ValidationIssue::new("article", other.to_string())],
        }
    }
}

/// Publisher-specific discovery and extraction strategy. The pipeline
/// skeleton is shared; adapters only supply markup location and field
/// mapping.
#[async_trait]
pub trait Scraper: Send + Sync {
    fn source(&self) -> Source;

    /// Returns true if this scraper can handle the given URL
    fn can_handle(&self, url: &str) -> bool;

    /// Returns a list of CLI shorthand names for this scraper
    fn cli_names(&self) -> Vec<&str> {
        vec![self.source().tag()]
    }

    /// Returns candidate article URLs from the source's homepage, deduplicated
    /// and truncated to `limit`. Fails with `InvalidLimit` when `limit <= 0`
    /// and `NoLinksFound` when the scan comes back empty.
    async fn discover_links(&self, limit: Option<i64>) -> Result<Vec<String>>;

    /// Fetches one article page and maps it to the canonical record shape.
    async fn extract(&self, url: &str) -> std::result::Result<ArticleRecord, ExtractionError>;
}

/// Enum that holds all possible scraper types
#[derive(Clone)]
pub enum ScraperType {
    BdPratidin(BdPratidinScraper),
    ProthomAlo(ProthomAloScraper),
    DailyStar(DailyStarScraper),
}

#[async_trait]
impl Scraper for ScraperType {
    fn source(&self) -> Source {
        match self {
            ScraperType::BdPratidin(s) => s.source(),
            ScraperType::ProthomAlo(s) => s.source(),
            ScraperType::DailyStar(s) => s.source(),
        }
    }

    fn can_handle(&self, url: &str) -> bool {
        match self {
            ScraperType::BdPratidin(s) => s.can_handle(url),
            ScraperType::ProthomAlo(s) => s.can_handle(url),
            ScraperType::DailyStar(s) => s.can_handle(url),
        }
    }

    fn cli_names(&self) -> Vec<&str> {
        match self {
            ScraperType::BdPratidin(s) => s.cli_names(),
            ScraperType::ProthomAlo(s) => s.cli_names(),
            ScraperType::DailyStar(s) => s.cli_names(),
        }
    }

    async fn discover_links(&self, limit: Option<i64>) -> Result<Vec<String>> {
        match self {
            ScraperType::BdPratidin(s) => s.discover_links(limit).await,
            ScraperType::ProthomAlo(s) => s.discover_links(limit).await,
            ScraperType::DailyStar(s) => s.discover_links(limit).await,
        }
    }

    async fn extract(&self, url: &str) -> std::result::Result<ArticleRecord, ExtractionError> {
        match self {
            ScraperType::BdPratidin(s) => s.extract(url).await,
            ScraperType::ProthomAlo(s) => s.extract(url).await,
            ScraperType::DailyStar(s) => s.extract(url).await,
        }
    }
}

/// Common utilities for scrapers
pub(crate) mod utils {
    use super::*;
    use khobor_core::validate;
    use scraper::{Html, Selector};

    pub async fn fetch_text(url: &str) -> reqwest::Result<String> {
        reqwest::get(url).await?.text().await
    }

    pub fn parse_url(url: &str) -> Result<Url> {
        Url::parse(url).map_err(|e| Error::InvalidUrl(format!("{}: {}", url, e)))
    }

    /// Validates `limit` up front; `None` means no cap.
    pub fn check_limit(limit: Option<i64>) -> Result<Option<usize>> {
        match limit {
            None => Ok(None),
            Some(n) if n <= 0 => Err(Error::InvalidLimit(n)),
            Some(n) => Ok(Some(n as usize)),
        }
    }

    /// Deduplicates by exact URL preserving order, truncates to `limit`, and
    /// treats an empty result as the critical `NoLinksFound` condition.
    pub fn finalize_links(
        source: Source,
        links: Vec<String>,
        limit: Option<usize>,
    ) -> Result<Vec<String>> {
        let mut seen = std::collections::HashSet::new();
        let mut unique: Vec<String> = links
            .into_iter()
            .filter(|link| seen.insert(link.clone()))
            .collect();
        if let Some(limit) = limit {
            unique.truncate(limit);
        }
        if unique.is_empty() {
            return Err(Error::NoLinksFound(source.tag()));
        }
        Ok(unique)
    }

    pub fn select_first_text(document: &Html, selector: &str) -> Option<String> {
        let selector = Selector::parse(selector).unwrap();
        document
            .select(&selector)
            .next()
            .map(|el| el.text().collect::<String>().trim().to_string())
            .filter(|text| !text.is_empty())
    }

    pub fn select_texts(document: &Html, selector: &str) -> Vec<String> {
        let selector = Selector::parse(selector).unwrap();
        document
            .select(&selector)
            .map(|el| el.text().collect::<String>().trim().to_string())
            .filter(|text| !text.is_empty())
            .collect()
    }

    /// Flattens an HTML fragment (e.g. a structured-data text element) to its
    /// plain text content.
    pub fn fragment_text(fragment: &str) -> String {
        Html::parse_fragment(fragment)
            .root_element()
            .text()
            .collect::<String>()
            .trim()
            .to_string()
    }

    /// "life-living" -> "Life Living"
    pub fn titlecase_slug(slug: &str) -> String {
        slug.split('-')
            .filter(|word| !word.is_empty())
            .map(|word| {
                let mut chars = word.chars();
                match chars.next() {
                    Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                    None => String::new(),
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Final mapping step shared by every adapter: the canonical validator is
    /// the single trust boundary in front of storage.
    pub fn finish(record: ArticleRecord) -> std::result::Result<ArticleRecord, ExtractionError> {
        validate::validate(&record)?;
        Ok(record)
    }
}
