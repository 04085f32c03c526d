pub mod datetime;
pub mod pipeline;
pub mod scrapers;

pub use pipeline::{run_pipeline, IngestManager, IngestOutcome, IngestReport};
pub use scrapers::{ExtractionError, Scraper, ScraperType};

pub mod prelude {
    pub use super::pipeline::{IngestManager, IngestReport};
    pub use super::scrapers::{ExtractionError, Scraper, ScraperType};
    pub use khobor_core::{ArticleRecord, Error, Result, Source};
}
