use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, NaiveDateTime, TimeZone, Utc};
use khobor_core::{ArticleRecord, Author, BodyBlock, Image, Result, Section, Source, Tag};
use scraper::{Html, Selector};
use url::Url;

use crate::datetime::DHAKA_UTC_OFFSET_SECS;
use crate::scrapers::{utils, ExtractionError, Scraper};

/// The Daily Star. English-language publisher; article links sit under a
/// fixed set of category path prefixes and datelines use the
/// `"Jun 14, 2025, 7:30 pm"` format in Dhaka local time.
#[derive(Debug, Clone)]
pub struct DailyStarScraper;

impl DailyStarScraper {
    pub fn new() -> Self {
        Self
    }

    const BASE_URL: &'static str = "https://www.thedailystar.net";

    const ALLOWED_CATEGORIES: [&'static str; 11] = [
        "opinion",
        "business",
        "sports",
        "news",
        "entertainment",
        "life-living",
        "campus",
        "tech-startup",
        "star-multimedia",
        "books-literature",
        "environment",
    ];

    const DATE_FORMAT: &'static str = "%b %e, %Y, %l:%M %P";

    /// Fallback author where the page carries no byline; the source ingests
    /// unattributed articles (unlike Bangladesh Pratidin).
    const UNATTRIBUTED: &'static str = "The Daily Star";

    fn links_from_document(document: &Html) -> Vec<String> {
        let base = Url::parse(Self::BASE_URL).unwrap();
        let anchor_selector = Selector::parse("a[href]").unwrap();
        document
            .select(&anchor_selector)
            .filter_map(|el| el.value().attr("href"))
            .filter_map(|href| base.join(href).ok())
            .filter(Self::is_article_url)
            .map(|url| url.to_string())
            .collect()
    }

    fn is_article_url(url: &Url) -> bool {
        if url.host_str() != Some("www.thedailystar.net") {
            return false;
        }
        let Some(segments) = url.path_segments() else {
            return false;
        };
        let segments: Vec<&str> = segments.filter(|s| !s.is_empty()).collect();
        // category/subcategory/article-slug at minimum
        segments.len() >= 3 && Self::ALLOWED_CATEGORIES.contains(&segments[0])
    }

    fn map_article(
        url: &str,
        document: &Html,
    ) -> std::result::Result<ArticleRecord, ExtractionError> {
        let parsed_url = utils::parse_url(url)
            .map_err(|e| ExtractionError::UpstreamShapeMismatch(e.to_string()))?;
        let section_slug = parsed_url
            .path_segments()
            .and_then(|mut segments| segments.next().map(str::to_string))
            .unwrap_or_default();

        // Multimedia wrappers carry no text body.
        if section_slug == "star-multimedia" {
            return Err(ExtractionError::NotAnArticle);
        }

        let headline = utils::select_first_text(document, ".article-title").ok_or_else(|| {
            ExtractionError::UpstreamShapeMismatch("missing .article-title".into())
        })?;

        let author = utils::select_first_text(document, "span.author, .byline, .node-header .author")
            .map(strip_by_prefix)
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| Self::UNATTRIBUTED.to_string());

        let (published_at, updated_at) = datelines(document)?;

        let tags = utils::select_texts(document, ".tags a, .news-tags a")
            .into_iter()
            .map(|name| Tag {
                display_name: name.clone(),
                name,
            })
            .collect();

        let image_selector = Selector::parse(".lg-gallery>picture>img").unwrap();
        let image = document.select(&image_selector).next().and_then(|el| {
            el.value().attr("data-srcset").map(|src| Image {
                src: src.to_string(),
                width: 0,
                height: 0,
                alt: el.value().attr("alt").map(str::to_string),
            })
        });

        let body = utils::select_texts(document, "article p")
            .into_iter()
            .map(BodyBlock::text)
            .collect();

        utils::finish(ArticleRecord {
            url: url.to_string(),
            source: Source::DailyStar,
            headline,
            author: Author { name: author },
            published_at,
            updated_at,
            section: Section {
                display_name: utils::titlecase_slug(&section_slug),
                name: section_slug,
            },
            tags,
            image,
            body,
            signature: None,
        })
    }

    fn parse_dateline(text: &str) -> Option<DateTime<Utc>> {
        let cleaned = text
            .trim()
            .trim_start_matches("Published:")
            .trim_start_matches("Last update on:")
            .trim();
        let naive = NaiveDateTime::parse_from_str(cleaned, Self::DATE_FORMAT).ok()?;
        FixedOffset::east_opt(DHAKA_UTC_OFFSET_SECS)
            .unwrap()
            .from_local_datetime(&naive)
            .single()
            .map(|local| local.with_timezone(&Utc))
    }
}

impl Default for DailyStarScraper {
    fn default() -> Self {
        Self::new()
    }
}

fn strip_by_prefix(name: String) -> String {
    let trimmed = name.trim();
    match trimmed.get(..3) {
        Some(prefix) if prefix.eq_ignore_ascii_case("by ") => trimmed[3..].trim().to_string(),
        _ => trimmed.to_string(),
    }
}

/// The date pane stacks the published and updated timestamps as sibling text
/// chunks; updated falls back to published when only one is present.
fn datelines(document: &Html) -> std::result::Result<(DateTime<Utc>, DateTime<Utc>), ExtractionError> {
    let selector = Selector::parse(".pane-news-details-left .content>.date").unwrap();
    let element = document.select(&selector).next().ok_or_else(|| {
        ExtractionError::UpstreamShapeMismatch("missing date pane".into())
    })?;

    let chunks: Vec<String> = element
        .text()
        .map(|chunk| chunk.trim().to_string())
        .filter(|chunk| !chunk.is_empty())
        .collect();

    let published_at = chunks
        .first()
        .and_then(|chunk| DailyStarScraper::parse_dateline(chunk))
        .ok_or_else(|| ExtractionError::UpstreamShapeMismatch("unparsable dateline".into()))?;
    let updated_at = chunks
        .get(1)
        .and_then(|chunk| DailyStarScraper::parse_dateline(chunk))
        .unwrap_or(published_at);

    Ok((published_at, updated_at))
}

#[async_trait]
impl Scraper for DailyStarScraper {
    fn source(&self) -> Source {
        Source::DailyStar
    }

    fn can_handle(&self, url: &str) -> bool {
        url.contains("thedailystar.net")
    }

    async fn discover_links(&self, limit: Option<i64>) -> Result<Vec<String>> {
        let limit = utils::check_limit(limit)?;
        let html = utils::fetch_text(Self::BASE_URL).await?;
        let document = Html::parse_document(&html);
        let links = Self::links_from_document(&document);
        utils::finalize_links(self.source(), links, limit)
    }

    async fn extract(&self, url: &str) -> std::result::Result<ArticleRecord, ExtractionError> {
        let html = utils::fetch_text(url).await?;
        let document = Html::parse_document(&html);
        Self::map_article(url, &document)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use khobor_core::Error;

    const HOMEPAGE: &str = r#"
        <a href="/news/bangladesh/crime-justice/news/verdict-today-3634581">one</a>
        <a href="https://www.thedailystar.net/sports/cricket/news/series-win-3634582">two</a>
        <a href="/news/bangladesh/crime-justice/news/verdict-today-3634581">dup</a>
        <a href="/lifestyle/only-two-parts">short</a>
        <a href="/unknown-category/sub/article-slug">wrong category</a>
        <a href="https://example.com/news/bangladesh/foreign-host">foreign</a>
    "#;

    const ARTICLE: &str = r##"
        <h1 class="article-title">Verdict expected today</h1>
        <span class="author">By Staff Correspondent</span>
        <div class="pane-news-details-left"><div class="content"><div class="date">
            Jun 14, 2025, 7:30 pm
            <br>
            Jun 14, 2025, 9:05 pm
        </div></div></div>
        <div class="lg-gallery"><picture>
            <img data-srcset="https://tds-images.thedailystar.net/photo.jpg 1x" alt="Court premises">
        </picture></div>
        <article>
            <p>The court will deliver its verdict today.</p>
            <p>Security has been tightened around the premises.</p>
        </article>
        <div class="tags"><a href="#">Verdict</a><a href="#">Court</a></div>
    "##;

    const ARTICLE_URL: &str =
        "https://www.thedailystar.net/news/bangladesh/crime-justice/news/verdict-today-3634581";

    #[test]
    fn link_filter_applies_category_and_shape_rules() {
        let document = Html::parse_document(HOMEPAGE);
        let links = DailyStarScraper::links_from_document(&document);
        let unique = utils::finalize_links(Source::DailyStar, links, None).unwrap();
        assert_eq!(
            unique,
            vec![
                "https://www.thedailystar.net/news/bangladesh/crime-justice/news/verdict-today-3634581",
                "https://www.thedailystar.net/sports/cricket/news/series-win-3634582",
            ]
        );
    }

    #[test]
    fn relative_links_resolve_against_the_base_url() {
        let document = Html::parse_document(r#"<a href="/news/a/b/c">x</a>"#);
        let links = DailyStarScraper::links_from_document(&document);
        assert_eq!(links, vec!["https://www.thedailystar.net/news/a/b/c"]);
    }

    #[test]
    fn maps_a_full_article() {
        let document = Html::parse_document(ARTICLE);
        let record = DailyStarScraper::map_article(ARTICLE_URL, &document).unwrap();

        assert_eq!(record.headline, "Verdict expected today");
        assert_eq!(record.author.name, "Staff Correspondent");
        // 7:30 pm Dhaka is 13:30 UTC.
        assert_eq!(
            record.published_at,
            Utc.with_ymd_and_hms(2025, 6, 14, 13, 30, 0).unwrap()
        );
        assert_eq!(
            record.updated_at,
            Utc.with_ymd_and_hms(2025, 6, 14, 15, 5, 0).unwrap()
        );
        assert_eq!(record.section.name, "news");
        assert_eq!(record.section.display_name, "News");
        assert_eq!(record.tags.len(), 2);
        assert_eq!(record.body.len(), 2);
        assert!(record.signature.is_none());
    }

    #[test]
    fn multimedia_urls_are_not_articles() {
        let document = Html::parse_document(ARTICLE);
        let result = DailyStarScraper::map_article(
            "https://www.thedailystar.net/star-multimedia/video/some-clip",
            &document,
        );
        assert!(matches!(result, Err(ExtractionError::NotAnArticle)));
    }

    #[test]
    fn missing_byline_falls_back_to_the_unattributed_author() {
        let html = ARTICLE.replace(r#"<span class="author">By Staff Correspondent</span>"#, "");
        let document = Html::parse_document(&html);
        let record = DailyStarScraper::map_article(ARTICLE_URL, &document).unwrap();
        assert_eq!(record.author.name, DailyStarScraper::UNATTRIBUTED);
    }

    #[test]
    fn garbled_dateline_is_a_shape_mismatch() {
        let html = ARTICLE.replace("Jun 14, 2025, 7:30 pm", "14 June 2025");
        let document = Html::parse_document(&html);
        let result = DailyStarScraper::map_article(ARTICLE_URL, &document);
        assert!(matches!(
            result,
            Err(ExtractionError::UpstreamShapeMismatch(_))
        ));
    }

    #[tokio::test]
    async fn zero_limit_is_rejected_before_any_fetch() {
        let scraper = DailyStarScraper::new();
        let result = scraper.discover_links(Some(-1)).await;
        assert!(matches!(result, Err(Error::InvalidLimit(-1))));
    }
}
