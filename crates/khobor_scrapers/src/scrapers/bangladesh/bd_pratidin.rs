use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use khobor_core::{ArticleRecord, Author, BodyBlock, Image, Result, Section, Source, Tag};
use scraper::{Html, Selector};

use crate::datetime::parse_bangla_datetime;
use crate::scrapers::{utils, ExtractionError, Scraper};

/// Bangladesh Pratidin. Article URLs follow the fixed path shape
/// `/{category}/{year}/{month}/{day}/{id}`; article pages carry their fields
/// inside the `.detailsArea` region with Bangla-script datelines.
#[derive(Debug, Clone)]
pub struct BdPratidinScraper;

impl BdPratidinScraper {
    pub fn new() -> Self {
        Self
    }

    const BASE_URL: &'static str = "https://www.bd-pratidin.com";

    /// Keeps anchors whose absolute URL has exactly five path segments with a
    /// real calendar date embedded in positions 2..4.
    fn links_from_document(document: &Html) -> Vec<String> {
        let anchor_selector = Selector::parse("a[href]").unwrap();
        document
            .select(&anchor_selector)
            .filter_map(|el| el.value().attr("href"))
            .filter(|href| Self::is_article_path(href))
            .map(|href| href.to_string())
            .collect()
    }

    fn is_article_path(href: &str) -> bool {
        let Ok(url) = url::Url::parse(href) else {
            return false;
        };
        let Some(segments) = url.path_segments() else {
            return false;
        };
        let segments: Vec<&str> = segments.filter(|s| !s.is_empty()).collect();
        let [_category, year, month, day, _id] = segments[..] else {
            return false;
        };
        let (Ok(year), Ok(month), Ok(day)) =
            (year.parse::<i32>(), month.parse::<u32>(), day.parse::<u32>())
        else {
            return false;
        };
        NaiveDate::from_ymd_opt(year, month, day).is_some()
    }

    fn map_article(
        url: &str,
        document: &Html,
    ) -> std::result::Result<ArticleRecord, ExtractionError> {
        let details_selector = Selector::parse(".detailsArea").unwrap();
        let details = document
            .select(&details_selector)
            .next()
            .ok_or_else(|| ExtractionError::UpstreamShapeMismatch("missing .detailsArea".into()))?;

        let headline = select_text(&details, ".n_head").ok_or_else(|| {
            ExtractionError::UpstreamShapeMismatch("missing .n_head headline".into())
        })?;

        // The trailing paragraph is the wire-credit line ("বিডি প্রতিদিন/...").
        // Without it the article is unattributed and excluded by policy.
        let signature = select_text(&details, "article > p:last-child")
            .filter(|text| text.contains('/'))
            .ok_or(ExtractionError::NoAttribution)?;

        let published_at = dateline(&details, ".pubNews")?.ok_or_else(|| {
            ExtractionError::UpstreamShapeMismatch("missing .pubNews dateline".into())
        })?;
        let updated_at = dateline(&details, ".updNews")?.unwrap_or(published_at);

        let parsed_url = utils::parse_url(url)
            .map_err(|e| ExtractionError::UpstreamShapeMismatch(e.to_string()))?;
        let section_slug = parsed_url
            .path_segments()
            .and_then(|mut segments| segments.next().map(str::to_string))
            .unwrap_or_default();
        let section_label =
            select_text(&details, ".row > .col-2 > a:nth-child(2)").unwrap_or_else(|| section_slug.clone());

        let tags = select_all_texts(&details, ".tagArea>ul>li>a")
            .into_iter()
            .map(|name| Tag {
                display_name: name.clone(),
                name,
            })
            .collect();

        let image_selector = Selector::parse("#adf-overlay").unwrap();
        let image = document.select(&image_selector).next().and_then(|el| {
            el.value().attr("src").map(|src| Image {
                src: src.to_string(),
                width: 0,
                height: 0,
                alt: el.value().attr("alt").map(str::to_string),
            })
        });

        // Body paragraphs, minus the trailing credit line.
        let mut paragraphs = select_all_texts(&details, "article p");
        paragraphs.pop();
        let body = paragraphs.into_iter().map(BodyBlock::text).collect();

        utils::finish(ArticleRecord {
            url: url.to_string(),
            source: Source::BdPratidin,
            headline,
            author: Author {
                name: signature.clone(),
            },
            published_at,
            updated_at,
            section: Section {
                name: section_slug,
                display_name: section_label,
            },
            tags,
            image,
            body,
            signature: Some(signature),
        })
    }
}

impl Default for BdPratidinScraper {
    fn default() -> Self {
        Self::new()
    }
}

fn select_text(region: &scraper::ElementRef<'_>, selector: &str) -> Option<String> {
    let selector = Selector::parse(selector).unwrap();
    region
        .select(&selector)
        .next()
        .map(|el| el.text().collect::<String>().trim().to_string())
        .filter(|text| !text.is_empty())
}

fn select_all_texts(region: &scraper::ElementRef<'_>, selector: &str) -> Vec<String> {
    let selector = Selector::parse(selector).unwrap();
    region
        .select(&selector)
        .map(|el| el.text().collect::<String>().trim().to_string())
        .filter(|text| !text.is_empty())
        .collect()
}

/// The dateline element mixes a label with the timestamp across text lines;
/// the line matching the Bangla datetime grammar wins. `Ok(None)` when the
/// element is absent, a shape mismatch when it exists but no line parses.
fn dateline(
    region: &scraper::ElementRef<'_>,
    selector_text: &str,
) -> std::result::Result<Option<DateTime<Utc>>, ExtractionError> {
    let selector = Selector::parse(selector_text).unwrap();
    let Some(element) = region.select(&selector).next() else {
        return Ok(None);
    };
    let text = element.text().collect::<String>();
    text.lines()
        .filter_map(|line| parse_bangla_datetime(line.trim()).ok())
        .next()
        .map(Some)
        .ok_or_else(|| {
            ExtractionError::UpstreamShapeMismatch(format!(
                "unparsable dateline in {}",
                selector_text
            ))
        })
}

#[async_trait]
impl Scraper for BdPratidinScraper {
    fn source(&self) -> Source {
        Source::BdPratidin
    }

    fn can_handle(&self, url: &str) -> bool {
        url.contains("bd-pratidin.com")
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
