use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use khobor_core::{ArticleRecord, Author, BodyBlock, Error, Image, Result, Section, Source, Tag};
use scraper::{Html, Selector};
use serde::Deserialize;

use crate::scrapers::{utils, ExtractionError, Scraper};

/// Prothom Alo. Both the homepage and article pages embed a JSON graph in a
/// `<script id="static-page">` block; discovery walks the nested collection
/// tree, extraction maps the embedded story. Everything in the payload is
/// untrusted and decoded into optional fields first.
#[derive(Debug, Clone)]
pub struct ProthomAloScraper;

impl ProthomAloScraper {
    pub fn new() -> Self {
        Self
    }

    const BASE_URL: &'static str = "https://www.prothomalo.com";
    const IMAGE_CDN: &'static str = "https://images.prothomalo.com";

    fn static_page_payload(document: &Html) -> Option<String> {
        let selector = Selector::parse("script#static-page").unwrap();
        document
            .select(&selector)
            .next()
            .map(|el| el.text().collect::<String>().trim().to_string())
            .filter(|payload| !payload.is_empty())
    }

    fn map_story(url: &str, story: Story) -> std::result::Result<ArticleRecord, ExtractionError> {
        if is_non_article_template(&story.story_template) {
            return Err(ExtractionError::NotAnArticle);
        }

        let headline = story
            .headline
            .filter(|h| !h.trim().is_empty())
            .ok_or_else(|| ExtractionError::UpstreamShapeMismatch("story missing headline".into()))?;

        let author_name = story
            .author_name
            .or_else(|| story.authors.into_iter().flatten().next().and_then(|a| a.name))
            .filter(|name| !name.trim().is_empty())
            .ok_or_else(|| {
                ExtractionError::UpstreamShapeMismatch("story missing author-name".into())
            })?;

        let published_millis = story
            .published_at
            .or(story.first_published_at)
            .or(story.last_published_at)
            .ok_or_else(|| {
                ExtractionError::UpstreamShapeMismatch("story missing published-at".into())
            })?;
        let published_at = millis_to_utc(published_millis)?;
        let updated_at = match story.last_published_at {
            Some(millis) => millis_to_utc(millis)?,
            None => published_at,
        };

        let section = story
            .sections
            .into_iter()
            .next()
            .ok_or_else(|| ExtractionError::UpstreamShapeMismatch("story missing sections".into()))?;
        let section = Section {
            display_name: section.display_name.unwrap_or_else(|| section.name.clone()),
            name: section.slug.unwrap_or(section.name),
        };

        let tags = story
            .tags
            .into_iter()
            .map(|tag| Tag {
                name: tag.slug.unwrap_or_else(|| tag.name.clone()),
                display_name: tag.name,
            })
            .collect();

        let image = story.hero_image_s3_key.map(|key| {
            let metadata = story.hero_image_metadata.unwrap_or_default();
            Image {
                src: format!("{}/{}", Self::IMAGE_CDN, key.trim_start_matches('/')),
                width: metadata.width.unwrap_or(0).max(0) as u32,
                height: metadata.height.unwrap_or(0).max(0) as u32,
                alt: story.hero_image_caption,
            }
        });

        let mut body = Vec::new();
        for card in story.cards {
            for element in card.story_elements {
                match element.kind.as_str() {
                    "text" => {
                        let text = utils::fragment_text(&element.text.unwrap_or_default());
                        if !text.is_empty() {
                            body.push(BodyBlock::text(text));
                        }
                    }
                    // Hero duplicates and card titles carry no body text.
                    "image" | "title" => {}
                    other => return Err(ExtractionError::NonPlainBody(other.to_string())),
                }
            }
        }

        utils::finish(ArticleRecord {
            url: url.to_string(),
            source: Source::ProthomAlo,
            headline,
            author: Author { name: author_name },
            published_at,
            updated_at,
            section,
            tags,
            image,
            body,
            signature: None,
        })
    }
}

impl Default for ProthomAloScraper {
    fn default() -> Self {
        Self::new()
    }
}

fn millis_to_utc(millis: i64) -> std::result::Result<DateTime<Utc>, ExtractionError> {
    Utc.timestamp_millis_opt(millis).single().ok_or_else(|| {
        ExtractionError::UpstreamShapeMismatch(format!("timestamp out of range: {}", millis))
    })
}

fn is_non_article_template(template: &Option<String>) -> bool {
    matches!(template.as_deref(), Some("video") | Some("live-blog"))
}

/// Flattens the homepage's nested story collections into leaf URLs with an
/// explicit owned stack; collections nest arbitrarily deep and recursion is
/// avoided on purpose. Pushing children in reverse keeps document order.
fn flatten_story_urls(items: Vec<CollectionNode>) -> Vec<String> {
    let mut stack: Vec<CollectionNode> = items.into_iter().rev().collect();
    let mut urls = Vec::new();

    while let Some(node) = stack.pop() {
        match node {
            CollectionNode::Story { story } => {
                if is_non_article_template(&story.story_template) {
                    continue;
                }
                if let Some(url) = story.url {
                    urls.push(url);
                }
            }
            CollectionNode::Collection { items } => stack.extend(items.into_iter().rev()),
        }
    }

    urls
}

#[derive(Debug, Deserialize)]
struct StaticPage {
    qt: Qt,
}

#[derive(Debug, Deserialize)]
struct Qt {
    data: QtData,
}

#[derive(Debug, Default, Deserialize)]
struct QtData {
    #[serde(default)]
    collection: Option<HomeCollection>,
    #[serde(default)]
    story: Option<Story>,
}

#[derive(Debug, Deserialize)]
struct HomeCollection {
    #[serde(default)]
    items: Vec<CollectionNode>,
}

/// `collection | story` node in the homepage graph.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum CollectionNode {
    Story { story: StoryStub },
    Collection {
        #[serde(default)]
        items: Vec<CollectionNode>,
    },
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct StoryStub {
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    story_template: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct Story {
    #[serde(default)]
    headline: Option<String>,
    #[serde(default)]
    author_name: Option<String>,
    #[serde(default)]
    authors: Option<Vec<StoryAuthor>>,
    #[serde(default)]
    tags: Vec<StoryTag>,
    #[serde(default)]
    sections: Vec<StorySection>,
    #[serde(default)]
    story_template: Option<String>,
    #[serde(default)]
    published_at: Option<i64>,
    #[serde(default)]
    first_published_at: Option<i64>,
    #[serde(default)]
    last_published_at: Option<i64>,
    #[serde(default)]
    hero_image_s3_key: Option<String>,
    #[serde(default)]
    hero_image_metadata: Option<ImageMetadata>,
    #[serde(default)]
    hero_image_caption: Option<String>,
    #[serde(default)]
    cards: Vec<Card>,
}

#[derive(Debug, Deserialize)]
struct StoryAuthor {
    #[serde(default)]
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct StoryTag {
    name: String,
    #[serde(default)]
    slug: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct StorySection {
    name: String,
    #[serde(default)]
    slug: Option<String>,
    #[serde(default)]
    display_name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct ImageMetadata {
    #[serde(default)]
    width: Option<i64>,
    #[serde(default)]
    height: Option<i64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct Card {
    #[serde(default)]
    story_elements: Vec<StoryElement>,
}

#[derive(Debug, Deserialize)]
struct StoryElement {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: Option<String>,
}

#[async_trait]
impl Scraper for ProthomAloScraper {
    fn source(&self) -> Source {
        Source::ProthomAlo
    }

    fn can_handle(&self, url: &str) -> bool {
        url.contains("prothomalo.com")
    }

    async fn discover_links(&self, limit: Option<i64>) -> Result<Vec<String>> {
        let limit = utils::check_limit(limit)?;
        let html = utils::fetch_text(Self::BASE_URL).await?;
        let document = Html::parse_document(&html);

        let payload = Self::static_page_payload(&document)
            .ok_or_else(|| Error::Scraping("missing static-page payload on homepage".into()))?;
        let page: StaticPage = serde_json::from_str(&payload)?;
        let collection = page
            .qt
            .data
            .collection
            .ok_or_else(|| Error::Scraping("homepage payload has no collection".into()))?;

        utils::finalize_links(self.source(), flatten_story_urls(collection.items), limit)
    }

    async fn extract(&self, url: &str) -> std::result::Result<ArticleRecord, ExtractionError> {
        let html = utils::fetch_text(url).await?;
        let document = Html::parse_document(&html);

        let payload = Self::static_page_payload(&document).ok_or_else(|| {
            ExtractionError::UpstreamShapeMismatch("missing static-page payload".into())
        })?;
        let page: StaticPage = serde_json::from_str(&payload)
            .map_err(|e| ExtractionError::UpstreamShapeMismatch(e.to_string()))?;
        let story = page
            .qt
            .data
            .story
            .ok_or_else(|| ExtractionError::UpstreamShapeMismatch("payload has no story".into()))?;

        Self::map_story(url, story)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use khobor_core::Error;

    const HOME_PAYLOAD: &str = r#"{
        "qt": { "data": { "collection": { "items": [
            { "type": "collection", "items": [
                { "type": "story", "story": { "url": "https://www.prothomalo.com/bangladesh/a1" } },
                { "type": "collection", "items": [
                    { "type": "story", "story": { "url": "https://www.prothomalo.com/sports/a2" } }
                ] }
            ] },
            { "type": "collection", "items": [
                { "type": "story", "story": { "url": "https://www.prothomalo.com/video/v1", "story-template": "video" } },
                { "type": "story", "story": { "url": "https://www.prothomalo.com/world/a3" } }
            ] }
        ] } } }
    }"#;

    fn story_json(extra: &str) -> String {
        format!(
            r#"{{
                "headline": "Test headline",
                "author-name": "Staff Correspondent",
                "tags": [ {{ "name": "Dhaka", "slug": "dhaka" }} ],
                "sections": [ {{ "name": "Bangladesh", "slug": "bangladesh" }} ],
                "first-published-at": 1704191400000,
                "last-published-at": 1704195000000,
                "hero-image-s3-key": "prothomalo/import/media/2024/photo.jpg",
                "hero-image-metadata": {{ "width": 1200, "height": 675 }},
                "hero-image-caption": "A caption",
                "cards": [ {{ "story-elements": [
                    {{ "type": "text", "text": "<p>First paragraph.</p>" }},
                    {{ "type": "image" }},
                    {{ "type": "text", "text": "<p>Second paragraph.</p>" }}
                ] }} ]
                {extra}
            }}"#
        )
    }

    const STORY_URL: &str = "https://www.prothomalo.com/bangladesh/a1";

    #[test]
    fn flattens_nested_collections_in_document_order() {
        let page: StaticPage = serde_json::from_str(HOME_PAYLOAD).unwrap();
        let urls = flatten_story_urls(page.qt.data.collection.unwrap().items);
        assert_eq!(
            urls,
            vec![
                "https://www.prothomalo.com/bangladesh/a1",
                "https://www.prothomalo.com/sports/a2",
                "https://www.prothomalo.com/world/a3",
            ]
        );
    }

    #[test]
    fn maps_a_full_story() {
        let story: Story = serde_json::from_str(&story_json("")).unwrap();
        let record = ProthomAloScraper::map_story(STORY_URL, story).unwrap();

        assert_eq!(record.headline, "Test headline");
        assert_eq!(record.author.name, "Staff Correspondent");
        assert_eq!(record.published_at.timestamp_millis(), 1704191400000);
        assert_eq!(record.updated_at.timestamp_millis(), 1704195000000);
        assert_eq!(record.section.name, "bangladesh");
        assert_eq!(record.tags[0].name, "dhaka");
        let image = record.image.unwrap();
        assert_eq!(
            image.src,
            "https://images.prothomalo.com/prothomalo/import/media/2024/photo.jpg"
        );
        assert_eq!(image.width, 1200);
        assert_eq!(record.body.len(), 2);
        assert!(record.signature.is_none());
    }

    #[test]
    fn video_story_is_not_an_article() {
        let story: Story =
            serde_json::from_str(&story_json(r#", "story-template": "video""#)).unwrap();
        let result = ProthomAloScraper::map_story(STORY_URL, story);
        assert!(matches!(result, Err(ExtractionError::NotAnArticle)));
    }

    #[test]
    fn gallery_element_is_non_plain_body() {
        let json = story_json("").replace(r#""type": "image""#, r#""type": "composite""#);
        let story: Story = serde_json::from_str(&json).unwrap();
        let result = ProthomAloScraper::map_story(STORY_URL, story);
        match result {
            Err(ExtractionError::NonPlainBody(kind)) => assert_eq!(kind, "composite"),
            other => panic!("expected NonPlainBody, got {:?}", other.map(|r| r.url)),
        }
    }

    #[test]
    fn missing_required_fields_are_shape_mismatches() {
        let json = story_json("").replace(r#""author-name": "Staff Correspondent","#, "");
        let story: Story = serde_json::from_str(&json).unwrap();
        let result = ProthomAloScraper::map_story(STORY_URL, story);
        assert!(matches!(
            result,
            Err(ExtractionError::UpstreamShapeMismatch(_))
        ));
    }

    #[test]
    fn unknown_node_types_fail_the_homepage_decode() {
        let payload = r#"{ "qt": { "data": { "collection": { "items": [
            { "type": "advert", "slot": "top" }
        ] } } } }"#;
        assert!(serde_json::from_str::<StaticPage>(payload).is_err());
    }

    #[tokio::test]
    async fn zero_limit_is_rejected_before_any_fetch() {
        let scraper = ProthomAloScraper::new();
        let result = scraper.discover_links(Some(0)).await;
        assert!(matches!(result, Err(Error::InvalidLimit(0))));
    }
}
