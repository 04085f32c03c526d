use async_trait::async_trait;
use khobor_core::{ArticleRecord, ArticleStore, Error, Result, Source};
use std::collections::HashSet;
use tokio::sync::RwLock;

/// In-memory reference store. Implements the same contract a database-backed
/// gateway would, including the loud duplicate-url failure on insert.
#[derive(Default)]
pub struct MemoryStore {
    records: RwLock<Vec<ArticleRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn records(&self) -> Vec<ArticleRecord> {
        self.records.read().await.clone()
    }
}

#[async_trait]
impl ArticleStore for MemoryStore {
    async fn find_existing_urls(
        &self,
        source: Source,
        urls: &[String],
    ) -> Result<HashSet<String>> {
        let records = self.records.read().await;
        Ok(records
            .iter()
            .filter(|record| record.source == source && urls.contains(&record.url))
            .map(|record| record.url.clone())
            .collect())
    }

    async fn bulk_insert(&self, records: &[ArticleRecord]) -> Result<()> {
        let mut stored = self.records.write().await;

        // All-or-nothing: reject the whole batch before touching the store.
        let mut batch_urls = HashSet::new();
        for record in records {
            if !batch_urls.insert(record.url.as_str())
                || stored.iter().any(|existing| existing.url == record.url)
            {
                return Err(Error::DuplicateUrl(record.url.clone()));
            }
        }

        stored.extend(records.iter().cloned());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use khobor_core::{Author, BodyBlock, Section};

    fn record(url: &str, source: Source) -> ArticleRecord {
        let published_at = Utc.with_ymd_and_hms(2024, 1, 2, 4, 30, 0).unwrap();
        ArticleRecord {
            url: url.to_string(),
            source,
            headline: "Headline".to_string(),
            author: Author {
                name: "Staff Correspondent".to_string(),
            },
            published_at,
            updated_at: published_at,
            section: Section {
                name: "news".to_string(),
                display_name: "News".to_string(),
            },
            tags: vec![],
            image: None,
            body: vec![BodyBlock::text("Paragraph.")],
            signature: None,
        }
    }

    #[tokio::test]
    async fn existence_check_is_scoped_to_the_source() {
        let store = MemoryStore::new();
        store
            .bulk_insert(&[record("https://a/1", Source::DailyStar)])
            .await
            .unwrap();

        let urls = vec!["https://a/1".to_string(), "https://a/2".to_string()];
        let existing = store
            .find_existing_urls(Source::DailyStar, &urls)
            .await
            .unwrap();
        assert_eq!(existing.len(), 1);
        assert!(existing.contains("https://a/1"));

        let other = store
            .find_existing_urls(Source::ProthomAlo, &urls)
            .await
            .unwrap();
        assert!(other.is_empty());
    }

    #[tokio::test]
    async fn duplicate_insert_fails_loudly_and_changes_nothing() {
        let store = MemoryStore::new();
        store
            .bulk_insert(&[record("https://a/1", Source::DailyStar)])
            .await
            .unwrap();

        let result = store
            .bulk_insert(&[
                record("https://a/2", Source::DailyStar),
                record("https://a/1", Source::DailyStar),
            ])
            .await;
        assert!(matches!(result, Err(Error::DuplicateUrl(url)) if url == "https://a/1"));
        assert_eq!(store.records().await.len(), 1);
    }

    #[tokio::test]
    async fn duplicate_inside_one_batch_is_rejected() {
        let store = MemoryStore::new();
        let result = store
            .bulk_insert(&[
                record("https://a/1", Source::DailyStar),
                record("https://a/1", Source::DailyStar),
            ])
            .await;
        assert!(matches!(result, Err(Error::DuplicateUrl(_))));
        assert!(store.records().await.is_empty());
    }
}
