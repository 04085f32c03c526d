use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use crate::models::ArticleRecord;

/// One structural violation, keyed by the canonical field it concerns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationIssue {
    pub field: String,
    pub message: String,
}

impl ValidationIssue {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Every violation found in one validation pass, not just the first, so a
/// markup change at the publisher produces one complete diagnostic.
#[derive(Debug, Clone, Error, Serialize, Deserialize)]
#[error("{} validation issue(s): {}", .issues.len(), summary(.issues))]
pub struct ValidationErrors {
    pub issues: Vec<ValidationIssue>,
}

fn summary(issues: &[ValidationIssue]) -> String {
    issues
        .iter()
        .map(|i| format!("{}: {}", i.field, i.message))
        .collect::<Vec<_>>()
        .join("; ")
}

/// Structural checks independent of source, applied as the single trust
/// boundary before a record may reach storage.
pub fn validate(record: &ArticleRecord) -> std::result::Result<(), ValidationErrors> {
    let mut issues = Vec::new();

    check_absolute_url(&mut issues, "url", &record.url);
    check_non_empty(&mut issues, "headline", &record.headline);
    check_non_empty(&mut issues, "author.name", &record.author.name);
    check_non_empty(&mut issues, "section.name", &record.section.name);
    check_non_empty(&mut issues, "section.display_name", &record.section.display_name);

    for (i, tag) in record.tags.iter().enumerate() {
        check_non_empty(&mut issues, &format!("tags[{}].name", i), &tag.name);
        check_non_empty(
            &mut issues,
            &format!("tags[{}].display_name", i),
            &tag.display_name,
        );
    }

    if let Some(image) = &record.image {
        check_absolute_url(&mut issues, "image.src", &image.src);
    }

    if record.body.is_empty() {
        issues.push(ValidationIssue::new("body", "must not be empty"));
    }
    for (i, block) in record.body.iter().enumerate() {
        let crate::models::BodyBlock::Text { text } = block;
        check_non_empty(&mut issues, &format!("body[{}].text", i), text);
    }

    if record.published_at > record.updated_at {
        issues.push(ValidationIssue::new(
            "updated_at",
            "must not precede published_at",
        ));
    }

    if issues.is_empty() {
        Ok(())
    } else {
        Err(ValidationErrors { issues })
    }
}

fn check_non_empty(issues: &mut Vec<ValidationIssue>, field: &str, value: &str) {
    if value.trim().is_empty() {
        issues.push(ValidationIssue::new(field, "must not be empty"));
    }
}

fn check_absolute_url(issues: &mut Vec<ValidationIssue>, field: &str, value: &str) {
    if value.is_empty() {
        issues.push(ValidationIssue::new(field, "must not be empty"));
        return;
    }
    match Url::parse(value) {
        Ok(url) if url.host().is_some() => {}
        _ => issues.push(ValidationIssue::new(field, "must be an absolute URL")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Author, BodyBlock, Image, Section, Source, Tag};
    use chrono::{TimeZone, Utc};

    fn valid_record() -> ArticleRecord {
        ArticleRecord {
            url: "https://www.bd-pratidin.com/city/2024/01/02/123456".to_string(),
            source: Source::BdPratidin,
            headline: "A headline".to_string(),
            author: Author {
                name: "Staff Reporter".to_string(),
            },
            published_at: Utc.with_ymd_and_hms(2024, 1, 2, 4, 30, 0).unwrap(),
            updated_at: Utc.with_ymd_and_hms(2024, 1, 2, 5, 0, 0).unwrap(),
            section: Section {
                name: "city".to_string(),
                display_name: "City".to_string(),
            },
            tags: vec![Tag {
                name: "dhaka".to_string(),
                display_name: "Dhaka".to_string(),
            }],
            image: Some(Image {
                src: "https://cdn.bd-pratidin.com/photo.jpg".to_string(),
                width: 800,
                height: 450,
                alt: None,
            }),
            body: vec![BodyBlock::text("First paragraph.")],
            signature: Some("বিডি প্রতিদিন/এমআই".to_string()),
        }
    }

    #[test]
    fn accepts_a_well_formed_record() {
        assert!(validate(&valid_record()).is_ok());
    }

    #[test]
    fn rejects_empty_body() {
        let mut record = valid_record();
        record.body.clear();
        let errors = validate(&record).unwrap_err();
        assert!(errors.issues.iter().any(|i| i.field == "body"));
    }

    #[test]
    fn collects_every_violation_in_one_pass() {
        let mut record = valid_record();
        record.headline.clear();
        record.url = "not-a-url".to_string();
        record.body.clear();
        let errors = validate(&record).unwrap_err();
        let fields: Vec<_> = errors.issues.iter().map(|i| i.field.as_str()).collect();
        assert!(fields.contains(&"headline"));
        assert!(fields.contains(&"url"));
        assert!(fields.contains(&"body"));
        assert_eq!(errors.issues.len(), 3);
    }

    #[test]
    fn rejects_updated_before_published() {
        let mut record = valid_record();
        record.updated_at = record.published_at - chrono::Duration::hours(1);
        let errors = validate(&record).unwrap_err();
        assert!(errors.issues.iter().any(|i| i.field == "updated_at"));
    }

    #[test]
    fn rejects_relative_image_src() {
        let mut record = valid_record();
        record.image.as_mut().unwrap().src = "/photo.jpg".to_string();
        let errors = validate(&record).unwrap_err();
        assert!(errors.issues.iter().any(|i| i.field == "image.src"));
    }

    #[test]
    fn rejects_blank_body_block() {
        let mut record = valid_record();
        record.body = vec![BodyBlock::text("  ")];
        let errors = validate(&record).unwrap_err();
        assert!(errors.issues.iter().any(|i| i.field == "body[0].text"));
    }
}
