use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The publishers we ingest from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Source {
    BdPratidin,
    ProthomAlo,
    DailyStar,
}

impl Source {
    pub fn all() -> [Source; 3] {
        [Source::BdPratidin, Source::ProthomAlo, Source::DailyStar]
    }

    /// Machine tag used in routes, CLI arguments and storage.
    pub fn tag(&self) -> &'static str {
        match self {
            Source::BdPratidin => "bd-pratidin",
            Source::ProthomAlo => "prothom-alo",
            Source::DailyStar => "daily-star",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Source::BdPratidin => "Bangladesh Pratidin",
            Source::ProthomAlo => "Prothom Alo",
            Source::DailyStar => "The Daily Star",
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for Source {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "bd-pratidin" | "bdpratidin" => Ok(Source::BdPratidin),
            "prothom-alo" | "prothomalo" => Ok(Source::ProthomAlo),
            "daily-star" | "dailystar" | "the-daily-star" => Ok(Source::DailyStar),
            other => Err(format!("unknown source: {}", other)),
        }
    }
}

/// Canonical article shape, identical for every source. Only records that
/// passed validation reach storage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArticleRecord {
    pub url: String,
    pub source: Source,
    pub headline: String,
    pub author: Author,
    pub published_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub section: Section,
    pub tags: Vec<Tag>,
    pub image: Option<Image>,
    pub body: Vec<BodyBlock>,
    pub signature: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Author {
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Section {
    pub name: String,
    pub display_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tag {
    pub name: String,
    pub display_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Image {
    pub src: String,
    pub width: u32,
    pub height: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alt: Option<String>,
}

/// One block of article body content. Tagged so new block kinds can be added
/// without breaking stored records.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum BodyBlock {
    Text { text: String },
}

impl BodyBlock {
    pub fn text(text: impl Into<String>) -> Self {
        BodyBlock::Text { text: text.into() }
    }
}
