pub mod error;
pub mod models;
pub mod storage;
pub mod validate;

pub use error::Error;
pub use models::{ArticleRecord, Author, BodyBlock, Image, Section, Source, Tag};
pub use storage::ArticleStore;
pub use validate::{ValidationErrors, ValidationIssue};

pub type Result<T> = std::result::Result<T, Error>;
