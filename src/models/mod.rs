pub mod article;

pub use article::{ArticleRecord, ContentType, RankedArticle};
