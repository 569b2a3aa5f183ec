pub mod articles;

pub use articles::{
    ArticleStore, DateRange, HttpArticleStore, SearchOptions, SortBy, StoreError,
};
