pub mod query;
pub mod score;
pub mod static_index;
