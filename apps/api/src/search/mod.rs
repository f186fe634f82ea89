pub mod handlers;
pub mod relevance;
