pub mod feed;
pub mod handlers;
pub mod hub;
pub mod repo;
