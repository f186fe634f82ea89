pub mod handlers;
pub mod repo;
