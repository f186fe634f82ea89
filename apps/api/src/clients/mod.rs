// Client directory: listing, CRUD and the lead score assigned on creation.

pub mod handlers;
pub mod repo;
pub mod scoring;
