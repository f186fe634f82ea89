// Deal pipeline: filtered listing and CRUD over the in-memory store.

pub mod handlers;
pub mod repo;
