pub mod classify;
pub mod handlers;
pub mod storage;
