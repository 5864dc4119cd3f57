pub mod api;
pub mod config;
pub mod contracts;
pub mod storage;
