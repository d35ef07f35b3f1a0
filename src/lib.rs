pub mod config;
pub mod delta;
pub mod fetch;
pub mod models;
pub mod monitor;
pub mod notify;
pub mod parsers;
pub mod storage;
pub mod utils;
