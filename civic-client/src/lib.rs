// Library interface for the civic client (used by the binary and tests)
pub mod api;
pub mod auth;
pub mod config;
pub mod fact_check;
pub mod logging;
pub mod session;
pub mod storage;
pub mod views;
pub mod votes;
