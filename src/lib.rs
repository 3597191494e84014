pub mod battlelog;
pub mod battlelog_fetch;
pub mod config;
pub mod google_auth;
pub mod http_client;
pub mod pipeline;
pub mod row_store;
pub mod sheets;
pub mod sink;
pub mod sqlite_store;
