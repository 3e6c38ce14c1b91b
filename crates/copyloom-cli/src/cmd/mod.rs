pub mod chat;
pub mod client;
pub mod completeness;
pub mod config;
pub mod content;
pub mod generate;
pub mod init;
pub mod kb;
pub mod readiness;
pub mod serve;
