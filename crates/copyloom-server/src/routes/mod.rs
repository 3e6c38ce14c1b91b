pub mod clients;
pub mod completeness;
pub mod config;
pub mod contents;
pub mod events;
pub mod generate;
pub mod knowledge;
