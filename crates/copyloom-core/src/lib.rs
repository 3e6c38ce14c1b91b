pub mod client;
pub mod completeness;
pub mod config;
pub mod content;
pub mod error;
pub mod io;
pub mod knowledge;
pub mod paths;
pub mod progress;
pub mod readiness;
pub mod store;
pub mod types;

pub use error::{CopyloomError, Result};
