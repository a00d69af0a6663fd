//! CLI command handlers, one per file.

mod check;
mod config;
mod generate;
mod url;

pub use check::run_check;
pub use config::run_config;
pub use generate::run_generate;
pub use url::run_url;
