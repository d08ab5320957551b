pub mod error;
pub mod fetch;
pub mod loader;
pub mod output;
pub mod scrape;
pub mod series;
pub mod source;
pub mod stats;
