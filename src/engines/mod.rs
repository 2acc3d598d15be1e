//! Search provider adapters.
//!
//! Each module provides a struct implementing [`crate::engine::SearchEngine`]
//! for one provider: Google and Bing through their official JSON APIs,
//! DuckDuckGo by scraping the HTML-only results page.

pub mod bing;
pub mod duckduckgo;
pub mod google;

pub use bing::BingSearch;
pub use duckduckgo::DuckDuckGoSearch;
pub use google::GoogleSearch;
