//! Classify course links on saved course-listing pages as truly free, paid
//! or preview-only, or unknown.

pub mod classify;
pub mod config;
pub mod error;
pub mod filter;
pub mod page;
pub mod parsers;
pub mod results;
pub mod scan;
pub mod utils;

// Re-export commonly used types for convenience
pub use classify::{BadgeFlags, classify_text};
pub use config::ScanConfig;
pub use error::ScanError;
pub use filter::UrlFilter;
pub use page::{HtmlPage, PageAccessor};
pub use results::{Classification, CourseLink, ScanCounts, ScanResponse, ScanResult};
pub use scan::Scanner;
