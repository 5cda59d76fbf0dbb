//! Page scan: classify every course link on a page and the page itself.

pub mod container;


use crate::classify::{BadgeFlags, classify_text};
use crate::config::ScanConfig;
use crate::error::ScanError;
use crate::filter::UrlFilter;
use crate::page::{HtmlPage, PageAccessor};
use crate::parsers::html;
use crate::results::{CourseLink, CourseLinkSet, ScanResponse, ScanResult};
use container::{ContainerFinder, ScanCache};
use scraper::ElementRef;
use std::path::Path;

/// Classifies course links on pages according to a [`ScanConfig`]
#[derive(Debug, Clone)]
pub struct Scanner {
    config: ScanConfig,
    filter: UrlFilter,
}

impl Default for Scanner {
    fn default() -> Self {
        Self::new()
    }
}

impl Scanner {
    /// Create a scanner with default settings
    pub fn new() -> Self {
        Self::from_config_unchecked(ScanConfig::default())
    }

    /// Apply a configuration
    pub fn with_config(self, config: ScanConfig) -> Result<Self, ScanError> {
        config.validate()?;
        Ok(Self::from_config_unchecked(config))
    }

    /// Load configuration from a JSON file
    pub fn with_config_file(self, path: impl AsRef<Path>) -> Result<Self, ScanError> {
        let config = ScanConfig::from_file(path)?;
        Ok(Self::from_config_unchecked(config))
    }

    /// Apply configuration from a JSON string
    pub fn with_config_str(self, json: &str) -> Result<Self, ScanError> {
        let config = ScanConfig::from_json(json)?;
        Ok(Self::from_config_unchecked(config))
    }

    fn from_config_unchecked(config: ScanConfig) -> Self {
        let filter = UrlFilter::new(config.url_filter.clone());
        Self { config, filter }
    }

    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    pub fn filter(&self) -> &UrlFilter {
        &self.filter
    }

    /// Scan one page.
    ///
    /// Every hyperlink resolving to a course URL is classified from the text
    /// of its container, duplicates are merged by severity, and the page's
    /// own canonical URL is classified from the full page text.
    pub fn scan(&self, page: &dyn PageAccessor) -> ScanResult {
        let base = page.url();
        let body = page.body();
        let finder = ContainerFinder::new(&self.filter, base, &self.config.container);
        let mut cache = ScanCache::new();
        let mut links = CourseLinkSet::new();
        let mut occurrences = 0;

        for link in html::links(body) {
            let Some(href) = link.value().attr("href") else {
                continue;
            };
            let Some(url) = self.filter.course_url(href, Some(base)) else {
                continue;
            };
            occurrences += 1;

            let selection = finder.select(link, &mut cache);
            let badges = BadgeFlags {
                free: selection.has_free_badge,
                preview: selection.has_preview_badge,
            };
            let verdict = classify_text(&selection.text, badges);
            ::log::trace!(
                "{} -> {} via <{}> (score {:?}): {}",
                url,
                verdict.classification,
                selection.container.value().name(),
                selection.score,
                verdict.reason
            );

            let label = link_label(link, &url);
            links.merge(CourseLink::new(url, label, verdict));
        }

        let page_text = html::visible_text(body);
        let page_verdict = classify_text(&page_text, BadgeFlags::default());
        let page_title = page.title().unwrap_or_default();

        let canonical = page
            .canonical_href()
            .and_then(|href| self.filter.course_url(&href, Some(base)));
        if let Some(canonical) = canonical {
            let label = if page_title.is_empty() {
                canonical.clone()
            } else {
                page_title.clone()
            };
            ::log::debug!(
                "Canonical course {} classified {} at page level",
                canonical,
                page_verdict.classification
            );
            links.apply_page_verdict(canonical, label, page_verdict.clone());
        }

        ::log::debug!(
            "Scanned {}: {} course link occurrences, {} distinct, {} nodes measured, {} badge lookups cached",
            base,
            occurrences,
            links.len(),
            cache.measured_nodes(),
            cache.badge_lookups()
        );

        ScanResult::new(base.to_string(), page_title, page_verdict, links)
    }

    /// Parse and scan HTML served at `page_url`
    pub fn scan_html(&self, html: &str, page_url: &str) -> Result<ScanResult, ScanError> {
        let page = HtmlPage::parse(html, page_url)?;
        Ok(self.scan(&page))
    }

    /// Load and scan a saved page
    pub fn scan_file(&self, path: impl AsRef<Path>, base_url: Option<&str>) -> Result<ScanResult, ScanError> {
        let page = HtmlPage::from_file(path, base_url, &self.config.default_base_url)?;
        Ok(self.scan(&page))
    }

    /// Scan a saved page and wrap the outcome in a response envelope
    pub fn respond_file(&self, path: impl AsRef<Path>, base_url: Option<&str>) -> ScanResponse {
        let path = path.as_ref();
        let outcome = self.scan_file(path, base_url);
        if let Err(e) = &outcome {
            ::log::error!("Scan of {} failed: {}", path.display(), e);
        }
        ScanResponse::from_result(outcome)
    }
}

/// Display text of a link: visible text, then `aria-label`, then `title`, then the URL
fn link_label(link: ElementRef<'_>, url: &str) -> String {
    let text = html::visible_text(link);
    if !text.is_empty() {
        return text;
    }
    ["aria-label", "title"]
        .iter()
        .filter_map(|attr| link.value().attr(attr))
        .map(crate::parsers::text::collapse_whitespace)
        .find(|label| !label.is_empty())
        .unwrap_or_else(|| url.to_string())
}
