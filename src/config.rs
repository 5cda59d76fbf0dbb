use crate::error::ScanError;
use crate::filter::UrlFilterConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Weights and limits used when picking the container around a course link.
///
/// The defaults are hand-tuned; any field may be overridden from JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContainerConfig {
    /// How many ancestors of a link are inspected
    pub max_ancestor_levels: usize,
    /// Minimum number of hyperlinks a candidate contains
    pub min_links: usize,
    /// Maximum number of hyperlinks a candidate contains
    pub max_links: usize,
    /// Maximum number of course hyperlinks a candidate contains
    pub max_course_links: usize,
    /// Minimum visible text length, in characters
    pub min_text_chars: usize,

    pub single_course_link_bonus: i32,
    /// Upper bound (inclusive) of the "few course links" range starting at 2
    pub few_course_links_max: usize,
    pub few_course_links_bonus: i32,
    pub card_hint_bonus: i32,
    pub media_bonus: i32,
    pub badge_bonus: i32,

    /// Text length above which a candidate is penalised
    pub long_text_chars: usize,
    pub long_text_penalty: i32,
}

impl Default for ContainerConfig {
    fn default() -> Self {
        Self {
            max_ancestor_levels: 10,
            min_links: 1,
            max_links: 40,
            max_course_links: 6,
            min_text_chars: 30,
            single_course_link_bonus: 6,
            few_course_links_max: 3,
            few_course_links_bonus: 3,
            card_hint_bonus: 2,
            media_bonus: 1,
            badge_bonus: 5,
            long_text_chars: 2500,
            long_text_penalty: 3,
        }
    }
}

/// Top-level scanner configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanConfig {
    /// URL canonicalisation and course-path rules
    #[serde(default)]
    pub url_filter: UrlFilterConfig,

    /// Container selection heuristics
    #[serde(default)]
    pub container: ContainerConfig,

    /// Page URL assumed for saved pages that carry no canonical link
    #[serde(default = "default_base_url")]
    pub default_base_url: String,
}

/// Default value for default_base_url
pub fn default_base_url() -> String {
    "https://www.coursera.org".to_string()
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            url_filter: UrlFilterConfig::default(),
            container: ContainerConfig::default(),
            default_base_url: default_base_url(),
        }
    }
}

impl ScanConfig {
    /// Load configuration from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ScanError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| ScanError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&contents)
    }

    /// Load configuration from a JSON string
    pub fn from_json(json: &str) -> Result<Self, ScanError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings under which no link could ever be classified
    pub fn validate(&self) -> Result<(), ScanError> {
        let container = &self.container;
        if container.min_links > container.max_links {
            return Err(ScanError::InvalidConfig(format!(
                "container.min_links ({}) exceeds container.max_links ({})",
                container.min_links, container.max_links
            )));
        }
        if self.url_filter.required_host.trim().is_empty() {
            return Err(ScanError::InvalidConfig(
                "url_filter.required_host must not be empty".to_string(),
            ));
        }
        if self.url_filter.course_path_prefixes.is_empty() {
            return Err(ScanError::InvalidConfig(
                "url_filter.course_path_prefixes must not be empty".to_string(),
            ));
        }
        url::Url::parse(&self.default_base_url).map_err(|source| ScanError::InvalidPageUrl {
            url: self.default_base_url.clone(),
            source,
        })?;
        Ok(())
    }
}
