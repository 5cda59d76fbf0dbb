use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use url::Url;

static DUPLICATE_SLASHES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/{2,}").expect("slash pattern is valid"));

/// Configuration for recognising and canonicalising course URLs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UrlFilterConfig {
    /// Host every course URL must live on, compared after stripping `www.`
    #[serde(default = "default_required_host")]
    pub required_host: String,

    /// Path prefixes that mark a URL as a course page
    #[serde(default = "default_course_path_prefixes")]
    pub course_path_prefixes: Vec<String>,

    /// Query keys starting with any of these (case-insensitive) are dropped
    #[serde(default = "default_tracking_param_prefixes")]
    pub tracking_param_prefixes: Vec<String>,

    /// Query keys equal to any of these (case-insensitive) are dropped
    #[serde(default = "default_tracking_params")]
    pub tracking_params: Vec<String>,
}

fn default_required_host() -> String {
    "coursera.org".to_string()
}

fn default_course_path_prefixes() -> Vec<String> {
    ["/learn/", "/specializations/", "/professional-certificates/", "/projects/"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_tracking_param_prefixes() -> Vec<String> {
    vec!["utm_".to_string()]
}

fn default_tracking_params() -> Vec<String> {
    ["fbclid", "gclid", "ref", "referral", "trk"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

impl Default for UrlFilterConfig {
    fn default() -> Self {
        Self {
            required_host: default_required_host(),
            course_path_prefixes: default_course_path_prefixes(),
            tracking_param_prefixes: default_tracking_param_prefixes(),
            tracking_params: default_tracking_params(),
        }
    }
}

/// Canonicalises links and decides which of them point at course pages
#[derive(Debug, Clone)]
pub struct UrlFilter {
    config: UrlFilterConfig,
}

impl Default for UrlFilter {
    fn default() -> Self {
        Self::new(UrlFilterConfig::default())
    }
}

impl UrlFilter {
    /// Create a new URL filter from configuration
    pub fn new(mut config: UrlFilterConfig) -> Self {
        config.required_host = config.required_host.to_ascii_lowercase();
        config.tracking_param_prefixes = lowercase_all(&config.tracking_param_prefixes);
        config.tracking_params = lowercase_all(&config.tracking_params);
        Self { config }
    }

    pub fn config(&self) -> &UrlFilterConfig {
        &self.config
    }

    /// Normalize a raw href into its canonical course identity.
    ///
    /// Relative references are resolved against `base`. Returns `None` for
    /// anything that cannot be parsed, is not http(s), carries credentials or
    /// an explicit port, or lives on another host. The result always uses `https`, the bare host, no fragment, no
    /// tracking parameters, collapsed slashes and no trailing slash (except
    /// for the root path). Normalizing an already normalized URL is a no-op.
    pub fn normalize(&self, raw: &str, base: Option<&Url>) -> Option<String> {
        let raw = raw.trim();
        if raw.is_empty() {
            return None;
        }

        let parsed = match base {
            Some(base) => base.join(raw).ok()?,
            None => Url::parse(raw).ok()?,
        };

        if !matches!(parsed.scheme(), "http" | "https") {
            ::log::trace!("Rejecting non-http URL: {}", raw);
            return None;
        }

        if parsed.port().is_some() || !parsed.username().is_empty() || parsed.password().is_some() {
            ::log::trace!("Rejecting URL with explicit port or credentials: {}", raw);
            return None;
        }

        let host = bare_host(&parsed)?;
        if host != self.config.required_host {
            return None;
        }

        let kept: Vec<(String, String)> = parsed
            .query_pairs()
            .filter(|(key, _)| !self.is_tracking_param(key))
            .map(|(key, value)| (key.into_owned(), value.into_owned()))
            .collect();

        let mut path = DUPLICATE_SLASHES
            .replace_all(parsed.path(), "/")
            .into_owned();
        if path.len() > 1 && path.ends_with('/') {
            path.pop();
        }

        let mut canonical = Url::parse(&format!("https://{}", host)).ok()?;
        canonical.set_path(&path);
        if !kept.is_empty() {
            canonical.query_pairs_mut().extend_pairs(kept);
        }

        Some(canonical.to_string())
    }

    /// Whether an already normalized URL points at a course page
    pub fn is_course_url(&self, normalized: &str) -> bool {
        let Ok(url) = Url::parse(normalized) else {
            return false;
        };
        if bare_host(&url).as_deref() != Some(self.config.required_host.as_str()) {
            return false;
        }
        self.config
            .course_path_prefixes
            .iter()
            .any(|prefix| url.path().starts_with(prefix.as_str()))
    }

    /// Normalize and keep the result only when it is a course URL
    pub fn course_url(&self, raw: &str, base: Option<&Url>) -> Option<String> {
        self.normalize(raw, base)
            .filter(|normalized| self.is_course_url(normalized))
    }

    /// Check if a query key is a tracking parameter
    pub fn is_tracking_param(&self, key: &str) -> bool {
        let key = key.to_ascii_lowercase();
        self.config
            .tracking_param_prefixes
            .iter()
            .any(|prefix| key.starts_with(prefix.as_str()))
            || self.config.tracking_params.iter().any(|exact| *exact == key)
    }
}

/// Lowercase host with a leading `www.` removed
fn bare_host(url: &Url) -> Option<String> {
    let host = url.host_str()?.to_ascii_lowercase();
    Some(match host.strip_prefix("www.") {
        Some(stripped) => stripped.to_string(),
        None => host,
    })
}

fn lowercase_all(values: &[String]) -> Vec<String> {
    values.iter().map(|v| v.to_ascii_lowercase()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Url {
        Url::parse("https://www.coursera.org/search?query=python").unwrap()
    }

    #[test]
    fn test_removes_tracking_params_and_fragment() {
        let filter = UrlFilter::default();
        let normalized = filter.normalize(
            "https://www.coursera.org/learn/machine-learning?utm_source=newsletter&gclid=abc123&keep=yes#section",
            None,
        );
        assert_eq!(
            normalized.as_deref(),
            Some("https://coursera.org/learn/machine-learning?keep=yes")
        );
    }

    #[test]
    fn test_tracking_keys_are_case_insensitive() {
        let filter = UrlFilter::default();
        let normalized = filter.normalize(
            "https://coursera.org/learn/x?UTM_Campaign=a&a=1&FBCLID=2&Ref=3&b=2&trk=4&Referral=5",
            None,
        );
        assert_eq!(
            normalized.as_deref(),
            Some("https://coursera.org/learn/x?a=1&b=2")
        );
    }

    #[test]
    fn test_keeps_non_tracking_params_in_order() {
        let filter = UrlFilter::default();
        let normalized = filter.normalize("https://coursera.org/learn/x?z=1&utm_medium=m&a=2&m=3", None);
        assert_eq!(
            normalized.as_deref(),
            Some("https://coursera.org/learn/x?z=1&a=2&m=3")
        );
    }

    #[test]
    fn test_resolves_relative_against_base() {
        let filter = UrlFilter::default();
        let normalized = filter.normalize("/learn/python?utm_medium=email", Some(&base()));
        assert_eq!(normalized.as_deref(), Some("https://coursera.org/learn/python"));
    }

    #[test]
    fn test_forces_https_and_collapses_slashes() {
        let filter = UrlFilter::default();
        assert_eq!(
            filter
                .normalize("http://WWW.Coursera.org//learn///python/", None)
                .as_deref(),
            Some("https://coursera.org/learn/python")
        );
        assert_eq!(
            filter.normalize("https://coursera.org/", None).as_deref(),
            Some("https://coursera.org/")
        );
    }

    #[test]
    fn test_rejects_other_hosts_and_schemes() {
        let filter = UrlFilter::default();
        assert!(filter.normalize("https://example.com/learn/python", None).is_none());
        assert!(filter.normalize("https://blog.coursera.org/learn/python", None).is_none());
        assert!(filter.normalize("https://coursera.org.evil.com/learn/x", None).is_none());
        assert!(filter.normalize("ftp://coursera.org/learn/python", None).is_none());
        assert!(filter.normalize("javascript:void(0)", Some(&base())).is_none());
        assert!(filter.normalize("mailto:help@coursera.org", Some(&base())).is_none());
        assert!(filter.normalize("", Some(&base())).is_none());
        assert!(filter.normalize("not a url", None).is_none());
    }

    #[test]
    fn test_rejects_ports_and_credentials() {
        let filter = UrlFilter::default();
        assert!(filter.normalize("https://coursera.org:8443/learn/x", None).is_none());
        assert!(filter.normalize("https://evil@www.coursera.org/learn/x", None).is_none());
        assert!(filter.normalize("https://user:pw@coursera.org/learn/x", None).is_none());
        assert!(filter.course_url("//evil@coursera.org/learn/x", Some(&base())).is_none());
        // default ports are dropped by the parser and stay valid
        assert_eq!(
            filter.normalize("https://coursera.org:443/learn/x", None).as_deref(),
            Some("https://coursera.org/learn/x")
        );
    }

    #[test]
    fn test_normalization_is_idempotent() {
        let filter = UrlFilter::default();
        let inputs = [
            "https://www.coursera.org/learn/ml/?utm_source=x&q=a+b&lang=en#reviews",
            "http://coursera.org//specializations//data-science//",
            "https://coursera.org/learn/caf%C3%A9?x=%2F&y=",
            "https://coursera.org/",
            "https://coursera.org/projects/p?gclid=1",
        ];
        for input in inputs {
            let once = filter.normalize(input, None).unwrap();
            let twice = filter.normalize(&once, None).unwrap();
            assert_eq!(once, twice, "normalizing {} twice changed it", input);
        }
    }

    #[test]
    fn test_is_course_url() {
        let filter = UrlFilter::default();
        assert!(filter.is_course_url("https://coursera.org/learn/abc"));
        assert!(filter.is_course_url("https://coursera.org/specializations/abc"));
        assert!(filter.is_course_url("https://coursera.org/professional-certificates/abc"));
        assert!(filter.is_course_url("https://coursera.org/projects/abc"));
        assert!(!filter.is_course_url("https://coursera.org/search?query=learn"));
        assert!(!filter.is_course_url("https://coursera.org/learn"));
        assert!(!filter.is_course_url("https://example.com/learn/abc"));
    }

    #[test]
    fn test_course_url_combines_both_checks() {
        let filter = UrlFilter::default();
        assert_eq!(
            filter.course_url("/learn/python/#syllabus", Some(&base())).as_deref(),
            Some("https://coursera.org/learn/python")
        );
        assert!(filter.course_url("/browse/data-science", Some(&base())).is_none());
    }

    #[test]
    fn test_custom_host() {
        let config = UrlFilterConfig {
            required_host: "Example.Org".to_string(),
            ..UrlFilterConfig::default()
        };
        let filter = UrlFilter::new(config);
        assert_eq!(
            filter.course_url("https://www.example.org/learn/x", None).as_deref(),
            Some("https://example.org/learn/x")
        );
        assert!(filter.course_url("https://coursera.org/learn/x", None).is_none());
    }
}
