use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Outcome of classifying a course link or a page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Classification {
    /// Full audit access, no certificate requirement, no paywall language
    TrulyFree,
    /// Payment, trial, subscription or preview only
    PaidOrPreview,
    /// Not enough signal either way
    Unknown,
}

impl Classification {
    /// Rank used when merging duplicates: PAID_OR_PREVIEW > TRULY_FREE > UNKNOWN
    pub fn severity(self) -> u8 {
        match self {
            Classification::Unknown => 0,
            Classification::TrulyFree => 1,
            Classification::PaidOrPreview => 2,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Classification::TrulyFree => "TRULY_FREE",
            Classification::PaidOrPreview => "PAID_OR_PREVIEW",
            Classification::Unknown => "UNKNOWN",
        }
    }

    /// Whether the class is a definitive verdict
    pub fn is_definitive(self) -> bool {
        self != Classification::Unknown
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A classification together with its human-readable justification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verdict {
    pub classification: Classification,
    pub reason: String,
}

impl Verdict {
    pub fn new(classification: Classification, reason: impl Into<String>) -> Self {
        Self {
            classification,
            reason: reason.into(),
        }
    }
}

/// One distinct course URL found on a page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseLink {
    /// Canonical course URL
    pub url: String,

    /// Display text of the link
    pub label: String,

    pub classification: Classification,

    /// Why the classification was chosen
    pub reason: String,
}

impl CourseLink {
    pub fn new(url: String, label: String, verdict: Verdict) -> Self {
        Self {
            url,
            label,
            classification: verdict.classification,
            reason: verdict.reason,
        }
    }
}

/// URL-keyed set holding exactly one CourseLink per canonical URL
#[derive(Debug, Default)]
pub struct CourseLinkSet {
    links: BTreeMap<String, CourseLink>,
}

impl CourseLinkSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    pub fn get(&self, url: &str) -> Option<&CourseLink> {
        self.links.get(url)
    }

    /// Merge another occurrence of a link.
    ///
    /// A strictly more severe classification replaces the stored one; on a tie
    /// the first occurrence is kept. An empty label is filled from later
    /// occurrences.
    pub fn merge(&mut self, link: CourseLink) {
        match self.links.get_mut(&link.url) {
            Some(existing) => {
                if link.classification.severity() > existing.classification.severity() {
                    existing.classification = link.classification;
                    existing.reason = link.reason;
                }
                if existing.label.is_empty() {
                    existing.label = link.label;
                }
            }
            None => {
                self.links.insert(link.url.clone(), link);
            }
        }
    }

    /// Apply the verdict for the page itself to its canonical URL.
    ///
    /// A new URL is inserted as is. An existing entry is overwritten only when
    /// the page verdict is definitive.
    pub fn apply_page_verdict(&mut self, url: String, label: String, verdict: Verdict) {
        match self.links.get_mut(&url) {
            Some(existing) => {
                if verdict.classification.is_definitive() {
                    existing.classification = verdict.classification;
                    existing.reason = verdict.reason;
                }
            }
            None => {
                self.links
                    .insert(url.clone(), CourseLink::new(url, label, verdict));
            }
        }
    }

    /// All links sorted lexically by URL
    pub fn into_sorted(self) -> Vec<CourseLink> {
        self.links.into_values().collect()
    }
}

/// Per-class totals of a scan
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanCounts {
    pub total_course_links: usize,
    pub truly_free: usize,
    pub paid_or_preview: usize,
    pub unknown: usize,
}

/// Everything one scan found on a page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanResult {
    pub page_url: String,
    pub page_title: String,
    pub page_classification: Classification,
    pub page_reason: String,
    pub counts: ScanCounts,
    pub truly_free: Vec<CourseLink>,
    pub paid_or_preview: Vec<CourseLink>,
    pub unknown: Vec<CourseLink>,
}

impl ScanResult {
    /// Partition the links by class, keeping URL order inside each list
    pub fn new(page_url: String, page_title: String, page_verdict: Verdict, links: CourseLinkSet) -> Self {
        let mut truly_free = Vec::new();
        let mut paid_or_preview = Vec::new();
        let mut unknown = Vec::new();

        for link in links.into_sorted() {
            match link.classification {
                Classification::TrulyFree => truly_free.push(link),
                Classification::PaidOrPreview => paid_or_preview.push(link),
                Classification::Unknown => unknown.push(link),
            }
        }

        let counts = ScanCounts {
            total_course_links: truly_free.len() + paid_or_preview.len() + unknown.len(),
            truly_free: truly_free.len(),
            paid_or_preview: paid_or_preview.len(),
            unknown: unknown.len(),
        };

        Self {
            page_url,
            page_title,
            page_classification: page_verdict.classification,
            page_reason: page_verdict.reason,
            counts,
            truly_free,
            paid_or_preview,
            unknown,
        }
    }
}

/// Envelope answering one scan request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanResponse {
    pub ok: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<ScanResult>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ScanResponse {
    pub fn success(result: ScanResult) -> Self {
        Self {
            ok: true,
            result: Some(result),
            error: None,
        }
    }

    pub fn failure(error: impl fmt::Display) -> Self {
        Self {
            ok: false,
            result: None,
            error: Some(error.to_string()),
        }
    }

    /// Wrap a scan outcome; a failed scan carries no partial result
    pub fn from_result<E: fmt::Display>(outcome: Result<ScanResult, E>) -> Self {
        match outcome {
            Ok(result) => Self::success(result),
            Err(e) => Self::failure(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn link(url: &str, label: &str, classification: Classification, reason: &str) -> CourseLink {
        CourseLink::new(url.to_string(), label.to_string(), Verdict::new(classification, reason))
    }

    #[test]
    fn test_merge_keeps_higher_severity() {
        let mut set = CourseLinkSet::new();
        set.merge(link("https://coursera.org/learn/a", "A", Classification::Unknown, "first"));
        set.merge(link("https://coursera.org/learn/a", "A again", Classification::PaidOrPreview, "paid"));
        set.merge(link("https://coursera.org/learn/a", "A", Classification::TrulyFree, "free"));

        assert_eq!(set.len(), 1);
        let merged = set.get("https://coursera.org/learn/a").unwrap();
        assert_eq!(merged.classification, Classification::PaidOrPreview);
        assert_eq!(merged.reason, "paid");
        assert_eq!(merged.label, "A");
    }

    #[test]
    fn test_merge_tie_keeps_first_and_fills_label() {
        let mut set = CourseLinkSet::new();
        set.merge(link("https://coursera.org/learn/a", "", Classification::TrulyFree, "first"));
        set.merge(link("https://coursera.org/learn/a", "Course A", Classification::TrulyFree, "second"));
        let merged = set.get("https://coursera.org/learn/a").unwrap();
        assert_eq!(merged.reason, "first");
        assert_eq!(merged.label, "Course A");
    }

    #[test]
    fn test_page_verdict_only_overrides_when_definitive() {
        let mut set = CourseLinkSet::new();
        set.merge(link("https://coursera.org/learn/a", "A", Classification::PaidOrPreview, "card"));

        set.apply_page_verdict(
            "https://coursera.org/learn/a".to_string(),
            "Page".to_string(),
            Verdict::new(Classification::Unknown, "page unknown"),
        );
        assert_eq!(set.get("https://coursera.org/learn/a").unwrap().reason, "card");

        set.apply_page_verdict(
            "https://coursera.org/learn/a".to_string(),
            "Page".to_string(),
            Verdict::new(Classification::TrulyFree, "page free"),
        );
        let updated = set.get("https://coursera.org/learn/a").unwrap();
        assert_eq!(updated.classification, Classification::TrulyFree);
        assert_eq!(updated.reason, "page free");
        assert_eq!(updated.label, "A");

        set.apply_page_verdict(
            "https://coursera.org/learn/b".to_string(),
            "Page B".to_string(),
            Verdict::new(Classification::Unknown, "page unknown"),
        );
        assert_eq!(set.get("https://coursera.org/learn/b").unwrap().label, "Page B");
    }

    #[test]
    fn test_scan_result_partitions_sorted() {
        let mut set = CourseLinkSet::new();
        set.merge(link("https://coursera.org/learn/z", "Z", Classification::TrulyFree, "r"));
        set.merge(link("https://coursera.org/learn/b", "B", Classification::Unknown, "r"));
        set.merge(link("https://coursera.org/learn/a", "A", Classification::TrulyFree, "r"));
        set.merge(link("https://coursera.org/projects/p", "P", Classification::PaidOrPreview, "r"));

        let result = ScanResult::new(
            "https://www.coursera.org/search".to_string(),
            "Search".to_string(),
            Verdict::new(Classification::Unknown, "insufficient"),
            set,
        );
        let free: Vec<_> = result.truly_free.iter().map(|l| l.url.as_str()).collect();
        assert_eq!(free, ["https://coursera.org/learn/a", "https://coursera.org/learn/z"]);
        assert_eq!(
            result.counts,
            ScanCounts {
                total_course_links: 4,
                truly_free: 2,
                paid_or_preview: 1,
                unknown: 1,
            }
        );
    }

    #[test]
    fn test_json_contract() {
        let mut set = CourseLinkSet::new();
        set.merge(link("https://coursera.org/learn/a", "A", Classification::TrulyFree, "badge"));
        let result = ScanResult::new(
            "https://www.coursera.org/search".to_string(),
            String::new(),
            Verdict::new(Classification::PaidOrPreview, "reject phrase: 'subscribe'"),
            set,
        );
        let value = serde_json::to_value(ScanResponse::success(result)).unwrap();
        assert_eq!(
            value,
            json!({
                "ok": true,
                "result": {
                    "pageUrl": "https://www.coursera.org/search",
                    "pageTitle": "",
                    "pageClassification": "PAID_OR_PREVIEW",
                    "pageReason": "reject phrase: 'subscribe'",
                    "counts": {"totalCourseLinks": 1, "trulyFree": 1, "paidOrPreview": 0, "unknown": 0},
                    "trulyFree": [{
                        "url": "https://coursera.org/learn/a",
                        "label": "A",
                        "classification": "TRULY_FREE",
                        "reason": "badge"
                    }],
                    "paidOrPreview": [],
                    "unknown": []
                }
            })
        );
    }

    #[test]
    fn test_failure_envelope() {
        let outcome: Result<ScanResult, String> = Err("page unavailable".to_string());
        let value = serde_json::to_value(ScanResponse::from_result(outcome)).unwrap();
        assert_eq!(value, json!({"ok": false, "error": "page unavailable"}));
    }
}
