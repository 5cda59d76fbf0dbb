//! Locating the card that surrounds a course link.

use crate::config::ContainerConfig;
use crate::filter::UrlFilter;
use crate::parsers::html;
use crate::parsers::text::{char_len, normalize_for_match};
use ego_tree::NodeId;
use scraper::ElementRef;
use std::collections::HashMap;
use std::rc::Rc;
use url::Url;

/// Badge texts recognised inside a container
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BadgeToken {
    Free,
    Preview,
}

impl BadgeToken {
    pub fn as_str(self) -> &'static str {
        match self {
            BadgeToken::Free => "free",
            BadgeToken::Preview => "preview",
        }
    }
}

/// Per-scan memo of badge lookups and node statistics, keyed by node.
///
/// Create one per scan; node ids are only meaningful within one document.
#[derive(Debug, Default)]
pub struct ScanCache {
    badges: HashMap<(NodeId, BadgeToken), bool>,
    stats: HashMap<NodeId, Rc<NodeStats>>,
}

impl ScanCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of memoised badge lookups
    pub fn badge_lookups(&self) -> usize {
        self.badges.len()
    }

    /// Number of nodes whose statistics were computed
    pub fn measured_nodes(&self) -> usize {
        self.stats.len()
    }

    pub fn is_empty(&self) -> bool {
        self.badges.is_empty() && self.stats.is_empty()
    }
}

/// Link and text statistics of a node
#[derive(Debug, Clone)]
pub struct NodeStats {
    pub total_links: usize,
    pub course_links: usize,
    pub text: String,
    pub text_chars: usize,
}

/// The container chosen for a link, plus the badge signals seen on the way up
#[derive(Debug, Clone)]
pub struct ContainerSelection<'a> {
    pub container: ElementRef<'a>,
    /// Score of the chosen candidate; `None` when a fallback was used
    pub score: Option<i32>,
    /// Visible text of the container
    pub text: String,
    /// Any ancestor candidate carries a Free badge
    pub has_free_badge: bool,
    /// Any ancestor candidate carries a Preview badge
    pub has_preview_badge: bool,
}

/// Scores ancestors of course links to find their listing card
pub struct ContainerFinder<'s> {
    filter: &'s UrlFilter,
    base: &'s Url,
    config: &'s ContainerConfig,
}

impl<'s> ContainerFinder<'s> {
    pub fn new(filter: &'s UrlFilter, base: &'s Url, config: &'s ContainerConfig) -> Self {
        Self {
            filter,
            base,
            config,
        }
    }

    /// Pick the best container for `link`.
    ///
    /// Ancestors are inspected nearest first, stopping at `<body>`. The
    /// highest-scoring candidate wins and ties keep the nearer one. Without
    /// any candidate the immediate parent is used, then the link itself.
    pub fn select<'a>(&self, link: ElementRef<'a>, cache: &mut ScanCache) -> ContainerSelection<'a> {
        let mut best: Option<(ElementRef<'a>, i32, Rc<NodeStats>)> = None;
        let mut has_free_badge = false;
        let mut has_preview_badge = false;

        let ancestors = link
            .ancestors()
            .filter_map(ElementRef::wrap)
            .take_while(|el| !matches!(el.value().name(), "body" | "html"))
            .take(self.config.max_ancestor_levels);

        for (level, ancestor) in ancestors.enumerate() {
            let stats = self.cached_stats(ancestor, cache);
            if !self.is_candidate(&stats) {
                continue;
            }

            let free = self.has_badge(ancestor, BadgeToken::Free, cache);
            let preview = self.has_badge(ancestor, BadgeToken::Preview, cache);
            has_free_badge |= free;
            has_preview_badge |= preview;

            let score = self.score(ancestor, &stats, free || preview);
            ::log::trace!(
                "Candidate <{}> at level {}: score {} ({} links, {} course links, {} chars)",
                ancestor.value().name(),
                level + 1,
                score,
                stats.total_links,
                stats.course_links,
                stats.text_chars
            );

            let better = match &best {
                Some((_, best_score, _)) => score > *best_score,
                None => true,
            };
            if better {
                best = Some((ancestor, score, stats));
            }
        }

        match best {
            Some((container, score, stats)) => ContainerSelection {
                container,
                score: Some(score),
                text: stats.text.clone(),
                has_free_badge,
                has_preview_badge,
            },
            None => {
                let container = link
                    .parent()
                    .and_then(ElementRef::wrap)
                    .unwrap_or(link);
                ContainerSelection {
                    container,
                    score: None,
                    text: html::visible_text(container),
                    has_free_badge,
                    has_preview_badge,
                }
            }
        }
    }

    /// [`Self::stats`], computed at most once per node and scan
    pub fn cached_stats(&self, node: ElementRef<'_>, cache: &mut ScanCache) -> Rc<NodeStats> {
        Rc::clone(
            cache
                .stats
                .entry((*node).id())
                .or_insert_with(|| Rc::new(self.stats(node))),
        )
    }

    /// Count hyperlinks and measure visible text of a node
    pub fn stats(&self, node: ElementRef<'_>) -> NodeStats {
        let mut total_links = 0;
        let mut course_links = 0;
        for link in html::links(node) {
            total_links += 1;
            if self.is_course_link(link) {
                course_links += 1;
            }
        }
        let text = html::visible_text(node);
        let text_chars = char_len(&text);
        NodeStats {
            total_links,
            course_links,
            text,
            text_chars,
        }
    }

    /// Whether a node is small and textual enough to be a listing card
    pub fn is_candidate(&self, stats: &NodeStats) -> bool {
        (self.config.min_links..=self.config.max_links).contains(&stats.total_links)
            && stats.course_links <= self.config.max_course_links
            && stats.text_chars >= self.config.min_text_chars
    }

    /// Heuristic score of a candidate
    pub fn score(&self, node: ElementRef<'_>, stats: &NodeStats, has_badge: bool) -> i32 {
        let config = self.config;
        let mut score = 0;
        if stats.course_links == 1 {
            score += config.single_course_link_bonus;
        } else if (2..=config.few_course_links_max).contains(&stats.course_links) {
            score += config.few_course_links_bonus;
        }
        if html::has_card_hint(node) {
            score += config.card_hint_bonus;
        }
        if html::has_media(node) {
            score += config.media_bonus;
        }
        if has_badge {
            score += config.badge_bonus;
        }
        if stats.text_chars > config.long_text_chars {
            score -= config.long_text_penalty;
        }
        score
    }

    /// Whether `container` holds a visible badge reading exactly `token`.
    ///
    /// The badge matches on its visible text or `aria-label`. A badge nested
    /// in a hyperlink only counts when that hyperlink is a course link.
    pub fn has_badge(&self, container: ElementRef<'_>, token: BadgeToken, cache: &mut ScanCache) -> bool {
        let key = ((*container).id(), token);
        if let Some(&found) = cache.badges.get(&key) {
            return found;
        }

        let found = container
            .descendants()
            .skip(1)
            .filter_map(ElementRef::wrap)
            .any(|el| self.is_badge(el, container, token));
        cache.badges.insert(key, found);
        found
    }

    fn is_badge(&self, element: ElementRef<'_>, container: ElementRef<'_>, token: BadgeToken) -> bool {
        let matches_label = element
            .value()
            .attr("aria-label")
            .is_some_and(|label| normalize_for_match(label) == token.as_str());
        if !matches_label && normalize_for_match(&html::visible_text(element)) != token.as_str() {
            return false;
        }
        if html::is_hidden_within(element, container) {
            return false;
        }
        match html::enclosing_link(element) {
            Some(link) => self.is_course_link(link),
            None => true,
        }
    }

    fn is_course_link(&self, link: ElementRef<'_>) -> bool {
        link.value()
            .attr("href")
            .and_then(|href| self.filter.course_url(href, Some(self.base)))
            .is_some()
    }
}
