//! Keyword and price rules that turn a block of text into a classification.
//!
//! Rules are applied in a fixed order and the first match wins:
//! paywall signals, the "full course, no certificate" phrase, the
//! "enroll for free" + "no certificate" pair, an exact Free badge, and
//! finally UNKNOWN.

use crate::parsers::text::{char_window, normalize_for_match};
use crate::results::{Classification, Verdict};
use regex::Regex;
use std::sync::LazyLock;

/// Phrases that mark a page or card as paid or preview-only
pub const REJECT_PHRASES: &[&str] = &[
    "this course costs",
    "preview this course",
    "start free trial",
    "coursera plus",
    "subscribe",
];

/// Words that turn a nearby dollar amount into a payment signal
pub const PAYMENT_CONTEXT_NEAR_DOLLAR: &[&str] = &[
    "cost",
    "costs",
    "per month",
    "month",
    "subscribe",
    "free trial",
    "trial",
];

/// Characters inspected on each side of a dollar amount
pub const DOLLAR_CONTEXT_RADIUS: usize = 50;

const FULL_COURSE_NO_CERTIFICATE: &str = "full course, no certificate";
const ENROLL_FOR_FREE: &str = "enroll for free";
const NO_CERTIFICATE: &str = "no certificate";

static DOLLAR_AMOUNT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$[\d.,]+").expect("dollar pattern is valid"));

/// Badge signals found around the text
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BadgeFlags {
    pub free: bool,
    pub preview: bool,
}

/// Classify a block of text. Pure: the result depends only on the inputs.
pub fn classify_text(text: &str, badges: BadgeFlags) -> Verdict {
    let text_l = normalize_for_match(text);

    let mut reasons: Vec<String> = REJECT_PHRASES
        .iter()
        .filter(|phrase| text_l.contains(*phrase))
        .map(|phrase| format!("reject phrase: '{}'", phrase))
        .collect();
    if badges.preview {
        reasons.push("preview badge detected".to_string());
    }
    if has_dollar_payment_signal(&text_l) {
        reasons.push("payment pricing near '$' detected".to_string());
    }
    if !reasons.is_empty() {
        return Verdict::new(Classification::PaidOrPreview, reasons.join("; "));
    }

    if text_l.contains(FULL_COURSE_NO_CERTIFICATE) {
        return Verdict::new(
            Classification::TrulyFree,
            "matched 'Full Course, No Certificate' and no reject phrases",
        );
    }
    if text_l.contains(ENROLL_FOR_FREE) && text_l.contains(NO_CERTIFICATE) {
        return Verdict::new(
            Classification::TrulyFree,
            "matched 'Enroll for free' + 'No Certificate' and no reject phrases",
        );
    }
    if badges.free {
        return Verdict::new(
            Classification::TrulyFree,
            "matched exact 'Free' badge and no reject phrases",
        );
    }

    Verdict::new(
        Classification::Unknown,
        "insufficient signals for truly-free or paid/preview",
    )
}

/// Whether any dollar amount has payment wording within the context radius.
///
/// Expects text already normalized with `normalize_for_match`.
pub fn has_dollar_payment_signal(text_l: &str) -> bool {
    DOLLAR_AMOUNT.find_iter(text_l).any(|m| {
        let (start, end) = char_window(text_l, m.start(), m.end(), DOLLAR_CONTEXT_RADIUS);
        let window = &text_l[start..end];
        PAYMENT_CONTEXT_NEAR_DOLLAR
            .iter()
            .any(|term| window.contains(term))
    })
}
