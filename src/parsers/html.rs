use crate::parsers::text::collapse_whitespace;
use scraper::node::Element;
use scraper::{ElementRef, Html, Node, Selector};
use std::sync::LazyLock;

static LINK_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a[href]").expect("link selector is valid"));
static MEDIA_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("img, video, picture").expect("media selector is valid"));
static BODY_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("body").expect("body selector is valid"));
static TITLE_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("title").expect("title selector is valid"));
static LINK_REL_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("link[rel][href]").expect("link rel selector is valid"));
static META_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("meta[content]").expect("meta selector is valid"));

/// Elements whose text never reaches the reader
const NON_RENDERED_TAGS: &[&str] = &["script", "style", "noscript", "template", "head"];

/// Elements whose rendered text is separated from its neighbours
const BLOCK_TAGS: &[&str] = &[
    "address", "article", "aside", "blockquote", "br", "dd", "details", "div", "dl", "dt",
    "fieldset", "figcaption", "figure", "footer", "form", "h1", "h2", "h3", "h4", "h5", "h6",
    "header", "hr", "li", "main", "nav", "ol", "p", "pre", "section", "summary", "table",
    "tbody", "td", "tfoot", "th", "thead", "tr", "ul",
];

/// Whether the element hides itself through inline style or the `hidden` attribute
pub fn element_is_hidden(element: &Element) -> bool {
    if element.attr("hidden").is_some() {
        return true;
    }
    let Some(style) = element.attr("style") else {
        return false;
    };
    style.split(';').any(|declaration| {
        let Some((property, value)) = declaration.split_once(':') else {
            return false;
        };
        let property = property.trim().to_ascii_lowercase();
        let value = value.to_ascii_lowercase().replace("!important", "");
        let value = value.trim();
        (property == "display" && value == "none") || (property == "visibility" && value == "hidden")
    })
}

/// Whether the element, or any ancestor up to and including `boundary`, is hidden
pub fn is_hidden_within(element: ElementRef<'_>, boundary: ElementRef<'_>) -> bool {
    if element_is_hidden(element.value()) {
        return true;
    }
    if element == boundary {
        return false;
    }
    for ancestor in element.ancestors().filter_map(ElementRef::wrap) {
        if element_is_hidden(ancestor.value()) {
            return true;
        }
        if ancestor == boundary {
            break;
        }
    }
    false
}

/// Rendered text of an element, whitespace-collapsed.
///
/// Adjacent inline text runs join without a separator, as a browser renders
/// them; block-level elements and `<br>` break words. Text inside
/// script/style-like elements and inside hidden elements is skipped.
pub fn visible_text(element: ElementRef<'_>) -> String {
    if element_is_hidden(element.value()) || NON_RENDERED_TAGS.contains(&element.value().name()) {
        return String::new();
    }
    let mut rendered = String::new();
    collect_visible_text(element, &mut rendered);
    collapse_whitespace(&rendered)
}

fn collect_visible_text(element: ElementRef<'_>, rendered: &mut String) {
    for child in element.children() {
        match child.value() {
            Node::Text(text) => rendered.push_str(&**text),
            Node::Element(child_element) => {
                if NON_RENDERED_TAGS.contains(&child_element.name())
                    || element_is_hidden(child_element)
                {
                    continue;
                }
                let breaks = BLOCK_TAGS.contains(&child_element.name());
                if breaks {
                    rendered.push(' ');
                }
                if let Some(child_ref) = ElementRef::wrap(child) {
                    collect_visible_text(child_ref, rendered);
                }
                if breaks {
                    rendered.push(' ');
                }
            }
            _ => {}
        }
    }
}

/// All hyperlinks (`a[href]`) inside the element, itself included
pub fn links(element: ElementRef<'_>) -> impl Iterator<Item = ElementRef<'_>> {
    element.select(&LINK_SELECTOR)
}

/// Closest hyperlink enclosing the element, itself included
pub fn enclosing_link(element: ElementRef<'_>) -> Option<ElementRef<'_>> {
    std::iter::once(element)
        .chain(element.ancestors().filter_map(ElementRef::wrap))
        .find(|el| el.value().name() == "a" && el.value().attr("href").is_some())
}

/// Whether the element contains an image, video or picture
pub fn has_media(element: ElementRef<'_>) -> bool {
    element.select(&MEDIA_SELECTOR).next().is_some()
}

/// Whether the element looks like a listing card
pub fn has_card_hint(element: ElementRef<'_>) -> bool {
    let value = element.value();
    if matches!(value.name(), "li" | "article") {
        return true;
    }
    if value
        .attr("role")
        .is_some_and(|role| role.trim().eq_ignore_ascii_case("listitem"))
    {
        return true;
    }
    value
        .attrs()
        .any(|(_, attr_value)| attr_value.to_ascii_lowercase().contains("card"))
}

/// The `<body>` element, or the document root when there is none
pub fn body(doc: &Html) -> ElementRef<'_> {
    doc.select(&BODY_SELECTOR)
        .next()
        .unwrap_or_else(|| doc.root_element())
}

/// Text of the first `<title>` element, if non-empty
pub fn page_title(doc: &Html) -> Option<String> {
    doc.select(&TITLE_SELECTOR)
        .map(|title| collapse_whitespace(&title.text().collect::<Vec<_>>().join(" ")))
        .find(|title| !title.is_empty())
}

/// href of the first `<link rel="canonical">`
pub fn canonical_href(doc: &Html) -> Option<String> {
    doc.select(&LINK_REL_SELECTOR)
        .find(|link| {
            link.value()
                .attr("rel")
                .is_some_and(|rel| rel.to_ascii_lowercase().contains("canonical"))
        })
        .and_then(|link| link.value().attr("href"))
        .map(|href| href.trim().to_string())
        .filter(|href| !href.is_empty())
}

/// content of the `og:url` meta tag, declared via `property` or `name`
pub fn og_url(doc: &Html) -> Option<String> {
    doc.select(&META_SELECTOR)
        .find(|meta| {
            let value = meta.value();
            ["property", "name"].iter().any(|attr| {
                value
                    .attr(attr)
                    .is_some_and(|v| v.trim().eq_ignore_ascii_case("og:url"))
            })
        })
        .and_then(|meta| meta.value().attr("content"))
        .map(|content| content.trim().to_string())
        .filter(|content| !content.is_empty())
}
