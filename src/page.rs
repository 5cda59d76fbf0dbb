use crate::error::ScanError;
use crate::parsers::html;
use scraper::{ElementRef, Html};
use std::fs;
use std::path::Path;
use url::Url;

/// Read access to one page, injected into the scanner.
///
/// Keeping DOM access behind this trait lets scans run against saved HTML
/// or synthetic documents instead of a live browser.
pub trait PageAccessor {
    /// URL of the page, used as base for relative links
    fn url(&self) -> &Url;

    /// Document title, if any
    fn title(&self) -> Option<String>;

    /// Raw canonical link declared by the page, if any
    fn canonical_href(&self) -> Option<String>;

    /// Element whose hyperlinks are scanned and whose text is the page text
    fn body(&self) -> ElementRef<'_>;
}

/// A page parsed from serialized HTML
pub struct HtmlPage {
    url: Url,
    document: Html,
}

impl HtmlPage {
    /// Parse HTML served at `page_url`
    pub fn parse(html: &str, page_url: &str) -> Result<Self, ScanError> {
        let url = parse_page_url(page_url)?;
        Ok(Self {
            url,
            document: Html::parse_document(html),
        })
    }

    /// Parse HTML saved to disk.
    ///
    /// The page URL is `base_url` when given, else the canonical or `og:url`
    /// link declared in the file resolved against `fallback_url`, else
    /// `fallback_url` itself.
    pub fn from_saved_html(
        html: &str,
        base_url: Option<&str>,
        fallback_url: &str,
    ) -> Result<Self, ScanError> {
        let document = Html::parse_document(html);
        let fallback = parse_page_url(fallback_url)?;

        let url = match base_url {
            Some(base) => parse_page_url(base)?,
            None => html::canonical_href(&document)
                .or_else(|| html::og_url(&document))
                .and_then(|declared| fallback.join(&declared).ok())
                .unwrap_or(fallback),
        };

        Ok(Self { url, document })
    }

    /// Read and parse a saved page; invalid UTF-8 is replaced, not rejected
    pub fn from_file(
        path: impl AsRef<Path>,
        base_url: Option<&str>,
        fallback_url: &str,
    ) -> Result<Self, ScanError> {
        let path = path.as_ref();
        let bytes = fs::read(path).map_err(|source| ScanError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let html = String::from_utf8_lossy(&bytes);
        ::log::debug!("Loaded {} ({} bytes)", path.display(), bytes.len());
        Self::from_saved_html(&html, base_url, fallback_url)
    }

    pub fn document(&self) -> &Html {
        &self.document
    }
}

impl PageAccessor for HtmlPage {
    fn url(&self) -> &Url {
        &self.url
    }

    fn title(&self) -> Option<String> {
        html::page_title(&self.document)
    }

    fn canonical_href(&self) -> Option<String> {
        html::canonical_href(&self.document).or_else(|| html::og_url(&self.document))
    }

    fn body(&self) -> ElementRef<'_> {
        html::body(&self.document)
    }
}

fn parse_page_url(raw: &str) -> Result<Url, ScanError> {
    Url::parse(raw.trim()).map_err(|source| ScanError::InvalidPageUrl {
        url: raw.to_string(),
        source,
    })
}
