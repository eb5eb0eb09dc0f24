use log::debug;
use scraper::{Html, Selector};

// The marker for snapshot images this tool collects. The class part of the
// selector is a token membership test, so `class="thumb cctv-image"`
// qualifies as well.
const IMAGE_MARKER: &str = "img.cctv-image";

pub struct Extractor {
    selector: Selector,
}

impl Extractor {
    pub fn new() -> Self {
        Extractor {
            selector: Selector::parse(IMAGE_MARKER).unwrap(),
        }
    }

    /// Returns the `src` of every marked image in `html`, in document
    /// order and verbatim (no normalization, no relative-URL resolution).
    /// Marked images without a `src` are skipped. Parsing is lenient:
    /// malformed markup yields whatever could be recovered, never an error.
    pub fn extract(&self, html: &str) -> Vec<String> {
        let document = Html::parse_document(html);

        let links: Vec<String> = document
            .select(&self.selector)
            .filter_map(|element| element.value().attr("src"))
            .map(|s| s.to_string())
            .collect();

        debug!("Extractor found {} image links", links.len());
        links
    }
}

impl Default for Extractor {
    fn default() -> Self {
        Self::new()
    }
}
