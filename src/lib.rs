pub mod error;
pub mod extractor;
pub mod fetcher;
pub mod logger;
pub mod server;
pub mod store;

// Exporting types for convenience
pub use error::{FetchError, PersistError};
pub use extractor::Extractor;
pub use fetcher::Fetcher;
pub use server::ViewerServer;
pub use store::{LinkDocument, LinkStore, DEFAULT_STORE_FILE, PAGE_CAPACITY};

/// Fetches `url` and returns every marked snapshot link found on it, in
/// document order. Convenience composition of [`Fetcher`] and
/// [`Extractor`] for one-shot callers.
pub fn collect_image_links(url: &str) -> Result<Vec<String>, FetchError> {
    let fetcher = Fetcher::new();
    let extractor = Extractor::new();

    let html = fetcher.fetch(url)?;
    Ok(extractor.extract(&html))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collect_image_links_composes_fetch_and_extract() {
        let mut server = mockito::Server::new();
        let _mock = server
            .mock("GET", "/wall")
            .with_status(200)
            .with_body(
                r#"<html><body>
                    <img class="cctv-image" src="cam1.jpg">
                    <img class="banner" src="ad.jpg">
                    <img class="cctv-image" src="cam2.jpg">
                </body></html>"#,
            )
            .create();

        let links = collect_image_links(&format!("{}/wall", server.url())).unwrap();
        assert_eq!(links, vec!["cam1.jpg", "cam2.jpg"]);
    }

    #[test]
    fn collect_image_links_surfaces_fetch_failures() {
        let mut server = mockito::Server::new();
        let _mock = server.mock("GET", "/wall").with_status(503).create();

        let err = collect_image_links(&format!("{}/wall", server.url())).unwrap_err();
        assert!(matches!(err, FetchError::Status { .. }));
    }
}
