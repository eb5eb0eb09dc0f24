use std::collections::HashSet;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::Local;
use log::{info, warn};
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;

use crate::error::PersistError;

/// Fixed page size of the grid viewer: 3x3 snapshots.
pub const PAGE_CAPACITY: usize = 9;

pub const DEFAULT_STORE_FILE: &str = "cctv_links.json";

const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// The persisted aggregate: a last-write stamp plus the paginated link
/// list. This is also the read contract of the grid viewer page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkDocument {
    pub timestamp: String,
    pub pages: Vec<Vec<String>>,
}

impl LinkDocument {
    fn empty() -> Self {
        LinkDocument {
            timestamp: now_stamp(),
            pages: vec![Vec::new()],
        }
    }

    pub fn total_links(&self) -> usize {
        self.pages.iter().map(|page| page.len()).sum()
    }
}

fn now_stamp() -> String {
    Local::now().format(TIMESTAMP_FORMAT).to_string()
}

/// Paginated link store over a single JSON file.
///
/// Every operation is a full read-modify-write of the file; there is no
/// locking, so two processes pointed at the same file can lose updates.
/// Single-user tool, accepted limitation.
pub struct LinkStore {
    path: PathBuf,
}

impl LinkStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        LinkStore { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the store file. A missing, unreadable or corrupt file yields
    /// a fresh single-empty-page document instead of an error: nothing was
    /// there to lose, so the caller never handles a load failure.
    pub fn load(&self) -> LinkDocument {
        if !self.path.exists() {
            info!("No store file at {:?}. Starting fresh.", self.path);
            return LinkDocument::empty();
        }

        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) => {
                warn!("Failed to read {:?}: {}. Starting fresh.", self.path, e);
                return LinkDocument::empty();
            }
        };

        match serde_json::from_str::<LinkDocument>(&content) {
            Ok(document) => document,
            Err(e) => {
                warn!("Failed to parse {:?}: {}. Starting fresh.", self.path, e);
                LinkDocument::empty()
            }
        }
    }

    /// Folds `new_links` into the persisted document. Links already stored
    /// anywhere are skipped; each genuinely new link is appended to the
    /// last page, opening a new page whenever the last one holds
    /// `PAGE_CAPACITY` entries. Existing pages are never reshuffled or
    /// evicted, so repeating a merge is a no-op apart from the timestamp.
    pub fn merge(&self, new_links: &[String]) -> Result<LinkDocument, PersistError> {
        let mut document = self.load();

        let mut existing: HashSet<String> =
            document.pages.iter().flatten().cloned().collect();

        let mut added = 0usize;
        for link in new_links {
            if existing.contains(link) {
                continue;
            }

            if document
                .pages
                .last()
                .map_or(true, |page| page.len() >= PAGE_CAPACITY)
            {
                document.pages.push(Vec::new());
            }
            if let Some(page) = document.pages.last_mut() {
                page.push(link.clone());
            }

            existing.insert(link.clone());
            added += 1;
        }

        document.timestamp = now_stamp();
        self.persist(&document)?;

        info!(
            "Stored {} new links in {:?} ({} links across {} pages)",
            added,
            self.path,
            document.total_links(),
            document.pages.len()
        );
        Ok(document)
    }

    /// Overwrites the page list wholesale and stamps the document. No
    /// dedup or capacity check is applied; the editing surface owns the
    /// shape of what it saves.
    pub fn replace_pages(&self, pages: Vec<Vec<String>>) -> Result<LinkDocument, PersistError> {
        let document = LinkDocument {
            timestamp: now_stamp(),
            pages,
        };
        self.persist(&document)?;

        info!(
            "Rewrote {:?} ({} links across {} pages)",
            self.path,
            document.total_links(),
            document.pages.len()
        );
        Ok(document)
    }

    // Write-to-temp-then-rename, so a failed write can never leave a
    // half-written store behind.
    fn persist(&self, document: &LinkDocument) -> Result<(), PersistError> {
        let json = serde_json::to_string_pretty(document)?;

        // The temp file must live on the same filesystem as the target for
        // the rename to be atomic.
        let dir = self
            .path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));

        let mut tmp = NamedTempFile::new_in(dir).map_err(|e| PersistError::Write {
            path: self.path.clone(),
            source: e,
        })?;
        tmp.write_all(json.as_bytes())
            .map_err(|e| PersistError::Write {
                path: self.path.clone(),
                source: e,
            })?;
        tmp.persist(&self.path).map_err(|e| PersistError::Write {
            path: self.path.clone(),
            source: e.error,
        })?;

        Ok(())
    }
}

impl Default for LinkStore {
    fn default() -> Self {
        Self::new(DEFAULT_STORE_FILE)
    }
}
