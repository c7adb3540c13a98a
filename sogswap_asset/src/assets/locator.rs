use serde::{Deserialize, Serialize};

/// Cuts a query string or fragment off a URL.
pub fn strip_query(url: &str) -> &str {
    let end = url.find(['?', '#']).unwrap_or(url.len());
    &url[..end]
}

/// Final path segment of a URL, without query string or fragment.
pub fn last_segment(url: &str) -> &str {
    let path = strip_query(url);
    path.rsplit('/').next().unwrap_or(path)
}

/// Where an asset's payload is fetched from.
///
/// URL, filename and hash always travel together: a retarget swaps the whole value, so a
/// half-updated locator cannot be observed.
#[derive(Debug, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct SourceLocator {
    url: String,
    filename: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    hash: Option<String>,
}

impl SourceLocator {
    /// A locator whose filename is the URL's final path segment and which carries no hash.
    pub fn new(url: impl Into<String>) -> Self {
        let url = url.into();
        let filename = last_segment(&url).to_string();
        Self {
            url,
            filename,
            hash: None,
        }
    }

    /// A locator as the engine's asset listing describes it. The filename is taken verbatim,
    /// it may carry revision segments or a query string.
    pub fn with_parts(
        url: impl Into<String>,
        filename: impl Into<String>,
        hash: Option<String>,
    ) -> Self {
        Self {
            url: url.into(),
            filename: filename.into(),
            hash: hash.filter(|hash| !hash.is_empty()),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub fn hash(&self) -> Option<&str> {
        self.hash.as_deref()
    }

    /// Whether the filename is exactly the URL's last path segment.
    pub fn is_consistent(&self) -> bool {
        self.filename == last_segment(&self.url)
    }
}
