use futures::FutureExt;
use futures::future::LocalBoxFuture;
use parking_lot::Mutex;
use snafu::{ResultExt, Snafu};
use sogswap_asset::strip_query;
use std::collections::HashMap;
use std::path::PathBuf;
use std::rc::Rc;
use tracing::trace;

#[derive(Debug, Snafu)]
#[snafu(context(suffix(Err)))]
pub enum FetchError {
    #[snafu(display("{url} was not found"))]
    NotFound { url: String },

    #[snafu(display("failed to read {}: {source}", path.display()))]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Network boundary: turns a URL into the raw bytes behind it.
pub trait Fetcher {
    fn fetch<'a>(&'a self, url: &'a str) -> LocalBoxFuture<'a, Result<Vec<u8>, FetchError>>;
}

impl<F: Fetcher + ?Sized> Fetcher for Rc<F> {
    fn fetch<'a>(&'a self, url: &'a str) -> LocalBoxFuture<'a, Result<Vec<u8>, FetchError>> {
        (**self).fetch(url)
    }
}

/// Serves payloads from memory. Lookups try the exact URL first, then the URL without its
/// query string. Every request is recorded.
#[derive(Debug, Default)]
pub struct MemoryFetcher {
    files: Mutex<HashMap<String, Vec<u8>>>,
    requests: Mutex<Vec<String>>,
}

impl MemoryFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, url: impl Into<String>, bytes: impl Into<Vec<u8>>) {
        self.files.lock().insert(url.into(), bytes.into());
    }

    pub fn remove(&self, url: &str) -> Option<Vec<u8>> {
        self.files.lock().remove(url)
    }

    /// URLs requested so far, in request order.
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().clone()
    }
}

impl Fetcher for MemoryFetcher {
    fn fetch<'a>(&'a self, url: &'a str) -> LocalBoxFuture<'a, Result<Vec<u8>, FetchError>> {
        async move {
            self.requests.lock().push(url.to_string());

            let files = self.files.lock();
            files
                .get(url)
                .or_else(|| files.get(strip_query(url)))
                .cloned()
                .ok_or_else(|| FetchError::NotFound {
                    url: url.to_string(),
                })
        }
        .boxed_local()
    }
}

/// Serves payloads from a directory. Leading slashes and query strings are ignored.
#[derive(Debug, Clone)]
pub struct FsFetcher {
    root: PathBuf,
}

impl FsFetcher {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn path_for(&self, url: &str) -> PathBuf {
        self.root.join(strip_query(url).trim_start_matches('/'))
    }
}

impl Fetcher for FsFetcher {
    fn fetch<'a>(&'a self, url: &'a str) -> LocalBoxFuture<'a, Result<Vec<u8>, FetchError>> {
        async move {
            let path = self.path_for(url);
            trace!("Reading {}", path.display());

            match std::fs::read(&path) {
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => NotFoundErr { url }.fail(),
                result => result.context(IoErr { path }),
            }
        }
        .boxed_local()
    }
}
