//! The fixed mapping from splat channel to the files of both texture variants.

use bon::Builder;
use sogswap_asset::{FormatVariant, SourceLocator, TextureChannel, last_segment, strip_query};

/// Where the KTX2 variants live when nothing else is configured.
pub const DEFAULT_KTX2_BASE: &str = "files/assets/astc6x6";

#[derive(Debug, Clone, Eq, PartialEq, Builder)]
pub struct RemapConfig {
    #[builder(into, default = DEFAULT_KTX2_BASE.to_string())]
    pub base_dir: String,
    #[builder(default = TextureChannel::ALL.to_vec())]
    pub channels: Vec<TextureChannel>,
}

impl Default for RemapConfig {
    fn default() -> Self {
        RemapConfig::builder().build()
    }
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct RemapEntry {
    channel: TextureChannel,
    default_file: String,
    alternate_file: String,
    alternate: SourceLocator,
}

impl RemapEntry {
    fn new(base_dir: &str, channel: TextureChannel) -> Self {
        let alternate_file = FormatVariant::Compressed.file_name(channel);
        let url = if base_dir.is_empty() {
            alternate_file.clone()
        } else {
            format!("{base_dir}/{alternate_file}")
        };

        Self {
            channel,
            default_file: FormatVariant::Default.file_name(channel),
            alternate_file,
            alternate: SourceLocator::new(url),
        }
    }

    pub fn channel(&self) -> TextureChannel {
        self.channel
    }

    /// `<channel>.webp`
    pub fn default_file(&self) -> &str {
        &self.default_file
    }

    /// `<channel>.ktx2`
    pub fn alternate_file(&self) -> &str {
        &self.alternate_file
    }

    /// `<base_dir>/<channel>.ktx2`, without a hash.
    pub fn alternate(&self) -> &SourceLocator {
        &self.alternate
    }
}

/// Immutable lookup table shared by every remap strategy.
///
/// Lookups walk the entries in declaration order, so the first declared channel wins
/// whenever more than one could match.
#[derive(Debug, Clone)]
pub struct RemapTable {
    base_dir: String,
    entries: Vec<RemapEntry>,
}

impl RemapTable {
    pub fn new(config: &RemapConfig) -> Self {
        let base_dir = config.base_dir.trim_end_matches('/').to_string();

        let mut entries: Vec<RemapEntry> = Vec::with_capacity(config.channels.len());
        for channel in &config.channels {
            if entries.iter().all(|entry| entry.channel != *channel) {
                entries.push(RemapEntry::new(&base_dir, *channel));
            }
        }

        Self { base_dir, entries }
    }

    pub fn base_dir(&self) -> &str {
        &self.base_dir
    }

    pub fn entries(&self) -> &[RemapEntry] {
        &self.entries
    }

    pub fn entry(&self, channel: TextureChannel) -> Option<&RemapEntry> {
        self.entries.iter().find(|entry| entry.channel == channel)
    }

    /// Suffix match of a filename or URL against `<channel>.webp`.
    ///
    /// Anything in front of the file name is tolerated (revision directories, prefixes),
    /// the query string and fragment are ignored.
    pub fn resolve(&self, filename_or_url: &str) -> Option<&RemapEntry> {
        let path = strip_query(filename_or_url);
        self.entries
            .iter()
            .find(|entry| path.ends_with(entry.default_file.as_str()))
    }

    /// Registration time lookup: the listed filename first, then the URL.
    pub fn resolve_locator(&self, locator: &SourceLocator) -> Option<&RemapEntry> {
        self.resolve(locator.filename())
            .or_else(|| self.resolve(locator.url()))
    }

    /// Load request lookup: `<channel>.webp` anywhere in the URL path or the filename.
    pub fn resolve_request(&self, locator: &SourceLocator) -> Option<&RemapEntry> {
        let url = strip_query(locator.url());
        let filename = strip_query(locator.filename());
        self.entries.iter().find(|entry| {
            url.contains(entry.default_file.as_str())
                || filename.contains(entry.default_file.as_str())
        })
    }

    /// The channel whose compressed file this locator points at, if any.
    pub fn channel_of_alternate(&self, locator: &SourceLocator) -> Option<TextureChannel> {
        let file = last_segment(locator.url());
        self.entries
            .iter()
            .find(|entry| entry.alternate_file == file)
            .map(|entry| entry.channel)
    }
}
