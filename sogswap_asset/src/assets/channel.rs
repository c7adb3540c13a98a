use snafu::Snafu;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// One of the fixed per-splat data textures of a SOG scene.
///
/// The declaration order is meaningful: when several channels could match the same file,
/// the one declared first wins.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub enum TextureChannel {
    MeansL,
    MeansU,
    Quats,
    Scales,
    Sh0,
    ShCentroids,
    ShLabels,
}

#[derive(Debug, Snafu)]
#[snafu(display("unknown texture channel {name:?}"))]
pub struct UnknownChannel {
    pub name: String,
}

impl TextureChannel {
    pub const ALL: [TextureChannel; 7] = [
        TextureChannel::MeansL,
        TextureChannel::MeansU,
        TextureChannel::Quats,
        TextureChannel::Scales,
        TextureChannel::Sh0,
        TextureChannel::ShCentroids,
        TextureChannel::ShLabels,
    ];

    /// File stem shared by both encoded variants, also the key used in KTX2 manifests.
    pub const fn base_name(self) -> &'static str {
        match self {
            TextureChannel::MeansL => "means_l",
            TextureChannel::MeansU => "means_u",
            TextureChannel::Quats => "quats",
            TextureChannel::Scales => "scales",
            TextureChannel::Sh0 => "sh0",
            TextureChannel::ShCentroids => "shN_centroids",
            TextureChannel::ShLabels => "shN_labels",
        }
    }

    /// Name of the matching texture slot on the splat data.
    pub const fn property_name(self) -> &'static str {
        match self {
            TextureChannel::ShCentroids => "sh_centroids",
            TextureChannel::ShLabels => "sh_labels",
            other => other.base_name(),
        }
    }

    /// Accepts both the file stem and the splat property name.
    pub fn from_name(name: &str) -> Option<TextureChannel> {
        TextureChannel::ALL
            .into_iter()
            .find(|channel| channel.base_name() == name || channel.property_name() == name)
    }
}

impl Display for TextureChannel {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.base_name())
    }
}

impl FromStr for TextureChannel {
    type Err = UnknownChannel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TextureChannel::from_name(s).ok_or_else(|| UnknownChannel {
            name: s.to_string(),
        })
    }
}

/// The encoded container a texture asset is fetched as.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum FormatVariant {
    /// WebP, decodable everywhere.
    Default,
    /// ASTC blocks in a KTX2 container, needs a registered decoder.
    Compressed,
}

impl FormatVariant {
    pub const fn extension(self) -> &'static str {
        match self {
            FormatVariant::Default => "webp",
            FormatVariant::Compressed => "ktx2",
        }
    }

    /// Guesses the variant from a path, ignoring query string and fragment.
    pub fn from_path(path: &str) -> Option<FormatVariant> {
        let path = crate::strip_query(path);
        let (_, ext) = path.rsplit_once('.')?;
        if ext.eq_ignore_ascii_case("webp") {
            Some(FormatVariant::Default)
        } else if ext.eq_ignore_ascii_case("ktx2") {
            Some(FormatVariant::Compressed)
        } else {
            None
        }
    }

    /// `<channel>.<ext>` for this variant.
    pub fn file_name(self, channel: TextureChannel) -> String {
        format!("{}.{}", channel.base_name(), self.extension())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_round_trip_through_both_spellings() {
        assert_eq!(
            TextureChannel::from_name("shN_labels"),
            Some(TextureChannel::ShLabels)
        );
        assert_eq!(
            TextureChannel::from_name("sh_labels"),
            Some(TextureChannel::ShLabels)
        );
        assert_eq!("quats".parse::<TextureChannel>().unwrap(), TextureChannel::Quats);
        assert!("quat".parse::<TextureChannel>().is_err());
    }

    #[test]
    fn variant_from_path_ignores_query() {
        assert_eq!(
            FormatVariant::from_path("files/1/2/means_l.webp?t=abc"),
            Some(FormatVariant::Default)
        );
        assert_eq!(
            FormatVariant::from_path("assets/astc6x6/means_l.KTX2"),
            Some(FormatVariant::Compressed)
        );
        assert_eq!(FormatVariant::from_path("config.json"), None);
        assert_eq!(FormatVariant::from_path("no_extension"), None);
    }

    #[test]
    fn file_names() {
        assert_eq!(
            FormatVariant::Compressed.file_name(TextureChannel::ShCentroids),
            "shN_centroids.ktx2"
        );
        assert_eq!(FormatVariant::Default.file_name(TextureChannel::Sh0), "sh0.webp");
    }
}
