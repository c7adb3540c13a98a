//! Decoders for the two texture containers a splat channel can ship in.

use crate::capability::CapabilityFlag;
use image::ImageFormat;
use snafu::{OptionExt, ResultExt, Snafu, ensure};
use sogswap_asset::{DecodePath, FormatVariant, TextureResource};
use tracing::trace;
use wgpu::{AstcBlock, AstcChannel, TextureFormat};

#[derive(Debug, Snafu)]
#[snafu(context(suffix(Err)))]
pub enum ParseError {
    #[snafu(display("failed to decode image: {source}"))]
    Image { source: image::ImageError },

    #[snafu(display("failed to read KTX2 container: {source}"))]
    Ktx2 { source: ktx2::ParseError },

    #[snafu(display("KTX2 container does not declare a format"))]
    Ktx2MissingFormat,

    #[snafu(display("KTX2 format {format:?} is not an ASTC block format"))]
    Ktx2UnsupportedFormat { format: ktx2::Format },

    #[snafu(display("KTX2 supercompression is not supported"))]
    Ktx2Supercompressed,

    #[snafu(display("KTX2 container has no image data"))]
    Ktx2Empty,
}

/// Turns the bytes of one container format into a [`TextureResource`].
pub trait TextureParser {
    fn name(&self) -> &'static str;

    fn variant(&self) -> FormatVariant;

    fn parse(&self, bytes: &[u8]) -> Result<TextureResource, ParseError>;
}

/// Decodes the default WebP variant to linear RGBA8.
#[derive(Debug, Default, Copy, Clone)]
pub struct WebpParser;

impl TextureParser for WebpParser {
    fn name(&self) -> &'static str {
        "webp"
    }

    fn variant(&self) -> FormatVariant {
        FormatVariant::Default
    }

    fn parse(&self, bytes: &[u8]) -> Result<TextureResource, ParseError> {
        let image = image::load_from_memory_with_format(bytes, ImageFormat::WebP)
            .context(ImageErr)?
            .into_rgba8();

        Ok(TextureResource::builder()
            .width(image.width())
            .height(image.height())
            // data textures hold raw values, never gamma encoded colour
            .format(TextureFormat::Rgba8Unorm)
            .data(image.into_raw())
            .build())
    }
}

/// Reads ASTC blocks out of a KTX2 container.
///
/// Without hardware ASTC support the blocks are still accepted; the resource is flagged
/// for software expansion before upload.
#[derive(Debug, Default, Copy, Clone)]
pub struct Ktx2Parser {
    capability: CapabilityFlag,
}

impl Ktx2Parser {
    pub fn new(capability: CapabilityFlag) -> Self {
        Self { capability }
    }

    fn decode_path(&self) -> DecodePath {
        if self.capability.is_supported() {
            DecodePath::HardwareAstc
        } else {
            DecodePath::SoftwareAstc
        }
    }
}

impl TextureParser for Ktx2Parser {
    fn name(&self) -> &'static str {
        "ktx2"
    }

    fn variant(&self) -> FormatVariant {
        FormatVariant::Compressed
    }

    fn parse(&self, bytes: &[u8]) -> Result<TextureResource, ParseError> {
        let reader = ktx2::Reader::new(bytes).context(Ktx2Err)?;
        let header = reader.header();

        ensure!(
            header.supercompression_scheme.is_none(),
            Ktx2SupercompressedErr
        );

        let ktx_format = header.format.context(Ktx2MissingFormatErr)?;
        let format = astc_format(ktx_format).context(Ktx2UnsupportedFormatErr {
            format: ktx_format,
        })?;

        let base_level = reader.levels().next().context(Ktx2EmptyErr)?;
        ensure!(!base_level.data.is_empty(), Ktx2EmptyErr);

        let decode_path = self.decode_path();
        trace!(
            "Read {}x{} {format:?} KTX2 texture ({decode_path:?})",
            header.pixel_width, header.pixel_height
        );

        Ok(TextureResource::builder()
            .width(header.pixel_width)
            .height(header.pixel_height.max(1))
            .format(format)
            .mip_level_count(header.level_count.max(1))
            .data(base_level.data.to_vec())
            .decode_path(decode_path)
            .build())
    }
}

fn astc_format(format: ktx2::Format) -> Option<TextureFormat> {
    use ktx2::Format as K;

    let (block, channel) = match format {
        K::ASTC_4x4_UNORM_BLOCK => (AstcBlock::B4x4, AstcChannel::Unorm),
        K::ASTC_4x4_SRGB_BLOCK => (AstcBlock::B4x4, AstcChannel::UnormSrgb),
        K::ASTC_5x5_UNORM_BLOCK => (AstcBlock::B5x5, AstcChannel::Unorm),
        K::ASTC_5x5_SRGB_BLOCK => (AstcBlock::B5x5, AstcChannel::UnormSrgb),
        K::ASTC_6x6_UNORM_BLOCK => (AstcBlock::B6x6, AstcChannel::Unorm),
        K::ASTC_6x6_SRGB_BLOCK => (AstcBlock::B6x6, AstcChannel::UnormSrgb),
        K::ASTC_8x8_UNORM_BLOCK => (AstcBlock::B8x8, AstcChannel::Unorm),
        K::ASTC_8x8_SRGB_BLOCK => (AstcBlock::B8x8, AstcChannel::UnormSrgb),
        _ => return None,
    };

    Some(TextureFormat::Astc { block, channel })
}

#[cfg(test)]
#[path = "../../../tests/common/ktx2_fixture.rs"]
mod ktx2_fixture;
