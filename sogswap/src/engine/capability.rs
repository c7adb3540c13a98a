//! One-shot detection of hardware ASTC support.
//!
//! The result is informational: it decides the decode path of KTX2 payloads and shows up in
//! the logs, but never whether the compressed variant is requested.

use tracing::{info, warn};
use wgpu::Features;

pub const ASTC_EXTENSION: &str = "WEBGL_compressed_texture_astc";
pub const ASTC_EXTENSION_WEBKIT: &str = "WEBKIT_WEBGL_compressed_texture_astc";

/// Anything that can answer whether a named graphics extension is present.
pub trait GraphicsContext {
    fn has_extension(&self, name: &str) -> bool;
}

impl GraphicsContext for Features {
    fn has_extension(&self, name: &str) -> bool {
        let lower = name.to_ascii_lowercase();
        if lower.contains("astc") {
            self.contains(Features::TEXTURE_COMPRESSION_ASTC)
        } else if lower.contains("etc") {
            self.contains(Features::TEXTURE_COMPRESSION_ETC2)
        } else if lower.contains("s3tc") || lower.contains("bptc") {
            self.contains(Features::TEXTURE_COMPRESSION_BC)
        } else {
            false
        }
    }
}

impl GraphicsContext for wgpu::Adapter {
    fn has_extension(&self, name: &str) -> bool {
        self.features().has_extension(name)
    }
}

impl<S: AsRef<str>> GraphicsContext for [S] {
    fn has_extension(&self, name: &str) -> bool {
        self.iter().any(|ext| ext.as_ref() == name)
    }
}

impl<S: AsRef<str>, const N: usize> GraphicsContext for [S; N] {
    fn has_extension(&self, name: &str) -> bool {
        self.as_slice().has_extension(name)
    }
}

impl<S: AsRef<str>> GraphicsContext for Vec<S> {
    fn has_extension(&self, name: &str) -> bool {
        self.as_slice().has_extension(name)
    }
}

#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct CapabilityFlag(pub bool);

impl CapabilityFlag {
    pub fn is_supported(self) -> bool {
        self.0
    }
}

/// Queries both the standard and the prefixed ASTC extension name.
pub fn probe_compressed_texture_support(
    context: &(impl GraphicsContext + ?Sized),
) -> CapabilityFlag {
    let supported =
        context.has_extension(ASTC_EXTENSION) || context.has_extension(ASTC_EXTENSION_WEBKIT);

    if supported {
        info!("ASTC texture compression is supported");
    } else {
        warn!("ASTC texture compression is not supported, KTX2 payloads will be expanded in software");
    }

    CapabilityFlag(supported)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn either_extension_name_counts() {
        assert!(probe_compressed_texture_support(&[ASTC_EXTENSION]).is_supported());
        assert!(probe_compressed_texture_support(&vec![ASTC_EXTENSION_WEBKIT]).is_supported());
        assert!(
            !probe_compressed_texture_support(&["WEBGL_compressed_texture_s3tc"]).is_supported()
        );
        assert!(!probe_compressed_texture_support(&Vec::<String>::new()).is_supported());
    }

    #[test]
    fn wgpu_features_map_to_extension_names() {
        let features = Features::TEXTURE_COMPRESSION_ASTC;
        assert!(probe_compressed_texture_support(&features).is_supported());
        assert!(!features.has_extension("WEBGL_compressed_texture_s3tc"));

        assert!(!probe_compressed_texture_support(&Features::TEXTURE_COMPRESSION_BC).is_supported());
    }
}
