use crate::SamplerState;
use bon::Builder;
use wgpu::TextureFormat;

/// How the payload ends up in GPU memory.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub enum DecodePath {
    /// Plain texels, uploaded as is.
    #[default]
    Uncompressed,
    /// ASTC blocks sampled by the GPU directly.
    HardwareAstc,
    /// ASTC blocks the engine expands to RGBA before upload.
    SoftwareAstc,
}

/// A decoded texture owned by an [`AssetDescriptor`](crate::AssetDescriptor).
#[derive(Debug, Clone, Builder)]
pub struct TextureResource {
    pub width: u32,
    pub height: u32,
    pub format: TextureFormat,
    #[builder(default = 1)]
    pub mip_level_count: u32,
    #[builder(default)]
    pub data: Vec<u8>,
    #[builder(default)]
    pub sampler: SamplerState,
    #[builder(default)]
    pub decode_path: DecodePath,
    #[builder(skip)]
    pending_upload: bool,
    #[builder(skip)]
    upload_requests: u32,
}

impl TextureResource {
    /// Marks the texture to be uploaded to the GPU again, e.g. after its sampler changed.
    pub fn request_upload(&mut self) {
        self.pending_upload = true;
        self.upload_requests += 1;
    }

    /// Consumes a pending upload request. Returns whether one was pending.
    pub fn take_upload(&mut self) -> bool {
        std::mem::take(&mut self.pending_upload)
    }

    pub fn has_pending_upload(&self) -> bool {
        self.pending_upload
    }

    pub fn upload_requests(&self) -> u32 {
        self.upload_requests
    }

    pub fn is_compressed(&self) -> bool {
        self.format.is_compressed()
    }
}
