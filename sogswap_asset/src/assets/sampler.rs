use wgpu::{AddressMode, FilterMode, MipmapFilterMode, SamplerDescriptor};

/// Sampling parameters of a texture resource.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct SamplerState {
    pub min_filter: FilterMode,
    pub mag_filter: FilterMode,
    pub mip_filter: MipmapFilterMode,
    pub address_u: AddressMode,
    pub address_v: AddressMode,
    /// 1 means anisotropic filtering is off.
    pub anisotropy: u16,
}

impl Default for SamplerState {
    /// The engine default, which assumes a full mip chain.
    fn default() -> Self {
        Self {
            min_filter: FilterMode::Linear,
            mag_filter: FilterMode::Linear,
            mip_filter: MipmapFilterMode::Linear,
            address_u: AddressMode::Repeat,
            address_v: AddressMode::Repeat,
            anisotropy: 1,
        }
    }
}

impl SamplerState {
    /// Exact texel fetches for data textures without mip levels.
    pub const fn data_texture() -> Self {
        Self {
            min_filter: FilterMode::Nearest,
            mag_filter: FilterMode::Nearest,
            mip_filter: MipmapFilterMode::Nearest,
            address_u: AddressMode::ClampToEdge,
            address_v: AddressMode::ClampToEdge,
            anisotropy: 1,
        }
    }

    pub fn is_data_texture(&self) -> bool {
        *self == Self::data_texture()
    }

    pub fn descriptor<'a>(&self, label: Option<&'a str>) -> SamplerDescriptor<'a> {
        SamplerDescriptor {
            label,
            address_mode_u: self.address_u,
            address_mode_v: self.address_v,
            address_mode_w: AddressMode::ClampToEdge,
            mag_filter: self.mag_filter,
            min_filter: self.min_filter,
            mipmap_filter: self.mip_filter,
            anisotropy_clamp: self.anisotropy.max(1),
            ..SamplerDescriptor::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_texture_descriptor() {
        let desc = SamplerState::data_texture().descriptor(Some("means_l"));
        assert_eq!(desc.min_filter, FilterMode::Nearest);
        assert_eq!(desc.mag_filter, FilterMode::Nearest);
        assert_eq!(desc.address_mode_u, AddressMode::ClampToEdge);
        assert_eq!(desc.address_mode_v, AddressMode::ClampToEdge);
        assert_eq!(desc.anisotropy_clamp, 1);
    }

    #[test]
    fn default_is_not_a_data_texture() {
        assert!(!SamplerState::default().is_data_texture());
        assert!(SamplerState::data_texture().is_data_texture());
    }
}
