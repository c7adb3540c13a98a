//! Builds minimal KTX2 containers for tests.
//!
//! Layout: 80 byte header, one 24 byte level index entry, an 8 byte data format descriptor
//! and a single 16 byte ASTC block as the only mip level.

pub const VK_FORMAT_R8G8B8A8_UNORM: u32 = 37;
pub const VK_FORMAT_ASTC_6X6_UNORM_BLOCK: u32 = 165;

const IDENTIFIER: [u8; 12] = [
    0xAB, 0x4B, 0x54, 0x58, 0x20, 0x32, 0x30, 0xBB, 0x0D, 0x0A, 0x1A, 0x0A,
];
const DFD_OFFSET: u32 = 80 + 24;
const DFD_LENGTH: u32 = 8;
const LEVEL_OFFSET: u64 = (DFD_OFFSET + DFD_LENGTH) as u64;

/// A single level 6x6 texture of the given Vulkan format.
pub fn ktx2_bytes(vk_format: u32) -> Vec<u8> {
    let block = [0x5Au8; 16];
    let mut bytes = Vec::with_capacity(LEVEL_OFFSET as usize + block.len());

    bytes.extend_from_slice(&IDENTIFIER);
    // format, type size, width, height, depth, layers, faces, levels, supercompression
    for value in [vk_format, 1, 6, 6, 0, 0, 1, 1, 0] {
        bytes.extend_from_slice(&value.to_le_bytes());
    }
    // dfd offset/length, kvd offset/length
    for value in [DFD_OFFSET, DFD_LENGTH, 0, 0] {
        bytes.extend_from_slice(&value.to_le_bytes());
    }
    // sgd offset/length, then the level index: offset, length, uncompressed length
    for value in [0, 0, LEVEL_OFFSET, block.len() as u64, block.len() as u64] {
        bytes.extend_from_slice(&value.to_le_bytes());
    }
    // dfd: total size followed by an empty block header
    bytes.extend_from_slice(&DFD_LENGTH.to_le_bytes());
    bytes.extend_from_slice(&[0; 4]);
    bytes.extend_from_slice(&block);

    bytes
}
