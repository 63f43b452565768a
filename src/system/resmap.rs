//! Physical memory ranges from the registry resource map
//!
//! User mode has no direct call for the physical memory range list; the
//! translated hardware resource map under HKLM\HARDWARE\RESOURCEMAP carries
//! the same ranges as a serialized CM_RESOURCE_LIST. The parser below walks
//! that layout (4-byte packed, 20-byte partial descriptors) and keeps the
//! plain and large memory descriptors.

use windows::core::w;
use windows::Win32::System::Registry::HKEY_LOCAL_MACHINE;

use crate::ffi::RegistryKey;
use crate::snapshot::source::PhysicalRange;

const FULL_DESCRIPTOR_HEADER: usize = 16;
const PARTIAL_DESCRIPTOR_SIZE: usize = 20;

const CM_RESOURCE_TYPE_MEMORY: u8 = 3;
const CM_RESOURCE_TYPE_MEMORY_LARGE: u8 = 7;

const CM_RESOURCE_MEMORY_LARGE_40: u16 = 0x0200;
const CM_RESOURCE_MEMORY_LARGE_48: u16 = 0x0400;
const CM_RESOURCE_MEMORY_LARGE_64: u16 = 0x0800;

/// Reads the translated physical memory range list, or `None` when the
/// resource map is unavailable or malformed.
pub fn physical_memory_ranges() -> Option<Vec<PhysicalRange>> {
    let key = RegistryKey::open(
        HKEY_LOCAL_MACHINE,
        w!("HARDWARE\\RESOURCEMAP\\System Resources\\Physical Memory"),
    )
    .ok()?;
    let data = key.read_raw_value(w!(".Translated")).ok()?;
    parse_resource_list(&data)
}

/// Parses a serialized CM_RESOURCE_LIST into memory ranges.
fn parse_resource_list(data: &[u8]) -> Option<Vec<PhysicalRange>> {
    let full_count = read_u32(data, 0)? as usize;
    let mut ranges = Vec::new();
    let mut offset = 4usize;

    for _ in 0..full_count {
        // Full descriptor: interface type u32, bus number u32, then the
        // partial list header (version u16, revision u16, count u32).
        let partial_count = read_u32(data, offset + 12)? as usize;
        offset += FULL_DESCRIPTOR_HEADER;

        for _ in 0..partial_count {
            let descriptor_type = *data.get(offset)?;
            let flags = read_u16(data, offset + 2)?;
            let start = read_u64(data, offset + 4)?;
            let length = read_u32(data, offset + 12)?;

            match descriptor_type {
                CM_RESOURCE_TYPE_MEMORY => {
                    ranges.push(PhysicalRange { base: start, bytes: u64::from(length) });
                }
                CM_RESOURCE_TYPE_MEMORY_LARGE => {
                    // Large descriptors scale the 32-bit length field.
                    let bytes = if flags & CM_RESOURCE_MEMORY_LARGE_40 != 0 {
                        u64::from(length) << 8
                    } else if flags & CM_RESOURCE_MEMORY_LARGE_48 != 0 {
                        u64::from(length) << 16
                    } else if flags & CM_RESOURCE_MEMORY_LARGE_64 != 0 {
                        u64::from(length) << 32
                    } else {
                        u64::from(length)
                    };
                    ranges.push(PhysicalRange { base: start, bytes });
                }
                _ => {}
            }

            offset += PARTIAL_DESCRIPTOR_SIZE;
        }
    }

    Some(ranges)
}

fn read_u16(data: &[u8], offset: usize) -> Option<u16> {
    let raw: [u8; 2] = data.get(offset..offset + 2)?.try_into().ok()?;
    Some(u16::from_le_bytes(raw))
}

fn read_u32(data: &[u8], offset: usize) -> Option<u32> {
    let raw: [u8; 4] = data.get(offset..offset + 4)?.try_into().ok()?;
    Some(u32::from_le_bytes(raw))
}

fn read_u64(data: &[u8], offset: usize) -> Option<u64> {
    let raw: [u8; 8] = data.get(offset..offset + 8)?.try_into().ok()?;
    Some(u64::from_le_bytes(raw))
}
