//! # OS-Owned Memory Map
//!
//! The firmware reports physical memory as an array of descriptors whose
//! element size is only known at runtime and whose type numbering belongs
//! to the firmware. [`translate_firmware_map`] converts that array into the
//! OS-owned [`MemoryRegion`] form with the closed [`RegionKind`]
//! enumeration, walking the input strictly by the reported stride and
//! decoding fields with explicit little-endian reads.

/// Physical memory classification, independent of the firmware's own
/// numbering. Closed enumeration; unknown firmware types map to
/// [`RegionKind::Reserved`].
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegionKind {
    /// Not usable by the OS.
    Reserved = 0,
    /// The pre-boot stage's own code. Must stay mapped: the service
    /// pointers in the handoff record live here.
    LoaderCode = 1,
    /// The pre-boot stage's data, including the handoff record backing
    /// memory and loaded assets.
    LoaderData = 2,
    /// Firmware boot services code; reclaimable after `ExitBootServices`.
    BootServicesCode = 3,
    /// Firmware boot services data; reclaimable after `ExitBootServices`.
    BootServicesData = 4,
    /// Firmware runtime services code; must remain mapped forever.
    RuntimeServicesCode = 5,
    /// Firmware runtime services data; must remain mapped forever.
    RuntimeServicesData = 6,
    /// Free conventional memory.
    Usable = 7,
    /// Memory with detected errors.
    Unusable = 8,
    /// ACPI tables; reclaimable once parsed.
    AcpiReclaim = 9,
    /// ACPI non-volatile storage.
    AcpiNvs = 10,
    /// Memory-mapped I/O.
    Mmio = 11,
    /// Memory-mapped I/O port space.
    MmioPortSpace = 12,
    /// Firmware-private processor code.
    FirmwareCode = 13,
}

impl RegionKind {
    /// Map a firmware (UEFI) memory type number to the OS enumeration.
    ///
    /// The numbering below is the UEFI one at the time of capture; keeping
    /// the match here is what makes the rest of the system independent of
    /// it. Anything outside the known range is treated as reserved.
    #[must_use]
    pub const fn from_firmware(raw: u32) -> Self {
        match raw {
            1 => Self::LoaderCode,
            2 => Self::LoaderData,
            3 => Self::BootServicesCode,
            4 => Self::BootServicesData,
            5 => Self::RuntimeServicesCode,
            6 => Self::RuntimeServicesData,
            7 => Self::Usable,
            8 => Self::Unusable,
            9 => Self::AcpiReclaim,
            10 => Self::AcpiNvs,
            11 => Self::Mmio,
            12 => Self::MmioPortSpace,
            13 => Self::FirmwareCode,
            _ => Self::Reserved,
        }
    }

    /// Whether the region is general-purpose RAM the OS may allocate from
    /// once boot services are gone.
    #[must_use]
    pub const fn is_usable(&self) -> bool {
        matches!(
            self,
            Self::Usable | Self::BootServicesCode | Self::BootServicesData
        )
    }
}

/// Cacheability and usage attributes of a memory region.
///
/// Bit positions follow the firmware attribute word; the raw value is
/// preserved, so round-tripping loses nothing.
#[bitfield_struct::bitfield(u64)]
#[derive(PartialEq, Eq)]
pub struct RegionAttributes {
    /// Supports uncacheable access.
    #[bits(1)]
    pub uncacheable: bool,
    /// Supports write-combining.
    #[bits(1)]
    pub write_combining: bool,
    /// Supports write-through caching.
    #[bits(1)]
    pub write_through: bool,
    /// Supports write-back caching.
    #[bits(1)]
    pub write_back: bool,
    #[bits(60)]
    __: u64,
}

/// One physical memory region.
///
/// Regions are non-overlapping and collectively describe all physical
/// memory known at capture time. The array is immutable once captured for
/// the handoff.
#[repr(C)]
#[derive(Clone, Copy)]
pub struct MemoryRegion {
    /// OS classification.
    pub kind: RegionKind,

    /// Physical start address, page-aligned.
    pub physical_base: u64,

    /// Virtual start address (identity: equal to `physical_base` until
    /// someone builds real page tables).
    pub virtual_base: u64,

    /// Region length in 4 KiB pages.
    pub page_count: u64,

    /// Cacheability/usage attribute word.
    pub attributes: RegionAttributes,
}

/// The captured memory map as embedded in the handoff record.
///
/// Ownership of the backing array transfers logically to the kernel at
/// handoff; the physical backing stays where it is (`LoaderData`), so no
/// reallocation happens at the boundary. `firmware_desc_size` records the
/// stride the source array was walked with.
#[repr(C)]
#[derive(Clone, Copy)]
pub struct MemoryMap {
    /// Pointer to the first [`MemoryRegion`], as a fixed-width integer.
    pub regions_ptr: u64,

    /// Number of regions.
    pub region_count: u64,

    /// Stride of the firmware descriptor array this map was captured from.
    pub firmware_desc_size: u64,
}

impl MemoryMap {
    /// No captured map.
    pub const EMPTY: Self = Self {
        regions_ptr: 0,
        region_count: 0,
        firmware_desc_size: 0,
    };
}

/// Byte offsets of the fields inside one firmware descriptor. The
/// descriptor is `{ type: u32, <pad>, physical_start: u64, virtual_start:
/// u64, page_count: u64, attributes: u64 }`, little-endian; the reported
/// stride may append further padding.
const FW_TYPE_OFFSET: usize = 0;
const FW_PHYS_OFFSET: usize = 8;
const FW_VIRT_OFFSET: usize = 16;
const FW_PAGES_OFFSET: usize = 24;
const FW_ATTR_OFFSET: usize = 32;

/// Minimum stride that can hold the descriptor payload above.
pub const FIRMWARE_DESC_MIN_SIZE: usize = 40;

/// Errors from [`translate_firmware_map`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum TranslateError {
    /// The reported stride cannot hold a descriptor.
    #[error("firmware descriptor stride {0} is smaller than the descriptor payload")]
    StrideTooSmall(usize),
    /// The raw buffer ends before `count` descriptors.
    #[error("firmware memory map buffer truncated: {have} bytes for {needed} descriptors")]
    BufferTruncated { have: usize, needed: usize },
    /// The output slice cannot hold `count` regions.
    #[error("output buffer holds {have} regions, {needed} needed")]
    OutputTooSmall { have: usize, needed: usize },
}

/// Translate a raw firmware descriptor array into OS-owned regions.
///
/// Walks `raw` by `desc_size` (the stride the firmware reported, which
/// may exceed the packed descriptor payload) and writes `count` dense
/// [`MemoryRegion`] entries into `out`. Returns the number of regions
/// written.
pub fn translate_firmware_map(
    raw: &[u8],
    desc_size: usize,
    count: usize,
    out: &mut [MemoryRegion],
) -> Result<usize, TranslateError> {
    if desc_size < FIRMWARE_DESC_MIN_SIZE {
        return Err(TranslateError::StrideTooSmall(desc_size));
    }
    let needed = desc_size
        .checked_mul(count)
        .ok_or(TranslateError::BufferTruncated {
            have: raw.len(),
            needed: usize::MAX,
        })?;
    if raw.len() < needed {
        return Err(TranslateError::BufferTruncated {
            have: raw.len(),
            needed,
        });
    }
    if out.len() < count {
        return Err(TranslateError::OutputTooSmall {
            have: out.len(),
            needed: count,
        });
    }

    for (i, slot) in out.iter_mut().enumerate().take(count) {
        let desc = &raw[i * desc_size..i * desc_size + FIRMWARE_DESC_MIN_SIZE];
        *slot = MemoryRegion {
            kind: RegionKind::from_firmware(read_u32_le(desc, FW_TYPE_OFFSET)),
            physical_base: read_u64_le(desc, FW_PHYS_OFFSET),
            virtual_base: read_u64_le(desc, FW_VIRT_OFFSET),
            page_count: read_u64_le(desc, FW_PAGES_OFFSET),
            attributes: RegionAttributes::from_bits(read_u64_le(desc, FW_ATTR_OFFSET)),
        };
    }
    Ok(count)
}

fn read_u32_le(bytes: &[u8], offset: usize) -> u32 {
    let mut b = [0u8; 4];
    b.copy_from_slice(&bytes[offset..offset + 4]);
    u32::from_le_bytes(b)
}

fn read_u64_le(bytes: &[u8], offset: usize) -> u64 {
    let mut b = [0u8; 8];
    b.copy_from_slice(&bytes[offset..offset + 8]);
    u64::from_le_bytes(b)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Encode one firmware descriptor at the given stride.
    fn fw_desc(stride: usize, kind: u32, phys: u64, pages: u64, attr: u64) -> Vec<u8> {
        let mut d = vec![0u8; stride];
        d[FW_TYPE_OFFSET..FW_TYPE_OFFSET + 4].copy_from_slice(&kind.to_le_bytes());
        d[FW_PHYS_OFFSET..FW_PHYS_OFFSET + 8].copy_from_slice(&phys.to_le_bytes());
        d[FW_VIRT_OFFSET..FW_VIRT_OFFSET + 8].copy_from_slice(&phys.to_le_bytes());
        d[FW_PAGES_OFFSET..FW_PAGES_OFFSET + 8].copy_from_slice(&pages.to_le_bytes());
        d[FW_ATTR_OFFSET..FW_ATTR_OFFSET + 8].copy_from_slice(&attr.to_le_bytes());
        d
    }

    #[test]
    fn translates_with_padded_stride() {
        // Firmware commonly reports 48-byte descriptors even though the
        // payload is 40 bytes; the walk must honor the reported stride.
        let stride = 48;
        let mut raw = Vec::new();
        raw.extend(fw_desc(stride, 7, 0x10_0000, 256, 0xF));
        raw.extend(fw_desc(stride, 2, 0x5000_0000, 16, 0x8));
        raw.extend(fw_desc(stride, 11, 0xFEC0_0000, 1, 0x1));

        let mut out = [MemoryRegion {
            kind: RegionKind::Reserved,
            physical_base: 0,
            virtual_base: 0,
            page_count: 0,
            attributes: RegionAttributes::new(),
        }; 4];
        let n = translate_firmware_map(&raw, stride, 3, &mut out).unwrap();
        assert_eq!(n, 3);

        assert_eq!(out[0].kind, RegionKind::Usable);
        assert_eq!(out[0].physical_base, 0x10_0000);
        assert_eq!(out[0].page_count, 256);
        assert!(out[0].attributes.write_back());

        assert_eq!(out[1].kind, RegionKind::LoaderData);
        assert_eq!(out[2].kind, RegionKind::Mmio);
    }

    #[test]
    fn unknown_firmware_type_becomes_reserved() {
        assert_eq!(RegionKind::from_firmware(0xDEAD), RegionKind::Reserved);
        assert_eq!(RegionKind::from_firmware(14), RegionKind::Reserved);
    }

    #[test]
    fn firmware_numbering_is_not_assumed_identical() {
        // The mapping is total over the known range.
        for raw in 0..14u32 {
            let kind = RegionKind::from_firmware(raw);
            assert_eq!(kind as u32, raw);
        }
    }

    #[test]
    fn truncated_buffer_is_rejected() {
        let raw = fw_desc(48, 7, 0, 1, 0);
        let mut out = [MemoryRegion {
            kind: RegionKind::Reserved,
            physical_base: 0,
            virtual_base: 0,
            page_count: 0,
            attributes: RegionAttributes::new(),
        }; 2];
        let err = translate_firmware_map(&raw, 48, 2, &mut out).unwrap_err();
        assert_eq!(
            err,
            TranslateError::BufferTruncated {
                have: 48,
                needed: 96
            }
        );
    }

    #[test]
    fn undersized_stride_is_rejected() {
        let raw = [0u8; 64];
        let mut out: [MemoryRegion; 0] = [];
        let err = translate_firmware_map(&raw, 32, 1, &mut out).unwrap_err();
        assert_eq!(err, TranslateError::StrideTooSmall(32));
    }

    #[test]
    fn boot_services_memory_counts_as_usable() {
        assert!(RegionKind::Usable.is_usable());
        assert!(RegionKind::BootServicesCode.is_usable());
        assert!(RegionKind::BootServicesData.is_usable());
        assert!(!RegionKind::LoaderCode.is_usable());
        assert!(!RegionKind::RuntimeServicesData.is_usable());
    }
}
