//! # Memory Map Capture and Translation
//!
//! Exits boot services and turns the firmware's final memory map into the
//! OS-owned descriptor array carried by the handoff record.
//!
//! The firmware map is a moving target: every allocation changes it, and
//! after `ExitBootServices` no allocation is possible at all. So the
//! OS-side array is pre-allocated with headroom while the allocator is
//! still alive, and the translation walks the owned firmware map the exit
//! call returns. That covers the required "re-query after the map key
//! went stale" retry; the `uefi` crate's exit path performs it.

use alloc::vec;
use alloc::vec::Vec;
use kernel_handoff::memory::{
    MemoryMap, MemoryRegion, RegionAttributes, RegionKind, translate_firmware_map,
};
use log::info;
use uefi::boot::MemoryType;
use uefi::mem::memory_map::MemoryMap as _;
use uefi::{Status, boot};

/// Exit the UEFI boot services and capture the translated memory map.
///
/// # Errors
/// Returns a [`Status`] when the pre-allocated array turns out too small
/// or translation fails; both are fatal this late in the boot.
pub fn exit_boot_services() -> Result<MemoryMap, Status> {
    info!("Exiting boot services ...");

    // Pre-allocate the OS-owned array while the UEFI allocator is alive.
    let mut regions = match allocate_region_buffer() {
        Ok(buf) => buf,
        Err(status) => {
            return Err(status);
        }
    };

    // Exit boot services — after this, the UEFI allocator must not be
    // used anymore.
    let owned_map = unsafe { boot::exit_boot_services(None) };

    let desc_size = owned_map.meta().desc_size;
    let count = owned_map.meta().map_size / desc_size;

    let translated = match translate_firmware_map(
        owned_map.buffer(),
        desc_size,
        count,
        regions.as_mut_slice(),
    ) {
        Ok(n) => n,
        Err(e) => {
            log::error!("Memory map translation failed: {e}");
            return Err(Status::BUFFER_TOO_SMALL);
        }
    };

    let map = MemoryMap {
        regions_ptr: regions.as_ptr() as u64,
        region_count: translated as u64,
        firmware_desc_size: desc_size as u64,
    };

    // The array now belongs to the handoff record; never drop it.
    core::mem::forget(regions);

    info!("Boot services exited, we're now flying by instruments.");
    Ok(map)
}

/// Allocate the OS-owned region array sized for the memory map returned
/// from `ExitBootServices`.
///
/// This seems to be the opposite of an exact science:
/// * After boot services were exited, allocation is impossible.
/// * The number of descriptors changes over time.
///
/// As a result, we overallocate to have enough headroom to contain the
/// memory map _after_ exiting.
fn allocate_region_buffer() -> Result<Vec<MemoryRegion>, Status> {
    const EXTRA_DESCS: usize = 32;

    // Introspect the memory map.
    let probe = match boot::memory_map(MemoryType::LOADER_DATA) {
        Ok(probe) => probe,
        Err(e) => {
            log::error!("Failed to get memory map: {e:?}");
            return Err(Status::UNSUPPORTED);
        }
    };

    let desc_size = probe.meta().desc_size;
    let current_count = probe.meta().map_size / desc_size;

    // We won't use `probe`'s buffer; drop it now to reduce churn.
    drop(probe);

    // Rule of thumb: + N descriptors; N=16..64 is usually plenty in
    // QEMU/OVMF.
    let capacity = current_count + EXTRA_DESCS;

    let empty = MemoryRegion {
        kind: RegionKind::Reserved,
        physical_base: 0,
        virtual_base: 0,
        page_count: 0,
        attributes: RegionAttributes::new(),
    };
    Ok(vec![empty; capacity])
}
