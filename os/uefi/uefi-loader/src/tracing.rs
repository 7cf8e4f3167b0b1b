//! # Trace output

use kernel_debugcon::debug_trace;
use kernel_handoff::boot::HandoffRecord;
use kernel_handoff::memory::{MemoryRegion, RegionKind};

/// Dump the assembled handoff record to the debug port.
pub fn trace_record(record: &HandoffRecord) {
    debug_trace!("Handoff record in UEFI loader:\n");
    debug_trace!(
        "   record ptr = {:018x}\n",
        core::ptr::from_ref(record) as usize
    );
    debug_trace!("   FB ptr = {:018x}", record.framebuffer.base_ptr);
    debug_trace!(", FB size = {}", record.framebuffer.size_bytes);
    debug_trace!(
        ", FB {}x{} px, stride = {}\n",
        record.framebuffer.width,
        record.framebuffer.height,
        record.framebuffer.stride
    );
    debug_trace!(" MMAP ptr = {:018x}", record.memory_map.regions_ptr);
    debug_trace!(", regions = {}", record.memory_map.region_count);
    debug_trace!(
        ", firmware desc size = {}\n",
        record.memory_map.firmware_desc_size
    );
    debug_trace!(
        " font: {}",
        if record.font.is_available() {
            "loaded"
        } else {
            "unavailable"
        }
    );
    debug_trace!(
        ", wallpaper: {}\n",
        if record.wallpaper.is_available() {
            "loaded"
        } else {
            "unavailable"
        }
    );
    debug_trace!(
        " services: wallpaper={} refresh={} terminal={} text={} term={}\n",
        record.services.render_wallpaper.is_some(),
        record.services.refresh_wallpaper.is_some(),
        record.services.render_terminal.is_some(),
        record.services.write_text.is_some(),
        record.services.term_write.is_some()
    );

    trace_usable_pages(record);
}

/// Sum up usable pages from the translated map.
fn trace_usable_pages(record: &HandoffRecord) {
    if record.memory_map.regions_ptr == 0 {
        return;
    }
    // SAFETY: the record's map was just translated into a live array.
    let regions = unsafe {
        core::slice::from_raw_parts(
            record.memory_map.regions_ptr as *const MemoryRegion,
            record.memory_map.region_count as usize,
        )
    };
    let mut usable = 0u64;
    let mut loader = 0u64;
    for region in regions {
        if region.kind.is_usable() {
            usable += region.page_count;
        }
        if matches!(region.kind, RegionKind::LoaderCode | RegionKind::LoaderData) {
            loader += region.page_count;
        }
    }
    debug_trace!(" usable pages = {usable}, loader pages = {loader}\n");
}
