//! # Trace output

use kernel_debugcon::debug_trace;
use kernel_handoff::boot::HandoffRecord;
use kernel_handoff::memory::MemoryRegion;

/// Log the hardware state the loader handed over.
pub fn trace_boot_state(record: &HandoffRecord) {
    debug_trace!(
        "framebuffer: {}x{} px, stride {} px @ {:#x}\n",
        record.framebuffer.width,
        record.framebuffer.height,
        record.framebuffer.stride,
        record.framebuffer.base_ptr
    );
    debug_trace!(
        "memory map: {} regions (firmware stride {})\n",
        record.memory_map.region_count,
        record.memory_map.firmware_desc_size
    );

    let usable = usable_pages(record);
    debug_trace!("usable memory: {} pages\n", usable);
    debug_trace!(
        "font {}, wallpaper {}\n",
        if record.font.is_available() {
            "present"
        } else {
            "absent"
        },
        if record.wallpaper.is_available() {
            "present"
        } else {
            "absent"
        }
    );
}

/// Sum usable pages from the translated map.
fn usable_pages(record: &HandoffRecord) -> u64 {
    if record.memory_map.regions_ptr == 0 {
        return 0;
    }
    // SAFETY: the loader captured the map into memory that stays mapped;
    // count and pointer describe the live array.
    let regions = unsafe {
        core::slice::from_raw_parts(
            record.memory_map.regions_ptr as *const MemoryRegion,
            record.memory_map.region_count as usize,
        )
    };
    regions
        .iter()
        .filter(|r| r.kind.is_usable())
        .map(|r| r.page_count)
        .sum()
}
