//! # Kernel Entry Point
//!
//! The kernel side of the handoff: receive the record by value, check
//! which services the pre-boot stage offers, run the fixed demonstration
//! sequence, halt. A scheduler will eventually replace the demonstration;
//! the service-table contract is the part that stays.

#![no_std]
#![no_main]
#![allow(unsafe_code)]

mod tracing;

use kernel_handoff::boot::HandoffRecord;
use log::{LevelFilter, info};

#[panic_handler]
fn panic(_info: &core::panic::PanicInfo) -> ! {
    halt()
}

/// Stack size.
const BOOT_STACK_SIZE: usize = 64 * 1024;

/// 16-byte aligned stack
#[repr(align(16))]
struct Aligned<const N: usize>([u8; N]);

#[unsafe(link_section = ".bss.boot")]
#[unsafe(no_mangle)]
static mut BOOT_STACK: Aligned<BOOT_STACK_SIZE> = Aligned([0; BOOT_STACK_SIZE]);

/// The kernel entry point
///
/// # Loader Interaction
/// The pre-boot stage jumps here after `ExitBootServices` with interrupts
/// masked and the record pointer in `RCX` (`win64` contract).
///
/// # Naked function & Stack
/// This is a naked function in order to set up the stack ourselves.
/// Without the `naked` attribute the compiler would assume a valid call
/// frame already exists; we are standing on the loader's stack and switch
/// to our own before any Rust code runs.
#[unsafe(no_mangle)]
#[unsafe(naked)]
pub extern "win64" fn _start(_record: *const HandoffRecord) {
    core::arch::naked_asm!(
        "cli",

        // save RCX (record pointer per win64)
        "mov r12, rcx",

        // Build our own kernel stack and establish a valid call frame
        "lea rax, [rip + {stack_sym}]",
        "add rax, {stack_size}",
        // Align down to 16
        "and rax, -16",
        // Set RSP to the prepared value
        "mov rsp, rax",
        // Emulate a CALL by pushing a dummy return address (so RSP % 16 == 8 at entry)
        "push 0",
        "xor rbp, rbp",

        // Record pointer into the C-ABI argument register
        "mov rdi, r12",

        // Jump to the Rust entry and never return
        "jmp {rust_entry}",
        stack_sym = sym BOOT_STACK,
        stack_size = const BOOT_STACK_SIZE,
        rust_entry = sym kernel_entry,
    );
}

/// Kernel entry running on our own stack.
///
/// # Notes
/// * `no_mangle` so [`_start`] can jump to it by name.
/// * C ABI for a defined convention when arriving from assembly.
#[unsafe(no_mangle)]
extern "C" fn kernel_entry(record: *const HandoffRecord) -> ! {
    // Consume the record by value: one move into our own frame. The
    // loader-side storage is never read again and the embedded cursors
    // are ours to mutate from here on.
    // SAFETY: the loader hands us a valid record pointer exactly once.
    let mut record = unsafe { core::ptr::read(record) };

    let _ = kernel_debugcon::DebugconLogger::new(LevelFilter::Debug).init();
    info!("kernel entered, record consumed");
    tracing::trace_boot_state(&record);

    demo(&mut record)
}

/// The fixed demonstration sequence: refresh the wallpaper, re-render the
/// terminal window, greet. Every service is offered-or-absent; a `None`
/// entry is skipped, not substituted.
fn demo(record: &mut HandoffRecord) -> ! {
    let services = record.services;

    if let Some(refresh_wallpaper) = services.refresh_wallpaper {
        // SAFETY: the record is live and the loader image stays mapped.
        unsafe { refresh_wallpaper(core::ptr::from_mut(record)) };
    } else {
        info!("wallpaper service not offered");
    }

    if let Some(render_terminal) = services.render_terminal {
        // SAFETY: as above.
        unsafe { render_terminal(core::ptr::from_mut(record), 250, 50) };
    } else {
        info!("terminal service not offered");
    }

    if let Some(term_write) = services.term_write {
        let greeting = b"kernel: handoff complete";
        // SAFETY: as above; the text range is a live static.
        unsafe {
            term_write(
                core::ptr::from_mut(record),
                greeting.as_ptr(),
                greeting.len(),
                0xFF00_FF00,
            );
        };
    } else {
        info!("text service not offered");
    }

    info!("demonstration done; halting");
    halt()
}

/// Mask interrupts and halt forever; the only termination mode there is.
fn halt() -> ! {
    unsafe {
        loop {
            core::arch::asm!("cli", "hlt", options(nomem, nostack));
        }
    }
}
