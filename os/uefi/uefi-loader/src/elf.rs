//! # Kernel Image Loading
//!
//! Parses the kernel ELF64 and places its `PT_LOAD` segments at the
//! physical addresses they are linked for. The kernel runs identity-mapped
//! under the firmware's page tables, so the segment's physical address is
//! its virtual address and no relocation happens here.

extern crate alloc;

use alloc::vec::Vec;
use core::mem::size_of;
use core::ptr;
use core::ptr::read_unaligned;
use uefi::Status;
use uefi::boot::{self, AllocateType, MemoryType};

const PAGE_SIZE: u64 = 4096;

// Minimal ELF64 definitions
#[repr(C)]
#[derive(Clone, Copy)]
#[allow(clippy::struct_field_names)]
struct Elf64Ehdr {
    e_ident: [u8; 16],
    e_type: u16,
    e_machine: u16,
    e_version: u32,
    e_entry: u64,
    e_phoff: u64,
    e_shoff: u64,
    e_flags: u32,
    e_ehsize: u16,
    e_phentsize: u16,
    e_phnum: u16,
    e_shentsize: u16,
    e_shnum: u16,
    e_shstrndx: u16,
}

#[repr(C)]
#[derive(Clone, Copy)]
#[allow(clippy::struct_field_names)]
struct Elf64Phdr {
    p_type: u32,
    p_flags: PFlags,
    p_offset: u64,
    p_vaddr: u64,
    p_paddr: u64,
    p_filesz: u64,
    p_memsz: u64,
    p_align: u64,
}

const PT_LOAD: u32 = 1;
const EM_X86_64: u16 = 62;

/// One loadable segment, as parsed from a program header.
#[derive(Debug, Clone, Copy)]
pub struct LoadSegment {
    pub paddr: u64,
    pub offset: u64,
    pub filesz: u64,
    pub memsz: u64,
    pub flags: PFlags,
}

/// The parsed kernel image description.
#[derive(Debug)]
pub struct KernelImage {
    pub entry: u64,
    pub segments: Vec<LoadSegment>,
}

/// Load failures. Any of these halts the boot: there is no system without
/// a kernel.
#[derive(Debug, thiserror::Error)]
pub enum KernelImageError {
    /// Not a little-endian x86-64 ELF64 executable.
    #[error("not a loadable x86-64 ELF64 image")]
    BadImage,
    /// A size or offset computation left the input bounds.
    #[error("image bounds exceeded while parsing")]
    OutOfBounds,
    /// A segment's physical page range could not be reserved.
    #[error("failed to reserve segment pages")]
    AllocationFailed(#[source] uefi::Error),
    /// A segment's file payload lies outside the image bytes.
    #[error("segment payload exceeds the image size")]
    SizeMismatch,
}

impl From<KernelImageError> for Status {
    fn from(value: KernelImageError) -> Self {
        match value {
            KernelImageError::AllocationFailed(_) => Self::OUT_OF_RESOURCES,
            KernelImageError::BadImage => Self::UNSUPPORTED,
            KernelImageError::OutOfBounds | KernelImageError::SizeMismatch => Self::LOAD_ERROR,
        }
    }
}

impl KernelImage {
    const EI_MAGIC_BYTES: [u8; 4] = [0x7F, b'E', b'L', b'F'];

    /// Parse a 64-bit little-endian x86-64 ELF image and collect its
    /// `PT_LOAD` segments.
    ///
    /// # Errors
    /// Returns [`KernelImageError`] for any validation or bounds failure.
    pub fn parse(bytes: &[u8]) -> Result<Self, KernelImageError> {
        // Bounds for header
        if bytes.len() < size_of::<Elf64Ehdr>() {
            return Err(KernelImageError::OutOfBounds);
        }

        // SAFETY: We just checked bounds; read_unaligned avoids alignment
        // assumptions about the file buffer.
        let ehdr = unsafe { read_unaligned(bytes.as_ptr().cast::<Elf64Ehdr>()) };

        // Validate magic 0x7F 'E''L''F'
        if ehdr.e_ident[0..4] != Self::EI_MAGIC_BYTES {
            return Err(KernelImageError::BadImage);
        }
        // Class = 2 (ELF64), Data = 1 (little-endian), Version = 1
        if ehdr.e_ident[4] != 2 || ehdr.e_ident[5] != 1 || ehdr.e_ident[6] != 1 {
            return Err(KernelImageError::BadImage);
        }

        if ehdr.e_machine != EM_X86_64 {
            return Err(KernelImageError::BadImage);
        }

        if ehdr.e_phentsize as usize != size_of::<Elf64Phdr>() {
            return Err(KernelImageError::BadImage);
        }

        // Program header table bounds
        let phoff = usize::try_from(ehdr.e_phoff).map_err(|_| KernelImageError::OutOfBounds)?;
        let phentsize = ehdr.e_phentsize as usize;
        let phnum = ehdr.e_phnum as usize;

        // Compute end of the table and check overflow/bounds
        let table_size = phentsize
            .checked_mul(phnum)
            .ok_or(KernelImageError::OutOfBounds)?;
        let end = phoff
            .checked_add(table_size)
            .ok_or(KernelImageError::OutOfBounds)?;
        if end > bytes.len() {
            return Err(KernelImageError::OutOfBounds);
        }

        let mut segments = Vec::new();

        for i in 0..phnum {
            let off = phoff + i * phentsize;
            // SAFETY: off + sizeof(Phdr) is within bytes by the bound
            // check above.
            let ph = unsafe { read_unaligned(bytes.as_ptr().add(off).cast::<Elf64Phdr>()) };
            if ph.p_type == PT_LOAD && ph.p_memsz != 0 {
                segments.push(LoadSegment {
                    paddr: ph.p_paddr,
                    offset: ph.p_offset,
                    filesz: ph.p_filesz,
                    memsz: ph.p_memsz,
                    flags: ph.p_flags,
                });
            }
        }

        if segments.is_empty() {
            return Err(KernelImageError::BadImage);
        }

        Ok(Self {
            entry: ehdr.e_entry,
            segments,
        })
    }

    /// Place every segment at its physical load address and return the
    /// entry point.
    ///
    /// Pages are reserved with `AllocateType::Address`, so a segment range
    /// the firmware already occupies fails loudly instead of silently
    /// corrupting it.
    ///
    /// # Errors
    /// Returns [`KernelImageError`] when reservation or copying fails.
    pub fn load(&self, bytes: &[u8]) -> Result<u64, KernelImageError> {
        for seg in &self.segments {
            let alloc_start = align_down(seg.paddr, PAGE_SIZE);
            let alloc_end = align_up(
                seg.paddr
                    .checked_add(seg.memsz)
                    .ok_or(KernelImageError::OutOfBounds)?,
                PAGE_SIZE,
            );
            let pages = usize::try_from((alloc_end - alloc_start) / PAGE_SIZE)
                .map_err(|_| KernelImageError::OutOfBounds)?;

            let mem_type = if seg.flags.execute() {
                MemoryType::LOADER_CODE
            } else {
                MemoryType::LOADER_DATA
            };

            // Reserve at the physical address the kernel is linked for.
            boot::allocate_pages(AllocateType::Address(alloc_start), mem_type, pages)
                .map_err(KernelImageError::AllocationFailed)?;

            // Zero full in-memory size (BSS tail), then copy the payload.
            let mem_len = usize::try_from(seg.memsz).map_err(|_| KernelImageError::OutOfBounds)?;
            let dst = seg.paddr as *mut u8;
            // SAFETY: the page range backing [paddr, paddr + memsz) was
            // just reserved for us.
            unsafe {
                ptr::write_bytes(dst, 0, mem_len);
            }

            if seg.filesz != 0 {
                let src_off =
                    usize::try_from(seg.offset).map_err(|_| KernelImageError::OutOfBounds)?;
                let file_len =
                    usize::try_from(seg.filesz).map_err(|_| KernelImageError::OutOfBounds)?;
                let src_end = src_off
                    .checked_add(file_len)
                    .ok_or(KernelImageError::OutOfBounds)?;
                if src_end > bytes.len() {
                    return Err(KernelImageError::SizeMismatch);
                }
                // SAFETY: source range checked against the file buffer,
                // destination reserved above.
                unsafe {
                    ptr::copy_nonoverlapping(bytes.as_ptr().add(src_off), dst, file_len);
                }
            }
        }

        Ok(self.entry)
    }
}

/// Bitfield wrapper for `Elf64_Phdr.p_flags` (32-bit)
///
/// Layout (LSB→MSB):
/// - bit 0: execute
/// - bit 1: write
/// - bit 2: read
/// - bits 3..31: reserved
#[bitfield_struct::bitfield(u32)]
pub struct PFlags {
    #[bits(1)]
    pub execute: bool,
    #[bits(1)]
    pub write: bool,
    #[bits(1)]
    pub read: bool,
    #[bits(29)]
    __: u32,
}

#[inline]
const fn align_down(x: u64, a: u64) -> u64 {
    x & !(a - 1)
}

#[inline]
const fn align_up(x: u64, a: u64) -> u64 {
    (x + (a - 1)) & !(a - 1)
}
