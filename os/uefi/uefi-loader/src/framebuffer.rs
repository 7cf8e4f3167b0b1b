//! # GOP Framebuffer Discovery
//!
//! Locates the Graphics Output Protocol, picks a mode the compositor can
//! drive, and describes the linear framebuffer for the handoff record.
//!
//! The compositor writes 32-bit `0xAARRGGBB` pixels, which is the GOP
//! `Bgr` byte order (B,G,R,reserved little-endian), so only `Bgr` modes
//! are considered. Preference order: 1080p if offered, otherwise the
//! largest area.

use kernel_handoff::boot::FramebufferDescriptor;
use log::{info, warn};
use uefi::boot::ScopedProtocol;
use uefi::proto::console::gop::{GraphicsOutput, Mode, PixelFormat};
use uefi::{Status, boot};

/// Fetch a framebuffer the compositor can drive.
///
/// # Errors
/// Returns a [`Status`] when no GOP handle exists or no usable mode is
/// offered; callers treat this as fatal (no graphics, no boot).
pub fn get_framebuffer() -> Result<FramebufferDescriptor, Status> {
    info!("Obtaining Graphics Output Protocol (GOP)");
    let mut gop = match get_gop() {
        Ok(gop) => gop,
        Err(e) => {
            warn!("Failed to get GOP: {e:?}");
            return Err(Status::UNSUPPORTED);
        }
    };

    let Some(mode) = pick_mode(&gop) else {
        warn!("No 32-bit BGR graphics mode offered");
        return Err(Status::UNSUPPORTED);
    };
    if let Err(err) = gop.set_mode(&mode) {
        warn!("Failed to set GOP mode: {err:?}");
        return Err(Status::UNSUPPORTED);
    }

    let mode = gop.current_mode_info();
    let (width, height) = mode.resolution();
    let stride = mode.stride();

    let mut fb = gop.frame_buffer();
    let descriptor = FramebufferDescriptor {
        base_ptr: fb.as_mut_ptr() as u64,
        size_bytes: fb.size() as u64,
        width: u32::try_from(width).map_err(|_| Status::UNSUPPORTED)?,
        height: u32::try_from(height).map_err(|_| Status::UNSUPPORTED)?,
        stride: u32::try_from(stride).map_err(|_| Status::UNSUPPORTED)?,
    };

    info!(
        "Framebuffer: {}x{} px, stride {} px, {} bytes",
        descriptor.width, descriptor.height, descriptor.stride, descriptor.size_bytes
    );
    Ok(descriptor)
}

/// Prefer 1080p over others; if none is offered, pick the largest one.
fn pick_mode(gop: &ScopedProtocol<GraphicsOutput>) -> Option<Mode> {
    let usable = |mode: &Mode| mode.info().pixel_format() == PixelFormat::Bgr;

    gop.modes()
        .filter(usable)
        .find(|mode| mode.info().resolution().1 == 1080)
        .or_else(|| {
            gop.modes().filter(usable).max_by_key(|mode| {
                let (w, h) = mode.info().resolution();
                w * h
            })
        })
}

/// Fetch the Graphics Output Protocol (GOP).
fn get_gop() -> Result<ScopedProtocol<GraphicsOutput>, uefi::Error> {
    let handle = boot::get_handle_for_protocol::<GraphicsOutput>()?;
    boot::open_protocol_exclusive::<GraphicsOutput>(handle)
}
