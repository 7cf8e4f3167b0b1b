use kernel_debugcon::debug_trace;
use log::{LevelFilter, Log, Metadata, Record, SetLoggerError};

/// Loader-stage logger: mirrors every record to the debug port and, while
/// boot services are still up, to the UEFI text console.
pub struct UefiLogger {
    max_level: LevelFilter,
    boot_services_available: bool,
}

impl UefiLogger {
    #[must_use]
    pub const fn new(max_level: LevelFilter) -> Self {
        Self {
            max_level,
            boot_services_available: true,
        }
    }

    /// Call this once during early init.
    #[allow(
        static_mut_refs,
        clippy::missing_errors_doc,
        clippy::missing_panics_doc
    )]
    pub fn init(self) -> Result<&'static mut Self, SetLoggerError> {
        // log::set_logger wants &'static dyn Log; a static is the
        // no-alloc way to provide one.
        static mut LOGGER: Option<UefiLogger> = None;

        unsafe {
            LOGGER = Some(self);
            log::set_logger(LOGGER.as_ref().unwrap() as &'static dyn Log)?;
        }
        log::set_max_level(LevelFilter::Trace);
        unsafe { Ok(LOGGER.as_mut().expect("initialized")) }
    }

    /// Stop mirroring to the UEFI console; the debug port keeps working.
    pub const fn exit_boot_services(&mut self) {
        self.boot_services_available = false;
    }
}

impl Log for UefiLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.max_level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        // "[LEVEL] target: message", formatted straight into the sink.
        debug_trace!(
            "[{}] {}: {}\n",
            record.level(),
            record.target(),
            record.args()
        );

        // Mirror to the UEFI console as long as possible.
        if self.boot_services_available {
            uefi::println!(
                "[{}] {}: {}",
                record.level(),
                record.target(),
                record.args()
            );
        }
    }

    fn flush(&self) {
        // no-op for a port sink
    }
}
