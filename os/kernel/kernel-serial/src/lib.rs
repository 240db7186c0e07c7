//! # Serial (16550 UART) debug output
//!
//! Kernel logging has to work before anything else does: no allocator, no
//! scheduler, interrupts possibly masked. This crate routes the `log` crate
//! to COM1, the one output channel a legacy-BIOS machine (and every
//! emulator) reliably has.
//!
//! ## Components
//!
//! - [`SerialPort`] — minimal 16550 programming: 8N1, FIFO on, polled TX.
//! - [`SerialLogger`] — a `log::Log` implementation formatting records
//!   straight into the UART, one `[LEVEL] target: message` line each.
//! - [`write_byte`] — the raw sink, also the backing store of the
//!   `write_byte` debug syscall.
//!
//! ## Feature `enabled`
//!
//! With the (default) `enabled` feature off, every operation is a no-op and
//! no port I/O is compiled in. Host builds additionally compile the port
//! layer out regardless of the feature, so the crate builds anywhere.
//!
//! ## Concurrency
//!
//! The transmitter is a single shared device; output goes through an
//! [`IrqLock`](kernel_sync::IrqLock) so a handler logging mid-line cannot
//! interleave with the interrupted context's line.

#![cfg_attr(not(any(test, doctest)), no_std)]
#![allow(unsafe_code)]

mod logger;
mod uart;

pub use logger::SerialLogger;
pub use uart::{COM1, SerialPort, divisor_for_baud};

use kernel_sync::IrqLock;

static PORT: IrqLock<SerialPort> = IrqLock::new(SerialPort::com1());

/// Emit one raw byte on COM1. Best effort; silently dropped when the UART
/// is compiled out.
pub fn write_byte(byte: u8) {
    PORT.with_lock(|p| p.put(byte));
}

/// Format into COM1, taking the sink lock once for the whole record.
pub fn write_fmt(args: core::fmt::Arguments<'_>) {
    use core::fmt::Write;
    PORT.with_lock(|p| {
        // Writing to the UART cannot fail; the Err is a fmt artifact.
        let _ = p.write_fmt(args);
    });
}

/// Direct formatted output bypassing the `log` framework, for paths where
/// the logger is not installed yet.
#[macro_export]
macro_rules! serial_trace {
    ($($arg:tt)*) => {
        $crate::write_fmt(core::format_args!($($arg)*))
    };
}
