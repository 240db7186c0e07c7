//! Raw I/O port access for the controller registers.
//!
//! Thin wrappers over `in`/`out`; everything here requires ring 0 and only
//! compiles for `target_arch = "x86"` — the pure derivations in the crate
//! root are what host builds see.

#![cfg(target_arch = "x86")]

use core::arch::asm;

/// Write a byte to an I/O port.
///
/// # Safety
///
/// Port I/O has device-specific side effects; the caller must know the port.
#[inline]
pub unsafe fn outb(port: u16, value: u8) {
    unsafe {
        asm!(
            "out dx, al",
            in("dx") port,
            in("al") value,
            options(nomem, nostack, preserves_flags)
        );
    }
}

/// Read a byte from an I/O port.
///
/// # Safety
///
/// Port I/O has device-specific side effects; the caller must know the port.
#[inline]
#[must_use]
pub unsafe fn inb(port: u16) -> u8 {
    let value: u8;
    unsafe {
        asm!(
            "in al, dx",
            in("dx") port,
            out("al") value,
            options(nomem, nostack, preserves_flags)
        );
    }
    value
}

/// Settle delay between ICW writes: a write to the unused POST port.
///
/// The 8259 needs a moment between initialization words on old hardware.
#[inline]
pub unsafe fn io_wait() {
    unsafe { outb(0x80, 0) }
}
