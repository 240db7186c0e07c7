//! # Task State Segment (32-bit)
//!
//! Hardware task switching is dead weight, but one field pair in the TSS is
//! still load-bearing: on any interrupt that crosses from ring 3 into ring 0
//! the CPU fetches the kernel stack to switch to from `ss0:esp0`. Without a
//! valid pair there, the first user-mode interrupt double-faults.
//!
//! The structure is the architectural 104-byte layout; everything except
//! `ss0:esp0` and the I/O bitmap offset stays zero.

use core::mem::size_of;

/// The architectural 32-bit TSS.
///
/// `iopb` set to the structure size marks the I/O permission bitmap as
/// absent, so all port I/O from ring 3 faults.
#[repr(C, packed)]
#[derive(Copy, Clone)]
pub struct Tss32 {
    pub link: u16,
    _pad_link: u16,
    /// Stack pointer loaded on a transition to ring 0.
    pub esp0: u32,
    /// Stack segment loaded on a transition to ring 0.
    pub ss0: u16,
    _pad_ss0: u16,
    pub esp1: u32,
    pub ss1: u16,
    _pad_ss1: u16,
    pub esp2: u32,
    pub ss2: u16,
    _pad_ss2: u16,
    pub cr3: u32,
    pub eip: u32,
    pub eflags: u32,
    pub eax: u32,
    pub ecx: u32,
    pub edx: u32,
    pub ebx: u32,
    pub esp: u32,
    pub ebp: u32,
    pub esi: u32,
    pub edi: u32,
    pub es: u16,
    _pad_es: u16,
    pub cs: u16,
    _pad_cs: u16,
    pub ss: u16,
    _pad_ss: u16,
    pub ds: u16,
    _pad_ds: u16,
    pub fs: u16,
    _pad_fs: u16,
    pub gs: u16,
    _pad_gs: u16,
    pub ldtr: u16,
    _pad_ldtr: u16,
    _pad_trap: u16,
    /// Offset of the I/O permission bitmap from the TSS base.
    pub iopb: u16,
}

const _: () = assert!(size_of::<Tss32>() == 104);

impl Tss32 {
    /// An empty TSS with the I/O bitmap disabled. The ring-0 stack is
    /// attached later via [`set_ring0_stack`](Self::set_ring0_stack).
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub const fn new() -> Self {
        Self {
            link: 0,
            _pad_link: 0,
            esp0: 0,
            ss0: 0,
            _pad_ss0: 0,
            esp1: 0,
            ss1: 0,
            _pad_ss1: 0,
            esp2: 0,
            ss2: 0,
            _pad_ss2: 0,
            cr3: 0,
            eip: 0,
            eflags: 0,
            eax: 0,
            ecx: 0,
            edx: 0,
            ebx: 0,
            esp: 0,
            ebp: 0,
            esi: 0,
            edi: 0,
            es: 0,
            _pad_es: 0,
            cs: 0,
            _pad_cs: 0,
            ss: 0,
            _pad_ss: 0,
            ds: 0,
            _pad_ds: 0,
            fs: 0,
            _pad_fs: 0,
            gs: 0,
            _pad_gs: 0,
            ldtr: 0,
            _pad_ldtr: 0,
            _pad_trap: 0,
            iopb: size_of::<Self>() as u16,
        }
    }

    /// Point `ss0:esp0` at the kernel stack interrupts from ring 3 will
    /// land on. Must be called before any user-mode context runs.
    #[inline]
    pub const fn set_ring0_stack(&mut self, ss0: u16, esp0: u32) {
        self.ss0 = ss0;
        self.esp0 = esp0;
    }
}

impl Default for Tss32 {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gdt::KERNEL_DS;

    #[test]
    fn iopb_marks_the_bitmap_absent() {
        let tss = Tss32::new();
        assert_eq!({ tss.iopb }, 104);
    }

    #[test]
    fn ring0_stack_lands_in_ss0_esp0() {
        let mut tss = Tss32::new();
        tss.set_ring0_stack(KERNEL_DS, 0x0009_F000);
        assert_eq!({ tss.ss0 }, 0x10);
        assert_eq!({ tss.esp0 }, 0x0009_F000);
    }
}
