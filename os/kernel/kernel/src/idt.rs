//! # Interrupt Descriptor Table
//!
//! 256 eight-byte gates mapping vectors to entry points. Two gate types
//! matter here:
//!
//! - **Interrupt gates** (type `0xE`): the CPU clears `IF` on entry, so the
//!   handler runs with interrupts masked. Every transfer in this kernel uses
//!   these; the switch routine re-enables interrupts itself, at the one
//!   point in the sequence where it is safe.
//! - **Trap gates** (type `0xF`) leave `IF` alone and are deliberately not
//!   offered by the builder.
//!
//! A gate's DPL is the *invocation* privilege: `int N` from ring 3 faults
//! with #GP unless the gate's DPL is 3. Hardware-delivered interrupts ignore
//! it. The syscall gate is therefore the only DPL-3 entry in the table.
//!
//! ## Building a gate
//!
//! ```
//! # use kernel::idt::Idt;
//! # use kernel::gdt::KERNEL_CS_SEL;
//! # use kernel_frame::privilege::Dpl;
//! let mut idt = Idt::new();
//! idt.gate(0x80)
//!     .handler(0x0010_2000)
//!     .selector(KERNEL_CS_SEL)
//!     .accessible_from(Dpl::Ring3)
//!     .install();
//! ```

use bitfield_struct::bitfield;
use core::mem::size_of;
use kernel_frame::privilege::Dpl;
use kernel_frame::selector::{CodeSel, SegmentSelector};

/// Gate type nibble for a 32-bit interrupt gate.
const GATE_INTERRUPT_32: u8 = 0xE;

/// Attribute byte of an IDT gate.
///
/// ```text
/// | P | DPL(2) | S=0 | type(4) |
/// ```
#[bitfield(u8)]
#[derive(Eq, PartialEq)]
pub struct GateAttr {
    /// Gate type; `0xE` = 32-bit interrupt gate.
    #[bits(4)]
    pub typ: u8,
    /// Storage segment flag; always zero for gates.
    pub s: bool,
    /// Privilege required to invoke via `int N`.
    #[bits(2)]
    pub dpl: Dpl,
    /// Present.
    pub present: bool,
}

/// One 8-byte gate descriptor.
#[repr(C)]
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct IdtEntry {
    offset_lo: u16,
    selector: u16,
    zero: u8,
    attr: u8,
    offset_hi: u16,
}

const _: () = assert!(size_of::<IdtEntry>() == 8);

impl IdtEntry {
    /// A non-present gate; invoking it raises #NP.
    pub const MISSING: Self = Self {
        offset_lo: 0,
        selector: 0,
        zero: 0,
        attr: 0,
        offset_hi: 0,
    };

    /// The 32-bit handler address this gate transfers to.
    #[inline]
    #[must_use]
    pub const fn offset(&self) -> u32 {
        (self.offset_hi as u32) << 16 | self.offset_lo as u32
    }

    /// The code segment selector loaded on entry.
    #[inline]
    #[must_use]
    pub const fn selector(&self) -> u16 {
        self.selector
    }

    /// The decoded attribute byte.
    #[inline]
    #[must_use]
    pub const fn attr(&self) -> GateAttr {
        GateAttr::from_bits(self.attr)
    }
}

/// The table. Lives in the per-CPU block; `repr(C)` so `lidt` can point
/// straight at it.
#[repr(C, align(8))]
pub struct Idt {
    entries: [IdtEntry; 256],
}

impl Idt {
    /// A table of 256 non-present gates.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: [IdtEntry::MISSING; 256],
        }
    }

    /// Begin configuring the gate for `vector`. The gate only becomes
    /// present once [`GateOptions::install`] runs.
    pub fn gate(&mut self, vector: u8) -> GateOptions<'_> {
        GateOptions {
            entry: &mut self.entries[usize::from(vector)],
            offset: 0,
            selector: 0,
            dpl: Dpl::Ring0,
        }
    }

    /// Gate descriptor for `vector` (for tests).
    #[inline]
    #[must_use]
    pub const fn entry(&self, vector: u8) -> IdtEntry {
        self.entries[vector as usize]
    }

    /// Load this table into IDTR.
    ///
    /// # Safety
    ///
    /// Ring 0, and `self` pinned for the kernel's lifetime.
    #[cfg(target_arch = "x86")]
    pub unsafe fn load(&self) {
        #[repr(C, packed)]
        struct Idtr {
            limit: u16,
            base: u32,
        }
        let idtr = Idtr {
            limit: (size_of::<Self>() - 1) as u16,
            base: core::ptr::from_ref(self) as u32,
        };
        unsafe {
            core::arch::asm!(
                "lidt [{idtr}]",
                idtr = in(reg) &raw const idtr,
                options(nostack),
            );
        }
    }
}

impl Default for Idt {
    fn default() -> Self {
        Self::new()
    }
}

/// Fluent configuration of a single gate.
#[must_use = "the gate is not written until install() is called"]
pub struct GateOptions<'a> {
    entry: &'a mut IdtEntry,
    offset: u32,
    selector: u16,
    dpl: Dpl,
}

impl GateOptions<'_> {
    /// Entry point the gate transfers to.
    pub fn handler(mut self, offset: u32) -> Self {
        self.offset = offset;
        self
    }

    /// Code segment the handler runs in; its DPL becomes the handler's CPL,
    /// so this is always the kernel code segment here.
    pub fn selector(mut self, cs: SegmentSelector<CodeSel>) -> Self {
        self.selector = cs.encode();
        self
    }

    /// Lowest ring allowed to reach the gate with `int N`. Defaults to
    /// ring 0; the syscall vector opens it to ring 3.
    pub const fn accessible_from(mut self, dpl: Dpl) -> Self {
        self.dpl = dpl;
        self
    }

    /// Write the configured interrupt gate and mark it present.
    #[allow(clippy::cast_possible_truncation)]
    pub fn install(self) {
        let attr = GateAttr::new()
            .with_typ(GATE_INTERRUPT_32)
            .with_dpl(self.dpl)
            .with_present(true);
        *self.entry = IdtEntry {
            offset_lo: self.offset as u16,
            selector: self.selector,
            zero: 0,
            attr: attr.into_bits(),
            offset_hi: (self.offset >> 16) as u16,
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gdt::{KERNEL_CS, KERNEL_CS_SEL};

    #[test]
    fn installed_gate_splits_the_offset_and_carries_the_dpl() {
        let mut idt = Idt::new();
        idt.gate(0x80)
            .handler(0xDEAD_BEEF)
            .selector(KERNEL_CS_SEL)
            .accessible_from(Dpl::Ring3)
            .install();

        let gate = idt.entry(0x80);
        assert_eq!(gate.offset(), 0xDEAD_BEEF);
        assert_eq!(gate.selector(), KERNEL_CS);
        let attr = gate.attr();
        assert!(attr.present());
        assert!(!attr.s());
        assert_eq!(attr.typ(), GATE_INTERRUPT_32);
        assert_eq!(attr.dpl(), Dpl::Ring3);
    }

    #[test]
    fn unconfigured_gates_stay_absent() {
        let idt = Idt::new();
        assert!(!idt.entry(0x20).attr().present());
        assert_eq!(idt.entry(0x21), IdtEntry::MISSING);
    }

    #[test]
    fn hardware_gates_default_to_ring0_invocation() {
        let mut idt = Idt::new();
        idt.gate(0x20)
            .handler(0x0010_0000)
            .selector(KERNEL_CS_SEL)
            .install();
        assert_eq!(idt.entry(0x20).attr().dpl(), Dpl::Ring0);
    }
}
