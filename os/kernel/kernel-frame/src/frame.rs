//! # The Register Frame
//!
//! A [`RegisterFrame`] is the complete CPU state needed to resume a context.
//! Its layout mirrors, byte for byte, what the interrupt entry path leaves on
//! the kernel stack, from the lowest address up:
//!
//! ```text
//!  offset  field    pushed by
//!  ------  -------  -----------------------------------
//!   0x00   gs       entry stub (`push gs`, pushed last)
//!   0x04   fs       entry stub
//!   0x08   es       entry stub
//!   0x0c   ds       entry stub (pushed first of the four)
//!   0x10   edi      `pusha`
//!   0x14   esi      `pusha`
//!   0x18   ebp      `pusha`
//!   0x1c   esp_k    `pusha` (pre-`pusha` ESP; ignored on restore)
//!   0x20   ebx      `pusha`
//!   0x24   edx      `pusha`
//!   0x28   ecx      `pusha`
//!   0x2c   eax      `pusha`
//!   0x30   eip      CPU
//!   0x34   cs       CPU
//!   0x38   eflags   CPU
//!   0x3c   esp      CPU, only on a ring transition
//!   0x40   ss       CPU, only on a ring transition
//! ```
//!
//! The order IS the contract: the restore path walks this memory with
//! `pop`/`popa`/`iret` and has no way to tolerate a permutation. Compile-time
//! assertions below pin every offset.
//!
//! ## Ownership
//!
//! The kernel exclusively owns all frames. A frame is a snapshot of exactly
//! one suspended context and must not be mutated while it is being restored;
//! the switch routine takes it by shared borrow and the CPU owns the state
//! from the moment `iret` executes until the next interrupt.

use crate::Eflags;
use crate::privilege::{Ring, Rpl};
use crate::selector::{CodeSel, DataSel, SegmentSelector};
use core::mem::{offset_of, size_of};

/// Fixed-layout snapshot of CPU-visible state.
///
/// Segment selector fields occupy full 32-bit slots because that is what
/// `push ds` et al. produce in 32-bit mode; only the low 16 bits are
/// meaningful. The `esp`/`ss` tail is only meaningful when the frame resumes
/// a more-restricted ring (see [`crate::IretImage`]).
#[repr(C)]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct RegisterFrame {
    /// Extra segment `GS` (low 16 bits).
    pub gs: u32,
    /// Extra segment `FS` (low 16 bits).
    pub fs: u32,
    /// Extra segment `ES` (low 16 bits).
    pub es: u32,
    /// Data segment `DS` (low 16 bits).
    pub ds: u32,

    /// General-purpose registers in `pusha` memory order.
    pub edi: u32,
    pub esi: u32,
    pub ebp: u32,
    /// The kernel-stack ESP `pusha` saved; `popa` discards it.
    pub esp_k: u32,
    pub ebx: u32,
    pub edx: u32,
    pub ecx: u32,
    pub eax: u32,

    /// Resume point.
    pub eip: u32,
    /// Code segment of the resume point; its RPL is the destination CPL.
    pub cs: u32,
    /// Saved flags register.
    pub eflags: u32,

    /// Destination stack pointer; only valid for ring transitions.
    pub esp: u32,
    /// Destination stack segment; only valid for ring transitions.
    pub ss: u32,
}

// The layout contract. A failed assertion here means the entry stubs and the
// restore path no longer agree on where anything lives.
const _: () = {
    assert!(size_of::<RegisterFrame>() == 0x44);
    assert!(offset_of!(RegisterFrame, gs) == 0x00);
    assert!(offset_of!(RegisterFrame, fs) == 0x04);
    assert!(offset_of!(RegisterFrame, es) == 0x08);
    assert!(offset_of!(RegisterFrame, ds) == 0x0c);
    assert!(offset_of!(RegisterFrame, edi) == 0x10);
    assert!(offset_of!(RegisterFrame, esi) == 0x14);
    assert!(offset_of!(RegisterFrame, ebp) == 0x18);
    assert!(offset_of!(RegisterFrame, esp_k) == 0x1c);
    assert!(offset_of!(RegisterFrame, ebx) == 0x20);
    assert!(offset_of!(RegisterFrame, edx) == 0x24);
    assert!(offset_of!(RegisterFrame, ecx) == 0x28);
    assert!(offset_of!(RegisterFrame, eax) == 0x2c);
    assert!(offset_of!(RegisterFrame, eip) == 0x30);
    assert!(offset_of!(RegisterFrame, cs) == 0x34);
    assert!(offset_of!(RegisterFrame, eflags) == 0x38);
    assert!(offset_of!(RegisterFrame, esp) == 0x3c);
    assert!(offset_of!(RegisterFrame, ss) == 0x40);
};

impl RegisterFrame {
    /// A zeroed frame. Not resumable as-is; use the entry constructors.
    #[inline]
    #[must_use]
    pub const fn zeroed() -> Self {
        Self {
            gs: 0,
            fs: 0,
            es: 0,
            ds: 0,
            edi: 0,
            esi: 0,
            ebp: 0,
            esp_k: 0,
            ebx: 0,
            edx: 0,
            ecx: 0,
            eax: 0,
            eip: 0,
            cs: 0,
            eflags: 0,
            esp: 0,
            ss: 0,
        }
    }

    /// Frame for a brand-new user-mode context.
    ///
    /// All four data selectors are the user data segment, `cs` carries
    /// `RPL=3`, and `eflags` has `IF` set so the context is preemptible from
    /// its first instruction.
    #[must_use]
    pub const fn user_entry(
        eip: u32,
        user_stack_top: u32,
        code: SegmentSelector<CodeSel>,
        data: SegmentSelector<DataSel>,
    ) -> Self {
        let data = data.encode() as u32;
        let mut frame = Self::zeroed();
        frame.gs = data;
        frame.fs = data;
        frame.es = data;
        frame.ds = data;
        frame.eip = eip;
        frame.cs = code.encode() as u32;
        frame.eflags = Eflags::resumable().into_bits();
        frame.esp = user_stack_top;
        frame.ss = data;
        frame
    }

    /// Frame for a brand-new kernel-mode context (no ring transition; the
    /// `esp`/`ss` tail stays zero and is never restored).
    #[must_use]
    pub const fn kernel_entry(
        eip: u32,
        code: SegmentSelector<CodeSel>,
        data: SegmentSelector<DataSel>,
    ) -> Self {
        let data = data.encode() as u32;
        let mut frame = Self::zeroed();
        frame.gs = data;
        frame.fs = data;
        frame.es = data;
        frame.ds = data;
        frame.eip = eip;
        frame.cs = code.encode() as u32;
        frame.eflags = Eflags::resumable().into_bits();
        frame
    }

    /// The privilege level this frame resumes at, taken from the RPL of the
    /// saved `cs`. The frame is authoritative; callers passing an explicit
    /// destination ring are making a claim that is checked against this.
    #[inline]
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub const fn destination_ring(&self) -> Ring {
        Rpl::of_selector(self.cs as u16).to_ring()
    }

    /// `true` when restoring this frame crosses privilege levels and the
    /// `iret` image therefore needs the `esp:ss` pair.
    #[inline]
    #[must_use]
    pub const fn crosses_rings(&self) -> bool {
        self.destination_ring().is_restricted()
    }

    /// The saved flags as a typed value.
    #[inline]
    #[must_use]
    pub const fn flags(&self) -> Eflags {
        Eflags::from_bits(self.eflags)
    }
}
