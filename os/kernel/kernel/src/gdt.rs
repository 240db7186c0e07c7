//! # Global Descriptor Table wiring (32-bit flat model)
//!
//! Protected mode routes *every* memory access and privilege check through
//! segment descriptors, so the GDT is where the rings of
//! [`kernel_frame::privilege`] become real. This kernel uses the flat
//! model: all code/data segments span `0..4 GiB`, and the descriptors exist
//! purely to carry the privilege level and code/data distinction the
//! context switch depends on.
//!
//! ## Layout
//!
//! Index | Selector | Meaning
//! ------|----------|--------
//! 0     | 0x00     | Null
//! 1     | 0x08     | Kernel code (DPL=0; [`KERNEL_CS_SEL`])
//! 2     | 0x10     | Kernel data (DPL=0; [`KERNEL_DS_SEL`])
//! 3     | 0x18     | User   code (DPL=3) → with RPL=3: **0x1b** ([`USER_CS_SEL`])
//! 4     | 0x20     | User   data (DPL=3) → with RPL=3: **0x23** ([`USER_DS_SEL`])
//! 5     | 0x28     | TSS (system descriptor; [`TSS_SYS_SEL`])
//!
//! These selector values appear verbatim in every `RegisterFrame`, which is
//! why they are pinned with compile-time assertions below.
//!
//! ## Preconditions for loading
//!
//! Interrupts masked; the table memory mapped and stable for the lifetime
//! of the kernel (it lives inside the per-CPU block).

use crate::tss::Tss32;
use bitfield_struct::bitfield;
use core::mem::size_of;
use kernel_frame::privilege::{Dpl, Rpl};
use kernel_frame::selector::{CodeSel, DataSel, SegmentSelector, TssSel};

/// Access byte of a code/data descriptor.
///
/// ```text
/// | P | DPL(2) | S | E | DC | RW | A |
/// ```
#[bitfield(u8)]
#[derive(Eq, PartialEq)]
pub struct Access {
    /// Accessed (set by hardware).
    pub accessed: bool,
    /// Readable (code) / writable (data).
    pub rw: bool,
    /// Direction (data) / conforming (code).
    pub dc: bool,
    /// Executable: code segment if set.
    pub executable: bool,
    /// Descriptor type: 1 = code/data, 0 = system.
    pub s: bool,
    /// Descriptor Privilege Level.
    #[bits(2)]
    pub dpl: Dpl,
    /// Present.
    pub present: bool,
}

/// High flags nibble: granularity and default operand size.
const FLAGS_4K_32BIT: u8 = 0b1100; // G=1 (4 KiB), D/B=1 (32-bit)

/// One 8-byte GDT descriptor.
///
/// The split base/limit layout is a 286 inheritance; the constructors hide
/// it and the flat model only ever uses base 0, limit 0xFFFFF (4 GiB with
/// page granularity).
#[repr(C)]
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct GdtEntry {
    limit_lo: u16,
    base_lo: u16,
    base_mid: u8,
    access: u8,
    /// Limit bits 16..19 in the low nibble, flags in the high nibble.
    gran: u8,
    base_hi: u8,
}

const _: () = assert!(size_of::<GdtEntry>() == 8);

impl GdtEntry {
    /// The mandatory null descriptor.
    pub const NULL: Self = Self {
        limit_lo: 0,
        base_lo: 0,
        base_mid: 0,
        access: 0,
        gran: 0,
        base_hi: 0,
    };

    /// Flat 4 GiB code or data segment at `dpl`.
    #[must_use]
    const fn flat(executable: bool, dpl: Dpl) -> Self {
        let access = Access::new()
            .with_rw(true)
            .with_executable(executable)
            .with_s(true)
            .with_dpl(dpl)
            .with_present(true);
        Self {
            limit_lo: 0xFFFF,
            base_lo: 0,
            base_mid: 0,
            access: access.into_bits(),
            gran: (FLAGS_4K_32BIT << 4) | 0x0F,
            base_hi: 0,
        }
    }

    #[must_use]
    pub const fn kernel_code() -> Self {
        Self::flat(true, Dpl::Ring0)
    }

    #[must_use]
    pub const fn kernel_data() -> Self {
        Self::flat(false, Dpl::Ring0)
    }

    #[must_use]
    pub const fn user_code() -> Self {
        Self::flat(true, Dpl::Ring3)
    }

    #[must_use]
    pub const fn user_data() -> Self {
        Self::flat(false, Dpl::Ring3)
    }

    /// System descriptor for an available 32-bit TSS at `base`.
    ///
    /// Byte granularity; the limit is the last byte of the TSS.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub const fn tss(base: u32) -> Self {
        let limit = (size_of::<Tss32>() - 1) as u32;
        Self {
            limit_lo: limit as u16,
            base_lo: base as u16,
            base_mid: (base >> 16) as u8,
            // P=1, DPL=0, S=0 (system), type 0x9 = 32-bit TSS (available).
            access: 0x89,
            gran: ((limit >> 16) & 0x0F) as u8,
            base_hi: (base >> 24) as u8,
        }
    }

    /// The raw access byte (for tests and debugging).
    #[inline]
    #[must_use]
    pub const fn access_bits(&self) -> u8 {
        self.access
    }
}

/// The descriptor table itself, in the fixed layout documented above.
#[repr(C, align(8))]
pub struct Gdt {
    entries: [GdtEntry; 6],
}

impl Gdt {
    /// Build the flat-model table. The TSS slot is patched in
    /// [`attach_tss`](Self::attach_tss) once the TSS address is known.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: [
                GdtEntry::NULL,
                GdtEntry::kernel_code(),
                GdtEntry::kernel_data(),
                GdtEntry::user_code(),
                GdtEntry::user_data(),
                GdtEntry::NULL, // TSS, patched later
            ],
        }
    }

    /// Point the TSS descriptor at `tss`.
    pub fn attach_tss(&mut self, tss: &Tss32) {
        let base = core::ptr::from_ref::<Tss32>(tss) as u32;
        self.entries[usize::from(TSS_INDEX)] = GdtEntry::tss(base);
    }

    /// Descriptor at `index` (for tests).
    #[inline]
    #[must_use]
    pub const fn entry(&self, index: usize) -> GdtEntry {
        self.entries[index]
    }

    /// Load this GDT, reload the segment registers with the kernel
    /// selectors, and load the task register.
    ///
    /// # Safety
    ///
    /// Ring 0, interrupts masked, `self` pinned for the kernel's lifetime,
    /// and [`attach_tss`](Self::attach_tss) already called.
    #[cfg(target_arch = "x86")]
    pub unsafe fn load(&self) {
        #[repr(C, packed)]
        struct Gdtr {
            limit: u16,
            base: u32,
        }
        let gdtr = Gdtr {
            limit: (size_of::<Self>() - 1) as u16,
            base: core::ptr::from_ref(self) as u32,
        };
        unsafe {
            core::arch::asm!(
                "lgdt [{gdtr}]",
                // Far-jump to reload CS, then refresh the data segments.
                "push {kcs}",
                "mov {tmp}, offset 2f",
                "push {tmp}",
                "retf",
                "2:",
                "mov ds, {kds:x}",
                "mov es, {kds:x}",
                "mov fs, {kds:x}",
                "mov gs, {kds:x}",
                "mov ss, {kds:x}",
                "ltr {tss:x}",
                gdtr = in(reg) &raw const gdtr,
                kcs = in(reg) u32::from(KERNEL_CS),
                kds = in(reg) u32::from(KERNEL_DS),
                tss = in(reg) u32::from(TSS_SEL),
                tmp = out(reg) _,
            );
        }
    }
}

impl Default for Gdt {
    fn default() -> Self {
        Self::new()
    }
}

/// The selector bundle every frame constructor and gate installer consumes.
#[derive(Copy, Clone)]
pub struct Selectors {
    pub kernel_cs: SegmentSelector<CodeSel>,
    pub kernel_ds: SegmentSelector<DataSel>,
    pub user_cs: SegmentSelector<CodeSel>,
    pub user_ds: SegmentSelector<DataSel>,
    pub tss: SegmentSelector<TssSel>,
}

impl Selectors {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            kernel_cs: KERNEL_CS_SEL,
            kernel_ds: KERNEL_DS_SEL,
            user_cs: USER_CS_SEL,
            user_ds: USER_DS_SEL,
            tss: TSS_SYS_SEL,
        }
    }
}

impl Default for Selectors {
    fn default() -> Self {
        Self::new()
    }
}

const TSS_INDEX: u16 = 5;

// Typed selectors matching the table layout above.
pub const KERNEL_CS_SEL: SegmentSelector<CodeSel> = SegmentSelector::<CodeSel>::new(1, Rpl::Ring0);
pub const KERNEL_DS_SEL: SegmentSelector<DataSel> = SegmentSelector::<DataSel>::new(2, Rpl::Ring0);
pub const USER_CS_SEL: SegmentSelector<CodeSel> = SegmentSelector::<CodeSel>::new(3, Rpl::Ring3);
pub const USER_DS_SEL: SegmentSelector<DataSel> = SegmentSelector::<DataSel>::new(4, Rpl::Ring3);
pub const TSS_SYS_SEL: SegmentSelector<TssSel> = SegmentSelector::<TssSel>::new(TSS_INDEX);

// Encoded selector numbers (what the CPU actually loads).
pub const KERNEL_CS: u16 = KERNEL_CS_SEL.encode(); // 0x08
pub const KERNEL_DS: u16 = KERNEL_DS_SEL.encode(); // 0x10
pub const USER_CS: u16 = USER_CS_SEL.encode(); // 0x1b
pub const USER_DS: u16 = USER_DS_SEL.encode(); // 0x23
pub const TSS_SEL: u16 = TSS_SYS_SEL.encode(); // 0x28

// Pin the raw values; frames and asm depend on them verbatim.
const _: () = {
    assert!(KERNEL_CS == 0x08);
    assert!(KERNEL_DS == 0x10);
    assert!(USER_CS == 0x1b);
    assert!(USER_DS == 0x23);
    assert!(TSS_SEL == 0x28);
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flat_descriptors_encode_ring_and_kind() {
        let kc = Access::from_bits(GdtEntry::kernel_code().access_bits());
        assert!(kc.present() && kc.s() && kc.executable());
        assert_eq!(kc.dpl(), Dpl::Ring0);

        let ud = Access::from_bits(GdtEntry::user_data().access_bits());
        assert!(ud.present() && ud.s() && !ud.executable());
        assert_eq!(ud.dpl(), Dpl::Ring3);
    }

    #[test]
    fn tss_descriptor_splits_the_base() {
        let e = GdtEntry::tss(0x1234_5678);
        assert_eq!(e.access_bits(), 0x89);
        assert_eq!(e.base_lo, 0x5678);
        assert_eq!(e.base_mid, 0x34);
        assert_eq!(e.base_hi, 0x12);
        assert_eq!(e.limit_lo, 103); // 104-byte TSS, inclusive limit
    }

    #[test]
    fn table_layout_matches_the_selector_constants() {
        let gdt = Gdt::new();
        assert_eq!(gdt.entry(0), GdtEntry::NULL);
        assert_eq!(gdt.entry(1), GdtEntry::kernel_code());
        assert_eq!(gdt.entry(2), GdtEntry::kernel_data());
        assert_eq!(gdt.entry(3), GdtEntry::user_code());
        assert_eq!(gdt.entry(4), GdtEntry::user_data());
    }
}
