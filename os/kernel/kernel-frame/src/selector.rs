//! # Strongly typed segment selectors
//!
//! Segment selectors are 16-bit values loaded into `CS`/`DS`/`ES`/`FS`/`GS`/
//! `SS` (and `TR` for the TSS). A selector encodes:
//!
//! ```text
//!  15            3 2  1  0
//! +----------------+--+----+
//! |   Index[12:0]  |TI| RPL|
//! +----------------+--+----+  (TI=0 → GDT, TI=1 → LDT; RPL=0..3)
//! ```
//!
//! In protected mode the selector is what the context switch actually loads:
//! a bad value faults *during the restore*, which is why the switch routine
//! loads data selectors before touching general-purpose state. This module
//! adds a thin type layer so a data selector cannot end up in `CS` or a
//! random value in `ltr`, while still exposing the raw `u16` for frame
//! fields and inline asm.

use crate::privilege::Rpl;
use bitfield_struct::bitfield;

/// Which descriptor table a selector addresses.
///
/// Only the GDT is used here; the LDT variant exists for completeness.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
#[repr(u8)]
pub enum Table {
    /// Global Descriptor Table
    Gdt = 0,
    /// Local Descriptor Table
    Ldt = 1,
}

impl Table {
    #[inline]
    #[must_use]
    pub const fn from_bits(bits: u8) -> Self {
        if bits == 0 { Self::Gdt } else { Self::Ldt }
    }

    #[inline]
    #[must_use]
    pub const fn into_bits(self) -> u8 {
        self as u8
    }
}

/// Raw 16-bit selector encoding (index/TI/RPL).
///
/// Use the typed [`SegmentSelector`] wrappers unless you truly need the bits.
#[bitfield(u16)]
#[derive(Eq, PartialEq)]
pub struct SegmentSelectorRaw {
    /// Requested Privilege Level (bits 0..1).
    #[bits(2)]
    pub rpl: Rpl,
    /// Table Indicator (bit 2): 0 = GDT, 1 = LDT.
    #[bits(1)]
    pub ti: Table,
    /// Descriptor index (bits 3..15).
    #[bits(13)]
    pub index: u16,
}

impl SegmentSelectorRaw {
    /// Create a raw selector (no semantic checks).
    #[inline]
    #[must_use]
    pub const fn new_with(index: u16, table: Table, rpl: Rpl) -> Self {
        Self::new().with_index(index).with_ti(table).with_rpl(rpl)
    }

    /// Return the selector as a plain `u16`.
    #[inline]
    #[must_use]
    pub const fn to_u16(self) -> u16 {
        self.into_bits()
    }
}

/// Marker trait for typed selectors.
pub trait SelectorKind: Copy {}

/// Code segment (`CS`) selector.
#[derive(Copy, Clone, Eq, PartialEq)]
pub enum CodeSel {}

/// Data/stack (`DS`/`ES`/`FS`/`GS`/`SS`) selector.
#[derive(Copy, Clone, Eq, PartialEq)]
pub enum DataSel {}

/// TSS system segment selector (for `ltr`).
#[derive(Copy, Clone, Eq, PartialEq)]
pub enum TssSel {}

impl SelectorKind for CodeSel {}
impl SelectorKind for DataSel {}
impl SelectorKind for TssSel {}

/// Strongly typed selector wrapper.
///
/// Convert to `u16` with [`encode`](Self::encode) for use in frame fields,
/// `iret` images, or inline asm.
#[repr(transparent)]
#[derive(Copy, Clone, Eq, PartialEq)]
pub struct SegmentSelector<K: SelectorKind>(SegmentSelectorRaw, core::marker::PhantomData<K>);

impl<K: SelectorKind> SegmentSelector<K> {
    /// Access the raw selector (index/TI/RPL).
    #[inline]
    #[must_use]
    pub const fn raw(self) -> SegmentSelectorRaw {
        self.0
    }

    /// Encode as `u16` (what the CPU actually loads).
    #[inline]
    #[must_use]
    pub const fn encode(self) -> u16 {
        self.0.to_u16()
    }

    /// The RPL carried in the low two bits.
    #[inline]
    #[must_use]
    pub const fn rpl(self) -> Rpl {
        self.0.rpl()
    }
}

impl SegmentSelector<CodeSel> {
    /// GDT code selector at `index` with the given RPL.
    #[inline]
    #[must_use]
    pub const fn new(index: u16, rpl: Rpl) -> Self {
        Self(
            SegmentSelectorRaw::new_with(index, Table::Gdt, rpl),
            core::marker::PhantomData,
        )
    }
}

impl SegmentSelector<DataSel> {
    /// GDT data selector at `index` with the given RPL.
    #[inline]
    #[must_use]
    pub const fn new(index: u16, rpl: Rpl) -> Self {
        Self(
            SegmentSelectorRaw::new_with(index, Table::Gdt, rpl),
            core::marker::PhantomData,
        )
    }
}

impl SegmentSelector<TssSel> {
    /// GDT TSS selector at `index` (RPL is always 0 for `ltr`).
    #[inline]
    #[must_use]
    pub const fn new(index: u16) -> Self {
        Self(
            SegmentSelectorRaw::new_with(index, Table::Gdt, Rpl::Ring0),
            core::marker::PhantomData,
        )
    }
}

impl<K: SelectorKind> core::fmt::Debug for SegmentSelector<K> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "SegmentSelector({:#06x})", self.encode())
    }
}
