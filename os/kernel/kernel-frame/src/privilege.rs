//! # Privilege levels (x86 protected mode)
//!
//! x86 implements four hierarchical *rings* (`0–3`), of which this kernel
//! uses two:
//!
//! - **Ring 0** — kernel / supervisor mode (highest privilege)
//! - **Ring 3** — user mode (least privilege)
//!
//! The same two-bit level appears in three distinct places the CPU checks
//! against each other:
//!
//! | Concept | Stored in | Purpose |
//! |---------|-----------|---------|
//! | [`Ring`] | the current `CS` selector | the **current privilege level** (CPL) |
//! | [`Rpl`]  | the low 2 bits of a selector | the **requested privilege level** |
//! | [`Dpl`]  | the descriptor's access byte | the **descriptor privilege level** |
//!
//! Checks enforced by hardware:
//!
//! - Data segment load: `max(CPL, RPL) ≤ DPL`
//! - Non-conforming code: `CPL == DPL`
//! - `SS` load: `CPL == RPL == DPL`
//!
//! A context switch is exactly a change of CPL performed by `iret`, which is
//! why the destination ring threads through the whole switch path.

/// CPU privilege rings (protection levels 0–3).
///
/// Only [`Ring::Ring0`] and [`Ring::Ring3`] are used here; rings 1 and 2
/// exist for architectural completeness.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
#[repr(u8)]
pub enum Ring {
    /// Kernel / supervisor mode. May execute any instruction.
    Ring0 = 0,
    /// Historically for OS components; unused.
    Ring1 = 1,
    /// Historically for OS subsystems; unused.
    Ring2 = 2,
    /// User-mode processes. Restricted instructions and I/O.
    Ring3 = 3,
}

impl Ring {
    #[inline]
    #[must_use]
    pub const fn to_u8(self) -> u8 {
        self as u8
    }

    /// Construct from a two-bit CPL value (upper bits ignored).
    #[inline]
    #[must_use]
    pub const fn from_cpl(bits: u8) -> Self {
        match bits & 0b11 {
            0 => Self::Ring0,
            1 => Self::Ring1,
            2 => Self::Ring2,
            _ => Self::Ring3,
        }
    }

    /// `true` for any ring other than Ring 0.
    ///
    /// A transfer to such a ring requires the `esp:ss` pair in the `iret`
    /// stack image.
    #[inline]
    #[must_use]
    pub const fn is_restricted(self) -> bool {
        !matches!(self, Self::Ring0)
    }
}

impl From<Ring> for u8 {
    #[inline]
    fn from(r: Ring) -> Self {
        r.to_u8()
    }
}

/// RPL mask in a 16-bit selector.
pub const RPL_MASK: u16 = 0b11;

/// Requested Privilege Level — the low 2 bits of a segment selector.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
#[repr(u8)]
pub enum Rpl {
    Ring0 = 0,
    Ring1 = 1,
    Ring2 = 2,
    Ring3 = 3,
}

impl Rpl {
    #[inline]
    #[must_use]
    pub const fn from_ring(ring: Ring) -> Self {
        match ring {
            Ring::Ring0 => Self::Ring0,
            Ring::Ring1 => Self::Ring1,
            Ring::Ring2 => Self::Ring2,
            Ring::Ring3 => Self::Ring3,
        }
    }

    #[inline]
    #[must_use]
    pub const fn to_ring(self) -> Ring {
        match self {
            Self::Ring0 => Ring::Ring0,
            Self::Ring1 => Ring::Ring1,
            Self::Ring2 => Ring::Ring2,
            Self::Ring3 => Ring::Ring3,
        }
    }

    /// Extract the RPL of a raw selector value.
    #[inline]
    #[must_use]
    pub const fn of_selector(selector: u16) -> Self {
        Self::from_bits((selector & RPL_MASK) as u8)
    }

    /// The effective privilege used for data-segment checks:
    /// `max(CPL, RPL)` numerically.
    #[inline]
    #[must_use]
    pub const fn effective_with(self, cpl: Ring) -> Ring {
        if (self as u8) > (cpl as u8) {
            self.to_ring()
        } else {
            cpl
        }
    }

    #[inline]
    #[must_use]
    pub const fn into_bits(self) -> u8 {
        self as u8
    }

    #[inline]
    #[must_use]
    pub const fn from_bits(v: u8) -> Self {
        match v & 0b11 {
            0 => Self::Ring0,
            1 => Self::Ring1,
            2 => Self::Ring2,
            _ => Self::Ring3,
        }
    }
}

/// Descriptor Privilege Level — lives *in the descriptor*.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
#[repr(u8)]
pub enum Dpl {
    Ring0 = 0,
    Ring1 = 1,
    Ring2 = 2,
    Ring3 = 3,
}

impl Dpl {
    #[inline]
    #[must_use]
    pub const fn from_ring(ring: Ring) -> Self {
        match ring {
            Ring::Ring0 => Self::Ring0,
            Ring::Ring1 => Self::Ring1,
            Ring::Ring2 => Self::Ring2,
            Ring::Ring3 => Self::Ring3,
        }
    }

    #[inline]
    #[must_use]
    pub const fn to_ring(self) -> Ring {
        match self {
            Self::Ring0 => Ring::Ring0,
            Self::Ring1 => Ring::Ring1,
            Self::Ring2 => Ring::Ring2,
            Self::Ring3 => Ring::Ring3,
        }
    }

    #[inline]
    #[must_use]
    pub const fn into_bits(self) -> u8 {
        self as u8
    }

    #[inline]
    #[must_use]
    pub const fn from_bits(v: u8) -> Self {
        match v & 0b11 {
            0 => Self::Ring0,
            1 => Self::Ring1,
            2 => Self::Ring2,
            _ => Self::Ring3,
        }
    }

    /// Data segment: allowed iff `max(CPL, RPL) ≤ DPL`.
    #[inline]
    #[must_use]
    pub const fn permits_data_load(self, cpl: Ring, rpl: Rpl) -> bool {
        (rpl.effective_with(cpl) as u8) <= (self as u8)
    }

    /// Non-conforming code: `CPL == DPL`.
    #[inline]
    #[must_use]
    pub const fn permits_nonconforming_code(self, cpl: Ring) -> bool {
        (self as u8) == (cpl as u8)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cpl_roundtrip_masks_upper_bits() {
        assert_eq!(Ring::from_cpl(0b111), Ring::Ring3);
        assert_eq!(Ring::from_cpl(0), Ring::Ring0);
    }

    #[test]
    fn effective_privilege_is_numeric_max() {
        assert_eq!(Rpl::Ring3.effective_with(Ring::Ring0), Ring::Ring3);
        assert_eq!(Rpl::Ring0.effective_with(Ring::Ring3), Ring::Ring3);
        assert_eq!(Rpl::Ring0.effective_with(Ring::Ring0), Ring::Ring0);
    }

    #[test]
    fn data_load_checks() {
        // User data descriptor is loadable from both rings.
        assert!(Dpl::Ring3.permits_data_load(Ring::Ring3, Rpl::Ring3));
        assert!(Dpl::Ring3.permits_data_load(Ring::Ring0, Rpl::Ring0));
        // Kernel data descriptor is not loadable from user mode.
        assert!(!Dpl::Ring0.permits_data_load(Ring::Ring3, Rpl::Ring3));
    }
}
