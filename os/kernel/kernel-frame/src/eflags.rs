//! # EFLAGS model (32-bit protected mode)

use bitfield_struct::bitfield;

/// Architectural EFLAGS model for x86 protected mode.
///
/// Bit 1 is architecturally fixed to 1 and modeled as a read-only default,
/// so a freshly built value is already a legal flags image. The interrupt
/// enable flag ([`if_interrupt_enable`](Self::if_interrupt_enable)) is the
/// one the execution core cares about: a destination frame carries `IF=1`
/// so the resumed context is immediately preemptible.
#[bitfield(u32, order = Lsb)]
#[derive(Eq, PartialEq)]
pub struct Eflags {
    /// Carry Flag
    pub cf_carry: bool, // 0

    /// Always 1.
    #[bits(default = true)]
    _always1: bool, // 1

    /// Parity Flag
    pub pf_parity: bool, // 2

    /// Reserved (always 0)
    #[bits(default = false)]
    _rsvd3: bool, // 3

    /// Adjust Flag
    pub af_adjust: bool, // 4

    /// Reserved (always 0)
    #[bits(default = false)]
    _rsvd5: bool, // 5

    /// Zero Flag
    pub zf_zero: bool, // 6

    /// Sign Flag
    pub sf_sign: bool, // 7

    /// Trap Flag (single-step)
    pub tf_trap: bool, // 8

    /// Interrupt Enable Flag
    pub if_interrupt_enable: bool, // 9

    /// Direction Flag
    pub df_direction: bool, // 10

    /// Overflow Flag
    pub of_overflow: bool, // 11

    /// I/O Privilege Level (2 bits)
    #[bits(2)]
    pub iopl: u8, // 12–13

    /// Nested Task
    pub nt_nested: bool, // 14

    /// Reserved (always 0)
    #[bits(default = false)]
    _rsvd15: bool, // 15

    /// Resume Flag
    pub rf_resume: bool, // 16

    /// Virtual-8086 Mode
    pub vm_virtual_8086: bool, // 17

    /// Alignment Check
    pub ac_alignment_check: bool, // 18

    /// Virtual Interrupt Flag
    pub vif_virtual_interrupt: bool, // 19

    /// Virtual Interrupt Pending
    pub vip_virtual_interrupt_pending: bool, // 20

    /// ID Flag: allows toggling CPUID.
    pub id_cpuid: bool, // 21

    /// Reserved 22–31 (all zero)
    #[bits(10, default = 0)]
    _reserved_rest: u16,
}

impl Eflags {
    /// The flags image given to a brand-new context: reserved bit 1 set and
    /// interrupts enabled (`0x202`).
    #[inline]
    #[must_use]
    pub const fn resumable() -> Self {
        Self::new().with_if_interrupt_enable(true)
    }
}
