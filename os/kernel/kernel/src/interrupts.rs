//! # Interrupt vectors and gate installers
//!
//! The two vectors the execution core lives on:
//!
//! | Vector | Source | Gate DPL | Concluded on IRQ line |
//! |--------|--------|----------|-----------------------|
//! | `0x20` | PIT / preemption timer (IRQ 0) | 0 | 0 |
//! | `0x80` | `int 0x80` syscall trap | 3 | 0 (scheduling line) |
//!
//! Installation goes through extension traits on [`Idt`] so call sites read
//! as intent (`idt.install_timer(..)`) rather than raw gate plumbing.

pub mod entry;
pub mod timer;

use crate::idt::Idt;
use kernel_frame::privilege::Dpl;
use kernel_frame::selector::{CodeSel, SegmentSelector};

/// Vector the preemption timer (IRQ 0) arrives on after remapping.
pub const TIMER_VECTOR: u8 = 0x20;
/// Vector processes trap through for syscalls.
pub const SYSCALL_VECTOR: u8 = 0x80;

// The timer vector is the remap base by construction, and the syscall trap
// must conclude on the scheduling line.
const _: () = {
    assert!(TIMER_VECTOR == kernel_pic::VECTOR_BASE);
    assert!(SYSCALL_VECTOR == stdlib::syscall_abi::TRAP_VECTOR);
    assert!(kernel_pic::AckLine::from_vector(TIMER_VECTOR).line() == 0);
    assert!(kernel_pic::AckLine::from_vector(SYSCALL_VECTOR).line() == 0);
};

/// Installs the preemption timer gate.
pub trait TimerInterrupt {
    /// Hardware-delivered, so the gate stays ring-0 invocable.
    fn install_timer(&mut self, handler: u32, cs: SegmentSelector<CodeSel>);
}

impl TimerInterrupt for Idt {
    fn install_timer(&mut self, handler: u32, cs: SegmentSelector<CodeSel>) {
        self.gate(TIMER_VECTOR)
            .handler(handler)
            .selector(cs)
            .install();
    }
}

/// Installs the syscall trap gate.
pub trait SyscallInterrupt {
    /// `int 0x80` comes from ring 3, so the gate's DPL must admit it.
    fn install_syscall(&mut self, handler: u32, cs: SegmentSelector<CodeSel>);
}

impl SyscallInterrupt for Idt {
    fn install_syscall(&mut self, handler: u32, cs: SegmentSelector<CodeSel>) {
        self.gate(SYSCALL_VECTOR)
            .handler(handler)
            .selector(cs)
            .accessible_from(Dpl::Ring3)
            .install();
    }
}
