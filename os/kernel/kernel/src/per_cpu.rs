//! # The per-CPU execution context
//!
//! Everything a core needs to take interrupts and switch contexts, in one
//! cache-line-aligned block: its descriptor tables, its TSS, and the
//! bookkeeping of who is running on it. Single-core today, but every access
//! already goes through this block rather than loose statics so a second
//! core is an allocation, not a refactor.

use crate::gdt::{Gdt, Selectors};
use crate::idt::Idt;
use crate::process::Pid;
use crate::tss::Tss32;
use core::sync::atomic::{AtomicU64, Ordering};

/// One core's execution context.
#[repr(C, align(64))]
pub struct PerCpu {
    /// Index of this core; 0 for the bootstrap processor.
    pub cpu_id: u32,
    /// The process currently owning this core, if any.
    current: Option<Pid>,
    /// Preemption ticks since boot.
    ticks: AtomicU64,
    /// Ring-0 entry stack lives here; referenced by the GDT's TSS slot.
    pub tss: Tss32,
    pub gdt: Gdt,
    pub idt: Idt,
    pub selectors: Selectors,
}

impl PerCpu {
    #[must_use]
    pub const fn new(cpu_id: u32) -> Self {
        Self {
            cpu_id,
            current: None,
            ticks: AtomicU64::new(0),
            tss: Tss32::new(),
            gdt: Gdt::new(),
            idt: Idt::new(),
            selectors: Selectors::new(),
        }
    }

    /// Count one preemption tick; returns the new total.
    #[inline]
    pub fn tick(&self) -> u64 {
        self.ticks.fetch_add(1, Ordering::Relaxed) + 1
    }

    #[inline]
    #[must_use]
    pub fn ticks(&self) -> u64 {
        self.ticks.load(Ordering::Relaxed)
    }

    /// Record that `pid` is about to own this core.
    #[inline]
    pub const fn record_switch(&mut self, pid: Pid) {
        self.current = Some(pid);
    }

    /// Record that no process owns this core (idle, or the owner exited).
    #[inline]
    pub const fn clear_current(&mut self) {
        self.current = None;
    }

    #[inline]
    #[must_use]
    pub const fn current(&self) -> Option<Pid> {
        self.current
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ticks_accumulate() {
        let cx = PerCpu::new(0);
        assert_eq!(cx.tick(), 1);
        assert_eq!(cx.tick(), 2);
        assert_eq!(cx.ticks(), 2);
    }

    #[test]
    fn switch_bookkeeping() {
        let mut cx = PerCpu::new(0);
        assert_eq!(cx.current(), None);
        cx.record_switch(Pid::new(3));
        assert_eq!(cx.current(), Some(Pid::new(3)));
        cx.clear_current();
        assert_eq!(cx.current(), None);
    }
}
