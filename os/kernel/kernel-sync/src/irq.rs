//! Interrupt masking, paired with locking.
//!
//! On x86 the interrupt enable flag lives in EFLAGS bit 9. The guard reads
//! EFLAGS via `pushfd`, issues `cli` if interrupts were on, and restores the
//! prior state on drop — so nested guards compose and a section that was
//! entered with interrupts already masked (the normal case inside handlers)
//! stays masked afterwards.
//!
//! Host builds (tests) have no interrupt flag to mask; the operations become
//! no-ops and the types keep their shape.

use crate::{SpinLock, SpinLockGuard};

/// EFLAGS bit 9: interrupt enable.
pub const EFLAGS_IF: u32 = 1 << 9;

/// Read the current EFLAGS value.
#[cfg(target_arch = "x86")]
#[inline]
#[must_use]
pub fn eflags() -> u32 {
    let flags: u32;
    // SAFETY: pushfd/pop is side-effect free beyond the stack slot.
    unsafe {
        core::arch::asm!(
            "pushfd; pop {}",
            out(reg) flags,
            options(nostack, preserves_flags)
        );
    }
    flags
}

#[cfg(not(target_arch = "x86"))]
#[inline]
#[must_use]
pub fn eflags() -> u32 {
    0
}

/// Mask maskable interrupts (`cli`).
#[inline]
pub fn mask_interrupts() {
    #[cfg(target_arch = "x86")]
    // SAFETY: requires ring 0, which is where this crate runs.
    unsafe {
        core::arch::asm!("cli", options(nomem, nostack, preserves_flags));
    }
}

/// Unmask maskable interrupts (`sti`).
#[inline]
pub fn unmask_interrupts() {
    #[cfg(target_arch = "x86")]
    // SAFETY: requires ring 0.
    unsafe {
        core::arch::asm!("sti", options(nomem, nostack, preserves_flags));
    }
}

/// RAII guard: masks interrupts on creation, restores the prior IF on drop.
pub struct IrqGuard {
    were_enabled: bool,
}

impl IrqGuard {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        let were_enabled = eflags() & EFLAGS_IF != 0;
        if were_enabled {
            mask_interrupts();
        }
        Self { were_enabled }
    }
}

impl Default for IrqGuard {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for IrqGuard {
    fn drop(&mut self) {
        if self.were_enabled {
            unmask_interrupts();
        }
    }
}

/// A [`SpinLock`] that is also safe against the local interrupt path:
/// taking it masks interrupts first, so a handler can never arrive while
/// the lock is held on this core.
pub struct IrqLock<T> {
    inner: SpinLock<T>,
}

impl<T> IrqLock<T> {
    #[must_use]
    pub const fn new(value: T) -> Self {
        Self {
            inner: SpinLock::new(value),
        }
    }

    /// Mask interrupts, then acquire.
    #[inline]
    pub fn lock(&self) -> IrqLockGuard<'_, T> {
        let irq = IrqGuard::new();
        let guard = self.inner.lock();
        IrqLockGuard { _irq: irq, guard }
    }

    /// Run `f` with interrupts masked and the lock held.
    #[inline]
    pub fn with_lock<R>(&self, f: impl FnOnce(&mut T) -> R) -> R {
        f(&mut self.lock().guard)
    }
}

/// Guard pairing the interrupt mask with the lock; released in reverse
/// order on drop (lock first, then the interrupt state — field order
/// matters here, drops run in declaration order).
pub struct IrqLockGuard<'a, T> {
    guard: SpinLockGuard<'a, T>,
    _irq: IrqGuard,
}

impl<T> core::ops::Deref for IrqLockGuard<'_, T> {
    type Target = T;
    fn deref(&self) -> &T {
        &self.guard
    }
}

impl<T> core::ops::DerefMut for IrqLockGuard<'_, T> {
    fn deref_mut(&mut self) -> &mut T {
        &mut self.guard
    }
}
