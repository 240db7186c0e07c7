//! # Interrupt-aware synchronization primitives
//!
//! The execution core is interrupt-serialized on a single core: its
//! privileged paths run with interrupts masked, so they need no locks at
//! all. What does need protection are the few shared slots touched from
//! *both* interrupt and non-interrupt context — the log sink, the PIC mask
//! state, per-boot wiring cells. This crate provides exactly that:
//!
//! - [`SpinLock`] — a compact test-and-test-and-set lock with an RAII guard.
//! - [`IrqGuard`] — saves EFLAGS, masks interrupts, restores on drop.
//! - [`IrqLock`] — the two combined: a critical section safe against both
//!   other cores and the local interrupt path.
//! - [`SyncOnceCell`] — one-shot initialization for static wiring slots.
//!
//! On non-x86 hosts (tests) the interrupt mask operations compile to no-ops;
//! the locking behavior itself is fully host-testable.

#![cfg_attr(not(any(test, doctest)), no_std)]
#![allow(unsafe_code)]

pub mod irq;
mod spin_lock;
mod sync_once_cell;

pub use irq::{IrqGuard, IrqLock};
pub use spin_lock::{SpinLock, SpinLockGuard};
pub use sync_once_cell::SyncOnceCell;
