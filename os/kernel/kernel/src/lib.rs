//! # The process-execution core
//!
//! This crate is the mechanism that hands the CPU between kernel and
//! process contexts on a 32-bit protected-mode machine, and the syscall
//! return path that lets a process relinquish control. Everything here is
//! about one thing: making a fixed sequence of hardware-visible operations
//! happen in a fixed order.
//!
//! ## The one transition
//!
//! Control only ever moves between "kernel servicing an interrupt" and
//! "exactly one process executing" through [`switch::switch_to`]:
//!
//! ```text
//!  interrupt ──► entry stub captures RegisterFrame
//!                     │
//!                     ▼
//!              handler (IF=0): mutate state, pick destination frame
//!                     │
//!                     ▼
//!  switch_to: segments → iret image → EOI → sti → iret ──► process
//! ```
//!
//! The EOI-before-sti-before-iret order is load-bearing; see [`switch`].
//!
//! ## Module map
//!
//! | Module | Role |
//! |--------|------|
//! | [`gdt`] | flat descriptor tables, the selectors the frames carry |
//! | [`tss`] | ring-0 entry stack (`ss0:esp0`) for privilege transitions |
//! | [`idt`] | gate table, fluent builder |
//! | [`interrupts`] | vectors, gate installers, timer path, entry stubs |
//! | [`per_cpu`] | the per-core execution context object |
//! | [`process`] | process model + external `ExitHook`/`Scheduler` seams |
//! | [`switch`] | the context switch routine and the `Cpu` seam |
//! | [`syscall`] | `int 0x80` dispatch and the terminating `exit` path |
//! | [`init`] | staged bring-up |
//!
//! Scheduler policy, virtual memory, and drivers are deliberately not here;
//! the traits in [`process`] are where they attach.

#![cfg_attr(not(any(test, doctest)), no_std)]
#![allow(unsafe_code)]

pub mod gdt;
pub mod idt;
pub mod init;
pub mod interrupts;
pub mod per_cpu;
pub mod process;
pub mod switch;
pub mod syscall;
pub mod tss;
