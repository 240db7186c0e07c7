//! # Register frame model for x86 protected mode
//!
//! This crate is the data-model half of the execution core: everything the
//! CPU needs to suspend and resume a context, expressed as plain records
//! whose **field order is the hardware contract**.
//!
//! ## Contents
//!
//! - [`RegisterFrame`] — the fixed-layout snapshot exchanged between kernel
//!   and process context (segment selectors, `pusha` block, `iret` tail).
//! - [`IretImage`] — the stack image popped by `iret`, including the
//!   conditional `esp:ss` pair required for ring transitions.
//! - [`Eflags`] — the 32-bit flags register as a typed bitfield.
//! - [`privilege`] — [`Ring`]/[`Rpl`]/[`Dpl`] and the access-check helpers.
//! - [`selector`] — strongly typed segment selectors.
//!
//! ## Design notes
//!
//! Everything here is pure `no_std` logic with no privileged instructions,
//! so the layout and ordering contracts are verified by host tests. The
//! privileged restore side lives in the `kernel` crate and consumes these
//! types unchanged.

#![cfg_attr(not(any(test, doctest)), no_std)]

mod eflags;
mod frame;
mod iret;
pub mod privilege;
pub mod selector;

pub use eflags::Eflags;
pub use frame::RegisterFrame;
pub use iret::IretImage;
pub use privilege::{Dpl, Ring, Rpl};
pub use selector::{CodeSel, DataSel, SegmentSelector, SegmentSelectorRaw, Table, TssSel};
