//! # Userland support: the syscall ABI
//!
//! The one contract a process shares with the kernel: how a request crosses
//! the trap boundary. Both sides depend on [`syscall_abi`]; the `syscall`
//! module adds the user-side `int 0x80` stubs and only makes sense inside a
//! ring-3 binary.

#![no_std]
#![cfg_attr(not(feature = "syscall"), forbid(unsafe_code))]
#![cfg_attr(feature = "syscall", allow(unsafe_code))]

#[cfg(feature = "syscall")]
pub mod syscall;

#[cfg(feature = "syscall-abi")]
pub mod syscall_abi;
