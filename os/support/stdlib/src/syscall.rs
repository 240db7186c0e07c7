//! User-side `int 0x80` invocation stubs.
//!
//! Each stub pins the convention of [`crate::syscall_abi`] into registers
//! and traps. Ring-3 x86 only; these compile away everywhere else.

#[cfg(target_arch = "x86")]
use crate::syscall_abi::Sysno;

/// Terminate the calling process with `status`. Never returns.
#[cfg(target_arch = "x86")]
#[inline]
pub fn exit(status: i32) -> ! {
    unsafe {
        core::arch::asm!(
            "int 0x80",
            in("eax") Sysno::Exit.to_u32(),
            in("ebx") status,
            options(noreturn, nostack)
        );
    }
}

/// Write one byte to the kernel debug sink.
#[cfg(target_arch = "x86")]
#[inline]
pub fn write_byte(byte: u8) -> u32 {
    let ret: u32;
    unsafe {
        core::arch::asm!(
            "int 0x80",
            inlateout("eax") Sysno::WriteByte.to_u32() => ret,
            in("ebx") u32::from(byte),
            options(nostack)
        );
    }
    ret
}

/// The caller's process identifier.
#[cfg(target_arch = "x86")]
#[inline]
#[must_use]
pub fn getpid() -> u32 {
    let pid: u32;
    unsafe {
        core::arch::asm!(
            "int 0x80",
            inlateout("eax") Sysno::GetPid.to_u32() => pid,
            options(nostack)
        );
    }
    pid
}
