//! # The syscall register convention
//!
//! A process requests a kernel service by placing the syscall number in
//! `eax`, arguments in `ebx`, `ecx`, `edx`, `esi`, `edi` (in that order),
//! and executing `int 0x80`. The kernel returns the result in `eax`;
//! [`RET_INVALID`] marks an unknown syscall number.
//!
//! `exit` never returns; its status argument travels in `ebx`.

/// The software interrupt vector processes trap through.
pub const TRAP_VECTOR: u8 = 0x80;

/// Returned in `eax` for an unrecognized syscall number.
pub const RET_INVALID: u32 = u32::MAX;

/// Syscall numbers (`eax` on entry).
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
#[repr(u32)]
pub enum Sysno {
    /// Terminate the calling process; status in `ebx`. Never returns.
    Exit = 1,
    /// Write one byte (`ebx`, low 8 bits) to the kernel debug sink.
    WriteByte = 2,
    /// Return the caller's process identifier.
    GetPid = 3,
}

impl Sysno {
    /// The raw number placed in `eax`.
    #[inline]
    #[must_use]
    pub const fn to_u32(self) -> u32 {
        self as u32
    }
}

impl TryFrom<u32> for Sysno {
    type Error = u32;

    #[inline]
    fn try_from(no: u32) -> Result<Self, Self::Error> {
        match no {
            1 => Ok(Self::Exit),
            2 => Ok(Self::WriteByte),
            3 => Ok(Self::GetPid),
            other => Err(other),
        }
    }
}
