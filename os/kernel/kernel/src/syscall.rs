//! # Syscall dispatch and the terminating `exit` path
//!
//! `int 0x80` lands here with the caller's complete context captured. Two
//! shapes of syscall exist:
//!
//! - **Returning** (`write_byte`, `getpid`, and unknown numbers): the result
//!   is written into the frame's `eax` slot and the *same* context resumes
//!   through the ordinary switch sequence. From the process's point of view
//!   `int 0x80` was one instruction that changed `eax`.
//! - **Terminating** (`exit`): the caller ceases to exist. The lifecycle
//!   hook runs exactly once, the trap is concluded on the scheduling line,
//!   and control is thrown to the preemption path with a software `int
//!   0x20` — the exit path itself never picks a successor. The trailing
//!   halt is unreachable while the timer is live and the backstop if it
//!   is not.

use crate::interrupts::TIMER_VECTOR;
use crate::per_cpu::PerCpu;
use crate::process::{ExitHook, Process};
use crate::switch::{Cpu, switch_to};
use kernel_pic::AckLine;
use stdlib::syscall_abi::{RET_INVALID, Sysno, TRAP_VECTOR};

/// Service the syscall captured in `process.frame`. Never returns; every
/// path concludes the trap and relinquishes the CPU.
///
/// The caller (the trap dispatcher) has already banked the trapping
/// context into `process.frame`, so the frame is authoritative here. `cx`
/// is the executing core's context; the exit arm vacates its current slot.
pub fn handle_syscall<C: Cpu, H: ExitHook>(
    cx: &mut PerCpu,
    cpu: &mut C,
    hook: &mut H,
    process: &mut Process,
) -> ! {
    let line = AckLine::from_vector(TRAP_VECTOR);

    #[allow(clippy::cast_possible_truncation)]
    let ret = match Sysno::try_from(process.frame.eax) {
        Ok(Sysno::Exit) => sys_exit(cx, cpu, hook, process),
        Ok(Sysno::WriteByte) => {
            kernel_serial::write_byte(process.frame.ebx as u8);
            0
        }
        Ok(Sysno::GetPid) => process.pid().get(),
        Err(no) => {
            log::debug!("pid {}: unknown syscall {no}", process.pid().get());
            RET_INVALID
        }
    };

    process.frame.eax = ret;
    let destination = process.frame.destination_ring();
    switch_to(cpu, &process.frame, destination, line)
}

/// Terminate the calling process. Status travels in the frame's `ebx`.
///
/// The sequence is fixed: lifecycle hook (interrupts still masked), EOI on
/// the scheduling line, `sti`, software timer interrupt, halt backstop.
/// The hook is never re-entered for the same process because control never
/// returns to this frame.
pub fn sys_exit<C: Cpu, H: ExitHook>(
    cx: &mut PerCpu,
    cpu: &mut C,
    hook: &mut H,
    process: &mut Process,
) -> ! {
    #[allow(clippy::cast_possible_wrap)]
    let status = process.frame.ebx as i32;
    log::info!("pid {} exited with status {status}", process.pid().get());

    hook.process_exit(process, status);
    debug_assert!(
        !process.is_runnable(),
        "lifecycle hook left the exited process runnable"
    );
    // No process owns this core until the forced timer tick picks one.
    cx.clear_current();

    cpu.acknowledge(AckLine::SCHEDULING);
    cpu.enable_interrupts();
    // Hand the CPU to the preemption path; the timer handler picks the
    // successor. After sti this delivers immediately.
    cpu.software_interrupt(TIMER_VECTOR);
    cpu.halt()
}
