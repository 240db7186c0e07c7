//! # Interrupt entry stubs
//!
//! The naked landings the gates point at. Each stub completes the
//! [`RegisterFrame`](kernel_frame::RegisterFrame) the CPU started on the
//! kernel stack — `pusha`, then the four data segment registers — and calls
//! the registered dispatcher with a pointer to it. The push order is the
//! frame's layout contract; change one and the compile-time offset
//! assertions in `kernel-frame` are the only warning you get.
//!
//! Dispatchers are registered once during bring-up and never return: their
//! job ends in a context switch or a halt, so the stubs need no restore
//! path of their own.

#![cfg(target_arch = "x86")]

use core::arch::naked_asm;
use kernel_frame::RegisterFrame;
use kernel_sync::SyncOnceCell;

/// A registered interrupt dispatcher. Receives the completed frame; must
/// leave via a context switch or halt.
pub type InterruptHook = fn(&mut RegisterFrame) -> !;

static TIMER_HOOK: SyncOnceCell<InterruptHook> = SyncOnceCell::new();
static SYSCALL_HOOK: SyncOnceCell<InterruptHook> = SyncOnceCell::new();

/// Register the timer dispatcher. One shot; the loser gets its hook back.
pub fn set_timer_hook(hook: InterruptHook) -> Result<(), InterruptHook> {
    TIMER_HOOK.set(hook)
}

/// Register the syscall dispatcher. One shot.
pub fn set_syscall_hook(hook: InterruptHook) -> Result<(), InterruptHook> {
    SYSCALL_HOOK.set(hook)
}

macro_rules! entry_stub {
    ($(#[$meta:meta])* $name:ident => $dispatch:ident) => {
        $(#[$meta])*
        #[unsafe(naked)]
        pub extern "C" fn $name() -> ! {
            naked_asm!(
                // CPU already pushed (ss:esp,)? eflags, cs, eip.
                "pusha",
                "push ds",
                "push es",
                "push fs",
                "push gs",
                // esp now points at the frame's lowest field (gs).
                "mov eax, esp",
                "push eax",
                "call {dispatch}",
                dispatch = sym $dispatch,
            )
        }
    };
}

entry_stub! {
    /// Landing for the preemption timer gate (vector 0x20).
    timer_entry => timer_dispatch
}

entry_stub! {
    /// Landing for the syscall trap gate (vector 0x80).
    syscall_entry => syscall_dispatch
}

extern "C" fn timer_dispatch(frame: &mut RegisterFrame) -> ! {
    dispatch(&TIMER_HOOK, frame)
}

extern "C" fn syscall_dispatch(frame: &mut RegisterFrame) -> ! {
    dispatch(&SYSCALL_HOOK, frame)
}

fn dispatch(hook: &SyncOnceCell<InterruptHook>, frame: &mut RegisterFrame) -> ! {
    match hook.get() {
        Some(hook) => hook(frame),
        // An interrupt before bring-up registered anything: nothing to
        // resume, so park the core with interrupts off.
        None => loop {
            unsafe { core::arch::asm!("cli", "hlt", options(nomem)) };
        },
    }
}
