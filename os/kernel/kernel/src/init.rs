//! # Staged bring-up
//!
//! Boot is a strict pipeline; each stage's precondition is the previous
//! stage's postcondition:
//!
//! 1. **Logging** — route `log` to COM1 so later stages can talk.
//! 2. **Descriptor tables** — TSS ring-0 stack, GDT load, segment reload.
//! 3. **Gates** — timer and syscall entries into the IDT, IDT load.
//! 4. **Controllers** — remap the PIC cascade away from the exception
//!    vectors, unmask the timer line.
//!
//! Interrupts stay masked for the whole pipeline; the first `sti` in the
//! kernel's life is inside the first context switch. The scheduler owner
//! registers the high-level dispatchers through
//! [`entry::set_timer_hook`](crate::interrupts::entry) before performing
//! that switch; the stubs park the core if one fires unregistered.

use crate::idt::Idt;
use crate::interrupts::{SyscallInterrupt, TimerInterrupt};
use kernel_frame::selector::{CodeSel, SegmentSelector};

/// Install the two gates the execution core needs. Pure table mutation;
/// the privileged `lidt` happens in [`boot`].
pub fn install_gates(
    idt: &mut Idt,
    timer_handler: u32,
    syscall_handler: u32,
    cs: SegmentSelector<CodeSel>,
) {
    idt.install_timer(timer_handler, cs);
    idt.install_syscall(syscall_handler, cs);
}

/// Run the bring-up pipeline on the bootstrap processor.
///
/// # Safety
///
/// Ring 0 with interrupts masked, exactly once, with `cx` pinned for the
/// kernel's lifetime and `kernel_stack_top` pointing at usable, mapped
/// stack memory.
#[cfg(target_arch = "x86")]
pub unsafe fn boot(cx: &'static mut crate::per_cpu::PerCpu, kernel_stack_top: u32) {
    use crate::gdt::{KERNEL_CS_SEL, KERNEL_DS};
    use crate::interrupts::entry;
    use kernel_pic::AckLine;

    #[cfg(feature = "serial")]
    {
        let _ = kernel_serial::SerialLogger::new(log::LevelFilter::Info).init();
    }
    log::info!("bring-up: cpu {}", cx.cpu_id);

    cx.tss.set_ring0_stack(KERNEL_DS, kernel_stack_top);
    cx.gdt.attach_tss(&cx.tss);
    unsafe { cx.gdt.load() };
    log::info!("descriptor tables loaded");

    #[allow(clippy::cast_possible_truncation)]
    install_gates(
        &mut cx.idt,
        entry::timer_entry as usize as u32,
        entry::syscall_entry as usize as u32,
        KERNEL_CS_SEL,
    );
    unsafe { cx.idt.load() };

    unsafe {
        kernel_pic::init();
        kernel_pic::set_masked(AckLine::SCHEDULING, false);
    }
    log::info!("timer line unmasked; bring-up complete");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gdt::KERNEL_CS_SEL;
    use crate::interrupts::{SYSCALL_VECTOR, TIMER_VECTOR};

    #[test]
    fn gate_plan_covers_both_vectors() {
        let mut idt = Idt::new();
        install_gates(&mut idt, 0x0010_0000, 0x0010_1000, KERNEL_CS_SEL);
        assert!(idt.entry(TIMER_VECTOR).attr().present());
        assert!(idt.entry(SYSCALL_VECTOR).attr().present());
        assert_eq!(idt.entry(TIMER_VECTOR).offset(), 0x0010_0000);
        assert_eq!(idt.entry(SYSCALL_VECTOR).offset(), 0x0010_1000);
    }
}
