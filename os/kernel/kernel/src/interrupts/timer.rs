//! # The preemption tick
//!
//! IRQ 0 fires, the entry stub captures the interrupted context, and this
//! handler decides who runs next. It never returns: every path out is a
//! [`switch_to`] or an acknowledged idle halt.
//!
//! The interrupted frame is handed to the scheduler *unmodified*. Whether
//! the same context resumes or another one does, what runs afterwards is
//! always a frame the scheduler handed back, restored byte for byte.

use crate::interrupts::TIMER_VECTOR;
use crate::per_cpu::PerCpu;
use crate::process::Scheduler;
use crate::switch::{Cpu, switch_to};
use kernel_frame::RegisterFrame;
use kernel_pic::AckLine;

/// Service one preemption tick.
///
/// `saved` is the interrupted context, or `None` when the tick interrupted
/// the idle halt and there is nothing to bank. Interrupts are masked
/// throughout; the concluding transfer re-enables them.
pub fn handle_timer<C: Cpu, S: Scheduler>(
    cx: &mut PerCpu,
    cpu: &mut C,
    scheduler: &mut S,
    saved: Option<&RegisterFrame>,
) -> ! {
    let line = AckLine::from_vector(TIMER_VECTOR);
    let tick = cx.tick();

    if let Some(frame) = saved {
        scheduler.suspend_current(frame);
    }

    if let Some(next) = scheduler.pick_next() {
        log::trace!("tick {tick}: switching to pid {}", next.pid().get());
        next.mark_running();
        cx.record_switch(next.pid());
        let destination = next.frame.destination_ring();
        switch_to(cpu, &next.frame, destination, line)
    } else {
        // Nothing runnable. Conclude the tick and sleep until the next
        // interrupt; the stub will re-enter with saved = None.
        log::trace!("tick {tick}: idle");
        cx.clear_current();
        cpu.acknowledge(line);
        cpu.enable_interrupts();
        cpu.halt()
    }
}
