//! # The context switch routine
//!
//! [`switch_to`] is the single exit from kernel mode. It runs with
//! interrupts masked (interrupt-gate entry guarantees this) and performs a
//! fixed five-step sequence:
//!
//! 1. load the destination's data segment registers from the frame,
//! 2. derive the `iret` stack image (with or without the `esp:ss` pair),
//! 3. acknowledge the transfer at the interrupt controller,
//! 4. re-enable interrupts,
//! 5. `iret` into the destination context. Never returns.
//!
//! The ordering is not negotiable:
//!
//! - **EOI before `sti`**: with `IF` still clear, the controller cannot
//!   deliver the next interrupt the moment the in-service bit drops, so the
//!   acknowledgment cannot be preempted-on.
//! - **`sti` immediately before `iret`**: `sti` inhibits interrupts for one
//!   more instruction, and that instruction is the `iret` itself. The
//!   destination context is therefore entered atomically; there is no
//!   window in which an interrupt could nest on the dying kernel stack.
//! - **EOI exactly once per transfer**: a second EOI on the same line drops
//!   the in-service bit of an unrelated interrupt.
//!
//! The hardware effects go through the [`Cpu`] trait, so the sequence is
//! checkable on a host build against a recording implementation; the real
//! machine uses [`BootCpu`].

use kernel_frame::privilege::Ring;
use kernel_frame::{IretImage, RegisterFrame};
use kernel_pic::AckLine;

/// The privileged operations the switch and exit paths consume, in the
/// order they are allowed to happen. Implementations other than the boot
/// CPU exist for host-side verification.
pub trait Cpu {
    /// Load `ds`/`es`/`fs`/`gs` from the frame's segment slots.
    fn load_data_segments(&mut self, frame: &RegisterFrame);

    /// Send the End-Of-Interrupt for `line`. Caller guarantees interrupts
    /// are masked and exactly one transfer is in service on that line.
    fn acknowledge(&mut self, line: AckLine);

    /// `sti`. Takes effect after the next instruction.
    fn enable_interrupts(&mut self);

    /// `iret` through `image`, resuming `frame`'s context. The frame is
    /// borrowed because ownership of the state passes to the CPU here.
    fn resume(&mut self, frame: &RegisterFrame, image: &IretImage) -> !;

    /// Raise a software interrupt (`int vector`) on this CPU.
    fn software_interrupt(&mut self, vector: u8);

    /// Idle until an interrupt arrives; loops on `hlt`.
    fn halt(&mut self) -> !;
}

/// Transfer the CPU to `frame`'s context, concluding the in-service
/// transfer on `line`.
///
/// `destination` is the caller's claim about the privilege change; the
/// frame's `cs` is authoritative and a mismatch panics in debug builds
/// inside [`IretImage::build`].
pub fn switch_to<C: Cpu>(
    cpu: &mut C,
    frame: &RegisterFrame,
    destination: Ring,
    line: AckLine,
) -> ! {
    cpu.load_data_segments(frame);
    let image = IretImage::build(frame, destination);
    cpu.acknowledge(line);
    cpu.enable_interrupts();
    cpu.resume(frame, &image)
}

/// The one real CPU, reached through privileged instructions.
#[cfg(target_arch = "x86")]
pub struct BootCpu;

#[cfg(target_arch = "x86")]
impl Cpu for BootCpu {
    fn load_data_segments(&mut self, frame: &RegisterFrame) {
        // Only the low 16 bits of the slots are meaningful.
        unsafe {
            core::arch::asm!(
                "mov ds, {ds:x}",
                "mov es, {es:x}",
                "mov fs, {fs:x}",
                "mov gs, {gs:x}",
                ds = in(reg) frame.ds,
                es = in(reg) frame.es,
                fs = in(reg) frame.fs,
                gs = in(reg) frame.gs,
                options(nostack, preserves_flags),
            );
        }
    }

    fn acknowledge(&mut self, line: AckLine) {
        unsafe { kernel_pic::eoi(line) };
    }

    fn enable_interrupts(&mut self) {
        unsafe { core::arch::asm!("sti", options(nostack, preserves_flags)) };
    }

    fn resume(&mut self, frame: &RegisterFrame, image: &IretImage) -> ! {
        // The image shape was already decided; the hardware re-derives it
        // from the RPL of the cs on the stack, which build() checked.
        let _ = image;
        unsafe {
            core::arch::asm!(
                // Segments were loaded in step 1; start the restore at the
                // pusha region and let iret consume the tail.
                "mov esp, {gpr}",
                "popa",
                "iretd",
                gpr = in(reg) &raw const frame.edi,
                options(noreturn),
            );
        }
    }

    fn software_interrupt(&mut self, vector: u8) {
        // `int` takes an immediate; only the vectors this kernel raises
        // from software are reachable here.
        match vector {
            crate::interrupts::TIMER_VECTOR => unsafe {
                core::arch::asm!("int 0x20", options(nostack));
            },
            crate::interrupts::SYSCALL_VECTOR => unsafe {
                core::arch::asm!("int 0x80", options(nostack));
            },
            _ => debug_assert!(false, "no software path for this vector"),
        }
    }

    fn halt(&mut self) -> ! {
        loop {
            unsafe { core::arch::asm!("hlt", options(nomem, preserves_flags)) };
        }
    }
}
