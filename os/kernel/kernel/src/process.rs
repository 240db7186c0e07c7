//! # The process model and its external seams
//!
//! The execution core does not decide *which* context runs or *what*
//! termination means beyond "no longer runnable" — those live behind two
//! traits:
//!
//! - [`ExitHook`] — the lifecycle owner, called exactly once per `exit`,
//!   before the terminating transfer of control. It reclaims whatever it
//!   likes (address space, handles, accounting) but is forbidden from
//!   resuming the process.
//! - [`Scheduler`] — picks the next context on the preemption tick.
//!
//! A [`Process`] here is only what the core needs: an identity, a lifecycle
//! state, and the [`RegisterFrame`] that *is* the suspended context.

use kernel_frame::RegisterFrame;
use kernel_frame::selector::{CodeSel, DataSel, SegmentSelector};

/// Process identifier. Never reused within a boot.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
pub struct Pid(u32);

impl Pid {
    #[inline]
    #[must_use]
    pub const fn new(pid: u32) -> Self {
        Self(pid)
    }

    #[inline]
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }
}

/// Lifecycle states.
///
/// `Running → Zombie` happens inside the exit path, before the kernel
/// relinquishes the CPU; `Zombie → Terminated` is the [`ExitHook`] owner's
/// business once it has collected the status.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum ProcessState {
    /// Suspended and runnable; the frame is a complete snapshot.
    Ready,
    /// Currently owns the CPU; the frame contents are stale.
    Running,
    /// Suspended and not schedulable until some event.
    Blocked,
    /// Exited; status recorded, resources not yet reclaimed.
    Zombie,
    /// Fully reclaimed. The `Pid` is now only a historical name.
    Terminated,
}

/// One process, as far as the execution core is concerned.
#[derive(Clone, Debug)]
pub struct Process {
    pid: Pid,
    state: ProcessState,
    /// Exit status; meaningful from `Zombie` on.
    status: Option<i32>,
    /// The suspended context. Authoritative except while `Running`.
    pub frame: RegisterFrame,
}

impl Process {
    /// A fresh user-mode process, `Ready` at `eip` with the given stack.
    #[must_use]
    pub const fn user(
        pid: Pid,
        eip: u32,
        user_stack_top: u32,
        code: SegmentSelector<CodeSel>,
        data: SegmentSelector<DataSel>,
    ) -> Self {
        Self {
            pid,
            state: ProcessState::Ready,
            status: None,
            frame: RegisterFrame::user_entry(eip, user_stack_top, code, data),
        }
    }

    #[inline]
    #[must_use]
    pub const fn pid(&self) -> Pid {
        self.pid
    }

    #[inline]
    #[must_use]
    pub const fn state(&self) -> ProcessState {
        self.state
    }

    /// Status passed to `exit`, once there is one.
    #[inline]
    #[must_use]
    pub const fn exit_status(&self) -> Option<i32> {
        self.status
    }

    /// Whether the scheduler may hand this process the CPU.
    #[inline]
    #[must_use]
    pub const fn is_runnable(&self) -> bool {
        matches!(self.state, ProcessState::Ready | ProcessState::Running)
    }

    /// Transition to `Running`; the frame becomes stale until the next
    /// suspension writes it back.
    #[inline]
    pub const fn mark_running(&mut self) {
        self.state = ProcessState::Running;
    }

    /// Transition to `Ready` with a fresh snapshot of the context.
    #[inline]
    pub const fn suspend(&mut self, frame: RegisterFrame) {
        self.frame = frame;
        self.state = ProcessState::Ready;
    }

    #[inline]
    pub const fn block(&mut self) {
        self.state = ProcessState::Blocked;
    }

    /// Record the exit and leave the lifecycle. Irreversible.
    #[inline]
    pub const fn mark_zombie(&mut self, status: i32) {
        self.status = Some(status);
        self.state = ProcessState::Zombie;
    }

    /// Final reclamation, performed by the lifecycle owner.
    #[inline]
    pub const fn mark_terminated(&mut self) {
        self.state = ProcessState::Terminated;
    }
}

/// The process lifecycle owner.
///
/// Called exactly once per exiting process, with interrupts still masked,
/// before the kernel acknowledges the syscall transfer. On return the
/// process must no longer be runnable; the exit path checks this in debug
/// builds and never touches the process again.
pub trait ExitHook {
    fn process_exit(&mut self, process: &mut Process, status: i32);
}

/// Scheduling policy, attached at the preemption tick.
pub trait Scheduler {
    /// Bank the interrupted context's snapshot.
    fn suspend_current(&mut self, frame: &RegisterFrame);

    /// The next process to run, if any. Returning `None` idles the CPU
    /// until the next interrupt.
    fn pick_next(&mut self) -> Option<&mut Process>;
}
