//! Syscall dispatch: the terminating exit path and the returning services,
//! observed through the recording CPU and a counting lifecycle hook.

mod common;

use common::{Op, Outcome, TraceCpu, conclude};
use kernel::gdt::{USER_CS_SEL, USER_DS_SEL};
use kernel::interrupts::TIMER_VECTOR;
use kernel::per_cpu::PerCpu;
use kernel::process::{ExitHook, Pid, Process, ProcessState};
use kernel::syscall::handle_syscall;
use stdlib::syscall_abi::{RET_INVALID, Sysno};

/// Lifecycle owner double: records every call and retires the process.
#[derive(Default)]
struct CountingHook {
    calls: Vec<(Pid, i32)>,
}

impl ExitHook for CountingHook {
    fn process_exit(&mut self, process: &mut Process, status: i32) {
        self.calls.push((process.pid(), status));
        process.mark_zombie(status);
    }
}

/// A hook that forgets to retire the process, for the debug check.
struct NegligentHook;

impl ExitHook for NegligentHook {
    fn process_exit(&mut self, _process: &mut Process, _status: i32) {}
}

fn process(pid: u32) -> Process {
    Process::user(Pid::new(pid), 0x0804_8000, 0xBFFF_F000, USER_CS_SEL, USER_DS_SEL)
}

/// A core context on which `p` is the current process, as it would be when
/// `p` executed `int 0x80`.
fn context_for(p: &Process) -> PerCpu {
    let mut cx = PerCpu::new(0);
    cx.record_switch(p.pid());
    cx
}

fn trap(p: &mut Process, sysno: u32, ebx: u32) {
    p.mark_running();
    p.frame.eax = sysno;
    p.frame.ebx = ebx;
}

#[test]
fn exit_runs_the_hook_once_then_yields_to_the_timer() {
    let mut cpu = TraceCpu::new();
    let mut hook = CountingHook::default();
    let mut p = process(7);
    trap(&mut p, Sysno::Exit.to_u32(), 3);
    let mut cx = context_for(&p);

    let outcome = conclude(|| handle_syscall(&mut cx, &mut cpu, &mut hook, &mut p));

    assert_eq!(hook.calls, vec![(Pid::new(7), 3)]);
    assert_eq!(p.state(), ProcessState::Zombie);
    assert_eq!(p.exit_status(), Some(3));

    // EOI on the scheduling line while masked, then sti, then the software
    // timer interrupt; the halt is only the backstop.
    assert_eq!(
        cpu.ops,
        vec![
            Op::Acknowledge {
                line: 0,
                on_slave: false
            },
            Op::EnableInterrupts,
            Op::SoftwareInterrupt {
                vector: TIMER_VECTOR
            },
        ]
    );
    assert_eq!(outcome, Outcome::Halted);
}

#[test]
fn exit_vacates_the_current_slot() {
    let mut cpu = TraceCpu::new();
    let mut hook = CountingHook::default();
    let mut p = process(7);
    trap(&mut p, Sysno::Exit.to_u32(), 0);
    let mut cx = context_for(&p);
    assert_eq!(cx.current(), Some(Pid::new(7)));

    let _ = conclude(|| handle_syscall(&mut cx, &mut cpu, &mut hook, &mut p));

    // The dead process must not stay named as the core's owner; the forced
    // timer tick repopulates the slot when it picks a successor.
    assert_eq!(cx.current(), None);
}

#[test]
fn exit_status_is_signed() {
    let mut cpu = TraceCpu::new();
    let mut hook = CountingHook::default();
    let mut p = process(9);
    trap(&mut p, Sysno::Exit.to_u32(), (-9i32) as u32);
    let mut cx = context_for(&p);

    let _ = conclude(|| handle_syscall(&mut cx, &mut cpu, &mut hook, &mut p));

    assert_eq!(hook.calls, vec![(Pid::new(9), -9)]);
}

#[test]
#[should_panic(expected = "left the exited process runnable")]
fn a_hook_that_keeps_the_process_runnable_is_a_defect() {
    let mut cpu = TraceCpu::new();
    let mut hook = NegligentHook;
    let mut p = process(1);
    trap(&mut p, Sysno::Exit.to_u32(), 0);
    let mut cx = context_for(&p);

    handle_syscall(&mut cx, &mut cpu, &mut hook, &mut p);
}

#[test]
fn write_byte_returns_zero_and_resumes_the_caller() {
    let mut cpu = TraceCpu::new();
    let mut hook = CountingHook::default();
    let mut p = process(4);
    trap(&mut p, Sysno::WriteByte.to_u32(), u32::from(b'A'));
    let mut cx = context_for(&p);

    let outcome = conclude(|| handle_syscall(&mut cx, &mut cpu, &mut hook, &mut p));

    assert!(hook.calls.is_empty());
    let Outcome::Resumed { frame, .. } = outcome else {
        panic!("expected a resume");
    };
    assert_eq!(frame.eax, 0);
    assert_eq!(frame.eip, 0x0804_8000);
    // The caller keeps owning the core across a returning syscall.
    assert_eq!(cx.current(), Some(Pid::new(4)));
    // The same transfer is concluded exactly once, after segment reload.
    assert_eq!(cpu.acks(), 1);
    assert!(matches!(cpu.ops[0], Op::LoadDataSegments { .. }));
}

#[test]
fn getpid_returns_the_callers_pid() {
    let mut cpu = TraceCpu::new();
    let mut hook = CountingHook::default();
    let mut p = process(1234);
    trap(&mut p, Sysno::GetPid.to_u32(), 0);
    let mut cx = context_for(&p);

    let outcome = conclude(|| handle_syscall(&mut cx, &mut cpu, &mut hook, &mut p));

    let Outcome::Resumed { frame, .. } = outcome else {
        panic!("expected a resume");
    };
    assert_eq!(frame.eax, 1234);
}

#[test]
fn unknown_numbers_return_the_invalid_marker() {
    let mut cpu = TraceCpu::new();
    let mut hook = CountingHook::default();
    let mut p = process(2);
    trap(&mut p, 0xDEAD, 0);
    let mut cx = context_for(&p);

    let outcome = conclude(|| handle_syscall(&mut cx, &mut cpu, &mut hook, &mut p));

    let Outcome::Resumed { frame, .. } = outcome else {
        panic!("expected a resume");
    };
    assert_eq!(frame.eax, RET_INVALID);
    assert!(hook.calls.is_empty());
}
