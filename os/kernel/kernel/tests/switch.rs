//! The context switch sequence, observed through a recording CPU: operation
//! order, stack image shape, and the exactly-once acknowledgment.

mod common;

use common::{Op, Outcome, TraceCpu, conclude};
use kernel::gdt::{KERNEL_CS_SEL, KERNEL_DS_SEL, USER_CS, USER_CS_SEL, USER_DS, USER_DS_SEL};
use kernel::switch::switch_to;
use kernel_frame::privilege::Ring;
use kernel_frame::{Eflags, RegisterFrame};
use kernel_pic::AckLine;

fn user_frame() -> RegisterFrame {
    RegisterFrame::user_entry(0x0804_8000, 0xBFFF_F000, USER_CS_SEL, USER_DS_SEL)
}

#[test]
fn sequence_is_segments_then_eoi_then_sti_then_iret() {
    let mut cpu = TraceCpu::new();
    let frame = user_frame();
    let line = AckLine::from_vector(0x20);

    let outcome = conclude(|| switch_to(&mut cpu, &frame, Ring::Ring3, line));

    assert_eq!(
        cpu.ops,
        vec![
            Op::LoadDataSegments {
                ds: u32::from(USER_DS),
                es: u32::from(USER_DS),
                fs: u32::from(USER_DS),
                gs: u32::from(USER_DS),
            },
            Op::Acknowledge {
                line: 0,
                on_slave: false
            },
            Op::EnableInterrupts,
        ]
    );
    assert!(matches!(outcome, Outcome::Resumed { .. }));
}

#[test]
fn ring_transition_image_carries_the_stack_pair() {
    let mut cpu = TraceCpu::new();
    let frame = user_frame();

    let outcome = conclude(|| switch_to(&mut cpu, &frame, Ring::Ring3, AckLine::SCHEDULING));

    let Outcome::Resumed {
        words,
        crosses_rings,
        ..
    } = outcome
    else {
        panic!("expected a resume");
    };
    assert!(crosses_rings);
    assert_eq!(
        words,
        vec![
            0x0804_8000,
            u32::from(USER_CS),
            Eflags::resumable().into_bits(),
            0xBFFF_F000,
            u32::from(USER_DS),
        ]
    );
}

#[test]
fn same_ring_image_omits_the_stack_pair() {
    let mut cpu = TraceCpu::new();
    let frame = RegisterFrame::kernel_entry(0x0010_4000, KERNEL_CS_SEL, KERNEL_DS_SEL);

    let outcome = conclude(|| switch_to(&mut cpu, &frame, Ring::Ring0, AckLine::SCHEDULING));

    let Outcome::Resumed {
        words,
        crosses_rings,
        ..
    } = outcome
    else {
        panic!("expected a resume");
    };
    assert!(!crosses_rings);
    assert_eq!(words.len(), 3);
    assert_eq!(words[0], 0x0010_4000);
}

#[test]
fn exactly_one_eoi_per_transfer() {
    let mut cpu = TraceCpu::new();
    let frame = user_frame();

    let _ = conclude(|| switch_to(&mut cpu, &frame, Ring::Ring3, AckLine::from_vector(0x21)));

    assert_eq!(cpu.acks(), 1);
    assert_eq!(
        cpu.ops[1],
        Op::Acknowledge {
            line: 1,
            on_slave: false
        }
    );
}

#[test]
fn slave_lines_are_acknowledged_as_slave_lines() {
    let mut cpu = TraceCpu::new();
    let frame = user_frame();
    let line = AckLine::from_raw(11).unwrap();

    let _ = conclude(|| switch_to(&mut cpu, &frame, Ring::Ring3, line));

    assert_eq!(
        cpu.ops[1],
        Op::Acknowledge {
            line: 11,
            on_slave: true
        }
    );
}

#[test]
fn resumed_frame_is_the_suspended_frame_byte_for_byte() {
    let mut cpu = TraceCpu::new();
    let mut frame = user_frame();
    frame.eax = 0xAAAA;
    frame.ebx = 0xBBBB;
    frame.ecx = 0xCCCC;
    frame.edx = 0xDDDD;
    frame.esi = 0x5151;
    frame.edi = 0xD1D1;
    frame.ebp = 0xB9B9;

    let outcome = conclude(|| switch_to(&mut cpu, &frame, Ring::Ring3, AckLine::SCHEDULING));

    let Outcome::Resumed { frame: resumed, .. } = outcome else {
        panic!("expected a resume");
    };
    assert_eq!(resumed, frame);
}

#[test]
fn resumed_context_has_interrupts_enabled() {
    let mut cpu = TraceCpu::new();
    let frame = user_frame();

    let outcome = conclude(|| switch_to(&mut cpu, &frame, Ring::Ring3, AckLine::SCHEDULING));

    let Outcome::Resumed { words, .. } = outcome else {
        panic!("expected a resume");
    };
    assert!(Eflags::from_bits(words[2]).if_interrupt_enable());
}

#[test]
#[should_panic(expected = "destination ring disagrees")]
fn mismatched_destination_claim_is_caught() {
    let mut cpu = TraceCpu::new();
    let frame = user_frame();
    switch_to(&mut cpu, &frame, Ring::Ring0, AckLine::SCHEDULING);
}
