use kernel_frame::privilege::Rpl;
use kernel_frame::{CodeSel, DataSel, Eflags, IretImage, RegisterFrame, Ring, SegmentSelector};

const USER_CS: SegmentSelector<CodeSel> = SegmentSelector::<CodeSel>::new(3, Rpl::Ring3);
const USER_DS: SegmentSelector<DataSel> = SegmentSelector::<DataSel>::new(4, Rpl::Ring3);
const KERNEL_CS: SegmentSelector<CodeSel> = SegmentSelector::<CodeSel>::new(1, Rpl::Ring0);
const KERNEL_DS: SegmentSelector<DataSel> = SegmentSelector::<DataSel>::new(2, Rpl::Ring0);

#[test]
fn user_entry_frame_is_fully_populated() {
    let frame = RegisterFrame::user_entry(0x0804_8000, 0xbfff_f000, USER_CS, USER_DS);

    assert_eq!(frame.eip, 0x0804_8000);
    assert_eq!(frame.cs, u32::from(USER_CS.encode()));
    assert_eq!(frame.esp, 0xbfff_f000);
    assert_eq!(frame.ss, u32::from(USER_DS.encode()));
    for sel in [frame.ds, frame.es, frame.fs, frame.gs] {
        assert_eq!(sel, u32::from(USER_DS.encode()));
    }
    // The new context must be preemptible from its first instruction.
    assert!(frame.flags().if_interrupt_enable());
}

#[test]
fn destination_ring_comes_from_cs_rpl() {
    let user = RegisterFrame::user_entry(0, 0, USER_CS, USER_DS);
    assert_eq!(user.destination_ring(), Ring::Ring3);
    assert!(user.crosses_rings());

    let kernel = RegisterFrame::kernel_entry(0, KERNEL_CS, KERNEL_DS);
    assert_eq!(kernel.destination_ring(), Ring::Ring0);
    assert!(!kernel.crosses_rings());
}

#[test]
fn same_ring_image_has_no_stack_pair() {
    let frame = RegisterFrame::kernel_entry(0x10_0000, KERNEL_CS, KERNEL_DS);
    let image = IretImage::build(&frame, Ring::Ring0);

    assert!(!image.crosses_rings());
    assert_eq!(
        image.words(),
        &[0x10_0000, u32::from(KERNEL_CS.encode()), 0x202]
    );
}

#[test]
fn ring_transition_image_carries_esp_ss_beneath_the_flags() {
    let frame = RegisterFrame::user_entry(0x0804_8000, 0xbfff_f000, USER_CS, USER_DS);
    let image = IretImage::build(&frame, Ring::Ring3);

    assert!(image.crosses_rings());
    // Pop order: eip, cs, eflags, esp, ss.
    assert_eq!(
        image.words(),
        &[
            0x0804_8000,
            u32::from(USER_CS.encode()),
            0x202,
            0xbfff_f000,
            u32::from(USER_DS.encode()),
        ]
    );
}

#[test]
#[should_panic(expected = "destination ring disagrees")]
fn mismatched_destination_claim_is_caught() {
    let frame = RegisterFrame::user_entry(0, 0, USER_CS, USER_DS);
    let _ = IretImage::build(&frame, Ring::Ring0);
}

#[test]
fn frame_copy_roundtrip_is_identical() {
    let mut frame = RegisterFrame::user_entry(0x1234, 0x5678, USER_CS, USER_DS);
    frame.eax = 11;
    frame.ebx = 22;
    frame.ecx = 33;
    frame.edx = 44;
    frame.esi = 55;
    frame.edi = 66;
    frame.ebp = 77;

    let copy = frame;
    assert_eq!(copy, frame);
    assert_eq!(Eflags::from_bits(copy.eflags), frame.flags());
}
