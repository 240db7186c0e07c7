use kernel_pic::{
    AckLine, EoiSequence, PIC1_CMD, PIC1_DATA, PIC2_CMD, PIC2_DATA, VECTOR_BASE, remap_sequence,
};

#[test]
fn hardware_vectors_map_to_their_lines() {
    for irq in 0..16u8 {
        let line = AckLine::from_vector(VECTOR_BASE + irq);
        assert_eq!(line.line(), irq);
        assert_eq!(line.on_slave(), irq >= 8);
    }
}

#[test]
fn software_trap_vectors_collapse_to_the_scheduling_line() {
    // The syscall trap concludes on the fixed scheduling line (IRQ 0),
    // never on a line guessed from the trap number.
    assert_eq!(AckLine::from_vector(0x80), AckLine::SCHEDULING);
    // Exception vectors below the remap base do the same.
    assert_eq!(AckLine::from_vector(0x0e), AckLine::SCHEDULING);
    // Vectors past the IRQ window, too.
    assert_eq!(AckLine::from_vector(0xff), AckLine::SCHEDULING);
}

#[test]
fn raw_lines_are_range_checked() {
    assert!(AckLine::from_raw(15).is_some());
    assert!(AckLine::from_raw(16).is_none());
}

#[test]
fn master_line_eoi_is_a_single_master_write() {
    let seq = EoiSequence::for_line(AckLine::from_vector(VECTOR_BASE)); // IRQ 0
    assert!(seq.slave.is_none());
    assert_eq!(seq.master.port, PIC1_CMD);
    assert_eq!(seq.master.value, 0x20);
}

#[test]
fn slave_line_eoi_hits_slave_then_master() {
    let seq = EoiSequence::for_line(AckLine::from_vector(VECTOR_BASE + 12)); // IRQ 12
    let slave = seq.slave.expect("cascade lines require a slave EOI");
    assert_eq!(slave.port, PIC2_CMD);
    assert_eq!(slave.value, 0x20);
    assert_eq!(seq.master.port, PIC1_CMD);
}

#[test]
fn remap_stream_is_the_icw_protocol() {
    let seq = remap_sequence(0x20, 0x28);

    // ICW1 to both command ports.
    assert_eq!((seq[0].port, seq[0].value), (PIC1_CMD, 0x11));
    assert_eq!((seq[1].port, seq[1].value), (PIC2_CMD, 0x11));
    // ICW2: the vector offsets.
    assert_eq!((seq[2].port, seq[2].value), (PIC1_DATA, 0x20));
    assert_eq!((seq[3].port, seq[3].value), (PIC2_DATA, 0x28));
    // ICW3: cascade wiring (slave on IRQ 2, identity 2).
    assert_eq!((seq[4].port, seq[4].value), (PIC1_DATA, 0b100));
    assert_eq!((seq[5].port, seq[5].value), (PIC2_DATA, 2));
    // ICW4: 8086 mode.
    assert_eq!((seq[6].port, seq[6].value), (PIC1_DATA, 1));
    assert_eq!((seq[7].port, seq[7].value), (PIC2_DATA, 1));
}
