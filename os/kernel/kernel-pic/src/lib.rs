//! # 8259A Programmable Interrupt Controller — the acknowledgment gate
//!
//! Two cascaded 8259As deliver the sixteen legacy IRQ lines. This crate owns
//! the one protocol the execution core depends on: **exactly one
//! End-Of-Interrupt (EOI) per delivered interrupt, sent while interrupts are
//! still masked, on the line derived from the entry vector**.
//!
//! ## Port map
//!
//! ```text
//! 0x20  master command    0x21  master data (IMR / ICWs)
//! 0xA0  slave  command    0xA1  slave  data (IMR / ICWs)
//! ```
//!
//! ## Line derivation
//!
//! The acknowledgment line is derived **solely from the entry vector**
//! ([`AckLine::from_vector`]), never from handler-local guesses: hardware
//! vectors `0x20..=0x2F` map to IRQ lines 0..=15, and every software-only
//! trap vector (e.g. the `int 0x80` syscall trap) collapses to the fixed
//! scheduling line, IRQ 0 — the same line the preemption timer concludes on.
//! Acknowledging the wrong line silently breaks delivery of an unrelated
//! interrupt source, so the mapping lives in one pure function with tests.
//!
//! ## Cascade rule
//!
//! Lines 8..=15 arrive through the slave, which is wired to the master's
//! IRQ 2: concluding one of them takes an EOI to the slave *and* the master.
//! [`EoiSequence::for_line`] derives the exact port writes as data, which is
//! what both the privileged layer and the host tests consume.
//!
//! ## Structure
//!
//! Pure derivations (`AckLine`, `EoiSequence`, [`remap_sequence`]) are
//! host-testable `no_std` logic; the thin privileged layer
//! ([`eoi`], [`init`], [`set_masked`]) performs the actual port I/O and only
//! compiles on `target_arch = "x86"`.

#![cfg_attr(not(any(test, doctest)), no_std)]
#![allow(unsafe_code)]

mod port;

/// Master PIC command port.
pub const PIC1_CMD: u16 = 0x20;
/// Master PIC data port (IMR after init).
pub const PIC1_DATA: u16 = 0x21;
/// Slave PIC command port.
pub const PIC2_CMD: u16 = 0xA0;
/// Slave PIC data port (IMR after init).
pub const PIC2_DATA: u16 = 0xA1;

/// Non-specific EOI command byte.
pub const CMD_EOI: u8 = 0x20;
/// ICW1: initialization, ICW4 needed.
const ICW1_INIT_ICW4: u8 = 0x11;
/// ICW4: 8086/88 mode.
const ICW4_8086: u8 = 0x01;

/// Vector base the IRQ lines are remapped to (IRQ 0 → vector 0x20).
pub const VECTOR_BASE: u8 = 0x20;
/// First vector past the remapped IRQ range.
pub const VECTOR_LIMIT: u8 = VECTOR_BASE + 16;

/// An IRQ line (0..=15) to acknowledge, derived from an entry vector.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct AckLine(u8);

impl AckLine {
    /// The fixed line used to conclude scheduling-relevant transfers that
    /// did not arrive on a hardware IRQ (software syscall traps).
    pub const SCHEDULING: Self = Self(0);

    /// Derive the acknowledgment line from the interrupt's entry vector.
    ///
    /// This is the only constructor the handling path may use; every other
    /// source of a line number is a handler-local guess and a defect.
    #[inline]
    #[must_use]
    pub const fn from_vector(vector: u8) -> Self {
        if vector >= VECTOR_BASE && vector < VECTOR_LIMIT {
            Self(vector - VECTOR_BASE)
        } else {
            Self::SCHEDULING
        }
    }

    /// Construct from a raw line number; 0..=15 only.
    #[inline]
    #[must_use]
    pub const fn from_raw(line: u8) -> Option<Self> {
        if line < 16 { Some(Self(line)) } else { None }
    }

    /// The raw line number (0..=15).
    #[inline]
    #[must_use]
    pub const fn line(self) -> u8 {
        self.0
    }

    /// Whether this line is delivered through the slave controller.
    #[inline]
    #[must_use]
    pub const fn on_slave(self) -> bool {
        self.0 >= 8
    }
}

/// A single write to an I/O port, as data.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct PortWrite {
    pub port: u16,
    pub value: u8,
}

/// The exact port writes that conclude one interrupt on one line.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct EoiSequence {
    /// EOI to the slave controller; present only for lines 8..=15.
    pub slave: Option<PortWrite>,
    /// EOI to the master controller; always present (the cascade line on
    /// the master is in service whenever the slave raised anything).
    pub master: PortWrite,
}

impl EoiSequence {
    /// Derive the write sequence for `line`.
    #[inline]
    #[must_use]
    pub const fn for_line(line: AckLine) -> Self {
        let slave = if line.on_slave() {
            Some(PortWrite {
                port: PIC2_CMD,
                value: CMD_EOI,
            })
        } else {
            None
        };
        Self {
            slave,
            master: PortWrite {
                port: PIC1_CMD,
                value: CMD_EOI,
            },
        }
    }
}

/// The ICW1..ICW4 command stream that remaps the cascade so IRQ 0..15 land
/// on `offset1..offset1+7` and `offset2..offset2+7`.
///
/// The boot default (vectors 0x08..0x0F) collides with CPU exceptions in
/// protected mode, so this runs before any interrupt is unmasked. Masks are
/// saved and restored around the stream by the privileged layer.
#[must_use]
pub const fn remap_sequence(offset1: u8, offset2: u8) -> [PortWrite; 8] {
    [
        // ICW1: begin initialization on both controllers.
        PortWrite {
            port: PIC1_CMD,
            value: ICW1_INIT_ICW4,
        },
        PortWrite {
            port: PIC2_CMD,
            value: ICW1_INIT_ICW4,
        },
        // ICW2: vector offsets.
        PortWrite {
            port: PIC1_DATA,
            value: offset1,
        },
        PortWrite {
            port: PIC2_DATA,
            value: offset2,
        },
        // ICW3: slave on master IRQ 2; slave identity 2.
        PortWrite {
            port: PIC1_DATA,
            value: 0b0000_0100,
        },
        PortWrite {
            port: PIC2_DATA,
            value: 2,
        },
        // ICW4: 8086 mode.
        PortWrite {
            port: PIC1_DATA,
            value: ICW4_8086,
        },
        PortWrite {
            port: PIC2_DATA,
            value: ICW4_8086,
        },
    ]
}

/// Acknowledge one delivered interrupt on `line`.
///
/// # Safety
///
/// Must be called exactly once per delivered interrupt, from the handling
/// path, while interrupts are masked. Double acknowledgment or acknowledging
/// a line that is not in service corrupts the controller's in-service state.
#[cfg(target_arch = "x86")]
pub unsafe fn eoi(line: AckLine) {
    let seq = EoiSequence::for_line(line);
    unsafe {
        if let Some(w) = seq.slave {
            port::outb(w.port, w.value);
        }
        port::outb(seq.master.port, seq.master.value);
    }
}

/// Remap the cascade to [`VECTOR_BASE`] and restore the interrupt masks.
///
/// # Safety
///
/// Must run once during bring-up with interrupts disabled, before any IDT
/// gate for a hardware vector is marked present.
#[cfg(target_arch = "x86")]
pub unsafe fn init() {
    unsafe {
        let mask1 = port::inb(PIC1_DATA);
        let mask2 = port::inb(PIC2_DATA);

        for w in remap_sequence(VECTOR_BASE, VECTOR_BASE + 8) {
            port::outb(w.port, w.value);
            port::io_wait();
        }

        port::outb(PIC1_DATA, mask1);
        port::outb(PIC2_DATA, mask2);
    }
    log::info!("PIC cascade remapped to vectors {VECTOR_BASE:#04x}..{VECTOR_LIMIT:#04x}");
}

/// Gate an individual line via the controller's interrupt mask register.
///
/// # Safety
///
/// Caller must hold off interrupts around the read-modify-write.
#[cfg(target_arch = "x86")]
pub unsafe fn set_masked(line: AckLine, masked: bool) {
    let (data_port, bit) = if line.on_slave() {
        (PIC2_DATA, line.line() - 8)
    } else {
        (PIC1_DATA, line.line())
    };
    unsafe {
        let mut imr = port::inb(data_port);
        if masked {
            imr |= 1 << bit;
        } else {
            imr &= !(1 << bit);
        }
        port::outb(data_port, imr);
    }
}
