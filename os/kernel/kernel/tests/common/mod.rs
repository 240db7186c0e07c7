//! Shared test doubles: a recording CPU whose diverging operations unwind
//! with a typed payload, so tests can observe both the operation trace and
//! how a never-returning path concluded.

#![allow(dead_code)]

use kernel::switch::Cpu;
use kernel_frame::{IretImage, RegisterFrame};
use kernel_pic::AckLine;
use std::panic::{AssertUnwindSafe, catch_unwind, panic_any, resume_unwind};

/// One recorded privileged operation.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum Op {
    LoadDataSegments { ds: u32, es: u32, fs: u32, gs: u32 },
    Acknowledge { line: u8, on_slave: bool },
    EnableInterrupts,
    SoftwareInterrupt { vector: u8 },
}

/// How a diverging path concluded.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// `iret` into a context: the frame it resumed and the exact stack
    /// image words, lowest address first.
    Resumed {
        frame: RegisterFrame,
        words: Vec<u32>,
        crosses_rings: bool,
    },
    /// Parked on `hlt`.
    Halted,
}

/// A CPU that records every privileged operation and models the diverging
/// ones by unwinding with an [`Outcome`].
#[derive(Default)]
pub struct TraceCpu {
    pub ops: Vec<Op>,
}

impl TraceCpu {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count of EOIs sent, across both controllers' lines.
    pub fn acks(&self) -> usize {
        self.ops
            .iter()
            .filter(|op| matches!(op, Op::Acknowledge { .. }))
            .count()
    }
}

impl Cpu for TraceCpu {
    fn load_data_segments(&mut self, frame: &RegisterFrame) {
        self.ops.push(Op::LoadDataSegments {
            ds: frame.ds,
            es: frame.es,
            fs: frame.fs,
            gs: frame.gs,
        });
    }

    fn acknowledge(&mut self, line: AckLine) {
        self.ops.push(Op::Acknowledge {
            line: line.line(),
            on_slave: line.on_slave(),
        });
    }

    fn enable_interrupts(&mut self) {
        self.ops.push(Op::EnableInterrupts);
    }

    fn resume(&mut self, frame: &RegisterFrame, image: &IretImage) -> ! {
        panic_any(Outcome::Resumed {
            frame: *frame,
            words: image.words().to_vec(),
            crosses_rings: image.crosses_rings(),
        })
    }

    fn software_interrupt(&mut self, vector: u8) {
        self.ops.push(Op::SoftwareInterrupt { vector });
    }

    fn halt(&mut self) -> ! {
        panic_any(Outcome::Halted)
    }
}

/// Run a never-returning path and capture how it concluded. Panics other
/// than the [`TraceCpu`] outcomes (assertion failures inside the path)
/// propagate unchanged.
pub fn conclude(f: impl FnOnce()) -> Outcome {
    let payload = catch_unwind(AssertUnwindSafe(f)).expect_err("path must diverge");
    match payload.downcast::<Outcome>() {
        Ok(outcome) => *outcome,
        Err(other) => resume_unwind(other),
    }
}
