//! # The `iret` stack image
//!
//! `iret` is the only instruction that changes privilege level and control
//! flow atomically. It pops, in order: `eip`, `cs`, `eflags` — and, iff the
//! new `cs` carries a more-restricted RPL, `esp` and `ss` beneath them:
//!
//! ```text
//!  same ring              ring transition
//!  ESP → eip              ESP → eip
//!        cs                     cs
//!        eflags                 eflags
//!                               esp
//!                               ss
//! ```
//!
//! Omitting the `esp:ss` pair when one is required (or supplying one when it
//! is not) makes the CPU fault or read garbage — a fatal layout error, not a
//! recoverable condition. [`IretImage::build`] is the single place that
//! decides which shape applies, so every switch goes through the same check.

use crate::RegisterFrame;
use crate::privilege::Ring;

/// Number of 32-bit words `iret` pops on a same-ring return.
pub const SAME_RING_WORDS: usize = 3;
/// Number of 32-bit words `iret` pops on a ring transition.
pub const CROSS_RING_WORDS: usize = 5;

/// The exact word sequence `iret` pops, lowest address first.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct IretImage {
    words: [u32; CROSS_RING_WORDS],
    len: usize,
}

impl IretImage {
    /// Build the return image for `frame`, destined for `destination`.
    ///
    /// The destination ring is the caller's claim; the frame's `cs` RPL is
    /// authoritative, and a mismatch is a defect in the caller, caught here
    /// in debug builds.
    #[must_use]
    pub fn build(frame: &RegisterFrame, destination: Ring) -> Self {
        debug_assert!(
            destination == frame.destination_ring(),
            "destination ring disagrees with the RPL of the frame's cs"
        );

        if destination.is_restricted() {
            Self {
                words: [frame.eip, frame.cs, frame.eflags, frame.esp, frame.ss],
                len: CROSS_RING_WORDS,
            }
        } else {
            Self {
                words: [frame.eip, frame.cs, frame.eflags, 0, 0],
                len: SAME_RING_WORDS,
            }
        }
    }

    /// The image words in pop order (`eip` first).
    #[inline]
    #[must_use]
    pub fn words(&self) -> &[u32] {
        &self.words[..self.len]
    }

    /// Whether this image performs a privilege transition.
    #[inline]
    #[must_use]
    pub const fn crosses_rings(&self) -> bool {
        self.len == CROSS_RING_WORDS
    }

    /// Resume instruction pointer.
    #[inline]
    #[must_use]
    pub const fn eip(&self) -> u32 {
        self.words[0]
    }

    /// Destination code segment selector.
    #[inline]
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub const fn cs(&self) -> u16 {
        self.words[1] as u16
    }

    /// Flags image popped into EFLAGS.
    #[inline]
    #[must_use]
    pub const fn eflags(&self) -> u32 {
        self.words[2]
    }
}
