//! 16550 UART programming, reduced to what a log sink needs.

/// COM1 base port.
pub const COM1: u16 = 0x3F8;

/// UART input clock over 16, the dividend for baud divisors.
const UART_CLOCK: u32 = 115_200;

// Register offsets from the base port.
const DATA: u16 = 0; // THR (write) / RBR (read); divisor low with DLAB
const INT_ENABLE: u16 = 1; // divisor high with DLAB
const FIFO_CTRL: u16 = 2;
const LINE_CTRL: u16 = 3;
const MODEM_CTRL: u16 = 4;
const LINE_STATUS: u16 = 5;

const LCR_8N1: u8 = 0b0000_0011;
const LCR_DLAB: u8 = 0b1000_0000;
const LSR_THR_EMPTY: u8 = 1 << 5;

/// Baud-rate divisor for the 16550: clock / baud, saturating low.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub const fn divisor_for_baud(baud: u32) -> u16 {
    let d = UART_CLOCK / baud;
    if d > u16::MAX as u32 {
        u16::MAX
    } else if d == 0 {
        1
    } else {
        d as u16
    }
}

/// One serial transmitter. Polled only; the RX side and interrupts stay off.
pub struct SerialPort {
    base: u16,
    initialized: bool,
}

impl SerialPort {
    /// The COM1 transmitter, not yet programmed.
    #[must_use]
    pub const fn com1() -> Self {
        Self {
            base: COM1,
            initialized: false,
        }
    }

    /// Program 38400 baud, 8N1, FIFO on. Idempotent.
    pub fn init(&mut self) {
        if self.initialized {
            return;
        }
        let divisor = divisor_for_baud(38_400);
        self.out(INT_ENABLE, 0x00); // no UART interrupts
        self.out(LINE_CTRL, LCR_DLAB);
        self.out(DATA, (divisor & 0xFF) as u8);
        self.out(INT_ENABLE, (divisor >> 8) as u8);
        self.out(LINE_CTRL, LCR_8N1);
        self.out(FIFO_CTRL, 0xC7); // FIFO on, clear, 14-byte threshold
        self.out(MODEM_CTRL, 0x0B); // DTR | RTS | OUT2
        self.initialized = true;
    }

    /// Transmit one byte, polling for transmitter-empty first.
    pub fn put(&mut self, byte: u8) {
        if !self.initialized {
            self.init();
        }
        while self.inp(LINE_STATUS) & LSR_THR_EMPTY == 0 {
            core::hint::spin_loop();
        }
        self.out(DATA, byte);
    }

    #[cfg(all(target_arch = "x86", feature = "enabled"))]
    fn out(&self, offset: u16, value: u8) {
        // SAFETY: ring 0, and the register map above is the 16550 contract.
        unsafe {
            core::arch::asm!(
                "out dx, al",
                in("dx") self.base + offset,
                in("al") value,
                options(nomem, nostack, preserves_flags)
            );
        }
    }

    #[cfg(all(target_arch = "x86", feature = "enabled"))]
    fn inp(&self, offset: u16) -> u8 {
        let value: u8;
        // SAFETY: as above.
        unsafe {
            core::arch::asm!(
                "in al, dx",
                in("dx") self.base + offset,
                out("al") value,
                options(nomem, nostack, preserves_flags)
            );
        }
        value
    }

    #[cfg(not(all(target_arch = "x86", feature = "enabled")))]
    fn out(&self, _offset: u16, _value: u8) {
        let _ = self.base;
    }

    #[cfg(not(all(target_arch = "x86", feature = "enabled")))]
    fn inp(&self, _offset: u16) -> u8 {
        let _ = self.base;
        // Pretend the transmitter is always ready.
        LSR_THR_EMPTY
    }
}

impl core::fmt::Write for SerialPort {
    fn write_str(&mut self, s: &str) -> core::fmt::Result {
        for byte in s.bytes() {
            // CRLF discipline for terminals on the other end.
            if byte == b'\n' {
                self.put(b'\r');
            }
            self.put(byte);
        }
        Ok(())
    }
}
