// src/serial.rs

//! Serial port driver (COM1) for diagnostic output
//!
//! Provides UART output on COM1 (0x3F8) with:
//! - 38400 baud rate
//! - 8 data bits, no parity, 1 stop bit (8N1)
//! - FIFO buffer support
//! - Transmit-empty polling with a bounded spin
//!
//! The display subsystem has no diagnostic surface of its own; every log
//! line and every `print!` mirror ends up here. On hosted builds (unit
//! tests) port I/O is compiled out and output is discarded.

use core::fmt::{self, Write};
use core::sync::atomic::{AtomicBool, Ordering};
use spin::Mutex;

/// COM1 base I/O port address
pub const SERIAL_IO_PORT: u16 = 0x3F8;

/// Divisor for 38400 baud (115200 / 3)
const BAUD_RATE_DIVISOR: u16 = 3;

/// Line control: 8 data bits, no parity, one stop bit
const CONFIG_8N1: u8 = 0x03;

/// Line control: divisor latch access bit
const DLAB_ENABLE: u8 = 0x80;

/// FIFO control: enable, clear both FIFOs, 14-byte threshold
const FIFO_ENABLE_CLEAR: u8 = 0xC7;

/// Modem control: IRQs enabled, RTS/DSR set
const MODEM_CTRL_ENABLE_IRQ_RTS_DSR: u8 = 0x0B;

/// Line status: transmit holding register empty
const LSR_TRANSMIT_EMPTY: u8 = 0x20;

/// Upper bound on transmit-empty polling per byte
const TIMEOUT_ITERATIONS: u32 = 100_000;

/// Scratch register pattern used for presence detection
const SCRATCH_TEST_PATTERN: u8 = 0xA5;

/// Register offsets from base port
mod register_offset {
    pub const DATA: u16 = 0;
    pub const INTERRUPT_ENABLE: u16 = 1;
    pub const FIFO_CONTROL: u16 = 2;
    pub const LINE_CONTROL: u16 = 3;
    pub const MODEM_CONTROL: u16 = 4;
    pub const LINE_STATUS: u16 = 5;
    pub const SCRATCH: u16 = 7;
}

static SERIAL_INITIALIZED: AtomicBool = AtomicBool::new(false);
static SERIAL_PORT_AVAILABLE: AtomicBool = AtomicBool::new(false);

/// Register window of one 16550-compatible UART
struct SerialPorts {
    base: u16,
}

impl SerialPorts {
    const fn new(base: u16) -> Self {
        Self { base }
    }

    /// Program baud rate, framing and FIFO
    fn configure(&mut self) {
        self.write_reg(register_offset::INTERRUPT_ENABLE, 0x00);
        self.write_reg(register_offset::LINE_CONTROL, DLAB_ENABLE);
        self.write_reg(register_offset::DATA, (BAUD_RATE_DIVISOR & 0xFF) as u8);
        self.write_reg(
            register_offset::INTERRUPT_ENABLE,
            ((BAUD_RATE_DIVISOR >> 8) & 0xFF) as u8,
        );
        self.write_reg(register_offset::LINE_CONTROL, CONFIG_8N1);
        self.write_reg(register_offset::FIFO_CONTROL, FIFO_ENABLE_CLEAR);
        self.write_reg(register_offset::MODEM_CONTROL, MODEM_CTRL_ENABLE_IRQ_RTS_DSR);
    }

    /// Scratch register round trip; absent hardware reads back 0xFF
    fn is_present(&mut self) -> bool {
        self.write_reg(register_offset::SCRATCH, SCRATCH_TEST_PATTERN);
        self.read_reg(register_offset::SCRATCH) == SCRATCH_TEST_PATTERN
    }

    /// Poll the LSR and write a byte when the transmitter is ready.
    ///
    /// Returns `false` on timeout.
    fn poll_and_write(&mut self, byte: u8) -> bool {
        for _ in 0..TIMEOUT_ITERATIONS {
            if self.read_reg(register_offset::LINE_STATUS) & LSR_TRANSMIT_EMPTY != 0 {
                self.write_reg(register_offset::DATA, byte);
                return true;
            }
            core::hint::spin_loop();
        }
        false
    }

    #[cfg(target_os = "none")]
    fn write_reg(&mut self, offset: u16, value: u8) {
        let mut port = x86_64::instructions::port::Port::<u8>::new(self.base + offset);
        // SAFETY: COM1 registers are fixed I/O ports; callers hold the
        // SERIAL_PORTS mutex so accesses are serialized.
        unsafe { port.write(value) }
    }

    #[cfg(target_os = "none")]
    fn read_reg(&mut self, offset: u16) -> u8 {
        let mut port = x86_64::instructions::port::Port::<u8>::new(self.base + offset);
        // SAFETY: see write_reg.
        unsafe { port.read() }
    }

    #[cfg(not(target_os = "none"))]
    fn write_reg(&mut self, _offset: u16, _value: u8) {
        let _ = self.base;
    }

    #[cfg(not(target_os = "none"))]
    fn read_reg(&mut self, offset: u16) -> u8 {
        // Hosted builds have no UART: report "transmit empty", fail presence.
        if offset == register_offset::LINE_STATUS {
            LSR_TRANSMIT_EMPTY
        } else {
            0xFF
        }
    }
}

static SERIAL_PORTS: Mutex<SerialPorts> = Mutex::new(SerialPorts::new(SERIAL_IO_PORT));

/// Serial port initialization result
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitError {
    AlreadyInitialized,
    PortNotPresent,
}

impl fmt::Display for InitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InitError::AlreadyInitialized => write!(f, "Serial port already initialized"),
            InitError::PortNotPresent => write!(f, "Serial port hardware not present"),
        }
    }
}

/// Detect and configure COM1.
///
/// # Errors
///
/// `AlreadyInitialized` on a second call, `PortNotPresent` when the
/// scratch register test fails (always the case on hosted builds).
pub fn init() -> Result<(), InitError> {
    if SERIAL_INITIALIZED.swap(true, Ordering::AcqRel) {
        return Err(InitError::AlreadyInitialized);
    }

    let mut ports = SERIAL_PORTS.lock();
    if !ports.is_present() {
        SERIAL_INITIALIZED.store(false, Ordering::Release);
        return Err(InitError::PortNotPresent);
    }
    ports.configure();

    SERIAL_PORT_AVAILABLE.store(true, Ordering::Release);
    Ok(())
}

/// Return whether the serial port hardware is available
#[inline]
pub fn is_available() -> bool {
    SERIAL_PORT_AVAILABLE.load(Ordering::Acquire)
}

/// Write a string to the serial port
pub fn write_str(s: &str) {
    if !is_available() {
        return;
    }

    let mut ports = SERIAL_PORTS.lock();
    for byte in s.bytes() {
        if !ports.poll_and_write(byte) {
            break;
        }
    }
}

/// Serial writer implementing `core::fmt::Write`
#[derive(Debug)]
pub struct SerialWriter;

impl Write for SerialWriter {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        write_str(s);
        Ok(())
    }
}

/// Write formatted data to the serial port
#[doc(hidden)]
pub fn _print(args: fmt::Arguments) {
    crate::sync::without_interrupts(|| {
        let _ = SerialWriter.write_fmt(args);
    });
}

/// Serial print macro
#[macro_export]
macro_rules! serial_print {
    ($($arg:tt)*) => ({
        $crate::serial::_print(format_args!($($arg)*));
    });
}

/// Serial println macro
#[macro_export]
macro_rules! serial_println {
    () => ($crate::serial_print!("\n"));
    ($fmt:expr) => ($crate::serial_print!(concat!($fmt, "\n")));
    ($fmt:expr, $($arg:tt)*) => ($crate::serial_print!(
        concat!($fmt, "\n"), $($arg)*
    ));
}
