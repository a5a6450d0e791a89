//! Target peripherals that live underneath the generic dispatcher.
//!
//! Space Invaders class hardware hangs a dedicated barrel shifter off the
//! I/O ports, and CP/M diagnostic ROMs expect BDOS console calls at 0x0005.
//! Both are modelled here as an [`IoHook`] so the CPU core stays generic.

use crate::cpu::{Cpu, IoHook, Reg};
use crate::error::Unsupported;

/// Number of reserved I/O port slots.
pub const PORT_COUNT: usize = 8;

/// Value returned by `IN 0`. Bit 0 is wired high on the arcade board.
pub const IN0_CONSTANT: u8 = 0x01;

/// BDOS entry point trapped when the CP/M console is enabled.
pub const BDOS_ENTRY: u16 = 0x0005;
/// BDOS function: print the `$`-terminated string at DE.
pub const BDOS_PRINT_STRING: u8 = 0x09;
/// BDOS function: print the character in E.
pub const BDOS_PRINT_CHAR: u8 = 0x02;
/// Terminator for [`BDOS_PRINT_STRING`].
pub const BDOS_STRING_END: u8 = b'$';

const OP_CALL: u8 = 0xcd;
const OP_IN: u8 = 0xdb;
const OP_OUT: u8 = 0xd3;

/// Dedicated shift register on the Space Invaders board.
///
/// OUT 4 shifts a byte in from the top, OUT 2 selects a 3-bit offset and
/// IN 3 reads eight bits of the 16-bit latch at that offset.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ShiftRegister {
    low: u8,
    high: u8,
    offset: u8,
}

impl ShiftRegister {
    pub fn set_offset(&mut self, value: u8) {
        self.offset = value & 0x07;
    }

    pub fn shift_in(&mut self, value: u8) {
        self.low = self.high;
        self.high = value;
    }

    pub fn offset(&self) -> u8 {
        self.offset
    }

    pub fn read(&self) -> u8 {
        let latch = u16::from_be_bytes([self.high, self.low]);
        ((latch >> (8 - self.offset)) & 0xff) as u8
    }
}

/// Peripheral context passed alongside the CPU: the port array, shift
/// register and the optional CP/M console.
///
/// One array backs both directions. The input layer and OUT write it, IN 1
/// and IN 2 read it back.
#[derive(Clone, Debug, Default)]
pub struct Peripherals {
    ports: [u8; PORT_COUNT],
    shift: ShiftRegister,
    console: Option<Vec<u8>>,
}

impl Peripherals {
    pub fn new() -> Self {
        Self::default()
    }

    /// Peripherals with the CP/M BDOS console trap enabled.
    pub fn with_cpm_console() -> Self {
        Self {
            console: Some(Vec::new()),
            ..Self::default()
        }
    }

    /// Set the live value of a port (written by the input layer).
    ///
    /// # Panics
    ///
    /// Panics if `port >= PORT_COUNT`.
    pub fn set_input(&mut self, port: usize, value: u8) {
        assert!(port < PORT_COUNT, "Invalid input port: {}", port);
        self.ports[port] = value;
    }

    /// Current value of a port, or `None` outside the reserved range.
    pub fn port(&self, port: usize) -> Option<u8> {
        self.ports.get(port).copied()
    }

    /// The whole port array, as last written by the input layer or OUT.
    pub fn ports(&self) -> &[u8; PORT_COUNT] {
        &self.ports
    }

    pub fn shift_register(&self) -> &ShiftRegister {
        &self.shift
    }

    pub fn cpm_console_enabled(&self) -> bool {
        self.console.is_some()
    }

    /// Everything the program printed through BDOS so far. Empty when the
    /// console trap is disabled.
    pub fn console_output(&self) -> &[u8] {
        self.console.as_deref().unwrap_or_default()
    }

    fn port_in(&self, port: u8, pc: u16) -> Result<u8, Unsupported> {
        match port {
            0 => Ok(IN0_CONSTANT),
            1 | 2 => Ok(self.ports[port as usize]),
            3 => Ok(self.shift.read()),
            _ => Err(Unsupported::InPort { port, pc }),
        }
    }

    fn port_out(&mut self, port: u8, value: u8, pc: u16) -> Result<(), Unsupported> {
        match port {
            2 => self.shift.set_offset(value),
            4 => self.shift.shift_in(value),
            // Sound latches and the watchdog: accepted, not modelled.
            3 | 5 | 6 => {}
            _ => return Err(Unsupported::OutPort { port, pc }),
        }
        self.ports[port as usize] = value;
        Ok(())
    }

    /// Emulate the BDOS call the program is making. The CALL itself is
    /// skipped; control never reaches 0x0005.
    fn bdos(console: &mut Vec<u8>, cpu: &mut Cpu) {
        match cpu.regs.get(Reg::C) {
            BDOS_PRINT_STRING => {
                let mut addr = cpu.regs.de.get();
                // Bounded by the address space in case the terminator is missing.
                for _ in 0..crate::memory::MEMORY_SIZE {
                    let byte = cpu.memory.read(addr);
                    if byte == BDOS_STRING_END {
                        break;
                    }
                    console.push(byte);
                    addr = addr.wrapping_add(1);
                }
            }
            BDOS_PRINT_CHAR => console.push(cpu.regs.get(Reg::E)),
            other => log::debug!("ignoring BDOS function {other:#04x}"),
        }
        cpu.regs.pc = cpu.regs.pc.wrapping_add(3);
    }
}

impl IoHook for Peripherals {
    fn intercept(
        &mut self,
        cpu: &mut Cpu,
        opcode: u8,
        hi: u8,
        lo: u8,
    ) -> Result<bool, Unsupported> {
        let pc = cpu.regs.pc;
        match opcode {
            OP_CALL => match self.console.as_mut() {
                Some(console) if u16::from_be_bytes([hi, lo]) == BDOS_ENTRY => {
                    Self::bdos(console, cpu);
                    Ok(true)
                }
                _ => Ok(false),
            },
            OP_IN => {
                cpu.regs.a = self.port_in(lo, pc)?;
                cpu.regs.pc = pc.wrapping_add(2);
                Ok(true)
            }
            OP_OUT => {
                self.port_out(lo, cpu.regs.a, pc)?;
                cpu.regs.pc = pc.wrapping_add(2);
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}
