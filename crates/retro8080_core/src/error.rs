use thiserror::Error;

/// Failure to copy a program image into the 64 KiB address space.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoadError {
    #[error("image of {len} bytes at {base:#06x} overruns the 64 KiB address space")]
    OutOfRange { base: u16, len: usize },
}

/// An instruction or port access the emulator has no model for.
///
/// Hitting one of these ends the run: the CPU status becomes terminal and
/// further calls to `step` are ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Unsupported {
    #[error("unsupported opcode {opcode:#04x} at {pc:#06x}")]
    Opcode { opcode: u8, pc: u16 },
    #[error("IN from unmapped port {port} at {pc:#06x}")]
    InPort { port: u8, pc: u16 },
    #[error("OUT to unmapped port {port} at {pc:#06x}")]
    OutPort { port: u8, pc: u16 },
}
