//! Intel 8080 emulator core.
//!
//! The [`cpu`] module is a generic 8080: registers, flags and an opcode
//! dispatcher over a flat 64 KiB [`memory::Memory`]. Anything machine
//! specific (arcade I/O ports, the CP/M console trap) plugs in through
//! [`cpu::IoHook`], and [`machine::Machine`] ties the pieces together with
//! the raster interrupt source into a frame-driven system.

pub mod cpu;
pub mod disasm;
pub mod error;
pub mod hooks;
pub mod interrupts;
pub mod machine;
pub mod memory;

pub use cpu::{Cpu, Flags, IoHook, Status};
pub use disasm::{disassemble, Disassembly};
pub use error::{LoadError, Unsupported};
pub use hooks::Peripherals;
pub use interrupts::InterruptController;
pub use machine::{Machine, MachineConfig};
pub use memory::Memory;

/// Logical screen width in pixels (the arcade monitor is rotated).
pub const SCREEN_WIDTH: usize = 224;
/// Logical screen height in pixels.
pub const SCREEN_HEIGHT: usize = 256;
