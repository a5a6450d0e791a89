use typed_builder::TypedBuilder;

use crate::cpu::{Cpu, Status};
use crate::error::LoadError;
use crate::hooks::{Peripherals, PORT_COUNT};
use crate::interrupts::InterruptController;

/// Start of video RAM.
///
/// The arcade board maps the 1-bit frame buffer at 0x2400–0x3fff.
pub const VRAM_START: u16 = 0x2400;
/// Size of video RAM in bytes (0x1c00 = 7168 bytes = 224x256 bits).
pub const VRAM_SIZE: usize = 0x1c00;

/// Initial stack pointer, just below video RAM.
pub const DEFAULT_STACK_POINTER: u16 = 0x23ff;
/// Instructions run between the two interrupts of a frame.
pub const DEFAULT_STEPS_PER_FRAME: u32 = 1500;

/// How to set up a [`Machine`].
///
/// ```
/// use retro8080_core::MachineConfig;
///
/// let config = MachineConfig::builder()
///     .base_address(0x0100)
///     .cpm_console(true)
///     .build();
/// assert_eq!(config.stack_pointer, 0x23ff);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, TypedBuilder)]
pub struct MachineConfig {
    /// Where the ROM is loaded and where execution starts.
    #[builder(default = 0x0000)]
    pub base_address: u16,
    #[builder(default = DEFAULT_STACK_POINTER)]
    pub stack_pointer: u16,
    /// Trap `CALL 0005` as a CP/M BDOS console call.
    #[builder(default = false)]
    pub cpm_console: bool,
    #[builder(default = DEFAULT_STEPS_PER_FRAME)]
    pub steps_per_frame: u32,
}

impl Default for MachineConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// A complete 8080 system: CPU, peripherals and the raster interrupt source.
pub struct Machine {
    cpu: Cpu,
    io: Peripherals,
    interrupts: InterruptController,
    config: MachineConfig,
}

impl Machine {
    /// Construct a machine in a powered-up but reset state.
    pub fn new(config: MachineConfig) -> Self {
        let io = if config.cpm_console {
            Peripherals::with_cpm_console()
        } else {
            Peripherals::new()
        };
        Self {
            cpu: Cpu::new(config.base_address, config.stack_pointer),
            io,
            interrupts: InterruptController::new(),
            config,
        }
    }

    pub fn config(&self) -> &MachineConfig {
        &self.config
    }

    /// Load a program image at the configured base address.
    pub fn load_rom(&mut self, rom: &[u8]) -> Result<(), LoadError> {
        self.cpu.memory.load(self.config.base_address, rom)?;
        log::info!(
            "loaded {} bytes at {:#06x}",
            rom.len(),
            self.config.base_address
        );
        Ok(())
    }

    /// Reset the CPU and peripherals, preserving memory contents.
    pub fn reset(&mut self) {
        self.cpu.reset(self.config.base_address, self.config.stack_pointer);
        self.io = if self.config.cpm_console {
            Peripherals::with_cpm_console()
        } else {
            Peripherals::new()
        };
        self.interrupts = InterruptController::new();
    }

    /// Execute a single instruction.
    pub fn step(&mut self) -> Status {
        self.cpu.step(&mut self.io)
    }

    /// Raise the next raster interrupt. Returns the vector taken, if any.
    pub fn interrupt(&mut self) -> Option<u16> {
        self.interrupts.interrupt(&mut self.cpu)
    }

    /// Run one video frame.
    ///
    /// The frame starts and ends with a raster interrupt and runs up to
    /// `steps_per_frame` instructions in between, stopping early once the
    /// status goes terminal.
    pub fn run_frame(&mut self) -> Status {
        if self.cpu.status().is_terminal() {
            return self.cpu.status();
        }

        self.interrupt();
        for _ in 0..self.config.steps_per_frame {
            if self.step().is_terminal() {
                return self.cpu.status();
            }
        }
        self.interrupt();
        self.cpu.status()
    }

    /// Raw video RAM window for a renderer.
    pub fn video_ram(&self) -> &[u8] {
        self.cpu.memory.slice(VRAM_START, VRAM_SIZE)
    }

    /// Set the live value of a port.
    ///
    /// # Panics
    ///
    /// Panics if `port >= PORT_COUNT`.
    pub fn set_input(&mut self, port: usize, value: u8) {
        self.io.set_input(port, value);
    }

    /// The port array. Ports 3 and 5 hold the sound board latches.
    pub fn ports(&self) -> &[u8; PORT_COUNT] {
        self.io.ports()
    }

    pub fn status(&self) -> Status {
        self.cpu.status()
    }

    pub fn console_output(&self) -> &[u8] {
        self.io.console_output()
    }

    pub fn instructions_executed(&self) -> u64 {
        self.cpu.instructions_executed()
    }

    pub fn cpu(&self) -> &Cpu {
        &self.cpu
    }

    pub fn cpu_mut(&mut self) -> &mut Cpu {
        &mut self.cpu
    }

    pub fn peripherals(&self) -> &Peripherals {
        &self.io
    }
}

impl Default for Machine {
    fn default() -> Self {
        Self::new(MachineConfig::default())
    }
}
