use anyhow::{bail, Context, Result};
use retro8080_core::{Machine, MachineConfig, Status};

/// What a finished run looked like.
#[derive(Clone, Debug)]
pub struct RunSummary {
    pub status: Status,
    pub frames: u64,
    pub instructions: u64,
    /// Text printed through the CP/M console, if it was enabled.
    pub console: String,
}

/// Load `rom` and run frames until the program ends or `max_frames` is hit.
///
/// A jump to 0x0000 is a clean end of run. Hitting an instruction or port
/// the emulator does not model is reported as an error.
pub fn run(config: MachineConfig, rom: &[u8], max_frames: Option<u64>) -> Result<RunSummary> {
    let mut machine = Machine::new(config);
    machine
        .load_rom(rom)
        .with_context(|| format!("failed to load ROM at {:#06x}", config.base_address))?;

    log::info!(
        "starting at {:#06x} with sp {:#06x}{}",
        config.base_address,
        config.stack_pointer,
        if config.cpm_console { " (CP/M console)" } else { "" }
    );

    let mut frames = 0u64;
    let status = loop {
        if max_frames.is_some_and(|limit| frames >= limit) {
            log::info!("frame limit of {} reached", frames);
            break machine.status();
        }
        let status = machine.run_frame();
        frames += 1;
        if status.is_terminal() {
            break status;
        }
    };

    let summary = RunSummary {
        status,
        frames,
        instructions: machine.instructions_executed(),
        console: String::from_utf8_lossy(machine.console_output()).into_owned(),
    };

    if let Status::Unsupported(fault) = status {
        bail!(
            "{} after {} instructions in {} frames",
            fault,
            summary.instructions,
            summary.frames
        );
    }

    log::info!(
        "run ended ({:?}) after {} instructions in {} frames",
        status,
        summary.instructions,
        summary.frames
    );
    Ok(summary)
}
