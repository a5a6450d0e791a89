use anyhow::{bail, Context, Result};
use retro8080_core::MachineConfig;

const USAGE: &str = "usage: retro8080 <rom> <base_addr hex> <cpm 0|1> [max_frames]";

fn parse_hex(text: &str) -> Result<u16> {
    let digits = text
        .trim_start_matches("0x")
        .trim_start_matches("0X");
    u16::from_str_radix(digits, 16).with_context(|| format!("invalid base address '{}'", text))
}

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.len() < 3 || args.len() > 4 {
        bail!(USAGE);
    }

    let rom_path = &args[0];
    let base_address = parse_hex(&args[1])?;
    let cpm_console = match args[2].as_str() {
        "0" => false,
        "1" => true,
        other => bail!("invalid CP/M flag '{}', expected 0 or 1\n{}", other, USAGE),
    };
    let max_frames = args
        .get(3)
        .map(|n| n.parse::<u64>())
        .transpose()
        .context("invalid frame limit")?;

    log::info!("Playing ROM path: '{}'", rom_path);
    let rom = std::fs::read(rom_path).with_context(|| format!("failed to read {}", rom_path))?;

    let config = MachineConfig::builder()
        .base_address(base_address)
        .cpm_console(cpm_console)
        .build();
    let summary = retro8080::run(config, &rom, max_frames)?;

    if cpm_console {
        println!("{}", summary.console);
    }
    println!("instructions executed: {}", summary.instructions);
    Ok(())
}
