use std::path::PathBuf;

use anyhow::{Context, Result};
use retro8080::CpuConfig;
use retro8080_headless::{HeadlessRunner, RunnerConfig};

const USAGE: &str =
    "Usage: retro8080_headless <rom_path> [frames] [--disasm] [--undocumented] [--in PORT=VALUE]...";

struct Args {
    rom_path: PathBuf,
    frames: u32,
    disasm: bool,
    undocumented: bool,
    inputs: Vec<(u8, u8)>,
}

fn usage_error(message: &str) -> ! {
    eprintln!("{message}");
    eprintln!("{USAGE}");
    std::process::exit(2);
}

/// Decimal, or hex with a `0x` prefix.
fn parse_u8(text: &str) -> Option<u8> {
    match text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        Some(hex) => u8::from_str_radix(hex, 16).ok(),
        None => text.parse().ok(),
    }
}

fn parse_args() -> Args {
    let mut rom_path = None;
    let mut frames = None;
    let mut disasm = false;
    let mut undocumented = false;
    let mut inputs = Vec::new();

    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--disasm" => disasm = true,
            "--undocumented" => undocumented = true,
            "--in" => {
                let pair = args
                    .next()
                    .unwrap_or_else(|| usage_error("--in needs PORT=VALUE"));
                let parsed = pair
                    .split_once('=')
                    .and_then(|(port, value)| Some((parse_u8(port)?, parse_u8(value)?)));
                match parsed {
                    Some(input) => inputs.push(input),
                    None => usage_error(&format!("Invalid input '{pair}'; expected PORT=VALUE.")),
                }
            }
            "-h" | "--help" => {
                println!("{USAGE}");
                std::process::exit(0);
            }
            flag if flag.starts_with("--") => usage_error(&format!("Unknown option '{flag}'.")),
            value if rom_path.is_none() => rom_path = Some(PathBuf::from(value)),
            value if frames.is_none() => {
                frames = Some(value.parse().unwrap_or_else(|_| {
                    usage_error("Invalid frames; expected a non-negative integer.")
                }));
            }
            extra => usage_error(&format!("Unexpected argument '{extra}'.")),
        }
    }

    Args {
        rom_path: rom_path.unwrap_or_else(|| usage_error("Missing ROM path.")),
        frames: frames.unwrap_or(60),
        disasm,
        undocumented,
        inputs,
    }
}

fn run(args: Args) -> Result<()> {
    let rom = std::fs::read(&args.rom_path)
        .with_context(|| format!("failed to read ROM '{}'", args.rom_path.display()))?;
    log::info!("loaded '{}' ({} bytes)", args.rom_path.display(), rom.len());

    let config = RunnerConfig::builder()
        .frames(args.frames)
        .inputs(args.inputs)
        .cpu(
            CpuConfig::builder()
                .undocumented_opcodes(args.undocumented)
                .build(),
        )
        .build();
    let mut runner = HeadlessRunner::new(config, &rom)?;

    if args.disasm {
        for line in runner.cpu().enumerate_instructions() {
            println!("{line}");
        }
    }

    let summary = runner.run()?;
    println!("{summary}");
    Ok(())
}

fn main() {
    env_logger::init();

    if let Err(err) = run(parse_args()) {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
