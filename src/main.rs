use anyhow::{bail, Context};
use clap::Parser;
use itertools::Itertools;
use log::{info, warn};
use marlin::debugger::{AssemblerError, DebugSession, ExecutionMode, ExecutionProfile, ExecutionReport};
use marlin::engine::transport::{ChildTransport, TcpTransport, Transport};
use marlin::engine::{Engine, RemoteEngine};
use std::path::PathBuf;
use std::thread;
use std::time::Duration;

const ELF_MAGIC: &[u8; 4] = b"\x7fELF";

/// Delay before asking a still-running engine to pause and report.
const RUNNING_POLL: Duration = Duration::from_millis(50);

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Assembly source or ELF image to debug.
    program: PathBuf,

    /// Connect to an engine already listening at this address.
    #[arg(long, value_name = "ADDR", conflicts_with = "engine")]
    connect: Option<String>,

    /// Spawn the engine backend from this executable.
    #[arg(long, value_name = "PATH", env = "MARLIN_ENGINE")]
    engine: Option<PathBuf>,

    /// Break on this source line (repeatable).
    #[arg(long = "break", value_name = "LINE")]
    breakpoints: Vec<u32>,

    /// Single-step this many instructions instead of running.
    #[arg(long, value_name = "N")]
    steps: Option<u32>,

    /// Dump memory once execution stops, format ADDR:COUNT (ADDR in hex).
    #[arg(long, value_name = "ADDR:COUNT")]
    dump: Option<String>,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let transport: Box<dyn Transport> = match (&args.connect, &args.engine) {
        (Some(addr), _) => Box::new(
            TcpTransport::connect(addr.as_str()).with_context(|| format!("connect {addr}"))?,
        ),
        (None, Some(path)) => Box::new(
            ChildTransport::spawn(path, &[])
                .with_context(|| format!("spawn engine {}", path.display()))?,
        ),
        (None, None) => bail!("either --connect or --engine is required"),
    };
    let engine = RemoteEngine::new(transport);

    let bytes = std::fs::read(&args.program)
        .with_context(|| format!("read {}", args.program.display()))?;
    let named = args
        .program
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("unnamed")
        .to_string();

    let (text, profile) = if bytes.starts_with(ELF_MAGIC) {
        let listing = engine.disassemble(&named, &bytes)?;
        if let Some(error) = &listing.error {
            warn!(target: "marlin", "disassembly of {named} reported: {error}");
        }
        let (lines, profile) = ExecutionProfile::from_disassembly(bytes, listing);
        (lines.join("\n"), profile)
    } else {
        let text = String::from_utf8(bytes).context("assembly source is not valid UTF-8")?;
        (text, ExecutionProfile::Assembly)
    };

    let session = DebugSession::new(engine, text, profile);

    let exit_code = match args.steps {
        Some(steps) => run_steps(&session, steps)?,
        None => run_to_completion(&session, &args.breakpoints)?,
    };

    if let Some(spec) = &args.dump {
        dump_memory(&session, spec)?;
    }

    session.stop()?;

    if exit_code != 0 {
        std::process::exit(exit_code);
    }
    Ok(())
}

fn run_to_completion<E: Engine>(
    session: &DebugSession<E>,
    breakpoints: &[u32],
) -> anyhow::Result<i32> {
    let mut report = session.resume(breakpoints)?;

    loop {
        match report.mode {
            ExecutionMode::Breakpoint => {
                print_stop(session, &report);
                report = session.resume(breakpoints)?;
            }
            ExecutionMode::Paused => {
                report = session.resume(breakpoints)?;
            }
            ExecutionMode::Running => {
                // Engine answered without stopping; give it a moment and
                // ask again.
                thread::sleep(RUNNING_POLL);
                report = session.pause()?;
            }
            ExecutionMode::Finished(code) => {
                info!(target: "marlin", "program finished with code {code}");
                return Ok(code);
            }
            ExecutionMode::Invalid(ref message) => {
                bail!("program fault: {message}");
            }
            ExecutionMode::BuildFailed(ref err) => {
                bail!("{}", render_build_failure(err));
            }
        }
    }
}

fn run_steps<E: Engine>(session: &DebugSession<E>, steps: u32) -> anyhow::Result<i32> {
    if let Some(err) = session.configure()? {
        bail!("{}", render_build_failure(&err));
    }

    for _ in 0..steps {
        let report = session.step()?;
        match session.line_for_pc(report.registers.pc) {
            Some(line) => println!("{} pc={:#010x} line={line}", report.mode, report.registers.pc),
            None => println!("{} pc={:#010x}", report.mode, report.registers.pc),
        }

        match report.mode {
            ExecutionMode::Finished(code) => return Ok(code),
            ExecutionMode::Invalid(message) => bail!("program fault: {message}"),
            _ => {}
        }
    }

    Ok(0)
}

fn print_stop<E: Engine>(session: &DebugSession<E>, report: &ExecutionReport) {
    let pc = report.registers.pc;
    match session.line_for_pc(pc) {
        Some(line) => println!("breakpoint at {pc:#010x} (line {line})"),
        None => println!("breakpoint at {pc:#010x}"),
    }
    println!(
        "  lo = {:#010x}  hi = {:#010x}",
        report.registers.lo, report.registers.hi
    );
}

fn render_build_failure(err: &AssemblerError) -> String {
    let mut out = format!("build failed: {}", err.message);
    if let Some(marker) = &err.marker {
        out.push_str(&format!(" (line {}, offset {})", marker.line, marker.offset));
    }
    if let Some(body) = &err.body {
        out.push_str(&format!("\n  {body}"));
    }
    out
}

fn dump_memory<E: Engine>(session: &DebugSession<E>, spec: &str) -> anyhow::Result<()> {
    let (address, count) = parse_dump_spec(spec)?;

    let Some(bytes) = session.memory_at(address, count)? else {
        bail!("memory read at {address:#010x} rejected by the engine");
    };

    for (row, chunk) in bytes.iter().chunks(16).into_iter().enumerate() {
        let rendered = chunk
            .map(|byte| match byte {
                Some(byte) => format!("{byte:02x}"),
                None => "--".to_string(),
            })
            .join(" ");
        println!("{:#010x}: {rendered}", address as u64 + row as u64 * 16);
    }

    Ok(())
}

fn parse_dump_spec(spec: &str) -> anyhow::Result<(u32, u32)> {
    let (address, count) = spec
        .split_once(':')
        .context("dump spec must be ADDR:COUNT")?;
    let address = u32::from_str_radix(address.trim_start_matches("0x"), 16)
        .with_context(|| format!("bad dump address `{address}`"))?;
    let count = count
        .parse()
        .with_context(|| format!("bad dump count `{count}`"))?;
    Ok((address, count))
}
