//! Intcode - command-line interface for running Intcode programs

use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use intcode_core::prelude::*;
use intcode_core::Registers;
use intcode_orchestration::{NatMonitor, Network, Pipeline, Topology};
use serde::Serialize;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "intcode")]
#[command(author = "SIL Contributors")]
#[command(version = "2026.10.16")]
#[command(about = "Intcode - run, compose and inspect Intcode programs", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a program to completion
    Run {
        /// Program file (comma-separated integers)
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Input values, in order (e.g. -i 1,2,3)
        #[arg(short, long, value_delimiter = ',', allow_hyphen_values = true)]
        input: Vec<i64>,

        /// Patch memory before running (repeatable)
        #[arg(long, value_name = "ADDR=VAL")]
        poke: Vec<String>,

        /// Memory size in cells
        #[arg(short, long)]
        memory: Option<usize>,

        /// Print outputs as ASCII text when possible
        #[arg(long)]
        ascii: bool,

        /// Print a JSON run report
        #[arg(long)]
        json: bool,
    },

    /// Run copies of a program wired in a chain or a ring
    Pipeline {
        /// Program file (comma-separated integers)
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// One phase setting per instance (e.g. --phases 9,8,7,6,5)
        #[arg(long, value_delimiter = ',', required = true, allow_hyphen_values = true)]
        phases: Vec<i64>,

        /// Chain instead of ring
        #[arg(long)]
        chain: bool,

        /// Initial signal sent to the first instance
        #[arg(long, default_value_t = 0, allow_hyphen_values = true)]
        seed: i64,
    },

    /// Run a packet network with a NAT monitor
    Network {
        /// NIC program file
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Number of NICs
        #[arg(long, default_value_t = 50)]
        size: usize,

        /// Give up after this many seconds
        #[arg(long, default_value_t = 30)]
        timeout: u64,
    },

    /// Print a disassembly listing
    Disasm {
        /// Program file (comma-separated integers)
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },
}

/// Filtro padrão quando `RUST_LOG` não está definido
const DEFAULT_FILTER: &str = "intcode=info,intcode_core=info,intcode_orchestration=info";

/// Relatório de execução
#[derive(Debug, Serialize)]
struct RunReport {
    status: MachineStatus,
    steps: u64,
    registers: Registers,
    first_cell: i64,
    outputs: Vec<i64>,
    elapsed_ms: u128,
}

fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| DEFAULT_FILTER.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Run {
            file,
            input,
            poke,
            memory,
            ascii,
            json,
        } => run_command(&file, input, &poke, memory, ascii, json),
        Commands::Pipeline {
            file,
            phases,
            chain,
            seed,
        } => pipeline_command(&file, &phases, chain, seed),
        Commands::Network {
            file,
            size,
            timeout,
        } => network_command(&file, size, timeout),
        Commands::Disasm { file } => disasm_command(&file),
    };

    if let Err(e) = result {
        eprintln!("{} {:#}", "error:".red().bold(), e);
        std::process::exit(1);
    }
}

fn load_program(path: &Path) -> Result<Program> {
    let program = Program::from_file(path)
        .with_context(|| format!("failed to load program {}", path.display()))?;
    tracing::info!(path = %path.display(), cells = program.len(), "program loaded");
    Ok(program)
}

fn parse_poke(arg: &str) -> Result<(i64, i64)> {
    let Some((addr, value)) = arg.split_once('=') else {
        bail!("invalid poke {:?}, expected ADDR=VAL", arg);
    };
    let addr = addr
        .trim()
        .parse::<i64>()
        .with_context(|| format!("invalid address in poke {:?}", arg))?;
    let value = value
        .trim()
        .parse::<i64>()
        .with_context(|| format!("invalid value in poke {:?}", arg))?;
    Ok((addr, value))
}

/// Texto ASCII, se todos os valores forem imprimíveis
fn render_ascii(outputs: &[i64]) -> Option<String> {
    outputs
        .iter()
        .map(|&v| u8::try_from(v).ok().filter(u8::is_ascii).map(char::from))
        .collect()
}

fn execute_run(
    program: &Program,
    inputs: Vec<i64>,
    pokes: &[String],
    memory: Option<usize>,
) -> Result<RunReport> {
    let mut config = MachineConfig::from_env();
    if let Some(size) = memory {
        config = config.with_memory_size(size);
    }

    let mut machine = Machine::with_program(program, config)?;
    for arg in pokes {
        let (addr, value) = parse_poke(arg)?;
        machine
            .poke(addr, value)
            .with_context(|| format!("poke {}", arg))?;
    }

    let mut queue = VecDeque::from(inputs);
    let mut outputs = Vec::new();
    let start = Instant::now();
    match machine.run(&mut queue, &mut outputs) {
        Ok(summary) => tracing::debug!(?summary, "run finished"),
        Err(err) => tracing::debug!(error = %err, "run faulted"),
    }

    Ok(RunReport {
        status: machine.status().clone(),
        steps: machine.steps(),
        registers: machine.registers(),
        first_cell: machine.peek(0)?,
        outputs,
        elapsed_ms: start.elapsed().as_millis(),
    })
}

fn run_command(
    file: &Path,
    inputs: Vec<i64>,
    pokes: &[String],
    memory: Option<usize>,
    ascii: bool,
    json: bool,
) -> Result<()> {
    let program = load_program(file)?;
    let report = execute_run(&program, inputs, pokes, memory)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        match render_ascii(&report.outputs).filter(|_| ascii) {
            Some(text) => print!("{}", text),
            None => {
                for value in &report.outputs {
                    println!("{}", value);
                }
            }
        }
        println!(
            "{} {} steps, mem[0] = {} ({} ms)",
            "    Finished".green().bold(),
            report.steps,
            report.first_cell.to_string().cyan(),
            report.elapsed_ms
        );
    }

    if let Some(fault) = report.status.fault() {
        bail!("machine faulted at ip {}: {}", report.registers.ip, fault);
    }
    Ok(())
}

fn pipeline_command(file: &Path, phases: &[i64], chain: bool, seed: i64) -> Result<()> {
    let program = load_program(file)?;
    let topology = if chain { Topology::Chain } else { Topology::Ring };

    let signal = Pipeline::run_phases(program, phases, topology, seed)?;
    println!(
        "{} {:?} of {} -> {}",
        "    Pipeline".green().bold(),
        topology,
        phases.len(),
        signal.to_string().cyan()
    );
    Ok(())
}

fn network_command(file: &Path, size: usize, timeout: u64) -> Result<()> {
    let program = load_program(file)?;
    let network = Network::new(&program, size)?;

    let mut nat = NatMonitor::new();
    let repeated = nat.run(&network, Duration::from_secs(timeout));
    network.shutdown()?;
    let repeated = repeated?;

    if let Some(first) = nat.first() {
        println!("{} y = {}", "   First NAT".green().bold(), first.y.to_string().cyan());
    }
    println!("{} y = {}", "    Repeated".green().bold(), repeated.to_string().cyan());
    Ok(())
}

fn disasm_command(file: &Path) -> Result<()> {
    let program = load_program(file)?;
    for line in disassemble(&program)? {
        println!("{}", line);
    }
    Ok(())
}

/// Listagem linear: células que não decodificam viram `data`
fn disassemble(program: &Program) -> Result<Vec<String>> {
    let config = MachineConfig::default().with_memory_size(program.len().max(1));
    let machine = Machine::with_program(program, config)?;

    let mut lines = Vec::new();
    let mut ip = 0;
    while ip < program.len() {
        match machine.decode_at(ip) {
            Ok(decoded) => {
                lines.push(format!("{:>6}: {}", ip, decoded));
                ip = decoded.next_ip();
            }
            Err(_) => {
                lines.push(format!("{:>6}: data {}", ip, program.cells()[ip]));
                ip += 1;
            }
        }
    }
    Ok(lines)
}
