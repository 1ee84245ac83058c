use clap::{Parser, Subcommand};
use colored::*;
use kenbak_core::asm;
use kenbak_core::state::State;
use kenbak_core::Machine;
use std::fs;
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about, long_about = None, disable_help_subcommand = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load a memory image and run the state machine until halted
    Run(RunArgs),
    /// Parse the constant-declaration section of an assembly source file
    Asm(AsmArgs),
}

#[derive(Parser)]
struct RunArgs {
    /// Path to a raw 256-byte memory image
    image: PathBuf,
    /// Power on with randomized memory instead of the loaded image filling the rest
    #[arg(long)]
    randomize: bool,
    /// Maximum number of steps to run before giving up
    #[arg(long, default_value_t = 1_000_000)]
    max_steps: u64,
}

#[derive(Parser)]
struct AsmArgs {
    /// Path to an assembly source file
    source: PathBuf,
}

fn main() -> Result<(), String> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run(args) => run(args),
        Commands::Asm(args) => run_asm(args),
    }
}

fn run(args: RunArgs) -> Result<(), String> {
    let image = fs::read(&args.image).map_err(|e| e.to_string())?;

    let mut machine = Machine::create(args.randomize);
    machine.mem.load_image(&image);
    machine.input.switch_power_on = true;

    // Press GO to leave the idle cycle, then release it: the machine stays
    // in QB for as long as GO is held and only starts running once it's
    // let go (PRM page 37).
    machine.input.but_run_start = true;
    machine.step();
    machine.input.but_run_start = false;

    for _ in 0..args.max_steps {
        machine.step();
        if machine.state == State::Qc {
            break;
        }
    }

    println!("{}", "Final data lamps:".cyan());
    println!("{:?}", machine.output.led_bits);
    Ok(())
}

fn run_asm(args: AsmArgs) -> Result<(), String> {
    let source = fs::read_to_string(&args.source).map_err(|e| e.to_string())?;

    match asm::parse_constants(&source) {
        Ok(table) => {
            for constant in &table.constants {
                println!("{} = {:#05o}", constant.name, constant.value);
            }
            // Matches the scope of the reference assembler: constant
            // declarations parse cleanly, but full assembly (labels,
            // opcode emission) is not implemented.
            eprintln!(
                "{}",
                "Only constant declarations are supported; stopping here.".bright_red()
            );
            Err("assembly not implemented past constant declarations".into())
        }
        Err(err) => {
            eprint!("{}", err.nice_message(&source));
            Err(err.message())
        }
    }
}
