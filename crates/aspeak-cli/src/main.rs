//! The `aspeak` binary: parse agent programs and drive them to
//! quiescence, or check and pretty-print them.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};

use aspeak_core::Agent;
use aspeak_parser::parse_program;
use aspeak_runtime::{Environment, System};

/// Initialize the tracing subscriber based on the --trace flag.
/// Without the flag no subscriber is registered (zero overhead).
fn initialize_tracing(level: &Option<String>) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = match level {
        Some(level) => {
            let filter = format!("aspeak_core={level},aspeak_parser={level},aspeak_runtime={level}");
            EnvFilter::try_new(&filter).unwrap_or_else(|_| EnvFilter::new("aspeak=info"))
        }
        None => return,
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
        .init();
}

#[derive(Parser)]
#[command(name = "aspeak")]
#[command(about = "An AgentSpeak-style BDI agent interpreter", long_about = None)]
struct Cli {
    /// Enable runtime tracing (levels: trace, debug, info, warn, error)
    #[arg(long, global = true)]
    trace: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse agent programs and run them round-robin until no agent has
    /// work left
    Run {
        /// Agent source files (.asl); each file becomes one agent named
        /// after its stem
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Number of copies of each agent to run
        #[arg(long, default_value_t = 1)]
        copies: usize,
    },
    /// Parse a program and print it back in canonical form
    Check {
        /// Agent source file (.asl)
        file: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    initialize_tracing(&cli.trace);

    match cli.command {
        Commands::Run { files, copies } => run_command(&files, copies),
        Commands::Check { file } => check_command(&file),
    }
}

fn agent_name(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "agent".to_string())
}

fn run_command(files: &[PathBuf], copies: usize) -> Result<()> {
    if copies == 0 {
        bail!("--copies must be at least 1");
    }

    let mut system = System::new(Environment::new());

    for path in files {
        let source = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let program = parse_program(&source)
            .with_context(|| format!("failed to parse {}", path.display()))?;

        let name = agent_name(path);
        if copies == 1 {
            system.add_agent(Agent::from_program(name, program));
        } else {
            for index in 0..copies {
                system.add_agent(Agent::from_program(
                    format!("{name}{index}"),
                    program.clone(),
                ));
            }
        }
    }

    system.run().context("runtime error")?;
    Ok(())
}

fn check_command(file: &Path) -> Result<()> {
    let source = std::fs::read_to_string(file)
        .with_context(|| format!("failed to read {}", file.display()))?;
    let program = parse_program(&source)
        .with_context(|| format!("failed to parse {}", file.display()))?;

    println!("// {}", file.display());
    print!("{program}");
    Ok(())
}
