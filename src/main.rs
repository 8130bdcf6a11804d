use babyduck::compile;
use clap::Parser;
use std::io::Read;
use std::process::ExitCode;

/// Compile and run a BabyDuck program.
#[derive(Parser, Debug)]
#[command(name = "babyduckc", version, about)]
struct Cli {
    /// Source file to compile; omit to read from standard input until a
    /// blank line or EOF.
    input: Option<std::path::PathBuf>,

    /// Print the emitted quadruple vector instead of running it.
    #[arg(long)]
    dump_quads: bool,

    /// Enable verbose diagnostic logging.
    #[arg(short, long)]
    verbose: bool,
}

fn read_source(cli: &Cli) -> std::io::Result<String> {
    match &cli.input {
        Some(path) => std::fs::read_to_string(path),
        None => {
            let mut buf = String::new();
            for line in std::io::stdin().lines() {
                let line = line?;
                if line.trim().is_empty() {
                    break;
                }
                buf.push_str(&line);
                buf.push('\n');
            }
            Ok(buf)
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let level = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let source = match read_source(&cli) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error: {e}");
            return ExitCode::FAILURE;
        }
    };

    let compiled = match compile(&source) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {e}");
            return ExitCode::FAILURE;
        }
    };

    if cli.dump_quads {
        for (i, quad) in compiled.quads.iter().enumerate() {
            println!("{i:>4}: {quad}");
        }
        return ExitCode::SUCCESS;
    }

    let mut vm = babyduck::vm::Vm::new(&compiled);
    match vm.run() {
        Ok(output) => {
            print!("{output}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
