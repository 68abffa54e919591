//! Lume CLI: compile a source file to its bytecode listing.

use clap::Parser;
use lume_compiler::{compile, lexer, parser, CompileError, OptLevel};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "lume")]
#[command(about = "Compile a Lua-subset source file to a bytecode listing")]
struct Cli {
    /// Source file to compile
    input: PathBuf,

    /// Optimization level (0, 1, or 2)
    #[arg(short = 'O', long = "opt-level", default_value_t = 1)]
    opt_level: u8,

    /// Write the listing here instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Dump the token stream and exit
    #[arg(long)]
    tokens: bool,

    /// Dump the parsed syntax tree and exit
    #[arg(long)]
    ast: bool,

    /// Print phase progress to stderr
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

fn stage_err(input: &Path, e: CompileError) -> String {
    format!("{}: [{}] {e}", input.display(), e.stage())
}

fn run(cli: Cli) -> Result<(), String> {
    let level = OptLevel::from_u8(cli.opt_level)
        .ok_or_else(|| format!("invalid optimization level {} (expected 0-2)", cli.opt_level))?;

    let source = std::fs::read_to_string(&cli.input)
        .map_err(|e| format!("cannot read {}: {e}", cli.input.display()))?;

    // Debug dumps stop the pipeline after the requested stage.
    if cli.tokens || cli.ast {
        let tokens = lexer::tokenize(&source).map_err(|e| stage_err(&cli.input, e.into()))?;
        if cli.tokens {
            for token in &tokens {
                println!("{}:{}: {:?} {token}", token.line, token.column, token.kind);
            }
            return Ok(());
        }
        let program = parser::parse(tokens).map_err(|e| stage_err(&cli.input, e.into()))?;
        println!("{program:#?}");
        return Ok(());
    }

    if cli.verbose {
        eprintln!(
            "compiling {} at -O{}",
            cli.input.display(),
            level.as_u8()
        );
    }

    let listing = compile(&source, level).map_err(|e| stage_err(&cli.input, e))?;

    match &cli.output {
        Some(path) => {
            std::fs::write(path, listing)
                .map_err(|e| format!("cannot write {}: {e}", path.display()))?;
            if cli.verbose {
                eprintln!("wrote {}", path.display());
            }
        }
        None => print!("{listing}"),
    }
    Ok(())
}
