//! `avl-trace` — print the AVL snapshot trace of a script of operations.
//!
//! Usage:
//!   avl-trace [--format json|text] [--final-only] [OPS]...
//!
//! Each op is `K` / `ins:K` (insert), `del:K` (delete) or `clear`. When no
//! ops are given the script is read from stdin. Logging goes to stderr and is
//! controlled by `RUST_LOG`.

use std::io::{self, Write};

use avl_trace_cli::{parse_script, read_script, run, CliError, Format};
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "avl-trace")]
#[command(about = "Replay AVL insertions and deletions step by step", long_about = None)]
struct Args {
    /// Operations: `K` or `ins:K` inserts, `del:K` deletes, `clear` resets
    #[arg(allow_negative_numbers = true)]
    ops: Vec<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = Format::Json)]
    format: Format,

    /// Print only the final tree
    #[arg(long)]
    final_only: bool,
}

fn main() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("avl_trace=warn")))
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let args = Args::parse();
    if let Err(e) = execute(&args) {
        tracing::error!(error = %e, "avl-trace failed");
        eprintln!("{e}");
        std::process::exit(1);
    }
}

fn execute(args: &Args) -> Result<(), CliError> {
    let commands = if args.ops.is_empty() {
        read_script(io::stdin().lock())?
    } else {
        parse_script(&args.ops)?
    };

    let out = run(&commands, args.format, args.final_only)?;
    let mut stdout = io::stdout().lock();
    stdout.write_all(out.as_bytes())?;
    stdout.write_all(b"\n")?;
    Ok(())
}
