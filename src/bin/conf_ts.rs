//! Command-line compiler for conf-ts configurations
//!
//! Compiles the default export of a TypeScript entry file to JSON or YAML
//! and prints it to stdout.

use clap::Parser;
use conf_ts::{CompileOptions, OutputFormat, compile};
use std::path::PathBuf;
use std::process;

#[derive(Parser, Debug)]
#[command(name = "conf-ts")]
#[command(about = "Compile a TypeScript configuration file to JSON or YAML")]
#[command(version)]
struct Cli {
    /// Entry file whose default export is compiled
    file: PathBuf,

    /// Output format (json or yaml)
    #[arg(short, long, default_value = "json")]
    format: String,

    /// Enable macros imported from @conf-ts/macro
    #[arg(short, long = "macro")]
    macro_enabled: bool,

    /// Keep object keys in evaluation order
    #[arg(short, long = "preserve-order")]
    preserve_order: bool,

    /// Print debug logs to stderr
    #[arg(short, long)]
    verbose: bool,

    /// Print the files the output depends on to stderr
    #[arg(long)]
    deps: bool,
}

fn main() {
    human_panic::setup_panic!();

    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(err) = run(&cli) {
        eprintln!("Error: {err:#}");
        process::exit(1);
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp(None)
        .init();
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    let format: OutputFormat = cli.format.parse()?;
    let options = CompileOptions::new()
        .with_macros(cli.macro_enabled)
        .with_preserved_key_order(cli.preserve_order)
        .with_env(std::env::vars());

    let result = compile(&cli.file, format, &options)?;

    println!("{}", result.output);
    if cli.deps {
        for file in &result.dependencies {
            eprintln!("{file}");
        }
    }
    Ok(())
}
