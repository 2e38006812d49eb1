mod cli;
mod commands;
mod completer;
mod config;
mod repl;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Commands};
use crate::config::CtConfig;

fn init_tracing(verbose: u8, config: &CtConfig) {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(&config.log_level)),
        1 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = CtConfig::load();
    init_tracing(cli.verbose, &config);

    let output = match cli.command {
        Commands::Eval {
            expr,
            bindings,
            no_condition,
        } => commands::eval::run(&expr, &bindings, no_condition, &config)?,
        Commands::Martingale {
            algorithm,
            min_k,
            max_k,
        } => commands::martingale::run(algorithm, min_k, max_k, &config)?,
        Commands::Limbs { algorithm, n } => commands::limbs::run(algorithm, n)?,
        Commands::Config { reset } => commands::config::run(reset, &config)?,
        Commands::Repl => {
            repl::Repl::new(&config).run()?;
            return Ok(());
        }
    };
    println!("{}", output);
    Ok(())
}
