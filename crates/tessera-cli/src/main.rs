use anyhow::Result;
use clap::Parser;
use tracing::debug;

use tessera_cli::{cli::Cli, compile, read_query};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so stdout carries only the query text
    let env_filter = format!("tessera_cli={level},tessera_query={level}", level = cli.level());
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(env_filter))
        .with_writer(std::io::stderr)
        .init();

    let query = read_query(cli.query.as_deref())?;
    debug!(result_type = %query.result_type, "loaded entity query");

    let text = compile(&cli, query)?;
    println!("{}", text);
    Ok(())
}
