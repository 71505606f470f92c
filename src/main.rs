use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt};

use shelfledger::{cli, ledger::sqlite::SqliteLedger};

#[derive(Parser, Debug)]
#[command(name = "shelfledger", version)]
struct Cli {
    /// Path to the library database file.
    #[arg(long, value_name = "PATH", default_value = "library.db")]
    db: PathBuf,
}

fn main() -> Result<()> {
    init_tracing();
    let args = Cli::parse();

    let mut ledger = SqliteLedger::open(&args.db)?;
    info!(db = %args.db.display(), "library ledger opened");

    let stdin = std::io::stdin();
    let stdout = std::io::stdout();
    cli::run_session(&mut ledger, &mut stdin.lock(), &mut stdout.lock())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}
