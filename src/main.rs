use clap::Parser;
use tracing_subscriber::EnvFilter;

use skolamat::cli::{self, Cli};
use skolamat::AppState;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let default_filter = match cli.verbose {
        0 => "skolamat=info",
        1 => "skolamat=debug",
        _ => "trace",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let result = match AppState::from_env() {
        Ok(state) => cli::run(state, cli).await,
        Err(e) => Err(e),
    };
    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
