use std::process::ExitCode;

use clap::Parser;
use log::{debug, error, info};

use bgprtr::config::Cli;
use bgprtr::dispatch::Router;
use bgprtr::router::serve;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    env_logger::Builder::new()
        .filter(Some("bgprtr"), cli.level_filter())
        .filter(None, log::LevelFilter::Warn)
        .init();
    info!("logging at {}", cli.level_filter());

    let neighbors = match cli.neighbor_table() {
        Ok(table) => table,
        Err(err) => {
            error!("malformed startup input: {err}");
            return ExitCode::FAILURE;
        }
    };
    debug!(
        "starting with {} neighbor(s), AS{}",
        neighbors.len(),
        cli.asn
    );

    let router = Router::new(cli.asn, neighbors);
    match serve(&cli.socket_dir, router).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("exiting after transport error: {err}");
            ExitCode::FAILURE
        }
    }
}
