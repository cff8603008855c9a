// src/main.rs — wayfare entry point

use std::path::Path;

use clap::Parser;

use wayfare::cli::{run, Cli, Commands};
use wayfare::infra::config::Config;
use wayfare::infra::logger;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // RUST_LOG overrides the default filter
    logger::init_logging(cli.verbose);

    if let Err(e) = dispatch(cli).await {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}

async fn dispatch(cli: Cli) -> anyhow::Result<()> {
    // Load config (falls back to defaults if no config.toml)
    let config = if let Some(ref path) = cli.config {
        Config::load_from(Path::new(path))?
    } else {
        Config::load()?
    };
    let model = cli.model.as_deref();

    match cli.command {
        Commands::Compare {
            trip,
            output,
            json,
            quiet,
        } => {
            run::run_compare(
                trip.to_request(),
                &trip.selected_strategies(),
                &config,
                model,
                output.as_deref(),
                json,
                quiet,
            )
            .await
        }
        Commands::Generate {
            trip,
            output,
            quiet,
        } => {
            run::run_generate(
                trip.to_request(),
                &trip.selected_strategies(),
                &config,
                model,
                output.as_deref(),
                quiet,
            )
            .await
        }
        Commands::Evaluate {
            run: run_path,
            json,
            quiet,
        } => run::run_evaluate(Path::new(&run_path), &config, model, json, quiet).await,
        Commands::Distance { points } => run::run_distance(&points),
    }
}
