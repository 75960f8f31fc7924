use std::net::IpAddr;

use clap::{Args, Parser, Subcommand};
use divvy::api::{GoalArgs, ProjectArgs, run_goal, run_http_server, run_projection};
use divvy::config::ServerConfig;
use divvy::logging::{LoggingConfig, init_logging};

#[derive(Parser, Debug)]
#[command(
    name = "divvy",
    about = "Dividend income projections with optional reinvestment"
)]
struct Cli {
    #[arg(long, global = true, help = "Enable debug logging for divvy")]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve the JSON API.
    Serve(ServeArgs),
    /// Project dividend income for a holding.
    Project(ProjectArgs),
    /// Find the investment needed for a target dividend income.
    Goal(GoalArgs),
}

#[derive(Args, Debug)]
struct ServeArgs {
    #[arg(long, help = "Port to listen on, overrides DIVVY_PORT")]
    port: Option<u16>,
    #[arg(long, help = "Address to bind, overrides DIVVY_BIND")]
    bind: Option<IpAddr>,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let mut logging = LoggingConfig::from_env();
    if cli.verbose {
        logging = logging.verbose();
    }
    if let Err(e) = init_logging(&logging) {
        eprintln!("Logging setup failed: {e}");
        std::process::exit(1);
    }

    match cli.command {
        Command::Serve(args) => {
            let config = match ServerConfig::from_env() {
                Ok(config) => config.with_overrides(args.bind, args.port),
                Err(e) => {
                    tracing::error!("{e}");
                    std::process::exit(1);
                }
            };
            if let Err(e) = run_http_server(config).await {
                tracing::error!("Server error: {e}");
                std::process::exit(1);
            }
        }
        Command::Project(args) => print_or_exit(run_projection(&args)),
        Command::Goal(args) => print_or_exit(run_goal(&args)),
    }
}

fn print_or_exit(result: Result<String, divvy::api::ApiError>) {
    match result {
        Ok(output) => print!("{output}"),
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(2);
        }
    }
}
