use std::error::Error;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};

use addrbal::api::{create_router, AppState};
use addrbal::config::{load_config, AppConfig, DEFAULT_CONFIG_PATH};
use addrbal::metrics::init_metrics;
use addrbal::service::get_address_statistics_by_name;
use addrbal::sources::HttpTransport;
use addrbal::telemetry::init_tracing;

#[derive(Parser, Debug)]
#[command(name = "addrbal", about = "UTXO statistics for an address from public explorers")]
struct Cli {
    /// Path to the configuration file
    #[arg(long, global = true, default_value = DEFAULT_CONFIG_PATH)]
    config: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP server
    Serve,
    /// Print statistics for one address as JSON and exit
    Lookup {
        address: String,
        /// Source identifier (bch, btc); defaults to the configured source
        #[arg(long)]
        source: Option<String>,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    let config = load_config(&cli.config)?;
    let _guard = init_tracing(&config.logging)?;
    init_metrics()?;

    let transport = HttpTransport::new(&config.http)?;

    match cli.command {
        Command::Serve => serve(config, transport).await,
        Command::Lookup { address, source } => {
            let source = source.unwrap_or_else(|| config.sources.default.clone());
            let stats = get_address_statistics_by_name(&transport, &config.sources, &address, &source).await?;
            println!("{}", serde_json::to_string_pretty(&stats)?);
            Ok(())
        }
    }
}

async fn serve(config: AppConfig, transport: HttpTransport) -> Result<(), Box<dyn Error>> {
    let bind = config.server.bind.clone();
    let state = Arc::new(AppState {
        config,
        transport: Arc::new(transport),
    });
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(&bind).await?;
    tracing::info!(bind = %bind, "addrbal listening");

    axum::serve(listener, app).await?;
    Ok(())
}
