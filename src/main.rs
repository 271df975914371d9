//! Quillpress server binary.
//!
//! ```text
//! quillpress [--config quillpress.toml] [--print-routes]
//! ```
//!
//! Startup order: config → logging → metrics → store → routes → listener.

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use quillpress::config;
use quillpress::lifecycle::{bootstrap, signals, Shutdown};
use quillpress::observability::{logging, metrics};
use quillpress::HttpServer;

#[derive(Parser)]
#[command(name = "quillpress")]
#[command(about = "CMS backend API server", long_about = None)]
struct Cli {
    /// TOML configuration file. Defaults apply when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Print the resolved route table and exit.
    #[arg(long)]
    print_routes: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = config::load(cli.config.as_deref())?;
    logging::init_logging(&config.observability)?;

    tracing::info!("quillpress v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        request_timeout_secs = config.timeouts.request_secs,
        token_ttl_hours = config.admin.token_ttl_hours,
        "Configuration loaded"
    );

    let app = bootstrap(config)?;

    if cli.print_routes {
        for entry in app.dispatcher.table().entries() {
            println!("{entry:?}\t{}", entry.source());
        }
        return Ok(());
    }

    if app.config.observability.metrics_enabled {
        let addr = app.config.observability.metrics_address.parse()?;
        metrics::init_metrics(addr)?;
    }

    let listener = TcpListener::bind(&app.config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(signals::shutdown_on_signal(shutdown));

    HttpServer::new(&app).run(listener, server_shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
