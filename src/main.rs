use anyhow::Result;
use clap::Parser;
use dv_router::{ProtocolEngine, RouterConfig};
use dv_router::protocol::TerminationCause;
use log::{error, info};
use std::path::PathBuf;
use tokio::runtime::Builder;

#[derive(Parser)]
#[command(name = "dv-router", about = "Distance-vector routing node")]
struct Cli {
    /// Id of this router, starting at 0
    #[arg(long)]
    router_id: Option<usize>,

    /// Host name of the relay server
    #[arg(long)]
    server: Option<String>,

    /// TCP port of the relay server
    #[arg(long)]
    port: Option<u16>,

    /// Interval between routing updates, in milliseconds
    #[arg(long)]
    update_interval: Option<u64>,

    /// JSON configuration file; command-line flags override its values
    #[arg(long)]
    config: Option<PathBuf>,

    /// Print the routing table as JSON
    #[arg(long)]
    json: bool,
}

impl Cli {
    fn router_config(&self) -> Result<RouterConfig> {
        let mut config = match &self.config {
            Some(path) => RouterConfig::load(path)?,
            None => RouterConfig::default(),
        };

        if let Some(router_id) = self.router_id {
            config.router_id = router_id;
        }
        if let Some(server) = &self.server {
            config.server_host = server.clone();
        }
        if let Some(port) = self.port {
            config.server_port = port;
        }
        if let Some(update_interval) = self.update_interval {
            config.update_interval = update_interval;
        }

        config.validate()?;
        Ok(config)
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let config = cli.router_config()?;

    info!("Starting router #{} with parameters:", config.router_id);
    info!("Relay server host name: {}", config.server_host);
    info!("Relay server port number: {}", config.server_port);
    info!("Routing update interval: {} ms", config.update_interval);

    let rt = Builder::new_multi_thread()
        .enable_all()
        .build()?;

    let report = rt.block_on(async {
        let engine = ProtocolEngine::connect(config).await?;
        anyhow::Ok(engine.start().await)
    })?;

    if let TerminationCause::Failed(e) = &report.cause {
        error!("Session ended abnormally: {}", e);
    }

    match &report.table {
        Some(table) if cli.json => println!("{}", serde_json::to_string_pretty(table)?),
        Some(table) => print!("\n{}", table),
        None => anyhow::bail!("no routing table: the session ended before link costs arrived"),
    }

    Ok(())
}
