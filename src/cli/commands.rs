use crate::app::{App, AppOptions};
use crate::config::ServiceConfig;
use crate::logging::{init_logging, LogConfig};
use crate::runtime_config::RuntimeConfig;
use crate::server::{AppService, HttpServer};
use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;

/// Command-line interface for the pets/users service
#[derive(Parser)]
#[command(name = "brrtpets", version)]
#[command(about = "Pets and users resource server", long_about = None)]
pub struct Cli {
    /// The subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the HTTP service
    Serve {
        /// Listen address (host:port)
        #[arg(long, env = "PETS_ADDR")]
        addr: Option<String>,

        /// YAML service configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Directory served under /ui
        #[arg(long)]
        ui_dir: Option<PathBuf>,

        /// Preload sample pets into the store
        #[arg(long, default_value_t = false)]
        seed: bool,
    },
    /// Print the route table
    Routes,
    /// Print the generated API description
    Docs,
}

/// `METHOD PATTERN HANDLER` lines for every compiled route.
#[must_use]
pub fn route_listing(app: &App) -> Vec<String> {
    app.router
        .routes()
        .iter()
        .map(|r| format!("{:<7} {:<20} {}", r.method.as_str(), r.path_pattern, r.handler_name))
        .collect()
}

fn serve(
    addr: Option<String>,
    config: Option<PathBuf>,
    ui_dir: Option<PathBuf>,
    seed: bool,
) -> Result<()> {
    let service_config = match &config {
        Some(path) => ServiceConfig::load(path)
            .with_context(|| format!("loading service config {}", path.display()))?,
        None => ServiceConfig::default(),
    }
    .merge_cli(addr, ui_dir);

    let log_config = LogConfig::from_env().with_overrides(
        service_config.log_level.as_deref(),
        service_config.log_format.as_deref(),
    );
    let _log_guard = init_logging(&log_config)?;

    let runtime = RuntimeConfig::from_env();
    runtime.apply();
    info!(stack_size = runtime.stack_size, "coroutine runtime configured");

    let app = App::build(&AppOptions {
        ui_dir: service_config.ui_dir.clone(),
        seed,
    })
    .context("building service")?;

    let addr = service_config.addr().to_string();
    let handle = HttpServer(AppService::new(&app))
        .start(addr.as_str())
        .with_context(|| format!("binding {addr}"))?;
    info!(addr = %handle.addr(), "brrtpets serving");
    handle
        .join()
        .map_err(|e| anyhow!("server coroutine panicked: {e:?}"))
}

pub fn run_cli(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Serve {
            addr,
            config,
            ui_dir,
            seed,
        } => serve(addr, config, ui_dir, seed),
        Commands::Routes => {
            let app = App::build(&AppOptions::default())?;
            for line in route_listing(&app) {
                println!("{line}");
            }
            Ok(())
        }
        Commands::Docs => {
            let app = App::build(&AppOptions::default())?;
            let doc = serde_json::to_string_pretty(app.description())
                .context("serializing API description")?;
            println!("{doc}");
            Ok(())
        }
    }
}
