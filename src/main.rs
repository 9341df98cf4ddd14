use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use sqlgate::config::{load_config, GatewayConfig};
use sqlgate::middleware::{MetricsMiddleware, TracingMiddleware};
use sqlgate::runtime_config::RuntimeConfig;
use sqlgate::server::{AppService, HttpServer, RouteScope};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "sqlgate")]
#[command(about = "SQL-over-HTTP gateway for SQLite", long_about = None)]
struct Cli {
    /// Address to listen on (default 0.0.0.0:8080)
    #[arg(long, env = "SQLGATE_LISTEN")]
    listen: Option<String>,

    /// YAML configuration file with routing scopes
    #[arg(long)]
    config: Option<PathBuf>,

    /// Path prefix for the single CLI-defined scope
    #[arg(long, default_value = "/")]
    prefix: String,

    /// Base directory for database files in the CLI-defined scope
    #[arg(long)]
    base_dir: Option<String>,

    /// Fixed database file for the CLI-defined scope (overrides `db`)
    #[arg(long)]
    db_file: Option<String>,

    /// Fixed query for the CLI-defined scope (overrides `q`)
    #[arg(long)]
    query: Option<String>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    let runtime = RuntimeConfig::from_env();
    may::config().set_stack_size(runtime.stack_size);

    let mut listen = cli.listen.clone();
    let scopes = match &cli.config {
        Some(path) => {
            let config = load_config(path)?;
            if listen.is_none() {
                listen = config.listen;
            }
            config
                .scopes
                .iter()
                .map(|scope| RouteScope::new(scope.prefix.clone(), scope.gateway_config()))
                .collect()
        }
        None => {
            // No file: the CLI flags describe one enabled scope.
            let gateway = GatewayConfig {
                enabled: true,
                base_dir: cli.base_dir.clone(),
                db_file: cli.db_file.clone(),
                query: cli.query.clone(),
            };
            vec![RouteScope::new(cli.prefix.clone(), gateway)]
        }
    };

    let listen = listen.unwrap_or_else(|| "0.0.0.0:8080".to_string());

    let mut service = AppService::new(scopes);
    let metrics = Arc::new(MetricsMiddleware::new());
    service.add_middleware(metrics.clone());
    service.add_middleware(Arc::new(TracingMiddleware));
    service.set_metrics_middleware(metrics);

    info!(listen = %listen, stack_size = runtime.stack_size, "starting sqlgate");
    let handle = HttpServer(service)
        .start(&listen)
        .map_err(|e| anyhow::anyhow!("failed to bind {listen}: {e}"))?;

    handle
        .join()
        .map_err(|e| anyhow::anyhow!("server failed: {e:?}"))?;
    Ok(())
}
