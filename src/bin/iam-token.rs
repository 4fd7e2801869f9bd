use anyhow::{Context, Result};
use clap::arg;
use clap::command;
use clap::Parser;
use cloud_iam_auth::credentials::{ChainProvider, CredentialProvider};
use cloud_iam_auth::observability::metrics::get_metrics;
use cloud_iam_auth::utils::config_loader;
use cloud_iam_auth::utils::logging;
use cloud_iam_auth::utils::logging::LogLevel;
use cloud_iam_auth::Authenticator;
use tracing::info;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(short, long, env = "CONFIG", default_value = "iam-token.yaml")]
    config: String,
    /// overrides credentials.service_name
    #[arg(short, long, env = "SERVICE_NAME")]
    service: Option<String>,
    #[arg(long, env = "LOG_LEVEL" , value_enum)]
    log_level: Option<LogLevel>,
    /// print the full `Authorization:` header line
    #[arg(long)]
    header: bool,
    /// dump prometheus metrics to stderr after the token is acquired
    #[arg(long)]
    metrics: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // -------------------------------
    // 1. Load YAML config
    // -------------------------------

    let args = Args::parse();
    let service_config = config_loader::run_with_service(&args.config, args.service).await?;
    logging::run(&service_config, args.log_level);

    // -------------------------------
    // 2. Resolve credentials
    // -------------------------------

    let chain = ChainProvider::from_config(&service_config.credentials);
    let credentials = chain
        .resolve()
        .with_context(|| format!("no credentials for '{}'", service_config.credentials.service_name))?;

    // -------------------------------
    // 3. Build authenticator and acquire the header value
    // -------------------------------

    let authenticator =
        Authenticator::from_credentials(&credentials, &service_config.settings, &service_config.iam)?;
    let value = authenticator.authorization_header().await?;
    info!("authorization acquired for '{}'", service_config.credentials.service_name);

    if args.header {
        println!("Authorization: {}", value);
    } else {
        // bare credential, without the scheme
        println!("{}", value.split_once(' ').map(|(_, v)| v).unwrap_or(&value));
    }

    if args.metrics {
        eprintln!("{}", get_metrics().await.gather_text()?);
    }

    Ok(())
}
