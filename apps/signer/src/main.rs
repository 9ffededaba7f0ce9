use clap::Parser;
use config_parser::config::SignerConfig;
use eyre::Result;
use global_utils::{config_path::ConfigPath, logger::init_logger};
use signer_processor::SignerProcessor;
use tokio_util::sync::CancellationToken;
use tracing::{info, instrument};

const DEFAULT_CONFIG_PATH: &str = "config/signer.toml";

#[derive(Parser, Debug)]
#[command(author, version, about = "Serves threshold signature schemes to a crypto client")]
struct Args {
    /// Router address of the client, overrides the config file
    #[arg(long)]
    url: Option<String>,

    /// Number of worker tasks
    #[arg(long)]
    workers: Option<usize>,

    /// Capacity of the work queue between dispatcher and workers
    #[arg(long)]
    queue_size: Option<usize>,
}

impl Args {
    fn apply(self, mut config: SignerConfig) -> SignerConfig {
        if let Some(url) = self.url {
            config.router.url = url;
        }
        if let Some(workers) = self.workers {
            config.workers = workers;
        }
        if let Some(queue_size) = self.queue_size {
            config.queue_size = queue_size;
        }
        config
    }
}

#[instrument(level = "trace", ret)]
#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();
    let _logger_guard = init_logger();
    let args = Args::parse();

    let config_path = ConfigPath::from_env_or(DEFAULT_CONFIG_PATH);
    let config = args.apply(SignerConfig::init_config(&config_path.path)?);
    config.validate()?;
    tracing::debug!("Signer config: {:?}", config);

    let mut processor = SignerProcessor::new(config);
    for handler in tbls_handler::all_handlers().into_iter().chain(rsa_handler::all_handlers()) {
        processor.add_handler(handler)?;
    }

    let cancellation_token = CancellationToken::new();
    let handle = processor
        .start(cancellation_token.clone())
        .await
        .map_err(|e| eyre::eyre!("Failed to start signer: {}", e))?;
    info!(schemes = ?handle.schemes(), "Signer ready");

    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Interrupt received, shutting down");
            cancellation_token.cancel();
        }
    });

    handle.join().await?;
    Ok(())
}
