//! Pool Sniper - Raydium Liquidity Pool Sniper Bot
//!
//! Watches AMM program logs for new liquidity pools, rug-checks the new
//! token, buys it through a swap service and liquidates on take-profit or
//! stop-loss.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tokio::sync::mpsc;
use tracing_subscriber::{fmt, EnvFilter};

use pool_sniper::adapters::{
    DiscordNotifier, HeliusTxClient, JsonHoldingStore, JupiterPriceClient, JupiterSwapClient,
    LogStream, LogStreamConfig, NoopNotifier, RugCheckClient,
};
use pool_sniper::application::{
    AcquisitionPipeline, ExitTriggerEngine, PipelineConfig, RetryingPriceClient,
    SniperOrchestrator, TrackerConfig,
};
use pool_sniper::config::{load_config, Config};
use pool_sniper::domain::{AdmissionController, RiskGate};
use pool_sniper::ports::notifier::NotifierPort;

/// Pool Sniper - Raydium liquidity pool sniper for Solana
#[derive(Parser, Debug)]
#[command(
    name = "pool-sniper",
    version = env!("CARGO_PKG_VERSION"),
    about = "Raydium liquidity pool sniper bot for Solana"
)]
struct CliApp {
    #[command(subcommand)]
    command: Command,

    /// Enable debug logging
    #[arg(long, global = true)]
    debug: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start sniping: watch for new pools and track open holdings
    Run(RunCmd),

    /// Print the currently tracked holdings and exit
    Holdings(HoldingsCmd),
}

#[derive(Parser, Debug)]
struct RunCmd {
    /// Path to configuration file
    #[arg(short, long, value_name = "FILE", default_value = "config.toml")]
    config: PathBuf,
}

#[derive(Parser, Debug)]
struct HoldingsCmd {
    /// Path to configuration file
    #[arg(short, long, value_name = "FILE", default_value = "config.toml")]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if it exists (secrets go here, not in config.toml)
    dotenvy::dotenv().ok();

    let app = CliApp::parse();

    match app.command {
        Command::Run(cmd) => {
            let config = load_config(&cmd.config).context("Failed to load configuration")?;
            init_logging(&config, app.debug);
            run_command(config).await
        }
        Command::Holdings(cmd) => {
            let config = load_config(&cmd.config).context("Failed to load configuration")?;
            init_logging(&config, app.debug);
            holdings_command(config).await
        }
    }
}

fn init_logging(config: &Config, debug: bool) {
    let filter = if debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(config.logging.level.clone()))
    };
    fmt().with_env_filter(filter).init();
}

async fn run_command(config: Config) -> Result<()> {
    tracing::info!("Starting pool sniper...");
    if config.rug_check.simulation_mode {
        tracing::warn!("SIMULATION MODE - no real swaps will be executed");
    }

    let timeout = config.swap.request_timeout();

    // Adapters
    let prices = Arc::new(
        JupiterPriceClient::new(
            config.jupiter.price_api_url.clone(),
            config.jupiter.quote_api_url.clone(),
            timeout,
        )
        .context("Failed to create Jupiter price client")?,
    );
    let execution = Arc::new(
        JupiterSwapClient::new(config.jupiter.swap_api_url.clone(), timeout)
            .context("Failed to create Jupiter swap client")?,
    );
    let rug_check = Arc::new(
        RugCheckClient::new(config.rug_check.api_url.clone(), timeout)
            .context("Failed to create rug check client")?,
    );
    let tx_detail = Arc::new(
        HeliusTxClient::new(config.helius.get_api_url(), timeout)
            .context("Failed to create transaction client")?,
    );
    let store = Arc::new(
        JsonHoldingStore::open(PathBuf::from(&config.store.path))
            .context("Failed to open holding store")?,
    );
    let notifier: Arc<dyn NotifierPort> = if config.alerts.discord_enabled {
        Arc::new(DiscordNotifier::new(config.alerts.get_webhook_url(), timeout))
    } else {
        Arc::new(NoopNotifier)
    };

    // Application wiring
    let ignore_suffix = if config.rug_check.ignore_suffix.is_empty() {
        None
    } else {
        Some(config.rug_check.ignore_suffix.clone())
    };
    let pipeline = Arc::new(AcquisitionPipeline::new(
        tx_detail,
        RiskGate::new(rug_check, ignore_suffix),
        RetryingPriceClient::new(prices.clone(), config.swap.price_retry_base_delay()),
        execution.clone(),
        store.clone(),
        notifier.clone(),
        PipelineConfig {
            base_mint: config.tokens.wsol_mint.clone(),
            amount_lamports: config.swap.amount_lamports,
            pre_quote_delay: config.swap.pre_quote_delay(),
            simulation_mode: config.rug_check.simulation_mode,
            program_tag: "raydium".to_string(),
        },
    ));
    let orchestrator = SniperOrchestrator::new(
        pipeline,
        AdmissionController::new(config.swap.max_concurrent),
        config.rug_check.verbose_log,
    );
    let tracker = ExitTriggerEngine::new(
        store,
        prices,
        execution,
        notifier,
        TrackerConfig {
            base_mint: config.tokens.wsol_mint.clone(),
            poll_interval: config.sell.poll_interval(),
            auto_sell: config.sell.auto_sell,
            take_profit_pct: config.sell.take_profit_percent,
            stop_loss_pct: config.sell.stop_loss_percent,
            simulation_mode: config.rug_check.simulation_mode,
            notify_status: config.alerts.discord_enabled,
            track_wallet: if config.sell.track_public_wallet.is_empty() {
                None
            } else {
                Some(config.sell.track_public_wallet.clone())
            },
        },
    );

    let stream = LogStream::new(LogStreamConfig {
        ws_url: config.stream.get_ws_url(),
        program_id: config.tokens.program_id.clone(),
        reconnect_delay: config.stream.reconnect_delay(),
    });

    let (frames_tx, frames_rx) = mpsc::channel(256);
    tokio::select! {
        result = stream.run(frames_tx) => {
            result.context("Log stream failed")?;
        }
        _ = orchestrator.run(frames_rx) => {}
        _ = tracker.run() => {}
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Shutdown signal received");
        }
    }

    tracing::info!("Pool sniper stopped");
    Ok(())
}

async fn holdings_command(config: Config) -> Result<()> {
    let store = JsonHoldingStore::open(PathBuf::from(&config.store.path))
        .context("Failed to open holding store")?;
    let holdings = pool_sniper::ports::store::HoldingStore::all(&store)
        .await
        .map_err(|e| anyhow::anyhow!(e))?;

    if holdings.is_empty() {
        println!("No token holdings yet");
        return Ok(());
    }
    for holding in holdings {
        println!(
            "{}  balance {:.6}  paid {:.4} USDC  ({})",
            holding.token, holding.balance, holding.sol_paid_usdc, holding.program
        );
    }
    Ok(())
}
