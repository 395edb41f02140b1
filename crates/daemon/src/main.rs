//! Stabilizer Agent - Main Entry Point
//! Observes ledger supply, decides monetary policy, signs and submits it

mod config;
mod shutdown;
mod signals;

use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

// Import workspace crates
use stabilizer_core::application::{
    shutdown_channel, PolicyAgent, SchedulerLoop, StabilizationEngine,
};
use stabilizer_core::port::{ActionSigner, FixedRateProvider, SystemTimeProvider};
use stabilizer_infra_crypto::{AgentKeyPair, Ed25519ActionSigner};
use stabilizer_infra_rpc::{JsonRpcLedgerClient, RpcClient};

use config::AgentConfig;

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() -> Result<()> {
    // 0. Optional .env file (ignored when absent)
    let _ = dotenvy::dotenv();

    // 1. Initialize logging
    let log_format =
        std::env::var("STABILIZER_LOG_FORMAT").unwrap_or_else(|_| "pretty".to_string());

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("stabilizer=info"))
        .expect("Failed to create env filter");

    match log_format.as_str() {
        "json" => {
            // Production: JSON structured logging
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().json())
                .init();
        }
        _ => {
            // Development: Pretty formatting with colors
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().pretty())
                .init();
        }
    }

    info!("Stabilizer agent v{} starting...", VERSION);

    // 2. Load configuration (any failure here prevents the loop from starting)
    let config = AgentConfig::from_env().context("Failed to load configuration")?;
    info!(config = ?config, "Configuration loaded");

    let tables = Arc::new(config.load_rule_tables()?);
    info!(
        issuance_tiers = tables.issuance.len(),
        contraction_tiers = tables.contraction.len(),
        "Rule tables loaded"
    );

    // 3. Signing identity
    let keypair = AgentKeyPair::from_base64(&config.private_key_base64)
        .context("PRIVATE_KEY_BASE64_ENCODED is unusable")?;
    let signer = match &config.agent_id {
        Some(agent_id) => Ed25519ActionSigner::with_agent_id(keypair, agent_id)
            .context("PUBLIC_KEY_BASE64_ENCODED does not match the private key")?,
        None => Ed25519ActionSigner::new(keypair),
    };
    let agent_id = signer.agent_id().to_string();

    let eligible_agent_ids = if config.eligible_agent_ids.is_empty() {
        vec![agent_id.clone()]
    } else {
        config.eligible_agent_ids.clone()
    };

    // 4. Setup dependencies (DI wiring)
    let rpc = RpcClient::new(config.endpoint(), config.rpc_timeout)
        .context("Failed to create RPC client")?;
    let ledger = Arc::new(JsonRpcLedgerClient::new(rpc));
    let rates = Arc::new(FixedRateProvider::new(config.exchange_rate));
    let engine = StabilizationEngine::new(tables);

    let agent = PolicyAgent::new(
        engine,
        ledger,
        rates,
        Arc::new(signer),
        eligible_agent_ids.clone(),
    );

    // 5. Start scheduler loop (single worker, cycles never overlap)
    let (shutdown_tx, shutdown_rx) = shutdown_channel();
    let scheduler =
        SchedulerLoop::new(agent, config.cycle_interval, Arc::new(SystemTimeProvider));
    let loop_handle = tokio::spawn(async move { scheduler.run(shutdown_rx).await });

    info!(
        agent_id = %agent_id,
        eligible_agents = eligible_agent_ids.len(),
        endpoint = %config.endpoint(),
        "System ready. Press Ctrl+C to shutdown"
    );

    // 6. Wait for shutdown signal
    let signal = signals::wait_for_shutdown_signal()
        .await
        .context("Failed to install signal handler")?;

    info!(
        signal,
        grace_secs = config.shutdown_grace.as_secs(),
        "Shutdown signal received. Waiting for in-flight cycle..."
    );

    // 7. Graceful shutdown: the in-flight cycle is not cancelled, only bounded
    shutdown_tx.shutdown();
    shutdown::wait_for_loop(loop_handle, config.shutdown_grace).await;

    Ok(())
}
