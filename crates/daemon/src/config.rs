//! Agent configuration from environment variables
//!
//! # Environment Variables
//!
//! - `RPC_PROTOCOL` / `RPC_HOST` / `RPC_PORT`: ledger node endpoint
//!   (default `http://127.0.0.1:9334`)
//! - `DELAY_TIME_IN_SEC`: pause between cycles (default 600)
//! - `RPC_TIMEOUT_IN_SEC`: per-call HTTP timeout (default 60)
//! - `SHUTDOWN_GRACE_IN_SEC`: wait after a shutdown signal (default 2)
//! - `PRIVATE_KEY_BASE64_ENCODED`: ed25519 seed or keypair (required)
//! - `PUBLIC_KEY_BASE64_ENCODED`: agent id, must match the private key (optional)
//! - `ELIGIBLE_AGENT_IDS`: comma-separated agent ids (default: this agent)
//! - `EXCHANGE_RATE`: rate served by the fixed rate provider (default 1.25)
//! - `RULE_TABLES_PATH`: JSON file replacing the built-in tiers (optional)

use anyhow::{anyhow, bail, Context, Result};
use stabilizer_core::application::agent::constants::{
    DEFAULT_CYCLE_INTERVAL, DEFAULT_EXCHANGE_RATE, DEFAULT_RPC_TIMEOUT, DEFAULT_SHUTDOWN_GRACE,
};
use stabilizer_core::domain::RuleTables;
use stabilizer_infra_rpc::build_endpoint;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

const DEFAULT_RPC_PROTOCOL: &str = "http";
const DEFAULT_RPC_HOST: &str = "127.0.0.1";
const DEFAULT_RPC_PORT: u16 = 9334;

pub struct AgentConfig {
    pub rpc_protocol: String,
    pub rpc_host: String,
    pub rpc_port: u16,
    pub cycle_interval: Duration,
    pub rpc_timeout: Duration,
    pub shutdown_grace: Duration,
    pub agent_id: Option<String>,
    pub private_key_base64: String,
    pub eligible_agent_ids: Vec<String>,
    pub exchange_rate: f64,
    pub rule_tables_path: Option<PathBuf>,
}

impl AgentConfig {
    /// Load from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load using `lookup` to resolve variables (empty values count as unset)
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let private_key_base64 = var("PRIVATE_KEY_BASE64_ENCODED")
            .ok_or_else(|| anyhow!("PRIVATE_KEY_BASE64_ENCODED must be set"))?;

        let exchange_rate = parse_or(&var, "EXCHANGE_RATE", DEFAULT_EXCHANGE_RATE)?;
        if !exchange_rate.is_finite() || exchange_rate < 0.0 {
            bail!("EXCHANGE_RATE must be a non-negative number, got {}", exchange_rate);
        }

        let cycle_interval = seconds_or(&var, "DELAY_TIME_IN_SEC", DEFAULT_CYCLE_INTERVAL)?;
        if cycle_interval.is_zero() {
            bail!("DELAY_TIME_IN_SEC must be greater than zero");
        }

        Ok(Self {
            rpc_protocol: var("RPC_PROTOCOL").unwrap_or_else(|| DEFAULT_RPC_PROTOCOL.to_string()),
            rpc_host: var("RPC_HOST").unwrap_or_else(|| DEFAULT_RPC_HOST.to_string()),
            rpc_port: parse_or(&var, "RPC_PORT", DEFAULT_RPC_PORT)?,
            cycle_interval,
            rpc_timeout: seconds_or(&var, "RPC_TIMEOUT_IN_SEC", DEFAULT_RPC_TIMEOUT)?,
            shutdown_grace: seconds_or(&var, "SHUTDOWN_GRACE_IN_SEC", DEFAULT_SHUTDOWN_GRACE)?,
            agent_id: var("PUBLIC_KEY_BASE64_ENCODED").map(|v| v.trim().to_string()),
            private_key_base64,
            eligible_agent_ids: var("ELIGIBLE_AGENT_IDS")
                .map(|v| split_list(&v))
                .unwrap_or_default(),
            exchange_rate,
            rule_tables_path: var("RULE_TABLES_PATH").map(PathBuf::from),
        })
    }

    pub fn endpoint(&self) -> String {
        build_endpoint(&self.rpc_protocol, &self.rpc_host, self.rpc_port)
    }

    /// Built-in tiers, or the override file when configured
    pub fn load_rule_tables(&self) -> Result<RuleTables> {
        match &self.rule_tables_path {
            Some(path) => {
                let json = std::fs::read_to_string(path).with_context(|| {
                    format!("Failed to read rule tables from {}", path.display())
                })?;
                RuleTables::from_json_str(&json)
                    .with_context(|| format!("Invalid rule tables in {}", path.display()))
            }
            None => Ok(RuleTables::default()),
        }
    }
}

// Private key stays out of Debug output
impl fmt::Debug for AgentConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AgentConfig")
            .field("endpoint", &self.endpoint())
            .field("cycle_interval", &self.cycle_interval)
            .field("rpc_timeout", &self.rpc_timeout)
            .field("shutdown_grace", &self.shutdown_grace)
            .field("agent_id", &self.agent_id)
            .field("eligible_agent_ids", &self.eligible_agent_ids)
            .field("exchange_rate", &self.exchange_rate)
            .field("rule_tables_path", &self.rule_tables_path)
            .finish_non_exhaustive()
    }
}

fn parse_or<T, F>(var: &F, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    match var(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| anyhow!("Invalid {}={:?}: {}", key, raw, e)),
        None => Ok(default),
    }
}

fn seconds_or<F>(var: &F, key: &str, default: Duration) -> Result<Duration>
where
    F: Fn(&str) -> Option<String>,
{
    parse_or(var, key, default.as_secs()).map(Duration::from_secs)
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
