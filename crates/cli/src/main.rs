//! Stabilizer CLI - operator tooling for the monetary policy agent
//! Offline dry-runs, key management, signature checks, ledger queries

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use stabilizer_core::application::StabilizationEngine;
use stabilizer_core::domain::{Decision, RuleTables, SignedAction, SupplySnapshot, UnsignedAction};
use stabilizer_core::port::{ActionSigner, LedgerClient};
use stabilizer_infra_crypto::{verify_action, AgentKeyPair, AgentPublicKey, Ed25519ActionSigner};
use stabilizer_infra_rpc::{JsonRpcLedgerClient, RpcClient};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tabled::{Table, Tabled};

const DEFAULT_RPC_URL: &str = "http://127.0.0.1:9334";

#[derive(Parser)]
#[command(name = "stabilizer")]
#[command(about = "Stabilizer monetary policy agent CLI", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the policy engine offline for a given supply and rate
    Decide {
        /// Circulating coins
        #[arg(long)]
        coins: f64,

        /// Outstanding bonds
        #[arg(long, default_value = "0")]
        bonds: f64,

        /// Exchange rate (1.0 = peg)
        #[arg(long)]
        rate: f64,

        /// JSON file replacing the built-in rule tables
        #[arg(long, env = "RULE_TABLES_PATH")]
        tables: Option<PathBuf>,

        /// Sign the resulting action with this base64 private key
        #[arg(long, env = "PRIVATE_KEY_BASE64_ENCODED", hide_env_values = true)]
        private_key: Option<String>,

        /// Comma-separated eligible agent ids (default: the signing agent)
        #[arg(long, value_delimiter = ',')]
        eligible: Vec<String>,
    },

    /// Print the active rule tables
    Tiers {
        /// JSON file replacing the built-in rule tables
        #[arg(long, env = "RULE_TABLES_PATH")]
        tables: Option<PathBuf>,
    },

    /// Generate a new agent keypair
    Keygen,

    /// Verify the signature of a submitted action
    Verify {
        /// Signed action JSON, or @path to read it from a file
        #[arg(long)]
        action: String,

        /// Base64 public key (default: the action's agentId)
        #[arg(long)]
        public_key: Option<String>,
    },

    /// Read the current coin and bond supply from a ledger node
    Supply {
        /// RPC server URL
        #[arg(long, env = "STABILIZER_RPC_URL", default_value = DEFAULT_RPC_URL)]
        rpc_url: String,

        /// Request timeout in seconds
        #[arg(long, default_value = "60")]
        timeout_secs: u64,
    },
}

#[derive(Tabled)]
struct IssuanceRow {
    #[tabled(rename = "Rate from")]
    min: f64,
    #[tabled(rename = "Rate to (excl.)")]
    max: f64,
    #[tabled(rename = "Coins / window")]
    coins_per_window: f64,
    #[tabled(rename = "Window (s)")]
    window_seconds: u64,
}

#[derive(Tabled)]
struct ContractionRow {
    #[tabled(rename = "Rate from")]
    min: f64,
    #[tabled(rename = "Rate to (excl.)")]
    max: f64,
    #[tabled(rename = "Tax %")]
    tax_percent: f64,
    #[tabled(rename = "Bonds")]
    bonds_to_issue: f64,
}

fn load_tables(path: Option<&Path>) -> Result<RuleTables> {
    match path {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            RuleTables::from_json_str(&json).context("Invalid rule tables")
        }
        None => Ok(RuleTables::default()),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Decide {
            coins,
            bonds,
            rate,
            tables,
            private_key,
            eligible,
        } => {
            let engine = StabilizationEngine::new(Arc::new(load_tables(tables.as_deref())?));
            let supply = SupplySnapshot::new(coins, bonds);

            let adjustment = match engine.decide(&supply, rate) {
                Ok(Decision::NoOp { demand_gap, bonds }) => {
                    println!("{}", "○ No action".yellow().bold());
                    println!(
                        "  Demand gap {} is covered by {} outstanding bonds",
                        demand_gap, bonds
                    );
                    return Ok(());
                }
                Ok(Decision::Act(adjustment)) => adjustment,
                Err(e) => bail!("Decision failed: {}", e),
            };

            println!(
                "{}",
                format!("✓ {} decided", adjustment.direction.as_str()).green().bold()
            );
            println!("  {} {}", "Coins to issue:".bold(), adjustment.num_of_coins);
            println!("  {} {}", "Bonds to issue:".bold(), adjustment.num_of_bonds);
            println!("  {} {}%", "Tax:".bold(), adjustment.tax);

            if let Some(private_key) = private_key {
                let signer = Ed25519ActionSigner::new(
                    AgentKeyPair::from_base64(&private_key).context("Unusable private key")?,
                );
                let eligible = if eligible.is_empty() {
                    vec![signer.agent_id().to_string()]
                } else {
                    eligible
                };
                let action = UnsignedAction::new(signer.agent_id(), eligible, &adjustment);
                let signed = signer.sign(action)?;

                println!();
                println!("{}", "Signed action:".cyan().bold());
                println!("{}", serde_json::to_string_pretty(&signed)?);
            }
        }

        Commands::Tiers { tables } => {
            let tables = load_tables(tables.as_deref())?;

            let issuance: Vec<IssuanceRow> = tables
                .issuance
                .tiers()
                .iter()
                .map(|t| IssuanceRow {
                    min: t.min,
                    max: t.max,
                    coins_per_window: t.coins_per_window,
                    window_seconds: t.window_seconds,
                })
                .collect();
            let contraction: Vec<ContractionRow> = tables
                .contraction
                .tiers()
                .iter()
                .map(|t| ContractionRow {
                    min: t.min,
                    max: t.max,
                    tax_percent: t.tax_percent,
                    bonds_to_issue: t.bonds_to_issue,
                })
                .collect();

            println!("{}", "Issuance tiers (rate above peg)".cyan().bold());
            println!("{}", Table::new(issuance));
            println!();
            println!("{}", "Contraction tiers (rate at or below peg)".cyan().bold());
            println!("{}", Table::new(contraction));
        }

        Commands::Keygen => {
            let keypair = AgentKeyPair::generate();

            println!("{}", "✓ Keypair generated".green().bold());
            println!();
            println!("PUBLIC_KEY_BASE64_ENCODED={}", keypair.public_key_base64());
            println!("PRIVATE_KEY_BASE64_ENCODED={}", keypair.keypair_base64());
            println!();
            println!("{}", "Keep the private key secret.".yellow());
        }

        Commands::Verify { action, public_key } => {
            let json = match action.strip_prefix('@') {
                Some(path) => std::fs::read_to_string(path)
                    .with_context(|| format!("Failed to read {}", path))?,
                None => action,
            };
            let signed: SignedAction =
                serde_json::from_str(&json).context("Invalid signed action JSON")?;

            let key_b64 = public_key.unwrap_or_else(|| signed.agent_id().to_string());
            let key = AgentPublicKey::from_base64(&key_b64).context("Invalid public key")?;

            match verify_action(&signed, &key) {
                Ok(()) => println!("{}", "✓ Signature valid".green().bold()),
                Err(e) => {
                    println!("{}", "✗ Signature invalid".red().bold());
                    bail!("{}", e);
                }
            }
        }

        Commands::Supply {
            rpc_url,
            timeout_secs,
        } => {
            let rpc = RpcClient::new(rpc_url.clone(), Duration::from_secs(timeout_secs))?;
            let ledger = JsonRpcLedgerClient::new(rpc);

            match ledger.fetch_supply().await {
                Ok(supply) => {
                    println!("{}", "Ledger Supply".cyan().bold());
                    println!();
                    println!("  {} {}", "RPC URL:".bold(), rpc_url);
                    println!("  {} {}", "Coins:".bold(), supply.coins);
                    println!("  {} {}", "Bonds:".bold(), supply.bonds);
                }
                Err(e) => {
                    println!("  {} {}", "Status:".bold(), "ERROR".red());
                    bail!("{}", e);
                }
            }
        }
    }

    Ok(())
}
