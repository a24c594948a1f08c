//! gateway-cli: the gateway's local operations from a shell.
//!
//! Every command runs against a dispatcher with no modules attached, so only
//! operations the gateway answers itself are available. Output is JSON on
//! stdout; logs go to stderr.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde_json::{json, Value};
use tracing::{debug, info};

use rpc_gateway::{
    init_tracing, CreateTransactionGroup, GatewayConfig, GatewayDispatcher, ReWriteRawTx, ReqKey,
    TxGroup,
};
use shared_bus::ChannelModuleBus;
use shared_types::{RawTransaction, Transaction, TxCodec};

/// gateway-cli: fork lookup, group building and raw transaction tools
#[derive(Parser, Debug)]
#[command(name = "gateway-cli")]
#[command(about = "Run the gateway's local transaction and fork operations")]
struct Cli {
    /// Gateway configuration file (TOML); defaults apply when omitted
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log filter, overriding the configured level (`RUST_LOG` still wins when set)
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, PartialEq)]
enum Command {
    /// Activation height of a `title-forkname` key (or a bare fork name)
    Fork { key: String },

    /// Fork schedule of a title; the system schedule when no title is given
    Forks {
        #[arg(long)]
        title: Option<String>,
    },

    /// Link hex-encoded transactions into one group
    Group {
        #[arg(required = true)]
        txs: Vec<String>,
    },

    /// Override recipient, fee or expiry of a hex transaction or group
    Rewrite {
        tx: String,
        #[arg(long, default_value = "")]
        to: String,
        #[arg(long, default_value_t = 0)]
        fee: i64,
        /// Expiry: `H:<n>`, a block height, or a duration such as `130s`
        #[arg(long, default_value = "")]
        expire: String,
        /// 0 rewrites the whole group (recipient on the head only), k rewrites member k
        #[arg(long, default_value_t = 0)]
        index: i32,
    },

    /// Decode a hex transaction or group
    Decode { tx: String },

    /// Static chain parameters
    ChainConfig,
}

fn load_config(path: Option<&Path>) -> Result<GatewayConfig> {
    match path {
        Some(path) => GatewayConfig::load(path)
            .with_context(|| format!("Failed to load config from {}", path.display())),
        None => Ok(GatewayConfig::default()),
    }
}

/// Replace the configured log filter with `--log-level`. `RUST_LOG` still
/// takes precedence over the result in [`init_tracing`].
fn override_log_level(config: &mut GatewayConfig, level: Option<String>) {
    if let Some(level) = level {
        config.logging.level = level;
    }
}

fn dispatcher(config: &GatewayConfig) -> Result<GatewayDispatcher> {
    let forks = Arc::new(config.fork_table().context("Failed to build fork table")?);
    let bus = Arc::new(ChannelModuleBus::new());
    Ok(GatewayDispatcher::new(config, forks, bus))
}

fn describe(tx: &Transaction) -> Value {
    json!({
        "hash": tx.hash(),
        "execer": tx.execer_name(),
        "size": tx.size(),
        "tx": tx,
    })
}

async fn run(command: Command, config: &GatewayConfig) -> Result<Value> {
    let gateway = dispatcher(config)?;

    let output = match command {
        Command::Fork { key } => {
            let height = gateway
                .get_fork(ReqKey { key: key.clone() })
                .await
                .with_context(|| format!("Failed to resolve {}", key))?;
            json!({ "key": key, "height": height.height })
        }
        Command::Forks { title } => {
            let forks = gateway.forks();
            let entries = match &title {
                Some(title) => forks.title_forks(title),
                None => forks.system_forks(),
            };
            let schedule: serde_json::Map<String, Value> = entries
                .into_iter()
                .map(|(name, height)| (name.to_string(), json!(height)))
                .collect();
            json!({
                "title": title.as_deref().unwrap_or(forks.default_title()),
                "forks": schedule,
            })
        }
        Command::Group { txs } => {
            let bytes = gateway
                .create_raw_tx_group(CreateTransactionGroup { txs })
                .await
                .context("Failed to build group")?;
            let group = TxGroup::decode(&bytes).context("Built group does not verify")?;
            json!({
                "hex": TxCodec::to_hex(&bytes),
                "header": group.header(),
                "hashes": group.hashes(),
            })
        }
        Command::Rewrite {
            tx,
            to,
            fee,
            expire,
            index,
        } => {
            let reply = gateway
                .rewrite_raw_tx(ReWriteRawTx {
                    tx,
                    to,
                    fee,
                    expire,
                    index,
                })
                .await
                .context("Failed to rewrite transaction")?;
            json!({ "hex": TxCodec::to_hex(&reply.data) })
        }
        Command::Decode { tx } => {
            let bytes = TxCodec::decode_hex_tx(&tx).context("Input is not hex")?;
            match TxCodec::decode_raw(&bytes).context("Input is not a transaction")? {
                RawTransaction::Single(tx) => json!({
                    "layout": "single",
                    "transaction": describe(&tx),
                }),
                RawTransaction::Group(members) => json!({
                    "layout": "group",
                    "members": members.iter().map(describe).collect::<Vec<_>>(),
                }),
            }
        }
        Command::ChainConfig => serde_json::to_value(gateway.get_chain_config().await?)?,
    };

    Ok(output)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = load_config(cli.config.as_deref())?;
    override_log_level(&mut config, cli.log_level);
    init_tracing(&config.logging).context("Failed to initialize logging")?;

    info!(title = %config.chain.title, "Gateway CLI started");
    debug!(command = ?cli.command, "Running command");

    let output = run(cli.command, &config).await?;
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn tx_hex(nonce: i64) -> String {
        let tx = Transaction {
            nonce,
            ..Transaction::new("coins", vec![nonce as u8; 4])
        };
        TxCodec::to_hex(&TxCodec::encode(&tx))
    }

    #[test]
    fn test_parse_commands() {
        let cli = Cli::try_parse_from(["gateway-cli", "fork", "local-ForkTxHeight"]).unwrap();
        assert_eq!(
            cli.command,
            Command::Fork {
                key: "local-ForkTxHeight".into()
            }
        );

        let cli = Cli::try_parse_from([
            "gateway-cli",
            "rewrite",
            "0x01",
            "--fee",
            "500",
            "--index",
            "2",
            "--config",
            "gw.toml",
        ])
        .unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("gw.toml")));
        assert!(matches!(cli.command, Command::Rewrite { fee: 500, index: 2, .. }));

        assert!(Cli::try_parse_from(["gateway-cli", "group"]).is_err());
    }

    #[tokio::test]
    async fn test_fork_command() {
        let output = run(
            Command::Fork {
                key: "local-ForkBlockHash".into(),
            },
            &GatewayConfig::default(),
        )
        .await
        .unwrap();
        assert_eq!(output["height"], json!(1));
    }

    #[tokio::test]
    async fn test_group_then_decode() {
        let config = GatewayConfig::default();
        let group = run(
            Command::Group {
                txs: vec![tx_hex(1), tx_hex(2)],
            },
            &config,
        )
        .await
        .unwrap();
        assert_eq!(group["hashes"].as_array().unwrap().len(), 2);

        let hex = group["hex"].as_str().unwrap().to_string();
        let decoded = run(Command::Decode { tx: hex }, &config).await.unwrap();
        assert_eq!(decoded["layout"], json!("group"));
        assert_eq!(decoded["members"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_rewrite_command_errors_surface() {
        let result = run(
            Command::Rewrite {
                tx: tx_hex(1),
                to: String::new(),
                fee: 0,
                expire: String::new(),
                index: 3,
            },
            &GatewayConfig::default(),
        )
        .await;
        assert!(result.is_err());
    }

    #[test]
    fn test_log_level_flag_replaces_configured_level() {
        let cli =
            Cli::try_parse_from(["gateway-cli", "--log-level", "debug", "chain-config"]).unwrap();
        let mut config = GatewayConfig::default();
        override_log_level(&mut config, cli.log_level);
        assert_eq!(config.logging.level, "debug");

        let mut config = GatewayConfig::default();
        override_log_level(&mut config, None);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_load_config_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[chain]\ntitle = \"user.p.demo.\"\n\n[group]\nmax_size = 5").unwrap();

        let config = load_config(Some(file.path())).unwrap();
        assert_eq!(config.chain.title, "user.p.demo.");
        assert_eq!(config.group.max_size, 5);

        assert!(load_config(Some(Path::new("/nonexistent/gateway.toml"))).is_err());
        assert!(load_config(None).is_ok());
    }
}
