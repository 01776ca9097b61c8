//! indexer-sdk CLI — register applications with the indexer and tail their events.
//!
//! # Commands
//! ```text
//! indexer-sdk register --config app.json [--filter <regex>]
//! indexer-sdk filter   --config app.json --pattern <regex>
//! indexer-sdk listen   --name <consumer> --subject <subject> [--keep]
//! indexer-sdk call     --rpc <url> --address <0x..> --function <name> [--calldata <felt>...]
//! ```

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use indexer_sdk_core::{
    layer, Config, Contract, EventHandler, Felt, HandlerError, HttpRpcProvider, IndexerSdk,
    Middleware, RawEvent, Subscription,
};
use indexer_sdk_nats::{NatsSdk, NatsSdkBuilder};
use std::path::PathBuf;
use std::sync::Arc;

mod logging;

use logging::{init_tracing, LogConfig};

#[derive(Parser)]
#[command(
    name = "indexer-sdk",
    about = "Register applications with the event indexer and consume their events",
    long_about = "
Register applications with the event indexer and consume their events.

ENVIRONMENT VARIABLES:
  INDEXER_TOKEN      NATS bearer token
  INDEXER_URL        NATS server URL
  INDEXER_API        Indexer HTTP API base URL
  INDEXER_API_KEY    Indexer HTTP API key
  RUST_LOG           Log filter (overrides --log-level)
",
    version
)]
struct Cli {
    /// Log level or filter directive
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Overrides applied on top of the `INDEXER_*` environment.
#[derive(Args)]
struct Connection {
    /// NATS bearer token
    #[arg(long)]
    token: Option<String>,
    /// NATS server URL
    #[arg(long)]
    url: Option<String>,
    /// Indexer API base URL
    #[arg(long)]
    api: Option<String>,
    /// Indexer API key
    #[arg(long)]
    api_key: Option<String>,
}

impl Connection {
    fn apply(self, mut builder: NatsSdkBuilder) -> NatsSdkBuilder {
        if let Some(t) = self.token {
            builder = builder.token(t);
        }
        if let Some(u) = self.url {
            builder = builder.url(u);
        }
        if let Some(a) = self.api {
            builder = builder.api(a);
        }
        if let Some(k) = self.api_key {
            builder = builder.api_key(k);
        }
        builder
    }

    fn sdk(self) -> Result<NatsSdk> {
        Ok(self.apply(NatsSdk::builder()).build()?)
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Register an application configuration with the indexer
    Register {
        /// Path to the JSON configuration
        #[arg(short, long)]
        config: PathBuf,
        /// Only register contracts whose name matches this regex
        #[arg(long)]
        filter: Option<String>,
        #[command(flatten)]
        conn: Connection,
    },

    /// Print the contracts of a configuration whose name matches a regex
    Filter {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(short, long)]
        pattern: String,
    },

    /// Attach to a durable consumer and print every event as a JSON line
    Listen {
        /// Durable consumer name
        #[arg(short, long)]
        name: String,
        /// Subject filter, e.g. "yielder:deposit"
        #[arg(short, long)]
        subject: String,
        /// Keep the durable consumer on exit instead of deleting it
        #[arg(long)]
        keep: bool,
        /// Only print events emitted by this contract address; others are acked and skipped
        #[arg(long)]
        from_address: Option<String>,
        #[command(flatten)]
        conn: Connection,
    },

    /// Call a view function on a contract
    Call {
        /// Starknet JSON-RPC endpoint
        #[arg(long)]
        rpc: String,
        /// Contract address (hex)
        #[arg(long)]
        address: String,
        /// Function name, e.g. "slot_count"
        #[arg(short, long)]
        function: String,
        /// Calldata felts (hex)
        #[arg(long, num_args = 0..)]
        calldata: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(&LogConfig {
        level: cli.log_level,
        json: cli.json_logs,
    });

    match cli.command {
        Commands::Register { config, filter, conn } => cmd_register(config, filter, conn).await,
        Commands::Filter { config, pattern } => cmd_filter(config, &pattern),
        Commands::Listen {
            name,
            subject,
            keep,
            from_address,
            conn,
        } => cmd_listen(&name, &subject, keep, from_address.as_deref(), conn).await,
        Commands::Call {
            rpc,
            address,
            function,
            calldata,
        } => cmd_call(&rpc, &address, &function, &calldata).await,
    }
}

fn load_config(path: &PathBuf) -> Result<Config> {
    Config::from_json_file(path).with_context(|| format!("failed to load {}", path.display()))
}

async fn cmd_register(path: PathBuf, filter: Option<String>, conn: Connection) -> Result<()> {
    let mut config = load_config(&path)?;
    if let Some(pattern) = filter {
        config = config.filter_by_name(&pattern);
    }
    if config.app_name.is_empty() {
        anyhow::bail!("app_name is empty in {}", path.display());
    }

    let registered = conn.sdk()?.configure(&config).await.context("registration failed")?;
    println!("{}", serde_json::to_string_pretty(&registered)?);
    Ok(())
}

fn cmd_filter(path: PathBuf, pattern: &str) -> Result<()> {
    let config = load_config(&path)?.filter_by_name(pattern);
    println!("{}", serde_json::to_string_pretty(&config)?);
    Ok(())
}

async fn cmd_listen(
    name: &str,
    subject: &str,
    keep: bool,
    from_address: Option<&str>,
    conn: Connection,
) -> Result<()> {
    let sdk = conn.sdk()?;
    let mut layers: Vec<Arc<dyn Middleware>> = Vec::new();
    if let Some(address) = from_address {
        let address = Felt::from_hex(address).context("invalid --from-address")?;
        layers.push(only_from(address));
    }

    let handler = |subject: String, sequence: u64, event: RawEvent| async move {
        let line = serde_json::json!({
            "subject": subject,
            "sequence": sequence,
            "event": event,
        });
        println!("{line}");
        Ok::<(), HandlerError>(())
    };

    let sub = sdk
        .register_handler(name, subject, layer(Arc::new(handler), &layers))
        .await
        .with_context(|| format!("failed to attach to consumer '{name}'"))?;
    tracing::info!(consumer = name, subject, "listening, press Ctrl-C to stop");

    tokio::signal::ctrl_c().await?;

    if keep {
        tracing::info!(consumer = name, "keeping durable consumer");
    } else {
        sub.cancel().await;
    }
    Ok(())
}

/// Drop events whose emitter is not `address`. Skipped events are acked.
fn only_from(address: Felt) -> Arc<dyn Middleware> {
    Arc::new(move |inner: Arc<dyn EventHandler>| -> Arc<dyn EventHandler> {
        Arc::new(move |subject: String, sequence: u64, event: RawEvent| {
            let inner = inner.clone();
            async move {
                if Felt::from_hex(&event.from_address).ok() != Some(address) {
                    tracing::debug!(subject = %subject, sequence, from = %event.from_address, "skipping event");
                    return Ok::<(), HandlerError>(());
                }
                inner.handle(&subject, sequence, event).await
            }
        })
    })
}

async fn cmd_call(rpc: &str, address: &str, function: &str, calldata: &[String]) -> Result<()> {
    let provider = HttpRpcProvider::default_for(rpc)?;
    let calldata = calldata
        .iter()
        .map(|s| Felt::from_hex(s))
        .collect::<Result<Vec<_>, _>>()
        .context("invalid calldata")?;

    let contract = Contract::new("cli", address);
    let out = match contract.call(&provider, function, &calldata).await {
        Ok(out) => out,
        Err(e) if e.is_rpc_error() => {
            return Err(anyhow::Error::new(e).context(format!("node rejected call to '{function}'")))
        }
        Err(e) => return Err(e.into()),
    };
    for felt in out {
        match felt.to_u64() {
            Some(n) => println!("{felt}  ({n})"),
            None => println!("{felt}"),
        }
    }
    Ok(())
}
