//! Maltcoin command-line scripts.
//!
//! # Architecture Overview
//!
//! ```text
//!   argv ──▶ clap ──▶ config (file + overrides) ──▶ RpcNodeClient
//!                                                       │
//!            ┌──────────────────────────────────────────┘
//!            ▼
//!   scripts::{deploy, transfer, receipt, query}
//!            │   identity → encode call → build request → sign → submit → receipt
//!            ▼
//!   report (stdout)            logs (stderr)
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use maltcoin_scripts::blockchain::contract::load_bytecode;
use maltcoin_scripts::blockchain::receipt::parse_tx_hash;
use maltcoin_scripts::blockchain::{parse_address, RpcNodeClient, SigningIdentity};
use maltcoin_scripts::config::{load_with_overrides, ConfigOverrides, ScriptsConfig};
use maltcoin_scripts::lifecycle::{interrupt_signal, run_cancellable, INTERRUPTED_EXIT_CODE};
use maltcoin_scripts::observability::init_logging;
use maltcoin_scripts::resilience::retries::RetryPolicy;
use maltcoin_scripts::scripts::{self, ScriptResult, Step, StepExt, WaitOptions};

#[derive(Parser)]
#[command(name = "maltcoin")]
#[command(about = "Deploy, query and transfer the Maltcoin ERC20 token", long_about = None)]
struct Cli {
    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// JSON-RPC endpoint, overrides the config file
    #[arg(short, long)]
    rpc_url: Option<String>,

    /// Log level, overrides the config file
    #[arg(long)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Deploy the token contract
    Deploy {
        /// Deployer private key in hex
        private_key: String,
        /// Compiled contract bytecode (hex or JSON artifact)
        #[arg(short, long)]
        bytecode: PathBuf,
        /// Return after submission instead of waiting for the receipt
        #[arg(long)]
        no_wait: bool,
    },
    /// Query balances and transfer tokens to another account
    Transfer {
        /// Token contract address
        contract: String,
        /// Sender private key in hex
        private_key: String,
        /// Recipient address
        recipient: String,
        /// Amount in the token's smallest unit (decimal)
        amount: String,
        /// Return after submission instead of waiting for the receipt
        #[arg(long)]
        no_wait: bool,
    },
    /// Print the receipt of a transaction
    Receipt {
        /// Transaction hash in hex
        tx_hash: String,
    },
    /// Print token settings and optionally one holder's balance
    Query {
        /// Token contract address
        contract: String,
        /// Address whose balance to print
        #[arg(long)]
        holder: Option<String>,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let overrides = ConfigOverrides {
        rpc_url: cli.rpc_url.clone(),
        log_level: cli.log_level.clone(),
    };
    let config = match load_with_overrides(cli.config.as_deref(), &overrides) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    init_logging(&config.observability.log_level);
    tracing::debug!(rpc_url = %config.node.rpc_url, "Configuration loaded");

    match run_cancellable(run(cli.command, config), interrupt_signal()).await {
        Ok(Ok(report)) => {
            println!("{}", report);
            ExitCode::SUCCESS
        }
        Ok(Err(e)) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
        Err(interrupted) => {
            eprintln!("error: {}", interrupted);
            ExitCode::from(INTERRUPTED_EXIT_CODE)
        }
    }
}

async fn connect(config: &ScriptsConfig) -> ScriptResult<RpcNodeClient> {
    let client = RpcNodeClient::connect(config.node.clone(), RetryPolicy::from(&config.retries))
        .await
        .step(Step::Connect)?;
    println!("Connected to node at {}.", config.node.rpc_url);
    Ok(client)
}

/// Parse every argument before touching the network, then run the command.
async fn run(command: Commands, config: ScriptsConfig) -> ScriptResult<Box<dyn std::fmt::Display>> {
    let wait = |no_wait: bool| (!no_wait).then(|| WaitOptions::from(&config.receipts));

    match command {
        Commands::Deploy {
            private_key,
            bytecode,
            no_wait,
        } => {
            let identity = SigningIdentity::from_hex(&private_key).step(Step::ParseKey)?;
            let bytecode = load_bytecode(&bytecode).step(Step::LoadBytecode)?;
            let client = connect(&config).await?;
            let report = scripts::deploy::run(&client, &identity, bytecode, wait(no_wait)).await?;
            Ok(Box::new(report))
        }
        Commands::Transfer {
            contract,
            private_key,
            recipient,
            amount,
            no_wait,
        } => {
            let contract = parse_address(&contract).step(Step::ParseArgument)?;
            let identity = SigningIdentity::from_hex(&private_key).step(Step::ParseKey)?;
            let recipient = parse_address(&recipient).step(Step::ParseArgument)?;
            let client = connect(&config).await?;
            let report = scripts::transfer::run(
                &client,
                &identity,
                contract,
                recipient,
                &amount,
                wait(no_wait),
            )
            .await?;
            Ok(Box::new(report))
        }
        Commands::Receipt { tx_hash } => {
            let tx_hash = parse_tx_hash(&tx_hash).step(Step::ParseArgument)?;
            let client = connect(&config).await?;
            let report = scripts::receipt::run(&client, tx_hash).await?;
            Ok(Box::new(report))
        }
        Commands::Query { contract, holder } => {
            let contract = parse_address(&contract).step(Step::ParseArgument)?;
            let holder = holder
                .as_deref()
                .map(parse_address)
                .transpose()
                .step(Step::ParseArgument)?;
            let client = connect(&config).await?;
            let report = scripts::query::run(&client, contract, holder).await?;
            Ok(Box::new(report))
        }
    }
}
