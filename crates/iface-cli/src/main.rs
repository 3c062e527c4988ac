//! Proxmox VE Interface CLI (pveiface)
//!
//! Declarative management of node network interfaces: declare the desired
//! interfaces in a JSON batch, review the pending change set with `--check`,
//! then apply it.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use log::LevelFilter;
use serde::Deserialize;

use pve_iface_apply::{ApplyOptions, InterfaceApplier};
use pve_iface_client::{NodeNetworkClient, PveClient};
use pve_iface_core::InterfaceDeclaration;

#[derive(Parser)]
#[command(name = "pveiface")]
#[command(about = "Proxmox VE node network interface reconciliation")]
#[command(version)]
#[command(long_about = "
Proxmox VE node network interface reconciliation

Declarations are read from a JSON file: either a plain list of interface
declarations or an object with a \"config\" list. The API token is taken
from the PVE_API_TOKEN environment variable in
user@realm!tokenid=secret form.

Examples:
  pveiface -e https://pve1:8006 apply -n node01 -c interfaces.json --check
  pveiface -e https://pve1:8006 apply -n node01 -c interfaces.json
  pveiface -e https://pve1:8006 list -n node01
  pveiface -e https://pve1:8006 rollback -n node01
")]
struct Cli {
    /// API endpoint, e.g. https://pve1.example.com:8006
    #[arg(short, long, global = true)]
    endpoint: Option<String>,

    /// Accept self-signed TLS certificates
    #[arg(short = 'k', long, global = true)]
    insecure: bool,

    /// Request timeout in seconds
    #[arg(long, global = true, default_value_t = 30)]
    timeout: u64,

    /// Enable debug output
    #[arg(short, long, global = true)]
    debug: bool,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Reconcile a declaration batch against a node
    Apply {
        /// Node to reconcile
        #[arg(short, long)]
        node: String,

        /// JSON file with the interface declarations
        #[arg(short, long)]
        config: PathBuf,

        /// Report the pending change set without applying it
        #[arg(long)]
        check: bool,

        /// Apply without committing via a network reload
        #[arg(long)]
        no_reload: bool,
    },

    /// List the node's interface records
    List {
        #[arg(short, long)]
        node: String,
    },

    /// Show a single interface record
    Show {
        #[arg(short, long)]
        node: String,

        /// Interface name
        name: String,
    },

    /// Commit staged interface changes with a network reload
    Reload {
        #[arg(short, long)]
        node: String,
    },

    /// Discard staged interface changes
    Rollback {
        #[arg(short, long)]
        node: String,
    },

    /// Query the status of a node task
    TaskStatus {
        #[arg(short, long)]
        node: String,

        /// Task UPID as returned by reload
        upid: String,
    },
}

/// Accepted declaration file shapes
#[derive(Deserialize)]
#[serde(untagged)]
enum DeclarationFile {
    List(Vec<InterfaceDeclaration>),
    Wrapped { config: Vec<InterfaceDeclaration> },
}

fn load_declarations(path: &Path) -> Result<Vec<InterfaceDeclaration>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading declaration file {}", path.display()))?;
    let file: DeclarationFile = serde_json::from_str(&raw)
        .with_context(|| format!("parsing declaration file {}", path.display()))?;
    Ok(match file {
        DeclarationFile::List(declarations) => declarations,
        DeclarationFile::Wrapped { config } => config,
    })
}

fn build_client(cli: &Cli) -> Result<PveClient> {
    let Some(endpoint) = cli.endpoint.as_deref() else {
        bail!("no API endpoint given, use --endpoint");
    };
    let mut builder = PveClient::builder(endpoint)
        .timeout(Duration::from_secs(cli.timeout))
        .accept_invalid_certs(cli.insecure);
    if let Ok(token) = std::env::var("PVE_API_TOKEN") {
        builder = builder.token(token);
    }
    Ok(builder.build())
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.debug {
        LevelFilter::Debug
    } else if cli.quiet {
        LevelFilter::Error
    } else {
        LevelFilter::Info
    };
    env_logger::Builder::from_default_env()
        .filter_level(level)
        .init();

    let client = build_client(&cli)?;

    match &cli.command {
        Commands::Apply {
            node,
            config,
            check,
            no_reload,
        } => {
            let declarations = load_declarations(config)?;
            let applier = InterfaceApplier::new(client);
            let options = ApplyOptions {
                check_mode: *check,
                reload: !*no_reload,
            };
            let outcome = applier.apply(node, &declarations, &options).await?;
            print_json(&outcome)?;
        }
        Commands::List { node } => {
            let interfaces = client.list_interfaces(node).await?;
            print_json(&interfaces)?;
        }
        Commands::Show { node, name } => {
            let interface = client.get_interface(node, name).await?;
            print_json(&interface)?;
        }
        Commands::Reload { node } => {
            let upid = client.reload_interfaces(node).await?;
            println!("{}", upid);
        }
        Commands::Rollback { node } => {
            client.rollback_interfaces(node).await?;
        }
        Commands::TaskStatus { node, upid } => {
            let status = client.task_status(node, upid).await?;
            print_json(&status)?;
        }
    }

    Ok(())
}
