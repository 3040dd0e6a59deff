//! ctlinv CLI
//!
//! Prints a filtered inventory read from an automation controller

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand};
use color_eyre::Result;
use eyre::{WrapErr, eyre};
use tracing::info;
use tracing_subscriber::EnvFilter;

use ctlinv_core::config::ENV_SOURCE;
use ctlinv_core::{ConfigSource, InventoryPlugin, Options};

#[derive(Parser)]
#[command(name = "ctlinv", version)]
#[command(about = "Dynamic inventory from an automation controller", long_about = None)]
struct Cli {
    /// Config file (*controllerx_inventory.yml, *controllerx.toml, ...) or
    /// @controllerx_inventory to read settings from the environment only
    #[arg(short, long, global = true)]
    inventory: Option<String>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the whole inventory as dynamic-inventory JSON
    List {
        /// Pretty-print the JSON
        #[arg(long)]
        pretty: bool,
    },
    /// Print the variables of one host
    Host {
        /// Host name
        name: String,
    },
    /// Print the group tree
    Graph,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.json_logs);

    let source = cli.inventory.unwrap_or_else(default_source);
    let source = ConfigSource::verify(&source)?;
    let options = Options::load(&source, |key| std::env::var(key).ok())
        .wrap_err("failed to resolve configuration")?;

    let plugin = InventoryPlugin::connect(options)?;
    info!(
        host = %plugin.options().host,
        inventory = %plugin.options().inventory,
        "connecting to controller"
    );
    let graph = plugin.run().await.wrap_err("failed to build inventory")?;

    match cli.command {
        Commands::List { pretty } => {
            let json = graph.to_ansible_json();
            let out = if pretty {
                serde_json::to_string_pretty(&json)?
            } else {
                serde_json::to_string(&json)?
            };
            println!("{out}");
        }
        Commands::Host { name } => {
            let vars = graph
                .host_vars(&name)
                .ok_or_else(|| eyre!("host {name} is not in the inventory"))?;
            println!("{}", serde_json::to_string_pretty(vars)?);
        }
        Commands::Graph => {
            print!("{}", graph.render_tree());
        }
    }

    Ok(())
}

/// Logs go to stderr so stdout stays machine-readable
fn init_tracing(verbose: u8, json: bool) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = if verbose > 0 {
        EnvFilter::new(level)
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

/// First config file found in the usual places, else environment only
fn default_source() -> String {
    let paths = [
        PathBuf::from("controllerx_inventory.yml"),
        PathBuf::from("controllerx.yml"),
        dirs::config_dir()
            .map(|p| p.join("ctlinv/controllerx_inventory.yml"))
            .unwrap_or_default(),
    ];

    paths
        .into_iter()
        .find(|path| path.is_file())
        .map(|path| path.display().to_string())
        .unwrap_or_else(|| ENV_SOURCE.to_string())
}
