//! oxide-routes CLI
//!
//! Command-line tool for inspecting route configurations.

use std::collections::BTreeMap;
use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::{Level, info, warn};
use tracing_subscriber::FmtSubscriber;

use oxide_routes::{Params, RoutesConfig, redirect_status_line};

/// Inspect and exercise route tables.
#[derive(Parser)]
#[command(name = "oxide-routes")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Route configuration file (JSON).
    #[arg(short, long, env = "OXIDE_ROUTES_CONFIG", default_value = "routes.json")]
    config: PathBuf,

    /// Enable verbose output.
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the address of a named route.
    Url {
        /// Route name.
        route: String,

        /// Route params as key=value pairs.
        #[arg(value_parser = parse_pair)]
        params: Vec<(String, String)>,
    },

    /// Extract the params encoded in an address.
    Params {
        /// Address relative to the URL root.
        address: String,
    },

    /// Show the redirect issued for a named route.
    Redirect {
        /// Route name.
        route: String,

        /// Route params as key=value pairs.
        #[arg(value_parser = parse_pair)]
        params: Vec<(String, String)>,

        /// HTTP status.
        #[arg(short, long, default_value_t = 302)]
        status: u16,
    },

    /// Validate the configuration and list its routes.
    Check,
}

fn parse_pair(s: &str) -> Result<(String, String), String> {
    s.split_once('=')
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .ok_or_else(|| format!("expected key=value, got `{s}`"))
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let log_level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config = RoutesConfig::load(&cli.config)
        .with_context(|| format!("loading {}", cli.config.display()))?;
    let table = config.table()?;

    match cli.command {
        Commands::Url { route, params } => {
            if table.get(&route).is_none() {
                warn!("Unknown route `{route}`, address is empty");
            }
            let attrs: Params = params.into_iter().collect();
            println!("{}", table.build_address(&route, &attrs));
        }

        Commands::Params { address } => {
            let params = table.extract_params(&address);
            let sorted: BTreeMap<_, _> = params.iter().collect();
            println!("{}", serde_json::to_string_pretty(&sorted)?);
        }

        Commands::Redirect {
            route,
            params,
            status,
        } => {
            let attrs: Params = params.into_iter().collect();
            let response = config.redirector()?.response(&route, &attrs, status);
            if let Some(line) = redirect_status_line(status) {
                println!("{line}");
            }
            println!("Location: {}", response.location().unwrap_or_default());
        }

        Commands::Check => {
            info!("{} routes in {}", table.len(), cli.config.display());
            for route in table.iter() {
                println!("{:<24} {}", route.name(), route.url());
                for rule in route.extend_rules() {
                    println!("{:<24}   -> {} if {}", "", rule.route, rule.requires.join(" & "));
                }
            }
        }
    }

    Ok(())
}
