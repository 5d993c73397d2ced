// # esgob - Esgob DNS hosting command-line client
//
// This binary is a THIN layer over the library crates:
// - Argument parsing and credential resolution (via `ConfigLoader`)
// - Printing results as plain text and tables
// - Logging setup and exit codes
//
// All API and sync logic lives in esgob-client / esgob-core.
//
// ## Configuration
//
// Credentials are resolved per field, highest priority first:
// 1. `--account` / `--key` / `--endpoint`
// 2. `ESGOB_ACCOUNT` / `ESGOB_KEY`
// 3. The config file given with `--config`, or, when account or key is
//    still missing, the first existing of `$HOME/.esgob`, `/etc/esgob`,
//    `/usr/local/etc/esgob`
//
// ## Logging
//
// Logs go to stderr. Level `warn` by default, `debug` with `--verbose`;
// `ESGOB_LOG` takes an `EnvFilter` directive and overrides both.
//
// ## Example
//
// ```bash
// export ESGOB_ACCOUNT=acct
// export ESGOB_KEY=xxxx
//
// esgob slaves
// esgob slaves-sync domains.txt 195.177.253.166 --dry-run
// ```

mod output;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

use esgob_client::EsgobClient;
use esgob_core::{Config, ConfigLoader, SyncEngine};

/// Environment variable holding a tracing filter directive
const LOG_ENV_VAR: &str = "ESGOB_LOG";

/// Exit codes for different termination scenarios
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EsgobExitCode {
    /// Command completed
    Success = 0,
    /// Credentials or config file could not be resolved
    ConfigError = 1,
    /// Server rejection, transport failure or bad input
    RuntimeError = 2,
}

impl From<EsgobExitCode> for ExitCode {
    fn from(code: EsgobExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

#[derive(Debug, Parser)]
#[command(name = "esgob", version, about = "Command-line client for the Esgob DNS hosting API")]
struct Cli {
    /// Account name
    #[arg(short, long, global = true)]
    account: Option<String>,

    /// API key
    #[arg(short, long, global = true)]
    key: Option<String>,

    /// Config file to read instead of the default locations
    #[arg(short, long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// API endpoint
    #[arg(short, long, global = true, value_name = "URL")]
    endpoint: Option<String>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Show account information
    Account,
    /// List all domains
    Domains,
    /// List slave domains and their master IPs
    Slaves,
    /// Add a slave domain
    SlavesAdd { domain: String, masterip: String },
    /// Delete a slave domain
    SlavesDelete { domain: String },
    /// Force a zone transfer from the master
    SlavesTransfer { domain: String },
    /// Change the master IP of a slave domain
    SlavesUpdate { domain: String, masterip: String },
    /// Allow an IP to transfer a slave domain out
    SlavesAxfroutAdd { domain: String, axfrip: String },
    /// Revoke zone transfers out to an IP
    SlavesAxfroutDelete { domain: String, axfrip: String },
    /// Make the slave domains of a master IP match a list of domains
    SlavesSync {
        /// File with one domain per line
        file: PathBuf,
        masterip: String,
        /// Print the planned changes without applying them
        #[arg(long)]
        dry_run: bool,
    },
    /// Check the SOA serial of a domain on the masters and anycast nodes
    Soacheck { domain: String },
    /// Save the resolved account, key and endpoint to a config file
    Config,
    /// Print the version
    Version,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = init_logging(cli.verbose) {
        eprintln!("Failed to set tracing subscriber: {e}");
        return EsgobExitCode::ConfigError.into();
    }

    let rt = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return EsgobExitCode::RuntimeError.into();
        }
    };

    match rt.block_on(run(cli)) {
        Ok(()) => EsgobExitCode::Success.into(),
        Err(e) => {
            eprintln!("=> Error: {e:#}");
            exit_code_for(&e).into()
        }
    }
}

fn init_logging(verbose: bool) -> Result<()> {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_env(LOG_ENV_VAR)
        .unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow::anyhow!("{e}"))
}

fn exit_code_for(e: &anyhow::Error) -> EsgobExitCode {
    match e.downcast_ref::<esgob_core::Error>() {
        Some(err) if err.is_config() => EsgobExitCode::ConfigError,
        _ => EsgobExitCode::RuntimeError,
    }
}

/// Explicit values from the command line
fn explicit_config(cli: &Cli) -> Config {
    let mut config = Config::new();
    config.account = cli.account.clone();
    config.key = cli.key.clone();
    config.endpoint = cli.endpoint.clone();
    config
}

fn config_loader(cli: &Cli) -> ConfigLoader {
    let loader = ConfigLoader::new().with_explicit(explicit_config(cli));
    match &cli.config {
        Some(path) => loader.with_file(path),
        None => loader,
    }
}

async fn run(cli: Cli) -> Result<()> {
    match &cli.command {
        Command::Version => {
            println!("esgob {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        Command::Config => save_config(&cli),
        command => {
            let config = config_loader(&cli).load()?;
            let client = EsgobClient::from_config(&config)?;
            debug!("Using {:?}", client);
            run_command(command, &client).await
        }
    }
}

async fn run_command(command: &Command, client: &EsgobClient) -> Result<()> {
    match command {
        Command::Account => {
            print!("{}", output::account(&client.accounts_get().await?));
        }
        Command::Domains => {
            print!("{}", output::domains(&client.domains_list().await?).render());
        }
        Command::Slaves => {
            print!("{}", output::slaves(&client.domains_slaves_list().await?).render());
        }
        Command::SlavesAdd { domain, masterip } => {
            let result = client.domains_slaves_add(domain, masterip).await?;
            println!("{}", output::action(&result));
        }
        Command::SlavesDelete { domain } => {
            let result = client.domains_slaves_delete(domain).await?;
            println!("{}", output::action(&result));
        }
        Command::SlavesTransfer { domain } => {
            let result = client.domains_slaves_forcetransfer(domain).await?;
            println!("{}", output::action(&result));
        }
        Command::SlavesUpdate { domain, masterip } => {
            let result = client.domains_slaves_updatemasterip(domain, masterip).await?;
            println!("{}", output::action(&result));
        }
        Command::SlavesAxfroutAdd { domain, axfrip } => {
            let result = client.domains_slaves_axfrout_add(domain, axfrip).await?;
            println!("{}", output::action(&result));
        }
        Command::SlavesAxfroutDelete { domain, axfrip } => {
            let result = client.domains_slaves_axfrout_delete(domain, axfrip).await?;
            println!("{}", output::action(&result));
        }
        Command::SlavesSync {
            file,
            masterip,
            dry_run,
        } => {
            let desired = read_domain_file(file)?;
            sync_slaves(client, &desired, masterip, *dry_run).await?;
        }
        Command::Soacheck { domain } => {
            let check = client.domains_tools_soacheck(domain).await?;
            print!("{}", output::soacheck(&check).render());
        }
        // Need no credentials
        Command::Version | Command::Config => {}
    }

    Ok(())
}

async fn sync_slaves(
    client: &EsgobClient,
    desired: &[String],
    masterip: &str,
    dry_run: bool,
) -> Result<()> {
    let engine = SyncEngine::new(client);
    let plan = engine.plan(desired, masterip).await?;

    if plan.is_empty() {
        info!("Slave domains for {} already in sync", masterip);
        return Ok(());
    }

    if dry_run {
        for change in &plan {
            println!("{change}");
        }
        return Ok(());
    }

    engine
        .apply_with(&plan, |result| println!("{}", output::action(result)))
        .await?;
    Ok(())
}

/// Write account, key and endpoint to `--config` or `$HOME/.esgob`
fn save_config(cli: &Cli) -> Result<()> {
    let config = explicit_config(cli).or(Config::from_env());
    config.credentials()?;

    let path = match &cli.config {
        Some(path) => path.clone(),
        None => Config::default_file_paths()
            .into_iter()
            .next()
            .filter(|path| path.ends_with(".esgob"))
            .context("HOME is not set; pass --config FILE")?,
    };

    config.save(&path)?;
    println!("Configuration written to {}", path.display());
    Ok(())
}

fn read_domain_file(path: &Path) -> Result<Vec<String>> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read domain list {}", path.display()))?;
    let domains = parse_domain_list(&contents);
    if domains.is_empty() {
        bail!(
            "{} lists no domains; refusing to delete every slave domain",
            path.display()
        );
    }
    Ok(domains)
}

/// First whitespace-separated token of every non-blank, non-comment line
fn parse_domain_list(contents: &str) -> Vec<String> {
    contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| line.split_whitespace().next())
        .map(str::to_string)
        .collect()
}
