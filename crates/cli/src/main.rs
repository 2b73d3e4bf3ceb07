//! Command line entry point for the Everlong bots.
use anyhow::Result;
use clap::{Parser, Subcommand};
use dotenv::dotenv;
use everlong_execution::alerts::{LogNotifier, MultiNotifier, WebhookNotifier, report_fatal};
use everlong_protocols::rpc::chain_label;
use std::sync::Arc;
use tracing::warn;
use tracing_subscriber::EnvFilter;

mod commands;
mod config;

use config::{ALERT_WEBHOOK, Env, RPC_URI};

#[derive(Parser)]
#[command(name = "everlong-bots")]
#[command(about = "Keeper, deployment and fuzzing bots for Everlong vaults", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the keeper loop against the configured chain
    Keeper {
        /// Seconds between keeper ticks
        #[arg(long, default_value_t = 3600)]
        check_period: u64,

        /// Simulate each call before submitting it (default)
        #[arg(long, overrides_with = "no_dry_run")]
        dry_run_first: bool,

        /// Submit without simulating first
        #[arg(long, overrides_with = "dry_run_first")]
        no_dry_run: bool,
    },
    /// Deploy the role manager, keeper, strategies and vaults with forge
    Deploy {
        /// Number of strategy/vault pairs
        #[arg(short, long, default_value_t = 2)]
        num_vaults: usize,

        /// Keep previous deploy outputs
        #[arg(long)]
        no_clean: bool,
    },
    /// Fork the chain locally, deploy, and trade against the vaults at random
    Fuzz {
        /// Number of trading agents
        #[arg(short = 'a', long, default_value_t = 4)]
        num_agents: usize,

        /// Number of strategy/vault pairs
        #[arg(short, long, default_value_t = 2)]
        num_vaults: usize,

        /// RNG seed. Random when omitted.
        #[arg(long)]
        seed: Option<u64>,

        /// Stop after this many iterations
        #[arg(long)]
        iterations: Option<u64>,

        /// Port for the local anvil fork
        #[arg(long, default_value_t = 9999)]
        port: u16,
    },
}

/// Simulation is on unless `--no-dry-run` was the last of the pair given.
fn dry_run_enabled(dry_run_first: bool, no_dry_run: bool) -> bool {
    dry_run_first || !no_dry_run
}

impl Commands {
    fn bot_name(&self) -> &'static str {
        match self {
            Commands::Fuzz { .. } => "Fuzz Everlong",
            _ => "Everlong Bot",
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let env = Env::process();
    let bot_name = cli.command.bot_name();

    let result = match cli.command {
        Commands::Keeper {
            check_period,
            dry_run_first,
            no_dry_run,
        } => {
            let dry_run = dry_run_enabled(dry_run_first, no_dry_run);
            commands::keeper(&env, check_period, dry_run).await
        }
        Commands::Deploy {
            num_vaults,
            no_clean,
        } => commands::deploy(&env, num_vaults, !no_clean).await,
        Commands::Fuzz {
            num_agents,
            num_vaults,
            seed,
            iterations,
            port,
        } => {
            let options = commands::FuzzOptions {
                num_agents,
                num_vaults,
                seed: seed.unwrap_or_else(rand::random),
                iterations,
                port,
            };
            commands::fuzz(&env, options).await
        }
    };

    if let Err(err) = &result {
        let notifier = notifier(&env);
        let rpc_uri = env.optional(RPC_URI);
        report_fatal(&notifier, bot_name, rpc_uri.as_deref().map(chain_label), err).await;
    }
    result
}

/// Log alerts always; webhook alerts when one is configured and can be built.
fn notifier<F: Fn(&str) -> Option<String>>(env: &Env<F>) -> MultiNotifier {
    let notifier = MultiNotifier::new().with(Arc::new(LogNotifier));
    let Some(url) = env.optional(ALERT_WEBHOOK) else {
        return notifier;
    };
    match WebhookNotifier::new(url) {
        Ok(webhook) => notifier.with(Arc::new(webhook)),
        Err(err) => {
            warn!(error = %err, "Alert webhook unavailable, alerting to the log only");
            notifier
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_keeper_defaults() {
        let cli = Cli::try_parse_from(["everlong-bots", "keeper"]).unwrap();
        match cli.command {
            Commands::Keeper {
                check_period,
                no_dry_run,
                ..
            } => {
                assert_eq!(check_period, 3600);
                assert!(!no_dry_run);
            }
            _ => panic!("expected keeper command"),
        }
    }

    fn dry_run_from(args: &[&str]) -> bool {
        let argv = ["everlong-bots", "keeper"]
            .into_iter()
            .chain(args.iter().copied());
        match Cli::try_parse_from(argv).unwrap().command {
            Commands::Keeper {
                dry_run_first,
                no_dry_run,
                ..
            } => dry_run_enabled(dry_run_first, no_dry_run),
            _ => panic!("expected keeper command"),
        }
    }

    #[test]
    fn test_dry_run_flags_last_one_wins() {
        assert!(dry_run_from(&[]));
        assert!(dry_run_from(&["--dry-run-first"]));
        assert!(!dry_run_from(&["--no-dry-run"]));
        assert!(dry_run_from(&["--no-dry-run", "--dry-run-first"]));
        assert!(!dry_run_from(&["--dry-run-first", "--no-dry-run"]));
    }

    #[test]
    fn test_notifier_adds_webhook_when_configured() {
        let env = Env::new(|_: &str| None);
        assert_eq!(notifier(&env).len(), 1);

        let env = Env::new(|key: &str| {
            (key == ALERT_WEBHOOK).then(|| "http://127.0.0.1:9/hook".to_string())
        });
        assert_eq!(notifier(&env).len(), 2);
    }

    #[test]
    fn test_fuzz_bot_name() {
        let cli = Cli::try_parse_from(["everlong-bots", "fuzz", "--seed", "7"]).unwrap();
        assert_eq!(cli.command.bot_name(), "Fuzz Everlong");
    }
}
