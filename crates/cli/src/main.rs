// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! prov - provisioning job runner

mod commands;
mod env;
mod exit_error;
mod logging;
mod output;

use output::OutputFormat;

use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use commands::{auth::AuthArgs, job, query};
use prov_adapters::{TokioRunner, TracedRunner};
use prov_engine::{EngineConfig, ProvisionOrchestrator};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "prov",
    version,
    about = "Run provisioning jobs through the external provisioning tool"
)]
struct Cli {
    /// Output format
    #[arg(
        short = 'o',
        long = "output",
        value_enum,
        default_value_t,
        global = true
    )]
    output: OutputFormat,

    /// Also write logs to stderr
    #[arg(long, global = true)]
    verbose: bool,

    /// User for the provisioning tool [default: $PROV_USER]
    #[arg(long, global = true)]
    user: Option<String>,

    /// Password for the provisioning tool [default: $PROV_PASSWORD]
    #[arg(long, global = true)]
    password: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a provision from a request file
    Create(job::CreateArgs),
    /// Delete a provision
    Delete(job::TargetArgs),
    /// Re-run configuration of a provision
    Configure(job::TargetArgs),
    /// Print the recorded tool output of a provision
    Log {
        /// Provision id
        id: String,
    },
    /// List provisions known to the tool
    List,
    /// Show one provision as the tool sees it
    Show {
        /// Provision id
        id: String,
    },
    /// Show the local state of a provision's job directory
    Status {
        /// Provision id
        id: String,
    },
    /// List default provision templates
    Defaults {
        /// Templates directory [default: from config]
        dir: Option<PathBuf>,
    },
}

impl Commands {
    /// Whether the command invokes the provisioning tool.
    fn needs_credentials(&self) -> bool {
        matches!(
            self,
            Commands::Create(_)
                | Commands::Delete(_)
                | Commands::Configure(_)
                | Commands::List
                | Commands::Show { .. }
        )
    }
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        let code = e
            .downcast_ref::<exit_error::ExitError>()
            .map_or(1, |c| c.code);
        let msg = format_error(&e);
        if !msg.is_empty() {
            eprintln!("Error: {}", msg);
        }
        std::process::exit(code);
    }
}

/// Format an anyhow error, deduplicating the chain.
///
/// The `Caused by` chain is skipped when every cause already appears in
/// the top-level message.
fn format_error(err: &anyhow::Error) -> String {
    let top = err.to_string();

    let chain_redundant = err
        .chain()
        .skip(1)
        .all(|cause| top.contains(&cause.to_string()));

    if chain_redundant {
        return top;
    }

    let mut buf = top;
    for (i, cause) in err.chain().skip(1).enumerate() {
        buf.push_str(&format!("\n\nCaused by:\n    {}: {}", i, cause));
    }
    buf
}

fn cli_command() -> clap::Command {
    Cli::command()
}

async fn run() -> Result<()> {
    let cli = Cli::parse();
    let format = cli.output;

    let Some(command) = cli.command else {
        cli_command().print_help()?;
        println!();
        return Ok(());
    };

    let state_dir = prov_engine::env::state_dir()?;
    let _log_guard = logging::setup_logging(&state_dir, cli.verbose)?;

    let config = EngineConfig::load()?;
    let creds = if command.needs_credentials() {
        let auth = AuthArgs {
            user: cli.user,
            password: cli.password,
            endpoint: config.endpoint.clone(),
        };
        Some(auth.with_env_fallback().credentials()?)
    } else {
        None
    };

    let runner = TracedRunner::new(TokioRunner::new().with_sync_timeout(config.sync_timeout()));
    let orch = ProvisionOrchestrator::new(runner, &config)?;
    tracing::debug!(root = %orch.directories().root().display(), "orchestrator ready");

    match (command, creds) {
        (Commands::Create(args), Some(creds)) => job::create(&orch, args, &creds, format).await,
        (Commands::Delete(args), Some(creds)) => job::delete(&orch, args, &creds, format).await,
        (Commands::Configure(args), Some(creds)) => {
            job::configure(&orch, args, &creds, format).await
        }
        (Commands::List, Some(creds)) => query::list(&orch, &creds).await,
        (Commands::Show { id }, Some(creds)) => query::show(&orch, &id, &creds).await,
        (Commands::Log { id }, _) => query::log(&orch, &id, format),
        (Commands::Status { id }, _) => query::status(&orch, &id, format),
        (Commands::Defaults { dir }, _) => query::defaults(&orch, dir.as_deref(), format),
        (_, None) => anyhow::bail!("missing credentials"),
    }
}

#[cfg(test)]
#[path = "main_tests.rs"]
mod tests;
