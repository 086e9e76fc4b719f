#![allow(clippy::exit)]

mod cli;
mod commands;
mod config;
mod context;
mod output;
mod timing;

use anyhow::Result;
use clap::Parser as _;

use crate::cli::{Cli, Commands};
use crate::commands::{
    generate_completions, run_login, run_logout, run_push, run_register, run_status, run_table,
    run_upload, run_validate,
};
use crate::context::AppContext;
use crate::output::Output;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    timing::init_tracing(cli.verbose, cli.timing);

    if let Err(e) = run(cli).await {
        Output::new().error(format!("{e:#}"));
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let command = match cli.command {
        Commands::Completions { shell } => {
            generate_completions(shell, &mut std::io::stdout());
            return Ok(());
        }
        command => command,
    };

    let AppContext { client, store } = AppContext::init(cli.api_url)?;

    match command {
        Commands::Login { email, password } => run_login(&client, email, password).await,
        Commands::Register(args) => run_register(&client, args).await,
        Commands::Logout => run_logout(&client),
        Commands::Status => run_status(&client).await,
        Commands::Validate { kind, number } => run_validate(&client, kind, &number).await,
        Commands::Upload { endpoint, file } => run_upload(&client, &endpoint, &file).await,
        Commands::Push { action } => run_push(&client, action).await,
        Commands::Table(args) => run_table(&client, store, &args).await,
        Commands::Completions { .. } => Ok(()),
    }
}
