use clap::Parser;
use colored::*;
use std::process;

use mcpbench::api::HttpChatApi;
use mcpbench::cli::{Cli, Command, Mode};
use mcpbench::config::Config;
use mcpbench::error::{BenchError, Result};
use mcpbench::{modes, registry};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match Config::from_env(cli.verbose) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{} {}", "Error:".red(), e);
            process::exit(1);
        }
    };

    if let Err(e) = run(cli, config).await {
        eprintln!("{} {}", "Error:".red(), e);
        process::exit(1);
    }
}

async fn run(cli: Cli, config: Config) -> Result<()> {
    match cli.command {
        Command::BuildRegistry { code_wrappers } => {
            registry::build_registry(
                &config.servers,
                &config.registry_root,
                code_wrappers,
                config.verbose,
            )
            .await?;
            Ok(())
        }
        Command::Run {
            mode,
            query,
            max_turns,
        } => {
            let api = chat_api(&config)?;
            match mode {
                Mode::Traditional => {
                    modes::traditional::run(&config, &api, &query, max_turns).await?;
                }
                Mode::Discovery => {
                    modes::discovery::run(&config, &api, &query, max_turns).await?;
                }
                Mode::Code => {
                    modes::code::run(&config, &api, &query, max_turns).await?;
                }
            }
            Ok(())
        }
        Command::Compare { query } => {
            let api = chat_api(&config)?;
            modes::compare::run(&config, &api, &query).await
        }
    }
}

fn chat_api(config: &Config) -> Result<HttpChatApi> {
    let api_key = config
        .require_api_key()
        .map_err(BenchError::ConfigError)?;
    HttpChatApi::new(api_key, &config.api_endpoint)
}
