use clap::Parser;
use dotenv::dotenv;
use log::LevelFilter;
use std::error::Error;

use zettel_core::{get_default_config_file, FsVault, ZettelConfig};

mod app;
mod cli;
mod logging;
mod template;

use crate::cli::{Args, Command};
use crate::logging::{log_error, log_info};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // Load .env file if present (for OPENAI_API_KEY)
    dotenv().ok();

    let args = Args::parse();

    let log_level = if args.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    };
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(log_level.to_string()),
    )
    .init();

    // File config, overlaid with command-line overrides
    let config_path = match &args.config {
        Some(path) => path.clone(),
        None => get_default_config_file("zettel")?,
    };
    let file_config = ZettelConfig::load_from_file(&config_path)?;
    let overrides = ZettelConfig {
        api_key: args.api_key.clone(),
        api_url: None,
        model_name: args.model.clone(),
        max_tokens: None,
        system_prompt: None,
        notes_heading: None,
        answer_tag: None,
        max_chain_depth: None,
    };
    let config = file_config.merge(&overrides);
    log_info(&format!("Loaded config from {}", config_path.display()));

    let vault = FsVault::new(&args.vault);

    let result = match &args.command {
        Command::Ask { note } => app::generate_answer(&vault, &config, note).await,
        Command::New { name, parent } => {
            app::new_question(&vault, &config, name, parent.as_deref()).await
        }
        Command::History { note } => app::show_history(&vault, &config, note).await,
    };

    if let Err(e) = result {
        log_error(&format!("{:#}", e));
        std::process::exit(1);
    }

    Ok(())
}
