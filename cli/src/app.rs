use std::collections::HashMap;
use std::io::{self, Write};
use std::time::Duration;

use anyhow::{Context, Result};
use colored::*;
use futures_util::{pin_mut, StreamExt};
use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, info};

use zettel_core::{
    resolve_history, roles, ChatClient, FsVault, HistoryOptions, ZettelConfig,
};

use crate::template::{self, DEFAULT_ANSWER_TEMPLATE, DEFAULT_QUESTION_TEMPLATE};

/// Generate a streamed answer for the given question note: resolve the
/// conversation chain, create the answer note from the template, then
/// append each reply fragment to it as it arrives.
pub async fn generate_answer(vault: &FsVault, config: &ZettelConfig, note: &str) -> Result<()> {
    // Fail on a missing API key before touching the vault or the network
    let client = ChatClient::new(config.clone()).context("Chat client setup failed")?;

    let opts = HistoryOptions::from_config(config);
    let history = resolve_history(vault, note, &opts)
        .await
        .with_context(|| format!("Failed to resolve conversation history for '{}'", note))?;
    info!(
        "Resolved {} turns of history for note '{}'",
        history.len(),
        note
    );

    let answer_name = format!("{}-answer", note);
    let template_content = load_template(vault, "Answer")
        .await
        .unwrap_or_else(|| DEFAULT_ANSWER_TEMPLATE.to_string());

    let mut metadata = HashMap::new();
    metadata.insert("title", answer_name.clone());
    metadata.insert("linked_note", note.to_string());
    let initial_content = template::render(&template_content, &metadata);

    let answer_path = vault
        .create_note(&answer_name, &initial_content)
        .await
        .with_context(|| format!("Failed to create answer note '{}'", answer_name))?;
    debug!("Created answer note at {}", answer_path.display());

    // Display a spinner until the first fragment arrives
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏")
            .template("{spinner} {msg}")
            .unwrap(),
    );
    spinner.set_message("Waiting for answer...");
    spinner.enable_steady_tick(Duration::from_millis(120));

    let stream = client.stream_chat(history);
    pin_mut!(stream);

    let mut received_any = false;
    while let Some(next) = stream.next().await {
        match next {
            Ok(fragment) => {
                if !received_any {
                    spinner.finish_and_clear();
                    received_any = true;
                }
                vault
                    .append(&answer_name, &fragment)
                    .await
                    .context("Failed to append fragment to answer note")?;
                print!("{}", fragment);
                io::stdout().flush().ok();
            }
            Err(e) => {
                spinner.finish_and_clear();
                return Err(e).with_context(|| {
                    format!(
                        "Streaming failed; partial answer kept in {}",
                        answer_path.display()
                    )
                });
            }
        }
    }
    spinner.finish_and_clear();
    println!();
    println!(
        "{} {}",
        "Answer written to".green(),
        answer_path.display()
    );

    Ok(())
}

/// Create a new question note, optionally linked to a parent note so the
/// conversation continues from there.
pub async fn new_question(
    vault: &FsVault,
    _config: &ZettelConfig,
    name: &str,
    parent: Option<&str>,
) -> Result<()> {
    if let Some(parent) = parent {
        if !vault.note_exists(parent) {
            anyhow::bail!("Parent note '{}' does not exist in the vault", parent);
        }
    }

    let template_content = load_template(vault, "Question")
        .await
        .unwrap_or_else(|| DEFAULT_QUESTION_TEMPLATE.to_string());

    let mut metadata = HashMap::new();
    metadata.insert("title", name.to_string());
    metadata.insert(
        "linked_note",
        parent.map(|p| format!("[[{}]] ", p)).unwrap_or_default(),
    );
    let content = template::render(&template_content, &metadata);

    let path = vault
        .create_note(name, &content)
        .await
        .with_context(|| format!("Failed to create question note '{}'", name))?;
    println!(
        "{} {}",
        "Question note created at".green(),
        path.display()
    );

    Ok(())
}

/// Print the resolved conversation history for a note, oldest turn first.
pub async fn show_history(vault: &FsVault, config: &ZettelConfig, note: &str) -> Result<()> {
    let opts = HistoryOptions::from_config(config);
    let history = resolve_history(vault, note, &opts)
        .await
        .with_context(|| format!("Failed to resolve conversation history for '{}'", note))?;

    for turn in &history {
        let label = match turn.role.as_str() {
            roles::SYSTEM => "System".yellow().bold(),
            roles::ASSISTANT => "Assistant".blue().bold(),
            _ => "You".green().bold(),
        };
        println!("{}: {}", label, turn.content.trim_end());
    }

    Ok(())
}

/// Load a template note from `<vault>/Templates/<name>.md`, if present.
async fn load_template(vault: &FsVault, name: &str) -> Option<String> {
    let path = vault.root().join("Templates").join(format!("{}.md", name));
    tokio::fs::read_to_string(path).await.ok()
}
