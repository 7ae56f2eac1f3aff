use std::collections::HashSet;

use tracing::debug;

use crate::config::ZettelConfig;
use crate::errors::{ZettelError, ZettelResult};
use crate::types::{roles, ChatMessage};
use crate::vault::NoteStore;

/// Vault conventions the resolver needs, lifted out of the full config
#[derive(Debug, Clone)]
pub struct HistoryOptions {
    pub system_prompt: String,
    pub notes_heading: String,
    pub answer_tag: String,
    pub max_depth: usize,
}

impl HistoryOptions {
    pub fn from_config(config: &ZettelConfig) -> Self {
        Self {
            system_prompt: config.system_prompt().to_string(),
            notes_heading: config.notes_heading().to_string(),
            answer_tag: config.answer_tag().to_string(),
            max_depth: config.max_chain_depth(),
        }
    }
}

/// Extract a note's conversational payload: everything after the first
/// occurrence of the notes heading. Absent heading means empty payload.
pub fn extract_payload(content: &str, heading: &str) -> String {
    match content.find(heading) {
        Some(idx) => {
            let mut rest = &content[idx + heading.len()..];
            rest = rest.strip_prefix('\r').unwrap_or(rest);
            rest = rest.strip_prefix('\n').unwrap_or(rest);
            rest.to_string()
        }
        None => String::new(),
    }
}

/// Reconstruct the conversation leading up to `note` by walking its
/// parent links, oldest turn first. The result always starts with a
/// single synthetic system turn; the root note is the first user turn.
///
/// The walk is iterative with a visited set and a depth cap, so a
/// malformed cyclic link chain fails with an error instead of hanging.
pub async fn resolve_history(
    store: &dyn NoteStore,
    note: &str,
    opts: &HistoryOptions,
) -> ZettelResult<Vec<ChatMessage>> {
    let mut visited: HashSet<String> = HashSet::new();
    let mut chain: Vec<ChatMessage> = Vec::new();
    let mut current = note.to_string();

    loop {
        if !visited.insert(current.clone()) {
            return Err(ZettelError::CycleDetected(current));
        }
        if chain.len() >= opts.max_depth {
            return Err(ZettelError::ChainTooDeep(opts.max_depth));
        }

        let content = store.read_content(&current).await?;
        let payload = extract_payload(&content, &opts.notes_heading);
        let parent = store.parent_link(&current).await?;

        // The conversation root is always the opening user turn; for
        // every later note the role comes from its tags.
        let role = match parent {
            Some(_) => {
                let tags = store.tags(&current).await?;
                if tags.iter().any(|t| t == &opts.answer_tag) {
                    roles::ASSISTANT
                } else {
                    roles::USER
                }
            }
            None => roles::USER,
        };
        debug!("Resolved turn from note '{}' as {}", current, role);

        chain.push(ChatMessage {
            role: role.to_string(),
            content: payload,
        });

        match parent {
            Some(next) => current = next,
            None => break,
        }
    }

    let mut messages = vec![ChatMessage::system(opts.system_prompt.clone())];
    messages.extend(chain.into_iter().rev());
    Ok(messages)
}
