use crate::errors::ZettelResult;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_API_URL: &str = "https://api.openai.com/v1/chat/completions";
pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";
pub const DEFAULT_MAX_TOKENS: u32 = 2048;
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful assistant.";
pub const DEFAULT_NOTES_HEADING: &str = "## Notes:";
pub const DEFAULT_ANSWER_TAG: &str = "#answer";
pub const DEFAULT_MAX_CHAIN_DEPTH: usize = 128;

/// Configuration struct for the chat API and vault conventions
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ZettelConfig {
    pub api_key: Option<String>,
    pub api_url: Option<String>,
    pub model_name: Option<String>,
    pub max_tokens: Option<u32>,
    pub system_prompt: Option<String>,
    /// Heading literal that marks the start of a note's conversational payload
    pub notes_heading: Option<String>,
    /// Tag marking a note as an assistant answer; anything else is a user turn
    pub answer_tag: Option<String>,
    /// Upper bound on the parent-link chain length
    pub max_chain_depth: Option<usize>,
}

impl Default for ZettelConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_url: Some(DEFAULT_API_URL.to_string()),
            model_name: Some(DEFAULT_MODEL.to_string()),
            max_tokens: Some(DEFAULT_MAX_TOKENS),
            system_prompt: Some(DEFAULT_SYSTEM_PROMPT.to_string()),
            notes_heading: Some(DEFAULT_NOTES_HEADING.to_string()),
            answer_tag: Some(DEFAULT_ANSWER_TAG.to_string()),
            max_chain_depth: Some(DEFAULT_MAX_CHAIN_DEPTH),
        }
    }
}

impl ZettelConfig {
    /// Loads configuration from a file if it exists, otherwise returns the default config
    pub fn load_from_file(path: &Path) -> ZettelResult<Self> {
        if path.exists() {
            let content = fs::read_to_string(path).map_err(|e| {
                crate::errors::ZettelError::ConfigError(format!(
                    "Failed to read config file: {}",
                    e
                ))
            })?;

            let config: Self = toml::from_str(&content).map_err(|e| {
                crate::errors::ZettelError::ConfigError(format!(
                    "Failed to parse config file: {}",
                    e
                ))
            })?;

            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    /// Saves configuration to a file
    pub fn save_to_file(&self, path: &Path) -> ZettelResult<()> {
        let content = toml::to_string(self).map_err(|e| {
            crate::errors::ZettelError::ConfigError(format!("Failed to serialize config: {}", e))
        })?;

        // Ensure the directory exists
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                crate::errors::ZettelError::ConfigError(format!(
                    "Failed to create config directory: {}",
                    e
                ))
            })?;
        }

        fs::write(path, content).map_err(|e| {
            crate::errors::ZettelError::ConfigError(format!("Failed to write config file: {}", e))
        })?;

        Ok(())
    }

    /// Merges this config with another config, preferring values from the other config if present
    pub fn merge(&self, other: &Self) -> Self {
        Self {
            api_key: other.api_key.clone().or_else(|| self.api_key.clone()),
            api_url: other.api_url.clone().or_else(|| self.api_url.clone()),
            model_name: other.model_name.clone().or_else(|| self.model_name.clone()),
            max_tokens: other.max_tokens.or(self.max_tokens),
            system_prompt: other
                .system_prompt
                .clone()
                .or_else(|| self.system_prompt.clone()),
            notes_heading: other
                .notes_heading
                .clone()
                .or_else(|| self.notes_heading.clone()),
            answer_tag: other.answer_tag.clone().or_else(|| self.answer_tag.clone()),
            max_chain_depth: other.max_chain_depth.or(self.max_chain_depth),
        }
    }

    pub fn api_url(&self) -> &str {
        self.api_url.as_deref().unwrap_or(DEFAULT_API_URL)
    }

    pub fn model_name(&self) -> &str {
        self.model_name.as_deref().unwrap_or(DEFAULT_MODEL)
    }

    pub fn max_tokens(&self) -> u32 {
        self.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS)
    }

    pub fn system_prompt(&self) -> &str {
        self.system_prompt.as_deref().unwrap_or(DEFAULT_SYSTEM_PROMPT)
    }

    pub fn notes_heading(&self) -> &str {
        self.notes_heading.as_deref().unwrap_or(DEFAULT_NOTES_HEADING)
    }

    pub fn answer_tag(&self) -> &str {
        self.answer_tag.as_deref().unwrap_or(DEFAULT_ANSWER_TAG)
    }

    pub fn max_chain_depth(&self) -> usize {
        self.max_chain_depth.unwrap_or(DEFAULT_MAX_CHAIN_DEPTH)
    }
}

/// Helper function to get default config directory
pub fn get_default_config_dir(app_name: &str) -> ZettelResult<PathBuf> {
    let home_dir = dirs::home_dir().ok_or_else(|| {
        crate::errors::ZettelError::ConfigError("Could not determine home directory".to_string())
    })?;

    let config_dir = home_dir.join(".config").join(app_name);

    Ok(config_dir)
}

/// Helper function to get default config file path
pub fn get_default_config_file(app_name: &str) -> ZettelResult<PathBuf> {
    let config_dir = get_default_config_dir(app_name)?;
    Ok(config_dir.join("config.toml"))
}
