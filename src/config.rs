use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub db: DbConfig,
    pub server: ServerConfig,
    pub owner: OwnerConfig,
    #[serde(default)]
    pub agent: AgentConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DbConfig {
    pub path: PathBuf,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub bind: String,
}

/// The person the knowledge base is about. Used by descriptive-metadata
/// defaults, the assistant persona, and the availability/meeting tools.
#[derive(Debug, Deserialize, Clone)]
pub struct OwnerConfig {
    pub name: String,
    pub email: String,
    #[serde(default = "default_headline")]
    pub headline: String,
}

fn default_headline() -> String {
    "Full-Stack Engineer".to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct AgentConfig {
    /// OpenAI-compatible chat completions base URL.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_model")]
    pub model: String,
    /// Name of the environment variable holding the API key.
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
    /// Hard bound on reasoning/tool round trips per conversational turn.
    #[serde(default = "default_max_rounds")]
    pub max_rounds: u32,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            model: default_model(),
            api_key_env: default_api_key_env(),
            max_rounds: default_max_rounds(),
            max_retries: default_max_retries(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_base_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta/openai".to_string()
}
fn default_model() -> String {
    "gemini-2.5-flash".to_string()
}
fn default_api_key_env() -> String {
    "FOLIO_API_KEY".to_string()
}
fn default_max_rounds() -> u32 {
    6
}
fn default_max_retries() -> u32 {
    3
}
fn default_timeout_secs() -> u64 {
    60
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;

    if config.server.bind.trim().is_empty() {
        anyhow::bail!("server.bind must not be empty");
    }

    if config.owner.name.trim().is_empty() {
        anyhow::bail!("owner.name must not be empty");
    }

    if config.agent.max_rounds < 1 {
        anyhow::bail!("agent.max_rounds must be >= 1");
    }

    if config.agent.model.trim().is_empty() {
        anyhow::bail!("agent.model must not be empty");
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_config(dir: &Path, body: &str) -> PathBuf {
        let path = dir.join("folio.toml");
        std::fs::write(&path, body).unwrap();
        path
    }

    #[test]
    fn parse_minimal_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(
            dir.path(),
            r#"
[db]
path = "data/folio.sqlite"

[server]
bind = "127.0.0.1:8750"

[owner]
name = "Jordan Reyes"
email = "jordan@example.com"
"#,
        );

        let config = load_config(&path).unwrap();
        assert_eq!(config.owner.name, "Jordan Reyes");
        assert_eq!(config.agent.max_rounds, 6);
        assert_eq!(config.agent.api_key_env, "FOLIO_API_KEY");
    }

    #[test]
    fn reject_zero_rounds() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(
            dir.path(),
            r#"
[db]
path = "data/folio.sqlite"

[server]
bind = "127.0.0.1:8750"

[owner]
name = "Jordan Reyes"
email = "jordan@example.com"

[agent]
max_rounds = 0
"#,
        );

        assert!(load_config(&path).is_err());
    }

    #[test]
    fn reject_empty_bind() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(
            dir.path(),
            r#"
[db]
path = "data/folio.sqlite"

[server]
bind = ""

[owner]
name = "Jordan Reyes"
email = "jordan@example.com"
"#,
        );

        assert!(load_config(&path).is_err());
    }
}
