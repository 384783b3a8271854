use serde::Deserialize;
use std::fs;
use std::path::Path;
use thiserror::Error;

pub const CONFIG_FILE: &str = ".pr-police.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Missing required setting: {0}")]
    Missing(&'static str),
}

/// Top-level configuration loaded from .pr-police.toml.
/// All fields are optional; secrets usually arrive through the environment.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub github: GitHubConfig,

    #[serde(default)]
    pub slack: SlackConfig,

    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub leaderboard: LeaderboardConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GitHubConfig {
    /// GitHub API token. If None, falls back to GH_TOKEN then GITHUB_TOKEN.
    pub token: Option<String>,
    pub owner: String,
    pub repo: String,
    /// Branch whose head commit the summary reports on
    pub main_branch: String,
    pub api_base: String,
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            token: None,
            owner: "cerbyinc".to_string(),
            repo: "platform".to_string(),
            main_branch: "main".to_string(),
            api_base: "https://api.github.com".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SlackConfig {
    /// Bot OAuth token (xoxb-...). Falls back to SLACK_BOT_TOKEN.
    pub bot_token: Option<String>,
    /// Falls back to SLACK_SIGNING_SECRET.
    pub signing_secret: Option<String>,
    pub api_base: String,
}

impl Default for SlackConfig {
    fn default() -> Self {
        Self {
            bot_token: None,
            signing_secret: None,
            api_base: "https://slack.com/api".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { port: 3000 }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LeaderboardConfig {
    /// Upper bound on review requests in flight at once
    pub concurrency: usize,
}

impl Default for LeaderboardConfig {
    fn default() -> Self {
        Self { concurrency: 8 }
    }
}

impl Config {
    /// Load configuration from .pr-police.toml in the current directory,
    /// then fill unset secrets from the environment.
    /// Returns default config if the file doesn't exist.
    pub fn load() -> Result<Config, ConfigError> {
        let path = Path::new(CONFIG_FILE);
        let mut config = if path.exists() {
            Self::load_from(path)?
        } else {
            Config::default()
        };

        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Load from a specific path (useful for testing).
    pub fn load_from(path: &Path) -> Result<Config, ConfigError> {
        let contents = fs::read_to_string(path)?;
        let config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Values from the file take precedence over the environment, except PORT
    /// which the hosting platform assigns.
    fn apply_env(&mut self, var: impl Fn(&str) -> Option<String>) {
        if self.github.token.is_none() {
            self.github.token = var("GH_TOKEN").or_else(|| var("GITHUB_TOKEN"));
        }
        if self.slack.bot_token.is_none() {
            self.slack.bot_token = var("SLACK_BOT_TOKEN");
        }
        if self.slack.signing_secret.is_none() {
            self.slack.signing_secret = var("SLACK_SIGNING_SECRET");
        }
        if let Some(port) = var("PORT").and_then(|p| p.parse().ok()) {
            self.server.port = port;
        }
    }

    pub fn github_token(&self) -> Result<&str, ConfigError> {
        self.github
            .token
            .as_deref()
            .ok_or(ConfigError::Missing("github.token (or GH_TOKEN)"))
    }

    pub fn slack_bot_token(&self) -> Result<&str, ConfigError> {
        self.slack
            .bot_token
            .as_deref()
            .ok_or(ConfigError::Missing("slack.bot_token (or SLACK_BOT_TOKEN)"))
    }

    pub fn slack_signing_secret(&self) -> Result<&str, ConfigError> {
        self.slack
            .signing_secret
            .as_deref()
            .ok_or(ConfigError::Missing(
                "slack.signing_secret (or SLACK_SIGNING_SECRET)",
            ))
    }

    /// Web page listing the repository's pull requests.
    pub fn pulls_page_url(&self) -> String {
        format!(
            "https://github.com/{}/{}/pulls",
            self.github.owner, self.github.repo
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.github.token.is_none());
        assert_eq!(config.github.owner, "cerbyinc");
        assert_eq!(config.github.repo, "platform");
        assert_eq!(config.github.main_branch, "main");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.leaderboard.concurrency, 8);
    }

    #[test]
    fn test_parse_config_toml() {
        let toml_str = r#"
[github]
owner = "acme"
repo = "widgets"

[leaderboard]
concurrency = 4
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.github.owner, "acme");
        assert_eq!(config.github.repo, "widgets");
        // Unset keys inside a present table keep their defaults
        assert_eq!(config.github.main_branch, "main");
        assert_eq!(config.leaderboard.concurrency, 4);
        assert_eq!(config.slack.api_base, "https://slack.com/api");
    }

    #[test]
    fn test_env_fills_missing_secrets() {
        let env: HashMap<&str, &str> = [
            ("GITHUB_TOKEN", "gh-fallback"),
            ("SLACK_BOT_TOKEN", "xoxb-1"),
            ("SLACK_SIGNING_SECRET", "shh"),
            ("PORT", "8080"),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        config.apply_env(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.github_token().unwrap(), "gh-fallback");
        assert_eq!(config.slack_bot_token().unwrap(), "xoxb-1");
        assert_eq!(config.slack_signing_secret().unwrap(), "shh");
        assert_eq!(config.server.port, 8080);
    }

    #[test]
    fn test_gh_token_preferred_and_file_wins() {
        let env: HashMap<&str, &str> = [("GH_TOKEN", "gh"), ("GITHUB_TOKEN", "github")]
            .into_iter()
            .collect();

        let mut config = Config::default();
        config.apply_env(|key| env.get(key).map(|v| v.to_string()));
        assert_eq!(config.github_token().unwrap(), "gh");

        let mut config = Config::default();
        config.github.token = Some("from-file".to_string());
        config.apply_env(|key| env.get(key).map(|v| v.to_string()));
        assert_eq!(config.github_token().unwrap(), "from-file");
    }

    #[test]
    fn test_missing_secret_is_an_error() {
        let config = Config::default();
        assert!(matches!(
            config.slack_bot_token(),
            Err(ConfigError::Missing(_))
        ));
    }

    #[test]
    fn test_pulls_page_url() {
        assert_eq!(
            Config::default().pulls_page_url(),
            "https://github.com/cerbyinc/platform/pulls"
        );
    }
}
