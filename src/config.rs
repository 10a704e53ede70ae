use std::time::Duration;

use clap::Parser;
use config::{Config, Environment, File};
use serde::Deserialize;

use crate::domain::{Identity, User};
use crate::error::ConfigError;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Config file path
    #[arg(short, long, env = "CONFIG_FILE")]
    pub config: Option<String>,

    /// Base URL of the chat backend's HTTP API
    #[arg(long, env = "CHAT_API_URL")]
    pub api_url: Option<String>,

    /// WebSocket URL of the real-time channel
    #[arg(long, env = "CHAT_REALTIME_URL")]
    pub realtime_url: Option<String>,

    /// Bearer token of the signed-in user
    #[arg(long, env = "CHAT_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Id of the signed-in user
    #[arg(long, env = "CHAT_USER_ID")]
    pub user_id: Option<String>,

    /// Conversation to open on start
    #[arg(long)]
    pub conversation: Option<String>,

    /// Emit `leave chat` when switching conversations
    #[arg(long)]
    pub emit_leave_on_switch: Option<bool>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ClientConfig {
    pub api: ApiConfig,
    pub realtime: RealtimeConfig,
    pub typing: TypingConfig,
    pub binding: BindingConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub chat: ChatConfig,
    pub log: LogConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ApiConfig {
    pub base_url: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RealtimeConfig {
    pub url: String,
    /// How long to wait for the `connected` acknowledgment.
    pub connect_timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct TypingConfig {
    pub quiet_period_ms: u64,
}

impl TypingConfig {
    pub fn quiet_period(&self) -> Duration {
        Duration::from_millis(self.quiet_period_ms)
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct BindingConfig {
    pub emit_leave_on_switch: bool,
}

#[derive(Deserialize, Clone, Default)]
pub struct AuthConfig {
    #[serde(default)]
    pub token: String,
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub user_name: String,
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("token", &"<redacted>")
            .field("user_id", &self.user_id)
            .field("user_name", &self.user_name)
            .finish()
    }
}

impl AuthConfig {
    /// The configured identity, if both a token and a user id are set.
    pub fn identity(&self) -> Option<Identity> {
        if self.token.trim().is_empty() || self.user_id.trim().is_empty() {
            return None;
        }
        Some(Identity::new(
            User::new(self.user_id.as_str(), self.user_name.as_str()),
            self.token.clone(),
        ))
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct ChatConfig {
    #[serde(default)]
    pub conversation: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LogConfig {
    /// `pretty` or `json`.
    pub format: String,
}

impl ClientConfig {
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from_args(std::env::args())
    }

    pub fn load_from_args<I, T>(args: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        let cli =
            Cli::try_parse_from(args).map_err(|e| config::ConfigError::Message(e.to_string()))?;

        let mut builder = Config::builder()
            .set_default("api.base_url", "http://127.0.0.1:5000")?
            .set_default("api.timeout_secs", 30)?
            .set_default("realtime.url", "ws://127.0.0.1:5000/ws")?
            .set_default("realtime.connect_timeout_secs", 10)?
            .set_default("typing.quiet_period_ms", 3000)?
            .set_default("binding.emit_leave_on_switch", false)?
            .set_default("log.format", "pretty")?;

        // Explicit file, else ./config.{yaml,toml,json} when present
        builder = match &cli.config {
            Some(path) => builder.add_source(File::with_name(path)),
            None => builder.add_source(File::with_name("config").required(false)),
        };

        // CHATLINE_API__BASE_URL=... -> api.base_url
        builder = builder.add_source(
            Environment::with_prefix("CHATLINE")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        // CLI flags (and their env aliases) win over everything else
        if let Some(url) = cli.api_url {
            builder = builder.set_override("api.base_url", url)?;
        }
        if let Some(url) = cli.realtime_url {
            builder = builder.set_override("realtime.url", url)?;
        }
        if let Some(token) = cli.token {
            builder = builder.set_override("auth.token", token)?;
        }
        if let Some(user_id) = cli.user_id {
            builder = builder.set_override("auth.user_id", user_id)?;
        }
        if let Some(conversation) = cli.conversation {
            builder = builder.set_override("chat.conversation", conversation)?;
        }
        if let Some(leave) = cli.emit_leave_on_switch {
            builder = builder.set_override("binding.emit_leave_on_switch", leave)?;
        }

        Ok(builder.build()?.try_deserialize()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_requires_token_and_user() {
        let mut auth = AuthConfig {
            token: "t".into(),
            user_id: String::new(),
            user_name: "Ana".into(),
        };
        assert!(auth.identity().is_none());

        auth.user_id = "u1".into();
        let identity = auth.identity().unwrap();
        assert_eq!(identity.user.id.as_str(), "u1");
        assert_eq!(identity.token, "t");
    }

    #[test]
    fn test_auth_debug_hides_token() {
        let auth = AuthConfig {
            token: "secret".into(),
            ..AuthConfig::default()
        };
        assert!(!format!("{auth:?}").contains("secret"));
    }
}
