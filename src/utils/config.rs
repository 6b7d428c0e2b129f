use std::env;

pub const DEFAULT_BASE_URL: &str = "https://restful-booker.herokuapp.com";
pub const DEFAULT_USERNAME: &str = "admin";
pub const DEFAULT_PASSWORD: &str = "password123";

/// Resolve a setting with the precedence: explicit argument > environment > default.
pub fn resolve(explicit: Option<&str>, env_key: &str, default: &str) -> String {
    if let Some(v) = explicit {
        if !v.is_empty() {
            return v.to_string();
        }
    }
    match env::var(env_key) {
        Ok(v) if !v.is_empty() => v,
        _ => default.to_string(),
    }
}

/// Booking service configuration, injected into the API clients.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub base_url: String,
    pub username: String,
    pub password: String,
}

impl ServiceConfig {
    pub fn resolve(explicit_base: Option<&str>) -> Self {
        Self {
            base_url: resolve(explicit_base, "BOOKER_BASE_URL", DEFAULT_BASE_URL),
            username: resolve(None, "BOOKER_USER", DEFAULT_USERNAME),
            password: resolve(None, "BOOKER_PASS", DEFAULT_PASSWORD),
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }
}

/// Notification targets. Resolved from the environment at dispatch time, not
/// stored state, so target presence is decided per run.
#[derive(Debug, Clone, Default)]
pub struct NotifyConfig {
    pub slack_webhook_url: Option<String>,
    pub slack_bot_token: Option<String>,
    pub teams_webhook_url: Option<String>,
}

impl NotifyConfig {
    pub fn from_env() -> Self {
        Self {
            slack_webhook_url: non_empty_env("SLACK_WEBHOOK_URL"),
            slack_bot_token: non_empty_env("SLACK_BOT_TOKEN"),
            teams_webhook_url: non_empty_env("TEAMS_WEBHOOK_URL"),
        }
    }
}

fn non_empty_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.is_empty())
}
