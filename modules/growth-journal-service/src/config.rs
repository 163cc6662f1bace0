use chrono::NaiveDate;
use std::env;

/// Credentials and endpoint for one hosted model provider
#[derive(Debug, Clone, Default)]
pub struct ProviderConfig {
    pub api_key: Option<String>,
    pub endpoint: Option<String>,
    pub model: Option<String>,
}

impl ProviderConfig {
    fn from_env(prefix: &str) -> Self {
        Self {
            api_key: non_empty_var(&format!("{}_API_KEY", prefix)),
            endpoint: non_empty_var(&format!("{}_ENDPOINT", prefix)),
            model: non_empty_var(&format!("{}_MODEL", prefix)),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub db_path: String,
    pub child_name: String,
    pub child_birthday: Option<NaiveDate>,
    pub ai_timeout_secs: u64,
    pub openai: ProviderConfig,
    pub claude: ProviderConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 9110,
            db_path: "./growth_journal.db".to_string(),
            child_name: "哈哈".to_string(),
            child_birthday: None,
            ai_timeout_secs: 60,
            openai: ProviderConfig::default(),
            claude: ProviderConfig::default(),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let child_birthday = non_empty_var("GROWTH_JOURNAL_CHILD_BIRTHDAY").and_then(|s| {
            match NaiveDate::parse_from_str(&s, "%Y-%m-%d") {
                Ok(d) => Some(d),
                Err(e) => {
                    log::warn!("Ignoring GROWTH_JOURNAL_CHILD_BIRTHDAY={:?}: {}", s, e);
                    None
                }
            }
        });

        Self {
            port: env::var("GROWTH_JOURNAL_PORT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.port),
            db_path: non_empty_var("GROWTH_JOURNAL_DB_PATH").unwrap_or(defaults.db_path),
            child_name: non_empty_var("GROWTH_JOURNAL_CHILD_NAME").unwrap_or(defaults.child_name),
            child_birthday,
            ai_timeout_secs: env::var("GROWTH_JOURNAL_AI_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.ai_timeout_secs),
            openai: ProviderConfig::from_env("OPENAI"),
            claude: ProviderConfig::from_env("ANTHROPIC"),
        }
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}
