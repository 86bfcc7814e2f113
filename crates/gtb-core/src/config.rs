use std::{env, fs, path::Path, time::Duration};

use crate::{errors::Error, Result};

/// Typed configuration for the bot process.
#[derive(Clone, Debug)]
pub struct Config {
    pub telegram_bot_token: String,
    /// Override for the Bot API base URL (self-hosted Bot API servers, tests).
    pub telegram_api_url: Option<String>,

    // Polling
    pub poll_timeout: Duration,
    pub poll_retry_delay: Duration,

    // Outbound
    pub send_timeout: Duration,
}

impl Config {
    pub fn load() -> Result<Self> {
        load_dotenv_if_present(Path::new(".env"));
        Self::from_lookup(env_str)
    }

    /// Build the config from an arbitrary key lookup (the process env in `load`).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let telegram_bot_token = lookup("TELEGRAM_BOT_TOKEN").unwrap_or_default();
        if telegram_bot_token.trim().is_empty() {
            return Err(Error::Config(
                "TELEGRAM_BOT_TOKEN environment variable is required".to_string(),
            ));
        }
        let telegram_api_url = lookup("TELEGRAM_API_URL").and_then(non_empty);

        let poll_timeout =
            Duration::from_secs(parse_u64(lookup("POLL_TIMEOUT_SECS")).unwrap_or(60));
        let poll_retry_delay =
            Duration::from_millis(parse_u64(lookup("POLL_RETRY_DELAY_MS")).unwrap_or(1000));
        let send_timeout =
            Duration::from_millis(parse_u64(lookup("SEND_TIMEOUT_MS")).unwrap_or(10_000));

        Ok(Self {
            telegram_bot_token: telegram_bot_token.trim().to_string(),
            telegram_api_url,
            poll_timeout,
            poll_retry_delay,
            send_timeout,
        })
    }
}

fn env_str(key: &str) -> Option<String> {
    env::var(key).ok()
}

fn load_dotenv_if_present(path: &Path) {
    let Ok(contents) = fs::read_to_string(path) else {
        return;
    };

    for (key, val) in parse_dotenv(&contents) {
        if env::var_os(&key).is_some() {
            continue; // do not override existing env
        }
        env::set_var(key, val);
    }
}

fn parse_dotenv(contents: &str) -> Vec<(String, String)> {
    let mut out = Vec::new();
    for raw in contents.lines() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let Some((k, v)) = line.split_once('=') else {
            continue;
        };

        let key = k.trim();
        if key.is_empty() {
            continue;
        }

        let mut val = v.trim().to_string();
        // Strip optional surrounding quotes.
        if val.len() >= 2
            && ((val.starts_with('"') && val.ends_with('"'))
                || (val.starts_with('\'') && val.ends_with('\'')))
        {
            val = val[1..val.len() - 1].to_string();
        }

        out.push((key.to_string(), val));
    }
    out
}

fn parse_u64(v: Option<String>) -> Option<u64> {
    v.and_then(|s| s.trim().parse::<u64>().ok())
}

fn non_empty(s: String) -> Option<String> {
    if s.trim().is_empty() {
        None
    } else {
        Some(s)
    }
}
