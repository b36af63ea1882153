use std::time::Duration;

use crate::clients::http::DEFAULT_USER_AGENT;
use crate::domain::page::{Limits, CACHE_TTL, FETCH_TIMEOUT, MAX_BODY_CHARS, MAX_RENDER_CHARS};

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub fetch_timeout: Duration,
    pub cache_ttl: Duration,
    pub limits: Limits,
    pub allow_private_hosts: bool,
    pub target_url: Option<String>,
    pub refresh_secs: u64,
    pub keep_alive: bool,
    pub keep_alive_interval: Duration,
    pub user_agent: String,
}

fn default_port() -> u16 { 10000 }
fn default_refresh_secs() -> u64 { 180 }
fn default_keep_alive_interval() -> Duration { Duration::from_secs(60) }

impl Default for Config {
    fn default() -> Self {
        Self {
            port: default_port(),
            fetch_timeout: FETCH_TIMEOUT,
            cache_ttl: CACHE_TTL,
            limits: Limits { max_body_chars: MAX_BODY_CHARS, max_render_chars: MAX_RENDER_CHARS },
            allow_private_hosts: false,
            target_url: None,
            refresh_secs: default_refresh_secs(),
            keep_alive: false,
            keep_alive_interval: default_keep_alive_interval(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Ok(Self::from_lookup(|key| std::env::var(key).ok()))
    }

    /// Builds a config from any key lookup; unparsable values keep their default.
    pub fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Self {
        let d = Self::default();
        let num = |key: &str| get(key).and_then(|v| v.trim().parse::<u64>().ok());
        let flag = |key: &str| {
            get(key).map(|v| !matches!(v.trim().to_ascii_lowercase().as_str(), "" | "0" | "false" | "no" | "off"))
        };

        Self {
            port: get("PORT").and_then(|v| v.trim().parse().ok()).unwrap_or(d.port),
            fetch_timeout: num("FETCH_TIMEOUT_SECS").map(Duration::from_secs).unwrap_or(d.fetch_timeout),
            cache_ttl: num("CACHE_TTL_SECS").map(Duration::from_secs).unwrap_or(d.cache_ttl),
            limits: Limits {
                max_body_chars: num("MAX_BODY_CHARS").map(|v| v as usize).unwrap_or(d.limits.max_body_chars),
                max_render_chars: num("MAX_RENDER_CHARS").map(|v| v as usize).unwrap_or(d.limits.max_render_chars),
            },
            allow_private_hosts: flag("PROXY_ALLOW_PRIVATE_HOSTS").unwrap_or(d.allow_private_hosts),
            target_url: get("TARGET_URL").map(|v| v.trim().to_string()).filter(|v| !v.is_empty()),
            refresh_secs: num("REFRESH_SECS").filter(|v| *v > 0).unwrap_or(d.refresh_secs),
            keep_alive: flag("KEEP_ALIVE")
                .or_else(|| get("RENDER").map(|v| !v.is_empty()))
                .unwrap_or(d.keep_alive),
            keep_alive_interval: num("KEEP_ALIVE_INTERVAL_SECS")
                .filter(|v| *v > 0)
                .map(Duration::from_secs)
                .unwrap_or(d.keep_alive_interval),
            user_agent: get("USER_AGENT").filter(|v| !v.trim().is_empty()).unwrap_or(d.user_agent),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn from(pairs: &[(&str, &str)]) -> Config {
        let map: HashMap<String, String> =
            pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        Config::from_lookup(|k| map.get(k).cloned())
    }

    #[test]
    fn defaults_match_service_constants() {
        let cfg = from(&[]);
        assert_eq!(cfg.port, 10000);
        assert_eq!(cfg.fetch_timeout, Duration::from_secs(10));
        assert_eq!(cfg.cache_ttl, Duration::from_secs(300));
        assert_eq!(cfg.limits.max_body_chars, 50_000);
        assert_eq!(cfg.limits.max_render_chars, 20_000);
        assert!(!cfg.allow_private_hosts);
        assert!(!cfg.keep_alive);
        assert!(cfg.target_url.is_none());
    }

    #[test]
    fn reads_overrides() {
        let cfg = from(&[
            ("PORT", "8080"),
            ("CACHE_TTL_SECS", "60"),
            ("PROXY_ALLOW_PRIVATE_HOSTS", "true"),
            ("TARGET_URL", " https://codesandbox.io/p/devbox/demo "),
            ("KEEP_ALIVE_INTERVAL_SECS", "30"),
        ]);
        assert_eq!(cfg.port, 8080);
        assert_eq!(cfg.cache_ttl, Duration::from_secs(60));
        assert!(cfg.allow_private_hosts);
        assert_eq!(cfg.target_url.as_deref(), Some("https://codesandbox.io/p/devbox/demo"));
        assert_eq!(cfg.keep_alive_interval, Duration::from_secs(30));
    }

    #[test]
    fn bad_numbers_fall_back() {
        let cfg = from(&[("PORT", "eighty"), ("REFRESH_SECS", "0"), ("FETCH_TIMEOUT_SECS", "-1")]);
        assert_eq!(cfg.port, 10000);
        assert_eq!(cfg.refresh_secs, 180);
        assert_eq!(cfg.fetch_timeout, Duration::from_secs(10));
    }

    #[test]
    fn render_env_enables_keep_alive() {
        assert!(from(&[("RENDER", "true")]).keep_alive);
        assert!(!from(&[("KEEP_ALIVE", "0"), ("RENDER", "true")]).keep_alive);
        assert!(from(&[("KEEP_ALIVE", "yes")]).keep_alive);
    }
}
