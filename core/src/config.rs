//! Client-wide defaults.
//!
//! Every field can be overridden per request through `RequestOptions`.
//! `ClientConfig` deserializes from any serde source with missing fields
//! falling back to `Default`, and `from_env` reads the `COURIER_*`
//! variables.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::casing::KeyCase;
use crate::error::HttpError;
use crate::http::RedirectPolicy;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Prefix for relative request urls.
    pub base_url: Option<String>,
    /// Applied when a request sets no timeout of its own.
    pub timeout: Option<Duration>,
    pub follow_redirects: bool,
    pub max_redirects: u32,
    pub user_agent: String,
    /// Sent with every request unless the request overrides them.
    pub default_headers: Vec<(String, String)>,
    /// Key case applied to outgoing JSON bodies.
    pub request_key_case: KeyCase,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            timeout: Some(Duration::from_secs(30)),
            follow_redirects: true,
            max_redirects: 10,
            user_agent: format!("courier/{}", env!("CARGO_PKG_VERSION")),
            default_headers: Vec::new(),
            request_key_case: KeyCase::Preserve,
        }
    }
}

impl ClientConfig {
    pub fn with_base_url(base_url: &str) -> Self {
        Self {
            base_url: Some(base_url.to_string()),
            ..Default::default()
        }
    }

    pub fn from_env() -> Result<Self, HttpError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from a variable lookup, starting from the defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, HttpError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        if let Some(base_url) = lookup("COURIER_BASE_URL") {
            config.base_url = Some(base_url);
        }
        if let Some(secs) = lookup("COURIER_TIMEOUT_SECS") {
            let secs: u64 = parse_var("COURIER_TIMEOUT_SECS", &secs)?;
            config.timeout = (secs > 0).then(|| Duration::from_secs(secs));
        }
        if let Some(follow) = lookup("COURIER_FOLLOW_REDIRECTS") {
            config.follow_redirects = parse_var("COURIER_FOLLOW_REDIRECTS", &follow)?;
        }
        if let Some(max) = lookup("COURIER_MAX_REDIRECTS") {
            config.max_redirects = parse_var("COURIER_MAX_REDIRECTS", &max)?;
        }
        if let Some(agent) = lookup("COURIER_USER_AGENT") {
            config.user_agent = agent;
        }
        if let Some(case) = lookup("COURIER_KEY_CASE") {
            config.request_key_case = case.parse()?;
        }
        Ok(config)
    }

    pub fn redirect_policy(&self) -> RedirectPolicy {
        RedirectPolicy::new(self.follow_redirects, self.max_redirects)
    }
}

fn parse_var<T: std::str::FromStr>(name: &str, raw: &str) -> Result<T, HttpError> {
    raw.trim()
        .parse()
        .map_err(|_| HttpError::Config(format!("{name} has an invalid value: {raw}")))
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn defaults_follow_redirects_with_timeout() {
        let config = ClientConfig::default();
        assert_eq!(config.timeout, Some(Duration::from_secs(30)));
        assert_eq!(config.redirect_policy(), RedirectPolicy::Follow(10));
        assert!(config.user_agent.starts_with("courier/"));
    }

    #[test]
    fn env_overrides_defaults() {
        let config = ClientConfig::from_lookup(lookup(&[
            ("COURIER_BASE_URL", "http://api.local"),
            ("COURIER_TIMEOUT_SECS", "5"),
            ("COURIER_FOLLOW_REDIRECTS", "false"),
            ("COURIER_KEY_CASE", "camel"),
        ]))
        .unwrap();
        assert_eq!(config.base_url.as_deref(), Some("http://api.local"));
        assert_eq!(config.timeout, Some(Duration::from_secs(5)));
        assert_eq!(config.redirect_policy(), RedirectPolicy::Manual);
        assert_eq!(config.request_key_case, KeyCase::Camel);
    }

    #[test]
    fn zero_timeout_disables_it() {
        let config = ClientConfig::from_lookup(lookup(&[("COURIER_TIMEOUT_SECS", "0")])).unwrap();
        assert_eq!(config.timeout, None);
    }

    #[test]
    fn invalid_value_is_a_config_error() {
        let err = ClientConfig::from_lookup(lookup(&[("COURIER_MAX_REDIRECTS", "lots")])).unwrap_err();
        assert!(matches!(err, HttpError::Config(msg) if msg.contains("COURIER_MAX_REDIRECTS")));
    }

    #[test]
    fn deserializes_with_missing_fields() {
        let config: ClientConfig =
            serde_json::from_str(r#"{"base_url":"http://x","request_key_case":"kebab"}"#).unwrap();
        assert_eq!(config.base_url.as_deref(), Some("http://x"));
        assert_eq!(config.request_key_case, KeyCase::Kebab);
        assert_eq!(config.max_redirects, 10);
    }
}
