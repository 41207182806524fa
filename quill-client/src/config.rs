use std::time::Duration;

use shared_types::DEFAULT_AUTOSAVE_DELAY_MS;

use crate::error::ConfigError;

pub const SUPABASE_URL: &str = "SUPABASE_URL";
pub const SUPABASE_ANON_KEY: &str = "SUPABASE_ANON_KEY";

#[derive(Debug, Clone)]
pub struct Config {
    /// Project URL of the hosted backend, e.g. `https://xyz.supabase.co`
    pub supabase_url: String,
    /// Public anon key; row-level security does the scoping
    pub supabase_anon_key: String,
    /// Quiet period before an editor autosave
    pub autosave_delay: Duration,
    /// Per-request timeout for backend calls
    pub http_timeout: Duration,
    /// Extra attempts for idempotent calls that fail in transport.
    pub http_retries: u32,
}

impl Config {
    /// Load from the process environment (and `.env` when present).
    ///
    /// Missing backend coordinates are fatal; callers should stop startup.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let supabase_url = required(&lookup, SUPABASE_URL)?;
        if !supabase_url.starts_with("http://") && !supabase_url.starts_with("https://") {
            return Err(ConfigError::Invalid {
                key: SUPABASE_URL,
                value: supabase_url,
                reason: "expected an http(s) URL".to_string(),
            });
        }

        Ok(Self {
            supabase_url: supabase_url.trim_end_matches('/').to_string(),
            supabase_anon_key: required(&lookup, SUPABASE_ANON_KEY)?,
            autosave_delay: Duration::from_millis(env_parse(
                &lookup,
                "QUILL_AUTOSAVE_DELAY_MS",
                DEFAULT_AUTOSAVE_DELAY_MS,
            )?),
            http_timeout: Duration::from_secs(env_parse(&lookup, "QUILL_HTTP_TIMEOUT_SECS", 30)?),
            http_retries: env_parse(&lookup, "QUILL_HTTP_RETRIES", 0)?,
        })
    }
}

fn required<F>(lookup: &F, key: &'static str) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(value) if !value.trim().is_empty() => Ok(value.trim().to_string()),
        _ => Err(ConfigError::Missing(key)),
    }
}

fn env_parse<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        Some(val) => val.trim().parse::<T>().map_err(|e| ConfigError::Invalid {
            key,
            value: val.clone(),
            reason: e.to_string(),
        }),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_applied() {
        let config = Config::from_lookup(lookup(&[
            (SUPABASE_URL, "https://quill.supabase.co/"),
            (SUPABASE_ANON_KEY, "anon"),
        ]))
        .unwrap();
        assert_eq!(config.supabase_url, "https://quill.supabase.co");
        assert_eq!(config.autosave_delay, Duration::from_millis(2000));
        assert_eq!(config.http_retries, 0);
    }

    #[test]
    fn test_missing_key_is_fatal() {
        let err = Config::from_lookup(lookup(&[(SUPABASE_URL, "https://quill.supabase.co")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::Missing(SUPABASE_ANON_KEY)));

        let err = Config::from_lookup(lookup(&[(SUPABASE_URL, "  "), (SUPABASE_ANON_KEY, "anon")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::Missing(SUPABASE_URL)));
    }

    #[test]
    fn test_invalid_values_rejected() {
        let err = Config::from_lookup(lookup(&[
            (SUPABASE_URL, "https://quill.supabase.co"),
            (SUPABASE_ANON_KEY, "anon"),
            ("QUILL_AUTOSAVE_DELAY_MS", "soon"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "QUILL_AUTOSAVE_DELAY_MS", .. }));

        let err = Config::from_lookup(lookup(&[
            (SUPABASE_URL, "quill.supabase.co"),
            (SUPABASE_ANON_KEY, "anon"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: SUPABASE_URL, .. }));
    }
}
