//! Runtime settings: which repository to talk to and how.
//!
//! Each value resolves independently, first hit wins:
//! 1. command-line flag
//! 2. `FOLIO_*` environment variable
//! 3. location saved by `folio setup`
//! 4. built-in default

use miette::Diagnostic;
use std::env;
use std::time::Duration;
use thiserror::Error;

use crate::github::{DEFAULT_BRANCH, RepositoryLocation, TransportOptions};

pub const ENV_TOKEN: &str = "FOLIO_GITHUB_TOKEN";
pub const ENV_OWNER: &str = "FOLIO_GITHUB_OWNER";
pub const ENV_REPO: &str = "FOLIO_GITHUB_REPO";
pub const ENV_BRANCH: &str = "FOLIO_GITHUB_BRANCH";
pub const ENV_API_URL: &str = "FOLIO_GITHUB_API_URL";
pub const ENV_TIMEOUT_SECS: &str = "FOLIO_HTTP_TIMEOUT_SECS";

#[derive(Error, Diagnostic, Debug)]
pub enum SettingsError {
    #[error("Invalid value for {name}: '{value}'")]
    #[diagnostic(
        code(folio::settings::invalid_value),
        help("Expected a positive number of seconds.")
    )]
    InvalidValue { name: &'static str, value: String },
}

/// Location parts given explicitly, e.g. as command-line flags.
#[derive(Debug, Clone, Default)]
pub struct LocationOverrides {
    pub token: Option<String>,
    pub owner: Option<String>,
    pub repo: Option<String>,
    pub branch: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub location: RepositoryLocation,
    pub transport: TransportOptions,
}

impl Settings {
    pub fn resolve<F>(
        overrides: LocationOverrides,
        api_url: Option<String>,
        stored: Option<RepositoryLocation>,
        lookup: F,
    ) -> Result<Self, SettingsError>
    where
        F: Fn(&str) -> Option<String>,
    {
        Ok(Self {
            location: resolve_location(overrides, stored, &lookup),
            transport: resolve_transport_options(api_url, &lookup)?,
        })
    }
}

pub fn resolve_location<F>(
    overrides: LocationOverrides,
    stored: Option<RepositoryLocation>,
    lookup: F,
) -> RepositoryLocation
where
    F: Fn(&str) -> Option<String>,
{
    let stored = stored.unwrap_or_default();
    let pick = |flag: Option<String>, name: &str, saved: String| {
        flag.filter(|v| !v.is_empty())
            .or_else(|| lookup(name))
            .or_else(|| Some(saved).filter(|v| !v.is_empty()))
    };

    RepositoryLocation {
        token: pick(overrides.token, ENV_TOKEN, stored.token).unwrap_or_default(),
        owner: pick(overrides.owner, ENV_OWNER, stored.owner).unwrap_or_default(),
        repo: pick(overrides.repo, ENV_REPO, stored.repo).unwrap_or_default(),
        branch: pick(overrides.branch, ENV_BRANCH, stored.branch)
            .unwrap_or_else(|| DEFAULT_BRANCH.to_string()),
    }
}

pub fn resolve_transport_options<F>(
    api_url: Option<String>,
    lookup: F,
) -> Result<TransportOptions, SettingsError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut options = TransportOptions::default();

    if let Some(url) = api_url.or_else(|| lookup(ENV_API_URL)) {
        options.api_base_url = url.trim_end_matches('/').to_string();
    }

    if let Some(raw) = lookup(ENV_TIMEOUT_SECS) {
        let secs = raw
            .trim()
            .parse::<u64>()
            .ok()
            .filter(|s| *s > 0)
            .ok_or(SettingsError::InvalidValue {
                name: ENV_TIMEOUT_SECS,
                value: raw.clone(),
            })?;
        options.timeout = Duration::from_secs(secs);
    }

    Ok(options)
}

/// Process environment, treating empty variables as unset.
pub fn env_lookup(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::github::DEFAULT_API_BASE_URL;
    use std::collections::HashMap;

    fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> + use<> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_defaults_when_nothing_is_set() {
        let location = resolve_location(LocationOverrides::default(), None, env_from(&[]));
        assert!(!location.is_complete());
        assert_eq!(location.branch, "main");

        let options = resolve_transport_options(None, env_from(&[])).unwrap();
        assert_eq!(options.api_base_url, DEFAULT_API_BASE_URL);
        assert_eq!(options.timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_flag_beats_env_beats_stored() {
        let stored = RepositoryLocation::new("stored-tok", "stored-owner", "stored-repo", "stored");
        let env = env_from(&[(ENV_OWNER, "env-owner"), (ENV_REPO, "env-repo")]);
        let overrides = LocationOverrides {
            repo: Some("flag-repo".to_string()),
            ..Default::default()
        };

        let location = resolve_location(overrides, Some(stored), env);

        assert_eq!(location.repo, "flag-repo");
        assert_eq!(location.owner, "env-owner");
        assert_eq!(location.token, "stored-tok");
        assert_eq!(location.branch, "stored");
    }

    #[test]
    fn test_empty_flag_falls_through() {
        let overrides = LocationOverrides {
            branch: Some(String::new()),
            ..Default::default()
        };
        let location = resolve_location(overrides, None, env_from(&[(ENV_BRANCH, "dev")]));
        assert_eq!(location.branch, "dev");
    }

    #[test]
    fn test_api_url_trailing_slash_trimmed() {
        let env = env_from(&[(ENV_API_URL, "http://localhost:9000/")]);
        let options = resolve_transport_options(None, env).unwrap();
        assert_eq!(options.api_base_url, "http://localhost:9000");
    }

    #[test]
    fn test_timeout_from_env() {
        let env = env_from(&[(ENV_TIMEOUT_SECS, "5")]);
        let options = resolve_transport_options(None, env).unwrap();
        assert_eq!(options.timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_invalid_timeout_is_rejected() {
        for bad in ["0", "soon", "-3"] {
            let env = env_from(&[(ENV_TIMEOUT_SECS, bad)]);
            assert!(matches!(
                resolve_transport_options(None, env),
                Err(SettingsError::InvalidValue { .. })
            ));
        }
    }

    #[test]
    fn test_settings_resolve_combines_both() {
        let settings = Settings::resolve(
            LocationOverrides::default(),
            Some("http://api.test".to_string()),
            Some(RepositoryLocation::new("t", "o", "r", "main")),
            env_from(&[]),
        )
        .unwrap();
        assert!(settings.location.is_complete());
        assert_eq!(settings.transport.api_base_url, "http://api.test");
    }
}
