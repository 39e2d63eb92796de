use std::{env, io};

use tracing::debug;

const DEFAULT_GEOCODER_ENDPOINT: &str = "https://nominatim.openstreetmap.org/reverse";
const DEFAULT_GEOCODER_LOCALE: &str = "zh-TW";

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub geocoder_endpoint: String,
    pub geocoder_locale: String,
    pub user_agent: String,
}

impl AppConfig {
    pub fn from_env() -> Self {
        load_dotenv_if_applicable();
        Self {
            geocoder_endpoint: env::var("GEOCODER_ENDPOINT")
                .ok()
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_GEOCODER_ENDPOINT.to_string()),
            geocoder_locale: env::var("GEOCODER_LOCALE")
                .ok()
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_GEOCODER_LOCALE.to_string()),
            user_agent: env::var("GEOCODER_USER_AGENT")
                .ok()
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(default_user_agent),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            geocoder_endpoint: DEFAULT_GEOCODER_ENDPOINT.to_string(),
            geocoder_locale: DEFAULT_GEOCODER_LOCALE.to_string(),
            user_agent: default_user_agent(),
        }
    }
}

fn default_user_agent() -> String {
    format!("report-via-mobile/{}", env!("CARGO_PKG_VERSION"))
}

fn load_dotenv_if_applicable() {
    if !should_load_dotenv() {
        debug!("skipping .env load outside dev mode");
        return;
    }

    if let Err(err) = dotenvy::dotenv() {
        match &err {
            dotenvy::Error::Io(io_err) if io_err.kind() == io::ErrorKind::NotFound => {}
            _ => debug!(?err, "unable to load .env file"),
        }
    }
}

fn should_load_dotenv() -> bool {
    cfg!(debug_assertions) || parse_bool("ALLOW_DOTENV", false)
}

fn parse_bool(key: &str, default: bool) -> bool {
    env::var(key)
        .map(|v| matches!(v.trim(), "1" | "true" | "TRUE" | "True"))
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn falls_back_to_nominatim_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.geocoder_endpoint, DEFAULT_GEOCODER_ENDPOINT);
        assert_eq!(config.geocoder_locale, "zh-TW");
        assert!(config.user_agent.starts_with("report-via-mobile/"));
    }

    #[test]
    fn reads_overrides_from_env() {
        env::set_var("GEOCODER_ENDPOINT", "http://127.0.0.1:8088/reverse");
        env::set_var("GEOCODER_LOCALE", "en");

        let config = AppConfig::from_env();
        assert_eq!(config.geocoder_endpoint, "http://127.0.0.1:8088/reverse");
        assert_eq!(config.geocoder_locale, "en");

        env::remove_var("GEOCODER_ENDPOINT");
        env::remove_var("GEOCODER_LOCALE");
    }
}
