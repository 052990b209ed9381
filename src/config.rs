//! Configuration management for Text Scanner

use serde::Deserialize;
use std::env;

use crate::ocr::OcrProvider;

/// Default maximum upload size: 20MB
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;

/// Longest accepted session TTL: one year
pub const MAX_SESSION_TTL_MINUTES: i64 = 365 * 24 * 60;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub ocr: OcrConfig,
    pub session: SessionConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Largest accepted request body (image uploads)
    pub max_upload_bytes: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OcrConfig {
    /// Providers to try, in order
    pub providers: Vec<OcrProvider>,
    /// Recognition languages (ISO 639-1)
    pub languages: Vec<String>,
    /// Tesseract executable
    pub tesseract_cmd: String,
    pub ollama_url: String,
    pub ollama_model: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    /// Idle time after which a session is evicted
    pub ttl_minutes: i64,
    /// Interval of the background eviction task
    pub cleanup_interval_secs: u64,
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {name}: {value}")]
    InvalidValue { name: &'static str, value: String },

    #[error("Unknown OCR provider: {0}")]
    UnknownProvider(String),

    #[error("{0} must not be empty")]
    Empty(&'static str),
}

impl Default for Config {
    fn default() -> Self {
        Config {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 8501,
                max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            },
            ocr: OcrConfig {
                providers: vec![OcrProvider::Tesseract, OcrProvider::Ollama],
                languages: vec!["en".to_string(), "hi".to_string()],
                tesseract_cmd: "tesseract".to_string(),
                ollama_url: "http://localhost:11434".to_string(),
                ollama_model: "llava".to_string(),
            },
            session: SessionConfig {
                ttl_minutes: 60,
                cleanup_interval_secs: 300,
            },
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build a config from an arbitrary variable source. Unset variables keep
    /// their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Config::default();

        let providers = match lookup("OCR_PROVIDERS") {
            Some(raw) => parse_providers(&raw)?,
            None => defaults.ocr.providers,
        };

        let languages = match lookup("OCR_LANGUAGES") {
            Some(raw) => {
                let languages = split_list(&raw);
                if languages.is_empty() {
                    return Err(ConfigError::Empty("OCR_LANGUAGES"));
                }
                languages
            }
            None => defaults.ocr.languages,
        };

        Ok(Config {
            server: ServerConfig {
                host: lookup("SERVER_HOST").unwrap_or(defaults.server.host),
                port: parse_var(&lookup, "SERVER_PORT", defaults.server.port)?,
                max_upload_bytes: parse_var(
                    &lookup,
                    "MAX_UPLOAD_BYTES",
                    defaults.server.max_upload_bytes,
                )?,
            },
            ocr: OcrConfig {
                providers,
                languages,
                tesseract_cmd: lookup("TESSERACT_CMD").unwrap_or(defaults.ocr.tesseract_cmd),
                ollama_url: lookup("OLLAMA_URL").unwrap_or(defaults.ocr.ollama_url),
                ollama_model: lookup("OLLAMA_MODEL").unwrap_or(defaults.ocr.ollama_model),
            },
            session: SessionConfig {
                ttl_minutes: parse_range_var(
                    &lookup,
                    "SESSION_TTL_MINUTES",
                    defaults.session.ttl_minutes,
                    1..=MAX_SESSION_TTL_MINUTES,
                )?,
                cleanup_interval_secs: parse_range_var(
                    &lookup,
                    "SESSION_CLEANUP_SECS",
                    defaults.session.cleanup_interval_secs,
                    1..=u64::MAX,
                )?,
            },
        })
    }
}

fn parse_var<F, T>(lookup: &F, name: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(name) {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue { name, value }),
        None => Ok(default),
    }
}

/// Like `parse_var`, but values outside `range` are rejected
fn parse_range_var<F, T>(
    lookup: &F,
    name: &'static str,
    default: T,
    range: std::ops::RangeInclusive<T>,
) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr + PartialOrd + std::fmt::Display,
{
    let value = parse_var(lookup, name, default)?;
    if range.contains(&value) {
        Ok(value)
    } else {
        Err(ConfigError::InvalidValue {
            name,
            value: value.to_string(),
        })
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .collect()
}

fn parse_providers(raw: &str) -> Result<Vec<OcrProvider>, ConfigError> {
    let providers = split_list(raw)
        .into_iter()
        .map(|name| match name.as_str() {
            "tesseract" => Ok(OcrProvider::Tesseract),
            "ollama" => Ok(OcrProvider::Ollama),
            _ => Err(ConfigError::UnknownProvider(name)),
        })
        .collect::<Result<Vec<_>, _>>()?;

    if providers.is_empty() {
        return Err(ConfigError::Empty("OCR_PROVIDERS"));
    }
    Ok(providers)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = Config::from_lookup(|_| None).unwrap();
        assert_eq!(config.server.port, 8501);
        assert_eq!(config.ocr.languages, vec!["en", "hi"]);
        assert_eq!(
            config.ocr.providers,
            vec![OcrProvider::Tesseract, OcrProvider::Ollama]
        );
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_lookup(lookup_from(&[
            ("SERVER_PORT", "9000"),
            ("OCR_PROVIDERS", "Ollama"),
            ("OCR_LANGUAGES", " en , fr "),
            ("SESSION_TTL_MINUTES", "5"),
        ]))
        .unwrap();

        assert_eq!(config.server.port, 9000);
        assert_eq!(config.ocr.providers, vec![OcrProvider::Ollama]);
        assert_eq!(config.ocr.languages, vec!["en", "fr"]);
        assert_eq!(config.session.ttl_minutes, 5);
    }

    #[test]
    fn test_invalid_values() {
        let err = Config::from_lookup(lookup_from(&[("SERVER_PORT", "http")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { name: "SERVER_PORT", .. }));

        let err = Config::from_lookup(lookup_from(&[("OCR_PROVIDERS", "easyocr")])).unwrap_err();
        assert!(matches!(err, ConfigError::UnknownProvider(_)));

        let err = Config::from_lookup(lookup_from(&[("OCR_LANGUAGES", " , ")])).unwrap_err();
        assert!(matches!(err, ConfigError::Empty("OCR_LANGUAGES")));
    }

    #[test]
    fn test_session_timing_out_of_range() {
        for ttl in ["-5", "0", "99999999999999"] {
            let err = Config::from_lookup(lookup_from(&[("SESSION_TTL_MINUTES", ttl)])).unwrap_err();
            assert!(
                matches!(err, ConfigError::InvalidValue { name: "SESSION_TTL_MINUTES", .. }),
                "ttl {} accepted",
                ttl
            );
        }

        let err = Config::from_lookup(lookup_from(&[("SESSION_CLEANUP_SECS", "0")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { name: "SESSION_CLEANUP_SECS", .. }));

        let config = Config::from_lookup(lookup_from(&[("SESSION_TTL_MINUTES", "525600")])).unwrap();
        assert_eq!(config.session.ttl_minutes, MAX_SESSION_TTL_MINUTES);
    }
}
