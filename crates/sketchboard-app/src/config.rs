//! Application configuration with environment and URL overrides.

use peniko::Color;
use sketchboard_core::generation::DEFAULT_GENERATION_PATH;
use sketchboard_core::{ApiVariant, GenerationEndpoint};
use sketchboard_render::GridStyle;
use thiserror::Error;
use url::Url;

/// API base used when nothing else is configured.
pub const DEFAULT_API_BASE: &str = "http://localhost:3000/";

/// Invalid configuration values. The previous value is kept.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid API base '{value}': {source}")]
    InvalidUrl {
        value: String,
        #[source]
        source: url::ParseError,
    },
    #[error("invalid API variant: {0}")]
    InvalidVariant(String),
    #[error("invalid grid style: {0}")]
    InvalidGrid(String),
    #[error("invalid value '{value}' for {key}, expected 1/0 or true/false")]
    InvalidFlag { key: &'static str, value: String },
}

/// A configurable setting, addressable by environment variable or URL
/// parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigKey {
    ApiBase,
    GenerationPath,
    Variant,
    Offline,
    Grid,
}

impl ConfigKey {
    pub const ALL: [ConfigKey; 5] = [
        ConfigKey::ApiBase,
        ConfigKey::GenerationPath,
        ConfigKey::Variant,
        ConfigKey::Offline,
        ConfigKey::Grid,
    ];

    /// Native environment variable.
    pub fn env_var(self) -> &'static str {
        match self {
            ConfigKey::ApiBase => "SKETCHBOARD_API_BASE",
            ConfigKey::GenerationPath => "SKETCHBOARD_GENERATION_PATH",
            ConfigKey::Variant => "SKETCHBOARD_API_VARIANT",
            ConfigKey::Offline => "SKETCHBOARD_OFFLINE",
            ConfigKey::Grid => "SKETCHBOARD_GRID",
        }
    }

    /// Query/hash parameter name on the web.
    pub fn param(self) -> &'static str {
        match self {
            ConfigKey::ApiBase => "api",
            ConfigKey::GenerationPath => "path",
            ConfigKey::Variant => "variant",
            ConfigKey::Offline => "offline",
            ConfigKey::Grid => "grid",
        }
    }

    pub fn from_param(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|key| key.param() == name)
    }
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub grid_style: GridStyle,
    pub background_color: Color,
    /// Base URL of the auth and generation API, always ending in `/`.
    /// Base URL for the auth and generation APIs, always ending in `/`.
    pub api_base: String,
    pub generation_path: String,
    pub variant: ApiVariant,
    /// Use the in-memory session provider instead of the auth API.
    pub offline: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            title: "Sketchboard".to_string(),
            width: 1280,
            height: 800,
            grid_style: GridStyle::Dots,
            background_color: Color::from_rgba8(33, 33, 33, 255),
            api_base: DEFAULT_API_BASE.to_string(),
            generation_path: DEFAULT_GENERATION_PATH.to_string(),
            variant: ApiVariant::default(),
            offline: false,
        }
    }
}

fn parse_flag(key: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" | "" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidFlag {
            key,
            value: value.to_string(),
        }),
    }
}

impl AppConfig {
    /// Defaults overridden by `SKETCHBOARD_*` environment variables.
    /// Invalid values are logged and ignored.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_all(
            ConfigKey::ALL
                .into_iter()
                .filter_map(|key| std::env::var(key.env_var()).ok().map(|value| (key, value))),
        );
        config
    }

    /// Apply overrides in order, logging the ones that fail.
    pub fn apply_all<I, S>(&mut self, overrides: I)
    where
        I: IntoIterator<Item = (ConfigKey, S)>,
        S: AsRef<str>,
    {
        for (key, value) in overrides {
            if let Err(e) = self.set(key, value.as_ref()) {
                log::error!("Ignoring configuration override: {e}");
            }
        }
    }

    /// Set a single value.
    pub fn set(&mut self, key: ConfigKey, value: &str) -> Result<(), ConfigError> {
        let value = value.trim();
        match key {
            ConfigKey::ApiBase => {
                // Url::join replaces the last segment unless the base ends in '/'
                let normalized = if value.ends_with('/') {
                    value.to_string()
                } else {
                    format!("{value}/")
                };
                Url::parse(&normalized).map_err(|source| ConfigError::InvalidUrl {
                    value: value.to_string(),
                    source,
                })?;
                self.api_base = normalized;
            }
            ConfigKey::GenerationPath => {
                self.generation_path = value.to_string();
            }
            ConfigKey::Variant => {
                self.variant = value
                    .parse()
                    .map_err(|_| ConfigError::InvalidVariant(value.to_string()))?;
            }
            ConfigKey::Offline => {
                self.offline = parse_flag(key.env_var(), value)?;
            }
            ConfigKey::Grid => {
                self.grid_style = value.parse().map_err(ConfigError::InvalidGrid)?;
            }
        }
        log::debug!("Config {} = {value}", key.param());
        Ok(())
    }

    /// The API base as a URL.
    pub fn api_base_url(&self) -> Result<Url, ConfigError> {
        Url::parse(&self.api_base).map_err(|source| ConfigError::InvalidUrl {
            value: self.api_base.clone(),
            source,
        })
    }

    /// Generation endpoint resolved against the API base.
    pub fn generation_endpoint(&self) -> Result<GenerationEndpoint, ConfigError> {
        let url = self
            .api_base_url()?
            .join(self.generation_path.trim_start_matches('/'))
            .map_err(|source| ConfigError::InvalidUrl {
                value: self.generation_path.clone(),
                source,
            })?;
        Ok(GenerationEndpoint::new(url.as_str(), self.variant))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_endpoint() {
        let endpoint = AppConfig::default().generation_endpoint().unwrap();
        assert_eq!(endpoint.url, "http://localhost:3000/api/sketch-ai");
        assert_eq!(endpoint.variant, ApiVariant::SketchAi);
    }

    #[test]
    fn test_overrides_apply_in_order() {
        let mut config = AppConfig::default();
        config.apply_all([
            (ConfigKey::ApiBase, "https://example.com/app"),
            (ConfigKey::GenerationPath, "/api/sketch-material"),
            (ConfigKey::Variant, "sketch-material"),
            (ConfigKey::Offline, "1"),
        ]);

        let endpoint = config.generation_endpoint().unwrap();
        assert_eq!(endpoint.url, "https://example.com/app/api/sketch-material");
        assert_eq!(endpoint.variant, ApiVariant::SketchWithMaterial);
        assert!(config.offline);
    }

    #[test]
    fn test_invalid_values_keep_previous() {
        let mut config = AppConfig::default();
        assert!(matches!(
            config.set(ConfigKey::ApiBase, "not a url"),
            Err(ConfigError::InvalidUrl { .. })
        ));
        assert!(matches!(
            config.set(ConfigKey::Variant, "sketch-video"),
            Err(ConfigError::InvalidVariant(_))
        ));
        assert!(matches!(
            config.set(ConfigKey::Offline, "maybe"),
            Err(ConfigError::InvalidFlag { .. })
        ));

        assert_eq!(config.api_base, DEFAULT_API_BASE);
        assert_eq!(config.variant, ApiVariant::SketchAi);
        assert!(!config.offline);
    }

    #[test]
    fn test_param_names_round_trip() {
        for key in ConfigKey::ALL {
            assert_eq!(ConfigKey::from_param(key.param()), Some(key));
        }
        assert_eq!(ConfigKey::from_param("room"), None);
    }

    #[test]
    fn test_api_base_is_normalized() {
        let mut config = AppConfig::default();
        assert_eq!(config.api_base_url().unwrap().as_str(), DEFAULT_API_BASE);

        config.set(ConfigKey::ApiBase, "https://example.com/app").unwrap();
        assert_eq!(config.api_base, "https://example.com/app/");
        assert_eq!(config.api_base_url().unwrap().path(), "/app/");
    }

    #[test]
    fn test_unparsable_api_base_disables_endpoint() {
        let config = AppConfig {
            api_base: "::".to_string(),
            ..AppConfig::default()
        };
        assert!(matches!(config.generation_endpoint(), Err(ConfigError::InvalidUrl { .. })));
    }

    #[test]
    fn test_grid_override() {
        let mut config = AppConfig::default();
        config.set(ConfigKey::Grid, "lines").unwrap();
        assert_eq!(config.grid_style, GridStyle::Lines);
    }
}
