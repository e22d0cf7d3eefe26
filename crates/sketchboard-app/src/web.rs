//! WebAssembly entry point and platform-specific code.

use wasm_bindgen::prelude::*;

use crate::config::{AppConfig, ConfigKey};

/// Configuration overrides from the page URL.
/// Supports `?api=https://host/&variant=sketch-material` and the same pairs
/// after `#`. Hash values win over query values.
pub fn url_overrides() -> Vec<(ConfigKey, String)> {
    let Some(window) = web_sys::window() else {
        return Vec::new();
    };
    let location = window.location();

    let mut overrides = Vec::new();
    if let Ok(search) = location.search() {
        overrides.extend(parse_params(&search));
    }
    if let Ok(hash) = location.hash() {
        overrides.extend(parse_params(&hash));
    }
    overrides
}

/// Parse known parameters from a query string or hash. Unknown keys and
/// empty values are skipped.
fn parse_params(s: &str) -> Vec<(ConfigKey, String)> {
    let s = s.trim_start_matches(['?', '#']);

    s.split('&')
        .filter_map(|pair| {
            let (key, value) = pair.split_once('=')?;
            if value.is_empty() {
                return None;
            }
            let key = ConfigKey::from_param(key)?;
            let value = js_sys::decode_uri_component(value)
                .ok()
                .and_then(|decoded| decoded.as_string())
                .unwrap_or_else(|| value.to_string());
            Some((key, value))
        })
        .collect()
}

/// Build the configuration for this page. The API defaults to the page origin.
fn config_from_location() -> AppConfig {
    let mut config = AppConfig::default();

    let origin = web_sys::window().and_then(|w| w.location().origin().ok());
    if let Some(origin) = origin {
        if let Err(e) = config.set(ConfigKey::ApiBase, &origin) {
            log::warn!("Page origin is not a usable API base: {e}");
        }
    }

    config.apply_all(url_overrides());
    config
}

/// Initialize and run the WASM application.
#[wasm_bindgen(start)]
pub async fn run_wasm() {
    // Set up panic hook for better error messages
    console_error_panic_hook::set_once();

    if let Err(e) = console_log::init_with_level(log::Level::Info) {
        web_sys::console::error_1(&format!("Failed to initialize logger: {e}").into());
    }

    log::info!("Starting Sketchboard (WASM)");

    let config = config_from_location();
    log::info!("API base: {}", config.api_base);

    crate::App::run(config).await;
}
