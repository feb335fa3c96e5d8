//! Build-time configuration with an optional runtime override.
//!
//! Values come from `RECLAIM_*` environment variables at build time and may be
//! replaced at runtime through `window.RECLAIM_CONFIG`, so static deployments
//! can point at another identity endpoint without rebuilding. Everything here
//! is public; never put secrets in it.

use reclaim_gate::{GateConfig, GateResult};
use reclaim_telemetry::DEFAULT_LOG_LEVEL;

/// Front-end configuration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AppConfig {
    /// Base URL of the identity endpoints; empty means same origin.
    pub api_base_url: String,
    /// Gate configuration as JSON; `None` uses the defaults.
    pub gate_json: Option<String>,
    /// Tracing filter directive.
    pub log_level: String,
    /// Log format name (`json` or `pretty`).
    pub log_format: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base_url: String::new(),
            gate_json: None,
            log_level: DEFAULT_LOG_LEVEL.to_string(),
            log_format: "pretty".to_string(),
        }
    }
}

impl AppConfig {
    /// Load build-time values and apply runtime overrides.
    #[must_use]
    pub fn load() -> Self {
        let mut config = Self {
            api_base_url: option_env!("RECLAIM_API_BASE_URL")
                .unwrap_or("")
                .to_string(),
            gate_json: option_env!("RECLAIM_GATE_CONFIG").and_then(normalize_runtime_value),
            log_level: option_env!("RECLAIM_LOG_LEVEL")
                .and_then(normalize_runtime_value)
                .unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string()),
            log_format: option_env!("RECLAIM_LOG_FORMAT")
                .and_then(normalize_runtime_value)
                .unwrap_or_else(|| "pretty".to_string()),
        };

        if let Some(runtime) = runtime_config() {
            apply_runtime_overrides(&mut config, runtime);
        }

        config
    }

    /// Parse and validate the gate configuration.
    ///
    /// # Errors
    ///
    /// Returns an error when the configured JSON is malformed or fails
    /// validation.
    pub fn gate_config(&self) -> GateResult<GateConfig> {
        match &self.gate_json {
            Some(raw) => GateConfig::from_json(raw),
            None => Ok(GateConfig::default()),
        }
    }
}

#[derive(Default)]
struct RuntimeConfig {
    api_base_url: Option<String>,
    gate_json: Option<String>,
    log_level: Option<String>,
    log_format: Option<String>,
}

fn apply_runtime_overrides(config: &mut AppConfig, runtime: RuntimeConfig) {
    if let Some(value) = runtime.api_base_url {
        config.api_base_url = value;
    }
    if let Some(value) = runtime.gate_json {
        config.gate_json = Some(value);
    }
    if let Some(value) = runtime.log_level {
        config.log_level = value;
    }
    if let Some(value) = runtime.log_format {
        config.log_format = value;
    }
}

#[cfg(target_arch = "wasm32")]
fn runtime_config() -> Option<RuntimeConfig> {
    use js_sys::{JSON, Object, Reflect};
    use wasm_bindgen::JsValue;

    let window = web_sys::window()?;
    let config = Reflect::get(&window, &JsValue::from_str("RECLAIM_CONFIG")).ok()?;
    if config.is_null() || config.is_undefined() {
        return None;
    }
    let object = Object::from(config);

    // `gate` may be given inline as an object or as a JSON string.
    let gate_json = Reflect::get(&object, &JsValue::from_str("gate"))
        .ok()
        .filter(|value| !value.is_null() && !value.is_undefined())
        .and_then(|value| {
            value
                .as_string()
                .or_else(|| JSON::stringify(&value).ok().and_then(|json| json.as_string()))
        })
        .and_then(|value| normalize_runtime_value(&value));

    Some(RuntimeConfig {
        api_base_url: read_runtime_value(&object, "api_base_url"),
        gate_json,
        log_level: read_runtime_value(&object, "log_level"),
        log_format: read_runtime_value(&object, "log_format"),
    })
}

#[cfg(not(target_arch = "wasm32"))]
fn runtime_config() -> Option<RuntimeConfig> {
    None
}

#[cfg(target_arch = "wasm32")]
fn read_runtime_value(object: &js_sys::Object, key: &str) -> Option<String> {
    let value = js_sys::Reflect::get(object, &wasm_bindgen::JsValue::from_str(key))
        .ok()?
        .as_string()?;
    normalize_runtime_value(&value)
}

fn normalize_runtime_value(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
