// Configuration Storage Service
// Handles config file read/write

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use super::providers::{api_key_from_env, DEFAULT_PROVIDER, OPENAI_DEFAULT_MODEL, OPENAI_DEFAULT_URL};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppConfig {
    #[serde(default = "default_version")]
    pub version: String,
    pub default_provider: Option<String>,
    pub proxy: Option<ProxyConfig>,
    #[serde(default)]
    pub detection: DetectionConfig,
    #[serde(default)]
    pub generation: GenerationConfig,
    #[serde(default)]
    pub providers: HashMap<String, ProviderConfig>,
    #[serde(default)]
    pub api_keys: HashMap<String, String>,
    #[serde(default = "default_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            version: default_version(),
            default_provider: None,
            proxy: None,
            detection: DetectionConfig::default(),
            generation: GenerationConfig::default(),
            providers: HashMap::new(),
            api_keys: HashMap::new(),
            request_timeout_secs: default_timeout_secs(),
        }
    }
}

impl AppConfig {
    /// Provider spec string (`name[:model]`) used when a request names none.
    pub fn provider_spec(&self) -> String {
        match &self.default_provider {
            Some(p) if !p.trim().is_empty() => p.trim().to_string(),
            _ => format!("{}:{}", DEFAULT_PROVIDER, OPENAI_DEFAULT_MODEL),
        }
    }

    /// Chat endpoint: configured base URL, then the OpenAI default.
    pub fn chat_url(&self, provider: &str) -> String {
        self.providers
            .get(provider)
            .and_then(|p| p.base_url.clone())
            .filter(|u| !u.trim().is_empty())
            .unwrap_or_else(|| OPENAI_DEFAULT_URL.to_string())
    }

    /// Stored API key for a provider, trimmed; blank keys count as missing.
    pub fn api_key(&self, provider: &str) -> Option<String> {
        self.api_keys
            .get(provider)
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty())
    }

    /// Fold `OPENAI_API_URL` and the provider key variables into the config.
    /// Environment values win over the file.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(url) = std::env::var("OPENAI_API_URL") {
            if !url.trim().is_empty() {
                self.providers
                    .entry(DEFAULT_PROVIDER.to_string())
                    .or_insert_with(|| ProviderConfig {
                        enabled: true,
                        ..Default::default()
                    })
                    .base_url = Some(url.trim().to_string());
            }
        }
        if let Some(key) = api_key_from_env(DEFAULT_PROVIDER) {
            self.api_keys.insert(DEFAULT_PROVIDER.to_string(), key);
        }
    }

    /// Configured model for a provider, if any.
    pub fn provider_model(&self, provider: &str) -> Option<String> {
        self.providers
            .get(provider)
            .and_then(|p| p.model.clone())
            .filter(|m| !m.trim().is_empty())
    }

    /// Proxy URL when the proxy is enabled.
    pub fn proxy_url(&self) -> Option<&str> {
        let proxy = self.proxy.as_ref().filter(|p| p.enabled)?;
        proxy.https.as_deref().or(proxy.http.as_deref())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ProxyConfig {
    pub enabled: bool,
    pub http: Option<String>,
    pub https: Option<String>,
}

/// Input policy and sampling settings for detection.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectionConfig {
    #[serde(default = "default_min_chars")]
    pub min_chars: usize,
    #[serde(default = "default_max_words")]
    pub max_words: usize,
    #[serde(default = "default_max_chars")]
    pub max_chars: usize,
    #[serde(default = "default_prompt_char_limit")]
    pub prompt_char_limit: usize,
    #[serde(default)]
    pub confidence_floor: f64,
    #[serde(default = "default_detect_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_detect_temperature")]
    pub temperature: f64,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            min_chars: default_min_chars(),
            max_words: default_max_words(),
            max_chars: default_max_chars(),
            prompt_char_limit: default_prompt_char_limit(),
            confidence_floor: 0.0,
            max_tokens: default_detect_max_tokens(),
            temperature: default_detect_temperature(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    #[serde(default = "default_max_topic_chars")]
    pub max_topic_chars: usize,
    #[serde(default = "default_generate_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_generate_temperature")]
    pub temperature: f64,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            max_topic_chars: default_max_topic_chars(),
            max_tokens: default_generate_max_tokens(),
            temperature: default_generate_temperature(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ProviderConfig {
    pub enabled: bool,
    pub model: Option<String>,
    pub base_url: Option<String>,
}

fn default_version() -> String { "1.0.0".to_string() }
fn default_timeout_secs() -> u64 { 60 }
fn default_min_chars() -> usize { 50 }
fn default_max_words() -> usize { 1500 }
fn default_max_chars() -> usize { 4000 }
fn default_prompt_char_limit() -> usize { 2000 }
fn default_detect_max_tokens() -> u32 { 300 }
fn default_detect_temperature() -> f64 { 0.1 }
fn default_max_topic_chars() -> usize { 100 }
fn default_generate_max_tokens() -> u32 { 1000 }
fn default_generate_temperature() -> f64 { 0.7 }

pub struct ConfigStore {
    config_dir: PathBuf,
    config_file: PathBuf,
}

impl ConfigStore {
    pub fn new(config_dir: PathBuf) -> Self {
        let config_file = config_dir.join("config.json");
        Self { config_dir, config_file }
    }

    /// Get default config directory
    pub fn default_config_dir() -> Option<PathBuf> {
        if let Ok(dir) = std::env::var("AUTHORCHECK_CONFIG_DIR") {
            if !dir.trim().is_empty() {
                return Some(PathBuf::from(dir));
            }
        }
        dirs::config_dir().map(|p| p.join("authorcheck"))
    }

    /// Store at the default location, if one can be determined.
    pub fn open_default() -> Option<Self> {
        Self::default_config_dir().map(Self::new)
    }

    pub fn config_file(&self) -> &PathBuf {
        &self.config_file
    }

    /// Ensure config directory exists
    pub fn ensure_dir(&self) -> Result<(), String> {
        fs::create_dir_all(&self.config_dir)
            .map_err(|e| format!("Failed to create config dir: {}", e))
    }

    /// Load configuration from file
    pub fn load(&self) -> Result<AppConfig, String> {
        if !self.config_file.exists() {
            return Ok(AppConfig::default());
        }

        let content = fs::read_to_string(&self.config_file)
            .map_err(|e| format!("Failed to read config: {}", e))?;

        serde_json::from_str(&content)
            .map_err(|e| format!("Failed to parse config: {}", e))
    }

    /// Save configuration to file
    pub fn save(&self, config: &AppConfig) -> Result<(), String> {
        self.ensure_dir()?;

        let content = serde_json::to_string_pretty(config)
            .map_err(|e| format!("Failed to serialize config: {}", e))?;

        fs::write(&self.config_file, content)
            .map_err(|e| format!("Failed to write config: {}", e))
    }

    /// Store provider API key in config file
    pub fn set_api_key(&self, provider: &str, key: &str) -> Result<(), String> {
        let mut config = self.load()?;
        config.api_keys.insert(provider.to_string(), key.to_string());
        self.save(&config)
    }

    /// Delete provider API key from config file
    pub fn delete_api_key(&self, provider: &str) -> Result<(), String> {
        let mut config = self.load()?;
        config.api_keys.remove(provider);
        self.save(&config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_store() -> ConfigStore {
        let dir = std::env::temp_dir().join(format!("authorcheck-test-{}", uuid::Uuid::new_v4()));
        ConfigStore::new(dir)
    }

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.detection.min_chars, 50);
        assert_eq!(config.detection.max_words, 1500);
        assert_eq!(config.detection.prompt_char_limit, 2000);
        assert_eq!(config.generation.max_topic_chars, 100);
        assert_eq!(config.provider_spec(), "openai:gpt-3.5-turbo");
    }

    #[test]
    fn test_partial_file_gets_defaults() {
        let parsed: AppConfig =
            serde_json::from_str(r#"{"detection": {"minChars": 100}}"#).unwrap();
        assert_eq!(parsed.detection.min_chars, 100);
        assert_eq!(parsed.detection.max_words, 1500);
        assert_eq!(parsed.request_timeout_secs, 60);
        assert_eq!(parsed.version, "1.0.0");
    }

    #[test]
    fn test_missing_file_loads_defaults() {
        let store = temp_store();
        let config = store.load().unwrap();
        assert_eq!(config.detection.max_chars, 4000);
    }

    #[test]
    fn test_api_key_round_trip_through_file() {
        let store = temp_store();
        store.set_api_key("openai", "sk-test").unwrap();
        assert_eq!(store.load().unwrap().api_key("openai"), Some("sk-test".to_string()));
        store.delete_api_key("openai").unwrap();
        assert_eq!(store.load().unwrap().api_key("openai"), None);
        let _ = fs::remove_dir_all(&store.config_dir);
    }

    #[test]
    fn test_blank_api_key_counts_as_missing() {
        let mut config = AppConfig::default();
        config.api_keys.insert("openai".to_string(), "  ".to_string());
        assert_eq!(config.api_key("openai"), None);
        config.api_keys.insert("openai".to_string(), " sk-x ".to_string());
        assert_eq!(config.api_key("openai"), Some("sk-x".to_string()));
    }

    #[test]
    fn test_chat_url_prefers_configured_base_url() {
        let mut config = AppConfig::default();
        assert_eq!(config.chat_url("openai"), OPENAI_DEFAULT_URL);
        config.providers.insert(
            "openai".to_string(),
            ProviderConfig {
                enabled: true,
                model: None,
                base_url: Some("http://127.0.0.1:9/v1/chat/completions".to_string()),
            },
        );
        assert_eq!(config.chat_url("openai"), "http://127.0.0.1:9/v1/chat/completions");
    }

    #[test]
    fn test_env_overrides_win_over_file() {
        std::env::set_var("OPENAI_API_URL", "http://127.0.0.1:7/v1/chat/completions");
        std::env::set_var("OPENAI_API_KEY", "sk-env");
        let mut config = AppConfig::default();
        config.api_keys.insert("openai".to_string(), "sk-file".to_string());
        config.apply_env_overrides();
        std::env::remove_var("OPENAI_API_URL");
        std::env::remove_var("OPENAI_API_KEY");

        assert_eq!(config.api_key("openai"), Some("sk-env".to_string()));
        assert_eq!(config.chat_url("openai"), "http://127.0.0.1:7/v1/chat/completions");
    }

    #[test]
    fn test_proxy_only_when_enabled() {
        let mut config = AppConfig::default();
        config.proxy = Some(ProxyConfig {
            enabled: false,
            http: Some("http://proxy:8080".to_string()),
            https: None,
        });
        assert_eq!(config.proxy_url(), None);
        if let Some(p) = config.proxy.as_mut() {
            p.enabled = true;
        }
        assert_eq!(config.proxy_url(), Some("http://proxy:8080"));
    }
}
