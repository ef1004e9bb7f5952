use std::path::PathBuf;

use config::{Config, ConfigError, Environment as EnvironmentSource, File};
use serde::Deserialize;

use super::environment::Environment;

const PLACEHOLDER_API_KEY: &str = "xxx";

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub llm: LlmSettings,
    pub storage: StorageSettings,
    pub context: ContextSettings,
    pub pricing: PricingSettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub max_body_bytes: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WireFormat {
    #[default]
    ChatCompletions,
    Responses,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LlmSettings {
    pub provider: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default)]
    pub azure_endpoint: Option<String>,
    pub chat_model: String,
    #[serde(default)]
    pub wire_format: WireFormat,
    pub temperature: f32,
    pub sse_keep_alive_seconds: u64,
    pub first_delta_timeout_seconds: u64,
}

impl LlmSettings {
    /// Whether upstream calls can be attempted at all.
    pub fn is_configured(&self) -> bool {
        if self.provider == "lmstudio" {
            return true;
        }
        let key = self.api_key.trim();
        !key.is_empty() && key != PLACEHOLDER_API_KEY
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageSettings {
    pub data_dir: PathBuf,
    pub uploads_dir: PathBuf,
}

impl StorageSettings {
    pub fn tmp_dir(&self) -> PathBuf {
        self.uploads_dir.join("tmp")
    }

    pub fn library_index(&self) -> PathBuf {
        self.data_dir.join("library.json")
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ContextSettings {
    pub budget_floor: usize,
    pub default_char_budget: usize,
    pub default_max_output_tokens: u32,
    pub min_output_tokens: u32,
    pub max_output_tokens: u32,
    pub default_rag_k: u32,
    pub min_rag_k: u32,
    pub max_rag_k: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PricingSettings {
    pub input_usd_per_million: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    pub level: String,
    pub enable_json: bool,
}

impl Settings {
    /// Defaults, then `appsettings.<env>.toml`, then `APP_*` variables
    /// (`APP_LLM__API_KEY`). `OPENAI_API_KEY` fills an empty key.
    pub fn load(environment: Environment) -> Result<Self, ConfigError> {
        let file_name = environment.settings_file();

        let configuration = Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 3000)?
            .set_default("server.max_body_bytes", 25 * 1024 * 1024)?
            .set_default("llm.provider", "openai")?
            .set_default("llm.api_key", "")?
            .set_default("llm.chat_model", "gpt-4o")?
            .set_default("llm.wire_format", "chat_completions")?
            .set_default("llm.temperature", 0.2)?
            .set_default("llm.sse_keep_alive_seconds", 15)?
            .set_default("llm.first_delta_timeout_seconds", 45)?
            .set_default("storage.data_dir", "data")?
            .set_default("storage.uploads_dir", "uploads")?
            .set_default("context.budget_floor", 2000)?
            .set_default("context.default_char_budget", 12_000)?
            .set_default("context.default_max_output_tokens", 4096)?
            .set_default("context.min_output_tokens", 256)?
            .set_default("context.max_output_tokens", 8192)?
            .set_default("context.default_rag_k", 24)?
            .set_default("context.min_rag_k", 2)?
            .set_default("context.max_rag_k", 64)?
            .set_default("pricing.input_usd_per_million", 5.0)?
            .set_default("logging.level", "info")?
            .set_default("logging.enable_json", false)?
            .add_source(File::with_name(&file_name).required(false))
            .add_source(
                EnvironmentSource::with_prefix("APP")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let mut settings: Settings = configuration.try_deserialize()?;

        if settings.llm.api_key.trim().is_empty() {
            if let Ok(key) = std::env::var("OPENAI_API_KEY") {
                settings.llm.api_key = key;
            }
        }

        settings.validate()?;
        Ok(settings)
    }

    /// Rejects values the relay cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.llm.sse_keep_alive_seconds == 0 {
            return Err(ConfigError::Message(
                "llm.sse_keep_alive_seconds must be at least 1".to_string(),
            ));
        }
        if self.llm.first_delta_timeout_seconds == 0 {
            return Err(ConfigError::Message(
                "llm.first_delta_timeout_seconds must be at least 1".to_string(),
            ));
        }
        if self.context.min_output_tokens > self.context.max_output_tokens {
            return Err(ConfigError::Message(
                "context.min_output_tokens exceeds context.max_output_tokens".to_string(),
            ));
        }
        if self.context.min_rag_k > self.context.max_rag_k {
            return Err(ConfigError::Message(
                "context.min_rag_k exceeds context.max_rag_k".to_string(),
            ));
        }
        Ok(())
    }
}
