// src/config.rs

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Значение `db_path`, при котором данные живут только в памяти процесса
pub const IN_MEMORY_DB: &str = "memory";

#[derive(Debug, Deserialize, Serialize)]
pub struct AppConfig {
    pub db_path: String,

    /// Мастер-ключ RadDB (32 байта в hex); не нужен для `memory`
    #[serde(default)]
    pub master_key_hex: Option<String>,

    #[serde(default)]
    pub grpc_server: ServerConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_grpc_address")]
    pub address: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            address: default_grpc_address(),
        }
    }
}

fn default_grpc_address() -> String {
    "127.0.0.1:50051".to_string()
}

#[derive(Debug, Deserialize, Serialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub enable_json_output: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            enable_json_output: false,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            db_path: IN_MEMORY_DB.to_string(),
            master_key_hex: None,
            grpc_server: ServerConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl AppConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, BoxError> {
        let content = fs::read_to_string(path)?;
        let config: Self = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Загрузить конфиг, если файл есть; иначе — значения по умолчанию
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self, BoxError> {
        if path.as_ref().exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), BoxError> {
        let content = serde_yaml::to_string(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    pub fn uses_memory_store(&self) -> bool {
        self.db_path == IN_MEMORY_DB
    }
}
