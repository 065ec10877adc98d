use serde::{Deserialize, Serialize};

use crate::storage::JournalMode;
use crate::utils::encoder::CodeScheme;

/// 默认配置文件路径
pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

/// 静态配置（从 TOML 加载，启动时使用）
///
/// 包含：
/// - storage: 内存存储与 journal 文件
/// - database: 关系型数据库连接与超时
/// - shortener: 短码生成方案
/// - deletion: 删除流水线并发度
/// - logging: 日志配置
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StaticConfig {
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub shortener: ShortenerConfig,
    #[serde(default)]
    pub deletion: DeletionConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Values given on the command line (or their env aliases) that win over
/// everything loaded from file and `TL__` variables.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub file_storage_path: Option<String>,
    pub database_url: Option<String>,
    pub log_level: Option<String>,
}

impl StaticConfig {
    /// 从 TOML 文件和环境变量加载配置
    ///
    /// 优先级：ENV > config.toml > 默认值
    /// ENV 前缀：TL，分隔符：__
    /// 示例：TL__DATABASE__OP_TIMEOUT_MS=300
    pub fn load(path: Option<&str>) -> Result<Self, config::ConfigError> {
        use config::{Config, Environment, File};

        // An explicitly requested file must exist; the default one is optional.
        let (path, required) = match path {
            Some(p) => (p, true),
            None => (DEFAULT_CONFIG_PATH, false),
        };

        let settings = Config::builder()
            .add_source(File::with_name(path).required(required))
            .add_source(
                Environment::with_prefix("TL")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        settings.try_deserialize::<StaticConfig>()
    }

    /// Apply command-line overrides on top of the loaded values.
    pub fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(path) = overrides.file_storage_path {
            self.storage.file_storage_path = Some(path);
        }
        if let Some(url) = overrides.database_url {
            self.database.database_url = Some(url);
        }
        if let Some(level) = overrides.log_level {
            self.logging.level = level;
        }
    }

    /// 生成示例 TOML 配置文件
    pub fn generate_sample_config() -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(&Self::default())
    }
}

/// 内存存储配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Journal file for the memory backend. Empty disables persistence.
    #[serde(default = "default_file_storage_path")]
    pub file_storage_path: Option<String>,
    #[serde(default)]
    pub journal_mode: JournalMode,
}

/// 数据库连接配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// When unset the memory backend is used.
    #[serde(default)]
    pub database_url: Option<String>,
    #[serde(default = "default_database_pool_size")]
    pub pool_size: u32,
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
    /// Upper bound for every single storage call.
    #[serde(default = "default_op_timeout_ms")]
    pub op_timeout_ms: u64,
}

/// 短码生成配置
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ShortenerConfig {
    #[serde(default)]
    pub code_scheme: CodeScheme,
}

/// 删除流水线配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeletionConfig {
    #[serde(default = "default_deletion_workers")]
    pub workers: usize,
}

/// 日志配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
    #[serde(default = "default_log_file")]
    pub file: Option<String>,
    #[serde(default = "default_max_backups")]
    pub max_backups: u32,
    #[serde(default = "default_enable_rotation")]
    pub enable_rotation: bool,
}

// ============================================================
// Default value functions for static config
// ============================================================

fn default_file_storage_path() -> Option<String> {
    Some("short-url-db.json".to_string())
}

fn default_database_pool_size() -> u32 {
    10
}

fn default_connect_timeout_secs() -> u64 {
    5
}

fn default_op_timeout_ms() -> u64 {
    500
}

fn default_deletion_workers() -> usize {
    num_cpus::get().max(1)
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "text".to_string()
}

fn default_log_file() -> Option<String> {
    None
}

fn default_max_backups() -> u32 {
    5
}

fn default_enable_rotation() -> bool {
    true
}

// ============================================================
// Default implementations
// ============================================================

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            file_storage_path: default_file_storage_path(),
            journal_mode: JournalMode::default(),
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            database_url: None,
            pool_size: default_database_pool_size(),
            connect_timeout_secs: default_connect_timeout_secs(),
            op_timeout_ms: default_op_timeout_ms(),
        }
    }
}

impl Default for DeletionConfig {
    fn default() -> Self {
        Self {
            workers: default_deletion_workers(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            file: default_log_file(),
            max_backups: default_max_backups(),
            enable_rotation: default_enable_rotation(),
        }
    }
}
