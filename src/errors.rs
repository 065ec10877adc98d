use std::fmt;

#[derive(Debug, Clone)]
pub enum TinylinkError {
    InvalidUrl(String),
    Conflict(String),
    NotFound(String),
    Deleted(String),
    DatabaseConfig(String),
    DatabaseConnection(String),
    DatabaseOperation(String),
    Timeout(String),
    FileOperation(String),
    Serialization(String),
    Cancelled(String),
}

impl TinylinkError {
    /// 获取错误代码
    pub fn code(&self) -> &'static str {
        match self {
            TinylinkError::InvalidUrl(_) => "E001",
            TinylinkError::Conflict(_) => "E002",
            TinylinkError::NotFound(_) => "E003",
            TinylinkError::Deleted(_) => "E004",
            TinylinkError::DatabaseConfig(_) => "E005",
            TinylinkError::DatabaseConnection(_) => "E006",
            TinylinkError::DatabaseOperation(_) => "E007",
            TinylinkError::Timeout(_) => "E008",
            TinylinkError::FileOperation(_) => "E009",
            TinylinkError::Serialization(_) => "E010",
            TinylinkError::Cancelled(_) => "E011",
        }
    }

    /// 获取错误类型名称
    pub fn error_type(&self) -> &'static str {
        match self {
            TinylinkError::InvalidUrl(_) => "Invalid URL",
            TinylinkError::Conflict(_) => "Already Exists",
            TinylinkError::NotFound(_) => "Resource Not Found",
            TinylinkError::Deleted(_) => "Resource Deleted",
            TinylinkError::DatabaseConfig(_) => "Database Configuration Error",
            TinylinkError::DatabaseConnection(_) => "Database Connection Error",
            TinylinkError::DatabaseOperation(_) => "Database Operation Error",
            TinylinkError::Timeout(_) => "Operation Timed Out",
            TinylinkError::FileOperation(_) => "File Operation Error",
            TinylinkError::Serialization(_) => "Serialization Error",
            TinylinkError::Cancelled(_) => "Operation Cancelled",
        }
    }

    /// 获取错误详情
    pub fn message(&self) -> &str {
        match self {
            TinylinkError::InvalidUrl(msg) => msg,
            TinylinkError::Conflict(msg) => msg,
            TinylinkError::NotFound(msg) => msg,
            TinylinkError::Deleted(msg) => msg,
            TinylinkError::DatabaseConfig(msg) => msg,
            TinylinkError::DatabaseConnection(msg) => msg,
            TinylinkError::DatabaseOperation(msg) => msg,
            TinylinkError::Timeout(msg) => msg,
            TinylinkError::FileOperation(msg) => msg,
            TinylinkError::Serialization(msg) => msg,
            TinylinkError::Cancelled(msg) => msg,
        }
    }

    /// Backend failures: timeouts, connection problems, unexpected I/O.
    ///
    /// These are surfaced as-is; the core never retries them.
    pub fn is_backend(&self) -> bool {
        matches!(
            self,
            TinylinkError::DatabaseConfig(_)
                | TinylinkError::DatabaseConnection(_)
                | TinylinkError::DatabaseOperation(_)
                | TinylinkError::Timeout(_)
                | TinylinkError::FileOperation(_)
                | TinylinkError::Serialization(_)
        )
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, TinylinkError::Conflict(_))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, TinylinkError::NotFound(_))
    }

    pub fn is_deleted(&self) -> bool {
        matches!(self, TinylinkError::Deleted(_))
    }

    /// 格式化为彩色输出（用于 CLI 模式）
    pub fn format_colored(&self) -> String {
        use colored::Colorize;
        format!(
            "{} {} {}\n  {}",
            "[ERROR]".red().bold(),
            self.code().yellow(),
            self.error_type().red(),
            self.message().white()
        )
    }

    /// 格式化为简洁输出
    pub fn format_simple(&self) -> String {
        format!("{}: {}", self.error_type(), self.message())
    }
}

impl fmt::Display for TinylinkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_simple())
    }
}

impl std::error::Error for TinylinkError {}

// 便捷的构造函数
impl TinylinkError {
    pub fn invalid_url<T: Into<String>>(msg: T) -> Self {
        TinylinkError::InvalidUrl(msg.into())
    }

    pub fn conflict<T: Into<String>>(msg: T) -> Self {
        TinylinkError::Conflict(msg.into())
    }

    pub fn not_found<T: Into<String>>(msg: T) -> Self {
        TinylinkError::NotFound(msg.into())
    }

    pub fn deleted<T: Into<String>>(msg: T) -> Self {
        TinylinkError::Deleted(msg.into())
    }

    pub fn database_config<T: Into<String>>(msg: T) -> Self {
        TinylinkError::DatabaseConfig(msg.into())
    }

    pub fn database_connection<T: Into<String>>(msg: T) -> Self {
        TinylinkError::DatabaseConnection(msg.into())
    }

    pub fn database_operation<T: Into<String>>(msg: T) -> Self {
        TinylinkError::DatabaseOperation(msg.into())
    }

    pub fn timeout<T: Into<String>>(msg: T) -> Self {
        TinylinkError::Timeout(msg.into())
    }

    pub fn file_operation<T: Into<String>>(msg: T) -> Self {
        TinylinkError::FileOperation(msg.into())
    }

    pub fn serialization<T: Into<String>>(msg: T) -> Self {
        TinylinkError::Serialization(msg.into())
    }

    pub fn cancelled<T: Into<String>>(msg: T) -> Self {
        TinylinkError::Cancelled(msg.into())
    }
}

// 为常见的错误类型实现 From trait
impl From<sea_orm::DbErr> for TinylinkError {
    fn from(err: sea_orm::DbErr) -> Self {
        TinylinkError::DatabaseOperation(err.to_string())
    }
}

impl From<std::io::Error> for TinylinkError {
    fn from(err: std::io::Error) -> Self {
        TinylinkError::FileOperation(err.to_string())
    }
}

impl From<serde_json::Error> for TinylinkError {
    fn from(err: serde_json::Error) -> Self {
        TinylinkError::Serialization(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, TinylinkError>;
