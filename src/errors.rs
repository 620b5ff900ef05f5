use std::fmt;

#[derive(Debug, Clone)]
pub enum RedirectoryError {
    Validation(String),
    NotFound(String),
    Conflict(String),
    TransientFailure(String),
    FileOperation(String),
    Serialization(String),
}

impl RedirectoryError {
    /// 获取错误代码
    pub fn code(&self) -> &'static str {
        match self {
            RedirectoryError::Validation(_) => "E001",
            RedirectoryError::NotFound(_) => "E002",
            RedirectoryError::Conflict(_) => "E003",
            RedirectoryError::TransientFailure(_) => "E004",
            RedirectoryError::FileOperation(_) => "E005",
            RedirectoryError::Serialization(_) => "E006",
        }
    }

    /// 获取错误类型名称
    pub fn error_type(&self) -> &'static str {
        match self {
            RedirectoryError::Validation(_) => "Validation Error",
            RedirectoryError::NotFound(_) => "Resource Not Found",
            RedirectoryError::Conflict(_) => "Write Conflict",
            RedirectoryError::TransientFailure(_) => "Transient Storage Failure",
            RedirectoryError::FileOperation(_) => "File Operation Error",
            RedirectoryError::Serialization(_) => "Serialization Error",
        }
    }

    /// 获取错误详情
    pub fn message(&self) -> &str {
        match self {
            RedirectoryError::Validation(msg) => msg,
            RedirectoryError::NotFound(msg) => msg,
            RedirectoryError::Conflict(msg) => msg,
            RedirectoryError::TransientFailure(msg) => msg,
            RedirectoryError::FileOperation(msg) => msg,
            RedirectoryError::Serialization(msg) => msg,
        }
    }

    /// A conflict is the only error the store retries internally; everything
    /// else surfaces to the caller unchanged.
    pub fn is_retryable(&self) -> bool {
        matches!(self, RedirectoryError::Conflict(_))
    }

    /// 格式化为彩色输出（用于 Server 模式）
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

    /// 格式化为简洁输出（用于 CLI 模式）
    pub fn format_simple(&self) -> String {
        format!("{}: {}", self.error_type(), self.message())
    }
}

impl fmt::Display for RedirectoryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // 默认使用简洁格式
        write!(f, "{}", self.format_simple())
    }
}

impl std::error::Error for RedirectoryError {}

// 便捷的构造函数
impl RedirectoryError {
    pub fn validation<T: Into<String>>(msg: T) -> Self {
        RedirectoryError::Validation(msg.into())
    }

    pub fn not_found<T: Into<String>>(msg: T) -> Self {
        RedirectoryError::NotFound(msg.into())
    }

    pub fn conflict<T: Into<String>>(msg: T) -> Self {
        RedirectoryError::Conflict(msg.into())
    }

    pub fn transient_failure<T: Into<String>>(msg: T) -> Self {
        RedirectoryError::TransientFailure(msg.into())
    }

    pub fn file_operation<T: Into<String>>(msg: T) -> Self {
        RedirectoryError::FileOperation(msg.into())
    }

    pub fn serialization<T: Into<String>>(msg: T) -> Self {
        RedirectoryError::Serialization(msg.into())
    }
}

// 为常见的错误类型实现 From trait
impl From<std::io::Error> for RedirectoryError {
    fn from(err: std::io::Error) -> Self {
        RedirectoryError::FileOperation(err.to_string())
    }
}

impl From<serde_json::Error> for RedirectoryError {
    fn from(err: serde_json::Error) -> Self {
        RedirectoryError::Serialization(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, RedirectoryError>;
