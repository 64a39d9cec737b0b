use std::fmt;

#[derive(Debug, Clone)]
pub enum GeogateError {
    Config(String),
    InvalidCidr(String),
    DatabaseOpen(String),
    EmptyResolverChain(String),
    FileOperation(String),
    Serialization(String),
}

impl GeogateError {
    /// 获取错误代码
    pub fn code(&self) -> &'static str {
        match self {
            GeogateError::Config(_) => "E001",
            GeogateError::InvalidCidr(_) => "E002",
            GeogateError::DatabaseOpen(_) => "E003",
            GeogateError::EmptyResolverChain(_) => "E004",
            GeogateError::FileOperation(_) => "E005",
            GeogateError::Serialization(_) => "E006",
        }
    }

    /// 获取错误类型名称
    pub fn error_type(&self) -> &'static str {
        match self {
            GeogateError::Config(_) => "Configuration Error",
            GeogateError::InvalidCidr(_) => "Invalid CIDR Notation",
            GeogateError::DatabaseOpen(_) => "Database Open Error",
            GeogateError::EmptyResolverChain(_) => "Empty Resolver Chain",
            GeogateError::FileOperation(_) => "File Operation Error",
            GeogateError::Serialization(_) => "Serialization Error",
        }
    }

    /// 获取错误详情
    pub fn message(&self) -> &str {
        match self {
            GeogateError::Config(msg) => msg,
            GeogateError::InvalidCidr(msg) => msg,
            GeogateError::DatabaseOpen(msg) => msg,
            GeogateError::EmptyResolverChain(msg) => msg,
            GeogateError::FileOperation(msg) => msg,
            GeogateError::Serialization(msg) => msg,
        }
    }

    /// 格式化为简洁输出
    pub fn format_simple(&self) -> String {
        format!("{}: {}", self.error_type(), self.message())
    }
}

impl fmt::Display for GeogateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_simple())
    }
}

impl std::error::Error for GeogateError {}

// 便捷的构造函数
impl GeogateError {
    pub fn config<T: Into<String>>(msg: T) -> Self {
        GeogateError::Config(msg.into())
    }

    pub fn invalid_cidr<T: Into<String>>(msg: T) -> Self {
        GeogateError::InvalidCidr(msg.into())
    }

    pub fn database_open<T: Into<String>>(msg: T) -> Self {
        GeogateError::DatabaseOpen(msg.into())
    }

    pub fn empty_resolver_chain<T: Into<String>>(msg: T) -> Self {
        GeogateError::EmptyResolverChain(msg.into())
    }

    pub fn file_operation<T: Into<String>>(msg: T) -> Self {
        GeogateError::FileOperation(msg.into())
    }

    pub fn serialization<T: Into<String>>(msg: T) -> Self {
        GeogateError::Serialization(msg.into())
    }
}

// 为常见的错误类型实现 From trait
impl From<std::io::Error> for GeogateError {
    fn from(err: std::io::Error) -> Self {
        GeogateError::FileOperation(err.to_string())
    }
}

impl From<serde_json::Error> for GeogateError {
    fn from(err: serde_json::Error) -> Self {
        GeogateError::Serialization(err.to_string())
    }
}

impl From<maxminddb::MaxMindDbError> for GeogateError {
    fn from(err: maxminddb::MaxMindDbError) -> Self {
        GeogateError::DatabaseOpen(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, GeogateError>;
