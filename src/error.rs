use std::path::PathBuf;
use thiserror::Error;

/// 应用程序错误类型
///
/// 只有批次级前置条件（输入文件、配置）会以 `AppError` 的形式向上传播，
/// 单条记录的错误都会被转换为结果行中的状态字符串。
#[derive(Debug, Error)]
pub enum AppError {
    /// 输入文件错误
    #[error("输入错误: {0}")]
    Input(#[from] InputFormatError),
    /// 配置错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),
}

/// 输入文件格式错误（整个批次在处理前中止）
#[derive(Debug, Error)]
pub enum InputFormatError {
    /// 不是 CSV 文件
    #[error("please upload a valid CSV file: {path}")]
    NotCsv { path: String },
    /// 文件无法打开
    #[error("failed to open {path}: {source}")]
    Unreadable {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// 缺少必需列
    #[error("CSV must contain the columns: {}", .required.join(", "))]
    MissingColumns { required: Vec<&'static str> },
    /// CSV 结构无法解析
    #[error("failed to read CSV: {0}")]
    Parse(#[from] csv::Error),
}

/// 单行字段转换错误（只影响该行）
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoercionError {
    /// 字段缺失（该行列数少于表头）
    #[error("missing {field} field on line {line}")]
    MissingField { field: &'static str, line: u64 },
    /// 字段不是合法的 UTF-8
    #[error("{field} on line {line} is not valid UTF-8")]
    InvalidUtf8 { field: &'static str, line: u64 },
    /// 字段为空
    #[error("{field} on line {line} is empty")]
    Empty { field: &'static str, line: u64 },
}

/// 证书渲染错误
#[derive(Debug, Error)]
pub enum RenderError {
    /// 背景模板不存在
    #[error("Template not found: {}", .0.display())]
    TemplateMissing(PathBuf),
    /// 背景模板无法解码
    #[error("Template could not be decoded ({}): {source}", .path.display())]
    TemplateDecode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    /// 二维码生成失败
    #[error("QR code generation failed: {0}")]
    Barcode(String),
    /// 证书文件写入失败
    #[error("failed to write {}: {detail}", .path.display())]
    RenderIo { path: PathBuf, detail: String },
    /// 渲染任务异常退出（panic 或被取消）
    #[error("render task aborted: {0}")]
    Aborted(String),
}

/// 证书文件读取错误
#[derive(Debug, Error)]
pub enum ArtifactError {
    /// 文件名不合法（包含路径成分）
    #[error("invalid certificate filename: {0}")]
    InvalidName(String),
    /// 文件不存在
    #[error("certificate not found: {0}")]
    NotFound(String),
    /// 读取失败
    #[error("failed to read certificate {name}: {source}")]
    ReadFailed {
        name: String,
        #[source]
        source: std::io::Error,
    },
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 配置文件读取失败
    #[error("无法读取配置文件 {path}: {source}")]
    FileReadFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// TOML 解析失败
    #[error("配置文件 {path} 解析失败: {source}")]
    TomlParseFailed {
        path: String,
        #[source]
        source: toml::de::Error,
    },
    /// 环境变量解析失败
    #[error("环境变量 {var_name} 解析失败: 值 '{value}' 无法转换为 {expected_type}")]
    EnvVarParseFailed {
        var_name: String,
        value: String,
        expected_type: &'static str,
    },
}

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;
